mod card;
mod session;
mod store;
mod view;

use crate::session::Session;
use crate::store::{CardSets, CardStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the available card sets
    List {},
    /// Start a study session
    Study {
        /// Name of the set to load first (defaults to the first set by name)
        set: Option<String>,
    },
}

/// FLASHDECK - Study question/answer flashcard sets in the terminal.
/// Each set is a JSON file mapping questions to answers. Mark cards as known or
/// unknown, then review only the ones you don't know yet.
#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding one `<set>.json` file per card set
    #[arg(long, default_value = "sets")]
    sets: PathBuf,

    /// Directory holding optional `<set>.json` display settings
    #[arg(long, default_value = "conf")]
    conf: PathBuf,

    /// Seed for shuffling, for repeatable card orders
    #[arg(long)]
    seed: Option<u64>,
}

fn new_session(seed: Option<u64>) -> Session {
    match seed {
        Some(seed) => Session::with_rng(StdRng::seed_from_u64(seed)),
        None => Session::new(),
    }
}

/// Loads the requested set, or the first set by name that has cards.
///
/// A named set must exist and load. Without a name, a session with no
/// loadable sets starts empty so a set can still be picked on screen.
fn start_session(sets: &CardSets, set: Option<String>, seed: Option<u64>) -> Result<Session> {
    let mut session = new_session(seed);
    match set {
        Some(name) => {
            let cards = sets
                .get(&name)
                .with_context(|| format!("Unknown set `{}`", name))?;
            session
                .load_set(name.clone(), cards.clone())
                .with_context(|| format!("Error loading set `{}`", name))?;
        }
        None => {
            let loaded = sets.iter().find_map(|(name, cards)| {
                match session.load_set(name.clone(), cards.clone()) {
                    Ok(()) => Some(name),
                    Err(err) => {
                        log::warn!("not starting with set `{}`: {}", name, err);
                        None
                    }
                }
            });
            if loaded.is_none() {
                log::warn!("No loadable card sets found, starting without cards");
            }
        }
    }
    Ok(session)
}

fn list_sets(store: &CardStore) {
    let sets = store.list_sets();
    if sets.is_empty() {
        log::warn!("No card sets in `{}`", store.sets_dir().display());
    }
    for (name, cards) in &sets {
        let config = store.load_set_config(name);
        log::info!("{}: {} cards ({})", name, cards.len(), config.title);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let store = CardStore::new(&args.sets, &args.conf);

    match args.command {
        Commands::List {} => list_sets(&store),
        Commands::Study { set } => {
            let sets = store.list_sets();
            let session = start_session(&sets, set, args.seed)?;
            let set_names = sets.into_keys().collect();
            let mut terminal = view::init()?;
            let res = view::study::App::new(session, store, set_names).run(&mut terminal);
            view::restore()?;
            res?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn sample_store() -> CardStore {
        CardStore::new("sets", "conf")
    }

    #[test]
    fn test_sample_sets() {
        let sets = sample_store().list_sets();
        assert_eq!(
            sets.keys().collect::<Vec<_>>(),
            vec!["arithmetic", "capitals"]
        );
        assert_eq!(sets["arithmetic"][0], Card::new("2+2?", "4"));
        assert_eq!(sets["capitals"].len(), 6);
    }

    #[test]
    fn test_sample_config() {
        let store = sample_store();
        assert_eq!(store.load_set_config("capitals").title, "European Capitals");
        assert_eq!(store.load_set_config("arithmetic").title, "arithmetic");
    }

    #[test]
    fn test_start_session_first_set() {
        let sets = sample_store().list_sets();
        let session = start_session(&sets, None, Some(1)).unwrap();
        assert_eq!(session.set_name(), Some("arithmetic"));
        assert_eq!(session.current_card(), Some(&Card::new("2+2?", "4")));
    }

    #[test]
    fn test_start_session_named_set() {
        let sets = sample_store().list_sets();
        let session = start_session(&sets, Some("capitals".to_string()), None).unwrap();
        assert_eq!(session.set_name(), Some("capitals"));
        assert_eq!(session.total_cards(), 6);
    }

    #[test]
    fn test_start_session_unknown_set() {
        let sets = sample_store().list_sets();
        let err = start_session(&sets, Some("nope".to_string()), None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown set `nope`");
    }

    #[test]
    fn test_start_session_no_sets() {
        let session = start_session(&CardSets::new(), None, Some(1)).unwrap();
        assert!(session.set_name().is_none());
        assert!(session.current_card().is_none());
        assert_eq!(session.total_cards(), 0);
    }

    #[test]
    fn test_start_session_skips_empty_default_set() {
        let mut sets = CardSets::new();
        sets.insert("aaa".to_string(), vec![]);
        sets.insert("math".to_string(), vec![Card::new("2+2?", "4")]);
        let session = start_session(&sets, None, Some(1)).unwrap();
        assert_eq!(session.set_name(), Some("math"));
        assert_eq!(session.current_card(), Some(&Card::new("2+2?", "4")));
    }

    #[test]
    fn test_start_session_only_empty_sets() {
        let mut sets = CardSets::new();
        sets.insert("empty".to_string(), vec![]);
        let session = start_session(&sets, None, Some(1)).unwrap();
        assert!(session.set_name().is_none());
        assert!(session.current_card().is_none());
    }

    #[test]
    fn test_start_session_named_empty_set() {
        let mut sets = CardSets::new();
        sets.insert("empty".to_string(), vec![]);
        sets.insert("math".to_string(), vec![Card::new("2+2?", "4")]);
        let err = start_session(&sets, Some("empty".to_string()), None).unwrap_err();
        assert_eq!(err.to_string(), "Error loading set `empty`");
    }

    #[test]
    fn test_seeded_sessions_shuffle_alike() {
        let sets = sample_store().list_sets();
        let mut a = start_session(&sets, Some("capitals".to_string()), Some(3)).unwrap();
        let mut b = start_session(&sets, Some("capitals".to_string()), Some(3)).unwrap();
        a.shuffle();
        b.shuffle();
        assert!(a.active_cards().eq(b.active_cards()));
    }
}
