use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::card::Card;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use walkdir::WalkDir;

pub const DEFAULT_COLOR: &str = "blue";

pub type CardSets = BTreeMap<String, Vec<Card>>;

/// Display settings for a set, read from `<conf>/<set>.json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct SetConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "backgroundColor")]
    pub background_color: Option<String>,
}

impl SetConfig {
    /// Fills in whatever the file left out.
    fn with_defaults(self, set_name: &str) -> ResolvedConfig {
        ResolvedConfig {
            title: self.title.unwrap_or_else(|| set_name.to_string()),
            background_color: self
                .background_color
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub title: String,
    pub background_color: String,
}

/// Read-only access to the card sets on disk.
#[derive(Debug, Clone)]
pub struct CardStore {
    sets_dir: PathBuf,
    conf_dir: PathBuf,
}

impl CardStore {
    pub fn new(sets_dir: impl Into<PathBuf>, conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            sets_dir: sets_dir.into(),
            conf_dir: conf_dir.into(),
        }
    }

    pub fn sets_dir(&self) -> &Path {
        &self.sets_dir
    }

    /// Reads every `*.json` set in the sets directory, keyed by file stem.
    ///
    /// Unreadable files are skipped, and a missing directory yields no sets.
    pub fn list_sets(&self) -> CardSets {
        if !self.sets_dir.is_dir() {
            log::warn!("sets directory `{}` not found", self.sets_dir.display());
            return CardSets::new();
        }
        let sets: CardSets = WalkDir::new(&self.sets_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("json"))
            .filter_map(|e| {
                let name = e.path().file_stem()?.to_str()?.to_string();
                match parse_set(e.path()) {
                    Ok(cards) => Some((name, cards)),
                    Err(err) => {
                        log::warn!("skipping set `{}`: {:#}", e.path().display(), err);
                        None
                    }
                }
            })
            .collect();
        log::info!(
            "Found {} sets in `{}`",
            sets.len(),
            self.sets_dir.display()
        );
        sets
    }

    /// Display settings for `set_name`; defaults when there is no usable file.
    pub fn load_set_config(&self, set_name: &str) -> ResolvedConfig {
        let path = self.conf_dir.join(format!("{}.json", set_name));
        let config = if path.is_file() {
            read_config(&path).unwrap_or_else(|err| {
                log::warn!("ignoring config `{}`: {:#}", path.display(), err);
                SetConfig::default()
            })
        } else {
            SetConfig::default()
        };
        config.with_defaults(set_name)
    }
}

/// Parses a JSON object of question -> answer, keeping the object's key order.
pub fn parse_set(path: &Path) -> Result<Vec<Card>> {
    let data: Map<String, Value> = serde_json::from_str(
        &fs::read_to_string(path).with_context(|| format!("Error reading `{}`", path.display()))?,
    )
    .context("Error deserializing set")?;
    Ok(data
        .into_iter()
        .map(|(question, answer)| {
            let answer = match answer {
                Value::String(s) => s,
                other => other.to_string(),
            };
            Card { question, answer }
        })
        .collect())
}

fn read_config(path: &Path) -> Result<SetConfig> {
    serde_json::from_str(
        &fs::read_to_string(path).with_context(|| format!("Error reading `{}`", path.display()))?,
    )
    .context("Error deserializing set config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, CardStore) {
        let dir = tempfile::tempdir().unwrap();
        let sets = dir.path().join("sets");
        let conf = dir.path().join("conf");
        fs::create_dir(&sets).unwrap();
        fs::create_dir(&conf).unwrap();
        let store = CardStore::new(sets, conf);
        (dir, store)
    }

    #[test]
    fn test_list_sets() {
        let (dir, store) = store();
        fs::write(
            dir.path().join("sets/math.json"),
            r#"{"3+3?": "6", "2+2?": "4", "1+1?": "2"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("sets/capitals.json"),
            r#"{"Capital of France?": "Paris"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("sets/notes.txt"), "not a set").unwrap();

        let sets = store.list_sets();
        assert_eq!(
            sets.keys().collect::<Vec<_>>(),
            vec!["capitals", "math"]
        );
        assert_eq!(
            sets["math"],
            vec![
                Card::new("3+3?", "6"),
                Card::new("2+2?", "4"),
                Card::new("1+1?", "2"),
            ]
        );
    }

    #[test]
    fn test_list_sets_missing_dir() {
        let store = CardStore::new("/does/not/exist", "/does/not/exist/either");
        assert!(store.list_sets().is_empty());
    }

    #[test]
    fn test_list_sets_skips_bad_files() {
        let (dir, store) = store();
        fs::write(dir.path().join("sets/broken.json"), "{ nope").unwrap();
        fs::write(dir.path().join("sets/array.json"), r#"["a", "b"]"#).unwrap();
        fs::write(dir.path().join("sets/ok.json"), r#"{"q": "a"}"#).unwrap();
        let sets = store.list_sets();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets["ok"], vec![Card::new("q", "a")]);
    }

    #[test]
    fn test_list_sets_ignores_nested_dirs() {
        let (dir, store) = store();
        fs::create_dir(dir.path().join("sets/nested")).unwrap();
        fs::write(dir.path().join("sets/nested/inner.json"), r#"{"q": "a"}"#).unwrap();
        assert!(store.list_sets().is_empty());
    }

    #[test]
    fn test_parse_set_non_string_answers() {
        let (dir, _store) = store();
        let path = dir.path().join("sets/mixed.json");
        fs::write(&path, r#"{"Answer to everything?": 42, "Is Rust fun?": true}"#).unwrap();
        let cards = parse_set(&path).unwrap();
        assert_eq!(
            cards,
            vec![
                Card::new("Answer to everything?", "42"),
                Card::new("Is Rust fun?", "true"),
            ]
        );
    }

    #[test]
    fn test_parse_set_duplicate_keys_collapse() {
        let (dir, _store) = store();
        let path = dir.path().join("sets/dupes.json");
        fs::write(&path, r#"{"q1": "a", "q2": "b", "q1": "c"}"#).unwrap();
        let cards = parse_set(&path).unwrap();
        assert_eq!(cards, vec![Card::new("q1", "c"), Card::new("q2", "b")]);
    }

    #[test]
    fn test_load_set_config() {
        let (dir, store) = store();
        fs::write(
            dir.path().join("conf/math.json"),
            r##"{"title": "Arithmetic", "background_color": "#336699"}"##,
        )
        .unwrap();
        let config = store.load_set_config("math");
        assert_eq!(config.title, "Arithmetic");
        assert_eq!(config.background_color, "#336699");
    }

    #[test]
    fn test_load_set_config_camel_case_and_partial() {
        let (dir, store) = store();
        fs::write(
            dir.path().join("conf/capitals.json"),
            r#"{"backgroundColor": "green"}"#,
        )
        .unwrap();
        let config = store.load_set_config("capitals");
        assert_eq!(config.title, "capitals");
        assert_eq!(config.background_color, "green");
    }

    #[test]
    fn test_load_set_config_defaults() {
        let (dir, store) = store();
        assert_eq!(
            store.load_set_config("missing"),
            ResolvedConfig {
                title: "missing".to_string(),
                background_color: DEFAULT_COLOR.to_string(),
            }
        );

        fs::write(dir.path().join("conf/broken.json"), "][").unwrap();
        assert_eq!(store.load_set_config("broken").title, "broken");
    }
}
