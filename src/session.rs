use crate::card::{Card, Status};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Recoverable conditions raised by session transitions.
///
/// A transition that fails leaves the session exactly as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No currently unknown cards.")]
    NoUnknownCards,
    #[error("The selected set has no cards.")]
    EmptySetSelected,
    #[error("Duplicate question in set: `{0}`")]
    DuplicateQuestion(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// The active deck holds every card of the set
    #[default]
    All,
    /// The active deck holds only cards marked unknown
    Review,
}

/// Successful outcome of a user action that is worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Loaded(String),
    Shuffled,
    OrderReset,
    ReviewingUnknown,
    BackToAll,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(name) => write!(f, "Set '{}' has been loaded.", name),
            Self::Shuffled => f.write_str("Cards have been shuffled."),
            Self::OrderReset => f.write_str("Order has been reset."),
            Self::ReviewingUnknown => f.write_str("Displaying currently unknown cards."),
            Self::BackToAll => f.write_str("Back to all cards."),
        }
    }
}

/// Every user action the session understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadSet { name: String, cards: Vec<Card> },
    ToggleAnswer,
    Advance,
    Mark(Status),
    Shuffle,
    ResetOrder,
    ReviewUnknown,
    BackToAll,
}

/// Read-only projection of the session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView<'a> {
    pub mode: Mode,
    pub question: Option<&'a str>,
    // only present while the answer is revealed
    pub answer: Option<&'a str>,
    pub position: usize,
    pub total: usize,
    pub progress: f64,
    pub viewed: usize,
    pub known: usize,
    pub unknown: usize,
    pub unseen: usize,
}

/// A linear, circular review over one loaded set of cards.
///
/// The active deck is kept as a list of indices into the original deck, so
/// it is always a (possibly filtered) permutation of the loaded cards.
/// Statuses are keyed by question text and survive every transition except
/// loading a new set.
#[derive(Debug)]
pub struct Session<R = StdRng> {
    rng: R,
    set_name: Option<String>,
    original: Vec<Card>,
    active: Vec<usize>,
    cursor: usize,
    revealed: bool,
    status: HashMap<String, Status>,
    mode: Mode,
    viewed: usize,
}

impl Session<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for Session<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Session<R> {
    /// Creates an empty session drawing its shuffles from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            set_name: None,
            original: vec![],
            active: vec![],
            cursor: 0,
            revealed: false,
            status: HashMap::new(),
            mode: Mode::All,
            viewed: 0,
        }
    }

    /// Replaces the whole session with a new set, in the order given.
    ///
    /// Empty sets and sets with repeated question text are rejected and the
    /// previous state is retained.
    pub fn load_set(
        &mut self,
        name: impl Into<String>,
        cards: Vec<Card>,
    ) -> Result<(), SessionError> {
        if cards.is_empty() {
            return Err(SessionError::EmptySetSelected);
        }
        let mut status = HashMap::with_capacity(cards.len());
        for card in &cards {
            if status.insert(card.question.clone(), Status::Unseen).is_some() {
                return Err(SessionError::DuplicateQuestion(card.question.clone()));
            }
        }
        let name = name.into();
        log::debug!("loading set `{}` with {} cards", name, cards.len());
        self.set_name = Some(name);
        self.original = cards;
        self.status = status;
        self.replace_active(self.original_order(), Mode::All);
        Ok(())
    }

    pub fn toggle_answer(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Moves to the next card, wrapping around after the last one.
    pub fn advance(&mut self) {
        if self.active.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.active.len();
        self.revealed = false;
        self.viewed += 1;
    }

    /// Records `status` for the current card, then advances.
    pub fn mark_current(&mut self, status: Status) {
        let Some(question) = self.current_card().map(|c| c.question.clone()) else {
            return;
        };
        log::debug!("marking `{}` as {}", question, status);
        if let Some(entry) = self.status.get_mut(&question) {
            *entry = status;
        }
        self.advance();
    }

    pub fn shuffle(&mut self) {
        let mut order = self.original_order();
        order.shuffle(&mut self.rng);
        self.replace_active(order, Mode::All);
    }

    pub fn reset_order(&mut self) {
        self.replace_active(self.original_order(), Mode::All);
    }

    /// Restricts the active deck to the cards currently marked unknown, shuffled.
    pub fn review_unknown(&mut self) -> Result<(), SessionError> {
        let mut order: Vec<usize> = self
            .original
            .iter()
            .enumerate()
            .filter(|(_, card)| self.status.get(&card.question) == Some(&Status::Unknown))
            .map(|(i, _)| i)
            .collect();
        if order.is_empty() {
            return Err(SessionError::NoUnknownCards);
        }
        order.shuffle(&mut self.rng);
        self.replace_active(order, Mode::Review);
        Ok(())
    }

    pub fn back_to_all(&mut self) {
        self.replace_active(self.original_order(), Mode::All);
    }

    /// Applies a single user action; either it fully succeeds or nothing changes.
    pub fn apply(&mut self, action: Action) -> Result<Option<Notice>, SessionError> {
        match action {
            Action::LoadSet { name, cards } => {
                self.load_set(name.clone(), cards)?;
                Ok(Some(Notice::Loaded(name)))
            }
            Action::ToggleAnswer => {
                self.toggle_answer();
                Ok(None)
            }
            Action::Advance => {
                self.advance();
                Ok(None)
            }
            Action::Mark(status) => {
                self.mark_current(status);
                Ok(None)
            }
            Action::Shuffle => {
                self.shuffle();
                Ok(Some(Notice::Shuffled))
            }
            Action::ResetOrder => {
                self.reset_order();
                Ok(Some(Notice::OrderReset))
            }
            Action::ReviewUnknown => {
                self.review_unknown()?;
                Ok(Some(Notice::ReviewingUnknown))
            }
            Action::BackToAll => {
                self.back_to_all();
                Ok(Some(Notice::BackToAll))
            }
        }
    }

    fn original_order(&self) -> Vec<usize> {
        (0..self.original.len()).collect()
    }

    fn replace_active(&mut self, order: Vec<usize>, mode: Mode) {
        self.active = order;
        self.cursor = 0;
        self.revealed = false;
        self.viewed = 0;
        self.mode = mode;
    }
}

impl<R> Session<R> {
    pub fn current_card(&self) -> Option<&Card> {
        self.active
            .get(self.cursor)
            .and_then(|&i| self.original.get(i))
    }

    /// Cards of the active deck in traversal order.
    pub fn active_cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.active.iter().filter_map(|&i| self.original.get(i))
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn viewed(&self) -> usize {
        self.viewed
    }

    pub fn status_of(&self, question: &str) -> Option<Status> {
        self.status.get(question).copied()
    }

    fn count(&self, status: Status) -> usize {
        self.status.values().filter(|&&s| s == status).count()
    }

    pub fn known_count(&self) -> usize {
        self.count(Status::Known)
    }

    pub fn unknown_count(&self) -> usize {
        self.count(Status::Unknown)
    }

    pub fn unseen_count(&self) -> usize {
        self.count(Status::Unseen)
    }

    pub fn total_cards(&self) -> usize {
        self.active.len()
    }

    pub fn progress_fraction(&self) -> f64 {
        if self.active.is_empty() {
            return 0.0;
        }
        (self.cursor + 1) as f64 / self.active.len() as f64
    }

    pub fn view(&self) -> SessionView<'_> {
        let card = self.current_card();
        SessionView {
            mode: self.mode,
            question: card.map(|c| c.question.as_str()),
            answer: card
                .filter(|_| self.revealed)
                .map(|c| c.answer.as_str()),
            position: if card.is_some() { self.cursor + 1 } else { 0 },
            total: self.total_cards(),
            progress: self.progress_fraction(),
            viewed: self.viewed,
            known: self.known_count(),
            unknown: self.unknown_count(),
            unseen: self.unseen_count(),
        }
    }
}
