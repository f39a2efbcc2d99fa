use std::fmt;

/// A question/answer pair. The question text identifies the card within its set.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Card {
    pub question: String,
    pub answer: String,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

impl<Q: Into<String>, A: Into<String>> From<(Q, A)> for Card {
    fn from((question, answer): (Q, A)) -> Self {
        Self::new(question, answer)
    }
}

// Self-reported recall status of a card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Unseen,
    Known,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unseen => "unseen",
            Self::Known => "known",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
