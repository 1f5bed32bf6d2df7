use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HISTORY_CAP: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
    Flashcards,
    Writing,
    Listening,
    Quiz,
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flashcards => "Flashcards",
            Self::Writing => "Writing",
            Self::Listening => "Listening",
            Self::Quiz => "Quiz",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PracticeResult {
    pub mode: PracticeMode,
    pub level: String,
    pub correct: usize,
    pub incorrect: usize,
    pub questions: usize,
    pub timestamp: DateTime<Utc>,
}

impl PracticeResult {
    /// Share of answered questions that were right, 0.0..=1.0.
    pub fn accuracy(&self) -> f64 {
        let answered = self.correct + self.incorrect;
        if answered == 0 {
            0.0
        } else {
            self.correct as f64 / answered as f64
        }
    }
}

/// Append a result, dropping the oldest entries past `HISTORY_CAP`.
pub fn push_capped(history: &mut Vec<PracticeResult>, result: PracticeResult) {
    history.push(result);
    if history.len() > HISTORY_CAP {
        let excess = history.len() - HISTORY_CAP;
        history.drain(..excess);
    }
}
