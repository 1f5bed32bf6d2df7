use std::time::{Duration, Instant};

use rand::Rng;

use crate::engine::grading;
use crate::engine::selector::pick_next;
use crate::session::input::{AnswerInput, InputOutcome, Keystroke};
use crate::store::schema::{MasteryKind, Word};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillKind {
    /// Shown the translation, type the hangul.
    Writing,
    /// Hear the word, type the hangul.
    Listening,
}

impl DrillKind {
    pub fn mastery(self) -> MasteryKind {
        match self {
            Self::Writing => MasteryKind::Writing,
            Self::Listening => MasteryKind::Listening,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect { expected: String },
}

/// Outcome of a submitted answer. Only a correct one sets a flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
    pub word: Word,
    pub kind: MasteryKind,
    pub correct: bool,
}

pub struct DrillSession {
    pub kind: DrillKind,
    pool: Vec<Word>,
    current: Option<usize>,
    pub input: AnswerInput,
    pub feedback: Option<Feedback>,
    advance_at: Option<Instant>,
    pub correct_count: usize,
    pub incorrect_count: usize,
}

impl DrillSession {
    pub fn new<R: Rng + ?Sized>(kind: DrillKind, pool: Vec<Word>, rng: &mut R) -> Self {
        let current = pick_next(pool.len(), None, rng);
        Self {
            kind,
            pool,
            current,
            input: AnswerInput::new(),
            feedback: None,
            advance_at: None,
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.current.and_then(|i| self.pool.get(i))
    }

    /// Feed a key to the answer box; Return submits.
    pub fn keystroke(&mut self, key: Keystroke, now: Instant, advance: Duration) -> Option<Verdict> {
        match self.input.process(key) {
            InputOutcome::Submit => self.submit(now, advance),
            InputOutcome::Edited | InputOutcome::Ignored => None,
        }
    }

    /// Grade the typed answer. A correct answer advances by itself after
    /// `advance`; a wrong one waits for `next_word`.
    pub fn submit(&mut self, now: Instant, advance: Duration) -> Option<Verdict> {
        if self.feedback.is_some() || self.input.is_empty() {
            return None;
        }
        let word = self.current_word()?.clone();
        let kind = self.kind.mastery();
        let correct = grading::is_correct(kind, &word, self.input.text());
        self.input.locked = true;
        if correct {
            self.correct_count += 1;
            self.feedback = Some(Feedback::Correct);
            self.advance_at = Some(now + advance);
        } else {
            self.incorrect_count += 1;
            self.feedback = Some(Feedback::Incorrect {
                expected: word.hangul.clone(),
            });
        }
        Some(Verdict {
            word,
            kind,
            correct,
        })
    }

    /// Pick another word, avoiding an immediate repeat where possible.
    pub fn next_word<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Word> {
        self.current = pick_next(self.pool.len(), self.current, rng);
        self.input.reset();
        self.feedback = None;
        self.advance_at = None;
        self.current_word()
    }

    /// Returns true when the pending auto-advance fired.
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        match self.advance_at {
            Some(at) if now >= at => {
                self.next_word(rng);
                true
            }
            _ => false,
        }
    }
}
