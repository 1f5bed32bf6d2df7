use crate::hangul::composer::Composer;
use crate::hangul::jamo;

/// A key press after it has been translated from the terminal event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Jamo(char),
    Space,
    Return,
    Backspace,
    ShiftToggle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Edited,
    Submit,
    Ignored,
}

/// Answer box for the writing/listening drills and typed quiz questions.
#[derive(Clone, Debug, Default)]
pub struct AnswerInput {
    composer: Composer,
    /// One-shot shift from the on-screen keyboard; released after the next jamo.
    pub shift_latched: bool,
    /// Set while feedback is on screen; every keystroke is ignored.
    pub locked: bool,
}

impl AnswerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        self.composer.text()
    }

    pub fn is_empty(&self) -> bool {
        self.composer.is_empty()
    }

    /// Clear the text and shift latch and unlock.
    pub fn reset(&mut self) {
        self.composer.clear();
        self.shift_latched = false;
        self.locked = false;
    }

    pub fn process(&mut self, key: Keystroke) -> InputOutcome {
        if self.locked {
            return InputOutcome::Ignored;
        }
        match key {
            Keystroke::Jamo(ch) => {
                let ch = if std::mem::take(&mut self.shift_latched) {
                    jamo::tense_variant(ch).unwrap_or(ch)
                } else {
                    ch
                };
                self.composer.push(ch);
                InputOutcome::Edited
            }
            Keystroke::Space => {
                self.composer.push_space();
                InputOutcome::Edited
            }
            Keystroke::Backspace => {
                if self.composer.is_empty() {
                    return InputOutcome::Ignored;
                }
                self.composer.backspace();
                InputOutcome::Edited
            }
            Keystroke::ShiftToggle => {
                self.shift_latched = !self.shift_latched;
                InputOutcome::Edited
            }
            Keystroke::Return => InputOutcome::Submit,
        }
    }
}
