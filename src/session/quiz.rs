use std::time::{Duration, Instant};

use chrono::Utc;

use crate::engine::grading;
use crate::engine::selector::QuizQuestion;
use crate::session::drill::{Feedback, Verdict};
use crate::session::input::{AnswerInput, InputOutcome, Keystroke};
use crate::session::result::{PracticeMode, PracticeResult};
use crate::store::schema::MasteryKind;

pub struct QuizSession {
    pub level: String,
    questions: Vec<QuizQuestion>,
    index: usize,
    pub input: AnswerInput,
    pub selected_option: usize,
    pub feedback: Option<Feedback>,
    advance_at: Option<Instant>,
    pub correct_count: usize,
    pub incorrect_count: usize,
}

impl QuizSession {
    pub fn new(level: &str, questions: Vec<QuizQuestion>) -> Self {
        Self {
            level: level.to_string(),
            questions,
            index: 0,
            input: AnswerInput::new(),
            selected_option: 0,
            feedback: None,
            advance_at: None,
            correct_count: 0,
            incorrect_count: 0,
        }
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// A quiz with no questions is complete from the start.
    pub fn is_completed(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// `floor(index / len * 100)`; 100 once there is nothing left to ask.
    pub fn progress_percent(&self) -> u16 {
        if self.questions.is_empty() {
            return 100;
        }
        (self.index * 100 / self.questions.len()) as u16
    }

    fn is_multiple_choice(&self) -> bool {
        self.current()
            .is_some_and(|q| q.kind == MasteryKind::Meaning && !q.options.is_empty())
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.feedback.is_some() {
            return;
        }
        let Some(question) = self.current() else {
            return;
        };
        let count = question.options.len();
        if count == 0 {
            return;
        }
        self.selected_option = (self.selected_option as isize + delta).rem_euclid(count as isize) as usize;
    }

    pub fn keystroke(&mut self, key: Keystroke, now: Instant, advance: Duration) -> Option<Verdict> {
        if self.is_multiple_choice() {
            return match key {
                Keystroke::Return => self.submit(now, advance),
                _ => None,
            };
        }
        match self.input.process(key) {
            InputOutcome::Submit => self.submit(now, advance),
            InputOutcome::Edited | InputOutcome::Ignored => None,
        }
    }

    /// Grade the selected option (meaning) or the typed answer. Correct
    /// answers advance after `advance`; wrong ones reveal the answer and wait.
    pub fn submit(&mut self, now: Instant, advance: Duration) -> Option<Verdict> {
        if self.feedback.is_some() {
            return None;
        }
        let question = self.current()?.clone();
        let answer = if self.is_multiple_choice() {
            question.options.get(self.selected_option)?.clone()
        } else {
            if self.input.is_empty() {
                return None;
            }
            self.input.text().to_string()
        };
        let correct = grading::is_correct(question.kind, &question.word, &answer);
        self.input.locked = true;
        if correct {
            self.correct_count += 1;
            self.feedback = Some(Feedback::Correct);
            self.advance_at = Some(now + advance);
        } else {
            self.incorrect_count += 1;
            let expected = match question.kind {
                MasteryKind::Meaning => question.word.translation.clone(),
                MasteryKind::Writing | MasteryKind::Listening => question.word.hangul.clone(),
            };
            self.feedback = Some(Feedback::Incorrect { expected });
        }
        Some(Verdict {
            word: question.word,
            kind: question.kind,
            correct,
        })
    }

    /// Move to the next question. Only valid once the current one was graded.
    pub fn next(&mut self) -> Option<&QuizQuestion> {
        if self.feedback.is_none() || self.is_completed() {
            return self.current();
        }
        self.index += 1;
        self.input.reset();
        self.selected_option = 0;
        self.feedback = None;
        self.advance_at = None;
        self.current()
    }

    /// Returns true when the pending auto-advance fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.advance_at {
            Some(at) if now >= at => {
                self.next();
                true
            }
            _ => false,
        }
    }

    pub fn result(&self) -> PracticeResult {
        PracticeResult {
            mode: PracticeMode::Quiz,
            level: self.level.clone(),
            correct: self.correct_count,
            incorrect: self.incorrect_count,
            questions: self.questions.len(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{Word, WordId};

    const ADVANCE: Duration = Duration::from_millis(1000);

    fn word() -> Word {
        Word {
            id: WordId::new("00000000-0000-4000-8000-000000000001"),
            hangul: "물".into(),
            translation: "Water".into(),
            level: "1A".into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    fn question(kind: MasteryKind) -> QuizQuestion {
        let options = match kind {
            MasteryKind::Meaning => vec!["fire".into(), "Water".into(), "tree".into()],
            _ => Vec::new(),
        };
        QuizQuestion {
            word: word(),
            kind,
            options,
        }
    }

    #[test]
    fn test_empty_quiz_is_completed() {
        let quiz = QuizSession::new("1A", Vec::new());
        assert!(quiz.is_completed());
        assert_eq!(quiz.progress_percent(), 100);
        assert_eq!(quiz.result().questions, 0);
    }

    #[test]
    fn test_typed_answer_correct_advances_after_delay() {
        let mut quiz = QuizSession::new("1A", vec![question(MasteryKind::Writing), question(MasteryKind::Listening)]);
        let now = Instant::now();
        for ch in "ㅁㅜㄹ".chars() {
            quiz.keystroke(Keystroke::Jamo(ch), now, ADVANCE);
        }
        let verdict = quiz.keystroke(Keystroke::Return, now, ADVANCE).unwrap();
        assert!(verdict.correct);
        assert_eq!(quiz.progress_percent(), 0);
        assert!(!quiz.tick(now + Duration::from_millis(999)));
        assert!(quiz.tick(now + ADVANCE));
        assert_eq!(quiz.index(), 1);
        assert_eq!(quiz.progress_percent(), 50);
    }

    #[test]
    fn test_multiple_choice_selection() {
        let mut quiz = QuizSession::new("1A", vec![question(MasteryKind::Meaning)]);
        let now = Instant::now();
        quiz.move_selection(-1);
        assert_eq!(quiz.selected_option, 2);
        quiz.move_selection(2);
        assert_eq!(quiz.selected_option, 1);
        let verdict = quiz.keystroke(Keystroke::Return, now, ADVANCE).unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.kind, MasteryKind::Meaning);
    }

    #[test]
    fn test_wrong_answer_reveals_and_waits_for_next() {
        let mut quiz = QuizSession::new("1A", vec![question(MasteryKind::Meaning)]);
        let now = Instant::now();
        let verdict = quiz.submit(now, ADVANCE).unwrap();
        assert!(!verdict.correct);
        assert_eq!(
            quiz.feedback,
            Some(Feedback::Incorrect {
                expected: "Water".into()
            })
        );
        assert!(!quiz.tick(now + Duration::from_secs(60)));
        assert!(quiz.submit(now, ADVANCE).is_none());
        quiz.next();
        assert!(quiz.is_completed());
        let result = quiz.result();
        assert_eq!((result.correct, result.incorrect, result.questions), (0, 1, 1));
    }

    #[test]
    fn test_next_before_answer_is_noop() {
        let mut quiz = QuizSession::new("1A", vec![question(MasteryKind::Writing)]);
        quiz.next();
        assert_eq!(quiz.index(), 0);
    }
}
