use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::store::schema::{MasteryKind, UserWordProgress, Word, WordId};

pub const DEFAULT_QUIZ_SIZE: usize = 10;
const MAX_DISTRACTORS: usize = 3;

fn rows_by_word(rows: &[UserWordProgress]) -> HashMap<&WordId, &UserWordProgress> {
    rows.iter().map(|r| (&r.word_id, r)).collect()
}

/// Words still shown as flashcards (a missing row counts as visible), shuffled.
pub fn flashcard_deck<R: Rng + ?Sized>(
    words: &[Word],
    rows: &[UserWordProgress],
    rng: &mut R,
) -> Vec<Word> {
    let by_word = rows_by_word(rows);
    let mut deck: Vec<Word> = words
        .iter()
        .filter(|w| by_word.get(&w.id).is_none_or(|r| r.show_flashcard))
        .cloned()
        .collect();
    deck.shuffle(rng);
    deck
}

/// Random index into a pool of `pool_len`, avoiding `previous` with a single
/// retry. A repeat is still possible, just less likely.
pub fn pick_next<R: Rng + ?Sized>(
    pool_len: usize,
    previous: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    if pool_len == 0 {
        return None;
    }
    let mut index = rng.gen_range(0..pool_len);
    if pool_len > 1 && previous == Some(index) {
        index = rng.gen_range(0..pool_len);
    }
    Some(index)
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuizQuestion {
    pub word: Word,
    pub kind: MasteryKind,
    /// Multiple-choice translations; only filled for meaning questions.
    pub options: Vec<String>,
}

/// One question per word and unsatisfied mastery kind (writing, listening,
/// meaning order), shuffled and cut down to `size`.
pub fn build_quiz<R: Rng + ?Sized>(
    words: &[Word],
    rows: &[UserWordProgress],
    size: usize,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let by_word = rows_by_word(rows);
    let mut candidates = Vec::new();
    for word in words {
        let row = by_word.get(&word.id);
        for kind in MasteryKind::ALL {
            if row.is_some_and(|r| r.flag(kind)) {
                continue;
            }
            let options = match kind {
                MasteryKind::Meaning => meaning_options(word, words, rng),
                _ => Vec::new(),
            };
            candidates.push(QuizQuestion {
                word: word.clone(),
                kind,
                options,
            });
        }
    }
    candidates.shuffle(rng);
    candidates.truncate(size);
    candidates
}

fn meaning_options<R: Rng + ?Sized>(word: &Word, pool: &[Word], rng: &mut R) -> Vec<String> {
    let correct = word.translation.to_lowercase();
    let mut others: Vec<&str> = pool
        .iter()
        .filter(|w| w.id != word.id)
        .map(|w| w.translation.as_str())
        .collect();
    others.shuffle(rng);

    let mut options = vec![word.translation.clone()];
    for translation in others {
        if options.len() > MAX_DISTRACTORS {
            break;
        }
        let lower = translation.to_lowercase();
        if lower == correct || options.iter().any(|o| o.to_lowercase() == lower) {
            continue;
        }
        options.push(translation.to_string());
    }
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn word(n: u32, translation: &str) -> Word {
        Word {
            id: WordId::new(format!("00000000-0000-4000-8000-{n:012}")),
            hangul: format!("단어{n}"),
            translation: translation.into(),
            level: "1A".into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_deck_skips_hidden_cards() {
        let words = vec![word(1, "a"), word(2, "b"), word(3, "c")];
        let mut hidden = UserWordProgress::new("u", words[1].id.clone());
        hidden.show_flashcard = false;
        let visible = UserWordProgress::new("u", words[2].id.clone());
        let deck = flashcard_deck(&words, &[hidden, visible], &mut rng());
        assert_eq!(deck.len(), 2);
        assert!(deck.iter().all(|w| w.id != words[1].id));
    }

    #[test]
    fn test_pick_next_pool_of_one_and_empty() {
        let mut rng = rng();
        assert_eq!(pick_next(0, None, &mut rng), None);
        for _ in 0..20 {
            assert_eq!(pick_next(1, Some(0), &mut rng), Some(0));
        }
    }

    #[test]
    fn test_pick_next_stays_in_range() {
        let mut rng = rng();
        let mut previous = None;
        for _ in 0..200 {
            let index = pick_next(5, previous, &mut rng).unwrap();
            assert!(index < 5);
            previous = Some(index);
        }
    }

    #[test]
    fn test_unlearned_word_gives_three_questions() {
        let words = vec![word(1, "apple")];
        let quiz = build_quiz(&words, &[], DEFAULT_QUIZ_SIZE, &mut rng());
        assert_eq!(quiz.len(), 3);
        let mut kinds: Vec<MasteryKind> = quiz.iter().map(|q| q.kind).collect();
        kinds.sort_by_key(|k| MasteryKind::ALL.iter().position(|x| x == k));
        assert_eq!(kinds, MasteryKind::ALL.to_vec());
    }

    #[test]
    fn test_satisfied_kinds_are_never_asked() {
        let words = vec![word(1, "apple"), word(2, "pear")];
        let mut row = UserWordProgress::new("u", words[0].id.clone());
        row.writing = true;
        row.meaning = true;
        let quiz = build_quiz(&words, &[row], DEFAULT_QUIZ_SIZE, &mut rng());
        assert_eq!(quiz.len(), 4);
        assert!(
            quiz.iter()
                .filter(|q| q.word.id == words[0].id)
                .all(|q| q.kind == MasteryKind::Listening)
        );
    }

    #[test]
    fn test_quiz_is_truncated_to_size() {
        let words: Vec<Word> = (1..=8).map(|n| word(n, &format!("w{n}"))).collect();
        let quiz = build_quiz(&words, &[], 10, &mut rng());
        assert_eq!(quiz.len(), 10);
    }

    #[test]
    fn test_meaning_options_contain_answer_and_unique_distractors() {
        let words = vec![
            word(1, "Apple"),
            word(2, "apple"),
            word(3, "pear"),
            word(4, "pear"),
            word(5, "grape"),
            word(6, "plum"),
            word(7, "fig"),
        ];
        let quiz = build_quiz(&words[..1], &[], 10, &mut rng());
        assert!(quiz.iter().all(|q| q.kind != MasteryKind::Meaning || q.options.len() == 1));

        let options = meaning_options(&words[0], &words, &mut rng());
        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| o.eq_ignore_ascii_case("apple")).count(), 1);
        let mut lowered: Vec<String> = options.iter().map(|o| o.to_lowercase()).collect();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), 4);
    }

    #[test]
    fn test_same_seed_same_quiz() {
        let words: Vec<Word> = (1..=6).map(|n| word(n, &format!("w{n}"))).collect();
        let a = build_quiz(&words, &[], 10, &mut rng());
        let b = build_quiz(&words, &[], 10, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_word_list_gives_empty_quiz() {
        assert!(build_quiz(&[], &[], 10, &mut rng()).is_empty());
    }
}
