use icu_normalizer::ComposingNormalizerBorrowed;

use crate::store::schema::{MasteryKind, Word};

/// Trim and NFC-normalize typed text so decomposed jamo input compares equal
/// to precomposed syllables.
pub fn normalize_answer(answer: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(answer.trim())
        .into_owned()
}

/// Writing and listening answers must match the hangul exactly; meaning
/// answers match the translation ignoring case.
pub fn is_correct(kind: MasteryKind, word: &Word, answer: &str) -> bool {
    match kind {
        MasteryKind::Writing | MasteryKind::Listening => {
            normalize_answer(answer) == normalize_answer(&word.hangul)
        }
        MasteryKind::Meaning => {
            answer.trim().to_lowercase() == word.translation.trim().to_lowercase()
        }
    }
}
