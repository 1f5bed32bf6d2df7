use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::result::PracticeResult;

pub const SCHEMA_VERSION: u32 = 1;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern is valid")
});

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub String);

impl WordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Ids are canonical UUIDs; anything else never enters a working set.
    pub fn is_well_formed(&self) -> bool {
        UUID_RE.is_match(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub hangul: String,
    pub translation: String,
    pub level: String,
    #[serde(default)]
    pub unit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_context_translation: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MasteryKind {
    Writing,
    Listening,
    Meaning,
}

impl MasteryKind {
    /// Question order used when building a quiz.
    pub const ALL: [MasteryKind; 3] = [Self::Writing, Self::Listening, Self::Meaning];

    pub fn label(self) -> &'static str {
        match self {
            Self::Writing => "Writing",
            Self::Listening => "Listening",
            Self::Meaning => "Meaning",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-user learning state for one word. Rows are created on first write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWordProgress {
    pub user_id: String,
    pub word_id: WordId,
    #[serde(default)]
    pub writing: bool,
    #[serde(default)]
    pub listening: bool,
    #[serde(default)]
    pub meaning: bool,
    #[serde(rename = "showFlashcard", default = "default_true")]
    pub show_flashcard: bool,
}

impl UserWordProgress {
    pub fn new(user_id: &str, word_id: WordId) -> Self {
        Self {
            user_id: user_id.to_string(),
            word_id,
            writing: false,
            listening: false,
            meaning: false,
            show_flashcard: true,
        }
    }

    pub fn is_fully_learned(&self) -> bool {
        self.writing && self.listening && self.meaning
    }

    pub fn flag(&self, kind: MasteryKind) -> bool {
        match kind {
            MasteryKind::Writing => self.writing,
            MasteryKind::Listening => self.listening,
            MasteryKind::Meaning => self.meaning,
        }
    }

    pub fn set_flag(&mut self, kind: MasteryKind) {
        match kind {
            MasteryKind::Writing => self.writing = true,
            MasteryKind::Listening => self.listening = true,
            MasteryKind::Meaning => self.meaning = true,
        }
    }

    pub fn reset_mastery(&mut self) {
        self.writing = false;
        self.listening = false;
        self.meaning = false;
    }
}

/// Drop words whose id is not a well-formed UUID, logging each one.
pub fn retain_well_formed(words: Vec<Word>) -> Vec<Word> {
    words
        .into_iter()
        .filter(|word| {
            let ok = word.id.is_well_formed();
            if !ok {
                tracing::warn!(id = %word.id, hangul = %word.hangul, "skipping word with malformed id");
            }
            ok
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VocabularyData {
    pub schema_version: u32,
    pub words: Vec<Word>,
}

impl Default for VocabularyData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            words: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub rows: Vec<UserWordProgress>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            rows: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub results: Vec<PracticeResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str) -> Word {
        Word {
            id: WordId::new(id),
            hangul: "사과".into(),
            translation: "apple".into(),
            level: "1A".into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    #[test]
    fn test_word_id_well_formed() {
        assert!(WordId::new("123e4567-e89b-12d3-a456-426614174000").is_well_formed());
        assert!(WordId::new("123E4567-E89B-12D3-A456-426614174000").is_well_formed());
        assert!(!WordId::new("").is_well_formed());
        assert!(!WordId::new("not-a-uuid").is_well_formed());
        assert!(!WordId::new("123e4567e89b12d3a456426614174000").is_well_formed());
    }

    #[test]
    fn test_retain_well_formed_drops_bad_ids() {
        let words = vec![
            word("123e4567-e89b-12d3-a456-426614174000"),
            word("42"),
            word(""),
        ];
        let kept = retain_well_formed(words);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_progress_row_defaults_and_rename() {
        let row: UserWordProgress =
            serde_json::from_str(r#"{"user_id":"u","word_id":"w","writing":true}"#).unwrap();
        assert!(row.writing);
        assert!(!row.listening);
        assert!(row.show_flashcard);

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"showFlashcard\":true"));
    }

    #[test]
    fn test_fully_learned_needs_all_three() {
        let mut row = UserWordProgress::new("u", WordId::new("w"));
        row.set_flag(MasteryKind::Writing);
        row.set_flag(MasteryKind::Listening);
        assert!(!row.is_fully_learned());
        row.set_flag(MasteryKind::Meaning);
        assert!(row.is_fully_learned());
        row.reset_mastery();
        assert!(!row.flag(MasteryKind::Meaning));
        assert!(row.show_flashcard);
    }
}
