use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::curriculum::LevelInfo;
use crate::store::schema::{MasteryKind, UserWordProgress, Word, WordId};

pub const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelProgress {
    pub known: usize,
    pub total: usize,
}

impl LevelProgress {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.known as f64 / self.total as f64
        }
    }
}

impl fmt::Display for LevelProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.known, self.total)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSummary {
    pub level: &'static str,
    pub description: &'static str,
    pub progress: LevelProgress,
}

/// Per-level word counts and fully learned counts.
///
/// Rows are joined to a level through the word list; rows for words that are
/// not in `words` are ignored and each word counts at most once, so `known`
/// never exceeds `total`.
pub fn level_progress(
    words: &[Word],
    rows: &[UserWordProgress],
) -> BTreeMap<String, LevelProgress> {
    let mut levels: BTreeMap<String, LevelProgress> = BTreeMap::new();
    let mut level_of: HashMap<&WordId, &str> = HashMap::new();
    for word in words {
        if level_of.insert(&word.id, word.level.as_str()).is_none() {
            levels.entry(word.level.clone()).or_default().total += 1;
        }
    }

    let mut counted: HashSet<&WordId> = HashSet::new();
    for row in rows.iter().filter(|r| r.is_fully_learned()) {
        let Some(level) = level_of.get(&row.word_id) else {
            continue;
        };
        if counted.insert(&row.word_id)
            && let Some(progress) = levels.get_mut(*level)
        {
            progress.known += 1;
        }
    }
    levels
}

/// One summary per catalog level, in catalog order. Levels with no words
/// read `0/0`.
pub fn summarize_levels(
    catalog: &[LevelInfo],
    words: &[Word],
    rows: &[UserWordProgress],
) -> Vec<LevelSummary> {
    let progress = level_progress(words, rows);
    catalog
        .iter()
        .map(|info| LevelSummary {
            level: info.tag,
            description: info.description,
            progress: progress.get(info.tag).copied().unwrap_or_default(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct WordStatus {
    pub word: Word,
    pub is_learned: bool,
}

pub fn word_statuses(words: &[Word], rows: &[UserWordProgress]) -> Vec<WordStatus> {
    let learned: HashSet<&WordId> = rows
        .iter()
        .filter(|r| r.is_fully_learned())
        .map(|r| &r.word_id)
        .collect();
    words
        .iter()
        .map(|word| WordStatus {
            word: word.clone(),
            is_learned: learned.contains(&word.id),
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WordFilter {
    #[default]
    All,
    Learned,
    NotLearned,
}

impl WordFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Learned => "Learned",
            Self::NotLearned => "Not learned",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Learned,
            Self::Learned => Self::NotLearned,
            Self::NotLearned => Self::All,
        }
    }

    pub fn matches(self, status: &WordStatus) -> bool {
        match self {
            Self::All => true,
            Self::Learned => status.is_learned,
            Self::NotLearned => !status.is_learned,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a WordStatus>,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Filter and slice the word list. `page` is 1-based and clamped into range;
/// an empty list has one (empty) page.
pub fn paginate<'a>(
    statuses: &'a [WordStatus],
    filter: WordFilter,
    page: usize,
    page_size: usize,
) -> Page<'a> {
    let page_size = page_size.max(1);
    let filtered: Vec<&WordStatus> = statuses.iter().filter(|s| filter.matches(s)).collect();
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let items = filtered
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Flashcard progress for a level: words hidden from the deck count as learned.
pub fn flashcard_progress(words: &[Word], rows: &[UserWordProgress]) -> LevelProgress {
    let hidden: HashSet<&WordId> = rows
        .iter()
        .filter(|r| !r.show_flashcard)
        .map(|r| &r.word_id)
        .collect();
    LevelProgress {
        known: words.iter().filter(|w| hidden.contains(&w.id)).count(),
        total: words.len(),
    }
}

/// How many of `words` have the given mastery flag set.
pub fn mastery_progress(
    words: &[Word],
    rows: &[UserWordProgress],
    kind: MasteryKind,
) -> LevelProgress {
    let mastered: HashSet<&WordId> = rows
        .iter()
        .filter(|r| r.flag(kind))
        .map(|r| &r.word_id)
        .collect();
    LevelProgress {
        known: words.iter().filter(|w| mastered.contains(&w.id)).count(),
        total: words.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::LEVELS;

    fn word(n: u32, level: &str) -> Word {
        Word {
            id: WordId::new(format!("00000000-0000-4000-8000-{n:012}")),
            hangul: format!("단어{n}"),
            translation: format!("word {n}"),
            level: level.into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    fn learned(word: &Word) -> UserWordProgress {
        let mut row = UserWordProgress::new("u", word.id.clone());
        row.writing = true;
        row.listening = true;
        row.meaning = true;
        row
    }

    #[test]
    fn test_one_of_two_learned() {
        let words = vec![word(1, "1A"), word(2, "1A")];
        let rows = vec![learned(&words[0])];
        let progress = level_progress(&words, &rows);
        assert_eq!(progress["1A"].to_string(), "1/2");
    }

    #[test]
    fn test_partial_rows_do_not_count() {
        let words = vec![word(1, "1A")];
        let mut row = learned(&words[0]);
        row.meaning = false;
        let progress = level_progress(&words, &[row]);
        assert_eq!(progress["1A"], LevelProgress { known: 0, total: 1 });
    }

    #[test]
    fn test_orphan_and_duplicate_rows_never_exceed_total() {
        let words = vec![word(1, "2B")];
        let stranger = word(99, "2B");
        let rows = vec![learned(&words[0]), learned(&words[0]), learned(&stranger)];
        let progress = level_progress(&words, &rows);
        assert_eq!(progress["2B"], LevelProgress { known: 1, total: 1 });
    }

    #[test]
    fn test_summaries_follow_catalog_and_show_empty_levels() {
        let words = vec![word(1, "1B")];
        let summaries = summarize_levels(&LEVELS, &words, &[]);
        assert_eq!(summaries.len(), 12);
        assert_eq!(summaries[0].level, "1A");
        assert_eq!(summaries[0].progress.to_string(), "0/0");
        assert_eq!(summaries[1].progress.to_string(), "0/1");
    }

    #[test]
    fn test_filter_and_paginate() {
        let words: Vec<Word> = (1..=25).map(|n| word(n, "1A")).collect();
        let rows: Vec<UserWordProgress> = words.iter().take(5).map(learned).collect();
        let statuses = word_statuses(&words, &rows);

        let page = paginate(&statuses, WordFilter::All, 3, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);

        let page = paginate(&statuses, WordFilter::Learned, 9, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_items, 5);

        let page = paginate(&statuses, WordFilter::NotLearned, 0, 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 20);
    }

    #[test]
    fn test_paginate_empty_has_one_page() {
        let page = paginate(&[], WordFilter::All, 4, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_flashcard_progress_counts_hidden_cards() {
        let words = vec![word(1, "1A"), word(2, "1A")];
        let mut hidden = UserWordProgress::new("u", words[0].id.clone());
        hidden.show_flashcard = false;
        let progress = flashcard_progress(&words, &[hidden]);
        assert_eq!(progress, LevelProgress { known: 1, total: 2 });
        assert!((progress.ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mastery_progress_counts_one_flag() {
        let words = vec![word(1, "1A"), word(2, "1A"), word(3, "1A")];
        let mut row = UserWordProgress::new("u", words[0].id.clone());
        row.listening = true;
        let rows = vec![row, learned(&words[1])];
        assert_eq!(
            mastery_progress(&words, &rows, MasteryKind::Listening),
            LevelProgress { known: 2, total: 3 }
        );
        assert_eq!(mastery_progress(&words, &rows, MasteryKind::Writing).known, 1);
    }
}
