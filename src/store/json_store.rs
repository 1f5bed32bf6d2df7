use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use rust_embed::Embed;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::{HistoryData, ProgressData, UserWordProgress, VocabularyData, Word, WordId};
use crate::store::{StoreResult, VocabStore};

#[derive(Embed)]
#[folder = "assets/vocabulary/"]
struct BundledVocabulary;

const VOCABULARY_FILE: &str = "vocabulary.json";
const PROGRESS_FILE: &str = "progress.json";
const HISTORY_FILE: &str = "history.json";
const BUNDLED_WORDS: &str = "words.json";

/// Local backend: one directory of pretty-printed JSON files.
pub struct JsonStore {
    base_dir: PathBuf,
    vocabulary: Option<Vec<Word>>,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hanmadi");
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            vocabulary: None,
        })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            vocabulary: None,
        })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!(file = name, error = %e, "discarding unreadable store file");
                    T::default()
                }),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    /// Strict variant of `load` for data the user would lose silently.
    fn load_strict<T: DeserializeOwned + Default>(&self, name: &str) -> StoreResult<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> StoreResult<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Words from `vocabulary.json` in the data dir if present, else the
    /// bundled list. Loaded once per store.
    fn vocabulary(&mut self) -> StoreResult<&[Word]> {
        if self.vocabulary.is_none() {
            let path = self.file_path(VOCABULARY_FILE);
            let data: VocabularyData = if path.exists() {
                let content = fs::read_to_string(&path)?;
                serde_json::from_str(&content)?
            } else {
                match BundledVocabulary::get(BUNDLED_WORDS) {
                    Some(file) => serde_json::from_slice(file.data.as_ref())?,
                    None => VocabularyData::default(),
                }
            };
            tracing::debug!(count = data.words.len(), "vocabulary loaded");
            self.vocabulary = Some(data.words);
        }
        Ok(self.vocabulary.as_deref().unwrap_or_default())
    }

    pub fn load_history(&self) -> HistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)?;
        Ok(())
    }
}

impl VocabStore for JsonStore {
    fn fetch_words(&mut self, level: &str) -> StoreResult<Vec<Word>> {
        Ok(self
            .vocabulary()?
            .iter()
            .filter(|w| w.level == level)
            .cloned()
            .collect())
    }

    fn fetch_all_words(&mut self) -> StoreResult<Vec<Word>> {
        Ok(self.vocabulary()?.to_vec())
    }

    fn fetch_progress(
        &mut self,
        user_id: &str,
        word_ids: Option<&[WordId]>,
    ) -> StoreResult<Vec<UserWordProgress>> {
        let data: ProgressData = self.load_strict(PROGRESS_FILE)?;
        Ok(data
            .rows
            .into_iter()
            .filter(|row| row.user_id == user_id)
            .filter(|row| word_ids.is_none_or(|ids| ids.contains(&row.word_id)))
            .collect())
    }

    fn upsert_progress(&mut self, rows: &[UserWordProgress]) -> StoreResult<()> {
        let mut data: ProgressData = self.load_strict(PROGRESS_FILE)?;
        for row in rows {
            match data
                .rows
                .iter_mut()
                .find(|r| r.user_id == row.user_id && r.word_id == row.word_id)
            {
                Some(existing) => *existing = row.clone(),
                None => data.rows.push(row.clone()),
            }
        }
        self.save(PROGRESS_FILE, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::session::result::{PracticeMode, PracticeResult};
    use crate::store::schema::MasteryKind;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    const ID_A: &str = "00000000-0000-4000-8000-00000000000a";
    const ID_B: &str = "00000000-0000-4000-8000-00000000000b";

    #[test]
    fn test_bundled_vocabulary_is_used_without_override() {
        let (_dir, mut store) = make_test_store();
        let words = store.fetch_all_words().unwrap();
        assert!(!words.is_empty());
        let level = words[0].level.clone();
        let by_level = store.fetch_words(&level).unwrap();
        assert!(by_level.iter().all(|w| w.level == level));
    }

    #[test]
    fn test_vocabulary_override_file() {
        let (dir, mut store) = make_test_store();
        let json = format!(
            r#"{{"schema_version":1,"words":[
                {{"id":"{ID_A}","hangul":"물","translation":"water","level":"1A","unit":2}}
            ]}}"#
        );
        fs::write(dir.path().join(VOCABULARY_FILE), json).unwrap();
        let words = store.fetch_words("1A").unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].hangul, "물");
        assert!(store.fetch_words("2A").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_vocabulary_is_an_error() {
        let (dir, mut store) = make_test_store();
        fs::write(dir.path().join(VOCABULARY_FILE), "{not json").unwrap();
        assert!(matches!(store.fetch_all_words(), Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let (_dir, mut store) = make_test_store();
        let mut row = UserWordProgress::new("mina", WordId::new(ID_A));
        store.upsert_progress(&[row.clone()]).unwrap();

        row.set_flag(MasteryKind::Writing);
        store.upsert_progress(&[row.clone()]).unwrap();

        let rows = store.fetch_progress("mina", None).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].writing);
    }

    #[test]
    fn test_fetch_progress_filters_user_and_ids() {
        let (_dir, mut store) = make_test_store();
        store
            .upsert_progress(&[
                UserWordProgress::new("mina", WordId::new(ID_A)),
                UserWordProgress::new("mina", WordId::new(ID_B)),
                UserWordProgress::new("joon", WordId::new(ID_A)),
            ])
            .unwrap();

        assert_eq!(store.fetch_progress("mina", None).unwrap().len(), 2);
        let only_a = store
            .fetch_progress("mina", Some(&[WordId::new(ID_A)]))
            .unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].word_id.as_str(), ID_A);
        assert!(store.fetch_progress("nobody", None).unwrap().is_empty());
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let (dir, mut store) = make_test_store();
        store
            .upsert_progress(&[UserWordProgress::new("mina", WordId::new(ID_A))])
            .unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_history_round_trip_and_corrupt_fallback() {
        let (dir, store) = make_test_store();
        let mut history = HistoryData::default();
        history.results.push(PracticeResult {
            mode: PracticeMode::Quiz,
            level: "1A".into(),
            correct: 7,
            incorrect: 3,
            questions: 10,
            timestamp: Utc::now(),
        });
        store.save_history(&history).unwrap();
        assert_eq!(store.load_history().results.len(), 1);

        fs::write(dir.path().join(HISTORY_FILE), "garbage").unwrap();
        assert!(store.load_history().results.is_empty());
    }
}
