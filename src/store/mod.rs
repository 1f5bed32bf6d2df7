pub mod json_store;
#[cfg(feature = "network")]
pub mod remote;
pub mod schema;
pub mod sync;
pub mod worker;

use thiserror::Error;

use crate::store::schema::{UserWordProgress, Word, WordId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse store data: {0}")]
    Parse(#[from] serde_json::Error),
    #[cfg(feature = "network")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote backend is not configured: {0}")]
    NotConfigured(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to word lists and per-user progress rows.
///
/// Implementations block; the UI only ever calls them from the store worker.
pub trait VocabStore: Send {
    fn fetch_words(&mut self, level: &str) -> StoreResult<Vec<Word>>;

    fn fetch_all_words(&mut self) -> StoreResult<Vec<Word>>;

    /// Progress rows for `user_id`, restricted to `word_ids` when given.
    fn fetch_progress(
        &mut self,
        user_id: &str,
        word_ids: Option<&[WordId]>,
    ) -> StoreResult<Vec<UserWordProgress>>;

    /// Insert or update rows keyed on `(user_id, word_id)`.
    fn upsert_progress(&mut self, rows: &[UserWordProgress]) -> StoreResult<()>;
}
