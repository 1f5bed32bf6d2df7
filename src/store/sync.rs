use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use crate::store::schema::{MasteryKind, UserWordProgress, WordId};

/// The user's progress rows as the UI sees them, plus the writes that have not
/// reached the store yet.
///
/// Every mutation is applied locally first and queued. `begin_flush` hands out
/// at most one batch at a time; a failed batch goes back on the queue and is
/// retried after `retry_delay`. Until then local and stored state differ.
#[derive(Debug)]
pub struct ProgressCache {
    user_id: String,
    rows: HashMap<WordId, UserWordProgress>,
    dirty: BTreeSet<WordId>,
    in_flight: Option<(u64, Vec<WordId>)>,
    next_batch: u64,
    retry_after: Option<Instant>,
    retry_delay: Duration,
    last_error: Option<String>,
}

impl ProgressCache {
    pub fn new(user_id: &str, retry_delay: Duration) -> Self {
        Self {
            user_id: user_id.to_string(),
            rows: HashMap::new(),
            dirty: BTreeSet::new(),
            in_flight: None,
            next_batch: 1,
            retry_after: None,
            retry_delay,
            last_error: None,
        }
    }

    /// Continue batch numbering from an earlier cache so late replies meant
    /// for a previous user cannot match this cache's batches.
    pub fn with_first_batch(mut self, first: u64) -> Self {
        self.next_batch = first.max(1);
        self
    }

    pub fn next_batch_id(&self) -> u64 {
        self.next_batch
    }

    pub fn row(&self, word_id: &WordId) -> Option<&UserWordProgress> {
        self.rows.get(word_id)
    }

    pub fn rows(&self) -> Vec<UserWordProgress> {
        self.rows.values().cloned().collect()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Writes not yet confirmed by the store, including the batch in flight.
    pub fn pending_count(&self) -> usize {
        let in_flight = self
            .in_flight
            .as_ref()
            .map(|(_, ids)| ids.iter().filter(|id| !self.dirty.contains(*id)).count())
            .unwrap_or(0);
        self.dirty.len() + in_flight
    }

    fn is_unsynced(&self, word_id: &WordId) -> bool {
        self.dirty.contains(word_id)
            || self
                .in_flight
                .as_ref()
                .is_some_and(|(_, ids)| ids.contains(word_id))
    }

    /// Merge rows freshly read from the store. Rows with unsynced local edits
    /// keep the local version.
    pub fn replace_rows(&mut self, rows: Vec<UserWordProgress>) {
        for row in rows {
            if row.user_id != self.user_id || self.is_unsynced(&row.word_id) {
                continue;
            }
            self.rows.insert(row.word_id.clone(), row);
        }
    }

    fn edit(&mut self, word_id: &WordId, apply: impl FnOnce(&mut UserWordProgress)) {
        let row = self
            .rows
            .entry(word_id.clone())
            .or_insert_with(|| UserWordProgress::new(&self.user_id, word_id.clone()));
        apply(row);
        self.dirty.insert(word_id.clone());
    }

    /// Set one mastery flag. Returns false when it was already set.
    pub fn mark_mastered(&mut self, word_id: &WordId, kind: MasteryKind) -> bool {
        if self.rows.get(word_id).is_some_and(|r| r.flag(kind)) {
            return false;
        }
        self.edit(word_id, |row| row.set_flag(kind));
        true
    }

    pub fn set_visibility(&mut self, word_id: &WordId, visible: bool) {
        self.edit(word_id, |row| row.show_flashcard = visible);
    }

    /// Put every given word back into the flashcard deck.
    pub fn reset_visibility<'a>(&mut self, word_ids: impl IntoIterator<Item = &'a WordId>) {
        for id in word_ids {
            self.set_visibility(id, true);
        }
    }

    pub fn reset_mastery(&mut self, word_id: &WordId) {
        self.edit(word_id, UserWordProgress::reset_mastery);
    }

    /// Take the queued writes as one batch, unless a batch is already in
    /// flight or the retry delay has not passed.
    pub fn begin_flush(&mut self, now: Instant) -> Option<(u64, Vec<UserWordProgress>)> {
        if self.in_flight.is_some() || self.dirty.is_empty() {
            return None;
        }
        if self.retry_after.is_some_and(|at| now < at) {
            return None;
        }
        let ids: Vec<WordId> = std::mem::take(&mut self.dirty).into_iter().collect();
        let rows = ids
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect();
        let batch_id = self.next_batch;
        self.next_batch += 1;
        self.in_flight = Some((batch_id, ids));
        Some((batch_id, rows))
    }

    /// Every row not yet confirmed by the store, in flight or queued, ignoring
    /// the retry delay. Used on logout to hand the last writes to the worker.
    pub fn take_unsynced(&mut self) -> Vec<UserWordProgress> {
        let mut ids = std::mem::take(&mut self.dirty);
        if let Some((_, in_flight)) = self.in_flight.take() {
            ids.extend(in_flight);
        }
        ids.iter().filter_map(|id| self.rows.get(id).cloned()).collect()
    }

    /// Record the store's answer for a batch. Failed batches are requeued.
    pub fn finish_flush(&mut self, batch_id: u64, result: Result<(), String>, now: Instant) {
        let Some((in_flight_id, ids)) = self.in_flight.take() else {
            return;
        };
        if in_flight_id != batch_id {
            self.in_flight = Some((in_flight_id, ids));
            return;
        }
        match result {
            Ok(()) => {
                self.retry_after = None;
                self.last_error = None;
            }
            Err(message) => {
                tracing::warn!(batch_id, rows = ids.len(), error = %message, "progress write failed, will retry");
                self.dirty.extend(ids);
                self.retry_after = Some(now + self.retry_delay);
                self.last_error = Some(message);
            }
        }
    }
}
