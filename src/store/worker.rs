use std::sync::mpsc;
use std::thread;

use crate::store::VocabStore;
use crate::store::schema::{UserWordProgress, Word, WordId, retain_well_formed};

pub enum StoreRequest {
    /// Every word plus all of the user's rows, for the dashboard.
    LoadDashboard { request_id: u64, user_id: String },
    /// One level's words and the user's rows for them.
    LoadLevel {
        request_id: u64,
        user_id: String,
        level: String,
    },
    Upsert {
        batch_id: u64,
        rows: Vec<UserWordProgress>,
    },
}

pub type Snapshot = (Vec<Word>, Vec<UserWordProgress>);

#[derive(Debug)]
pub enum StoreReply {
    Dashboard {
        request_id: u64,
        result: Result<Snapshot, String>,
    },
    Level {
        request_id: u64,
        level: String,
        result: Result<Snapshot, String>,
    },
    Upserted {
        batch_id: u64,
        result: Result<(), String>,
    },
}

/// Runs store calls on a background thread. Every request produces exactly
/// one reply through `notify`.
pub struct StoreWorker {
    tx: Option<mpsc::Sender<StoreRequest>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StoreWorker {
    pub fn spawn<F>(mut store: Box<dyn VocabStore>, notify: F) -> Self
    where
        F: Fn(StoreReply) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<StoreRequest>();
        let handle = thread::spawn(move || {
            for request in rx {
                notify(handle_request(store.as_mut(), request));
            }
            tracing::debug!("store worker stopped");
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn send(&self, request: StoreRequest) {
        let sent = self.tx.as_ref().is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            tracing::error!("store worker is gone; request dropped");
        }
    }

    /// Stop accepting requests, finish the queued ones and join the thread.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("store worker panicked");
        }
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_snapshot(
    store: &mut dyn VocabStore,
    user_id: &str,
    level: Option<&str>,
) -> Result<Snapshot, String> {
    let words = match level {
        Some(level) => store.fetch_words(level),
        None => store.fetch_all_words(),
    }
    .map_err(|e| e.to_string())?;
    let words = retain_well_formed(words);
    let rows = match level {
        Some(_) => {
            let ids: Vec<WordId> = words.iter().map(|w| w.id.clone()).collect();
            store.fetch_progress(user_id, Some(&ids))
        }
        None => store.fetch_progress(user_id, None),
    }
    .map_err(|e| e.to_string())?;
    Ok((words, rows))
}

fn handle_request(store: &mut dyn VocabStore, request: StoreRequest) -> StoreReply {
    match request {
        StoreRequest::LoadDashboard {
            request_id,
            user_id,
        } => {
            let result = load_snapshot(store, &user_id, None);
            if let Err(e) = &result {
                tracing::error!(error = %e, "loading dashboard failed");
            }
            StoreReply::Dashboard { request_id, result }
        }
        StoreRequest::LoadLevel {
            request_id,
            user_id,
            level,
        } => {
            let result = load_snapshot(store, &user_id, Some(&level));
            if let Err(e) = &result {
                tracing::error!(%level, error = %e, "loading level failed");
            }
            StoreReply::Level {
                request_id,
                level,
                result,
            }
        }
        StoreRequest::Upsert { batch_id, rows } => {
            let result = store.upsert_progress(&rows).map_err(|e| {
                tracing::error!(batch_id, error = %e, "upsert failed");
                e.to_string()
            });
            StoreReply::Upserted { batch_id, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreError, StoreResult};
    use std::sync::mpsc::Receiver;
    use std::time::Duration;

    struct FakeStore {
        words: Vec<Word>,
        fail_writes: bool,
    }

    impl VocabStore for FakeStore {
        fn fetch_words(&mut self, level: &str) -> StoreResult<Vec<Word>> {
            Ok(self.words.iter().filter(|w| w.level == level).cloned().collect())
        }

        fn fetch_all_words(&mut self) -> StoreResult<Vec<Word>> {
            Ok(self.words.clone())
        }

        fn fetch_progress(
            &mut self,
            user_id: &str,
            word_ids: Option<&[WordId]>,
        ) -> StoreResult<Vec<UserWordProgress>> {
            let ids = word_ids.map(|ids| ids.to_vec()).unwrap_or_default();
            Ok(ids
                .into_iter()
                .map(|id| UserWordProgress::new(user_id, id))
                .collect())
        }

        fn upsert_progress(&mut self, _rows: &[UserWordProgress]) -> StoreResult<()> {
            if self.fail_writes {
                Err(StoreError::Status {
                    status: 503,
                    body: "unavailable".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn word(id: &str, level: &str) -> Word {
        Word {
            id: WordId::new(id),
            hangul: "물".into(),
            translation: "water".into(),
            level: level.into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        }
    }

    fn spawn(fail_writes: bool) -> (StoreWorker, Receiver<StoreReply>) {
        let store = FakeStore {
            words: vec![
                word("00000000-0000-4000-8000-000000000001", "1A"),
                word("bogus", "1A"),
                word("00000000-0000-4000-8000-000000000002", "2A"),
            ],
            fail_writes,
        };
        let (tx, rx) = mpsc::channel();
        let worker = StoreWorker::spawn(Box::new(store), move |reply| {
            let _ = tx.send(reply);
        });
        (worker, rx)
    }

    #[test]
    fn test_level_load_filters_malformed_ids() {
        let (worker, rx) = spawn(false);
        worker.send(StoreRequest::LoadLevel {
            request_id: 4,
            user_id: "mina".into(),
            level: "1A".into(),
        });
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            StoreReply::Level {
                request_id,
                level,
                result,
            } => {
                assert_eq!(request_id, 4);
                assert_eq!(level, "1A");
                let (words, rows) = result.unwrap();
                assert_eq!(words.len(), 1);
                assert_eq!(rows.len(), 1);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_failed_upsert_is_reported() {
        let (worker, rx) = spawn(true);
        worker.send(StoreRequest::Upsert {
            batch_id: 9,
            rows: Vec::new(),
        });
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            StoreReply::Upserted { batch_id, result } => {
                assert_eq!(batch_id, 9);
                assert!(result.unwrap_err().contains("503"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let (mut worker, rx) = spawn(false);
        for request_id in 0..3 {
            worker.send(StoreRequest::LoadDashboard {
                request_id,
                user_id: "mina".into(),
            });
        }
        worker.shutdown();
        assert_eq!(rx.try_iter().count(), 3);
    }
}
