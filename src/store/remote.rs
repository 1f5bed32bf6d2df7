//! Hosted backend speaking the PostgREST dialect used by Supabase.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::store::schema::{UserWordProgress, Word, WordId};
use crate::store::{StoreError, StoreResult, VocabStore};

const WORDS_TABLE: &str = "words";
const PROGRESS_TABLE: &str = "user_word";

#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Bearer token; the anon key is used when no user token is configured.
    pub access_token: Option<String>,
}

pub struct SupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        if config.supabase_url.trim().is_empty() {
            return Err(StoreError::NotConfigured("supabase_url"));
        }
        if config.supabase_anon_key.trim().is_empty() {
            return Err(StoreError::NotConfigured("supabase_anon_key"));
        }
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.config.supabase_url.trim_end_matches('/')
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.supabase_anon_key);
        request
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", format!("Bearer {token}"))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> StoreResult<T> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(query);
        let response = check(self.authorize(request).send()?)?;
        Ok(response.json()?)
    }
}

fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// PostgREST `in.(…)` list. Ids are UUIDs, so no quoting is needed.
pub fn in_filter(ids: &[WordId]) -> String {
    let joined: Vec<&str> = ids.iter().map(WordId::as_str).collect();
    format!("in.({})", joined.join(","))
}

impl VocabStore for SupabaseStore {
    fn fetch_words(&mut self, level: &str) -> StoreResult<Vec<Word>> {
        self.get_json(WORDS_TABLE, &[("level", format!("eq.{level}"))])
    }

    fn fetch_all_words(&mut self) -> StoreResult<Vec<Word>> {
        self.get_json(WORDS_TABLE, &[])
    }

    fn fetch_progress(
        &mut self,
        user_id: &str,
        word_ids: Option<&[WordId]>,
    ) -> StoreResult<Vec<UserWordProgress>> {
        let mut query = vec![("user_id", format!("eq.{user_id}"))];
        if let Some(ids) = word_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query.push(("word_id", in_filter(ids)));
        }
        self.get_json(PROGRESS_TABLE, &query)
    }

    fn upsert_progress(&mut self, rows: &[UserWordProgress]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .post(self.table_url(PROGRESS_TABLE))
            .query(&[("on_conflict", "user_id,word_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);
        check(self.authorize(request).send()?)?;
        tracing::debug!(rows = rows.len(), "progress upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> SupabaseConfig {
        SupabaseConfig {
            supabase_url: url.into(),
            supabase_anon_key: key.into(),
            access_token: None,
        }
    }

    #[test]
    fn test_missing_settings_are_rejected() {
        assert!(matches!(
            SupabaseStore::new(config("", "key")),
            Err(StoreError::NotConfigured("supabase_url"))
        ));
        assert!(matches!(
            SupabaseStore::new(config("https://x.supabase.co", " ")),
            Err(StoreError::NotConfigured("supabase_anon_key"))
        ));
    }

    #[test]
    fn test_table_url_trims_slash() {
        let store = SupabaseStore::new(config("https://x.supabase.co/", "key")).unwrap();
        assert_eq!(
            store.table_url(PROGRESS_TABLE),
            "https://x.supabase.co/rest/v1/user_word"
        );
    }

    #[test]
    fn test_in_filter() {
        let ids = [WordId::new("a"), WordId::new("b")];
        assert_eq!(in_filter(&ids), "in.(a,b)");
    }
}
