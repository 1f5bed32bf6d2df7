use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::schema::WordId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("enter a profile name")]
    Empty,
    #[error("profile names may only use letters, digits, '-' and '_'")]
    InvalidCharacters,
    #[error("profile name is too long (max {0} characters)")]
    TooLong(usize),
}

const MAX_NAME_LEN: usize = 32;

/// The signed-in user. Created on login and dropped on logout; every store
/// request carries `user_id` from here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
    pub display_name: String,
    pub signed_in_at: DateTime<Utc>,
}

impl UserSession {
    /// A UUID is taken as the user id as-is (remote accounts); any other
    /// name becomes a lowercase local profile id.
    pub fn login(name: &str) -> Result<Self, LoginError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LoginError::Empty);
        }
        if name.chars().count() > MAX_NAME_LEN && !WordId::new(name).is_well_formed() {
            return Err(LoginError::TooLong(MAX_NAME_LEN));
        }
        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(LoginError::InvalidCharacters);
        }
        let user_id = if WordId::new(name).is_well_formed() {
            name.to_ascii_lowercase()
        } else {
            name.to_lowercase()
        };
        tracing::info!(%user_id, "signed in");
        Ok(Self {
            user_id,
            display_name: name.to_string(),
            signed_in_at: Utc::now(),
        })
    }
}
