use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::output::ThemePreference;

pub const STATE_VERSION: u32 = 1;

/// Everything the application remembers between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub theme: ThemePreference,
}

/// A signed-in staff session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub token: String,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: &str, token: &str) -> Self {
        Self {
            username: username.to_string(),
            token: token.to_string(),
            signed_in_at: Utc::now(),
        }
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistedState {
    /// Create an empty state with the current version
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            session: None,
            theme: ThemePreference::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_empty() {
        let state = PersistedState::new();
        assert_eq!(state.version, 1);
        assert!(state.session.is_none());
        assert_eq!(state.theme, ThemePreference::Auto);
    }

    #[test]
    fn test_missing_fields_default() {
        let state: PersistedState = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert!(state.session.is_none());
        assert_eq!(state.theme, ThemePreference::Auto);
    }

    #[test]
    fn test_session_new() {
        let session = Session::new("office", "abc");
        assert_eq!(session.username, "office");
        assert_eq!(session.token, "abc");
    }
}
