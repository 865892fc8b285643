//! Application context passed explicitly to every command.
//!
//! Holds the loaded config plus the state remembered between runs (staff
//! session and theme). Built once with [`AppContext::hydrate`]; the session
//! is torn down with [`AppContext::logout`].

mod state;
mod storage;

pub use state::{PersistedState, Session, STATE_VERSION};
pub use storage::{get_state_path, load_state, save_state};

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::credentials::get_token_from_env;
use crate::output::ThemePreference;

#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    state_path: PathBuf,
    state: PersistedState,
}

impl AppContext {
    /// Build the context from config and the persisted state file
    pub fn hydrate(config: Config, state_path: PathBuf) -> Result<Self> {
        let state = load_state(&state_path)?;
        debug!(
            path = %state_path.display(),
            signed_in = state.session.is_some(),
            theme = ?state.theme,
            "hydrated application state"
        );
        Ok(Self {
            config,
            state_path,
            state,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    /// Bearer token for authenticated calls. The environment variable wins
    /// over a stored session.
    pub fn token(&self) -> Option<String> {
        get_token_from_env().or_else(|| self.state.session.as_ref().map(|s| s.token.clone()))
    }

    pub fn theme(&self) -> ThemePreference {
        self.state.theme
    }

    /// Store a new session, replacing any existing one
    pub fn sign_in(&mut self, session: Session) -> Result<()> {
        self.state.session = Some(session);
        self.persist()
    }

    /// Clear the session. Returns true if one was present.
    pub fn logout(&mut self) -> Result<bool> {
        let had_session = self.state.session.take().is_some();
        if had_session {
            self.persist()?;
        }
        Ok(had_session)
    }

    pub fn set_theme(&mut self, theme: ThemePreference) -> Result<()> {
        self.state.theme = theme;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        save_state(&self.state_path, &self.state)
    }
}
