use super::state::{PersistedState, STATE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Get the default state file path (~/.config/exam-results/state.json)
pub fn get_state_path() -> PathBuf {
    crate::config::get_config_dir().join("state.json")
}

/// Load persisted state from a JSON file
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_state(path: &Path) -> Result<PersistedState> {
    if !path.exists() {
        return Ok(PersistedState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open state file at {}", path.display()))?;

    let state: PersistedState =
        serde_json::from_reader(file).context("Failed to load application state")?;

    if state.version != STATE_VERSION {
        anyhow::bail!("Unsupported state file version: {}", state.version);
    }

    Ok(state)
}

/// Save state to a JSON file atomically
///
/// Uses atomic-write-file so the file is never left half-written.
/// Creates the parent directory if it doesn't exist.
pub fn save_state(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize state")?;

    file.commit().context("Failed to save application state")?;

    Ok(())
}
