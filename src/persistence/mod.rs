//! Whole-document JSON persistence over a key-value store
//!
//! Every aggregate is read entirely, mutated in memory and written back
//! entirely. Missing or corrupt documents load as `None` (or the type's
//! default) and are logged, never surfaced as errors.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::platform::{KeyValueStore, StorageError};

/// Storage keys
pub mod keys {
    use crate::game::GameId;

    pub const STATS: &str = "growgame-stats";
    pub const UNLOCKED: &str = "growgame-unlocked";
    pub const INSTALL_DATE: &str = "growgame-install-date";
    pub const SETTINGS: &str = "growgame-settings";

    pub fn leaderboard(game: GameId) -> String {
        format!("growgame-leaderboard-{}", game.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Load and decode a document, `None` if missing or corrupt
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = store.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupt data under {key}: {e}");
            None
        }
    }
}

/// Load a document or fall back to its default
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    load(store, key).unwrap_or_default()
}

/// Encode and write a whole document
pub fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value).map_err(|source| PersistError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)?;
    log::debug!("Saved {key} ({} bytes)", json.len());
    Ok(())
}

/// Write a document, logging instead of failing
///
/// In-memory state stays authoritative for the caller when the write fails.
pub fn save_logged<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save(store, key, value) {
        log::error!("Failed to save {key}: {e}");
    }
}
