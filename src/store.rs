//! Balance and history persistence over a string key-value store.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::Amount;
use crate::model::HistoryEntry;

pub const BALANCE_KEY: &str = "balance";
pub const HISTORY_KEY: &str = "history";

/// Stored balances above this are treated as corrupt.
pub const MAX_BALANCE: Amount = Amount::from_whole(1_000_000_000_000);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the session keeps state between runs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Write several keys as one update.
    fn set_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Non-persistent store, the default for tests and one-off simulations.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A single JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if the file is missing, blank or unreadable as JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read(&path) {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "state file is corrupt, starting fresh");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.set_all(vec![(key, value)])
    }

    fn set_all(&mut self, entries: Vec<(&str, String)>) -> Result<(), StoreError> {
        let mut values = self.values.clone();
        for (key, value) in entries {
            values.insert(key.to_string(), value);
        }
        self.write(&values)?;
        self.values = values;
        Ok(())
    }
}

impl JsonFileStore {
    /// Replace the file through a sibling `.tmp` file and a rename.
    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(values)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

/// What survives a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub balance: Amount,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
}

/// Read balance and history, falling back to `starting_balance` and an empty
/// history for anything missing or malformed. Never fails.
pub fn load_state<S: KeyValueStore + ?Sized>(
    store: &S,
    starting_balance: Amount,
    history_capacity: usize,
) -> PersistedState {
    let balance = match store.get(BALANCE_KEY) {
        Ok(Some(raw)) => match raw.parse::<Amount>() {
            Ok(balance) if balance.is_negative() => {
                warn!(%balance, "stored balance is negative, using default");
                starting_balance
            }
            Ok(balance) if balance > MAX_BALANCE => {
                warn!(%balance, "stored balance is implausibly large, using default");
                starting_balance
            }
            Ok(balance) => balance,
            Err(e) => {
                warn!(error = %e, "stored balance is malformed, using default");
                starting_balance
            }
        },
        Ok(None) => starting_balance,
        Err(e) => {
            warn!(error = %e, "failed to read balance, using default");
            starting_balance
        }
    };

    let mut history = match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => serde_json::from_str::<Vec<HistoryEntry>>(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "stored history is malformed, starting empty");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read history, starting empty");
            Vec::new()
        }
    };
    history.truncate(history_capacity);

    PersistedState { balance, history }
}

pub fn save_state<S: KeyValueStore + ?Sized>(
    store: &mut S,
    state: &PersistedState,
) -> Result<(), StoreError> {
    store.set_all(vec![
        (BALANCE_KEY, state.balance.to_string()),
        (HISTORY_KEY, serde_json::to_string(&state.history)?),
    ])
}
