//! State persistence for declared objects
//!
//! Manages `{state_dir}/state.json`, which holds every declared object
//! together with its observed status. Remote identities live only here, so
//! losing this file means the operator would create duplicates remotely.
//!
//! A save never leaves the directory without a complete state file: the new
//! content goes to `state.json.tmp` and is renamed over `state.json` after
//! the previous file has been copied to `state.json.backup`. Loading falls
//! back to the backup when the primary file is missing or unreadable.

use crate::error::{OperatorError, Result};
use crate::resource::{Account, AlertContact, Monitor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STATE_VERSION: u32 = 1;
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const STATE_TMP: &str = "state.json.tmp";
const LOCK_FILE: &str = "lock.json";
const STALE_LOCK_HOURS: i64 = 1;

/// Everything the operator persists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub alert_contacts: Vec<AlertContact>,

    #[serde(default)]
    pub monitors: Vec<Monitor>,

    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            alert_contacts: Vec::new(),
            monitors: Vec::new(),
            accounts: Vec::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.alert_contacts.len() + self.monitors.len() + self.accounts.len()
    }
}

/// Reads and writes the state directory of one operator instance
pub struct StateManager {
    state_dir: PathBuf,
}

impl StateManager {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.state_dir.join(file)
    }

    /// Load the current state, recovering from the backup if needed.
    ///
    /// A missing directory yields an empty state. A primary file that cannot
    /// be parsed is an error only when there is no usable backup either.
    pub async fn load(&self) -> Result<GlobalState> {
        let primary_error = match read_state(&self.path(STATE_FILE)).await {
            Ok(Some(state)) => return checked(state),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "state file unreadable, trying backup");
                Some(e)
            }
        };

        match read_state(&self.path(STATE_BACKUP)).await? {
            Some(state) => {
                tracing::warn!(
                    objects = state.object_count(),
                    "recovered state from {}",
                    STATE_BACKUP
                );
                checked(state)
            }
            None => match primary_error {
                Some(e) => Err(e),
                None => {
                    tracing::debug!("no state file, starting empty");
                    Ok(GlobalState::new())
                }
            },
        }
    }

    /// Persist `state` without ever leaving a partial `state.json` behind
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        fs::create_dir_all(&self.state_dir).await?;

        let tmp = self.path(STATE_TMP);
        let content = serde_json::to_vec_pretty(state)?;
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        let current = self.path(STATE_FILE);
        match fs::copy(&current, self.path(STATE_BACKUP)).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::rename(&tmp, &current).await?;

        tracing::debug!(objects = state.object_count(), "state saved");
        Ok(())
    }

    /// Take the exclusive lock on the state directory.
    ///
    /// Only one operator process may drive a state directory; two would
    /// reconcile the same object concurrently. A lock older than an hour is
    /// taken over.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        fs::create_dir_all(&self.state_dir).await?;
        let lock_path = self.path(LOCK_FILE);
        let info = LockInfo::current();
        let content = serde_json::to_vec_pretty(&info)?;

        for _ in 0..2 {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&content).await?;
                    tracing::debug!(pid = info.pid, "state lock acquired");
                    return Ok(StateLock {
                        lock_path,
                        released: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let held = read_lock(&lock_path).await?;
                    let age = Utc::now().signed_duration_since(held.acquired_at);
                    if age.num_hours() < STALE_LOCK_HOURS {
                        return Err(OperatorError::Lock(format!(
                            "state is locked by {} (pid {}) since {}",
                            held.holder, held.pid, held.acquired_at
                        )));
                    }
                    tracing::warn!(holder = %held.holder, pid = held.pid, "taking over stale state lock");
                    fs::remove_file(&lock_path).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(OperatorError::Lock(
            "state lock was re-acquired by another process".to_string(),
        ))
    }
}

/// `Ok(None)` when the file does not exist
async fn read_state(path: &Path) -> Result<Option<GlobalState>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

fn checked(state: GlobalState) -> Result<GlobalState> {
    if state.version > STATE_VERSION {
        return Err(OperatorError::State(format!(
            "state file version {} is newer than supported version {}",
            state.version, STATE_VERSION
        )));
    }
    tracing::debug!(objects = state.object_count(), "state loaded");
    Ok(state)
}

async fn read_lock(path: &Path) -> Result<LockInfo> {
    let content = fs::read_to_string(path).await?;
    serde_json::from_str(&content)
        .map_err(|e| OperatorError::Lock(format!("unreadable lock file {}: {}", path.display(), e)))
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    #[serde(default)]
    pid: u32,
    acquired_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        Self {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
