//! Durable storage for the bearer credential.
//!
//! The credential lives in a single key-value slot scoped to the API origin,
//! so switching `api_base` between two servers never leaks a token across them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use url::Url;

use crate::errors::{ClientError, ClientResult};

/// Fixed key the token is stored under within an origin's slot
pub const TOKEN_KEY: &str = "access_token";

const CREDENTIALS_FILE: &str = "credentials.json";

/// Origin-scoped persistence for the credential
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: &str) -> ClientResult<()>;
    /// Removes the credential. Succeeds when nothing is stored.
    fn clear(&self) -> ClientResult<()>;
}

type Slots = BTreeMap<String, BTreeMap<String, String>>;

/// JSON-file backed store: `{ "<origin>": { "access_token": "..." } }`
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    origin: String,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path, api_base: &Url) -> Self {
        Self {
            path: data_dir.join(CREDENTIALS_FILE),
            origin: api_base.origin().ascii_serialization(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_content(&self) -> ClientResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ClientError::CredentialStoreError(format!("Failed to read credentials: {}", e))
        })?;
        Ok(Some(content).filter(|c| !c.trim().is_empty()))
    }

    fn read_slots(&self) -> ClientResult<Slots> {
        match self.read_content()? {
            None => Ok(Slots::new()),
            Some(content) => serde_json::from_str(&content).map_err(|e| {
                ClientError::CredentialStoreError(format!("Failed to parse credentials: {}", e))
            }),
        }
    }

    /// Slots to rewrite, and whether the file on disk was corrupt and must be replaced.
    fn slots_for_update(&self) -> ClientResult<(Slots, bool)> {
        let Some(content) = self.read_content()? else {
            return Ok((Slots::new(), false));
        };
        match serde_json::from_str(&content) {
            Ok(slots) => Ok((slots, false)),
            Err(e) => {
                warn!(path = %self.path.display(), "Resetting unparsable credentials file: {}", e);
                Ok((Slots::new(), true))
            }
        }
    }

    fn write_slots(&self, slots: &Slots) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::CredentialStoreError(format!(
                    "Failed to create data directory: {}",
                    e
                ))
            })?;
        }
        let content = serde_json::to_string_pretty(slots)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| {
            ClientError::CredentialStoreError(format!("Failed to write credentials: {}", e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            ClientError::CredentialStoreError(format!("Failed to write credentials: {}", e))
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> ClientResult<Option<String>> {
        let slots = self.read_slots()?;
        Ok(slots
            .get(&self.origin)
            .and_then(|slot| slot.get(TOKEN_KEY))
            .filter(|token| !token.is_empty())
            .cloned())
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let (mut slots, _) = self.slots_for_update()?;
        slots
            .entry(self.origin.clone())
            .or_default()
            .insert(TOKEN_KEY.to_string(), token.to_string());
        debug!(origin = %self.origin, "Persisting credential");
        self.write_slots(&slots)
    }

    fn clear(&self) -> ClientResult<()> {
        let (mut slots, corrupt) = self.slots_for_update()?;
        let removed = slots
            .get_mut(&self.origin)
            .and_then(|slot| slot.remove(TOKEN_KEY))
            .is_some();
        if !removed && !corrupt {
            return Ok(());
        }
        slots.retain(|_, slot| !slot.is_empty());
        debug!(origin = %self.origin, "Cleared credential");
        self.write_slots(&slots)
    }
}

/// In-process store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        *store.lock() = Some(token.to_string());
        store
    }

    pub fn peek(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a consistent Option.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self.peek().filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        *self.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.lock() = None;
        Ok(())
    }
}
