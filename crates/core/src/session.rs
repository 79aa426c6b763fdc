//! Login session context.
//!
//! The session (bearer token and role of the logged-in account) is held by an explicit
//! [`SessionContext`] that is shared with whoever needs it: the HTTP client attaches the token,
//! the navigation guard checks authentication and role, and error handling clears it on an
//! expired login.
//!
//! The context has a two-step lifecycle, [`SessionContext::establish`] and
//! [`SessionContext::clear`]. Each step is written through to a [`SessionStore`] so a later
//! process picks the session up again.

use crate::{FilingError, FilingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError, RwLock};

/// Role of the logged-in account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Role code used on accounts: `1` is an administrator, anything else a regular user.
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(1) => Self::Admin,
            _ => Self::User,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Admin => 1,
            Self::User => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

impl FromStr for Role {
    type Err = FilingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(FilingError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An established login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub established_at: DateTime<Utc>,
}

/// Persistence for the current session.
pub trait SessionStore: Send + Sync {
    /// Load the persisted session, `None` when there is none.
    fn load(&self) -> FilingResult<Option<Session>>;
    fn save(&self, session: &Session) -> FilingResult<()>;
    /// Remove the persisted session. Removing an absent session succeeds.
    fn remove(&self) -> FilingResult<()>;
}

/// Stores the session as pretty-printed JSON in a single file.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> FilingResult<Option<Session>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(FilingError::SessionRead)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(FilingError::SessionDeserialization)
    }

    fn save(&self, session: &Session) -> FilingResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(FilingError::SessionDirCreation)?;
        }
        let json =
            serde_json::to_string_pretty(session).map_err(FilingError::SessionSerialization)?;
        std::fs::write(&self.path, json).map_err(FilingError::SessionWrite)
    }

    fn remove(&self) -> FilingResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FilingError::SessionRemove(e)),
        }
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> FilingResult<Option<Session>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> FilingResult<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn remove(&self) -> FilingResult<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Shared holder of the current session.
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    /// Create a context, picking up any session already persisted in `store`.
    ///
    /// A persisted session that cannot be parsed is discarded with a warning rather than
    /// failing startup; the user simply has to log in again.
    pub fn load(store: impl SessionStore + 'static) -> FilingResult<Self> {
        let current = match store.load() {
            Ok(session) => session,
            Err(FilingError::SessionDeserialization(e)) => {
                tracing::warn!("discarding unreadable session: {}", e);
                store.remove()?;
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            store: Box::new(store),
            current: RwLock::new(current),
        })
    }

    /// A context that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemorySessionStore::default()),
            current: RwLock::new(None),
        }
    }

    /// Replace the current session with a new login and persist it.
    pub fn establish(
        &self,
        token: impl Into<String>,
        role: Role,
        user_id: Option<String>,
        user_name: Option<String>,
    ) -> FilingResult<Session> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(FilingError::InvalidInput("session token cannot be empty".into()));
        }

        let session = Session {
            token,
            role,
            user_id,
            user_name,
            established_at: Utc::now(),
        };
        self.store.save(&session)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        tracing::debug!("session established for role {}", role);
        Ok(session)
    }

    /// Drop the current session, in the store and then in memory. A failed removal leaves the
    /// session in place.
    pub fn clear(&self) -> FilingResult<()> {
        self.store.remove()?;
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            tracing::debug!("session cleared");
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role())
            .finish()
    }
}
