use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Role, Session, User};

type SessionMap = BTreeMap<Role, Session>;

/// Role-scoped bearer tokens and cached users.
///
/// Cloning yields another handle onto the same sessions, so the gateway and
/// the views observe each other's writes. When opened with a file path, every
/// mutation rewrites that file with the full map keyed by role.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<SessionMap>>,
    path: Option<Arc<PathBuf>>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let sessions = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                SessionMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            SessionMap::new()
        };
        debug!(path = %path.display(), sessions = sessions.len(), "Opened session store");
        Ok(Self {
            sessions: Arc::new(RwLock::new(sessions)),
            path: Some(Arc::new(path)),
        })
    }

    pub fn set_session(&self, role: Role, token: impl Into<String>, user: User) -> Result<()> {
        let mut guard = self.sessions.write().expect("session store lock poisoned");
        let mut next = guard.clone();
        next.insert(
            role,
            Session {
                role,
                token: token.into(),
                user,
                created_at: Utc::now(),
            },
        );
        self.persist(&next)?;
        *guard = next;
        info!(%role, "Session stored");
        Ok(())
    }

    pub fn get_token(&self, role: Role) -> Option<String> {
        self.read(role, |s| s.token.clone())
    }

    pub fn get_user(&self, role: Role) -> Option<User> {
        self.read(role, |s| s.user.clone())
    }

    pub fn is_signed_in(&self, role: Role) -> bool {
        self.read(role, |_| ()).is_some()
    }

    /// The session is dropped from memory only once the file no longer holds it.
    pub fn clear_session(&self, role: Role) -> Result<()> {
        let mut guard = self.sessions.write().expect("session store lock poisoned");
        if !guard.contains_key(&role) {
            return Ok(());
        }
        let mut next = guard.clone();
        next.remove(&role);
        self.persist(&next)?;
        *guard = next;
        info!(%role, "Session cleared");
        Ok(())
    }

    fn read<T>(&self, role: Role, f: impl FnOnce(&Session) -> T) -> Option<T> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(&role)
            .map(f)
    }

    fn persist(&self, sessions: &SessionMap) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(sessions)?)?;
        Ok(())
    }
}
