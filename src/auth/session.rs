use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::model::user::Session;

/// File-backed session store.
///
/// Loaded once on open, written on every save, removed on clear. The in-memory
/// copy is what requests read, so a cleared session takes effect immediately
/// for every holder of the store.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = Self::load(&path);
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    fn load(path: &Path) -> Option<Session> {
        if !path.exists() {
            return None;
        }
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&json) {
            Ok(session) if session.has_token() => {
                debug!(username = %session.username, "Session restored");
                Some(session)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Ignoring corrupt session file");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token).filter(|t| !t.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn save(&self, session: Session) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| crate::error::ApiError::Session(e.to_string()))?;
        fs::write(&self.path, json)?;

        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    /// Idempotent. The in-memory session is dropped even if the file cannot be
    /// removed.
    pub fn clear(&self) -> ApiResult<()> {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
