use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::usecase::ports::session::SessionStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

pub struct FileSessionStore {
    path: PathBuf,
    session: RwLock<Session>,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match load_session(&path) {
            Ok(session) => session,
            Err(err) => {
                warn!("starting without a stored session: {err:#}");
                Session::default()
            }
        };

        Self {
            path,
            session: RwLock::new(session),
        }
    }

    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    pub fn save(&self, session: Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(&session).context("failed to encode session")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write session: {}", self.path.display()))?;
        *self.session.write() = session;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove session: {}", self.path.display()))?;
        }
        *self.session.write() = Session::default();
        Ok(())
    }
}

fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        return Ok(Session::default());
    }
    let raw = fs::read(path).with_context(|| format!("failed to read session: {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse session: {}", path.display()))
}

impl SessionStore for FileSessionStore {
    fn access_token(&self) -> Option<String> {
        let session = self.session.read();
        session
            .is_authenticated()
            .then(|| session.access_token.clone())
    }
}
