//! Credentials and the persisted session artifact.
//!
//! The configuration surface is a fixed set of environment variables read
//! once per run: `TG_API_ID`, `TG_API_HASH`, `TG_PHONE`, `TG_SESSION`.
//! Missing or malformed credentials fail fast, before any network or
//! file activity.
//!
//! The session artifact is a small JSON file created by the bootstrap flow
//! (`tgrab auth`) and reused by every later run; once it exists on disk,
//! bootstrap is idempotent. The interactive verification step (login code,
//! 2FA) belongs to the live transport behind the
//! [`HistoryClient`](crate::client::HistoryClient) port and is not handled
//! here.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TgrabError};

/// Default session name when `TG_SESSION` is unset.
pub const DEFAULT_SESSION_NAME: &str = "telegram_session";

/// API credentials for the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Application API identifier.
    pub api_id: i32,
    /// Application API secret.
    pub api_hash: String,
    /// Account phone number, used by the interactive bootstrap step.
    pub phone: Option<String>,
    /// Session name; determines the artifact file name.
    pub session: String,
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`TgrabError::Config`] when `TG_API_ID` or `TG_API_HASH`
    /// is missing, or when `TG_API_ID` is not numeric.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_id_raw = lookup("TG_API_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TgrabError::config("TG_API_ID is not set"))?;
        let api_id = api_id_raw
            .trim()
            .parse::<i32>()
            .map_err(|_| TgrabError::config(format!("TG_API_ID is not numeric: '{api_id_raw}'")))?;

        let api_hash = lookup("TG_API_HASH")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TgrabError::config("TG_API_HASH is not set"))?;

        Ok(Self {
            api_id,
            api_hash,
            phone: lookup("TG_PHONE").filter(|v| !v.is_empty()),
            session: lookup("TG_SESSION")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
        })
    }

    /// The artifact path for this credential set, under `dir`.
    pub fn session_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.session.json", self.session))
    }
}

/// The on-disk session bootstrap artifact.
///
/// Records that a credential set completed bootstrap, so later runs are
/// non-interactive. Stored as JSON next to the export outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionFile {
    /// Session name the artifact belongs to.
    pub session: String,
    /// API identifier the session was bootstrapped with.
    pub api_id: i32,
    /// Whether bootstrap completed.
    pub authorized: bool,
}

impl SessionFile {
    /// Loads an existing artifact, or creates a fresh unauthorized one if
    /// the file does not exist.
    pub fn load_or_create(path: &Path, creds: &Credentials) -> Result<Self> {
        if path.exists() {
            let data = fs::read_to_string(path)?;
            let session: SessionFile = serde_json::from_str(&data)?;
            return Ok(session);
        }
        Ok(Self {
            session: creds.session.clone(),
            api_id: creds.api_id,
            authorized: false,
        })
    }

    /// Marks bootstrap complete.
    pub fn authorize(&mut self) {
        self.authorized = true;
    }

    /// Persists the artifact, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Errors with [`TgrabError::Auth`] unless bootstrap completed.
    pub fn require_authorized(&self, path: &Path) -> Result<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(TgrabError::auth(Some(path.to_path_buf())))
        }
    }
}
