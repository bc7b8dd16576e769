//! # Configuration
//!
//! Burnpad configuration is managed by [`confique`], which layers environment
//! variables over an optional TOML file over compiled defaults.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `port` | `PORT` | `3000` | HTTP listen port |
//! | `base_url` | `BASE_URL` | `http://localhost:{port}` | Prefix for note URLs |
//! | `data_dir` | `BURNPAD_DATA_DIR` | OS data dir | Where the file store lives |
//! | `persistent_ttl_secs` | `BURNPAD_PERSISTENT_TTL_SECS` | `86400` | Lifetime of persistent notes |
//! | `read_once_ttl_secs` | `BURNPAD_READ_ONCE_TTL_SECS` | `31536000` | GC horizon for unread read-once notes |
//! | `max_payload_bytes` | `BURNPAD_MAX_PAYLOAD_BYTES` | `1048576` | Largest accepted note |
//! | `request_timeout_ms` | `BURNPAD_REQUEST_TIMEOUT_MS` | `5000` | Bound on each store call from HTTP |
//! | `sweep_interval_secs` | `BURNPAD_SWEEP_INTERVAL_SECS` | `3600` | Background sweep period, `0` disables |

use crate::error::{NoteError, Result};
use crate::model::NoteMode;
use crate::store::expiry_from;
use chrono::Utc;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DAY_SECS: u64 = 24 * 60 * 60;

/// Configuration for burnpad, optionally stored in `burnpad.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BurnpadConfig {
    /// Port the HTTP server listens on.
    #[config(env = "PORT", default = 3000)]
    pub port: u16,

    /// Public URL prefix used when handing out note links.
    #[config(env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Directory holding note files.
    #[config(env = "BURNPAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(env = "BURNPAD_PERSISTENT_TTL_SECS", default = 86400)]
    pub persistent_ttl_secs: u64,

    /// Read-once notes are deleted on first read; this only bounds how long an
    /// unread one lingers.
    #[config(env = "BURNPAD_READ_ONCE_TTL_SECS", default = 31536000)]
    pub read_once_ttl_secs: u64,

    #[config(env = "BURNPAD_MAX_PAYLOAD_BYTES", default = 1048576)]
    pub max_payload_bytes: usize,

    #[config(env = "BURNPAD_REQUEST_TIMEOUT_MS", default = 5000)]
    pub request_timeout_ms: u64,

    #[config(env = "BURNPAD_SWEEP_INTERVAL_SECS", default = 3600)]
    pub sweep_interval_secs: u64,
}

impl Default for BurnpadConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            base_url: None,
            data_dir: None,
            persistent_ttl_secs: DAY_SECS,
            read_once_ttl_secs: DAY_SECS * 365,
            max_payload_bytes: 1024 * 1024,
            request_timeout_ms: 5000,
            sweep_interval_secs: 3600,
        }
    }
}

impl BurnpadConfig {
    /// Load from the environment, then `file` if given and present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        let config: Self = builder
            .load()
            .map_err(|e| NoteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, on the first request.
    pub fn validate(&self) -> Result<()> {
        let policy = self.policy();
        for mode in [NoteMode::Persistent, NoteMode::ReadOnce] {
            expiry_from(Utc::now(), policy.ttl_for(mode))?;
        }
        if self.max_payload_bytes == 0 {
            return Err(NoteError::Config(
                "max_payload_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("com", "burnpad", "burnpad")
            .map(|dirs| dirs.data_dir().join("notes"))
            .ok_or_else(|| NoteError::Config("Could not determine a data directory".to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `None` when background sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn policy(&self) -> NotePolicy {
        NotePolicy {
            persistent_ttl: Duration::from_secs(self.persistent_ttl_secs),
            read_once_ttl: Duration::from_secs(self.read_once_ttl_secs),
            max_payload_bytes: self.max_payload_bytes,
        }
    }
}

/// Lifetime and size rules applied when creating notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotePolicy {
    pub persistent_ttl: Duration,
    pub read_once_ttl: Duration,
    pub max_payload_bytes: usize,
}

impl Default for NotePolicy {
    fn default() -> Self {
        BurnpadConfig::default().policy()
    }
}

impl NotePolicy {
    pub fn ttl_for(&self, mode: NoteMode) -> Duration {
        match mode {
            NoteMode::Persistent => self.persistent_ttl,
            NoteMode::ReadOnce => self.read_once_ttl,
        }
    }
}
