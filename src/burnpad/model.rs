use crate::error::NoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque note identifier. Rendered as a hyphenated lowercase UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Only the canonical form parses, so every note has exactly one URL.
impl FromStr for NoteId {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NoteError::InvalidInput("Malformed note id".to_string());
        let uuid = Uuid::try_parse(s).map_err(|_| malformed())?;
        if uuid.hyphenated().to_string() != s {
            return Err(malformed());
        }
        Ok(Self(uuid))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteMode {
    /// Readable any number of times until the TTL elapses.
    Persistent,
    /// Deleted by the first successful read. The TTL is only a GC horizon.
    ReadOnce,
}

impl NoteMode {
    pub fn from_read_once(read_once: bool) -> Self {
        if read_once {
            NoteMode::ReadOnce
        } else {
            NoteMode::Persistent
        }
    }
}

/// A stored note. Never updated in place: stores only create and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub payload: Vec<u8>,
    pub mode: NoteMode,
}

impl Note {
    pub fn new(payload: Vec<u8>, mode: NoteMode) -> Self {
        Self { payload, mode }
    }

    pub fn is_read_once(&self) -> bool {
        self.mode == NoteMode::ReadOnce
    }
}
