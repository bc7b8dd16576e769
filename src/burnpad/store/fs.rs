//! File-backed note store.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//! ├── note-{uuid}.note        # header line (JSON) + '\n' + raw payload
//! ├── .tmp-{uuid}             # transient, while a note is being written
//! └── .claim-{id}-{uuid}      # transient, while a read-once note is consumed
//! ```
//!
//! The filesystem has no native expiry, so `expires_at` lives in the header and
//! is checked on every read. [`FileStore::sweep`] reclaims expired files.
//!
//! ## Atomicity
//!
//! - Writes go to a temp file first and are published with `hard_link`, which
//!   fails if the target exists. Readers never see a partial note and a live
//!   note is never overwritten.
//! - Read-once consumption renames the note file to a claim file unique to the
//!   caller. Exactly one rename of a given source can succeed, so exactly one
//!   consumer wins, even across processes sharing the directory. The losers
//!   see `NotFound` from the rename and report the note as absent.

use super::{expiry_from, NoteStore, SweepReport};
use crate::error::{NoteError, Result};
use crate::model::{Note, NoteId, NoteMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

const NOTE_PREFIX: &str = "note-";
const NOTE_EXT: &str = ".note";
const TMP_PREFIX: &str = ".tmp-";
const CLAIM_PREFIX: &str = ".claim-";

/// Transient files younger than this are assumed to belong to an operation
/// still in flight.
const DEFAULT_ARTIFACT_GRACE: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteHeader {
    mode: NoteMode,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl NoteHeader {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

pub struct FileStore {
    root: PathBuf,
    artifact_grace: Duration,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            artifact_grace: DEFAULT_ARTIFACT_GRACE,
        }
    }

    /// Override how old a temp or claim file must be before `sweep` removes it.
    pub fn with_artifact_grace(mut self, grace: Duration) -> Self {
        self.artifact_grace = grace;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn note_path(&self, id: &NoteId) -> PathBuf {
        self.root.join(format!("{}{}{}", NOTE_PREFIX, id, NOTE_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(NoteError::Io)?;
        }
        Ok(())
    }

    /// Publish `tmp` as `target`, clearing an expired occupant at most once.
    fn publish(&self, id: &NoteId, tmp: &Path, target: &Path) -> Result<()> {
        for attempt in 0..2 {
            match fs::hard_link(tmp, target) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let occupant_live = match read_note(target)? {
                        Some((header, _)) => header.is_live(Utc::now()),
                        None => false,
                    };
                    if occupant_live || attempt > 0 {
                        tracing::error!(note_id = %id, "Refusing to overwrite live note");
                        return Err(NoteError::DuplicateId(*id));
                    }
                    remove_if_present(target)?;
                }
                Err(e) => return Err(NoteError::Io(e)),
            }
        }
        Err(NoteError::DuplicateId(*id))
    }

    fn is_stale(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age >= self.artifact_grace)
    }
}

impl NoteStore for FileStore {
    fn put(&self, id: &NoteId, note: &Note, ttl: Duration) -> Result<()> {
        let now = Utc::now();
        let header = NoteHeader {
            mode: note.mode,
            created_at: now,
            expires_at: expiry_from(now, ttl)?,
        };
        self.ensure_dir()?;

        let tmp = self.root.join(format!("{}{}", TMP_PREFIX, Uuid::new_v4()));
        fs::write(&tmp, encode(&header, &note.payload)?).map_err(NoteError::Io)?;

        let published = self.publish(id, &tmp, &self.note_path(id));
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::warn!(path = %tmp.display(), error = %e, "Failed to remove temp file");
        }
        published
    }

    fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let now = Utc::now();
        Ok(read_note(&self.note_path(id))?
            .filter(|(header, _)| header.is_live(now))
            .map(|(header, payload)| Note::new(payload, header.mode)))
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        remove_if_present(&self.note_path(id))
    }

    fn consume(&self, id: &NoteId) -> Result<Option<Note>> {
        let path = self.note_path(id);
        let Some((header, payload)) = read_note(&path)? else {
            return Ok(None);
        };

        if !header.is_live(Utc::now()) {
            remove_if_present(&path)?;
            return Ok(None);
        }

        if header.mode == NoteMode::Persistent {
            return Ok(Some(Note::new(payload, header.mode)));
        }

        let claim = self
            .root
            .join(format!("{}{}-{}", CLAIM_PREFIX, id, Uuid::new_v4()));
        match fs::rename(&path, &claim) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Read-once note claimed by another reader");
                return Ok(None);
            }
            Err(e) => return Err(NoteError::Io(e)),
        }

        let claimed = fs::read(&claim).map_err(NoteError::Io);
        if let Err(e) = fs::remove_file(&claim) {
            tracing::warn!(path = %claim.display(), error = %e, "Failed to remove claim file");
        }
        let (header, payload) = decode(&claimed?)?;
        tracing::debug!("Read-once note consumed");
        Ok(Some(Note::new(payload, header.mode)))
    }

    fn sweep(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        if !self.root.exists() {
            return Ok(report);
        }

        let now = Utc::now();
        for entry in fs::read_dir(&self.root).map_err(NoteError::Io)? {
            let path = entry.map_err(NoteError::Io)?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if name.starts_with(NOTE_PREFIX) && name.ends_with(NOTE_EXT) {
                match read_note(&path) {
                    Ok(Some((header, _))) if !header.is_live(now) => {
                        remove_if_present(&path)?;
                        report.expired_removed += 1;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable note file");
                    }
                }
            } else if (name.starts_with(TMP_PREFIX) || name.starts_with(CLAIM_PREFIX))
                && self.is_stale(&path)
            {
                remove_if_present(&path)?;
                report.stale_artifacts_removed += 1;
            }
        }

        tracing::info!(
            expired = report.expired_removed,
            stale = report.stale_artifacts_removed,
            "Sweep finished"
        );
        Ok(report)
    }
}

fn encode(header: &NoteHeader, payload: &[u8]) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec(header).map_err(NoteError::Serialization)?;
    buf.push(b'\n');
    buf.extend_from_slice(payload);
    Ok(buf)
}

fn decode(bytes: &[u8]) -> Result<(NoteHeader, Vec<u8>)> {
    let split = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| NoteError::StoreUnavailable("Corrupt note file: no header".to_string()))?;
    let header: NoteHeader =
        serde_json::from_slice(&bytes[..split]).map_err(NoteError::Serialization)?;
    Ok((header, bytes[split + 1..].to_vec()))
}

/// Returns Ok(None) if the file does not exist.
fn read_note(path: &Path) -> Result<Option<(NoteHeader, Vec<u8>)>> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(NoteError::Io(e)),
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NoteError::Io(e)),
    }
}
