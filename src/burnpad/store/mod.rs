//! # Storage Layer
//!
//! This module defines the storage contract for burnpad. The [`NoteStore`] trait
//! is the only thing the service layer knows about persistence.
//!
//! ## Contract
//!
//! - **put**: create a note under a fresh id with an expiry of `ttl` from now.
//!   Writing to an id that is already live is a logic error: it is logged and
//!   reported as [`NoteError::DuplicateId`], never an overwrite.
//! - **get**: read-only lookup. Expired entries behave exactly like absent ones.
//! - **delete**: idempotent removal.
//! - **consume**: the atomic "fetch, and delete if read-once" primitive. For N
//!   concurrent callers on the same read-once id exactly one gets the note.
//!   The atomicity must come from the backend itself (a lock it owns, an atomic
//!   rename, a GETDEL-style command) because service instances are independent
//!   and share nothing but the store.
//! - **sweep**: reclaims space held by expired entries and crash leftovers.
//!   Expiry is always enforced on read; sweeping never changes what a reader sees.
//!
//! ## Implementations
//!
//! - [`memory::MemoryStore`]: a mutex-guarded map. Used by tests and by
//!   single-process deployments that accept losing notes on restart.
//! - [`fs::FileStore`]: one file per note in a data directory. Safe for several
//!   processes sharing the same directory.
//!
//! ## Errors
//!
//! Any failure to reach or operate the backing store is reported as
//! [`NoteError::StoreUnavailable`] (or [`NoteError::Io`]) and propagated; the
//! store never retries on its own.
//!
//! [`NoteError::DuplicateId`]: crate::error::NoteError::DuplicateId
//! [`NoteError::StoreUnavailable`]: crate::error::NoteError::StoreUnavailable
//! [`NoteError::Io`]: crate::error::NoteError::Io

use crate::error::{NoteError, Result};
use crate::model::{Note, NoteId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub mod fs;
pub mod memory;

/// Report from the `sweep` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_removed: usize,
    pub stale_artifacts_removed: usize,
}

/// Abstract interface for note storage.
///
/// All methods take `&self`; implementations handle their own interior
/// mutability so one handle can be shared across threads.
pub trait NoteStore: Send + Sync {
    /// Store a new note under `id`, expiring `ttl` from now.
    fn put(&self, id: &NoteId, note: &Note, ttl: Duration) -> Result<()>;

    /// Look up a live note without mutating anything.
    fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Remove a note. Removing an absent note succeeds.
    fn delete(&self, id: &NoteId) -> Result<()>;

    /// Fetch a live note, atomically deleting it if it is read-once.
    fn consume(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Remove expired entries and leftovers from interrupted operations.
    fn sweep(&self) -> Result<SweepReport>;
}

/// Shared handles delegate, so `Arc<dyn NoteStore>` can back a service.
impl<T: NoteStore + ?Sized> NoteStore for Arc<T> {
    fn put(&self, id: &NoteId, note: &Note, ttl: Duration) -> Result<()> {
        (**self).put(id, note, ttl)
    }

    fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        (**self).get(id)
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        (**self).delete(id)
    }

    fn consume(&self, id: &NoteId) -> Result<Option<Note>> {
        (**self).consume(id)
    }

    fn sweep(&self) -> Result<SweepReport> {
        (**self).sweep()
    }
}

/// Absolute expiry for a note written at `now`.
///
/// TTLs come from server configuration, never from clients, so an
/// unrepresentable one is a [`NoteError::Config`] error.
pub fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|_| NoteError::Config(format!("TTL out of range: {:?}", ttl)))?;
    now.checked_add_signed(ttl)
        .ok_or_else(|| NoteError::Config("TTL overflows the calendar".to_string()))
}
