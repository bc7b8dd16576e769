//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every burnpad client (the HTTP adapter, the CLI, tests).
//!
//! ## Surface
//!
//! Exactly two lifecycle operations, plus maintenance:
//!
//! - [`NoteService::create_note`]: `payload, read_once -> NoteId`
//! - [`NoteService::consume_note`]: `id -> Option<payload>`
//! - [`NoteService::sweep`]: reclaim expired entries
//!
//! Nothing here knows about HTTP, rendering or routing.
//!
//! ## Generic Over NoteStore
//!
//! `NoteService<S: NoteStore>` owns its store handle, injected at construction:
//! - Production: `NoteService<FileStore>`
//! - Testing: `NoteService<MemoryStore>`
//!
//! The service holds no mutable state of its own, so a single instance can be
//! shared behind an `Arc` by any number of concurrent requests.

use crate::commands;
use crate::config::NotePolicy;
use crate::error::Result;
use crate::keygen::{KeyGenerator, UuidKeys};
use crate::model::NoteId;
use crate::store::{NoteStore, SweepReport};

pub struct NoteService<S: NoteStore, K: KeyGenerator = UuidKeys> {
    store: S,
    keys: K,
    policy: NotePolicy,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(store: S, policy: NotePolicy) -> Self {
        Self::with_keys(store, UuidKeys, policy)
    }
}

impl<S: NoteStore, K: KeyGenerator> NoteService<S, K> {
    pub fn with_keys(store: S, keys: K, policy: NotePolicy) -> Self {
        Self {
            store,
            keys,
            policy,
        }
    }

    pub fn create_note(&self, payload: Vec<u8>, read_once: bool) -> Result<NoteId> {
        commands::create::run(&self.store, &self.keys, &self.policy, payload, read_once)
    }

    pub fn consume_note(&self, id: &str) -> Result<Option<Vec<u8>>> {
        commands::consume::run(&self.store, id)
    }

    pub fn sweep(&self) -> Result<SweepReport> {
        commands::sweep::run(&self.store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &NotePolicy {
        &self.policy
    }
}

/// Public URL for a note.
pub fn note_url(base_url: &str, id: &NoteId) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), id)
}
