//! Note id generation.
//!
//! Ids double as the only secret guarding a note: anyone holding the URL can
//! read it. They must therefore come from a cryptographically strong source
//! and a space large enough that collisions are never expected in practice.
//! Random v4 UUIDs carry 122 bits of entropy.

use crate::model::NoteId;
use uuid::Uuid;

pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> NoteId;
}

/// Default generator backed by `Uuid::new_v4` (OS random source).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn generate(&self) -> NoteId {
        NoteId::from_uuid(Uuid::new_v4())
    }
}
