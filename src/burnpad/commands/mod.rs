//! # Command Layer
//!
//! This module contains the **note lifecycle logic** of burnpad. Each use case
//! lives in its own submodule as a plain function over a [`NoteStore`].
//!
//! ## Role and Responsibilities
//!
//! - Validate input before anything touches the store
//! - Pick the note mode and its TTL from the [`NotePolicy`]
//! - Drive consumption through the store's atomic `consume` primitive
//!
//! ## What Commands Do NOT Do
//!
//! - **Transport**: no HTTP, no stdout, no rendering
//! - **Retries**: store failures are returned as-is; retry policy belongs to
//!   the caller
//! - **Locking**: all coordination for read-once notes goes through the store,
//!   since several service instances may share it
//!
//! ## Testing Strategy
//!
//! This is where the lifecycle properties are exercised, against
//! [`MemoryStore`](crate::store::memory::MemoryStore).
//!
//! ## Command Modules
//!
//! - [`create`]: Create a note, returning its id
//! - [`consume`]: Deliver a note, burning it if read-once
//! - [`sweep`]: Reclaim expired entries
//!
//! [`NoteStore`]: crate::store::NoteStore
//! [`NotePolicy`]: crate::config::NotePolicy

pub mod consume;
pub mod create;
pub mod sweep;
