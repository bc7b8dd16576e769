//! # Burnpad Architecture
//!
//! Burnpad is a **self-destructing note store**. A client submits text and gets
//! back a URL; whoever opens that URL receives the text exactly once (read-once
//! notes) or repeatedly until it expires (persistent notes).
//!
//! The interesting part is the note lifecycle, and the crate is layered so that
//! it stays isolated from transport concerns.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (web.rs, main.rs)                                  │
//! │  - HTTP routes + templated HTML, or clap CLI                │
//! │  - The ONLY places that know about requests/stdout/exits    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - NoteService: create_note / consume_note / sweep          │
//! │  - Owns the injected store handle and the note policy       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Input validation, mode/TTL selection, consumption        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - NoteStore trait: put / get / delete / consume / sweep    │
//! │  - FileStore (production), MemoryStore (testing)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Read-Once Guarantee
//!
//! A read-once note is delivered to at most one caller, however many ask for it
//! at the same moment. Coordination happens inside the store
//! ([`store::NoteStore::consume`]), never in process memory, because several
//! service processes may share one store.
//!
//! ## Not Found Means Not Found
//!
//! A note that never existed, one that expired and one that was already read
//! all look the same to a caller. Telling them apart would let an observer
//! discover which ids exist.
//!
//! ## Module Overview
//!
//! - [`api`]: The service facade
//! - [`commands`]: Lifecycle logic for each operation
//! - [`store`]: Storage contract and backends
//! - [`model`]: `NoteId`, `NoteMode`, `Note`
//! - [`keygen`]: Id generation
//! - [`config`]: Layered configuration
//! - [`web`]: HTTP adapter
//! - [`pages`]: HTML templates for the web adapter
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod keygen;
pub mod model;
pub mod pages;
pub mod store;
pub mod web;
