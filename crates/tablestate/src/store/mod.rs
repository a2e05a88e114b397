//! # Storage Layer
//!
//! This module persists per-view preferences. The [`StorageBackend`] trait
//! abstracts the raw key-value medium; [`ViewStateStore`] owns the state of one
//! view on top of it.
//!
//! ## Self-Healing State
//!
//! Persisted view state is written by an older version of the server schema
//! more often than not. The store therefore assumes the stored copy is
//! *always potentially stale* and heals it lazily:
//!
//! 1. **Load**: missing entry → defaults. Unparseable JSON → defaults (logged).
//!    Individual malformed fields → that field's default.
//! 2. **Catalog arrival**: filters on unknown fields are dropped, dynamic
//!    columns on unknown fields are removed, and the healed state is written
//!    back.
//! 3. **Update**: every mutation is validated before it is written, so the
//!    stored copy is always the last validated state.
//!
//! Storage failures never surface to the caller. The store logs them and keeps
//! serving the in-memory state.
//!
//! ## Storage Layout
//!
//! One entry per view, keyed `table_state_<pageId>` (prefix configurable):
//!
//! ```text
//! table_state_users  →  {"searchQuery":"","filters":[...],"itemsPerPage":10,
//!                        "columns":[...],"sortBy":null,"reverseSortDirection":false}
//! ```
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one JSON file per key in a data directory.
//! - [`mem_backend::MemBackend`]: in-memory map, for tests and embedding.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod view_store;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use view_store::ViewStateStore;
