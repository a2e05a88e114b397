//! # Tablestate Architecture
//!
//! Tablestate is the **state engine behind a remote data table**: the part of a
//! search/filter/sort/paginate screen that is not rendering. It owns what the
//! user asked for, turns it into a query for a paginated API, and remembers the
//! user's preferences between sessions.
//!
//! It is UI-agnostic and does no network I/O of its own. A web front end, a TUI
//! or a test harness drive it the same way.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller (controller.rs)                                 │
//! │  - Catalog/data lifecycle, fetch tickets, sequencing        │
//! │  - Page number, loading flag, last error, observers         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Pure Core (query.rs, validate.rs, filter/, response.rs)    │
//! │  - ViewState + catalog → Query                              │
//! │  - ViewState + catalog → validated ViewState                │
//! │  - raw response → RowPage                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - ViewStateStore: self-healing per-view preferences        │
//! │  - StorageBackend trait: FsBackend, MemBackend              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in the Controller
//!
//! The controller hands out a [`controller::FetchTicket`] and expects the
//! result back; how the request is made (blocking client, async runtime,
//! canned JSON in a test) is the caller's business. The [`source`] traits exist
//! for callers that prefer to pass a fetcher in.
//!
//! ## Typical Use
//!
//! ```no_run
//! use tablestate::controller::CatalogMode;
//! use tablestate::init::initialize;
//! use tablestate::model::{ColumnSpec, FieldDescriptor, Query};
//! use serde_json::json;
//!
//! let ctx = initialize(None)?;
//! let mut table = ctx.controller(
//!     "users",
//!     vec![ColumnSpec::new("id", "ID"), ColumnSpec::new("name", "Name").sortable()],
//!     CatalogMode::Remote,
//! );
//!
//! table.load_catalog_from(&mut || -> tablestate::Result<Vec<FieldDescriptor>> {
//!     Ok(vec![FieldDescriptor::new("name", "String", "Name")])
//! });
//! table.submit_search("john");
//! table.refresh_from(&mut |q: &Query| -> tablestate::Result<serde_json::Value> {
//!     Ok(json!({"content": [], "totalElements": 0, "echo": q.filter}))
//! });
//! # Ok::<(), tablestate::TableError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`controller`]: The table state machine
//! - [`store`]: Persisted view state and storage backends
//! - [`query`]: Query derivation (RSQL filter, sort, paging)
//! - [`filter`]: Operators and filter clauses
//! - [`validate`]: Pruning state against the field catalog
//! - [`response`]: Unpacking page responses of varying shape
//! - [`report`]: CSV report request bodies
//! - [`model`]: Core data types
//! - [`config`]: Configuration management
//! - [`init`]: Default on-disk setup
//! - [`error`]: Error types

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod init;
pub mod model;
pub mod query;
pub mod report;
pub mod response;
pub mod source;
pub mod store;
pub mod validate;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use error::{Result, TableError};
