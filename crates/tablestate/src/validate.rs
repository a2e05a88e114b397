//! # Catalog Validation
//!
//! Persisted view state outlives the server schema it was built against. Every
//! time a catalog becomes available the state is narrowed to what the catalog
//! still knows about:
//!
//! - **Filters**: a clause survives iff its field name is in the catalog.
//!   Stale clauses are dropped, never repaired.
//! - **Columns**: a column survives if it is one of the static columns the view
//!   was opened with, or if its key names a catalog field. If nothing would
//!   survive, the static columns are returned instead.
//!
//! An empty catalog means "not loaded", so every function here is a no-op for
//! it. Validation must not wipe state before the catalog has arrived.
//!
//! All functions are pure and idempotent for a fixed catalog and static column
//! set.

use crate::filter::FilterClause;
use crate::model::{ColumnSpec, FieldCatalog, ViewState};

pub fn validate_filters(filters: &[FilterClause], catalog: &FieldCatalog) -> Vec<FilterClause> {
    if catalog.is_empty() {
        return filters.to_vec();
    }
    let names = catalog.names();
    let kept: Vec<FilterClause> = filters
        .iter()
        .filter(|f| names.contains(f.field_name()))
        .cloned()
        .collect();
    if kept.len() != filters.len() {
        tracing::debug!(
            dropped = filters.len() - kept.len(),
            "dropped filters referencing unknown fields"
        );
    }
    kept
}

pub fn validate_columns(
    columns: &[ColumnSpec],
    catalog: &FieldCatalog,
    initial_columns: &[ColumnSpec],
) -> Vec<ColumnSpec> {
    if catalog.is_empty() {
        return columns.to_vec();
    }
    let names = catalog.names();
    let kept: Vec<ColumnSpec> = columns
        .iter()
        .filter(|c| {
            initial_columns.iter().any(|i| i.key == c.key) || names.contains(c.key.as_str())
        })
        .cloned()
        .collect();

    if kept.is_empty() {
        return initial_columns.to_vec();
    }
    kept
}

pub fn validate(
    state: &ViewState,
    catalog: &FieldCatalog,
    initial_columns: &[ColumnSpec],
) -> ViewState {
    if catalog.is_empty() {
        return state.clone();
    }
    ViewState {
        filters: validate_filters(&state.filters, catalog),
        columns: validate_columns(&state.columns, catalog, initial_columns),
        ..state.clone()
    }
}
