//! # Remote Table Controller
//!
//! Drives one table view against a paginated remote API: it loads the field
//! catalog once, derives a [`Query`] from the view state whenever something
//! relevant changes, hands the query out for fetching, and publishes the
//! result.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──start_catalog_load──▶ LoadingCatalog ──finish_catalog_load──▶ CatalogReady
//!   │                                                                     │
//!   └──(no catalog source)───────────────────────────────────────────────┘
//!                                                                         │
//!                          next_fetch ◀──────── change ───────────────────┤
//!                              │                                          │
//!                              ▼                                          │
//!                         LoadingData ──finish_fetch──▶ DataReady / DataError
//! ```
//!
//! A failed catalog fetch is logged and treated as an empty catalog: the view
//! keeps working without dynamic columns, typed filters or text search.
//!
//! ## Fetch Tickets and Sequencing
//!
//! The controller does no I/O. [`RemoteTableController::next_fetch`] returns a
//! [`FetchTicket`] when a fetch is due; the caller runs it however it likes and
//! reports back with [`RemoteTableController::finish_fetch`].
//!
//! - Changes between two `next_fetch` calls coalesce into one fetch.
//! - A change whose query equals the one already in flight is absorbed by it.
//! - Every ticket carries a monotonically increasing sequence number. Only the
//!   completion of the most recently issued ticket is published; earlier ones
//!   are discarded when they arrive. Superseded requests are not cancelled at
//!   the transport level.
//! - A failed fetch keeps the previous page visible next to the error. There
//!   is no automatic retry; [`RemoteTableController::refresh`] is the retry.
//!
//! Blocking callers can skip the ticket API and use
//! [`RemoteTableController::load_catalog_from`] and
//! [`RemoteTableController::refresh_from`].
//!
//! ## What Triggers a Fetch
//!
//! | Change | Fetch | Page reset |
//! |--------|-------|------------|
//! | search submitted | yes | yes |
//! | filter added/removed | yes | yes |
//! | items per page | yes | yes |
//! | sort cycled | yes | yes |
//! | page changed | yes | - |
//! | refresh counter increased | yes | - |
//! | columns changed | only if it clears the sort | if so |

use serde_json::Value;

use crate::error::Result;
use crate::filter::FilterClause;
use crate::model::{
    ColumnSpec, FieldCatalog, FieldDescriptor, Query, Row, RowPage, SortDirection, ViewState,
};
use crate::query::build_query;
use crate::report::ReportRequest;
use crate::response::unpack_page;
use crate::source::{CatalogSource, PageSource};
use crate::store::{StorageBackend, ViewStateStore};

/// Whether the view has a "describe fields" endpoint to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    Remote,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingCatalog,
    CatalogReady,
    LoadingData,
    DataReady,
    DataError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogState {
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataStatus {
    Pending,
    Ready,
    Failed,
}

/// A fetch the caller should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: Query,
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: u64,
    query: Query,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Published,
    Failed,
    /// A newer fetch was issued after this one; the result was dropped.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    FieldsLoaded(Vec<FieldDescriptor>),
    FiltersChanged(Vec<FilterClause>),
    ColumnsChanged(Vec<ColumnSpec>),
    DataLoaded(RowPage),
}

type Listener = Box<dyn FnMut(&TableEvent)>;

pub struct RemoteTableController<B: StorageBackend> {
    store: ViewStateStore<B>,
    mode: CatalogMode,
    catalog_state: CatalogState,
    current_page: u32,
    dirty: bool,
    force: bool,
    last_refresh: u64,
    next_seq: u64,
    in_flight: Option<InFlight>,
    data: Option<RowPage>,
    data_status: DataStatus,
    error: Option<String>,
    listeners: Vec<Listener>,
}

impl<B: StorageBackend> RemoteTableController<B> {
    pub fn new(store: ViewStateStore<B>, mode: CatalogMode) -> Self {
        Self {
            store,
            mode,
            catalog_state: CatalogState::Idle,
            current_page: 1,
            dirty: true,
            force: false,
            last_refresh: 0,
            next_seq: 0,
            in_flight: None,
            data: None,
            data_status: DataStatus::Pending,
            error: None,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TableEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // --- Accessors ---

    pub fn phase(&self) -> Phase {
        match self.catalog_state {
            CatalogState::Idle => Phase::Idle,
            CatalogState::Loading => Phase::LoadingCatalog,
            CatalogState::Ready if self.in_flight.is_some() => Phase::LoadingData,
            CatalogState::Ready => match self.data_status {
                DataStatus::Pending => Phase::CatalogReady,
                DataStatus::Ready => Phase::DataReady,
                DataStatus::Failed => Phase::DataError,
            },
        }
    }

    pub fn view_state(&self) -> &ViewState {
        self.store.state()
    }

    pub fn store(&self) -> &ViewStateStore<B> {
        &self.store
    }

    pub fn catalog(&self) -> &FieldCatalog {
        self.store.catalog()
    }

    /// 1-based display page.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_data(&self) -> Option<&RowPage> {
        self.data.as_ref()
    }

    pub fn rows(&self) -> &[Row] {
        self.data.as_ref().map(|p| p.rows.as_slice()).unwrap_or(&[])
    }

    pub fn total_items(&self) -> u64 {
        self.data.as_ref().map(|p| p.total_items).unwrap_or(0)
    }

    pub fn total_pages(&self) -> u64 {
        self.data.as_ref().map(|p| p.total_pages).unwrap_or(0)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The query the current state derives to.
    pub fn query(&self) -> Query {
        build_query(
            self.store.state(),
            self.current_page,
            self.store.catalog(),
            &self.store.config().default_sort_field,
        )
    }

    /// Body for a CSV report of the visible columns under the active filters.
    pub fn report_request(&self, entity_name: &str) -> ReportRequest {
        ReportRequest::from_view(entity_name, self.store.state())
    }

    // --- Catalog ---

    /// Begin loading the field catalog.
    ///
    /// Returns `true` when the caller should fetch the catalog and report back
    /// with [`finish_catalog_load`](Self::finish_catalog_load). Returns `false`
    /// if a load is already running, already done, or no catalog is expected.
    pub fn start_catalog_load(&mut self) -> bool {
        match (self.catalog_state, self.mode) {
            (CatalogState::Idle, CatalogMode::Remote) => {
                self.catalog_state = CatalogState::Loading;
                true
            }
            (CatalogState::Idle, CatalogMode::Disabled) => {
                self.catalog_state = CatalogState::Ready;
                false
            }
            _ => false,
        }
    }

    pub fn finish_catalog_load(&mut self, result: Result<Vec<FieldDescriptor>>) {
        if self.catalog_state != CatalogState::Loading {
            tracing::debug!("ignoring catalog completion with no load in progress");
            return;
        }
        self.catalog_state = CatalogState::Ready;

        let fields = match result {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(page_id = self.store.page_id(), error = %e, "failed to load field catalog, continuing without it");
                return;
            }
        };

        let before_filters = self.store.state().filters.clone();
        let before_columns = self.store.state().columns.clone();
        self.store.apply_catalog(FieldCatalog::new(fields.clone()));
        self.emit(TableEvent::FieldsLoaded(fields));

        let after = self.store.state().clone();
        if after.filters != before_filters {
            self.emit(TableEvent::FiltersChanged(after.filters));
        }
        if after.columns != before_columns {
            self.emit(TableEvent::ColumnsChanged(after.columns));
        }
        self.clear_orphaned_sort();
        self.dirty = true;
    }

    pub fn load_catalog_from<S: CatalogSource + ?Sized>(&mut self, source: &mut S) {
        if self.start_catalog_load() {
            let result = source.fetch_fields();
            self.finish_catalog_load(result);
        }
    }

    // --- Mutations ---

    pub fn submit_search(&mut self, text: impl Into<String>) {
        self.store.update_search_query(text);
        self.restart_paging();
    }

    pub fn set_filters(&mut self, filters: Vec<FilterClause>) {
        let filters = self.store.update_filters(filters).filters.clone();
        self.emit(TableEvent::FiltersChanged(filters));
        self.restart_paging();
    }

    pub fn add_filter(&mut self, clause: FilterClause) {
        let mut filters = self.store.state().filters.clone();
        filters.push(clause);
        self.set_filters(filters);
    }

    /// Remove the filter at `index`. Out-of-range indexes are ignored.
    pub fn remove_filter(&mut self, index: usize) {
        let mut filters = self.store.state().filters.clone();
        if index >= filters.len() {
            return;
        }
        filters.remove(index);
        self.set_filters(filters);
    }

    /// Replace the column set. Does not refetch unless it orphans the sort.
    pub fn set_columns(&mut self, columns: Vec<ColumnSpec>) {
        let columns = self.store.update_columns(columns).columns.clone();
        self.emit(TableEvent::ColumnsChanged(columns));
        self.clear_orphaned_sort();
    }

    /// Show or hide the dynamic column for a catalog field.
    pub fn toggle_column(&mut self, field_name: &str, visible: bool) {
        let state = self.store.state();
        let mut columns = state.columns.clone();
        if visible {
            if state.has_column(field_name) {
                return;
            }
            let Some(field) = self.store.catalog().get(field_name) else {
                tracing::debug!(field = field_name, "cannot show column for unknown field");
                return;
            };
            columns.push(ColumnSpec::from_field(field));
        } else {
            if !state.has_column(field_name) {
                return;
            }
            columns.retain(|c| c.key != field_name);
        }
        self.set_columns(columns);
    }

    pub fn set_items_per_page(&mut self, items_per_page: u32) {
        self.store.update_items_per_page(items_per_page);
        self.restart_paging();
    }

    /// Cycle the sort on `field`: unsorted → ascending → descending → unsorted.
    ///
    /// Ignored unless a sortable column with that key is shown.
    pub fn toggle_sort(&mut self, field: &str) {
        let state = self.store.state();
        if !state.columns.iter().any(|c| c.key == field && c.sortable) {
            return;
        }
        let (sort_by, reverse) = match state.sort() {
            Some((current, direction)) if current == field => match direction {
                SortDirection::Asc => (Some(field.to_string()), true),
                SortDirection::Desc => (None, false),
            },
            _ => (Some(field.to_string()), false),
        };
        self.store.update_sorting(sort_by, reverse);
        self.restart_paging();
    }

    /// Go to a 1-based display page.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.current_page {
            self.current_page = page;
            self.dirty = true;
        }
    }

    /// Feed the externally owned refresh counter. Only increases trigger a fetch.
    pub fn set_refresh_trigger(&mut self, counter: u64) {
        if counter > self.last_refresh {
            self.last_refresh = counter;
            self.refresh();
        }
    }

    /// Refetch the current query even if an identical one is in flight.
    pub fn refresh(&mut self) {
        self.dirty = true;
        self.force = true;
    }

    /// Restore defaults and clear the persisted entry.
    pub fn reset(&mut self) {
        let state = self.store.reset().clone();
        self.emit(TableEvent::FiltersChanged(state.filters));
        self.emit(TableEvent::ColumnsChanged(state.columns));
        self.restart_paging();
    }

    // --- Fetching ---

    /// The fetch to run now, if one is due.
    pub fn next_fetch(&mut self) -> Option<FetchTicket> {
        if self.catalog_state == CatalogState::Idle && self.mode == CatalogMode::Disabled {
            self.catalog_state = CatalogState::Ready;
        }
        if self.catalog_state != CatalogState::Ready || !self.dirty {
            return None;
        }

        let query = self.query();
        self.dirty = false;
        let force = std::mem::take(&mut self.force);

        if let Some(flight) = &self.in_flight {
            if flight.query == query && !force {
                tracing::debug!(seq = flight.seq, "query already in flight");
                return None;
            }
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        tracing::debug!(seq, filter = %query.filter, page = query.page, size = query.size, sort = %query.sort, "dispatching fetch");
        self.in_flight = Some(InFlight {
            seq,
            query: query.clone(),
        });
        Some(FetchTicket { seq, query })
    }

    /// Report the result of the fetch issued as ticket `seq`.
    pub fn finish_fetch(&mut self, seq: u64, result: Result<Value>) -> FetchOutcome {
        let flight = match self.in_flight.take() {
            Some(flight) if flight.seq == seq => flight,
            other => {
                tracing::debug!(seq, "discarding stale fetch result");
                self.in_flight = other;
                return FetchOutcome::Discarded;
            }
        };

        match result {
            Ok(raw) => {
                let page = unpack_page(&raw, flight.query.size);
                self.data = Some(page.clone());
                self.data_status = DataStatus::Ready;
                self.error = None;
                self.emit(TableEvent::DataLoaded(page));
                FetchOutcome::Published
            }
            Err(e) => {
                tracing::warn!(page_id = self.store.page_id(), seq, error = %e, "failed to load table data");
                self.data_status = DataStatus::Failed;
                self.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Run the due fetch, if any, against a blocking source.
    pub fn refresh_from<S: PageSource + ?Sized>(&mut self, source: &mut S) -> Option<FetchOutcome> {
        let ticket = self.next_fetch()?;
        let result = source.fetch_page(&ticket.query);
        Some(self.finish_fetch(ticket.seq, result))
    }

    // --- Internals ---

    fn restart_paging(&mut self) {
        self.current_page = 1;
        self.dirty = true;
    }

    /// Drop the sort if no shown, sortable column backs it anymore.
    fn clear_orphaned_sort(&mut self) {
        let state = self.store.state();
        let Some(sort_by) = state.sort_by.as_deref() else {
            return;
        };
        if state.columns.iter().any(|c| c.key == sort_by && c.sortable) {
            return;
        }
        tracing::debug!(sort_by, "sorted column is gone, clearing sort");
        self.store.update_sorting(None, false);
        self.restart_paging();
    }

    fn emit(&mut self, event: TableEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}
