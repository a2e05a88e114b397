use super::backend::StorageBackend;
use crate::config::TableConfig;
use crate::filter::FilterClause;
use crate::model::{ColumnSpec, FieldCatalog, ViewState};
use crate::validate::validate;
use serde_json::Value;

/// Persisted, self-validating state of one table view.
///
/// Mutations go through the `update_*` methods, each of which validates the
/// result against the last seen catalog, writes it to the backend and returns
/// the new state. Storage failures are logged and the store keeps working from
/// memory.
pub struct ViewStateStore<B: StorageBackend> {
    backend: B,
    page_id: String,
    key: String,
    initial_columns: Vec<ColumnSpec>,
    config: TableConfig,
    catalog: FieldCatalog,
    state: ViewState,
}

impl<B: StorageBackend> ViewStateStore<B> {
    pub fn open(backend: B, page_id: &str, initial_columns: Vec<ColumnSpec>) -> Self {
        Self::open_with_config(backend, page_id, initial_columns, TableConfig::default())
    }

    pub fn open_with_config(
        backend: B,
        page_id: &str,
        initial_columns: Vec<ColumnSpec>,
        config: TableConfig,
    ) -> Self {
        let key = config.storage_key(page_id);
        let mut store = Self {
            backend,
            page_id: page_id.to_string(),
            key,
            state: ViewState::defaults(&initial_columns, config.items_per_page),
            initial_columns,
            config,
            catalog: FieldCatalog::empty(),
        };
        store.state = store.load();
        store
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn initial_columns(&self) -> &[ColumnSpec] {
        &self.initial_columns
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn defaults(&self) -> ViewState {
        ViewState::defaults(&self.initial_columns, self.config.items_per_page)
    }

    /// Read the persisted state, falling back to defaults when nothing is
    /// stored, the backend fails, or the stored JSON is unreadable.
    pub fn load(&self) -> ViewState {
        let raw = match self.backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.defaults(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read view state, using defaults");
                return self.defaults();
            }
        };
        decode_state(&raw, &self.initial_columns, &self.config).unwrap_or_else(|| {
            tracing::warn!(key = %self.key, "stored view state is corrupt, using defaults");
            self.defaults()
        })
    }

    /// Adopt a freshly fetched catalog and re-validate against it.
    ///
    /// An empty catalog is remembered but narrows nothing.
    pub fn apply_catalog(&mut self, catalog: FieldCatalog) -> &ViewState {
        self.catalog = catalog;
        let validated = validate(&self.state, &self.catalog, &self.initial_columns);
        if validated != self.state {
            self.state = validated;
            self.persist();
        }
        &self.state
    }

    pub fn update_search_query(&mut self, search_query: impl Into<String>) -> &ViewState {
        let next = ViewState {
            search_query: search_query.into(),
            ..self.state.clone()
        };
        self.commit(next)
    }

    pub fn update_filters(&mut self, filters: Vec<FilterClause>) -> &ViewState {
        let next = ViewState {
            filters,
            ..self.state.clone()
        };
        self.commit(next)
    }

    pub fn update_items_per_page(&mut self, items_per_page: u32) -> &ViewState {
        let next = ViewState {
            items_per_page: self.config.clamp_items_per_page(items_per_page),
            ..self.state.clone()
        };
        self.commit(next)
    }

    pub fn update_columns(&mut self, columns: Vec<ColumnSpec>) -> &ViewState {
        let next = ViewState {
            columns,
            ..self.state.clone()
        };
        self.commit(next)
    }

    pub fn update_sorting(&mut self, sort_by: Option<String>, reverse: bool) -> &ViewState {
        let next = ViewState {
            sort_by,
            reverse_sort_direction: reverse,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Forget the persisted entry and return to defaults.
    pub fn reset(&mut self) -> &ViewState {
        if let Err(e) = self.backend.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to clear view state");
        }
        self.state = self.defaults();
        &self.state
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn commit(&mut self, next: ViewState) -> &ViewState {
        let mut validated = validate(&next, &self.catalog, &self.initial_columns);
        if validated.columns.is_empty() {
            validated.columns = self.initial_columns.clone();
        }
        self.state = validated;
        self.persist();
        &self.state
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to serialize view state");
                return;
            }
        };
        if let Err(e) = self.backend.write(&self.key, &json) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist view state");
        }
    }
}

/// Decode stored JSON leniently, field by field.
///
/// Returns `None` only when the text is not a JSON object at all. Missing or
/// malformed fields take their default; filter entries that fail to decode are
/// dropped one by one.
fn decode_state(
    raw: &str,
    initial_columns: &[ColumnSpec],
    config: &TableConfig,
) -> Option<ViewState> {
    let parsed: Value = serde_json::from_str(raw).ok()?;
    let obj = parsed.as_object()?;

    let search_query = obj
        .get("searchQuery")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let filters = obj
        .get("filters")
        .and_then(Value::as_array)
        .map(|entries| decode_filters(entries))
        .unwrap_or_default();

    let items_per_page = config.items_per_page_or_default(obj.get("itemsPerPage").and_then(Value::as_u64));

    let columns = obj
        .get("columns")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<ColumnSpec>>(v).ok())
        .filter(|cols| !cols.is_empty())
        .unwrap_or_else(|| initial_columns.to_vec());

    let sort_by = obj
        .get("sortBy")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let reverse_sort_direction = obj
        .get("reverseSortDirection")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(ViewState {
        search_query,
        filters,
        items_per_page,
        columns,
        sort_by,
        reverse_sort_direction,
    })
}

fn decode_filters(entries: &[Value]) -> Vec<FilterClause> {
    let mut filters = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<FilterClause>(entry.clone()) {
            Ok(clause) => filters.push(clause),
            Err(e) => tracing::warn!(error = %e, "dropping unreadable stored filter"),
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Operator, OperatorChoice};
    use crate::model::FieldDescriptor;
    use crate::store::mem_backend::MemBackend;
    use serde_json::json;

    fn statics() -> Vec<ColumnSpec> {
        vec![ColumnSpec::new("id", "ID"), ColumnSpec::new("actions", "")]
    }

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldDescriptor::new("name", "String", "Name"),
            FieldDescriptor::new("age", "Long", "Age"),
        ])
    }

    fn age_filter() -> FilterClause {
        FilterClause::with_choice(
            FieldDescriptor::new("age", "Long", "Age"),
            OperatorChoice::with_name(Operator::Gt, "Больше"),
            json!(18),
        )
    }

    #[test]
    fn first_use_yields_defaults() {
        let backend = MemBackend::new();
        let store = ViewStateStore::open(&backend, "users", statics());
        let state = store.state();
        assert_eq!(state.search_query, "");
        assert!(state.filters.is_empty());
        assert_eq!(state.items_per_page, 10);
        assert_eq!(state.columns, statics());
        assert_eq!(state.sort_by, None);
        assert!(!state.reverse_sort_direction);
        assert!(backend.is_empty());
    }

    #[test]
    fn malformed_json_yields_defaults() {
        let backend = MemBackend::new();
        backend.write("table_state_users", "{not json").unwrap();
        let store = ViewStateStore::open(&backend, "users", statics());
        assert_eq!(store.state(), &store.defaults());
    }

    #[test]
    fn non_object_json_yields_defaults() {
        let backend = MemBackend::new();
        backend.write("table_state_users", "[1,2,3]").unwrap();
        let store = ViewStateStore::open(&backend, "users", statics());
        assert_eq!(store.state(), &store.defaults());
    }

    #[test]
    fn read_failure_yields_defaults() {
        let backend = MemBackend::new();
        backend.write("table_state_users", r#"{"searchQuery":"x"}"#).unwrap();
        backend.set_simulate_read_error(true);
        let store = ViewStateStore::open(&backend, "users", statics());
        assert_eq!(store.state().search_query, "");
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let backend = MemBackend::new();
        backend
            .write(
                "table_state_users",
                r#"{"searchQuery":"ann","itemsPerPage":0,"sortBy":""}"#,
            )
            .unwrap();
        let store = ViewStateStore::open(&backend, "users", statics());
        let state = store.state();
        assert_eq!(state.search_query, "ann");
        assert_eq!(state.items_per_page, 10);
        assert_eq!(state.sort_by, None);
        assert_eq!(state.columns, statics());
    }

    #[test]
    fn unreadable_filter_entries_are_dropped_individually() {
        let backend = MemBackend::new();
        let stored = json!({
            "filters": [
                {"field": {"fieldName": "age", "fieldType": "Long", "description": "Age"},
                 "type": {"value": ">", "name": "Больше"}, "value": 18},
                {"field": {"fieldName": "age", "fieldType": "Long", "description": "Age"},
                 "type": {"value": "~~", "name": "??"}, "value": 1},
                {"type": {"value": "==", "name": "eq"}}
            ]
        });
        backend
            .write("table_state_users", &stored.to_string())
            .unwrap();
        let store = ViewStateStore::open(&backend, "users", statics());
        assert_eq!(store.state().filters, vec![age_filter()]);
    }

    #[test]
    fn updates_are_persisted_and_survive_reload() {
        let backend = MemBackend::new();
        {
            let mut store = ViewStateStore::open(&backend, "users", statics());
            store.apply_catalog(catalog());
            store.update_search_query("john");
            store.update_filters(vec![age_filter()]);
            store.update_items_per_page(20);
            let mut cols = statics();
            cols.push(ColumnSpec::new("age", "Age").sortable());
            store.update_columns(cols);
            store.update_sorting(Some("age".into()), true);
        }

        let mut reloaded = ViewStateStore::open(&backend, "users", statics());
        let before_catalog = reloaded.state().clone();
        let after_catalog = reloaded.apply_catalog(catalog()).clone();
        assert_eq!(before_catalog, after_catalog);
        assert_eq!(after_catalog.search_query, "john");
        assert_eq!(after_catalog.filters, vec![age_filter()]);
        assert_eq!(after_catalog.items_per_page, 20);
        assert_eq!(after_catalog.columns.len(), 3);
        assert_eq!(after_catalog.sort_by.as_deref(), Some("age"));
        assert!(after_catalog.reverse_sort_direction);
    }

    #[test]
    fn blank_operator_label_survives_reload() {
        let backend = MemBackend::new();
        let unlabeled = FilterClause::with_choice(
            FieldDescriptor::new("age", "Long", "Age"),
            OperatorChoice::with_name(Operator::Gt, ""),
            json!(18),
        );
        let before = {
            let mut store = ViewStateStore::open(&backend, "users", statics());
            store.update_filters(vec![unlabeled]).clone()
        };

        let after = ViewStateStore::open(&backend, "users", statics()).state().clone();
        assert_eq!(after.filters[0].operator.name, "");
        assert_eq!(before, after);
    }

    #[test]
    fn catalog_drift_drops_stale_filters_and_persists() {
        let backend = MemBackend::new();
        let legacy = FilterClause::with_choice(
            FieldDescriptor::new("legacyField", "String", "Legacy"),
            OperatorChoice::new(Operator::Contains),
            json!("x"),
        );
        let stored = json!({ "filters": [serde_json::to_value(&legacy).unwrap()] });
        backend
            .write("table_state_users", &stored.to_string())
            .unwrap();

        let mut store = ViewStateStore::open(&backend, "users", statics());
        assert_eq!(store.state().filters.len(), 1);

        store.apply_catalog(catalog());
        assert!(store.state().filters.is_empty());

        let persisted: Value =
            serde_json::from_str(&backend.raw("table_state_users").unwrap()).unwrap();
        assert_eq!(persisted["filters"], json!([]));
    }

    #[test]
    fn filters_pass_through_before_catalog_arrives() {
        let backend = MemBackend::new();
        let mut store = ViewStateStore::open(&backend, "users", statics());
        let legacy = FilterClause::with_choice(
            FieldDescriptor::new("legacyField", "String", "Legacy"),
            OperatorChoice::new(Operator::Contains),
            json!("x"),
        );
        store.update_filters(vec![legacy]);
        assert_eq!(store.state().filters.len(), 1);
    }

    #[test]
    fn emptying_columns_restores_statics() {
        let backend = MemBackend::new();
        let mut store = ViewStateStore::open(&backend, "users", statics());
        store.update_columns(vec![]);
        assert_eq!(store.state().columns, statics());

        store.apply_catalog(catalog());
        store.update_columns(vec![ColumnSpec::new("legacyField", "Legacy")]);
        assert_eq!(store.state().columns, statics());
    }

    #[test]
    fn items_per_page_is_clamped() {
        let backend = MemBackend::new();
        let mut store = ViewStateStore::open(&backend, "users", statics());
        assert_eq!(store.update_items_per_page(1000).items_per_page, 100);
        assert_eq!(store.update_items_per_page(0).items_per_page, 1);
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let backend = MemBackend::new();
        let mut store = ViewStateStore::open(&backend, "users", statics());
        backend.set_simulate_write_error(true);
        let state = store.update_search_query("offline").clone();
        assert_eq!(state.search_query, "offline");
        assert_eq!(backend.raw("table_state_users"), None);
    }

    #[test]
    fn reset_clears_storage() {
        let backend = MemBackend::new();
        let mut store = ViewStateStore::open(&backend, "users", statics());
        store.update_search_query("john");
        assert!(backend.raw("table_state_users").is_some());

        let state = store.reset().clone();
        assert_eq!(state, store.defaults());
        assert_eq!(backend.raw("table_state_users"), None);
    }

    #[test]
    fn views_are_keyed_by_page_id() {
        let backend = MemBackend::new();
        let mut users = ViewStateStore::open(&backend, "users", statics());
        let mut roles = ViewStateStore::open(&backend, "roles", statics());
        users.update_search_query("u");
        roles.update_search_query("r");

        assert_eq!(backend.len(), 2);
        assert_eq!(
            ViewStateStore::open(&backend, "users", statics()).state().search_query,
            "u"
        );
    }

    #[test]
    fn custom_prefix_and_page_size_from_config() {
        let backend = MemBackend::new();
        let config = TableConfig {
            items_per_page: 25,
            storage_prefix: "grid_".into(),
            ..Default::default()
        };
        let mut store = ViewStateStore::open_with_config(&backend, "users", statics(), config);
        assert_eq!(store.state().items_per_page, 25);
        store.update_search_query("x");
        assert!(backend.raw("grid_users").is_some());
    }

    #[test]
    fn file_backed_view_heals_and_survives_reopen() {
        use crate::test_utils::{legacy_filter, users_catalog, users_columns, TestEnv};

        let env = TestEnv::new();
        let age = users_catalog().get("age").cloned().unwrap();
        {
            let mut store = ViewStateStore::open(&env.backend, "users", users_columns());
            store.update_filters(vec![
                legacy_filter(),
                FilterClause::new(age, Operator::Gt, 18).unwrap(),
            ]);
            assert_eq!(store.state().filters.len(), 2, "no catalog yet, nothing pruned");
            store.apply_catalog(users_catalog());
            assert_eq!(store.state().filters.len(), 1);
        }

        assert!(env.root.join("table_state_users.json").exists());
        let reopened = ViewStateStore::open(&env.backend, "users", users_columns());
        assert_eq!(reopened.state().filters.len(), 1);
        assert_eq!(reopened.state().filters[0].field_name(), "age");
    }
}
