//! # Domain Model
//!
//! The data types shared by the store, the query builder and the controller.
//!
//! ## Field Catalog
//!
//! The server describes the attributes of an entity as a list of
//! [`FieldDescriptor`]s (`fieldName`, `fieldType`, `description`). The list is
//! fetched once per session and wrapped in a [`FieldCatalog`], which is the
//! vocabulary every filter and dynamic column is checked against.
//!
//! The server type tag is kept verbatim (`"Long"`, `"LocalDateTime"`, ...) so
//! persisted state round-trips exactly, while [`FieldDescriptor::kind`] maps it
//! onto the closed [`FieldType`] set the rest of the crate matches on:
//!
//! | Tag (case-insensitive) | Kind |
//! |------------------------|------|
//! | `string` | `String` |
//! | `long`, `bigdecimal`, `integer` | `Number` |
//! | `localdate`, `date` | `Date` |
//! | `localdatetime` | `DateTime` |
//! | `localtime` | `Time` |
//! | anything else | `Unknown` |
//!
//! ## Columns
//!
//! Columns come in two flavours. *Static* columns are handed to the store when
//! a view is opened and are never removed by validation. *Dynamic* columns are
//! created from a catalog field ([`ColumnSpec::from_field`]) and disappear when
//! the field leaves the catalog.
//!
//! ## View State
//!
//! [`ViewState`] is what gets persisted per view. Its JSON uses camelCase keys
//! (`searchQuery`, `itemsPerPage`, `sortBy`, `reverseSortDirection`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::filter::FilterClause;

pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Date,
    DateTime,
    Time,
    Unknown,
}

impl FieldType {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "string" => FieldType::String,
            "long" | "bigdecimal" | "integer" => FieldType::Number,
            "localdate" | "date" => FieldType::Date,
            "localdatetime" => FieldType::DateTime,
            "localtime" => FieldType::Time,
            _ => FieldType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field_name: String,
    pub field_type: String,
    #[serde(default)]
    pub description: String,
}

impl FieldDescriptor {
    pub fn new(
        field_name: impl Into<String>,
        field_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            field_type: field_type.into(),
            description: description.into(),
        }
    }

    pub fn kind(&self) -> FieldType {
        FieldType::from_tag(&self.field_type)
    }
}

/// The set of fields the server reported for an entity.
///
/// An empty catalog means "not loaded yet" (or failed to load); validation
/// treats it as "no information" rather than "no fields".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.get(field_name).is_some()
    }

    pub fn names(&self) -> HashSet<&str> {
        self.fields.iter().map(|f| f.field_name.as_str()).collect()
    }

    /// Fields free-text search expands over.
    pub fn string_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.kind() == FieldType::String)
    }
}

impl From<Vec<FieldDescriptor>> for FieldCatalog {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        Self::new(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Column width: either a pixel count or any CSS length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnWidth {
    Pixels(u32),
    Css(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<ColumnWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            width: None,
            align: None,
        }
    }

    /// Dynamic column for a catalog field. Always sortable.
    pub fn from_field(field: &FieldDescriptor) -> Self {
        Self::new(field.field_name.clone(), field.description.clone()).sortable()
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Persisted per-view preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub search_query: String,
    pub filters: Vec<FilterClause>,
    pub items_per_page: u32,
    pub columns: Vec<ColumnSpec>,
    pub sort_by: Option<String>,
    pub reverse_sort_direction: bool,
}

impl ViewState {
    pub fn defaults(initial_columns: &[ColumnSpec], items_per_page: u32) -> Self {
        Self {
            search_query: String::new(),
            filters: Vec::new(),
            items_per_page,
            columns: initial_columns.to_vec(),
            sort_by: None,
            reverse_sort_direction: false,
        }
    }

    /// The active sort, if any column is sorted.
    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort_by.as_deref().map(|field| {
            (
                field,
                SortDirection::from_reversed(self.reverse_sort_direction),
            )
        })
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }
}

/// Server-bound parameters for one data fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    /// RSQL filter expression; empty when nothing is filtered.
    pub filter: String,
    /// 0-based page index.
    pub page: u32,
    pub size: u32,
    /// `"field,asc"` or `"field,desc"`.
    pub sort: String,
}

pub type Row = Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPage {
    pub rows: Vec<Row>,
    pub total_items: u64,
    pub total_pages: u64,
}

impl RowPage {
    pub fn new(rows: Vec<Row>, total_items: u64, page_size: u32) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(page_size))
        };
        Self {
            rows,
            total_items,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_tags_are_case_insensitive() {
        assert_eq!(FieldType::from_tag("String"), FieldType::String);
        assert_eq!(FieldType::from_tag("STRING"), FieldType::String);
        assert_eq!(FieldType::from_tag("Long"), FieldType::Number);
        assert_eq!(FieldType::from_tag("BigDecimal"), FieldType::Number);
        assert_eq!(FieldType::from_tag("Integer"), FieldType::Number);
        assert_eq!(FieldType::from_tag("LocalDate"), FieldType::Date);
        assert_eq!(FieldType::from_tag("Date"), FieldType::Date);
        assert_eq!(FieldType::from_tag("LocalDateTime"), FieldType::DateTime);
        assert_eq!(FieldType::from_tag("LocalTime"), FieldType::Time);
        assert_eq!(FieldType::from_tag("UUID"), FieldType::Unknown);
    }

    #[test]
    fn field_descriptor_uses_camel_case_json() {
        let field = FieldDescriptor::new("age", "Long", "Age");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fieldName": "age", "fieldType": "Long", "description": "Age"})
        );
    }

    #[test]
    fn catalog_lists_string_fields_only() {
        let catalog = FieldCatalog::new(vec![
            FieldDescriptor::new("name", "String", "Name"),
            FieldDescriptor::new("age", "Long", "Age"),
            FieldDescriptor::new("email", "string", "Email"),
        ]);
        let names: Vec<&str> = catalog
            .string_fields()
            .map(|f| f.field_name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "email"]);
        assert!(catalog.contains("age"));
        assert!(!catalog.contains("legacyField"));
    }

    #[test]
    fn dynamic_column_is_sortable_and_labelled() {
        let col = ColumnSpec::from_field(&FieldDescriptor::new("age", "Long", "Age"));
        assert_eq!(col.key, "age");
        assert_eq!(col.label, "Age");
        assert!(col.sortable);
    }

    #[test]
    fn column_width_accepts_numbers_and_css() {
        let px: ColumnSpec =
            serde_json::from_str(r#"{"key":"id","label":"ID","width":80}"#).unwrap();
        assert_eq!(px.width, Some(ColumnWidth::Pixels(80)));
        assert!(!px.sortable);

        let css: ColumnSpec =
            serde_json::from_str(r#"{"key":"id","label":"ID","width":"20%","align":"right"}"#)
                .unwrap();
        assert_eq!(css.width, Some(ColumnWidth::Css("20%".into())));
        assert_eq!(css.align, Some(Align::Right));
    }

    #[test]
    fn row_page_rounds_total_pages_up() {
        let page = RowPage::new(vec![], 21, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(RowPage::new(vec![], 20, 10).total_pages, 2);
        assert_eq!(RowPage::new(vec![], 0, 10).total_pages, 0);
        assert_eq!(RowPage::new(vec![], 5, 0).total_pages, 0);
    }

    #[test]
    fn view_state_sort_reports_direction() {
        let mut state = ViewState::defaults(&[], DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(state.sort(), None);

        state.sort_by = Some("name".into());
        assert_eq!(state.sort(), Some(("name", SortDirection::Asc)));

        state.reverse_sort_direction = true;
        assert_eq!(state.sort(), Some(("name", SortDirection::Desc)));
    }
}
