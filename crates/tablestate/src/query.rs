//! # Query Derivation
//!
//! Turns a [`ViewState`], the display page and the field catalog into the
//! parameters of one data fetch. The function is pure: the same inputs always
//! produce the same [`Query`].
//!
//! ## Filter Expression (RSQL)
//!
//! 1. **Search**: non-blank search text becomes `field=like=*text*` for every
//!    string-typed catalog field, joined with `,` (OR). Without string fields
//!    the text is dropped.
//! 2. **Filters**: each clause compiles to `field<token>value`, joined with `;`
//!    (AND). Clauses without a value are skipped.
//! 3. **Combining**: the two groups are joined with `;`. RSQL binds `;` tighter
//!    than `,`, so a search group of more than one term is parenthesised when a
//!    filter group follows it.
//!
//! ```text
//! name=like=*john*;age>18
//! (name=like=*jo*,email=like=*jo*);age>18
//! name=like="*john smith*"
//! ```
//!
//! Operands containing whitespace or RSQL reserved characters (`" ' ( ) ; , = ! ~ < >`)
//! are double-quoted with `"` and `\` escaped, so user text cannot change the
//! structure of the expression.
//!
//! ## Paging and Sorting
//!
//! - Display pages are 1-based; the wire page is 0-based.
//! - Sort is `field,asc` / `field,desc`; with no sorted column it is the
//!   fallback field, descending.

use crate::filter::{quote_operand, FilterClause};
use crate::model::{FieldCatalog, Query, SortDirection, ViewState};

pub const OR_SEPARATOR: &str = ",";
pub const AND_SEPARATOR: &str = ";";

pub const DEFAULT_SORT_FIELD: &str = "cdt";

struct SearchGroup {
    expression: String,
    terms: usize,
}

fn search_group(search: &str, catalog: &FieldCatalog) -> Option<SearchGroup> {
    let text = search.trim();
    if text.is_empty() {
        return None;
    }
    let terms: Vec<String> = catalog
        .string_fields()
        .map(|f| format!("{}=like={}", f.field_name, quote_operand(&format!("*{}*", text))))
        .collect();
    if terms.is_empty() {
        return None;
    }
    Some(SearchGroup {
        terms: terms.len(),
        expression: terms.join(OR_SEPARATOR),
    })
}

/// AND-joined compilation of the given filters, `None` if nothing compiles.
pub fn filter_expression(filters: &[FilterClause]) -> Option<String> {
    let parts: Vec<String> = filters.iter().filter_map(FilterClause::compile).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(AND_SEPARATOR))
    }
}

/// Full RSQL expression for the view's search text and filters.
pub fn build_filter(state: &ViewState, catalog: &FieldCatalog) -> String {
    let search = search_group(&state.search_query, catalog);
    let filters = filter_expression(&state.filters);

    match (search, filters) {
        (None, None) => String::new(),
        (Some(s), None) => s.expression,
        (None, Some(f)) => f,
        (Some(s), Some(f)) if s.terms > 1 => format!("({}){}{}", s.expression, AND_SEPARATOR, f),
        (Some(s), Some(f)) => format!("{}{}{}", s.expression, AND_SEPARATOR, f),
    }
}

pub fn build_sort(state: &ViewState, fallback_field: &str) -> String {
    match state.sort() {
        Some((field, direction)) => format!("{},{}", field, direction.as_str()),
        None => format!("{},{}", fallback_field, SortDirection::Desc.as_str()),
    }
}

/// Derive the fetch parameters for `display_page` (1-based).
pub fn build_query(
    state: &ViewState,
    display_page: u32,
    catalog: &FieldCatalog,
    fallback_sort_field: &str,
) -> Query {
    Query {
        filter: build_filter(state, catalog),
        page: display_page.saturating_sub(1),
        size: state.items_per_page,
        sort: build_sort(state, fallback_sort_field),
    }
}
