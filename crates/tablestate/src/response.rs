//! # Page Response Unpacking
//!
//! The data endpoint does not commit to one response shape. Depending on the
//! backend the rows arrive as a bare array, or under `content` (Spring pages),
//! `data`, or `items`. The total count is under `total` or `totalElements`.
//!
//! Rather than special-casing this inline, each shape is an entry in an ordered
//! adapter chain. The first adapter that finds an *array* wins; if none does,
//! the page is empty. The total falls back to the number of rows found, which
//! is only right for unpaginated responses but is the best remaining guess.

use serde_json::Value;

use crate::model::{Row, RowPage};

pub struct RowShape {
    pub name: &'static str,
    extract: fn(&Value) -> Option<&Vec<Value>>,
}

impl RowShape {
    pub fn extract<'a>(&self, raw: &'a Value) -> Option<&'a Vec<Value>> {
        (self.extract)(raw)
    }
}

pub struct TotalShape {
    pub name: &'static str,
    extract: fn(&Value) -> Option<u64>,
}

impl TotalShape {
    pub fn extract(&self, raw: &Value) -> Option<u64> {
        (self.extract)(raw)
    }
}

fn bare_array(raw: &Value) -> Option<&Vec<Value>> {
    raw.as_array()
}

fn content_rows(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("content").and_then(Value::as_array)
}

fn data_rows(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("data").and_then(Value::as_array)
}

fn items_rows(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("items").and_then(Value::as_array)
}

fn total_key(raw: &Value) -> Option<u64> {
    raw.get("total").and_then(Value::as_u64)
}

fn total_elements_key(raw: &Value) -> Option<u64> {
    raw.get("totalElements").and_then(Value::as_u64)
}

/// Row adapters, in priority order.
pub const ROW_SHAPES: &[RowShape] = &[
    RowShape {
        name: "array",
        extract: bare_array,
    },
    RowShape {
        name: "content",
        extract: content_rows,
    },
    RowShape {
        name: "data",
        extract: data_rows,
    },
    RowShape {
        name: "items",
        extract: items_rows,
    },
];

/// Total-count adapters, in priority order.
pub const TOTAL_SHAPES: &[TotalShape] = &[
    TotalShape {
        name: "total",
        extract: total_key,
    },
    TotalShape {
        name: "totalElements",
        extract: total_elements_key,
    },
];

pub fn extract_rows(raw: &Value) -> Vec<Row> {
    for shape in ROW_SHAPES {
        if let Some(rows) = shape.extract(raw) {
            tracing::trace!(shape = shape.name, "matched row shape");
            return rows.clone();
        }
    }
    tracing::debug!("no row array found in page response");
    Vec::new()
}

pub fn extract_total(raw: &Value, rows_found: usize) -> u64 {
    TOTAL_SHAPES
        .iter()
        .find_map(|shape| shape.extract(raw))
        .unwrap_or(rows_found as u64)
}

/// Unpack a raw page response into rows plus paging totals.
pub fn unpack_page(raw: &Value, page_size: u32) -> RowPage {
    let rows = extract_rows(raw);
    let total = extract_total(raw, rows.len());
    RowPage::new(rows, total, page_size)
}
