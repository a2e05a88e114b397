//! CSV report request body.
//!
//! The report endpoint exports every row matching the active filters, with one
//! CSV column per visible table column. Free-text search is not part of the
//! export.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::ViewState;
use crate::query::filter_expression;

pub const DEFAULT_REPORT_FILE_NAME: &str = "report.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub entity_name: String,
    /// Column keys in display order.
    pub fields: Vec<String>,
    /// Column key to header label.
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsql_filter: Option<String>,
}

impl ReportRequest {
    pub fn from_view(entity_name: &str, state: &ViewState) -> Self {
        Self {
            entity_name: entity_name.to_string(),
            fields: state.columns.iter().map(|c| c.key.clone()).collect(),
            headers: state
                .columns
                .iter()
                .map(|c| (c.key.clone(), c.label.clone()))
                .collect(),
            rsql_filter: filter_expression(&state.filters),
        }
    }
}

/// File name from a `Content-Disposition` header, or [`DEFAULT_REPORT_FILE_NAME`].
pub fn report_file_name(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(|header| {
            let (_, rest) = header.split_once("filename=\"")?;
            let (name, _) = rest.split_once('"')?;
            (!name.is_empty()).then(|| name.to_string())
        })
        .unwrap_or_else(|| DEFAULT_REPORT_FILE_NAME.to_string())
}
