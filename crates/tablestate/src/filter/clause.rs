//! A single user predicate and its RSQL rendering.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Operator, OperatorChoice};
use crate::error::{Result, TableError};
use crate::model::{FieldDescriptor, FieldType};

/// Accepted `datetime-local` input shapes and the wire shape each maps to.
const DATETIME_FORMATS: &[(&str, &str)] = &[
    ("%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"),
    ("%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"),
];

/// One predicate: field, operator and operand.
///
/// The operator key is `"type"` in persisted JSON; `"operator"` is accepted
/// when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: FieldDescriptor,
    #[serde(rename = "type", alias = "operator")]
    pub operator: OperatorChoice,
    #[serde(default)]
    pub value: Value,
}

impl FilterClause {
    /// Build a clause, rejecting operators the field's kind does not support.
    pub fn new(field: FieldDescriptor, op: Operator, value: impl Into<Value>) -> Result<Self> {
        if !op.allowed_for(field.kind()) {
            return Err(TableError::IllegalOperator {
                field: field.field_name.clone(),
                operator: op.token().to_string(),
            });
        }
        Ok(Self {
            field,
            operator: OperatorChoice::new(op),
            value: value.into(),
        })
    }

    /// Build a clause with an explicit operator label, without checking legality.
    pub fn with_choice(field: FieldDescriptor, operator: OperatorChoice, value: Value) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field.field_name
    }

    pub fn op(&self) -> Operator {
        self.operator.op
    }

    /// Render as `field<token>value`. A clause without a value renders to nothing.
    pub fn compile(&self) -> Option<String> {
        if self.value.is_null() {
            return None;
        }
        let op = self.op();
        let operand = render_operand(self.field.kind(), op, &self.value);
        Some(format!("{}{}{}", self.field.field_name, op.token(), operand))
    }

    /// Human text for a filter chip: `"<description> <operator name> <value>"`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {}",
            self.field.description,
            self.operator.name.to_lowercase(),
            display_value(&self.value)
        )
    }
}

/// Characters that end an unquoted RSQL argument.
const RSQL_RESERVED: &[char] = &['"', '\'', '(', ')', ';', ',', '=', '!', '~', '<', '>'];

/// An RSQL argument for `text`: verbatim when it is safe unquoted, otherwise
/// double-quoted with `"` and `\` backslash-escaped.
pub fn quote_operand(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || RSQL_RESERVED.contains(&c) || c == '\\');
    if !needs_quotes {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn render_operand(kind: FieldType, op: Operator, value: &Value) -> String {
    if op.is_wildcard() {
        return quote_operand(&format!("*{}*", render_scalar(kind, value)));
    }
    if op.is_set() {
        if let Value::Array(items) = value {
            let rendered: Vec<String> = items
                .iter()
                .map(|v| quote_operand(&render_scalar(kind, v)))
                .collect();
            return format!("({})", rendered.join(","));
        }
    }
    quote_operand(&render_scalar(kind, value))
}

fn render_scalar(kind: FieldType, value: &Value) -> String {
    match value {
        Value::String(s) if kind == FieldType::DateTime => normalize_datetime(s),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| render_scalar(kind, v))
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn normalize_datetime(raw: &str) -> String {
    for (input, output) in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, input) {
            return dt.format(output).to_string();
        }
    }
    raw.to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
