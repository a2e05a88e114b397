use crate::filter::{FilterClause, Operator, OperatorChoice};
use crate::model::{ColumnSpec, FieldCatalog, FieldDescriptor};
use serde_json::Value;

/// Catalog of a small "users" entity: one field of each kind.
pub fn users_catalog() -> FieldCatalog {
    FieldCatalog::new(vec![
        FieldDescriptor::new("name", "String", "Name"),
        FieldDescriptor::new("email", "string", "Email"),
        FieldDescriptor::new("age", "Long", "Age"),
        FieldDescriptor::new("birthday", "LocalDate", "Birthday"),
        FieldDescriptor::new("lastLogin", "LocalDateTime", "Last login"),
    ])
}

/// Static columns every "users" view starts with.
pub fn users_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("id", "ID"),
        ColumnSpec::new("name", "Name").sortable(),
        ColumnSpec::new("actions", ""),
    ]
}

/// A clause on a field that is not in [`users_catalog`].
pub fn legacy_filter() -> FilterClause {
    FilterClause::with_choice(
        FieldDescriptor::new("legacyField", "String", "Legacy"),
        OperatorChoice::new(Operator::Contains),
        Value::from("x"),
    )
}

#[cfg(test)]
pub use env::TestEnv;
