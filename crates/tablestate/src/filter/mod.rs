//! # Filters
//!
//! A filter is a single predicate the user attached to a view: a catalog field,
//! a comparison operator and an operand. Filters are persisted with the view
//! and compiled into RSQL when a query is built.
//!
//! ## Operators per Field Kind
//!
//! Which operators make sense depends on the field's [`FieldType`]:
//!
//! | Kind | Operators |
//! |------|-----------|
//! | `String` | contains, not-contains, in, not-in |
//! | `Number` | `==` `!=` `>` `>=` `<` `<=` |
//! | `Date`, `DateTime`, `Time` | relational six + in, not-in |
//! | `Unknown` | all of the above |
//!
//! The table lives in [`legal_operators`]; [`FilterClause::new`] enforces it.
//!
//! ## Wire Tokens
//!
//! | Operator | Token |
//! |----------|-------|
//! | `Eq` / `Ne` | `==` / `!=` |
//! | `Gt` / `Ge` | `>` / `>=` |
//! | `Lt` / `Le` | `<` / `<=` |
//! | `In` / `NotIn` | `=in=` / `=out=` |
//! | `Contains` / `NotContains` | `=like=` / `=ilike=` |
//!
//! Contains-style operands are wrapped in `*` wildcards.
//!
//! [`FieldType`]: crate::model::FieldType

mod clause;
mod operator;

pub use clause::{quote_operand, FilterClause};
pub use operator::{legal_operators, Operator, OperatorChoice, ALL_OPERATORS};
