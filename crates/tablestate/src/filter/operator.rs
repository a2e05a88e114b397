//! Comparison operators and which field kinds accept them.

use serde::{Deserialize, Serialize};

use crate::model::FieldType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
    Contains,
    NotContains,
}

pub const ALL_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Ge,
    Operator::Lt,
    Operator::Le,
    Operator::In,
    Operator::NotIn,
    Operator::Contains,
    Operator::NotContains,
];

const STRING_OPERATORS: &[Operator] = &[
    Operator::Contains,
    Operator::NotContains,
    Operator::In,
    Operator::NotIn,
];

const NUMBER_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Ge,
    Operator::Lt,
    Operator::Le,
];

const TEMPORAL_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Ge,
    Operator::Lt,
    Operator::Le,
    Operator::In,
    Operator::NotIn,
];

/// Operators a filter on a field of the given kind may use.
///
/// Unknown server types get the full set so nothing is hidden from the user.
pub fn legal_operators(kind: FieldType) -> &'static [Operator] {
    match kind {
        FieldType::String => STRING_OPERATORS,
        FieldType::Number => NUMBER_OPERATORS,
        FieldType::Date | FieldType::DateTime | FieldType::Time => TEMPORAL_OPERATORS,
        FieldType::Unknown => ALL_OPERATORS,
    }
}

impl Operator {
    /// RSQL token sent on the wire.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::In => "=in=",
            Operator::NotIn => "=out=",
            Operator::Contains => "=like=",
            Operator::NotContains => "=ilike=",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        ALL_OPERATORS.iter().copied().find(|op| op.token() == token)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "Equals",
            Operator::Ne => "Not equals",
            Operator::Gt => "Greater than",
            Operator::Ge => "Greater than or equal",
            Operator::Lt => "Less than",
            Operator::Le => "Less than or equal",
            Operator::In => "In",
            Operator::NotIn => "Not in",
            Operator::Contains => "Contains",
            Operator::NotContains => "Does not contain",
        }
    }

    /// Operand is wrapped in `*...*` wildcards.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Operator::Contains | Operator::NotContains)
    }

    /// Operand is a value list.
    pub fn is_set(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn allowed_for(&self, kind: FieldType) -> bool {
        legal_operators(kind).contains(self)
    }
}

/// An operator as picked in the UI: the operator plus the label it was shown
/// with. Persisted as `{"value": "<token>", "name": "<label>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OperatorRepr", into = "OperatorRepr")]
pub struct OperatorChoice {
    pub op: Operator,
    pub name: String,
}

impl OperatorChoice {
    pub fn new(op: Operator) -> Self {
        Self {
            op,
            name: op.label().to_string(),
        }
    }

    pub fn with_name(op: Operator, name: impl Into<String>) -> Self {
        Self {
            op,
            name: name.into(),
        }
    }
}

impl From<Operator> for OperatorChoice {
    fn from(op: Operator) -> Self {
        Self::new(op)
    }
}

#[derive(Serialize, Deserialize)]
struct OperatorRepr {
    value: String,
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<OperatorRepr> for OperatorChoice {
    type Error = String;

    fn try_from(repr: OperatorRepr) -> Result<Self, Self::Error> {
        let op = Operator::from_token(&repr.value)
            .ok_or_else(|| format!("unknown operator token '{}'", repr.value))?;
        match repr.name {
            Some(name) => Ok(Self::with_name(op, name)),
            None => Ok(Self::new(op)),
        }
    }
}

impl From<OperatorChoice> for OperatorRepr {
    fn from(choice: OperatorChoice) -> Self {
        Self {
            value: choice.op.token().to_string(),
            name: Some(choice.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for op in ALL_OPERATORS {
            assert_eq!(Operator::from_token(op.token()), Some(*op));
        }
        assert_eq!(Operator::from_token("=between="), None);
    }

    #[test]
    fn string_fields_only_get_text_operators() {
        let ops = legal_operators(FieldType::String);
        assert!(ops.contains(&Operator::Contains));
        assert!(ops.contains(&Operator::NotIn));
        assert!(!ops.contains(&Operator::Gt));
        assert!(!ops.contains(&Operator::Eq));
    }

    #[test]
    fn numbers_get_relational_without_sets() {
        let ops = legal_operators(FieldType::Number);
        assert_eq!(ops.len(), 6);
        assert!(!Operator::In.allowed_for(FieldType::Number));
        assert!(!Operator::Contains.allowed_for(FieldType::Number));
        assert!(Operator::Ge.allowed_for(FieldType::Number));
    }

    #[test]
    fn temporal_kinds_share_relational_and_sets() {
        for kind in [FieldType::Date, FieldType::DateTime, FieldType::Time] {
            assert!(Operator::Lt.allowed_for(kind));
            assert!(Operator::In.allowed_for(kind));
            assert!(!Operator::Contains.allowed_for(kind));
        }
    }

    #[test]
    fn unknown_kind_allows_everything() {
        assert_eq!(legal_operators(FieldType::Unknown).len(), ALL_OPERATORS.len());
    }

    #[test]
    fn choice_serializes_as_value_and_name() {
        let choice = OperatorChoice::with_name(Operator::Gt, "Больше");
        let json = serde_json::to_value(&choice).unwrap();
        assert_eq!(json, serde_json::json!({"value": ">", "name": "Больше"}));

        let back: OperatorChoice = serde_json::from_value(json).unwrap();
        assert_eq!(back, choice);
    }

    #[test]
    fn choice_without_name_gets_default_label() {
        let choice: OperatorChoice = serde_json::from_str(r#"{"value":"=like="}"#).unwrap();
        assert_eq!(choice.op, Operator::Contains);
        assert_eq!(choice.name, "Contains");
    }

    #[test]
    fn empty_name_is_kept() {
        let choice = OperatorChoice::with_name(Operator::Gt, "");
        let json = serde_json::to_value(&choice).unwrap();
        assert_eq!(json, serde_json::json!({"value": ">", "name": ""}));

        let back: OperatorChoice = serde_json::from_value(json).unwrap();
        assert_eq!(back.name, "");
    }

    #[test]
    fn unknown_token_fails_to_deserialize() {
        let res: Result<OperatorChoice, _> = serde_json::from_str(r#"{"value":"~~","name":"x"}"#);
        assert!(res.is_err());
    }
}
