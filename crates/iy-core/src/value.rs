use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdleError;

/// A dynamically typed script value.
///
/// Arithmetic and comparison only combine values of the same kind. Any other
/// pairing degrades to a defined result (the left operand, or `false`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Float,
    String,
    Bool,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "boolean",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl FromStr for CompareOp {
    type Err = IdleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            other => Err(IdleError::unknown_operator(other)),
        }
    }
}

impl GameValue {
    /// Infers a literal: integer, then finite float, then boolean, else string.
    pub fn from_literal(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Int(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            if value.is_finite() {
                return Self::Float(value);
            }
        }
        if let Some(value) = parse_bool_literal(raw) {
            return Self::Bool(value);
        }
        Self::String(raw.to_string())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn same_kind(&self, other: &GameValue) -> bool {
        self.kind() == other.kind()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn add(&self, other: &GameValue) -> GameValue {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => Self::Int(left.wrapping_add(*right)),
            (Self::Float(left), Self::Float(right)) => Self::Float(left + right),
            (Self::String(left), Self::String(right)) => Self::String(format!("{}{}", left, right)),
            (Self::Bool(left), Self::Bool(right)) => Self::Bool(*left || *right),
            _ => self.clone(),
        }
    }

    pub fn subtract(&self, other: &GameValue) -> GameValue {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => Self::Int(left.wrapping_sub(*right)),
            (Self::Float(left), Self::Float(right)) => Self::Float(left - right),
            _ => self.clone(),
        }
    }

    pub fn multiply(&self, other: &GameValue) -> GameValue {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => Self::Int(left.wrapping_mul(*right)),
            (Self::Float(left), Self::Float(right)) => Self::Float(left * right),
            _ => self.clone(),
        }
    }

    pub fn divide(&self, other: &GameValue) -> GameValue {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) if *right != 0 => {
                Self::Int(left.wrapping_div(*right))
            }
            (Self::Float(left), Self::Float(right)) if *right != 0.0 => Self::Float(left / right),
            _ => self.clone(),
        }
    }

    pub fn compare(&self, other: &GameValue, op: CompareOp) -> bool {
        match op {
            CompareOp::Eq => self.equals(other),
            CompareOp::Ne => self.same_kind(other) && !self.equals(other),
            CompareOp::Lt => self.less_than(other),
            CompareOp::Gt => self.greater_than(other),
            CompareOp::Le => self.less_than(other) || self.numeric_equals(other),
            CompareOp::Ge => self.greater_than(other) || self.numeric_equals(other),
        }
    }

    fn equals(&self, other: &GameValue) -> bool {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::Float(left), Self::Float(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            _ => false,
        }
    }

    /// Ordering operators only ever hold between numbers of one kind.
    fn numeric_equals(&self, other: &GameValue) -> bool {
        self.is_numeric() && self.equals(other)
    }

    fn less_than(&self, other: &GameValue) -> bool {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => left < right,
            (Self::Float(left), Self::Float(right)) => left < right,
            _ => false,
        }
    }

    fn greater_than(&self, other: &GameValue) -> bool {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => left > right,
            (Self::Float(left), Self::Float(right)) => left > right,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Display form of any kind; floats keep six decimal places.
    pub fn as_string(&self) -> String {
        self.to_string()
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            _ => false,
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(value) => *value,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            Self::Float(value) => *value,
            _ => 0.0,
        }
    }

    /// Zero value of the given kind.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int => Self::Int(0),
            ValueKind::Float => Self::Float(0.0),
            ValueKind::String => Self::String(String::new()),
            ValueKind::Bool => Self::Bool(false),
        }
    }
}

impl fmt::Display for GameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{:.6}", value),
            Self::String(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for GameValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for GameValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for GameValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for GameValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for GameValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

pub fn parse_bool_literal(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    fn samples() -> Vec<GameValue> {
        vec![
            GameValue::Int(10),
            GameValue::Int(0),
            GameValue::Float(2.5),
            GameValue::Float(0.0),
            GameValue::String("abc".to_string()),
            GameValue::Bool(true),
            GameValue::Bool(false),
        ]
    }

    #[test]
    fn add_combines_matching_kinds() {
        assert_eq!(GameValue::Int(2).add(&GameValue::Int(3)), GameValue::Int(5));
        assert_eq!(
            GameValue::Float(1.5).add(&GameValue::Float(1.0)),
            GameValue::Float(2.5)
        );
        assert_eq!(
            GameValue::from("ab").add(&GameValue::from("cd")),
            GameValue::from("abcd")
        );
        assert_eq!(
            GameValue::Bool(false).add(&GameValue::Bool(true)),
            GameValue::Bool(true)
        );
    }

    #[test]
    fn mismatched_arithmetic_returns_left_operand() {
        let left = GameValue::Int(4);
        assert_eq!(left.add(&GameValue::Float(1.0)), left);
        assert_eq!(left.subtract(&GameValue::from("x")), left);
        assert_eq!(left.multiply(&GameValue::Bool(true)), left);
        assert_eq!(
            GameValue::from("a").subtract(&GameValue::from("b")),
            GameValue::from("a")
        );
        assert_eq!(
            GameValue::Bool(true).multiply(&GameValue::Bool(true)),
            GameValue::Bool(true)
        );
    }

    #[test]
    fn divide_by_zero_is_a_no_op() {
        assert_eq!(GameValue::Int(10).divide(&GameValue::Int(0)), GameValue::Int(10));
        assert_eq!(
            GameValue::Float(3.0).divide(&GameValue::Float(0.0)),
            GameValue::Float(3.0)
        );
        assert_eq!(GameValue::Int(10).divide(&GameValue::Int(3)), GameValue::Int(3));
        assert_eq!(
            GameValue::Float(3.0).divide(&GameValue::Float(2.0)),
            GameValue::Float(1.5)
        );
    }

    #[test]
    fn arithmetic_and_compare_never_panic_for_any_pairing() {
        let ops = [
            CompareOp::Lt,
            CompareOp::Gt,
            CompareOp::Le,
            CompareOp::Ge,
            CompareOp::Eq,
            CompareOp::Ne,
        ];
        for left in samples() {
            for right in samples() {
                let _ = left.add(&right);
                let _ = left.subtract(&right);
                let _ = left.multiply(&right);
                let _ = left.divide(&right);
                for op in ops {
                    let result = left.compare(&right, op);
                    if !left.same_kind(&right) {
                        assert!(!result, "{:?} {} {:?}", left, op.symbol(), right);
                    }
                }
            }
        }
    }

    #[test]
    fn compare_orders_numeric_kinds_only() {
        assert!(GameValue::Int(1).compare(&GameValue::Int(2), CompareOp::Lt));
        assert!(GameValue::Int(2).compare(&GameValue::Int(2), CompareOp::Le));
        assert!(GameValue::Float(2.5).compare(&GameValue::Float(2.0), CompareOp::Ge));
        assert!(!GameValue::from("b").compare(&GameValue::from("a"), CompareOp::Gt));
        assert!(GameValue::from("a").compare(&GameValue::from("a"), CompareOp::Eq));
        assert!(GameValue::Bool(true).compare(&GameValue::Bool(false), CompareOp::Ne));
        assert!(!GameValue::Int(1).compare(&GameValue::Float(1.0), CompareOp::Eq));
    }

    #[test]
    fn ordering_on_equal_strings_and_bools_is_false() {
        let pairs = [
            (GameValue::from("a"), GameValue::from("a")),
            (GameValue::Bool(true), GameValue::Bool(true)),
            (GameValue::Bool(false), GameValue::Bool(false)),
        ];
        for (left, right) in pairs {
            for op in [CompareOp::Lt, CompareOp::Gt, CompareOp::Le, CompareOp::Ge] {
                assert!(!left.compare(&right, op), "{:?} {:?} {:?}", left, op, right);
            }
            assert!(left.compare(&right, CompareOp::Eq));
        }
        assert!(GameValue::Int(3).compare(&GameValue::Int(3), CompareOp::Ge));
        assert!(GameValue::Float(0.5).compare(&GameValue::Float(0.5), CompareOp::Le));
    }

    #[test]
    fn casts_fall_back_to_zero_values() {
        assert_eq!(GameValue::from("x").as_int(), 0);
        assert_eq!(GameValue::Int(3).as_float(), 0.0);
        assert!(!GameValue::Int(1).as_bool());
        assert_eq!(GameValue::Bool(true).as_str(), None);
        assert_eq!(GameValue::Float(1.5).as_string(), "1.500000");
        assert_eq!(GameValue::Int(7).as_string(), "7");
        assert_eq!(GameValue::Bool(false).to_string(), "false");
        assert_eq!(GameValue::zero(ValueKind::String), GameValue::from(""));
    }

    #[test]
    fn literal_inference_prefers_int_then_float_then_bool() {
        assert_eq!(GameValue::from_literal("42"), GameValue::Int(42));
        assert_eq!(GameValue::from_literal("-3"), GameValue::Int(-3));
        assert_eq!(GameValue::from_literal("0.5"), GameValue::Float(0.5));
        assert_eq!(GameValue::from_literal("1"), GameValue::Int(1));
        assert_eq!(GameValue::from_literal("TRUE"), GameValue::Bool(true));
        assert_eq!(GameValue::from_literal("f"), GameValue::Bool(false));
        assert_eq!(GameValue::from_literal("nan"), GameValue::from("nan"));
        assert_eq!(GameValue::from_literal("Manager"), GameValue::from("Manager"));
    }

    #[test]
    fn compare_op_parses_symbols() {
        assert_eq!("<=".parse::<CompareOp>().expect("op"), CompareOp::Le);
        let error = "=~".parse::<CompareOp>().expect_err("unknown op");
        assert_eq!(error.code, crate::error::SCRIPT_UNKNOWN_OPERATOR);
    }

    #[test]
    fn untagged_serde_keeps_kinds() {
        let values = vec![
            GameValue::Int(3),
            GameValue::Float(1.25),
            GameValue::Bool(true),
            GameValue::from("text"),
        ];
        let json = serde_json::to_string(&values).expect("serialize");
        assert_eq!(json, r#"[3,1.25,true,"text"]"#);
        let parsed: Vec<GameValue> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, values);
    }
}
