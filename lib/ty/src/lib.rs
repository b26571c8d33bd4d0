//! # Type System
//!
//! The three column types a table can declare (`int`, `str` and `bool`) and the
//! values that inhabit them.
//!
//! Example Usage:
//!
//! ```
//! use ty::{DataType, DataTypeKind};
//!
//! let age = DataType::Text("28".to_string());
//! assert_eq!(age.coerce_to(DataTypeKind::Integer), Ok(DataType::Integer(28)));
//!
//! let active = DataType::Integer(1);
//! assert_eq!(active.coerce_to(DataTypeKind::Boolean), Ok(DataType::Boolean(true)));
//! ```
//!
//! ## Coercion:
//!
//! Values arrive from the command line as raw literals: bare integers, bare
//! booleans or quoted strings. Before a value is stored or compared it is
//! coerced to the declared type of its column:
//!
//! - `int` accepts integers and strings holding an integer literal.
//! - `str` accepts strings only.
//! - `bool` accepts booleans and the literals `true`, `false`, `1`, `0`
//!   (case-insensitive), bare or quoted.
//!
//! ## Serialization/Deserialization:
//!
//! [`DataType`] serializes untagged, so a stored row reads as plain JSON scalars.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TypeError {
    #[error("expected type {expected}, but found {found}")]
    IncompatibleType {
        expected: DataTypeKind,
        found: DataTypeKind,
    },
    #[error("cannot cast {literal} to {to}")]
    InvalidCast { literal: String, to: DataTypeKind },
}

/// Returned when a declared type name is not one of `int`, `str` or `bool`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type {0:?}, expected one of int, str, bool")]
pub struct UnknownType(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "str")]
    Text,
    #[serde(rename = "bool")]
    Boolean,
}

impl DataTypeKind {
    pub const ALL: [DataTypeKind; 3] = [
        DataTypeKind::Integer,
        DataTypeKind::Text,
        DataTypeKind::Boolean,
    ];

    /// The name used in column definitions, e.g. `age:int`.
    pub fn name(&self) -> &'static str {
        match self {
            DataTypeKind::Integer => "int",
            DataTypeKind::Text => "str",
            DataTypeKind::Boolean => "bool",
        }
    }
}

impl FromStr for DataTypeKind {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataTypeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownType(s.to_string()))
    }
}

impl fmt::Display for DataTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataType {
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl DataType {
    /// Coerces the value to `target_type`, returning a [`TypeError`] when the
    /// value has no representation in that type.
    pub fn coerce_to(&self, target_type: DataTypeKind) -> Result<DataType, TypeError> {
        let coerced = match (target_type, self) {
            (DataTypeKind::Integer, DataType::Integer(_))
            | (DataTypeKind::Text, DataType::Text(_))
            | (DataTypeKind::Boolean, DataType::Boolean(_)) => Some(self.clone()),
            (DataTypeKind::Integer, DataType::Text(val)) => {
                val.trim().parse::<i64>().ok().map(DataType::Integer)
            }
            (DataTypeKind::Boolean, DataType::Integer(val)) => match val {
                0 => Some(DataType::Boolean(false)),
                1 => Some(DataType::Boolean(true)),
                _ => None,
            },
            (DataTypeKind::Boolean, DataType::Text(val)) => {
                parse_bool_literal(val).map(DataType::Boolean)
            }
            _ => {
                return Err(TypeError::IncompatibleType {
                    expected: target_type,
                    found: self.kind(),
                })
            }
        };

        coerced.ok_or_else(|| {
            trace!(literal = %self.literal(), to = %target_type, "rejected cast");
            TypeError::InvalidCast {
                literal: self.literal(),
                to: target_type,
            }
        })
    }

    pub fn kind(&self) -> DataTypeKind {
        match self {
            DataType::Integer(_) => DataTypeKind::Integer,
            DataType::Boolean(_) => DataTypeKind::Boolean,
            DataType::Text(_) => DataTypeKind::Text,
        }
    }

    /// Renders the value the way it would be written in a command, with strings quoted.
    pub fn literal(&self) -> String {
        match self {
            DataType::Text(val) => format!("{:?}", val),
            other => other.to_string(),
        }
    }
}

fn parse_bool_literal(literal: &str) -> Option<bool> {
    match literal.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer(val) => write!(f, "{}", val),
            DataType::Boolean(val) => write!(f, "{}", val),
            DataType::Text(val) => write!(f, "{}", val),
        }
    }
}

impl From<i64> for DataType {
    fn from(val: i64) -> Self {
        DataType::Integer(val)
    }
}

impl From<i32> for DataType {
    fn from(val: i32) -> Self {
        DataType::Integer(val.into())
    }
}

impl From<bool> for DataType {
    fn from(val: bool) -> Self {
        DataType::Boolean(val)
    }
}

impl From<&str> for DataType {
    fn from(val: &str) -> Self {
        DataType::Text(val.to_string())
    }
}

impl From<String> for DataType {
    fn from(val: String) -> Self {
        DataType::Text(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("int".parse::<DataTypeKind>(), Ok(DataTypeKind::Integer));
        assert_eq!("str".parse::<DataTypeKind>(), Ok(DataTypeKind::Text));
        assert_eq!("bool".parse::<DataTypeKind>(), Ok(DataTypeKind::Boolean));
        assert_eq!(
            "float".parse::<DataTypeKind>(),
            Err(UnknownType("float".to_string()))
        );
    }

    #[test]
    fn test_integer_coercion() {
        let kind = DataTypeKind::Integer;
        assert_eq!(DataType::Integer(7).coerce_to(kind), Ok(DataType::Integer(7)));
        assert_eq!(DataType::from("-12").coerce_to(kind), Ok(DataType::Integer(-12)));
        assert_eq!(
            DataType::from("not-a-number").coerce_to(kind),
            Err(TypeError::InvalidCast {
                literal: "\"not-a-number\"".to_string(),
                to: DataTypeKind::Integer,
            })
        );
        assert_eq!(
            DataType::Boolean(true).coerce_to(kind),
            Err(TypeError::IncompatibleType {
                expected: DataTypeKind::Integer,
                found: DataTypeKind::Boolean,
            })
        );
    }

    #[test]
    fn test_text_coercion() {
        let kind = DataTypeKind::Text;
        assert_eq!(DataType::from("Sergei").coerce_to(kind), Ok(DataType::from("Sergei")));
        assert!(matches!(
            DataType::Integer(28).coerce_to(kind),
            Err(TypeError::IncompatibleType { .. })
        ));
    }

    #[test]
    fn test_boolean_coercion() {
        let kind = DataTypeKind::Boolean;
        for (raw, expected) in [
            (DataType::from("TRUE"), true),
            (DataType::from("false"), false),
            (DataType::from("1"), true),
            (DataType::Integer(0), false),
            (DataType::Boolean(true), true),
        ] {
            assert_eq!(raw.coerce_to(kind), Ok(DataType::Boolean(expected)));
        }

        assert!(DataType::Integer(2).coerce_to(kind).is_err());
        assert!(DataType::from("yes").coerce_to(kind).is_err());
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<DataType> = serde_json::from_str(r#"[28, true, "Sergei"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                DataType::Integer(28),
                DataType::Boolean(true),
                DataType::from("Sergei"),
            ]
        );
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[28,true,"Sergei"]"#);
    }

    #[test]
    fn test_literal() {
        assert_eq!(DataType::from("a b").literal(), "\"a b\"");
        assert_eq!(DataType::Integer(3).literal(), "3");
        assert_eq!(DataType::Boolean(false).to_string(), "false");
    }
}
