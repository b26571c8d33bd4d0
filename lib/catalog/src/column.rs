//! # Column Representation
//!
//! This module provides a representation of a column in a table schema: a name
//! and one of the declared types `int`, `str` or `bool`.
//!
//! ## Usage
//!
//! ```
//! use catalog::Column;
//! use ty::DataTypeKind;
//!
//! let column = Column::new("age", DataTypeKind::Integer);
//! assert_eq!(column.to_string(), "age:int");
//!
//! let parsed = Column::parse("is_active", "bool").expect("bool is a known type");
//! assert_eq!(parsed.column_type(), &DataTypeKind::Boolean);
//! ```

use crate::schema::SchemaError;
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use ty::DataTypeKind;
use typed_builder::TypedBuilder;

/// Represents a column in a table.
///
/// ```ignore
/// +--------------+--------------+
/// | name         | type         |
/// +--------------+--------------+
/// | name         | str          |
/// | age          | int          |
/// | is_active    | bool         |
/// +--------------+--------------+
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    TypedBuilder,
    Getters,
)]
#[getset(get = "pub")]
pub struct Column {
    #[serde(rename = "name")]
    #[builder(setter(into))]
    column_name: String,
    #[serde(rename = "type")]
    column_type: DataTypeKind,
}

/// Name of the column every table starts with. It holds the row id.
pub const ID_COLUMN: &str = "ID";

impl Column {
    /// The leading `ID:int` column.
    pub fn id() -> Self {
        Column::new(ID_COLUMN, DataTypeKind::Integer)
    }

    pub fn new(column_name: &str, column_type: DataTypeKind) -> Self {
        Column::builder()
            .column_name(column_name)
            .column_type(column_type)
            .build()
    }

    /// Creates a column from a declared type name, e.g. the `int` in `age:int`.
    pub fn parse(column_name: &str, type_name: &str) -> Result<Self, SchemaError> {
        match type_name.parse::<DataTypeKind>() {
            Ok(column_type) => Ok(Column::new(column_name, column_type)),
            Err(_) => {
                warn!(column_name, type_name, "rejected column with unknown type");
                Err(SchemaError::InvalidType {
                    column: column_name.to_string(),
                    type_name: type_name.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.column_name, self.column_type)
    }
}
