//! Equality conditions (`where col = value`) and assignments (`set col = value`).
//!
//! Both carry the raw value as written in the command; the table coerces it to
//! the column's declared type before comparing or storing.

use getset::Getters;
use std::fmt;
use ty::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[getset(get = "pub")]
pub struct Predicate {
    column: String,
    value: DataType,
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<DataType>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value.literal())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[getset(get = "pub")]
pub struct Assignment {
    column: String,
    value: DataType,
}

impl Assignment {
    pub fn set(column: impl Into<String>, value: impl Into<DataType>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value.literal())
    }
}
