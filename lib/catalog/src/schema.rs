use crate::{column::ID_COLUMN, Column, DbError, Result, Row, RowId};
use getset::Getters;
use std::{collections::HashSet, iter};
use thiserror::Error;
use tracing::{trace, warn};
use ty::DataType;

/// [`Schema`] is the fixed, ordered set of typed columns that defines the shape of a
/// table. Column order is declaration order and fixes the field order of every row.
///
/// Every schema starts with the reserved `ID:int` column, followed by at least one
/// user column. A schema is immutable once its table has been created; the only
/// way to build one is through [`Schema::define`] or [`Schema::from_columns`], both
/// of which reject empty, duplicate and malformed column lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[getset(get = "pub")]
pub struct Schema {
    columns: Vec<Column>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("a table needs at least one column")]
    Empty,
    #[error("column {0:?} is declared more than once")]
    DuplicateColumn(String),
    #[error("{0:?} is not a valid column name")]
    InvalidColumnName(String),
    #[error("column {column:?} has unknown type {type_name:?}, expected one of int, str, bool")]
    InvalidType { column: String, type_name: String },
    #[error("column {0:?} does not exist")]
    UnknownColumn(String),
    #[error("no value supplied for column {0:?}")]
    MissingColumn(String),
    #[error("expected {expected} values, but found {found}")]
    ValueCount { expected: usize, found: usize },
    #[error("column {0:?} is reserved for row ids")]
    ReservedColumn(String),
    #[error("the first column must be ID:int")]
    MissingId,
}

/// Table and column names start with a letter or `_`, followed by letters, digits
/// or `_`. Letters and digits are Unicode ones, so `пользователи` is a valid name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// `ID` in any letter case names the id column.
fn is_reserved(name: &str) -> bool {
    name.eq_ignore_ascii_case(ID_COLUMN)
}

impl Schema {
    /// Builds a schema from `(name, type name)` pairs, e.g. `[("name", "str"), ("age", "int")]`.
    /// The `ID:int` column is added in front; declaring it yourself is an error.
    pub fn define<N, T>(columns: impl IntoIterator<Item = (N, T)>) -> Result<Self, SchemaError>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let columns = iter::once(Ok(Column::id()))
            .chain(
                columns
                    .into_iter()
                    .map(|(name, type_name)| Column::parse(name.as_ref(), type_name.as_ref())),
            )
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_columns(columns)
    }

    /// Builds a schema from a complete column list, `ID:int` included.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, SchemaError> {
        match columns.first() {
            Some(first) if *first == Column::id() => {}
            Some(_) => return Err(SchemaError::MissingId),
            None => return Err(SchemaError::Empty),
        }
        if columns.len() == 1 {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns[1..] {
            let name = column.column_name();
            if is_reserved(name) {
                warn!(column = %name, "rejected reserved column");
                return Err(SchemaError::ReservedColumn(name.clone()));
            }
            if !is_identifier(name) {
                return Err(SchemaError::InvalidColumnName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                warn!(column = %name, "rejected duplicate column");
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        trace!("Schema defined with {} columns", columns.len());
        Ok(Self { columns })
    }

    /// The columns a user supplies values for, i.e. all but `ID`.
    pub fn user_columns(&self) -> &[Column] {
        &self.columns[1..]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get_col_idx(&self, col_name: &str) -> Result<usize, SchemaError> {
        self.columns
            .iter()
            .position(|col| col.column_name() == col_name)
            .ok_or_else(|| SchemaError::UnknownColumn(col_name.to_string()))
    }

    /// Resolves `col_name` and coerces `value` to its declared type.
    pub fn coerce(&self, col_name: &str, value: &DataType) -> Result<(usize, DataType)> {
        let idx = self.get_col_idx(col_name)?;
        let column = &self.columns[idx];
        let value = value
            .coerce_to(*column.column_type())
            .map_err(|source| DbError::type_error(col_name, source))?;

        Ok((idx, value))
    }

    /// Validates a mapping of column name to raw value into a typed [`Row`].
    ///
    /// Unknown columns are reported before missing ones, and both before any
    /// type error, so the first error names the structural problem.
    pub fn validate<K>(&self, values: impl IntoIterator<Item = (K, DataType)>) -> Result<Row>
    where
        K: AsRef<str>,
    {
        let mut slots: Vec<Option<DataType>> = vec![None; self.columns.len()];
        for (name, value) in values {
            let name = name.as_ref();
            let idx = self.get_col_idx(name)?;
            if slots[idx].replace(value).is_some() {
                return Err(SchemaError::DuplicateColumn(name.to_string()).into());
            }
        }

        let mut raw = Vec::with_capacity(slots.len());
        for (column, slot) in self.columns.iter().zip(slots) {
            match slot {
                Some(value) => raw.push(value),
                None => return Err(SchemaError::MissingColumn(column.column_name().clone()).into()),
            }
        }

        self.validate_positional(raw)
    }

    /// Validates the values of a new row, given in user column order as supplied
    /// by `insert ... values (...)`, and stamps the row with `id`.
    pub fn validate_new(&self, id: RowId, values: Vec<DataType>) -> Result<Row> {
        let expected = self.user_columns().len();
        if values.len() != expected {
            return Err(SchemaError::ValueCount {
                expected,
                found: values.len(),
            }
            .into());
        }

        self.validate_positional(iter::once(id.into()).chain(values).collect())
    }

    /// Validates a complete row, `ID` included, given in column order.
    pub fn validate_positional(&self, values: Vec<DataType>) -> Result<Row> {
        if values.len() != self.columns.len() {
            return Err(SchemaError::ValueCount {
                expected: self.columns.len(),
                found: values.len(),
            }
            .into());
        }

        let typed = self
            .columns
            .iter()
            .zip(values.iter())
            .map(|(column, value)| {
                value
                    .coerce_to(*column.column_type())
                    .map_err(|source| DbError::type_error(column.column_name(), source))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Row::new(typed))
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(f, "{}", columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;
    use ty::DataTypeKind;

    fn users() -> Schema {
        Schema::define([("name", "str"), ("age", "int"), ("is_active", "bool")]).unwrap()
    }

    #[test]
    fn test_schema_define() {
        let schema = users();

        assert_eq!(schema.len(), 4);
        assert_eq!(schema.user_columns().len(), 3);
        assert_eq!(schema.columns()[2].column_name(), "age");
        assert_eq!(schema.columns()[2].column_type(), &DataTypeKind::Integer);
        assert_eq!(schema.to_string(), "ID:int, name:str, age:int, is_active:bool");
    }

    #[test]
    fn test_schema_duplicate_column() {
        let result = Schema::define([("name", "str"), ("name", "int")]);
        assert_eq!(result, Err(SchemaError::DuplicateColumn("name".to_string())));
    }

    #[test]
    fn test_schema_invalid_type() {
        let result = Schema::define([("price", "decimal")]);
        assert!(matches!(result, Err(SchemaError::InvalidType { .. })));
    }

    #[test]
    fn test_schema_empty_and_bad_names() {
        let empty: [(&str, &str); 0] = [];
        assert_eq!(Schema::define(empty), Err(SchemaError::Empty));
        assert_eq!(
            Schema::define([("1st", "int")]),
            Err(SchemaError::InvalidColumnName("1st".to_string()))
        );
    }

    #[test]
    fn test_id_column_is_reserved() {
        assert_eq!(
            Schema::define([("ID", "int"), ("name", "str")]),
            Err(SchemaError::ReservedColumn("ID".to_string()))
        );
        assert_eq!(
            Schema::define([("name", "str"), ("id", "str")]),
            Err(SchemaError::ReservedColumn("id".to_string()))
        );
    }

    #[test]
    fn test_from_columns_requires_leading_id() {
        let columns = vec![Column::new("name", DataTypeKind::Text)];
        assert_eq!(Schema::from_columns(columns), Err(SchemaError::MissingId));
        assert_eq!(Schema::from_columns(vec![Column::id()]), Err(SchemaError::Empty));
    }

    #[test]
    fn test_unicode_names() {
        assert!(is_identifier("имя"));
        assert!(is_identifier("_größe2"));
        assert!(!is_identifier("2й"));
        assert!(!is_identifier("имя-фамилия"));

        let schema = Schema::define([("имя", "str"), ("возраст", "int")]).unwrap();
        assert_eq!(schema.get_col_idx("возраст"), Ok(2));
    }

    #[test]
    fn test_get_col_idx() {
        let schema = users();
        assert_eq!(schema.get_col_idx("ID"), Ok(0));
        assert_eq!(schema.get_col_idx("is_active"), Ok(3));
        assert_eq!(
            schema.get_col_idx("email"),
            Err(SchemaError::UnknownColumn("email".to_string()))
        );
    }

    #[test]
    fn test_validate_mapping() {
        let schema = users();
        let row = schema
            .validate([
                ("age", DataType::from("28")),
                ("is_active", DataType::from("TRUE")),
                ("ID", DataType::from(1)),
                ("name", DataType::from("Sergei")),
            ])
            .unwrap();

        assert_eq!(row.id(), Some(RowId::new(1)));
        assert_eq!(
            row.values(),
            &[
                DataType::Integer(1),
                DataType::from("Sergei"),
                DataType::Integer(28),
                DataType::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_validate_mapping_errors() {
        let schema = users();

        let missing = schema.validate([("ID", DataType::from(1)), ("name", DataType::from("Sergei"))]);
        assert!(matches!(
            missing,
            Err(DbError::Schema(SchemaError::MissingColumn(column))) if column == "age"
        ));

        let unknown = schema.validate([
            ("name", DataType::from("Sergei")),
            ("email", DataType::from("s@example.com")),
        ]);
        assert!(matches!(
            unknown,
            Err(DbError::Schema(SchemaError::UnknownColumn(column))) if column == "email"
        ));
    }

    #[test]
    fn test_validate_new_stamps_id() {
        let schema = users();
        let row = schema
            .validate_new(
                RowId::new(7),
                vec![DataType::from("Anna"), DataType::from("34"), DataType::from("0")],
            )
            .unwrap();

        assert_eq!(row.id(), Some(RowId::new(7)));
        assert_eq!(row[3], DataType::Boolean(false));
    }

    #[test]
    fn test_validate_new_type_error() {
        let schema = users();
        let result = schema.validate_new(
            RowId::new(1),
            vec![
                DataType::from("Sergei"),
                DataType::from("not-a-number"),
                DataType::Boolean(true),
            ],
        );

        assert!(matches!(result, Err(DbError::Type { column, .. }) if column == "age"));
    }

    #[test]
    fn test_validate_new_count() {
        let schema = users();
        let result = schema.validate_new(RowId::new(1), vec![DataType::from("Sergei")]);

        assert!(matches!(
            result,
            Err(DbError::Schema(SchemaError::ValueCount {
                expected: 3,
                found: 1
            }))
        ));
    }
}
