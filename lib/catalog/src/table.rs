use crate::{column::ID_COLUMN, Assignment, Column, Predicate, Result, Row, RowId, Schema, SchemaError};
use getset::Getters;
use shrinkwraprs::Shrinkwrap;
use std::fmt;
use tracing::trace;
use ty::DataType;

/// Version of a table's contents. Bumped on every mutation that changes rows, so
/// anything computed from an older version is known to be stale.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Shrinkwrap)]
pub struct TableVersion(u64);

impl TableVersion {
    pub fn new(version: u64) -> Self {
        Self(version)
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A named, ordered collection of rows conforming to a [`Schema`].
///
/// Every row carries an `ID` assigned on insert as one more than the largest id
/// in the table (1 for an empty table). Ids cannot be updated. Positions are
/// insertion order and shift when earlier rows are deleted.
#[derive(Debug, Clone, Getters)]
pub struct Table {
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    schema: Schema,
    #[getset(get = "pub")]
    rows: Vec<Row>,
    version: TableVersion,
}

/// Equality ignores the version: two tables are equal if they hold the same data.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.schema == other.schema && self.rows == other.rows
    }
}

impl Eq for Table {}

/// Summary returned by `info <table>`.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct TableInfo {
    table: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(
            f,
            "{} ({}) rows={}",
            self.table,
            columns.join(", "),
            self.row_count
        )
    }
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self::with_rows(name, schema, Vec::new())
    }

    /// Rows must already be validated against `schema`.
    pub(crate) fn with_rows(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            schema,
            rows,
            version: TableVersion::default(),
        }
    }

    pub fn version(&self) -> TableVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn bump(&mut self) {
        self.version = self.version.next();
        trace!(table = %self.name, version = %self.version, "table version bumped");
    }

    /// Appends one row given in user column order. Returns the id assigned to
    /// the row and its position.
    pub fn insert(&mut self, values: Vec<DataType>) -> Result<(RowId, usize)> {
        let id = self.next_id();
        let row = self.schema.validate_new(id, values)?;
        self.rows.push(row);
        self.bump();

        Ok((id, self.rows.len() - 1))
    }

    fn next_id(&self) -> RowId {
        self.rows
            .iter()
            .filter_map(Row::id)
            .max()
            .map_or(RowId::new(1), RowId::next)
    }

    /// Lazily yields the rows matching `predicate` in insertion order, or every
    /// row when there is no predicate. The predicate value is coerced to the
    /// column type first, so `age = "28"` and `age = 28` match the same rows.
    pub fn select<'a>(
        &'a self,
        predicate: Option<&Predicate>,
    ) -> Result<impl Iterator<Item = &'a Row> + 'a> {
        let filter = self.resolve(predicate)?;

        Ok(self.rows.iter().filter(move |row| matches(row, &filter)))
    }

    /// Sets the assigned column on every row matching `predicate` and returns the
    /// ids of the rows changed. Both sides are validated before any row is touched.
    pub fn update(&mut self, predicate: &Predicate, assignment: &Assignment) -> Result<Vec<RowId>> {
        if assignment.column() == ID_COLUMN {
            return Err(SchemaError::ReservedColumn(ID_COLUMN.to_string()).into());
        }
        let (set_idx, set_value) = self
            .schema
            .coerce(assignment.column(), assignment.value())?;
        let filter = self.resolve(Some(predicate))?;

        let mut ids = Vec::new();
        for row in self.rows.iter_mut().filter(|row| matches(row, &filter)) {
            row.set(set_idx, set_value.clone());
            ids.extend(row.id());
        }

        if !ids.is_empty() {
            self.bump();
        }
        Ok(ids)
    }

    /// Removes the rows matching `predicate`, keeping the others in order, and
    /// returns the ids removed. Without a predicate every row is removed.
    pub fn delete(&mut self, predicate: Option<&Predicate>) -> Result<Vec<RowId>> {
        let filter = self.resolve(predicate)?;

        let mut ids = Vec::new();
        self.rows.retain(|row| {
            let hit = matches(row, &filter);
            if hit {
                ids.extend(row.id());
            }
            !hit
        });

        if !ids.is_empty() {
            self.bump();
        }
        Ok(ids)
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            table: self.name.clone(),
            columns: self.schema.columns().clone(),
            row_count: self.rows.len(),
        }
    }

    /// Returns the predicate with its value coerced to the column's declared type.
    pub fn normalize(&self, predicate: &Predicate) -> Result<Predicate> {
        let (_, value) = self.schema.coerce(predicate.column(), predicate.value())?;
        Ok(Predicate::eq(predicate.column().as_str(), value))
    }

    fn resolve(&self, predicate: Option<&Predicate>) -> Result<Option<(usize, DataType)>> {
        predicate
            .map(|predicate| self.schema.coerce(predicate.column(), predicate.value()))
            .transpose()
    }
}

fn matches(row: &Row, filter: &Option<(usize, DataType)>) -> bool {
    match filter {
        Some((idx, value)) => &row[*idx] == value,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;
    use pretty_assertions_sorted::assert_eq;

    fn users() -> Table {
        let schema =
            Schema::define([("name", "str"), ("age", "int"), ("is_active", "bool")]).unwrap();
        let mut table = Table::new("users", schema);
        for (name, age, active) in [("Sergei", 28, true), ("Anna", 34, false), ("Ivan", 28, true)]
        {
            table
                .insert(vec![name.into(), DataType::Integer(age), active.into()])
                .unwrap();
        }
        table
    }

    fn names<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<String> {
        rows.map(|row| row[1].to_string()).collect()
    }

    fn ids(ids: &[i64]) -> Vec<RowId> {
        ids.iter().copied().map(RowId::new).collect()
    }

    #[test]
    fn test_insert_returns_id_and_position() {
        let mut table = users();
        let inserted = table
            .insert(vec!["Olga".into(), DataType::from("41"), DataType::from("0")])
            .unwrap();

        assert_eq!(inserted, (RowId::new(4), 3));
        assert_eq!(
            table.rows()[3].values(),
            &[
                DataType::Integer(4),
                DataType::from("Olga"),
                DataType::Integer(41),
                DataType::Boolean(false),
            ]
        );
    }

    #[test]
    fn test_ids_follow_largest_remaining() {
        let mut table = users();
        table.delete(Some(&Predicate::eq("ID", 1))).unwrap();

        let (id, position) = table
            .insert(vec!["Olga".into(), 41.into(), false.into()])
            .unwrap();
        assert_eq!((id, position), (RowId::new(4), 2));

        table.delete(None).unwrap();
        let (id, _) = table
            .insert(vec!["Petr".into(), 19.into(), true.into()])
            .unwrap();
        assert_eq!(id, RowId::new(1));
    }

    #[test]
    fn test_insert_type_error_leaves_table_unchanged() {
        let mut table = users();
        let version = table.version();
        let result = table.insert(vec![
            "Sergei".into(),
            DataType::from("not-a-number"),
            true.into(),
        ]);

        assert!(matches!(result, Err(DbError::Type { .. })));
        assert_eq!(table.len(), 3);
        assert_eq!(table.version(), version);
    }

    #[test]
    fn test_select_all_and_filtered() {
        let table = users();

        assert_eq!(names(table.select(None).unwrap()), vec!["Sergei", "Anna", "Ivan"]);

        let by_age = Predicate::eq("age", 28);
        assert_eq!(names(table.select(Some(&by_age)).unwrap()), vec!["Sergei", "Ivan"]);

        let quoted = Predicate::eq("age", "34");
        assert_eq!(names(table.select(Some(&quoted)).unwrap()), vec!["Anna"]);

        let by_id = Predicate::eq("ID", 3);
        assert_eq!(names(table.select(Some(&by_id)).unwrap()), vec!["Ivan"]);
    }

    #[test]
    fn test_select_unknown_column() {
        let table = users();
        let result = table.select(Some(&Predicate::eq("email", "x")));

        assert!(matches!(
            result.err(),
            Some(DbError::Schema(SchemaError::UnknownColumn(_)))
        ));
    }

    #[test]
    fn test_update() {
        let mut table = users();
        let version = table.version();
        let updated = table
            .update(&Predicate::eq("age", 28), &Assignment::set("age", 29))
            .unwrap();

        assert_eq!(updated, ids(&[1, 3]));
        assert!(table.version() > version);
        assert_eq!(table.rows()[0][2], DataType::Integer(29));
        assert_eq!(table.select(Some(&Predicate::eq("age", 29))).unwrap().count(), 2);
    }

    #[test]
    fn test_update_validates_before_mutating() {
        let mut table = users();
        let before = table.rows().clone();

        let unknown = table.update(&Predicate::eq("age", 28), &Assignment::set("email", "x"));
        assert!(matches!(unknown, Err(DbError::Schema(SchemaError::UnknownColumn(_)))));

        let mistyped = table.update(&Predicate::eq("age", 28), &Assignment::set("age", "old"));
        assert!(matches!(mistyped, Err(DbError::Type { .. })));

        assert_eq!(table.rows(), &before);
    }

    #[test]
    fn test_update_id_is_rejected() {
        let mut table = users();
        let version = table.version();
        let result = table.update(&Predicate::eq("name", "Anna"), &Assignment::set("ID", 10));

        assert!(matches!(
            result,
            Err(DbError::Schema(SchemaError::ReservedColumn(column))) if column == "ID"
        ));
        assert_eq!(table.rows()[1].id(), Some(RowId::new(2)));
        assert_eq!(table.version(), version);
    }

    #[test]
    fn test_update_no_match_keeps_version() {
        let mut table = users();
        let version = table.version();
        let updated = table
            .update(&Predicate::eq("name", "Nobody"), &Assignment::set("age", 1))
            .unwrap();

        assert!(updated.is_empty());
        assert_eq!(table.version(), version);
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut table = users();
        let deleted = table.delete(Some(&Predicate::eq("name", "Anna"))).unwrap();

        assert_eq!(deleted, ids(&[2]));
        assert_eq!(names(table.select(None).unwrap()), vec!["Sergei", "Ivan"]);
    }

    #[test]
    fn test_delete_without_predicate_removes_all() {
        let mut table = users();
        assert_eq!(table.delete(None).unwrap(), ids(&[1, 2, 3]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_info() {
        let info = users().info();

        assert_eq!(info.table(), "users");
        assert_eq!(*info.row_count(), 3);
        assert_eq!(
            info.to_string(),
            "users (ID:int, name:str, age:int, is_active:bool) rows=3"
        );
    }
}
