//! Whole-catalog snapshots on disk.
//!
//! The store is a single JSON document mapping table name to its columns and
//! rows, in creation order:
//!
//! ```json
//! {
//!   "users": {
//!     "columns": [
//!       {"name": "ID", "type": "int"},
//!       {"name": "name", "type": "str"},
//!       {"name": "age", "type": "int"}
//!     ],
//!     "rows": [{"ID": 1, "name": "Sergei", "age": 28}]
//!   }
//! }
//! ```
//!
//! Saving writes to a temporary file next to the target and renames it into
//! place, so a crash mid-write leaves the previous snapshot intact.

use crate::{Column, Row, Schema, Table};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};
use ty::DataType;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot access store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store {path:?} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn corrupt(path: &Path, reason: impl ToString) -> Self {
        StorageError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TableSnapshot {
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Map<String, Value>>,
}

/// Reads every table from `path`. A missing or blank file is an empty catalog.
pub fn load(path: &Path) -> Result<Vec<Table>, StorageError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "store not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Map<String, Value> =
        serde_json::from_str(&contents).map_err(|e| StorageError::corrupt(path, e))?;

    let mut tables = Vec::with_capacity(document.len());
    for (name, value) in document {
        let snapshot: TableSnapshot = serde_json::from_value(value)
            .map_err(|e| StorageError::corrupt(path, format!("table {:?}: {}", name, e)))?;
        tables.push(restore(path, name, snapshot)?);
    }

    debug!(path = %path.display(), tables = tables.len(), "store loaded");
    Ok(tables)
}

fn restore(path: &Path, name: String, snapshot: TableSnapshot) -> Result<Table, StorageError> {
    let schema = Schema::from_columns(snapshot.columns)
        .map_err(|e| StorageError::corrupt(path, format!("table {:?}: {}", name, e)))?;

    let mut rows = Vec::with_capacity(snapshot.rows.len());
    for (position, record) in snapshot.rows.into_iter().enumerate() {
        let values = record
            .into_iter()
            .map(|(column, value)| {
                serde_json::from_value::<DataType>(value).map(|value| (column, value))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                StorageError::corrupt(path, format!("table {:?} row {}: {}", name, position, e))
            })?;

        let row = schema.validate(values).map_err(|e| {
            warn!(table = %name, position, "stored row violates schema");
            StorageError::corrupt(path, format!("table {:?} row {}: {}", name, position, e))
        })?;
        rows.push(row);
    }

    Ok(Table::with_rows(name, schema, rows))
}

fn snapshot(table: &Table) -> TableSnapshot {
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.named(table.schema())
                .map(|(column, value)| (column.to_string(), to_json(value)))
                .collect()
        })
        .collect();

    TableSnapshot {
        columns: table.schema().columns().clone(),
        rows,
    }
}

fn to_json(value: &DataType) -> Value {
    match value {
        DataType::Integer(val) => Value::from(*val),
        DataType::Boolean(val) => Value::from(*val),
        DataType::Text(val) => Value::from(val.as_str()),
    }
}

/// Writes every table to `path`, replacing the previous snapshot atomically.
pub fn save(path: &Path, tables: &[Table]) -> Result<(), StorageError> {
    let mut document = Map::with_capacity(tables.len());
    for table in tables {
        let value = serde_json::to_value(snapshot(table))
            .map_err(|e| StorageError::io(path, io::Error::new(io::ErrorKind::Other, e)))?;
        document.insert(table.name().clone(), value);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StorageError::io(path, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(path, e))?;
    serde_json::to_writer_pretty(&mut file, &document)
        .map_err(|e| StorageError::io(path, io::Error::new(io::ErrorKind::Other, e)))?;
    file.write_all(b"\n").map_err(|e| StorageError::io(path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| StorageError::io(path, e))?;
    file.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;

    debug!(path = %path.display(), tables = tables.len(), "store saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;
    use tempfile::tempdir;

    fn sample() -> Vec<Table> {
        let schema =
            Schema::define([("name", "str"), ("age", "int"), ("is_active", "bool")]).unwrap();
        let mut users = Table::new("users", schema);
        users
            .insert(vec!["Sergei".into(), 28.into(), true.into()])
            .unwrap();
        users
            .insert(vec!["Anna, \"Jr\"".into(), (-3).into(), false.into()])
            .unwrap();

        let empty = Table::new("audit", Schema::define([("event", "str")]).unwrap());
        vec![users, empty]
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let tables = sample();

        save(&path, &tables).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, tables);
        assert_eq!(loaded[0].name(), "users");
        assert_eq!(loaded[1].name(), "audit");
    }

    #[test]
    fn test_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        save(&path, &sample()[..1]).unwrap();

        let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            document["users"]["columns"][0],
            serde_json::json!({"name": "ID", "type": "int"})
        );
        assert_eq!(
            document["users"]["columns"][2],
            serde_json::json!({"name": "age", "type": "int"})
        );
        assert_eq!(
            document["users"]["rows"][1],
            serde_json::json!({"ID": 2, "name": "Anna, \"Jr\"", "age": -3, "is_active": false})
        );
    }

    #[test]
    fn test_missing_and_blank_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(load(&path).unwrap().is_empty());

        fs::write(&path, "  \n").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load(&path), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_row_violating_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(
            &path,
            r#"{"t": {"columns": [{"name": "ID", "type": "int"}, {"name": "n", "type": "int"}],
                      "rows": [{"ID": 1, "n": "x"}]}}"#,
        )
        .unwrap();

        assert!(matches!(load(&path), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_table_without_id_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(
            &path,
            r#"{"t": {"columns": [{"name": "n", "type": "int"}], "rows": []}}"#,
        )
        .unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("ID:int"), "{}", err);
    }

    #[test]
    fn test_reload_keeps_assigning_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        save(&path, &sample()).unwrap();

        let mut tables = load(&path).unwrap();
        let (id, position) = tables[0]
            .insert(vec!["Ivan".into(), 50.into(), true.into()])
            .unwrap();
        assert_eq!((*id, position), (3, 2));
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("db.json");

        save(&path, &sample()).unwrap();
        assert_eq!(load(&path).unwrap().len(), 2);
    }
}
