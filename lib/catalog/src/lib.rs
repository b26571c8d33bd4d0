//! Tables, schemas and the catalog that owns them.
//!
//! A [`Catalog`] maps table names to [`Table`]s. Each table has an immutable
//! [`Schema`] of typed [`Column`]s and an ordered list of [`Row`]s. Reads go
//! through a [`SelectCache`] that is invalidated by every mutation, and the
//! whole catalog is persisted as a single JSON snapshot (see [`persist`]).

pub mod cache;
pub mod catalog;
pub mod column;
pub mod error;
pub mod persist;
pub mod predicate;
pub mod row;
pub mod schema;
pub mod table;

pub use cache::{CacheStats, SelectCache};
pub use catalog::{Catalog, CatalogError};
pub use column::*;
pub use error::{DbError, Result};
pub use persist::StorageError;
pub use predicate::{Assignment, Predicate};
pub use row::{Row, RowId};
pub use schema::{Schema, SchemaError};
pub use table::{Table, TableInfo, TableVersion};
