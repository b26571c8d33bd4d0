use crate::{catalog::CatalogError, persist::StorageError, schema::SchemaError};
use thiserror::Error;
use ty::TypeError;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Every way a catalog operation can fail.
#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid value for column {column:?}: {source}")]
    Type {
        column: String,
        #[source]
        source: TypeError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DbError {
    pub(crate) fn type_error(column: &str, source: TypeError) -> Self {
        DbError::Type {
            column: column.to_string(),
            source,
        }
    }

    /// Short name of the error family, used when reporting to the user.
    pub fn kind(&self) -> &'static str {
        match self {
            DbError::Catalog(_) => "CatalogError",
            DbError::Schema(_) => "SchemaError",
            DbError::Type { .. } => "TypeError",
            DbError::Storage(_) => "IOError",
        }
    }
}
