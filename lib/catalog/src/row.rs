use crate::Schema;
use shrinkwraprs::Shrinkwrap;
use std::fmt;
use ty::DataType;

/// The value of a row's `ID` column. Ids are assigned on insert and never
/// change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Shrinkwrap)]
pub struct RowId(i64);

impl RowId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RowId> for DataType {
    fn from(id: RowId) -> Self {
        DataType::Integer(id.0)
    }
}

/// A single row of a table. Values are stored in schema column order, starting
/// with the row's `ID`; the [`Schema`] the row was validated against gives each
/// value its name.
///
/// Rows can only be built through [`Schema::validate`] or
/// [`Schema::validate_new`], so every row holds exactly one value of the
/// declared type per column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Shrinkwrap)]
pub struct Row(Vec<DataType>);

impl Row {
    pub(crate) fn new(values: Vec<DataType>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[DataType] {
        &self.0
    }

    /// The row's id, read from its leading `ID` value.
    pub fn id(&self) -> Option<RowId> {
        match self.0.first() {
            Some(DataType::Integer(id)) => Some(RowId(*id)),
            _ => None,
        }
    }

    /// Pairs every value with its column name.
    pub fn named<'a>(&'a self, schema: &'a Schema) -> impl Iterator<Item = (&'a str, &'a DataType)> {
        schema
            .columns()
            .iter()
            .map(|column| column.column_name().as_str())
            .zip(self.0.iter())
    }

    pub(crate) fn set(&mut self, idx: usize, value: DataType) {
        self.0[idx] = value;
    }
}
