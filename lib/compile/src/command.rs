use catalog::{Assignment, Predicate};
use ty::DataType;

/// A column declaration from `create_table`, e.g. `age:int`. The type name is
/// kept as written; the catalog decides whether it is a known type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// One parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    ListTables,
    DropTable {
        table: String,
    },
    Insert {
        table: String,
        values: Vec<DataType>,
    },
    Select {
        table: String,
        predicate: Option<Predicate>,
    },
    Update {
        table: String,
        assignment: Assignment,
        predicate: Predicate,
    },
    Delete {
        table: String,
        predicate: Option<Predicate>,
    },
    Info {
        table: String,
    },
    Help,
    Exit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateTable { .. } => "create_table",
            Command::ListTables => "list_tables",
            Command::DropTable { .. } => "drop_table",
            Command::Insert { .. } => "insert",
            Command::Select { .. } => "select",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::Info { .. } => "info",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }

    /// Describes the destructive action this command performs, if any. Such
    /// commands must be confirmed before they run.
    pub fn confirmation(&self) -> Option<String> {
        match self {
            Command::DropTable { table } => Some(format!("drop table {:?}", table)),
            Command::Delete {
                table,
                predicate: Some(predicate),
            } => Some(format!("delete rows where {} from {:?}", predicate, table)),
            Command::Delete {
                table,
                predicate: None,
            } => Some(format!("delete ALL rows from {:?}", table)),
            _ => None,
        }
    }
}
