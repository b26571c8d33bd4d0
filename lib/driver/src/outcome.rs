use catalog::{Column, Row, RowId, TableInfo};
use getset::{CopyGetters, Getters};
use prettytable::{format, Cell, Row as PrettyRow, Table as PrettyTable};
use std::{fmt, sync::Arc, time::Duration};

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    TableCreated {
        table: String,
        columns: Vec<Column>,
    },
    TableDropped {
        table: String,
    },
    Tables(Vec<String>),
    Inserted {
        table: String,
        id: RowId,
        position: usize,
    },
    Rows {
        columns: Vec<Column>,
        rows: Arc<Vec<Row>>,
    },
    Updated {
        table: String,
        ids: Vec<RowId>,
    },
    Deleted {
        table: String,
        ids: Vec<RowId>,
    },
    Info(TableInfo),
    /// The confirmation gate declined the action; nothing changed.
    Cancelled {
        action: String,
    },
    Help,
    Exit,
}

/// An [`Outcome`] together with how long the command took to run.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Response {
    #[getset(get_copy = "pub")]
    command: &'static str,
    #[getset(get = "pub")]
    outcome: Outcome,
    #[getset(get_copy = "pub")]
    elapsed: Duration,
}

impl Response {
    pub fn new(command: &'static str, outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            command,
            outcome,
            elapsed,
        }
    }

    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::TableCreated { table, columns } => write!(
                f,
                "Table {:?} created with columns: {}",
                table,
                join(columns)
            ),
            Outcome::TableDropped { table } => write!(f, "Table {:?} dropped.", table),
            Outcome::Tables(tables) if tables.is_empty() => write!(f, "No tables."),
            Outcome::Tables(tables) => {
                let lines = tables
                    .iter()
                    .map(|table| format!("- {}", table))
                    .collect::<Vec<_>>();
                write!(f, "{}", lines.join("\n"))
            }
            Outcome::Inserted {
                table,
                id,
                position,
            } => write!(
                f,
                "Row with ID={} inserted into {:?} at position {}.",
                id, table, position
            ),
            Outcome::Rows { rows, .. } if rows.is_empty() => write!(f, "No records found."),
            Outcome::Rows { columns, rows } => write!(f, "{}", rows_table(columns, rows)),
            Outcome::Updated { ids, .. } | Outcome::Deleted { ids, .. } if ids.is_empty() => {
                write!(f, "No matching records.")
            }
            Outcome::Updated { table, ids } => write!(
                f,
                "{} row(s) updated in {:?}, ID: {}.",
                ids.len(),
                table,
                join(ids)
            ),
            Outcome::Deleted { table, ids } => write!(
                f,
                "{} row(s) deleted from {:?}, ID: {}.",
                ids.len(),
                table,
                join(ids)
            ),
            Outcome::Info(info) => write!(
                f,
                "Table: {}\nColumns: {}\nRows: {}",
                info.table(),
                join(info.columns()),
                info.row_count()
            ),
            Outcome::Cancelled { .. } => write!(f, "Operation cancelled."),
            Outcome::Help => write!(f, "{}", help_table()),
            Outcome::Exit => Ok(()),
        }
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn rows_table(columns: &[Column], rows: &[Row]) -> PrettyTable {
    let mut table = PrettyTable::new();
    table.set_titles(PrettyRow::new(
        columns
            .iter()
            .map(|column| Cell::new(column.column_name()))
            .collect(),
    ));
    for row in rows {
        table.add_row(PrettyRow::new(
            row.values()
                .iter()
                .map(|value| Cell::new(&value.to_string()))
                .collect(),
        ));
    }
    table
}

const COMMANDS: [(&str, &str); 10] = [
    (
        "create_table <table> <col:type> ...",
        "Create a table; types are int, str, bool",
    ),
    ("list_tables", "List all tables"),
    ("drop_table <table>", "Drop a table (asks for confirmation)"),
    (
        "insert into <table> values (<v1>, <v2>, ...)",
        "Add a row, values in column order; ID is assigned",
    ),
    ("select from <table> [where <col> = <v>]", "Read rows"),
    (
        "update <table> set <col> = <v> where <col> = <v>",
        "Change matching rows",
    ),
    (
        "delete from <table> [where <col> = <v>]",
        "Remove matching rows, or all rows (asks for confirmation)",
    ),
    ("info <table>", "Show columns and row count"),
    ("help", "Show this help information"),
    ("exit", "Exit this program"),
];

fn help_table() -> PrettyTable {
    let mut table = PrettyTable::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(PrettyRow::new(vec![
        Cell::new("Command"),
        Cell::new("Description"),
    ]));
    for (command, description) in COMMANDS {
        table.add_row(PrettyRow::new(vec![
            Cell::new(command),
            Cell::new(description),
        ]));
    }
    table
}
