//! Executes command lines against a [`Catalog`].
//!
//! [`Driver::execute`] parses a line, passes destructive commands through the
//! [`Confirm`] gate, runs the command and times it. Failures come back as an
//! [`ExecError`] carrying the error kind; nothing here prints.

use catalog::{Catalog, DbError};
use common::util::time::format_duration;
use compile::{parse_command, Command};
use std::time::Instant;
use tracing::{debug, info, instrument};
use typed_builder::TypedBuilder;

mod confirm;
mod error;
mod outcome;
pub mod shell;

pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm, StdinConfirm};
pub use error::ExecError;
pub use outcome::{Outcome, Response};

#[derive(TypedBuilder)]
pub struct Driver {
    catalog: Catalog,
    #[builder(default = Box::new(StdinConfirm) as Box<dyn Confirm>)]
    confirm: Box<dyn Confirm>,
}

impl Driver {
    pub fn new(catalog: Catalog) -> Self {
        Driver::builder().catalog(catalog).build()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consumes the driver, handing back the catalog (e.g. to flush it).
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Parses and runs one command line.
    #[instrument(skip(self))]
    pub fn execute(&mut self, line: &str) -> Result<Response, ExecError> {
        let command = parse_command(line)?;
        let name = command.name();

        if let Some(action) = command.confirmation() {
            if !self.confirm.confirm(&action) {
                info!(%action, "cancelled");
                return Ok(Response::new(
                    name,
                    Outcome::Cancelled { action },
                    Default::default(),
                ));
            }
        }

        let start = Instant::now();
        let outcome = self.run(command)?;
        let elapsed = start.elapsed();
        debug!(command = name, elapsed = %format_duration(elapsed), "command finished");

        Ok(Response::new(name, outcome, elapsed))
    }

    /// Runs an already parsed (and, if needed, confirmed) command.
    pub fn run(&mut self, command: Command) -> Result<Outcome, DbError> {
        let outcome = match command {
            Command::CreateTable { table, columns } => {
                let created = self.catalog.create_table(
                    &table,
                    columns
                        .iter()
                        .map(|column| (column.name.as_str(), column.type_name.as_str())),
                )?;
                Outcome::TableCreated {
                    columns: created.schema().columns().clone(),
                    table,
                }
            }
            Command::ListTables => {
                Outcome::Tables(self.catalog.list_tables().map(String::from).collect())
            }
            Command::DropTable { table } => {
                self.catalog.drop_table(&table)?;
                Outcome::TableDropped { table }
            }
            Command::Insert { table, values } => {
                let (id, position) = self.catalog.insert(&table, values)?;
                Outcome::Inserted {
                    table,
                    id,
                    position,
                }
            }
            Command::Select { table, predicate } => {
                let rows = self.catalog.select(&table, predicate.as_ref())?;
                let columns = self.catalog.get_table(&table)?.schema().columns().clone();
                Outcome::Rows { columns, rows }
            }
            Command::Update {
                table,
                assignment,
                predicate,
            } => {
                let ids = self.catalog.update(&table, &predicate, &assignment)?;
                Outcome::Updated { table, ids }
            }
            Command::Delete { table, predicate } => {
                let ids = self.catalog.delete(&table, predicate.as_ref())?;
                Outcome::Deleted { table, ids }
            }
            Command::Info { table } => Outcome::Info(self.catalog.info(&table)?),
            Command::Help => Outcome::Help,
            Command::Exit => Outcome::Exit,
        };

        Ok(outcome)
    }
}
