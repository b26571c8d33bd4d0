use catalog::DbError;
use compile::ParseError;
use thiserror::Error;

/// Any failure of a single command line. The shell reports it and keeps going.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ExecError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExecError::Parse(_) => "ParseError",
            ExecError::Db(e) => e.kind(),
        }
    }
}
