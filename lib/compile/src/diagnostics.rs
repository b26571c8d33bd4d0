use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFile,
    term::{
        self,
        termcolor::{self, WriteColor},
    },
};
use std::{io, ops::Range};
use thiserror::Error;

pub type Span = Range<usize>;

pub trait ToDiagnostic {
    fn to_diagnostic(&self, span: &Span) -> Diagnostic<()>;
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SyntaxError {
    #[error("unexpected token {token}, expected {}", one_of(.expected))]
    UnexpectedToken {
        token: String,
        expected: Vec<String>,
    },
    #[error("unexpected end of input, expected {}", one_of(.expected))]
    UnexpectedEof { expected: Vec<String> },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid integer literal")]
    InvalidInteger,
    #[error("unrecognized character")]
    UnknownToken,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("empty command")]
    Empty,
}

impl ToDiagnostic for SyntaxError {
    fn to_diagnostic(&self, span: &Span) -> Diagnostic<()> {
        let mut diagnostic = Diagnostic::error()
            .with_code("ParseError")
            .with_message(self.to_string())
            .with_labels(vec![Label::primary((), span.clone())]);
        match self {
            SyntaxError::UnterminatedString => {
                diagnostic = diagnostic.with_notes(vec![String::from("expected a closing quote")]);
            }
            SyntaxError::UnknownCommand(_) | SyntaxError::Empty => {
                diagnostic =
                    diagnostic.with_notes(vec![String::from("type `help` to list the commands")]);
            }
            _ => {}
        };
        diagnostic
    }
}

fn one_of(strings: &[String]) -> String {
    match strings {
        [] => String::from("nothing"),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// A [`SyntaxError`] located in the command text.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{error}")]
pub struct ParseError {
    error: SyntaxError,
    span: Span,
}

impl ParseError {
    pub fn new(error: SyntaxError, span: Span) -> Self {
        Self { error, span }
    }

    pub fn error(&self) -> &SyntaxError {
        &self.error
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self, _span: &Span) -> Diagnostic<()> {
        self.error.to_diagnostic(&self.span)
    }
}

/// Renders `error` against `source` (with colors) into `writer`.
pub fn report_error(writer: &mut impl io::Write, source: &str, error: &ParseError) -> io::Result<()> {
    let mut buffer = termcolor::Buffer::ansi();
    emit(&mut buffer, source, error)?;
    writer.write_all(buffer.as_slice())
}

/// Renders `error` against `source` as plain text.
pub fn render_plain(source: &str, error: &ParseError) -> String {
    let mut buffer = termcolor::Buffer::no_color();
    match emit(&mut buffer, source, error) {
        Ok(()) => String::from_utf8_lossy(buffer.as_slice()).into_owned(),
        Err(_) => error.to_string(),
    }
}

fn emit(writer: &mut impl WriteColor, source: &str, error: &ParseError) -> io::Result<()> {
    let file = SimpleFile::new("<command>", source);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic(error.span());

    term::emit(writer, &config, &file, &diagnostic)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
