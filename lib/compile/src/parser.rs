//! Recursive-descent parser for the command language.
//!
//! ```ignore
//! create_table <table> <col:type> [<col:type> ...]
//! list_tables
//! drop_table <table>
//! insert into <table> values (<literal>, ...)
//! select from <table> [where <col> = <literal>]
//! update <table> set <col> = <literal> where <col> = <literal>
//! delete from <table> [where <col> = <literal>]
//! info <table>
//! help
//! exit
//! ```
//!
//! A literal is a quoted string, an integer or `true`/`false`. Each `where` and
//! `set` holds exactly one equality; there are no boolean combinators.

use crate::{
    command::{ColumnDef, Command},
    diagnostics::{ParseError, Span, SyntaxError},
    lexer::{tokenize, Token},
};
use catalog::{Assignment, Predicate};
use ty::DataType;

type ParseResult<T> = Result<T, ParseError>;

/// Parses a full command line.
pub fn parse_command(source: &str) -> ParseResult<Command> {
    let mut parser = Parser::new(source)?;
    let command = parser.command()?;
    parser.finish()?;
    Ok(command)
}

/// Parses `[values] (<literal>, ...)` into the raw literals, in order.
pub fn parse_values(source: &str) -> ParseResult<Vec<DataType>> {
    let mut parser = Parser::new(source)?;
    parser.eat(&Token::Values);
    let values = parser.value_list()?;
    parser.finish()?;
    Ok(values)
}

/// Parses `[where] <col> = <literal>`.
pub fn parse_where(source: &str) -> ParseResult<Predicate> {
    let mut parser = Parser::new(source)?;
    parser.eat(&Token::Where);
    let (column, value) = parser.equality()?;
    parser.finish()?;
    Ok(Predicate::eq(column, value))
}

/// Parses `[set] <col> = <literal>`.
pub fn parse_set(source: &str) -> ParseResult<Assignment> {
    let mut parser = Parser::new(source)?;
    parser.eat(&Token::Set);
    let (column, value) = parser.equality()?;
    parser.finish()?;
    Ok(Assignment::set(column, value))
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            end: source.len(),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    /// Consumes `token` if it is next.
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, found: Option<(Token, Span)>, expected: &[&str]) -> ParseError {
        let expected = expected.iter().map(|s| s.to_string()).collect();
        match found {
            Some((token, span)) => ParseError::new(
                SyntaxError::UnexpectedToken {
                    token: token.to_string(),
                    expected,
                },
                span,
            ),
            None => ParseError::new(SyntaxError::UnexpectedEof { expected }, self.end..self.end),
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        match self.bump() {
            Some((found, _)) if found == token => Ok(()),
            other => {
                let expected = token.to_string();
                Err(self.unexpected(other, &[expected.as_str()]))
            }
        }
    }

    fn ident(&mut self, what: &str) -> ParseResult<String> {
        match self.bump() {
            Some((Token::Ident(name), _)) => Ok(name),
            other => Err(self.unexpected(other, &[what])),
        }
    }

    fn literal(&mut self) -> ParseResult<DataType> {
        match self.bump() {
            Some((Token::Integer(val), _)) => Ok(DataType::Integer(val)),
            Some((Token::Boolean(val), _)) => Ok(DataType::Boolean(val)),
            Some((Token::Str(val), _)) => Ok(DataType::Text(val)),
            other => Err(self.unexpected(other, &["a quoted string", "an integer", "true/false"])),
        }
    }

    fn equality(&mut self) -> ParseResult<(String, DataType)> {
        let column = self.ident("column name")?;
        self.expect(Token::Eq)?;
        let value = self.literal()?;
        Ok((column, value))
    }

    fn value_list(&mut self) -> ParseResult<Vec<DataType>> {
        self.expect(Token::LParen)?;
        let mut values = vec![self.literal()?];
        loop {
            match self.bump() {
                Some((Token::Comma, _)) => values.push(self.literal()?),
                Some((Token::RParen, _)) => return Ok(values),
                other => return Err(self.unexpected(other, &[",", ")"])),
            }
        }
    }

    fn optional_where(&mut self) -> ParseResult<Option<Predicate>> {
        if self.eat(&Token::Where) {
            let (column, value) = self.equality()?;
            Ok(Some(Predicate::eq(column, value)))
        } else {
            Ok(None)
        }
    }

    /// A trailing `;` is tolerated; anything else after the command is an error.
    fn finish(&mut self) -> ParseResult<()> {
        self.eat(&Token::Semi);
        match self.bump() {
            None => Ok(()),
            other => Err(self.unexpected(other, &["end of command"])),
        }
    }

    fn command(&mut self) -> ParseResult<Command> {
        let (token, span) = match self.bump() {
            Some(next) => next,
            None => return Err(ParseError::new(SyntaxError::Empty, 0..self.end)),
        };

        match token {
            Token::CreateTable => {
                let table = self.ident("table name")?;
                let mut columns = vec![self.column_def()?];
                while matches!(self.peek(), Some(Token::Ident(_))) {
                    columns.push(self.column_def()?);
                }
                Ok(Command::CreateTable { table, columns })
            }
            Token::ListTables => Ok(Command::ListTables),
            Token::DropTable => Ok(Command::DropTable {
                table: self.ident("table name")?,
            }),
            Token::Insert => {
                self.expect(Token::Into)?;
                let table = self.ident("table name")?;
                self.expect(Token::Values)?;
                let values = self.value_list()?;
                Ok(Command::Insert { table, values })
            }
            Token::Select => {
                self.expect(Token::From)?;
                let table = self.ident("table name")?;
                let predicate = self.optional_where()?;
                Ok(Command::Select { table, predicate })
            }
            Token::Update => {
                let table = self.ident("table name")?;
                self.expect(Token::Set)?;
                let (column, value) = self.equality()?;
                self.expect(Token::Where)?;
                let (where_column, where_value) = self.equality()?;
                Ok(Command::Update {
                    table,
                    assignment: Assignment::set(column, value),
                    predicate: Predicate::eq(where_column, where_value),
                })
            }
            Token::Delete => {
                self.expect(Token::From)?;
                let table = self.ident("table name")?;
                let predicate = self.optional_where()?;
                Ok(Command::Delete { table, predicate })
            }
            Token::Info => Ok(Command::Info {
                table: self.ident("table name")?,
            }),
            Token::Help => Ok(Command::Help),
            Token::Exit => Ok(Command::Exit),
            Token::Ident(name) => Err(ParseError::new(SyntaxError::UnknownCommand(name), span)),
            other => Err(self.unexpected(Some((other, span)), &["a command"])),
        }
    }

    fn column_def(&mut self) -> ParseResult<ColumnDef> {
        let name = self.ident("column name")?;
        self.expect(Token::Colon)?;
        let type_name = self.ident("column type")?;
        Ok(ColumnDef::new(name, type_name))
    }
}
