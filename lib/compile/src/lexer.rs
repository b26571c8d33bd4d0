use crate::diagnostics::{ParseError, Span, SyntaxError};
use logos::{Lexer, Logos};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Default, Error, PartialEq, Eq, Clone)]
pub enum LexerError {
    #[error("Unknown token")]
    #[default]
    UnknownToken,
    #[error("Invalid integer literal")]
    ParseInt,
    #[error("Unterminated string literal")]
    UnterminatedString,
}

impl From<std::num::ParseIntError> for LexerError {
    fn from(_: std::num::ParseIntError) -> Self {
        LexerError::ParseInt
    }
}

impl From<LexerError> for SyntaxError {
    fn from(e: LexerError) -> Self {
        match e {
            LexerError::UnknownToken => SyntaxError::UnknownToken,
            LexerError::ParseInt => SyntaxError::InvalidInteger,
            LexerError::UnterminatedString => SyntaxError::UnterminatedString,
        }
    }
}

fn ident(lex: &mut Lexer<Token>) -> String {
    lex.slice().to_string()
}

fn string(lex: &mut Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

/// Tokens of the command language. Keywords are case-insensitive; strings may
/// be quoted with either `"` or `'`.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(error = LexerError)]
pub enum Token {
    #[regex(r"[ \r\n\t\f]+", logos::skip)]
    Ignored,

    #[token("create_table", ignore(ascii_case))]
    CreateTable,
    #[token("list_tables", ignore(ascii_case))]
    ListTables,
    #[token("drop_table", ignore(ascii_case))]
    DropTable,
    #[token("insert", ignore(ascii_case))]
    Insert,
    #[token("into", ignore(ascii_case))]
    Into,
    #[token("values", ignore(ascii_case))]
    Values,
    #[token("select", ignore(ascii_case))]
    Select,
    #[token("from", ignore(ascii_case))]
    From,
    #[token("where", ignore(ascii_case))]
    Where,
    #[token("update", ignore(ascii_case))]
    Update,
    #[token("set", ignore(ascii_case))]
    Set,
    #[token("delete", ignore(ascii_case))]
    Delete,
    #[token("info", ignore(ascii_case))]
    Info,
    #[token("help", ignore(ascii_case))]
    Help,
    #[token("exit", ignore(ascii_case))]
    Exit,

    #[token("true", |_| true, ignore(ascii_case))]
    #[token("false", |_| false, ignore(ascii_case))]
    Boolean(bool),
    #[regex("-?[0-9]+", |lex| lex.slice().parse())]
    Integer(i64),
    #[regex(r"[\p{Alphabetic}_][\p{Alphabetic}\p{N}_]*", ident)]
    Ident(String),
    #[regex(r#""[^"]*""#, string)]
    #[regex(r"'[^']*'", string)]
    Str(String),

    #[token("=")]
    Eq,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r#""[^"]*"#, |_| Err(LexerError::UnterminatedString))]
    #[regex(r"'[^']*", |_| Err(LexerError::UnterminatedString))]
    UnterminatedString,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ignored => write!(f, "whitespace"),
            Token::CreateTable => write!(f, "create_table"),
            Token::ListTables => write!(f, "list_tables"),
            Token::DropTable => write!(f, "drop_table"),
            Token::Insert => write!(f, "insert"),
            Token::Into => write!(f, "into"),
            Token::Values => write!(f, "values"),
            Token::Select => write!(f, "select"),
            Token::From => write!(f, "from"),
            Token::Where => write!(f, "where"),
            Token::Update => write!(f, "update"),
            Token::Set => write!(f, "set"),
            Token::Delete => write!(f, "delete"),
            Token::Info => write!(f, "info"),
            Token::Help => write!(f, "help"),
            Token::Exit => write!(f, "exit"),
            Token::Boolean(val) => write!(f, "{}", val),
            Token::Integer(val) => write!(f, "{}", val),
            Token::Ident(val) => write!(f, "{}", val),
            Token::Str(val) => write!(f, "{:?}", val),
            Token::Eq => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::UnterminatedString => write!(f, "unterminated string"),
        }
    }
}

impl Token {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::CreateTable
                | Token::ListTables
                | Token::DropTable
                | Token::Insert
                | Token::Into
                | Token::Values
                | Token::Select
                | Token::From
                | Token::Where
                | Token::Update
                | Token::Set
                | Token::Delete
                | Token::Info
                | Token::Help
                | Token::Exit
        )
    }
}

/// Lazily lexes `source`, keeping lexical errors in the stream. Used where a
/// partial line must still be processed, such as syntax highlighting.
pub fn lex(source: &str) -> impl Iterator<Item = (Result<Token, LexerError>, Span)> + '_ {
    Token::lexer(source).spanned()
}

/// Splits `source` into spanned tokens, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    lex(source)
        .map(|(token, span)| match token {
            Ok(token) => Ok((token, span)),
            Err(e) => Err(ParseError::new(e.into(), span)),
        })
        .collect()
}
