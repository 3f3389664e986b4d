mod block;
mod expr;
mod func;
mod ident;
mod literal;
mod prog;
mod stmts;
mod validate;
mod visitor;

pub use block::*;
pub use expr::*;
pub use func::*;
pub use ident::*;
pub use literal::parse_bool_text;
pub use prog::*;
pub use stmts::*;
pub use validate::*;
pub use visitor::*;

use crate::{
    token_stream::{TokenError, TokenStream},
    tokens::{Token, TokenKind},
};
use std::{error::Error, fmt};

pub trait Parse: Sized {
    type Output;
    type Err: Error;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Lexical error, or the token stream ended early.
    Token(TokenError),
    Syntax(SyntaxError),
    BooleanShape(BooleanShapeError),
    Value(ValueParseError),
}

impl ParseError {
    /// Build a syntax error pointing at the given token.
    pub(crate) fn unexpected(input: &TokenStream, token: &Token, expected: impl ToString) -> Self {
        let found = match token.kind {
            TokenKind::EOS => token.kind.to_string(),
            _ => input.fragment(&token.span).to_owned(),
        };
        ParseError::Syntax(SyntaxError {
            found,
            line: token.span.line,
            column: token.span.column,
            expected: expected.to_string(),
        })
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Token(err) => fmt::Display::fmt(err, f),
            ParseError::Syntax(err) => fmt::Display::fmt(err, f),
            ParseError::BooleanShape(err) => fmt::Display::fmt(err, f),
            ParseError::Value(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Mismatch {
                expected,
                encountered,
                line,
                column,
            } => ParseError::Syntax(SyntaxError {
                found: encountered.to_string(),
                line,
                column,
                expected: format!("'{}'", expected),
            }),
            err => ParseError::Token(err),
        }
    }
}

impl From<BooleanShapeError> for ParseError {
    fn from(err: BooleanShapeError) -> Self {
        ParseError::BooleanShape(err)
    }
}

impl From<ValueParseError> for ParseError {
    fn from(err: ValueParseError) -> Self {
        ParseError::Value(err)
    }
}

/// Token that no grammar rule accepts at its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub found: String,
    pub line: usize,
    pub column: usize,
    /// Construct the grammar expected at this position.
    pub expected: String,
}

impl Error for SyntaxError {}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "syntax error at {}:{}: found '{}', expected {}",
            self.line, self.column, self.found, self.expected
        )
    }
}

/// Boolean context holding something that is not boolean-shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanShapeError {
    /// Arithmetic operator or plain literal where a boolean is required.
    NotBoolean { culprit: String },
    /// Connectives chained three deep without parentheses.
    ChainTooLong { operator: Operator },
}

impl Error for BooleanShapeError {}

impl fmt::Display for BooleanShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BooleanShapeError::NotBoolean { culprit } => {
                write!(f, "'{}' cannot be used as a boolean condition", culprit)
            }
            BooleanShapeError::ChainTooLong { operator } => write!(
                f,
                "'{}' chains more than two boolean connectives, group them with parentheses",
                operator
            ),
        }
    }
}

/// Text that does not spell a boolean literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueParseError {
    pub text: String,
}

impl Error for ValueParseError {}

impl fmt::Display for ValueParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' is not a boolean value", self.text)
    }
}
