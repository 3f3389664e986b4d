//! Literal values.
use super::{Expr, ParseError, ValueParseError};
use crate::{token_stream::TokenStream, tokens::TokenKind};
use smol_str::SmolStr;

/// Parse the textual spelling of a boolean.
///
/// Accepts `TRUE`, `FALSE`, `T`, `F`, `1` and `0`, ignoring case.
pub fn parse_bool_text(text: &str) -> Result<bool, ValueParseError> {
    match text.to_ascii_uppercase().as_str() {
        "TRUE" | "T" | "1" => Ok(true),
        "FALSE" | "F" | "0" => Ok(false),
        _ => Err(ValueParseError { text: text.to_owned() }),
    }
}

/// Converts a number sitting in a boolean position into a boolean literal.
pub(crate) fn as_boolean(expr: Expr) -> Result<Expr, ValueParseError> {
    match expr {
        Expr::Number(value) => parse_bool_text(&value.to_string()).map(Expr::Bool),
        expr => Ok(expr),
    }
}

pub(crate) fn parse_number(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let token = input.consume(TokenKind::Number)?;
    let fragment = input.fragment(&token.span);
    fragment
        .parse::<f64>()
        .map(Expr::Number)
        .map_err(|_| ParseError::unexpected(input, &token, "number literal"))
}

pub(crate) fn parse_string(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let token = input.consume(TokenKind::String)?;
    let fragment = input.fragment(&token.span);
    let text = fragment
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(fragment);
    Ok(Expr::Str(SmolStr::from(text)))
}

/// A bare word in relation position can only be a boolean literal.
pub(crate) fn parse_bool_word(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let token = input.consume(TokenKind::Ident)?;
    let value = parse_bool_text(input.fragment(&token.span))?;
    Ok(Expr::Bool(value))
}
