use super::{block::Block, ident::parse_name, stmts::Stmt, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};
use smol_str::SmolStr;

/// Procedure declaration.
///
/// # Example
///
/// ```text
/// TO SQUARE :SIZE
///   FORWARD :SIZE
///   RIGHT 90
/// END
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareFunction {
    pub name: SmolStr,
    pub params: Vec<SmolStr>,
    pub body: Vec<Stmt>,
}

impl Parse for DeclareFunction {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::To))?;
        let name = parse_name(input)?;

        let mut params = vec![];
        while input.match_token(TokenKind::Colon) {
            params.push(parse_name(input)?);
        }

        let body = Block::parse(input)?;
        input.consume(TokenKind::Keyword(Keyword::End))?;

        Ok(DeclareFunction { name, params, body })
    }
}
