use super::{stmts::Stmt, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};

/// Sequence of statements, ending before `END`, `ELSE`
/// or the end of source.
pub struct Block;

impl Parse for Block {
    type Output = Vec<Stmt>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Vec<Stmt>, ParseError> {
        use Keyword as K;
        use TokenKind as T;

        let mut stmts = vec![];

        loop {
            match input.peek_kind()? {
                T::Keyword(K::End) | T::Keyword(K::Else) | T::EOS => break,
                _ => stmts.push(Stmt::parse(input)?),
            }
        }

        Ok(stmts)
    }
}
