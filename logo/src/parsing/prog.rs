use super::{block::Block, func::DeclareFunction, stmts::write_block, stmts::Stmt, Parse, ParseError};
use crate::{token_stream::TokenStream, tokens::TokenKind};
use smol_str::SmolStr;
use std::fmt;

/// Top level statements of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    /// Name of the synthetic function wrapping the top level statements.
    pub const ENTRY: &'static str = "MAIN";

    /// Wrap the top level statements into a parameterless function.
    pub fn as_function(&self, name: impl Into<SmolStr>) -> DeclareFunction {
        DeclareFunction {
            name: name.into(),
            params: vec![],
            body: self.stmts.clone(),
        }
    }
}

impl Parse for Program {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let stmts = Block::parse(input)?;

        // A block stops early on a stray `END` or `ELSE`.
        let token = input.next_token()?;
        if token.kind != TokenKind::EOS {
            return Err(ParseError::unexpected(input, &token, "a statement or end of source"));
        }

        Ok(Program { stmts })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_block(f, &self.stmts, 0)
    }
}
