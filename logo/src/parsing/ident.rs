use super::{Parse, ParseError};
use crate::{token_stream::TokenStream, tokens::TokenKind};
use smol_str::SmolStr;
use std::fmt;

/// Colon-prefixed reference to a named value, `:NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: SmolStr,
}

impl Identifier {
    #[inline]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Identifier { name: name.into() }
    }
}

impl Parse for Identifier {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Colon)?;
        Ok(Identifier {
            name: parse_name(input)?,
        })
    }
}

/// Bare name at a binding site, or the target of an invocation.
pub(crate) fn parse_name(input: &mut TokenStream) -> Result<SmolStr, ParseError> {
    let token = input.consume(TokenKind::Ident)?;
    Ok(SmolStr::from(input.fragment(&token.span)))
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ":{}", self.name)
    }
}
