//! Token source for the parser.
use crate::{
    lex::{LexError, Lexer},
    tokens::{Span, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use std::{error, fmt};

/// Lexed tokens with a peek cursor that can run ahead of the read position.
///
/// Nothing is lexed until a token is read or peeked. Each `peek` moves the
/// peek cursor one token further. Reading a token, or `reset_peek`, brings
/// the cursor back to the read position.
pub struct TokenStream<'a> {
    lexer: MultiPeek<Lexer<'a>>,
    /// Whole input, for slicing token text by span.
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    #[inline]
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            source: lexer.source.original,
            lexer: multipeek(lexer),
        }
    }

    /// Source text under a span, empty when the span is out of range.
    #[inline]
    pub fn fragment(&self, span: &Span) -> &'a str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }

    /// Reads the next token, whatever its kind.
    #[inline]
    pub fn next_token(&mut self) -> Result<Token, TokenError> {
        match self.lexer.next() {
            Some(result) => result.map_err(TokenError::Lex),
            None => Err(TokenError::EndOfSource),
        }
    }

    /// Reads the next token if it has the wanted kind.
    ///
    /// On a mismatch the token stays where it is.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        self.lexer.reset_peek();
        let head = self.peek().map(|token| (token.kind, token.span.line, token.span.column));
        self.lexer.reset_peek();

        let (encountered, line, column) = head?;
        if encountered != token_kind {
            return Err(TokenError::Mismatch {
                expected: token_kind,
                encountered,
                line,
                column,
            });
        }
        self.next_token()
    }

    /// Optional form of `consume`. Tells whether the token was taken.
    #[inline]
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        self.consume(token_kind).is_ok()
    }

    /// Token under the peek cursor. Moves the cursor forward.
    #[inline]
    pub fn peek(&mut self) -> Result<&Token, TokenError> {
        match self.lexer.peek() {
            Some(result) => result.as_ref().map_err(|err| TokenError::Lex(err.clone())),
            None => Err(TokenError::EndOfSource),
        }
    }

    /// Kind of the next token. The peek cursor ends at the read position.
    pub fn peek_kind(&mut self) -> Result<TokenKind, TokenError> {
        self.lexer.reset_peek();
        let kind = self.peek().map(|token| token.kind);
        self.lexer.reset_peek();
        kind
    }

    /// Kinds of the next two tokens.
    pub fn peek_kind2(&mut self) -> Result<(TokenKind, TokenKind), TokenError> {
        self.lexer.reset_peek();
        let first = self.peek().map(|token| token.kind);
        let second = self.peek().map(|token| token.kind);
        self.lexer.reset_peek();
        Ok((first?, second?))
    }

    #[inline]
    pub fn reset_peek(&mut self) {
        self.lexer.reset_peek()
    }
}

/// Why the parser could not get the token it wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Mismatch {
        expected: TokenKind,
        encountered: TokenKind,
        line: usize,
        column: usize,
    },
    EndOfSource,
    Lex(LexError),
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch {
                expected,
                encountered,
                line,
                column,
            } => write!(
                f,
                "encountered unexpected token '{}' at {}:{}, expected '{}'",
                encountered, line, column, expected
            ),
            E::EndOfSource => write!(f, "unexpected end of source code"),
            E::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}
