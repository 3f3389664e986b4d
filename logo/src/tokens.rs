use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    Plus,       // `+`
    Minus,      // `-`
    Star,       // `*`
    Slash,      // `/`
    Caret,      // `^`
    Eq,         // `=`
    EqEq,       // `==`
    NotEq,      // `<>`
    Greater,    // `>`
    GreaterEq,  // `>=`
    Less,       // `<`
    LessEq,     // `<=`
    Colon,      // `:`
    LeftParen,  // `(`
    RightParen, // `)`

    /// Number Literal
    Number,

    /// Single-quoted string literal
    String,

    Ident,

    /// Identifier in the set of reserved words.
    Keyword(Keyword),

    /// End-of-source
    EOS,
}

impl TokenKind {
    /// Tokens that close an operand. A minus following one of
    /// these, without whitespace in between, is a subtraction.
    #[inline]
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Number | TokenKind::String | TokenKind::Ident | TokenKind::RightParen
        )
    }

    /// Tokens that can begin an invocation argument.
    #[inline]
    pub fn starts_argument(&self) -> bool {
        matches!(
            self,
            TokenKind::Number | TokenKind::String | TokenKind::Colon | TokenKind::LeftParen
        )
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        match self {
            T::Plus       => write!(f, "+"),
            T::Minus      => write!(f, "-"),
            T::Star       => write!(f, "*"),
            T::Slash      => write!(f, "/"),
            T::Caret      => write!(f, "^"),
            T::Eq         => write!(f, "="),
            T::EqEq       => write!(f, "=="),
            T::NotEq      => write!(f, "<>"),
            T::Greater    => write!(f, ">"),
            T::GreaterEq  => write!(f, ">="),
            T::Less       => write!(f, "<"),
            T::LessEq     => write!(f, "<="),
            T::Colon      => write!(f, ":"),
            T::LeftParen  => write!(f, "("),
            T::RightParen => write!(f, ")"),
            T::Number     => write!(f, "number"),
            T::String     => write!(f, "string"),
            T::Ident      => write!(f, "identifier"),
            T::Keyword(k) => write!(f, "{}", k),
            T::EOS        => write!(f, "end of source"),
        }
    }
}

/// Reserved words. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    To,
    End,
    If,
    Then,
    Else,
    While,
    Not,
    And,
    Or,
    Set,
}

impl fmt::Display for Keyword {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Keyword as K;
        match self {
            K::To    => write!(f, "TO"),
            K::End   => write!(f, "END"),
            K::If    => write!(f, "IF"),
            K::Then  => write!(f, "THEN"),
            K::Else  => write!(f, "ELSE"),
            K::While => write!(f, "WHILE"),
            K::Not   => write!(f, "NOT"),
            K::And   => write!(f, "AND"),
            K::Or    => write!(f, "OR"),
            K::Set   => write!(f, "SET"),
        }
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Keyword as K;
        match s.to_ascii_uppercase().as_str() {
            "TO" => Ok(K::To),
            "END" => Ok(K::End),
            "IF" => Ok(K::If),
            "THEN" => Ok(K::Then),
            "ELSE" => Ok(K::Else),
            "WHILE" => Ok(K::While),
            "NOT" => Ok(K::Not),
            "AND" => Ok(K::And),
            "OR" => Ok(K::Or),
            "SET" => Ok(K::Set),
            _ => Err(()),
        }
    }
}

/// Chunk of source code, encoded as starting and ending positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start position of bytes in source.
    pub start: usize,
    /// End position of bytes in source, exclusive.
    pub end: usize,
    pub line: usize,
    pub column: usize,
}
