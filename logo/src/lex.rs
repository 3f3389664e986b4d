//! Lexical analysis (tokenizer)
use crate::tokens::{Keyword, Span, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use std::{
    error, fmt,
    iter::Iterator,
    str::{CharIndices, FromStr},
};

pub fn debug_print_lexer(lexer: Lexer) {
    let source = lexer.source.original;
    println!("Source Byte Count: {}", source.len());
    println!("offset  | line | token            | fragment");

    for result in lexer {
        match result {
            Ok(token) => {
                let Span { start, end, line, .. } = token.span;
                let kind = format!("{:?}", token.kind);
                println!("{start:4}-{end:<4} {line:5}   {kind: <18} \"{}\"", &source[start..end]);
            }
            Err(err) => println!("{}", err),
        }
    }
}

/// Lexical analyzer.
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    token_start: SourcePos,
    /// Kind of the most recently emitted token.
    last_kind: Option<TokenKind>,
    /// Whitespace or a comment was skipped since the last emitted token.
    spaced: bool,
    /// End-of-source was emitted, or lexing failed.
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: SourcePos {
                position: 0,
                line: 1,
                column: 1,
            },
            last_kind: None,
            spaced: true,
            done: false,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.scan_token()?;
        self.last_kind = Some(token.kind);
        self.spaced = false;
        Ok(token)
    }

    #[rustfmt::skip]
    fn scan_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        while let Some((_, next_char)) = self.source.next_char() {
            self.start_token();

            let kind = match next_char {
                '+'               => T::Plus,
                '-'               => match self.source.peek_char() {
                    Some('0'..='9') if self.sign_allowed() => return Ok(self.consume_number()),
                    _ => T::Minus,
                },
                '*'               => T::Star,
                '/'               => T::Slash,
                '^'               => T::Caret,
                ':'               => T::Colon,
                '('               => T::LeftParen,
                ')'               => T::RightParen,
                '='               => if self.source.match_char('=') { T::EqEq } else { T::Eq },
                '<'               => {
                    if self.source.match_char('>') {
                        T::NotEq
                    } else if self.source.match_char('=') {
                        T::LessEq
                    } else {
                        T::Less
                    }
                }
                '>'               => if self.source.match_char('=') { T::GreaterEq } else { T::Greater },
                ' ' | '\t'
                    | '\r' | '\n' => {
                    self.consume_whitespace();
                    continue;
                }
                ';'               => {
                    self.consume_until_newline();
                    continue;
                }
                '\''              => return self.consume_string(),
                '0'..='9'         => return Ok(self.consume_number()),
                '_' | 'a'..='z'
                    | 'A'..='Z'   => return Ok(self.consume_ident()),
                _                 => {
                    return Err(LexError::UnknownCharacter {
                        ch: next_char,
                        line: self.token_start.line,
                        column: self.token_start.column,
                    })
                }
            };

            return Ok(self.make_token(kind));
        }

        // Give end-of-source its own character position.
        self.start_token();
        Ok(self.make_token(T::EOS))
    }

    /// A minus directly followed by a digit is the sign of a number literal,
    /// unless it is glued to the end of a preceding operand.
    fn sign_allowed(&self) -> bool {
        self.spaced || !self.last_kind.map(|kind| kind.ends_operand()).unwrap_or(false)
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = SourcePos {
            position: self.source.current.0,
            column: self.source.current_column,
            line: self.source.current_line,
        };
    }

    fn make_token(&mut self, token_kind: TokenKind) -> Token {
        let span = Span {
            start: self.token_start.position,
            end: self.source.current_end(),
            line: self.token_start.line,
            column: self.token_start.column,
        };

        Token { kind: token_kind, span }
    }

    /// Consume whitespace characters, including newlines, until a
    /// non-whitespace character is encountered.
    fn consume_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.source.peek_char() {
            self.source.next_char();
        }
        self.spaced = true;
    }

    fn consume_number(&mut self) -> Token {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // Fractional part requires at least one digit after the point.
        if let (Some('.'), Some('0'..='9')) = self.source.peek_char2() {
            self.source.next_char();
            while let Some('0'..='9') = self.source.peek_char() {
                self.source.next_char();
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn consume_ident(&mut self) -> Token {
        while let Some('_' | 'a'..='z' | 'A'..='Z' | '0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = Keyword::from_str(self.token_fragment())
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        self.make_token(token_kind)
    }

    /// The opening quote has already been consumed.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        loop {
            match self.source.next_char() {
                Some((_, '\'')) => return Ok(self.make_token(TokenKind::String)),
                Some(_) => continue,
                None => {
                    return Err(LexError::UnterminatedString {
                        line: self.token_start.line,
                        column: self.token_start.column,
                    })
                }
            }
        }
    }

    fn consume_until_newline(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
        self.spaced = true;
    }

    fn token_fragment(&self) -> &str {
        &self.source.original[self.token_start.position..self.source.current_end()]
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
///
/// The iterator is exhausted after yielding end-of-source
/// or the first lexical error.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(Token {
                kind: TokenKind::EOS, ..
            })
            | Err(_) => self.done = true,
            _ => {}
        }
        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    pub(crate) original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// The `MultiPeek` wrapper allows for arbitrary lookahead by consuming
    /// the iterator internally and buffering the result. Peeking advances
    /// an internal peek cursor, so the helpers below reset it first.
    source: MultiPeek<CharIndices<'a>>,

    /// Byte position in the source string of the current character.
    current: (usize, char),
    current_line: usize,
    current_column: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            source: multipeek(source.char_indices()),
            current: (0, '\0'),
            current_line: 1,
            current_column: 0,
        }
    }

    /// number of bytes in source.
    fn byte_count(&self) -> usize {
        self.original.len()
    }

    /// Advance the cursor and return the next position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        if let Some((index, c)) = self.source.next() {
            // The newline itself is counted on the line it terminates.
            if self.current.1 == '\n' {
                self.current_column = 0;
                self.current_line += 1;
            }
            self.current_column += 1;
            self.current = (index, c);
            Some((index, c))
        } else {
            // Source code iterator has reached end-of-file.
            //
            // Set the current index to the size of the source
            // string. There is no End-of-file character, so
            // we just set it to the null-byte.
            if self.current.1 == '\n' {
                self.current_column = 0;
                self.current_line += 1;
            }
            self.current = (self.byte_count(), '\0');
            None
        }
    }

    /// Byte position just past the current character.
    fn current_end(&self) -> usize {
        let (index, c) = self.current;
        if index >= self.byte_count() {
            self.byte_count()
        } else {
            index + c.len_utf8()
        }
    }

    /// Peeks the next character without advancing.
    fn peek_char(&mut self) -> Option<char> {
        self.source.reset_peek();
        let c = self.source.peek().map(|(_, c)| *c);
        self.source.reset_peek();
        c
    }

    /// Two character lookahead.
    fn peek_char2(&mut self) -> (Option<char>, Option<char>) {
        self.source.reset_peek();
        let pair = (
            self.source.peek().map(|(_, c)| *c),
            self.source.peek().map(|(_, c)| *c),
        );
        self.source.reset_peek();
        pair
    }

    /// Consumes the next character if it equals the expected one.
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Default)]
struct SourcePos {
    position: usize,
    column: usize,
    line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnknownCharacter { ch: char, line: usize, column: usize },
    UnterminatedString { line: usize, column: usize },
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexError::UnknownCharacter { ch, line, column } => {
                write!(f, "lexical error: unknown character {:?} at {}:{}", ch, line, column)
            }
            LexError::UnterminatedString { line, column } => {
                write!(f, "lexical error: unterminated string starting at {}:{}", line, column)
            }
        }
    }
}
