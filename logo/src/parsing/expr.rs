//! Expression parsing.
//!
//! Boolean and arithmetic expressions live on separate grammar layers.
//! Connectives and negation only accept relations, and arithmetic only
//! accepts factors, so the two kinds can meet only through a comparison.
use super::{
    ident::Identifier,
    literal::{as_boolean, parse_bool_word, parse_number, parse_string},
    BooleanShapeError, Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};
use smol_str::SmolStr;
use std::fmt;

/// Number of connectives allowed in one chain before
/// parentheses are required.
pub const MAX_CONNECTIVE_CHAIN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(SmolStr),
    Bool(bool),
    Ident(Identifier),
    Binary(BinaryOperation),
    Not(NotOperation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub op: Operator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotOperation {
    pub expression: Box<Expr>,
}

impl Expr {
    #[inline]
    pub fn binary(op: Operator, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryOperation {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    #[inline]
    pub fn not(expression: Expr) -> Self {
        Expr::Not(NotOperation {
            expression: Box::new(expression),
        })
    }

    #[inline]
    pub fn ident(name: impl Into<SmolStr>) -> Self {
        Expr::Ident(Identifier::new(name))
    }

    /// Binary operation of the given operator class.
    #[inline]
    pub fn is_class(&self, class: OperatorClass) -> bool {
        matches!(self, Expr::Binary(bin) if bin.op.class() == class)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Equal,
    NotEqual,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Comparison,
    Connective,
}

#[rustfmt::skip]
pub const ARITHMETIC_OPERATORS: [Operator; 5] = [
    Operator::Add, Operator::Sub, Operator::Mul, Operator::Div, Operator::Pow,
];

#[rustfmt::skip]
pub const COMPARISON_OPERATORS: [Operator; 6] = [
    Operator::Greater, Operator::GreaterEq, Operator::Less,
    Operator::LessEq, Operator::Equal, Operator::NotEqual,
];

pub const CONNECTIVE_OPERATORS: [Operator; 2] = [Operator::And, Operator::Or];

impl Operator {
    pub fn class(self) -> OperatorClass {
        if ARITHMETIC_OPERATORS.contains(&self) {
            OperatorClass::Arithmetic
        } else if COMPARISON_OPERATORS.contains(&self) {
            OperatorClass::Comparison
        } else {
            OperatorClass::Connective
        }
    }

    #[rustfmt::skip]
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::Plus                  => Some(Operator::Add),
            T::Minus                 => Some(Operator::Sub),
            T::Star                  => Some(Operator::Mul),
            T::Slash                 => Some(Operator::Div),
            T::Caret                 => Some(Operator::Pow),
            T::Greater               => Some(Operator::Greater),
            T::GreaterEq             => Some(Operator::GreaterEq),
            T::Less                  => Some(Operator::Less),
            T::LessEq                => Some(Operator::LessEq),
            T::EqEq                  => Some(Operator::Equal),
            T::NotEq                 => Some(Operator::NotEqual),
            T::Keyword(Keyword::And) => Some(Operator::And),
            T::Keyword(Keyword::Or)  => Some(Operator::Or),
            _                        => None,
        }
    }

    /// Binding strength among arithmetic operators.
    fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
            Operator::Pow => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for Operator {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            Operator::Add       => "+",
            Operator::Sub       => "-",
            Operator::Mul       => "*",
            Operator::Div       => "/",
            Operator::Pow       => "^",
            Operator::Greater   => ">",
            Operator::GreaterEq => ">=",
            Operator::Less      => "<",
            Operator::LessEq    => "<=",
            Operator::Equal     => "==",
            Operator::NotEqual  => "<>",
            Operator::And       => "AND",
            Operator::Or        => "OR",
        };
        f.write_str(symbol)
    }
}

impl Parse for Expr {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        parse_connective(input)
    }
}

/// Operator of the given class under the cursor, if any.
fn peek_operator(input: &mut TokenStream, class: OperatorClass) -> Result<Option<Operator>, ParseError> {
    let kind = input.peek_kind()?;
    Ok(Operator::from_token(kind).filter(|op| op.class() == class))
}

fn parse_connective(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut left = parse_negation(input)?;
    let mut chained = 0;

    while let Some(op) = peek_operator(input, OperatorClass::Connective)? {
        input.next_token()?;

        chained += 1;
        if chained > MAX_CONNECTIVE_CHAIN {
            return Err(BooleanShapeError::ChainTooLong { operator: op }.into());
        }

        let right = parse_negation(input)?;
        left = Expr::binary(op, as_boolean(left)?, as_boolean(right)?);
    }

    Ok(left)
}

fn parse_negation(input: &mut TokenStream) -> Result<Expr, ParseError> {
    if input.match_token(TokenKind::Keyword(Keyword::Not)) {
        let operand = parse_relation(input)?;
        Ok(Expr::not(as_boolean(operand)?))
    } else {
        parse_relation(input)
    }
}

/// Relation level, also the grammar of an invocation argument.
pub(crate) fn parse_relation(input: &mut TokenStream) -> Result<Expr, ParseError> {
    match input.peek_kind()? {
        TokenKind::LeftParen if is_boolean_group(input)? => {
            input.consume(TokenKind::LeftParen)?;
            let expr = parse_connective(input)?;
            input.consume(TokenKind::RightParen)?;
            Ok(expr)
        }
        TokenKind::Ident => parse_bool_word(input),
        _ => {
            let left = parse_math(input)?;
            match peek_operator(input, OperatorClass::Comparison)? {
                Some(op) => {
                    input.next_token()?;
                    let right = parse_math(input)?;
                    Ok(Expr::binary(op, left, right))
                }
                None => Ok(left),
            }
        }
    }
}

/// Decides whether the parenthesized group under the cursor is a boolean
/// sub-expression, or the first factor of an arithmetic expression.
///
/// A group is arithmetic when its closing parenthesis is followed by an
/// arithmetic or comparison operator.
fn is_boolean_group(input: &mut TokenStream) -> Result<bool, ParseError> {
    input.reset_peek();

    let mut depth = 0_usize;
    loop {
        match input.peek()?.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            TokenKind::EOS => {
                // Unbalanced, left for the parser to report.
                input.reset_peek();
                return Ok(false);
            }
            _ => {}
        }
    }

    let follow = input.peek()?.kind;
    input.reset_peek();

    Ok(!matches!(
        Operator::from_token(follow).map(Operator::class),
        Some(OperatorClass::Arithmetic | OperatorClass::Comparison)
    ))
}

fn parse_math(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut left = parse_term(input)?;

    while let Some(op) = peek_operator(input, OperatorClass::Arithmetic)? {
        if !matches!(op, Operator::Add | Operator::Sub) {
            break;
        }
        input.next_token()?;
        let right = parse_term(input)?;
        left = Expr::binary(op, left, right);
    }

    Ok(left)
}

fn parse_term(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut left = parse_pow(input)?;

    while let Some(op) = peek_operator(input, OperatorClass::Arithmetic)? {
        if !matches!(op, Operator::Mul | Operator::Div) {
            break;
        }
        input.next_token()?;
        let right = parse_pow(input)?;
        left = Expr::binary(op, left, right);
    }

    Ok(left)
}

/// Exponentiation doesn't chain. A nested power needs parentheses.
fn parse_pow(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let base = parse_factor(input)?;

    if input.match_token(TokenKind::Caret) {
        let exponent = parse_factor(input)?;
        Ok(Expr::binary(Operator::Pow, base, exponent))
    } else {
        Ok(base)
    }
}

fn parse_factor(input: &mut TokenStream) -> Result<Expr, ParseError> {
    use TokenKind as T;

    match input.peek_kind()? {
        T::Number => parse_number(input),
        T::String => parse_string(input),
        T::Colon => Identifier::parse(input).map(Expr::Ident),
        T::LeftParen => {
            input.consume(T::LeftParen)?;
            let expr = parse_math(input)?;
            input.consume(T::RightParen)?;
            Ok(expr)
        }
        _ => {
            let token = input.next_token()?;
            Err(ParseError::unexpected(
                input,
                &token,
                "a number, string, ':name' or '('",
            ))
        }
    }
}

// ----------------------------------------------------------------------------
// Printing
//
// Expressions print back to source that parses to an equal tree. Parentheses
// are only emitted where the grammar needs them.

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{}", value),
            Expr::Str(text) => write!(f, "'{}'", text),
            Expr::Bool(true) => f.write_str("TRUE"),
            Expr::Bool(false) => f.write_str("FALSE"),
            Expr::Ident(ident) => fmt::Display::fmt(ident, f),
            Expr::Binary(bin) => fmt::Display::fmt(bin, f),
            Expr::Not(not) => fmt::Display::fmt(not, f),
        }
    }
}

impl fmt::Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = self.op;
        match op.class() {
            OperatorClass::Arithmetic => {
                let precedence = op.precedence();
                let (left_min, right_min) = match op {
                    Operator::Pow => (precedence + 1, precedence + 1),
                    _ => (precedence, precedence + 1),
                };
                write_arithmetic_operand(f, &self.left, left_min)?;
                write!(f, " {} ", op)?;
                write_arithmetic_operand(f, &self.right, right_min)
            }
            OperatorClass::Comparison => {
                write_arithmetic_operand(f, &self.left, 0)?;
                write!(f, " {} ", op)?;
                write_arithmetic_operand(f, &self.right, 0)
            }
            OperatorClass::Connective => {
                write_boolean_operand(f, &self.left)?;
                write!(f, " {} ", op)?;
                write_boolean_operand(f, &self.right)
            }
        }
    }
}

impl fmt::Display for NotOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("NOT ")?;
        write_boolean_operand(f, &self.expression)
    }
}

fn write_arithmetic_operand(f: &mut fmt::Formatter, expr: &Expr, min_precedence: u8) -> fmt::Result {
    match expr {
        Expr::Binary(bin) if bin.op.class() == OperatorClass::Arithmetic => {
            if bin.op.precedence() < min_precedence {
                write!(f, "( {} )", expr)
            } else {
                write!(f, "{}", expr)
            }
        }
        Expr::Binary(_) | Expr::Not(_) => write!(f, "( {} )", expr),
        _ => write!(f, "{}", expr),
    }
}

fn write_boolean_operand(f: &mut fmt::Formatter, expr: &Expr) -> fmt::Result {
    if expr.is_class(OperatorClass::Connective) || matches!(expr, Expr::Not(_)) {
        write!(f, "( {} )", expr)
    } else {
        write!(f, "{}", expr)
    }
}
