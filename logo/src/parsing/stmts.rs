//! Statement parsing.
use super::{
    block::Block,
    expr::{parse_relation, Expr, OperatorClass},
    func::DeclareFunction,
    ident::parse_name,
    literal::as_boolean,
    validate::{check_boolean_shape, check_expression},
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign(Assignment),
    If(IfStatement),
    While(WhileStatement),
    Func(DeclareFunction),
    Invoke(InvokeFunction),
}

/// Binds the value of an expression to a variable.
///
/// # Example
///
/// ```text
/// X = :Y + 1
/// SET X = :Y + 1
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub variable: SmolStr,
    pub value: Expr,
}

/// # Example
///
/// ```text
/// IF ( :X > 2 ) THEN
///   FORWARD 10
/// ELSE
///   LEFT 90
/// END
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    /// Present when the source has an `ELSE` clause, even an empty one.
    pub else_body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// Call of a built-in or user defined procedure.
///
/// # Example
///
/// ```text
/// SETXY :X 10
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeFunction {
    pub name: SmolStr,
    pub args: Vec<Expr>,
}

impl Parse for Stmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Keyword(K::To) => DeclareFunction::parse(input).map(Stmt::Func),
            T::Keyword(K::If) => IfStatement::parse(input).map(Stmt::If),
            T::Keyword(K::While) => WhileStatement::parse(input).map(Stmt::While),
            T::Keyword(K::Set) => Assignment::parse(input).map(Stmt::Assign),
            T::Ident => match input.peek_kind2()? {
                (_, T::Eq) => Assignment::parse(input).map(Stmt::Assign),
                _ => InvokeFunction::parse(input).map(Stmt::Invoke),
            },
            _ => {
                let token = input.next_token()?;
                Err(ParseError::unexpected(input, &token, "a statement"))
            }
        }
    }
}

impl Parse for Assignment {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.match_token(TokenKind::Keyword(Keyword::Set));
        let variable = parse_name(input)?;
        input.consume(TokenKind::Eq)?;

        let value = Expr::parse(input)?;
        check_expression(&value)?;

        Ok(Assignment { variable, value })
    }
}

impl Parse for IfStatement {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::If))?;
        let condition = parse_condition(input)?;
        input.consume(TokenKind::Keyword(Keyword::Then))?;

        let body = Block::parse(input)?;
        let else_body = if input.match_token(TokenKind::Keyword(Keyword::Else)) {
            Some(Block::parse(input)?)
        } else {
            None
        };
        input.consume(TokenKind::Keyword(Keyword::End))?;

        Ok(IfStatement {
            condition,
            body,
            else_body,
        })
    }
}

impl Parse for WhileStatement {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::While))?;
        let condition = parse_condition(input)?;
        let body = Block::parse(input)?;
        input.consume(TokenKind::Keyword(Keyword::End))?;

        Ok(WhileStatement { condition, body })
    }
}

impl Parse for InvokeFunction {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let name = parse_name(input)?;

        // Arguments run until a token that can't start an operand,
        // which is usually the start of the next statement.
        let mut args = vec![];
        while input.peek_kind()?.starts_argument() {
            let arg = parse_relation(input)?;
            check_expression(&arg)?;
            args.push(arg);
        }

        Ok(InvokeFunction { name, args })
    }
}

/// Parenthesized condition of `IF` and `WHILE`.
fn parse_condition(input: &mut TokenStream) -> Result<Expr, ParseError> {
    input.consume(TokenKind::LeftParen)?;
    let condition = as_boolean(Expr::parse(input)?)?;
    input.consume(TokenKind::RightParen)?;

    check_boolean_shape(&condition)?;
    Ok(condition)
}

// ----------------------------------------------------------------------------
// Printing

const INDENT: usize = 2;

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

pub(crate) fn write_block(f: &mut fmt::Formatter, stmts: &[Stmt], depth: usize) -> fmt::Result {
    for stmt in stmts {
        write_stmt(f, stmt, depth)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = depth * INDENT;
    match stmt {
        Stmt::Assign(assign) => writeln!(f, "{:pad$}{} = {}", "", assign.variable, assign.value),
        Stmt::If(if_stmt) => {
            writeln!(f, "{:pad$}IF ( {} ) THEN", "", if_stmt.condition)?;
            write_block(f, &if_stmt.body, depth + 1)?;
            if let Some(else_body) = &if_stmt.else_body {
                writeln!(f, "{:pad$}ELSE", "")?;
                write_block(f, else_body, depth + 1)?;
            }
            writeln!(f, "{:pad$}END", "")
        }
        Stmt::While(while_stmt) => {
            writeln!(f, "{:pad$}WHILE ( {} )", "", while_stmt.condition)?;
            write_block(f, &while_stmt.body, depth + 1)?;
            writeln!(f, "{:pad$}END", "")
        }
        Stmt::Func(func) => {
            write!(f, "{:pad$}TO {}", "", func.name)?;
            for param in &func.params {
                write!(f, " :{}", param)?;
            }
            writeln!(f)?;
            write_block(f, &func.body, depth + 1)?;
            writeln!(f, "{:pad$}END", "")
        }
        Stmt::Invoke(invoke) => {
            write!(f, "{:pad$}{}", "", invoke.name)?;
            for arg in &invoke.args {
                // Words can't start an argument, so boolean
                // arguments are wrapped in a group.
                let grouped = matches!(arg, Expr::Bool(_) | Expr::Not(_)) || arg.is_class(OperatorClass::Connective);
                if grouped {
                    write!(f, " ( {} )", arg)?;
                } else {
                    write!(f, " {}", arg)?;
                }
            }
            writeln!(f)
        }
    }
}
