//! Boolean-shape validation.
use super::{BooleanShapeError, Expr, OperatorClass};

/// Checks that an expression can stand where a boolean is required.
///
/// Identifiers, boolean literals and comparisons are boolean-shaped.
/// Connectives and negations are boolean-shaped when their operands are.
pub fn check_boolean_shape(expr: &Expr) -> Result<(), BooleanShapeError> {
    match expr {
        Expr::Ident(_) | Expr::Bool(_) => Ok(()),
        Expr::Binary(bin) => match bin.op.class() {
            OperatorClass::Comparison => Ok(()),
            OperatorClass::Connective => {
                check_boolean_shape(&bin.left)?;
                check_boolean_shape(&bin.right)
            }
            OperatorClass::Arithmetic => Err(BooleanShapeError::NotBoolean {
                culprit: bin.op.to_string(),
            }),
        },
        Expr::Not(not) => check_boolean_shape(&not.expression),
        Expr::Number(_) | Expr::Str(_) => Err(BooleanShapeError::NotBoolean {
            culprit: expr.to_string(),
        }),
    }
}

/// Checks every connective and negation nested inside an expression used
/// as a plain value, such as the right-hand side of an assignment.
pub fn check_expression(expr: &Expr) -> Result<(), BooleanShapeError> {
    match expr {
        Expr::Not(_) => check_boolean_shape(expr),
        Expr::Binary(bin) => match bin.op.class() {
            OperatorClass::Connective => check_boolean_shape(expr),
            _ => {
                check_expression(&bin.left)?;
                check_expression(&bin.right)
            }
        },
        _ => Ok(()),
    }
}
