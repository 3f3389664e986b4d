mod analyzer;
mod artifact;
pub mod builtins;
mod codegen;
mod ir;
mod symbol;

pub use analyzer::SemanticAnalyzer;
pub use artifact::{Artifact, Function};
pub use codegen::{BranchTargets, CodeGen};
pub use ir::{flatten, Flag, Instruction, Value};
pub use symbol::{Scope, ScopeId, Symbol, SymbolKind, SymbolTable};

use smol_str::SmolStr;
use std::{error, fmt};

pub type CompileResult<T> = Result<T, CompileError>;

/// Function names resolve without regard to case.
#[inline]
pub(crate) fn function_key(name: &str) -> SmolStr {
    SmolStr::new(name.to_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Name is already bound to a symbol that can't be replaced.
    RedeclaredSymbol { name: SmolStr, existing: SymbolKind },
    UndeclaredSymbol { name: SmolStr },
    ArityMismatch {
        name: SmolStr,
        expected: usize,
        found: usize,
    },
    /// Symbol exists but is the wrong kind for its use.
    TypeMismatch {
        name: SmolStr,
        expected: SymbolKind,
        found: SymbolKind,
    },
}

impl error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CompileError as E;
        match self {
            E::RedeclaredSymbol { name, existing } => {
                write!(f, "symbol '{}' is already declared as a {}", name, existing)
            }
            E::UndeclaredSymbol { name } => write!(f, "symbol '{}' is not declared", name),
            E::ArityMismatch { name, expected, found } => write!(
                f,
                "function '{}' takes {} argument(s), but {} were given",
                name, expected, found
            ),
            E::TypeMismatch { name, expected, found } => {
                write!(f, "symbol '{}' is a {}, expected a {}", name, found, expected)
            }
        }
    }
}

/// Symbol that prevents binding a new name in the given scope.
///
/// Functions of the global scope, which hold the built-in catalog and
/// the entry function, count as bound in every scope.
pub(crate) fn find_binding<'a>(symbols: &'a SymbolTable, scope: ScopeId, name: &str) -> Option<&'a Symbol> {
    symbols.lookup(scope, name, true).or_else(|| {
        symbols
            .lookup(symbols.root(), &function_key(name), true)
            .filter(|symbol| symbol.kind() == SymbolKind::Function)
    })
}

/// Resolves the target of an invocation and checks the argument count.
pub(crate) fn check_invocation<'a>(
    symbols: &'a SymbolTable,
    scope: ScopeId,
    name: &SmolStr,
    argc: usize,
) -> CompileResult<&'a Symbol> {
    let symbol = symbols
        .lookup(scope, name, false)
        .ok_or_else(|| CompileError::UndeclaredSymbol { name: name.clone() })?;

    if symbol.kind() != SymbolKind::Function {
        return Err(CompileError::TypeMismatch {
            name: name.clone(),
            expected: SymbolKind::Function,
            found: symbol.kind(),
        });
    }

    match symbol.arity() {
        Some(expected) if expected != argc => Err(CompileError::ArityMismatch {
            name: name.clone(),
            expected,
            found: argc,
        }),
        _ => Ok(symbol),
    }
}

/// Checks that a name passed by reference is a variable.
pub(crate) fn check_variable<'a>(
    symbols: &'a SymbolTable,
    scope: ScopeId,
    name: &SmolStr,
) -> CompileResult<(ScopeId, &'a Symbol)> {
    match symbols.resolve(scope, name) {
        None => Err(CompileError::UndeclaredSymbol { name: name.clone() }),
        Some((_, symbol)) if symbol.kind() != SymbolKind::Variable => Err(CompileError::TypeMismatch {
            name: name.clone(),
            expected: SymbolKind::Variable,
            found: symbol.kind(),
        }),
        Some(found) => Ok(found),
    }
}
