use super::{
    check_invocation, check_variable, find_binding, function_key,
    symbol::{ScopeId, Symbol, SymbolKind, SymbolTable},
    CompileError, CompileResult,
};
use crate::parsing::{
    AstVisitor, Assignment, DeclareFunction, Expr, IfStatement, InvokeFunction, Program, Stmt, WhileStatement,
};
use log::debug;
use smol_str::SmolStr;
use std::collections::HashSet;

/// Validates names, kinds and call arities of a program before
/// code generation.
///
/// The built symbol table is only used for checking. The code
/// generator rebuilds its own while lowering.
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    /// Scope that statements are currently bound into.
    current: ScopeId,
    /// Every declared function shares one namespace, whatever
    /// scope it was declared in.
    functions: HashSet<SmolStr>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let symbols = SymbolTable::new();
        let current = symbols.root();
        SemanticAnalyzer {
            symbols,
            current,
            functions: HashSet::new(),
        }
    }

    /// Analyze the program wrapped in the default entry function.
    #[inline]
    pub fn analyze(&mut self, program: &Program) -> CompileResult<()> {
        self.analyze_entry(program, Program::ENTRY)
    }

    pub fn analyze_entry(&mut self, program: &Program, entry: &str) -> CompileResult<()> {
        // Start every run from a fresh global scope.
        *self = SemanticAnalyzer::new();
        debug!("semantic analysis of entry '{}'", entry);
        self.declare_function(&program.as_function(entry))
    }

    /// Symbols bound by the most recent run.
    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn in_scope(&mut self, name: impl Into<SmolStr>, f: impl FnOnce(&mut Self) -> CompileResult<()>) -> CompileResult<()> {
        let enclosing = self.current;
        self.current = self.symbols.new_scope(name, Some(enclosing));
        debug!("entering scope '{}'", self.symbols.path(self.current));

        let result = f(self);

        debug!("exiting scope '{}'", self.symbols.path(self.current));
        self.current = enclosing;
        result
    }

    fn block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    #[inline]
    fn default() -> Self {
        SemanticAnalyzer::new()
    }
}

impl AstVisitor for SemanticAnalyzer {
    type Output = CompileResult<()>;

    fn assignment(&mut self, stmt: &Assignment) -> CompileResult<()> {
        if let Some(existing) = find_binding(&self.symbols, self.current, &stmt.variable) {
            if !matches!(existing, Symbol::Variable { .. }) {
                return Err(CompileError::RedeclaredSymbol {
                    name: stmt.variable.clone(),
                    existing: existing.kind(),
                });
            }
        }

        self.expr(&stmt.value)?;
        self.symbols.insert(self.current, Symbol::variable(stmt.variable.clone()));
        Ok(())
    }

    fn if_stmt(&mut self, stmt: &IfStatement) -> CompileResult<()> {
        self.expr(&stmt.condition)?;
        self.in_scope("if", |this| this.block(&stmt.body))?;
        if let Some(else_body) = &stmt.else_body {
            self.in_scope("else", |this| this.block(else_body))?;
        }
        Ok(())
    }

    fn while_stmt(&mut self, stmt: &WhileStatement) -> CompileResult<()> {
        self.expr(&stmt.condition)?;
        self.in_scope("while", |this| this.block(&stmt.body))
    }

    fn declare_function(&mut self, func: &DeclareFunction) -> CompileResult<()> {
        let name = function_key(&func.name);

        if self.functions.contains(&name) {
            return Err(CompileError::RedeclaredSymbol {
                name,
                existing: SymbolKind::Function,
            });
        }
        if let Some(existing) = find_binding(&self.symbols, self.current, &name) {
            return Err(CompileError::RedeclaredSymbol {
                name,
                existing: existing.kind(),
            });
        }
        self.functions.insert(name.clone());

        // Bound before the body so the function can call itself.
        self.symbols
            .insert(self.current, Symbol::function(name.clone(), func.params.clone()));

        self.in_scope(name, |this| {
            for param in &func.params {
                this.symbols.insert(this.current, Symbol::variable(param.clone()));
            }
            this.block(&func.body)
        })
    }

    fn invoke_function(&mut self, invoke: &InvokeFunction) -> CompileResult<()> {
        let name = function_key(&invoke.name);
        check_invocation(&self.symbols, self.current, &name, invoke.args.len())?;

        for arg in &invoke.args {
            match arg {
                Expr::Ident(ident) => {
                    check_variable(&self.symbols, self.current, &ident.name)?;
                }
                _ => self.expr(arg)?,
            }
        }

        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) => Ok(()),
            Expr::Ident(ident) => match self.symbols.lookup(self.current, &ident.name, false) {
                Some(_) => Ok(()),
                None => Err(CompileError::UndeclaredSymbol {
                    name: ident.name.clone(),
                }),
            },
            Expr::Binary(bin) => {
                self.expr(&bin.left)?;
                self.expr(&bin.right)
            }
            Expr::Not(not) => self.expr(&not.expression),
        }
    }
}
