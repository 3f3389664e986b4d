//! Scoped symbol table.
//!
//! Scopes live in a flat arena and link to their enclosing scope by index.
//! Leaving a scope only moves the caller's cursor back to the enclosing
//! index, so sibling scopes never see each other's bindings.
use super::builtins;
use log::trace;
use smol_str::SmolStr;
use std::{collections::HashMap, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Variable {
        name: SmolStr,
    },
    Function {
        name: SmolStr,
        params: Vec<SmolStr>,
        /// Accepts any number of arguments.
        variadic: bool,
    },
}

impl Symbol {
    #[inline]
    pub fn variable(name: impl Into<SmolStr>) -> Self {
        Symbol::Variable { name: name.into() }
    }

    #[inline]
    pub fn function(name: impl Into<SmolStr>, params: Vec<SmolStr>) -> Self {
        Symbol::Function {
            name: name.into(),
            params,
            variadic: false,
        }
    }

    pub fn name(&self) -> &SmolStr {
        match self {
            Symbol::Variable { name } | Symbol::Function { name, .. } => name,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Variable { .. } => SymbolKind::Variable,
            Symbol::Function { .. } => SymbolKind::Function,
        }
    }

    /// Number of arguments a function takes. `None` for variables
    /// and variadic functions.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Symbol::Function {
                params,
                variadic: false,
                ..
            } => Some(params.len()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Function => write!(f, "function"),
        }
    }
}

/// Index of a scope in its `SymbolTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug)]
pub struct Scope {
    pub name: SmolStr,
    /// Nesting depth, the global scope is level 1.
    pub level: usize,
    pub enclosing: Option<ScopeId>,
    symbols: HashMap<SmolStr, Symbol>,
}

impl Scope {
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Name of the root scope.
    pub const GLOBAL: &'static str = "global";

    /// Table with a global scope holding the built-in catalog.
    pub fn new() -> Self {
        let mut table = Self::empty();
        let root = table.root();
        builtins::seed(&mut table, root);
        table
    }

    /// Table with an empty global scope.
    pub fn empty() -> Self {
        let mut table = SymbolTable { scopes: vec![] };
        table.new_scope(Self::GLOBAL, None);
        table
    }

    #[inline]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn new_scope(&mut self, name: impl Into<SmolStr>, enclosing: Option<ScopeId>) -> ScopeId {
        let level = enclosing.map(|id| self.scope(id).level + 1).unwrap_or(1);
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            level,
            enclosing,
            symbols: HashMap::new(),
        });
        id
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Binds the symbol in the given scope, replacing any
    /// previous binding of the same name in that scope only.
    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> Option<Symbol> {
        let name = symbol.name().clone();
        self.insert_as(scope, name, symbol)
    }

    /// Binds the symbol under a different name, such as a short alias
    /// of a built-in function.
    pub fn insert_as(&mut self, scope: ScopeId, name: impl Into<SmolStr>, symbol: Symbol) -> Option<Symbol> {
        let name = name.into();
        trace!("insert {} '{}' into scope '{}'", symbol.kind(), name, self.scope(scope).name);
        self.scopes[scope.0].symbols.insert(name, symbol)
    }

    /// Looks up a name in the given scope, then along the chain of
    /// enclosing scopes unless `current_scope_only` is set.
    pub fn lookup(&self, scope: ScopeId, name: &str, current_scope_only: bool) -> Option<&Symbol> {
        if current_scope_only {
            trace!("lookup '{}' in scope '{}'", name, self.scope(scope).name);
            self.scope(scope).get(name)
        } else {
            self.resolve(scope, name).map(|(_, symbol)| symbol)
        }
    }

    /// Looks up a name along the scope chain, returning the
    /// scope that binds it.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let current = self.scope(id);
            trace!("lookup '{}' in scope '{}'", name, current.name);
            if let Some(symbol) = current.get(name) {
                return Some((id, symbol));
            }
            cursor = current.enclosing;
        }
        None
    }

    /// Dotted path of scope names from the global scope down.
    pub fn path(&self, scope: ScopeId) -> String {
        let mut names = vec![];
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let current = self.scope(id);
            names.push(current.name.as_str());
            cursor = current.enclosing;
        }
        names.reverse();
        names.join(".")
    }
}

impl Default for SymbolTable {
    #[inline]
    fn default() -> Self {
        SymbolTable::new()
    }
}
