use super::{
    artifact::{Artifact, Function},
    builtins::{self, BUILTIN_FUNCTIONS, BUILTIN_VARIABLES, STUB_VARIABLE},
    check_invocation, check_variable, find_binding, function_key,
    ir::{Instruction, Value},
    symbol::{ScopeId, Symbol, SymbolKind, SymbolTable},
    CompileError, CompileResult,
};
use crate::parsing::{
    AstVisitor, Assignment, DeclareFunction, Expr, IfStatement, InvokeFunction, Operator, OperatorClass, Program,
    Stmt, WhileStatement,
};
use log::debug;
use smol_str::SmolStr;
use std::collections::BTreeMap;

fn mangle_variable(scope: &str, name: &str) -> SmolStr {
    SmolStr::from(format!("{}_var_{}", scope, name))
}

/// Jump targets threaded through the lowering of a boolean expression.
///
/// A condition never falls through. Every path ends in a jump to
/// one of the two targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTargets {
    pub on_true: SmolStr,
    pub on_false: SmolStr,
}

impl BranchTargets {
    #[inline]
    pub fn new(on_true: impl Into<SmolStr>, on_false: impl Into<SmolStr>) -> Self {
        BranchTargets {
            on_true: on_true.into(),
            on_false: on_false.into(),
        }
    }

    #[inline]
    pub fn swapped(&self) -> Self {
        BranchTargets::new(self.on_false.clone(), self.on_true.clone())
    }

    #[inline]
    pub fn with_true(&self, on_true: SmolStr) -> Self {
        BranchTargets::new(on_true, self.on_false.clone())
    }

    #[inline]
    pub fn with_false(&self, on_false: SmolStr) -> Self {
        BranchTargets::new(self.on_true.clone(), on_false)
    }
}

/// Code generator.
///
/// Lowers a program into one instruction sequence per function. Names
/// are re-resolved against its own scope chain, so the semantic checks
/// are repeated here.
pub struct CodeGen {
    symbols: SymbolTable,
    current: ScopeId,
    /// Source of unique label and scope suffixes.
    counter: usize,
    functions: BTreeMap<SmolStr, Function>,
    /// Data slots and their initial values.
    variables: BTreeMap<SmolStr, Value>,
}

impl CodeGen {
    pub fn new() -> Self {
        let symbols = SymbolTable::new();
        let current = symbols.root();
        CodeGen {
            symbols,
            current,
            counter: 0,
            functions: BTreeMap::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Generate the program wrapped in the default entry function.
    #[inline]
    pub fn generate(self, program: &Program) -> CompileResult<Artifact> {
        self.generate_entry(program, Program::ENTRY)
    }

    /// Consumes the generator, so a failed run leaves nothing behind.
    pub fn generate_entry(mut self, program: &Program, entry: &str) -> CompileResult<Artifact> {
        debug!("code generation of entry '{}'", entry);
        self.install_builtins();
        self.declare_function(&program.as_function(entry))?;

        Ok(Artifact {
            entry: function_key(entry),
            functions: self.functions,
            variables: self.variables,
        })
    }

    fn install_builtins(&mut self) {
        let global = self.symbols.path(self.symbols.root());
        for name in BUILTIN_VARIABLES {
            self.variables.insert(mangle_variable(&global, name), Value::Number(0.0));
        }
        self.variables.insert(STUB_VARIABLE.into(), Value::Number(0.0));

        for builtin in BUILTIN_FUNCTIONS {
            let function = Function {
                name: builtin.name.into(),
                code: (builtin.stub)(),
            };
            self.functions.insert(function.name.clone(), function);
        }
    }

    fn next_id(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }

    fn new_label(&mut self, name: &str) -> SmolStr {
        let id = self.next_id();
        SmolStr::from(format!("{}_label_{}_{}", self.symbols.path(self.current), name, id))
    }

    /// Scratch data slot, such as the right operand of a comparison.
    fn new_temp(&mut self, name: &str) -> SmolStr {
        let id = self.next_id();
        let slot = SmolStr::from(format!("{}_tmp_{}_{}", self.symbols.path(self.current), name, id));
        self.variables.insert(slot.clone(), Value::Number(0.0));
        slot
    }

    /// Binds a new variable in the current scope and allocates its slot.
    fn declare_variable(&mut self, name: &SmolStr) -> SmolStr {
        self.symbols.insert(self.current, Symbol::variable(name.clone()));
        let slot = mangle_variable(&self.symbols.path(self.current), name);
        self.variables.insert(slot.clone(), Value::Number(0.0));
        slot
    }

    /// Slot of the variable a name resolves to along the scope chain.
    fn variable_slot(&self, name: &SmolStr) -> Option<SmolStr> {
        match self.symbols.resolve(self.current, name) {
            Some((scope, Symbol::Variable { .. })) => Some(mangle_variable(&self.symbols.path(scope), name)),
            _ => None,
        }
    }

    fn load(&self, name: &SmolStr) -> CompileResult<Instruction> {
        let (scope, _) = check_variable(&self.symbols, self.current, name)?;

        if scope == self.symbols.root() {
            if let Some(read) = builtins::device_read(name) {
                return Ok(read);
            }
        }

        Ok(Instruction::Load(mangle_variable(&self.symbols.path(scope), name)))
    }

    fn in_scope<T>(&mut self, name: impl Into<SmolStr>, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        let enclosing = self.current;
        self.current = self.symbols.new_scope(name, Some(enclosing));
        debug!("entering scope '{}'", self.symbols.path(self.current));

        let result = f(self);

        debug!("exiting scope '{}'", self.symbols.path(self.current));
        self.current = enclosing;
        result
    }

    fn block(&mut self, stmts: &[Stmt]) -> CompileResult<Vec<Instruction>> {
        let mut code = vec![];
        for stmt in stmts {
            code.extend(self.stmt(stmt)?);
        }
        Ok(code)
    }
}

impl Default for CodeGen {
    #[inline]
    fn default() -> Self {
        CodeGen::new()
    }
}

// ----------------------------------------------------------------------------
// Expressions

/// Jumps taken after `CMP` for each comparison operator.
#[rustfmt::skip]
fn branch_on(op: Operator, targets: &BranchTargets) -> Vec<Instruction> {
    use Instruction as I;
    let t = || targets.on_true.clone();
    let f = || targets.on_false.clone();
    match op {
        Operator::Greater   => vec![I::JumpMore(t()), I::Jump(f())],
        Operator::GreaterEq => vec![I::JumpMore(t()), I::JumpZero(t()), I::Jump(f())],
        Operator::Less      => vec![I::JumpLess(t()), I::Jump(f())],
        Operator::LessEq    => vec![I::JumpLess(t()), I::JumpZero(t()), I::Jump(f())],
        Operator::Equal     => vec![I::JumpZero(t()), I::Jump(f())],
        _                   => vec![I::JumpNotZero(t()), I::Jump(f())],
    }
}

fn arithmetic(op: Operator) -> Instruction {
    match op {
        Operator::Add => Instruction::Add,
        Operator::Sub => Instruction::Sub,
        Operator::Mul => Instruction::Mul,
        Operator::Div => Instruction::Div,
        _ => Instruction::Pow,
    }
}

/// Expression that only exists as control flow until materialized.
fn is_branching(expr: &Expr) -> bool {
    expr.is_class(OperatorClass::Comparison) || expr.is_class(OperatorClass::Connective)
}

impl CodeGen {
    /// Lowers an expression that leaves its value on the stack.
    fn lower_value(&mut self, expr: &Expr) -> CompileResult<Vec<Instruction>> {
        match expr {
            Expr::Number(value) => Ok(vec![Instruction::Push(Value::Number(*value))]),
            Expr::Str(text) => Ok(vec![Instruction::Push(Value::Str(text.clone()))]),
            Expr::Bool(value) => Ok(vec![Instruction::Push(Value::from(*value))]),
            Expr::Ident(ident) => Ok(vec![self.load(&ident.name)?]),
            Expr::Binary(bin) if bin.op.class() == OperatorClass::Arithmetic => {
                let mut code = self.lower_value(&bin.left)?;
                code.extend(self.lower_value(&bin.right)?);
                code.push(arithmetic(bin.op));
                Ok(code)
            }
            Expr::Binary(_) => self.materialize(expr, vec![]),
            Expr::Not(not) => {
                let mut code = self.lower_value(&not.expression)?;
                code.push(Instruction::Not);
                Ok(code)
            }
        }
    }

    /// Turns a boolean expression into a 1 or 0 on the stack.
    ///
    /// Both landing labels jump to a shared end label, which
    /// holds the given continuation.
    fn materialize(&mut self, expr: &Expr, then: Vec<Instruction>) -> CompileResult<Vec<Instruction>> {
        let on_true = self.new_label("true");
        let on_false = self.new_label("false");
        let end = self.new_label("end_bool");

        let mut code = self.lower_condition(expr, &BranchTargets::new(on_true.clone(), on_false.clone()))?;
        code.push(Instruction::label(
            on_true,
            vec![Instruction::Push(Value::from(true)), Instruction::Jump(end.clone())],
        ));
        code.push(Instruction::label(
            on_false,
            vec![Instruction::Push(Value::from(false)), Instruction::Jump(end.clone())],
        ));
        code.push(Instruction::label(end, then));
        Ok(code)
    }

    /// Lowers a boolean expression into jumps to one of the targets.
    pub(crate) fn lower_condition(&mut self, expr: &Expr, targets: &BranchTargets) -> CompileResult<Vec<Instruction>> {
        match expr {
            Expr::Bool(true) => Ok(vec![Instruction::Jump(targets.on_true.clone())]),
            Expr::Bool(false) => Ok(vec![Instruction::Jump(targets.on_false.clone())]),
            Expr::Not(not) => self.lower_condition(&not.expression, &targets.swapped()),
            Expr::Binary(bin) => match bin.op.class() {
                OperatorClass::Comparison => {
                    let mut code = self.lower_value(&bin.left)?;
                    code.extend(self.lower_value(&bin.right)?);
                    code.extend(self.compare(bin.op, targets));
                    Ok(code)
                }
                OperatorClass::Connective => {
                    // The right operand only runs when the left
                    // one didn't decide the result.
                    let next = self.new_label(if bin.op == Operator::And { "and" } else { "or" });
                    let left_targets = if bin.op == Operator::And {
                        targets.with_true(next.clone())
                    } else {
                        targets.with_false(next.clone())
                    };

                    let mut code = self.lower_condition(&bin.left, &left_targets)?;
                    let right = self.lower_condition(&bin.right, targets)?;
                    code.push(Instruction::label(next, right));
                    Ok(code)
                }
                OperatorClass::Arithmetic => self.test_value(expr, targets),
            },
            Expr::Number(_) | Expr::Str(_) | Expr::Ident(_) => self.test_value(expr, targets),
        }
    }

    /// Pops the right operand into scratch and compares the left one against it.
    fn compare(&mut self, op: Operator, targets: &BranchTargets) -> Vec<Instruction> {
        let scratch = self.new_temp("cmp");
        let mut code = vec![Instruction::Store(scratch.clone()), Instruction::Cmp(scratch)];
        code.extend(branch_on(op, targets));
        code
    }

    /// Any other value is true when it isn't zero.
    fn test_value(&mut self, expr: &Expr, targets: &BranchTargets) -> CompileResult<Vec<Instruction>> {
        let mut code = self.lower_value(expr)?;
        code.push(Instruction::Push(Value::Number(0.0)));
        code.extend(self.compare(Operator::NotEqual, targets));
        Ok(code)
    }
}

// ----------------------------------------------------------------------------
// Statements

impl AstVisitor for CodeGen {
    type Output = CompileResult<Vec<Instruction>>;

    fn assignment(&mut self, stmt: &Assignment) -> CompileResult<Vec<Instruction>> {
        if let Some(existing) = find_binding(&self.symbols, self.current, &stmt.variable) {
            if existing.kind() != SymbolKind::Variable {
                return Err(CompileError::RedeclaredSymbol {
                    name: stmt.variable.clone(),
                    existing: existing.kind(),
                });
            }
        }

        // Assignment updates the nearest visible variable, and only
        // declares a new one when there is none. The slot name is known
        // up front, but the binding waits until the value is lowered.
        let existing = self.variable_slot(&stmt.variable);
        let slot = existing
            .clone()
            .unwrap_or_else(|| mangle_variable(&self.symbols.path(self.current), &stmt.variable));
        let store = Instruction::Store(slot);

        let code = if is_branching(&stmt.value) {
            self.materialize(&stmt.value, vec![store])?
        } else {
            let mut code = self.lower_value(&stmt.value)?;
            code.push(store);
            code
        };

        if existing.is_none() {
            self.declare_variable(&stmt.variable);
        }

        Ok(code)
    }

    fn if_stmt(&mut self, stmt: &IfStatement) -> CompileResult<Vec<Instruction>> {
        let id = self.next_id();
        let body_label = self.new_label("if");
        let else_label = self.new_label("else");
        let end_label = self.new_label("end_if");

        let condition = match stmt.condition {
            Expr::Bool(_) => vec![],
            ref condition => self.lower_condition(condition, &BranchTargets::new(body_label.clone(), else_label.clone()))?,
        };

        let mut body = self.in_scope(format!("if_{}", id), |this| this.block(&stmt.body))?;
        let else_body = match &stmt.else_body {
            Some(stmts) => self.in_scope(format!("else_{}", id), |this| this.block(stmts))?,
            None => vec![],
        };

        // Constant conditions keep only the branch that can run.
        match stmt.condition {
            Expr::Bool(true) => return Ok(body),
            Expr::Bool(false) => return Ok(else_body),
            _ => {}
        }

        body.push(Instruction::Jump(end_label.clone()));

        let mut code = condition;
        code.push(Instruction::label(body_label, body));
        code.push(Instruction::label(else_label, else_body));
        code.push(Instruction::label(end_label, vec![]));
        Ok(code)
    }

    fn while_stmt(&mut self, stmt: &WhileStatement) -> CompileResult<Vec<Instruction>> {
        let id = self.next_id();
        let top_label = self.new_label("while");
        let body_label = self.new_label("while_body");
        let end_label = self.new_label("end_while");

        let condition = match stmt.condition {
            Expr::Bool(_) => vec![],
            ref condition => self.lower_condition(condition, &BranchTargets::new(body_label.clone(), end_label.clone()))?,
        };

        let mut body = self.in_scope(format!("while_{}", id), |this| this.block(&stmt.body))?;
        body.push(Instruction::Jump(top_label.clone()));

        match stmt.condition {
            // Body was still checked above.
            Expr::Bool(false) => Ok(vec![]),
            Expr::Bool(true) => Ok(vec![
                Instruction::label(top_label, body),
                Instruction::label(end_label, vec![]),
            ]),
            _ => Ok(vec![
                Instruction::label(top_label, condition),
                Instruction::label(body_label, body),
                Instruction::label(end_label, vec![]),
            ]),
        }
    }

    /// Registers the function and emits no code in the enclosing body.
    fn declare_function(&mut self, func: &DeclareFunction) -> CompileResult<Vec<Instruction>> {
        let name = function_key(&func.name);

        if self.functions.contains_key(&name) {
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

        self.symbols
            .insert(self.current, Symbol::function(name.clone(), func.params.clone()));
        // Reserve the name so nested declarations can't take it.
        self.functions.insert(
            name.clone(),
            Function {
                name: name.clone(),
                code: vec![],
            },
        );

        let code = self.in_scope(name.clone(), |this| {
            let slots: Vec<SmolStr> = func.params.iter().map(|param| this.declare_variable(param)).collect();

            // Arguments are pushed in order, so the last one is on top.
            let mut code: Vec<Instruction> = slots.into_iter().rev().map(Instruction::Store).collect();
            code.extend(this.block(&func.body)?);
            code.push(Instruction::Return);
            Ok(code)
        })?;

        debug!("generated function '{}' with {} instruction(s)", name, code.len());
        self.functions.insert(name.clone(), Function { name, code });

        Ok(vec![])
    }

    fn invoke_function(&mut self, invoke: &InvokeFunction) -> CompileResult<Vec<Instruction>> {
        let name = function_key(&invoke.name);
        // Aliases resolve to the symbol of their canonical name.
        let symbol = check_invocation(&self.symbols, self.current, &name, invoke.args.len())?;
        let callee = symbol.name().clone();
        let variadic = matches!(symbol, Symbol::Function { variadic: true, .. });

        let mut code = vec![];
        for arg in &invoke.args {
            code.extend(self.lower_value(arg)?);
        }
        if variadic {
            code.push(Instruction::Push(Value::Number(invoke.args.len() as f64)));
        }
        code.push(Instruction::Call(callee));

        Ok(code)
    }

    #[inline]
    fn expr(&mut self, expr: &Expr) -> CompileResult<Vec<Instruction>> {
        self.lower_value(expr)
    }
}
