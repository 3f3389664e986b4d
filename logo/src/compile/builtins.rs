//! Built-in turtle and IO primitives.
//!
//! The catalog is immutable static data. Each symbol table seeds its
//! global scope from it, and the code generator adds one stub function
//! per built-in to every artifact.
use super::{
    ir::{Flag, Instruction, Value},
    symbol::{ScopeId, Symbol, SymbolTable},
};
use smol_str::SmolStr;

/// Primitives implemented by the executor rather than by a stub.
pub mod primitive {
    pub const MOVE: &str = "MOVE";
    pub const CLEAR_SCREEN: &str = "CLRSCR";
}

/// Scratch slot shared by the stubs.
pub const STUB_VARIABLE: &str = "builtin_var_num";

pub const BUILTIN_VARIABLES: [&str; 5] = ["RANDOM", "HEADING", "XCOR", "YCOR", "TYPEIN"];

pub struct BuiltinFunction {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub params: &'static [&'static str],
    pub variadic: bool,
    /// Body of the generated `DEF`.
    pub stub: fn() -> Vec<Instruction>,
}

impl BuiltinFunction {
    pub fn symbol(&self) -> Symbol {
        Symbol::Function {
            name: SmolStr::new(self.name),
            params: self.params.iter().map(SmolStr::new).collect(),
            variadic: self.variadic,
        }
    }
}

#[rustfmt::skip]
pub static BUILTIN_FUNCTIONS: &[BuiltinFunction] = &[
    BuiltinFunction { name: "FORWARD",     aliases: &["FO"], params: &["num"],      variadic: false, stub: forward },
    BuiltinFunction { name: "BACKWARD",    aliases: &["BK"], params: &["num"],      variadic: false, stub: backward },
    BuiltinFunction { name: "RIGHT",       aliases: &["RT"], params: &["angle"],    variadic: false, stub: right },
    BuiltinFunction { name: "LEFT",        aliases: &["LT"], params: &["angle"],    variadic: false, stub: left },
    BuiltinFunction { name: "PENUP",       aliases: &["PU"], params: &[],           variadic: false, stub: pen_up },
    BuiltinFunction { name: "PENDOWN",     aliases: &["PD"], params: &[],           variadic: false, stub: pen_down },
    BuiltinFunction { name: "HOME",        aliases: &[],     params: &[],           variadic: false, stub: home },
    BuiltinFunction { name: "SETXY",       aliases: &[],     params: &["x", "y"],   variadic: false, stub: set_xy },
    BuiltinFunction { name: "WIPECLEAN",   aliases: &["WC"], params: &[],           variadic: false, stub: wipe_clean },
    BuiltinFunction { name: "CLEARSCREEN", aliases: &["CS"], params: &[],           variadic: false, stub: clear_screen },
    BuiltinFunction { name: "PRINT",       aliases: &[],     params: &["data"],     variadic: false, stub: print },
    BuiltinFunction { name: "WRITE",       aliases: &[],     params: &[],           variadic: true,  stub: write },
];

/// Binds the built-in catalog into a scope.
pub fn seed(table: &mut SymbolTable, scope: ScopeId) {
    for name in BUILTIN_VARIABLES {
        table.insert(scope, Symbol::variable(name));
    }

    for function in BUILTIN_FUNCTIONS {
        table.insert(scope, function.symbol());
        for alias in function.aliases {
            table.insert_as(scope, *alias, function.symbol());
        }
    }
}

/// Built-in variables backed by a device instead of a data slot.
pub fn device_read(name: &str) -> Option<Instruction> {
    match name {
        "RANDOM" => Some(Instruction::Rand),
        "TYPEIN" => Some(Instruction::Read),
        _ => None,
    }
}

// ----------------------------------------------------------------------------
// Stubs

/// Turn by a fixed heading offset, then move by the argument.
fn move_stub(heading: f64) -> Vec<Instruction> {
    vec![
        Instruction::Store(STUB_VARIABLE.into()),
        Instruction::Push(Value::Number(heading)),
        Instruction::Load(STUB_VARIABLE.into()),
        Instruction::Call(primitive::MOVE.into()),
        Instruction::Return,
    ]
}

fn forward() -> Vec<Instruction> {
    move_stub(0.0)
}

fn backward() -> Vec<Instruction> {
    move_stub(180.0)
}

fn right() -> Vec<Instruction> {
    move_stub(90.0)
}

fn left() -> Vec<Instruction> {
    move_stub(270.0)
}

fn pen_up() -> Vec<Instruction> {
    vec![Instruction::Unset(Flag::Pen), Instruction::Return]
}

fn pen_down() -> Vec<Instruction> {
    vec![Instruction::Set(Flag::Pen), Instruction::Return]
}

fn home() -> Vec<Instruction> {
    vec![
        Instruction::Push(Value::Number(0.0)),
        Instruction::Push(Value::Number(0.0)),
        Instruction::MoveTo,
        Instruction::Return,
    ]
}

/// Coordinates are already on the stack.
fn set_xy() -> Vec<Instruction> {
    vec![Instruction::MoveTo, Instruction::Return]
}

fn wipe_clean() -> Vec<Instruction> {
    vec![Instruction::Call(primitive::CLEAR_SCREEN.into()), Instruction::Return]
}

fn clear_screen() -> Vec<Instruction> {
    vec![
        Instruction::Call("WIPECLEAN".into()),
        Instruction::Call("HOME".into()),
        Instruction::Return,
    ]
}

/// Single value output through the variadic writer.
fn print() -> Vec<Instruction> {
    vec![
        Instruction::Push(Value::Number(1.0)),
        Instruction::Write,
        Instruction::Return,
    ]
}

/// Caller pushes the arguments followed by their count.
fn write() -> Vec<Instruction> {
    vec![Instruction::Write, Instruction::Return]
}
