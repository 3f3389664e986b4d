use smol_str::SmolStr;
use std::fmt;

/// Literal operand of `PUSH` and initial value of a data slot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Value {
    Number(f64),
    Str(SmolStr),
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

/// Booleans are numbers on the stack.
impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Number(if value { 1.0 } else { 0.0 })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", value),
            Value::Str(text) => write!(f, "'{}'", text),
        }
    }
}

/// Machine state flags toggled by `SET` and `UNSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Flag {
    /// Turtle draws while moving.
    Pen,
    Draw,
    Erase,
    Exception,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Flag::Pen => write!(f, "PEN"),
            Flag::Draw => write!(f, "DRAW"),
            Flag::Erase => write!(f, "ERASE"),
            Flag::Exception => write!(f, "EXCEPTION"),
        }
    }
}

/// Stack machine instruction.
///
/// Comparison works through a register of the last ordering: `CMP id` pops
/// the top of the stack and records how it orders against the variable.
/// The conditional jumps read that ordering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Instruction {
    /// `LOAD id`
    /// Push the value of a variable.
    Load(SmolStr),
    /// `PUSH value`
    Push(Value),
    /// `POP`
    /// Discard the top of the stack.
    Pop,
    /// `DUP`
    /// Duplicate the top of the stack.
    Dup,
    /// `STORE id`
    /// Pop the top of the stack into a variable.
    Store(SmolStr),
    /// `CMP id`
    /// Pop the top of the stack and record its ordering against a variable.
    Cmp(SmolStr),
    /// `JP label`
    Jump(SmolStr),
    /// `JZ label`
    /// Jump when the last comparison was equal.
    JumpZero(SmolStr),
    /// `JNZ label`
    /// Jump when the last comparison was not equal.
    JumpNotZero(SmolStr),
    /// `JMORE label`
    /// Jump when the last comparison was greater.
    JumpMore(SmolStr),
    /// `JLESS label`
    /// Jump when the last comparison was less.
    JumpLess(SmolStr),
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// `RAND`
    /// Push a random number.
    Rand,
    /// `NOT`
    /// Replace the top of the stack with its logical negation.
    Not,
    And,
    Or,
    /// `TRUNC`
    /// Truncate the top of the stack to an integer.
    Trunc,
    /// `READ`
    /// Push a value read from input.
    Read,
    /// `WRITE`
    /// Pop an argument count, then write that many values.
    Write,
    /// `MVTO`
    /// Pop a position and move the turtle there.
    MoveTo,
    /// `CALL function`
    Call(SmolStr),
    Set(Flag),
    Unset(Flag),
    /// `RET`
    Return,
    /// Jump target owning the instructions that follow it.
    Label { name: SmolStr, body: Vec<Instruction> },
}

impl Instruction {
    #[inline]
    pub fn label(name: impl Into<SmolStr>, body: Vec<Instruction>) -> Self {
        Instruction::Label {
            name: name.into(),
            body,
        }
    }
}

/// Expands nested label bodies in place, leaving each label as an
/// empty marker directly in front of its former body.
pub fn flatten(code: &[Instruction]) -> Vec<Instruction> {
    let mut flat = Vec::with_capacity(code.len());
    flatten_into(code, &mut flat);
    flat
}

fn flatten_into(code: &[Instruction], flat: &mut Vec<Instruction>) {
    for instruction in code {
        match instruction {
            Instruction::Label { name, body } => {
                flat.push(Instruction::label(name.clone(), vec![]));
                flatten_into(body, flat);
            }
            other => flat.push(other.clone()),
        }
    }
}

/// Outputs instruction as assembly.
impl fmt::Display for Instruction {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction as I;
        match self {
            I::Load(id)            => write!(f, "LOAD {}", id),
            I::Push(value)         => write!(f, "PUSH {}", value),
            I::Pop                 => write!(f, "POP"),
            I::Dup                 => write!(f, "DUP"),
            I::Store(id)           => write!(f, "STORE {}", id),
            I::Cmp(id)             => write!(f, "CMP {}", id),
            I::Jump(label)         => write!(f, "JP {}", label),
            I::JumpZero(label)     => write!(f, "JZ {}", label),
            I::JumpNotZero(label)  => write!(f, "JNZ {}", label),
            I::JumpMore(label)     => write!(f, "JMORE {}", label),
            I::JumpLess(label)     => write!(f, "JLESS {}", label),
            I::Add                 => write!(f, "ADD"),
            I::Sub                 => write!(f, "SUB"),
            I::Mul                 => write!(f, "MUL"),
            I::Div                 => write!(f, "DIV"),
            I::Pow                 => write!(f, "POW"),
            I::Rand                => write!(f, "RAND"),
            I::Not                 => write!(f, "NOT"),
            I::And                 => write!(f, "AND"),
            I::Or                  => write!(f, "OR"),
            I::Trunc               => write!(f, "TRUNC"),
            I::Read                => write!(f, "READ"),
            I::Write               => write!(f, "WRITE"),
            I::MoveTo              => write!(f, "MVTO"),
            I::Call(function)      => write!(f, "CALL {}", function),
            I::Set(flag)           => write!(f, "SET {}", flag),
            I::Unset(flag)         => write!(f, "UNSET {}", flag),
            I::Return              => write!(f, "RET"),
            I::Label { name, .. }  => write!(f, ":{}", name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flatten_nested_labels() {
        let code = vec![
            Instruction::Jump("a".into()),
            Instruction::label(
                "a",
                vec![
                    Instruction::Push(Value::from(1.0)),
                    Instruction::label("b", vec![Instruction::Return]),
                ],
            ),
            Instruction::label("c", vec![]),
        ];

        assert_eq!(
            flatten(&code),
            vec![
                Instruction::Jump("a".into()),
                Instruction::label("a", vec![]),
                Instruction::Push(Value::Number(1.0)),
                Instruction::label("b", vec![]),
                Instruction::Return,
                Instruction::label("c", vec![]),
            ]
        );
    }

    #[test]
    fn test_assembly_text() {
        assert_eq!(Instruction::Push(Value::from(true)).to_string(), "PUSH 1");
        assert_eq!(Instruction::Push(Value::Number(2.5)).to_string(), "PUSH 2.5");
        assert_eq!(Instruction::Push(Value::Str("hi".into())).to_string(), "PUSH 'hi'");
        assert_eq!(Instruction::Unset(Flag::Pen).to_string(), "UNSET PEN");
        assert_eq!(Instruction::MoveTo.to_string(), "MVTO");
        assert_eq!(Instruction::label("top", vec![Instruction::Pop]).to_string(), ":top");
    }
}
