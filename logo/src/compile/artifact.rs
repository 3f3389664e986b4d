use super::ir::{flatten, Instruction, Value};
use smol_str::SmolStr;
use std::{collections::BTreeMap, fmt};

/// Generated body of one `DEF` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Function {
    pub name: SmolStr,
    pub code: Vec<Instruction>,
}

impl Function {
    /// Code with label bodies expanded in place.
    #[inline]
    pub fn flattened(&self) -> Vec<Instruction> {
        flatten(&self.code)
    }
}

/// Output of a successful code generation run.
///
/// Maps are ordered by name, so the listing is stable between runs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Artifact {
    pub entry: SmolStr,
    pub functions: BTreeMap<SmolStr, Function>,
    pub variables: BTreeMap<SmolStr, Value>,
}

impl Artifact {
    #[inline]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    #[inline]
    pub fn entry_function(&self) -> Option<&Function> {
        self.functions.get(&self.entry)
    }
}

/// Assembly listing.
impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, ".START {}", self.entry)?;
        writeln!(f)?;

        writeln!(f, ".DATA")?;
        for (name, value) in &self.variables {
            writeln!(f, "  {} {}", name, value)?;
        }
        writeln!(f)?;

        writeln!(f, ".CODE")?;
        for function in self.functions.values() {
            writeln!(f)?;
            writeln!(f, "DEF {}:", function.name)?;
            for instruction in function.flattened() {
                match instruction {
                    Instruction::Label { .. } => {
                        writeln!(f)?;
                        writeln!(f, "{}", instruction)?;
                    }
                    _ => writeln!(f, "  {}", instruction)?,
                }
            }
        }

        Ok(())
    }
}
