use crate::parsing::Program;
use smol_str::SmolStr;

/// Compiler settings.
///
/// With the `serde` feature every field is optional in a
/// config document and falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct CompilerConf {
    /// Name of the function wrapping the top level statements.
    pub entry: SmolStr,
    /// Run the semantic analyzer before code generation.
    pub analyze: bool,
}

impl Default for CompilerConf {
    fn default() -> Self {
        CompilerConf {
            entry: SmolStr::new(Program::ENTRY),
            analyze: true,
        }
    }
}
