pub mod compile;
pub mod conf;
pub mod error;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;

pub use conf::CompilerConf;
pub use error::{LogoError, LogoResult};

use compile::{Artifact, CodeGen, SemanticAnalyzer};
use parsing::{Parse, Program};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn parse_str(source: &str) -> LogoResult<Program> {
    // Lexical analysis
    let lexer = lex::Lexer::new(source);
    let mut stream = token_stream::TokenStream::new(lexer);

    // Syntactic analysis
    Ok(Program::parse(&mut stream)?)
}

#[inline]
pub fn compile_str(source: &str) -> LogoResult<Artifact> {
    compile_with(source, &CompilerConf::default())
}

pub fn compile_with(source: &str, conf: &CompilerConf) -> LogoResult<Artifact> {
    let program = parse_str(source)?;

    // Semantic analysis
    if conf.analyze {
        SemanticAnalyzer::new().analyze_entry(&program, &conf.entry)?;
    }

    // Code generation
    let artifact = CodeGen::new().generate_entry(&program, &conf.entry)?;

    Ok(artifact)
}
