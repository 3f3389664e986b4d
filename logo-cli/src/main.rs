//! Entrypoint for CLI
use std::{env, error::Error, fs};

use logo::{
    compile::SemanticAnalyzer,
    compile_with,
    lex::Lexer,
    parse_str,
    tokens::TokenKind,
    CompilerConf, IMPL_VERSION,
};
use log::{error, info};

static USAGE: &str = r#"
usage: logoc CMD FILE [--config CONF]

commands:
    tokens   Print the tokens of the target source file
    ast      Print the target source file as parsed
    check    Run semantic analysis on the target source file
    compile  Compile the target source file into an assembly listing

options:
    --config CONF   YAML compiler settings, with the fields `entry` and `analyze`

examples:
    logoc tokens square.logo
    logoc check square.logo
    logoc compile square.logo --config logoc.yaml
"#;

fn load_conf(filepath: Option<&str>) -> Result<CompilerConf, Box<dyn Error>> {
    match filepath {
        Some(filepath) => {
            info!("loading config '{filepath}'");
            let text = fs::read_to_string(filepath)?;
            Ok(serde_yaml::from_str(&text)?)
        }
        None => Ok(CompilerConf::default()),
    }
}

fn run_tokens(filepath: &str) -> Result<(), Box<dyn Error>> {
    let source_code = fs::read_to_string(filepath)?;
    let mut lexer = Lexer::new(source_code.as_str());

    println!("offset | line:col  | token              | fragment ");
    loop {
        let token = lexer.next_token()?;
        let offset = token.span.start;
        let line = token.span.line;
        let column = token.span.column;
        let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
        let fragment = &source_code[token.span.start..token.span.end];
        println!("{offset:6}   {line:4}:{column: <4} {kind: <20} \"{fragment}\"");

        if matches!(token.kind, TokenKind::EOS) {
            break;
        }
    }

    Ok(())
}

fn run_ast(filepath: &str) -> Result<(), Box<dyn Error>> {
    let source_code = fs::read_to_string(filepath)?;
    let program = parse_str(&source_code)?;
    print!("{program}");
    Ok(())
}

fn run_check(filepath: &str, conf: &CompilerConf) -> Result<(), Box<dyn Error>> {
    let source_code = fs::read_to_string(filepath)?;
    let program = parse_str(&source_code)?;
    SemanticAnalyzer::new().analyze_entry(&program, &conf.entry)?;
    info!("'{filepath}' is valid");
    Ok(())
}

fn run_compile(filepath: &str, conf: &CompilerConf) -> Result<(), Box<dyn Error>> {
    info!("compiling '{filepath}'");
    let source_code = fs::read_to_string(filepath)?;

    match compile_with(&source_code, conf) {
        Ok(artifact) => {
            print!("{artifact}");
            Ok(())
        }
        Err(err) => {
            error!("compilation failed\n{err}");
            Err(err.into())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let (cmd, conf_path) = match parse_args() {
        Some(args) => args,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };
    let conf = load_conf(conf_path.as_deref())?;

    match cmd {
        Cmd::Tokens { filepath } => run_tokens(&filepath)?,
        Cmd::Ast { filepath } => run_ast(&filepath)?,
        Cmd::Check { filepath } => run_check(&filepath, &conf)?,
        Cmd::Compile { filepath } => run_compile(&filepath, &conf)?,
    }

    Ok(())
}

fn parse_args() -> Option<(Cmd, Option<String>)> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;
    let filepath = args.next()?;

    let conf_path = match args.next().as_deref() {
        Some("--config") => Some(args.next()?),
        Some(_) => return None,
        None => None,
    };

    let cmd = match cmd.as_str() {
        "tokens" => Cmd::Tokens { filepath },
        "ast" => Cmd::Ast { filepath },
        "check" => Cmd::Check { filepath },
        "compile" => Cmd::Compile { filepath },
        _ => return None,
    };

    Some((cmd, conf_path))
}

fn print_usage() {
    println!("Logo compiler v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Dump tokens
    Tokens { filepath: String },
    /// Print parsed program
    Ast { filepath: String },
    /// Semantic analysis only
    Check { filepath: String },
    /// Generate assembly
    Compile { filepath: String },
}
