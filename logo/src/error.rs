use crate::{compile::CompileError, parsing::ParseError};
use std::{error, fmt};

pub type LogoResult<T> = Result<T, LogoError>;

/// Failure of any compiler stage.
#[derive(Debug)]
pub enum LogoError {
    Parse(ParseError),
    Compile(CompileError),
}

impl error::Error for LogoError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LogoError::Parse(err) => Some(err),
            LogoError::Compile(err) => Some(err),
        }
    }
}

impl fmt::Display for LogoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogoError::Parse(err) => write!(f, "parse error: {}", err),
            LogoError::Compile(err) => write!(f, "compile error: {}", err),
        }
    }
}

impl From<ParseError> for LogoError {
    fn from(err: ParseError) -> Self {
        LogoError::Parse(err)
    }
}

impl From<CompileError> for LogoError {
    fn from(err: CompileError) -> Self {
        LogoError::Compile(err)
    }
}
