//! Compiler Errors

use thiserror::Error;

use crate::parse_util::ParseError;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("Parse Error: {0}")]
    Parse(#[from] ParseError),

    #[error("Transform Error: {message}")]
    Transform { message: String },

    #[error("Unknown module `{path}`")]
    UnknownModule { path: String },

    #[error("Evaluation Error: {message}")]
    Evaluation { message: String },

    #[error("Config Error: {message}")]
    Config { message: String },
}

impl CompilerError {
    pub fn transform(message: impl Into<String>) -> Self {
        CompilerError::Transform {
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        CompilerError::Evaluation {
            message: message.into(),
        }
    }

    pub fn unknown_module(path: impl Into<String>) -> Self {
        CompilerError::UnknownModule { path: path.into() }
    }
}

impl From<serde_json::Error> for CompilerError {
    fn from(error: serde_json::Error) -> Self {
        CompilerError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
