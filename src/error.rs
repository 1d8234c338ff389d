//! Error types for the schedule to kernel generator

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for generation operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Generation errors
///
/// Every variant is fatal for the kernel job that raised it.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Lexer error at column {column}: unexpected `{fragment}`")]
    LexerError { column: usize, fragment: String },

    #[error("Grammar error on line {line}: {message}\n    {text}")]
    GrammarError {
        line: usize,
        text: String,
        message: String,
    },

    /// A whole-schedule problem with no single offending line
    #[error("Program error: {message}")]
    ProgramError { message: String },

    #[error("Constant format error on line {line}: {message}\n    {text}")]
    ConstantFormatError {
        line: usize,
        text: String,
        message: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Generated source is not valid Rust: {message}")]
    FormatError { message: String },

    #[error("Invalid job configuration {}: {source}", path.display())]
    ConfigError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Evaluation error: {message}")]
    EvalError { message: String },

    #[error("{}: {source}", path.display())]
    JobError {
        path: PathBuf,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn grammar(line: usize, text: impl Into<String>, msg: impl Into<String>) -> Self {
        CompileError::GrammarError {
            line,
            text: text.into(),
            message: msg.into(),
        }
    }

    pub fn program(msg: impl Into<String>) -> Self {
        CompileError::ProgramError { message: msg.into() }
    }

    pub fn constant(line: usize, text: impl Into<String>, msg: impl Into<String>) -> Self {
        CompileError::ConstantFormatError {
            line,
            text: text.into(),
            message: msg.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        CompileError::FormatError { message: msg.into() }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        CompileError::EvalError { message: msg.into() }
    }

    /// Attach the input file that produced this error.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            // I/O errors already name their path
            CompileError::IoError { .. } | CompileError::JobError { .. } => self,
            other => CompileError::JobError {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}
