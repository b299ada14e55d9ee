//! Error types for the shell core.

use std::fmt;
use std::io;

/// Result type alias for shell-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while scanning an input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    /// A quoted string reached end of line without its closing quote.
    UnterminatedString,
    /// A `$(` subexpression reached end of line without its closing `)`.
    UnterminatedSubexpression,
}

/// Tokenizer failure, with the character offset where scanning stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenizeError {
    pub kind: TokenizeErrorKind,
    pub position: usize,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            TokenizeErrorKind::UnterminatedString => "unterminated quoted string",
            TokenizeErrorKind::UnterminatedSubexpression => "unterminated subexpression",
        };
        write!(f, "{what} at position {}", self.position)
    }
}

impl std::error::Error for TokenizeError {}

/// Parser failure: structurally invalid token stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at token {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Execution failure, reported through the sink per pipeline.
#[derive(Debug)]
pub enum ExecError {
    /// No cmdlet registered under the given name or alias.
    CommandNotFound(String),
    /// Missing mandatory parameter, unknown name, or conversion failure.
    ParameterBinding(String),
    /// A stage hook returned an error; channels were closed and the
    /// pipeline drained.
    PipelineStage { command: String, message: String },
    /// I/O failure opening or reading a redirection target.
    Io(io::Error),
    /// The host task runtime failed; aborts the remaining statements.
    TaskRuntime(io::Error),
}

impl ExecError {
    /// Fatal errors stop the statement loop; everything else only ends the
    /// current pipeline.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TaskRuntime(_))
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandNotFound(name) => write!(f, "command not found: {name}"),
            Self::ParameterBinding(msg) => write!(f, "parameter binding failed: {msg}"),
            Self::PipelineStage { command, message } => {
                write!(f, "{command}: {message}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::TaskRuntime(e) => write!(f, "task runtime failure: {e}"),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::TaskRuntime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ExecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Top-level error for one line of input.
#[derive(Debug)]
pub enum Error {
    Tokenize(TokenizeError),
    Parse(ParseError),
    Exec(ExecError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokenize(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::Exec(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tokenize(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Exec(e) => Some(e),
        }
    }
}

impl From<TokenizeError> for Error {
    fn from(e: TokenizeError) -> Self {
        Self::Tokenize(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<ExecError> for Error {
    fn from(e: ExecError) -> Self {
        Self::Exec(e)
    }
}
