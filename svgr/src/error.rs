use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SvgError {
    #[error("IO:{msg}")]
    Io { source: io::Error, msg: String },

    #[error("Tokenizer error at offset {offset}: {msg}")]
    Token { offset: usize, msg: String },

    #[error("Command '{command}' at offset {offset} expected {expected}")]
    UnexpectedEndOfCommand {
        command: char,
        offset: usize,
        expected: &'static str,
    },

    #[error("Unsupported path command '{command}' at offset {offset}")]
    UnsupportedCommand { command: char, offset: usize },

    #[error("Malformed transform `{0}`")]
    MalformedTransform(String),

    #[error("Malformed attribute {attribute}=`{value}`")]
    MalformedAttribute { attribute: String, value: String },

    #[error("Invalid document structure: {0}")]
    StructuralDocument(String),
}

pub type Result<T> = std::result::Result<T, SvgError>;

/// A recoverable problem found while tracing. The element it belongs to is
/// identified by its `id` attribute when it has one.
#[derive(Debug)]
pub struct Diagnostic {
    pub element: Option<String>,
    pub error: SvgError,
}

impl Diagnostic {
    pub fn new(element: Option<String>, error: SvgError) -> Self {
        Diagnostic { element, error }
    }
}
