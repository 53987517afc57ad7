use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unbalanced braces or a malformed placeholder.
    Syntax,
    EmptyName,
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub at: usize, // char offset
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, at: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            at,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at char {}: {}", self.at, self.message)
    }
}

impl std::error::Error for ParseError {}
