use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParserError>;

/// Errors that can occur while setting up the parser.
///
/// Parsing itself never fails: any per-file problem is converted into a
/// degraded [`crate::ModuleRecord`] instead.
#[derive(Error, Debug)]
pub enum ParserError {
    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

impl ParserError {
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }
}
