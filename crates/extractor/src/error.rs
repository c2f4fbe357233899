use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The discoverer produced zero candidate files. This is the only
    /// run-level failure; budget exhaustion yields a partial result
    /// instead.
    #[error("no matching files were discovered")]
    NoFiles,

    #[error("parser error: {0}")]
    Parser(#[from] codescope_parser::ParserError),
}
