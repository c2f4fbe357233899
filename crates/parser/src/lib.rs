//! # Codescope Parser
//!
//! Structural parsing of Python source files into a flat entity model.
//!
//! ## Pipeline
//!
//! ```text
//! Source text
//!     │
//!     ├──> Tree-sitter parse → syntax tree
//!     │
//!     ├──> Module walk
//!     │    ├─> docstring + import statements
//!     │    ├─> module-level functions (signature, decorators, snippet)
//!     │    └─> classes with their methods, declaration order preserved
//!     │
//!     └──> ModuleRecord (or a degraded record on any failure)
//! ```
//!
//! Parsing is syntax-level only: annotations, decorators, and base classes
//! are captured as literal text, never resolved. A file that cannot be read
//! or parsed degrades to a placeholder record instead of failing the batch.

mod error;
mod parser;
mod records;

pub use error::{ParserError, Result};
pub use parser::{SourceParser, MAX_FILE_SIZE_BYTES, SNIPPET_TRUNCATION_MARKER};
pub use records::{ClassRecord, FunctionRecord, ModuleRecord, Param, Visibility};
