//! # Codescope Scanner
//!
//! File discovery for structural context extraction.
//!
//! ## Pipeline
//!
//! ```text
//! Root paths
//!     │
//!     ├──> Pattern Matcher (gitignore-style excludes)
//!     │      └─> pruned subtrees
//!     │
//!     ├──> File Discoverer (domain-aware extension filter)
//!     │      └─> source files + companion files
//!     │
//!     └──> Tree Summary (design domain only)
//!            └─> bounded directory outline
//! ```
//!
//! All traversal goes through the [`FileSystem`] capability trait, so the
//! discovery and summary logic can run against a real directory tree or a
//! fully synthetic in-memory one in tests.

mod fs;
mod pattern;
mod scanner;
mod tree;

pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use pattern::PatternSet;
pub use scanner::{Discovery, Domain, Scanner};
pub use tree::{summarize_tree, TreeSummary};
