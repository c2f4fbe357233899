//! # Codescope Extractor
//!
//! Priority-ordered selection and truncation of parsed source entities
//! under simultaneous size constraints.
//!
//! ## Pipeline
//!
//! ```text
//! Root paths
//!     │
//!     ├──> Scanner (discovery + optional tree summary)
//!     │
//!     ├──> Parser (one ModuleRecord per file, degraded on failure)
//!     │
//!     └──> Assembler (holds the BudgetLedger)
//!          ├─> public-before-private tiering
//!          ├─> per-module count caps, snippet line caps
//!          ├─> global character budget, charged per item
//!          └─> AggregateContext + truncation annotations
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codescope_extractor::{extract, BudgetConfig, ExtractOptions};
//! use codescope_scanner::{Domain, OsFileSystem};
//!
//! let options = ExtractOptions {
//!     targets: vec!["src".into()],
//!     domain: Domain::Tests,
//!     excludes: vec![".git/**".into()],
//!     match_root: ".".into(),
//!     budget: BudgetConfig::default(),
//! };
//! let context = extract(&OsFileSystem, &options).unwrap();
//! println!(
//!     "{} modules, {} functions",
//!     context.stats.modules, context.stats.functions
//! );
//! ```

mod assembler;
mod budget;
mod context;
mod error;
mod pipeline;

pub use assembler::Assembler;
pub use budget::{BudgetConfig, BudgetLedger, Dimension, DEGRADED_RECORD_CHARGE};
pub use context::{AggregateContext, ModuleStats, RunStats, TruncationReason};
pub use error::{ExtractError, Result};
pub use pipeline::{extract, ExtractOptions, MAX_COMPANIONS_LISTED};
