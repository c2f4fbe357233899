use crate::assembler::Assembler;
use crate::budget::{BudgetConfig, BudgetLedger};
use crate::context::AggregateContext;
use crate::error::{ExtractError, Result};
use codescope_parser::{ModuleRecord, SourceParser};
use codescope_scanner::{summarize_tree, Domain, FileSystem, Scanner};
use std::path::PathBuf;

/// Cap on how many companion file paths are listed in the output; the rest
/// are still reflected in the discovery counts.
pub const MAX_COMPANIONS_LISTED: usize = 100;

/// Inputs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Root files or directories to scan.
    pub targets: Vec<PathBuf>,
    pub domain: Domain,
    /// Gitignore-style exclusion patterns, evaluated relative to
    /// `match_root`.
    pub excludes: Vec<String>,
    pub match_root: PathBuf,
    pub budget: BudgetConfig,
}

/// Run the full pipeline: discover, parse in discovery order, assemble
/// under a fresh run-scoped ledger.
///
/// The engine holds no state across calls; the returned context is owned
/// by the caller. The only failure is the explicit empty-result condition.
pub fn extract<F: FileSystem>(fs: &F, options: &ExtractOptions) -> Result<AggregateContext> {
    let scanner = Scanner::new(fs, &options.excludes, options.match_root.clone());
    let discovery = scanner.discover(&options.targets, options.domain);
    if discovery.is_empty() {
        return Err(ExtractError::NoFiles);
    }

    let tree = (options.domain == Domain::Design).then(|| {
        summarize_tree(
            fs,
            &options.targets,
            scanner.patterns(),
            scanner.match_root(),
            options.budget.max_tree_depth,
            options.budget.max_tree_entries,
        )
    });

    let mut parser = SourceParser::new(
        options.budget.snippet_max_lines,
        options.budget.docstring_max_chars,
    )?;
    let parsed: Vec<ModuleRecord> = discovery
        .files
        .iter()
        .map(|path| parser.parse_file(fs, path))
        .collect();

    let companions: Vec<String> = discovery
        .companions
        .iter()
        .take(MAX_COMPANIONS_LISTED)
        .map(|path| path.display().to_string())
        .collect();

    let ledger = BudgetLedger::new(options.budget.clone());
    Ok(Assembler::new(ledger).assemble(&parsed, tree, companions))
}
