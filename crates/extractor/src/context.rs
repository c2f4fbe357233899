use codescope_parser::ModuleRecord;
use codescope_scanner::TreeSummary;
use serde::{Deserialize, Serialize};

/// Why content was omitted or shortened for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// A per-module function/class count cap was reached.
    CountCap,
    /// The global character budget ran out.
    BudgetExhausted,
}

/// Per-module selection accounting. Omitted counts are the structured form
/// of the `+N more` marker; nothing is dropped without being counted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub path: String,
    pub degraded: bool,
    pub functions_included: usize,
    pub functions_omitted: usize,
    pub classes_included: usize,
    pub classes_omitted: usize,
    pub methods_omitted: usize,
    pub truncated: bool,
    pub reason: Option<TruncationReason>,
}

impl ModuleStats {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            degraded: false,
            functions_included: 0,
            functions_omitted: 0,
            classes_included: 0,
            classes_omitted: 0,
            methods_omitted: 0,
            truncated: false,
            reason: None,
        }
    }

    /// Rendered truncation marker, e.g. `+3 more`, when anything was
    /// omitted from this module.
    pub fn marker(&self) -> Option<String> {
        let omitted = self.functions_omitted + self.classes_omitted + self.methods_omitted;
        (omitted > 0).then(|| format!("+{omitted} more"))
    }
}

/// Run-level statistics for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Modules present in the output, degraded records included.
    pub modules: usize,
    /// Modules dropped by the module count cap or budget exhaustion.
    pub modules_omitted: usize,
    pub degraded_modules: usize,
    /// Module-level functions included across all modules.
    pub functions: usize,
    pub classes: usize,
    pub chars_used: usize,
    /// Set the moment a charge against the global budget fails.
    pub budget_exhausted: bool,
    pub per_module: Vec<ModuleStats>,
}

/// Final output of one extraction run. Owned entirely by the caller; the
/// engine keeps no reference once this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateContext {
    pub modules: Vec<ModuleRecord>,
    pub tree: Option<TreeSummary>,
    /// Admitted-but-unparsed files (prose, unrecognized extensions),
    /// bounded by [`crate::MAX_COMPANIONS_LISTED`].
    pub companions: Vec<String>,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn marker_counts_all_omitted_kinds() {
        let mut stats = ModuleStats::new("m.py");
        assert_eq!(stats.marker(), None);

        stats.functions_omitted = 2;
        stats.methods_omitted = 1;
        assert_eq!(stats.marker().as_deref(), Some("+3 more"));
    }
}
