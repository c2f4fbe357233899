use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CHARS: usize = 12_000;
pub const DEFAULT_MAX_FUNCS_PER_MODULE: usize = 8;
pub const DEFAULT_MAX_CLASSES_PER_MODULE: usize = 8;
pub const DEFAULT_MAX_MODULES: usize = 50;
pub const DEFAULT_SNIPPET_MAX_LINES: usize = 120;
pub const DEFAULT_DOCSTRING_MAX_CHARS: usize = 1_200;
pub const DEFAULT_MAX_TREE_DEPTH: usize = 4;
pub const DEFAULT_MAX_TREE_ENTRIES: usize = 500;

/// Fixed cost of keeping a degraded record in the output. Charged
/// partially when the remaining budget is smaller, so evidence of a failed
/// file is never dropped.
pub const DEGRADED_RECORD_CHARGE: usize = 64;

/// All size and count caps for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Global character budget across the whole run.
    pub max_chars: usize,
    pub max_funcs_per_module: usize,
    pub max_classes_per_module: usize,
    pub max_modules: usize,
    pub snippet_max_lines: usize,
    pub docstring_max_chars: usize,
    pub max_tree_depth: usize,
    pub max_tree_entries: usize,
    /// Include the private tier at all. When false, private entities are
    /// excluded up front rather than truncated later.
    pub include_private: bool,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            max_funcs_per_module: DEFAULT_MAX_FUNCS_PER_MODULE,
            max_classes_per_module: DEFAULT_MAX_CLASSES_PER_MODULE,
            max_modules: DEFAULT_MAX_MODULES,
            snippet_max_lines: DEFAULT_SNIPPET_MAX_LINES,
            docstring_max_chars: DEFAULT_DOCSTRING_MAX_CHARS,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            max_tree_entries: DEFAULT_MAX_TREE_ENTRIES,
            include_private: false,
        }
    }
}

/// Named allowance dimensions exposed by [`BudgetLedger::remaining`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Chars,
    FunctionsPerModule,
    ClassesPerModule,
    Modules,
    SnippetLines,
    TreeDepth,
    TreeEntries,
}

/// Run-scoped budget counters.
///
/// Created at the start of one extraction call, consulted and decremented
/// by a single assembler pass, discarded at the end. Charging is strictly
/// decreasing; there is no rollback, so callers charge only after an item
/// has been provisionally selected.
#[derive(Debug)]
pub struct BudgetLedger {
    config: BudgetConfig,
    remaining_chars: usize,
}

impl BudgetLedger {
    pub fn new(config: BudgetConfig) -> Self {
        Self {
            remaining_chars: config.max_chars,
            config,
        }
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// Attempt to consume `amount` characters. Returns whether the charge
    /// succeeded; on failure nothing is consumed.
    #[must_use]
    pub fn charge(&mut self, amount: usize) -> bool {
        if amount > self.remaining_chars {
            return false;
        }
        self.remaining_chars -= amount;
        true
    }

    /// Consume up to `amount`, returning what was actually charged. Used
    /// for the fixed degraded-record cost, which is kept even when the
    /// budget cannot cover it in full.
    pub fn charge_partial(&mut self, amount: usize) -> usize {
        let charged = amount.min(self.remaining_chars);
        self.remaining_chars -= charged;
        charged
    }

    /// Read-only view of the remaining allowance for a dimension. The
    /// per-module and per-item dimensions are static caps; only the
    /// character dimension decreases during a run.
    pub fn remaining(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Chars => self.remaining_chars,
            Dimension::FunctionsPerModule => self.config.max_funcs_per_module,
            Dimension::ClassesPerModule => self.config.max_classes_per_module,
            Dimension::Modules => self.config.max_modules,
            Dimension::SnippetLines => self.config.snippet_max_lines,
            Dimension::TreeDepth => self.config.max_tree_depth,
            Dimension::TreeEntries => self.config.max_tree_entries,
        }
    }

    pub fn chars_used(&self) -> usize {
        self.config.max_chars - self.remaining_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn charge_succeeds_within_budget_and_fails_past_it() {
        let mut ledger = BudgetLedger::new(BudgetConfig {
            max_chars: 100,
            ..Default::default()
        });

        assert!(ledger.charge(60));
        assert_eq!(ledger.remaining(Dimension::Chars), 40);
        assert!(!ledger.charge(41));
        // failed charge consumes nothing
        assert_eq!(ledger.remaining(Dimension::Chars), 40);
        assert!(ledger.charge(40));
        assert_eq!(ledger.chars_used(), 100);
    }

    #[test]
    fn partial_charge_caps_at_remaining() {
        let mut ledger = BudgetLedger::new(BudgetConfig {
            max_chars: 10,
            ..Default::default()
        });

        assert_eq!(ledger.charge_partial(64), 10);
        assert_eq!(ledger.charge_partial(64), 0);
        assert_eq!(ledger.remaining(Dimension::Chars), 0);
    }

    #[test]
    fn static_dimensions_report_configured_caps() {
        let ledger = BudgetLedger::new(BudgetConfig::default());
        assert_eq!(
            ledger.remaining(Dimension::FunctionsPerModule),
            DEFAULT_MAX_FUNCS_PER_MODULE
        );
        assert_eq!(
            ledger.remaining(Dimension::SnippetLines),
            DEFAULT_SNIPPET_MAX_LINES
        );
        assert_eq!(
            ledger.remaining(Dimension::TreeEntries),
            DEFAULT_MAX_TREE_ENTRIES
        );
    }
}
