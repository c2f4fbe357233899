use crate::budget::{BudgetConfig, BudgetLedger, DEGRADED_RECORD_CHARGE};
use crate::context::{AggregateContext, ModuleStats, RunStats, TruncationReason};
use codescope_parser::{ClassRecord, FunctionRecord, ModuleRecord, SNIPPET_TRUNCATION_MARKER};
use codescope_scanner::TreeSummary;

/// Merges parsed modules into the final aggregate under the budget ledger.
///
/// Selection is deterministic: modules are processed in discovery order,
/// entities public-before-private with declaration order preserved inside
/// each tier. Reordering happens on detached copies; the parser's records
/// are never mutated. A failed charge against the global character budget
/// stops selection for the entire run.
pub struct Assembler {
    ledger: BudgetLedger,
}

impl Assembler {
    pub fn new(ledger: BudgetLedger) -> Self {
        Self { ledger }
    }

    pub fn assemble(
        mut self,
        parsed: &[ModuleRecord],
        tree: Option<TreeSummary>,
        companions: Vec<String>,
    ) -> AggregateContext {
        let cfg = self.ledger.config().clone();
        let mut modules = Vec::new();
        let mut run = RunStats::default();
        let mut exhausted = false;

        for (index, module) in parsed.iter().enumerate() {
            if index >= cfg.max_modules {
                run.modules_omitted += 1;
                continue;
            }
            let mut stats = ModuleStats::new(&module.path);

            // Degraded records are always kept so the reader knows the
            // file existed and failed; their fixed cost is charged only as
            // far as the budget allows.
            if module.is_degraded() {
                self.ledger.charge_partial(DEGRADED_RECORD_CHARGE);
                stats.degraded = true;
                run.degraded_modules += 1;
                modules.push(module.clone());
                run.per_module.push(stats);
                continue;
            }

            let visible_functions = tier(&module.functions, cfg.include_private, |f| {
                f.visibility.is_public()
            });
            let visible_classes = tier(&module.classes, cfg.include_private, |c| {
                c.visibility.is_public()
            });

            if exhausted || !self.ledger.charge(shell_cost(module)) {
                if !exhausted {
                    exhausted = true;
                    run.budget_exhausted = true;
                }
                stats.functions_omitted = visible_functions.len();
                stats.classes_omitted = visible_classes.len();
                stats.truncated = true;
                stats.reason = Some(TruncationReason::BudgetExhausted);
                run.modules_omitted += 1;
                run.per_module.push(stats);
                continue;
            }

            let mut selected = ModuleRecord::new(module.path.clone());
            selected.docstring = module.docstring.clone();
            selected.imports = module.imports.clone();

            for (position, function) in visible_functions.iter().enumerate() {
                if selected.functions.len() == cfg.max_funcs_per_module {
                    stats.functions_omitted = visible_functions.len() - position;
                    stats.reason = Some(TruncationReason::CountCap);
                    break;
                }
                let mut copy = (*function).clone();
                // Shorten before costing: the charge reflects the
                // truncated form, not the original.
                cap_snippet(&mut copy, cfg.snippet_max_lines);
                if !self.ledger.charge(function_cost(&copy)) {
                    exhausted = true;
                    run.budget_exhausted = true;
                    stats.functions_omitted = visible_functions.len() - position;
                    stats.reason = Some(TruncationReason::BudgetExhausted);
                    break;
                }
                selected.functions.push(copy);
            }

            if exhausted {
                stats.classes_omitted = visible_classes.len();
            } else {
                for (position, class) in visible_classes.iter().enumerate() {
                    if selected.classes.len() == cfg.max_classes_per_module {
                        stats.classes_omitted = visible_classes.len() - position;
                        if stats.reason.is_none() {
                            stats.reason = Some(TruncationReason::CountCap);
                        }
                        break;
                    }
                    let (copy, omitted_methods) = select_class(class, &cfg);
                    if !self.ledger.charge(class_cost(&copy)) {
                        exhausted = true;
                        run.budget_exhausted = true;
                        stats.classes_omitted = visible_classes.len() - position;
                        stats.reason = Some(TruncationReason::BudgetExhausted);
                        break;
                    }
                    stats.methods_omitted += omitted_methods;
                    if omitted_methods > 0 && stats.reason.is_none() {
                        stats.reason = Some(TruncationReason::CountCap);
                    }
                    selected.classes.push(copy);
                }
            }

            stats.functions_included = selected.functions.len();
            stats.classes_included = selected.classes.len();
            stats.truncated = stats.functions_omitted + stats.classes_omitted
                + stats.methods_omitted
                > 0;
            run.functions += stats.functions_included;
            run.classes += stats.classes_included;
            modules.push(selected);
            run.per_module.push(stats);
        }

        run.modules = modules.len();
        run.chars_used = self.ledger.chars_used();
        log::info!(
            "assembled {} modules ({} functions, {} classes, {} chars)",
            run.modules,
            run.functions,
            run.classes,
            run.chars_used
        );
        AggregateContext {
            modules,
            tree,
            companions,
            stats: run,
        }
    }
}

/// Public tier first, private tier second (or excluded entirely),
/// declaration order preserved inside each tier.
fn tier<T>(items: &[T], include_private: bool, is_public: impl Fn(&T) -> bool) -> Vec<&T> {
    let mut tiers: Vec<&T> = items.iter().filter(|item| is_public(item)).collect();
    if include_private {
        tiers.extend(items.iter().filter(|item| !is_public(item)));
    }
    tiers
}

fn select_class(class: &ClassRecord, cfg: &BudgetConfig) -> (ClassRecord, usize) {
    let visible = tier(&class.methods, cfg.include_private, |m| {
        m.visibility.is_public()
    });
    let mut copy = ClassRecord {
        name: class.name.clone(),
        bases: class.bases.clone(),
        visibility: class.visibility,
        docstring: class.docstring.clone(),
        methods: Vec::new(),
        start_line: class.start_line,
        end_line: class.end_line,
    };
    let mut omitted = 0;
    for (position, method) in visible.iter().enumerate() {
        if copy.methods.len() == cfg.max_funcs_per_module {
            omitted = visible.len() - position;
            break;
        }
        let mut method = (*method).clone();
        cap_snippet(&mut method, cfg.snippet_max_lines);
        copy.methods.push(method);
    }
    (copy, omitted)
}

/// Shorten a snippet to the line cap, in place, with an explicit marker.
/// Never lengthens.
fn cap_snippet(function: &mut FunctionRecord, max_lines: usize) {
    if function.snippet.lines().count() <= max_lines {
        return;
    }
    let mut kept: Vec<&str> = function.snippet.lines().take(max_lines).collect();
    kept.push(SNIPPET_TRUNCATION_MARKER);
    let shortened = kept.join("\n");
    function.snippet = shortened;
    function.snippet_truncated = true;
}

/// Rendered character cost of a function: signature + docstring + snippet.
fn function_cost(function: &FunctionRecord) -> usize {
    function.signature().len()
        + function.docstring.as_deref().map_or(0, str::len)
        + function.snippet.len()
}

fn class_cost(class: &ClassRecord) -> usize {
    class.name.len()
        + class.bases.iter().map(String::len).sum::<usize>()
        + class.docstring.as_deref().map_or(0, str::len)
        + class.methods.iter().map(function_cost).sum::<usize>()
}

fn shell_cost(module: &ModuleRecord) -> usize {
    module.path.len()
        + module.docstring.as_deref().map_or(0, str::len)
        + module.imports.iter().map(String::len).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_parser::Visibility;
    use pretty_assertions::assert_eq;

    fn function(name: &str, snippet: &str) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            params: Vec::new(),
            returns: None,
            decorators: Vec::new(),
            visibility: Visibility::of(name),
            docstring: None,
            snippet: snippet.to_string(),
            snippet_truncated: false,
            start_line: 1,
            end_line: 1,
            module_path: "m.py".to_string(),
        }
    }

    fn class(name: &str, methods: Vec<FunctionRecord>) -> ClassRecord {
        ClassRecord {
            name: name.to_string(),
            bases: Vec::new(),
            visibility: Visibility::of(name),
            docstring: None,
            methods,
            start_line: 1,
            end_line: 1,
        }
    }

    fn module(path: &str, functions: Vec<FunctionRecord>, classes: Vec<ClassRecord>) -> ModuleRecord {
        let mut record = ModuleRecord::new(path);
        record.functions = functions;
        record.classes = classes;
        record
    }

    fn assemble_with(cfg: BudgetConfig, parsed: &[ModuleRecord]) -> AggregateContext {
        Assembler::new(BudgetLedger::new(cfg)).assemble(parsed, None, Vec::new())
    }

    fn roomy(cfg: BudgetConfig) -> BudgetConfig {
        BudgetConfig {
            max_chars: 1_000_000,
            ..cfg
        }
    }

    #[test]
    fn count_cap_with_private_tier_disabled() {
        // 3 public + 2 private, cap 2, private excluded: exactly 2 public
        // functions and a "+1 more" marker that counts only public ones.
        let parsed = vec![module(
            "m.py",
            vec![
                function("f1", "def f1(): pass"),
                function("_p1", "def _p1(): pass"),
                function("f2", "def f2(): pass"),
                function("_p2", "def _p2(): pass"),
                function("f3", "def f3(): pass"),
            ],
            Vec::new(),
        )];
        let cfg = roomy(BudgetConfig {
            max_funcs_per_module: 2,
            include_private: false,
            ..Default::default()
        });

        let context = assemble_with(cfg, &parsed);
        let names: Vec<&str> = context.modules[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["f1", "f2"]);
        let stats = &context.stats.per_module[0];
        assert_eq!(stats.functions_omitted, 1);
        assert_eq!(stats.marker().as_deref(), Some("+1 more"));
        assert_eq!(stats.reason, Some(TruncationReason::CountCap));
    }

    #[test]
    fn private_tier_follows_public_in_declaration_order() {
        let parsed = vec![module(
            "m.py",
            vec![
                function("_a", "x"),
                function("b", "x"),
                function("_c", "x"),
                function("d", "x"),
            ],
            Vec::new(),
        )];
        let cfg = roomy(BudgetConfig {
            include_private: true,
            ..Default::default()
        });

        let context = assemble_with(cfg, &parsed);
        let names: Vec<&str> = context.modules[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "d", "_a", "_c"]);
        assert!(!context.stats.per_module[0].truncated);
    }

    #[test]
    fn first_item_larger_than_budget_yields_zero_items() {
        let parsed = vec![module(
            "m.py",
            vec![function("f", &"x".repeat(80))],
            Vec::new(),
        )];
        let cfg = BudgetConfig {
            max_chars: 50,
            ..Default::default()
        };

        let context = assemble_with(cfg, &parsed);
        assert!(context.modules[0].functions.is_empty());
        assert!(context.stats.budget_exhausted);
        assert_eq!(
            context.stats.per_module[0].reason,
            Some(TruncationReason::BudgetExhausted)
        );
    }

    #[test]
    fn exhaustion_stops_the_entire_run() {
        let big = "x".repeat(300);
        let parsed = vec![
            module("a.py", vec![function("f", &big)], Vec::new()),
            module("b.py", vec![function("g", &big)], Vec::new()),
            module("c.py", vec![function("h", &big)], Vec::new()),
        ];
        // Enough for a.py and its function, not for b.py's function.
        let cfg = BudgetConfig {
            max_chars: 400,
            ..Default::default()
        };

        let context = assemble_with(cfg, &parsed);
        assert_eq!(context.stats.per_module.len(), 3);
        assert_eq!(context.stats.per_module[0].functions_included, 1);
        assert_eq!(
            context.stats.per_module[1].reason,
            Some(TruncationReason::BudgetExhausted)
        );
        // c.py is never charged once the run is exhausted
        assert_eq!(context.stats.per_module[2].functions_included, 0);
        assert_eq!(
            context.stats.per_module[2].reason,
            Some(TruncationReason::BudgetExhausted)
        );
        assert!(context.stats.budget_exhausted);
    }

    #[test]
    fn degraded_record_survives_an_empty_budget() {
        let parsed = vec![
            module("ok.py", vec![function("f", "body")], Vec::new()),
            ModuleRecord::degraded("broken.py", "syntax error near line 3"),
        ];
        let cfg = BudgetConfig {
            max_chars: 0,
            ..Default::default()
        };

        let context = assemble_with(cfg, &parsed);
        assert_eq!(context.modules.len(), 1);
        assert!(context.modules[0].is_degraded());
        assert_eq!(context.stats.degraded_modules, 1);
        assert!(context.stats.budget_exhausted);
    }

    #[test]
    fn snippet_is_shortened_before_charging() {
        let long_snippet = (0..10).map(|i| format!("line {i}")).collect::<Vec<_>>();
        let parsed = vec![module(
            "m.py",
            vec![function("f", &long_snippet.join("\n"))],
            Vec::new(),
        )];
        let cfg = roomy(BudgetConfig {
            snippet_max_lines: 2,
            ..Default::default()
        });

        let context = assemble_with(cfg.clone(), &parsed);
        let selected = &context.modules[0].functions[0];
        assert!(selected.snippet_truncated);
        assert!(selected.snippet.ends_with(SNIPPET_TRUNCATION_MARKER));
        assert_eq!(selected.snippet.lines().count(), 3);

        // The charge reflects the truncated form: re-running with exactly
        // the used amount still selects the item.
        let exact = BudgetConfig {
            max_chars: context.stats.chars_used,
            ..cfg
        };
        let replay = assemble_with(exact, &parsed);
        assert_eq!(replay.stats.per_module[0].functions_included, 1);
        assert!(!replay.stats.budget_exhausted);
    }

    #[test]
    fn method_count_cap_is_annotated() {
        let parsed = vec![module(
            "m.py",
            Vec::new(),
            vec![class(
                "Widget",
                vec![
                    function("a", "x"),
                    function("b", "x"),
                    function("c", "x"),
                ],
            )],
        )];
        let cfg = roomy(BudgetConfig {
            max_funcs_per_module: 2,
            ..Default::default()
        });

        let context = assemble_with(cfg, &parsed);
        assert_eq!(context.modules[0].classes[0].methods.len(), 2);
        let stats = &context.stats.per_module[0];
        assert_eq!(stats.methods_omitted, 1);
        assert_eq!(stats.reason, Some(TruncationReason::CountCap));
        assert!(stats.truncated);
    }

    #[test]
    fn module_count_cap_omits_the_tail() {
        let parsed: Vec<ModuleRecord> = (0..4)
            .map(|i| module(&format!("m{i}.py"), vec![function("f", "x")], Vec::new()))
            .collect();
        let cfg = roomy(BudgetConfig {
            max_modules: 2,
            ..Default::default()
        });

        let context = assemble_with(cfg, &parsed);
        assert_eq!(context.stats.modules, 2);
        assert_eq!(context.stats.modules_omitted, 2);
    }

    #[test]
    fn shrinking_the_budget_never_grows_the_selection() {
        let parsed: Vec<ModuleRecord> = (0..3)
            .map(|i| {
                module(
                    &format!("m{i}.py"),
                    vec![
                        function("f", &"x".repeat(40)),
                        function("g", &"y".repeat(40)),
                    ],
                    Vec::new(),
                )
            })
            .collect();

        let mut previous = usize::MAX;
        for budget in [500, 250, 120, 60, 10] {
            let cfg = BudgetConfig {
                max_chars: budget,
                ..Default::default()
            };
            let context = assemble_with(cfg, &parsed);
            let selected: usize = context.stats.functions;
            assert!(context.stats.chars_used <= budget);
            assert!(selected <= previous);
            previous = selected;
        }
    }

    #[test]
    fn identical_inputs_produce_identical_serializations() {
        let parsed = vec![
            module(
                "a.py",
                vec![function("f", "body"), function("_g", "body")],
                vec![class("C", vec![function("m", "x")])],
            ),
            ModuleRecord::degraded("bad.py", "unreadable"),
        ];
        let cfg = BudgetConfig::default();

        let first = serde_json::to_string(&assemble_with(cfg.clone(), &parsed)).unwrap();
        let second = serde_json::to_string(&assemble_with(cfg, &parsed)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn truncation_flags_absent_when_nothing_was_cut() {
        let parsed = vec![module(
            "m.py",
            vec![function("f", "short")],
            vec![class("C", vec![function("m", "short")])],
        )];
        let context = assemble_with(roomy(BudgetConfig::default()), &parsed);

        let stats = &context.stats.per_module[0];
        assert!(!stats.truncated);
        assert_eq!(stats.marker(), None);
        assert!(!context.stats.budget_exhausted);
        assert_eq!(context.stats.modules_omitted, 0);
    }
}
