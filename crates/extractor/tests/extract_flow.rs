//! End-to-end pipeline tests against a real temporary directory.

use codescope_extractor::{extract, BudgetConfig, ExtractError, ExtractOptions};
use codescope_scanner::{Domain, OsFileSystem};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const GOOD_MODULE: &str = r#""""Order handling."""
import json


def submit(order: dict) -> str:
    """Queue an order for processing."""
    return json.dumps(order)


def _validate(order):
    return bool(order)


class OrderBook:
    """Tracks open orders."""

    def add(self, order):
        self.orders.append(order)
"#;

const BROKEN_MODULE: &str = "def broken(:\n    pass\n";

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("__pycache__")).unwrap();
    fs::write(root.join("pkg/orders.py"), GOOD_MODULE).unwrap();
    fs::write(root.join("pkg/broken.py"), BROKEN_MODULE).unwrap();
    fs::write(root.join("README.md"), "# demo\n").unwrap();
    fs::write(root.join("__pycache__/junk.py"), "cached = True\n").unwrap();
}

fn options(root: &Path, domain: Domain) -> ExtractOptions {
    ExtractOptions {
        targets: vec![root.to_path_buf()],
        domain,
        excludes: vec!["**/__pycache__/**".to_string()],
        match_root: root.to_path_buf(),
        budget: BudgetConfig::default(),
    }
}

#[test]
fn one_broken_file_degrades_without_failing_the_run() {
    let temp = tempdir().unwrap();
    write_project(temp.path());

    let context = extract(&OsFileSystem, &options(temp.path(), Domain::Tests)).unwrap();

    assert_eq!(context.modules.len(), 2);
    let degraded: Vec<_> = context.modules.iter().filter(|m| m.is_degraded()).collect();
    assert_eq!(degraded.len(), 1);
    assert!(degraded[0].path.ends_with("broken.py"));
    assert_eq!(context.stats.degraded_modules, 1);

    let orders = context
        .modules
        .iter()
        .find(|m| m.path.ends_with("orders.py"))
        .unwrap();
    assert_eq!(orders.docstring.as_deref(), Some("Order handling."));
    assert_eq!(orders.imports, vec!["import json"]);
    // private tier excluded by default
    assert_eq!(orders.functions.len(), 1);
    assert_eq!(orders.functions[0].name, "submit");
    assert_eq!(orders.classes.len(), 1);
    // excluded cache directory was pruned
    assert!(context.modules.iter().all(|m| !m.path.contains("__pycache__")));
}

#[test]
fn identical_runs_serialize_identically() {
    let temp = tempdir().unwrap();
    write_project(temp.path());
    let opts = options(temp.path(), Domain::Tests);

    let first = serde_json::to_string(&extract(&OsFileSystem, &opts).unwrap()).unwrap();
    let second = serde_json::to_string(&extract(&OsFileSystem, &opts).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn design_domain_builds_a_tree_summary() {
    let temp = tempdir().unwrap();
    write_project(temp.path());

    let context = extract(&OsFileSystem, &options(temp.path(), Domain::Design)).unwrap();

    let tree = context.tree.expect("design runs carry a tree summary");
    assert!(tree.text.contains("orders.py"));
    assert!(!tree.text.contains("__pycache__"));
    // README is admitted but not parsed
    assert!(context.companions.iter().any(|p| p.ends_with("README.md")));
}

#[test]
fn docs_domain_lists_prose_companions() {
    let temp = tempdir().unwrap();
    write_project(temp.path());

    let context = extract(&OsFileSystem, &options(temp.path(), Domain::Docs)).unwrap();
    assert!(context.companions.iter().any(|p| p.ends_with("README.md")));
    assert!(context.modules.iter().any(|m| m.path.ends_with("orders.py")));
}

#[test]
fn empty_scan_is_an_explicit_empty_result() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("notes.bin"), b"\x00").unwrap();

    let err = extract(&OsFileSystem, &options(temp.path(), Domain::Tests)).unwrap_err();
    assert!(matches!(err, ExtractError::NoFiles));
}

#[test]
fn tight_budget_yields_partial_but_annotated_output() {
    let temp = tempdir().unwrap();
    write_project(temp.path());

    let mut opts = options(temp.path(), Domain::Tests);
    opts.budget.max_chars = 80;
    let context = extract(&OsFileSystem, &opts).unwrap();

    assert!(context.stats.budget_exhausted);
    assert!(context.stats.chars_used <= 80);
    assert!(context
        .stats
        .per_module
        .iter()
        .any(|m| m.truncated || m.degraded));
}
