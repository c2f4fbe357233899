use crate::fs::FileSystem;
use crate::pattern::PatternSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

/// Rendered directory outline, bounded by depth and per-directory entry
/// caps. Every cut is visible as a `(+N more)` marker; `truncated` is set
/// whenever at least one marker was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    pub text: String,
    pub entries: usize,
    pub truncated: bool,
}

struct Listing {
    shown: Vec<Entry>,
    omitted: usize,
}

struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

/// Build a directory outline for the given roots.
///
/// Directories are visited breadth-first so the entry allowance is spent on
/// shallow levels before deep ones; the collected listings are then
/// rendered as an indented outline.
pub fn summarize_tree<F: FileSystem>(
    fs: &F,
    roots: &[PathBuf],
    patterns: &PatternSet,
    match_root: &Path,
    max_depth: usize,
    max_entries_per_dir: usize,
) -> TreeSummary {
    let mut listings: BTreeMap<PathBuf, Listing> = BTreeMap::new();
    let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();

    for root in roots {
        let relative = root.strip_prefix(match_root).unwrap_or(root);
        if patterns.matches(relative) {
            continue;
        }
        if fs.is_dir(root) {
            queue.push_back((root.clone(), 0));
        }
    }

    while let Some((dir, depth)) = queue.pop_front() {
        let Ok(children) = fs.list_dir(&dir) else {
            continue;
        };
        let mut visible = Vec::new();
        for child in children {
            let relative = child.strip_prefix(match_root).unwrap_or(&child);
            if patterns.matches(relative) {
                continue;
            }
            let name = child
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| child.display().to_string());
            visible.push(Entry {
                is_dir: fs.is_dir(&child),
                path: child,
                name,
            });
        }

        let (shown, omitted) = if depth >= max_depth {
            // Depth cap: keep the directory visible, hide its contents.
            (Vec::new(), visible.len())
        } else if visible.len() > max_entries_per_dir {
            let omitted = visible.len() - max_entries_per_dir;
            visible.truncate(max_entries_per_dir);
            (visible, omitted)
        } else {
            (visible, 0)
        };

        for entry in &shown {
            if entry.is_dir {
                queue.push_back((entry.path.clone(), depth + 1));
            }
        }
        listings.insert(dir, Listing { shown, omitted });
    }

    let mut lines = Vec::new();
    let mut entries = 0;
    let mut truncated = false;
    for root in roots {
        if !listings.contains_key(root) {
            continue;
        }
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        lines.push(format!("{name}/"));
        render(root, &listings, 1, &mut lines, &mut entries, &mut truncated);
    }

    TreeSummary {
        text: lines.join("\n"),
        entries,
        truncated,
    }
}

fn render(
    dir: &Path,
    listings: &BTreeMap<PathBuf, Listing>,
    indent: usize,
    lines: &mut Vec<String>,
    entries: &mut usize,
    truncated: &mut bool,
) {
    let Some(listing) = listings.get(dir) else {
        return;
    };
    let pad = "  ".repeat(indent);
    for entry in &listing.shown {
        if entry.is_dir {
            lines.push(format!("{pad}{}/", entry.name));
            *entries += 1;
            render(&entry.path, listings, indent + 1, lines, entries, truncated);
        } else {
            lines.push(format!("{pad}{}", entry.name));
            *entries += 1;
        }
    }
    if listing.omitted > 0 {
        lines.push(format!("{pad}(+{} more)", listing.omitted));
        *truncated = true;
    }
}
