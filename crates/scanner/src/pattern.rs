use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

/// An ordered set of gitignore-style exclusion patterns.
///
/// `*` matches within a path segment, `**` crosses segments. A pattern that
/// fails to compile degrades to a literal string comparison instead of
/// surfacing an error, so a bad exclude can never abort a scan.
#[derive(Debug, Clone)]
pub struct PatternSet {
    entries: Vec<PatternEntry>,
}

#[derive(Debug, Clone)]
enum PatternEntry {
    Glob(GlobMatcher),
    Literal(String),
}

impl PatternSet {
    pub fn new(patterns: &[String]) -> Self {
        let mut entries = Vec::new();
        for pattern in patterns {
            match compile(pattern) {
                Some(matcher) => {
                    entries.push(PatternEntry::Glob(matcher));
                    // A directory pattern like `target/**` must also match
                    // the directory itself, so the walk can prune before
                    // descending into it.
                    if let Some(stem) = pattern.strip_suffix("/**") {
                        if let Some(matcher) = compile(stem) {
                            entries.push(PatternEntry::Glob(matcher));
                        }
                    }
                }
                None => {
                    log::warn!("unparseable exclude pattern {pattern:?}, matching literally");
                    entries.push(PatternEntry::Literal(pattern.clone()));
                }
            }
        }
        Self { entries }
    }

    /// Whether any pattern matches the given path (relative to the scan
    /// root). Purely syntactic; never touches the filesystem.
    pub fn matches(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.entries.iter().any(|entry| match entry {
            PatternEntry::Glob(matcher) => matcher.is_match(path),
            PatternEntry::Literal(literal) => text == literal.as_str(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compile(pattern: &str) -> Option<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .ok()
        .map(|glob| glob.compile_matcher())
}
