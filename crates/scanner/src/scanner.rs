use crate::fs::FileSystem;
use crate::pattern::PatternSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extraction domain. Selects which file extensions are admitted and
/// whether a directory summary is built alongside the parsed modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Tests,
    Docs,
    Design,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Tests => "tests",
            Domain::Docs => "docs",
            Domain::Design => "design",
        }
    }

    fn admit(self, path: &Path) -> Admission {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let is_source = matches!(ext.as_deref(), Some("py" | "pyw"));
        match self {
            Domain::Tests => {
                if is_source {
                    Admission::Source
                } else {
                    Admission::Ignored
                }
            }
            Domain::Docs => {
                if is_source {
                    Admission::Source
                } else if matches!(ext.as_deref(), Some("md" | "rst" | "txt")) {
                    Admission::Companion
                } else {
                    Admission::Ignored
                }
            }
            // Design admits everything; unrecognized content is only
            // counted, never parsed.
            Domain::Design => {
                if is_source {
                    Admission::Source
                } else {
                    Admission::Companion
                }
            }
        }
    }
}

enum Admission {
    /// Parse structurally.
    Source,
    /// Admitted by the domain but only listed/counted.
    Companion,
    Ignored,
}

/// Result of one discovery pass.
///
/// `files` holds parseable source files in discovery order; `companions`
/// holds admitted-but-unparsed files; `warnings` records every path that
/// was skipped because it could not be read.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub companions: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl Discovery {
    /// Zero usable candidates. An empty result is a reportable condition
    /// for the caller, not an error here.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.companions.is_empty()
    }
}

/// Walks requested root paths, pruning excluded subtrees before descent and
/// filtering the remainder by the domain's extension set.
pub struct Scanner<'a, F: FileSystem> {
    fs: &'a F,
    patterns: PatternSet,
    match_root: PathBuf,
}

impl<'a, F: FileSystem> Scanner<'a, F> {
    /// `match_root` fixes the base that exclusion patterns are evaluated
    /// against; paths outside it are matched by their full path.
    pub fn new(fs: &'a F, excludes: &[String], match_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            patterns: PatternSet::new(excludes),
            match_root: match_root.into(),
        }
    }

    pub fn discover(&self, targets: &[PathBuf], domain: Domain) -> Discovery {
        let mut out = Discovery::default();
        for target in targets {
            if self.fs.is_file(target) {
                // Explicit file targets are included directly, but the
                // exclusion rules still apply.
                if !self.excluded(target) {
                    self.admit(target, domain, &mut out);
                }
            } else if self.fs.is_dir(target) {
                if !self.excluded(target) {
                    self.walk(target, domain, &mut out);
                }
            } else {
                let warning = format!("skipping unreadable target: {}", target.display());
                log::warn!("{warning}");
                out.warnings.push(warning);
            }
        }
        log::info!(
            "discovered {} source files, {} companion files ({} domain)",
            out.files.len(),
            out.companions.len(),
            domain.as_str()
        );
        out
    }

    fn walk(&self, dir: &Path, domain: Domain, out: &mut Discovery) {
        let entries = match self.fs.list_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                let warning = format!("skipping unreadable directory {}: {e}", dir.display());
                log::warn!("{warning}");
                out.warnings.push(warning);
                return;
            }
        };
        for entry in entries {
            if self.excluded(&entry) {
                log::debug!("pruned {}", entry.display());
                continue;
            }
            if self.fs.is_dir(&entry) {
                self.walk(&entry, domain, out);
            } else {
                self.admit(&entry, domain, out);
            }
        }
    }

    fn admit(&self, path: &Path, domain: Domain, out: &mut Discovery) {
        match domain.admit(path) {
            Admission::Source => out.files.push(path.to_path_buf()),
            Admission::Companion => out.companions.push(path.to_path_buf()),
            Admission::Ignored => {}
        }
    }

    fn excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.match_root).unwrap_or(path);
        self.patterns.matches(relative)
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn match_root(&self) -> &Path {
        &self.match_root
    }
}
