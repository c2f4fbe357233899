use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// Capability interface over a file tree.
///
/// The discovery and summary algorithms only ever need these four
/// operations, which keeps them independent of the I/O substrate:
/// [`OsFileSystem`] backs them with `std::fs`, [`MemoryFileSystem`] with a
/// sorted map for tests.
pub trait FileSystem {
    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// List the entries of a directory in a deterministic (sorted) order.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Size of a file in bytes, without reading its content.
    fn size_of(&self, path: &Path) -> io::Result<u64>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        // read_dir order is platform-dependent; sort for reproducible runs
        entries.sort();
        Ok(entries)
    }

    fn size_of(&self, path: &Path) -> io::Result<u64> {
        std::fs::metadata(path).map(|meta| meta.len())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory filesystem for tests.
///
/// Directories are implied by file paths. Paths registered as unreadable
/// fail with `PermissionDenied` to exercise skip-and-warn behavior.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    fn denied(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("permission denied: {}", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        if self.files.contains_key(path) {
            return false;
        }
        self.files.keys().any(|k| k.starts_with(path) && k != path)
            || self.unreadable.iter().any(|k| k.starts_with(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.unreadable.contains(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if self.unreadable.contains(path) {
            return Err(Self::denied(path));
        }
        let mut children = BTreeSet::new();
        for key in self.files.keys().chain(self.unreadable.iter()) {
            if let Ok(rest) = key.strip_prefix(path) {
                if let Some(first) = rest.components().next() {
                    children.insert(path.join(first));
                }
            }
        }
        if children.is_empty() && !self.is_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            ));
        }
        Ok(children.into_iter().collect())
    }

    fn size_of(&self, path: &Path) -> io::Result<u64> {
        if self.unreadable.contains(path) {
            return Err(Self::denied(path));
        }
        self.files
            .get(path)
            .map(|content| content.len() as u64)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.unreadable.contains(path) {
            return Err(Self::denied(path));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}
