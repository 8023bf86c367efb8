use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the contact database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Durable database file, created on first open.
    File(PathBuf),
    /// Private in-memory database, discarded on close.
    InMemory,
}

/// Store open configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
        }
    }

    /// Path used in logs and mismatch errors. In-memory stores report
    /// `:memory:`.
    pub fn display_path(&self) -> &Path {
        match &self.location {
            StoreLocation::File(path) => path.as_path(),
            StoreLocation::InMemory => Path::new(":memory:"),
        }
    }

    /// Returns whether both configs address the same database.
    ///
    /// File paths are resolved against the working directory and through
    /// symlinks before comparing, so `a.db` and `./a.db` match.
    pub fn same_location(&self, other: &Self) -> bool {
        match (&self.location, &other.location) {
            (StoreLocation::File(a), StoreLocation::File(b)) => {
                a == b || resolve_path(a) == resolve_path(b)
            }
            (StoreLocation::InMemory, StoreLocation::InMemory) => true,
            _ => false,
        }
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self.location {
            StoreLocation::File(_) => "file",
            StoreLocation::InMemory => "memory",
        }
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }

    // Not created yet: resolve the parent and keep the file name.
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|parent| parent.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;

    #[test]
    fn dotted_and_plain_paths_address_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let plain = StoreConfig::file(dir.path().join("contacts.db"));
        let dotted = StoreConfig::file(dir.path().join(".").join("contacts.db"));

        assert!(plain.same_location(&dotted));
        assert!(!plain.same_location(&StoreConfig::file(dir.path().join("other.db"))));
        assert!(!plain.same_location(&StoreConfig::in_memory()));
        assert!(StoreConfig::in_memory().same_location(&StoreConfig::in_memory()));
    }
}
