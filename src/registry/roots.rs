use std::path::{Path, PathBuf};

use tracing::warn;

/// A location that may contribute migrations, e.g. one installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    pub name: String,
    pub path: PathBuf,
}

impl SourceRoot {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Names a root after the last component of its path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { name, path }
    }
}

/// Enumerates the source roots to scan, in a stable order.
pub trait SourceRoots: Send + Sync {
    fn roots(&self) -> Vec<SourceRoot>;
}

/// Every directory directly below a packages directory is a root, followed by
/// any explicitly configured extra roots.
#[derive(Debug, Clone)]
pub struct PackageRoots {
    packages_dir: Option<PathBuf>,
    extra_roots: Vec<PathBuf>,
}

impl PackageRoots {
    pub fn new(packages_dir: Option<PathBuf>, extra_roots: Vec<PathBuf>) -> Self {
        Self {
            packages_dir,
            extra_roots,
        }
    }

    fn packages(dir: &Path) -> Vec<SourceRoot> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Packages directory {} is not readable: {}", dir.display(), e);
                return vec![];
            }
        };

        let mut roots: Vec<SourceRoot> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .map(SourceRoot::from_path)
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));
        roots
    }
}

impl SourceRoots for PackageRoots {
    fn roots(&self) -> Vec<SourceRoot> {
        let mut roots = self
            .packages_dir
            .as_deref()
            .map(Self::packages)
            .unwrap_or_default();

        for extra in &self.extra_roots {
            let root = SourceRoot::from_path(extra);
            if !roots.iter().any(|r| r.path == root.path) {
                roots.push(root);
            }
        }
        roots
    }
}

/// Fixed list of roots.
#[derive(Debug, Clone, Default)]
pub struct StaticRoots(pub Vec<SourceRoot>);

impl SourceRoots for StaticRoots {
    fn roots(&self) -> Vec<SourceRoot> {
        self.0.clone()
    }
}
