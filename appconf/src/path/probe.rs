//! Filesystem existence checks.

use std::path::Path;

/// Answers whether a path exists.
///
/// Every "does this candidate exist" decision made while building a
/// configuration goes through this trait, so tests can substitute a fake
/// filesystem.
#[cfg_attr(test, mockall::automock)]
pub trait PathProbe: Send + Sync {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
}

/// [`PathProbe`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
