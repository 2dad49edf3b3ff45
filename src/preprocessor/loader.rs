//! Source loading for `#include`
//!
//! The preprocessor never touches the filesystem itself; it asks a
//! [`SourceLoader`]. [`FsLoader`] reads from disk, [`MemoryLoader`] serves
//! files registered in memory (embedding and tests).

use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Provides the text of a file named by an `#include`
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Serves files from an in-memory map
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not registered", path.display()),
            )
        })
    }
}

/// Directory part of `path`, empty when there is none
pub fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
