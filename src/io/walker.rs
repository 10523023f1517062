//! Source trees: where the analyzer gets `(path, content)` pairs from.

use crate::config::AnalysisConfig;
use crate::core::errors::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Read access to the files of one or more services.
///
/// Implementations must be `Send + Sync`; files are read from worker threads.
pub trait SourceTree: Send + Sync {
    /// Source files below `root`, in a stable order
    fn source_files(&self, root: &Path) -> Result<Vec<PathBuf>>;

    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Walks the real file system.
pub struct FileWalker {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl Default for FileWalker {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl FileWalker {
    pub fn new(extensions: Vec<String>, exclude_dirs: Vec<String>) -> Self {
        Self {
            extensions,
            exclude_dirs,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.extensions.clone(), config.exclude_dirs.clone())
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude_dirs.iter().any(|ex| ex == name))
    }

    fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

impl SourceTree for FileWalker {
    fn source_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && self.should_process(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Files held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTree {
    files: BTreeMap<PathBuf, String>,
}

impl InMemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl SourceTree for InMemoryTree {
    fn source_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|path| path.starts_with(root))
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not in the tree", path.display()),
            )
            .into()
        })
    }
}
