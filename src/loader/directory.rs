//! Recursive directory loading with include/exclude patterns.

use std::path::Path;

use glob::Pattern;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{Document, Loader, LoaderRegistry};
use crate::{LoadError, Result};

/// Include/exclude filter over file paths.
///
/// Patterns use shell wildcard syntax (`*`, `?`, `[abc]`) and are tested
/// against both the full path and the bare file name. `*` also matches
/// path separators, so `*.md` matches `docs/guide/intro.md`.
///
/// Exclusion wins: a file matching any exclude pattern is rejected. An
/// empty include list accepts everything else.
///
/// ```rust
/// use std::path::Path;
/// use ragprep::PathFilter;
///
/// let filter = PathFilter::new(&["*.md"], &["draft_*"]).unwrap();
/// assert!(filter.accepts(Path::new("docs/guide.md")));
/// assert!(!filter.accepts(Path::new("docs/draft_guide.md")));
/// assert!(!filter.accepts(Path::new("docs/guide.txt")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    /// Compile include and exclude patterns.
    ///
    /// # Errors
    ///
    /// [`LoadError::Pattern`] for a malformed pattern.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> std::result::Result<Self, LoadError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether `path` passes the filter.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        if self.exclude.iter().any(|p| matches(p, path)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| matches(p, path))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> std::result::Result<Vec<Pattern>, LoadError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| LoadError::Pattern {
                pattern: p.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn matches(pattern: &Pattern, path: &Path) -> bool {
    pattern.matches_path(path)
        || path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name))
}

/// Loads every accepted file under a directory.
///
/// Files are visited in file-name order. Files with no registered loader
/// are skipped; a file that fails to load is logged and skipped so one bad
/// file does not abort the run.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLoader {
    filter: PathFilter,
    loaders: LoaderRegistry,
}

impl DirectoryLoader {
    /// A loader with the default registry and no filtering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict which files are loaded.
    #[must_use]
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Use a different extension → loader map.
    #[must_use]
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    /// The extension → loader map in use.
    #[must_use]
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Lazily load the documents under `root`, one file at a time.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] or [`LoadError::NotADirectory`] if `root` is
    /// not an existing directory. Errors for individual files are logged,
    /// not returned.
    pub fn walk<'a>(
        &'a self,
        root: &Path,
    ) -> std::result::Result<impl Iterator<Item = Document> + 'a, LoadError> {
        if !root.exists() {
            return Err(LoadError::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(LoadError::NotADirectory(root.to_path_buf()));
        }

        let files = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    None
                }
            })
            // Symlinked files count; symlinked directories are not descended into.
            .filter(|entry| entry.path().is_file())
            .map(walkdir::DirEntry::into_path);

        Ok(files
            .filter(move |path| self.filter.accepts(path))
            .flat_map(move |path| self.load_file(&path)))
    }

    fn load_file(&self, path: &Path) -> Vec<Document> {
        let Some(loader) = self.loaders.get_for_path(path) else {
            debug!(path = %path.display(), "no loader for extension, skipping");
            return Vec::new();
        };
        match loader.load(path) {
            Ok(docs) => {
                debug!(path = %path.display(), documents = docs.len(), "loaded");
                docs
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load file, skipping");
                Vec::new()
            }
        }
    }
}

impl Loader for DirectoryLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        Ok(self.walk(path)?.collect())
    }
}
