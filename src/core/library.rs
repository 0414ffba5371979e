//! Template library index.
//!
//! Caches the material names available in an external template library so
//! that repeated lookups within a session do not reopen the file. The cache
//! is owned by the caller and only reset through [`LibraryIndex::invalidate`],
//! which hosts call when the open document or the active pack changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::resolver;
use crate::util::Result;

/// Read access to template library files.
pub trait LibrarySource {
    /// List material names stored in a library file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    fn library_materials(&self, library: &Path) -> Result<Option<Vec<String>>>;
}

/// Names loaded from one library file.
#[derive(Debug, Clone)]
struct LoadedLibrary {
    path: PathBuf,
    names: HashSet<String>,
}

impl LoadedLibrary {
    fn read<S: LibrarySource + ?Sized>(source: &S, path: &Path) -> Result<Self> {
        let names: HashSet<String> = match source.library_materials(path)? {
            Some(names) => names.into_iter().collect(),
            None => {
                debug!(library = %path.display(), "library file not found, caching empty index");
                HashSet::new()
            }
        };
        debug!(library = %path.display(), count = names.len(), "loaded library index");
        Ok(Self { path: path.to_path_buf(), names })
    }
}

/// Lazily loaded set of template material names.
///
/// `None` inside means "not loaded yet"; a loaded empty set is a valid state
/// (library missing or empty) and is not reloaded until invalidated.
#[derive(Debug, Clone, Default)]
pub struct LibraryIndex {
    loaded: Option<LoadedLibrary>,
}

impl LibraryIndex {
    /// Create an unloaded index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index for `library` unless it is already loaded for that path.
    ///
    /// Asking for a different library path than the cached one reloads.
    pub fn ensure_loaded<S: LibrarySource + ?Sized>(
        &mut self,
        source: &S,
        library: &Path,
    ) -> Result<&HashSet<String>> {
        let loaded = match self.loaded.take() {
            Some(loaded) if loaded.path == library => loaded,
            _ => LoadedLibrary::read(source, library)?,
        };
        Ok(&self.loaded.insert(loaded).names)
    }

    /// Reset to the unloaded state.
    pub fn invalidate(&mut self) {
        if self.loaded.take().is_some() {
            debug!("library index invalidated");
        }
    }

    /// Check whether names have been loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Path of the loaded library, if any.
    pub fn library_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    /// Loaded names, or `None` when unloaded.
    pub fn names(&self) -> Option<&HashSet<String>> {
        self.loaded.as_ref().map(|l| &l.names)
    }

    /// Check whether a template (exact or normalized) is in the loaded index.
    pub fn contains(&self, template_id: &str) -> bool {
        self.names()
            .is_some_and(|names| resolver::resolve(template_id, names).is_some())
    }
}
