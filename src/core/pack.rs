//! Resource-pack file locations.

use std::path::{Path, PathBuf};

/// Library holding the `default_*` template materials.
pub const SYNC_LIBRARY_FILE: &str = "materials.blend";

/// Library holding user-authored Vivy templates.
pub const VIVY_LIBRARY_FILE: &str = "vivy_materials.blend";

/// Catalog describing the Vivy templates.
pub const VIVY_CATALOG_FILE: &str = "vivy_materials.json";

/// Files derived from the active texture pack directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackPaths {
    root: PathBuf,
}

impl PackPaths {
    /// Paths for a pack directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a pack setting that may be relative to the open document.
    ///
    /// A leading `//` means "next to the document", as hosts write it.
    pub fn resolve(pack: &str, document: Option<&Path>) -> Self {
        match (pack.strip_prefix("//"), document.and_then(Path::parent)) {
            (Some(rel), Some(dir)) => Self::new(dir.join(rel)),
            _ => Self::new(pack),
        }
    }

    /// Pack directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default template library.
    pub fn sync_library(&self) -> PathBuf {
        self.root.join(SYNC_LIBRARY_FILE)
    }

    /// Vivy template library.
    pub fn vivy_library(&self) -> PathBuf {
        self.root.join(VIVY_LIBRARY_FILE)
    }

    /// Vivy template catalog.
    pub fn vivy_catalog(&self) -> PathBuf {
        self.root.join(VIVY_CATALOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_files() {
        let paths = PackPaths::new("/packs/vanilla");
        assert_eq!(paths.sync_library(), Path::new("/packs/vanilla/materials.blend"));
        assert_eq!(paths.vivy_library(), Path::new("/packs/vanilla/vivy_materials.blend"));
        assert_eq!(paths.vivy_catalog(), Path::new("/packs/vanilla/vivy_materials.json"));
    }

    #[test]
    fn test_document_relative() {
        let doc = Path::new("/work/scene.blend");
        assert_eq!(PackPaths::resolve("//pack", Some(doc)).root(), Path::new("/work/pack"));
        assert_eq!(PackPaths::resolve("//pack", None).root(), Path::new("//pack"));
        assert_eq!(PackPaths::resolve("/abs/pack", Some(doc)).root(), Path::new("/abs/pack"));
    }
}
