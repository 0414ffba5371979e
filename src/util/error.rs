//! Error types for material syncing.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for material syncing operations.
///
/// Every per-material failure of a sync is one of these; batch drivers
/// collect them instead of propagating.
#[derive(Error, Debug)]
pub enum Error {
    /// Template library file does not exist
    #[error("Library file not found: {0}")]
    LibraryFileMissing(PathBuf),

    /// The open document is the template library itself
    #[error("Refusing to sync inside the library file: {0}")]
    LibraryIsOpenDocument(PathBuf),

    /// Neither the exact nor the normalized template name is in the library
    #[error("Template not found in library: {0}")]
    TemplateNotFound(String),

    /// Template id is not a key of the catalog
    #[error("Template not registered in catalog: {0}")]
    UnknownTemplate(String),

    /// Import produced no new material
    #[error("Could not import {0}")]
    ImportFailed(String),

    /// Import produced more than one new material
    #[error("Importing {name} produced {count} materials")]
    AmbiguousImport { name: String, count: usize },

    /// Imported template has no node for the diffuse pass
    #[error("Material {material} has no {node} node")]
    MissingDiffuseNode { material: String, node: String },

    /// Source material has no node holding its texture
    #[error("Material {material} has no {node} node")]
    MissingSourceTextureNode { material: String, node: String },

    /// Source material has an empty node graph
    #[error("Material {0} has no nodes")]
    EmptyNodeGraph(String),

    /// A mandatory texture pass was not supplied
    #[error("No {pass} texture for material {material}")]
    MissingTexturePass { material: String, pass: String },

    /// Material handle does not refer to a live material
    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    /// Catalog document is malformed or inconsistent
    #[error("Catalog is corrupt: {0}")]
    CatalogCorrupt(String),

    /// Existing mapping value is not a list
    #[error("Catalog mapping for {0} is not a list")]
    MappingTypeError(String),

    /// Name is empty or blank
    #[error("Name is required")]
    InvalidName,

    /// Nothing selected
    #[error("No objects selected")]
    NoSelection,

    /// Selection carries no materials
    #[error("No materials found on selected objects")]
    NoMaterials,

    /// Render engine has no template family
    #[error("Unsupported render engine: {0}")]
    UnsupportedEngine(String),

    /// Host-side failure during a graph operation
    #[error("Host error: {0}")]
    Host(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a host error from a string.
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Create a catalog corruption error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CatalogCorrupt(msg.into())
    }

    /// Whether this failure must stop a whole batch rather than one material.
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            Self::LibraryFileMissing(_)
                | Self::LibraryIsOpenDocument(_)
                | Self::NoSelection
                | Self::NoMaterials
                | Self::UnsupportedEngine(_)
        )
    }
}

/// Result type alias for material syncing operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::TemplateNotFound("default_pbr_cycles".into());
        assert!(e.to_string().contains("default_pbr_cycles"));

        let e = Error::AmbiguousImport { name: "glass".into(), count: 2 };
        assert!(e.to_string().contains("glass"));
        assert!(e.to_string().contains('2'));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_batch_abort_kinds() {
        assert!(Error::LibraryFileMissing(PathBuf::from("x.blend")).aborts_batch());
        assert!(!Error::TemplateNotFound("x".into()).aborts_batch());
        assert!(!Error::host("boom").aborts_batch());
    }
}
