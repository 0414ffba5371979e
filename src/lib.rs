//! # matsync
//!
//! Swap scene materials for template materials from an external library
//! while keeping their textures.
//!
//! Given a source material, the engine imports a matching template from a
//! library file, copies the source's diffuse/specular/normal images into
//! the template's named nodes, remaps every user of the source to the
//! template, and deletes the source.
//!
//! ## Modules
//!
//! - [`util`] - Errors and name normalization
//! - [`core`] - Library index, template catalog, name resolution, pack paths
//! - [`material`] - Node graphs, host interface, synchronizer, batch operations
//!
//! ## Example
//!
//! ```ignore
//! use matsync::prelude::*;
//!
//! let mut doc = SceneDocument::open("scene.json".as_ref())?;
//! let mut index = LibraryIndex::new();
//! let sync = MaterialSynchronizer::new("packs/vanilla/materials.blend");
//!
//! let stone = doc.find_material("stone").unwrap();
//! let request = SyncRequest {
//!     source: stone,
//!     template: TemplatePlan::default_template("default_simple_cycles"),
//!     textures: TextureSet::new().with(Pass::Diffuse, "stone.png"),
//!     selection: Vec::new(),
//! };
//! sync.synchronize(&mut doc, &mut index, &request)?;
//! ```

pub mod util;
pub mod core;
pub mod material;

#[cfg(feature = "cli")]
pub mod settings;

// Re-export commonly used types
pub use util::{normalize, Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{normalize, Error, Result};
    pub use crate::core::{Catalog, CatalogStore, LibraryIndex, PackPaths, TemplateEntry};
    pub use crate::material::{
        AssetHost, BatchReport, MaterialId, MaterialSynchronizer, ObjectId, Pass, SceneDocument, SyncRequest,
        TemplatePlan, TextureSet,
    };
}
