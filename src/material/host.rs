//! Host asset graph interface.
//!
//! The sync engine never owns materials. It drives the host through this
//! trait: enumerate and inspect materials, append templates from a library
//! file, remap users, rename and delete.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::NodeGraph;
use crate::core::LibrarySource;
use crate::util::Result;

/// Stable handle of a material in the host graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub u64);

/// Stable handle of an object in the host graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

/// Host operations consumed by the sync engine.
pub trait AssetHost: LibrarySource {
    /// All materials currently in the document.
    fn materials(&self) -> Vec<MaterialId>;

    /// Display name of a material.
    fn material_name(&self, id: MaterialId) -> Option<&str>;

    /// Whether the material is linked from another file (and so read-only).
    fn is_linked(&self, id: MaterialId) -> bool;

    /// Node graph of a material.
    fn node_graph(&self, id: MaterialId) -> Option<&NodeGraph>;

    /// Mutable node graph of a material.
    fn node_graph_mut(&mut self, id: MaterialId) -> Option<&mut NodeGraph>;

    /// Append (never link) every library material named `name`.
    fn append_material(&mut self, library: &Path, name: &str) -> Result<()>;

    /// Whether [`AssetHost::remap_users`] is available.
    fn supports_bulk_remap(&self) -> bool;

    /// Point every user of `from` at `to`.
    fn remap_users(&mut self, from: MaterialId, to: MaterialId) -> Result<()>;

    /// Point slots of the given objects that use `from` at `to`.
    ///
    /// Returns the number of slots changed.
    fn remap_objects(&mut self, from: MaterialId, to: MaterialId, objects: &[ObjectId]) -> Result<usize>;

    /// Rename a material. Returns the final name after host disambiguation.
    fn rename_material(&mut self, id: MaterialId, name: &str) -> Result<String>;

    /// Delete a material.
    fn remove_material(&mut self, id: MaterialId) -> Result<()>;

    /// Material slots of an object, empty slots included.
    fn object_materials(&self, object: ObjectId) -> Vec<Option<MaterialId>>;

    /// Path of the open document, if saved.
    fn document_path(&self) -> Option<&Path>;

    /// Find a material by exact name.
    fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials()
            .into_iter()
            .find(|&id| self.material_name(id) == Some(name))
    }
}

/// Unique materials used by a selection, in slot order.
///
/// Empty slots are skipped.
pub fn materials_from_objects<H: AssetHost + ?Sized>(host: &H, objects: &[ObjectId]) -> Vec<MaterialId> {
    let mut result = Vec::new();
    for &object in objects {
        for slot in host.object_materials(object) {
            match slot {
                Some(id) if !result.contains(&id) => result.push(id),
                Some(_) => {}
                None => tracing::debug!(?object, "skipping empty material slot"),
            }
        }
    }
    result
}
