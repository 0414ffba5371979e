//! In-memory scene document implementing [`AssetHost`].
//!
//! Documents serialize to JSON. Template libraries for this host are
//! themselves serialized documents; only their materials are read.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AssetHost, MaterialId, NodeGraph, ObjectId};
use crate::core::LibrarySource;
use crate::util::{Error, Result};

/// Material stored in a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Source file of a linked material. Linked materials are read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub nodes: NodeGraph,
}

/// Object with material slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub slots: Vec<Option<MaterialId>>,
}

/// Scene document: materials plus the objects using them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    objects: Vec<SceneObject>,
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(skip, default = "default_bulk_remap")]
    bulk_remap: bool,
}

fn default_bulk_remap() -> bool {
    true
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            objects: Vec::new(),
            path: None,
            bulk_remap: true,
        }
    }
}

impl SceneDocument {
    /// Create an empty, unsaved document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a document from a JSON file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("document not found: {}", path.display()),
            )));
        }
        let mut doc: Self = serde_json::from_slice(&fs::read(path)?)?;
        doc.path = Some(path.to_path_buf());
        debug!(path = %path.display(), materials = doc.materials.len(), objects = doc.objects.len(), "opened document");
        Ok(doc)
    }

    /// Write the document as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Set the document path without touching the disk.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Enable or disable bulk remapping, modeling hosts that lack it.
    pub fn with_bulk_remap(mut self, enabled: bool) -> Self {
        self.bulk_remap = enabled;
        self
    }

    /// Add a local material. The name is disambiguated if taken.
    pub fn add_material(&mut self, name: &str, nodes: NodeGraph) -> MaterialId {
        let id = MaterialId(self.materials.iter().map(|m| m.id.0 + 1).max().unwrap_or(1));
        let name = self.unique_name(name, None);
        self.materials.push(Material { id, name, library: None, nodes });
        id
    }

    /// Add a material linked from another file.
    pub fn add_linked_material(&mut self, name: &str, library: impl Into<PathBuf>, nodes: NodeGraph) -> MaterialId {
        let id = self.add_material(name, nodes);
        if let Some(material) = self.material_mut(id) {
            material.library = Some(library.into());
        }
        id
    }

    /// Add an object with the given material slots.
    pub fn add_object(&mut self, name: &str, slots: Vec<Option<MaterialId>>) -> ObjectId {
        let id = ObjectId(self.objects.iter().map(|o| o.id.0 + 1).max().unwrap_or(1));
        self.objects.push(SceneObject { id, name: name.to_string(), slots });
        id
    }

    /// Get a material by id.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == id)
    }

    /// Get an object by id.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Find an object by name.
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().find(|o| o.name == name).map(|o| o.id)
    }

    /// All objects.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Disambiguate `name` against other materials with `.001`-style counters.
    fn unique_name(&self, name: &str, except: Option<MaterialId>) -> String {
        let taken = |candidate: &str| {
            self.materials
                .iter()
                .any(|m| Some(m.id) != except && m.name == candidate)
        };
        if !taken(name) {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{name}.{n:03}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    fn missing(id: MaterialId) -> Error {
        Error::MaterialNotFound(format!("#{}", id.0))
    }
}

impl LibrarySource for SceneDocument {
    fn library_materials(&self, library: &Path) -> Result<Option<Vec<String>>> {
        if !library.is_file() {
            return Ok(None);
        }
        let doc = Self::open(library)?;
        Ok(Some(doc.materials.into_iter().map(|m| m.name).collect()))
    }
}

impl AssetHost for SceneDocument {
    fn materials(&self) -> Vec<MaterialId> {
        self.materials.iter().map(|m| m.id).collect()
    }

    fn material_name(&self, id: MaterialId) -> Option<&str> {
        self.material(id).map(|m| m.name.as_str())
    }

    fn is_linked(&self, id: MaterialId) -> bool {
        self.material(id).is_some_and(|m| m.library.is_some())
    }

    fn node_graph(&self, id: MaterialId) -> Option<&NodeGraph> {
        self.material(id).map(|m| &m.nodes)
    }

    fn node_graph_mut(&mut self, id: MaterialId) -> Option<&mut NodeGraph> {
        self.material_mut(id).map(|m| &mut m.nodes)
    }

    fn append_material(&mut self, library: &Path, name: &str) -> Result<()> {
        if !library.is_file() {
            return Err(Error::LibraryFileMissing(library.to_path_buf()));
        }
        let source = Self::open(library)?;
        for template in source.materials.into_iter().filter(|m| m.name == name) {
            let id = self.add_material(&template.name, template.nodes);
            debug!(library = %library.display(), name, ?id, "appended material");
        }
        Ok(())
    }

    fn supports_bulk_remap(&self) -> bool {
        self.bulk_remap
    }

    fn remap_users(&mut self, from: MaterialId, to: MaterialId) -> Result<()> {
        if !self.bulk_remap {
            return Err(Error::host("bulk remap is not supported by this host"));
        }
        if self.material(to).is_none() {
            return Err(Self::missing(to));
        }
        for slot in self.objects.iter_mut().flat_map(|o| o.slots.iter_mut()) {
            if *slot == Some(from) {
                *slot = Some(to);
            }
        }
        Ok(())
    }

    fn remap_objects(&mut self, from: MaterialId, to: MaterialId, objects: &[ObjectId]) -> Result<usize> {
        if self.material(to).is_none() {
            return Err(Self::missing(to));
        }
        let mut changed = 0;
        for object in self.objects.iter_mut().filter(|o| objects.contains(&o.id)) {
            for slot in object.slots.iter_mut().filter(|s| **s == Some(from)) {
                *slot = Some(to);
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn rename_material(&mut self, id: MaterialId, name: &str) -> Result<String> {
        let name = self.unique_name(name, Some(id));
        let material = self.material_mut(id).ok_or_else(|| Self::missing(id))?;
        material.name = name.clone();
        Ok(name)
    }

    fn remove_material(&mut self, id: MaterialId) -> Result<()> {
        let before = self.materials.len();
        self.materials.retain(|m| m.id != id);
        if self.materials.len() == before {
            return Err(Self::missing(id));
        }
        for slot in self.objects.iter_mut().flat_map(|o| o.slots.iter_mut()) {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        Ok(())
    }

    fn object_materials(&self, object: ObjectId) -> Vec<Option<MaterialId>> {
        self.object(object).map(|o| o.slots.clone()).unwrap_or_default()
    }

    fn document_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialNode;

    #[test]
    fn test_name_disambiguation() {
        let mut doc = SceneDocument::new();
        let a = doc.add_material("stone", NodeGraph::new());
        let b = doc.add_material("stone", NodeGraph::new());
        let c = doc.add_material("stone", NodeGraph::new());
        assert_eq!(doc.material_name(a), Some("stone"));
        assert_eq!(doc.material_name(b), Some("stone.001"));
        assert_eq!(doc.material_name(c), Some("stone.002"));

        doc.remove_material(a).unwrap();
        assert_eq!(doc.rename_material(c, "stone").unwrap(), "stone");
        assert_eq!(doc.rename_material(b, "stone").unwrap(), "stone.001");
    }

    #[test]
    fn test_remove_clears_slots() {
        let mut doc = SceneDocument::new();
        let m = doc.add_material("stone", NodeGraph::new());
        let o = doc.add_object("cube", vec![Some(m), None]);
        doc.remove_material(m).unwrap();
        assert_eq!(doc.object_materials(o), vec![None, None]);
        assert!(doc.remove_material(m).is_err());
    }

    #[test]
    fn test_remap() {
        let mut doc = SceneDocument::new();
        let a = doc.add_material("a", NodeGraph::new());
        let b = doc.add_material("b", NodeGraph::new());
        let o1 = doc.add_object("one", vec![Some(a)]);
        let o2 = doc.add_object("two", vec![Some(a), Some(a)]);

        assert_eq!(doc.remap_objects(a, b, &[o2]).unwrap(), 2);
        assert_eq!(doc.object_materials(o1), vec![Some(a)]);

        doc.remap_users(a, b).unwrap();
        assert_eq!(doc.object_materials(o1), vec![Some(b)]);

        let mut old = doc.with_bulk_remap(false);
        assert!(!old.supports_bulk_remap());
        assert!(old.remap_users(b, a).is_err());
    }

    #[test]
    fn test_find_and_linked() {
        let mut doc = SceneDocument::new();
        let local = doc.add_material("local", NodeGraph::new());
        let linked = doc.add_linked_material(
            "linked",
            "lib.blend",
            NodeGraph::new().with_node(MaterialNode::image_texture("Image Texture", None)),
        );
        assert_eq!(doc.find_material("linked"), Some(linked));
        assert!(doc.is_linked(linked));
        assert!(!doc.is_linked(local));
    }

    #[test]
    fn test_append_missing_library() {
        let mut doc = SceneDocument::new();
        let err = doc.append_material(Path::new("/nonexistent/lib.json"), "x").unwrap_err();
        assert!(matches!(err, Error::LibraryFileMissing(_)));
        assert_eq!(doc.library_materials(Path::new("/nonexistent/lib.json")).unwrap(), None);
    }

    #[test]
    fn test_json_round_trip_keeps_ids() {
        let mut doc = SceneDocument::new();
        let m = doc.add_material("stone", NodeGraph::new());
        doc.add_object("cube", vec![Some(m)]);

        let json = serde_json::to_string(&doc).unwrap();
        let back: SceneDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.material_name(m), Some("stone"));
        assert!(back.supports_bulk_remap());
    }
}
