//! Texture passes and their discovery on source materials.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::NodeGraph;

/// Source node holding a specular image.
pub const SPECULAR_SOURCE_NODE: &str = "Specular Texture";

/// Source node holding a normal map.
pub const NORMAL_SOURCE_NODE: &str = "Normal Texture";

const SPECULAR_SUFFIXES: &[&str] = &["s", "spec", "specular"];
const NORMAL_SUFFIXES: &[&str] = &["n", "norm", "normal", "nrm"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tga"];

/// Texture slot of a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    Diffuse,
    Specular,
    Normal,
}

impl Pass {
    /// Lowercase pass name as used in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Diffuse => "diffuse",
            Pass::Specular => "specular",
            Pass::Normal => "normal",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image reference per pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureSet {
    images: BTreeMap<Pass, String>,
}

impl TextureSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`TextureSet::insert`].
    pub fn with(mut self, pass: Pass, image: impl Into<String>) -> Self {
        self.insert(pass, image);
        self
    }

    /// Set the image of a pass.
    pub fn insert(&mut self, pass: Pass, image: impl Into<String>) {
        self.images.insert(pass, image.into());
    }

    /// Image of a pass.
    pub fn get(&self, pass: Pass) -> Option<&str> {
        self.images.get(&pass).map(String::as_str)
    }

    /// Iterate over passes with images.
    pub fn iter(&self) -> impl Iterator<Item = (Pass, &str)> {
        self.images.iter().map(|(pass, image)| (*pass, image.as_str()))
    }

    /// Check if no pass has an image.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Collect images bound on a source material.
    ///
    /// The diffuse image comes from `diffuse_node`; specular and normal from
    /// their conventional node names.
    pub fn discover(graph: &NodeGraph, diffuse_node: &str) -> Self {
        let mut set = Self::new();
        for (pass, node) in [
            (Pass::Diffuse, diffuse_node),
            (Pass::Specular, SPECULAR_SOURCE_NODE),
            (Pass::Normal, NORMAL_SOURCE_NODE),
        ] {
            if let Some(image) = graph.image(node) {
                set.insert(pass, image);
            }
        }
        set
    }

    /// Fill passes still missing from image files next to the diffuse one.
    ///
    /// Does nothing when the diffuse image is not a file on disk.
    pub fn fill_from_disk(&mut self) {
        let Some(diffuse) = self.get(Pass::Diffuse) else {
            return;
        };
        for (pass, path) in find_additional_passes(Path::new(diffuse)) {
            if self.get(pass).is_none() {
                debug!(%pass, path = %path.display(), "found sibling texture pass");
                self.insert(pass, path.to_string_lossy());
            }
        }
    }
}

/// Find specular and normal images stored next to a diffuse image.
///
/// `stone.png` pairs with `stone_s.png`, `stone_spec.png`, `stone_n.png`,
/// `stone_normal.png` and so on (case-insensitive, any image extension).
pub fn find_additional_passes(diffuse: &Path) -> BTreeMap<Pass, PathBuf> {
    let mut found = BTreeMap::new();
    if !diffuse.is_file() {
        return found;
    }
    let (Some(dir), Some(stem)) = (diffuse.parent(), diffuse.file_stem()) else {
        return found;
    };
    let stem = stem.to_string_lossy().to_lowercase();
    let Ok(entries) = fs::read_dir(dir) else {
        return found;
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.as_path() != diffuse)
        .collect();
    candidates.sort();

    for path in candidates {
        let ext_ok = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()));
        if !ext_ok {
            continue;
        }
        let Some(other) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
            continue;
        };
        let Some(suffix) = other.strip_prefix(&stem).and_then(|s| s.strip_prefix(['_', '-'])) else {
            continue;
        };
        let pass = if SPECULAR_SUFFIXES.contains(&suffix) {
            Pass::Specular
        } else if NORMAL_SUFFIXES.contains(&suffix) {
            Pass::Normal
        } else {
            continue;
        };
        found.entry(pass).or_insert(path);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialNode;

    #[test]
    fn test_discover_from_nodes() {
        let graph = NodeGraph::new()
            .with_node(MaterialNode::image_texture("Image Texture", Some("stone.png")))
            .with_node(MaterialNode::image_texture(NORMAL_SOURCE_NODE, Some("stone_n.png")))
            .with_node(MaterialNode::image_texture(SPECULAR_SOURCE_NODE, None));

        let set = TextureSet::discover(&graph, "Image Texture");
        assert_eq!(set.get(Pass::Diffuse), Some("stone.png"));
        assert_eq!(set.get(Pass::Normal), Some("stone_n.png"));
        assert_eq!(set.get(Pass::Specular), None);
    }

    #[test]
    fn test_find_additional_passes() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["stone.png", "stone_s.png", "stone_normal.PNG", "stone_mer.png", "stonebrick_n.png", "stone_n.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found = find_additional_passes(&dir.path().join("stone.png"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[&Pass::Specular], dir.path().join("stone_s.png"));
        assert_eq!(found[&Pass::Normal], dir.path().join("stone_normal.PNG"));
    }

    #[test]
    fn test_fill_from_disk_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["dirt.png", "dirt_s.png", "dirt_n.png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let diffuse = dir.path().join("dirt.png");

        let mut set = TextureSet::new()
            .with(Pass::Diffuse, diffuse.to_string_lossy())
            .with(Pass::Normal, "custom_normal.png");
        set.fill_from_disk();

        assert_eq!(set.get(Pass::Normal), Some("custom_normal.png"));
        let specular = dir.path().join("dirt_s.png").to_string_lossy().into_owned();
        assert_eq!(set.get(Pass::Specular), Some(specular.as_str()));
    }

    #[test]
    fn test_missing_diffuse_file() {
        assert!(find_additional_passes(Path::new("/nonexistent/stone.png")).is_empty());
        let mut set = TextureSet::new().with(Pass::Diffuse, "not-a-file.png");
        set.fill_from_disk();
        assert_eq!(set.iter().count(), 1);
    }
}
