//! User-editable template catalog (`vivy_materials.json`).
//!
//! The catalog maps template ids to the node naming of their library
//! material, and records which source materials were registered under
//! which templates:
//!
//! ```json
//! {
//!   "materials": { "glass_vivy": {
//!       "base_material": "Glass", "desc": "Clear glass",
//!       "passes": { "diffuse": "Diffuse", "normal": "Normal" },
//!       "extensions": { "emissive": "Glass Emissive" }
//!   } },
//!   "mapping": { "Glass": ["glass_vivy"] }
//! }
//! ```
//!
//! The file is shared with external editors and has no locking. Every
//! read-modify-write in [`CatalogStore`] reloads from disk first, which
//! narrows the lost-update window between loading and saving but does not
//! close it: an edit landing between the reload and the write is lost.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::util::{Error, Result};

/// Node names holding each texture pass in a template material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSet {
    /// Node receiving the diffuse image. Always present.
    pub diffuse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<String>,
}

impl PassSet {
    /// Pass set with only a diffuse node.
    pub fn diffuse(node: impl Into<String>) -> Self {
        Self { diffuse: node.into(), specular: None, normal: None }
    }
}

/// Alternate templates chosen by source material classification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRule {
    /// Library material used instead of the base one for emissive blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive: Option<String>,
}

/// One registered template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Library material name to import.
    pub base_material: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    pub passes: PassSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ExtensionRule>,
}

impl TemplateEntry {
    /// Create an entry with a diffuse pass only.
    pub fn new(base_material: impl Into<String>, description: impl Into<String>, diffuse: impl Into<String>) -> Self {
        Self {
            base_material: base_material.into(),
            description: description.into(),
            passes: PassSet::diffuse(diffuse),
            extensions: None,
        }
    }

    /// Emissive replacement template, if declared.
    pub fn emissive_template(&self) -> Option<&str> {
        self.extensions.as_ref()?.emissive.as_deref()
    }
}

/// Value of a `mapping` entry.
///
/// Anything other than a list of strings is kept verbatim so that a
/// corrupted document survives a round trip and is reported on register.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingValue {
    Templates(Vec<String>),
    Other(serde_json::Value),
}

/// Parsed catalog document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<BTreeMap<String, TemplateEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, MappingValue>>,
    /// Unknown top-level keys, preserved on save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Catalog {
    /// Parse a catalog file. A zero-byte file is an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let catalog = Self::from_slice(&bytes)?;
        for (material, id) in catalog.dangling_mappings() {
            warn!(material, template = id, "catalog mapping names an unregistered template");
        }
        debug!(path = %path.display(), templates = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Parse catalog JSON from bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes).map_err(|e| Error::corrupt(e.to_string()))
    }

    /// Write the catalog so that an immediate reload observes it.
    ///
    /// Writes a sibling temp file and renames it over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), templates = self.len(), "saved catalog");
        Ok(())
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.materials.as_ref().map_or(0, BTreeMap::len)
    }

    /// Check if no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a template by id.
    pub fn template(&self, template_id: &str) -> Option<&TemplateEntry> {
        self.materials.as_ref()?.get(template_id)
    }

    /// Iterate over registered templates in id order.
    pub fn templates(&self) -> impl Iterator<Item = (&str, &TemplateEntry)> {
        self.materials
            .iter()
            .flat_map(|m| m.iter().map(|(id, entry)| (id.as_str(), entry)))
    }

    /// Templates a source material was registered under.
    pub fn registered_templates(&self, material_name: &str) -> Result<&[String]> {
        match self.mapping.as_ref().and_then(|m| m.get(material_name)) {
            None => Ok(&[]),
            Some(MappingValue::Templates(ids)) => Ok(ids),
            Some(MappingValue::Other(_)) => Err(Error::MappingTypeError(material_name.to_string())),
        }
    }

    /// Register `entry` under `template_id` for `material_name`.
    ///
    /// Overwrites an existing entry with the same id and appends the id to
    /// the material's mapping list (duplicates are kept). Fails with
    /// [`Error::MappingTypeError`] without touching the catalog when the
    /// existing mapping value is not a list.
    pub fn register(&mut self, material_name: &str, template_id: &str, entry: TemplateEntry) -> Result<()> {
        if let Some(MappingValue::Other(_)) = self.mapping.as_ref().and_then(|m| m.get(material_name)) {
            return Err(Error::MappingTypeError(material_name.to_string()));
        }

        self.materials
            .get_or_insert_with(BTreeMap::new)
            .insert(template_id.to_string(), entry);

        let slot = self
            .mapping
            .get_or_insert_with(BTreeMap::new)
            .entry(material_name.to_string())
            .or_insert_with(|| MappingValue::Templates(Vec::new()));
        if let MappingValue::Templates(ids) = slot {
            ids.push(template_id.to_string());
        }
        Ok(())
    }

    /// Mapping entries whose template id has no `materials` entry.
    pub fn dangling_mappings(&self) -> Vec<(&str, &str)> {
        let Some(mapping) = &self.mapping else {
            return Vec::new();
        };
        mapping
            .iter()
            .filter_map(|(material, value)| match value {
                MappingValue::Templates(ids) => Some((material, ids)),
                MappingValue::Other(_) => None,
            })
            .flat_map(|(material, ids)| ids.iter().map(move |id| (material.as_str(), id.as_str())))
            .filter(|(_, id)| self.template(id).is_none())
            .collect()
    }

    /// Check the mapping invariants.
    pub fn validate(&self) -> Result<()> {
        if let Some(mapping) = &self.mapping {
            if let Some((material, _)) = mapping.iter().find(|(_, v)| matches!(v, MappingValue::Other(_))) {
                return Err(Error::MappingTypeError(material.clone()));
            }
        }
        match self.dangling_mappings().first() {
            Some((material, id)) => Err(Error::corrupt(format!(
                "mapping for {material} names unknown template {id}"
            ))),
            None => Ok(()),
        }
    }
}

/// Cached catalog bound to one file.
///
/// Reads go through the cache; registration always reloads from disk
/// first. Call [`CatalogStore::invalidate`] when the document or the active
/// pack changes.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    cached: Option<Catalog>,
}

impl CatalogStore {
    /// Create a store for a catalog file. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cached: None }
    }

    /// Catalog file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached catalog, loading it on first use.
    pub fn catalog(&mut self) -> Result<&Catalog> {
        let catalog = match self.cached.take() {
            Some(catalog) => catalog,
            None => Catalog::load(&self.path)?,
        };
        Ok(self.cached.insert(catalog))
    }

    /// Drop the cached catalog.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Register a template and persist the catalog.
    ///
    /// Creates the file when missing, reloads it, applies the change and
    /// saves. On failure the file and the cache are left as they were on
    /// disk.
    pub fn register(&mut self, material_name: &str, template_id: &str, entry: TemplateEntry) -> Result<&Catalog> {
        if !self.path.exists() {
            fs::write(&self.path, b"")?;
        }
        self.cached = None;

        let mut catalog = Catalog::load(&self.path)?;
        catalog.register(material_name, template_id, entry)?;
        catalog.save(&self.path)?;
        Ok(self.cached.insert(catalog))
    }
}
