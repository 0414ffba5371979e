//! Material substitution engine.
//!
//! One [`MaterialSynchronizer::synchronize`] call replaces one source
//! material with a fresh copy of a library template:
//!
//! 1. pick the library name (emissive extension first), resolve it
//! 2. append-import it and find the new material by diffing the material set
//! 3. check the template and source nodes
//! 4. copy the texture passes into the template nodes
//! 5. remap users, delete the source, give the template the source's name
//!
//! A failure between the import and the removal of the source discards the
//! imported material and leaves the source in place with its users.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info_span, warn};

use super::{AssetHost, Interpolation, MaterialId, ObjectId, Pass, TextureSet};
use crate::core::{resolve, ExtensionRule, LibraryIndex, PassSet, TemplateEntry};
use crate::util::{Error, Result};

/// Source node holding the texture of materials synced to default templates.
pub const DEFAULT_SOURCE_NODE: &str = "Diffuse Texture";

/// Template node receiving the diffuse image in default templates.
pub const DEFAULT_TEMPLATE_NODE: &str = "Default Texture";

/// Source node holding the texture of materials synced to Vivy templates.
pub const VIVY_SOURCE_NODE: &str = "Image Texture";

/// Kind of template library a sync targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateFamily {
    /// Built-in `default_<simple|pbr>_<engine>` templates.
    Default,
    /// User-registered templates described by the catalog.
    Vivy,
}

impl TemplateFamily {
    /// Node expected on source materials.
    pub fn source_node(&self) -> &'static str {
        match self {
            TemplateFamily::Default => DEFAULT_SOURCE_NODE,
            TemplateFamily::Vivy => VIVY_SOURCE_NODE,
        }
    }
}

/// Which library material to import and how its nodes are named.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplatePlan {
    pub family: TemplateFamily,
    /// Library material name, before normalization.
    pub library_name: String,
    pub passes: PassSet,
    pub extensions: Option<ExtensionRule>,
    /// Sampling mode forced on the diffuse template node.
    pub interpolation: Option<Interpolation>,
}

impl TemplatePlan {
    /// Plan for a default template.
    pub fn default_template(library_name: impl Into<String>) -> Self {
        Self {
            family: TemplateFamily::Default,
            library_name: library_name.into(),
            passes: PassSet::diffuse(DEFAULT_TEMPLATE_NODE),
            extensions: None,
            interpolation: None,
        }
    }

    /// Plan for a catalog entry.
    pub fn vivy(entry: &TemplateEntry) -> Self {
        Self {
            family: TemplateFamily::Vivy,
            library_name: entry.base_material.clone(),
            passes: entry.passes.clone(),
            extensions: entry.extensions.clone(),
            interpolation: None,
        }
    }

    /// Force a sampling mode on the diffuse node.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    /// Library name to request for a given source material.
    ///
    /// An emissive extension replaces the base name when the classifier
    /// marks the source as emissive.
    pub fn library_name_for(&self, source_name: &str, classifier: &dyn EmissiveClassifier) -> &str {
        match self.extensions.as_ref().and_then(|e| e.emissive.as_deref()) {
            Some(emissive) if classifier.is_emissive(source_name) => emissive,
            _ => &self.library_name,
        }
    }
}

/// Decides whether a material name denotes a light-emitting surface.
pub trait EmissiveClassifier {
    fn is_emissive(&self, material_name: &str) -> bool;
}

/// Classifier backed by the canonical block table.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockClassifier;

impl EmissiveClassifier for BlockClassifier {
    fn is_emissive(&self, material_name: &str) -> bool {
        block_canon::is_emissive(material_name)
    }
}

/// One material substitution to perform.
#[derive(Clone, Debug)]
pub struct SyncRequest {
    pub source: MaterialId,
    pub template: TemplatePlan,
    pub textures: TextureSet,
    /// Objects remapped when the host lacks bulk remap.
    pub selection: Vec<ObjectId>,
}

/// How far the remap reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemapCoverage {
    /// Every user of the source now uses the template.
    Complete,
    /// Only slots of the supplied selection were remapped.
    Selection { slots: usize },
}

/// Successful substitution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The imported material now standing in for the source.
    pub material: MaterialId,
    pub coverage: RemapCoverage,
}

impl SyncOutcome {
    /// Whether users outside the selection may still be unmapped.
    pub fn is_partial(&self) -> bool {
        matches!(self.coverage, RemapCoverage::Selection { .. })
    }
}

/// Result of one substitution.
pub type SyncResult = Result<SyncOutcome>;

/// Substitutes source materials with templates from one library file.
pub struct MaterialSynchronizer {
    library: PathBuf,
    classifier: Box<dyn EmissiveClassifier>,
}

impl MaterialSynchronizer {
    /// Create a synchronizer importing from `library`.
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
            classifier: Box::new(BlockClassifier),
        }
    }

    /// Replace the emissive classifier.
    pub fn with_classifier(mut self, classifier: impl EmissiveClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Library file templates are imported from.
    pub fn library(&self) -> &Path {
        &self.library
    }

    /// Library name that would be requested for a source material.
    pub fn requested_name<'p>(&self, plan: &'p TemplatePlan, source_name: &str) -> &'p str {
        plan.library_name_for(source_name, self.classifier.as_ref())
    }

    /// Perform one substitution.
    pub fn synchronize<H: AssetHost + ?Sized>(
        &self,
        host: &mut H,
        index: &mut LibraryIndex,
        request: &SyncRequest,
    ) -> SyncResult {
        let source_name = host
            .material_name(request.source)
            .ok_or_else(|| Error::MaterialNotFound(format!("#{}", request.source.0)))?
            .to_string();
        let _span = info_span!("synchronize", material = %source_name).entered();

        let wanted = self.requested_name(&request.template, &source_name);
        let names = index.ensure_loaded(&*host, &self.library)?;
        let import_name = resolve(wanted, names)
            .ok_or_else(|| Error::TemplateNotFound(wanted.to_string()))?
            .to_string();
        debug!(template = %import_name, "resolved template");

        let imported = self.import(host, &import_name, &source_name)?;

        if let Err(e) = self.transplant(host, request, &source_name, &import_name, imported) {
            Self::discard(host, imported);
            return Err(e);
        }

        let coverage = match Self::remap(host, request, imported) {
            Ok(coverage) => coverage,
            Err(e) => {
                Self::restore_users(host, request, imported);
                Self::discard(host, imported);
                return Err(e);
            }
        };

        if let Err(e) = host.remove_material(request.source) {
            Self::restore_users(host, request, imported);
            Self::discard(host, imported);
            return Err(e);
        }
        let final_name = host.rename_material(imported, &source_name)?;
        debug!(name = %final_name, ?coverage, "material synced");

        Ok(SyncOutcome { material: imported, coverage })
    }

    /// Append-import a template and identify the new material.
    fn import<H: AssetHost + ?Sized>(&self, host: &mut H, import_name: &str, source_name: &str) -> Result<MaterialId> {
        let before: HashSet<MaterialId> = host.materials().into_iter().collect();
        host.append_material(&self.library, import_name)?;
        let mut imported: Vec<MaterialId> = host
            .materials()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect();

        match imported.len() {
            0 => Err(Error::ImportFailed(source_name.to_string())),
            1 => Ok(imported[0]),
            count => {
                imported.sort();
                for id in imported {
                    if let Err(e) = host.remove_material(id) {
                        warn!(error = %e, "could not discard ambiguous import");
                    }
                }
                Err(Error::AmbiguousImport { name: import_name.to_string(), count })
            }
        }
    }

    /// Check nodes and copy textures into the imported template.
    fn transplant<H: AssetHost + ?Sized>(
        &self,
        host: &mut H,
        request: &SyncRequest,
        source_name: &str,
        import_name: &str,
        imported: MaterialId,
    ) -> Result<()> {
        let plan = &request.template;
        let diffuse_node = plan.passes.diffuse.as_str();

        let template_graph = host
            .node_graph(imported)
            .ok_or_else(|| Error::MaterialNotFound(import_name.to_string()))?;
        if !template_graph.contains(diffuse_node) {
            debug!(nodes = ?template_graph.node_names(), "template nodes");
            return Err(Error::MissingDiffuseNode {
                material: import_name.to_string(),
                node: diffuse_node.to_string(),
            });
        }

        let source_graph = host
            .node_graph(request.source)
            .ok_or_else(|| Error::MaterialNotFound(source_name.to_string()))?;
        if source_graph.is_empty() {
            return Err(Error::EmptyNodeGraph(source_name.to_string()));
        }
        let source_node = plan.family.source_node();
        if !source_graph.contains(source_node) {
            return Err(Error::MissingSourceTextureNode {
                material: source_name.to_string(),
                node: source_node.to_string(),
            });
        }

        let diffuse = request.textures.get(Pass::Diffuse).ok_or_else(|| Error::MissingTexturePass {
            material: source_name.to_string(),
            pass: Pass::Diffuse.to_string(),
        })?;

        let graph = host
            .node_graph_mut(imported)
            .ok_or_else(|| Error::MaterialNotFound(import_name.to_string()))?;
        graph.set_image(diffuse_node, diffuse);
        if let Some(interpolation) = plan.interpolation {
            graph.set_interpolation(diffuse_node, interpolation);
        }

        for (pass, node) in [(Pass::Specular, &plan.passes.specular), (Pass::Normal, &plan.passes.normal)] {
            let (Some(node), Some(image)) = (node.as_deref(), request.textures.get(pass)) else {
                continue;
            };
            if !graph.set_image(node, image) {
                debug!(%pass, node, "template has no node for pass, skipping");
            }
        }
        Ok(())
    }

    /// Remove an imported template after a failed sync.
    fn discard<H: AssetHost + ?Sized>(host: &mut H, imported: MaterialId) {
        if let Err(e) = host.remove_material(imported) {
            warn!(error = %e, "could not discard imported template");
        }
    }

    /// Point users that already moved to the template back at the source.
    fn restore_users<H: AssetHost + ?Sized>(host: &mut H, request: &SyncRequest, imported: MaterialId) {
        let restored = if host.supports_bulk_remap() {
            host.remap_users(imported, request.source)
        } else {
            host.remap_objects(imported, request.source, &request.selection).map(|_| ())
        };
        if let Err(e) = restored {
            warn!(error = %e, "could not restore users of the source material");
        }
    }

    /// Remap users, falling back to the selection on hosts without bulk remap.
    fn remap<H: AssetHost + ?Sized>(host: &mut H, request: &SyncRequest, imported: MaterialId) -> Result<RemapCoverage> {
        if host.supports_bulk_remap() {
            host.remap_users(request.source, imported)?;
            return Ok(RemapCoverage::Complete);
        }
        let slots = host.remap_objects(request.source, imported, &request.selection)?;
        warn!(slots, objects = request.selection.len(), "bulk remap unavailable, remapped selection only");
        Ok(RemapCoverage::Selection { slots })
    }
}

impl std::fmt::Debug for MaterialSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialSynchronizer")
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}
