//! User-facing operations: sync default materials, sync Vivy materials,
//! register a Vivy template.
//!
//! These validate the whole-batch preconditions, build one request per
//! material and hand them to [`run_batch`].

use std::path::Path;

use tracing::info;

use super::{
    materials_from_objects, run_batch, AssetHost, BatchReport, Interpolation, MaterialId, MaterialSynchronizer,
    ObjectId, SyncRequest, TemplatePlan, TextureSet, DEFAULT_SOURCE_NODE, VIVY_SOURCE_NODE,
};
use crate::core::{CatalogStore, LibraryIndex, PackPaths, TemplateEntry};
use crate::util::{Error, Result};

/// Engines with pixel-art friendly nearest sampling and Vivy support.
const NODE_ENGINES: &[&str] = &["cycles", "blender_eevee", "blender_eevee_next"];

fn is_node_engine(engine: &str) -> bool {
    NODE_ENGINES.contains(&engine.to_ascii_lowercase().as_str())
}

/// Inputs of "sync default materials".
#[derive(Clone, Debug)]
pub struct DefaultSyncOptions {
    pub use_pbr: bool,
    /// Render engine identifier, e.g. "cycles".
    pub engine: String,
    /// Objects remapped when the host lacks bulk remap.
    pub selection: Vec<ObjectId>,
}

impl Default for DefaultSyncOptions {
    fn default() -> Self {
        Self {
            use_pbr: false,
            engine: "cycles".to_string(),
            selection: Vec::new(),
        }
    }
}

impl DefaultSyncOptions {
    /// Library name of the default template, `default_<simple|pbr>_<engine>`.
    pub fn template_name(&self) -> String {
        let kind = if self.use_pbr { "pbr" } else { "simple" };
        format!("default_{}_{}", kind, self.engine.to_ascii_lowercase())
    }
}

/// Inputs of "sync Vivy materials".
#[derive(Clone, Debug)]
pub struct VivySyncOptions {
    /// Catalog key of the chosen template.
    pub template_id: String,
    pub engine: String,
    /// Selected objects; their materials are synced.
    pub objects: Vec<ObjectId>,
}

/// Inputs of "register template".
#[derive(Clone, Debug)]
pub struct RegisterOptions {
    /// Material being registered (the active material).
    pub material: MaterialId,
    /// Image node that holds the diffuse pass (the active node).
    pub node: String,
    pub template_id: String,
    pub description: String,
    /// Name given to `node`, recorded as the diffuse pass.
    pub diffuse_node: String,
}

fn ensure_library<H: AssetHost + ?Sized>(host: &H, library: &Path) -> Result<()> {
    if !library.is_file() {
        return Err(Error::LibraryFileMissing(library.to_path_buf()));
    }
    if host.document_path() == Some(library) {
        return Err(Error::LibraryIsOpenDocument(library.to_path_buf()));
    }
    Ok(())
}

fn discover_textures<H: AssetHost + ?Sized>(host: &H, id: MaterialId, source_node: &str) -> Result<TextureSet> {
    let graph = host
        .node_graph(id)
        .ok_or_else(|| Error::MaterialNotFound(format!("#{}", id.0)))?;
    let mut textures = TextureSet::discover(graph, source_node);
    textures.fill_from_disk();
    Ok(textures)
}

/// Replace every local material of the document with the default template.
pub fn sync_default_materials<H: AssetHost + ?Sized>(
    host: &mut H,
    index: &mut LibraryIndex,
    pack: &PackPaths,
    options: &DefaultSyncOptions,
) -> Result<BatchReport> {
    let library = pack.sync_library();
    ensure_library(host, &library)?;

    let mut plan = TemplatePlan::default_template(options.template_name());
    if is_node_engine(&options.engine) {
        plan = plan.with_interpolation(Interpolation::Closest);
    }
    info!(template = %plan.library_name, "syncing default materials");

    let synchronizer = MaterialSynchronizer::new(library);
    let materials = host.materials();
    run_batch(host, index, &synchronizer, &materials, |host, id| {
        Ok(SyncRequest {
            source: id,
            template: plan.clone(),
            textures: discover_textures(host, id, DEFAULT_SOURCE_NODE)?,
            selection: options.selection.clone(),
        })
    })
}

/// Replace the materials of the selected objects with a catalog template.
pub fn sync_vivy_materials<H: AssetHost + ?Sized>(
    host: &mut H,
    index: &mut LibraryIndex,
    catalog: &mut CatalogStore,
    pack: &PackPaths,
    options: &VivySyncOptions,
) -> Result<BatchReport> {
    if options.objects.is_empty() {
        return Err(Error::NoSelection);
    }
    let materials = materials_from_objects(host, &options.objects);
    if materials.is_empty() {
        return Err(Error::NoMaterials);
    }
    if !is_node_engine(&options.engine) {
        return Err(Error::UnsupportedEngine(options.engine.clone()));
    }

    let library = pack.vivy_library();
    ensure_library(host, &library)?;

    let entry = catalog
        .catalog()?
        .template(&options.template_id)
        .ok_or_else(|| Error::UnknownTemplate(options.template_id.clone()))?;
    let plan = TemplatePlan::vivy(entry);
    info!(template = %options.template_id, materials = materials.len(), "syncing Vivy materials");

    let synchronizer = MaterialSynchronizer::new(library);
    run_batch(host, index, &synchronizer, &materials, |host, id| {
        Ok(SyncRequest {
            source: id,
            template: plan.clone(),
            textures: discover_textures(host, id, VIVY_SOURCE_NODE)?,
            selection: options.objects.clone(),
        })
    })
}

/// Register a library material as a Vivy template.
///
/// Records the template in the catalog (reloading it from disk first) and
/// renames the chosen image node to the diffuse pass name.
pub fn register_template<H: AssetHost + ?Sized>(
    host: &mut H,
    catalog: &mut CatalogStore,
    options: &RegisterOptions,
) -> Result<()> {
    let template_id = options.template_id.trim();
    let diffuse_node = options.diffuse_node.trim();
    if template_id.is_empty() || diffuse_node.is_empty() {
        return Err(Error::InvalidName);
    }

    let material_name = host
        .material_name(options.material)
        .ok_or_else(|| Error::MaterialNotFound(format!("#{}", options.material.0)))?
        .to_string();
    if material_name.trim().is_empty() {
        return Err(Error::InvalidName);
    }

    let graph = host
        .node_graph(options.material)
        .ok_or_else(|| Error::MaterialNotFound(material_name.clone()))?;
    let node_ok = graph.node(&options.node).is_some_and(|n| n.is_image());
    if !node_ok {
        return Err(Error::MissingSourceTextureNode {
            material: material_name,
            node: options.node.clone(),
        });
    }
    if options.node != diffuse_node && graph.contains(diffuse_node) {
        return Err(Error::host(format!(
            "node name {diffuse_node} already used in {material_name}"
        )));
    }

    let entry = TemplateEntry::new(material_name.as_str(), options.description.as_str(), diffuse_node);
    catalog.register(&material_name, template_id, entry)?;

    if let Some(graph) = host.node_graph_mut(options.material) {
        graph.rename_node(&options.node, diffuse_node);
    }
    info!(template = template_id, material = %material_name, "registered template");
    Ok(())
}
