//! matsync CLI - Sync scene materials with template libraries.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use matsync::core::{Catalog, CatalogStore, LibraryIndex, LibrarySource, PackPaths};
use matsync::material::{
    register_template, sync_default_materials, sync_vivy_materials, AssetHost, BatchReport, DefaultSyncOptions,
    ObjectId, RegisterOptions, SceneDocument, VivySyncOptions,
};
use matsync::settings::Settings;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "MATSYNC_LOG";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let settings = Settings::load();
    let rest = &filtered_args[1..];
    let result = match filtered_args[0] {
        "sync-default" | "sd" => cmd_sync_default(rest, &settings),
        "sync-vivy" | "sv" => cmd_sync_vivy(rest, &settings),
        "register" | "r" => cmd_register(rest, &settings),
        "catalog" | "c" => cmd_catalog(rest, &settings),
        "library" | "l" => cmd_library(rest, &settings),
        "config" => cmd_config(rest, settings),
        "version" | "-V" | "--version" => {
            println!("matsync {} (built {})", env!("CARGO_PKG_VERSION"), env!("MATSYNC_BUILD_DATE"));
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn print_help() {
    println!("matsync - Sync scene materials with template libraries");
    println!();
    println!("USAGE:");
    println!("    matsync [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    sd, sync-default <scene>      Replace all materials with the default template");
    println!("    sv, sync-vivy    <scene>      Replace materials of objects with a Vivy template");
    println!("    r,  register     <library>    Register a library material in the Vivy catalog");
    println!("    c,  catalog                   List Vivy catalog templates and mappings");
    println!("    l,  library                   List materials of a template library");
    println!("        config                    Show or change saved settings");
    println!("        version                   Show version");
    println!("    h,  help                      Show this help");
    println!();
    println!("COMMAND OPTIONS:");
    println!("    --pack <dir>         Texture pack directory (default: saved setting)");
    println!("    --engine <name>      Render engine, e.g. cycles, blender_eevee");
    println!("    --pbr / --no-pbr     Use PBR default templates");
    println!("    --template <id>      Vivy catalog template id");
    println!("    --objects <a,b>      Objects to sync (default: all objects)");
    println!("    --material <name>    Material to register");
    println!("    --node <name>        Image node holding the diffuse pass");
    println!("    --diffuse <name>     New name of that node (default: Diffuse)");
    println!("    --desc <text>        Template description");
    println!("    --vivy               List the Vivy library instead of the default one");
    println!("    --no-bulk-remap      Only remap users on the given objects");
    println!("    -o, --output <file>  Write the document here instead of in place");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}       Log filter, overrides -v/-q (e.g. matsync=debug)", LOG_ENV);
    println!();
    println!("EXAMPLES:");
    println!("    matsync config --pack ~/packs/vanilla --engine cycles");
    println!("    matsync sync-default scene.json --pbr");
    println!("    matsync sync-vivy scene.json --template glass_vivy --objects Window,Door");
    println!("    matsync register vivy_materials.blend --material Glass --node \"Image Texture\" --template glass_vivy");
}

/// Value following one of `names`, if present.
fn opt<'a>(args: &[&'a str], names: &[&str]) -> Option<&'a str> {
    args.iter()
        .position(|a| names.contains(a))
        .and_then(|i| args.get(i + 1).copied())
}

fn flag(args: &[&str], names: &[&str]) -> bool {
    args.iter().any(|a| names.contains(a))
}

/// First argument, required to be a positional file path.
fn positional<'a>(args: &[&'a str], what: &str) -> Result<&'a str> {
    match args.first() {
        Some(arg) if !arg.starts_with('-') => Ok(arg),
        _ => bail!("missing {} argument", what),
    }
}

fn pack_paths(args: &[&str], settings: &Settings, document: Option<&Path>) -> Result<PackPaths> {
    match opt(args, &["--pack"]) {
        Some(pack) => Ok(PackPaths::resolve(pack, document)),
        None => settings
            .pack_paths(document)
            .ok_or_else(|| anyhow!("no texture pack set, pass --pack or run `matsync config --pack <dir>`")),
    }
}

fn open_document(path: &str) -> Result<SceneDocument> {
    SceneDocument::open(Path::new(path)).with_context(|| format!("failed to open {}", path))
}

fn save_document(doc: &SceneDocument, args: &[&str], input: &str) -> Result<()> {
    let out = PathBuf::from(opt(args, &["-o", "--output"]).unwrap_or(input));
    doc.save(&out).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::debug!(path = %out.display(), "document written");
    Ok(())
}

/// Objects named by `--objects`, or every object of the document.
fn selected_objects(doc: &SceneDocument, args: &[&str]) -> Result<Vec<ObjectId>> {
    let Some(list) = opt(args, &["--objects"]) else {
        return Ok(doc.objects().iter().map(|o| o.id).collect());
    };
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| doc.find_object(name).ok_or_else(|| anyhow!("object not found: {}", name)))
        .collect()
}

fn print_report(report: &BatchReport) {
    for (material, error) in &report.failed {
        println!("  {}: {}", material, error);
    }
    println!("{}", report.summary());
}

fn cmd_sync_default(args: &[&str], settings: &Settings) -> Result<()> {
    let input = positional(args, "scene")?;
    let mut doc = open_document(input)?;
    if flag(args, &["--no-bulk-remap"]) {
        doc = doc.with_bulk_remap(false);
    }
    let pack = pack_paths(args, settings, doc.document_path())?;

    let options = DefaultSyncOptions {
        use_pbr: if flag(args, &["--no-pbr"]) { false } else { flag(args, &["--pbr"]) || settings.use_pbr },
        engine: opt(args, &["--engine"]).unwrap_or(settings.engine.as_str()).to_string(),
        selection: selected_objects(&doc, args)?,
    };

    let mut index = LibraryIndex::new();
    let report = sync_default_materials(&mut doc, &mut index, &pack, &options)?;
    print_report(&report);
    if !report.is_noop() {
        save_document(&doc, args, input)?;
    }
    Ok(())
}

fn cmd_sync_vivy(args: &[&str], settings: &Settings) -> Result<()> {
    let input = positional(args, "scene")?;
    let template_id = opt(args, &["--template"]).ok_or_else(|| anyhow!("missing --template"))?;
    let mut doc = open_document(input)?;
    if flag(args, &["--no-bulk-remap"]) {
        doc = doc.with_bulk_remap(false);
    }
    let pack = pack_paths(args, settings, doc.document_path())?;

    let options = VivySyncOptions {
        template_id: template_id.to_string(),
        engine: opt(args, &["--engine"]).unwrap_or(settings.engine.as_str()).to_string(),
        objects: selected_objects(&doc, args)?,
    };

    let mut index = LibraryIndex::new();
    let mut catalog = CatalogStore::new(pack.vivy_catalog());
    let report = sync_vivy_materials(&mut doc, &mut index, &mut catalog, &pack, &options)?;
    print_report(&report);
    if !report.is_noop() {
        save_document(&doc, args, input)?;
    }
    Ok(())
}

fn cmd_register(args: &[&str], settings: &Settings) -> Result<()> {
    let input = positional(args, "library")?;
    let mut doc = open_document(input)?;
    let pack = pack_paths(args, settings, doc.document_path())?;

    let material_name = opt(args, &["--material"]).ok_or_else(|| anyhow!("missing --material"))?;
    let material = doc
        .find_material(material_name)
        .ok_or_else(|| anyhow!("material not found: {}", material_name))?;
    let options = RegisterOptions {
        material,
        node: opt(args, &["--node"]).ok_or_else(|| anyhow!("missing --node"))?.to_string(),
        template_id: opt(args, &["--template"]).ok_or_else(|| anyhow!("missing --template"))?.to_string(),
        description: opt(args, &["--desc"]).unwrap_or_default().to_string(),
        diffuse_node: opt(args, &["--diffuse"]).unwrap_or("Diffuse").to_string(),
    };

    let mut catalog = CatalogStore::new(pack.vivy_catalog());
    register_template(&mut doc, &mut catalog, &options)?;
    save_document(&doc, args, input)?;
    println!("Registered {} as {}", material_name, options.template_id);
    Ok(())
}

fn cmd_catalog(args: &[&str], settings: &Settings) -> Result<()> {
    let pack = pack_paths(args, settings, None)?;
    let path = pack.vivy_catalog();
    let catalog = Catalog::load(&path).with_context(|| format!("failed to read {}", path.display()))?;

    println!("Catalog: {}", path.display());
    println!();
    println!("Templates ({}):", catalog.len());
    for (id, entry) in catalog.templates() {
        let desc = if entry.description.is_empty() { String::new() } else { format!(" - {}", entry.description) };
        println!("  {} -> {}{}", id, entry.base_material, desc);
        println!("    diffuse: {}", entry.passes.diffuse);
        if let Some(node) = &entry.passes.specular {
            println!("    specular: {}", node);
        }
        if let Some(node) = &entry.passes.normal {
            println!("    normal: {}", node);
        }
        if let Some(emissive) = entry.emissive_template() {
            println!("    emissive: {}", emissive);
        }
    }

    if let Some(mapping) = &catalog.mapping {
        println!();
        println!("Mappings ({}):", mapping.len());
        for material in mapping.keys() {
            match catalog.registered_templates(material) {
                Ok(ids) => println!("  {} -> {}", material, ids.join(", ")),
                Err(e) => println!("  {} -> <{}>", material, e),
            }
        }
    }

    if let Err(e) = catalog.validate() {
        println!();
        println!("Warning: {}", e);
    }
    Ok(())
}

fn cmd_library(args: &[&str], settings: &Settings) -> Result<()> {
    let pack = pack_paths(args, settings, None)?;
    let library = if flag(args, &["--vivy"]) { pack.vivy_library() } else { pack.sync_library() };

    let host = SceneDocument::new();
    let Some(mut names) = host.library_materials(&library)? else {
        bail!("library file not found: {}", library.display());
    };
    names.sort();

    println!("Library: {}", library.display());
    println!();
    for name in &names {
        println!("  {}", name);
    }
    println!();
    println!("Total materials: {}", names.len());
    Ok(())
}

fn cmd_config(args: &[&str], mut settings: Settings) -> Result<()> {
    let mut changed = false;
    if let Some(pack) = opt(args, &["--pack"]) {
        settings.texture_pack = Some(PathBuf::from(pack));
        changed = true;
    }
    if let Some(engine) = opt(args, &["--engine"]) {
        settings.engine = engine.to_string();
        changed = true;
    }
    if flag(args, &["--pbr"]) {
        settings.use_pbr = true;
        changed = true;
    } else if flag(args, &["--no-pbr"]) {
        settings.use_pbr = false;
        changed = true;
    }
    if changed {
        settings.save()?;
    }

    if let Some(path) = Settings::path() {
        println!("Settings: {}", path.display());
    }
    match &settings.texture_pack {
        Some(pack) => println!("  texture pack: {}", pack.display()),
        None => println!("  texture pack: <not set>"),
    }
    println!("  engine: {}", settings.engine);
    println!("  use pbr: {}", settings.use_pbr);
    Ok(())
}
