//! Canonical Minecraft block names.
//!
//! Material names coming out of a scene are decorated: namespaced
//! (`minecraft:glowstone`), path-prefixed (`block/glowstone`), carrying an
//! image extension (`glowstone.png`) or a host duplication counter
//! (`glowstone.001`). [`canonical_name`] strips all of that, and [`classify`]
//! attaches the semantic tags the material tools care about.

/// Blocks whose surface emits light.
const EMISSIVE: &[&str] = &[
    "amethyst_cluster",
    "beacon",
    "blast_furnace_front_on",
    "campfire_fire",
    "campfire_log_lit",
    "crying_obsidian",
    "end_rod",
    "fire",
    "fire_0",
    "fire_1",
    "furnace_front_on",
    "glow_item_frame",
    "glow_lichen",
    "glowstone",
    "jack_o_lantern",
    "lantern",
    "lava",
    "lava_flow",
    "lava_still",
    "magma",
    "magma_block",
    "ochre_froglight_side",
    "ochre_froglight_top",
    "pearlescent_froglight_side",
    "pearlescent_froglight_top",
    "redstone_lamp_on",
    "redstone_torch",
    "respawn_anchor_top",
    "sea_lantern",
    "sea_pickle",
    "shroomlight",
    "smoker_front_on",
    "soul_campfire_fire",
    "soul_campfire_log_lit",
    "soul_fire",
    "soul_fire_0",
    "soul_fire_1",
    "soul_lantern",
    "soul_torch",
    "torch",
    "verdant_froglight_side",
    "verdant_froglight_top",
    "wall_torch",
];

/// Blocks rendered with see-through texels.
const TRANSPARENT: &[&str] = &[
    "glass",
    "glass_pane_top",
    "ice",
    "frosted_ice",
    "slime_block",
    "honey_block_side",
    "honey_block_top",
    "tinted_glass",
];

const WATER: &[&str] = &["water", "water_flow", "water_still", "water_overlay"];

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".tga"];

/// Semantic tag attached to a canonical block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Surface emits light.
    Emissive,
    /// Texels may be partially transparent.
    Transparent,
    /// Water surfaces.
    Water,
}

/// Result of classifying a material name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Canonical block identifier, lowercase and undecorated.
    pub canonical: String,
    /// Tags that apply to the block.
    pub tags: Vec<Tag>,
}

impl Classification {
    /// Check whether a tag applies.
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Shortcut for the emissive tag.
    pub fn is_emissive(&self) -> bool {
        self.has(Tag::Emissive)
    }
}

/// Strip namespaces, path prefixes, image extensions and duplication
/// counters from a material name.
pub fn canonical_name(name: &str) -> String {
    let mut name = name.trim().to_ascii_lowercase();

    loop {
        let before = name.len();
        if let Some(stripped) = strip_counter(&name) {
            name = stripped.to_string();
        }
        for ext in IMAGE_EXTENSIONS {
            if let Some(stripped) = name.strip_suffix(ext) {
                if !stripped.is_empty() {
                    name = stripped.to_string();
                }
            }
        }
        if name.len() == before {
            break;
        }
    }

    if let Some(idx) = name.rfind(':') {
        name = name[idx + 1..].to_string();
    }
    if let Some(idx) = name.rfind('/') {
        name = name[idx + 1..].to_string();
    }
    name
}

/// Classify a (possibly decorated) material name.
pub fn classify(name: &str) -> Classification {
    let canonical = canonical_name(name);
    let mut tags = Vec::new();

    if EMISSIVE.contains(&canonical.as_str()) {
        tags.push(Tag::Emissive);
    }
    if TRANSPARENT.contains(&canonical.as_str()) || canonical.ends_with("_stained_glass") {
        tags.push(Tag::Transparent);
    }
    if WATER.contains(&canonical.as_str()) {
        tags.push(Tag::Water);
    }

    Classification { canonical, tags }
}

/// Convenience check used when choosing emissive template variants.
pub fn is_emissive(name: &str) -> bool {
    classify(name).is_emissive()
}

fn strip_counter(name: &str) -> Option<&str> {
    let (head, tail) = name.rsplit_once('.')?;
    if head.is_empty() || tail.len() != 3 || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(head)
}
