//! Persistent command-line settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::PackPaths;

/// Settings that persist between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Active texture pack directory
    pub texture_pack: Option<PathBuf>,
    /// Render engine used for default templates
    pub engine: String,
    pub use_pbr: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            texture_pack: None,
            engine: "cycles".to_string(),
            use_pbr: false,
        }
    }
}

impl Settings {
    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("matsync");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from file, falling back to defaults
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save settings to file
    pub fn save(&self) -> crate::Result<()> {
        let Some(path) = Self::path() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Pack paths for the configured pack, if one is set.
    ///
    /// A `//`-prefixed pack is taken relative to `document`.
    pub fn pack_paths(&self, document: Option<&Path>) -> Option<PackPaths> {
        self.texture_pack
            .as_ref()
            .map(|pack| PackPaths::resolve(&pack.to_string_lossy(), document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"use_pbr": true}"#).unwrap();
        assert!(settings.use_pbr);
        assert_eq!(settings.engine, "cycles");
        assert!(settings.pack_paths(None).is_none());
    }

    #[test]
    fn test_document_relative_pack() {
        let settings = Settings {
            texture_pack: Some(PathBuf::from("//packs/vanilla")),
            ..Default::default()
        };
        let paths = settings.pack_paths(Some(Path::new("/work/scene.json"))).unwrap();
        assert_eq!(paths.root(), Path::new("/work/packs/vanilla"));
    }
}
