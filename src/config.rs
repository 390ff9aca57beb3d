// Engine configuration, loadable from a JSON file or built directly from
// parsed CLI flags.

use crate::engine::EngineFlags;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub primary_dict: PathBuf,
    #[serde(default)]
    pub transcription: Option<PathBuf>,
    #[serde(default)]
    pub supplemental: Vec<PathBuf>,
    #[serde(default = "default_true")]
    pub expand_precomposed: bool,
    #[serde(default)]
    pub upper_lower: bool,
    #[serde(default)]
    pub has_compounds: bool,
    #[serde(default)]
    pub has_composition: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn from_json_file(path: &Path) -> std::io::Result<Config> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn flags(&self) -> EngineFlags {
        let mut flags = EngineFlags::empty();
        if self.expand_precomposed {
            flags |= EngineFlags::EXPAND_PRECOMPOSED;
        }
        if self.upper_lower {
            flags |= EngineFlags::UPPER_LOWER;
        }
        if self.has_compounds {
            flags |= EngineFlags::HAS_COMPOUNDS;
        }
        if self.has_composition {
            flags |= EngineFlags::HAS_COMPOSITION;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let config = Config {
            primary_dict: PathBuf::from("dict.txt"),
            transcription: Some(PathBuf::from("rules.txt")),
            supplemental: vec![PathBuf::from("extra.txt")],
            expand_precomposed: true,
            upper_lower: false,
            has_compounds: true,
            has_composition: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{"primary_dict": "dict.txt"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.expand_precomposed);
        assert!(config.supplemental.is_empty());
        assert_eq!(config.transcription, None);
    }
}
