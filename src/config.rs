use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ProcessorError;

/// What narrow encodes do with ids that do not fit in 16 bits.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NarrowOverflow {
    /// Keep the low 16 bits (`id mod 65536`).
    #[default]
    Wrap,
    /// Fail the encode with `OUT_OF_RANGE`.
    Reject,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    pub narrow_overflow: NarrowOverflow,
    // Reserved-token spellings, consulted when the model itself does not declare one.
    pub unk_piece: Option<String>,
    pub bos_piece: Option<String>,
    pub eos_piece: Option<String>,
    pub pad_piece: Option<String>,
}

impl ProcessorConfig {
    pub fn load(config_path: &str) -> Result<Self, ProcessorError> {
        if !Path::new(config_path).exists() {
            return Err(ProcessorError::Config(format!("Config file not found at: {}", config_path)));
        }

        let mut file = File::open(config_path)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        Self::from_json_slice(&contents)
            .map_err(|e| ProcessorError::Config(format!("{} ({})", e, config_path)))
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ProcessorError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ProcessorError::Config(format!("Failed to deserialize processor config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_wraps() {
        let config = ProcessorConfig::default();
        assert_eq!(config.narrow_overflow, NarrowOverflow::Wrap);
        assert!(config.unk_piece.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = ProcessorConfig::from_json_slice(br#"{ "narrow_overflow": "reject", "bos_piece": "<bos>" }"#)
            .expect("valid config");
        assert_eq!(config.narrow_overflow, NarrowOverflow::Reject);
        assert_eq!(config.bos_piece.as_deref(), Some("<bos>"));
        assert!(config.eos_piece.is_none());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = ProcessorConfig::from_json_slice(br#"{ "narrow": "wrap" }"#);
        assert!(matches!(result, Err(ProcessorError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "pad_piece": "[PAD]" }}"#).expect("write config");
        let path = file.path().to_str().expect("utf-8 temp path").to_string();

        let config = ProcessorConfig::load(&path).expect("config loads");
        assert_eq!(config.pad_piece.as_deref(), Some("[PAD]"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ProcessorConfig::load("definitely_missing_processor_config.json");
        match result {
            Err(ProcessorError::Config(msg)) => assert!(msg.contains("Config file not found")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }
}
