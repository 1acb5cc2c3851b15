//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Default prompt budget in characters
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 10_000;

/// Default sampling temperature for extraction
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default completion budget for extraction
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Document characters sent to the model before truncation
    pub max_prompt_chars: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token budget
    pub max_tokens: u32,

    /// Try the model before the regex cascade
    pub use_model: bool,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_prompt_chars == 0 {
            return Err("max_prompt_chars must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Parse from a TOML fragment
    pub fn from_toml(s: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(s).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            use_model: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_prompt_chars, 10_000);
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_invalid_values() {
        let config = ExtractorConfig {
            max_prompt_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExtractorConfig {
            temperature: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = ExtractorConfig::from_toml("use_model = false").unwrap();
        assert!(!config.use_model);
        assert_eq!(config.max_prompt_chars, DEFAULT_MAX_PROMPT_CHARS);

        let text = config.to_toml().unwrap();
        assert_eq!(ExtractorConfig::from_toml(&text).unwrap(), config);
    }
}
