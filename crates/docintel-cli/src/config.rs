//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use docintel_engine::EngineConfig;
use docintel_extractor::ExtractorConfig;
use docintel_rag::RagConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default environment variable holding the model API key
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default Ollama chat model
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion provider
    pub llm: LlmSettings,

    /// Embedding provider
    pub embedding: EmbeddingSettings,

    /// Document storage
    pub storage: StorageSettings,

    /// Chunking, retrieval and answering
    pub rag: RagConfig,

    /// Field extraction
    pub extraction: ExtractorConfig,

    /// Output settings
    pub settings: Settings,
}

/// Which completion provider to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// No model; keyword answers and regex extraction
    #[default]
    None,
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible API (Groq by default)
    OpenAi,
}

/// Completion provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider kind
    pub provider: LlmProviderKind,

    /// Base URL; provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model name; provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

/// Which embedding provider to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Offline feature hashing
    #[default]
    Hashing,
    /// Local Ollama server
    Ollama,
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider kind
    pub provider: EmbeddingProviderKind,

    /// Base URL for Ollama
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Ollama embedding model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Vector size for the hashing embedder
    pub dimension: usize,
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for document blobs; `~/.docintel/data` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the config file and default data directory.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".docintel"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.engine_config().validate().map_err(CliError::Config)?;
        if self.embedding.dimension == 0 {
            return Err(CliError::Config("embedding.dimension must be greater than 0".into()));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(CliError::Config("llm.api_key_env must not be empty".into()));
        }
        Ok(())
    }

    /// Directory for document blobs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::home()?.join("data")),
        }
    }

    /// Pipeline settings for the engine.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            rag: self.rag.clone(),
            extraction: self.extraction.clone(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::None,
            endpoint: None,
            model: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Hashing,
            endpoint: None,
            model: None,
            dimension: docintel_store::embedding::DEFAULT_DIMENSION,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, LlmProviderKind::None);
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.embedding.dimension, 384);
        assert!(config.settings.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            provider = "openai"

            [rag]
            top_k = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.provider, LlmProviderKind::OpenAi);
        assert_eq!(config.rag.top_k, 5);
        assert_eq!(config.rag.chunk_size, 500);
        assert_eq!(config.extraction, ExtractorConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().join("data"));
        config.llm.provider = LlmProviderKind::Ollama;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[rag]\nchunk_size = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("api_key_env"));
        assert!(!text.contains("api_key ="));
    }
}
