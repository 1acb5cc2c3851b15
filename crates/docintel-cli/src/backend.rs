//! Provider selection and engine assembly from configuration.

use crate::config::{Config, EmbeddingProviderKind, LlmProviderKind, DEFAULT_OLLAMA_MODEL};
use crate::error::{CliError, Result};
use docintel_domain::traits::EmbeddingModel;
use docintel_engine::DocIntel;
use docintel_llm::ollama::{DEFAULT_EMBEDDING_MODEL, DEFAULT_ENDPOINT};
use docintel_llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use docintel_llm::{AnyProvider, OllamaEmbedder, OllamaProvider, OpenAiProvider};
use docintel_store::{DocumentStore, HashingEmbedder};
use std::sync::Arc;
use tracing::debug;

/// The engine as configured from the command line.
pub type Engine = DocIntel<Embedder, AnyProvider>;

/// An embedding model chosen at runtime.
#[derive(Debug, Clone)]
pub enum Embedder {
    /// Offline feature hashing
    Hashing(HashingEmbedder),
    /// Local Ollama embeddings
    Ollama(OllamaEmbedder),
}

impl EmbeddingModel for Embedder {
    type Error = String;

    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, String> {
        match self {
            Embedder::Hashing(e) => e.embed(text).map_err(|e| e.to_string()),
            Embedder::Ollama(e) => e.embed(text).map_err(|e| e.to_string()),
        }
    }
}

/// Build the embedding model named in the configuration.
pub fn build_embedder(config: &Config) -> Result<Embedder> {
    let settings = &config.embedding;
    match settings.provider {
        EmbeddingProviderKind::Hashing => Ok(Embedder::Hashing(HashingEmbedder::new(settings.dimension))),
        EmbeddingProviderKind::Ollama => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_EMBEDDING_MODEL);
            Ok(Embedder::Ollama(OllamaEmbedder::new(endpoint, model)?))
        }
    }
}

/// Build the completion provider named in the configuration, if any.
///
/// The API key is read from the environment variable named by
/// `llm.api_key_env`; it is never stored in the config file.
pub fn build_llm(config: &Config) -> Result<Option<AnyProvider>> {
    let settings = &config.llm;
    match settings.provider {
        LlmProviderKind::None => Ok(None),
        LlmProviderKind::Ollama => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            Ok(Some(AnyProvider::Ollama(OllamaProvider::new(endpoint, model)?)))
        }
        LlmProviderKind::OpenAi => {
            let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
                CliError::Config(format!("environment variable {} is not set", settings.api_key_env))
            })?;
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_BASE_URL);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_MODEL);
            Ok(Some(AnyProvider::OpenAi(OpenAiProvider::new(endpoint, model, api_key)?)))
        }
    }
}

/// Open the document store and wire up the engine.
pub fn build_engine(config: &Config) -> Result<Engine> {
    let data_dir = config.data_dir()?;
    debug!("Opening document store at {}", data_dir.display());

    let store = Arc::new(DocumentStore::open(&data_dir)?);
    let embedder = build_embedder(config)?;
    let llm = build_llm(config)?;

    Ok(DocIntel::new(store, embedder, llm, config.engine_config()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_defaults() {
        let config = Config::default();
        assert!(build_llm(&config).unwrap().is_none());
        assert!(matches!(build_embedder(&config).unwrap(), Embedder::Hashing(_)));
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let mut config = Config::default();
        config.llm.provider = LlmProviderKind::OpenAi;
        config.llm.api_key_env = "DOCINTEL_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(matches!(build_llm(&config), Err(CliError::Config(_))));
    }

    #[test]
    fn test_engine_over_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());

        let engine = build_engine(&config).unwrap();
        let receipt = engine.ingest(b"Carrier: Speedy Transport", "rc.txt").unwrap();
        assert_eq!(engine.list().len(), 1);
        assert_eq!(
            engine.extract(receipt.id.as_str()).unwrap().carrier_name.as_deref(),
            Some("Speedy Transport")
        );
    }
}
