//! Configuration management for staffdesk.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (staffdesk.yaml)
//!
//! Configuration covers the data sources (workload table, timetable table,
//! policy text), the semantic index directory, and the embedding and
//! generation provider settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workload table (staff assignments)
    pub workload_file: PathBuf,

    /// Path to the timetable table (scheduled sessions)
    pub timetable_file: PathBuf,

    /// Path to the free-text policy document
    pub policies_file: PathBuf,

    /// Directory holding the persisted semantic index artifacts
    pub index_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Generation service settings
    pub generation: GenerationSettings,

    /// Number of policy chunks retrieved per policy query
    pub top_k: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "lexical" (offline, deterministic) or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Endpoint for remote providers
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "lexical".to_string(),
            model: "lexical-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Generation service settings.
///
/// The generation service is a strictly optional refinement layer; provider
/// "none" disables it and the engine answers with templated narratives only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Provider name: "ollama" or "none"
    pub provider: String,

    /// Endpoint for the provider API
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in milliseconds (single attempt, no retries)
    pub timeout_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    data: Option<DataConfig>,
    index: Option<IndexConfig>,
    embedding: Option<EmbeddingSettings>,
    generation: Option<GenerationSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataConfig {
    workload: Option<String>,
    timetable: Option<String>,
    policies: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexConfig {
    dir: Option<String>,
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workload_file: PathBuf::from("faculty_workload.csv"),
            timetable_file: PathBuf::from("timetable.csv"),
            policies_file: PathBuf::from("policies.txt"),
            index_dir: PathBuf::from(".staffdesk/index"),
            config_file: None,
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
            top_k: 3,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `STAFFDESK_CONFIG`: Path to config file
    /// - `STAFFDESK_GEN_PROVIDER`: Generation provider ("ollama", "none")
    /// - `STAFFDESK_EMBED_PROVIDER`: Embedding provider ("lexical", "ollama")
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("STAFFDESK_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("staffdesk.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("STAFFDESK_GEN_PROVIDER") {
            config.generation.provider = provider;
        }

        if let Ok(provider) = std::env::var("STAFFDESK_EMBED_PROVIDER") {
            config.embedding.provider = provider;
        }

        // Only when set; an absent RUST_LOG must not erase a level from
        // the config file.
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(data) = config_file.data {
            if let Some(workload) = data.workload {
                result.workload_file = PathBuf::from(workload);
            }
            if let Some(timetable) = data.timetable {
                result.timetable_file = PathBuf::from(timetable);
            }
            if let Some(policies) = data.policies {
                result.policies_file = PathBuf::from(policies);
            }
        }

        if let Some(index) = config_file.index {
            if let Some(dir) = index.dir {
                result.index_dir = PathBuf::from(dir);
            }
            if let Some(top_k) = index.top_k {
                result.top_k = top_k;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and files.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        gen_provider: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = gen_provider {
            self.generation.provider = provider;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Ensure the index directory exists.
    pub fn ensure_index_dir(&self) -> AppResult<()> {
        if !self.index_dir.exists() {
            std::fs::create_dir_all(&self.index_dir).map_err(|e| {
                AppError::Config(format!("Failed to create index directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_gen = ["ollama", "none"];
        if !known_gen.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generation provider: {}. Supported: {}",
                self.generation.provider,
                known_gen.join(", ")
            )));
        }

        let known_embed = ["lexical", "ollama"];
        if !known_embed.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embed.join(", ")
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "top_k must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation.provider, "none");
        assert_eq!(config.embedding.provider, "lexical");
        assert_eq!(config.top_k, 3);
        assert!(!config.verbose);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden =
            config.with_overrides(None, Some("ollama".to_string()), None, true, false);

        assert_eq!(overridden.generation.provider, "ollama");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.generation.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_log_level_survives_unset_rust_log() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: debug\n").unwrap();

        std::env::remove_var("RUST_LOG");
        std::env::set_var("STAFFDESK_CONFIG", file.path());
        let config = AppConfig::load().unwrap();
        std::env::remove_var("STAFFDESK_CONFIG");

        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data:\n  workload: data/workload.csv\nindex:\n  top_k: 5\ngeneration:\n  provider: ollama\n  endpoint: http://localhost:11434\n  model: llama3.2\n  timeout_ms: 5000\n"
        )
        .unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&file.path().to_path_buf()).unwrap();

        assert_eq!(merged.workload_file, PathBuf::from("data/workload.csv"));
        assert_eq!(merged.top_k, 5);
        assert_eq!(merged.generation.provider, "ollama");
        assert_eq!(merged.generation.timeout_ms, 5000);
    }
}
