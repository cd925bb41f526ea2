//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{endpoints, temperatures, timeouts};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM backend configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Session lifetime configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Document storage configuration
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_session()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port must be non-zero".to_string(),
            });
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.model".to_string(),
                message: "Model name must not be empty".to_string(),
            });
        }

        if !llm.endpoint.starts_with("http://") && !llm.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "llm.endpoint".to_string(),
                message: format!("Must be an http(s) URL, got {}", llm.endpoint),
            });
        }

        for (field, value) in [
            ("llm.generation_temperature", llm.generation_temperature),
            ("llm.extraction_temperature", llm.extraction_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 2.0, got {}", value),
                });
            }
        }

        if llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.timeout_secs".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.session.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.cleanup_interval_secs".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.session.cleanup_interval_secs > self.session.timeout_secs {
            tracing::warn!(
                "session.cleanup_interval_secs ({}) exceeds session.timeout_secs ({}), \
                 expired sessions may linger",
                self.session.cleanup_interval_secs,
                self.session.timeout_secs
            );
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS restrictions (false allows every origin)
    #[serde(default)]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest accepted document upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: false,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// LLM backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Ollama model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Maximum tokens to generate (None = model default)
    #[serde(default)]
    pub max_tokens: Option<usize>,

    /// How long Ollama keeps the model loaded between calls
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,

    /// Transport-level retries for network failures
    #[serde(default)]
    pub max_retries: u32,

    /// Temperature for answer generation and intent classification
    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f32,

    /// Temperature for name and excerpt extraction
    #[serde(default = "default_extraction_temperature")]
    pub extraction_temperature: f32,
}

fn default_model() -> String {
    endpoints::OLLAMA_MODEL_DEFAULT.to_string()
}

fn default_endpoint() -> String {
    std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| endpoints::OLLAMA_DEFAULT.to_string())
}

fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}

fn default_keep_alive() -> String {
    "5m".to_string()
}

fn default_generation_temperature() -> f32 {
    temperatures::GENERATION
}

fn default_extraction_temperature() -> f32 {
    temperatures::EXTRACTION
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_llm_timeout(),
            max_tokens: None,
            keep_alive: default_keep_alive(),
            max_retries: 0,
            generation_temperature: default_generation_temperature(),
            extraction_temperature: default_extraction_temperature(),
        }
    }
}

/// Session lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle seconds before a session expires
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,

    /// Seconds between background cleanup sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_session_timeout() -> u64 {
    timeouts::SESSION_IDLE_SECS
}

fn default_cleanup_interval() -> u64 {
    timeouts::SESSION_CLEANUP_SECS
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Document storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Directory holding documents for the console harness
    #[serde(default = "default_documents_path")]
    pub path: String,
}

fn default_documents_path() -> String {
    "./documents".to_string()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            path: default_documents_path(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` in the working directory.
///
/// Priority: env vars > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(
    dir: impl AsRef<Path>,
    env: Option<&str>,
) -> Result<Settings, ConfigError> {
    let dir = dir.as_ref();
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::from(dir.join("default")).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("CONCIERGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.llm.model, "llama3.2");
        assert_eq!(settings.session.timeout_secs, 3600);
        assert_eq!(settings.llm.generation_temperature, 0.7);
        assert_eq!(settings.llm.extraction_temperature, 0.3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_temperature_validation() {
        let mut settings = Settings::default();
        settings.llm.extraction_temperature = 2.5;
        match settings.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "llm.extraction_temperature")
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut settings = Settings::default();
        settings.llm.model = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_session_timeout_rejected() {
        let mut settings = Settings::default();
        settings.session.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("default.yaml")).unwrap();
        writeln!(
            file,
            "server:\n  port: 9100\nllm:\n  model: mistral\nsession:\n  timeout_secs: 60\n  cleanup_interval_secs: 30"
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.llm.model, "mistral");
        assert_eq!(settings.session.timeout(), Duration::from_secs(60));
        // Untouched sections keep their defaults
        assert_eq!(settings.documents.path, "./documents");
    }

    #[test]
    fn test_env_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.yaml"), "server:\n  port: 9100\n").unwrap();
        std::fs::write(dir.path().join("staging.yaml"), "server:\n  port: 9200\n").unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.server.port, 9200);
    }

    #[test]
    fn test_invalid_file_value_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.yaml"), "server:\n  port: 0\n").unwrap();
        assert!(load_settings_from(dir.path(), None).is_err());
    }

    #[test]
    fn test_settings_yaml_roundtrip_shape() {
        let yaml = serde_yaml::to_string(&Settings::default()).unwrap();
        assert!(yaml.contains("generation_temperature"));
        assert!(yaml.contains("cleanup_interval_secs"));
    }
}
