use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::transmutation::{ActorId, StaleResultPolicy};

/// Main configuration structure for the transmutation client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransmuteConfig {
    /// Backend connection settings
    pub backend: BackendConfig,
    /// Who is acting
    pub session: SessionConfig,
    /// Workflow behavior
    pub workflow: WorkflowConfig,
    /// Materials catalog preview
    pub catalog: CatalogConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the alchemy backend
    pub base_url: String,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
    /// Per-request timeout
    pub request_timeout_seconds: u64,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Id of the logged-in alchemist, recorded on commits
    pub actor_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Drop a simulation result once the draft is edited away from it
    pub invalidate_stale_results: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Materials shown before the "N more" hint
    pub preview_limit: usize,
    /// Cache lifetime for the materials list
    pub cache_ttl_seconds: u64,
    /// Maximum cached responses
    pub cache_capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

impl Default for TransmuteConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:8080".to_string(),
                token: None, // Will be read from env var or .amestris-rc
                request_timeout_seconds: 30,
                rate_limit: RateLimitConfig {
                    requests_per_second: 5,
                    burst_capacity: 10,
                },
            },
            session: SessionConfig::default(),
            workflow: WorkflowConfig::default(),
            catalog: CatalogConfig {
                preview_limit: 8,
                cache_ttl_seconds: 300, // 5 minutes
                cache_capacity: 100,
            },
            observability: ObservabilityConfig::default(),
        }
    }
}

impl TransmuteConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (amestris.toml, .amestris-rc)
    /// 3. Environment variables (`AMESTRIS_` prefix, `__` between levels, e.g. `AMESTRIS_BACKEND__BASE_URL`)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("amestris.toml").exists() {
            builder = builder.add_source(File::with_name("amestris"));
        }

        if Path::new(".amestris-rc").exists() {
            builder = builder.add_source(File::with_name(".amestris-rc").format(config::FileFormat::Toml));
        }

        Self::finish(builder)
    }

    /// Load defaults, then the given file, then environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        let builder = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path));
        Self::finish(builder)
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let builder = builder.add_source(
            Environment::with_prefix("AMESTRIS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: TransmuteConfig = builder.build()?.try_deserialize()?;

        // Token can also come from the plain AMESTRIS_TOKEN variable
        if loaded.backend.token.is_none() {
            if let Ok(token) = std::env::var("AMESTRIS_TOKEN") {
                loaded.backend.token = Some(token);
            }
        }

        Ok(loaded)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn actor_id(&self) -> ActorId {
        self.session.actor_id.map(ActorId).unwrap_or(ActorId::FALLBACK)
    }

    pub fn stale_result_policy(&self) -> StaleResultPolicy {
        if self.workflow.invalidate_stale_results {
            StaleResultPolicy::Invalidate
        } else {
            StaleResultPolicy::Retain
        }
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<TransmuteConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = TransmuteConfig::load_env_file();
        TransmuteConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TransmuteConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
