use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Main configuration for the FlashGPT server
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    /// Interface to bind
    pub server_host: String,

    /// HTTP server port
    #[validate(range(min = 1024, max = 65535))]
    pub server_port: u16,

    /// Database URL (SeaORM / SQLite)
    pub database_url: String,

    /// Maximum database connections
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,

    /// Log level (e.g., info, debug, trace)
    pub log_level: String,

    /// Frontend origin allowed by CORS; `*` allows any origin
    pub cors_origin: String,

    /// HS256 secret for session tokens
    #[validate(length(min = 32))]
    pub jwt_secret: String,

    /// Lifetime of issued session tokens, in days
    #[validate(range(min = 1, max = 365))]
    pub jwt_ttl_days: u32,

    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,

    /// ImageKit URL endpoint used for prompt-based generation
    pub imagekit_url_endpoint: String,
    pub imagekit_private_key: String,
    pub imagekit_upload_url: String,
    /// Media library folder generated images are uploaded into
    pub imagekit_folder: String,

    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,

    /// Frontend base URL used for checkout redirects
    pub client_url: String,

    /// Timeout applied to every upstream HTTP call
    #[validate(range(min = 1, max = 600))]
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load from defaults, `./flashgpt.toml` (if present) and `FLASHGPT__*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("flashgpt"))
    }

    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000)?
            .set_default("database_url", "sqlite://flashgpt.db?mode=rwc")?
            .set_default("max_connections", 10)?
            .set_default("log_level", "info")?
            .set_default("cors_origin", "*")?
            .set_default("jwt_ttl_days", 30)?
            .set_default("groq_api_key", "")?
            .set_default("groq_base_url", "https://api.groq.com/openai/v1")?
            .set_default("groq_model", "llama-3.3-70b-versatile")?
            .set_default("imagekit_url_endpoint", "")?
            .set_default("imagekit_private_key", "")?
            .set_default(
                "imagekit_upload_url",
                "https://upload.imagekit.io/api/v1/files/upload",
            )?
            .set_default("imagekit_folder", "flashgpt")?
            .set_default("stripe_secret_key", "")?
            .set_default("stripe_webhook_secret", "")?
            .set_default("stripe_api_base", "https://api.stripe.com")?
            .set_default("client_url", "http://localhost:5173")?
            .set_default("http_timeout_secs", 60)?
            .add_source(config::File::from(file).required(false))
            // Environment overrides: FLASHGPT__SERVER_PORT, FLASHGPT__GROQ_API_KEY, etc.
            .add_source(config::Environment::with_prefix("FLASHGPT").separator("__"))
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for Config {
    /// Same values as the built-in defaults of [`Config::load`]. `jwt_secret` is
    /// left empty, so the result does not validate until one is supplied.
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            database_url: "sqlite://flashgpt.db?mode=rwc".to_string(),
            max_connections: 10,
            log_level: "info".to_string(),
            cors_origin: "*".to_string(),
            jwt_secret: String::new(),
            jwt_ttl_days: 30,
            groq_api_key: String::new(),
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
            imagekit_url_endpoint: String::new(),
            imagekit_private_key: String::new(),
            imagekit_upload_url: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
            imagekit_folder: "flashgpt".to_string(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base: "https://api.stripe.com".to_string(),
            client_url: "http://localhost:5173".to_string(),
            http_timeout_secs: 60,
        }
    }
}
