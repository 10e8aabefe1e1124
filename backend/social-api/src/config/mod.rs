use serde::Deserialize;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5001;

/// Process configuration, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub clerk: ClerkConfig,
    pub arcjet: ArcjetConfig,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// No default; startup fails when unset.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ClerkConfig {
    pub secret_key: Option<String>,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct ArcjetConfig {
    pub key: Option<String>,
    pub base_url: String,
    pub timeout_ms: u64,
    pub rate_limit: TokenBucketConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketConfig {
    pub refill_rate: u32,
    pub interval_secs: u32,
    pub capacity: u32,
}

impl Default for TokenBucketConfig {
    fn default() -> Self {
        Self {
            refill_rate: 10,
            interval_secs: 10,
            capacity: 15,
        }
    }
}

/// Flat view of the environment as the `config` crate sees it
/// (`DATABASE_URL` becomes `database_url`, and so on).
#[derive(Debug, Deserialize)]
struct RawEnv {
    database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,
    #[serde(default = "default_host")]
    host: String,
    port: Option<u16>,
    node_env: Option<String>,
    app_env: Option<String>,
    clerk_secret_key: Option<String>,
    #[serde(default = "default_clerk_api_url")]
    clerk_api_url: String,
    arcjet_key: Option<String>,
    #[serde(default = "default_arcjet_base_url")]
    arcjet_base_url: String,
    #[serde(default = "default_arcjet_timeout_ms")]
    arcjet_timeout_ms: u64,
    rate_limit_refill_rate: Option<u32>,
    rate_limit_interval_secs: Option<u32>,
    rate_limit_capacity: Option<u32>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_clerk_api_url() -> String {
    "https://api.clerk.com/v1".to_string()
}

fn default_arcjet_base_url() -> String {
    "https://decide.arcjet.com".to_string()
}

fn default_arcjet_timeout_ms() -> u64 {
    1000
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Read `.env` (if present) and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env(config::Environment::default())
    }

    pub fn from_env(source: config::Environment) -> anyhow::Result<Self> {
        let raw: RawEnv = config::Config::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()?;

        let bucket_defaults = TokenBucketConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: raw.host,
                port: raw.port.unwrap_or(DEFAULT_PORT),
            },
            database: DatabaseConfig {
                url: non_empty(raw.database_url),
                max_connections: raw.database_max_connections,
            },
            clerk: ClerkConfig {
                secret_key: non_empty(raw.clerk_secret_key),
                api_url: raw.clerk_api_url.trim_end_matches('/').to_string(),
            },
            arcjet: ArcjetConfig {
                key: non_empty(raw.arcjet_key),
                base_url: raw.arcjet_base_url.trim_end_matches('/').to_string(),
                timeout_ms: raw.arcjet_timeout_ms,
                rate_limit: TokenBucketConfig {
                    refill_rate: raw.rate_limit_refill_rate.unwrap_or(bucket_defaults.refill_rate),
                    interval_secs: raw
                        .rate_limit_interval_secs
                        .unwrap_or(bucket_defaults.interval_secs),
                    capacity: raw.rate_limit_capacity.unwrap_or(bucket_defaults.capacity),
                },
            },
            environment: non_empty(raw.node_env)
                .or(non_empty(raw.app_env))
                .unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
