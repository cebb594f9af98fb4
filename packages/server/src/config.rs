use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Which [`common::storage::MediaStore`] to run: `"s3"` or
    /// `"filesystem"`. Default: "filesystem".
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Root directory for the filesystem backend. Default: "./media".
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Base URL minted read URLs are rooted at (filesystem backend).
    /// Must be scheme and host only, so the bucket stays the first path
    /// segment of minted URLs. Default: "http://127.0.0.1:9000".
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,
    /// Bucket name. Default: "pawfolio".
    #[serde(default = "default_storage_bucket")]
    pub bucket: String,
    /// S3 region (s3 backend only). Default: "".
    #[serde(default)]
    pub region: String,
    /// S3 endpoint (s3 backend only). Default: "".
    #[serde(default)]
    pub endpoint: String,
    /// S3 access key (s3 backend only). Default: "".
    #[serde(default)]
    pub access_key: String,
    /// S3 secret key (s3 backend only). Default: "".
    #[serde(default)]
    pub secret_key: String,
    /// Lifetime of minted read URLs in seconds. Default: 7 days.
    #[serde(default = "default_read_url_expiry_secs")]
    pub read_url_expiry_secs: u64,
    /// Maximum accepted image size in bytes. Default: 16 MB.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
    /// Seconds between orphan-blob sweep runs. Default: 300.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Sweep attempts before an orphan entry is dropped. Default: 5.
    #[serde(default = "default_sweep_max_attempts")]
    pub sweep_max_attempts: i32,
}

fn default_storage_backend() -> String {
    "filesystem".into()
}
fn default_storage_root() -> String {
    "./media".into()
}
fn default_storage_base_url() -> String {
    "http://127.0.0.1:9000".into()
}
fn default_storage_bucket() -> String {
    "pawfolio".into()
}
fn default_read_url_expiry_secs() -> u64 {
    7 * 24 * 60 * 60
}
fn default_max_image_size() -> u64 {
    16 * 1024 * 1024
}
fn default_sweep_interval_secs() -> u64 {
    300
}
fn default_sweep_max_attempts() -> i32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            root: default_storage_root(),
            base_url: default_storage_base_url(),
            bucket: default_storage_bucket(),
            region: String::new(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            read_url_expiry_secs: default_read_url_expiry_secs(),
            max_image_size: default_max_image_size(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_max_attempts: default_sweep_max_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PAWFOLIO__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("PAWFOLIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
