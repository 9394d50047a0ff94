use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};
use zeroize::Zeroizing;

use crate::{constants::MAX_CARD_SCALE, entities::roster::Roster};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

impl AppEnvironment {
    /// Reads `APP_ENV`, defaulting to development.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackendKind {
    Memory,
    Hosted,
}

/// What happens when a user saves the same media kind twice.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    #[default]
    Overwrite,
    VersionSuffix,
}

#[derive(Deserialize, Clone)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_critique_model")]
    pub critique_model: String,

    #[serde(default = "default_video_models")]
    pub video_models: Vec<String>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub credential_file: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct BlobSettings {
    #[serde(default = "default_blob_backend")]
    pub backend: BlobBackendKind,

    #[serde(default)]
    pub token: Zeroizing<String>,

    #[serde(default = "default_blob_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub public_base_url: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub overwrite_policy: OverwritePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagingSettings {
    #[serde(default = "default_aspect_w")]
    pub aspect_w: u32,

    #[serde(default = "default_aspect_h")]
    pub aspect_h: u32,

    #[serde(default = "default_output_width")]
    pub output_width: u32,

    #[serde(default = "default_output_height")]
    pub output_height: u32,

    #[serde(default)]
    pub background: [u8; 3],

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    #[serde(default = "default_card_quality")]
    pub card_quality: u8,

    #[serde(default = "default_card_scale")]
    pub card_scale: u32,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_json_limit")]
    pub json_limit_bytes: usize,

    #[serde(default)]
    pub gemini: GeminiSettings,

    #[serde(default)]
    pub blob: BlobSettings,

    #[serde(default)]
    pub imaging: ImagingSettings,

    #[serde(default)]
    pub roster: Roster,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Fashion-King-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_json_limit() -> usize {
    15 * 1024 * 1024
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_critique_model() -> String {
    "gemini-3-pro-preview".to_string()
}
fn default_video_models() -> Vec<String> {
    vec![
        "veo-3.1-fast-generate-preview".to_string(),
        "veo-3.1-generate-preview".to_string(),
    ]
}
fn default_poll_interval() -> u64 {
    10
}
fn default_timeout() -> u64 {
    120
}
fn default_blob_backend() -> BlobBackendKind {
    BlobBackendKind::Memory
}
fn default_blob_api_url() -> String {
    "https://blob.vercel-storage.com".to_string()
}
fn default_namespace() -> String {
    "fashion-king".to_string()
}
fn default_aspect_w() -> u32 {
    2
}
fn default_aspect_h() -> u32 {
    3
}
fn default_output_width() -> u32 {
    800
}
fn default_output_height() -> u32 {
    1200
}
fn default_jpeg_quality() -> u8 {
    90
}
fn default_card_quality() -> u8 {
    85
}
fn default_card_scale() -> u32 {
    2
}

impl Default for GeminiSettings {
    fn default() -> Self {
        GeminiSettings {
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            critique_model: default_critique_model(),
            video_models: default_video_models(),
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
            credential_file: None,
        }
    }
}

impl Default for BlobSettings {
    fn default() -> Self {
        BlobSettings {
            backend: default_blob_backend(),
            token: Zeroizing::new(String::new()),
            api_url: default_blob_api_url(),
            public_base_url: String::new(),
            namespace: default_namespace(),
            overwrite_policy: OverwritePolicy::default(),
        }
    }
}

impl Default for ImagingSettings {
    fn default() -> Self {
        ImagingSettings {
            aspect_w: default_aspect_w(),
            aspect_h: default_aspect_h(),
            output_width: default_output_width(),
            output_height: default_output_height(),
            background: [0, 0, 0],
            jpeg_quality: default_jpeg_quality(),
            card_quality: default_card_quality(),
            card_scale: default_card_scale(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            json_limit_bytes: default_json_limit(),
            gemini: GeminiSettings::default(),
            blob: BlobSettings::default(),
            imaging: ImagingSettings::default(),
            roster: Roster::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let env_name = AppEnvironment::from_env()?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .with_list_parse_key("gemini.video_models")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // The hosted blob SDK convention reads this name directly
        let token = std::mem::take(&mut *config.blob.token);
        config.blob.token = Zeroizing::new(fill_or_env(token, "BLOB_READ_WRITE_TOKEN"));
        config.gemini.api_key = fill_or_env(config.gemini.api_key, "API_KEY");

        if config.blob.public_base_url.trim().is_empty() {
            config.blob.public_base_url = format!("http://{}:{}/blob", config.host, config.port);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.gemini.video_models.is_empty() {
            errors.push("GEMINI_VIDEO_MODELS must name at least one model".to_string());
        }
        if self.gemini.critique_model.trim().is_empty() {
            errors.push("GEMINI_CRITIQUE_MODEL cannot be empty".to_string());
        }
        if self.gemini.poll_interval_secs == 0 && self.env != AppEnvironment::Testing {
            errors.push("GEMINI_POLL_INTERVAL_SECS must be at least 1".to_string());
        }
        if !(1..=MAX_CARD_SCALE).contains(&self.imaging.card_scale) {
            errors.push(format!("IMAGING card scale must be within 1..={}", MAX_CARD_SCALE));
        }
        if self.imaging.aspect_w == 0 || self.imaging.aspect_h == 0 {
            errors.push("IMAGING aspect ratio must be non-zero".to_string());
        }
        if self.imaging.output_width == 0 || self.imaging.output_height == 0 {
            errors.push("IMAGING output size must be non-zero".to_string());
        }
        if !(1..=100).contains(&self.imaging.jpeg_quality) || !(1..=100).contains(&self.imaging.card_quality) {
            errors.push("IMAGING jpeg quality must be within 1..=100".to_string());
        }
        if self.blob.namespace.trim().is_empty() || self.blob.namespace.contains('/') {
            errors.push("BLOB_NAMESPACE must be a single non-empty path segment".to_string());
        }
        if self.is_production() && self.blob.backend == BlobBackendKind::Hosted && self.blob.token.trim().is_empty() {
            errors.push("BLOB_READ_WRITE_TOKEN must be set for the hosted blob backend".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn fill_or_env(current: String, env_key: &str) -> String {
    if current.trim().is_empty() {
        env::var(env_key).unwrap_or_default()
    } else {
        current
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.trim().is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &self.api_key.redact())
            .field("base_url", &self.base_url)
            .field("critique_model", &self.critique_model)
            .field("video_models", &self.video_models)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("credential_file", &self.credential_file)
            .finish()
    }
}

impl fmt::Debug for BlobSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobSettings")
            .field("backend", &self.backend)
            .field("token", &self.token.redact())
            .field("api_url", &self.api_url)
            .field("public_base_url", &self.public_base_url)
            .field("namespace", &self.namespace)
            .field("overwrite_policy", &self.overwrite_policy)
            .finish()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("json_limit_bytes", &self.json_limit_bytes)
            .field("gemini", &self.gemini)
            .field("blob", &self.blob)
            .field("imaging", &self.imaging)
            .field("roster_size", &self.roster.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_poll_interval_is_rejected_outside_tests() {
        let mut config = AppConfig::default();
        config.gemini.poll_interval_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("GEMINI_POLL_INTERVAL_SECS"));

        config.env = AppEnvironment::Testing;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blob_token_is_redacted_in_debug_output() {
        let mut config = AppConfig::default();
        config.blob.token = Zeroizing::new("vercel_blob_rw_secret".to_string());

        let printed = format!("{:?}", config);

        assert!(!printed.contains("vercel_blob_rw_secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn card_scale_must_be_bounded() {
        let mut config = AppConfig::default();
        config.imaging.card_scale = 1_000_000;
        assert!(config.validate().unwrap_err().to_string().contains("card scale"));

        config.imaging.card_scale = 0;
        assert!(config.validate().is_err());

        config.imaging.card_scale = MAX_CARD_SCALE;
        assert!(config.validate().is_ok());
    }
}
