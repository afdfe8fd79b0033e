use serde::Deserialize;
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Top-level configuration shared across slices.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub credits: CreditsConfig,
    pub ai: AiConfig,
    pub log: LogConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl ApiConfig {
    /// Checks cross-field rules `serde` cannot express.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending key.
    pub fn validate(&self) -> Result<(), Cow<'static, str>> {
        if self.security.jwt.secret.chars().count() < MIN_JWT_SECRET_LEN {
            return Err(format!(
                "security.jwt.secret must be at least {MIN_JWT_SECRET_LEN} characters"
            )
            .into());
        }
        if self.security.jwt.access_ttl_minutes == 0 || self.security.jwt.refresh_ttl_days == 0 {
            return Err("security.jwt token lifetimes must be positive".into());
        }
        if self.credits.recommendation_cost <= 0 {
            return Err("credits.recommendation_cost must be positive".into());
        }
        if self.credits.initial < 0 {
            return Err("credits.initial cannot be negative".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    /// Enables the docs UI and exposes internal error details in responses.
    pub debug: bool,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    pub cors_origins: Vec<String>,
    pub frontend_url: String,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// Root credentials, unnecessary for embedded engines like `mem://`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_ttl_minutes: u64,
    pub refresh_ttl_days: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    /// Granted on registration.
    pub initial: i64,
    /// Charged per requested recommendation.
    pub recommendation_cost: i64,
}

/// OpenAI-compatible completion endpoint used for recommendation rationales.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directives, overridden by `RUST_LOG`.
    pub level: String,
    pub json: bool,
    pub path: Option<PathBuf>,
}

// --- Default ---

impl Default for AppConfig {
    fn default() -> Self {
        Self { name: crate::constants::APP_NAME.to_owned(), debug: false }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            ssl: None,
            cors_origins: vec!["http://localhost:3000".to_owned(), "http://localhost:8000".to_owned()],
            frontend_url: "http://localhost:3000".to_owned(),
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "lvai".to_owned(),
            database: "core".to_owned(),
            credentials: None,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "lvai".to_owned(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        }
    }
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self { initial: 100, recommendation_cost: 10 }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.manus.ai/v1".to_owned(),
            model: "gpt-4.1-mini".to_owned(),
            max_tokens: 200,
            timeout_seconds: 15,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, path: None }
    }
}
