use config::{Config, Environment, File};
use lvai_domain::config::ApiConfig;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Points at an explicit configuration file, overriding the `server.*` default.
pub const CONFIG_PATH_ENV: &str = "LVAI_CONFIG";
pub const ENV_PREFIX: &str = "LVAI";
const DEFAULT_CONFIG_STEM: &str = "server";

#[lvai_derive::lvai_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Layers an optional configuration file under `LVAI__*` environment overrides.
///
/// 1. **File**: `path` when given, else `$LVAI_CONFIG`, else `server.{toml,yaml,json}` in the
///    working directory. Only the implicit default may be absent.
/// 2. **Environment**: `LVAI__DATABASE__URL` maps to `database.url`. `server.cors_origins`
///    accepts a comma separated list.
///
/// # Errors
///
/// Fails when an explicit file is missing or the merged values do not fit `T`.
///
/// ```rust
/// use lvai_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Settings {
///     port: u16,
/// }
///
/// let settings: Settings = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (file, required) = match path {
        Some(p) => (p.as_ref().to_path_buf(), true),
        None => std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| (PathBuf::from(DEFAULT_CONFIG_STEM), false), |p| (PathBuf::from(p), true)),
    };

    info!(path = %file.display(), required, "Loading configuration");

    Config::builder()
        .add_source(File::from(file.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

/// Loads and validates the service configuration, logging a redacted summary.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when [`ApiConfig::validate`] rejects the result.
pub fn load_api_config(path: Option<impl AsRef<Path>>) -> Result<ApiConfig, ConfigError> {
    let config: ApiConfig = load_config(path)?;
    config.validate().map_err(|message| ConfigError::Invalid { message, context: None })?;

    info!(
        app = %config.app.name,
        debug = config.app.debug,
        address = %config.server.address,
        port = config.server.port,
        tls = config.server.ssl.is_some(),
        database = %config.database.url,
        jwt_secret_len = config.security.jwt.secret.len(),
        ai_key_set = config.ai.api_key.is_some(),
        "Configuration loaded"
    );

    Ok(config)
}
