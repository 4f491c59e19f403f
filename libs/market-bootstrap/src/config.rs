//! Layered configuration: struct defaults, then an optional YAML file, then
//! environment variables (`<PREFIX>__SECTION__KEY`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_yaml::Error),
}

/// Deployment environment. Production enables the strict start-up checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Load `T` from its serde defaults, the optional YAML file at `path`, and
/// environment variables starting with `env_prefix` (e.g. `"CATALOG__"`).
/// Nested keys are separated by `__`: `CATALOG__DATABASE__URL`.
///
/// `T` is expected to carry `#[serde(default)]` so absent keys fall back to
/// its `Default` impl.
///
/// # Errors
/// Returns [`ConfigError::MissingFile`] if `path` does not point to a file
/// and [`ConfigError::Invalid`] if the merged sources fail to deserialize.
pub fn load_config<T>(path: Option<&Path>, env_prefix: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}

/// Render a config for `--print-config`.
///
/// # Errors
/// Returns [`ConfigError::Render`] if serialization fails.
pub fn to_yaml<T: Serialize>(config: &T) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(config)?)
}

/// `serialize_with` helper that hides secrets in rendered configs.
///
/// # Errors
/// Propagates serializer errors.
pub fn redacted<S: Serializer>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("***")
}
