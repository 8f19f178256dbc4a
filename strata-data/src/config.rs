use crate::cursor::CursorRequest;
use crate::offset::OffsetRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single validation failure found after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationDetail {
    pub key: String,
    pub message: String,
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
    /// The merged configuration does not fit [`StrataConfig`].
    Deserialize(String),
    /// Values were read but break a constraint.
    Validation(Vec<ConfigValidationDetail>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Deserialize(msg) => write!(f, "Config shape error: {msg}"),
            ConfigError::Validation(details) => {
                write!(f, "Config validation errors:")?;
                for detail in details {
                    write!(f, "\n  - {}: {}", detail.key, detail.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Paging limits applied to transport-level requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 500,
        }
    }
}

impl PaginationConfig {
    /// A non-positive limit becomes the default; anything above the maximum
    /// is capped.
    pub fn clamp_limit(&self, limit: i64) -> i64 {
        let max = i64::try_from(self.max_limit).unwrap_or(i64::MAX);
        if limit <= 0 {
            i64::try_from(self.default_limit).unwrap_or(max).min(max)
        } else {
            limit.min(max)
        }
    }

    pub fn normalize_cursor(&self, request: CursorRequest) -> CursorRequest {
        CursorRequest::new(request.start_id, self.clamp_limit(request.limit))
    }

    /// Caps `page_size`; an unpaged request (size 0) is left alone.
    pub fn normalize_offset(&self, request: OffsetRequest) -> OffsetRequest {
        OffsetRequest::new(request.page, request.page_size.min(self.max_limit))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        }
    }
}

/// Application configuration loaded from YAML files, `.env` files, and
/// environment variables.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml` (base)
/// 2. `application-{profile}.yaml` (profile override)
/// 3. `.env` then `.env.{profile}` (loaded into the process environment)
/// 4. `STRATA_*` environment variables, `__` separating sections
///    (`STRATA_PAGINATION__MAX_LIMIT` overrides `pagination.max_limit`)
///
/// `.env` files never overwrite already-set environment variables.
///
/// Profile is determined by: `STRATA_PROFILE` env var > argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub pagination: PaginationConfig,
    pub database: DatabaseConfig,
}

const ENV_PREFIX: &str = "STRATA_";
const PROFILE_VAR: &str = "STRATA_PROFILE";

impl StrataConfig {
    /// Load configuration for `profile` from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."), profile)
    }

    /// Load configuration for `profile`, reading files from `dir`.
    pub fn load_from_dir(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let active_profile = std::env::var(PROFILE_VAR).unwrap_or_else(|_| profile.to_string());

        // 1-2. YAML files
        let mut tree = serde_yaml::Value::Mapping(Default::default());
        for name in [
            "application.yaml".to_string(),
            format!("application-{active_profile}.yaml"),
        ] {
            if let Some(layer) = read_yaml_file(&dir.join(name))? {
                merge(&mut tree, layer);
            }
        }

        // 3. .env files (do NOT overwrite existing env vars)
        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{active_profile}")));

        // 4. Environment overlay
        for (key, value) in std::env::vars() {
            if key == PROFILE_VAR {
                continue;
            }
            if let Some(rest) = key.strip_prefix(ENV_PREFIX) {
                let path: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
                set_path(&mut tree, &path, scalar(&value));
            }
        }

        let config = Self::from_tree(tree)?;
        tracing::debug!(profile = %active_profile, "configuration loaded");
        Ok(config)
    }

    /// Parse a YAML document, without files or environment (useful for testing).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let tree: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::from_tree(tree)
    }

    fn from_tree(tree: serde_yaml::Value) -> Result<Self, ConfigError> {
        let tree = match tree {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };
        let config: StrataConfig =
            serde_yaml::from_value(tree).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut details = Vec::new();
        let mut fail = |key: &str, message: &str| {
            details.push(ConfigValidationDetail {
                key: key.to_string(),
                message: message.to_string(),
            })
        };
        if self.pagination.default_limit == 0 {
            fail("pagination.default_limit", "must be greater than 0");
        }
        if self.pagination.max_limit < self.pagination.default_limit {
            fail("pagination.max_limit", "must not be below default_limit");
        }
        if self.database.max_connections == 0 {
            fail("database.max_connections", "must be greater than 0");
        }
        if details.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(details))
        }
    }
}

fn read_yaml_file(path: &Path) -> Result<Option<serde_yaml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
    let yaml = serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    Ok(Some(yaml))
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything
/// else replaces.
fn merge(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, serde_yaml::Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

fn set_path(tree: &mut serde_yaml::Value, path: &[String], value: serde_yaml::Value) {
    let Some((head, rest)) = path.split_first() else {
        *tree = value;
        return;
    };
    if !tree.is_mapping() {
        *tree = serde_yaml::Value::Mapping(Default::default());
    }
    if let serde_yaml::Value::Mapping(map) = tree {
        let key = serde_yaml::Value::String(head.clone());
        let child = map
            .entry(key)
            .or_insert(serde_yaml::Value::Null);
        set_path(child, rest, value);
    }
}

/// Environment values are typed the way YAML would type them, so
/// `STRATA_PAGINATION__MAX_LIMIT=50` lands as a number.
fn scalar(raw: &str) -> serde_yaml::Value {
    match serde_yaml::from_str::<serde_yaml::Value>(raw) {
        Ok(v @ (serde_yaml::Value::Bool(_) | serde_yaml::Value::Number(_))) => v,
        _ => serde_yaml::Value::String(raw.to_string()),
    }
}
