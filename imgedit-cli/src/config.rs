// ABOUTME: Configuration file loading and environment resolution for the imgedit CLI
// ABOUTME: Merges TOML files low-to-high precedence, then applies environment overrides

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use imgedit_sdk::{HarnessError, StorageConfig};

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint_id: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub storage: Option<StorageSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct StorageSection {
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
}

impl Config {
    /// Load configuration from the standard locations and the process
    /// environment. Missing files are skipped; environment wins.
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        let config = Self::load_from_paths(&paths.iter().map(|p| p.as_str()).collect::<Vec<_>>())?;
        Ok(config.apply_env())
    }

    /// Load configuration from file paths ordered lowest precedence first.
    pub fn load_from_paths(paths: &[&str]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            if let Ok(file_config) = Self::load_from_file(path) {
                config = config.merge(file_config);
            }
        }

        Ok(config)
    }

    /// Load configuration from a single TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        Ok(config)
    }

    /// Standard config file paths, lowest precedence first.
    pub fn get_config_paths() -> Vec<String> {
        let mut paths = Vec::new();

        // 1. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir.join(".config").join("imgedit").join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        // 2. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home).join("imgedit").join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        // 3. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("imgedit.toml").to_string_lossy().to_string());
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other.
    pub fn merge(self, other: Config) -> Config {
        Config {
            api_key: other.api_key.or(self.api_key),
            endpoint_id: other.endpoint_id.or(self.endpoint_id),
            api_url: other.api_url.or(self.api_url),
            storage: match (self.storage, other.storage) {
                (Some(base), Some(other)) => Some(base.merge(other)),
                (Some(base), None) => Some(base),
                (None, other) => other,
            },
        }
    }

    /// Apply environment-variable overrides on top of file values.
    pub fn apply_env(mut self) -> Config {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        self.api_key = env("RUNPOD_API_KEY").or(self.api_key);
        self.endpoint_id = env("RUNPOD_ENDPOINT_ID").or(self.endpoint_id);
        self.api_url = env("RUNPOD_API_URL").or(self.api_url);

        let storage_env = StorageSection {
            endpoint_url: env("S3_ENDPOINT_URL"),
            region: env("S3_REGION"),
            access_key_id: env("S3_ACCESS_KEY_ID"),
            secret_access_key: env("S3_SECRET_ACCESS_KEY"),
            bucket: env("S3_BUCKET_NAME"),
        };
        if storage_env != StorageSection::default() {
            self.storage = Some(match self.storage {
                Some(base) => base.merge(storage_env),
                None => storage_env,
            });
        }

        self
    }

    /// Resolve into the immutable runtime configuration, failing when the
    /// required credentials are absent.
    pub fn resolve(self) -> Result<HarnessConfig, HarnessError> {
        let mut missing = Vec::new();
        if self.api_key.as_deref().map_or(true, |v| v.trim().is_empty()) {
            missing.push("RUNPOD_API_KEY (api_key)");
        }
        if self
            .endpoint_id
            .as_deref()
            .map_or(true, |v| v.trim().is_empty())
        {
            missing.push("RUNPOD_ENDPOINT_ID (endpoint_id)");
        }
        if !missing.is_empty() {
            return Err(HarnessError::Config(missing.join(", ")));
        }

        Ok(HarnessConfig {
            api_key: SecretString::new(self.api_key.unwrap().trim().to_string().into_boxed_str()),
            endpoint_id: self.endpoint_id.unwrap().trim().to_string(),
            api_url: self.api_url,
            storage: self.storage.unwrap_or_default(),
        })
    }
}

impl StorageSection {
    pub fn merge(self, other: StorageSection) -> StorageSection {
        StorageSection {
            endpoint_url: other.endpoint_url.or(self.endpoint_url),
            region: other.region.or(self.region),
            access_key_id: other.access_key_id.or(self.access_key_id),
            secret_access_key: other.secret_access_key.or(self.secret_access_key),
            bucket: other.bucket.or(self.bucket),
        }
    }
}

/// Process-wide configuration, resolved once at startup and passed
/// explicitly into each component.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub api_key: SecretString,
    pub endpoint_id: String,
    pub api_url: Option<String>,
    storage: StorageSection,
}

impl HarnessConfig {
    /// The storage backend settings, all-or-nothing. Names every missing
    /// key so a partial configuration is diagnosable in one pass.
    pub fn storage(&self) -> Result<StorageConfig, HarnessError> {
        let s = &self.storage;
        let mut missing = Vec::new();
        if s.endpoint_url.is_none() {
            missing.push("S3_ENDPOINT_URL");
        }
        if s.region.is_none() {
            missing.push("S3_REGION");
        }
        if s.access_key_id.is_none() {
            missing.push("S3_ACCESS_KEY_ID");
        }
        if s.secret_access_key.is_none() {
            missing.push("S3_SECRET_ACCESS_KEY");
        }
        if s.bucket.is_none() {
            missing.push("S3_BUCKET_NAME");
        }
        if !missing.is_empty() {
            return Err(HarnessError::Config(format!(
                "storage settings: {}",
                missing.join(", ")
            )));
        }

        Ok(StorageConfig {
            endpoint_url: s.endpoint_url.clone().unwrap().trim().to_string(),
            region: s.region.clone().unwrap().trim().to_string(),
            access_key_id: s.access_key_id.clone().unwrap().trim().to_string(),
            secret_access_key: s.secret_access_key.clone().unwrap().trim().to_string(),
            bucket: s.bucket.clone().unwrap().trim().to_string(),
        })
    }
}
