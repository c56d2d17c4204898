use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::error::Result;
use crate::config::types::ClientConfig;

/// Overrides `baseUrl`.
pub const ENV_BASE_URL: &str = "ATTENDANCE_BASE_URL";
/// Overrides `requestTimeoutSecs`.
pub const ENV_TIMEOUT_SECS: &str = "ATTENDANCE_TIMEOUT_SECS";

/// File-backed client configuration.
pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<ClientConfig>,
}

impl ConfigStore {
    /// Open the store at `path`, loading the file if it exists and applying
    /// environment overrides. A broken file falls back to defaults with a
    /// warning so the application can still start.
    pub fn new(path: PathBuf) -> Self {
        let loaded = Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring config at {}: {e}", path.display());
            ClientConfig::default()
        });
        let config = apply_overrides(loaded, |key| std::env::var(key).ok());
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation failed, using defaults: {e}");
            return Self {
                path,
                data: Mutex::new(ClientConfig::default()),
            };
        }
        Self {
            path,
            data: Mutex::new(config),
        }
    }

    /// Load config from a JSON file, returning defaults when the file is
    /// missing.
    pub fn load(path: &Path) -> Result<ClientConfig> {
        if !path.exists() {
            return Ok(ClientConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the current config atomically (write .tmp then rename).
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Snapshot of the current config.
    pub fn get(&self) -> ClientConfig {
        self.data.lock().clone()
    }

    /// Apply `change` and persist. The change is rolled back if the result
    /// does not validate.
    pub fn update(&self, change: impl FnOnce(&mut ClientConfig)) -> Result<ClientConfig> {
        {
            let mut data = self.data.lock();
            let mut next = data.clone();
            change(&mut next);
            next.validate()?;
            *data = next;
        }
        self.save()?;
        Ok(self.get())
    }
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
pub fn apply_overrides(
    mut config: ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ClientConfig {
    if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
            _ => tracing::warn!("Ignoring {ENV_TIMEOUT_SECS}={raw}: expected positive seconds"),
        }
    }
    config
}
