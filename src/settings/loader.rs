//! Settings loader that merges files and environment overrides.

use super::{ProvisioningSettings, Validate};
use crate::error::{ProvisionError, Result};
use config::{Environment, File};
use std::path::PathBuf;

/// Loads [`ProvisioningSettings`] from files and environment variables.
///
/// Files are merged in the order they were added, later files overriding earlier
/// ones; environment overrides are applied last. The format of each file is
/// detected from its extension (`.yaml`, `.yml`, `.toml`, `.json`).
///
/// # Examples
///
/// ```rust,no_run
/// use provisioning_coordinator::settings::SettingsLoader;
///
/// # fn example() -> provisioning_coordinator::error::Result<()> {
/// // PROVISIONING_PROVISIONING_PATH=/srv/provisioning overrides the file value
/// let settings = SettingsLoader::new()
///     .with_file("config/provisioning.yaml")
///     .with_env_overrides("PROVISIONING", "__")
///     .load()?;
/// println!("base path: {}", settings.provisioning_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    files: Vec<PathBuf>,
    env: Option<(String, String)>,
}

impl SettingsLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a settings file. The file must exist when [`load`](Self::load) runs.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Apply environment variables starting with `prefix`, using `separator`
    /// between nested keys.
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env = Some((prefix.to_string(), separator.to_string()));
        self
    }

    /// Load, deserialize and validate the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] if no source was configured, a file is
    /// missing, has an unsupported extension or cannot be parsed, and
    /// [`ProvisionError::Validation`] if the merged settings are invalid.
    pub fn load(&self) -> Result<ProvisioningSettings> {
        if self.files.is_empty() && self.env.is_none() {
            return Err(ProvisionError::Config(
                "No settings sources specified".to_string(),
            ));
        }

        let mut builder = config::Config::builder();
        for path in &self.files {
            check_extension(path)?;
            builder = builder.add_source(File::from(path.clone()).required(true));
        }
        if let Some((prefix, separator)) = &self.env {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .try_parsing(true),
            );
        }

        let merged = builder
            .build()
            .map_err(|e| ProvisionError::Config(format!("Failed to load settings: {}", e)))?;
        let settings: ProvisioningSettings = merged
            .try_deserialize()
            .map_err(|e| ProvisionError::Config(format!("Failed to parse settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }
}

fn check_extension(path: &std::path::Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml" | "toml" | "json") => Ok(()),
        Some(other) => Err(ProvisionError::Config(format!(
            "Unsupported settings file extension: {}. Supported: .yaml, .yml, .toml, .json",
            other
        ))),
        None => Err(ProvisionError::Config(format!(
            "Unable to determine settings format for: {}",
            path.display()
        ))),
    }
}
