//! Coordinator settings and how they are loaded.

mod loader;
mod validation;

pub use loader::SettingsLoader;
pub use validation::Validate;

use crate::error::ProvisionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

/// Settings consumed by the provisioning coordinator.
///
/// # Examples
///
/// ```rust
/// use provisioning_coordinator::settings::ProvisioningSettings;
///
/// let settings = ProvisioningSettings::new("/etc/app/provisioning");
/// assert_eq!(settings.shutdown_grace().as_secs(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningSettings {
    /// Base directory holding `datasources/`, `notifiers/` and `dashboards/`.
    pub provisioning_path: PathBuf,

    /// How long the supervisor waits for a cancelled watch task on shutdown
    /// before aborting it.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl ProvisioningSettings {
    /// Settings rooted at `provisioning_path` with the default shutdown grace.
    pub fn new(provisioning_path: impl Into<PathBuf>) -> Self {
        Self {
            provisioning_path: provisioning_path.into(),
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }

    /// Override the shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Shutdown grace period as a [`Duration`].
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Validate for ProvisioningSettings {
    fn validate(&self) -> Result<(), ProvisionError> {
        if self.provisioning_path.as_os_str().is_empty() {
            return Err(ProvisionError::Validation(
                "provisioning_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
