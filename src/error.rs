//! Error types for provisioning-coordinator.

use std::fmt;

/// Boxed error returned by provisioning collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for coordinator operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Provisioning stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Data source provisioning.
    Datasources,
    /// Notification channel provisioning.
    Notifiers,
    /// Dashboard watcher construction.
    Construction,
    /// Dashboard apply step.
    Dashboards,
}

impl Stage {
    /// Short label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Datasources => "datasources",
            Self::Notifiers => "notifiers",
            Self::Construction => "construction",
            Self::Dashboards => "dashboards",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the provisioning coordinator.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The data source provisioner rejected its configuration.
    #[error("Datasource provisioning error: {0}")]
    Datasources(#[source] BoxError),

    /// The notification channel provisioner rejected its configuration.
    #[error("Alert notification provisioning error: {0}")]
    Notifiers(#[source] BoxError),

    /// A new dashboard watcher could not be built from the current configuration.
    #[error("Failed to create dashboard provisioner: {0}")]
    Construction(#[source] BoxError),

    /// The new dashboard watcher failed its one-shot apply step.
    #[error("Failed to provision dashboards: {0}")]
    Dashboards(#[source] BoxError),

    /// Settings could not be loaded or the coordinator is missing a component.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings were loaded but failed validation.
    #[error("Settings validation failed: {0}")]
    Validation(String),
}

impl ProvisionError {
    /// The provisioning stage this error belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Datasources(_) => Some(Stage::Datasources),
            Self::Notifiers(_) => Some(Stage::Notifiers),
            Self::Construction(_) => Some(Stage::Construction),
            Self::Dashboards(_) => Some(Stage::Dashboards),
            Self::Config(_) | Self::Validation(_) => None,
        }
    }
}
