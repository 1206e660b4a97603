//! Builder for constructing ProvisioningCoordinator instances.

use crate::core::ProvisioningCoordinator;
use crate::error::{ProvisionError, Result};
use crate::provisioners::{OneShotProvisioner, WatcherFactory};
use crate::settings::{ProvisioningSettings, Validate};
use std::sync::Arc;

/// Builder for constructing a [`ProvisioningCoordinator`].
///
/// Every collaborator and the settings are required.
///
/// # Examples
///
/// ```rust
/// use provisioning_coordinator::prelude::*;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn example(factory: impl WatcherFactory + 'static) -> Result<()> {
/// let coordinator = ProvisioningCoordinator::builder()
///     .with_settings(ProvisioningSettings::new("/etc/app/provisioning"))
///     .with_dashboard_factory(factory)
///     .with_datasource_provisioner(|root: &Path| -> std::result::Result<(), BoxError> {
///         println!("datasources from {}", root.display());
///         Ok(())
///     })
///     .with_notifier_provisioner(|_: &Path| -> std::result::Result<(), BoxError> { Ok(()) })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct CoordinatorBuilder {
    settings: Option<ProvisioningSettings>,
    dashboard_factory: Option<Arc<dyn WatcherFactory>>,
    datasource_provisioner: Option<Arc<dyn OneShotProvisioner>>,
    notifier_provisioner: Option<Arc<dyn OneShotProvisioner>>,
}

impl CoordinatorBuilder {
    /// Create a new builder with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial settings.
    pub fn with_settings(mut self, settings: ProvisioningSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set the factory used to build dashboard watchers.
    pub fn with_dashboard_factory<F: WatcherFactory + 'static>(mut self, factory: F) -> Self {
        self.dashboard_factory = Some(Arc::new(factory));
        self
    }

    /// Set the data source provisioner.
    pub fn with_datasource_provisioner<P: OneShotProvisioner + 'static>(
        mut self,
        provisioner: P,
    ) -> Self {
        self.datasource_provisioner = Some(Arc::new(provisioner));
        self
    }

    /// Set the notification channel provisioner.
    pub fn with_notifier_provisioner<P: OneShotProvisioner + 'static>(
        mut self,
        provisioner: P,
    ) -> Self {
        self.notifier_provisioner = Some(Arc::new(provisioner));
        self
    }

    /// Build the coordinator. No provisioning runs here.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] if a component is missing and
    /// [`ProvisionError::Validation`] if the settings are invalid.
    pub fn build(self) -> Result<ProvisioningCoordinator> {
        let settings = self.settings.ok_or_else(|| missing("settings"))?;
        settings.validate()?;

        Ok(ProvisioningCoordinator::new(
            settings,
            self.dashboard_factory
                .ok_or_else(|| missing("dashboard watcher factory"))?,
            self.datasource_provisioner
                .ok_or_else(|| missing("datasource provisioner"))?,
            self.notifier_provisioner
                .ok_or_else(|| missing("notifier provisioner"))?,
        ))
    }
}

fn missing(component: &str) -> ProvisionError {
    ProvisionError::Config(format!("Coordinator is missing a {}", component))
}
