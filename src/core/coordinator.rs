//! The provisioning coordinator and its watcher swap protocol.

use crate::core::{CoordinatorBuilder, ProvisioningKind, ProvisioningRoots};
use crate::error::{ProvisionError, Result};
use crate::provisioners::{OneShotProvisioner, Watcher, WatcherFactory};
use crate::settings::{ProvisioningSettings, Validate};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Cancellation handle of the watch task currently run by the supervisor.
pub(crate) struct ActiveTask {
    pub(crate) id: u64,
    pub(crate) cancel: CancellationToken,
}

/// Lock-protected mutable state.
///
/// `active_task` is `Some` exactly while the supervisor has a task running for
/// `active_watcher`. The watcher is only replaced under the lock and only after
/// the running task has been told to stop.
#[derive(Default)]
pub(crate) struct CoordinatorState {
    pub(crate) active_watcher: Option<Arc<dyn Watcher>>,
    pub(crate) active_task: Option<ActiveTask>,
    pub(crate) next_task_id: u64,
    pub(crate) tasks_started: u64,
    pub(crate) swaps: u64,
}

impl CoordinatorState {
    /// Signal the running task to stop, without waiting for it.
    fn cancel_polling(&mut self) {
        if let Some(task) = self.active_task.take() {
            debug!(task_id = task.id, "Stop polling for dashboard changes");
            task.cancel.cancel();
        }
    }
}

/// Counters describing coordinator activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Watch tasks started by the supervisor loop.
    pub tasks_started: u64,
    /// Successful dashboard watcher installs.
    pub swaps: u64,
}

/// Coordinates provisioning of data sources, notification channels and dashboards.
///
/// One-shot provisioning calls are independent of each other. Dashboard
/// provisioning builds a new [`Watcher`] and swaps it in under the coordinator
/// lock, and [`run`](Self::run) keeps the active watcher's background task alive
/// until shutdown. At most one watch task exists at any time.
///
/// # Examples
///
/// ```rust,no_run
/// use provisioning_coordinator::prelude::*;
/// use std::path::Path;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(factory: impl WatcherFactory + 'static) -> Result<()> {
/// let coordinator = Arc::new(
///     ProvisioningCoordinator::builder()
///         .with_settings(ProvisioningSettings::new("/etc/app/provisioning"))
///         .with_datasource_provisioner(|_: &Path| -> std::result::Result<(), BoxError> { Ok(()) })
///         .with_notifier_provisioner(|_: &Path| -> std::result::Result<(), BoxError> { Ok(()) })
///         .with_dashboard_factory(factory)
///         .build()?,
/// );
///
/// coordinator.init().await?;
///
/// let shutdown = CancellationToken::new();
/// let supervisor = {
///     let coordinator = Arc::clone(&coordinator);
///     let shutdown = shutdown.clone();
///     tokio::spawn(async move { coordinator.run(shutdown).await })
/// };
///
/// // Later, on an admin reload request:
/// coordinator.provision_dashboards().await?;
///
/// shutdown.cancel();
/// supervisor.await.ok();
/// # Ok(())
/// # }
/// ```
pub struct ProvisioningCoordinator {
    pub(crate) settings: ArcSwap<ProvisioningSettings>,
    pub(crate) dashboard_factory: Arc<dyn WatcherFactory>,
    pub(crate) datasource_provisioner: Arc<dyn OneShotProvisioner>,
    pub(crate) notifier_provisioner: Arc<dyn OneShotProvisioner>,
    pub(crate) state: Mutex<CoordinatorState>,
    /// Woken whenever a watcher is installed.
    pub(crate) watcher_installed: Notify,
    /// Set while a supervisor loop is running.
    pub(crate) supervising: AtomicBool,
}

impl ProvisioningCoordinator {
    /// Create a new builder for constructing a coordinator.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    pub(crate) fn new(
        settings: ProvisioningSettings,
        dashboard_factory: Arc<dyn WatcherFactory>,
        datasource_provisioner: Arc<dyn OneShotProvisioner>,
        notifier_provisioner: Arc<dyn OneShotProvisioner>,
    ) -> Self {
        Self {
            settings: ArcSwap::from_pointee(settings),
            dashboard_factory,
            datasource_provisioner,
            notifier_provisioner,
            state: Mutex::new(CoordinatorState::default()),
            watcher_installed: Notify::new(),
            supervising: AtomicBool::new(false),
        }
    }

    /// Run every provisioning stage once, in boot order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first stage error.
    pub async fn init(&self) -> Result<()> {
        self.provision_datasources().await?;
        self.provision_notifications().await?;
        self.provision_dashboards().await
    }

    /// Re-apply every data source definition.
    ///
    /// Does not touch the dashboard watcher; safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Datasources`] wrapping the provisioner's error.
    pub async fn provision_datasources(&self) -> Result<()> {
        let roots = self.roots();
        self.datasource_provisioner
            .provision(roots.root(ProvisioningKind::Datasources))
            .map_err(ProvisionError::Datasources)
    }

    /// Re-apply every notification channel definition.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Notifiers`] wrapping the provisioner's error.
    pub async fn provision_notifications(&self) -> Result<()> {
        let roots = self.roots();
        self.notifier_provisioner
            .provision(roots.root(ProvisioningKind::Notifiers))
            .map_err(ProvisionError::Notifiers)
    }

    /// Build a new dashboard watcher, apply it once and install it as active.
    ///
    /// The running watch task is cancelled before the new watcher's apply step
    /// runs; the supervisor loop restarts with whichever watcher is active once
    /// that task has exited.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::Construction`] if the factory fails. Nothing changes:
    ///   the active watcher keeps running.
    /// - [`ProvisionError::Dashboards`] if the new watcher's apply step fails. The
    ///   previous watcher stays installed and is restarted by the supervisor.
    pub async fn provision_dashboards(&self) -> Result<()> {
        let roots = self.roots();
        let watcher = self
            .dashboard_factory
            .create(roots.root(ProvisioningKind::Dashboards))
            .map_err(ProvisionError::Construction)?;

        let mut state = self.state.lock().await;
        state.cancel_polling();

        watcher.apply_once().map_err(ProvisionError::Dashboards)?;

        info!(watcher = %watcher.name(), "Installed dashboard watcher");
        state.active_watcher = Some(watcher);
        state.swaps += 1;
        drop(state);

        self.watcher_installed.notify_one();
        Ok(())
    }

    /// The currently installed dashboard watcher, if any.
    pub async fn active_watcher(&self) -> Option<Arc<dyn Watcher>> {
        self.state.lock().await.active_watcher.clone()
    }

    /// Whether a watch task is currently running for the active watcher.
    pub async fn is_watching(&self) -> bool {
        self.state.lock().await.active_task.is_some()
    }

    /// Activity counters.
    pub async fn stats(&self) -> CoordinatorStats {
        let state = self.state.lock().await;
        CoordinatorStats {
            tasks_started: state.tasks_started,
            swaps: state.swaps,
        }
    }

    /// Snapshot of the current settings. Lock-free.
    pub fn settings(&self) -> Arc<ProvisioningSettings> {
        self.settings.load_full()
    }

    /// Validate and atomically replace the settings.
    ///
    /// Takes effect on the next provisioning call; nothing is re-provisioned here.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Validation`] and keeps the old settings if
    /// `settings` is invalid.
    pub fn update_settings(&self, settings: ProvisioningSettings) -> Result<()> {
        settings.validate()?;
        self.settings.store(Arc::new(settings));
        Ok(())
    }

    fn roots(&self) -> ProvisioningRoots {
        ProvisioningRoots::from_base(&self.settings.load().provisioning_path)
    }
}
