//! # provisioning-coordinator
//!
//! Race-free lifecycle coordination for declarative provisioning.
//!
//! ## Overview
//!
//! A service is provisioned from three kinds of declarative configuration found
//! beneath one base directory:
//! - `datasources/` and `notifiers/`, applied by stateless one-shot provisioners
//! - `dashboards/`, applied by a long-running [`Watcher`](provisioners::Watcher)
//!   that keeps observing its configuration until cancelled
//!
//! The [`ProvisioningCoordinator`](core::ProvisioningCoordinator) exposes an
//! idempotent "provision now" operation per kind and a supervisor loop that keeps
//! the active dashboard watcher running. Re-provisioning dashboards builds a new
//! watcher and swaps it in atomically:
//! - at most one watch task runs at any instant
//! - a watcher that fails to build changes nothing
//! - a watcher that fails its first apply is never installed; the previous one
//!   is restarted instead
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use provisioning_coordinator::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(factory: impl WatcherFactory + 'static) -> Result<()> {
//! let settings = SettingsLoader::new()
//!     .with_file("config/provisioning.yaml")
//!     .with_env_overrides("PROVISIONING", "__")
//!     .load()?;
//!
//! let coordinator = Arc::new(
//!     ProvisioningCoordinator::builder()
//!         .with_settings(settings)
//!         .with_dashboard_factory(factory)
//!         .with_datasource_provisioner(|_: &Path| -> std::result::Result<(), BoxError> { Ok(()) })
//!         .with_notifier_provisioner(|_: &Path| -> std::result::Result<(), BoxError> { Ok(()) })
//!         .build()?,
//! );
//!
//! // Boot: datasources, notifiers, then the first dashboard watcher
//! coordinator.init().await?;
//!
//! let shutdown = CancellationToken::new();
//! let supervisor = tokio::spawn({
//!     let coordinator = Arc::clone(&coordinator);
//!     let shutdown = shutdown.clone();
//!     async move { coordinator.run(shutdown).await }
//! });
//!
//! // Reload on demand; the supervisor picks up the new watcher
//! coordinator.provision_dashboards().await?;
//!
//! shutdown.cancel();
//! let _ = supervisor.await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Diagnostics are emitted through `tracing`. Install a subscriber in the host
//! process to see them.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod provisioners;
pub mod settings;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        CoordinatorBuilder, CoordinatorStats, ProvisioningCoordinator, ProvisioningKind,
        ProvisioningRoots,
    };
    pub use crate::error::{BoxError, ProvisionError, Result, Stage};
    pub use crate::provisioners::{OneShotProvisioner, Watcher, WatcherFactory};
    pub use crate::settings::{ProvisioningSettings, SettingsLoader, Validate};
}
