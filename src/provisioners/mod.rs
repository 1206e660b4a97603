//! Collaborator interfaces consumed by the coordinator.
//!
//! The coordinator never reads configuration itself. Dashboards are applied by a
//! [`Watcher`] built through a [`WatcherFactory`]; data sources and notification
//! channels are applied by stateless [`OneShotProvisioner`]s.

mod one_shot;
mod watcher;

pub use one_shot::OneShotProvisioner;
pub use watcher::{Watcher, WatcherFactory};
