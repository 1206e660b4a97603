//! Core coordination types.

mod builder;
mod coordinator;
mod roots;
mod supervisor;

pub use builder::CoordinatorBuilder;
pub use coordinator::{CoordinatorStats, ProvisioningCoordinator};
pub use roots::{ProvisioningKind, ProvisioningRoots};
