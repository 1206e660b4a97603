//! Settings validation support.

use crate::error::ProvisionError;

/// Trait for settings validation.
///
/// Settings are validated when a coordinator is built and again before every
/// [`update_settings`](crate::core::ProvisioningCoordinator::update_settings)
/// swap. A failing validation leaves the previous settings in place.
pub trait Validate {
    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Should return [`ProvisionError::Validation`] describing what failed.
    fn validate(&self) -> Result<(), ProvisionError>;
}
