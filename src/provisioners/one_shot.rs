//! Stateless apply-once provisioners.

use crate::error::BoxError;
use std::path::Path;

/// A provisioner that applies every definition under `root` once and returns.
///
/// Implementations have no background behavior and must be safe to call
/// repeatedly; each call fully re-applies the configuration found on disk.
///
/// Any `Fn(&Path) -> Result<(), BoxError>` closure is a provisioner:
///
/// ```rust
/// use provisioning_coordinator::provisioners::OneShotProvisioner;
/// use std::path::Path;
///
/// let provisioner = |root: &Path| -> Result<(), provisioning_coordinator::error::BoxError> {
///     println!("applying {}", root.display());
///     Ok(())
/// };
/// provisioner.provision(Path::new("/etc/provisioning/datasources")).unwrap();
/// ```
pub trait OneShotProvisioner: Send + Sync {
    /// Apply the configuration found under `root`.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's own error; the coordinator tags it with the stage.
    fn provision(&self, root: &Path) -> Result<(), BoxError>;
}

impl<F> OneShotProvisioner for F
where
    F: Fn(&Path) -> Result<(), BoxError> + Send + Sync,
{
    fn provision(&self, root: &Path) -> Result<(), BoxError> {
        self(root)
    }
}
