//! Configuration roots derived from the base provisioning path.

use std::fmt;
use std::path::{Path, PathBuf};

/// The provisioning subsystems, each reading its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisioningKind {
    /// Data source definitions.
    Datasources,
    /// Alert notification channel definitions.
    Notifiers,
    /// Dashboard providers, applied by the watcher.
    Dashboards,
}

impl ProvisioningKind {
    /// All kinds, in boot order.
    pub const ALL: [ProvisioningKind; 3] = [Self::Datasources, Self::Notifiers, Self::Dashboards];

    /// Subdirectory name beneath the base provisioning path.
    pub fn subdirectory(&self) -> &'static str {
        match self {
            Self::Datasources => "datasources",
            Self::Notifiers => "notifiers",
            Self::Dashboards => "dashboards",
        }
    }
}

impl fmt::Display for ProvisioningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subdirectory())
    }
}

/// Per-kind configuration directories, resolved once per provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRoots {
    datasources: PathBuf,
    notifiers: PathBuf,
    dashboards: PathBuf,
}

impl ProvisioningRoots {
    /// Derive every root from `base`.
    ///
    /// ```rust
    /// use provisioning_coordinator::core::ProvisioningRoots;
    /// use std::path::Path;
    ///
    /// let roots = ProvisioningRoots::from_base("/etc/app/provisioning");
    /// assert_eq!(roots.dashboards(), Path::new("/etc/app/provisioning/dashboards"));
    /// ```
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            datasources: base.join(ProvisioningKind::Datasources.subdirectory()),
            notifiers: base.join(ProvisioningKind::Notifiers.subdirectory()),
            dashboards: base.join(ProvisioningKind::Dashboards.subdirectory()),
        }
    }

    /// Root for `kind`.
    pub fn root(&self, kind: ProvisioningKind) -> &Path {
        match kind {
            ProvisioningKind::Datasources => &self.datasources,
            ProvisioningKind::Notifiers => &self.notifiers,
            ProvisioningKind::Dashboards => &self.dashboards,
        }
    }

    /// Data source root.
    pub fn datasources(&self) -> &Path {
        &self.datasources
    }

    /// Notification channel root.
    pub fn notifiers(&self) -> &Path {
        &self.notifiers
    }

    /// Dashboard root.
    pub fn dashboards(&self) -> &Path {
        &self.dashboards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_subdirectories() {
        let roots = ProvisioningRoots::from_base("/srv/p");
        assert_eq!(roots.datasources(), Path::new("/srv/p/datasources"));
        assert_eq!(roots.notifiers(), Path::new("/srv/p/notifiers"));
        assert_eq!(roots.dashboards(), Path::new("/srv/p/dashboards"));
    }

    #[test]
    fn test_relative_base() {
        let roots = ProvisioningRoots::from_base("conf/provisioning");
        assert_eq!(
            roots.root(ProvisioningKind::Notifiers),
            Path::new("conf/provisioning/notifiers")
        );
    }

    proptest! {
        #[test]
        fn prop_roots_are_children_of_base(segments in prop::collection::vec("[a-z0-9_-]{1,12}", 1..5)) {
            let base: PathBuf = segments.iter().collect();
            let roots = ProvisioningRoots::from_base(&base);

            for kind in ProvisioningKind::ALL {
                let root = roots.root(kind);
                prop_assert_eq!(root.parent(), Some(base.as_path()));
                prop_assert_eq!(root.file_name().and_then(|n| n.to_str()), Some(kind.subdirectory()));
            }
        }
    }
}
