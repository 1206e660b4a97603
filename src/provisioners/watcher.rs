//! The long-running dashboard watcher and its factory.

use crate::error::BoxError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A stateful background task that observes a configuration source and keeps
/// applying changes until its cancellation token fires.
///
/// Construction must not start any background work. The coordinator calls
/// [`apply_once`](Watcher::apply_once) exactly once before installing a new
/// watcher, and the supervisor loop spawns [`watch`](Watcher::watch) each time it
/// (re)starts the active instance. The same instance may therefore be watched
/// several times over its life, but never twice at once.
///
/// Cancellation is cooperative: `watch` is expected to return promptly once
/// `cancel` is cancelled.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use provisioning_coordinator::error::BoxError;
/// use provisioning_coordinator::provisioners::Watcher;
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// struct PollingWatcher;
///
/// #[async_trait]
/// impl Watcher for PollingWatcher {
///     fn apply_once(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
///
///     async fn watch(self: Arc<Self>, cancel: CancellationToken) -> Result<(), BoxError> {
///         loop {
///             tokio::select! {
///                 _ = cancel.cancelled() => return Ok(()),
///                 _ = tokio::time::sleep(Duration::from_secs(10)) => self.apply_once()?,
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Watcher: Send + Sync + 'static {
    /// Apply the current configuration once, synchronously.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error; a failing new watcher is never installed.
    fn apply_once(&self) -> Result<(), BoxError>;

    /// Observe and apply changes until `cancel` fires or the watcher gives up.
    ///
    /// An `Err` return is logged by the supervisor and treated as an ordinary
    /// completion: the active watcher is simply started again.
    async fn watch(self: Arc<Self>, cancel: CancellationToken) -> Result<(), BoxError>;

    /// Human-readable name used in log records.
    fn name(&self) -> String {
        "watcher".to_string()
    }
}

/// Builds a fresh [`Watcher`] for a dashboard configuration root.
///
/// Any `Fn(&Path) -> Result<Arc<dyn Watcher>, BoxError>` closure is a factory.
pub trait WatcherFactory: Send + Sync {
    /// Construct a watcher for `root` without starting it.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration under `root` cannot produce a watcher
    /// (for example, malformed provider files).
    fn create(&self, root: &Path) -> Result<Arc<dyn Watcher>, BoxError>;
}

impl<F> WatcherFactory for F
where
    F: Fn(&Path) -> Result<Arc<dyn Watcher>, BoxError> + Send + Sync,
{
    fn create(&self, root: &Path) -> Result<Arc<dyn Watcher>, BoxError> {
        self(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingWatcher {
        applied: AtomicUsize,
    }

    #[async_trait]
    impl Watcher for CountingWatcher {
        fn apply_once(&self) -> Result<(), BoxError> {
            self.applied.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn watch(self: Arc<Self>, cancel: CancellationToken) -> Result<(), BoxError> {
            cancel.cancelled().await;
            Ok(())
        }
    }

    #[test]
    fn test_factory_closure() {
        let factory = |root: &Path| -> Result<Arc<dyn Watcher>, BoxError> {
            if root.ends_with("dashboards") {
                let watcher: Arc<dyn Watcher> = Arc::new(CountingWatcher {
                    applied: AtomicUsize::new(0),
                });
                Ok(watcher)
            } else {
                Err(format!("unexpected root {}", root.display()).into())
            }
        };

        let watcher = factory.create(Path::new("/etc/p/dashboards")).unwrap();
        assert_eq!(watcher.name(), "watcher");
        watcher.apply_once().unwrap();

        assert!(factory.create(Path::new("/etc/p/other")).is_err());
    }

    #[tokio::test]
    async fn test_watch_returns_on_cancel() {
        let watcher = Arc::new(CountingWatcher {
            applied: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();

        let task = tokio::spawn(Arc::clone(&watcher).watch(cancel.clone()));
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), task).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
