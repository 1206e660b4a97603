//! Shared fixtures for coordinator integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use provisioning_coordinator::prelude::*;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::result::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Tracks how many watch tasks are executing across every mock watcher.
#[derive(Default)]
pub struct Activity {
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl Activity {
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A watcher that records starts, cancellations and its apply calls.
pub struct MockWatcher {
    pub label: String,
    fail_apply: bool,
    activity: Arc<Activity>,
    pub applied: AtomicUsize,
    pub starts: AtomicUsize,
    pub cancelled: AtomicUsize,
}

impl MockWatcher {
    pub fn new(label: &str, activity: &Arc<Activity>) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            fail_apply: false,
            activity: Arc::clone(activity),
            applied: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
        })
    }

    pub fn failing_apply(label: &str, activity: &Arc<Activity>) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            fail_apply: true,
            activity: Arc::clone(activity),
            applied: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
        })
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn cancellations(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Watcher for MockWatcher {
    fn apply_once(&self) -> Result<(), BoxError> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        if self.fail_apply {
            return Err(format!("{}: dashboard uid conflict", self.label).into());
        }
        Ok(())
    }

    async fn watch(self: Arc<Self>, cancel: CancellationToken) -> Result<(), BoxError> {
        self.activity.enter();
        self.starts.fetch_add(1, Ordering::SeqCst);

        cancel.cancelled().await;
        // Unwind slowly so an overlapping start would be observable.
        tokio::time::sleep(Duration::from_millis(20)).await;

        self.cancelled.fetch_add(1, Ordering::SeqCst);
        self.activity.leave();
        Ok(())
    }

    fn name(&self) -> String {
        self.label.clone()
    }
}

/// What the dashboard factory hands out next.
pub enum Next {
    Watcher(Arc<MockWatcher>),
    ConstructionError,
}

/// A factory replaying a scripted sequence of outcomes.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    script: Arc<Mutex<VecDeque<Next>>>,
    pub roots: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedFactory {
    pub fn push(&self, next: Next) {
        self.script.lock().unwrap().push_back(next);
    }
}

impl WatcherFactory for ScriptedFactory {
    fn create(&self, root: &Path) -> Result<Arc<dyn Watcher>, BoxError> {
        self.roots.lock().unwrap().push(root.to_path_buf());
        match self.script.lock().unwrap().pop_front() {
            Some(Next::Watcher(watcher)) => Ok(watcher as Arc<dyn Watcher>),
            Some(Next::ConstructionError) => Err("malformed dashboard provider file".into()),
            None => Err("no watcher scripted".into()),
        }
    }
}

/// A one-shot provisioner counting its calls.
#[derive(Clone, Default)]
pub struct CountingProvisioner {
    pub calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl OneShotProvisioner for CountingProvisioner {
    fn provision(&self, root: &Path) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(root.to_path_buf());
        Ok(())
    }
}

pub struct Harness {
    pub coordinator: Arc<ProvisioningCoordinator>,
    pub factory: ScriptedFactory,
    pub datasources: CountingProvisioner,
    pub notifiers: CountingProvisioner,
    pub activity: Arc<Activity>,
}

impl Harness {
    pub fn new() -> Self {
        let factory = ScriptedFactory::default();
        let datasources = CountingProvisioner::default();
        let notifiers = CountingProvisioner::default();
        let coordinator = ProvisioningCoordinator::builder()
            .with_settings(
                ProvisioningSettings::new("/srv/provisioning")
                    .with_shutdown_grace(Duration::from_secs(2)),
            )
            .with_dashboard_factory(factory.clone())
            .with_datasource_provisioner(datasources.clone())
            .with_notifier_provisioner(notifiers.clone())
            .build()
            .unwrap();

        Self {
            coordinator: Arc::new(coordinator),
            factory,
            datasources,
            notifiers,
            activity: Arc::new(Activity::default()),
        }
    }

    pub fn spawn_supervisor(&self, shutdown: &CancellationToken) -> JoinHandle<()> {
        let coordinator = Arc::clone(&self.coordinator);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { coordinator.run(shutdown).await })
    }

    pub async fn active_is(&self, watcher: &Arc<MockWatcher>) -> bool {
        let expected: Arc<dyn Watcher> = watcher.clone();
        self.coordinator
            .active_watcher()
            .await
            .is_some_and(|active| Arc::ptr_eq(&active, &expected))
    }
}

/// Poll `check` until it holds, failing the test after two seconds.
pub async fn eventually<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
