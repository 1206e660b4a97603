//! The polling supervisor loop.
//!
//! Keeps the active dashboard watcher running until shutdown. Every completion
//! of the watch task, whatever its cause, leads back to `AcquireAndStart`,
//! which starts whichever watcher is installed at that moment.

use crate::core::ProvisioningCoordinator;
use crate::core::coordinator::ActiveTask;
use crate::error::BoxError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type TaskOutcome = Result<Result<(), BoxError>, JoinError>;

/// A spawned watch task owned by the supervisor.
struct RunningTask {
    id: u64,
    watcher: String,
    handle: JoinHandle<Result<(), BoxError>>,
}

enum SupervisorState {
    AcquireAndStart,
    WaitForCompletion(RunningTask),
    ShuttingDown(Option<RunningTask>),
}

struct Supervisor<'a> {
    coordinator: &'a ProvisioningCoordinator,
    shutdown: CancellationToken,
}

/// Clears the coordinator's `supervising` flag when the loop exits.
struct SupervisingGuard<'a>(&'a AtomicBool);

impl Drop for SupervisingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ProvisioningCoordinator {
    /// Run the polling supervisor until `shutdown` is cancelled.
    ///
    /// Start this once per process. Each watch task gets a child token of
    /// `shutdown`, so cancelling `shutdown` also stops the running task. A new
    /// task is only started after the previous one has returned, so at most one
    /// watch task runs at a time. On shutdown the running task is given the
    /// configured grace period to exit before it is aborted.
    ///
    /// If no dashboard watcher has been installed yet, the loop waits for
    /// [`provision_dashboards`](Self::provision_dashboards) to install one.
    ///
    /// Only one loop may run per coordinator. A call made while another loop is
    /// running logs a warning and returns at once; once the running loop has
    /// stopped, `run` may be called again.
    pub async fn run(&self, shutdown: CancellationToken) {
        if self.supervising.swap(true, Ordering::SeqCst) {
            warn!("Dashboard polling supervisor is already running, ignoring second start");
            return;
        }
        let _guard = SupervisingGuard(&self.supervising);

        Supervisor {
            coordinator: self,
            shutdown,
        }
        .run()
        .await
    }
}

impl Supervisor<'_> {
    async fn run(self) {
        info!("Starting dashboard polling supervisor");

        let mut state = SupervisorState::AcquireAndStart;
        loop {
            state = match state {
                SupervisorState::AcquireAndStart => self.acquire_and_start().await,
                SupervisorState::WaitForCompletion(task) => self.wait_for_completion(task).await,
                SupervisorState::ShuttingDown(task) => {
                    self.shut_down(task).await;
                    info!("Dashboard polling supervisor stopped");
                    return;
                }
            };
        }
    }

    async fn acquire_and_start(&self) -> SupervisorState {
        if self.shutdown.is_cancelled() {
            return SupervisorState::ShuttingDown(None);
        }

        let mut state = self.coordinator.state.lock().await;
        let watcher = match state.active_watcher.clone() {
            Some(watcher) => watcher,
            None => {
                drop(state);
                debug!("No dashboard watcher installed, waiting");
                return tokio::select! {
                    _ = self.coordinator.watcher_installed.notified() => SupervisorState::AcquireAndStart,
                    _ = self.shutdown.cancelled() => SupervisorState::ShuttingDown(None),
                };
            }
        };

        let cancel = self.shutdown.child_token();
        let id = state.next_task_id;
        state.next_task_id += 1;
        state.tasks_started += 1;
        state.active_task = Some(ActiveTask {
            id,
            cancel: cancel.clone(),
        });

        let name = watcher.name();
        let handle = tokio::spawn(watcher.watch(cancel));
        drop(state);

        debug!(task_id = id, watcher = %name, "Started dashboard watch task");
        SupervisorState::WaitForCompletion(RunningTask {
            id,
            watcher: name,
            handle,
        })
    }

    async fn wait_for_completion(&self, mut task: RunningTask) -> SupervisorState {
        let outcome = tokio::select! {
            outcome = &mut task.handle => Some(outcome),
            _ = self.shutdown.cancelled() => None,
        };

        match outcome {
            Some(outcome) => {
                log_outcome(&task, &outcome);
                self.release(task.id).await;
                SupervisorState::AcquireAndStart
            }
            None => SupervisorState::ShuttingDown(Some(task)),
        }
    }

    async fn shut_down(&self, task: Option<RunningTask>) {
        let Some(mut task) = task else {
            return;
        };

        let grace = self.coordinator.settings().shutdown_grace();
        match tokio::time::timeout(grace, &mut task.handle).await {
            Ok(outcome) => log_outcome(&task, &outcome),
            Err(_) => {
                warn!(
                    task_id = task.id,
                    watcher = %task.watcher,
                    grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                    "Watch task ignored cancellation, aborting"
                );
                task.handle.abort();
            }
        }
        self.release(task.id).await;
    }

    /// Clear the installed cancellation handle if it still belongs to `task_id`.
    async fn release(&self, task_id: u64) {
        let mut state = self.coordinator.state.lock().await;
        if let Some(task) = state.active_task.take_if(|t| t.id == task_id) {
            task.cancel.cancel();
        }
    }
}

fn log_outcome(task: &RunningTask, outcome: &TaskOutcome) {
    match outcome {
        Ok(Ok(())) => debug!(task_id = task.id, watcher = %task.watcher, "Watch task stopped"),
        Ok(Err(e)) => warn!(
            task_id = task.id,
            watcher = %task.watcher,
            error = %e,
            "Watch task exited with error"
        ),
        Err(e) if e.is_panic() => error!(
            task_id = task.id,
            watcher = %task.watcher,
            "Watch task panicked"
        ),
        Err(e) => debug!(task_id = task.id, watcher = %task.watcher, error = %e, "Watch task aborted"),
    }
}
