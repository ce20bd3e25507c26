//! Task completion polling.
//!
//! Every write on the server returns an [`EnqueuedTask`](meili_core::EnqueuedTask);
//! the poller re-fetches `GET /tasks/{uid}` until the task reaches a terminal
//! status or the wait budget runs out. A `failed` or `canceled` task is a
//! successful wait: the outcome is read from the returned [`Task`].
//!
//! The budget covers the status fetches too: a fetch still in flight when
//! the deadline passes is dropped and the wait fails with a timeout.

use futures::future::try_join_all;
use meili_core::{saturating_millis, PollOptions, Task};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{Error, Result, TimeoutError};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct TaskPoller {
    transport: Transport,
    defaults: PollOptions,
}

impl TaskPoller {
    pub fn new(transport: Transport, defaults: PollOptions) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    /// Options used when a call passes `None`
    pub fn defaults(&self) -> PollOptions {
        self.defaults
    }

    /// Wait until `task_uid` is terminal
    pub async fn wait_for_task(&self, task_uid: u32, options: Option<PollOptions>) -> Result<Task> {
        let options = options.unwrap_or(self.defaults);
        let started = Instant::now();
        let deadline = started.checked_add(options.timeout());
        let mut attempts: u32 = 0;

        loop {
            let task = match within(deadline, self.fetch_task(task_uid)).await {
                Some(task) => task?,
                None => {
                    debug!(task_uid, attempts, "status fetch outlived the wait budget");
                    return Err(timeout_error(vec![task_uid], options, started.elapsed()));
                }
            };
            attempts += 1;

            if task.is_terminal() {
                info!(
                    task_uid,
                    status = %task.status,
                    attempts,
                    elapsed_ms = saturating_millis(started.elapsed()),
                    "task resolved"
                );
                return Ok(task);
            }

            let elapsed = started.elapsed();
            if elapsed >= options.timeout() {
                return Err(timeout_error(vec![task_uid], options, elapsed));
            }

            debug!(task_uid, status = %task.status, attempts, "task still pending");
            self.pause(options.interval(), deadline, &task_path(task_uid))
                .await?;
        }
    }

    /// Wait until every task in `task_uids` is terminal. Results follow the
    /// input order; tasks already terminal are not fetched again.
    pub async fn wait_for_tasks(
        &self,
        task_uids: &[u32],
        options: Option<PollOptions>,
    ) -> Result<Vec<Task>> {
        if task_uids.is_empty() {
            return Ok(Vec::new());
        }

        let options = options.unwrap_or(self.defaults);
        let started = Instant::now();
        let deadline = started.checked_add(options.timeout());
        let mut resolved: Vec<Option<Task>> = task_uids.iter().map(|_| None).collect();

        loop {
            let pending: Vec<usize> = resolved
                .iter()
                .enumerate()
                .filter(|(_, task)| task.is_none())
                .map(|(position, _)| position)
                .collect();

            // `None` marks a fetch cut off by the deadline
            let fetched = try_join_all(pending.iter().map(|&position| async move {
                match within(deadline, self.fetch_task(task_uids[position])).await {
                    Some(task) => task.map(Some),
                    None => Ok(None),
                }
            }))
            .await?;

            let mut stalled = false;
            for (position, task) in pending.into_iter().zip(fetched) {
                match task {
                    Some(task) if task.is_terminal() => resolved[position] = Some(task),
                    Some(_) => {}
                    None => stalled = true,
                }
            }

            if resolved.iter().all(Option::is_some) {
                info!(
                    count = task_uids.len(),
                    elapsed_ms = saturating_millis(started.elapsed()),
                    "tasks resolved"
                );
                return Ok(resolved.into_iter().flatten().collect());
            }

            let elapsed = started.elapsed();
            if stalled || elapsed >= options.timeout() {
                let still_pending = task_uids
                    .iter()
                    .zip(&resolved)
                    .filter(|(_, task)| task.is_none())
                    .map(|(uid, _)| *uid)
                    .collect();
                return Err(timeout_error(still_pending, options, elapsed));
            }

            debug!(
                pending = resolved.iter().filter(|task| task.is_none()).count(),
                "tasks still pending"
            );
            self.pause(options.interval(), deadline, "tasks").await?;
        }
    }

    async fn fetch_task(&self, task_uid: u32) -> Result<Task> {
        self.transport.get(&task_path(task_uid)).await
    }

    /// Sleep for `interval` but never past `deadline`, or just yield to the
    /// scheduler when the interval is zero. Returns `Canceled` as soon as the
    /// handle's token fires.
    async fn pause(&self, interval: Duration, deadline: Option<Instant>, path: &str) -> Result<()> {
        let interval = match deadline {
            Some(deadline) => interval.min(deadline.saturating_duration_since(Instant::now())),
            None => interval,
        };
        let wait = async {
            if interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(interval).await;
            }
        };

        match self.transport.cancellation() {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    let url = self
                        .transport
                        .resolve(path, None)
                        .map(String::from)
                        .unwrap_or_else(|_| path.to_string());
                    debug!(url = %url, "task wait canceled");
                    Err(Error::Canceled { url })
                }
                _ = wait => Ok(()),
            },
            None => {
                wait.await;
                Ok(())
            }
        }
    }
}

/// Run `future` until `deadline`. A future that is ready on its first poll
/// completes even when the deadline has already passed.
async fn within<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

fn task_path(task_uid: u32) -> String {
    format!("tasks/{}", task_uid)
}

fn timeout_error(task_uids: Vec<u32>, options: PollOptions, elapsed: Duration) -> Error {
    Error::Timeout(TimeoutError {
        task_uids,
        timeout_ms: options.timeout_ms,
        elapsed_ms: saturating_millis(elapsed),
    })
}
