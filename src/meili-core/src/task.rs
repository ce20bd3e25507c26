use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ResponseError;

/// Lifecycle state of a server-side task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Succeeded, failed and canceled tasks never transition again
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Enqueued => "enqueued",
            TaskStatus::Processing => "processing",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of operation a task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskType {
    IndexCreation,
    IndexUpdate,
    IndexDeletion,
    IndexSwap,
    DocumentAdditionOrUpdate,
    DocumentDeletion,
    SettingsUpdate,
    DumpCreation,
    TaskCancelation,
    TaskDeletion,
    SnapshotCreation,
    #[serde(other)]
    Unknown,
}

/// Handle returned by every mutating call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedTask {
    pub task_uid: u32,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub enqueued_at: DateTime<Utc>,
}

/// Full task record as returned by `GET /tasks/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uid: u32,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub canceled_by: Option<u32>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// Present only when `status` is failed
    #[serde(default)]
    pub error: Option<ResponseError>,
    /// ISO-8601 duration, e.g. `PT0.012S`
    #[serde(default)]
    pub duration: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    pub fn is_canceled(&self) -> bool {
        self.status == TaskStatus::Canceled
    }
}

/// Filters shared by listing, canceling and deleting tasks.
///
/// Unset fields serialize as `null` and are dropped from the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksFilter {
    pub uids: Option<Vec<u32>>,
    pub statuses: Option<Vec<TaskStatus>>,
    pub types: Option<Vec<TaskType>>,
    pub index_uids: Option<Vec<String>>,
    pub canceled_by: Option<Vec<u32>>,
    pub before_enqueued_at: Option<DateTime<Utc>>,
    pub after_enqueued_at: Option<DateTime<Utc>>,
    pub before_started_at: Option<DateTime<Utc>>,
    pub after_started_at: Option<DateTime<Utc>>,
    pub before_finished_at: Option<DateTime<Utc>>,
    pub after_finished_at: Option<DateTime<Utc>>,
}

impl TasksFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uids(mut self, uids: impl IntoIterator<Item = u32>) -> Self {
        self.uids = Some(uids.into_iter().collect());
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = TaskType>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    pub fn with_index_uids<S: Into<String>>(mut self, uids: impl IntoIterator<Item = S>) -> Self {
        self.index_uids = Some(uids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_enqueued_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.after_enqueued_at = after;
        self.before_enqueued_at = before;
        self
    }
}

/// Paginated task listing query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    #[serde(flatten)]
    pub filter: TasksFilter,
    pub limit: Option<u32>,
    pub from: Option<u32>,
}

impl TasksQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: TasksFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_from(mut self, from: u32) -> Self {
        self.from = Some(from);
        self
    }
}

/// Page of tasks returned by `GET /tasks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksResults {
    pub results: Vec<Task>,
    #[serde(default)]
    pub total: Option<u32>,
    pub limit: u32,
    #[serde(default)]
    pub from: Option<u32>,
    #[serde(default)]
    pub next: Option<u32>,
}
