use async_trait::async_trait;
use meili_core::keys::{Key, KeyCreation, KeyUpdate, KeysQuery, KeysResults};
use meili_core::search::{MultiSearchQuery, MultiSearchResponse};
use meili_core::{
    ClientConfig, EnqueuedTask, Health, IndexCreation, IndexInfo, IndexSwap, IndexUpdate,
    IndexesQuery, IndexesResults, PollOptions, Stats, Task, TasksFilter, TasksQuery, TasksResults,
    Version,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::indexes::Index;
use crate::poller::TaskPoller;
use crate::transport::{segment, Transport};

/// Meilisearch REST API client
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
    poller: TaskPoller,
}

impl Client {
    /// Create a client using the default reqwest fetcher
    pub fn new(config: ClientConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Create a client that sends every request through `fetcher`
    pub fn with_fetcher(config: ClientConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let transport = Transport::new(&config, fetcher)?;
        let poller = TaskPoller::new(transport.clone(), config.poll);
        Ok(Self { transport, poller })
    }

    /// Create a client from `MEILI_HOST` / `MEILI_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// A handle whose requests and task waits stop with `Error::Canceled`
    /// once `token` is cancelled. Other handles are unaffected.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let transport = self.transport.with_cancellation(token);
        let poller = TaskPoller::new(transport.clone(), self.poller.defaults());
        Self { transport, poller }
    }

    /// Request layer shared by every handle of this client
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Handle on an index, without checking that it exists
    pub fn index(&self, uid: impl Into<String>) -> Index {
        Index::new(uid, self.clone())
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health> {
        self.transport.get("health").await
    }

    /// `false` on any error, including an unreachable server
    pub async fn is_healthy(&self) -> bool {
        self.health()
            .await
            .map(|health| health.is_available())
            .unwrap_or(false)
    }

    /// Server version and build information
    pub async fn version(&self) -> Result<Version> {
        self.transport.get("version").await
    }

    /// Database size and per-index statistics
    pub async fn stats(&self) -> Result<Stats> {
        self.transport.get("stats").await
    }

    // Indexes

    /// List indexes, one page at a time
    pub async fn get_indexes(&self, query: &IndexesQuery) -> Result<IndexesResults> {
        self.transport.get_with("indexes", query).await
    }

    /// Index metadata without wrapping it in a handle
    pub async fn get_raw_index(&self, uid: &str) -> Result<IndexInfo> {
        self.transport.get(&format!("indexes/{}", segment(uid))).await
    }

    /// Fetch an index and return a handle carrying its primary key
    pub async fn get_index(&self, uid: &str) -> Result<Index> {
        let info = self.get_raw_index(uid).await?;
        Ok(Index::from_info(info, self.clone()))
    }

    /// Enqueue creation of `uid`, optionally fixing its primary key
    pub async fn create_index(&self, uid: &str, primary_key: Option<&str>) -> Result<EnqueuedTask> {
        let body = IndexCreation {
            uid: uid.to_string(),
            primary_key: primary_key.map(String::from),
        };
        self.transport.post("indexes", &body).await
    }

    /// Enqueue a primary key change
    pub async fn update_index(&self, uid: &str, primary_key: Option<&str>) -> Result<EnqueuedTask> {
        let body = IndexUpdate {
            primary_key: primary_key.map(String::from),
        };
        self.transport.patch(&format!("indexes/{}", segment(uid)), &body).await
    }

    /// Enqueue deletion of an index and all of its documents
    pub async fn delete_index(&self, uid: &str) -> Result<EnqueuedTask> {
        self.transport.delete(&format!("indexes/{}", segment(uid))).await
    }

    /// Atomically swap the contents of each pair of indexes
    pub async fn swap_indexes(&self, swaps: &[IndexSwap]) -> Result<EnqueuedTask> {
        self.transport.post("swap-indexes", swaps).await
    }

    // Tasks

    /// List tasks matching `query`, newest first
    pub async fn get_tasks(&self, query: &TasksQuery) -> Result<TasksResults> {
        self.transport.get_with("tasks", query).await
    }

    /// Fetch one task by uid, without waiting
    pub async fn get_task(&self, task_uid: u32) -> Result<Task> {
        self.transport.get(&format!("tasks/{}", task_uid)).await
    }

    /// Cancel every enqueued or processing task matching `filter`
    pub async fn cancel_tasks(&self, filter: &TasksFilter) -> Result<EnqueuedTask> {
        self.transport.post_empty("tasks/cancel", Some(filter)).await
    }

    /// Delete finished tasks matching `filter` from the task history
    pub async fn delete_tasks(&self, filter: &TasksFilter) -> Result<EnqueuedTask> {
        self.transport.delete_with("tasks", filter).await
    }

    /// Poll until the task is terminal; `None` uses the configured defaults
    pub async fn wait_for_task(&self, task_uid: u32, options: Option<PollOptions>) -> Result<Task> {
        self.poller.wait_for_task(task_uid, options).await
    }

    /// Poll several tasks concurrently; results follow the order of `task_uids`
    pub async fn wait_for_tasks(
        &self,
        task_uids: &[u32],
        options: Option<PollOptions>,
    ) -> Result<Vec<Task>> {
        self.poller.wait_for_tasks(task_uids, options).await
    }

    // Keys

    /// List API keys
    pub async fn get_keys(&self, query: &KeysQuery) -> Result<KeysResults> {
        self.transport.get_with("keys", query).await
    }

    /// Look a key up by its value or its uid
    pub async fn get_key(&self, key_or_uid: &str) -> Result<Key> {
        self.transport.get(&format!("keys/{}", segment(key_or_uid))).await
    }

    /// Create an API key
    pub async fn create_key(&self, key: &KeyCreation) -> Result<Key> {
        self.transport.post("keys", key).await
    }

    /// Change a key's name or description
    pub async fn update_key(&self, key_or_uid: &str, update: &KeyUpdate) -> Result<Key> {
        self.transport
            .patch(&format!("keys/{}", segment(key_or_uid)), update)
            .await
    }

    /// Revoke a key
    pub async fn delete_key(&self, key_or_uid: &str) -> Result<()> {
        self.transport.delete(&format!("keys/{}", segment(key_or_uid))).await
    }

    // Misc

    /// Run several searches in one request
    pub async fn multi_search<T: DeserializeOwned>(
        &self,
        queries: &MultiSearchQuery,
    ) -> Result<MultiSearchResponse<T>> {
        self.transport.post("multi-search", queries).await
    }

    /// Enqueue a dump of the whole database
    pub async fn create_dump(&self) -> Result<EnqueuedTask> {
        self.transport.post_empty::<_, ()>("dumps", None).await
    }

    /// Enqueue a snapshot of the whole database
    pub async fn create_snapshot(&self) -> Result<EnqueuedTask> {
        self.transport.post_empty::<_, ()>("snapshots", None).await
    }
}

/// Wait on a task straight from the response that enqueued it
#[async_trait]
pub trait EnqueuedTaskExt {
    async fn wait(&self, client: &Client, options: Option<PollOptions>) -> Result<Task>;
}

#[async_trait]
impl EnqueuedTaskExt for EnqueuedTask {
    async fn wait(&self, client: &Client, options: Option<PollOptions>) -> Result<Task> {
        client.wait_for_task(self.task_uid, options).await
    }
}
