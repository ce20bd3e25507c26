use meili_core::documents::{
    DocumentDeletionFilter, DocumentOptions, DocumentQuery, DocumentsQuery, DocumentsResults,
};
use meili_core::search::{SearchQuery, SearchResponse};
use meili_core::{
    EnqueuedTask, IndexInfo, IndexStats, PollOptions, Task, TasksQuery, TasksResults,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::Client;
use crate::error::Result;
use crate::transport::segment;

const NDJSON: &str = "application/x-ndjson";
const CSV: &str = "text/csv";

/// Handle on one index. Creating it performs no request.
#[derive(Debug, Clone)]
pub struct Index {
    pub uid: String,
    pub primary_key: Option<String>,
    pub(crate) client: Client,
}

impl Index {
    pub(crate) fn new(uid: impl Into<String>, client: Client) -> Self {
        Self {
            uid: uid.into(),
            primary_key: None,
            client,
        }
    }

    pub(crate) fn from_info(info: IndexInfo, client: Client) -> Self {
        Self {
            uid: info.uid,
            primary_key: info.primary_key,
            client,
        }
    }

    /// Client this handle sends requests through
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn path(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("indexes/{}", segment(&self.uid))
        } else {
            format!("indexes/{}/{}", segment(&self.uid), suffix)
        }
    }

    /// Refresh the primary key from the server
    pub async fn fetch_info(&mut self) -> Result<IndexInfo> {
        let info: IndexInfo = self.client.transport().get(&self.path("")).await?;
        self.primary_key = info.primary_key.clone();
        Ok(info)
    }

    /// Document count and field distribution
    pub async fn get_stats(&self) -> Result<IndexStats> {
        self.client.transport().get(&self.path("stats")).await
    }

    /// Enqueue deletion of this index
    pub async fn delete(&self) -> Result<EnqueuedTask> {
        self.client.delete_index(&self.uid).await
    }

    // Search

    /// `POST` search; hits decode into `T`
    pub async fn search<T: DeserializeOwned>(&self, query: &SearchQuery) -> Result<SearchResponse<T>> {
        self.client.transport().post(&self.path("search"), query).await
    }

    /// Search with the parameters on the query string
    pub async fn search_get<T: DeserializeOwned>(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResponse<T>> {
        self.client
            .transport()
            .get_with(&self.path("search"), query)
            .await
    }

    // Documents

    /// One page of documents
    pub async fn get_documents<T: DeserializeOwned>(
        &self,
        query: &DocumentsQuery,
    ) -> Result<DocumentsResults<T>> {
        self.client
            .transport()
            .get_with(&self.path("documents"), query)
            .await
    }

    /// One document by primary key value
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        document_id: &str,
        query: &DocumentQuery,
    ) -> Result<T> {
        self.client
            .transport()
            .get_with(&self.path(&format!("documents/{}", segment(document_id))), query)
            .await
    }

    /// Add or replace documents
    pub async fn add_documents<D: Serialize>(
        &self,
        documents: &[D],
        primary_key: Option<&str>,
    ) -> Result<EnqueuedTask> {
        let options = DocumentOptions {
            primary_key: primary_key.map(String::from),
            ..DocumentOptions::default()
        };
        self.client
            .transport()
            .post_with(&self.path("documents"), documents, &options)
            .await
    }

    /// Add or replace documents from newline-delimited JSON
    pub async fn add_documents_ndjson(
        &self,
        payload: impl Into<Vec<u8>>,
        options: &DocumentOptions,
    ) -> Result<EnqueuedTask> {
        self.client
            .transport()
            .post_raw(&self.path("documents"), NDJSON, payload.into(), options)
            .await
    }

    /// Add or replace documents from CSV with a header row
    pub async fn add_documents_csv(
        &self,
        payload: impl Into<Vec<u8>>,
        options: &DocumentOptions,
    ) -> Result<EnqueuedTask> {
        self.client
            .transport()
            .post_raw(&self.path("documents"), CSV, payload.into(), options)
            .await
    }

    /// Add documents or merge fields into existing ones
    pub async fn update_documents<D: Serialize>(
        &self,
        documents: &[D],
        primary_key: Option<&str>,
    ) -> Result<EnqueuedTask> {
        let options = DocumentOptions {
            primary_key: primary_key.map(String::from),
            ..DocumentOptions::default()
        };
        self.client
            .transport()
            .put_with(&self.path("documents"), documents, &options)
            .await
    }

    /// Enqueue deletion of one document
    pub async fn delete_document(&self, document_id: &str) -> Result<EnqueuedTask> {
        self.client
            .transport()
            .delete(&self.path(&format!("documents/{}", segment(document_id))))
            .await
    }

    /// Enqueue deletion of documents by primary key value
    pub async fn delete_documents<I: Serialize>(&self, document_ids: &[I]) -> Result<EnqueuedTask> {
        self.client
            .transport()
            .post(&self.path("documents/delete-batch"), document_ids)
            .await
    }

    /// Enqueue deletion of every document matching a filter
    pub async fn delete_documents_by_filter(
        &self,
        filter: &DocumentDeletionFilter,
    ) -> Result<EnqueuedTask> {
        self.client
            .transport()
            .post(&self.path("documents/delete"), filter)
            .await
    }

    /// Enqueue deletion of every document, keeping settings
    pub async fn delete_all_documents(&self) -> Result<EnqueuedTask> {
        self.client.transport().delete(&self.path("documents")).await
    }

    // Tasks

    /// Tasks of this index; any index filter in `query` is replaced
    pub async fn get_tasks(&self, query: &TasksQuery) -> Result<TasksResults> {
        let mut query = query.clone();
        query.filter.index_uids = Some(vec![self.uid.clone()]);
        self.client.get_tasks(&query).await
    }

    /// Fetch one task by uid
    pub async fn get_task(&self, task_uid: u32) -> Result<Task> {
        self.client.get_task(task_uid).await
    }

    /// Same as [`Client::wait_for_task`]
    pub async fn wait_for_task(&self, task_uid: u32, options: Option<PollOptions>) -> Result<Task> {
        self.client.wait_for_task(task_uid, options).await
    }

    /// Same as [`Client::wait_for_tasks`]
    pub async fn wait_for_tasks(
        &self,
        task_uids: &[u32],
        options: Option<PollOptions>,
    ) -> Result<Vec<Task>> {
        self.client.wait_for_tasks(task_uids, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meili_core::ClientConfig;

    #[test]
    fn test_paths() {
        let client = Client::new(ClientConfig::new("http://h/api")).unwrap();
        let index = client.index("movies");
        assert_eq!(index.path(""), "indexes/movies");
        assert_eq!(index.path("settings/ranking-rules"), "indexes/movies/settings/ranking-rules");
        assert_eq!(
            client
                .transport()
                .resolve(&index.path("search"), None)
                .unwrap()
                .as_str(),
            "http://h/api/indexes/movies/search"
        );
    }
}
