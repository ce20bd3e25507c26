//! Meili-rs Client Library
//!
//! Async HTTP client for Meilisearch servers: typed resource methods over a
//! small transport layer, plus task polling for asynchronous operations.

mod client;
mod error;
mod fetcher;
mod indexes;
mod poller;
mod settings;
mod transport;

pub use client::{Client, EnqueuedTaskExt};
pub use error::{ApiError, CommunicationError, Error, ErrorKind, Result, TimeoutError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use indexes::Index;
pub use poller::TaskPoller;
pub use transport::{
    library_agent, normalize_host, PreparedRequest, RequestBody, RequestOptions, Transport,
    AGENT_SEPARATOR, CLIENT_HEADER,
};

pub use meili_core::documents::{
    DocumentDeletionFilter, DocumentOptions, DocumentQuery, DocumentsQuery, DocumentsResults,
};
pub use meili_core::keys::{Key, KeyCreation, KeyUpdate, KeysQuery, KeysResults};
pub use meili_core::search::{
    IndexSearchQuery, MatchingStrategy, MultiSearchQuery, MultiSearchResponse, SearchHit,
    SearchQuery, SearchResponse,
};
pub use meili_core::settings::{
    Distribution, Embedder, Embedders, FacetSortOrder, Faceting, HuggingFaceEmbedder,
    LocalizedAttribute, MinWordSizeForTypos, OllamaEmbedder, OpenAiEmbedder, Pagination,
    ProximityPrecision, RestEmbedder, Settings, Synonyms, TypoTolerance, UserProvidedEmbedder,
};
pub use meili_core::{
    ClientConfig, CoreError, EnqueuedTask, Health, IndexInfo, IndexStats, IndexSwap,
    IndexesQuery, IndexesResults, PollOptions, ResponseError, Stats, Task, TaskStatus, TaskType,
    TasksFilter, TasksQuery, TasksResults, Version,
};
pub use tokio_util::sync::CancellationToken;
