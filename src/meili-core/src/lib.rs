//! Meili-rs Core Library
//!
//! Wire models and configuration shared by the Meilisearch client:
//! - Client configuration and poll options
//! - Task records and task filters
//! - Index, document, search and key payloads
//! - Typed index settings with boundary validation

pub mod config;
pub mod documents;
pub mod error;
pub mod keys;
pub mod models;
pub mod search;
pub mod settings;
pub mod task;

// Re-export commonly used types
pub use config::{saturating_millis, ClientConfig, PollOptions};
pub use error::{CoreError, Result};
pub use models::*;
pub use task::{EnqueuedTask, Task, TaskStatus, TaskType, TasksFilter, TasksQuery, TasksResults};
