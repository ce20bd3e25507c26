use serde::{Deserialize, Serialize};

/// Query for `GET /indexes/{uid}/documents`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub fields: Option<Vec<String>>,
    pub filter: Option<String>,
    pub retrieve_vectors: Option<bool>,
}

impl DocumentsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Query for `GET /indexes/{uid}/documents/{id}`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub fields: Option<Vec<String>>,
    pub retrieve_vectors: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsResults<T> {
    pub results: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
}

/// Query string accepted by document additions and updates
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    pub primary_key: Option<String>,
    /// Only meaningful for CSV payloads
    pub csv_delimiter: Option<String>,
}

impl DocumentOptions {
    pub fn with_primary_key(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: Some(primary_key.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST /indexes/{uid}/documents/delete`
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDeletionFilter {
    pub filter: serde_json::Value,
}

impl DocumentDeletionFilter {
    pub fn new(filter: impl Into<serde_json::Value>) -> Self {
        Self {
            filter: filter.into(),
        }
    }
}
