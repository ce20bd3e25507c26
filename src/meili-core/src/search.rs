use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How query terms must match documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchingStrategy {
    Last,
    All,
    Frequency,
}

/// Semantic part of a hybrid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridQuery {
    pub embedder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_ratio: Option<f32>,
}

/// Search parameters, sent as a JSON body for `POST .../search` or as
/// query parameters for `GET .../search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<usize>,
    /// A filter expression string or nested array of expressions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_crop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_highlight: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_pre_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_post_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_matches_position: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_ranking_score: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_strategy: Option<MatchingStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_search_on: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid: Option<HybridQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieve_vectors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locales: Option<Vec<String>>,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    /// Placeholder search returning every document
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_page(mut self, page: usize, hits_per_page: usize) -> Self {
        self.page = Some(page);
        self.hits_per_page = Some(hits_per_page);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<serde_json::Value>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_facets<S: Into<String>>(mut self, facets: impl IntoIterator<Item = S>) -> Self {
        self.facets = Some(facets.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sort<S: Into<String>>(mut self, sort: impl IntoIterator<Item = S>) -> Self {
        self.sort = Some(sort.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_attributes_to_retrieve<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.attributes_to_retrieve = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_attributes_to_search_on<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.attributes_to_search_on = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_matching_strategy(mut self, strategy: MatchingStrategy) -> Self {
        self.matching_strategy = Some(strategy);
        self
    }

    pub fn with_hybrid(mut self, embedder: impl Into<String>, semantic_ratio: f32) -> Self {
        self.hybrid = Some(HybridQuery {
            embedder: embedder.into(),
            semantic_ratio: Some(semantic_ratio),
        });
        self
    }
}

/// Byte range of a match inside an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub length: usize,
}

/// A document hit plus the optional per-hit metadata fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit<T> {
    #[serde(flatten)]
    pub result: T,
    #[serde(rename = "_formatted", default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "_matchesPosition", default, skip_serializing_if = "Option::is_none")]
    pub matches_position: Option<HashMap<String, Vec<MatchRange>>>,
    #[serde(rename = "_rankingScore", default, skip_serializing_if = "Option::is_none")]
    pub ranking_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacetStats {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<T> {
    pub hits: Vec<SearchHit<T>>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub estimated_total_hits: Option<usize>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub hits_per_page: Option<usize>,
    #[serde(default)]
    pub total_hits: Option<usize>,
    #[serde(default)]
    pub total_pages: Option<usize>,
    #[serde(default)]
    pub facet_distribution: Option<HashMap<String, HashMap<String, u64>>>,
    #[serde(default)]
    pub facet_stats: Option<HashMap<String, FacetStats>>,
    pub processing_time_ms: u64,
    #[serde(default)]
    pub query: String,
}

/// One query of a multi-search batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchQuery {
    pub index_uid: String,
    #[serde(flatten)]
    pub query: SearchQuery,
}

impl IndexSearchQuery {
    pub fn new(index_uid: impl Into<String>, query: SearchQuery) -> Self {
        Self {
            index_uid: index_uid.into(),
            query,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiSearchQuery {
    pub queries: Vec<IndexSearchQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchResponse<T> {
    pub index_uid: String,
    #[serde(flatten)]
    pub response: SearchResponse<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSearchResponse<T> {
    pub results: Vec<IndexSearchResponse<T>>,
}
