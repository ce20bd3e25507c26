//! Typed index settings.
//!
//! Each settings category is an explicit record. `Settings` groups all of
//! them for the bulk `PATCH /indexes/{uid}/settings` call; unset fields are
//! left untouched on the server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

pub type Synonyms = BTreeMap<String, Vec<String>>;
pub type Embedders = BTreeMap<String, Embedder>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayed_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_rules: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Synonyms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typo_tolerance: Option<TypoTolerance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faceting: Option<Faceting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator_tokens: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_separator_tokens: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_precision: Option<ProximityPrecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedders: Option<Embedders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_attributes: Option<Vec<LocalizedAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_cutoff_ms: Option<u64>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ranking_rules<S: Into<String>>(mut self, rules: impl IntoIterator<Item = S>) -> Self {
        self.ranking_rules = Some(rules.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_searchable_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.searchable_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filterable_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.filterable_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sortable_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.sortable_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_stop_words<S: Into<String>>(mut self, words: impl IntoIterator<Item = S>) -> Self {
        self.stop_words = Some(words.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_synonyms(mut self, synonyms: Synonyms) -> Self {
        self.synonyms = Some(synonyms);
        self
    }

    pub fn with_distinct_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.distinct_attribute = Some(attribute.into());
        self
    }

    pub fn with_typo_tolerance(mut self, typo_tolerance: TypoTolerance) -> Self {
        self.typo_tolerance = Some(typo_tolerance);
        self
    }

    pub fn with_faceting(mut self, faceting: Faceting) -> Self {
        self.faceting = Some(faceting);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_embedders(mut self, embedders: Embedders) -> Self {
        self.embedders = Some(embedders);
        self
    }

    /// Check every populated category before it goes on the wire
    pub fn validate(&self) -> Result<()> {
        for attributes in [
            &self.displayed_attributes,
            &self.searchable_attributes,
            &self.filterable_attributes,
            &self.sortable_attributes,
        ]
        .into_iter()
        .flatten()
        {
            validate_attributes(attributes)?;
        }
        if let Some(rules) = &self.ranking_rules {
            validate_ranking_rules(rules)?;
        }
        if let Some(synonyms) = &self.synonyms {
            validate_synonyms(synonyms)?;
        }
        if let Some(attribute) = &self.distinct_attribute {
            validate_distinct_attribute(attribute)?;
        }
        if let Some(typo_tolerance) = &self.typo_tolerance {
            typo_tolerance.validate()?;
        }
        if let Some(faceting) = &self.faceting {
            faceting.validate()?;
        }
        if let Some(pagination) = &self.pagination {
            pagination.validate()?;
        }
        if let Some(embedders) = &self.embedders {
            validate_embedders(embedders)?;
        }
        if let Some(localized) = &self.localized_attributes {
            validate_localized_attributes(localized)?;
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidSettings(message.into())
}

pub fn validate_attributes(attributes: &[String]) -> Result<()> {
    if attributes.iter().any(|a| a.trim().is_empty()) {
        return Err(invalid("attribute names must not be empty"));
    }
    Ok(())
}

/// Built-in rule names; anything else must be a `attr:asc` / `attr:desc` sort rule
const BUILTIN_RANKING_RULES: &[&str] = &[
    "words",
    "typo",
    "proximity",
    "attribute",
    "sort",
    "exactness",
];

pub fn validate_ranking_rules(rules: &[String]) -> Result<()> {
    for rule in rules {
        if BUILTIN_RANKING_RULES.contains(&rule.as_str()) {
            continue;
        }
        match rule.rsplit_once(':') {
            Some((attribute, "asc" | "desc")) if !attribute.trim().is_empty() => {}
            _ => {
                return Err(invalid(format!(
                    "ranking rule `{}` is neither a built-in rule nor `attribute:asc|desc`",
                    rule
                )))
            }
        }
    }
    Ok(())
}

pub fn validate_synonyms(synonyms: &Synonyms) -> Result<()> {
    if synonyms.keys().any(|word| word.trim().is_empty()) {
        return Err(invalid("synonym keys must not be empty"));
    }
    Ok(())
}

pub fn validate_distinct_attribute(attribute: &str) -> Result<()> {
    if attribute.trim().is_empty() {
        return Err(invalid("distinct attribute must not be empty"));
    }
    Ok(())
}

pub fn validate_embedders(embedders: &Embedders) -> Result<()> {
    for (name, embedder) in embedders {
        if name.trim().is_empty() {
            return Err(invalid("embedder names must not be empty"));
        }
        embedder
            .validate()
            .map_err(|e| invalid(format!("embedder `{}`: {}", name, e)))?;
    }
    Ok(())
}

pub fn validate_localized_attributes(rules: &[LocalizedAttribute]) -> Result<()> {
    if rules.iter().any(|rule| rule.attribute_patterns.is_empty()) {
        return Err(invalid("localized attribute rules need at least one pattern"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinWordSizeForTypos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_typo: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_typos: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypoTolerance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_word_size_for_typos: Option<MinWordSizeForTypos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_on_words: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_on_attributes: Option<Vec<String>>,
}

impl TypoTolerance {
    pub fn validate(&self) -> Result<()> {
        if let Some(MinWordSizeForTypos {
            one_typo: Some(one),
            two_typos: Some(two),
        }) = &self.min_word_size_for_typos
        {
            if one > two {
                return Err(invalid(format!(
                    "minWordSizeForTypos.oneTypo ({}) must not exceed twoTypos ({})",
                    one, two
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetSortOrder {
    Alpha,
    Count,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faceting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_values_per_facet: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_facet_values_by: Option<BTreeMap<String, FacetSortOrder>>,
}

impl Faceting {
    pub fn validate(&self) -> Result<()> {
        if self.max_values_per_facet == Some(0) {
            return Err(invalid("faceting.maxValuesPerFacet must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_hits: Option<usize>,
}

impl Pagination {
    pub fn validate(&self) -> Result<()> {
        if self.max_total_hits == Some(0) {
            return Err(invalid("pagination.maxTotalHits must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProximityPrecision {
    ByWord,
    ByAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedAttribute {
    pub attribute_patterns: Vec<String>,
    pub locales: Vec<String>,
}

/// Embedder configuration, discriminated by its `source`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum Embedder {
    UserProvided(UserProvidedEmbedder),
    OpenAi(OpenAiEmbedder),
    HuggingFace(HuggingFaceEmbedder),
    Ollama(OllamaEmbedder),
    Rest(RestEmbedder),
}

impl Embedder {
    pub fn validate(&self) -> Result<()> {
        match self {
            Embedder::UserProvided(embedder) if embedder.dimensions == 0 => {
                Err(invalid("userProvided embedders need dimensions > 0"))
            }
            Embedder::OpenAi(OpenAiEmbedder {
                dimensions: Some(0),
                ..
            })
            | Embedder::Ollama(OllamaEmbedder {
                dimensions: Some(0),
                ..
            })
            | Embedder::Rest(RestEmbedder {
                dimensions: Some(0),
                ..
            }) => Err(invalid("dimensions must be greater than 0 when set")),
            Embedder::Rest(embedder) if embedder.url.trim().is_empty() => {
                Err(invalid("rest embedders need a url"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    pub sigma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProvidedEmbedder {
    pub dimensions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiEmbedder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuggingFaceEmbedder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OllamaEmbedder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestEmbedder {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}
