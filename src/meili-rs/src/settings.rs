//! Index settings accessors.
//!
//! Each category lives at `/indexes/{uid}/settings/{category}` and gets a
//! `get_*`, `update_*` and `reset_*` method. Updates are validated locally
//! and rejected before any request is sent.

use meili_core::settings::{
    validate_attributes, validate_distinct_attribute, validate_embedders,
    validate_localized_attributes, validate_ranking_rules, validate_synonyms, Embedders, Faceting,
    LocalizedAttribute, Pagination, ProximityPrecision, Settings, Synonyms, TypoTolerance,
};
use meili_core::EnqueuedTask;

use crate::error::Result;
use crate::indexes::Index;

fn unchecked<T: ?Sized>(_: &T) -> meili_core::Result<()> {
    Ok(())
}

macro_rules! settings_accessors {
    ($(
        $category:literal => $get:ident / $update:ident / $reset:ident,
        get: $get_ty:ty, set: $set_ty:ty, via $method:ident, check $validate:path;
    )*) => {
        impl Index {
            $(
                #[doc = concat!("Current `", $category, "` setting")]
                pub async fn $get(&self) -> Result<$get_ty> {
                    self.client.transport().get(&self.settings_path($category)).await
                }

                #[doc = concat!("Enqueue an update of `", $category, "`")]
                pub async fn $update(&self, value: &$set_ty) -> Result<EnqueuedTask> {
                    $validate(value)?;
                    self.client
                        .transport()
                        .$method(&self.settings_path($category), value)
                        .await
                }

                #[doc = concat!("Enqueue a reset of `", $category, "` to its default")]
                pub async fn $reset(&self) -> Result<EnqueuedTask> {
                    self.client.transport().delete(&self.settings_path($category)).await
                }
            )*
        }
    };
}

settings_accessors! {
    "displayed-attributes" => get_displayed_attributes / update_displayed_attributes / reset_displayed_attributes,
        get: Vec<String>, set: Vec<String>, via put, check validate_attributes;
    "searchable-attributes" => get_searchable_attributes / update_searchable_attributes / reset_searchable_attributes,
        get: Vec<String>, set: Vec<String>, via put, check validate_attributes;
    "filterable-attributes" => get_filterable_attributes / update_filterable_attributes / reset_filterable_attributes,
        get: Vec<String>, set: Vec<String>, via put, check validate_attributes;
    "sortable-attributes" => get_sortable_attributes / update_sortable_attributes / reset_sortable_attributes,
        get: Vec<String>, set: Vec<String>, via put, check validate_attributes;
    "ranking-rules" => get_ranking_rules / update_ranking_rules / reset_ranking_rules,
        get: Vec<String>, set: Vec<String>, via put, check validate_ranking_rules;
    "stop-words" => get_stop_words / update_stop_words / reset_stop_words,
        get: Vec<String>, set: Vec<String>, via put, check unchecked;
    "synonyms" => get_synonyms / update_synonyms / reset_synonyms,
        get: Synonyms, set: Synonyms, via put, check validate_synonyms;
    "distinct-attribute" => get_distinct_attribute / update_distinct_attribute / reset_distinct_attribute,
        get: Option<String>, set: String, via put, check validate_distinct_attribute;
    "typo-tolerance" => get_typo_tolerance / update_typo_tolerance / reset_typo_tolerance,
        get: TypoTolerance, set: TypoTolerance, via patch, check TypoTolerance::validate;
    "faceting" => get_faceting / update_faceting / reset_faceting,
        get: Faceting, set: Faceting, via patch, check Faceting::validate;
    "pagination" => get_pagination / update_pagination / reset_pagination,
        get: Pagination, set: Pagination, via patch, check Pagination::validate;
    "separator-tokens" => get_separator_tokens / update_separator_tokens / reset_separator_tokens,
        get: Vec<String>, set: Vec<String>, via put, check unchecked;
    "non-separator-tokens" => get_non_separator_tokens / update_non_separator_tokens / reset_non_separator_tokens,
        get: Vec<String>, set: Vec<String>, via put, check unchecked;
    "dictionary" => get_dictionary / update_dictionary / reset_dictionary,
        get: Vec<String>, set: Vec<String>, via put, check unchecked;
    "proximity-precision" => get_proximity_precision / update_proximity_precision / reset_proximity_precision,
        get: ProximityPrecision, set: ProximityPrecision, via put, check unchecked;
    "embedders" => get_embedders / update_embedders / reset_embedders,
        get: Option<Embedders>, set: Embedders, via patch, check validate_embedders;
    "localized-attributes" => get_localized_attributes / update_localized_attributes / reset_localized_attributes,
        get: Option<Vec<LocalizedAttribute>>, set: Vec<LocalizedAttribute>, via put, check validate_localized_attributes;
    "search-cutoff-ms" => get_search_cutoff_ms / update_search_cutoff_ms / reset_search_cutoff_ms,
        get: Option<u64>, set: u64, via put, check unchecked;
}

impl Index {
    fn settings_path(&self, category: &str) -> String {
        self.path(&format!("settings/{}", category))
    }

    /// Every settings category
    pub async fn get_settings(&self) -> Result<Settings> {
        self.client.transport().get(&self.path("settings")).await
    }

    /// Update every populated category at once
    pub async fn update_settings(&self, settings: &Settings) -> Result<EnqueuedTask> {
        settings.validate()?;
        self.client
            .transport()
            .patch(&self.path("settings"), settings)
            .await
    }

    /// Enqueue a reset of every category to its default
    pub async fn reset_settings(&self) -> Result<EnqueuedTask> {
        self.client.transport().delete(&self.path("settings")).await
    }
}
