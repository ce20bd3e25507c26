use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API key record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub uid: Uuid,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /keys`. `expires_at` is always sent, `null` meaning
/// the key never expires.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCreation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl KeyCreation {
    pub fn new<A, I>(actions: A, indexes: I) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            uid: None,
            name: None,
            description: None,
            actions: actions.into_iter().map(Into::into).collect(),
            indexes: indexes.into_iter().map(Into::into).collect(),
            expires_at: None,
        }
    }

    pub fn with_uid(mut self, uid: Uuid) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Body of `PATCH /keys/{key}`; only name and description are mutable
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KeysQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeysResults {
    pub results: Vec<Key>,
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_creation_sends_null_expiry() {
        let uid = Uuid::parse_str("3db051e0-423d-4b5c-a63a-f82a7043dce6").unwrap();
        let creation = KeyCreation::new(["documents.add"], ["products"])
            .with_uid(uid)
            .with_description("Indexing Products API key");

        assert_eq!(
            serde_json::to_value(&creation).unwrap(),
            json!({
                "uid": "3db051e0-423d-4b5c-a63a-f82a7043dce6",
                "description": "Indexing Products API key",
                "actions": ["documents.add"],
                "indexes": ["products"],
                "expiresAt": null
            })
        );
    }
}
