use serde::{Deserialize, Serialize};

/// Body of `GET /storage/v1/b/{bucket}/o`.
///
/// Only the fields this crate reads are modelled; the rest are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsResponse {
    #[serde(default)]
    pub items: Vec<ObjectResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// An object resource as returned by the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResource {
    /// The object key.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Size in bytes; the API encodes it as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ObjectResource {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket: None,
            size: None,
        }
    }
}
