use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One blob record as returned by the store, both from a put response and
/// from listing pages. Fields absent in the JSON fall back to empty values.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BlobMeta {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub content_disposition: String,
    pub content_type: String,
}

/// One page of listing results.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlobList {
    pub has_more: bool,
    pub cursor: Option<String>,
    pub blobs: Vec<BlobMeta>,
}

#[derive(Clone, Debug, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub add_random_suffix: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}
