//! Hosted media integration: upload signing, deletion and listing of
//! product images, plus the helpers that keep a product's image URLs and
//! public ids index-aligned.

pub mod cloudinary;
pub mod images;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use cloudinary::CloudinaryStore;
pub use images::{
    align_public_ids, public_id_from_url, realign_public_ids, remove_image, resolve_public_id, tenant_prefix,
    upload_folder,
};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host credentials are not configured")]
    NotConfigured,

    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media host rejected the request: {0}")]
    Rejected(String),
}

/// Everything a browser needs to upload straight to the media host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub signature: String,
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    pub upload_url: String,
    pub folder: String,
}

/// An asset stored on the media host
#[derive(Debug, Clone, PartialEq)]
pub struct MediaResource {
    pub public_id: String,
    pub resource_type: String,
    pub created_at: DateTime<Utc>,
    pub bytes: u64,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Sign a direct upload into `folder`
    fn sign_upload(&self, folder: &str, timestamp: i64) -> Result<UploadTicket, MediaError>;

    /// Delete one image; returns false when the host reports it missing
    async fn destroy(&self, public_id: &str) -> Result<bool, MediaError>;

    /// Every uploaded resource whose public id starts with `prefix`
    async fn list_resources(&self, prefix: &str) -> Result<Vec<MediaResource>, MediaError>;

    async fn resource_exists(&self, public_id: &str) -> Result<bool, MediaError>;
}
