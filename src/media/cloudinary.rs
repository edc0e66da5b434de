use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{MediaError, MediaResource, MediaStore, UploadTicket};
use crate::config::MediaConfig;

const PAGE_SIZE: u32 = 500;

/// Cloudinary REST client. Requests are signed with SHA-256, so the account
/// must have SHA-256 API signatures enabled.
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct ResourcePage {
    #[serde(default)]
    resources: Vec<RawResource>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    public_id: String,
    #[serde(default)]
    resource_type: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    bytes: u64,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn from_config(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn ensure_configured(&self) -> Result<(), MediaError> {
        if self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(MediaError::NotConfigured);
        }
        Ok(())
    }

    /// `k=v` pairs sorted by key, joined with `&`, secret appended, SHA-256 hex.
    /// Empty values are not signed.
    pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
        let mut pairs: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base_url, self.cloud_name, path)
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    fn sign_upload(&self, folder: &str, timestamp: i64) -> Result<UploadTicket, MediaError> {
        self.ensure_configured()?;

        let params = [("folder", folder.to_string()), ("timestamp", timestamp.to_string())];
        Ok(UploadTicket {
            signature: Self::sign_params(&params, &self.api_secret),
            timestamp,
            api_key: self.api_key.clone(),
            cloud_name: self.cloud_name.clone(),
            upload_url: self.endpoint("image/upload"),
            folder: folder.to_string(),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, MediaError> {
        self.ensure_configured()?;

        let timestamp = Utc::now().timestamp().to_string();
        let params = [("public_id", public_id.to_string()), ("timestamp", timestamp.clone())];
        let signature = Self::sign_params(&params, &self.api_secret);

        let response: DestroyResponse = self
            .client
            .post(self.endpoint("image/destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(MediaError::Rejected(error.message));
        }

        match response.result.as_deref() {
            Some("ok") => Ok(true),
            Some("not found") => Ok(false),
            other => Err(MediaError::Rejected(format!("unexpected destroy result: {:?}", other))),
        }
    }

    async fn list_resources(&self, prefix: &str) -> Result<Vec<MediaResource>, MediaError> {
        self.ensure_configured()?;

        let mut resources = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("prefix", prefix.to_string()),
                ("max_results", PAGE_SIZE.to_string()),
            ];
            if let Some(next) = &cursor {
                query.push(("next_cursor", next.clone()));
            }

            let page: ResourcePage = self
                .client
                .get(self.endpoint("resources/image/upload"))
                .basic_auth(&self.api_key, Some(&self.api_secret))
                .query(&query)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            resources.extend(page.resources.into_iter().map(|r| MediaResource {
                public_id: r.public_id,
                resource_type: if r.resource_type.is_empty() { "image".to_string() } else { r.resource_type },
                created_at: r.created_at,
                bytes: r.bytes,
            }));

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Listed {} media resources under '{}'", resources.len(), prefix);
        Ok(resources)
    }

    async fn resource_exists(&self, public_id: &str) -> Result<bool, MediaError> {
        self.ensure_configured()?;

        let response = self
            .client
            .get(self.endpoint(&format!("resources/image/upload/{}", public_id)))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(MediaError::Rejected(format!("resource lookup returned {}", status))),
        }
    }
}
