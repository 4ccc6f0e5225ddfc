use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use url::Url;

use crate::{
    errors::{AppError, AppResult},
    services::storage_connection::{StorageAuth, StorageConnection},
};

pub const STORAGE_API_VERSION: &str = "2023-11-03";
pub const DEFAULT_MAX_BLOB_BYTES: u64 = 50 * 1024 * 1024;

type HmacSha256 = Hmac<Sha256>;

/// Read access to the object store that holds uploaded study documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch(&self, blob_name: &str) -> AppResult<Vec<u8>>;
}

pub struct AzureBlobStore {
    http: reqwest::Client,
    connection: StorageConnection,
    container: String,
    max_bytes: u64,
}

impl AzureBlobStore {
    pub fn new(connection: StorageConnection, container: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            connection,
            container: container.into(),
            max_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, blob_name: &str) -> AppError {
        log::warn!("Blob {} exceeds the {} byte limit", blob_name, self.max_bytes);
        AppError::DocumentRetrieval(format!(
            "Document '{}' is larger than {} bytes",
            blob_name, self.max_bytes
        ))
    }

    pub fn from_connection_string(connection_string: &str, container: &str) -> AppResult<Self> {
        Ok(Self::new(StorageConnection::parse(connection_string)?, container))
    }

    fn blob_url(&self, blob_name: &str) -> AppResult<Url> {
        let mut url = self.connection.blob_endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InternalError("blob endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(&self.container)
            .extend(blob_name.split('/'));

        if let StorageAuth::SharedAccessSignature(sas) = &self.connection.auth {
            url.set_query(Some(sas.expose_secret()));
        }
        Ok(url)
    }

    fn authorization(&self, url: &Url, headers: &[(&str, &str)]) -> AppResult<Option<String>> {
        let Some(key) = self.connection.account_key()? else {
            return Ok(None);
        };

        let resource = canonicalized_resource(&self.connection.account_name, url);
        let payload = string_to_sign("GET", headers, &resource);
        let signature = sign(&key, &payload)?;

        Ok(Some(format!(
            "SharedKey {}:{}",
            self.connection.account_name, signature
        )))
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn fetch(&self, blob_name: &str) -> AppResult<Vec<u8>> {
        let url = self.blob_url(blob_name)?;
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let ms_headers = [("x-ms-date", date.as_str()), ("x-ms-version", STORAGE_API_VERSION)];

        let mut request = self.http.get(url.clone());
        for (name, value) in ms_headers {
            request = request.header(name, value);
        }
        if let Some(authorization) = self.authorization(&url, &ms_headers)? {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }

        log::debug!("Downloading blob {}/{}", self.container, blob_name);

        let mut response = request.send().await.map_err(|e| {
            log::error!("Failed to reach blob storage: {}", e);
            AppError::DocumentRetrieval(format!("failed to reach blob storage: {}", e))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Document '{}' not found", blob_name)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Blob storage returned {} for {}: {}", status, blob_name, body);
            return Err(AppError::DocumentRetrieval(format!(
                "blob storage returned {} for '{}'",
                status, blob_name
            )));
        }

        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large(blob_name));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large(blob_name));
            }
            bytes.extend_from_slice(&chunk);
        }
        log::info!("Downloaded {} ({} bytes)", blob_name, bytes.len());
        Ok(bytes)
    }
}

/// `/{account}{encoded path}`; the path already carries the container.
pub fn canonicalized_resource(account_name: &str, url: &Url) -> String {
    format!("/{}{}", account_name, url.path())
}

/// Shared Key string-to-sign for a body-less request with no standard
/// headers: the verb, eleven empty standard header slots, the sorted
/// `x-ms-*` headers and the canonicalized resource.
pub fn string_to_sign(method: &str, ms_headers: &[(&str, &str)], resource: &str) -> String {
    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim()))
        .filter(|(name, _)| name.starts_with("x-ms-"))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut payload = String::from(method);
    payload.push('\n');
    // Content-Encoding .. Range
    payload.push_str(&"\n".repeat(11));
    for (name, value) in headers {
        payload.push_str(&name);
        payload.push(':');
        payload.push_str(value);
        payload.push('\n');
    }
    payload.push_str(resource);
    payload
}

pub fn sign(key: &[u8], payload: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::InternalError(format!("invalid signing key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
