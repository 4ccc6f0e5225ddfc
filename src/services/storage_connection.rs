use std::collections::HashMap;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::errors::{AppError, AppResult};

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// How requests against the blob endpoint are authorized.
#[derive(Clone, Debug)]
pub enum StorageAuth {
    /// Base64 account key, used for Shared Key request signing.
    SharedKey(SecretString),
    /// SAS token appended to every request URL (no leading `?`).
    SharedAccessSignature(SecretString),
    /// Public container access.
    Anonymous,
}

/// A parsed Azure Storage connection string, reduced to what blob reads need.
#[derive(Clone, Debug)]
pub struct StorageConnection {
    pub account_name: String,
    pub blob_endpoint: Url,
    pub auth: StorageAuth,
}

impl StorageConnection {
    pub fn parse(connection_string: &str) -> AppResult<Self> {
        let settings = parse_settings(connection_string)?;

        if settings
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(Self::development());
        }

        let account_name = settings.get("accountname").cloned();

        let blob_endpoint = match settings.get("blobendpoint") {
            Some(endpoint) => parse_endpoint(endpoint)?,
            None => {
                let account = account_name.as_deref().ok_or_else(|| {
                    invalid("AccountName is required when BlobEndpoint is not set")
                })?;
                let protocol = settings
                    .get("defaultendpointsprotocol")
                    .map(String::as_str)
                    .unwrap_or("https");
                let suffix = settings
                    .get("endpointsuffix")
                    .map(String::as_str)
                    .unwrap_or("core.windows.net");
                parse_endpoint(&format!("{}://{}.blob.{}", protocol, account, suffix))?
            }
        };

        let auth = if let Some(sas) = settings.get("sharedaccesssignature") {
            StorageAuth::SharedAccessSignature(SecretString::from(
                sas.trim_start_matches('?').to_string(),
            ))
        } else if let Some(key) = settings.get("accountkey") {
            if account_name.is_none() {
                return Err(invalid("AccountKey requires AccountName"));
            }
            STANDARD
                .decode(key)
                .map_err(|e| invalid(&format!("AccountKey is not valid base64: {}", e)))?;
            StorageAuth::SharedKey(SecretString::from(key.clone()))
        } else {
            StorageAuth::Anonymous
        };

        Ok(Self {
            account_name: account_name.unwrap_or_default(),
            blob_endpoint,
            auth,
        })
    }

    /// Azurite's well-known local account.
    pub fn development() -> Self {
        Self {
            account_name: DEV_ACCOUNT_NAME.to_string(),
            blob_endpoint: Url::parse(DEV_BLOB_ENDPOINT).expect("development endpoint is a valid URL"),
            auth: StorageAuth::SharedKey(SecretString::from(DEV_ACCOUNT_KEY.to_string())),
        }
    }

    /// Decoded account key bytes when Shared Key auth is configured.
    pub fn account_key(&self) -> AppResult<Option<Vec<u8>>> {
        match &self.auth {
            StorageAuth::SharedKey(key) => STANDARD
                .decode(key.expose_secret())
                .map(Some)
                .map_err(|e| AppError::InternalError(format!("account key decode failed: {}", e))),
            _ => Ok(None),
        }
    }
}

impl FromStr for StorageConnection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_settings(connection_string: &str) -> AppResult<HashMap<String, String>> {
    let mut settings = HashMap::new();
    for part in connection_string.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        // Keys and SAS tokens contain '=', so only the first one separates.
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| invalid(&format!("setting '{}' is missing '='", part)))?;
        settings.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    if settings.is_empty() {
        return Err(invalid("connection string is empty"));
    }
    Ok(settings)
}

fn parse_endpoint(endpoint: &str) -> AppResult<Url> {
    Url::parse(endpoint.trim_end_matches('/'))
        .map_err(|e| invalid(&format!("invalid blob endpoint '{}': {}", endpoint, e)))
}

fn invalid(message: &str) -> AppError {
    AppError::InternalError(format!("invalid storage connection string: {}", message))
}
