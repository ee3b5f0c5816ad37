//! Request signing for the Kalshi trade API
//!
//! Every authenticated request carries three headers. The signature is
//! RSA-PSS over SHA-256 of `timestamp_ms + METHOD + path`, where the path
//! includes the `/trade-api/v2` prefix and excludes the query string.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::SigningKey;
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use std::path::Path;

use crate::common::errors::AdapterError;

/// Signs Kalshi requests with an API key ID and its RSA private key
pub struct KalshiAuth {
    api_key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl std::fmt::Debug for KalshiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiAuth")
            .field("api_key_id", &self.api_key_id)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

impl KalshiAuth {
    pub fn from_key(api_key_id: impl Into<String>, private_key: RsaPrivateKey) -> Self {
        Self {
            api_key_id: api_key_id.into(),
            signing_key: SigningKey::<Sha256>::new(private_key),
        }
    }

    /// Parse a PEM key, PKCS#1 (`BEGIN RSA PRIVATE KEY`) or PKCS#8
    pub fn from_pem(api_key_id: impl Into<String>, pem: &str) -> Result<Self, AdapterError> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| AdapterError::Authentication(format!("Failed to parse private key: {}", e)))?;
        Ok(Self::from_key(api_key_id, key))
    }

    pub fn from_pem_file(
        api_key_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, AdapterError> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|e| {
            AdapterError::Authentication(format!(
                "Failed to read private key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_pem(api_key_id, &pem)
    }

    pub fn api_key_id(&self) -> &str {
        &self.api_key_id
    }

    /// Headers for a request made now
    pub fn sign_request(&self, method: &str, path: &str) -> SignedHeaders {
        self.sign_request_with_timestamp(chrono::Utc::now().timestamp_millis(), method, path)
    }

    pub fn sign_request_with_timestamp(
        &self,
        timestamp_ms: i64,
        method: &str,
        path: &str,
    ) -> SignedHeaders {
        let message = signing_message(timestamp_ms, method, path);
        let signature = self
            .signing_key
            .sign_with_rng(&mut rand::thread_rng(), message.as_bytes());

        SignedHeaders {
            api_key_id: self.api_key_id.clone(),
            signature: BASE64.encode(signature.to_bytes()),
            timestamp_ms,
        }
    }
}

/// Message covered by the signature; the query string is not signed
pub fn signing_message(timestamp_ms: i64, method: &str, path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    format!("{}{}{}", timestamp_ms, method.to_uppercase(), path)
}

/// Authentication headers for one request
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub api_key_id: String,
    pub signature: String,
    pub timestamp_ms: i64,
}

impl SignedHeaders {
    /// Add authentication headers to a reqwest RequestBuilder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("KALSHI-ACCESS-KEY", &self.api_key_id)
            .header("KALSHI-ACCESS-SIGNATURE", &self.signature)
            .header("KALSHI-ACCESS-TIMESTAMP", self.timestamp_ms.to_string())
    }
}
