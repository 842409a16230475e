//! # Key Export Document
//!
//! A JSON document holding both halves of an RSA key pair so a user can
//! keep them outside the session. A public-only document omits
//! `privateKey` and is enough to seal packages to its owner.
//!
//! ```text
//! {
//!   "publicKey":  "<base64 SPKI DER>",
//!   "privateKey": "<base64 PKCS#8 DER>",
//!   "generated":  "2024-05-01T10:00:00.000Z",
//!   "algorithm":  "RSA-OAEP-2048"
//! }
//! ```
//!
//! The private key is stored unencrypted. Whoever holds this file can open
//! every package sealed to its public key.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::package::KEY_CIPHER;

/// Suggested file name for a key export
pub const FILE_NAME: &str = "rsa-keypair.json";

/// Suggested file name for a public-only key export
pub const PUBLIC_FILE_NAME: &str = "rsa-public.json";

/// Characters shown by a default key preview
pub const DEFAULT_PREVIEW_LEN: usize = 100;

/// Both halves of a key pair in interchange form
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyExport {
    /// Base64 SPKI DER
    pub public_key: String,
    /// Base64 PKCS#8 DER, absent in a public-only document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Export time, ISO-8601 with milliseconds
    pub generated: String,
    /// Always `RSA-OAEP-2048`
    pub algorithm: String,
}

impl KeyExport {
    /// Build a document from DER encodings
    pub fn new(spki: &[u8], pkcs8: &[u8]) -> Self {
        Self {
            public_key: STANDARD.encode(spki),
            private_key: Some(STANDARD.encode(pkcs8)),
            generated: crate::time::now_iso8601(),
            algorithm: KEY_CIPHER.to_string(),
        }
    }

    /// Copy of this document without the private key
    pub fn public_only(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    /// Serialize to two-space indented JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, rejecting other algorithms
    pub fn from_json(text: &str) -> Result<Self> {
        let export: Self = serde_json::from_str(text)
            .map_err(|e| Error::InvalidKey(format!("not a key export document: {}", e)))?;
        if export.algorithm != KEY_CIPHER {
            return Err(Error::InvalidKey(format!(
                "expected {} keys, found {}",
                KEY_CIPHER, export.algorithm
            )));
        }
        Ok(export)
    }

    /// Decoded SPKI DER
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.public_key.as_bytes())
            .map_err(|e| Error::InvalidKey(format!("public key is not base64: {}", e)))
    }

    /// Decoded PKCS#8 DER
    pub fn private_key_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let encoded = self
            .private_key
            .as_deref()
            .ok_or_else(|| Error::InvalidKey("key export holds no private key".into()))?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| Error::InvalidKey(format!("private key is not base64: {}", e)))
    }

    /// First `len` characters of each encoded key, for display
    pub fn preview(&self, len: usize) -> KeyPreview<'_> {
        KeyPreview {
            public_key: truncate(&self.public_key, len),
            private_key: self.private_key.as_deref().map(|s| truncate(s, len)),
        }
    }
}

impl fmt::Debug for KeyExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyExport")
            .field("public_key", &truncate(&self.public_key, 16))
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("generated", &self.generated)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Truncated view of a [`KeyExport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPreview<'a> {
    /// Leading characters of the public key
    pub public_key: &'a str,
    /// Leading characters of the private key, if present
    pub private_key: Option<&'a str>,
}

fn truncate(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
