//! # Package Codec
//!
//! The encrypted package is a JSON document that carries both ciphertexts,
//! the IV and descriptive metadata between the encrypt and decrypt sides.
//!
//! ## Format (version 2.0)
//!
//! ```text
//! {
//!   "version": "2.0",
//!   "encryptedFile": "<base64 AES-256-GCM ciphertext || 16-byte tag>",
//!   "encryptedAesKey": "<base64 RSA-OAEP(SHA-256) of the raw 32-byte key>",
//!   "iv": "<base64, 12 bytes>",
//!   "fileName": "report.pdf",
//!   "fileType": "application/pdf",
//!   "fileSize": 48213,
//!   "timestamp": "2024-05-01T10:00:00.000Z",
//!   "encryption": { "file": "AES-256-GCM", "key": "RSA-OAEP-2048" }
//! }
//! ```
//!
//! Fields are matched by name; order and unknown extra fields don't matter.
//! Binary fields use the standard padded base64 alphabet.
//!
//! ## Trust boundary
//!
//! Only `encryptedFile` is authenticated (by the GCM tag, together with the
//! IV and key). `fileName`, `fileType`, `fileSize` and `timestamp` are
//! advisory and can be altered without detection. Treat them as untrusted
//! input; see [`PlaintextFile::safe_file_name`](crate::PlaintextFile::safe_file_name).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::provider::IV_SIZE;

/// Version written by this codec
pub const PACKAGE_VERSION: &str = "2.0";

/// Versions this codec can read
pub const SUPPORTED_VERSIONS: &[&str] = &[PACKAGE_VERSION];

/// File cipher identifier for version 2.0
pub const FILE_CIPHER: &str = "AES-256-GCM";

/// Key-wrapping cipher identifier for version 2.0
pub const KEY_CIPHER: &str = "RSA-OAEP-2048";

/// Extension used for package files
pub const PACKAGE_EXTENSION: &str = "secure";

/// Algorithms used to produce a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSuite {
    /// Cipher protecting the file content
    pub file: String,
    /// Cipher protecting the symmetric key
    pub key: String,
}

impl CipherSuite {
    /// The fixed suite of version 2.0
    pub fn v2() -> Self {
        Self {
            file: FILE_CIPHER.to_string(),
            key: KEY_CIPHER.to_string(),
        }
    }
}

/// An encrypted file ready for transfer
///
/// Immutable once produced: the public API only reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub(crate) version: String,
    #[serde(with = "base64_bytes")]
    pub(crate) encrypted_file: Vec<u8>,
    #[serde(rename = "encryptedAesKey", with = "base64_bytes")]
    pub(crate) encrypted_key: Vec<u8>,
    #[serde(with = "base64_iv")]
    pub(crate) iv: [u8; IV_SIZE],
    pub(crate) file_name: String,
    pub(crate) file_type: String,
    pub(crate) file_size: u64,
    #[serde(with = "iso_millis")]
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) encryption: CipherSuite,
}

impl Package {
    /// Assemble a version 2.0 package
    pub(crate) fn new(
        iv: [u8; IV_SIZE],
        encrypted_file: Vec<u8>,
        encrypted_key: Vec<u8>,
        file_name: &str,
        file_type: &str,
        file_size: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            version: PACKAGE_VERSION.to_string(),
            encrypted_file,
            encrypted_key,
            iv,
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            file_size,
            timestamp,
            encryption: CipherSuite::v2(),
        }
    }

    /// Format version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// File ciphertext with the GCM tag appended
    pub fn encrypted_file(&self) -> &[u8] {
        &self.encrypted_file
    }

    /// Wrapped symmetric key
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// GCM IV
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Original file name (advisory)
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Original MIME type (advisory)
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// Original size in bytes (advisory)
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Creation time (informational)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Algorithms used
    pub fn encryption(&self) -> &CipherSuite {
        &self.encryption
    }

    /// Size of the file ciphertext in bytes
    pub fn encrypted_size(&self) -> usize {
        self.encrypted_file.len()
    }

    /// File name to save this package under: `encrypted_<fileName>.secure`
    pub fn suggested_file_name(&self) -> String {
        format!("encrypted_{}.{}", self.file_name, PACKAGE_EXTENSION)
    }

    fn validate(&self) -> Result<()> {
        if self.encryption != CipherSuite::v2() {
            return Err(Error::MalformedPackage(format!(
                "version {} requires {} / {}, found {} / {}",
                self.version, FILE_CIPHER, KEY_CIPHER, self.encryption.file, self.encryption.key
            )));
        }
        Ok(())
    }
}

/// Serialize a package to its JSON text form (two-space indented)
pub fn serialize(package: &Package) -> Result<String> {
    Ok(serde_json::to_string_pretty(package)?)
}

/// Parse and validate a package
///
/// Version is checked before anything else, so a document from a newer
/// format is reported as [`Error::UnsupportedVersion`] even if its other
/// fields would not parse.
pub fn deserialize(text: &str) -> Result<Package> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::MalformedPackage(format!("not valid JSON: {}", e)))?;

    check_version(&value)?;

    let package: Package =
        serde_json::from_value(value).map_err(|e| Error::MalformedPackage(e.to_string()))?;
    package.validate()?;

    tracing::debug!(
        file_name = package.file_name.as_str(),
        file_size = package.file_size,
        "Parsed encrypted package"
    );
    Ok(package)
}

fn check_version(value: &Value) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::MalformedPackage("expected a JSON object".into()))?;

    match object.get("version") {
        None | Some(Value::Null) => Err(Error::UnsupportedVersion(None)),
        Some(Value::String(version)) if SUPPORTED_VERSIONS.contains(&version.as_str()) => Ok(()),
        Some(Value::String(version)) => Err(Error::UnsupportedVersion(Some(version.clone()))),
        Some(other) => Err(Error::UnsupportedVersion(Some(other.to_string()))),
    }
}

/// Serde helper for byte vectors as base64
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map_err(|e| serde::de::Error::custom(format!("invalid base64: {}", e)))
    }
}

/// Serde helper for the fixed-size IV as base64
mod base64_iv {
    use serde::{Deserializer, Serializer};

    use crate::provider::IV_SIZE;

    pub fn serialize<S>(iv: &[u8; IV_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::base64_bytes::serialize(iv, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; IV_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = super::base64_bytes::deserialize(deserializer)?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            serde::de::Error::custom(format!("iv must be {} bytes, got {}", IV_SIZE, len))
        })
    }
}

/// Serde helper for millisecond-precision ISO-8601 timestamps
mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::time::to_iso8601(at))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::time::parse_iso8601(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }
}

// ============================================================================
// TESTS
// ============================================================================
