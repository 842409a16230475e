//! # Plaintext Files
//!
//! The unencrypted side of the pipelines: the input to encryption and the
//! output of decryption.

use std::fmt;
use std::path::Path;

use crate::error::Result;

/// MIME type used when none is known
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Name used when a package carries no usable file name
pub const FALLBACK_FILE_NAME: &str = "decrypted.bin";

/// File bytes plus the descriptive metadata that travels with them
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextFile {
    bytes: Vec<u8>,
    name: String,
    mime_type: String,
}

impl PlaintextFile {
    /// Create from in-memory bytes
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read a file from disk
    ///
    /// The file is named after the last component of `path`. When
    /// `mime_type` is `None` the type is [`DEFAULT_MIME_TYPE`].
    pub fn read_from(path: impl AsRef<Path>, mime_type: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        Ok(Self {
            bytes,
            name,
            mime_type: mime_type.unwrap_or(DEFAULT_MIME_TYPE).to_string(),
        })
    }

    /// File contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the contents
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// File name as given (may contain path separators when it came from a package)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The name reduced to a bare file name, safe to join onto a directory.
    ///
    /// Names recovered from a package are not authenticated and may try to
    /// escape the output directory (`../../.bashrc`).
    pub fn safe_file_name(&self) -> String {
        let normalized = self.name.replace('\\', "/");
        match Path::new(&normalized).file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => FALLBACK_FILE_NAME.to_string(),
        }
    }
}

impl fmt::Debug for PlaintextFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaintextFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Human-readable size: bytes below 1 KiB, then KB and MB with two decimals
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}
