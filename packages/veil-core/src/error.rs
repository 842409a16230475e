//! # Error Handling
//!
//! Error types for Veil Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Session Errors                                                    │
//! │  │   └── Precondition          - File, key or package missing          │
//! │  │                                                                      │
//! │  ├── Key Errors                                                        │
//! │  │   ├── KeyGeneration         - Provider could not generate a key     │
//! │  │   └── InvalidKey            - Key import rejected                   │
//! │  │                                                                      │
//! │  ├── Encryption Errors                                                 │
//! │  │   └── Encryption            - A primitive failed (names the step)   │
//! │  │                                                                      │
//! │  ├── Decryption Errors                                                 │
//! │  │   ├── KeyRecovery           - Private key can't unwrap the AES key  │
//! │  │   └── Integrity             - Authentication tag mismatch           │
//! │  │                                                                      │
//! │  ├── Package Errors                                                    │
//! │  │   ├── MalformedPackage      - Not a well-formed package document    │
//! │  │   └── UnsupportedVersion    - Version absent or unknown             │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      ├── Serialization         - JSON encoding failed                  │
//! │      └── Io                    - Filesystem access failed              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every pipeline operation either returns a fully valid result or fails
//! with one of these variants and leaves session state unchanged. The core
//! never retries on its own; retry policy belongs to the caller.

use std::fmt;

use thiserror::Error;

/// Result type alias for Veil Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// The input an operation needed but did not have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    /// No plaintext file has been selected
    File,
    /// No asymmetric key pair has been generated or imported
    AsymmetricKey,
    /// No symmetric key has been generated
    SymmetricKey,
    /// No encrypted package has been produced or loaded
    Package,
    /// No private key is available for decryption
    PrivateKey,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            MissingInput::File => "no file selected",
            MissingInput::AsymmetricKey => "no RSA key pair generated",
            MissingInput::SymmetricKey => "no AES key generated",
            MissingInput::Package => "no encrypted package loaded",
            MissingInput::PrivateKey => "private key not available",
        };
        f.write_str(message)
    }
}

/// The step of the encryption pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptStep {
    /// Drawing the random IV
    GenerateIv,
    /// AES-GCM encryption of the file bytes
    EncryptFile,
    /// Exporting the raw symmetric key
    ExportKey,
    /// RSA-OAEP wrapping of the raw symmetric key
    WrapKey,
}

impl fmt::Display for EncryptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            EncryptStep::GenerateIv => "generating IV",
            EncryptStep::EncryptFile => "encrypting file with AES-256-GCM",
            EncryptStep::ExportKey => "exporting AES key",
            EncryptStep::WrapKey => "encrypting AES key with RSA-OAEP",
        };
        f.write_str(step)
    }
}

/// Main error type for Veil Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Session Errors (100-199)
    // ========================================================================

    /// A required input is missing
    #[error("Cannot proceed: {0}")]
    Precondition(MissingInput),

    // ========================================================================
    // Key Errors (200-299)
    // ========================================================================

    /// The key provider could not generate a key
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// A key could not be imported or exported
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Encryption Errors (300-399)
    // ========================================================================

    /// A primitive operation failed while encrypting
    #[error("Encryption failed while {step}: {reason}")]
    Encryption {
        /// Pipeline step that failed
        step: EncryptStep,
        /// Underlying cause reported by the provider
        reason: String,
    },

    // ========================================================================
    // Decryption Errors (400-499)
    // ========================================================================

    /// The private key could not recover the symmetric key
    #[error("Could not recover the AES key: {0}. Wrong private key or corrupted package.")]
    KeyRecovery(String),

    /// The authentication tag did not verify
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    // ========================================================================
    // Package Errors (500-599)
    // ========================================================================

    /// The package document is not well formed
    #[error("Malformed encrypted package: {0}")]
    MalformedPackage(String),

    /// The package version is absent or not recognized
    #[error("Unsupported package version: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnsupportedVersion(Option<String>),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Build an [`Error::Encryption`] for the given step
    pub(crate) fn encryption(step: EncryptStep, reason: impl fmt::Display) -> Self {
        Error::Encryption {
            step,
            reason: reason.to_string(),
        }
    }

    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Session
    /// - 200-299: Keys
    /// - 300-399: Encryption
    /// - 400-499: Decryption
    /// - 500-599: Package
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Session (100-199)
            Error::Precondition(_) => 100,

            // Keys (200-299)
            Error::KeyGeneration(_) => 200,
            Error::InvalidKey(_) => 201,

            // Encryption (300-399)
            Error::Encryption { .. } => 300,

            // Decryption (400-499)
            Error::KeyRecovery(_) => 400,
            Error::Integrity(_) => 401,

            // Package (500-599)
            Error::MalformedPackage(_) => 500,
            Error::UnsupportedVersion(_) => 501,

            // Internal (900-999)
            Error::Serialization(_) => 900,
            Error::Io(_) => 901,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can be resolved by retrying or by supplying
    /// different input. Key recovery and integrity failures are not: the
    /// package cannot be opened without the right private key, and a
    /// tampered package stays tampered.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Precondition(_)
                | Error::KeyGeneration(_)
                | Error::Encryption { .. }
                | Error::MalformedPackage(_)
                | Error::UnsupportedVersion(_)
                | Error::Io(_)
        )
    }

    /// Check if this error requires user action
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Error::Precondition(_)
                | Error::KeyRecovery(_)
                | Error::MalformedPackage(_)
                | Error::UnsupportedVersion(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Precondition(MissingInput::File).code(), 100);
        assert_eq!(Error::KeyGeneration("test".into()).code(), 200);
        assert_eq!(Error::encryption(EncryptStep::WrapKey, "test").code(), 300);
        assert_eq!(Error::KeyRecovery("test".into()).code(), 400);
        assert_eq!(Error::Integrity("test".into()).code(), 401);
        assert_eq!(Error::MalformedPackage("test".into()).code(), 500);
        assert_eq!(Error::UnsupportedVersion(None).code(), 501);
        assert_eq!(Error::Io("test".into()).code(), 901);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Precondition(MissingInput::SymmetricKey).is_recoverable());
        assert!(Error::KeyGeneration("test".into()).is_recoverable());
        assert!(Error::UnsupportedVersion(Some("9.9".into())).is_recoverable());
        assert!(!Error::KeyRecovery("test".into()).is_recoverable());
        assert!(!Error::Integrity("test".into()).is_recoverable());
    }

    #[test]
    fn test_requires_user_action() {
        assert!(Error::Precondition(MissingInput::File).requires_user_action());
        assert!(Error::KeyRecovery("wrong key".into()).requires_user_action());
        assert!(Error::MalformedPackage("no iv".into()).requires_user_action());
        assert!(Error::UnsupportedVersion(None).requires_user_action());
        assert!(!Error::Integrity("tag mismatch".into()).requires_user_action());
        assert!(!Error::KeyGeneration("rng".into()).requires_user_action());
        assert!(!Error::Io("disk full".into()).requires_user_action());
    }

    #[test]
    fn test_messages_name_the_missing_input_and_step() {
        let err = Error::Precondition(MissingInput::AsymmetricKey);
        assert_eq!(err.to_string(), "Cannot proceed: no RSA key pair generated");

        let err = Error::encryption(EncryptStep::EncryptFile, "bad key");
        assert!(err.to_string().contains("encrypting file with AES-256-GCM"));
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn test_unsupported_version_message() {
        assert!(Error::UnsupportedVersion(None).to_string().contains("<missing>"));
        assert!(Error::UnsupportedVersion(Some("3.1".into()))
            .to_string()
            .contains("3.1"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.code(), 901);
        assert!(err.to_string().contains("gone"));
    }
}
