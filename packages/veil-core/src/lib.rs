//! # Veil Core
//!
//! Hybrid public-key file encryption: a per-file AES-256-GCM key seals the
//! contents and an RSA-OAEP-2048 key pair (SHA-256) protects that key. The
//! result is a self-describing JSON package that can be carried anywhere and
//! opened only with the matching private key.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          VEIL CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                          Session                                │   │
//! │  │   file slot · package slot · decrypted slot · history          │   │
//! │  └───────┬──────────────────────┬──────────────────────┬──────────┘   │
//! │          │                      │                      │              │
//! │  ┌───────▼──────┐   ┌───────────▼──────────┐   ┌───────▼──────────┐   │
//! │  │ Key Manager  │   │      Pipelines       │   │  Package Codec   │   │
//! │  │              │   │                      │   │                  │   │
//! │  │ - RSA pair   │   │ - encrypt (4 steps)  │   │ - JSON v2.0      │   │
//! │  │ - AES key    │   │ - decrypt (3 steps)  │   │ - base64 fields  │   │
//! │  │ - import /   │   │                      │   │ - version check  │   │
//! │  │   export     │   │                      │   │                  │   │
//! │  └───────┬──────┘   └───────────┬──────────┘   └──────────────────┘   │
//! │          │                      │                                     │
//! │  ┌───────▼──────────────────────▼──────────────────────────────────┐   │
//! │  │                       Key Provider                              │   │
//! │  │   RSA-OAEP · AES-GCM · SPKI / PKCS#8 / raw · secure random      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`provider`] - Cryptographic capability trait and the native provider
//! - [`keys`] - Key pair and symmetric key lifecycle
//! - [`pipeline`] - Encryption and decryption pipelines
//! - [`package`] - Package format, serialization and version checks
//! - [`session`] - Caller-owned context tying it all together
//! - [`history`] - Bounded log of completed operations
//! - [`export`] - Key export document
//!
//! ## Example
//!
//! ```no_run
//! use veil_core::{PlaintextFile, Session, SessionConfig};
//!
//! # async fn run() -> veil_core::Result<()> {
//! let mut session = Session::native(SessionConfig::from_env());
//! session.generate_asymmetric_key_pair().await?;
//! session.generate_symmetric_key().await?;
//!
//! session.select_file(PlaintextFile::read_from("report.pdf", Some("application/pdf"))?);
//! let text = veil_core::package::serialize(session.encrypt().await?)?;
//!
//! session.load_package(&text)?;
//! let opened = session.decrypt().await?;
//! assert_eq!(opened.name(), "report.pdf");
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Notes
//!
//! Only the file ciphertext is authenticated. `fileName`, `fileType`,
//! `fileSize` and `timestamp` in a package can be changed without
//! detection, so treat them as untrusted and write decrypted files under
//! [`PlaintextFile::safe_file_name`].
//!
//! Keys live in memory only. Symmetric key bytes are zeroized on drop; the
//! RSA private key is zeroized by `rsa` itself.
//!
//! RSA-OAEP decryption goes through `rsa` 0.9, which is affected by
//! RUSTSEC-2023-0071 (the "Marvin" timing side channel). No fixed release
//! exists yet. Do not run [`Session::decrypt`] where an attacker can submit
//! many packages and time the responses, such as a network service.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod error;
pub mod export;
pub mod file;
pub mod history;
pub mod keys;
pub mod package;
pub mod pipeline;
pub mod provider;
pub mod session;
/// Timestamp helpers for packages and exports.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::SessionConfig;
pub use error::{EncryptStep, Error, MissingInput, Result};
pub use export::KeyExport;
pub use file::{format_file_size, PlaintextFile};
pub use history::{History, HistoryEntry, OperationStatus};
pub use keys::{AsymmetricKeyPair, KeyManager};
pub use package::{CipherSuite, Package};
pub use provider::{
    KeyProvider, KeyUsage, NativeKeyProvider, NativePrivateKey, NativePublicKey,
    NativeSymmetricKey,
};
pub use session::Session;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Veil Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
