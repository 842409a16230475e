//! # Session
//!
//! The caller-owned context that ties keys, the selected file, the active
//! package and the history together.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              SESSION                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   select_file ──► [file]                                               │
//! │   generate_*  ──► [key pair] [symmetric key]      (KeyManager)         │
//! │                                                                         │
//! │   encrypt():  [file] + [symmetric key] + [recipient or public key]     │
//! │                   ──► [package]  + history entry                       │
//! │                                                                         │
//! │   load_package(text) ──► [package]                                     │
//! │                                                                         │
//! │   decrypt():  [package] + [private key]                                │
//! │                   ──► [decrypted] + history entry                      │
//! │                                                                         │
//! │   reset() ──► every slot empty                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Missing inputs are reported as [`Error::Precondition`] before any
//!   cryptographic work starts. Encrypt checks file, then a public key
//!   (recipient or own pair), then symmetric key; decrypt checks package,
//!   then private key.
//! - Slots are written only once an operation has fully succeeded. A failed
//!   or dropped operation leaves the session as it was.
//! - Every operation takes `&mut self`, so two pipeline runs can never
//!   overlap on one session.

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::{Error, MissingInput, Result};
use crate::export::KeyExport;
use crate::file::PlaintextFile;
use crate::history::{History, OperationStatus};
use crate::keys::{AsymmetricKeyPair, KeyManager};
use crate::package::{self, Package};
use crate::pipeline;
use crate::provider::{KeyProvider, NativeKeyProvider};
use crate::time;

/// One user's encryption workspace
pub struct Session<P: KeyProvider = NativeKeyProvider> {
    keys: KeyManager<P>,
    file: Option<PlaintextFile>,
    package: Option<Package>,
    decrypted: Option<PlaintextFile>,
    history: History,
    config: SessionConfig,
}

impl Session<NativeKeyProvider> {
    /// Session backed by the pure-Rust provider
    pub fn native(config: SessionConfig) -> Self {
        Self::new(Arc::new(NativeKeyProvider::new()), config)
    }
}

impl<P: KeyProvider> Session<P> {
    /// Create an empty session
    pub fn new(provider: Arc<P>, config: SessionConfig) -> Self {
        Self {
            keys: KeyManager::new(provider),
            file: None,
            package: None,
            decrypted: None,
            history: History::new(config.history_limit),
            config,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The key manager
    pub fn keys(&self) -> &KeyManager<P> {
        &self.keys
    }

    /// The key manager, mutably
    pub fn keys_mut(&mut self) -> &mut KeyManager<P> {
        &mut self.keys
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    /// Generate the session's RSA key pair
    pub async fn generate_asymmetric_key_pair(&mut self) -> Result<&AsymmetricKeyPair<P>> {
        self.keys.generate_asymmetric_key_pair().await
    }

    /// Generate the session's AES key
    pub async fn generate_symmetric_key(&mut self) -> Result<&P::SymmetricKey> {
        self.keys.generate_symmetric_key().await
    }

    /// Export the current key pair as a [`KeyExport`] document
    pub async fn export_keys(&self) -> Result<KeyExport> {
        let spki = self.keys.export_public_key().await?;
        let pkcs8 = self.keys.export_private_key().await?;
        Ok(KeyExport::new(&spki, &pkcs8))
    }

    /// Replace the key pair with one from a [`KeyExport`] document
    pub async fn import_keys(&mut self, export: &KeyExport) -> Result<&AsymmetricKeyPair<P>> {
        let spki = export.public_key_der()?;
        let pkcs8 = export.private_key_der()?;
        self.keys.import_key_pair(&spki, &pkcs8).await
    }

    /// Seal future packages to the public key in `export`
    ///
    /// Any private key in the document is ignored.
    pub async fn import_recipient(&mut self, export: &KeyExport) -> Result<&P::PublicKey> {
        let spki = export.public_key_der()?;
        self.keys.import_public_key(&spki).await
    }

    // ========================================================================
    // ENCRYPT
    // ========================================================================

    /// Select the file the next [`Session::encrypt`] will seal
    pub fn select_file(&mut self, file: PlaintextFile) {
        tracing::info!(
            file_name = file.name(),
            size = %crate::file::format_file_size(file.len() as u64),
            "File selected"
        );
        self.file = Some(file);
    }

    /// The selected file
    pub fn file(&self) -> Option<&PlaintextFile> {
        self.file.as_ref()
    }

    /// Seal the selected file and make the result the active package
    pub async fn encrypt(&mut self) -> Result<&Package> {
        let file = self
            .file
            .as_ref()
            .ok_or(Error::Precondition(MissingInput::File))?;
        let public = self
            .keys
            .encryption_key()
            .ok_or(Error::Precondition(MissingInput::AsymmetricKey))?;
        let key = self
            .keys
            .symmetric_key()
            .ok_or(Error::Precondition(MissingInput::SymmetricKey))?;

        let sealed =
            pipeline::encrypt(self.keys.provider().as_ref(), file, key, public).await?;

        self.history.record(
            sealed.file_name(),
            sealed.file_size(),
            sealed.timestamp(),
            OperationStatus::Encrypted,
        );
        Ok(self.package.insert(sealed))
    }

    // ========================================================================
    // DECRYPT
    // ========================================================================

    /// Parse a package document and make it the active package
    ///
    /// On failure the previously active package stays in place.
    pub fn load_package(&mut self, text: &str) -> Result<&Package> {
        let parsed = package::deserialize(text)?;
        tracing::info!(file_name = parsed.file_name(), "Encrypted package loaded");
        Ok(self.package.insert(parsed))
    }

    /// Make an already parsed package the active one
    pub fn set_package(&mut self, package: Package) {
        self.package = Some(package);
    }

    /// The active package
    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }

    /// Open the active package with the session's private key
    pub async fn decrypt(&mut self) -> Result<&PlaintextFile> {
        let sealed = self
            .package
            .as_ref()
            .ok_or(Error::Precondition(MissingInput::Package))?;
        let pair = self
            .keys
            .key_pair()
            .ok_or(Error::Precondition(MissingInput::PrivateKey))?;

        let opened =
            pipeline::decrypt(self.keys.provider().as_ref(), sealed, pair.private()).await?;

        self.history.record(
            opened.name(),
            opened.len() as u64,
            time::now_utc(),
            OperationStatus::Decrypted,
        );
        Ok(self.decrypted.insert(opened))
    }

    /// The last successfully decrypted file
    pub fn decrypted(&self) -> Option<&PlaintextFile> {
        self.decrypted.as_ref()
    }

    // ========================================================================
    // HISTORY & RESET
    // ========================================================================

    /// Completed operations, newest first
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Drop keys, file, package, decrypted output and history
    pub fn reset(&mut self) {
        self.keys.clear();
        self.file = None;
        self.package = None;
        self.decrypted = None;
        self.history.clear();
        tracing::info!("Session reset");
    }
}

impl<P: KeyProvider> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("keys", &self.keys)
            .field("file", &self.file)
            .field("has_package", &self.package.is_some())
            .field("decrypted", &self.decrypted)
            .field("history_len", &self.history.len())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
