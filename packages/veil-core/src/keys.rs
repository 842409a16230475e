//! # Key Management
//!
//! Lifecycle of the session's keys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           KEY MANAGER SLOTS                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │  AsymmetricKeyPair           │   │  SymmetricKey                │   │
//! │  │  RSA-OAEP / 2048 / SHA-256   │   │  AES-GCM / 256               │   │
//! │  │                              │   │                              │   │
//! │  │  • wraps the AES key         │   │  • encrypts file contents    │   │
//! │  │  • exportable (SPKI/PKCS#8)  │   │  • one per session; every    │   │
//! │  │                              │   │    encryption uses a new IV  │   │
//! │  └──────────────────────────────┘   └──────────────────────────────┘   │
//! │                                                                         │
//! │  Generating replaces the slot. A failed generation keeps the old key.  │
//! │                                                                         │
//! │  ┌──────────────────────────────┐                                       │
//! │  │  Recipient (public only)     │   Imported from SPKI. When set, the   │
//! │  │  RSA-OAEP / 2048 / SHA-256   │   AES key is wrapped to it instead    │
//! │  └──────────────────────────────┘   of the pair's public half.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys live in memory only. Nothing here writes key material to disk or
//! to the log.

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::error::{Error, MissingInput, Result};
use crate::provider::{AsymmetricSpec, KeyProvider, SymmetricSpec, SYMMETRIC_KEY_SIZE};

/// A public/private key pair held by handle
pub struct AsymmetricKeyPair<P: KeyProvider> {
    public: P::PublicKey,
    private: P::PrivateKey,
}

impl<P: KeyProvider> AsymmetricKeyPair<P> {
    /// Pair two handles produced by the same provider
    pub fn new(public: P::PublicKey, private: P::PrivateKey) -> Self {
        Self { public, private }
    }

    /// Public half, used to wrap symmetric keys
    pub fn public(&self) -> &P::PublicKey {
        &self.public
    }

    /// Private half, used to unwrap symmetric keys
    pub fn private(&self) -> &P::PrivateKey {
        &self.private
    }
}

impl<P: KeyProvider> fmt::Debug for AsymmetricKeyPair<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsymmetricKeyPair(..)")
    }
}

/// Owns the session's asymmetric key pair and symmetric key
pub struct KeyManager<P: KeyProvider> {
    provider: Arc<P>,
    key_pair: Option<AsymmetricKeyPair<P>>,
    recipient: Option<P::PublicKey>,
    symmetric_key: Option<P::SymmetricKey>,
}

impl<P: KeyProvider> KeyManager<P> {
    /// Create an empty manager
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            key_pair: None,
            recipient: None,
            symmetric_key: None,
        }
    }

    /// The provider backing this manager
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Generate an RSA-OAEP-2048 key pair, replacing any existing pair
    pub async fn generate_asymmetric_key_pair(&mut self) -> Result<&AsymmetricKeyPair<P>> {
        let (public, private) = self
            .provider
            .generate_asymmetric_key_pair(AsymmetricSpec::RSA_OAEP_2048)
            .await
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;

        tracing::info!(
            modulus_bits = AsymmetricSpec::RSA_OAEP_2048.modulus_bits,
            "Generated RSA-OAEP key pair"
        );
        Ok(self.key_pair.insert(AsymmetricKeyPair::new(public, private)))
    }

    /// Generate an AES-256-GCM key, replacing any existing key
    pub async fn generate_symmetric_key(&mut self) -> Result<&P::SymmetricKey> {
        let key = self
            .provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;

        tracing::info!(bits = SymmetricSpec::AES_GCM_256.bits, "Generated AES-GCM key");
        Ok(self.symmetric_key.insert(key))
    }

    /// Export the public key as SPKI DER
    pub async fn export_public_key(&self) -> Result<Vec<u8>> {
        let pair = self.require_key_pair()?;
        self.provider
            .export_public_key(pair.public())
            .await
            .map_err(|e| Error::InvalidKey(e.to_string()))
    }

    /// Export the private key as PKCS#8 DER
    pub async fn export_private_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let pair = self.require_key_pair()?;
        self.provider
            .export_private_key(pair.private())
            .await
            .map_err(|e| Error::InvalidKey(e.to_string()))
    }

    /// Restore a key pair from SPKI and PKCS#8 encodings
    ///
    /// The halves are checked against each other by wrapping a random value
    /// with the public key and unwrapping it with the private key. On any
    /// failure the current pair is kept.
    pub async fn import_key_pair(
        &mut self,
        spki: &[u8],
        pkcs8: &[u8],
    ) -> Result<&AsymmetricKeyPair<P>> {
        let public = self
            .provider
            .import_public_key(spki)
            .await
            .map_err(|e| Error::InvalidKey(format!("public key: {}", e)))?;
        let private = self
            .provider
            .import_private_key(pkcs8)
            .await
            .map_err(|e| Error::InvalidKey(format!("private key: {}", e)))?;

        let challenge = self
            .provider
            .random_bytes(SYMMETRIC_KEY_SIZE)
            .await
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        let wrapped = self
            .provider
            .encrypt_asymmetric(&public, &challenge)
            .await
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        let matches = match self.provider.decrypt_asymmetric(&private, &wrapped).await {
            Ok(unwrapped) => unwrapped == challenge,
            Err(_) => false,
        };
        if !matches {
            return Err(Error::InvalidKey(
                "public and private keys do not belong to the same pair".into(),
            ));
        }

        tracing::info!("Imported RSA-OAEP key pair");
        Ok(self.key_pair.insert(AsymmetricKeyPair::new(public, private)))
    }

    /// Import a recipient's public key from SPKI, replacing any current one
    ///
    /// Only encryption needs this key, so no private half is required.
    pub async fn import_public_key(&mut self, spki: &[u8]) -> Result<&P::PublicKey> {
        let public = self
            .provider
            .import_public_key(spki)
            .await
            .map_err(|e| Error::InvalidKey(format!("public key: {}", e)))?;

        tracing::info!("Imported RSA-OAEP recipient key");
        Ok(self.recipient.insert(public))
    }

    /// Install an existing pair, replacing any current one
    pub fn set_key_pair(&mut self, pair: AsymmetricKeyPair<P>) {
        self.key_pair = Some(pair);
    }

    /// The active key pair, if any
    pub fn key_pair(&self) -> Option<&AsymmetricKeyPair<P>> {
        self.key_pair.as_ref()
    }

    /// The imported recipient key, if any
    pub fn recipient(&self) -> Option<&P::PublicKey> {
        self.recipient.as_ref()
    }

    /// Key the symmetric key is wrapped to: the recipient if one was
    /// imported, else the pair's public half
    pub fn encryption_key(&self) -> Option<&P::PublicKey> {
        self.recipient
            .as_ref()
            .or_else(|| self.key_pair.as_ref().map(AsymmetricKeyPair::public))
    }

    /// The active symmetric key, if any
    pub fn symmetric_key(&self) -> Option<&P::SymmetricKey> {
        self.symmetric_key.as_ref()
    }

    /// Drop every key
    pub fn clear(&mut self) {
        self.key_pair = None;
        self.recipient = None;
        self.symmetric_key = None;
    }

    fn require_key_pair(&self) -> Result<&AsymmetricKeyPair<P>> {
        self.key_pair
            .as_ref()
            .ok_or(Error::Precondition(MissingInput::AsymmetricKey))
    }
}

impl<P: KeyProvider> fmt::Debug for KeyManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("has_key_pair", &self.key_pair.is_some())
            .field("has_recipient", &self.recipient.is_some())
            .field("has_symmetric_key", &self.symmetric_key.is_some())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
