//! # Key Provider
//!
//! The capability interface the core consumes for every cryptographic
//! primitive. Veil never implements RSA or AES itself; it composes the
//! operations below.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KEY PROVIDER CAPABILITIES                        │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Generation     generate_asymmetric_key_pair   RSA-OAEP / 2048 / SHA-256│
//! │                 generate_symmetric_key         AES-GCM / 256            │
//! │                                                                         │
//! │  Asymmetric     encrypt_asymmetric / decrypt_asymmetric                 │
//! │  Symmetric      encrypt_symmetric / decrypt_symmetric  (authenticated)  │
//! │                                                                         │
//! │  Interchange    export_public_key (SPKI)  / import_public_key           │
//! │                 export_private_key (PKCS#8) / import_private_key        │
//! │                 export_symmetric_key (raw) / import_symmetric_key       │
//! │                                                                         │
//! │  Randomness     random_bytes                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Key handles are associated types, so a provider backed by a hardware
//! module or a platform keystore can keep its material opaque.
//! [`NativeKeyProvider`] is the pure-Rust implementation.

mod native;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use thiserror::Error;
use zeroize::Zeroizing;

pub use native::{NativeKeyProvider, NativePrivateKey, NativePublicKey, NativeSymmetricKey};

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the AES-256 key in bytes
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// RSA modulus strength used for every generated key pair
pub const RSA_MODULUS_BITS: usize = 2048;

/// Parameters for asymmetric key pair generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsymmetricSpec {
    /// Encryption scheme name
    pub scheme: &'static str,
    /// Modulus strength in bits
    pub modulus_bits: usize,
    /// Digest used by the padding scheme
    pub hash: &'static str,
}

impl AsymmetricSpec {
    /// RSA-OAEP with a 2048-bit modulus and SHA-256
    pub const RSA_OAEP_2048: Self = Self {
        scheme: "RSA-OAEP",
        modulus_bits: RSA_MODULUS_BITS,
        hash: "SHA-256",
    };
}

/// Parameters for symmetric key generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricSpec {
    /// Cipher name
    pub scheme: &'static str,
    /// Key length in bits
    pub bits: usize,
}

impl SymmetricSpec {
    /// AES-GCM with a 256-bit key
    pub const AES_GCM_256: Self = Self {
        scheme: "AES-GCM",
        bits: 256,
    };
}

/// What a symmetric key handle may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    /// Encrypt and decrypt (freshly generated keys)
    EncryptDecrypt,
    /// Decrypt only (keys recovered from a package)
    DecryptOnly,
}

impl KeyUsage {
    /// Whether the key may be used to encrypt
    pub fn allows_encrypt(self) -> bool {
        matches!(self, KeyUsage::EncryptDecrypt)
    }
}

/// Errors reported by a key provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested algorithm or parameters are not supported
    #[error("unsupported algorithm: {0}")]
    Unsupported(String),

    /// Key generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Key material could not be imported or exported
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The key handle does not permit this operation
    #[error("key usage does not permit {0}")]
    UsageNotPermitted(&'static str),

    /// IV has the wrong length for the cipher
    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIv {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// The cipher rejected its inputs
    #[error("cipher operation failed: {0}")]
    Cipher(String),

    /// Authenticated decryption found a tag mismatch
    #[error("authentication tag mismatch")]
    TagMismatch,

    /// The secure random source failed
    #[error("random source failed: {0}")]
    Rng(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cryptographic capability provider.
///
/// All operations are async so a provider may yield while the work happens
/// elsewhere (a blocking pool, a hardware module, a platform API).
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Handle to a public key
    type PublicKey: Send + Sync;
    /// Handle to a private key
    type PrivateKey: Send + Sync;
    /// Handle to a symmetric key
    type SymmetricKey: Send + Sync;

    /// Generate a new asymmetric key pair
    async fn generate_asymmetric_key_pair(
        &self,
        spec: AsymmetricSpec,
    ) -> ProviderResult<(Self::PublicKey, Self::PrivateKey)>;

    /// Generate a new symmetric key with [`KeyUsage::EncryptDecrypt`]
    async fn generate_symmetric_key(&self, spec: SymmetricSpec)
        -> ProviderResult<Self::SymmetricKey>;

    /// Encrypt a short message under a public key
    async fn encrypt_asymmetric(
        &self,
        key: &Self::PublicKey,
        data: &[u8],
    ) -> ProviderResult<Vec<u8>>;

    /// Decrypt a message produced by [`KeyProvider::encrypt_asymmetric`]
    async fn decrypt_asymmetric(
        &self,
        key: &Self::PrivateKey,
        data: &[u8],
    ) -> ProviderResult<Vec<u8>>;

    /// Authenticated encryption; the tag is appended to the ciphertext
    async fn encrypt_symmetric(
        &self,
        key: &Self::SymmetricKey,
        iv: &[u8],
        data: &[u8],
    ) -> ProviderResult<Vec<u8>>;

    /// Authenticated decryption; fails with [`ProviderError::TagMismatch`]
    /// rather than returning unverified bytes
    async fn decrypt_symmetric(
        &self,
        key: &Self::SymmetricKey,
        iv: &[u8],
        data: &[u8],
    ) -> ProviderResult<Vec<u8>>;

    /// Export a public key as SPKI DER
    async fn export_public_key(&self, key: &Self::PublicKey) -> ProviderResult<Vec<u8>>;

    /// Export a private key as PKCS#8 DER
    async fn export_private_key(&self, key: &Self::PrivateKey)
        -> ProviderResult<Zeroizing<Vec<u8>>>;

    /// Export a symmetric key as raw bytes
    async fn export_symmetric_key(
        &self,
        key: &Self::SymmetricKey,
    ) -> ProviderResult<Zeroizing<Vec<u8>>>;

    /// Import a public key from SPKI DER
    async fn import_public_key(&self, spki: &[u8]) -> ProviderResult<Self::PublicKey>;

    /// Import a private key from PKCS#8 DER
    async fn import_private_key(&self, pkcs8: &[u8]) -> ProviderResult<Self::PrivateKey>;

    /// Import a raw symmetric key with the given usage
    async fn import_symmetric_key(
        &self,
        raw: &[u8],
        usage: KeyUsage,
    ) -> ProviderResult<Self::SymmetricKey>;

    /// Cryptographically secure random bytes
    async fn random_bytes(&self, len: usize) -> ProviderResult<Vec<u8>>;
}
