//! # Native Key Provider
//!
//! Pure-Rust implementation of [`KeyProvider`] on top of the RustCrypto
//! crates.
//!
//! | Capability | Implementation |
//! |------------|----------------|
//! | Asymmetric | `rsa` RSA-OAEP, MGF1 + SHA-256, empty label |
//! | Symmetric  | `aes-gcm` AES-256-GCM, 96-bit IV, 128-bit tag appended |
//! | Interchange | SPKI / PKCS#8 DER via `rsa::pkcs8` |
//! | Randomness | `rand::rngs::OsRng` |
//!
//! These parameters match the WebCrypto defaults for the same algorithm
//! names, so packages interoperate with browser-produced ones.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use super::{
    AsymmetricSpec, KeyProvider, KeyUsage, ProviderError, ProviderResult, SymmetricSpec,
    IV_SIZE, RSA_MODULUS_BITS, SYMMETRIC_KEY_SIZE,
};

/// RSA public key handle
#[derive(Clone, PartialEq, Eq)]
pub struct NativePublicKey(pub(crate) RsaPublicKey);

impl NativePublicKey {
    /// Modulus strength in bits
    pub fn modulus_bits(&self) -> usize {
        self.0.size() * 8
    }
}

impl fmt::Debug for NativePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativePublicKey")
            .field("modulus_bits", &self.modulus_bits())
            .finish()
    }
}

/// RSA private key handle
///
/// `rsa::RsaPrivateKey` zeroizes its components when dropped.
#[derive(Clone)]
pub struct NativePrivateKey(pub(crate) RsaPrivateKey);

impl fmt::Debug for NativePrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativePrivateKey(..)")
    }
}

/// AES-256-GCM key handle
///
/// Zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct NativeSymmetricKey {
    bytes: [u8; SYMMETRIC_KEY_SIZE],
    #[zeroize(skip)]
    usage: KeyUsage,
}

impl NativeSymmetricKey {
    /// What this key may be used for
    pub fn usage(&self) -> KeyUsage {
        self.usage
    }
}

impl fmt::Debug for NativeSymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSymmetricKey")
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Key provider backed by `rsa`, `aes-gcm` and the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeKeyProvider;

impl NativeKeyProvider {
    /// Create a provider
    pub fn new() -> Self {
        Self
    }

    fn padding() -> Oaep {
        Oaep::new::<Sha256>()
    }

    fn cipher(key: &NativeSymmetricKey) -> ProviderResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&key.bytes).map_err(|e| ProviderError::InvalidKey(e.to_string()))
    }
}

/// GCM nonces must be exactly 96 bits
fn check_iv(iv: &[u8]) -> ProviderResult<()> {
    if iv.len() != IV_SIZE {
        return Err(ProviderError::InvalidIv {
            expected: IV_SIZE,
            actual: iv.len(),
        });
    }
    Ok(())
}

/// Packages are labelled `RSA-OAEP-2048`, so any other modulus size is
/// refused, larger ones included
fn ensure_modulus(bits: usize) -> ProviderResult<()> {
    if bits != RSA_MODULUS_BITS {
        return Err(ProviderError::InvalidKey(format!(
            "RSA modulus is {} bits, exactly {} required",
            bits, RSA_MODULUS_BITS
        )));
    }
    Ok(())
}

#[async_trait]
impl KeyProvider for NativeKeyProvider {
    type PublicKey = NativePublicKey;
    type PrivateKey = NativePrivateKey;
    type SymmetricKey = NativeSymmetricKey;

    async fn generate_asymmetric_key_pair(
        &self,
        spec: AsymmetricSpec,
    ) -> ProviderResult<(NativePublicKey, NativePrivateKey)> {
        if spec.scheme != "RSA-OAEP" || spec.hash != "SHA-256" {
            return Err(ProviderError::Unsupported(format!(
                "{} with {}",
                spec.scheme, spec.hash
            )));
        }
        ensure_modulus(spec.modulus_bits)?;

        // Prime search takes long enough to stall a runtime worker
        let bits = spec.modulus_bits;
        let private = tokio::task::spawn_blocking(move || RsaPrivateKey::new(&mut OsRng, bits))
            .await
            .map_err(|e| ProviderError::KeyGeneration(format!("generation task failed: {}", e)))?
            .map_err(|e| ProviderError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);

        Ok((NativePublicKey(public), NativePrivateKey(private)))
    }

    async fn generate_symmetric_key(
        &self,
        spec: SymmetricSpec,
    ) -> ProviderResult<NativeSymmetricKey> {
        if spec.scheme != "AES-GCM" || spec.bits != SYMMETRIC_KEY_SIZE * 8 {
            return Err(ProviderError::Unsupported(format!(
                "{}-{}",
                spec.scheme, spec.bits
            )));
        }

        let mut bytes = [0u8; SYMMETRIC_KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ProviderError::KeyGeneration(e.to_string()))?;

        Ok(NativeSymmetricKey {
            bytes,
            usage: KeyUsage::EncryptDecrypt,
        })
    }

    async fn encrypt_asymmetric(
        &self,
        key: &NativePublicKey,
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        key.0
            .encrypt(&mut OsRng, Self::padding(), data)
            .map_err(|e| ProviderError::Cipher(e.to_string()))
    }

    async fn decrypt_asymmetric(
        &self,
        key: &NativePrivateKey,
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        key.0
            .decrypt(Self::padding(), data)
            .map_err(|e| ProviderError::Cipher(e.to_string()))
    }

    async fn encrypt_symmetric(
        &self,
        key: &NativeSymmetricKey,
        iv: &[u8],
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        if !key.usage.allows_encrypt() {
            return Err(ProviderError::UsageNotPermitted("encrypt"));
        }
        check_iv(iv)?;

        Self::cipher(key)?
            .encrypt(AesNonce::from_slice(iv), data)
            .map_err(|e| ProviderError::Cipher(e.to_string()))
    }

    async fn decrypt_symmetric(
        &self,
        key: &NativeSymmetricKey,
        iv: &[u8],
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        check_iv(iv)?;

        // aes-gcm only fails here when the tag does not verify
        Self::cipher(key)?
            .decrypt(AesNonce::from_slice(iv), data)
            .map_err(|_| ProviderError::TagMismatch)
    }

    async fn export_public_key(&self, key: &NativePublicKey) -> ProviderResult<Vec<u8>> {
        key.0
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| ProviderError::InvalidKey(e.to_string()))
    }

    async fn export_private_key(
        &self,
        key: &NativePrivateKey,
    ) -> ProviderResult<Zeroizing<Vec<u8>>> {
        key.0
            .to_pkcs8_der()
            .map(|doc| Zeroizing::new(doc.as_bytes().to_vec()))
            .map_err(|e| ProviderError::InvalidKey(e.to_string()))
    }

    async fn export_symmetric_key(
        &self,
        key: &NativeSymmetricKey,
    ) -> ProviderResult<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(key.bytes.to_vec()))
    }

    async fn import_public_key(&self, spki: &[u8]) -> ProviderResult<NativePublicKey> {
        let key = RsaPublicKey::from_public_key_der(spki)
            .map_err(|e| ProviderError::InvalidKey(format!("SPKI: {}", e)))?;
        ensure_modulus(key.size() * 8)?;
        Ok(NativePublicKey(key))
    }

    async fn import_private_key(&self, pkcs8: &[u8]) -> ProviderResult<NativePrivateKey> {
        let key = RsaPrivateKey::from_pkcs8_der(pkcs8)
            .map_err(|e| ProviderError::InvalidKey(format!("PKCS#8: {}", e)))?;
        ensure_modulus(key.size() * 8)?;
        Ok(NativePrivateKey(key))
    }

    async fn import_symmetric_key(
        &self,
        raw: &[u8],
        usage: KeyUsage,
    ) -> ProviderResult<NativeSymmetricKey> {
        let bytes: [u8; SYMMETRIC_KEY_SIZE] = raw.try_into().map_err(|_| {
            ProviderError::InvalidKey(format!(
                "AES-256 key must be {} bytes, got {}",
                SYMMETRIC_KEY_SIZE,
                raw.len()
            ))
        })?;
        Ok(NativeSymmetricKey { bytes, usage })
    }

    async fn random_bytes(&self, len: usize) -> ProviderResult<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ProviderError::Rng(e.to_string()))?;
        Ok(bytes)
    }
}

// ============================================================================
// TESTS
// ============================================================================
