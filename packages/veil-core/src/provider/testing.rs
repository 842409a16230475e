//! Test fixtures: shared RSA key pairs and a provider that fails on demand.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use super::{
    AsymmetricSpec, KeyProvider, KeyUsage, NativeKeyProvider, NativePrivateKey,
    NativePublicKey, NativeSymmetricKey, ProviderError, ProviderResult, SymmetricSpec,
    RSA_MODULUS_BITS,
};

// RSA generation is slow, so every test shares these two pairs.
static PRIMARY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS).unwrap());
static SECONDARY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS).unwrap());

static OVERSIZED: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 3072).unwrap());

fn pair(private: &RsaPrivateKey) -> (NativePublicKey, NativePrivateKey) {
    (
        NativePublicKey(RsaPublicKey::from(private)),
        NativePrivateKey(private.clone()),
    )
}

/// The key pair most tests encrypt to
pub(crate) fn primary_key_pair() -> (NativePublicKey, NativePrivateKey) {
    pair(&PRIMARY)
}

/// An unrelated key pair, for wrong-key scenarios
pub(crate) fn secondary_key_pair() -> (NativePublicKey, NativePrivateKey) {
    pair(&SECONDARY)
}

/// SPKI and PKCS#8 DER of a valid 3072-bit pair
pub(crate) fn oversized_key_der() -> (Vec<u8>, Zeroizing<Vec<u8>>) {
    let public = RsaPublicKey::from(&*OVERSIZED);
    let spki = public.to_public_key_der().unwrap().as_bytes().to_vec();
    let pkcs8 = Zeroizing::new(OVERSIZED.to_pkcs8_der().unwrap().as_bytes().to_vec());
    (spki, pkcs8)
}

/// Operations [`FailingProvider`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailAt {
    GenerateKeyPair,
    GenerateSymmetricKey,
    RandomBytes,
    EncryptSymmetric,
    ExportSymmetricKey,
    EncryptAsymmetric,
    ShortRandom,
}

/// Native provider with one operation rigged to fail
pub(crate) struct FailingProvider {
    inner: NativeKeyProvider,
    fail_at: FailAt,
}

impl FailingProvider {
    pub(crate) fn new(fail_at: FailAt) -> Self {
        Self {
            inner: NativeKeyProvider,
            fail_at,
        }
    }

    fn check(&self, op: FailAt) -> ProviderResult<()> {
        if self.fail_at == op {
            return Err(ProviderError::Cipher(format!("injected failure at {:?}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyProvider for FailingProvider {
    type PublicKey = NativePublicKey;
    type PrivateKey = NativePrivateKey;
    type SymmetricKey = NativeSymmetricKey;

    async fn generate_asymmetric_key_pair(
        &self,
        _spec: AsymmetricSpec,
    ) -> ProviderResult<(NativePublicKey, NativePrivateKey)> {
        if self.fail_at == FailAt::GenerateKeyPair {
            return Err(ProviderError::KeyGeneration("no entropy available".into()));
        }
        // Skip the slow path; hand out the shared fixture
        Ok(primary_key_pair())
    }

    async fn generate_symmetric_key(
        &self,
        spec: SymmetricSpec,
    ) -> ProviderResult<NativeSymmetricKey> {
        if self.fail_at == FailAt::GenerateSymmetricKey {
            return Err(ProviderError::KeyGeneration("no entropy available".into()));
        }
        self.inner.generate_symmetric_key(spec).await
    }

    async fn encrypt_asymmetric(
        &self,
        key: &NativePublicKey,
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        self.check(FailAt::EncryptAsymmetric)?;
        self.inner.encrypt_asymmetric(key, data).await
    }

    async fn decrypt_asymmetric(
        &self,
        key: &NativePrivateKey,
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        self.inner.decrypt_asymmetric(key, data).await
    }

    async fn encrypt_symmetric(
        &self,
        key: &NativeSymmetricKey,
        iv: &[u8],
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        self.check(FailAt::EncryptSymmetric)?;
        self.inner.encrypt_symmetric(key, iv, data).await
    }

    async fn decrypt_symmetric(
        &self,
        key: &NativeSymmetricKey,
        iv: &[u8],
        data: &[u8],
    ) -> ProviderResult<Vec<u8>> {
        self.inner.decrypt_symmetric(key, iv, data).await
    }

    async fn export_public_key(&self, key: &NativePublicKey) -> ProviderResult<Vec<u8>> {
        self.inner.export_public_key(key).await
    }

    async fn export_private_key(
        &self,
        key: &NativePrivateKey,
    ) -> ProviderResult<Zeroizing<Vec<u8>>> {
        self.inner.export_private_key(key).await
    }

    async fn export_symmetric_key(
        &self,
        key: &NativeSymmetricKey,
    ) -> ProviderResult<Zeroizing<Vec<u8>>> {
        self.check(FailAt::ExportSymmetricKey)?;
        self.inner.export_symmetric_key(key).await
    }

    async fn import_public_key(&self, spki: &[u8]) -> ProviderResult<NativePublicKey> {
        self.inner.import_public_key(spki).await
    }

    async fn import_private_key(&self, pkcs8: &[u8]) -> ProviderResult<NativePrivateKey> {
        self.inner.import_private_key(pkcs8).await
    }

    async fn import_symmetric_key(
        &self,
        raw: &[u8],
        usage: KeyUsage,
    ) -> ProviderResult<NativeSymmetricKey> {
        self.inner.import_symmetric_key(raw, usage).await
    }

    async fn random_bytes(&self, len: usize) -> ProviderResult<Vec<u8>> {
        match self.fail_at {
            FailAt::RandomBytes => Err(ProviderError::Rng("source unavailable".into())),
            FailAt::ShortRandom => self.inner.random_bytes(len.saturating_sub(1)).await,
            _ => self.inner.random_bytes(len).await,
        }
    }
}
