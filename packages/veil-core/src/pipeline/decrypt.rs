//! Decryption pipeline: [`Package`] + private key -> [`PlaintextFile`].

use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::file::PlaintextFile;
use crate::package::Package;
use crate::provider::{KeyProvider, KeyUsage, ProviderError, SYMMETRIC_KEY_SIZE};

/// Open a package.
///
/// Either the whole plaintext comes back or nothing does. Decrypting the
/// same package with the same key always yields the same bytes.
///
/// # Errors
///
/// - [`Error::KeyRecovery`] if the private key cannot unwrap the AES key.
///   The file ciphertext is not touched in that case.
/// - [`Error::Integrity`] if the authentication tag does not verify.
pub async fn decrypt<P: KeyProvider>(
    provider: &P,
    package: &Package,
    private_key: &P::PrivateKey,
) -> Result<PlaintextFile> {
    tracing::debug!("Step 1/3: decrypting AES key with RSA-OAEP");
    let raw_key = provider
        .decrypt_asymmetric(private_key, package.encrypted_key())
        .await
        .map(Zeroizing::new)
        .map_err(|e| {
            tracing::warn!(error = %e, "AES key recovery failed");
            Error::KeyRecovery(e.to_string())
        })?;

    tracing::debug!("Step 2/3: importing AES key");
    if raw_key.len() != SYMMETRIC_KEY_SIZE {
        tracing::warn!(len = raw_key.len(), "Recovered AES key has the wrong length");
        return Err(Error::KeyRecovery(format!(
            "recovered key is {} bytes, expected {}",
            raw_key.len(),
            SYMMETRIC_KEY_SIZE
        )));
    }
    let key = provider
        .import_symmetric_key(&raw_key, KeyUsage::DecryptOnly)
        .await
        .map_err(|e| Error::KeyRecovery(e.to_string()))?;

    tracing::debug!("Step 3/3: decrypting file with AES-256-GCM");
    let bytes = provider
        .decrypt_symmetric(&key, package.iv(), package.encrypted_file())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Integrity check failed");
            match e {
                ProviderError::TagMismatch => Error::Integrity(
                    "authentication tag mismatch; the package was modified or corrupted".into(),
                ),
                other => Error::Integrity(other.to_string()),
            }
        })?;

    tracing::info!(
        file_name = package.file_name(),
        file_size = bytes.len(),
        "File decrypted"
    );
    Ok(PlaintextFile::new(
        bytes,
        package.file_name(),
        package.file_type(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encrypt;
    use crate::provider::testing::{primary_key_pair, secondary_key_pair};
    use crate::provider::{NativeKeyProvider, NativePrivateKey, SymmetricSpec};

    async fn sealed(bytes: &[u8]) -> (NativeKeyProvider, Package, NativePrivateKey) {
        let provider = NativeKeyProvider::new();
        let (public, private) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();
        let file = PlaintextFile::new(bytes.to_vec(), "msg.txt", "text/plain");
        let package = encrypt(&provider, &file, &key, &public).await.unwrap();
        (provider, package, private)
    }

    #[tokio::test]
    async fn test_every_bit_of_ciphertext_is_authenticated() {
        let (provider, package, private) = sealed(b"HELLOWORLD").await;

        for byte in 0..package.encrypted_file.len() {
            for bit in 0..8 {
                let mut tampered = package.clone();
                tampered.encrypted_file[byte] ^= 1 << bit;
                let err = decrypt(&provider, &tampered, &private).await.unwrap_err();
                assert!(
                    matches!(err, Error::Integrity(_)),
                    "byte {} bit {}: {:?}",
                    byte,
                    bit,
                    err
                );
            }
        }
    }

    #[tokio::test]
    async fn test_every_bit_of_iv_is_authenticated() {
        let (provider, package, private) = sealed(b"HELLOWORLD").await;

        for byte in 0..package.iv.len() {
            for bit in 0..8 {
                let mut tampered = package.clone();
                tampered.iv[byte] ^= 1 << bit;
                let err = decrypt(&provider, &tampered, &private).await.unwrap_err();
                assert!(matches!(err, Error::Integrity(_)), "byte {} bit {}", byte, bit);
            }
        }
    }

    #[tokio::test]
    async fn test_truncated_ciphertext_fails_integrity() {
        let (provider, mut package, private) = sealed(b"HELLOWORLD").await;
        package.encrypted_file.truncate(4);
        assert!(matches!(
            decrypt(&provider, &package, &private).await,
            Err(Error::Integrity(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_private_key_is_key_recovery() {
        let (provider, package, _) = sealed(b"for someone else").await;
        let (_, other_private) = secondary_key_pair();

        let err = decrypt(&provider, &package, &other_private)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::KeyRecovery(_)));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_wrong_length_recovered_key_is_key_recovery() {
        let (provider, mut package, private) = sealed(b"short key").await;
        let (public, _) = primary_key_pair();
        package.encrypted_key = provider
            .encrypt_asymmetric(&public, &[9u8; 16])
            .await
            .unwrap();

        let err = decrypt(&provider, &package, &private).await.unwrap_err();
        assert!(matches!(err, Error::KeyRecovery(ref msg) if msg.contains("16 bytes")));
    }

    #[tokio::test]
    async fn test_tampered_metadata_goes_undetected() {
        // Metadata is advisory and outside the authenticated data
        let (provider, mut package, private) = sealed(b"payload").await;
        package.file_name = "../../evil.sh".into();

        let opened = decrypt(&provider, &package, &private).await.unwrap();
        assert_eq!(opened.bytes(), b"payload");
        assert_eq!(opened.name(), "../../evil.sh");
        assert_eq!(opened.safe_file_name(), "evil.sh");
    }
}
