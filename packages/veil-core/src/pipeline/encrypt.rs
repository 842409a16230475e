//! Encryption pipeline: plaintext + symmetric key + public key -> [`Package`].

use crate::error::{EncryptStep, Error, Result};
use crate::file::PlaintextFile;
use crate::package::Package;
use crate::provider::{KeyProvider, IV_SIZE, SYMMETRIC_KEY_SIZE};
use crate::time;

/// Seal a file for transfer.
///
/// A fresh IV is drawn on every call, so encrypting the same file twice
/// with the same keys never produces the same package. The inputs are
/// only read.
///
/// # Errors
///
/// [`Error::Encryption`] naming the step that failed. No package is
/// returned in that case.
pub async fn encrypt<P: KeyProvider>(
    provider: &P,
    file: &PlaintextFile,
    key: &P::SymmetricKey,
    public_key: &P::PublicKey,
) -> Result<Package> {
    // Step 1: IV
    tracing::debug!("Step 1/4: generating IV");
    let iv = provider
        .random_bytes(IV_SIZE)
        .await
        .map_err(|e| Error::encryption(EncryptStep::GenerateIv, e))?;
    let iv: [u8; IV_SIZE] = iv.try_into().map_err(|short: Vec<u8>| {
        Error::encryption(
            EncryptStep::GenerateIv,
            format!("expected {} random bytes, got {}", IV_SIZE, short.len()),
        )
    })?;

    // Step 2: file contents
    tracing::debug!(len = file.len(), "Step 2/4: encrypting file with AES-256-GCM");
    let encrypted_file = provider
        .encrypt_symmetric(key, &iv, file.bytes())
        .await
        .map_err(|e| Error::encryption(EncryptStep::EncryptFile, e))?;

    // Step 3: raw key for wrapping
    tracing::debug!("Step 3/4: exporting AES key");
    let raw_key = provider
        .export_symmetric_key(key)
        .await
        .map_err(|e| Error::encryption(EncryptStep::ExportKey, e))?;
    if raw_key.len() != SYMMETRIC_KEY_SIZE {
        return Err(Error::encryption(
            EncryptStep::ExportKey,
            format!(
                "exported key is {} bytes, expected {}",
                raw_key.len(),
                SYMMETRIC_KEY_SIZE
            ),
        ));
    }

    // Step 4: wrap
    tracing::debug!("Step 4/4: encrypting AES key with RSA-OAEP");
    let encrypted_key = provider
        .encrypt_asymmetric(public_key, &raw_key)
        .await
        .map_err(|e| Error::encryption(EncryptStep::WrapKey, e))?;

    let package = Package::new(
        iv,
        encrypted_file,
        encrypted_key,
        file.name(),
        file.mime_type(),
        file.len() as u64,
        time::now_utc(),
    );

    tracing::info!(
        file_name = file.name(),
        file_size = file.len(),
        encrypted_size = package.encrypted_size(),
        "File encrypted"
    );
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{primary_key_pair, FailAt, FailingProvider};
    use crate::provider::{KeyUsage, NativeKeyProvider, SymmetricSpec, TAG_SIZE};

    fn sample_file() -> PlaintextFile {
        PlaintextFile::new(b"quarterly numbers".to_vec(), "q3.csv", "text/csv")
    }

    #[tokio::test]
    async fn test_package_carries_metadata() {
        let provider = NativeKeyProvider::new();
        let (public, _) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();

        let file = sample_file();
        let package = encrypt(&provider, &file, &key, &public).await.unwrap();

        assert_eq!(package.file_name(), "q3.csv");
        assert_eq!(package.file_type(), "text/csv");
        assert_eq!(package.file_size(), file.len() as u64);
        assert_eq!(package.encrypted_size(), file.len() + TAG_SIZE);
        assert_eq!(package.encrypted_key().len(), 256);
        assert_eq!(package.encryption().file, "AES-256-GCM");
        assert_eq!(package.encryption().key, "RSA-OAEP-2048");
        assert_ne!(package.encrypted_file(), file.bytes());

        // Input untouched
        assert_eq!(file, sample_file());
    }

    #[tokio::test]
    async fn test_same_input_never_repeats() {
        let provider = NativeKeyProvider::new();
        let (public, _) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();
        let file = sample_file();

        let first = encrypt(&provider, &file, &key, &public).await.unwrap();
        let second = encrypt(&provider, &file, &key, &public).await.unwrap();

        assert_ne!(first.iv(), second.iv());
        assert_ne!(first.encrypted_file(), second.encrypted_file());
        assert_ne!(first.encrypted_key(), second.encrypted_key());
    }

    #[tokio::test]
    async fn test_decrypt_only_key_cannot_encrypt() {
        let provider = NativeKeyProvider::new();
        let (public, _) = primary_key_pair();
        let key = provider
            .import_symmetric_key(&[7u8; SYMMETRIC_KEY_SIZE], KeyUsage::DecryptOnly)
            .await
            .unwrap();

        let err = encrypt(&provider, &sample_file(), &key, &public)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Encryption {
                step: EncryptStep::EncryptFile,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failures_name_their_step() {
        let cases = [
            (FailAt::RandomBytes, EncryptStep::GenerateIv),
            (FailAt::ShortRandom, EncryptStep::GenerateIv),
            (FailAt::EncryptSymmetric, EncryptStep::EncryptFile),
            (FailAt::ExportSymmetricKey, EncryptStep::ExportKey),
            (FailAt::EncryptAsymmetric, EncryptStep::WrapKey),
        ];

        for (fail_at, expected) in cases {
            let provider = FailingProvider::new(fail_at);
            let (public, _) = primary_key_pair();
            let key = provider
                .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
                .await
                .unwrap();

            let err = encrypt(&provider, &sample_file(), &key, &public)
                .await
                .unwrap_err();
            match err {
                Error::Encryption { step, .. } => assert_eq!(step, expected, "{:?}", fail_at),
                other => panic!("unexpected error for {:?}: {:?}", fail_at, other),
            }
        }
    }
}
