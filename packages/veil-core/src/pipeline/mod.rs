//! # Hybrid Encryption Pipelines
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ENCRYPTION PIPELINE                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. IV = random_bytes(12)                                              │
//! │  2. encryptedFile   = AES-256-GCM(key, IV, file bytes)   (tag appended)│
//! │  3. raw key         = export(key)                        (32 bytes)    │
//! │  4. encryptedAesKey = RSA-OAEP-SHA256(public key, raw key)             │
//! │  5. Package { version "2.0", ciphertexts, IV, metadata, timestamp }    │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                         DECRYPTION PIPELINE                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. raw key = RSA-OAEP-SHA256⁻¹(private key, encryptedAesKey)          │
//! │               failure ──► KeyRecovery (file never touched)             │
//! │  2. key     = import(raw key, decrypt only)                            │
//! │  3. bytes   = AES-256-GCM⁻¹(key, IV, encryptedFile)                    │
//! │               tag mismatch ──► Integrity (no partial output)           │
//! │  4. PlaintextFile { bytes, fileName, fileType }                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both functions are generic over [`KeyProvider`](crate::provider::KeyProvider)
//! and take every input by reference. Checking that the inputs exist at all
//! is the caller's job; see [`Session`](crate::Session).

pub mod decrypt;
pub mod encrypt;

pub use decrypt::decrypt;
pub use encrypt::encrypt;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::PlaintextFile;
    use crate::provider::testing::primary_key_pair;
    use crate::provider::{KeyProvider, NativeKeyProvider, SymmetricSpec};
    use crate::{package, Error};

    async fn round_trip(bytes: Vec<u8>) -> PlaintextFile {
        let provider = NativeKeyProvider::new();
        let (public, private) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();

        let file = PlaintextFile::new(bytes, "data.bin", "application/octet-stream");
        let sealed = encrypt(&provider, &file, &key, &public).await.unwrap();

        // Through the codec, as a real transfer would go
        let text = package::serialize(&sealed).unwrap();
        let received = package::deserialize(&text).unwrap();

        decrypt(&provider, &received, &private).await.unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_empty_file() {
        let opened = round_trip(Vec::new()).await;
        assert!(opened.is_empty());
        assert_eq!(opened.name(), "data.bin");
    }

    #[tokio::test]
    async fn test_round_trip_small_file() {
        let opened = round_trip(b"The quick brown fox".to_vec()).await;
        assert_eq!(opened.bytes(), b"The quick brown fox");
    }

    #[tokio::test]
    async fn test_round_trip_large_file() {
        let bytes: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
        let opened = round_trip(bytes.clone()).await;
        assert_eq!(opened.bytes(), &bytes[..]);
    }

    #[tokio::test]
    async fn test_helloworld_scenario() {
        let provider = NativeKeyProvider::new();
        let (public, private) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();

        let file = PlaintextFile::new(b"HELLOWORLD".to_vec(), "hello.txt", "text/plain");
        let sealed = encrypt(&provider, &file, &key, &public).await.unwrap();

        assert_eq!(sealed.version(), "2.0");
        assert_eq!(sealed.iv().len(), 12);
        assert_eq!(sealed.file_size(), 10);
        assert_eq!(sealed.encrypted_size(), 10 + 16);

        let opened = decrypt(&provider, &sealed, &private).await.unwrap();
        assert_eq!(opened.bytes(), b"HELLOWORLD");
        assert_eq!(opened.mime_type(), "text/plain");
    }

    #[tokio::test]
    async fn test_decrypt_is_deterministic() {
        let provider = NativeKeyProvider::new();
        let (public, private) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();

        let file = PlaintextFile::new(b"same every time".to_vec(), "a.txt", "text/plain");
        let sealed = encrypt(&provider, &file, &key, &public).await.unwrap();

        let first = decrypt(&provider, &sealed, &private).await.unwrap();
        let second = decrypt(&provider, &sealed, &private).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_version_never_reaches_decrypt() {
        let provider = NativeKeyProvider::new();
        let (public, _) = primary_key_pair();
        let key = provider
            .generate_symmetric_key(SymmetricSpec::AES_GCM_256)
            .await
            .unwrap();
        let file = PlaintextFile::new(b"x".to_vec(), "x", "text/plain");
        let sealed = encrypt(&provider, &file, &key, &public).await.unwrap();

        let text = package::serialize(&sealed)
            .unwrap()
            .replace("\"version\": \"2.0\"", "\"version\": \"3.0\"");
        assert!(matches!(
            package::deserialize(&text),
            Err(Error::UnsupportedVersion(Some(_)))
        ));
    }
}
