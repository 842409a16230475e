//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use veil_core::export::DEFAULT_PREVIEW_LEN;
use veil_core::{format_file_size, package, KeyExport, PlaintextFile, Session, SessionConfig};

fn new_session() -> Session {
    Session::native(SessionConfig::from_env())
}

fn read_key_file(path: &Path) -> Result<KeyExport> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read key file {}", path.display()))?;
    KeyExport::from_json(&text)
        .wrap_err_with(|| format!("{} is not a usable key file", path.display()))
}

async fn load_keys(session: &mut Session, path: &Path) -> Result<()> {
    let export = read_key_file(path)?;
    session
        .import_keys(&export)
        .await
        .wrap_err_with(|| format!("{} does not hold a usable key pair", path.display()))?;
    Ok(())
}

async fn load_recipient(session: &mut Session, path: &Path) -> Result<()> {
    let export = read_key_file(path)?;
    session.import_recipient(&export).await?;
    Ok(())
}

/// Generate a key pair and write it as a key export document, plus a
/// public-only copy when `public_out` is given
pub async fn keygen(out: &Path, public_out: Option<&Path>) -> Result<()> {
    let mut session = new_session();
    tracing::info!("Generating RSA-2048 key pair...");
    session.generate_asymmetric_key_pair().await?;

    let export = session.export_keys().await?;
    fs::write(out, export.to_json()?)
        .wrap_err_with(|| format!("failed to write {}", out.display()))?;
    if let Some(path) = public_out {
        fs::write(path, export.public_only().to_json()?)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        println!("Public key written to {}", path.display());
    }

    let preview = export.preview(DEFAULT_PREVIEW_LEN);
    println!("Key pair written to {}", out.display());
    println!("  algorithm:   {}", export.algorithm);
    println!("  generated:   {}", export.generated);
    println!("  public key:  {}...", preview.public_key);
    if let Some(private_key) = preview.private_key {
        println!("  private key: {}...", private_key);
    }
    println!("Keep this file private: it can open every package sealed to it.");
    Ok(())
}

/// Encrypt `file` to the public key in `keys`, returning the package path
pub async fn encrypt(
    file: &Path,
    keys: &Path,
    mime: Option<&str>,
    out: Option<&Path>,
) -> Result<PathBuf> {
    let mut session = new_session();
    load_recipient(&mut session, keys).await?;
    session.generate_symmetric_key().await?;

    let plaintext = PlaintextFile::read_from(file, mime)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    session.select_file(plaintext);

    let sealed = session.encrypt().await?;
    let target = match out {
        Some(path) => path.to_path_buf(),
        None => file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(sealed.suggested_file_name()),
    };
    fs::write(&target, package::serialize(sealed)?)
        .wrap_err_with(|| format!("failed to write {}", target.display()))?;

    println!(
        "Encrypted {} ({}) -> {}",
        sealed.file_name(),
        format_file_size(sealed.file_size()),
        target.display()
    );
    Ok(target)
}

/// Decrypt `package_path` with the key pair in `keys` into `out_dir`,
/// returning the path of the written file
pub async fn decrypt(package_path: &Path, keys: &Path, out_dir: &Path) -> Result<PathBuf> {
    let mut session = new_session();
    load_keys(&mut session, keys).await?;

    let text = fs::read_to_string(package_path)
        .wrap_err_with(|| format!("failed to read {}", package_path.display()))?;
    session.load_package(&text)?;

    let opened = session.decrypt().await?;
    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("failed to create {}", out_dir.display()))?;
    let target = out_dir.join(opened.safe_file_name());
    fs::write(&target, opened.bytes())
        .wrap_err_with(|| format!("failed to write {}", target.display()))?;

    println!(
        "Decrypted {} ({}) -> {}",
        opened.name(),
        format_file_size(opened.len() as u64),
        target.display()
    );
    Ok(target)
}

/// Print a package's metadata
pub fn inspect(package_path: &Path) -> Result<()> {
    let text = fs::read_to_string(package_path)
        .wrap_err_with(|| format!("failed to read {}", package_path.display()))?;
    let sealed = package::deserialize(&text)?;

    let summary = serde_json::json!({
        "version": sealed.version(),
        "fileName": sealed.file_name(),
        "fileType": sealed.file_type(),
        "fileSize": sealed.file_size(),
        "fileSizeHuman": format_file_size(sealed.file_size()),
        "encryptedSize": sealed.encrypted_size(),
        "timestamp": veil_core::time::to_iso8601(&sealed.timestamp()),
        "encryption": {
            "file": sealed.encryption().file,
            "key": sealed.encryption().key,
        },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
