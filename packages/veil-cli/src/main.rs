//! Veil command-line front end
//!
//! Seal files for transfer and open them again:
//!
//! ```text
//! veil keygen --public-out rsa-public.json   # writes rsa-keypair.json too
//! veil encrypt report.pdf --keys rsa-public.json
//! veil inspect encrypted_report.pdf.secure
//! veil decrypt encrypted_report.pdf.secure --keys rsa-keypair.json --out-dir ./inbox
//! ```
//!
//! All cryptography lives in `veil-core`; this binary only moves bytes
//! between the filesystem and a [`veil_core::Session`].

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "veil", version, about = "Hybrid RSA-OAEP + AES-256-GCM file encryption")]
struct Args {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an RSA-OAEP-2048 key pair and write it as a key export file
    Keygen {
        /// Where to write the key export
        #[arg(short, long, default_value = veil_core::export::FILE_NAME)]
        out: PathBuf,

        /// Also write a public-only copy others can encrypt to
        #[arg(long)]
        public_out: Option<PathBuf>,
    },

    /// Encrypt a file into a package
    Encrypt {
        /// File to encrypt
        file: PathBuf,

        /// Key export file holding the recipient's public key (a full key
        /// pair file works too; its private key is not used)
        #[arg(short, long, env = "VEIL_KEYS")]
        keys: PathBuf,

        /// MIME type recorded in the package
        #[arg(long)]
        mime: Option<String>,

        /// Where to write the package (default: encrypted_<name>.secure)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Decrypt a package
    Decrypt {
        /// Package file
        package: PathBuf,

        /// Key export file holding the private key
        #[arg(short, long, env = "VEIL_KEYS")]
        keys: PathBuf,

        /// Directory the decrypted file is written to
        #[arg(long, default_value = ".", env = "VEIL_OUT_DIR")]
        out_dir: PathBuf,
    },

    /// Show a package's metadata without decrypting it
    Inspect {
        /// Package file
        package: PathBuf,
    },
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize tracing
    let default_filter = if args.verbose {
        "veil=debug,veil_core=debug"
    } else {
        "veil=info,veil_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = veil_core::version(), "Starting veil");

    match args.command {
        Command::Keygen { out, public_out } => commands::keygen(&out, public_out.as_deref()).await,
        Command::Encrypt {
            file,
            keys,
            mime,
            out,
        } => commands::encrypt(&file, &keys, mime.as_deref(), out.as_deref())
            .await
            .map(|_| ()),
        Command::Decrypt {
            package,
            keys,
            out_dir,
        } => commands::decrypt(&package, &keys, &out_dir).await.map(|_| ()),
        Command::Inspect { package } => commands::inspect(&package),
    }
}
