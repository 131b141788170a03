use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;
use knot_sdk::SignatureVerifier;
use knot_webhook::{AppState, run};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(long, env = "KNOT_WEBHOOK_HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "KNOT_WEBHOOK_PORT", default_value = "3000")]
    port: u16,
    /// PEM public key of the Knot services (SPKI, or PKCS#1 for RSA)
    #[clap(long, env = "KNOT_PUBLIC_KEY_FILE")]
    public_key_file: PathBuf,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let pem = std::fs::read_to_string(&args.public_key_file)
        .wrap_err_with(|| format!("reading {}", args.public_key_file.display()))?;
    let verifier = SignatureVerifier::from_pem(&pem)?;

    run(&args.host, args.port, AppState::new(verifier)).await
}
