use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use http::Method;
use knot_sdk::client::DEFAULT_STATION_ENDPOINT;
use knot_sdk::http_signature::{
    RequestDescriptor, build_signed_request, build_signed_request_at, signing_string,
};
use knot_sdk::{
    ClientOptions, SignatureVerifier, SigningKeyMaterial, StationsClient, Url, VehiclesClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "knot", about = "Signed calls to the Knot station and vehicle services")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a request with the key from the environment and print its headers
    Sign {
        #[clap(long, default_value = "GET")]
        method: String,
        /// Path and query, e.g. `/v1/42/ping`
        #[clap(long)]
        path: String,
        /// JSON body
        #[clap(long)]
        body: Option<String>,
        /// `X-Knot-Date` in epoch milliseconds instead of now
        #[clap(long)]
        timestamp: Option<i64>,
        #[clap(long, env = "KNOT_STATION_ENDPOINT", default_value = DEFAULT_STATION_ENDPOINT)]
        endpoint: String,
    },
    /// Check the `Authorization` header of a request
    Verify {
        #[clap(long)]
        method: String,
        #[clap(long)]
        path: String,
        /// `Name: value`, repeatable
        #[clap(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        #[clap(long, env = "KNOT_PUBLIC_KEY_FILE")]
        public_key_file: PathBuf,
    },
    Station {
        #[clap(subcommand)]
        action: Action,
    },
    Vehicle {
        #[clap(subcommand)]
        action: Action,
    },
}

#[derive(Subcommand)]
enum Action {
    Ping { id: u64 },
    Info { id: u64 },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in {raw:?}"));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

fn parse_method(raw: &str) -> Result<Method> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|e| anyhow!("invalid HTTP method {raw:?}: {e}"))
}

fn sign(
    method: &str,
    path: &str,
    body: Option<&str>,
    timestamp: Option<i64>,
    endpoint: &str,
) -> Result<()> {
    let options = ClientOptions::from_env()?;
    let key = SigningKeyMaterial::from_pem(options.key_id.clone(), &options.private_key_pem)?
        .with_hash(options.hash.unwrap_or_default());

    let url = format!("{}{}", endpoint.trim_end_matches('/'), path)
        .parse::<Url>()
        .with_context(|| format!("building URL from {endpoint:?} and {path:?}"))?;
    let mut descriptor = RequestDescriptor::new(parse_method(method)?, url);
    if let Some(body) = body {
        descriptor = descriptor.with_body(serde_json::from_str::<serde_json::Value>(body).context("parsing --body as JSON")?);
    }
    let target = descriptor.target_path();

    let signed = match timestamp {
        Some(timestamp) => build_signed_request_at(descriptor, &key, timestamp)?,
        None => build_signed_request(descriptor, &key)?,
    };

    let covered = &signed.authorization().headers;
    let signing = signing_string(signed.method().as_str(), &target, covered.as_slice(), signed.headers())?;
    println!("{signing}");
    println!();
    for (name, value) in signed.headers() {
        println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    Ok(())
}

fn verify(method: &str, path: &str, headers: &[(String, String)], public_key_file: &Path) -> Result<bool> {
    let pem = std::fs::read_to_string(public_key_file)
        .with_context(|| format!("reading {}", public_key_file.display()))?;
    let verifier = SignatureVerifier::from_pem(&pem)?;
    Ok(verifier.verify(headers, method, path))
}

async fn station(action: Action) -> Result<()> {
    let client = StationsClient::new(&ClientOptions::from_env()?)?;
    match action {
        Action::Ping { id } => {
            client.ping(id).await?;
            println!("station {id} is reachable");
        }
        Action::Info { id } => {
            let information = client.information(id).await?;
            println!("{}", serde_json::to_string_pretty(&information)?);
        }
    }
    Ok(())
}

async fn vehicle(action: Action) -> Result<()> {
    let client = VehiclesClient::new(&ClientOptions::from_env()?)?;
    match action {
        Action::Ping { id } => {
            client.ping(id).await?;
            println!("vehicle {id} is reachable");
        }
        Action::Info { id } => {
            let information = client.information(id).await?;
            println!("{}", serde_json::to_string_pretty(&information)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Sign {
            method,
            path,
            body,
            timestamp,
            endpoint,
        } => sign(&method, &path, body.as_deref(), timestamp, &endpoint)?,
        Command::Verify {
            method,
            path,
            headers,
            public_key_file,
        } => {
            if verify(&method, &path, &headers, &public_key_file)? {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Station { action } => station(action).await?,
        Command::Vehicle { action } => vehicle(action).await?,
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn header_arguments() {
        assert_eq!(
            parse_header("X-Knot-Date: 1700000000000").unwrap(),
            ("X-Knot-Date".to_owned(), "1700000000000".to_owned())
        );
        assert_eq!(
            parse_header("Authorization:Signature keyId=\"a:b\"").unwrap().1,
            "Signature keyId=\"a:b\""
        );
        assert!(parse_header("no separator").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn verify_subcommand_collects_headers() {
        let cli = Cli::try_parse_from([
            "knot",
            "verify",
            "--method",
            "POST",
            "--path",
            "/webhooks/stations",
            "--header",
            "Content-Length: 0",
            "--header",
            "X-Knot-Date: 1",
            "--public-key-file",
            "key.pem",
        ])
        .unwrap();
        match cli.command {
            Command::Verify { headers, .. } => assert_eq!(headers.len(), 2),
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn methods_are_case_insensitive() {
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert!(parse_method("bad method").is_err());
    }
}
