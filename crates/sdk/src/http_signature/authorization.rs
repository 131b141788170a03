use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::signing::{HashAlgorithm, SignatureAlgorithm};

const SCHEME: &str = "Signature";

/// Components of a `Signature ...` authorization header.
///
/// `algorithm` and `hash` stay `None` when the header omits them so that a
/// parsed header serializes back to the same text; use
/// [`AuthorizationHeader::resolved_algorithm`] and
/// [`AuthorizationHeader::resolved_hash`] for the effective values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    pub key_id: String,
    pub algorithm: Option<SignatureAlgorithm>,
    pub hash: Option<HashAlgorithm>,
    /// Lowercase header names in signing-string order.
    pub headers: Vec<String>,
    pub signature: Vec<u8>,
}

impl AuthorizationHeader {
    pub fn resolved_algorithm(&self) -> SignatureAlgorithm {
        self.algorithm.unwrap_or_default()
    }

    pub fn resolved_hash(&self) -> HashAlgorithm {
        self.hash
            .unwrap_or_else(|| self.resolved_algorithm().default_hash())
    }

    pub fn covers(&self, name: &str) -> bool {
        self.headers.iter().any(|header| header == name)
    }

    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let (scheme, params) = value
            .split_once(' ')
            .context("authorization header has no parameters")?;
        if !scheme.eq_ignore_ascii_case(SCHEME) {
            bail!("unsupported authorization scheme `{scheme}`");
        }

        let mut key_id = None;
        let mut algorithm = None;
        let mut hash = None;
        let mut headers = None;
        let mut signature = None;

        for (name, raw) in parse_params(params.trim())? {
            let slot = match name {
                "keyId" => &mut key_id,
                "algorithm" => &mut algorithm,
                "hash" => &mut hash,
                "headers" => &mut headers,
                "signature" => &mut signature,
                other => bail!("unknown authorization field `{other}`"),
            };
            if slot.replace(raw).is_some() {
                bail!("duplicate authorization field `{name}`");
            }
        }

        let key_id = key_id.context("missing keyId")?;
        if key_id.is_empty() {
            bail!("empty keyId");
        }

        let headers: Vec<String> = headers
            .context("missing headers")?
            .split_ascii_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        if headers.is_empty() {
            bail!("empty headers list");
        }

        let signature = STANDARD
            .decode(signature.context("missing signature")?)
            .context("signature is not valid base64")?;
        if signature.is_empty() {
            bail!("empty signature");
        }

        Ok(Self {
            key_id: key_id.to_string(),
            algorithm: algorithm.map(str::parse::<SignatureAlgorithm>).transpose()?,
            hash: hash.map(str::parse::<HashAlgorithm>).transpose()?,
            headers,
            signature,
        })
    }
}

impl FromStr for AuthorizationHeader {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME} keyId=\"{}\"", self.key_id)?;
        if let Some(algorithm) = self.algorithm {
            write!(f, ",algorithm=\"{algorithm}\"")?;
        }
        if let Some(hash) = self.hash {
            write!(f, ",hash=\"{hash}\"")?;
        }
        write!(
            f,
            ",headers=\"{}\",signature=\"{}\"",
            self.headers.join(" "),
            STANDARD.encode(&self.signature)
        )
    }
}

/// Splits `a="x",b="y"` into pairs. Values may not contain `"`.
fn parse_params(input: &str) -> Result<Vec<(&str, &str)>> {
    let mut params = Vec::new();
    let mut rest = input;
    loop {
        let (name, after) = rest
            .split_once('=')
            .context("expected `name=\"value\"`")?;
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("invalid field name `{name}`");
        }
        let after = after
            .strip_prefix('"')
            .with_context(|| format!("value of `{name}` is not quoted"))?;
        let (value, after) = after
            .split_once('"')
            .with_context(|| format!("unterminated value for `{name}`"))?;
        params.push((name, value));

        let after = after.trim_start();
        if after.is_empty() {
            return Ok(params);
        }
        rest = after
            .strip_prefix(',')
            .context("expected `,` between fields")?
            .trim_start();
    }
}
