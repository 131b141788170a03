use anyhow::{Result, bail};

use super::headers::HeaderSource;

/// Pseudo-header covering the method and path.
pub const REQUEST_TARGET: &str = "(request-target)";
/// Timestamp header, epoch milliseconds.
pub const DATE_HEADER: &str = "x-knot-date";
pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const CONTENT_LENGTH_HEADER: &str = "content-length";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Headers covered by every outbound signature, in wire order.
pub const SIGNED_HEADERS: [&str; 4] = [
    DATE_HEADER,
    REQUEST_TARGET,
    CONTENT_TYPE_HEADER,
    CONTENT_LENGTH_HEADER,
];

/// Value of the `(request-target)` line: lowercased method, a space, then
/// the path exactly as sent (query string included).
pub fn request_target(method: &str, path: &str) -> String {
    format!("{} {}", method.to_ascii_lowercase(), path)
}

/// Builds the string fed to the signature primitive.
///
/// One `name: value` line per entry of `header_names`, in that order,
/// joined by `\n` with no trailing newline. Names are lowercased; values are
/// trimmed. Every listed header other than `(request-target)` must be
/// present in `headers`.
pub fn signing_string<H, N>(method: &str, path: &str, header_names: &[N], headers: &H) -> Result<String>
where
    H: HeaderSource + ?Sized,
    N: AsRef<str>,
{
    if header_names.is_empty() {
        bail!("no headers to sign");
    }

    let mut lines = Vec::with_capacity(header_names.len());
    for name in header_names {
        let name = name.as_ref().to_ascii_lowercase();
        let value = if name == REQUEST_TARGET {
            request_target(method, path)
        } else {
            match headers.header_value(&name) {
                Some(value) => value.trim().to_string(),
                None => bail!("missing value for signed header `{name}`"),
            }
        };
        lines.push(format!("{name}: {value}"));
    }
    Ok(lines.join("\n"))
}
