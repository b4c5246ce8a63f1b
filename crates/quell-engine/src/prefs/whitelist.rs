//! Domain normalization for the whitelist

use url::Url;

/// Reduce a URL or host to the form stored in the whitelist.
///
/// Lowercases, drops scheme, a leading `www.`, port, path, query and
/// fragment. Bare hosts are accepted.
pub fn normalize_domain(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    };
    let host = parsed
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| strip_by_hand(trimmed));

    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Fallback for inputs the URL parser rejects
fn strip_by_hand(input: &str) -> String {
    let without_scheme = input.split_once("://").map_or(input, |(_, rest)| rest);
    let end = without_scheme
        .find(['/', '?', '#', ':'])
        .unwrap_or(without_scheme.len());
    without_scheme[..end].to_ascii_lowercase()
}
