//! URL utilities for consistent stream URL handling
//!
//! Validation used by the normalizer and the canonical form used inside
//! duplicate signatures.

use url::Url;

/// Parse a stream URL and check it is a usable network address
///
/// A URL is accepted when it parses, names a host, and its scheme is in
/// `allowed_schemes` (compared case-insensitively). An empty allow-list
/// accepts any scheme.
///
/// # Examples
///
/// ```rust
/// use m3u_curator::utils::url::parse_stream_url;
///
/// let schemes = vec!["http".to_string()];
/// assert!(parse_stream_url("http://example.com/live.m3u8", &schemes).is_ok());
/// assert!(parse_stream_url("example.com/live.m3u8", &schemes).is_err());
/// ```
pub fn parse_stream_url(raw: &str, allowed_schemes: &[String]) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    if !allowed_schemes.is_empty()
        && !allowed_schemes
            .iter()
            .any(|scheme| scheme.eq_ignore_ascii_case(url.scheme()))
    {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err("missing host".to_string()),
    }
}

/// Canonical URL form used in duplicate signatures
///
/// Keeps scheme, host, explicit non-default port and path. Drops user info,
/// query and fragment, lower-cases scheme and host, and removes trailing
/// slashes. Strings that do not parse fall back to a purely textual cleanup
/// so the function never fails.
///
/// # Examples
///
/// ```rust
/// use m3u_curator::utils::url::canonicalize_for_signature;
///
/// assert_eq!(
///     canonicalize_for_signature("HTTP://X.com/feed/?token=1#t"),
///     "http://x.com/feed"
/// );
/// ```
pub fn canonicalize_for_signature(raw: &str) -> String {
    let trimmed = raw.trim();

    match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => {
            let host = url.host_str().unwrap_or_default().to_lowercase();
            let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
            let path = url.path().trim_end_matches('/');
            format!("{}://{}{}{}", url.scheme(), host, port, path)
        }
        _ => {
            let without_fragment = trimmed.split('#').next().unwrap_or_default();
            let without_query = without_fragment.split('?').next().unwrap_or_default();
            without_query.trim_end_matches('/').to_lowercase()
        }
    }
}

/// Whether a token looks like a stream location rather than stray text
pub fn looks_like_stream_url(candidate: &str) -> bool {
    const SCHEMES: &[&str] = &["http://", "https://", "rtmp://", "rtmps://", "rtsp://"];
    const EXTENSIONS: &[&str] = &[".m3u8", ".ts", ".mp4"];

    let lower = candidate.to_lowercase();
    SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
        || EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
