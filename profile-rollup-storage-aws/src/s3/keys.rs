//! Key prefix handling and ETag normalization

use profile_rollup_core::{StoreError, StoreResult};

/// Full S3 key for a document key under an optional prefix
pub fn to_s3_key(key: &str, prefix: Option<&str>) -> String {
    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(p) => format!("{p}/{key}"),
        None => key.to_string(),
    }
}

/// Listing prefix (with trailing slash) for an optional configured prefix
pub fn list_prefix(prefix: Option<&str>) -> Option<String> {
    prefix
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .map(|p| format!("{p}/"))
}

/// Document key for an S3 key, if it sits under the prefix
pub fn from_s3_key<'a>(s3_key: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    match list_prefix(prefix) {
        Some(p) => s3_key.strip_prefix(p.as_str()),
        None => Some(s3_key),
    }
}

/// Strip the quotes S3 puts around ETags
pub fn normalize_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

/// Normalized ETag of a downloaded object
///
/// A read without an ETag cannot back an `If-Match` write, so it is an error
/// rather than an empty tag.
pub fn required_etag(etag: Option<&str>, s3_key: &str) -> StoreResult<String> {
    match etag.map(normalize_etag) {
        Some(etag) if !etag.is_empty() => Ok(etag),
        _ => Err(StoreError::other(format!("S3 returned no ETag for '{s3_key}'"))),
    }
}

/// Quote an ETag for `If-Match`
pub fn quote_etag(etag: &str) -> String {
    if etag.starts_with('"') {
        etag.to_string()
    } else {
        format!("\"{etag}\"")
    }
}
