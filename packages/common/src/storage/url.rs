//! Recovers the stable storage path embedded in a signed read URL.
//!
//! Two historical URL shapes are in circulation and both must keep
//! decoding:
//!
//! 1. the canonical query-signed shape,
//!    `https://<host>/<bucket>/<path>?<signature-params>` — the path is
//!    everything between the bucket segment and the query string;
//! 2. a bucket-qualified shape where the object name follows an `/o/`
//!    marker and is percent-encoded as a single segment, e.g.
//!    `https://<host>/v0/b/<bucket>/o/<pct-encoded-path>?alt=media`.
//!
//! New URLs are minted only in shape 1; shape 2 exists for rows written
//! before the storage migration.

/// Extract the storage path from a signed read URL.
///
/// Returns `None` when the URL matches neither supported shape; callers
/// must treat such an object as unreachable (log and skip) rather than
/// failing the surrounding operation.
pub fn extract_path(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    // Split host from the path-and-query part.
    let slash = rest.find('/')?;
    let (host, path_and_query) = rest.split_at(slash);
    if host.is_empty() {
        return None;
    }
    let path_and_query = &path_and_query[1..];
    let path_part = path_and_query
        .split_once('?')
        .map(|(p, _)| p)
        .unwrap_or(path_and_query);

    // The object-marker shape encodes the whole path as one segment.
    if let Some((_, encoded)) = path_part.split_once("/o/") {
        if encoded.is_empty() {
            return None;
        }
        return percent_decode(encoded);
    }

    // Canonical shape: first segment is the bucket, the rest is the path.
    let (_bucket, object) = path_part.split_once('/')?;
    if object.is_empty() {
        return None;
    }
    percent_decode(object)
}

/// Percent-decode a URL path component.
///
/// Returns `None` on truncated or non-hex escapes, or when the decoded
/// bytes are not valid UTF-8.
pub fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = hex_val(*bytes.get(i + 1)?)?;
                let lo = hex_val(*bytes.get(i + 2)?)?;
                out.push(hi << 4 | lo);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Percent-encode a storage path for embedding in a URL, keeping `/`
/// separators intact.
pub fn percent_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for b in path.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
