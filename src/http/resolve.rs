//! Maps request URIs onto the document root.
//!
//! Traversal is blocked with a literal check: a URI containing `/../` or
//! ending in `/..` is refused. Nothing is decoded or normalized here, so the
//! check is only as strong as that substring test. Deployments that need a
//! containment guarantee enable `strict_paths`, which canonicalizes the final
//! path in [`crate::http::static_files`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::http::response::StatusCode;

pub const INDEX_FILE: &str = "index.html";

/// Rejects URIs that are not rooted or that try to climb out of the root.
pub fn check_uri(uri: &[u8]) -> Result<(), StatusCode> {
    if !uri.starts_with(b"/") {
        return Err(StatusCode::BadRequest);
    }
    if uri.windows(4).any(|w| w == b"/../") || uri.ends_with(b"/..") {
        return Err(StatusCode::BadRequest);
    }
    Ok(())
}

/// Resolves a static URI to a path under `doc_root`.
///
/// A trailing `/` is dropped (except for `/` itself) and a URI naming a
/// directory is pointed at that directory's `index.html`.
pub async fn resolve_path(doc_root: &Path, uri: &[u8]) -> Result<PathBuf, StatusCode> {
    check_uri(uri)?;

    let mut uri = uri.to_vec();
    if uri.len() > 1 && uri.ends_with(b"/") {
        uri.pop();
    }

    let candidate = join_root(doc_root, &uri);
    let is_dir = tokio::fs::metadata(&candidate)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    if is_dir {
        if !uri.ends_with(b"/") {
            uri.push(b'/');
        }
        uri.extend_from_slice(INDEX_FILE.as_bytes());
    }

    Ok(join_root(doc_root, &uri))
}

/// Plain concatenation: `uri` always starts with `/`, so the result can never
/// be an absolute path that escapes `doc_root` the way `Path::join` would.
fn join_root(doc_root: &Path, uri: &[u8]) -> PathBuf {
    let mut path = OsString::from(doc_root.as_os_str());
    path.push(os_from_bytes(uri));
    PathBuf::from(path)
}

#[cfg(unix)]
fn os_from_bytes(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn os_from_bytes(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}
