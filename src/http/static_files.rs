use std::path::Path;

use tokio::fs::File;

/// Opens the file at `path` for streaming.
///
/// Returns `None` when nothing readable is there: missing entries,
/// directories and other non-regular files all count as not found. With
/// `contain_in` set, the canonical path must also lie under that root.
pub async fn open_static(path: &Path, contain_in: Option<&Path>) -> Option<File> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    if !meta.is_file() {
        return None;
    }

    if let Some(root) = contain_in {
        if !is_contained(root, path).await {
            tracing::warn!(path = %path.display(), "resolved path escapes document root");
            return None;
        }
    }

    File::open(path).await.ok()
}

async fn is_contained(root: &Path, path: &Path) -> bool {
    let (root, path) = match (
        tokio::fs::canonicalize(root).await,
        tokio::fs::canonicalize(path).await,
    ) {
        (Ok(root), Ok(path)) => (root, path),
        _ => return false,
    };
    path.starts_with(root)
}
