use crate::config;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Upload root (absolute), from `config::upload_dir()`.
/// If relative in env, resolve against current_dir().
pub fn upload_root() -> PathBuf {
    let p = PathBuf::from(config::upload_dir());
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// A single ticket's attachment folder: {root}/tickets/ticket_{ticket_id}
pub fn ticket_dir(root: &Path, ticket_id: i64) -> PathBuf {
    root.join("tickets").join(format!("ticket_{ticket_id}"))
}

/// Path relative to the upload root under which an attachment is stored.
///
/// The relative form is what gets persisted, so moving the upload root only
/// requires changing configuration.
pub fn attachment_relative_path(ticket_id: i64, stored_name: &str) -> PathBuf {
    PathBuf::from("tickets")
        .join(format!("ticket_{ticket_id}"))
        .join(stored_name)
}

/// Resolve a persisted relative storage path against the upload root.
///
/// Returns `None` for paths that would escape the root (absolute paths or `..`).
pub fn resolve_stored(root: &Path, relative: &str) -> Option<PathBuf> {
    let rel = Path::new(relative);
    if rel.is_absolute()
        || rel
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return None;
    }
    Some(root.join(rel))
}
