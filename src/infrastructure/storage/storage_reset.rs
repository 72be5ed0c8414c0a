use std::io;
use std::path::Path;

/// Deletes and recreates the storage roots. Sessions never outlive the process.
pub fn reset_storage(index_root: &Path, staging_root: &Path) -> io::Result<()> {
    for root in [index_root, staging_root] {
        match std::fs::remove_dir_all(root) {
            Ok(()) => tracing::info!(path = %root.display(), "Cleared storage root"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        std::fs::create_dir_all(root)?;
    }
    Ok(())
}

