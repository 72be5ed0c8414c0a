use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::domain::UploadedFile;

/// Scratch directory for one upload. Removed when dropped, on every exit path.
#[derive(Debug)]
pub struct UploadWorkspace {
    dir: TempDir,
}

impl UploadWorkspace {
    pub fn create(staging_root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(staging_root)?;
        let dir = tempfile::Builder::new()
            .prefix("upload_")
            .tempdir_in(staging_root)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `file` as `{position:03}_{basename}` and returns its path.
    pub async fn stage(&self, position: usize, file: &UploadedFile) -> io::Result<PathBuf> {
        let path = self
            .dir
            .path()
            .join(format!("{:03}_{}", position, file.safe_basename()));
        tokio::fs::write(&path, &file.data).await?;
        Ok(path)
    }
}
