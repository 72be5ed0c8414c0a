use std::fmt;
use std::path::{Path, PathBuf};

use super::SessionId;

const SESSION_DIR_PREFIX: &str = "session_";
const INDEX_FILE_NAME: &str = "index.json";

/// On-disk location of one session's similarity index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStoragePath(PathBuf);

impl SessionStoragePath {
    pub fn new(index_root: &Path, session_id: &SessionId) -> Self {
        Self(index_root.join(format!("{SESSION_DIR_PREFIX}{session_id}")))
    }

    pub fn dir(&self) -> &Path {
        &self.0
    }

    pub fn index_file(&self) -> PathBuf {
        self.0.join(INDEX_FILE_NAME)
    }
}

impl fmt::Display for SessionStoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
