use crate::links::LinkStore;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCRATCH_DIR: &str = "tmp";
const LINKS_FILE: &str = "target-links.tmp";
const FILES_DIR: &str = "files";

/// Directory tree holding the link file and the downloaded bodies.
///
/// Nothing here is cleaned up between runs.
#[derive(Debug, Clone)]
pub struct ScratchLayout {
    root: PathBuf,
}

impl ScratchLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn links_file(&self) -> PathBuf {
        self.root.join(LINKS_FILE)
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    pub fn link_store(&self) -> LinkStore {
        LinkStore::new(self.links_file())
    }
}

impl Default for ScratchLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SCRATCH_DIR)
    }
}
