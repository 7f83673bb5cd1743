// Persistence of deduplicated search hits

use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Unique result URLs, compared case-sensitively and iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: BTreeSet<String>,
}

impl LinkSet {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.links.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.links.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.links.iter().cloned().collect()
    }

    /// Newline separated, no trailing newline.
    pub fn to_text(&self) -> String {
        self.to_vec().join("\n")
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

/// The on-disk link file inside the scratch area.
#[derive(Debug, Clone)]
pub struct LinkStore {
    path: PathBuf,
}

impl LinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Deduplicate `links` and write them out, replacing any previous file.
    pub fn persist<I>(&self, links: I) -> Result<LinkSet>
    where
        I: IntoIterator<Item = String>,
    {
        let set: LinkSet = links.into_iter().collect();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, set.to_text())?;

        info!("Wrote {} links to {}", set.len(), self.path.display());
        Ok(set)
    }

    /// Read a previously persisted link file. Blank lines are ignored.
    pub fn load(&self) -> Result<LinkSet> {
        let content = fs::read_to_string(&self.path)?;
        let set: LinkSet = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!("Loaded {} links from {}", set.len(), self.path.display());
        Ok(set)
    }
}
