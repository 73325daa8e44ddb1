use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::reading_list::{ReadingList, DEFAULT_CAPACITY};

pub const DEFAULT_FILE_PATH: &str = "~/.bejw/links.json";

/// Resolves a leading `~` against the home directory. Relative paths are
/// anchored at the current directory.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let path = if raw == "~" {
        home_dir()?
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))
}

/// The JSON file backing one reading list.
#[derive(Debug, Clone)]
pub struct ListStore {
    path: PathBuf,
}

impl ListStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for a user-supplied path such as `~/.bejw/links.json`.
    pub fn open(raw_path: &str) -> Result<Self> {
        Ok(Self::new(expand_path(raw_path)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<ReadingList> {
        self.load_or(DEFAULT_CAPACITY)
    }

    /// Reads the list, or an empty one with `default_capacity` when the
    /// file does not exist yet.
    pub fn load_or(&self, default_capacity: usize) -> Result<ReadingList> {
        if !self.path.exists() {
            debug!("No reading list at {}, starting empty", self.path.display());
            return Ok(ReadingList::new(default_capacity));
        }

        let content = fs::read_to_string(&self.path)?;
        let document: serde_json::Value = serde_json::from_str(&content)?;
        let list = ReadingList::from_document(document)?;
        debug!(
            "Loaded {} links (capacity {}) from {}",
            list.len(),
            list.capacity(),
            self.path.display()
        );
        Ok(list)
    }

    /// Replaces the whole file. Writes a sibling temp file first and renames
    /// it over the target.
    pub fn save(&self, list: &ReadingList) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created directory: {}", parent.display());
            }
        }

        let json_content = serde_json::to_string_pretty(list)?;

        let temp_file = self.path.with_extension("json.tmp");
        fs::write(&temp_file, json_content)?;
        fs::rename(&temp_file, &self.path)?;

        debug!("Saved {} links to {}", list.len(), self.path.display());
        Ok(())
    }
}
