//! Upgrade path for stored documents.
//!
//! Older files may lack `created_at` (and `read_at`, and even `capacity`).
//! Absent fields are filled in here, on the way in, and nowhere else: the
//! save path always writes every field.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{Link, ReadingList, Timestamp, DEFAULT_CAPACITY};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct StoredReadingList {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub links: Vec<StoredLink>,
}

#[derive(Debug, Deserialize)]
pub struct StoredLink {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub read_at: Option<Timestamp>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Stand-in creation time for the entry at `index`: the Unix epoch plus
/// `index` seconds, so legacy entries keep their file order.
pub fn synthetic_created_at(index: usize) -> Result<Timestamp> {
    i64::try_from(index)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(Timestamp::from)
        .ok_or_else(|| Error::Invalid(format!("no synthetic timestamp for entry {}", index)))
}

impl StoredLink {
    fn upgrade(self, index: usize) -> Result<Link> {
        let created_at = match self.created_at {
            Some(created_at) => created_at,
            None => {
                debug!("Backfilling created_at for link {} at position {}", self.id, index);
                synthetic_created_at(index)?
            }
        };
        Ok(Link {
            id: self.id,
            url: self.url,
            title: self.title,
            created_at,
            read_at: self.read_at,
        })
    }
}

impl TryFrom<StoredReadingList> for ReadingList {
    type Error = Error;

    fn try_from(stored: StoredReadingList) -> Result<Self> {
        let links = stored
            .links
            .into_iter()
            .enumerate()
            .map(|(index, link)| link.upgrade(index))
            .collect::<Result<Vec<_>>>()?;
        ReadingList::with_links(stored.capacity, links)
    }
}
