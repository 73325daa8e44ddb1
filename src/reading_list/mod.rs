pub mod schema;

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const DEFAULT_CAPACITY: usize = 10;

/// An ISO-8601 instant as it appears in the stored document.
///
/// The raw text is kept verbatim so hand-edited or legacy values survive a
/// load/save cycle untouched; it is only interpreted when ordering links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the stored text. Offsetless values are taken as UTC.
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt.with_timezone(&Utc));
        }

        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&self.0, format).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Ordering key; anything unparsable sorts before every real instant.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.parse().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.to_rfc3339())
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A saved link. Values are never edited in place; marking one read swaps in
/// a replacement built by [`Link::marked_read`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: String,
    pub url: String,
    pub title: String,
    pub created_at: Timestamp,
    pub read_at: Option<Timestamp>,
}

impl Link {
    pub fn create(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            title: title.into(),
            created_at: Timestamp::now(),
            read_at: None,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Copy of this link stamped as read at `at`. An existing stamp wins.
    pub fn marked_read(self, at: Timestamp) -> Self {
        if self.is_read() {
            return self;
        }
        Self {
            read_at: Some(at),
            ..self
        }
    }
}

/// Which slice of the list a display number is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Unread,
    Read,
    All,
}

impl View {
    pub fn from_include_read(include_read: bool) -> Self {
        if include_read {
            View::All
        } else {
            View::Unread
        }
    }

    fn admits(self, link: &Link) -> bool {
        match self {
            View::Unread => !link.is_read(),
            View::Read => link.is_read(),
            View::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "schema::StoredReadingList")]
pub struct ReadingList {
    capacity: usize,
    links: Vec<Link>,
}

impl Default for ReadingList {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ReadingList {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            links: Vec::new(),
        }
    }

    /// Builds a list from existing links, rejecting duplicate ids.
    pub fn with_links(capacity: usize, links: impl IntoIterator<Item = Link>) -> Result<Self> {
        let mut list = Self::new(capacity);
        for link in links {
            if list.get(&link.id).is_some() {
                return Err(Error::Invalid(format!("duplicate link id '{}'", link.id)));
            }
            list.links.push(link);
        }
        Ok(list)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the ceiling. Links beyond a lowered capacity are kept.
    pub fn set_capacity(&mut self, capacity: usize) {
        info!("Capacity changed from {} to {}", self.capacity, capacity);
        self.capacity = capacity;
    }

    /// Links in storage order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.links.len() >= self.capacity
    }

    pub fn get(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.id == id)
    }

    pub fn add_link(&mut self, url: impl Into<String>, title: impl Into<String>) -> Result<Link> {
        if self.is_full() {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let link = Link::create(url, title);
        info!("Added link {} ({})", link.id, link.url);
        self.links.push(link.clone());
        Ok(link)
    }

    /// All links, oldest first. Stable for equal timestamps.
    pub fn ordered_links(&self) -> Vec<&Link> {
        let mut ordered: Vec<&Link> = self.links.iter().collect();
        ordered.sort_by_key(|link| link.created_at.sort_key());
        ordered
    }

    pub fn unread_links(&self) -> Vec<&Link> {
        self.links_in(View::Unread)
    }

    pub fn read_links(&self) -> Vec<&Link> {
        self.links_in(View::Read)
    }

    pub fn links_in(&self, view: View) -> Vec<&Link> {
        self.ordered_links()
            .into_iter()
            .filter(|link| view.admits(link))
            .collect()
    }

    /// The view paired with 1-based display numbers, computed fresh each call.
    pub fn numbered(&self, view: View) -> Vec<(usize, &Link)> {
        self.links_in(view)
            .into_iter()
            .enumerate()
            .map(|(index, link)| (index + 1, link))
            .collect()
    }

    pub fn find_by_number(&self, number: i64, view: View) -> Option<&Link> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.links_in(view).get(index).copied()
    }

    pub fn number_of(&self, id: &str, view: View) -> Option<usize> {
        self.links_in(view)
            .iter()
            .position(|link| link.id == id)
            .map(|index| index + 1)
    }

    pub fn remove_link(&mut self, id: &str) -> bool {
        let before = self.links.len();
        self.links.retain(|link| link.id != id);
        let removed = self.links.len() < before;
        if removed {
            info!("Removed link {}", id);
        }
        removed
    }

    pub fn remove_by_number(&mut self, number: i64, include_read: bool) -> bool {
        match self.id_for_number(number, include_read) {
            Some(id) => self.remove_link(&id),
            None => false,
        }
    }

    /// Replaces the link with a read copy. Returns false when `id` is unknown.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(index) = self.links.iter().position(|link| link.id == id) else {
            return false;
        };
        let link = self.links.remove(index);
        if link.is_read() {
            debug!("Link {} already read at {:?}", id, link.read_at);
        } else {
            info!("Marked link {} as read", id);
        }
        self.links.insert(index, link.marked_read(Timestamp::now()));
        true
    }

    pub fn mark_read_by_number(&mut self, number: i64, include_read: bool) -> bool {
        match self.id_for_number(number, include_read) {
            Some(id) => self.mark_read(&id),
            None => false,
        }
    }

    pub fn clear_links(&mut self) {
        info!("Clearing {} links", self.links.len());
        self.links.clear();
    }

    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuilds a list, backfilling fields that older documents lack.
    pub fn from_document(document: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(document)?)
    }

    fn id_for_number(&self, number: i64, include_read: bool) -> Option<String> {
        let found = self
            .find_by_number(number, View::from_include_read(include_read))
            .map(|link| link.id.clone());
        if found.is_none() {
            debug!("Number {} does not resolve (include_read={})", number, include_read);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn link(id: &str, created_at: &str, read_at: Option<&str>) -> Link {
        Link {
            id: id.to_string(),
            url: format!("https://example.com/{}", id),
            title: format!("Title {}", id),
            created_at: Timestamp::from(created_at),
            read_at: read_at.map(Timestamp::from),
        }
    }

    fn ids(links: &[&Link]) -> Vec<String> {
        links.iter().map(|l| l.id.clone()).collect()
    }

    fn mixed_list() -> ReadingList {
        ReadingList::with_links(
            10,
            vec![
                link("c", "2024-01-03T00:00:00+00:00", None),
                link("a", "2024-01-01T00:00:00+00:00", Some("2024-01-10T00:00:00+00:00")),
                link("b", "2024-01-02T00:00:00+00:00", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_add_link_increases_size_and_returns_link() {
        let mut list = ReadingList::new(2);
        let added = list.add_link("https://example.com", "Example").unwrap();

        assert_eq!(added.url, "https://example.com");
        assert_eq!(added.title, "Example");
        assert!(!added.id.is_empty());
        assert!(added.created_at.parse().is_some());
        assert!(added.read_at.is_none());
        assert_eq!(list.len(), 1);
        assert_eq!(list.links()[0], added);
    }

    #[test]
    fn test_add_link_fails_at_capacity() {
        let mut list = ReadingList::new(1);
        list.add_link("https://first.com", "First").unwrap();

        let err = list.add_link("https://second.com", "Second").unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { capacity: 1 }));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_lowered_capacity_keeps_links_but_blocks_adds() {
        let mut list = ReadingList::new(3);
        list.add_link("https://one.com", "One").unwrap();
        list.add_link("https://two.com", "Two").unwrap();

        list.set_capacity(1);
        assert_eq!(list.len(), 2);
        assert!(list.add_link("https://three.com", "Three").is_err());
    }

    #[test]
    fn test_add_link_accepts_empty_strings() {
        let mut list = ReadingList::default();
        let added = list.add_link("", "").unwrap();
        assert_eq!(added.url, "");
        assert_eq!(list.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_with_links_rejects_duplicate_ids() {
        let result = ReadingList::with_links(
            5,
            vec![
                link("dup", "2024-01-01T00:00:00+00:00", None),
                link("dup", "2024-01-02T00:00:00+00:00", None),
            ],
        );
        assert!(matches!(result, Err(Error::Invalid(_))));
    }

    #[test]
    fn test_ordered_links_sorts_by_creation() {
        let list = mixed_list();
        assert_eq!(ids(&list.ordered_links()), vec!["a", "b", "c"]);
        assert_eq!(ids(&list.unread_links()), vec!["b", "c"]);
        assert_eq!(ids(&list.read_links()), vec!["a"]);
    }

    #[test]
    fn test_unparsable_timestamps_sort_first_and_stay_stable() {
        let list = ReadingList::with_links(
            10,
            vec![
                link("late", "2024-05-01T00:00:00+00:00", None),
                link("junk1", "not a date", None),
                link("junk2", "", None),
            ],
        )
        .unwrap();
        assert_eq!(ids(&list.ordered_links()), vec!["junk1", "junk2", "late"]);
    }

    #[test]
    fn test_mixed_offsets_compare_as_instants() {
        let list = ReadingList::with_links(
            10,
            vec![
                link("utc", "2024-01-01T01:30:00+00:00", None),
                link("plus2", "2024-01-01T03:00:00+02:00", None),
                link("naive", "2024-01-01T00:30:00", None),
            ],
        )
        .unwrap();
        assert_eq!(ids(&list.ordered_links()), vec!["naive", "plus2", "utc"]);
    }

    #[test]
    fn test_remove_link_by_id() {
        let mut list = mixed_list();
        assert!(list.remove_link("b"));
        assert!(!list.remove_link("b"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_by_number_uses_unread_view() {
        let mut list = mixed_list();
        assert!(list.remove_by_number(1, false));
        assert_eq!(ids(&list.ordered_links()), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_by_number_with_read_included() {
        let mut list = mixed_list();
        assert!(list.remove_by_number(1, true));
        assert_eq!(ids(&list.ordered_links()), vec!["b", "c"]);
    }

    #[test]
    fn test_out_of_range_numbers_do_not_mutate() {
        let mut list = mixed_list();
        let before = list.clone();

        for number in [0, -1, 3, 99] {
            assert!(!list.remove_by_number(number, false));
            assert!(!list.mark_read_by_number(number, false));
            assert!(list.find_by_number(number, View::Unread).is_none());
        }
        assert!(!list.remove_by_number(4, true));
        assert_eq!(list, before);
    }

    #[test]
    fn test_mark_read_by_number() {
        let mut list = ReadingList::with_links(
            10,
            vec![
                link("a", "2024-01-01T00:00:00+00:00", None),
                link("b", "2024-01-02T00:00:00+00:00", None),
            ],
        )
        .unwrap();

        assert!(list.mark_read_by_number(1, false));

        let a = list.get("a").unwrap();
        assert!(a.is_read());
        assert!(a.read_at.as_ref().and_then(Timestamp::parse).is_some());
        assert_eq!(a.created_at.as_str(), "2024-01-01T00:00:00+00:00");
        assert!(!list.get("b").unwrap().is_read());
        assert_eq!(ids(&list.unread_links()), vec!["b"]);
    }

    #[test]
    fn test_mark_read_keeps_storage_position() {
        let mut list = mixed_list();
        assert!(list.mark_read("b"));
        let stored: Vec<&str> = list.links().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(stored, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_mark_read_never_restamps() {
        let mut list = mixed_list();
        assert!(list.mark_read_by_number(1, true));
        assert_eq!(
            list.get("a").unwrap().read_at,
            Some(Timestamp::from("2024-01-10T00:00:00+00:00"))
        );
    }

    #[test]
    fn test_numbering_follows_live_view() {
        let mut list = mixed_list();
        assert_eq!(list.number_of("c", View::Unread), Some(2));
        assert_eq!(list.number_of("c", View::All), Some(3));
        assert_eq!(list.number_of("a", View::Unread), None);

        list.remove_link("b");
        assert_eq!(list.number_of("c", View::Unread), Some(1));

        let numbered: Vec<(usize, String)> = list
            .numbered(View::All)
            .into_iter()
            .map(|(n, l)| (n, l.id.clone()))
            .collect();
        assert_eq!(numbered, vec![(1, "a".to_string()), (2, "c".to_string())]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut list = mixed_list();
        list.clear_links();
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 10);
    }

    #[test]
    fn test_document_round_trip() {
        let mut original = ReadingList::new(3);
        let added = original.add_link("https://example.com", "Example").unwrap();
        original.add_link("https://example.org", "Other").unwrap();
        original.mark_read(&added.id);

        let document = original.to_document().unwrap();
        assert_eq!(document["capacity"], json!(3));
        assert_eq!(document["links"][1]["read_at"], json!(null));

        let restored = ReadingList::from_document(document).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_document_shape_is_flat() {
        let list = ReadingList::with_links(
            4,
            vec![link("x", "2024-01-01T00:00:00+00:00", None)],
        )
        .unwrap();
        assert_eq!(
            list.to_document().unwrap(),
            json!({
                "capacity": 4,
                "links": [{
                    "id": "x",
                    "url": "https://example.com/x",
                    "title": "Title x",
                    "created_at": "2024-01-01T00:00:00+00:00",
                    "read_at": null,
                }]
            })
        );
    }

    proptest! {
        #[test]
        fn prop_added_links_keep_fields_and_unique_ids(
            entries in proptest::collection::vec((".*", ".*"), 1..20)
        ) {
            let mut list = ReadingList::new(entries.len());
            for (url, title) in &entries {
                let added = list.add_link(url.clone(), title.clone()).unwrap();
                prop_assert_eq!(&added.url, url);
                prop_assert_eq!(&added.title, title);
                prop_assert!(!added.id.is_empty());
            }
            prop_assert!(list.is_full());

            let mut seen: Vec<&str> = list.links().iter().map(|l| l.id.as_str()).collect();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), entries.len());

            let restored = ReadingList::from_document(list.to_document().unwrap()).unwrap();
            prop_assert_eq!(restored, list);
        }

        #[test]
        fn prop_out_of_range_never_mutates(number in prop_oneof![i64::MIN..1i64, 4i64..i64::MAX]) {
            let mut list = mixed_list();
            let before = list.clone();
            prop_assert!(!list.remove_by_number(number, true));
            prop_assert!(!list.mark_read_by_number(number, true));
            prop_assert_eq!(list, before);
        }
    }
}
