//! List of active formatting elements.

use crate::tag_processor::BookmarkId;

/// Attributes as compared by the Noah's Ark clause: lowercased names with
/// decoded values, sorted by name.
pub(crate) type AttributeSet = Vec<(Box<str>, Box<str>)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormattingEntry {
    /// Scope boundary pushed by `applet`, `marquee`, `object`, cells and
    /// captions.
    Marker,
    Element {
        id: BookmarkId,
        tag: Box<str>,
        attributes: AttributeSet,
    },
}

impl FormattingEntry {
    pub(crate) fn id(&self) -> Option<BookmarkId> {
        match self {
            FormattingEntry::Marker => None,
            FormattingEntry::Element { id, .. } => Some(*id),
        }
    }
}

/// At most this many equal entries may follow the last marker.
const NOAHS_ARK_LIMIT: usize = 3;

#[derive(Clone, Debug, Default)]
pub(crate) struct ActiveFormattingList {
    items: Vec<FormattingEntry>,
}

impl ActiveFormattingList {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&FormattingEntry> {
        self.items.get(index)
    }

    pub(crate) fn push_marker(&mut self) {
        self.items.push(FormattingEntry::Marker);
    }

    /// Pushes a formatting element. When three entries with the same tag
    /// and attributes already follow the last marker, the earliest of them
    /// is dropped first.
    pub(crate) fn push_element(&mut self, id: BookmarkId, tag: &str, attributes: AttributeSet) {
        let after_marker = self.last_marker_index().map_or(0, |index| index + 1);
        let equal: Vec<usize> = self.items[after_marker..]
            .iter()
            .enumerate()
            .filter(|(_, entry)| match entry {
                FormattingEntry::Element {
                    tag: other_tag,
                    attributes: other_attributes,
                    ..
                } => **other_tag == *tag && *other_attributes == attributes,
                FormattingEntry::Marker => false,
            })
            .map(|(offset, _)| after_marker + offset)
            .collect();
        if equal.len() >= NOAHS_ARK_LIMIT {
            self.items.remove(equal[0]);
        }
        self.items.push(FormattingEntry::Element {
            id,
            tag: tag.into(),
            attributes,
        });
    }

    /// Points the entry at `index` to a freshly inserted element.
    pub(crate) fn replace_id(&mut self, index: usize, new_id: BookmarkId) {
        if let Some(FormattingEntry::Element { id, .. }) = self.items.get_mut(index) {
            *id = new_id;
        }
    }

    pub(crate) fn remove(&mut self, id: BookmarkId) -> bool {
        match self.items.iter().rposition(|entry| entry.id() == Some(id)) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, id: BookmarkId) -> bool {
        self.items.iter().any(|entry| entry.id() == Some(id))
    }

    /// Last element with this tag between the end of the list and the last
    /// marker.
    pub(crate) fn find_after_last_marker(&self, tag: &str) -> Option<BookmarkId> {
        for entry in self.items.iter().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { id, tag: entry_tag, .. } if **entry_tag == *tag => {
                    return Some(*id);
                }
                FormattingEntry::Element { .. } => {}
            }
        }
        None
    }

    /// Pops entries up to and including the last marker.
    pub(crate) fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.items.pop() {
            if entry == FormattingEntry::Marker {
                break;
            }
        }
    }

    fn last_marker_index(&self) -> Option<usize> {
        self.items
            .iter()
            .rposition(|entry| *entry == FormattingEntry::Marker)
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveFormattingList, AttributeSet, FormattingEntry};
    use crate::tag_processor::BookmarkStore;

    fn attrs(pairs: &[(&str, &str)]) -> AttributeSet {
        pairs
            .iter()
            .map(|(name, value)| (Box::from(*name), Box::from(*value)))
            .collect()
    }

    #[test]
    fn fourth_identical_entry_evicts_the_earliest() {
        let mut ids = BookmarkStore::default();
        let mut list = ActiveFormattingList::default();
        let first = ids.allocate_id();
        list.push_element(first, "b", attrs(&[("class", "x")]));
        for _ in 0..2 {
            list.push_element(ids.allocate_id(), "b", attrs(&[("class", "x")]));
        }
        assert_eq!(list.len(), 3);

        list.push_element(ids.allocate_id(), "b", attrs(&[("class", "x")]));
        assert_eq!(list.len(), 3);
        assert!(!list.contains(first));
    }

    #[test]
    fn attributes_distinguish_entries() {
        let mut ids = BookmarkStore::default();
        let mut list = ActiveFormattingList::default();
        for _ in 0..3 {
            list.push_element(ids.allocate_id(), "b", attrs(&[]));
        }
        list.push_element(ids.allocate_id(), "b", attrs(&[("id", "1")]));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn entries_before_a_marker_are_not_counted() {
        let mut ids = BookmarkStore::default();
        let mut list = ActiveFormattingList::default();
        for _ in 0..3 {
            list.push_element(ids.allocate_id(), "i", attrs(&[]));
        }
        list.push_marker();
        list.push_element(ids.allocate_id(), "i", attrs(&[]));
        assert_eq!(list.len(), 5);
        assert!(list.find_after_last_marker("i").is_some());

        list.clear_to_last_marker();
        assert_eq!(list.len(), 3);
        assert!(list.get(2).and_then(FormattingEntry::id).is_some());
    }

    #[test]
    fn lookup_stops_at_marker() {
        let mut ids = BookmarkStore::default();
        let mut list = ActiveFormattingList::default();
        list.push_element(ids.allocate_id(), "a", attrs(&[]));
        list.push_marker();
        assert_eq!(list.find_after_last_marker("a"), None);
    }
}
