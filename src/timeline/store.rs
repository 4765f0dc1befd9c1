use crate::domain::{BoostIndex, Event};
use crate::numerology::{annotate, NumerologyResult, NumerologyRule};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::anchor::{closest, Placement};

/// Which end of the timeline a batch was fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeMode {
    /// Events newer than the current head.
    ForwardFresh,
    /// Events older than the current tail.
    Backfill,
}

/// A materialized event with its numerology decoration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub event: Event,
    pub numerology: NumerologyResult,
}

impl TimelineEntry {
    pub fn index(&self) -> BoostIndex {
        self.event.index
    }
}

/// Positioned-insertion instruction for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insertion {
    pub entry: TimelineEntry,
    pub placement: Placement,
    /// Position in the materialized timeline right after the insert.
    pub slot: usize,
}

/// Result of merging one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub mode: MergeMode,
    /// Events in the batch, including duplicates that were skipped.
    pub received: usize,
    pub insertions: Vec<Insertion>,
    /// Some insertion landed between two existing entries.
    pub mid_list_insertion: bool,
}

impl MergeOutcome {
    fn empty(mode: MergeMode) -> Self {
        Self {
            mode,
            received: 0,
            insertions: Vec::new(),
            mid_list_insertion: false,
        }
    }

    pub fn new_events(&self) -> bool {
        !self.insertions.is_empty()
    }

    pub fn added(&self) -> usize {
        self.insertions.len()
    }
}

/// Whether older entries may still exist below `lowest_known`.
///
/// With nothing known yet the answer is unknown, so more is assumed.
pub fn has_more(lowest_known: Option<BoostIndex>) -> bool {
    match lowest_known {
        Some(index) => index > BoostIndex::MIN,
        None => true,
    }
}

/// Ordered, duplicate-free timeline of boosts.
///
/// Entries are kept in descending index order: position 0 is the head (newest).
/// The only mutation is [`TimelineStore::merge_batch`].
#[derive(Debug, Clone)]
pub struct TimelineStore {
    entries: Vec<TimelineEntry>,
    known: BTreeSet<BoostIndex>,
    rules: Arc<[NumerologyRule]>,
}

impl TimelineStore {
    pub fn new(rules: Arc<[NumerologyRule]>) -> Self {
        Self {
            entries: Vec::new(),
            known: BTreeSet::new(),
            rules,
        }
    }

    /// Merge a fetched batch, skipping indices already in the timeline.
    ///
    /// Each new event is annotated and placed next to its nearest known
    /// neighbour, so the timeline stays sorted without a full re-sort.
    pub fn merge_batch<I>(&mut self, events: I, mode: MergeMode) -> MergeOutcome
    where
        I: IntoIterator<Item = Event>,
    {
        self.known = self.entries.iter().map(TimelineEntry::index).collect();
        let mut outcome = MergeOutcome::empty(mode);

        for event in events {
            outcome.received += 1;
            let index = event.index;
            if self.known.contains(&index) {
                continue;
            }

            let numerology = annotate(event.amount_total_sats, &self.rules);
            let entry = TimelineEntry { event, numerology };

            let placement = Placement::relative_to(index, closest(&self.known, index));
            let slot = self.slot_for(index, placement);
            if slot != 0 {
                outcome.mid_list_insertion = true;
            }

            self.entries.insert(slot, entry.clone());
            self.known.insert(index);
            outcome.insertions.push(Insertion {
                entry,
                placement,
                slot,
            });
        }

        debug!(
            "Merged {:?} batch: received={}, added={}, mid_list={}, len={}",
            mode,
            outcome.received,
            outcome.added(),
            outcome.mid_list_insertion,
            self.entries.len()
        );

        outcome
    }

    fn position_of(&self, index: BoostIndex) -> Option<usize> {
        self.entries
            .binary_search_by(|e| index.cmp(&e.index()))
            .ok()
    }

    fn slot_for(&self, index: BoostIndex, placement: Placement) -> usize {
        let anchored = match placement {
            Placement::Head => Some(0),
            Placement::Before(anchor) => self.position_of(anchor),
            Placement::After(anchor) => self.position_of(anchor).map(|pos| pos + 1),
        };
        // The known set mirrors the entries, so the anchor is always found.
        anchored.unwrap_or_else(|| self.entries.partition_point(|e| e.index() > index))
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices in materialized order, head first.
    pub fn indices(&self) -> Vec<BoostIndex> {
        self.entries.iter().map(TimelineEntry::index).collect()
    }

    /// Highest (newest) index.
    pub fn head_index(&self) -> Option<BoostIndex> {
        self.entries.first().map(TimelineEntry::index)
    }

    /// Lowest (oldest) index.
    pub fn tail_index(&self) -> Option<BoostIndex> {
        self.entries.last().map(TimelineEntry::index)
    }

    pub fn get(&self, index: BoostIndex) -> Option<&TimelineEntry> {
        self.position_of(index).map(|pos| &self.entries[pos])
    }

    pub fn contains(&self, index: BoostIndex) -> bool {
        self.position_of(index).is_some()
    }

    /// Whether a "load older" action should be offered.
    pub fn has_more(&self) -> bool {
        has_more(self.tail_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TimelineStore {
        TimelineStore::new(Arc::from(vec![NumerologyRule::new("69", "🌴", "nice")]))
    }

    fn events(indices: &[u64]) -> Vec<Event> {
        indices.iter().map(|&i| Event::new(i, 1000)).collect()
    }

    fn order(store: &TimelineStore) -> Vec<u64> {
        store.indices().iter().map(BoostIndex::as_u64).collect()
    }

    #[test]
    fn test_first_event_goes_to_head() {
        let mut store = store();
        let outcome = store.merge_batch(events(&[5]), MergeMode::Backfill);

        assert_eq!(order(&store), vec![5]);
        assert_eq!(outcome.insertions[0].placement, Placement::Head);
        assert_eq!(outcome.insertions[0].slot, 0);
        assert!(outcome.new_events());
        assert!(!outcome.mid_list_insertion);
        assert!(store.has_more());
    }

    #[test]
    fn test_tie_inserts_after_larger_anchor() {
        let mut store = store();
        store.merge_batch(events(&[100, 98, 95]), MergeMode::Backfill);
        assert_eq!(order(&store), vec![100, 98, 95]);

        let outcome = store.merge_batch(events(&[99]), MergeMode::ForwardFresh);
        assert_eq!(order(&store), vec![100, 99, 98, 95]);
        assert_eq!(
            outcome.insertions[0].placement,
            Placement::After(BoostIndex::new(100))
        );
        assert_eq!(outcome.insertions[0].slot, 1);
        assert!(outcome.mid_list_insertion);
    }

    #[test]
    fn test_newer_event_goes_before_head() {
        let mut store = store();
        store.merge_batch(events(&[10, 9]), MergeMode::Backfill);
        let outcome = store.merge_batch(events(&[11]), MergeMode::ForwardFresh);

        assert_eq!(order(&store), vec![11, 10, 9]);
        assert_eq!(
            outcome.insertions[0].placement,
            Placement::Before(BoostIndex::new(10))
        );
        assert!(!outcome.mid_list_insertion);
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut store = store();
        store.merge_batch(events(&[3, 2, 1]), MergeMode::Backfill);
        let outcome = store.merge_batch(events(&[3, 2, 1]), MergeMode::ForwardFresh);

        assert_eq!(outcome.received, 3);
        assert_eq!(outcome.added(), 0);
        assert!(!outcome.new_events());
        assert_eq!(order(&store), vec![3, 2, 1]);
    }

    #[test]
    fn test_duplicate_within_batch() {
        let mut store = store();
        let outcome = store.merge_batch(events(&[4, 4, 4]), MergeMode::ForwardFresh);
        assert_eq!(outcome.added(), 1);
        assert_eq!(order(&store), vec![4]);
    }

    #[test]
    fn test_existing_content_not_updated() {
        let mut store = store();
        store.merge_batch(vec![Event::new(1, 69)], MergeMode::Backfill);
        store.merge_batch(vec![Event::new(1, 5)], MergeMode::ForwardFresh);
        assert_eq!(store.entries()[0].event.amount_total_sats, 69);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = store();
        let outcome = store.merge_batch(Vec::new(), MergeMode::ForwardFresh);
        assert_eq!(outcome.received, 0);
        assert!(!outcome.new_events());
        assert!(store.is_empty());
    }

    #[test]
    fn test_older_events_append_to_tail() {
        let mut store = store();
        store.merge_batch(events(&[50, 49]), MergeMode::ForwardFresh);
        let outcome = store.merge_batch(events(&[48, 47, 46]), MergeMode::Backfill);

        assert_eq!(order(&store), vec![50, 49, 48, 47, 46]);
        assert!(outcome.mid_list_insertion);
        assert_eq!(store.tail_index(), Some(BoostIndex::new(46)));
        assert_eq!(store.head_index(), Some(BoostIndex::new(50)));
    }

    #[test]
    fn test_get_by_index() {
        let mut store = store();
        store.merge_batch(events(&[9, 3, 7, 1]), MergeMode::Backfill);

        let found = store.get(BoostIndex::new(7)).map(TimelineEntry::index);
        assert_eq!(found, Some(BoostIndex::new(7)));
        let tail = store.get(BoostIndex::new(1)).map(TimelineEntry::index);
        assert_eq!(tail, Some(BoostIndex::new(1)));
        assert!(store.get(BoostIndex::new(5)).is_none());
        assert!(store.get(BoostIndex::new(10)).is_none());
    }

    #[test]
    fn test_unsorted_batch_ends_sorted() {
        let mut store = store();
        store.merge_batch(events(&[7, 20, 1, 13, 2]), MergeMode::Backfill);
        assert_eq!(order(&store), vec![20, 13, 7, 2, 1]);
    }

    #[test]
    fn test_entries_are_annotated() {
        let mut store = store();
        store.merge_batch(vec![Event::new(1, 6900)], MergeMode::ForwardFresh);
        let entry = &store.entries()[0];
        assert_eq!(entry.numerology.decorated_text, "🌴");
        assert_eq!(entry.numerology.matched_labels, vec!["nice".to_string()]);
    }

    #[test]
    fn test_has_more() {
        assert!(has_more(None));
        assert!(has_more(Some(BoostIndex::new(5))));
        assert!(!has_more(Some(BoostIndex::new(1))));
    }
}
