use crate::diary_entry::{DiaryEntry, EntryDraft};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// Identifier handed out when no numeric id exists yet.
const BASE_ID: u64 = 1;

/// An immutable snapshot of the diary. Mutations return a new snapshot, so a
/// changed list is detectable by identity alone.
#[derive(Debug, Clone, Default)]
pub struct DiaryState {
    entries: Rc<Vec<DiaryEntry>>,
}

impl DiaryState {
    pub fn new(entries: Vec<DiaryEntry>) -> Self {
        DiaryState {
            entries: Rc::new(entries),
        }
    }

    pub fn get_entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_by_date(&self, date: &str) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// Replaces the fields of the first entry dated `draft.date`, keeping its
    /// id, or appends the draft under a fresh id.
    pub fn upsert(&self, draft: EntryDraft) -> DiaryState {
        let mut entries = self.entries.as_ref().clone();
        match entries.iter().position(|e| e.date == draft.date) {
            Some(index) => {
                let id = entries[index].id.clone();
                tracing::info!(%id, date = %draft.date, "updating diary entry");
                entries[index] = DiaryEntry::from_draft(id, draft);
            }
            None => {
                let id = self.next_id();
                tracing::info!(%id, date = %draft.date, "adding diary entry");
                entries.push(DiaryEntry::from_draft(id, draft));
            }
        }
        DiaryState::new(entries)
    }

    /// Drops every entry dated `date`. Returns `self` unchanged (same
    /// identity) when nothing matches.
    pub fn delete_by_date(&self, date: &str) -> DiaryState {
        if self.find_by_date(date).is_none() {
            tracing::debug!(date, "nothing to delete");
            return self.clone();
        }
        let entries: Vec<DiaryEntry> = self
            .entries
            .iter()
            .filter(|e| e.date != date)
            .cloned()
            .collect();
        tracing::info!(date, removed = self.len() - entries.len(), "deleted diary entries");
        DiaryState::new(entries)
    }

    /// One greater than the largest numeric id present. If that overflows,
    /// the smallest unused id from `BASE_ID` up.
    pub fn next_id(&self) -> String {
        let ids: BTreeSet<u64> = self
            .entries
            .iter()
            .filter_map(|e| e.id.parse::<u64>().ok())
            .collect();
        let next = match ids.last() {
            None => BASE_ID,
            Some(max) => max
                .checked_add(1)
                .or_else(|| (BASE_ID..).find(|id| !ids.contains(id)))
                .unwrap_or(BASE_ID),
        };
        next.to_string()
    }

    /// Activity tags per date. A later entry for the same date wins.
    pub fn marked_dates(&self) -> HashMap<String, Vec<String>> {
        self.entries
            .iter()
            .filter(|e| !e.date.is_empty())
            .fold(HashMap::new(), |mut acc, entry| {
                acc.insert(entry.date.clone(), entry.activities.clone());
                acc
            })
    }

    pub fn same_snapshot(&self, other: &DiaryState) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

/// Caches a value derived from a snapshot until the snapshot is replaced.
pub struct SnapshotMemo<T> {
    source: Option<DiaryState>,
    value: Option<T>,
    compute: fn(&DiaryState) -> T,
}

impl<T> SnapshotMemo<T> {
    pub fn new(compute: fn(&DiaryState) -> T) -> Self {
        SnapshotMemo {
            source: None,
            value: None,
            compute,
        }
    }

    pub fn get(&mut self, state: &DiaryState) -> &T {
        let stale = match &self.source {
            Some(source) => !source.same_snapshot(state),
            None => true,
        };
        if stale {
            self.source = Some(state.clone());
            self.value = None;
        }
        let compute = self.compute;
        self.value.get_or_insert_with(|| compute(state))
    }
}
