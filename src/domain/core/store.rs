use std::collections::HashMap;

use super::{MentorId, Reservation, ReservationKey, StudentId};

/// Lifecycle of one entry: inserted as `Pending` before the remote write,
/// marked `Confirmed` on the ack, removed again if the write fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReservationState {
    Pending,
    Confirmed,
}

#[derive(Clone, Debug)]
struct Entry {
    reservation: Reservation,
    state: ReservationState,
}

/// Undo token for an optimistic insert. The caller must resolve it with
/// `confirm` or `rollback` once the remote write settles.
#[must_use]
#[derive(Debug)]
pub struct InsertToken {
    key: ReservationKey,
}

/// Undo token for an optimistic removal. Carries the removed entry and its
/// position so a rollback restores the original ordering, not an append.
#[must_use]
#[derive(Debug)]
pub struct RemovalToken {
    entry: Entry,
    index: usize,
}

impl RemovalToken {
    pub fn reservation(&self) -> &Reservation {
        &self.entry.reservation
    }
}

/// The locally cached working set of reservations. Always an optimistically
/// mutated copy of remote truth, never the source of truth itself. All
/// mutations are synchronous and infallible; reconciling them with the
/// remote outcome is the booking service's job.
#[derive(Debug, Default)]
pub struct ReservationStore {
    entries: Vec<Entry>,
    // Keyed index over `entries`; lookups by identity tuple stay O(1) while
    // the vec keeps the remote's row order.
    by_key: HashMap<ReservationKey, usize>,
    by_student: HashMap<StudentId, ReservationKey>,
    counts: HashMap<MentorId, usize>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replacement after a remote fetch. Rows arriving with a
    /// duplicate identity tuple, or a second row for the same student, are
    /// dropped, first one wins.
    pub fn reload(&mut self, reservations: Vec<Reservation>) {
        self.entries.clear();
        self.by_key.clear();
        self.by_student.clear();
        self.counts.clear();
        for reservation in reservations {
            if self.is_booked(&reservation.key())
                || self.by_student.contains_key(reservation.applicant().student_id())
            {
                continue;
            }
            self.insert(reservation, ReservationState::Confirmed);
        }
    }

    pub fn list(&self) -> Vec<Reservation> {
        self.entries.iter().map(|e| e.reservation.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_booked(&self, key: &ReservationKey) -> bool {
        self.position(key).is_some()
    }

    pub fn count_for(&self, mentor_id: &MentorId) -> usize {
        self.counts.get(mentor_id).copied().unwrap_or(0)
    }

    /// The applicant's single active reservation, if any.
    pub fn find_by_applicant(&self, student_id: &StudentId) -> Option<&Reservation> {
        let key = self.by_student.get(student_id)?;
        let index = self.position(key)?;
        Some(&self.entries[index].reservation)
    }

    pub fn state_of(&self, key: &ReservationKey) -> Option<ReservationState> {
        self.position(key).map(|i| self.entries[i].state)
    }

    /// Insert before remote confirmation.
    pub fn apply_optimistic(&mut self, reservation: Reservation) -> InsertToken {
        let key = reservation.key();
        self.insert(reservation, ReservationState::Pending);
        InsertToken { key }
    }

    /// The remote write succeeded; the entry is now settled truth.
    pub fn confirm(&mut self, token: InsertToken) {
        if let Some(index) = self.position(&token.key) {
            self.entries[index].state = ReservationState::Confirmed;
        }
    }

    /// The remote write failed; withdraw the pending entry.
    pub fn rollback(&mut self, token: InsertToken) {
        if let Some(index) = self.position(&token.key) {
            self.remove_at(index);
        }
    }

    /// Optimistic removal. `None` for an absent tuple, which is the caller's
    /// "not found" signal rather than an error here.
    pub fn remove(&mut self, key: &ReservationKey) -> Option<RemovalToken> {
        let index = self.position(key)?;
        let entry = self.remove_at(index);
        Some(RemovalToken { entry, index })
    }

    pub fn confirm_removal(&mut self, token: RemovalToken) {
        drop(token);
    }

    /// The remote delete failed; put the entry back where it was.
    pub fn rollback_removal(&mut self, token: RemovalToken) {
        let RemovalToken { entry, index } = token;
        let key = entry.reservation.key();
        let student = entry.reservation.applicant().student_id().clone();
        *self.counts.entry(key.mentor_id.clone()).or_insert(0) += 1;
        self.by_student.insert(student, key);
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.reindex_from(index);
    }

    /// Withdraw any entries still pending. Called when a request was
    /// abandoned mid-flight, so an unsettled insert does not linger as truth.
    pub fn purge_pending(&mut self) {
        while let Some(index) = self
            .entries
            .iter()
            .position(|e| e.state == ReservationState::Pending)
        {
            self.remove_at(index);
        }
    }

    fn insert(&mut self, reservation: Reservation, state: ReservationState) {
        let key = reservation.key();
        *self.counts.entry(key.mentor_id.clone()).or_insert(0) += 1;
        self.by_student
            .insert(reservation.applicant().student_id().clone(), key.clone());
        self.by_key.insert(key, self.entries.len());
        self.entries.push(Entry { reservation, state });
    }

    fn remove_at(&mut self, index: usize) -> Entry {
        let entry = self.entries.remove(index);
        let key = entry.reservation.key();
        self.by_key.remove(&key);
        self.reindex_from(index);
        if let Some(count) = self.counts.get_mut(&key.mentor_id) {
            *count = count.saturating_sub(1);
        }
        let student = entry.reservation.applicant().student_id();
        if self.by_student.get(student) == Some(&key) {
            self.by_student.remove(student);
        }
        entry
    }

    // Entries at or after `index` shifted; refresh their index positions.
    fn reindex_from(&mut self, index: usize) {
        for i in index..self.entries.len() {
            self.by_key.insert(self.entries[i].reservation.key(), i);
        }
    }

    fn position(&self, key: &ReservationKey) -> Option<usize> {
        self.by_key.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::super::{Applicant, Gender, SlotTime};
    use super::*;

    fn reservation(mentor: &str, student: &str, hour: u32) -> Reservation {
        let key = ReservationKey::new(
            mentor,
            NaiveDate::from_ymd_opt(2026, 2, 22).unwrap(),
            SlotTime::new(hour, 30).unwrap(),
        );
        let applicant = Applicant::create(
            student.into(),
            "Lee".to_owned(),
            20,
            Gender::Male,
            None,
        )
        .unwrap();
        let created_at = Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap();
        Reservation::create(key, applicant, created_at)
    }

    #[test]
    fn optimistic_insert_confirm_and_rollback() {
        let mut store = ReservationStore::new();
        let first = reservation("mentor_1", "s1", 9);
        let key = first.key();

        let token = store.apply_optimistic(first);
        assert!(store.is_booked(&key));
        assert_eq!(store.state_of(&key), Some(ReservationState::Pending));
        assert_eq!(store.count_for(&"mentor_1".into()), 1);

        store.confirm(token);
        assert_eq!(store.state_of(&key), Some(ReservationState::Confirmed));

        let second = reservation("mentor_1", "s2", 10);
        let second_key = second.key();
        let token = store.apply_optimistic(second);
        store.rollback(token);
        assert!(!store.is_booked(&second_key));
        assert_eq!(store.count_for(&"mentor_1".into()), 1);
        assert!(store.find_by_applicant(&"s2".into()).is_none());
    }

    #[test]
    fn removal_rollback_restores_original_order() {
        let mut store = ReservationStore::new();
        store.reload(vec![
            reservation("mentor_1", "s1", 9),
            reservation("mentor_1", "s2", 10),
            reservation("mentor_2", "s3", 11),
        ]);
        let middle = reservation("mentor_1", "s2", 10).key();

        let token = store.remove(&middle).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.find_by_applicant(&"s2".into()).is_none());
        // The entry behind the removed one shifted; it must still be found.
        assert!(store.is_booked(&reservation("mentor_2", "s3", 11).key()));

        store.rollback_removal(token);
        assert!(store.is_booked(&reservation("mentor_1", "s1", 9).key()));
        assert!(store.is_booked(&reservation("mentor_2", "s3", 11).key()));
        let order: Vec<_> = store
            .list()
            .iter()
            .map(|r| r.applicant().student_id().clone())
            .collect();
        assert_eq!(order, vec!["s1".into(), "s2".into(), "s3".into()]);
        assert_eq!(store.count_for(&"mentor_1".into()), 2);
        assert_eq!(
            store.state_of(&middle),
            Some(ReservationState::Confirmed)
        );
    }

    #[test]
    fn removing_an_absent_tuple_reports_none_and_changes_nothing() {
        let mut store = ReservationStore::new();
        store.reload(vec![reservation("mentor_1", "s1", 9)]);
        let ghost = reservation("mentor_1", "s9", 20).key();
        assert!(store.remove(&ghost).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reload_drops_duplicate_tuples() {
        let mut store = ReservationStore::new();
        store.reload(vec![
            reservation("mentor_1", "s1", 9),
            reservation("mentor_1", "s2", 9),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store
                .find_by_applicant(&"s1".into())
                .unwrap()
                .applicant()
                .student_id(),
            &StudentId::from("s1")
        );
    }

    #[test]
    fn reload_keeps_one_row_per_student() {
        let mut store = ReservationStore::new();
        store.reload(vec![
            reservation("mentor_1", "s1", 9),
            reservation("mentor_2", "s1", 10),
        ]);
        assert_eq!(store.len(), 1);
        assert!(store.is_booked(&reservation("mentor_1", "s1", 9).key()));
        assert!(!store.is_booked(&reservation("mentor_2", "s1", 10).key()));
        assert_eq!(store.count_for(&"mentor_2".into()), 0);
    }

    #[test]
    fn purge_pending_drops_only_unsettled_entries() {
        let mut store = ReservationStore::new();
        store.reload(vec![reservation("mentor_1", "s1", 9)]);
        let _token = store.apply_optimistic(reservation("mentor_1", "s2", 10));

        store.purge_pending();
        assert_eq!(store.len(), 1);
        assert!(!store.is_booked(&reservation("mentor_1", "s2", 10).key()));
        assert!(store.find_by_applicant(&"s2".into()).is_none());
        assert_eq!(store.count_for(&"mentor_1".into()), 1);
    }

    #[test]
    fn counts_per_mentor() {
        let mut store = ReservationStore::new();
        store.reload(vec![
            reservation("mentor_1", "s1", 9),
            reservation("mentor_1", "s2", 10),
            reservation("mentor_2", "s3", 11),
        ]);
        assert_eq!(store.count_for(&"mentor_1".into()), 2);
        assert_eq!(store.count_for(&"mentor_2".into()), 1);
        assert_eq!(store.count_for(&"ghost".into()), 0);
    }
}
