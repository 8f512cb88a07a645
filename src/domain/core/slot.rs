use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use once_cell::sync;

use super::{Mentor, MentorId, ReservationKey, SlotTime};

static NO_TIMES: sync::Lazy<BTreeSet<SlotTime>> = sync::Lazy::new(BTreeSet::new);

/// Read-side lookup over every mentor's published slots. Rebuilt wholesale
/// whenever mentor data is reloaded; mentor data is small and changes rarely
/// compared to reservations.
#[derive(Clone, Debug, Default)]
pub struct SlotCatalog {
    slots: HashMap<MentorId, BTreeMap<NaiveDate, BTreeSet<SlotTime>>>,
}

impl SlotCatalog {
    pub fn rebuild(mentors: &[Mentor]) -> Self {
        let mut slots: HashMap<MentorId, BTreeMap<NaiveDate, BTreeSet<SlotTime>>> = HashMap::new();
        for mentor in mentors {
            let days = slots.entry(mentor.id().clone()).or_default();
            for day in mentor.available_slots() {
                days.entry(day.date)
                    .or_default()
                    .extend(day.times.iter().copied());
            }
        }
        Self { slots }
    }

    /// Published times for the mentor on that date. Unknown mentor or date
    /// yields an empty set, never an error.
    pub fn slots_for(&self, mentor_id: &MentorId, date: NaiveDate) -> &BTreeSet<SlotTime> {
        self.slots
            .get(mentor_id)
            .and_then(|days| days.get(&date))
            .unwrap_or(&NO_TIMES)
    }

    pub fn is_offered(&self, key: &ReservationKey) -> bool {
        self.slots_for(&key.mentor_id, key.date).contains(&key.time)
    }
}

/// Calendar bounds for which dates are offerable at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BookingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl BookingWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Every date of the window, inclusive on both ends.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Enumerate the offerable times of a day on a fixed grid, inclusive of both
/// bounds when they land on it. Used by the admin slot editor.
pub fn time_grid(start: SlotTime, end: SlotTime, step_minutes: u32) -> Vec<SlotTime> {
    let mut times = Vec::new();
    if step_minutes == 0 {
        return times;
    }
    let step = Duration::minutes(i64::from(step_minutes));
    let mut current = start.time();
    while current <= end.time() {
        times.push(SlotTime::from(current));
        let next = current + step;
        if next <= current {
            break; // wrapped past midnight
        }
        current = next;
    }
    times
}
