use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Applicant, MentorId, SlotTime};

/// A reservation has no ID of its own; the `(mentor, date, time)` tuple is
/// the identity used for lookup, cancellation and dedup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationKey {
    pub mentor_id: MentorId,
    pub date: NaiveDate,
    pub time: SlotTime,
}

impl ReservationKey {
    pub fn new(mentor_id: impl Into<MentorId>, date: NaiveDate, time: SlotTime) -> Self {
        Self {
            mentor_id: mentor_id.into(),
            date,
            time,
        }
    }
}

/// A confirmed booking of one slot by one applicant. The applicant is a full
/// snapshot taken at booking time, so later profile edits leave historical
/// records untouched. Never mutated in place; cancel-then-recreate is the
/// only edit path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    mentor_id: MentorId,
    date: NaiveDate,
    time: SlotTime,
    applicant: Applicant,
    created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn create(key: ReservationKey, applicant: Applicant, created_at: DateTime<Utc>) -> Self {
        Self {
            mentor_id: key.mentor_id,
            date: key.date,
            time: key.time,
            applicant,
            created_at,
        }
    }

    pub fn key(&self) -> ReservationKey {
        ReservationKey {
            mentor_id: self.mentor_id.clone(),
            date: self.date,
            time: self.time,
        }
    }

    pub fn mentor_id(&self) -> &MentorId {
        &self.mentor_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> SlotTime {
        self.time
    }

    pub fn applicant(&self) -> &Applicant {
        &self.applicant
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::super::Gender;
    use super::*;

    #[test]
    fn key_round_trips_through_reservation() {
        let key = ReservationKey::new(
            "mentor_1",
            NaiveDate::from_ymd_opt(2026, 2, 22).unwrap(),
            SlotTime::new(9, 30).unwrap(),
        );
        let applicant =
            Applicant::create("20260001".into(), "Lee".into(), 20, Gender::Male, None).unwrap();
        let created_at = Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap();
        let reservation = Reservation::create(key.clone(), applicant, created_at);
        assert_eq!(reservation.key(), key);
        assert_eq!(reservation.created_at(), created_at);
    }

    #[test]
    fn snapshot_survives_wire_round_trip() {
        let key = ReservationKey::new(
            "mentor_1",
            NaiveDate::from_ymd_opt(2026, 2, 22).unwrap(),
            SlotTime::new(9, 30).unwrap(),
        );
        let applicant = Applicant::create(
            "20260001".into(),
            "Lee".into(),
            20,
            Gender::Female,
            Some("MBTI: INFP".into()),
        )
        .unwrap();
        let created_at = Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap();
        let reservation = Reservation::create(key, applicant, created_at);

        let json = serde_json::to_string(&reservation).unwrap();
        assert!(json.contains("\"time\":\"09:30\""));
        assert!(json.contains("\"date\":\"2026-02-22\""));
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reservation);
    }
}
