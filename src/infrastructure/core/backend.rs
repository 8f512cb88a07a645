use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::domain::core::{
    Applicant, BookingPolicy, Mentor, MentorId, NewMentor, Reservation, ReservationKey,
};
use crate::domain::{DeleteOutcome, RemoteError, RemoteStore, WriteReject};

/// Row tables, the spreadsheet analog: one row per mentor, reservation and
/// applicant, in append order.
#[derive(Debug, Default)]
struct Tables {
    mentors: Vec<Mentor>,
    reservations: Vec<Reservation>,
    applicants: Vec<Applicant>,
}

/// Remote-side store with the serialized write path. The client's checks run
/// against a possibly stale snapshot, so every reservation append re-reads
/// the current rows and re-validates deadline, uniqueness and capacity inside
/// an exclusive section before anything is persisted. One coarse lock guards
/// all writes; write volume is low and this keeps the reasoning simple.
pub struct Backend {
    policy: BookingPolicy,
    lock_wait: Duration,
    write_lock: Mutex<()>,
    state: RwLock<Tables>,
}

impl Backend {
    pub fn new(policy: BookingPolicy, lock_wait: Duration) -> Self {
        Self {
            policy,
            lock_wait,
            write_lock: Mutex::new(()),
            state: RwLock::new(Tables::default()),
        }
    }

    /// Bounded wait for the exclusive write section. On timeout the request
    /// fails as busy instead of queueing indefinitely.
    async fn acquire_write(&self) -> Result<tokio::sync::MutexGuard<'_, ()>, RemoteError> {
        timeout(self.lock_wait, self.write_lock.lock())
            .await
            .map_err(|_| RemoteError::Busy)
    }

    fn validate_append(
        &self,
        tables: &Tables,
        reservation: &Reservation,
    ) -> Result<(), WriteReject> {
        let key = reservation.key();
        if !tables.mentors.iter().any(|m| m.id() == &key.mentor_id) {
            return Err(WriteReject::MentorNotFound);
        }
        self.policy
            .check_date(Utc::now(), key.date)
            .map_err(|_| WriteReject::DeadlinePassed)?;
        if tables.reservations.iter().any(|r| r.key() == key) {
            return Err(WriteReject::SlotTaken);
        }
        let reserved = tables
            .reservations
            .iter()
            .filter(|r| r.mentor_id() == &key.mentor_id)
            .count();
        self.policy
            .check_capacity(reserved)
            .map_err(|_| WriteReject::MentorFull)?;
        Ok(())
    }

    fn upsert_applicant_row(tables: &mut Tables, applicant: &Applicant) {
        match tables
            .applicants
            .iter_mut()
            .find(|a| a.student_id() == applicant.student_id())
        {
            Some(row) => *row = applicant.clone(),
            None => tables.applicants.push(applicant.clone()),
        }
    }

    fn mint_mentor_id() -> MentorId {
        format!("mentor_{}", Utc::now().timestamp_millis()).into()
    }

    #[cfg(test)]
    async fn hold_write_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    #[cfg(test)]
    async fn applicant_rows(&self) -> Vec<Applicant> {
        self.state.read().await.applicants.clone()
    }
}

#[async_trait]
impl RemoteStore for Backend {
    async fn fetch_mentors(&self) -> Result<Vec<Mentor>, RemoteError> {
        Ok(self.state.read().await.mentors.clone())
    }

    async fn fetch_reservations(&self) -> Result<Vec<Reservation>, RemoteError> {
        Ok(self.state.read().await.reservations.clone())
    }

    async fn create_reservation(&self, reservation: &Reservation) -> Result<(), RemoteError> {
        let _guard = self.acquire_write().await?;
        let mut tables = self.state.write().await;
        if let Err(reject) = self.validate_append(&tables, reservation) {
            warn!(%reject, "reservation append refused");
            return Err(RemoteError::Rejected(reject));
        }
        tables.reservations.push(reservation.clone());
        Self::upsert_applicant_row(&mut tables, reservation.applicant());
        info!(
            mentor = %reservation.mentor_id(),
            date = %reservation.date(),
            time = %reservation.time(),
            "reservation appended"
        );
        Ok(())
    }

    async fn delete_reservation(&self, key: &ReservationKey) -> Result<DeleteOutcome, RemoteError> {
        // Appends and removals must not interleave, but removal needs no
        // re-validation: dropping a row cannot violate capacity.
        let _guard = self.acquire_write().await?;
        let mut tables = self.state.write().await;
        match tables.reservations.iter().position(|r| r.key() == *key) {
            Some(index) => {
                tables.reservations.remove(index);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn upsert_applicant(&self, applicant: &Applicant) -> Result<(), RemoteError> {
        let _guard = self.acquire_write().await?;
        let mut tables = self.state.write().await;
        Self::upsert_applicant_row(&mut tables, applicant);
        Ok(())
    }

    async fn create_mentor(&self, mentor: NewMentor) -> Result<MentorId, RemoteError> {
        let _guard = self.acquire_write().await?;
        let id = Self::mint_mentor_id();
        let mentor =
            Mentor::create(id.clone(), mentor).map_err(|e| RemoteError::Remote(e.to_string()))?;
        self.state.write().await.mentors.push(mentor);
        Ok(id)
    }

    async fn update_mentor(&self, mentor: &Mentor) -> Result<(), RemoteError> {
        let _guard = self.acquire_write().await?;
        let mut tables = self.state.write().await;
        match tables.mentors.iter_mut().find(|m| m.id() == mentor.id()) {
            Some(row) => {
                *row = mentor.clone();
                Ok(())
            }
            None => Err(RemoteError::Rejected(WriteReject::MentorNotFound)),
        }
    }

    /// Mentor deletion does not cascade onto reservations; records are
    /// independent once created.
    async fn delete_mentor(&self, id: &MentorId) -> Result<DeleteOutcome, RemoteError> {
        let _guard = self.acquire_write().await?;
        let mut tables = self.state.write().await;
        match tables.mentors.iter().position(|m| m.id() == id) {
            Some(index) => {
                tables.mentors.remove(index);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}
