use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use tracing::{info, warn};

use crate::domain::{RemoteError, RemoteStore, WriteReject};

use super::{
    Applicant, BookingPolicy, Mentor, MentorId, PolicyViolation, Reservation, ReservationKey,
    ReservationStore, SlotCatalog,
};

/// The single entry point for booking and cancellation. Runs the invariant
/// checks against the local cache as an optimistic fast path, applies the
/// local mutation, and reconciles it with the remote outcome; the remote
/// write guard remains the authoritative enforcement under concurrency.
pub struct BookingService<R> {
    mentors: Vec<Mentor>,
    catalog: SlotCatalog,
    store: ReservationStore,
    policy: BookingPolicy,
    remote: R,
    in_flight: bool,
}

impl<R: RemoteStore> BookingService<R> {
    pub fn new(policy: BookingPolicy, remote: R) -> Self {
        Self {
            mentors: Vec::new(),
            catalog: SlotCatalog::default(),
            store: ReservationStore::new(),
            policy,
            remote,
            in_flight: false,
        }
    }

    pub fn mentors(&self) -> &[Mentor] {
        &self.mentors
    }

    pub fn mentor(&self, id: &MentorId) -> Option<&Mentor> {
        self.mentors.iter().find(|m| m.id() == id)
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ReservationStore {
        &self.store
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Re-fetch mentors and reservations and rebuild the local caches.
    /// Cross-client visibility is only as fresh as the last call to this.
    pub async fn reload(&mut self) -> Result<(), BookingError> {
        let mut flight = self.begin()?;
        flight.service.reload_inner().await
    }

    fn begin(&mut self) -> Result<InFlight<'_, R>, BookingError> {
        if self.in_flight {
            return Err(BookingError::RequestInFlight);
        }
        self.in_flight = true;
        Ok(InFlight { service: self })
    }

    async fn reload_inner(&mut self) -> Result<(), BookingError> {
        let mentors = self
            .remote
            .fetch_mentors()
            .await
            .map_err(BookingError::from_remote)?;
        let reservations = self
            .remote
            .fetch_reservations()
            .await
            .map_err(BookingError::from_remote)?;
        self.catalog = SlotCatalog::rebuild(&mentors);
        self.mentors = mentors;
        self.store.reload(reservations);
        info!(
            mentors = self.mentors.len(),
            reservations = self.store.len(),
            "local caches reloaded"
        );
        Ok(())
    }

    pub async fn book(
        &mut self,
        key: ReservationKey,
        applicant: Applicant,
        now: DateTime<Utc>,
    ) -> Result<Reservation, BookingError> {
        let mut flight = self.begin()?;
        flight.service.book_inner(key, applicant, now).await
    }

    async fn book_inner(
        &mut self,
        key: ReservationKey,
        applicant: Applicant,
        now: DateTime<Utc>,
    ) -> Result<Reservation, BookingError> {
        if !self.catalog.is_offered(&key) {
            return Err(BookingError::SlotNotOffered);
        }
        self.policy.check_date(now, key.date)?;
        if self.store.is_booked(&key) {
            return Err(BookingError::SlotTaken);
        }
        self.policy
            .check_capacity(self.store.count_for(&key.mentor_id))?;
        if let Some(existing) = self.store.find_by_applicant(applicant.student_id()) {
            // Cancel-first is a deliberate two-step flow, never an atomic swap.
            return Err(BookingError::ApplicantAlreadyBooked {
                existing: existing.key(),
            });
        }

        let reservation = Reservation::create(key.clone(), applicant, now);
        let token = self.store.apply_optimistic(reservation.clone());
        match self.remote.create_reservation(&reservation).await {
            Ok(()) => {
                self.store.confirm(token);
                info!(mentor = %key.mentor_id, date = %key.date, time = %key.time, "reservation confirmed");
                Ok(reservation)
            }
            Err(error) => {
                self.store.rollback(token);
                warn!(mentor = %key.mentor_id, %error, "reservation write failed, rolled back");
                Err(BookingError::from_remote(error))
            }
        }
    }

    pub async fn cancel(&mut self, key: &ReservationKey) -> Result<(), BookingError> {
        let mut flight = self.begin()?;
        flight.service.cancel_inner(key).await
    }

    async fn cancel_inner(&mut self, key: &ReservationKey) -> Result<(), BookingError> {
        let Some(token) = self.store.remove(key) else {
            return Err(BookingError::NotFound);
        };
        match self.remote.delete_reservation(key).await {
            // A remote "not found" still settles the removal: the row is
            // gone either way.
            Ok(_outcome) => {
                self.store.confirm_removal(token);
                info!(mentor = %key.mentor_id, date = %key.date, time = %key.time, "reservation cancelled");
                Ok(())
            }
            Err(error) => {
                self.store.rollback_removal(token);
                warn!(mentor = %key.mentor_id, %error, "reservation delete failed, restored");
                Err(BookingError::from_remote(error))
            }
        }
    }
}

/// Marks one request as in flight for its whole lifetime, including futures
/// the caller drops mid-await: the flag is cleared on drop, and any insert
/// still pending at that point is withdrawn with it.
struct InFlight<'a, R> {
    service: &'a mut BookingService<R>,
}

impl<R> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        self.service.in_flight = false;
        self.service.store.purge_pending();
    }
}

/// How a failure should be surfaced and whether retrying can help.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Actionable rule violation; never retried.
    Validation,
    /// Requires a user choice: another mentor, another slot, or cancel first.
    Capacity,
    /// The remote re-validation refused what the stale local check allowed;
    /// re-sync and pick another slot.
    Concurrency,
    /// Network blip or busy remote; safe to retry, rollback already done.
    Transient,
}

#[derive(Error, Display, Debug)]
pub enum BookingError {
    #[display(fmt = "This mentor does not offer that slot")]
    SlotNotOffered,
    #[display(fmt = "The reservation deadline has passed")]
    DeadlinePassed,
    #[display(fmt = "This slot is already taken")]
    SlotTaken,
    #[display(fmt = "This mentor has no remaining capacity")]
    MentorFull,
    #[display(fmt = "You already hold a reservation; cancel it first")]
    ApplicantAlreadyBooked { existing: ReservationKey },
    #[display(fmt = "No matching reservation exists")]
    NotFound,
    #[display(fmt = "Another request is still in flight")]
    RequestInFlight,
    #[display(fmt = "The slot just became unavailable: {}", _0)]
    SlotJustTaken(#[error(not(source))] WriteReject),
    #[display(fmt = "The request could not reach the reservation store: {}", _0)]
    RemoteWriteFailed(#[error(source)] RemoteError),
}

impl BookingError {
    fn from_remote(error: RemoteError) -> Self {
        match error {
            RemoteError::Rejected(reject) => BookingError::SlotJustTaken(reject),
            other => BookingError::RemoteWriteFailed(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::SlotNotOffered
            | BookingError::DeadlinePassed
            | BookingError::SlotTaken
            | BookingError::NotFound => ErrorKind::Validation,
            BookingError::MentorFull | BookingError::ApplicantAlreadyBooked { .. } => {
                ErrorKind::Capacity
            }
            BookingError::SlotJustTaken(_) => ErrorKind::Concurrency,
            BookingError::RequestInFlight | BookingError::RemoteWriteFailed(_) => {
                ErrorKind::Transient
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

impl From<PolicyViolation> for BookingError {
    fn from(value: PolicyViolation) -> Self {
        match value {
            PolicyViolation::DeadlinePassed => BookingError::DeadlinePassed,
            PolicyViolation::MentorFull => BookingError::MentorFull,
        }
    }
}
