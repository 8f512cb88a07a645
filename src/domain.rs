pub mod core;

use std::{error::Error, fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use self::core::{Applicant, Mentor, MentorId, NewMentor, Reservation, ReservationKey};

/// The remote data endpoint the client synchronizes against. The concrete
/// transport is an infrastructure concern; the core only sees these
/// action-shaped operations and their failure taxonomy.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_mentors(&self) -> Result<Vec<Mentor>, RemoteError>;
    async fn fetch_reservations(&self) -> Result<Vec<Reservation>, RemoteError>;
    /// Persist a reservation. The remote side re-validates and upserts the
    /// applicant snapshot as part of the same write.
    async fn create_reservation(&self, reservation: &Reservation) -> Result<(), RemoteError>;
    /// Remove the reservation with the given identity tuple. Deleting an
    /// absent tuple is reported as a status, not a failure.
    async fn delete_reservation(&self, key: &ReservationKey) -> Result<DeleteOutcome, RemoteError>;
    async fn upsert_applicant(&self, applicant: &Applicant) -> Result<(), RemoteError>;
    async fn create_mentor(&self, mentor: NewMentor) -> Result<MentorId, RemoteError>;
    async fn update_mentor(&self, mentor: &Mentor) -> Result<(), RemoteError>;
    async fn delete_mentor(&self, id: &MentorId) -> Result<DeleteOutcome, RemoteError>;
}

/// Remote failures are distinguished only as network-level (no usable
/// response) or remote-level (the endpoint answered and said no).
#[derive(ThisError, Debug)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(#[source] Box<dyn Error + Send + Sync>),
    #[error("remote store is busy")]
    Busy,
    #[error("remote rejected the write: {0}")]
    Rejected(WriteReject),
    #[error("remote error: {0}")]
    Remote(String),
}

impl RemoteError {
    /// Safe to retry: the write may not have been attempted at all.
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Network(_) | RemoteError::Busy)
    }
}

/// Reasons the remote write guard refuses a request that passed the local
/// optimistic checks. Carried over the wire as stable machine codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteReject {
    MentorFull,
    DeadlinePassed,
    SlotTaken,
    MentorNotFound,
}

impl WriteReject {
    pub fn code(&self) -> &'static str {
        match self {
            WriteReject::MentorFull => "mentor_full",
            WriteReject::DeadlinePassed => "deadline_passed",
            WriteReject::SlotTaken => "slot_taken",
            WriteReject::MentorNotFound => "mentor_not_found",
        }
    }
}

impl fmt::Display for WriteReject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WriteReject::MentorFull => "mentor has no remaining capacity",
            WriteReject::DeadlinePassed => "the reservation deadline has passed",
            WriteReject::SlotTaken => "the slot is already taken",
            WriteReject::MentorNotFound => "mentor not found",
        };
        f.write_str(text)
    }
}

impl FromStr for WriteReject {
    type Err = UnknownRejectCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mentor_full" => Ok(WriteReject::MentorFull),
            "deadline_passed" => Ok(WriteReject::DeadlinePassed),
            "slot_taken" => Ok(WriteReject::SlotTaken),
            "mentor_not_found" => Ok(WriteReject::MentorNotFound),
            _ => Err(UnknownRejectCode),
        }
    }
}

#[derive(Debug)]
pub struct UnknownRejectCode;

impl Error for UnknownRejectCode {}

impl fmt::Display for UnknownRejectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reject code")
    }
}

/// Outcome of a remote delete. `NotFound` makes repeated deletion a no-op
/// rather than an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}
