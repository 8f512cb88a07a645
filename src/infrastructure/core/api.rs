use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::core::{Applicant, Mentor, MentorId, NewMentor, Reservation, ReservationKey};
use crate::domain::{DeleteOutcome, RemoteError, RemoteStore};
use crate::infrastructure::{CreatedMentor, DeleteReply, Envelope};

/// HTTP adapter for the action-tagged remote endpoint. Reads go out as
/// `?action=...` query strings, writes as `{action, payload}` bodies; every
/// answer is the shared success/error envelope. A request that neither
/// confirms nor errors within the timeout is treated as failed.
pub struct ApiRemoteStore {
    client: reqwest::Client,
    url: String,
}

impl ApiRemoteStore {
    pub fn new(url: String, request_timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client, url })
    }

    async fn read<T: DeserializeOwned>(&self, action: &str) -> Result<T, RemoteError> {
        let envelope: Envelope<T> = self
            .client
            .get(&self.url)
            .query(&[("action", action)])
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result()
    }

    async fn write<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: impl Serialize,
    ) -> Result<T, RemoteError> {
        let body = json!({ "action": action, "payload": payload });
        let envelope: Envelope<T> = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result()
    }
}

#[async_trait]
impl RemoteStore for ApiRemoteStore {
    async fn fetch_mentors(&self) -> Result<Vec<Mentor>, RemoteError> {
        self.read("getMentors").await
    }

    async fn fetch_reservations(&self) -> Result<Vec<Reservation>, RemoteError> {
        self.read("getReservations").await
    }

    async fn create_reservation(&self, reservation: &Reservation) -> Result<(), RemoteError> {
        self.write::<Value>("addReservation", reservation).await?;
        Ok(())
    }

    async fn delete_reservation(&self, key: &ReservationKey) -> Result<DeleteOutcome, RemoteError> {
        let reply: DeleteReply = self.write("deleteReservation", key).await?;
        Ok(reply.status)
    }

    async fn upsert_applicant(&self, applicant: &Applicant) -> Result<(), RemoteError> {
        self.write::<Value>("upsertApplicant", applicant).await?;
        Ok(())
    }

    async fn create_mentor(&self, mentor: NewMentor) -> Result<MentorId, RemoteError> {
        let created: CreatedMentor = self.write("addMentor", mentor).await?;
        Ok(created.id)
    }

    async fn update_mentor(&self, mentor: &Mentor) -> Result<(), RemoteError> {
        self.write::<Value>("updateMentor", mentor).await?;
        Ok(())
    }

    async fn delete_mentor(&self, id: &MentorId) -> Result<DeleteOutcome, RemoteError> {
        let reply: DeleteReply = self.write("deleteMentor", json!({ "id": id })).await?;
        Ok(reply.status)
    }
}
