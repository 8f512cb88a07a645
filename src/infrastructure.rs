pub mod core;

use serde::{Deserialize, Serialize};

use crate::domain::core::MentorId;
use crate::domain::{DeleteOutcome, RemoteError};

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        RemoteError::Network(Box::new(value))
    }
}

/// The response envelope every remote action answers with, success or not.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success { data: T },
    Error { message: String },
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, RemoteError> {
        match self {
            Envelope::Success { data } => Ok(data),
            Envelope::Error { message } => Err(remote_error_from_message(message)),
        }
    }
}

/// Remote failures travel as a message string; well-known machine codes map
/// back to their typed variants, anything else stays an opaque remote error.
pub fn remote_error_from_message(message: String) -> RemoteError {
    if message == "busy" {
        return RemoteError::Busy;
    }
    match message.parse() {
        Ok(reject) => RemoteError::Rejected(reject),
        Err(_) => RemoteError::Remote(message),
    }
}

pub fn remote_error_message(error: &RemoteError) -> String {
    match error {
        RemoteError::Busy => "busy".to_owned(),
        RemoteError::Rejected(reject) => reject.code().to_owned(),
        RemoteError::Network(source) => source.to_string(),
        RemoteError::Remote(message) => message.clone(),
    }
}

/// Wire shape of a delete acknowledgement, `{"status": "not_found"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteReply {
    pub status: DeleteOutcome,
}

/// Wire shape of a mentor-creation acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedMentor {
    pub id: MentorId,
}
