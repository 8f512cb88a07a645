use std::{error::Error, net::SocketAddr, sync::Arc};

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sunprofile::domain::core::{Applicant, Mentor, MentorId, NewMentor, Reservation, ReservationKey};
use sunprofile::domain::{RemoteError, RemoteStore};
use sunprofile::infrastructure::core::Backend;
use sunprofile::infrastructure::remote_error_message;
use sunprofile::SunProfileConfig;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() {
    match SunProfileConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = serve(&config).await {
                error!("application error: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("application error: {}", error)
        }
    }
}

async fn serve(config: &SunProfileConfig) -> Result<(), Box<dyn Error>> {
    let backend = Arc::new(Backend::new(
        config.booking.policy(),
        config.booking.lock_wait(),
    ));
    let app = Router::new()
        .route("/", get(handle_read).post(handle_write))
        .with_state(backend);

    let addr: SocketAddr = config.server.bind.parse()?;
    info!("listening on {}", addr);
    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[derive(Deserialize)]
struct ReadParams {
    action: String,
}

async fn handle_read(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<ReadParams>,
) -> Json<Value> {
    match params.action.as_str() {
        "getMentors" => respond(backend.fetch_mentors().await),
        "getReservations" => respond(backend.fetch_reservations().await),
        _ => failure("invalid action".to_owned()),
    }
}

#[derive(Deserialize)]
struct WriteRequest {
    action: String,
    payload: Value,
}

#[derive(Deserialize)]
struct MentorRef {
    id: MentorId,
}

async fn handle_write(
    State(backend): State<Arc<Backend>>,
    Json(request): Json<WriteRequest>,
) -> Json<Value> {
    let WriteRequest { action, payload } = request;
    match action.as_str() {
        "addReservation" => match parse::<Reservation>(payload) {
            Ok(reservation) => respond(
                backend
                    .create_reservation(&reservation)
                    .await
                    .map(|()| json!({ "status": "created" })),
            ),
            Err(message) => failure(message),
        },
        "deleteReservation" => match parse::<ReservationKey>(payload) {
            Ok(key) => respond(
                backend
                    .delete_reservation(&key)
                    .await
                    .map(|status| json!({ "status": status })),
            ),
            Err(message) => failure(message),
        },
        "upsertApplicant" => match parse::<Applicant>(payload) {
            Ok(applicant) => respond(
                backend
                    .upsert_applicant(&applicant)
                    .await
                    .map(|()| json!({ "status": "saved" })),
            ),
            Err(message) => failure(message),
        },
        "addMentor" => match parse::<NewMentor>(payload) {
            Ok(mentor) => respond(
                backend
                    .create_mentor(mentor)
                    .await
                    .map(|id| json!({ "id": id })),
            ),
            Err(message) => failure(message),
        },
        "updateMentor" => match parse::<Mentor>(payload) {
            Ok(mentor) => respond(
                backend
                    .update_mentor(&mentor)
                    .await
                    .map(|()| json!({ "status": "updated" })),
            ),
            Err(message) => failure(message),
        },
        "deleteMentor" => match parse::<MentorRef>(payload) {
            Ok(mentor) => respond(
                backend
                    .delete_mentor(&mentor.id)
                    .await
                    .map(|status| json!({ "status": status })),
            ),
            Err(message) => failure(message),
        },
        _ => failure("invalid action".to_owned()),
    }
}

fn parse<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, String> {
    serde_json::from_value(payload).map_err(|e| format!("invalid payload: {e}"))
}

fn respond<T: Serialize>(result: Result<T, RemoteError>) -> Json<Value> {
    match result {
        Ok(data) => Json(json!({ "result": "success", "data": data })),
        Err(error) => failure(remote_error_message(&error)),
    }
}

fn failure(message: String) -> Json<Value> {
    Json(json!({ "result": "error", "message": message }))
}
