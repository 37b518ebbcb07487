use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use passrate_core::control::ControlError;
use passrate_core::control::ingest::INVALID_FORMAT_MESSAGE;
use passrate_store::models::TeacherResult;
use serde::Serialize;
use serde_json::Value;
use surrealdb::Connection;
use tracing::{error, warn};

use crate::{ApiError, AppState};

const FETCH_FAILED: &str = "Failed to fetch teacher data";
const APPEND_FAILED: &str = "Failed to append teacher data";
const APPEND_SUCCEEDED: &str = "Teacher data appended successfully";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

pub async fn list_teachers<C>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<TeacherResult>>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    match state.control.list_teachers().await {
        Ok(records) => Ok(Json(records)),
        Err(err) => {
            error!(error = %err, "error fetching teacher data");
            Err(ApiError::internal(FETCH_FAILED))
        }
    }
}

pub async fn append_teachers<C>(
    State(state): State<AppState<C>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, "append body is not JSON");
        ApiError::bad_request(INVALID_FORMAT_MESSAGE)
    })?;

    match state.control.append_json(payload).await {
        Ok(_) => Ok(Json(MessageResponse {
            message: APPEND_SUCCEEDED.to_string(),
        })),
        Err(ControlError::InvalidInput(message)) => {
            warn!(%message, "append payload rejected");
            Err(ApiError::bad_request(message))
        }
        Err(err) => {
            error!(error = %err, "error appending teacher data");
            Err(ApiError::internal(APPEND_FAILED))
        }
    }
}

pub async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, POST")],
        format!("Method {method} Not Allowed"),
    )
        .into_response()
}
