use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::planner::PlannerError;

/// Error answered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

pub fn status_of(e: &PlannerError) -> StatusCode {
    match e {
        PlannerError::RecordNotFound(_)
        | PlannerError::NotFound(_)
        | PlannerError::TaskNotFound(_)
        | PlannerError::FoodNotFound(_)
        | PlannerError::UnknownRoutineSection(_)
        | PlannerError::UnknownGoalSection(_) => StatusCode::NOT_FOUND,
        PlannerError::AlreadyExists(_) | PlannerError::FoodAlreadyExists(_) => StatusCode::CONFLICT,
        PlannerError::CorruptRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl From<PlannerError> for ApiError {
    fn from(e: PlannerError) -> Self {
        Self {
            status: status_of(&e),
            message: e.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<PlannerError>() {
            Ok(planner_error) => planner_error.into(),
            Err(e) => {
                error!("Request failed {e:?}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("{e:#}"),
                }
            }
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(e: FormRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
