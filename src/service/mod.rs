pub mod api_client;
pub mod bet;
pub mod league;
pub mod normalize;
pub mod poller;
pub mod reconcile;
pub mod refresh;
#[cfg(test)]
pub mod testing;
pub mod tournament;
pub mod user;

use crate::repository::StoreError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::error;
use serde_json::json;

/// `{"response": false, "message": ...}` with the given status.
pub fn failure_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "response": false,
        "message": message
    }))
}

/// Store failures are logged and answered with a generic message.
pub fn store_failure_response(context: &str, err: &StoreError) -> HttpResponse {
    error!("{context}: {err}");
    failure_response(StatusCode::INTERNAL_SERVER_ERROR, "An error occurred")
}

impl actix_web::ResponseError for refresh::RefreshError {
    fn status_code(&self) -> StatusCode {
        match self {
            refresh::RefreshError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            refresh::RefreshError::LeagueNotFound { .. } => StatusCode::NOT_FOUND,
            refresh::RefreshError::AlreadyExists(_) => StatusCode::CONFLICT,
            refresh::RefreshError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            refresh::RefreshError::CooldownActive { next_allowed, .. } => {
                HttpResponse::TooManyRequests().json(json!({
                    "response": false,
                    "message": self.to_string(),
                    "next_allowed": next_allowed.to_rfc3339()
                }))
            }
            refresh::RefreshError::Store(e) => store_failure_response("league refresh failed", e),
            other => failure_response(other.status_code(), &other.to_string()),
        }
    }
}
