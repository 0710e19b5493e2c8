use crate::model::bet::{BetSchema, NewBet};
use crate::model::matches::{Match, MatchStatus};
use crate::repository::StoreError;
use crate::service::normalize::civil_datetime;
use crate::service::{failure_response, store_failure_response};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Error, Debug)]
pub enum BetError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("user_id is required")]
    MissingUser,
    #[error("User {0} not found")]
    UnknownUser(String),
    #[error("Match {0} not found")]
    UnknownMatch(String),
    #[error("Betting is closed for match {0}")]
    Closed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for BetError {
    fn status_code(&self) -> StatusCode {
        match self {
            BetError::Invalid(_) | BetError::MissingUser | BetError::Closed(_) => {
                StatusCode::BAD_REQUEST
            }
            BetError::UnknownUser(_) | BetError::UnknownMatch(_) => StatusCode::NOT_FOUND,
            BetError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            BetError::Store(e) => store_failure_response("bet request failed", e),
            other => failure_response(other.status_code(), &other.to_string()),
        }
    }
}

/// Bets close at kick-off, read in the civil timezone, or as soon as the
/// match is no longer scheduled.
pub fn betting_closed(fixture: &Match, tz: Tz, now: DateTime<Utc>) -> bool {
    let open_status = fixture.status == MatchStatus::Scheduled.as_str()
        || fixture.status == MatchStatus::Postponed.as_str();
    if !open_status {
        return true;
    }
    match civil_datetime(tz, fixture.match_date, fixture.match_time) {
        Some(kickoff) => now >= kickoff.with_timezone(&Utc),
        None => true,
    }
}

fn required_user(user_id: Option<String>) -> Result<String, BetError> {
    user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(BetError::MissingUser)
}

pub async fn place_bet_service(
    data: Data<AppState>,
    user_id: Option<String>,
    body: Json<BetSchema>,
) -> Result<HttpResponse, BetError> {
    let user_id = required_user(user_id)?;
    body.validate()?;

    if data.db.find_user_by_id(&user_id).await?.is_none() {
        return Err(BetError::UnknownUser(user_id));
    }
    let fixture = data
        .db
        .find_match_by_external_id(&body.match_id)
        .await?
        .ok_or_else(|| BetError::UnknownMatch(body.match_id.clone()))?;
    let now = Utc::now();
    if betting_closed(&fixture, data.config.timezone, now) {
        return Err(BetError::Closed(body.match_id.clone()));
    }

    let bet = data
        .db
        .upsert_bet(NewBet {
            match_id: body.match_id.clone(),
            user_id,
            home_bet: body.home_bet,
            away_bet: body.away_bet,
            updated_at: now,
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "Bet saved",
        "data": bet
    })))
}

pub async fn list_bets_service(
    data: Data<AppState>,
    user_id: Option<String>,
) -> Result<HttpResponse, BetError> {
    let user_id = required_user(user_id)?;
    let bets = data.db.list_bets_for_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "data": bets
    })))
}
