use crate::model::tournament::NewTournamentSchema;
use crate::repository::{StoreError, SyncStore};
use crate::service::{failure_response, store_failure_response};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, ResponseError};
use log::info;
use serde_json::json;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Error, Debug)]
pub enum TournamentError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("League {0} is not registered")]
    UnknownLeague(String),
    #[error("A tournament with slug {0} already exists")]
    SlugTaken(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for TournamentError {
    fn status_code(&self) -> StatusCode {
        match self {
            TournamentError::Invalid(_) => StatusCode::BAD_REQUEST,
            TournamentError::UnknownLeague(_) => StatusCode::NOT_FOUND,
            TournamentError::SlugTaken(_) => StatusCode::CONFLICT,
            TournamentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            TournamentError::Store(e) => store_failure_response("tournament request failed", e),
            other => failure_response(other.status_code(), &other.to_string()),
        }
    }
}

pub async fn create_tournament_service(
    data: Data<AppState>,
    body: Json<NewTournamentSchema>,
) -> Result<HttpResponse, TournamentError> {
    body.validate()?;
    if data.db.find_league(&body.league_id).await?.is_none() {
        return Err(TournamentError::UnknownLeague(body.league_id.clone()));
    }
    if data.db.tournament_slug_exists(&body.slug).await? {
        return Err(TournamentError::SlugTaken(body.slug.clone()));
    }

    let slug = body.slug.clone();
    let tournament = match data.db.insert_tournament(body.into_inner()).await {
        Ok(tournament) => tournament,
        Err(StoreError::Constraint(_)) => return Err(TournamentError::SlugTaken(slug)),
        Err(e) => return Err(e.into()),
    };
    info!(
        "tournament {} created for league {}",
        tournament.slug, tournament.league_id
    );

    Ok(HttpResponse::Created().json(json!({
        "response": true,
        "message": "Tournament created",
        "data": tournament
    })))
}

pub async fn list_tournaments_service(
    data: Data<AppState>,
    status: Option<&str>,
) -> Result<HttpResponse, TournamentError> {
    let tournaments = data.db.list_tournaments(status).await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "data": tournaments
    })))
}
