use crate::model::api_log::ApiLogQuery;
use crate::model::league::{AddLeagueSchema, LeagueStatus, LeagueUpdateSchema, RefreshLeagueSchema};
use crate::model::payload::{ApiEnvelope, FixturePayload, TeamPayload};
use crate::model::response::ProcessFixturesSummary;
use crate::repository::{AuditLog, StoreError, SyncStore};
use crate::service::reconcile::Reconciler;
use crate::service::refresh::RefreshError;
use crate::service::{failure_response, store_failure_response};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::json;
use std::collections::HashSet;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

const DEFAULT_LOG_LIMIT: i64 = 100;
const MAX_LOG_LIMIT: i64 = 500;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for AdminError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Invalid(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Conflict(_) => StatusCode::CONFLICT,
            AdminError::Refresh(e) => e.status_code(),
            AdminError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AdminError::Refresh(e) => e.error_response(),
            AdminError::Store(e) => store_failure_response("admin request failed", e),
            other => failure_response(other.status_code(), &other.to_string()),
        }
    }
}

pub type AdminResult = Result<HttpResponse, AdminError>;

pub async fn refresh_league_service(data: Data<AppState>, body: Json<RefreshLeagueSchema>) -> AdminResult {
    body.validate()?;
    let season = body
        .season
        .unwrap_or_else(|| data.refresher.current_season(Utc::now()));
    let summary = data.refresher.refresh_league(&body.league_id, season).await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": format!("League {} refreshed", body.league_id),
        "data": summary
    })))
}

pub async fn add_league_service(data: Data<AppState>, body: Json<AddLeagueSchema>) -> AdminResult {
    body.validate()?;
    let season = body
        .season
        .unwrap_or_else(|| data.refresher.current_season(Utc::now()));
    let status = body.status.unwrap_or(LeagueStatus::Inactive);
    let (league, summary) = data
        .refresher
        .add_league(&body.league_id, status, season)
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "response": true,
        "message": format!("League {} added", league.name),
        "data": {
            "league": league,
            "sync": summary
        }
    })))
}

pub async fn list_leagues_service(data: Data<AppState>) -> AdminResult {
    let leagues = data.db.list_leagues().await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "data": leagues
    })))
}

pub async fn update_league_service(data: Data<AppState>, body: Json<LeagueUpdateSchema>) -> AdminResult {
    body.validate()?;
    if body.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("league_id", validator::ValidationError::new("no fields to update"));
        return Err(AdminError::Invalid(errors));
    }
    match data
        .db
        .update_league(&body.league_id, body.changeset(Utc::now()))
        .await
    {
        Ok(Some(league)) => Ok(HttpResponse::Ok().json(json!({
            "response": true,
            "message": "League updated",
            "data": league
        }))),
        Ok(None) => Err(AdminError::NotFound(format!(
            "League {} not found",
            body.league_id
        ))),
        Err(StoreError::Constraint(_)) => Err(AdminError::Conflict(
            "A league with that slug already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn api_logs_service(data: Data<AppState>, query: Query<ApiLogQuery>) -> AdminResult {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LOG_LIMIT)
        .clamp(1, MAX_LOG_LIMIT);
    let logs = data.db.list_api_logs(limit).await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "data": logs
    })))
}

pub async fn team_by_api_id_service(data: Data<AppState>, api_team_id: Path<String>) -> AdminResult {
    match data.db.find_team_by_external_id(&api_team_id).await? {
        Some(team) => Ok(HttpResponse::Ok().json(json!({
            "response": true,
            "data": team
        }))),
        None => Err(AdminError::NotFound(format!(
            "Team with API id {api_team_id} not found"
        ))),
    }
}

pub async fn match_by_api_id_service(data: Data<AppState>, api_fixture_id: Path<String>) -> AdminResult {
    match data.db.find_match_by_external_id(&api_fixture_id).await? {
        Some(found) => Ok(HttpResponse::Ok().json(json!({
            "response": true,
            "data": found
        }))),
        None => Err(AdminError::NotFound(format!(
            "Match with API fixture id {api_fixture_id} not found"
        ))),
    }
}

/// Team stubs of a fixture batch, first occurrence of each id wins.
fn fixture_team_stubs(fixtures: &[FixturePayload]) -> Vec<TeamPayload> {
    let mut seen = HashSet::new();
    fixtures
        .iter()
        .flat_map(|f| [&f.teams.home, &f.teams.away])
        .filter(|team| team.id.map_or(false, |id| seen.insert(id)))
        .map(|team| team.as_team_payload())
        .collect()
}

/// Reconciles the fixture team stubs first, then the fixtures themselves.
pub async fn process_fixtures(
    reconciler: &Reconciler,
    fixtures: &[FixturePayload],
    now: DateTime<Utc>,
) -> ProcessFixturesSummary {
    let teams = reconciler
        .reconcile_teams(&fixture_team_stubs(fixtures), now)
        .await;
    let matches = reconciler.reconcile_fixtures(fixtures, now).await;

    let mut errors = teams.failures;
    errors.extend(matches.failures);
    ProcessFixturesSummary {
        teams_added: teams.created,
        teams_existing: teams.updated,
        matches_added: matches.created,
        matches_existing: matches.updated,
        matches_skipped: matches.skipped,
        errors,
    }
}

pub async fn process_fixtures_service(
    data: Data<AppState>,
    body: Json<ApiEnvelope<FixturePayload>>,
) -> AdminResult {
    let envelope = body.into_inner();
    let description = format!("Process {} provided fixtures", envelope.response.len());
    if let Err(e) = data
        .db
        .record_api_call(&description, "/api/admin/api/process-fixtures")
        .await
    {
        warn!("could not record fixture processing: {e}");
    }

    let summary = process_fixtures(data.refresher.reconciler(), &envelope.response, Utc::now()).await;
    info!(
        "processed fixtures: {} added, {} existing, {} skipped",
        summary.matches_added, summary.matches_existing, summary.matches_skipped
    );
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "Fixtures processed",
        "data": summary
    })))
}

pub async fn fetch_fixtures_service(data: Data<AppState>, body: Json<RefreshLeagueSchema>) -> AdminResult {
    body.validate()?;
    let season = body
        .season
        .unwrap_or_else(|| data.refresher.current_season(Utc::now()));
    let fixtures = data
        .refresher
        .api()
        .fetch_fixtures(&body.league_id, season)
        .await;
    let summary = process_fixtures(data.refresher.reconciler(), &fixtures, Utc::now()).await;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": format!("Fetched {} fixtures", fixtures.len()),
        "data": summary
    })))
}

pub async fn schedule_service(data: Data<AppState>) -> AdminResult {
    let entries = data.poller.snapshot().await;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "data": entries
    })))
}

pub async fn rebuild_schedule_service(data: Data<AppState>) -> AdminResult {
    let count = data.poller.rebuild().await?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": format!("Schedule rebuilt with {count} entries"),
        "data": data.poller.snapshot().await
    })))
}
