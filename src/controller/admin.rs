use crate::config::admin_auth::AdminGuard;
use crate::model::api_log::ApiLogQuery;
use crate::model::league::{AddLeagueSchema, LeagueUpdateSchema, RefreshLeagueSchema};
use crate::model::payload::{ApiEnvelope, FixturePayload};
use crate::model::tournament::NewTournamentSchema;
use crate::service::league::{
    add_league_service, api_logs_service, fetch_fixtures_service, list_leagues_service,
    match_by_api_id_service, process_fixtures_service, rebuild_schedule_service,
    refresh_league_service, schedule_service, team_by_api_id_service, update_league_service,
};
use crate::service::tournament::{create_tournament_service, list_tournaments_service};
use crate::AppState;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, web, Responder};

#[post("/leagues/update")]
async fn refresh_league_handler(
    _: AdminGuard,
    data: Data<AppState>,
    body: Json<RefreshLeagueSchema>,
) -> impl Responder {
    refresh_league_service(data, body).await
}

#[post("/add-league")]
async fn add_league_handler(
    _: AdminGuard,
    data: Data<AppState>,
    body: Json<AddLeagueSchema>,
) -> impl Responder {
    add_league_service(data, body).await
}

#[get("/leagues")]
async fn list_leagues_handler(_: AdminGuard, data: Data<AppState>) -> impl Responder {
    list_leagues_service(data).await
}

#[post("/update-league-status")]
async fn update_league_handler(
    _: AdminGuard,
    data: Data<AppState>,
    body: Json<LeagueUpdateSchema>,
) -> impl Responder {
    update_league_service(data, body).await
}

#[get("/api-logs")]
async fn api_logs_handler(
    _: AdminGuard,
    data: Data<AppState>,
    query: Query<ApiLogQuery>,
) -> impl Responder {
    api_logs_service(data, query).await
}

#[get("/api/teams/{api_team_id}")]
async fn team_by_api_id_handler(
    _: AdminGuard,
    data: Data<AppState>,
    api_team_id: Path<String>,
) -> impl Responder {
    team_by_api_id_service(data, api_team_id).await
}

#[get("/api/matches/{api_fixture_id}")]
async fn match_by_api_id_handler(
    _: AdminGuard,
    data: Data<AppState>,
    api_fixture_id: Path<String>,
) -> impl Responder {
    match_by_api_id_service(data, api_fixture_id).await
}

#[post("/api/process-fixtures")]
async fn process_fixtures_handler(
    _: AdminGuard,
    data: Data<AppState>,
    body: Json<ApiEnvelope<FixturePayload>>,
) -> impl Responder {
    process_fixtures_service(data, body).await
}

#[post("/api/fetch-fixtures")]
async fn fetch_fixtures_handler(
    _: AdminGuard,
    data: Data<AppState>,
    body: Json<RefreshLeagueSchema>,
) -> impl Responder {
    fetch_fixtures_service(data, body).await
}

#[get("/schedule")]
async fn schedule_handler(_: AdminGuard, data: Data<AppState>) -> impl Responder {
    schedule_service(data).await
}

#[post("/schedule/rebuild")]
async fn rebuild_schedule_handler(_: AdminGuard, data: Data<AppState>) -> impl Responder {
    rebuild_schedule_service(data).await
}

#[post("/tournaments")]
async fn create_tournament_handler(
    admin: AdminGuard,
    data: Data<AppState>,
    body: Json<NewTournamentSchema>,
) -> impl Responder {
    log::info!("admin {} creates tournament {}", admin.user.id, body.slug);
    create_tournament_service(data, body).await
}

#[get("/tournaments")]
async fn list_tournaments_handler(_: AdminGuard, data: Data<AppState>) -> impl Responder {
    list_tournaments_service(data, None).await
}

pub fn scope() -> actix_web::Scope {
    web::scope("/api/admin")
        .service(refresh_league_handler)
        .service(add_league_handler)
        .service(list_leagues_handler)
        .service(update_league_handler)
        .service(api_logs_handler)
        .service(team_by_api_id_handler)
        .service(match_by_api_id_handler)
        .service(process_fixtures_handler)
        .service(fetch_fixtures_handler)
        .service(schedule_handler)
        .service(rebuild_schedule_handler)
        .service(create_tournament_handler)
        .service(list_tournaments_handler)
}
