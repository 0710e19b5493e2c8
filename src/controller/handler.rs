use crate::controller::admin;
use crate::model::bet::{BetSchema, UserIdQuery};
use crate::model::user::{
    ConfirmAccountSchema, GetUserSchema, RegisterUserSchema, RequestResetSchema,
    ResetPasswordSchema,
};
use crate::service::bet::{list_bets_service, place_bet_service};
use crate::service::tournament::list_tournaments_service;
use crate::service::user::{
    confirm_account_service, create_user_service, get_user_service,
    request_reset_password_service, reset_password_service,
};
use crate::AppState;
use actix_web::web::{Data, Json, Query};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;

#[get("/health")]
async fn health_check_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Everything is working as expected"
    }))
}

#[post("/createUser")]
async fn create_user_handler(
    data: Data<AppState>,
    body: Json<RegisterUserSchema>,
) -> impl Responder {
    create_user_service(data, body).await
}

#[post("/confirmAccount")]
async fn confirm_account_handler(
    data: Data<AppState>,
    body: Json<ConfirmAccountSchema>,
) -> impl Responder {
    confirm_account_service(data, body).await
}

#[post("/requestResetPassword")]
async fn request_reset_password_handler(
    data: Data<AppState>,
    body: Json<RequestResetSchema>,
) -> impl Responder {
    request_reset_password_service(data, body).await
}

#[post("/resetPassword")]
async fn reset_password_handler(
    data: Data<AppState>,
    body: Json<ResetPasswordSchema>,
) -> impl Responder {
    reset_password_service(data, body).await
}

#[post("/getUser")]
async fn get_user_handler(data: Data<AppState>, body: Json<GetUserSchema>) -> impl Responder {
    get_user_service(data, body).await
}

#[get("/tournaments")]
async fn open_tournaments_handler(data: Data<AppState>) -> impl Responder {
    list_tournaments_service(data, Some("open")).await
}

#[post("/bets")]
async fn place_bet_handler(
    data: Data<AppState>,
    query: Query<UserIdQuery>,
    body: Json<BetSchema>,
) -> impl Responder {
    place_bet_service(data, query.into_inner().user_id, body).await
}

#[get("/bets")]
async fn list_bets_handler(data: Data<AppState>, query: Query<UserIdQuery>) -> impl Responder {
    list_bets_service(data, query.into_inner().user_id).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    let users = web::scope("/api/users")
        .service(create_user_handler)
        .service(confirm_account_handler)
        .service(request_reset_password_handler)
        .service(reset_password_handler)
        .service(get_user_handler);

    let public = web::scope("/api")
        .service(health_check_handler)
        .service(open_tournaments_handler)
        .service(place_bet_handler)
        .service(list_bets_handler);

    conf.service(admin::scope())
        .service(users)
        .service(public);
}
