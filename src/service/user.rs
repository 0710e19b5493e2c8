use crate::model::user::{
    username_from_email, AccountState, ConfirmAccountSchema, GetUserSchema, NewUser,
    RegisterUserSchema, RequestResetSchema, ResetPasswordSchema,
};
use crate::repository::StoreError;
use crate::service::{failure_response, store_failure_response};
use crate::util::password::hash_password;
use crate::util::token::generate_token;
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, ResponseError};
use chrono::{Duration, Utc};
use log::{error, info};
use serde_json::json;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

const TOKEN_LENGTH: usize = 32;
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("User already exists.")]
    Exists,
    #[error("User not found.")]
    NotFound,
    #[error("Invalid or expired token.")]
    InvalidToken,
    #[error("could not hash password: {0}")]
    Hash(argon2::password_hash::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for AccountError {
    fn status_code(&self) -> StatusCode {
        match self {
            AccountError::Invalid(_) | AccountError::InvalidToken => StatusCode::BAD_REQUEST,
            AccountError::Exists => StatusCode::CONFLICT,
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::Hash(_) | AccountError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AccountError::Store(e) => store_failure_response("account request failed", e),
            AccountError::Hash(e) => {
                error!("could not hash password: {e}");
                failure_response(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            }
            other => failure_response(other.status_code(), &other.to_string()),
        }
    }
}

pub type AccountResult = Result<HttpResponse, AccountError>;

pub async fn create_user_service(data: Data<AppState>, body: Json<RegisterUserSchema>) -> AccountResult {
    body.validate()?;
    let schema = body.into_inner();

    if data
        .db
        .find_user_by_id_or_email(&schema.user_id, &schema.email)
        .await?
        .is_some()
    {
        return Err(AccountError::Exists);
    }

    let password = match schema.password.as_deref() {
        Some(password) => Some(hash_password(password).map_err(AccountError::Hash)?),
        None => None,
    };
    let token = generate_token(TOKEN_LENGTH);
    let new_user = NewUser {
        id: schema.user_id,
        username: username_from_email(&schema.email),
        email: schema.email,
        password,
        state: AccountState::ToConfirm.as_str().to_string(),
        confirm_email_token: Some(token.clone()),
    };

    let user = match data.db.create_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::Constraint(_)) => return Err(AccountError::Exists),
        Err(e) => return Err(e.into()),
    };
    info!("user {} registered", user.id);

    if let Err(e) = data
        .mailer
        .send_confirm_account_mail(&user.username, &user.email, &token)
        .await
    {
        error!("could not send confirmation mail to {}: {e}", user.email);
    }

    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "User created successfully.",
        "data": user
    })))
}

pub async fn confirm_account_service(data: Data<AppState>, body: Json<ConfirmAccountSchema>) -> AccountResult {
    body.validate()?;
    let user = data
        .db
        .confirm_account(&body.token)
        .await?
        .ok_or(AccountError::InvalidToken)?;
    info!("user {} confirmed their account", user.id);
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "Account confirmed.",
        "data": user
    })))
}

/// Answers the same way whether or not the address is registered.
pub async fn request_reset_password_service(
    data: Data<AppState>,
    body: Json<RequestResetSchema>,
) -> AccountResult {
    body.validate()?;
    let token = generate_token(TOKEN_LENGTH);
    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

    match data.db.set_reset_token(&body.email, &token, expires_at).await? {
        Some(user) if !user.is_locked_out() => {
            if let Err(e) = data
                .mailer
                .send_reset_password_mail(&user.username, &user.email, &token)
                .await
            {
                error!("could not send reset mail to {}: {e}", user.email);
            }
        }
        Some(user) => info!("password reset requested for locked account {}", user.id),
        None => info!("password reset requested for unknown email"),
    }

    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "If the account exists, a password reset link has been sent."
    })))
}

pub async fn reset_password_service(data: Data<AppState>, body: Json<ResetPasswordSchema>) -> AccountResult {
    body.validate()?;
    let password_hash = hash_password(&body.password).map_err(AccountError::Hash)?;
    let user = data
        .db
        .reset_password(&body.token, &password_hash, Utc::now())
        .await?
        .ok_or(AccountError::InvalidToken)?;

    if let Err(e) = data
        .mailer
        .send_password_changed_mail(&user.username, &user.email)
        .await
    {
        error!("could not send password changed mail to {}: {e}", user.email);
    }

    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "Password changed."
    })))
}

pub async fn get_user_service(data: Data<AppState>, body: Json<GetUserSchema>) -> AccountResult {
    body.validate()?;
    let user = data
        .db
        .find_user_by_id(&body.user_id)
        .await?
        .ok_or(AccountError::NotFound)?;
    Ok(HttpResponse::Ok().json(json!({
        "response": true,
        "message": "User found successfully.",
        "data": user
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_account_errors_map_to_envelopes() {
        assert_eq!(AccountError::Exists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AccountError::InvalidToken.status_code(), StatusCode::BAD_REQUEST);

        let response = AccountError::NotFound.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"response": false, "message": "User not found."}));
    }
}
