use crate::model::bet::UserIdQuery;
use crate::model::user::User;
use crate::AppState;
use actix_web::error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{dev::Payload, web, Error as ActixWebError};
use actix_web::{FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use log::error;
use serde::Serialize;
use std::fmt;
use std::fmt::Formatter;

const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    response: bool,
    message: String,
}

impl ErrorResponse {
    fn new(message: &str) -> Self {
        ErrorResponse {
            response: false,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let body = serde_json::to_string(&self).map_err(|_| fmt::Error)?;
        write!(f, "{body}")
    }
}

/// Admin user resolved from the `x-user-id` header or the `user_id` query
/// parameter.
pub struct AdminGuard {
    pub user: User,
}

fn requested_user_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            web::Query::<UserIdQuery>::from_query(req.query_string())
                .ok()
                .and_then(|query| query.into_inner().user_id)
        })
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

impl FromRequest for AdminGuard {
    type Error = ActixWebError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let data = req.app_data::<web::Data<AppState>>().cloned();
        let user_id = requested_user_id(req);

        Box::pin(async move {
            let data = data.ok_or_else(|| {
                ErrorInternalServerError(ErrorResponse::new("Application state missing"))
            })?;
            let user_id = user_id.ok_or_else(|| {
                ErrorUnauthorized(ErrorResponse::new("User ID is required"))
            })?;

            match data.db.find_user_by_id(&user_id).await {
                Ok(Some(user)) if user.is_admin() && !user.is_locked_out() => {
                    Ok(AdminGuard { user })
                }
                Ok(Some(_)) => Err(ErrorForbidden(ErrorResponse::new(
                    "Access denied. Admin privileges required",
                ))),
                Ok(None) => Err(ErrorUnauthorized(ErrorResponse::new("User not found"))),
                Err(e) => {
                    error!("admin check for {user_id} failed: {e}");
                    Err(ErrorInternalServerError(ErrorResponse::new(
                        "Failed to check user permissions",
                    )))
                }
            }
        })
    }
}
