use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::model::schema::users)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub user_type: String,
    pub state: String,
    #[serde(skip_serializing)]
    pub confirm_email_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "activeTournamentId")]
    pub active_tournament_id: Option<i32>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.user_type == "admin"
    }

    pub fn is_locked_out(&self) -> bool {
        self.state == AccountState::Banned.as_str() || self.state == AccountState::Deleted.as_str()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::model::schema::users)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: Option<String>,
    pub state: String,
    pub confirm_email_token: Option<String>,
}

/// Account states. Stored as their kebab-case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    ToConfirm,
    Active,
    Banned,
    Deleted,
}

impl AccountState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountState::ToConfirm => "to-confirm",
            AccountState::Active => "active",
            AccountState::Banned => "banned",
            AccountState::Deleted => "deleted",
        }
    }
}

lazy_static! {
    static ref PASSWORD_RE: Regex = Regex::new(r"^[A-Za-z\d@$!%*?&#^_-]{8,64}$").unwrap();
    static ref TOKEN_RE: Regex = Regex::new(r"^[A-Za-z0-9]{32}$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserSchema {
    #[validate(length(min = 1, max = 128, message = "user_id is required"))]
    pub user_id: String,
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
    #[validate(regex(
        path = "PASSWORD_RE",
        message = "Password must be between 8 and 64 characters long. \
        It can only contain letters, numbers and the following special characters (@, $, !, %, *, ?, &, #, ^, _, -)"
    ))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmAccountSchema {
    #[validate(regex(path = "TOKEN_RE", message = "token must be 32 alphanumeric characters"))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestResetSchema {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordSchema {
    #[validate(regex(path = "TOKEN_RE", message = "token must be 32 alphanumeric characters"))]
    pub token: String,
    #[validate(regex(
        path = "PASSWORD_RE",
        message = "Password must be between 8 and 64 characters long. \
        It can only contain letters, numbers and the following special characters (@, $, !, %, *, ?, &, #, ^, _, -)"
    ))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GetUserSchema {
    #[validate(length(min = 1, max = 128, message = "user_id is required"))]
    pub user_id: String,
}

/// Username shown before the profile is edited: the local part of the email.
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}
