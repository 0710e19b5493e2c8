use chrono::{DateTime, NaiveDate, Utc};
use diesel::{Insertable, Queryable};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::model::schema::tournaments)]
pub struct Tournament {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "leagueId")]
    pub league_id: String,
    #[serde(rename = "maxParticipants")]
    pub max_participants: i32,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "updateTimes")]
    pub update_times: Vec<String>,
    #[serde(rename = "entryFee")]
    pub entry_fee: i32,
    #[serde(rename = "prizePool")]
    pub prize_pool: i32,
    pub status: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// The two columns the league poller derives its daily schedule from.
#[derive(Debug, Clone, Queryable)]
pub struct TournamentSchedule {
    pub league_id: String,
    pub update_times: Vec<String>,
}

lazy_static! {
    pub static ref UPDATE_TIME_RE: Regex = Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap();
    static ref TOURNAMENT_STATUS_RE: Regex =
        Regex::new(r"^(inactive|open|closed|finished)$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
}

fn validate_update_times(times: &[String]) -> Result<(), ValidationError> {
    for time in times {
        if !UPDATE_TIME_RE.is_match(time) {
            let mut error = ValidationError::new("update_times");
            error.message = Some(format!("Invalid time format: {time}. Use HH:MM").into());
            return Err(error);
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, Insertable)]
#[diesel(table_name = crate::model::schema::tournaments)]
pub struct NewTournamentSchema {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(regex(path = "SLUG_RE", message = "slug may only contain a-z, 0-9 and single hyphens"))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub league_id: String,
    #[validate(range(min = 1, message = "max_participants must be positive"))]
    pub max_participants: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom = "validate_update_times")]
    pub update_times: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub entry_fee: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub prize_pool: i32,
    #[serde(default = "default_tournament_status")]
    #[validate(regex(
        path = "TOURNAMENT_STATUS_RE",
        message = "status must be one of: inactive, open, closed, finished"
    ))]
    pub status: String,
    #[validate(length(min = 1))]
    pub created_by: String,
}

fn default_tournament_status() -> String {
    "inactive".to_string()
}
