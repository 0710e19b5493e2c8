use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
#[diesel(table_name = crate::model::schema::matches)]
pub struct Match {
    pub id: i32,
    #[serde(rename = "matchId")]
    pub external_match_id: Option<String>,
    #[serde(rename = "homeTeam")]
    pub home_team: String,
    #[serde(rename = "awayTeam")]
    pub away_team: String,
    #[serde(rename = "leagueId")]
    pub league_id: String,
    pub status: String,
    #[serde(rename = "statusCode")]
    pub status_code: Option<String>,
    #[serde(rename = "matchCurrentTime")]
    pub match_current_time: Option<i32>,
    #[serde(rename = "homeTeamScore")]
    pub home_team_score: i32,
    #[serde(rename = "awayTeamScore")]
    pub away_team_score: i32,
    #[serde(rename = "actualHomeScore")]
    pub actual_home_score: Option<i32>,
    #[serde(rename = "actualAwayScore")]
    pub actual_away_score: Option<i32>,
    #[serde(rename = "halfTimeHomeScore")]
    pub half_time_home_score: Option<i32>,
    #[serde(rename = "halfTimeAwayScore")]
    pub half_time_away_score: Option<i32>,
    #[serde(rename = "fullTimeHomeScore")]
    pub full_time_home_score: Option<i32>,
    #[serde(rename = "fullTimeAwayScore")]
    pub full_time_away_score: Option<i32>,
    #[serde(rename = "matchDate")]
    pub match_date: NaiveDate,
    #[serde(rename = "matchTime")]
    pub match_time: NaiveTime,
    pub stadium: String,
    #[serde(rename = "stadiumCity")]
    pub stadium_city: Option<String>,
    #[serde(rename = "stadiumCountry")]
    pub stadium_country: Option<String>,
    pub round: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Every field a fixture sync writes. Used both as the insert row and as the
/// update changeset, so a `None` score overwrites a stale value with NULL.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = crate::model::schema::matches, treat_none_as_null = true)]
pub struct NewMatch {
    pub external_match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league_id: String,
    pub status: String,
    pub status_code: Option<String>,
    pub match_current_time: Option<i32>,
    pub home_team_score: i32,
    pub away_team_score: i32,
    pub actual_home_score: Option<i32>,
    pub actual_away_score: Option<i32>,
    pub half_time_home_score: Option<i32>,
    pub half_time_away_score: Option<i32>,
    pub full_time_home_score: Option<i32>,
    pub full_time_away_score: Option<i32>,
    pub match_date: NaiveDate,
    pub match_time: NaiveTime,
    pub stadium: String,
    pub stadium_city: Option<String>,
    pub stadium_country: Option<String>,
    pub round: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Result of an atomic insert-or-update keyed on `external_match_id`.
#[derive(Debug, Clone)]
pub struct MatchUpsert {
    pub row: Match,
    pub created: bool,
}

/// Canonical match status. The raw upstream code is kept next to it in
/// `status_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}
