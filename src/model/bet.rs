use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::model::schema::bets)]
pub struct Bet {
    pub id: i32,
    #[serde(rename = "matchId")]
    pub match_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "homeBet")]
    pub home_bet: i32,
    #[serde(rename = "awayBet")]
    pub away_bet: i32,
    pub status: String,
    pub points: Option<i32>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::model::schema::bets)]
pub struct NewBet {
    pub match_id: String,
    pub user_id: String,
    pub home_bet: i32,
    pub away_bet: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BetSchema {
    #[validate(length(min = 1, message = "match_id is required"))]
    pub match_id: String,
    #[validate(range(min = 0, max = 20, message = "home_bet must be between 0 and 20"))]
    pub home_bet: i32,
    #[validate(range(min = 0, max = 20, message = "away_bet must be between 0 and 20"))]
    pub away_bet: i32,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}
