use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};

/// One outbound call to the football data provider.
#[derive(Serialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::model::schema::api_football_logs)]
pub struct ApiLog {
    pub id: i32,
    pub description: String,
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::model::schema::api_football_logs)]
pub struct NewApiLog<'a> {
    pub description: &'a str,
    pub url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ApiLogQuery {
    pub limit: Option<i64>,
}
