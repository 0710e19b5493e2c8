use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};

/// Local team row. `external_team_id` is unique and never rewritten once set,
/// matches point at it instead of `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
#[diesel(table_name = crate::model::schema::teams)]
pub struct Team {
    pub id: i32,
    #[serde(rename = "teamId")]
    pub external_team_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub label: String,
    pub country: String,
    pub logo: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::model::schema::teams)]
pub struct NewTeam {
    pub external_team_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub label: String,
    pub country: String,
    pub logo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable display fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::model::schema::teams)]
pub struct TeamDisplay {
    pub name: Option<String>,
    pub label: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

