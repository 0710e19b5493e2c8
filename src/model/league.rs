use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
#[diesel(table_name = crate::model::schema::leagues)]
pub struct League {
    pub id: i32,
    #[serde(rename = "leagueId")]
    pub external_league_id: String,
    pub name: String,
    pub slug: String,
    pub country: String,
    pub logo: String,
    pub status: String,
    pub season: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::model::schema::leagues)]
pub struct NewLeague {
    pub external_league_id: String,
    pub name: String,
    pub slug: String,
    pub country: String,
    pub logo: String,
    pub status: String,
    pub season: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Display metadata refreshed from upstream on every league sync.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::model::schema::leagues)]
pub struct LeagueMetadataChangeset {
    pub name: String,
    pub slug: String,
    pub country: String,
    pub logo: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueStatus {
    Active,
    Inactive,
}

impl LeagueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeagueStatus::Active => "active",
            LeagueStatus::Inactive => "inactive",
        }
    }
}

lazy_static! {
    static ref LEAGUE_ID_RE: Regex = Regex::new(r"^\d{1,9}$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshLeagueSchema {
    #[validate(regex(path = "LEAGUE_ID_RE", message = "league_id must be a numeric id"))]
    pub league_id: String,
    #[validate(range(min = 1900, max = 2100, message = "season must be a calendar year"))]
    pub season: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddLeagueSchema {
    #[validate(regex(path = "LEAGUE_ID_RE", message = "league_id must be a numeric id"))]
    pub league_id: String,
    pub status: Option<LeagueStatus>,
    #[validate(range(min = 1900, max = 2100, message = "season must be a calendar year"))]
    pub season: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LeagueUpdateSchema {
    #[validate(regex(path = "LEAGUE_ID_RE", message = "league_id must be a numeric id"))]
    pub league_id: String,
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(regex(path = "SLUG_RE", message = "slug may only contain a-z, 0-9 and single hyphens"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub country: Option<String>,
    #[validate(url(message = "logo must be a URL"))]
    pub logo: Option<String>,
    pub status: Option<LeagueStatus>,
}

/// Partial admin update. Absent fields are left untouched, present ones are
/// bound as query parameters.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::model::schema::leagues)]
pub struct LeagueChangeset {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeagueUpdateSchema {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.country.is_none()
            && self.logo.is_none()
            && self.status.is_none()
    }

    pub fn changeset(&self, now: DateTime<Utc>) -> LeagueChangeset {
        LeagueChangeset {
            name: self.name.clone(),
            slug: self.slug.clone(),
            country: self.country.clone(),
            logo: self.logo.clone(),
            status: self.status.map(|s| s.as_str().to_string()),
            updated_at: Some(now),
        }
    }
}
