//! Wire types of the upstream football data provider.
//!
//! Everything is optional and defaulted: the provider omits fields freely and
//! a missing value must never fail the whole response.

use serde::{Deserialize, Deserializer};

/// Common envelope around every provider response.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiEnvelope<T> {
    pub response: Vec<T>,
    pub errors: serde_json::Value,
}

impl<T> Default for ApiEnvelope<T> {
    fn default() -> Self {
        ApiEnvelope {
            response: Vec::new(),
            errors: serde_json::Value::Null,
        }
    }
}

impl<T> ApiEnvelope<T> {
    /// The provider answers quota and parameter problems with HTTP 200 and a
    /// non-empty `errors` object or array.
    pub fn error_message(&self) -> Option<String> {
        match &self.errors {
            serde_json::Value::Object(map) if !map.is_empty() => Some(
                map.iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            serde_json::Value::Array(items) if !items.is_empty() => Some(
                items
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

/// Explicit `null` names read as empty, like missing ones.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LeagueEnvelope {
    pub league: LeagueInfo,
    pub country: CountryInfo,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LeagueInfo {
    pub id: Option<i64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CountryInfo {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TeamEnvelope {
    pub team: TeamPayload,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TeamPayload {
    pub id: Option<i64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub code: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixturePayload {
    pub fixture: FixtureInfo,
    pub league: FixtureLeague,
    pub teams: FixtureTeams,
    pub goals: ScorePair,
    pub score: FixtureScore,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixtureInfo {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub venue: Venue,
    pub status: FixtureStatus,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Venue {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixtureStatus {
    pub short: Option<String>,
    pub elapsed: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixtureLeague {
    pub id: Option<i64>,
    pub round: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixtureTeams {
    pub home: FixtureTeam,
    pub away: FixtureTeam,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixtureTeam {
    pub id: Option<i64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub logo: Option<String>,
}

impl FixtureTeam {
    /// Fixture team stubs carry no code or country.
    pub fn as_team_payload(&self) -> TeamPayload {
        TeamPayload {
            id: self.id,
            name: self.name.clone(),
            code: None,
            country: None,
            logo: self.logo.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ScorePair {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FixtureScore {
    pub halftime: ScorePair,
    pub fulltime: ScorePair,
}
