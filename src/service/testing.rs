//! Scripted provider and payload builders shared by the service tests.

use crate::model::league::NewLeague;
use crate::model::payload::{
    CountryInfo, FixtureInfo, FixtureLeague, FixturePayload, FixtureStatus, FixtureTeam,
    FixtureTeams, LeagueEnvelope, LeagueInfo, TeamEnvelope, TeamPayload,
};
use crate::service::api_client::{FootballApi, LeagueLookup};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn team(id: i64, name: &str) -> TeamEnvelope {
    TeamEnvelope {
        team: TeamPayload {
            id: Some(id),
            name: name.to_string(),
            ..Default::default()
        },
    }
}

pub fn fixture(match_id: i64, home: i64, away: i64, league: i64) -> FixturePayload {
    FixturePayload {
        fixture: FixtureInfo {
            id: Some(match_id),
            date: Some("2025-08-16T14:00:00+00:00".to_string()),
            status: FixtureStatus {
                short: Some("NS".to_string()),
                elapsed: None,
            },
            ..Default::default()
        },
        league: FixtureLeague {
            id: Some(league),
            round: Some("Regular Season - 1".to_string()),
        },
        teams: FixtureTeams {
            home: FixtureTeam {
                id: Some(home),
                name: format!("Team {home}"),
                logo: None,
            },
            away: FixtureTeam {
                id: Some(away),
                name: format!("Team {away}"),
                logo: None,
            },
        },
        ..Default::default()
    }
}

pub fn league_envelope(id: i64, name: &str) -> LeagueEnvelope {
    LeagueEnvelope {
        league: LeagueInfo {
            id: Some(id),
            name: name.to_string(),
            logo: Some(format!("https://media.example/leagues/{id}.png")),
        },
        country: CountryInfo {
            name: Some("England".to_string()),
        },
    }
}

pub fn league_row(external_league_id: &str) -> NewLeague {
    NewLeague {
        external_league_id: external_league_id.to_string(),
        name: format!("League {external_league_id}"),
        slug: format!("league-{external_league_id}"),
        country: "England".to_string(),
        logo: String::new(),
        status: "active".to_string(),
        season: 2025,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// Provider stub answering from fixed tables and counting calls.
#[derive(Default)]
pub struct ScriptedApi {
    pub leagues: HashMap<String, LeagueEnvelope>,
    pub teams: HashMap<String, Vec<TeamEnvelope>>,
    pub fixtures: HashMap<String, Vec<FixturePayload>>,
    league_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn with_league(mut self, league: LeagueEnvelope) -> Self {
        if let Some(id) = league.league.id {
            self.leagues.insert(id.to_string(), league);
        }
        self
    }

    pub fn with_teams(mut self, league_id: &str, teams: Vec<TeamEnvelope>) -> Self {
        self.teams.insert(league_id.to_string(), teams);
        self
    }

    pub fn with_fixtures(mut self, league_id: &str, fixtures: Vec<FixturePayload>) -> Self {
        self.fixtures.insert(league_id.to_string(), fixtures);
        self
    }

    /// Holds every league lookup open for `delay` so concurrent callers overlap.
    pub fn with_league_delay(mut self, delay: Duration) -> Self {
        self.league_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FootballApi for ScriptedApi {
    async fn fetch_league(&self, league_id: &str) -> LeagueLookup {
        self.calls.lock().unwrap().push(format!("league {league_id}"));
        if let Some(delay) = self.league_delay {
            tokio::time::sleep(delay).await;
        }
        match self.leagues.get(league_id) {
            Some(league) => LeagueLookup::Found(league.clone()),
            None => LeagueLookup::NotFound {
                reason: format!("league {league_id} is unknown to the provider"),
            },
        }
    }

    async fn fetch_teams(&self, league_id: &str, season: i32) -> Vec<TeamEnvelope> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("teams {league_id} {season}"));
        self.teams.get(league_id).cloned().unwrap_or_default()
    }

    async fn fetch_fixtures(&self, league_id: &str, season: i32) -> Vec<FixturePayload> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fixtures {league_id} {season}"));
        self.fixtures.get(league_id).cloned().unwrap_or_default()
    }
}
