//! In-process store for exercising the sync core without Postgres.

use crate::model::league::{League, LeagueMetadataChangeset, NewLeague};
use crate::model::matches::{Match, MatchUpsert, NewMatch};
use crate::model::team::{NewTeam, Team, TeamDisplay};
use crate::model::tournament::TournamentSchedule;
use crate::repository::{AuditLog, SlugScope, StoreError, StoreResult, SyncStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: i32,
    leagues: Vec<League>,
    teams: Vec<Team>,
    matches: Vec<Match>,
    schedules: Vec<TournamentSchedule>,
    api_calls: Vec<(String, String)>,
    failing_matches: HashSet<String>,
    failing_teams: HashSet<String>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write of the given fixture fail.
    pub fn fail_match(&self, external_match_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_matches.insert(external_match_id.to_string());
    }

    /// Makes every write of the given team fail.
    pub fn fail_team(&self, external_team_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_teams.insert(external_team_id.to_string());
    }

    pub fn seed_league(&self, league: NewLeague) -> League {
        let mut state = self.state.lock().unwrap();
        let row = league_row(&mut state, league);
        state.leagues.push(row.clone());
        row
    }

    pub fn seed_team(&self, external_team_id: &str, name: &str, slug: &str) -> Team {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        let row = team_row(
            &mut state,
            NewTeam {
                external_team_id: Some(external_team_id.to_string()),
                name: name.to_string(),
                slug: slug.to_string(),
                label: name.chars().take(3).collect::<String>().to_uppercase(),
                country: "Unknown".to_string(),
                logo: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        state.teams.push(row.clone());
        row
    }

    pub fn seed_schedule(&self, league_id: &str, update_times: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.schedules.push(TournamentSchedule {
            league_id: league_id.to_string(),
            update_times: update_times.iter().map(|t| t.to_string()).collect(),
        });
    }

    pub fn remove_team(&self, external_team_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .teams
            .retain(|t| t.external_team_id.as_deref() != Some(external_team_id));
    }

    pub fn remove_league(&self, external_league_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .leagues
            .retain(|l| l.external_league_id != external_league_id);
    }

    pub fn leagues(&self) -> Vec<League> {
        self.state.lock().unwrap().leagues.clone()
    }

    pub fn teams(&self) -> Vec<Team> {
        self.state.lock().unwrap().teams.clone()
    }

    pub fn matches(&self) -> Vec<Match> {
        self.state.lock().unwrap().matches.clone()
    }

    pub fn api_calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().api_calls.clone()
    }

    pub fn team(&self, external_team_id: &str) -> Option<Team> {
        self.teams()
            .into_iter()
            .find(|t| t.external_team_id.as_deref() == Some(external_team_id))
    }

    pub fn fixture(&self, external_match_id: &str) -> Option<Match> {
        self.matches()
            .into_iter()
            .find(|m| m.external_match_id.as_deref() == Some(external_match_id))
    }
}

fn league_row(state: &mut State, league: NewLeague) -> League {
    League {
        id: state.next_id(),
        external_league_id: league.external_league_id,
        name: league.name,
        slug: league.slug,
        country: league.country,
        logo: league.logo,
        status: league.status,
        season: league.season,
        created_at: league.created_at,
        updated_at: league.updated_at,
    }
}

fn team_row(state: &mut State, team: NewTeam) -> Team {
    Team {
        id: state.next_id(),
        external_team_id: team.external_team_id,
        name: team.name,
        slug: team.slug,
        label: team.label,
        country: team.country,
        logo: team.logo,
        created_at: team.created_at,
        updated_at: team.updated_at,
    }
}

fn apply_fixture(row: &mut Match, fixture: NewMatch) {
    row.home_team = fixture.home_team;
    row.away_team = fixture.away_team;
    row.league_id = fixture.league_id;
    row.status = fixture.status;
    row.status_code = fixture.status_code;
    row.match_current_time = fixture.match_current_time;
    row.home_team_score = fixture.home_team_score;
    row.away_team_score = fixture.away_team_score;
    row.actual_home_score = fixture.actual_home_score;
    row.actual_away_score = fixture.actual_away_score;
    row.half_time_home_score = fixture.half_time_home_score;
    row.half_time_away_score = fixture.half_time_away_score;
    row.full_time_home_score = fixture.full_time_home_score;
    row.full_time_away_score = fixture.full_time_away_score;
    row.match_date = fixture.match_date;
    row.match_time = fixture.match_time;
    row.stadium = fixture.stadium;
    row.stadium_city = fixture.stadium_city;
    row.stadium_country = fixture.stadium_country;
    row.round = fixture.round;
    row.updated_at = fixture.updated_at;
}

#[async_trait]
impl SyncStore for MemoryStore {
    async fn find_league(&self, external_league_id: &str) -> StoreResult<Option<League>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .leagues
            .iter()
            .find(|l| l.external_league_id == external_league_id)
            .cloned())
    }

    async fn claim_refresh(
        &self,
        external_league_id: &str,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> StoreResult<Option<League>> {
        let mut state = self.state.lock().unwrap();
        let claimed = state
            .leagues
            .iter_mut()
            .find(|l| l.external_league_id == external_league_id)
            .filter(|l| l.updated_at.map_or(true, |at| at <= now - cooldown))
            .map(|l| {
                l.updated_at = Some(now);
                l.clone()
            });
        Ok(claimed)
    }

    async fn insert_league_if_absent(&self, league: NewLeague) -> StoreResult<Option<League>> {
        let mut state = self.state.lock().unwrap();
        if state
            .leagues
            .iter()
            .any(|l| l.external_league_id == league.external_league_id)
        {
            return Ok(None);
        }
        if state.leagues.iter().any(|l| l.slug == league.slug) {
            return Err(StoreError::Constraint(format!(
                "duplicate league slug {}",
                league.slug
            )));
        }
        let row = league_row(&mut state, league);
        state.leagues.push(row.clone());
        Ok(Some(row))
    }

    async fn update_league_metadata(
        &self,
        external_league_id: &str,
        changes: LeagueMetadataChangeset,
    ) -> StoreResult<League> {
        let mut state = self.state.lock().unwrap();
        let row = state
            .leagues
            .iter_mut()
            .find(|l| l.external_league_id == external_league_id)
            .ok_or_else(|| StoreError::Query(diesel::result::Error::NotFound))?;
        row.name = changes.name;
        row.slug = changes.slug;
        row.country = changes.country;
        row.logo = changes.logo;
        row.updated_at = changes.updated_at;
        Ok(row.clone())
    }

    async fn slug_exists(&self, scope: SlugScope, slug: &str) -> StoreResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(match scope {
            SlugScope::League => state.leagues.iter().any(|l| l.slug == slug),
            SlugScope::Team => state.teams.iter().any(|t| t.slug == slug),
        })
    }

    async fn find_team_by_external_id(
        &self,
        external_team_id: &str,
    ) -> StoreResult<Option<Team>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .teams
            .iter()
            .find(|t| t.external_team_id.as_deref() == Some(external_team_id))
            .cloned())
    }

    async fn insert_team(&self, team: NewTeam) -> StoreResult<Team> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = team.external_team_id.as_ref() {
            if state.failing_teams.contains(id) {
                return Err(StoreError::Constraint(format!("write rejected for team {id}")));
            }
        }
        if let Some(existing) = state
            .teams
            .iter_mut()
            .find(|t| t.external_team_id.is_some() && t.external_team_id == team.external_team_id)
        {
            existing.name = team.name;
            existing.label = team.label;
            existing.country = team.country;
            existing.logo = team.logo;
            existing.updated_at = team.updated_at;
            return Ok(existing.clone());
        }
        if state.teams.iter().any(|t| t.slug == team.slug) {
            return Err(StoreError::Constraint(format!(
                "duplicate team slug {}",
                team.slug
            )));
        }
        let row = team_row(&mut state, team);
        state.teams.push(row.clone());
        Ok(row)
    }

    async fn update_team_display(
        &self,
        external_team_id: &str,
        changes: TeamDisplay,
    ) -> StoreResult<Team> {
        let mut state = self.state.lock().unwrap();
        if state.failing_teams.contains(external_team_id) {
            return Err(StoreError::Constraint(format!(
                "write rejected for team {external_team_id}"
            )));
        }
        let row = state
            .teams
            .iter_mut()
            .find(|t| t.external_team_id.as_deref() == Some(external_team_id))
            .ok_or_else(|| StoreError::Query(diesel::result::Error::NotFound))?;
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(label) = changes.label {
            row.label = label;
        }
        if let Some(country) = changes.country {
            row.country = country;
        }
        if let Some(logo) = changes.logo {
            row.logo = logo;
        }
        if let Some(updated_at) = changes.updated_at {
            row.updated_at = updated_at;
        }
        Ok(row.clone())
    }

    async fn upsert_match(&self, fixture: NewMatch) -> StoreResult<MatchUpsert> {
        let mut state = self.state.lock().unwrap();
        if state.failing_matches.contains(&fixture.external_match_id) {
            return Err(StoreError::Constraint(format!(
                "write rejected for fixture {}",
                fixture.external_match_id
            )));
        }
        if let Some(existing) = state
            .matches
            .iter_mut()
            .find(|m| m.external_match_id.as_deref() == Some(fixture.external_match_id.as_str()))
        {
            apply_fixture(existing, fixture);
            return Ok(MatchUpsert {
                row: existing.clone(),
                created: false,
            });
        }
        let id = state.next_id();
        let row = Match {
            id,
            external_match_id: Some(fixture.external_match_id.clone()),
            home_team: fixture.home_team,
            away_team: fixture.away_team,
            league_id: fixture.league_id,
            status: fixture.status,
            status_code: fixture.status_code,
            match_current_time: fixture.match_current_time,
            home_team_score: fixture.home_team_score,
            away_team_score: fixture.away_team_score,
            actual_home_score: fixture.actual_home_score,
            actual_away_score: fixture.actual_away_score,
            half_time_home_score: fixture.half_time_home_score,
            half_time_away_score: fixture.half_time_away_score,
            full_time_home_score: fixture.full_time_home_score,
            full_time_away_score: fixture.full_time_away_score,
            match_date: fixture.match_date,
            match_time: fixture.match_time,
            stadium: fixture.stadium,
            stadium_city: fixture.stadium_city,
            stadium_country: fixture.stadium_country,
            round: fixture.round,
            created_at: fixture.updated_at,
            updated_at: fixture.updated_at,
        };
        state.matches.push(row.clone());
        Ok(MatchUpsert { row, created: true })
    }

    async fn delete_orphaned_matches(&self) -> StoreResult<usize> {
        let mut state = self.state.lock().unwrap();
        let team_ids: HashSet<String> = state
            .teams
            .iter()
            .filter_map(|t| t.external_team_id.clone())
            .collect();
        let league_ids: HashSet<String> = state
            .leagues
            .iter()
            .map(|l| l.external_league_id.clone())
            .collect();
        let before = state.matches.len();
        state.matches.retain(|m| {
            team_ids.contains(&m.home_team)
                && team_ids.contains(&m.away_team)
                && league_ids.contains(&m.league_id)
        });
        Ok(before - state.matches.len())
    }

    async fn tournament_schedules(&self) -> StoreResult<Vec<TournamentSchedule>> {
        Ok(self.state.lock().unwrap().schedules.clone())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record_api_call(&self, description: &str, url: &str) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .api_calls
            .push((description.to_string(), url.to_string()));
        Ok(())
    }
}
