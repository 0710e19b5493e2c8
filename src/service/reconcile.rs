//! Maps provider payloads onto exactly one local row each.

use crate::model::matches::{Match, MatchStatus, NewMatch};
use crate::model::payload::{FixturePayload, TeamPayload};
use crate::model::response::ItemFailure;
use crate::model::team::{NewTeam, Team, TeamDisplay};
use crate::repository::{SlugScope, StoreResult, SyncStore};
use crate::service::normalize::{kickoff_in_zone, slug_probe, team_slug_candidate};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

const UNKNOWN_STADIUM: &str = "Unknown Stadium";

#[derive(Debug, Clone, PartialEq)]
pub enum TeamOutcome {
    Created(Team),
    Updated(Team),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixtureOutcome {
    Created(Match),
    Updated(Match),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingIds,
    UnknownTeam(String),
    UnknownLeague(String),
}

/// Tally of one reconciliation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn stored(&self) -> usize {
        self.created + self.updated
    }

    pub fn error_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(
            self.failures
                .iter()
                .map(|f| match &f.external_id {
                    Some(id) => format!("{id}: {}", f.error),
                    None => f.error.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

pub struct Reconciler {
    store: Arc<dyn SyncStore>,
    timezone: Tz,
}

impl Reconciler {
    pub fn new(store: Arc<dyn SyncStore>, timezone: Tz) -> Self {
        Reconciler { store, timezone }
    }

    pub async fn reconcile_team(
        &self,
        payload: &TeamPayload,
        now: DateTime<Utc>,
    ) -> StoreResult<TeamOutcome> {
        let external_id = match payload.id {
            Some(id) => id.to_string(),
            None => return Ok(TeamOutcome::Skipped(SkipReason::MissingIds)),
        };

        if self
            .store
            .find_team_by_external_id(&external_id)
            .await?
            .is_some()
        {
            let changes = TeamDisplay {
                name: Some(payload.name.clone()).filter(|name| !name.is_empty()),
                label: payload.code.clone(),
                country: payload.country.clone(),
                logo: payload.logo.clone(),
                updated_at: Some(now),
            };
            let team = self
                .store
                .update_team_display(&external_id, changes)
                .await?;
            return Ok(TeamOutcome::Updated(team));
        }

        let slug = self
            .free_slug(&team_slug_candidate(&payload.name, &external_id))
            .await?;
        let label = payload.code.clone().unwrap_or_else(|| {
            payload
                .name
                .chars()
                .take(6)
                .collect::<String>()
                .to_uppercase()
        });
        let team = self
            .store
            .insert_team(NewTeam {
                external_team_id: Some(external_id),
                name: payload.name.clone(),
                slug,
                label,
                country: payload
                    .country
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                logo: payload.logo.clone().unwrap_or_default(),
                created_at: now,
                updated_at: now,
            })
            .await?;
        Ok(TeamOutcome::Created(team))
    }

    async fn free_slug(&self, base: &str) -> StoreResult<String> {
        let mut attempt = 0;
        loop {
            let candidate = slug_probe(base, attempt);
            if !self.store.slug_exists(SlugScope::Team, &candidate).await? {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }

    /// Reconciles teams one after another. A failing item is recorded and
    /// the batch carries on.
    pub async fn reconcile_teams(&self, payloads: &[TeamPayload], now: DateTime<Utc>) -> BatchReport {
        let mut report = BatchReport::default();
        for payload in payloads {
            match self.reconcile_team(payload, now).await {
                Ok(TeamOutcome::Created(_)) => report.created += 1,
                Ok(TeamOutcome::Updated(_)) => report.updated += 1,
                Ok(TeamOutcome::Skipped(reason)) => {
                    debug!("skipping team {:?}: {:?}", payload.name, reason);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("could not store team {:?}: {e}", payload.name);
                    report.failures.push(ItemFailure {
                        external_id: payload.id.map(|id| id.to_string()),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// `known_leagues` caches leagues already confirmed during the batch.
    pub async fn reconcile_fixture(
        &self,
        payload: &FixturePayload,
        known_leagues: &mut HashSet<String>,
        now: DateTime<Utc>,
    ) -> StoreResult<FixtureOutcome> {
        let (match_id, home_id, away_id, league_id) = match (
            payload.fixture.id,
            payload.teams.home.id,
            payload.teams.away.id,
            payload.league.id,
        ) {
            (Some(m), Some(h), Some(a), Some(l)) => {
                (m.to_string(), h.to_string(), a.to_string(), l.to_string())
            }
            _ => return Ok(FixtureOutcome::Skipped(SkipReason::MissingIds)),
        };

        for team_id in [&home_id, &away_id] {
            if self.store.find_team_by_external_id(team_id).await?.is_none() {
                return Ok(FixtureOutcome::Skipped(SkipReason::UnknownTeam(
                    team_id.clone(),
                )));
            }
        }

        if !known_leagues.contains(&league_id) {
            if self.store.find_league(&league_id).await?.is_none() {
                return Ok(FixtureOutcome::Skipped(SkipReason::UnknownLeague(league_id)));
            }
            known_leagues.insert(league_id.clone());
        }

        let row = fixture_row(payload, match_id, home_id, away_id, league_id, self.timezone, now);
        let upsert = self.store.upsert_match(row).await?;
        Ok(if upsert.created {
            FixtureOutcome::Created(upsert.row)
        } else {
            FixtureOutcome::Updated(upsert.row)
        })
    }

    pub async fn reconcile_fixtures(
        &self,
        payloads: &[FixturePayload],
        now: DateTime<Utc>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut known_leagues = HashSet::new();
        for payload in payloads {
            match self.reconcile_fixture(payload, &mut known_leagues, now).await {
                Ok(FixtureOutcome::Created(_)) => report.created += 1,
                Ok(FixtureOutcome::Updated(_)) => report.updated += 1,
                Ok(FixtureOutcome::Skipped(reason)) => {
                    debug!("skipping fixture {:?}: {:?}", payload.fixture.id, reason);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("could not store fixture {:?}: {e}", payload.fixture.id);
                    report.failures.push(ItemFailure {
                        external_id: payload.fixture.id.map(|id| id.to_string()),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Canonical match row for a fixture whose four ids are known.
fn fixture_row(
    payload: &FixturePayload,
    external_match_id: String,
    home_team: String,
    away_team: String,
    league_id: String,
    tz: Tz,
    now: DateTime<Utc>,
) -> NewMatch {
    let today = now.with_timezone(&tz).date_naive();
    let (match_date, match_time) = kickoff_in_zone(payload.fixture.date.as_deref(), tz, today);
    let status_code = payload.fixture.status.short.clone();
    let venue = &payload.fixture.venue;
    let goals = payload.goals;

    NewMatch {
        external_match_id,
        home_team,
        away_team,
        league_id,
        status: MatchStatus::from_short_code(status_code.as_deref())
            .as_str()
            .to_string(),
        status_code,
        match_current_time: payload.fixture.status.elapsed,
        home_team_score: goals.home.unwrap_or(0),
        away_team_score: goals.away.unwrap_or(0),
        actual_home_score: goals.home,
        actual_away_score: goals.away,
        half_time_home_score: payload.score.halftime.home,
        half_time_away_score: payload.score.halftime.away,
        full_time_home_score: payload.score.fulltime.home,
        full_time_away_score: payload.score.fulltime.away,
        match_date,
        match_time,
        stadium: venue
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN_STADIUM.to_string()),
        stadium_city: venue.city.clone(),
        stadium_country: venue.country.clone(),
        round: payload.league.round.clone(),
        updated_at: now,
    }
}
