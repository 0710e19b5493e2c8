//! League refresh: metadata upsert, then teams, then fixtures.

use crate::model::league::{League, LeagueMetadataChangeset, LeagueStatus, NewLeague};
use crate::model::payload::{LeagueEnvelope, TeamPayload};
use crate::model::response::{PhaseCounts, PhaseErrors, RefreshSummary};
use crate::repository::{SlugScope, StoreError, SyncStore};
use crate::service::api_client::{FootballApi, LeagueLookup};
use crate::service::normalize::{slug_probe, slugify};
use crate::service::reconcile::Reconciler;
use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use log::{error, info, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("league {league_id} was refreshed recently, next refresh allowed at {next_allowed}")]
    CooldownActive {
        league_id: String,
        next_allowed: DateTime<Tz>,
    },
    #[error("league {league_id} does not exist in the external source: {reason}")]
    LeagueNotFound { league_id: String, reason: String },
    #[error("league {0} already exists")]
    AlreadyExists(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct LeagueRefresher {
    store: Arc<dyn SyncStore>,
    api: Arc<dyn FootballApi>,
    reconciler: Reconciler,
    timezone: Tz,
    cooldown: Duration,
}

impl LeagueRefresher {
    pub fn new(
        store: Arc<dyn SyncStore>,
        api: Arc<dyn FootballApi>,
        timezone: Tz,
        cooldown: Duration,
    ) -> Self {
        LeagueRefresher {
            reconciler: Reconciler::new(store.clone(), timezone),
            store,
            api,
            timezone,
            cooldown,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn api(&self) -> &Arc<dyn FootballApi> {
        &self.api
    }

    /// Season used when a caller gives none: the current civil year.
    pub fn current_season(&self, now: DateTime<Utc>) -> i32 {
        now.with_timezone(&self.timezone).year()
    }

    pub async fn refresh_league(
        &self,
        league_id: &str,
        season: i32,
    ) -> Result<RefreshSummary, RefreshError> {
        self.refresh_league_at(league_id, season, Utc::now()).await
    }

    /// Claims the cooldown window in the store before any provider call.
    pub async fn refresh_league_at(
        &self,
        league_id: &str,
        season: i32,
        now: DateTime<Utc>,
    ) -> Result<RefreshSummary, RefreshError> {
        let existing = match self.store.claim_refresh(league_id, now, self.cooldown).await? {
            Some(league) => Some(league),
            None => match self.store.find_league(league_id).await? {
                Some(league) => return Err(self.cooling_down(league_id, league.updated_at, now)),
                None => None,
            },
        };

        let metadata = self.lookup(league_id).await?;
        let stored = self
            .upsert_league(league_id, season, &metadata, existing, LeagueStatus::Inactive, now)
            .await?;
        if stored.is_none() {
            // Another refresh registered the league first.
            let updated_at = self
                .store
                .find_league(league_id)
                .await?
                .and_then(|league| league.updated_at);
            return Err(self.cooling_down(league_id, updated_at, now));
        }
        Ok(self.sync_contents(league_id, season, now).await)
    }

    pub async fn add_league(
        &self,
        league_id: &str,
        status: LeagueStatus,
        season: i32,
    ) -> Result<(League, RefreshSummary), RefreshError> {
        self.add_league_at(league_id, status, season, Utc::now()).await
    }

    pub async fn add_league_at(
        &self,
        league_id: &str,
        status: LeagueStatus,
        season: i32,
        now: DateTime<Utc>,
    ) -> Result<(League, RefreshSummary), RefreshError> {
        if self.store.find_league(league_id).await?.is_some() {
            return Err(RefreshError::AlreadyExists(league_id.to_string()));
        }
        let metadata = self.lookup(league_id).await?;
        let league = self
            .upsert_league(league_id, season, &metadata, None, status, now)
            .await?
            .ok_or_else(|| RefreshError::AlreadyExists(league_id.to_string()))?;
        let summary = self.sync_contents(league_id, season, now).await;
        Ok((league, summary))
    }

    fn cooling_down(
        &self,
        league_id: &str,
        updated_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> RefreshError {
        let next_allowed = (updated_at.unwrap_or(now) + self.cooldown).with_timezone(&self.timezone);
        info!("refresh of league {league_id} rejected until {next_allowed}");
        RefreshError::CooldownActive {
            league_id: league_id.to_string(),
            next_allowed,
        }
    }

    async fn lookup(&self, league_id: &str) -> Result<LeagueEnvelope, RefreshError> {
        match self.api.fetch_league(league_id).await {
            LeagueLookup::Found(metadata) => Ok(metadata),
            LeagueLookup::NotFound { reason } => {
                warn!("league {league_id} not found upstream: {reason}");
                Err(RefreshError::LeagueNotFound {
                    league_id: league_id.to_string(),
                    reason,
                })
            }
        }
    }

    async fn upsert_league(
        &self,
        league_id: &str,
        season: i32,
        metadata: &LeagueEnvelope,
        existing: Option<League>,
        status_if_new: LeagueStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<League>, StoreError> {
        let name = if metadata.league.name.is_empty() {
            format!("League {league_id}")
        } else {
            metadata.league.name.clone()
        };
        let country = metadata
            .country
            .name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let logo = metadata.league.logo.clone().unwrap_or_default();

        let mut base = slugify(&name);
        if base.is_empty() {
            base = format!("league-{league_id}");
        }
        let current_slug = existing.as_ref().map(|league| league.slug.as_str());
        let slug = self.free_league_slug(&base, current_slug).await?;

        match existing {
            Some(_) => {
                self.store
                    .update_league_metadata(
                        league_id,
                        LeagueMetadataChangeset {
                            name,
                            slug,
                            country,
                            logo,
                            updated_at: Some(now),
                        },
                    )
                    .await
                    .map(Some)
            }
            None => {
                info!("registering league {league_id} ({name})");
                self.store
                    .insert_league_if_absent(NewLeague {
                        external_league_id: league_id.to_string(),
                        name,
                        slug,
                        country,
                        logo,
                        status: status_if_new.as_str().to_string(),
                        season,
                        created_at: now,
                        updated_at: Some(now),
                    })
                    .await
            }
        }
    }

    /// The league's own slug never counts as a collision.
    async fn free_league_slug(&self, base: &str, current: Option<&str>) -> Result<String, StoreError> {
        let mut attempt = 0;
        loop {
            let candidate = slug_probe(base, attempt);
            if current == Some(candidate.as_str())
                || !self.store.slug_exists(SlugScope::League, &candidate).await?
            {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }

    async fn sync_contents(&self, league_id: &str, season: i32, now: DateTime<Utc>) -> RefreshSummary {
        let (teams, fixtures) = tokio::join!(
            self.api.fetch_teams(league_id, season),
            self.api.fetch_fixtures(league_id, season)
        );

        let team_payloads: Vec<TeamPayload> = teams.into_iter().map(|t| t.team).collect();
        let team_report = self.reconciler.reconcile_teams(&team_payloads, now).await;

        match self.store.delete_orphaned_matches().await {
            Ok(0) => {}
            Ok(deleted) => info!("deleted {deleted} orphaned matches"),
            Err(e) => error!("could not prune orphaned matches: {e}"),
        }

        let fixture_report = self.reconciler.reconcile_fixtures(&fixtures, now).await;

        info!(
            "refreshed league {league_id}/{season}: {} teams, {} matches, {} fixtures skipped",
            team_report.stored(),
            fixture_report.stored(),
            fixture_report.skipped
        );

        RefreshSummary {
            league_id: league_id.to_string(),
            season,
            counts: PhaseCounts {
                teams: team_report.stored(),
                matches: fixture_report.stored(),
            },
            errors: PhaseErrors {
                teams: team_report.error_summary(),
                matches: fixture_report.error_summary(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryStore;
    use crate::service::testing::{fixture, league_envelope, league_row, team, ScriptedApi};
    use chrono::TimeZone;

    fn premier_league() -> ScriptedApi {
        ScriptedApi::default()
            .with_league(league_envelope(39, "Premier League"))
            .with_teams("39", vec![team(1, "Team A"), team(2, "Team B")])
            .with_fixtures("39", vec![fixture(1035037, 1, 2, 39)])
    }

    fn slow_premier_league() -> ScriptedApi {
        premier_league().with_league_delay(std::time::Duration::from_millis(50))
    }

    fn refresher(store: Arc<MemoryStore>, api: Arc<ScriptedApi>) -> LeagueRefresher {
        LeagueRefresher::new(store, api, chrono_tz::Europe::Warsaw, Duration::minutes(15))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_new_league() {
        let store = Arc::new(MemoryStore::new());
        let refresher = refresher(store.clone(), Arc::new(premier_league()));

        let summary = refresher.refresh_league_at("39", 2025, t0()).await.unwrap();

        assert_eq!(summary.league_id, "39");
        assert_eq!(summary.season, 2025);
        assert_eq!(summary.counts, PhaseCounts { teams: 2, matches: 1 });
        assert_eq!(summary.errors, PhaseErrors::default());

        let leagues = store.leagues();
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].status, "inactive");
        assert_eq!(leagues[0].slug, "premier-league");
        assert_eq!(leagues[0].updated_at, Some(t0()));
        assert_eq!(store.teams().len(), 2);

        let stored = store.fixture("1035037").unwrap();
        assert_eq!(stored.home_team, "1");
        assert_eq!(stored.away_team, "2");
        assert_eq!(stored.status, "scheduled");
        assert_eq!(stored.status_code.as_deref(), Some("NS"));
    }

    #[tokio::test]
    async fn test_cooldown_blocks_until_fifteen_minutes_pass() {
        let store = Arc::new(MemoryStore::new());
        let refresher = refresher(store.clone(), Arc::new(premier_league()));
        refresher.refresh_league_at("39", 2025, t0()).await.unwrap();

        let err = refresher
            .refresh_league_at("39", 2025, t0() + Duration::minutes(5))
            .await
            .unwrap_err();
        match err {
            RefreshError::CooldownActive { next_allowed, .. } => {
                assert_eq!(next_allowed, t0() + Duration::minutes(15));
                assert_eq!(next_allowed.timezone(), chrono_tz::Europe::Warsaw);
            }
            other => panic!("expected cooldown, got {other:?}"),
        }

        let summary = refresher
            .refresh_league_at("39", 2025, t0() + Duration::minutes(15))
            .await
            .unwrap();
        assert_eq!(summary.counts, PhaseCounts { teams: 2, matches: 1 });
        assert_eq!(store.teams().len(), 2);
        assert_eq!(store.matches().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_league_leaves_store_untouched() {
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(ScriptedApi::default().with_teams("40", vec![team(1, "Team A")]));
        let refresher = refresher(store.clone(), api.clone());

        let err = refresher.refresh_league_at("40", 2025, t0()).await.unwrap_err();

        assert!(matches!(err, RefreshError::LeagueNotFound { .. }));
        assert!(store.leagues().is_empty());
        assert!(store.teams().is_empty());
        assert_eq!(api.calls(), vec!["league 40".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_keeps_own_slug_and_status() {
        let store = Arc::new(MemoryStore::new());
        let mut existing = league_row("39");
        existing.slug = "premier-league".to_string();
        store.seed_league(existing);
        let refresher = refresher(store.clone(), Arc::new(premier_league()));

        refresher.refresh_league_at("39", 2025, t0()).await.unwrap();

        let league = store.leagues().remove(0);
        assert_eq!(league.slug, "premier-league");
        assert_eq!(league.status, "active");
        assert_eq!(league.name, "Premier League");
    }

    #[tokio::test]
    async fn test_teams_phase_failure_does_not_stop_fixtures() {
        let store = Arc::new(MemoryStore::new());
        store.seed_team("2", "Team B", "team-b");
        store.fail_team("2");
        let refresher = refresher(store.clone(), Arc::new(premier_league()));

        let summary = refresher.refresh_league_at("39", 2025, t0()).await.unwrap();

        assert_eq!(summary.counts, PhaseCounts { teams: 1, matches: 1 });
        assert!(summary.errors.teams.unwrap().starts_with("2: "));
        assert!(summary.errors.matches.is_none());
        assert!(store.fixture("1035037").is_some());
    }

    #[tokio::test]
    async fn test_add_league_rejects_existing() {
        let store = Arc::new(MemoryStore::new());
        store.seed_league(league_row("39"));
        let refresher = refresher(store.clone(), Arc::new(premier_league()));

        let err = refresher
            .add_league_at("39", LeagueStatus::Active, 2025, t0())
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_add_league_uses_requested_status() {
        let store = Arc::new(MemoryStore::new());
        let refresher = refresher(store.clone(), Arc::new(premier_league()));

        let (league, summary) = refresher
            .add_league_at("39", LeagueStatus::Active, 2025, t0())
            .await
            .unwrap();

        assert_eq!(league.status, "active");
        assert_eq!(league.season, 2025);
        assert_eq!(summary.counts, PhaseCounts { teams: 2, matches: 1 });
    }

    fn count_calls(api: &ScriptedApi, prefix: &str) -> usize {
        api.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_of_stored_league_run_once() {
        let store = Arc::new(MemoryStore::new());
        let mut stale = league_row("39");
        stale.updated_at = Some(t0() - Duration::hours(1));
        store.seed_league(stale);
        let api = Arc::new(slow_premier_league());
        let refresher = refresher(store.clone(), api.clone());

        let (a, b) = tokio::join!(
            refresher.refresh_league_at("39", 2025, t0()),
            refresher.refresh_league_at("39", 2025, t0())
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        match rejected {
            RefreshError::CooldownActive { next_allowed, .. } => {
                assert_eq!(*next_allowed, t0() + Duration::minutes(15));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert_eq!(count_calls(&api, "league"), 1);
        assert_eq!(count_calls(&api, "teams"), 1);
        assert_eq!(count_calls(&api, "fixtures"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registration_of_new_league_runs_once() {
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(slow_premier_league());
        let refresher = refresher(store.clone(), api.clone());

        let (a, b) = tokio::join!(
            refresher.refresh_league_at("39", 2025, t0()),
            refresher.refresh_league_at("39", 2025, t0())
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(RefreshError::CooldownActive { .. }))));
        assert_eq!(store.leagues().len(), 1);
        assert_eq!(count_calls(&api, "teams"), 1);
        assert_eq!(count_calls(&api, "fixtures"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_add_league_reports_conflict() {
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(slow_premier_league());
        let refresher = refresher(store.clone(), api);

        let (a, b) = tokio::join!(
            refresher.add_league_at("39", LeagueStatus::Active, 2025, t0()),
            refresher.add_league_at("39", LeagueStatus::Active, 2025, t0())
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(RefreshError::AlreadyExists(_)))));
        assert_eq!(store.leagues().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_prunes_orphaned_matches() {
        let store = Arc::new(MemoryStore::new());
        store.seed_league(league_row("39"));
        store.seed_team("1", "Team A", "team-a");
        store.seed_team("2", "Team B", "team-b");
        store.seed_team("3", "Team C", "team-c");
        let reconciler = Reconciler::new(store.clone(), chrono_tz::Europe::Warsaw);
        reconciler
            .reconcile_fixtures(&[fixture(2000, 1, 3, 39), fixture(2001, 1, 2, 39)], t0())
            .await;
        // Team 3 disappears, and a match of an unregistered league slips in.
        store.remove_team("3");
        store.seed_league(league_row("140"));
        store.seed_team("4", "Team D", "team-d");
        reconciler
            .reconcile_fixtures(&[fixture(2002, 1, 4, 140)], t0())
            .await;
        store.remove_league("140");
        assert_eq!(store.matches().len(), 3);

        let refresher = refresher(store.clone(), Arc::new(premier_league()));
        refresher.refresh_league_at("39", 2025, t0()).await.unwrap();

        assert!(store.fixture("2000").is_none());
        assert!(store.fixture("2002").is_none());
        assert!(store.fixture("2001").is_some());
        assert!(store.fixture("1035037").is_some());
        assert_eq!(store.matches().len(), 2);
    }

    #[test]
    fn test_current_season_is_civil_year() {
        let store = Arc::new(MemoryStore::new());
        let refresher = refresher(store, Arc::new(ScriptedApi::default()));
        // New Year's Eve 23:30 UTC is already January 1st in Warsaw.
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(refresher.current_season(now), 2025);
    }
}
