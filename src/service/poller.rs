//! Minute-granularity scheduler firing league refreshes at the daily update
//! times configured on tournaments.

use crate::repository::{StoreResult, SyncStore};
use crate::service::normalize::parse_update_time;
use crate::service::refresh::{LeagueRefresher, RefreshError};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub time: String,
    pub league: String,
    #[serde(rename = "updatedToday")]
    pub updated_today: bool,
}

#[derive(Default)]
struct ScheduleState {
    entries: Vec<ScheduleEntry>,
    built_for: Option<NaiveDate>,
}

pub struct LeaguePoller {
    store: Arc<dyn SyncStore>,
    refresher: Arc<LeagueRefresher>,
    timezone: Tz,
    reset_time: NaiveTime,
    state: Mutex<ScheduleState>,
}

impl LeaguePoller {
    pub fn new(
        store: Arc<dyn SyncStore>,
        refresher: Arc<LeagueRefresher>,
        timezone: Tz,
        reset_time: NaiveTime,
    ) -> Self {
        LeaguePoller {
            store,
            refresher,
            timezone,
            reset_time,
            state: Mutex::new(ScheduleState::default()),
        }
    }

    pub async fn rebuild(&self) -> StoreResult<usize> {
        self.rebuild_at(Utc::now()).await
    }

    /// Replaces the schedule with the current tournament configuration and
    /// clears every `updated_today` flag.
    pub async fn rebuild_at(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let schedules = self.store.tournament_schedules().await?;

        let mut unique = BTreeSet::new();
        for schedule in schedules {
            for raw in &schedule.update_times {
                match parse_update_time(raw) {
                    Some(time) => {
                        unique.insert((time, schedule.league_id.clone()));
                    }
                    None => warn!(
                        "ignoring update time {raw:?} configured for league {}",
                        schedule.league_id
                    ),
                }
            }
        }

        let entries: Vec<ScheduleEntry> = unique
            .into_iter()
            .map(|(time, league)| ScheduleEntry {
                time: time.format("%H:%M").to_string(),
                league,
                updated_today: false,
            })
            .collect();
        let count = entries.len();

        let mut state = self.state.lock().await;
        state.entries = entries;
        state.built_for = Some(now.with_timezone(&self.timezone).date_naive());
        info!("league schedule rebuilt with {count} entries");
        Ok(count)
    }

    pub async fn snapshot(&self) -> Vec<ScheduleEntry> {
        self.state.lock().await.entries.clone()
    }

    /// Runs one tick: rebuilds the schedule once per civil day after the reset
    /// time, then spawns a refresh for every entry due at this minute.
    pub async fn tick_at(self: &Arc<Self>, now: DateTime<Utc>) -> Vec<JoinHandle<()>> {
        let local = now.with_timezone(&self.timezone);
        let today = local.date_naive();

        let needs_rebuild = {
            let state = self.state.lock().await;
            state.built_for != Some(today) && local.time() >= self.reset_time
        };
        if needs_rebuild {
            if let Err(e) = self.rebuild_at(now).await {
                error!("could not rebuild league schedule: {e}");
            }
        }

        let minute = local.format("%H:%M").to_string();
        let due: Vec<ScheduleEntry> = {
            let state = self.state.lock().await;
            state
                .entries
                .iter()
                .filter(|entry| entry.time == minute && !entry.updated_today)
                .cloned()
                .collect()
        };

        let season = self.refresher.current_season(now);
        due.into_iter()
            .map(|entry| {
                let poller = Arc::clone(self);
                tokio::spawn(async move {
                    info!("scheduled refresh of league {} at {}", entry.league, entry.time);
                    match poller
                        .refresher
                        .refresh_league_at(&entry.league, season, now)
                        .await
                    {
                        Ok(summary) => {
                            poller.mark_updated(&entry).await;
                            info!(
                                "scheduled refresh of league {} stored {} teams and {} matches",
                                entry.league, summary.counts.teams, summary.counts.matches
                            );
                        }
                        Err(e @ RefreshError::CooldownActive { .. }) => info!("{e}"),
                        Err(e) => error!("scheduled refresh of league {} failed: {e}", entry.league),
                    }
                })
            })
            .collect()
    }

    async fn mark_updated(&self, done: &ScheduleEntry) {
        let mut state = self.state.lock().await;
        if let Some(entry) = state
            .entries
            .iter_mut()
            .find(|entry| entry.time == done.time && entry.league == done.league)
        {
            entry.updated_today = true;
        }
    }

    /// Ticks at every minute boundary until the process exits.
    pub async fn run(self: Arc<Self>) {
        if let Err(e) = self.rebuild().await {
            error!("could not build league schedule: {e}");
        }
        loop {
            let now = Utc::now();
            let into_minute = std::time::Duration::new(
                u64::from(now.second()),
                now.nanosecond() % 1_000_000_000,
            );
            let wait = std::time::Duration::from_secs(60).saturating_sub(into_minute);
            tokio::time::sleep(wait).await;
            self.tick_at(Utc::now()).await;
        }
    }
}
