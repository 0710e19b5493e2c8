use crate::model::league::{League, LeagueMetadataChangeset, NewLeague};
use crate::model::matches::{MatchUpsert, NewMatch};
use crate::model::team::{NewTeam, Team, TeamDisplay};
use crate::model::tournament::TournamentSchedule;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

pub mod database;
#[cfg(test)]
pub mod memory;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not get db connection from pool: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("error executing query: {0}")]
    Query(diesel::result::Error),
    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                info,
            ) => StoreError::Constraint(info.message().to_string()),
            other => StoreError::Query(other),
        }
    }
}

/// Which table a slug has to be unique in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugScope {
    League,
    Team,
}

/// Storage used by the synchronization core. Every method is a single atomic
/// unit against the store.
#[async_trait]
pub trait SyncStore: Send + Sync {
    async fn find_league(&self, external_league_id: &str) -> StoreResult<Option<League>>;

    /// Stamps `updated_at = now` on the league when its last refresh is at
    /// least `cooldown` old, or when it was never refreshed. Returns `None`
    /// when the league is missing or still cooling down.
    async fn claim_refresh(
        &self,
        external_league_id: &str,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> StoreResult<Option<League>>;

    /// Returns `None` when a league with the same external id already exists.
    async fn insert_league_if_absent(&self, league: NewLeague) -> StoreResult<Option<League>>;

    async fn update_league_metadata(
        &self,
        external_league_id: &str,
        changes: LeagueMetadataChangeset,
    ) -> StoreResult<League>;

    async fn slug_exists(&self, scope: SlugScope, slug: &str) -> StoreResult<bool>;

    async fn find_team_by_external_id(&self, external_team_id: &str)
        -> StoreResult<Option<Team>>;

    /// Inserts a team. A concurrent insert of the same external id turns into
    /// a display update of the existing row.
    async fn insert_team(&self, team: NewTeam) -> StoreResult<Team>;

    async fn update_team_display(
        &self,
        external_team_id: &str,
        changes: TeamDisplay,
    ) -> StoreResult<Team>;

    /// Inserts or updates the match with the same external id.
    async fn upsert_match(&self, fixture: NewMatch) -> StoreResult<MatchUpsert>;

    /// Deletes matches whose teams or league no longer exist.
    async fn delete_orphaned_matches(&self) -> StoreResult<usize>;

    async fn tournament_schedules(&self) -> StoreResult<Vec<TournamentSchedule>>;
}

/// Append-only record of calls made to the football data provider.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record_api_call(&self, description: &str, url: &str) -> StoreResult<()>;
}
