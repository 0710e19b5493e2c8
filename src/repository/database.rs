use crate::config::config::Config;
use crate::model::api_log::{ApiLog, NewApiLog};
use crate::model::bet::{Bet, NewBet};
use crate::model::league::{League, LeagueChangeset, LeagueMetadataChangeset, NewLeague};
use crate::model::matches::{Match, MatchUpsert, NewMatch};
use crate::model::schema::{api_football_logs, bets, leagues, matches, teams, tournaments, users};
use crate::model::team::{NewTeam, Team, TeamDisplay};
use crate::model::tournament::{NewTournamentSchema, Tournament, TournamentSchedule};
use crate::model::user::{AccountState, NewUser, User};
use crate::repository::{AuditLog, SlugScope, StoreResult, SyncStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deadpool::managed::Object;
use diesel::dsl::exists;
use diesel::upsert::excluded;
use diesel::{
    BoolExpressionMethods, ConnectionError, ConnectionResult, ExpressionMethods, OptionalExtension,
    QueryDsl,
};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
};
use log::error;
use openssl::ssl::{SslConnector, SslMethod};
use postgres_openssl::MakeTlsConnector;

pub type DBPool = deadpool::managed::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;
type DBConn = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

const ORPHANED_MATCHES_SQL: &str = "DELETE FROM matches m \
    WHERE NOT EXISTS (SELECT 1 FROM teams t WHERE t.external_team_id = m.home_team) \
       OR NOT EXISTS (SELECT 1 FROM teams t WHERE t.external_team_id = m.away_team) \
       OR NOT EXISTS (SELECT 1 FROM leagues l WHERE l.external_league_id = m.league_id)";

#[derive(Clone)]
pub struct Database {
    pool: DBPool,
}

impl Database {
    pub fn new(config: &Config) -> Self {
        let manager = match config.db_ca_file.clone() {
            Some(ca_file) => AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_setup(
                config.database_url.clone(),
                move |url| Box::pin(Self::establish_tls(url.to_owned(), ca_file.clone())),
            ),
            None => {
                AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.clone())
            }
        };
        let pool = Pool::builder(manager)
            .build()
            .expect("Failed to create pool.");
        Database { pool }
    }

    async fn establish_tls(
        database_url: String,
        ca_file: String,
    ) -> ConnectionResult<AsyncPgConnection> {
        let mut builder = SslConnector::builder(SslMethod::tls())
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
        builder
            .set_ca_file(&ca_file)
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
        let connector = MakeTlsConnector::new(builder.build());
        let (client, connection) = tokio_postgres::connect(&database_url, connector)
            .await
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("postgres connection error: {e}");
            }
        });
        AsyncPgConnection::try_from(client).await
    }

    async fn get_db_conn(&self) -> StoreResult<DBConn> {
        Ok(self.pool.get().await?)
    }

    pub async fn list_leagues(&self) -> StoreResult<Vec<League>> {
        let mut conn = self.get_db_conn().await?;
        let rows = leagues::table
            .order(leagues::created_at.desc())
            .load::<League>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn update_league(
        &self,
        external_league_id: &str,
        changes: LeagueChangeset,
    ) -> StoreResult<Option<League>> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::update(
            leagues::table.filter(leagues::external_league_id.eq(external_league_id)),
        )
        .set(&changes)
        .get_result::<League>(&mut conn)
        .await
        .optional()?;
        Ok(row)
    }

    pub async fn list_api_logs(&self, limit: i64) -> StoreResult<Vec<ApiLog>> {
        let mut conn = self.get_db_conn().await?;
        let rows = api_football_logs::table
            .order(api_football_logs::created_at.desc())
            .limit(limit)
            .load::<ApiLog>(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn find_match_by_external_id(
        &self,
        external_match_id: &str,
    ) -> StoreResult<Option<Match>> {
        let mut conn = self.get_db_conn().await?;
        let row = matches::table
            .filter(matches::external_match_id.eq(external_match_id))
            .first::<Match>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    pub async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        let mut conn = self.get_db_conn().await?;
        let row = users::table
            .filter(users::id.eq(user_id))
            .first::<User>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    pub async fn find_user_by_id_or_email(
        &self,
        user_id: &str,
        user_email: &str,
    ) -> StoreResult<Option<User>> {
        let mut conn = self.get_db_conn().await?;
        let row = users::table
            .filter(users::id.eq(user_id).or(users::email.eq(user_email)))
            .first::<User>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    pub async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::insert_into(users::table)
            .values(&user)
            .get_result::<User>(&mut conn)
            .await?;
        Ok(row)
    }

    pub async fn confirm_account(&self, token: &str) -> StoreResult<Option<User>> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::update(
            users::table
                .filter(users::confirm_email_token.eq(token))
                .filter(users::state.eq(AccountState::ToConfirm.as_str())),
        )
        .set((
            users::state.eq(AccountState::Active.as_str()),
            users::confirm_email_token.eq(None::<String>),
            users::updated_at.eq(Utc::now()),
        ))
        .get_result::<User>(&mut conn)
        .await
        .optional()?;
        Ok(row)
    }

    pub async fn set_reset_token(
        &self,
        user_email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::update(users::table.filter(users::email.eq(user_email)))
            .set((
                users::reset_password_token.eq(token),
                users::reset_password_expires_at.eq(expires_at),
                users::updated_at.eq(Utc::now()),
            ))
            .get_result::<User>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::update(
            users::table
                .filter(users::reset_password_token.eq(token))
                .filter(users::reset_password_expires_at.gt(now)),
        )
        .set((
            users::password.eq(password_hash),
            users::reset_password_token.eq(None::<String>),
            users::reset_password_expires_at.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(now),
        ))
        .get_result::<User>(&mut conn)
        .await
        .optional()?;
        Ok(row)
    }

    pub async fn tournament_slug_exists(&self, tournament_slug: &str) -> StoreResult<bool> {
        let mut conn = self.get_db_conn().await?;
        let taken = diesel::select(exists(
            tournaments::table.filter(tournaments::slug.eq(tournament_slug)),
        ))
        .get_result::<bool>(&mut conn)
        .await?;
        Ok(taken)
    }

    pub async fn insert_tournament(&self, tournament: NewTournamentSchema) -> StoreResult<Tournament> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::insert_into(tournaments::table)
            .values(&tournament)
            .get_result::<Tournament>(&mut conn)
            .await?;
        Ok(row)
    }

    pub async fn list_tournaments(&self, status: Option<&str>) -> StoreResult<Vec<Tournament>> {
        let mut conn = self.get_db_conn().await?;
        let mut query = tournaments::table
            .order(tournaments::start_date.desc())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(tournaments::status.eq(status));
        }
        let rows = query.load::<Tournament>(&mut conn).await?;
        Ok(rows)
    }

    pub async fn upsert_bet(&self, bet: NewBet) -> StoreResult<Bet> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::insert_into(bets::table)
            .values(&bet)
            .on_conflict((bets::match_id, bets::user_id))
            .do_update()
            .set((
                bets::home_bet.eq(excluded(bets::home_bet)),
                bets::away_bet.eq(excluded(bets::away_bet)),
                bets::updated_at.eq(excluded(bets::updated_at)),
            ))
            .get_result::<Bet>(&mut conn)
            .await?;
        Ok(row)
    }

    pub async fn list_bets_for_user(&self, user_id: &str) -> StoreResult<Vec<Bet>> {
        let mut conn = self.get_db_conn().await?;
        let rows = bets::table
            .filter(bets::user_id.eq(user_id))
            .order(bets::created_at.desc())
            .load::<Bet>(&mut conn)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl SyncStore for Database {
    async fn find_league(&self, external_league_id: &str) -> StoreResult<Option<League>> {
        let mut conn = self.get_db_conn().await?;
        let row = leagues::table
            .filter(leagues::external_league_id.eq(external_league_id))
            .first::<League>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    async fn claim_refresh(
        &self,
        external_league_id: &str,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> StoreResult<Option<League>> {
        let mut conn = self.get_db_conn().await?;
        let cutoff = now - cooldown;
        let row = diesel::update(
            leagues::table
                .filter(leagues::external_league_id.eq(external_league_id))
                .filter(leagues::updated_at.is_null().or(leagues::updated_at.le(cutoff))),
        )
        .set(leagues::updated_at.eq(Some(now)))
        .get_result::<League>(&mut conn)
        .await
        .optional()?;
        Ok(row)
    }

    async fn insert_league_if_absent(&self, league: NewLeague) -> StoreResult<Option<League>> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::insert_into(leagues::table)
            .values(&league)
            .on_conflict(leagues::external_league_id)
            .do_nothing()
            .get_result::<League>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    async fn update_league_metadata(
        &self,
        external_league_id: &str,
        changes: LeagueMetadataChangeset,
    ) -> StoreResult<League> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::update(
            leagues::table.filter(leagues::external_league_id.eq(external_league_id)),
        )
        .set(&changes)
        .get_result::<League>(&mut conn)
        .await?;
        Ok(row)
    }

    async fn slug_exists(&self, scope: SlugScope, slug: &str) -> StoreResult<bool> {
        let mut conn = self.get_db_conn().await?;
        let taken = match scope {
            SlugScope::League => {
                diesel::select(exists(leagues::table.filter(leagues::slug.eq(slug))))
                    .get_result::<bool>(&mut conn)
                    .await?
            }
            SlugScope::Team => {
                diesel::select(exists(teams::table.filter(teams::slug.eq(slug))))
                    .get_result::<bool>(&mut conn)
                    .await?
            }
        };
        Ok(taken)
    }

    async fn find_team_by_external_id(
        &self,
        external_team_id: &str,
    ) -> StoreResult<Option<Team>> {
        let mut conn = self.get_db_conn().await?;
        let row = teams::table
            .filter(teams::external_team_id.eq(external_team_id))
            .first::<Team>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    async fn insert_team(&self, team: NewTeam) -> StoreResult<Team> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::insert_into(teams::table)
            .values(&team)
            .on_conflict(teams::external_team_id)
            .do_update()
            .set((
                teams::name.eq(excluded(teams::name)),
                teams::label.eq(excluded(teams::label)),
                teams::country.eq(excluded(teams::country)),
                teams::logo.eq(excluded(teams::logo)),
                teams::updated_at.eq(excluded(teams::updated_at)),
            ))
            .get_result::<Team>(&mut conn)
            .await?;
        Ok(row)
    }

    async fn update_team_display(
        &self,
        external_team_id: &str,
        changes: TeamDisplay,
    ) -> StoreResult<Team> {
        let mut conn = self.get_db_conn().await?;
        let row = diesel::update(teams::table.filter(teams::external_team_id.eq(external_team_id)))
            .set(&changes)
            .get_result::<Team>(&mut conn)
            .await?;
        Ok(row)
    }

    async fn upsert_match(&self, fixture: NewMatch) -> StoreResult<MatchUpsert> {
        let mut conn = self.get_db_conn().await?;
        conn.transaction::<_, crate::repository::StoreError, _>(|conn| {
            async move {
                let existing = matches::table
                    .filter(matches::external_match_id.eq(&fixture.external_match_id))
                    .select(matches::id)
                    .for_update()
                    .first::<i32>(conn)
                    .await
                    .optional()?;

                match existing {
                    Some(match_pk) => {
                        let row = diesel::update(matches::table.find(match_pk))
                            .set(&fixture)
                            .get_result::<Match>(conn)
                            .await?;
                        Ok(MatchUpsert {
                            row,
                            created: false,
                        })
                    }
                    None => {
                        let row = diesel::insert_into(matches::table)
                            .values(&fixture)
                            .get_result::<Match>(conn)
                            .await?;
                        Ok(MatchUpsert { row, created: true })
                    }
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_orphaned_matches(&self) -> StoreResult<usize> {
        let mut conn = self.get_db_conn().await?;
        let deleted = diesel::sql_query(ORPHANED_MATCHES_SQL)
            .execute(&mut conn)
            .await?;
        Ok(deleted)
    }

    async fn tournament_schedules(&self) -> StoreResult<Vec<TournamentSchedule>> {
        let mut conn = self.get_db_conn().await?;
        let rows = tournaments::table
            .select((tournaments::league_id, tournaments::update_times))
            .load::<TournamentSchedule>(&mut conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter(|schedule| !schedule.update_times.is_empty())
            .collect())
    }
}

#[async_trait]
impl AuditLog for Database {
    async fn record_api_call(&self, description: &str, url: &str) -> StoreResult<()> {
        let mut conn = self.get_db_conn().await?;
        diesel::insert_into(api_football_logs::table)
            .values(&NewApiLog { description, url })
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
