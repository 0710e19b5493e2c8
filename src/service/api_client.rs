use crate::config::config::Config;
use crate::model::payload::{ApiEnvelope, FixturePayload, LeagueEnvelope, TeamEnvelope};
use crate::repository::AuditLog;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("could not build request for {path}: {source}")]
    Request {
        path: String,
        source: reqwest::Error,
    },
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
    #[error("provider reported errors for {url}: {message}")]
    Provider { url: String, message: String },
}

/// Result of a league metadata lookup.
#[derive(Debug, Clone)]
pub enum LeagueLookup {
    Found(LeagueEnvelope),
    NotFound { reason: String },
}

/// Outbound calls to the football data provider. Failures never escape: list
/// fetches degrade to an empty list and a failed league lookup reads as
/// not found.
#[async_trait]
pub trait FootballApi: Send + Sync {
    async fn fetch_league(&self, league_id: &str) -> LeagueLookup;

    async fn fetch_teams(&self, league_id: &str, season: i32) -> Vec<TeamEnvelope>;

    async fn fetch_fixtures(&self, league_id: &str, season: i32) -> Vec<FixturePayload>;
}

pub struct ApiFootballClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
    timezone: Tz,
    audit: Arc<dyn AuditLog>,
}

impl ApiFootballClient {
    pub fn new(config: &Config, audit: Arc<dyn AuditLog>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_seconds))
            .build()?;
        Ok(ApiFootballClient {
            client,
            base_url: config.api_football_url.trim_end_matches('/').to_string(),
            api_key: config.api_football_key.clone(),
            api_host: config.api_football_host.clone(),
            timezone: config.timezone,
            audit,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        description: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let request = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(params)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .build()
            .map_err(|source| ApiError::Request {
                path: path.to_string(),
                source,
            })?;
        let url = request.url().to_string();

        if let Err(e) = self.audit.record_api_call(description, &url).await {
            warn!("could not record api call {url}: {e}");
        }
        debug!("{description}: GET {url}");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        let envelope = response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|source| ApiError::Decode {
                url: url.clone(),
                source,
            })?;
        if let Some(message) = envelope.error_message() {
            return Err(ApiError::Provider { url, message });
        }
        Ok(envelope)
    }
}

/// Fixtures are fetched from the civil yesterday onwards.
pub fn fixtures_from_date(tz: Tz, now: chrono::DateTime<Utc>) -> NaiveDate {
    let today = now.with_timezone(&tz).date_naive();
    today - Duration::days(1)
}

#[async_trait]
impl FootballApi for ApiFootballClient {
    async fn fetch_league(&self, league_id: &str) -> LeagueLookup {
        let description = format!("Fetch league {league_id}");
        match self
            .get::<LeagueEnvelope>(&description, "leagues", &[("id", league_id.to_string())])
            .await
        {
            Ok(envelope) => match envelope
                .response
                .into_iter()
                .find(|entry| entry.league.id.map(|id| id.to_string()).as_deref() == Some(league_id))
            {
                Some(league) => LeagueLookup::Found(league),
                None => LeagueLookup::NotFound {
                    reason: format!("league {league_id} is unknown to the provider"),
                },
            },
            Err(e) => {
                error!("{description} failed: {e}");
                LeagueLookup::NotFound {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_teams(&self, league_id: &str, season: i32) -> Vec<TeamEnvelope> {
        let description = format!("Fetch teams for league {league_id}, season {season}");
        let params = [("league", league_id.to_string()), ("season", season.to_string())];
        match self.get::<TeamEnvelope>(&description, "teams", &params).await {
            Ok(envelope) => envelope.response,
            Err(e) => {
                error!("{description} failed: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_fixtures(&self, league_id: &str, season: i32) -> Vec<FixturePayload> {
        let description = format!("Fetch fixtures for league {league_id}, season {season}");
        let from = fixtures_from_date(self.timezone, Utc::now());
        let params = [
            ("league", league_id.to_string()),
            ("season", season.to_string()),
            ("timezone", self.timezone.name().to_string()),
            ("from", from.format("%Y-%m-%d").to_string()),
        ];
        match self
            .get::<FixturePayload>(&description, "fixtures", &params)
            .await
        {
            Ok(envelope) => envelope.response,
            Err(e) => {
                error!("{description} failed: {e}");
                Vec::new()
            }
        }
    }
}
