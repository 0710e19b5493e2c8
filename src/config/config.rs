use chrono::NaiveTime;
use chrono_tz::Tz;
use dotenv::dotenv;
use rusoto_core::Region;
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_ca_file: Option<String>,
    pub api_football_key: String,
    pub api_football_url: String,
    pub api_football_host: String,
    pub api_timeout_seconds: u64,
    pub timezone: Tz,
    pub refresh_cooldown_minutes: i64,
    pub schedule_reset_time: NaiveTime,
    pub poller_enabled: bool,
    pub server_host: String,
    pub server_port: u16,
    pub trusted_proxy_ip: IpAddr,
    pub ses_region: Region,
    pub mail_sender: String,
    pub frontend_url: String,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn init() -> Config {
        dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let api_football_key =
            std::env::var("API_FOOTBALL_KEY").expect("API_FOOTBALL_KEY must be set");
        let db_ca_file = std::env::var("DB_CA_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty());

        let api_timeout_seconds = var_or("API_TIMEOUT_SECONDS", "10")
            .parse::<u64>()
            .expect("Failed to parse API_TIMEOUT_SECONDS as u64");
        let timezone = Tz::from_str(&var_or("CIVIL_TIMEZONE", "Europe/Warsaw"))
            .expect("CIVIL_TIMEZONE must be an IANA time zone name");
        let refresh_cooldown_minutes = var_or("REFRESH_COOLDOWN_MINUTES", "15")
            .parse::<i64>()
            .expect("Failed to parse REFRESH_COOLDOWN_MINUTES as i64");
        let schedule_reset_time =
            NaiveTime::parse_from_str(&var_or("SCHEDULE_RESET_TIME", "00:01"), "%H:%M")
                .expect("SCHEDULE_RESET_TIME must be HH:MM");
        let poller_enabled = var_or("POLLER_ENABLED", "true")
            .parse::<bool>()
            .expect("Failed to parse POLLER_ENABLED as bool");
        let server_port = var_or("SERVER_PORT", "8080")
            .parse::<u16>()
            .expect("Failed to parse SERVER_PORT as u16");
        let trusted_proxy_ip = IpAddr::from_str(&var_or("TRUSTED_PROXY_IP", "127.0.0.1"))
            .expect("TRUSTED_PROXY_IP must be an IP address");
        let ses_region = Region::from_str(&var_or("SES_REGION", "eu-north-1"))
            .expect("SES_REGION must be an AWS region name");

        Config {
            database_url,
            db_ca_file,
            api_football_key,
            api_football_url: var_or("API_FOOTBALL_URL", "https://v3.football.api-sports.io"),
            api_football_host: var_or("API_FOOTBALL_HOST", "v3.football.api-sports.io"),
            api_timeout_seconds,
            timezone,
            refresh_cooldown_minutes,
            schedule_reset_time,
            poller_enabled,
            server_host: var_or("SERVER_HOST", "127.0.0.1"),
            server_port,
            trusted_proxy_ip,
            ses_region,
            mail_sender: var_or("MAIL_SENDER", "Typer <no-reply@typer.local>"),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:3000"),
        }
    }
}
