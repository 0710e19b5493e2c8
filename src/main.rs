use crate::config::config::Config;
use crate::repository::database::Database;
use crate::service::api_client::ApiFootballClient;
use crate::service::poller::LeaguePoller;
use crate::service::refresh::LeagueRefresher;
use crate::util::real_ip_key_extractor::RealIpKeyExtractor;
use crate::util::send_email::Mailer;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{web, App, HttpResponse, HttpServer, Result};
use log::info;
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;

mod config;
mod controller;
mod model;
mod repository;
mod service;
mod util;

#[derive(Serialize)]
pub struct Response {
    status: String,
    message: String,
}

async fn not_found() -> Result<HttpResponse> {
    let response = Response {
        status: "failed".to_string(),
        message: "Resource not found".to_string(),
    };
    Ok(HttpResponse::NotFound().json(response))
}

pub struct AppState {
    db: Database,
    config: Config,
    refresher: Arc<LeagueRefresher>,
    poller: Arc<LeaguePoller>,
    mailer: Mailer,
    trusted_reverse_proxy_ip: IpAddr,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    log4rs::init_file("./log-config.yml", Default::default()).expect("Log config file not found.");
    let config = Config::init();
    let db = Database::new(&config);
    let store = Arc::new(db.clone());

    let api = ApiFootballClient::new(&config, store.clone()).expect("Failed to build API client.");
    let refresher = Arc::new(LeagueRefresher::new(
        store.clone(),
        Arc::new(api),
        config.timezone,
        chrono::Duration::minutes(config.refresh_cooldown_minutes),
    ));
    let poller = Arc::new(LeaguePoller::new(
        store,
        refresher.clone(),
        config.timezone,
        config.schedule_reset_time,
    ));
    if config.poller_enabled {
        tokio::spawn(poller.clone().run());
    } else {
        info!("league poller disabled");
    }

    let bind_address = (config.server_host.clone(), config.server_port);
    let app_data = web::Data::new(AppState {
        db,
        mailer: Mailer::new(&config),
        trusted_reverse_proxy_ip: config.trusted_proxy_ip,
        config,
        refresher,
        poller,
    });

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(5)
        .key_extractor(RealIpKeyExtractor)
        .finish()
        .expect("Invalid rate limiter configuration.");

    info!("listening on {}:{}", bind_address.0, bind_address.1);
    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(controller::handler::config)
            .default_service(web::route().to(not_found))
            .wrap(actix_web::middleware::Logger::default())
            .wrap(Governor::new(&governor_conf))
    })
    .bind(bind_address)?
    .run()
    .await
}
