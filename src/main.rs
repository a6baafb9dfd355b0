mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use crate::db::{db::DBClient, schema::create_tables, userkycdb::UserKycExt};
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    classic_issuance::ClassicIssuanceService,
    contract_issuance::ContractIssuanceService,
    registration::RegistrationService,
    stellar_client::{HorizonRpcClient, StellarNetwork},
    token_verification::TokenVerificationService,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub registration_service: Arc<RegistrationService>,
    pub contract_issuance: Arc<ContractIssuanceService>,
    pub classic_issuance: Arc<ClassicIssuanceService>,
    pub token_verification: Arc<TokenVerificationService>,
}

impl AppState {
    pub fn new(
        config: Config,
        db_client: Arc<dyn UserKycExt>,
        network: Arc<dyn StellarNetwork>,
    ) -> Self {
        let registration_service = Arc::new(RegistrationService::new(db_client));
        let contract_issuance = Arc::new(ContractIssuanceService::new(network.clone(), &config));
        let classic_issuance = Arc::new(ClassicIssuanceService::new(network.clone(), &config));
        let token_verification = Arc::new(TokenVerificationService::new(network));

        Self {
            env: config,
            registration_service,
            contract_issuance,
            classic_issuance,
            token_verification,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("🔥 Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = create_tables(&pool).await {
        tracing::error!("🔥 Failed to create tables: {:?}", err);
        std::process::exit(1);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST]);

    let db_client: Arc<dyn UserKycExt> = Arc::new(DBClient::new(pool));
    let network: Arc<dyn StellarNetwork> = Arc::new(HorizonRpcClient::new(&config));
    tracing::info!(
        "Issuing as {} through contract {}",
        config.issuer.public_key(),
        config.vaccine_contract_id
    );

    let app_state = Arc::new(AppState::new(config.clone(), db_client, network));

    let app = create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("🔥 Failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("🔥 Server error: {}", err);
        std::process::exit(1);
    }
}
