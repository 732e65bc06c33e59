pub mod config;
pub mod db;
pub mod errors;
pub mod exchange;
pub mod models;
pub mod portfolio;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::exchange::{BinanceClient, ChainWallet, GateClient};
use crate::services::notifier::Notifier;

/// Everything one process run works with: config plus the venue clients,
/// notifier, and store built from it. Constructed once and threaded through
/// calls, so there is no module-level state anywhere.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub binance: Arc<BinanceClient>,
    pub gate: Option<Arc<GateClient>>,
    pub wallet: Option<ChainWallet>,
    pub notifier: Option<Arc<Notifier>>,
    pub db: Option<sqlx::PgPool>,
}

impl AppContext {
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let binance = Arc::new(BinanceClient::new(
            http.clone(),
            config.binance_api_key.clone(),
            config.binance_api_secret.clone(),
            config.binance_base_url.clone(),
        ));

        let gate = if config.has_gate_auth() {
            Some(Arc::new(GateClient::new(
                http.clone(),
                config.gate_api_key.clone().unwrap(),
                config.gate_api_secret.clone().unwrap(),
                config.gate_base_url.clone(),
            )))
        } else {
            tracing::info!("Gate.io credentials not configured — venue skipped");
            None
        };

        let wallet = config.wallet_address.as_ref().map(|address| {
            ChainWallet::new(http.clone(), config.rpc_url.clone(), address.clone())
        });

        let notifier = if config.has_telegram() {
            Some(Arc::new(Notifier::new(
                http.clone(),
                config.telegram_bot_token.clone().unwrap(),
                config.telegram_chat_id.clone().unwrap(),
            )))
        } else {
            None
        };

        let db = match &config.database_url {
            Some(url) => {
                tracing::info!("Connecting to database...");
                let pool = db::init_pool(url).await?;
                tracing::info!("Database connected");
                Some(pool)
            }
            None => {
                tracing::info!("DATABASE_URL not set — alerts and snapshot storage disabled");
                None
            }
        };

        Ok(Self {
            config,
            binance,
            gate,
            wallet,
            notifier,
            db,
        })
    }
}
