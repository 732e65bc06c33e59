use rust_decimal::Decimal;
use std::env;

const DEFAULT_BINANCE_URL: &str = "https://api.binance.com";
const DEFAULT_GATE_URL: &str = "https://api.gateio.ws";
const DEFAULT_RPC_URL: &str = "https://mainnet.optimism.io";
const DEFAULT_HISTORY_CSV: &str = "portfolio_history.csv";

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Binance spot credentials for the primary venue, required.
    pub binance_api_key: String,
    pub binance_api_secret: String,
    pub binance_base_url: String,

    // Gate.io credentials (optional; venue skipped without them)
    pub gate_api_key: Option<String>,
    pub gate_api_secret: Option<String>,
    pub gate_base_url: String,

    // On-chain wallet (optional)
    pub wallet_address: Option<String>,
    pub rpc_url: String,

    // Telegram notifier (optional)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Snapshot / alert store (optional; alerts need it, CSV history doesn't)
    pub database_url: Option<String>,
    pub history_csv_path: String,

    // Valuation
    pub quote_asset: String,
    pub alt_quote_assets: Vec<String>,
    pub excluded_assets: Vec<String>,
    pub earn_prefix: String,
    pub dust_threshold: Decimal,
    /// Ticker used to restate totals in a local fiat, e.g. "USDTIDRT".
    pub fiat_symbol: Option<String>,

    // Tuning
    pub fetch_concurrency: usize,
    pub alert_interval_secs: u64,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let alt_quote_assets = list_var("ALT_QUOTE_ASSETS", &["FDUSD"]);
        let excluded_assets = list_var("EXCLUDED_ASSETS", &["USDT", "FDUSD"]);

        Ok(Self {
            binance_api_key: env::var("BINANCE_API_KEY")
                .map_err(|_| anyhow::anyhow!("BINANCE_API_KEY must be set"))?,
            binance_api_secret: env::var("BINANCE_API_SECRET")
                .map_err(|_| anyhow::anyhow!("BINANCE_API_SECRET must be set"))?,
            binance_base_url: env::var("BINANCE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BINANCE_URL.into()),

            gate_api_key: env::var("GATE_API_KEY").ok(),
            gate_api_secret: env::var("GATE_API_SECRET").ok(),
            gate_base_url: env::var("GATE_BASE_URL").unwrap_or_else(|_| DEFAULT_GATE_URL.into()),

            wallet_address: env::var("WALLET_ADDRESS").ok(),
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.into()),

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok(),

            database_url: env::var("DATABASE_URL").ok(),
            history_csv_path: env::var("HISTORY_CSV_PATH")
                .unwrap_or_else(|_| DEFAULT_HISTORY_CSV.into()),

            quote_asset: env::var("QUOTE_ASSET").unwrap_or_else(|_| "USDT".into()),
            alt_quote_assets,
            excluded_assets,
            earn_prefix: env::var("EARN_PREFIX").unwrap_or_else(|_| "LD".into()),
            dust_threshold: env::var("DUST_THRESHOLD")
                .unwrap_or_else(|_| "1".into())
                .parse()
                .unwrap_or(Decimal::ONE),
            fiat_symbol: env::var("FIAT_SYMBOL").ok(),

            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".into())
                .parse()
                .unwrap_or(4),
            alert_interval_secs: env::var("ALERT_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
        })
    }

    /// Returns true if both Gate.io credentials are configured.
    pub fn has_gate_auth(&self) -> bool {
        self.gate_api_key.is_some() && self.gate_api_secret.is_some()
    }

    /// Returns true if the Telegram notifier is configured.
    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

fn list_var(name: &str, default: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}
