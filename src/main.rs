use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use cryptofolio::config::AppConfig;
use cryptofolio::db::alert_repo;
use cryptofolio::exchange::ExchangeApi;
use cryptofolio::models::{AlertCondition, Side};
use cryptofolio::portfolio::SortKey;
use cryptofolio::services::alert_monitor::run_alert_monitor;
use cryptofolio::services::notifier::format_order_result;
use cryptofolio::services::refresh::{run_refresh_loop, RefreshOptions};
use cryptofolio::AppContext;

#[derive(Parser)]
#[command(name = "cryptofolio", about = "Personal crypto portfolio aggregator")]
struct Cli {
    /// Column the asset table is sorted by (descending)
    #[arg(long, default_value = "current-value")]
    sortby: SortKey,

    /// Refresh cycles to run; -1 loops until killed
    #[arg(long, default_value_t = 1)]
    loops: i64,

    /// Seconds to sleep between refresh cycles
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// Push the cycle summary to Telegram
    #[arg(long)]
    notify: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Place a spot market order
    Trade {
        /// buy or sell
        side: String,
        /// Base asset, e.g. BTC
        asset: String,
        /// Quote amount for buys, base amount for sells
        amount: Decimal,
        /// Venue to trade on: binance or gate
        #[arg(long, default_value = "binance")]
        venue: String,
    },
    /// Manage price alerts
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },
}

#[derive(Subcommand)]
enum AlertAction {
    /// Arm a new alert, e.g. `alert add BTC '>' 100000`
    Add {
        asset: String,
        condition: String,
        price: Decimal,
    },
    /// List armed alerts
    List,
    /// Remove an alert by id
    Remove { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let ctx = AppContext::from_config(config).await?;

    match cli.command {
        Some(Command::Trade {
            side,
            asset,
            amount,
            venue,
        }) => run_trade(&ctx, &side, &asset, amount, &venue).await,
        Some(Command::Alert { action }) => run_alert(&ctx, action).await,
        None => {
            if let Some(pool) = &ctx.db {
                tokio::spawn(run_alert_monitor(
                    pool.clone(),
                    ctx.binance.clone() as Arc<dyn ExchangeApi>,
                    ctx.notifier.clone(),
                    ctx.config.quote_asset.clone(),
                    ctx.config.alert_interval_secs,
                ));
            }

            let opts = RefreshOptions {
                sort_key: cli.sortby,
                loops: cli.loops,
                interval_secs: cli.interval,
                notify: cli.notify,
            };
            run_refresh_loop(&ctx, &opts).await
        }
    }
}

async fn run_trade(
    ctx: &AppContext,
    side: &str,
    asset: &str,
    amount: Decimal,
    venue: &str,
) -> anyhow::Result<()> {
    let side = Side::from_api_str(side)
        .ok_or_else(|| anyhow::anyhow!("side must be 'buy' or 'sell'"))?;
    if amount <= Decimal::ZERO {
        anyhow::bail!("amount must be positive");
    }

    let exchange: Arc<dyn ExchangeApi> = match venue {
        "binance" => ctx.binance.clone(),
        "gate" => ctx
            .gate
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Gate.io credentials not configured"))?,
        other => anyhow::bail!("unknown venue: {other}"),
    };

    let asset = asset.to_uppercase();
    let pair = exchange.spot_pair(&asset, &ctx.config.quote_asset);
    let receipt = exchange.place_order(side, &pair, amount).await?;

    println!(
        "{} {} on {} ({} {}): {}",
        side, pair, exchange.name(), amount,
        match side {
            Side::Buy => ctx.config.quote_asset.as_str(),
            Side::Sell => asset.as_str(),
        },
        receipt,
    );

    if let Some(notifier) = &ctx.notifier {
        notifier
            .send(&format_order_result(
                exchange.name(),
                side,
                &pair,
                amount,
                &receipt,
            ))
            .await;
    }

    Ok(())
}

async fn run_alert(ctx: &AppContext, action: AlertAction) -> anyhow::Result<()> {
    let pool = ctx
        .db
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set to manage alerts"))?;

    match action {
        AlertAction::Add {
            asset,
            condition,
            price,
        } => {
            let condition: AlertCondition =
                condition.parse().map_err(anyhow::Error::msg)?;
            let asset = asset.to_uppercase();

            // Make sure the pair actually trades before arming the alert.
            let pair = ctx.binance.spot_pair(&asset, &ctx.config.quote_asset);
            ctx.binance
                .ticker_price(&pair)
                .await
                .map_err(|e| anyhow::anyhow!("no ticker for {pair}: {e}"))?;

            let alert = alert_repo::insert_alert(pool, &asset, condition, price).await?;
            println!(
                "Alert armed: {} {} {} (id {})",
                alert.asset, alert.condition, alert.threshold_price, alert.id
            );
        }
        AlertAction::List => {
            let alerts = alert_repo::get_active_alerts(pool).await?;
            if alerts.is_empty() {
                println!("No armed alerts.");
            } else {
                for alert in alerts {
                    println!(
                        "{}  {} {} {}",
                        alert.id, alert.asset, alert.condition, alert.threshold_price
                    );
                }
            }
        }
        AlertAction::Remove { id } => {
            if alert_repo::delete_alert(pool, id).await? {
                println!("Alert {id} removed.");
            } else {
                println!("No alert with id {id}.");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
