pub mod accumulator;
pub mod report;
pub mod summary;

pub use accumulator::{accumulate, build_snapshot, PositionState};
pub use report::{PortfolioReport, SortKey};
pub use summary::VenueTotals;

use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::exchange::ExchangeApi;
use crate::models::{AssetBalance, AssetSnapshot, SkipReason};

/// Knobs for valuing one venue's holdings.
#[derive(Debug, Clone)]
pub struct ValuationSettings {
    /// Quote currency holdings are priced against, e.g. USDT.
    pub quote_asset: String,
    /// Additional quote currencies whose trade history denominates the same
    /// base asset and is merged in, e.g. FDUSD.
    pub alt_quote_assets: Vec<String>,
    /// Assets never valued (the quotes themselves, mostly).
    pub excluded_assets: Vec<String>,
    /// Wrapper-balance prefix for earn products (`LDBTC` mirrors `BTC`).
    pub earn_prefix: String,
    /// Holdings worth no more than this are dropped from the report.
    pub dust_threshold: Decimal,
    /// Bound on concurrent per-asset fetches.
    pub fetch_concurrency: usize,
}

impl ValuationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            quote_asset: config.quote_asset.clone(),
            alt_quote_assets: config.alt_quote_assets.clone(),
            excluded_assets: config.excluded_assets.clone(),
            earn_prefix: config.earn_prefix.clone(),
            dust_threshold: config.dust_threshold,
            fetch_concurrency: config.fetch_concurrency.max(1),
        }
    }

    fn is_excluded(&self, asset: &str) -> bool {
        self.excluded_assets.iter().any(|a| a == asset)
            || (!self.earn_prefix.is_empty() && asset.starts_with(&self.earn_prefix))
    }
}

/// Value every holding on one venue.
///
/// Per-asset fetches run through a bounded, order-preserving pipeline; each
/// asset independently resolves to a snapshot or a skip, so one venue hiccup
/// never takes down the cycle.
pub async fn build_snapshots(
    exchange: &dyn ExchangeApi,
    balances: &[AssetBalance],
    settings: &ValuationSettings,
) -> (Vec<AssetSnapshot>, Vec<(String, SkipReason)>) {
    let results: Vec<(String, Result<AssetSnapshot, SkipReason>)> = stream::iter(balances)
        .map(|balance| async move {
            (
                balance.asset.clone(),
                snapshot_asset(exchange, balance, settings).await,
            )
        })
        .buffered(settings.fetch_concurrency)
        .collect()
        .await;

    let mut snapshots = Vec::new();
    let mut skipped = Vec::new();
    for (asset, result) in results {
        match result {
            Ok(snap) => snapshots.push(snap),
            Err(reason) => {
                match &reason {
                    SkipReason::PriceUnavailable(e) | SkipReason::HistoryUnavailable(e) => {
                        tracing::warn!(asset = %asset, error = %e, "Asset skipped")
                    }
                    _ => tracing::debug!(asset = %asset, reason = %reason, "Asset skipped"),
                }
                skipped.push((asset, reason));
            }
        }
    }
    (snapshots, skipped)
}

async fn snapshot_asset(
    exchange: &dyn ExchangeApi,
    balance: &AssetBalance,
    settings: &ValuationSettings,
) -> Result<AssetSnapshot, SkipReason> {
    if balance.free <= Decimal::ZERO {
        return Err(SkipReason::ZeroBalance);
    }
    if settings.is_excluded(&balance.asset) {
        return Err(SkipReason::Excluded);
    }

    let pair = exchange.spot_pair(&balance.asset, &settings.quote_asset);
    let price = exchange
        .ticker_price(&pair)
        .await
        .map_err(SkipReason::PriceUnavailable)?;

    let value = balance.free * price;
    if value <= settings.dust_threshold {
        return Err(SkipReason::Dust { value });
    }

    let mut trades = exchange
        .trade_history(&pair)
        .await
        .map_err(SkipReason::HistoryUnavailable)?;

    // The same base asset may have traded against other stable quotes;
    // fold those fills in. A missing alternate pair is not an error.
    for alt in &settings.alt_quote_assets {
        let alt_pair = exchange.spot_pair(&balance.asset, alt);
        match exchange.trade_history(&alt_pair).await {
            Ok(mut extra) => trades.append(&mut extra),
            Err(e) => {
                tracing::debug!(pair = %alt_pair, error = %e, "No alternate-quote history")
            }
        }
    }
    trades.sort_by_key(|t| t.executed_at);

    Ok(build_snapshot(&balance.asset, balance.free, price, &trades))
}
