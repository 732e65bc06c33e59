use std::sync::Arc;

use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::alert_repo;
use crate::exchange::ExchangeApi;
use crate::services::notifier::{format_alert_triggered, Notifier};

/// Run the alert monitor loop. Periodically loads the armed alerts, fetches
/// the current price for each, and fires matching ones exactly once.
///
/// Any failure while handling one alert is logged and the remaining alerts in
/// the same cycle still run.
pub async fn run_alert_monitor(
    pool: PgPool,
    exchange: Arc<dyn ExchangeApi>,
    notifier: Option<Arc<Notifier>>,
    quote_asset: String,
    interval_secs: u64,
) {
    tracing::info!(interval_secs, "Alert monitor started");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;

        let alerts = match alert_repo::get_active_alerts(&pool).await {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, "Alert monitor: failed to load alerts");
                continue;
            }
        };

        if alerts.is_empty() {
            tracing::debug!("Alert monitor: no armed alerts");
            continue;
        }

        for alert in &alerts {
            let Some(condition) = alert.parsed_condition() else {
                tracing::warn!(
                    alert_id = %alert.id,
                    condition = %alert.condition,
                    "Alert has an unparseable condition — skipping"
                );
                continue;
            };

            let pair = exchange.spot_pair(&alert.asset, &quote_asset);
            let price = match exchange.ticker_price(&pair).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, pair = %pair, "Alert monitor: price fetch failed");
                    continue;
                }
            };

            if !condition.matches(price, alert.threshold_price) {
                tracing::debug!(
                    asset = %alert.asset,
                    price = %price,
                    threshold = %alert.threshold_price,
                    "Alert not triggered"
                );
                continue;
            }

            // Disarm before notifying so a notification hiccup can never
            // leave the alert armed for a second fire.
            if let Err(e) = alert_repo::deactivate_alert(&pool, alert.id, true).await {
                tracing::error!(error = %e, alert_id = %alert.id, "Failed to disarm alert");
                continue;
            }

            tracing::info!(
                asset = %alert.asset,
                condition = %alert.condition,
                threshold = %alert.threshold_price,
                price = %price,
                "Price alert triggered"
            );

            if let Some(ref n) = notifier {
                n.send(&format_alert_triggered(alert, price)).await;
            }
        }
    }
}
