use chrono::Utc;
use tokio::time::{sleep, Duration};

use crate::db::{history::HistoryLog, snapshot_repo};
use crate::exchange::ExchangeApi;
use crate::portfolio::{self, summary, PortfolioReport, SortKey, ValuationSettings};
use crate::services::notifier::format_portfolio_summary;
use crate::AppContext;

/// How the refresh loop runs: sort order, loop budget, cadence.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub sort_key: SortKey,
    /// Number of cycles to run; `-1` loops until the process is killed.
    pub loops: i64,
    pub interval_secs: u64,
    /// Push the cycle summary to Telegram when a notifier is configured.
    pub notify: bool,
}

/// Run refresh cycles until the loop budget is spent.
///
/// Per-asset failures inside a cycle are isolated and logged; a failure of
/// the cycle's own fetches (account balances, the BTC reference price)
/// propagates and exits non-zero.
pub async fn run_refresh_loop(ctx: &AppContext, opts: &RefreshOptions) -> anyhow::Result<()> {
    let settings = ValuationSettings::from_config(&ctx.config);
    let history = HistoryLog::new(&ctx.config.history_csv_path);

    let mut cycle: i64 = 0;
    loop {
        if opts.loops >= 0 && cycle >= opts.loops {
            break;
        }

        run_cycle(ctx, opts, &settings, &history).await?;
        cycle += 1;

        if opts.loops < 0 || cycle < opts.loops {
            sleep(Duration::from_secs(opts.interval_secs)).await;
        }
    }

    tracing::info!(cycles = cycle, "Refresh loop finished");
    Ok(())
}

async fn run_cycle(
    ctx: &AppContext,
    opts: &RefreshOptions,
    settings: &ValuationSettings,
    history: &HistoryLog,
) -> anyhow::Result<()> {
    let started = Utc::now();

    let balances = ctx.binance.account_balances().await?;
    let (snapshots, skipped) =
        portfolio::build_snapshots(ctx.binance.as_ref(), &balances, settings).await;

    let report = PortfolioReport::new(snapshots, opts.sort_key);
    let totals = summary::collect_venue_totals(ctx).await?;

    println!("{}", report.render_table());
    println!(
        "BTC price: {}    Total across venues: {} USDT ({} BTC)",
        totals.btc_price.round_dp(2),
        totals.total_usdt.round_dp(2),
        totals.total_btc.round_dp(8),
    );
    if let Some(fiat) = totals.total_fiat() {
        println!("Total in fiat: {}", fiat.round_dp(0));
    }
    println!("Updated at: {}\n", started.format("%Y-%m-%d %H:%M:%S UTC"));

    tracing::info!(
        assets = report.snapshots.len(),
        skipped = skipped.len(),
        total_value = %report.total_value,
        total_profit_loss = %report.total_profit_loss,
        "Refresh cycle complete"
    );

    if let Err(e) = history.append(&totals, started) {
        tracing::warn!(error = %e, path = ?history.path(), "Failed to append balance history");
    }

    if let Some(pool) = &ctx.db {
        if let Err(e) = snapshot_repo::insert_snapshots(pool, &report.snapshots).await {
            tracing::warn!(error = %e, "Failed to store snapshots");
        }
    }

    if opts.notify {
        if let Some(notifier) = &ctx.notifier {
            notifier.send(&format_portfolio_summary(&report, &totals)).await;
        }
    }

    Ok(())
}
