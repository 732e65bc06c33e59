use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use crate::models::{OrderReceipt, PriceAlert, Side};
use crate::portfolio::{PortfolioReport, VenueTotals};

/// Telegram notification service. Failures are logged but never block the main flow.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(http: reqwest::Client, bot_token: String, chat_id: String) -> Self {
        Self {
            http,
            bot_token,
            chat_id,
        }
    }

    /// Send a Telegram message. Failures are logged as warnings.
    pub async fn send(&self, message: &str) {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    tracing::warn!(
                        status = %resp.status(),
                        "Telegram sendMessage returned non-2xx"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send Telegram notification");
            }
        }
    }
}

/// Format the cross-venue balance summary sent after a refresh cycle.
pub fn format_portfolio_summary(report: &PortfolioReport, totals: &VenueTotals) -> String {
    let mut msg = format!(
        "{}\n\n=== BINANCE ===\nTotal Asset in USDT: {}\nProfit/Loss: {}\n\n=== GATE.IO ===\nTotal Asset in USDT: {}\n\n=== WALLET ===\nTotal Asset in USDT: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        totals.binance_usdt.round_dp(2),
        report.total_profit_loss.round_dp(2),
        totals.gate_usdt.round_dp(2),
        totals.wallet_usdt.round_dp(2),
    );

    msg.push_str(&format!(
        "\n=== TOTAL ===\nBTC Price: {}\nTotal Asset in USDT: {}\nTotal Asset in BTC: {}\n",
        totals.btc_price.round_dp(2),
        totals.total_usdt.round_dp(2),
        totals.total_btc.round_dp(8),
    ));

    if let Some(fiat) = totals.total_fiat() {
        msg.push_str(&format!("Total Asset in fiat: {}\n", fiat.round_dp(0)));
    }

    msg
}

/// Format a fired price alert.
pub fn format_alert_triggered(alert: &PriceAlert, price: Decimal) -> String {
    format!(
        "Price alert: {} is now {} (condition {} {})",
        alert.asset,
        price,
        alert.condition,
        alert.threshold_price,
    )
}

/// Format an order placement result.
pub fn format_order_result(
    venue: &str,
    side: Side,
    pair: &str,
    amount: Decimal,
    receipt: &OrderReceipt,
) -> String {
    format!(
        "Order executed on {}\nSide: {}\nPair: {}\nAmount: {}\nOrder ID: {}\nStatus: {}",
        venue, side, pair, amount, receipt.order_id, receipt.status,
    )
}
