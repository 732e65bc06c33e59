use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use cryptofolio::errors::ExchangeError;
use cryptofolio::exchange::ExchangeApi;
use cryptofolio::models::{AssetBalance, OrderReceipt, Side, Trade};

/// In-memory venue for driving the portfolio pipeline without a network.
#[derive(Default)]
pub struct MockExchange {
    balances: Vec<AssetBalance>,
    prices: HashMap<String, Decimal>,
    trades: HashMap<String, Vec<Trade>>,
    failing_pairs: HashSet<String>,
    pub placed_orders: Mutex<Vec<(Side, String, Decimal)>>,
}

#[allow(dead_code)]
impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, asset: &str, free: &str) -> Self {
        self.balances.push(AssetBalance {
            asset: asset.into(),
            free: free.parse().unwrap(),
        });
        self
    }

    pub fn with_price(mut self, pair: &str, price: &str) -> Self {
        self.prices.insert(pair.into(), price.parse().unwrap());
        self
    }

    pub fn with_trades(mut self, pair: &str, trades: Vec<Trade>) -> Self {
        self.trades.insert(pair.into(), trades);
        self
    }

    /// Any operation touching this pair fails.
    pub fn failing(mut self, pair: &str) -> Self {
        self.failing_pairs.insert(pair.into());
        self
    }

    fn fail_if_injected(&self, pair: &str) -> Result<(), ExchangeError> {
        if self.failing_pairs.contains(pair) {
            Err(ExchangeError::Unexpected(format!("injected failure for {pair}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ExchangeApi for MockExchange {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn spot_pair(&self, base: &str, quote: &str) -> String {
        format!("{base}{quote}")
    }

    async fn ticker_price(&self, pair: &str) -> Result<Decimal, ExchangeError> {
        self.fail_if_injected(pair)?;
        self.prices
            .get(pair)
            .copied()
            .ok_or_else(|| ExchangeError::Unexpected(format!("no ticker for {pair}")))
    }

    async fn trade_history(&self, pair: &str) -> Result<Vec<Trade>, ExchangeError> {
        self.fail_if_injected(pair)?;
        self.trades
            .get(pair)
            .cloned()
            .ok_or_else(|| ExchangeError::Unexpected(format!("no history for {pair}")))
    }

    async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        Ok(self.balances.clone())
    }

    async fn place_order(
        &self,
        side: Side,
        pair: &str,
        amount: Decimal,
    ) -> Result<OrderReceipt, ExchangeError> {
        self.fail_if_injected(pair)?;
        let mut orders = self.placed_orders.lock().unwrap();
        orders.push((side, pair.to_string(), amount));
        Ok(OrderReceipt {
            order_id: format!("mock-{}", orders.len()),
            status: "FILLED".into(),
        })
    }
}

/// A fill `minutes` after an arbitrary epoch, so test sequences order
/// the same way the venues report them.
#[allow(dead_code)]
pub fn fill(pair: &str, side: Side, price: &str, qty: &str, minutes: i64) -> Trade {
    Trade {
        pair: pair.into(),
        side,
        price: price.parse().unwrap(),
        quantity: qty.parse().unwrap(),
        fee: None,
        executed_at: Utc::now() - Duration::hours(24) + Duration::minutes(minutes),
    }
}
