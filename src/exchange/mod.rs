pub mod binance;
pub mod gate;
pub mod wallet;

pub use binance::BinanceClient;
pub use gate::GateClient;
pub use wallet::ChainWallet;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::ExchangeError;
use crate::models::{AssetBalance, OrderReceipt, Side, Trade};

/// The four venue operations the portfolio core consumes. Everything above
/// this trait is polymorphic over which exchange supplies them.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Venue name for logs and messages.
    fn name(&self) -> &'static str;

    /// Venue-native spelling of a spot pair, e.g. `BTCUSDT` vs `BTC_USDT`.
    fn spot_pair(&self, base: &str, quote: &str) -> String;

    /// Latest traded price for a pair.
    async fn ticker_price(&self, pair: &str) -> Result<Decimal, ExchangeError>;

    /// Full spot trade history for a pair, oldest first.
    async fn trade_history(&self, pair: &str) -> Result<Vec<Trade>, ExchangeError>;

    /// Spot balances for every asset with a non-zero free amount.
    async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExchangeError>;

    /// Place a market order. A buy spends `amount` of the quote currency,
    /// a sell disposes of `amount` of the base currency.
    async fn place_order(
        &self,
        side: Side,
        pair: &str,
        amount: Decimal,
    ) -> Result<OrderReceipt, ExchangeError>;
}
