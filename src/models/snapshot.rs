use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ExchangeError;

/// Valuation of one held asset after replaying its trade history.
///
/// Immutable once built; the refresh cycle hands it to the report,
/// the snapshot store, and the notifier as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub asset: String,
    pub free_quantity: Decimal,
    pub average_price: Decimal,
    pub total_cost: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub percent_change: Decimal,
    /// True when a sell exceeded the tracked buys at some point and the
    /// running position was reset to empty, usually a trade history that
    /// starts after the first purchases.
    pub history_truncated: bool,
}

/// Why an asset produced no snapshot this cycle. Skips are logged and the
/// cycle moves on to the next asset.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("zero free balance")]
    ZeroBalance,

    #[error("excluded asset")]
    Excluded,

    #[error("dust holding (value {value})")]
    Dust { value: Decimal },

    #[error("price unavailable: {0}")]
    PriceUnavailable(#[source] ExchangeError),

    #[error("trade history unavailable: {0}")]
    HistoryUnavailable(#[source] ExchangeError),
}
