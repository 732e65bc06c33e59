use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// A single spot fill from a venue's trade-history endpoint.
///
/// The fee is carried for reporting but does not enter the cost basis;
/// acquisition cost is `price * quantity` on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub pair: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Option<Decimal>,
    pub executed_at: DateTime<Utc>,
}
