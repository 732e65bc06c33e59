pub mod alert;
pub mod snapshot;
pub mod trade;

pub use alert::{AlertCondition, PriceAlert};
pub use snapshot::{AssetSnapshot, SkipReason};
pub use trade::Trade;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse a venue-supplied side string. Binance uses "BUY"/"SELL",
    /// Gate.io uses lowercase "buy"/"sell".
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

// ---------------------------------------------------------------------------
// AssetBalance: one spot holding as reported by a venue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Decimal,
}

// ---------------------------------------------------------------------------
// OrderReceipt: venue acknowledgement of a placed order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub status: String,
}

impl fmt::Display for OrderReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order {} ({})", self.order_id, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_both_venue_spellings() {
        assert_eq!(Side::from_api_str("BUY"), Some(Side::Buy));
        assert_eq!(Side::from_api_str("sell"), Some(Side::Sell));
        assert_eq!(Side::from_api_str("hold"), None);
    }
}
