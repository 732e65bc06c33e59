use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Database row for the price_alerts table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceAlert {
    pub id: Uuid,
    pub asset: String,
    /// Comparison operator as stored: one of `<`, `>`, `<=`, `>=`, `==`.
    pub condition: String,
    pub threshold_price: Decimal,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl PriceAlert {
    /// Parse the stored operator. Rows written through the CLI are always
    /// valid; a hand-edited row that fails to parse is skipped by the monitor.
    pub fn parsed_condition(&self) -> Option<AlertCondition> {
        self.condition.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// AlertCondition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCondition {
    Below,
    Above,
    BelowOrEqual,
    AboveOrEqual,
    Equal,
}

impl AlertCondition {
    /// True when the current price satisfies the alert against its threshold.
    pub fn matches(&self, price: Decimal, threshold: Decimal) -> bool {
        match self {
            AlertCondition::Below => price < threshold,
            AlertCondition::Above => price > threshold,
            AlertCondition::BelowOrEqual => price <= threshold,
            AlertCondition::AboveOrEqual => price >= threshold,
            AlertCondition::Equal => price == threshold,
        }
    }
}

impl FromStr for AlertCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(AlertCondition::Below),
            ">" => Ok(AlertCondition::Above),
            "<=" => Ok(AlertCondition::BelowOrEqual),
            ">=" => Ok(AlertCondition::AboveOrEqual),
            "==" => Ok(AlertCondition::Equal),
            other => Err(format!("unknown comparison operator: {other}")),
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertCondition::Below => "<",
            AlertCondition::Above => ">",
            AlertCondition::BelowOrEqual => "<=",
            AlertCondition::AboveOrEqual => ">=",
            AlertCondition::Equal => "==",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn condition_round_trips_through_display() {
        for op in ["<", ">", "<=", ">=", "=="] {
            let cond: AlertCondition = op.parse().unwrap();
            assert_eq!(cond.to_string(), op);
        }
        assert!("=".parse::<AlertCondition>().is_err());
    }

    #[test]
    fn condition_matches_each_operator() {
        assert!(AlertCondition::Below.matches(d(99), d(100)));
        assert!(!AlertCondition::Below.matches(d(100), d(100)));

        assert!(AlertCondition::Above.matches(d(101), d(100)));
        assert!(!AlertCondition::Above.matches(d(100), d(100)));

        assert!(AlertCondition::BelowOrEqual.matches(d(100), d(100)));
        assert!(AlertCondition::AboveOrEqual.matches(d(100), d(100)));

        assert!(AlertCondition::Equal.matches(d(100), d(100)));
        assert!(!AlertCondition::Equal.matches(d(101), d(100)));
    }
}
