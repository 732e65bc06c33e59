use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::models::AssetSnapshot;

/// Column the asset table is ordered by (descending, largest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Asset,
    FreeQuantity,
    AveragePrice,
    TotalCost,
    CurrentPrice,
    CurrentValue,
    ProfitLoss,
    PercentChange,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(SortKey::Asset),
            "free" | "free-quantity" => Ok(SortKey::FreeQuantity),
            "average-price" | "avg-price" => Ok(SortKey::AveragePrice),
            "total-cost" | "cost" => Ok(SortKey::TotalCost),
            "current-price" | "price" => Ok(SortKey::CurrentPrice),
            "current-value" | "value" => Ok(SortKey::CurrentValue),
            "profit-loss" | "pnl" => Ok(SortKey::ProfitLoss),
            "percent-change" | "change" => Ok(SortKey::PercentChange),
            other => Err(format!("unknown sort column: {other}")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Asset => "asset",
            SortKey::FreeQuantity => "free-quantity",
            SortKey::AveragePrice => "average-price",
            SortKey::TotalCost => "total-cost",
            SortKey::CurrentPrice => "current-price",
            SortKey::CurrentValue => "current-value",
            SortKey::ProfitLoss => "profit-loss",
            SortKey::PercentChange => "percent-change",
        };
        write!(f, "{s}")
    }
}

/// One refresh cycle's valued holdings plus the portfolio roll-up.
#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub snapshots: Vec<AssetSnapshot>,
    pub total_value: Decimal,
    pub total_profit_loss: Decimal,
}

impl PortfolioReport {
    /// Sort the snapshots and sum the roll-up. An empty cycle yields zeros.
    pub fn new(mut snapshots: Vec<AssetSnapshot>, sort: SortKey) -> Self {
        match sort {
            SortKey::Asset => snapshots.sort_by(|a, b| b.asset.cmp(&a.asset)),
            _ => snapshots.sort_by(|a, b| decimal_key(b, sort).cmp(&decimal_key(a, sort))),
        }

        let total_value = snapshots.iter().map(|s| s.current_value).sum();
        let total_profit_loss = snapshots.iter().map(|s| s.profit_loss).sum();

        Self {
            snapshots,
            total_value,
            total_profit_loss,
        }
    }

    /// Plain-text table for the terminal.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<8} {:>16} {:>14} {:>14} {:>14} {:>14} {:>14} {:>10}\n",
            "Asset", "Free", "Avg Price", "Total Cost", "Price", "Value", "P/L", "Change %"
        ));

        for s in &self.snapshots {
            out.push_str(&format!(
                "{:<8} {:>16} {:>14} {:>14} {:>14} {:>14} {:>14} {:>10}{}\n",
                s.asset,
                s.free_quantity.round_dp(6),
                s.average_price.round_dp(2),
                s.total_cost.round_dp(2),
                s.current_price.round_dp(2),
                s.current_value.round_dp(2),
                s.profit_loss.round_dp(2),
                s.percent_change.round_dp(2),
                if s.history_truncated { " *" } else { "" },
            ));
        }

        out.push_str(&format!(
            "\nTotal value: {}    Total profit/loss: {}\n",
            self.total_value.round_dp(2),
            self.total_profit_loss.round_dp(2),
        ));
        if self.snapshots.iter().any(|s| s.history_truncated) {
            out.push_str("* position reset during replay: trade history starts mid-position\n");
        }
        out
    }
}

fn decimal_key(s: &AssetSnapshot, sort: SortKey) -> Decimal {
    match sort {
        // Asset sorts lexically, handled by the caller.
        SortKey::Asset => Decimal::ZERO,
        SortKey::FreeQuantity => s.free_quantity,
        SortKey::AveragePrice => s.average_price,
        SortKey::TotalCost => s.total_cost,
        SortKey::CurrentPrice => s.current_price,
        SortKey::CurrentValue => s.current_value,
        SortKey::ProfitLoss => s.profit_loss,
        SortKey::PercentChange => s.percent_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(asset: &str, value: i64, pnl: i64) -> AssetSnapshot {
        AssetSnapshot {
            asset: asset.into(),
            free_quantity: Decimal::ONE,
            average_price: Decimal::from(100),
            total_cost: Decimal::from(100),
            current_price: Decimal::from(value),
            current_value: Decimal::from(value),
            profit_loss: Decimal::from(pnl),
            percent_change: Decimal::ZERO,
            history_truncated: false,
        }
    }

    #[test]
    fn totals_sum_across_assets() {
        let report = PortfolioReport::new(
            vec![snap("BTC", 1000, 100), snap("ETH", 500, -40)],
            SortKey::CurrentValue,
        );
        assert_eq!(report.total_profit_loss, Decimal::from(60));
        assert_eq!(report.total_value, Decimal::from(1500));
    }

    #[test]
    fn empty_portfolio_totals_are_zero() {
        let report = PortfolioReport::new(vec![], SortKey::CurrentValue);
        assert_eq!(report.total_value, Decimal::ZERO);
        assert_eq!(report.total_profit_loss, Decimal::ZERO);
        assert!(report.render_table().contains("Total value: 0"));
    }

    #[test]
    fn sorts_descending_by_selected_column() {
        let report = PortfolioReport::new(
            vec![snap("A", 10, 5), snap("B", 30, -2), snap("C", 20, 9)],
            SortKey::CurrentValue,
        );
        let order: Vec<&str> = report.snapshots.iter().map(|s| s.asset.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);

        let by_pnl = PortfolioReport::new(
            vec![snap("A", 10, 5), snap("B", 30, -2), snap("C", 20, 9)],
            SortKey::ProfitLoss,
        );
        let order: Vec<&str> = by_pnl.snapshots.iter().map(|s| s.asset.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn sort_key_parses_aliases() {
        assert_eq!("value".parse::<SortKey>().unwrap(), SortKey::CurrentValue);
        assert_eq!("pnl".parse::<SortKey>().unwrap(), SortKey::ProfitLoss);
        assert_eq!(
            "Percent-Change".parse::<SortKey>().unwrap(),
            SortKey::PercentChange
        );
        assert!("volume".parse::<SortKey>().is_err());
    }
}
