use rust_decimal::Decimal;

use crate::models::{AssetSnapshot, Side, Trade};

/// Running cost-basis state for one asset during a single replay of its
/// trade history. Reset per asset, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionState {
    pub total_quantity: Decimal,
    pub total_cost: Decimal,
    pub history_truncated: bool,
}

impl PositionState {
    /// Fold one fill into the running position.
    ///
    /// A sell that takes the tracked quantity below zero resets the position
    /// to empty and accumulation continues from there; the reset is recorded
    /// in `history_truncated`.
    pub fn apply(&mut self, trade: &Trade) {
        let notional = trade.price * trade.quantity;
        match trade.side {
            Side::Buy => {
                self.total_cost += notional;
                self.total_quantity += trade.quantity;
            }
            Side::Sell => {
                self.total_cost -= notional;
                self.total_quantity -= trade.quantity;
                if self.total_quantity < Decimal::ZERO {
                    self.total_quantity = Decimal::ZERO;
                    self.total_cost = Decimal::ZERO;
                    self.history_truncated = true;
                }
            }
        }
    }

    /// Quantity-weighted acquisition price, zero when nothing is held.
    pub fn average_price(&self) -> Decimal {
        if self.total_quantity > Decimal::ZERO {
            self.total_cost / self.total_quantity
        } else {
            Decimal::ZERO
        }
    }
}

/// Replay a chronological trade sequence into a final position.
pub fn accumulate<'a, I>(trades: I) -> PositionState
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut state = PositionState::default();
    for trade in trades {
        state.apply(trade);
    }
    state
}

/// Value one holding against its replayed history.
///
/// Pure: same inputs always produce the same snapshot.
pub fn build_snapshot(
    asset: &str,
    free_quantity: Decimal,
    current_price: Decimal,
    trades: &[Trade],
) -> AssetSnapshot {
    let position = accumulate(trades);

    let average_price = position.average_price();
    let current_value = free_quantity * current_price;
    let percent_change = if average_price > Decimal::ZERO {
        (current_price - average_price) / average_price * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let profit_loss = current_value - position.total_cost;

    AssetSnapshot {
        asset: asset.to_string(),
        free_quantity,
        average_price,
        total_cost: position.total_cost,
        current_price,
        current_value,
        profit_loss,
        percent_change,
        history_truncated: position.history_truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn trade(side: Side, price: i64, qty: &str, minutes: i64) -> Trade {
        Trade {
            pair: "BTCUSDT".into(),
            side,
            price: Decimal::from(price),
            quantity: qty.parse().unwrap(),
            fee: None,
            executed_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn buys_only_average_is_weighted_mean() {
        let trades = vec![
            trade(Side::Buy, 100, "2", 0),
            trade(Side::Buy, 400, "1", 1),
        ];
        let state = accumulate(&trades);

        assert_eq!(state.total_quantity, Decimal::from(3));
        assert_eq!(state.total_cost, Decimal::from(600));
        assert_eq!(state.average_price(), Decimal::from(200));
        assert!(!state.history_truncated);
    }

    #[test]
    fn oversell_clamps_position_to_empty() {
        let trades = vec![
            trade(Side::Buy, 100, "1", 0),
            trade(Side::Sell, 100, "2", 1),
        ];
        let state = accumulate(&trades);

        assert_eq!(state.total_quantity, Decimal::ZERO);
        assert_eq!(state.total_cost, Decimal::ZERO);
        assert!(state.history_truncated);
    }

    #[test]
    fn accumulation_continues_after_clamp() {
        let trades = vec![
            trade(Side::Sell, 100, "5", 0),
            trade(Side::Buy, 200, "1", 1),
        ];
        let state = accumulate(&trades);

        assert_eq!(state.total_quantity, Decimal::ONE);
        assert_eq!(state.total_cost, Decimal::from(200));
        assert!(state.history_truncated);
    }

    #[test]
    fn empty_position_has_zero_average() {
        let state = accumulate(&[]);
        assert_eq!(state.average_price(), Decimal::ZERO);
    }

    #[test]
    fn percent_change_is_zero_when_average_not_positive() {
        // All value sold back out: cost negative, quantity still positive.
        let trades = vec![
            trade(Side::Buy, 100, "1", 0),
            trade(Side::Sell, 300, "0.5", 1),
        ];
        let snap = build_snapshot("BTC", Decimal::new(5, 1), Decimal::from(200), &trades);

        assert!(snap.average_price < Decimal::ZERO);
        assert_eq!(snap.percent_change, Decimal::ZERO);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let trades = vec![
            trade(Side::Buy, 100, "2", 0),
            trade(Side::Sell, 150, "1", 1),
        ];
        let a = build_snapshot("BTC", Decimal::ONE, Decimal::from(120), &trades);
        let b = build_snapshot("BTC", Decimal::ONE, Decimal::from(120), &trades);

        assert_eq!(a.average_price, b.average_price);
        assert_eq!(a.profit_loss, b.profit_loss);
        assert_eq!(a.percent_change, b.percent_change);
    }

    #[test]
    fn realistic_position_replays_exactly() {
        // buy 1.0 @ 10000, buy 1.0 @ 20000, sell 0.5 @ 25000; holding 1.5 @ 30000
        let trades = vec![
            trade(Side::Buy, 10_000, "1.0", 0),
            trade(Side::Buy, 20_000, "1.0", 1),
            trade(Side::Sell, 25_000, "0.5", 2),
        ];
        let snap = build_snapshot(
            "BTC",
            Decimal::new(15, 1),
            Decimal::from(30_000),
            &trades,
        );

        assert_eq!(snap.total_cost, Decimal::from(17_500));
        assert_eq!(snap.average_price.round_dp(2), Decimal::new(1_166_667, 2));
        assert_eq!(snap.current_value, Decimal::from(45_000));
        assert_eq!(snap.profit_loss, Decimal::from(27_500));
        assert_eq!(snap.percent_change.round_dp(2), Decimal::new(15_714, 2));
        assert!(!snap.history_truncated);
    }
}
