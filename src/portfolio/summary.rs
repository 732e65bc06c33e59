use rust_decimal::Decimal;

use crate::exchange::ExchangeApi;
use crate::AppContext;

/// Cross-venue balance roll-up for one refresh cycle.
#[derive(Debug, Clone)]
pub struct VenueTotals {
    pub btc_price: Decimal,
    pub binance_usdt: Decimal,
    pub gate_usdt: Decimal,
    pub wallet_usdt: Decimal,
    pub total_usdt: Decimal,
    pub total_btc: Decimal,
    /// Quote-to-fiat rate when a fiat ticker is configured.
    pub fiat_rate: Option<Decimal>,
}

impl VenueTotals {
    pub fn new(
        btc_price: Decimal,
        binance_usdt: Decimal,
        gate_usdt: Decimal,
        wallet_usdt: Decimal,
        fiat_rate: Option<Decimal>,
    ) -> Self {
        let total_usdt = binance_usdt + gate_usdt + wallet_usdt;
        let total_btc = if btc_price > Decimal::ZERO {
            total_usdt / btc_price
        } else {
            Decimal::ZERO
        };
        Self {
            btc_price,
            binance_usdt,
            gate_usdt,
            wallet_usdt,
            total_usdt,
            total_btc,
            fiat_rate,
        }
    }

    pub fn total_fiat(&self) -> Option<Decimal> {
        self.fiat_rate.map(|rate| self.total_usdt * rate)
    }
}

/// Gather totals across every configured venue.
///
/// The BTC reference price is load-bearing for the whole summary and
/// propagates failure; individual venues degrade to a zero contribution
/// with a warning.
pub async fn collect_venue_totals(ctx: &AppContext) -> anyhow::Result<VenueTotals> {
    let btc_pair = ctx.binance.spot_pair("BTC", &ctx.config.quote_asset);
    let btc_price = ctx.binance.ticker_price(&btc_pair).await?;

    let binance_usdt = match ctx.binance.wallet_balances().await {
        Ok(wallets) => {
            let total_btc: Decimal = wallets.iter().map(|w| w.balance_btc).sum();
            total_btc * btc_price
        }
        Err(e) => {
            tracing::warn!(error = %e, "Binance wallet rollup unavailable");
            Decimal::ZERO
        }
    };

    let gate_usdt = match &ctx.gate {
        Some(gate) => match gate.total_balance().await {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!(error = %e, "Gate.io total balance unavailable");
                Decimal::ZERO
            }
        },
        None => Decimal::ZERO,
    };

    let wallet_usdt = match &ctx.wallet {
        Some(wallet) => match wallet_value(ctx, wallet).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, address = %wallet.address(), "On-chain balance unavailable");
                Decimal::ZERO
            }
        },
        None => Decimal::ZERO,
    };

    let fiat_rate = match &ctx.config.fiat_symbol {
        Some(symbol) => match ctx.binance.ticker_price(symbol).await {
            Ok(rate) => Some(rate),
            Err(e) => {
                tracing::warn!(error = %e, symbol = %symbol, "Fiat rate unavailable");
                None
            }
        },
        None => None,
    };

    Ok(VenueTotals::new(
        btc_price,
        binance_usdt,
        gate_usdt,
        wallet_usdt,
        fiat_rate,
    ))
}

async fn wallet_value(
    ctx: &AppContext,
    wallet: &crate::exchange::ChainWallet,
) -> anyhow::Result<Decimal> {
    let balance = wallet.native_balance().await?;
    let eth_pair = ctx.binance.spot_pair("ETH", &ctx.config.quote_asset);
    let eth_price = ctx.binance.ticker_price(&eth_pair).await?;
    Ok(balance * eth_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_venues_and_convert_to_btc() {
        let totals = VenueTotals::new(
            Decimal::from(50_000),
            Decimal::from(10_000),
            Decimal::from(4_000),
            Decimal::from(1_000),
            Some(Decimal::from(16_000)),
        );
        assert_eq!(totals.total_usdt, Decimal::from(15_000));
        assert_eq!(totals.total_btc, Decimal::new(3, 1));
        assert_eq!(totals.total_fiat(), Some(Decimal::from(240_000_000)));
    }

    #[test]
    fn zero_btc_price_does_not_divide() {
        let totals = VenueTotals::new(
            Decimal::ZERO,
            Decimal::from(100),
            Decimal::ZERO,
            Decimal::ZERO,
            None,
        );
        assert_eq!(totals.total_btc, Decimal::ZERO);
        assert_eq!(totals.total_fiat(), None);
    }
}
