use reqwest::Client;
use rust_decimal::Decimal;

use crate::errors::ExchangeError;

const WEI_SCALE: u32 = 18;

/// Read-only on-chain wallet: queries the native-coin balance of one address
/// over JSON-RPC (`eth_getBalance`).
#[derive(Debug, Clone)]
pub struct ChainWallet {
    http: Client,
    rpc_url: String,
    address: String,
}

impl ChainWallet {
    pub fn new(http: Client, rpc_url: String, address: String) -> Self {
        Self {
            http,
            rpc_url,
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Native-coin balance in whole coins (wei scaled down by 10^18).
    pub async fn native_balance(&self) -> Result<Decimal, ExchangeError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getBalance",
            "params": [self.address, "latest"],
        });

        let resp: serde_json::Value = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.get("error") {
            return Err(ExchangeError::Unexpected(format!("RPC error: {err}")));
        }

        let hex_wei = resp
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExchangeError::Unexpected("missing result field".into()))?;

        wei_to_coin(hex_wei)
    }
}

/// Parse a hex wei quantity (`0x...`) into whole coins.
fn wei_to_coin(hex_wei: &str) -> Result<Decimal, ExchangeError> {
    let trimmed = hex_wei.trim_start_matches("0x");
    let wei = u128::from_str_radix(trimmed, 16)
        .map_err(|e| ExchangeError::Unexpected(format!("bad wei quantity {hex_wei}: {e}")))?;

    let wei = i128::try_from(wei)
        .map_err(|_| ExchangeError::Unexpected(format!("wei quantity out of range: {hex_wei}")))?;

    Ok(Decimal::from_i128_with_scale(wei, WEI_SCALE).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wei_parses_to_whole_coins() {
        // 1 ETH = 10^18 wei = 0xde0b6b3a7640000
        assert_eq!(wei_to_coin("0xde0b6b3a7640000").unwrap(), Decimal::ONE);
        assert_eq!(wei_to_coin("0x0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn wei_keeps_fractional_precision() {
        // 1.5 ETH
        let half = wei_to_coin("0x14d1120d7b160000").unwrap();
        assert_eq!(half, Decimal::new(15, 1));
    }

    #[test]
    fn wei_rejects_garbage() {
        assert!(wei_to_coin("0xzz").is_err());
        assert!(wei_to_coin("").is_err());
    }
}
