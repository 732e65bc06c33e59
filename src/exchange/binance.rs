use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;

use crate::errors::ExchangeError;
use crate::exchange::ExchangeApi;
use crate::models::{AssetBalance, OrderReceipt, Side, Trade};

type HmacSha256 = Hmac<Sha256>;

const RECV_WINDOW_MS: u64 = 5000;

/// Binance spot REST client. Signed endpoints carry an HMAC-SHA256 hex
/// signature over the query string plus the `X-MBX-APIKEY` header.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl BinanceClient {
    pub fn new(http: Client, api_key: String, api_secret: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            api_secret,
            base_url,
        }
    }

    /// HMAC-SHA256 signature over the assembled query string, hex-encoded.
    fn sign_query(&self, query: &str) -> String {
        // HMAC-SHA256 accepts keys of any length, so this cannot fail.
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();

        let mut query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!("timestamp={timestamp}&recvWindow={RECV_WINDOW_MS}"));

        let signature = self.sign_query(&query);
        format!("{}{}?{}&signature={}", self.base_url, path, query, signature)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ExchangeError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ExchangeError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn signed_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExchangeError> {
        let url = self.signed_url(path, params);
        let resp = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// SAPI wallet rollup: one BTC-denominated balance per wallet
    /// (Spot, Funding, Earn, ...). Used for the venue total.
    pub async fn wallet_balances(&self) -> Result<Vec<WalletBalance>, ExchangeError> {
        let raw: Vec<RawWalletBalance> = self
            .signed_get("/sapi/v1/asset/wallet/balance", &[])
            .await?;

        raw.into_iter()
            .map(|w| {
                Ok(WalletBalance {
                    wallet_name: w.wallet_name,
                    balance_btc: w.balance.parse()?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    fn name(&self) -> &'static str {
        "binance"
    }

    fn spot_pair(&self, base: &str, quote: &str) -> String {
        format!("{base}{quote}")
    }

    async fn ticker_price(&self, pair: &str) -> Result<Decimal, ExchangeError> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, pair);
        let resp = Self::check(self.http.get(&url).send().await?).await?;
        let ticker: RawTicker = resp.json().await?;
        Ok(ticker.price.parse()?)
    }

    async fn trade_history(&self, pair: &str) -> Result<Vec<Trade>, ExchangeError> {
        let raw: Vec<RawTrade> = self
            .signed_get("/api/v3/myTrades", &[("symbol", pair.to_string())])
            .await?;

        raw.into_iter()
            .map(|t| {
                Ok(Trade {
                    pair: pair.to_string(),
                    side: if t.is_buyer { Side::Buy } else { Side::Sell },
                    price: t.price.parse()?,
                    quantity: t.qty.parse()?,
                    fee: Some(t.commission.parse()?),
                    executed_at: chrono::DateTime::from_timestamp_millis(t.time)
                        .unwrap_or_else(chrono::Utc::now),
                })
            })
            .collect()
    }

    async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        let account: RawAccount = self.signed_get("/api/v3/account", &[]).await?;

        let mut balances = Vec::new();
        for b in account.balances {
            let free: Decimal = b.free.parse()?;
            if free > Decimal::ZERO {
                balances.push(AssetBalance {
                    asset: b.asset,
                    free,
                });
            }
        }
        Ok(balances)
    }

    async fn place_order(
        &self,
        side: Side,
        pair: &str,
        amount: Decimal,
    ) -> Result<OrderReceipt, ExchangeError> {
        // Market buy spends quote currency, market sell disposes of base.
        let amount_key = match side {
            Side::Buy => "quoteOrderQty",
            Side::Sell => "quantity",
        };
        let params = [
            ("symbol", pair.to_string()),
            ("side", side.to_string()),
            ("type", "MARKET".to_string()),
            (amount_key, amount.to_string()),
        ];

        let url = self.signed_url("/api/v3/order", &params);
        let resp = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        let order: RawOrder = Self::check(resp).await?.json().await?;

        Ok(OrderReceipt {
            order_id: order.order_id.to_string(),
            status: order.status,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTicker {
    price: String,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    balances: Vec<RawAccountBalance>,
}

#[derive(Debug, Deserialize)]
struct RawAccountBalance {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    price: String,
    qty: String,
    commission: String,
    time: i64,
    #[serde(rename = "isBuyer")]
    is_buyer: bool,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    #[serde(rename = "orderId")]
    order_id: i64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawWalletBalance {
    #[serde(rename = "walletName")]
    wallet_name: String,
    balance: String,
}

/// One wallet's BTC-denominated balance from the SAPI rollup.
#[derive(Debug, Clone)]
pub struct WalletBalance {
    pub wallet_name: String,
    pub balance_btc: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BinanceClient {
        BinanceClient::new(
            Client::new(),
            "key".into(),
            "key".into(),
            "https://example.invalid".into(),
        )
    }

    #[test]
    fn sign_query_matches_known_hmac_vector() {
        // RFC-style HMAC-SHA256 test vector.
        let c = client();
        let sig = c.sign_query("The quick brown fox jumps over the lazy dog");
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn signed_url_appends_signature_last() {
        let c = client();
        let url = c.signed_url("/api/v3/account", &[]);
        assert!(url.starts_with("https://example.invalid/api/v3/account?timestamp="));
        assert!(url.contains("&recvWindow=5000&signature="));
    }

    #[test]
    fn spot_pair_concatenates() {
        assert_eq!(client().spot_pair("BTC", "USDT"), "BTCUSDT");
    }
}
