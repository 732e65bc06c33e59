use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::{Digest, Sha512};

use crate::errors::ExchangeError;
use crate::exchange::ExchangeApi;
use crate::models::{AssetBalance, OrderReceipt, Side, Trade};

type HmacSha512 = Hmac<Sha512>;

const API_PREFIX: &str = "/api/v4";

/// Gate.io v4 REST client.
///
/// Signed requests carry `KEY`, `Timestamp`, and `SIGN` headers, where SIGN is
/// HMAC-SHA512 over `method\npath\nquery\nsha512(body)\ntimestamp`.
#[derive(Debug, Clone)]
pub struct GateClient {
    http: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl GateClient {
    pub fn new(http: Client, api_key: String, api_secret: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            api_secret,
            base_url,
        }
    }

    /// Build the v4 signature for one request.
    fn sign(&self, method: &str, path: &str, query: &str, body: &str, timestamp: &str) -> String {
        let body_hash = hex::encode(Sha512::digest(body.as_bytes()));
        let payload = format!("{method}\n{path}\n{query}\n{body_hash}\n{timestamp}");

        let mut mac = HmacSha512::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> reqwest::RequestBuilder {
        let full_path = format!("{API_PREFIX}{path}");
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let body_str = body.as_deref().unwrap_or("");
        let signature = self.sign(method.as_str(), &full_path, query, body_str, &timestamp);

        let url = if query.is_empty() {
            format!("{}{}", self.base_url, full_path)
        } else {
            format!("{}{}?{}", self.base_url, full_path, query)
        };

        let mut req = self
            .http
            .request(method, &url)
            .header("KEY", &self.api_key)
            .header("Timestamp", timestamp)
            .header("SIGN", signature);
        if let Some(b) = body {
            req = req
                .header("Content-Type", "application/json")
                .body(b);
        }
        req
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

    /// Account-wide total estimated balance in USDT, all wallets included.
    pub async fn total_balance(&self) -> Result<Decimal, ExchangeError> {
        let resp = self
            .signed_request(reqwest::Method::GET, "/wallet/total_balance", "", None)
            .send()
            .await?;
        let total: RawTotalBalance = Self::check(resp).await?.json().await?;
        Ok(total.total.amount.parse()?)
    }
}

#[async_trait]
impl ExchangeApi for GateClient {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn spot_pair(&self, base: &str, quote: &str) -> String {
        format!("{base}_{quote}")
    }

    async fn ticker_price(&self, pair: &str) -> Result<Decimal, ExchangeError> {
        let url = format!(
            "{}{}/spot/tickers?currency_pair={}",
            self.base_url, API_PREFIX, pair
        );
        let resp = Self::check(self.http.get(&url).send().await?).await?;
        let tickers: Vec<RawTicker> = resp.json().await?;

        let ticker = tickers
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::Unexpected(format!("no ticker for {pair}")))?;
        Ok(ticker.last.parse()?)
    }

    async fn trade_history(&self, pair: &str) -> Result<Vec<Trade>, ExchangeError> {
        let query = format!("currency_pair={pair}");
        let resp = self
            .signed_request(reqwest::Method::GET, "/spot/my_trades", &query, None)
            .send()
            .await?;
        let raw: Vec<RawTrade> = Self::check(resp).await?.json().await?;

        let mut trades = Vec::with_capacity(raw.len());
        for t in raw {
            let side = Side::from_api_str(&t.side)
                .ok_or_else(|| ExchangeError::Unexpected(format!("unknown side: {}", t.side)))?;
            let secs: i64 = t
                .create_time
                .parse()
                .map_err(|_| ExchangeError::Unexpected(format!("bad timestamp: {}", t.create_time)))?;
            trades.push(Trade {
                pair: pair.to_string(),
                side,
                price: t.price.parse()?,
                quantity: t.amount.parse()?,
                fee: t.fee.map(|f| f.parse()).transpose()?,
                executed_at: chrono::DateTime::from_timestamp(secs, 0)
                    .unwrap_or_else(chrono::Utc::now),
            });
        }
        // Gate returns newest first; the accumulator wants oldest first.
        trades.sort_by_key(|t| t.executed_at);
        Ok(trades)
    }

    async fn account_balances(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        let resp = self
            .signed_request(reqwest::Method::GET, "/spot/accounts", "", None)
            .send()
            .await?;
        let raw: Vec<RawAccount> = Self::check(resp).await?.json().await?;

        let mut balances = Vec::new();
        for a in raw {
            let free: Decimal = a.available.parse()?;
            if free > Decimal::ZERO {
                balances.push(AssetBalance {
                    asset: a.currency,
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
        let body = serde_json::json!({
            "currency_pair": pair,
            "side": side.to_string().to_lowercase(),
            "type": "market",
            "account": "spot",
            "amount": amount.to_string(),
            "time_in_force": "ioc",
        })
        .to_string();

        let resp = self
            .signed_request(reqwest::Method::POST, "/spot/orders", "", Some(body))
            .send()
            .await?;
        let order: RawOrder = Self::check(resp).await?.json().await?;

        Ok(OrderReceipt {
            order_id: order.id,
            status: order.status,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTicker {
    last: String,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    side: String,
    amount: String,
    price: String,
    #[serde(default)]
    fee: Option<String>,
    create_time: String,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    currency: String,
    available: String,
}

#[derive(Debug, Deserialize)]
struct RawTotalBalance {
    total: RawTotalEntry,
}

#[derive(Debug, Deserialize)]
struct RawTotalEntry {
    amount: String,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    id: String,
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GateClient {
        GateClient::new(
            Client::new(),
            "key".into(),
            "secret".into(),
            "https://example.invalid".into(),
        )
    }

    #[test]
    fn sign_produces_hex_sha512_output() {
        let sig = client().sign("GET", "/api/v4/spot/accounts", "", "", "1700000000");
        // 64-byte digest, hex-encoded
        assert_eq!(sig.len(), 128);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sign_is_deterministic_and_body_sensitive() {
        let c = client();
        let a = c.sign("POST", "/api/v4/spot/orders", "", "{}", "1700000000");
        let b = c.sign("POST", "/api/v4/spot/orders", "", "{}", "1700000000");
        let other = c.sign("POST", "/api/v4/spot/orders", "", "[]", "1700000000");
        assert_eq!(a, b);
        assert_ne!(a, other);
    }

    #[test]
    fn spot_pair_uses_underscore() {
        assert_eq!(client().spot_pair("BTC", "USDT"), "BTC_USDT");
    }
}
