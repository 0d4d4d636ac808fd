use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TradingError;
use crate::exchange::traits::{MarketDataProvider, OrderGateway, SubmitError};
use crate::models::market_data::MarketSnapshot;
use crate::models::order::{OrderId, OrderIntent, OrderType};

type HmacSha256 = Hmac<Sha256>;

/// Binance USDT-M Futures REST connector (minimal subset)
pub struct BinanceFutures {
    base_url: String,
    api_key: String,
    api_secret: String,
    http: reqwest::Client,
}

impl BinanceFutures {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        BinanceFutures {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            http: reqwest::Client::new(),
        }
    }

    fn timestamp_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn sign(&self, query: &str) -> Result<String, TradingError> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| TradingError::ConfigError(format!("invalid api secret: {}", e)))?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn decimal_field(json: &serde_json::Value, key: &str) -> Option<Decimal> {
        json.get(key)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<Decimal>().ok())
    }

    /// Map an HTTP-level result onto the executor's failure classes:
    /// transport errors and 5xx are transient, 4xx is a business rejection.
    async fn classify_response(res: reqwest::Response) -> Result<serde_json::Value, SubmitError> {
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| SubmitError::Transient(format!("read body: {}", e)))?;

        if status.is_success() {
            serde_json::from_str(&body)
                .map_err(|e| SubmitError::Transient(format!("parse response: {}", e)))
        } else if status.is_server_error() {
            Err(SubmitError::Transient(format!("{}: {}", status, body)))
        } else {
            Err(SubmitError::Rejected(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl MarketDataProvider for BinanceFutures {
    async fn get_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, TradingError> {
        let url = format!("{}/fapi/v1/exchangeInfo?symbol={}", self.base_url, symbol);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TradingError::ExchangeError(format!("exchangeInfo http error: {}", e)))?;
        let status = res.status();
        let json = res
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TradingError::ExchangeError(format!("exchangeInfo parse error: {}", e)))?;
        if !status.is_success() {
            return Err(TradingError::ExchangeError(format!("exchangeInfo failed: {}", status)));
        }

        let info = json
            .get("symbols")
            .and_then(|s| s.as_array())
            .and_then(|arr| {
                arr.iter()
                    .find(|s| s.get("symbol").and_then(|v| v.as_str()) == Some(symbol))
            })
            .ok_or_else(|| TradingError::DataNotFound(format!("symbol {} not in exchangeInfo", symbol)))?;

        let tradable = info.get("status").and_then(|v| v.as_str()) == Some("TRADING");

        let mut tick_size = None;
        let mut step_size = None;
        let mut min_notional = None;
        if let Some(filters) = info.get("filters").and_then(|f| f.as_array()) {
            for filter in filters {
                match filter.get("filterType").and_then(|v| v.as_str()) {
                    Some("PRICE_FILTER") => tick_size = Self::decimal_field(filter, "tickSize"),
                    Some("LOT_SIZE") => step_size = Self::decimal_field(filter, "stepSize"),
                    Some("MIN_NOTIONAL") => min_notional = Self::decimal_field(filter, "notional"),
                    _ => {}
                }
            }
        }

        let last_price = self.get_current_price(symbol).await?;

        let mut snapshot = MarketSnapshot::new(
            symbol,
            last_price,
            tick_size.ok_or_else(|| TradingError::DataNotFound("PRICE_FILTER missing".to_string()))?,
            step_size.ok_or_else(|| TradingError::DataNotFound("LOT_SIZE missing".to_string()))?,
            min_notional.unwrap_or(Decimal::ZERO),
        );
        snapshot.tradable = tradable;
        Ok(snapshot)
    }

    async fn get_current_price(&self, symbol: &str) -> Result<Decimal, TradingError> {
        let url = format!("{}/fapi/v1/ticker/price?symbol={}", self.base_url, symbol);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TradingError::ExchangeError(format!("ticker http error: {}", e)))?;
        let status = res.status();
        let json = res
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TradingError::ExchangeError(format!("ticker parse error: {}", e)))?;
        if !status.is_success() {
            return Err(TradingError::ExchangeError(format!("ticker failed: {}", status)));
        }

        Self::decimal_field(&json, "price")
            .ok_or_else(|| TradingError::ParseError(format!("no price for {}", symbol)))
    }
}

#[async_trait]
impl OrderGateway for BinanceFutures {
    async fn submit(&mut self, intent: &OrderIntent) -> Result<OrderId, SubmitError> {
        let order_type = match intent.order_type {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            // Binance futures calls a stop-limit order "STOP"
            OrderType::StopLimit => "STOP",
        };

        let mut params = vec![
            format!("symbol={}", intent.symbol),
            format!("side={}", intent.side),
            format!("type={}", order_type),
            format!("quantity={}", intent.quantity),
            format!("newClientOrderId={}", intent.client_order_id),
            format!("timestamp={}", Self::timestamp_ms()),
        ];
        if let Some(price) = intent.price {
            if intent.order_type.requires_price() {
                params.push(format!("price={}", price));
                params.push("timeInForce=GTC".to_string());
            }
        }
        if let Some(stop_price) = intent.stop_price {
            params.push(format!("stopPrice={}", stop_price));
        }
        if intent.reduce_only {
            params.push("reduceOnly=true".to_string());
        }

        let query = params.join("&");
        let signature = self
            .sign(&query)
            .map_err(|e| SubmitError::Rejected(format!("signing failed: {}", e)))?;
        let url = format!("{}/fapi/v1/order?{}&signature={}", self.base_url, query, signature);

        let res = self
            .http
            .post(url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| SubmitError::Transient(format!("submit http error: {}", e)))?;

        let json = Self::classify_response(res).await?;

        json.get("orderId")
            .and_then(|v| v.as_i64())
            .map(|id| OrderId(id.to_string()))
            .ok_or_else(|| SubmitError::Transient("response missing orderId".to_string()))
    }

    async fn cancel(&mut self, symbol: &str, order_id: &OrderId) -> Result<(), SubmitError> {
        let query = format!(
            "symbol={}&orderId={}&timestamp={}",
            symbol,
            order_id,
            Self::timestamp_ms()
        );
        let signature = self
            .sign(&query)
            .map_err(|e| SubmitError::Rejected(format!("signing failed: {}", e)))?;
        let url = format!("{}/fapi/v1/order?{}&signature={}", self.base_url, query, signature);

        let res = self
            .http
            .delete(url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| SubmitError::Transient(format!("cancel http error: {}", e)))?;

        Self::classify_response(res).await.map(|_| ())
    }
}
