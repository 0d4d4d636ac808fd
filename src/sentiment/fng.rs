//! Crypto Fear & Greed 지수 클라이언트 (alternative.me)

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TradingError;
use crate::exchange::traits::SentimentProvider;
use crate::sentiment::{SentimentReading, Zone};

/// alternative.me 공개 API 커넥터
pub struct FngClient {
    base_url: String,
    http: reqwest::Client,
}

impl FngClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, TradingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TradingError::ConfigError(format!("failed to build http client: {}", e)))?;

        Ok(FngClient {
            base_url: base_url.into(),
            http,
        })
    }
}

#[async_trait]
impl SentimentProvider for FngClient {
    async fn current_reading(&self) -> Result<SentimentReading, TradingError> {
        let url = format!("{}/fng/?limit=1", self.base_url);
        log::info!("공포-탐욕 지수 조회: {}", url);

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TradingError::SentimentUnavailable(format!("http error: {}", e)))?;

        if !res.status().is_success() {
            return Err(TradingError::SentimentUnavailable(format!(
                "index endpoint returned {}",
                res.status()
            )));
        }

        let json = res
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TradingError::SentimentUnavailable(format!("parse error: {}", e)))?;

        let entry = json
            .get("data")
            .and_then(|d| d.get(0))
            .ok_or_else(|| TradingError::SentimentUnavailable("index API returned no data".to_string()))?;

        let value: u8 = entry
            .get("value")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| TradingError::SentimentUnavailable("missing index value".to_string()))?;

        // 제공자 분류 문자열을 우선하고, 없으면 값에서 구간을 계산
        let zone = entry
            .get("value_classification")
            .and_then(|v| v.as_str())
            .and_then(Zone::from_classification)
            .unwrap_or_else(|| Zone::from_index(value));

        log::info!("공포-탐욕 지수 수신: value={} zone={:?}", value, zone);

        Ok(SentimentReading::new(value, zone))
    }
}
