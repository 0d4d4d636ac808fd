use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::TradingError;
use crate::models::market_data::MarketSnapshot;
use crate::models::order::{OrderId, OrderIntent};
use crate::sentiment::SentimentReading;

/// Submission failure classes reported by an order gateway.
///
/// The executor retries `Transient` with backoff and never retries
/// `Rejected`.
#[derive(Error, Debug, Clone)]
pub enum SubmitError {
    /// Exchange-side business rule failure (insufficient margin, bad symbol...)
    #[error("rejected: {0}")]
    Rejected(String),

    /// Network / timeout / 5xx class failure
    #[error("transient: {0}")]
    Transient(String),
}

/// Read-only market facts provider.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch trading rules and last price for a symbol
    async fn get_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, TradingError>;

    /// Fetch the current traded price for a symbol
    async fn get_current_price(&self, symbol: &str) -> Result<Decimal, TradingError>;
}

/// Order placement collaborator. The engine never talks to the wire
/// directly; everything goes through this narrow contract.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit one intent, returning the exchange-assigned order id
    async fn submit(&mut self, intent: &OrderIntent) -> Result<OrderId, SubmitError>;

    /// Cancel a previously accepted order
    async fn cancel(&mut self, symbol: &str, order_id: &OrderId) -> Result<(), SubmitError>;
}

/// External sentiment index provider.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn current_reading(&self) -> Result<SentimentReading, TradingError>;
}
