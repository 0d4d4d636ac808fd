use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::TradingError;
use crate::exchange::traits::{MarketDataProvider, OrderGateway, SentimentProvider, SubmitError};
use crate::models::market_data::MarketSnapshot;
use crate::models::order::{OrderId, OrderIntent};
use crate::sentiment::SentimentReading;

/// A mock implementation of the provider traits for testing and development
pub struct MockExchange {
    snapshots: HashMap<String, MarketSnapshot>,
    submitted: Vec<(OrderId, OrderIntent)>,
    cancelled: Vec<OrderId>,
    order_id_counter: u64,
    /// Fail this many submits with a transient error before succeeding
    transient_failures_remaining: usize,
    /// Reject any intent whose limit price equals this value
    reject_at_price: Option<Decimal>,
    /// Reject every submit
    reject_all: bool,
}

impl MockExchange {
    pub fn new() -> Self {
        let mut exchange = Self {
            snapshots: HashMap::new(),
            submitted: Vec::new(),
            cancelled: Vec::new(),
            order_id_counter: 0,
            transient_failures_remaining: 0,
            reject_at_price: None,
            reject_all: false,
        };

        // Initialize with some test data
        exchange.insert_snapshot(MarketSnapshot::new(
            "BTCUSDT",
            dec!(50000),
            dec!(0.1),
            dec!(0.001),
            dec!(100),
        ));
        exchange.insert_snapshot(MarketSnapshot::new(
            "ETHUSDT",
            dec!(3000),
            dec!(0.01),
            dec!(0.01),
            dec!(100),
        ));
        exchange
    }

    pub fn insert_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshots.insert(snapshot.symbol.clone(), snapshot);
    }

    pub fn set_price(&mut self, symbol: &str, price: Decimal) {
        if let Some(snapshot) = self.snapshots.get_mut(symbol) {
            snapshot.last_price = price;
        }
    }

    pub fn fail_transient(&mut self, count: usize) {
        self.transient_failures_remaining = count;
    }

    pub fn reject_at_price(&mut self, price: Decimal) {
        self.reject_at_price = Some(price);
    }

    pub fn reject_all(&mut self) {
        self.reject_all = true;
    }

    pub fn submitted_orders(&self) -> &[(OrderId, OrderIntent)] {
        &self.submitted
    }

    pub fn cancelled_orders(&self) -> &[OrderId] {
        &self.cancelled
    }

    fn generate_order_id(&mut self) -> OrderId {
        self.order_id_counter += 1;
        OrderId(format!("mock-{}", self.order_id_counter))
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for MockExchange {
    async fn get_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, TradingError> {
        self.snapshots
            .get(symbol)
            .cloned()
            .ok_or_else(|| TradingError::DataNotFound(format!("no snapshot for {}", symbol)))
    }

    async fn get_current_price(&self, symbol: &str) -> Result<Decimal, TradingError> {
        Ok(self.get_snapshot(symbol).await?.last_price)
    }
}

#[async_trait]
impl OrderGateway for MockExchange {
    async fn submit(&mut self, intent: &OrderIntent) -> Result<OrderId, SubmitError> {
        if self.transient_failures_remaining > 0 {
            self.transient_failures_remaining -= 1;
            return Err(SubmitError::Transient("injected network failure".to_string()));
        }

        if self.reject_all {
            return Err(SubmitError::Rejected("injected rejection".to_string()));
        }

        if let (Some(reject_price), Some(price)) = (self.reject_at_price, intent.price) {
            if price == reject_price {
                return Err(SubmitError::Rejected(format!("injected rejection at {}", price)));
            }
        }

        let order_id = self.generate_order_id();
        self.submitted.push((order_id.clone(), intent.clone()));
        Ok(order_id)
    }

    async fn cancel(&mut self, _symbol: &str, order_id: &OrderId) -> Result<(), SubmitError> {
        if self.submitted.iter().any(|(id, _)| id == order_id) {
            self.cancelled.push(order_id.clone());
            Ok(())
        } else {
            Err(SubmitError::Rejected(format!("unknown order {}", order_id)))
        }
    }
}

/// Fixed-reading sentiment provider for tests
pub struct MockSentimentProvider {
    reading: Option<SentimentReading>,
}

impl MockSentimentProvider {
    pub fn with_reading(reading: SentimentReading) -> Self {
        MockSentimentProvider {
            reading: Some(reading),
        }
    }

    /// Simulates a provider outage
    pub fn unavailable() -> Self {
        MockSentimentProvider { reading: None }
    }
}

#[async_trait]
impl SentimentProvider for MockSentimentProvider {
    async fn current_reading(&self) -> Result<SentimentReading, TradingError> {
        self.reading
            .clone()
            .ok_or_else(|| TradingError::SentimentUnavailable("mock outage".to_string()))
    }
}
