use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::exchange::traits::{OrderGateway, SubmitError};
use crate::models::order::{OrderId, OrderIntent};

/// A no-op gateway that logs intents without sending them
pub struct DryRunGateway;

impl DryRunGateway {
    pub fn new() -> Self {
        Self
    }

    fn ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl Default for DryRunGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderGateway for DryRunGateway {
    async fn submit(&mut self, intent: &OrderIntent) -> Result<OrderId, SubmitError> {
        log::info!(
            "[dry-run] {} {} {:?} qty={} price={:?} stop={:?} reduce_only={}",
            intent.symbol,
            intent.side,
            intent.order_type,
            intent.quantity,
            intent.price,
            intent.stop_price,
            intent.reduce_only
        );
        Ok(OrderId(format!("dry-{}-{}", intent.symbol, Self::ts())))
    }

    async fn cancel(&mut self, _symbol: &str, order_id: &OrderId) -> Result<(), SubmitError> {
        log::info!("[dry-run] cancel {}", order_id);
        Ok(())
    }
}
