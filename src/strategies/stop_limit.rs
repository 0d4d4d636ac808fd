//! 스탑-리밋 전략
//!
//! STOP_LIMIT 의도 하나를 핵심 주문과 같은 경로(게이트 → 검증 →
//! 실행기)로 처리한다. 추가 알고리즘은 없고 트리거 방향 규칙은
//! 검증기가 담당한다.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::MarketDataProvider;
use crate::models::order::{GroupId, OrderIntent, OrderSide};
use crate::models::outcome::StrategySummary;
use crate::order_core::{OrderExecutor, OrderValidator};
use crate::strategies::{run_intent, SentimentFilter};
use crate::utils::logging;

/// 스탑-리밋 요청 파라미터
#[derive(Debug, Clone)]
pub struct StopLimitParams {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    /// 트리거 이후 깔리는 지정가
    pub price: Decimal,
    /// 트리거 가격
    pub stop_price: Decimal,
    pub use_sentiment: bool,
}

/// 스탑-리밋 플래너 겸 실행기
pub struct StopLimitPlanner {
    market: Arc<RwLock<dyn MarketDataProvider>>,
    executor: OrderExecutor,
    validator: OrderValidator,
    sentiment: Option<SentimentFilter>,
}

impl StopLimitPlanner {
    pub fn new(market: Arc<RwLock<dyn MarketDataProvider>>, executor: OrderExecutor) -> Self {
        StopLimitPlanner {
            market,
            executor,
            validator: OrderValidator::new(),
            sentiment: None,
        }
    }

    pub fn with_sentiment(mut self, filter: SentimentFilter) -> Self {
        self.sentiment = Some(filter);
        self
    }

    pub async fn execute(&mut self, params: StopLimitParams) -> Result<StrategySummary, TradingError> {
        let snapshot = self.market.read().await.get_snapshot(&params.symbol).await?;

        let group_id = GroupId::new();
        let intent = OrderIntent::stop_limit(
            &params.symbol,
            params.side,
            params.quantity,
            params.price,
            params.stop_price,
        )
        .with_group(group_id);

        self.executor.reset_accepted();
        let mut summary = StrategySummary::new(group_id, 1, params.quantity);
        logging::log_strategy_start("STOP_LIMIT", &params.symbol);

        let outcome = run_intent(
            &self.executor,
            &self.validator,
            if params.use_sentiment { self.sentiment.as_ref() } else { None },
            intent,
            &snapshot,
        )
        .await;
        summary.record(outcome);

        logging::log_strategy_end("STOP_LIMIT", &summary);
        Ok(summary)
    }
}
