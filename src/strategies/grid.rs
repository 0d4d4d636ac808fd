//! 그리드 전략
//!
//! [range_bottom, range_top] 구간에 균등 간격의 지정가 주문을 깐다.
//! 현재가 아래는 매수, 위는 매도. 초기 설치 한 번만 수행하며 체결
//! 모니터링과 재설치는 외부 장기 실행 프로세스의 몫이다.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::MarketDataProvider;
use crate::models::market_data::MarketSnapshot;
use crate::models::order::{GroupId, OrderIntent, OrderSide};
use crate::models::outcome::StrategySummary;
use crate::order_core::{OrderExecutor, OrderValidator};
use crate::strategies::{run_intent, SentimentFilter, StopSignal};
use crate::utils::logging;
use crate::utils::math::quantize_down;

/// 그리드 요청 파라미터
#[derive(Debug, Clone)]
pub struct GridParams {
    pub symbol: String,
    pub range_bottom: Decimal,
    pub range_top: Decimal,
    /// 그리드 칸 수. 레벨은 grid_count + 1개 생성된다.
    pub grid_count: u32,
    pub quantity_per_level: Decimal,
    pub use_sentiment: bool,
}

/// 설치할 레벨 전체에 대한 계획
#[derive(Debug, Clone)]
pub struct GridPlan {
    pub group_id: GroupId,
    pub intents: Vec<OrderIntent>,
}

/// 그리드 플래너 겸 실행기
pub struct GridPlanner {
    market: Arc<RwLock<dyn MarketDataProvider>>,
    executor: OrderExecutor,
    validator: OrderValidator,
    sentiment: Option<SentimentFilter>,
}

impl GridPlanner {
    pub fn new(market: Arc<RwLock<dyn MarketDataProvider>>, executor: OrderExecutor) -> Self {
        GridPlanner {
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

    /// 레벨 가격과 방향 산출
    ///
    /// 레벨 i = bottom + (top - bottom) * i / count, tick 단위 내림.
    /// 현재가와 정확히 일치하는 레벨은 즉시 체결을 피하려고 건너뛴다.
    pub fn plan(
        &self,
        params: &GridParams,
        current_price: Decimal,
        snapshot: &MarketSnapshot,
    ) -> Result<GridPlan, TradingError> {
        if params.range_top <= params.range_bottom {
            return Err(TradingError::ConfigError(format!(
                "range top {} must be above range bottom {}",
                params.range_top, params.range_bottom
            )));
        }
        if params.grid_count < 2 {
            return Err(TradingError::ConfigError("grid count must be at least 2".to_string()));
        }
        if params.quantity_per_level <= Decimal::ZERO {
            return Err(TradingError::ConfigError("quantity per level must be positive".to_string()));
        }

        let span = params.range_top - params.range_bottom;
        let count = Decimal::from(params.grid_count);
        // 간격이 tick보다 좁으면 내림 후 레벨이 겹친다
        if span / count < snapshot.tick_size {
            return Err(TradingError::ConfigError(format!(
                "grid spacing {} is below tick size {}",
                span / count,
                snapshot.tick_size
            )));
        }

        let group_id = GroupId::new();
        let mut intents = Vec::with_capacity(params.grid_count as usize + 1);

        for i in 0..=params.grid_count {
            let raw_level = params.range_bottom + span * Decimal::from(i) / count;
            let level = quantize_down(raw_level, snapshot.tick_size);

            let side = if level < current_price {
                OrderSide::Buy
            } else if level > current_price {
                OrderSide::Sell
            } else {
                log::info!("현재가와 일치하는 레벨 {} 건너뜀", level);
                continue;
            };

            intents.push(
                OrderIntent::limit(&params.symbol, side, params.quantity_per_level, level)
                    .with_group(group_id),
            );
        }

        Ok(GridPlan { group_id, intents })
    }

    /// 모든 레벨을 독립적으로 검증하고 설치
    ///
    /// 한 레벨의 거부가 다른 레벨 설치를 막지 않는다.
    pub async fn execute(&mut self, params: GridParams, stop: &StopSignal) -> Result<StrategySummary, TradingError> {
        let snapshot = self.market.read().await.get_snapshot(&params.symbol).await?;
        let current_price = snapshot.last_price;
        let plan = self.plan(&params, current_price, &snapshot)?;

        self.executor.reset_accepted();
        let total_quantity = params.quantity_per_level * Decimal::from(plan.intents.len() as u64);
        let mut summary = StrategySummary::new(plan.group_id, plan.intents.len(), total_quantity);
        logging::log_strategy_start("GRID", &params.symbol);
        log::info!(
            "그리드 설치: {}개 레벨, 현재가 {}",
            plan.intents.len(),
            current_price
        );

        for intent in plan.intents {
            if stop.is_stopped() {
                log::warn!("그리드 중단 신호 수신: 남은 레벨 설치 취소");
                break;
            }

            let outcome = run_intent(
                &self.executor,
                &self.validator,
                if params.use_sentiment { self.sentiment.as_ref() } else { None },
                intent,
                &snapshot,
            )
            .await;
            summary.record(outcome);
        }

        logging::log_strategy_end("GRID", &summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::mocks::MockExchange;
    use crate::order_core::RetryPolicy;
    use rust_decimal_macros::dec;

    fn planner() -> GridPlanner {
        let exchange = Arc::new(RwLock::new(MockExchange::new()));
        let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
        GridPlanner::new(exchange, executor)
    }

    fn eth_snapshot() -> MarketSnapshot {
        MarketSnapshot::new("ETHUSDT", dec!(3000), dec!(0.01), dec!(0.01), dec!(100))
    }

    fn eth_params() -> GridParams {
        GridParams {
            symbol: "ETHUSDT".to_string(),
            range_bottom: dec!(2500),
            range_top: dec!(3500),
            grid_count: 10,
            quantity_per_level: dec!(0.05),
            use_sentiment: false,
        }
    }

    #[test]
    fn test_eleven_evenly_spaced_levels() {
        let plan = planner().plan(&eth_params(), dec!(3050), &eth_snapshot()).unwrap();

        assert_eq!(plan.intents.len(), 11);
        let expected: Vec<Decimal> = (0..=10).map(|i| dec!(2500) + dec!(100) * Decimal::from(i)).collect();
        let levels: Vec<Decimal> = plan.intents.iter().map(|o| o.price.unwrap()).collect();
        assert_eq!(levels, expected);

        // 간격은 (top - bottom) / count
        for pair in levels.windows(2) {
            assert_eq!(pair[1] - pair[0], dec!(100));
        }
    }

    #[test]
    fn test_sides_straddle_current_price() {
        let plan = planner().plan(&eth_params(), dec!(3050), &eth_snapshot()).unwrap();

        for intent in &plan.intents {
            let level = intent.price.unwrap();
            if level < dec!(3050) {
                assert_eq!(intent.side, OrderSide::Buy);
            } else {
                assert_eq!(intent.side, OrderSide::Sell);
            }
            assert_eq!(intent.quantity, dec!(0.05));
            assert_eq!(intent.group_id, Some(plan.group_id));
        }
    }

    #[test]
    fn test_level_at_current_price_skipped() {
        let plan = planner().plan(&eth_params(), dec!(3000), &eth_snapshot()).unwrap();
        assert_eq!(plan.intents.len(), 10);
        assert!(plan.intents.iter().all(|o| o.price != Some(dec!(3000))));
    }

    #[test]
    fn test_inverted_range_is_config_error() {
        let mut params = eth_params();
        params.range_bottom = dec!(3500);
        params.range_top = dec!(2500);

        let result = planner().plan(&params, dec!(3000), &eth_snapshot());
        assert!(matches!(result, Err(TradingError::ConfigError(_))));
    }

    #[test]
    fn test_too_few_grids_is_config_error() {
        let mut params = eth_params();
        params.grid_count = 1;

        let result = planner().plan(&params, dec!(3000), &eth_snapshot());
        assert!(matches!(result, Err(TradingError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_sentiment_gate_blocks_only_buy_levels() {
        use crate::exchange::mocks::MockSentimentProvider;
        use crate::models::outcome::ExecutionFailure;
        use crate::sentiment::{SentimentGate, SentimentReading, Zone};

        let mut mock = MockExchange::new();
        mock.set_price("ETHUSDT", dec!(3050));
        let exchange = Arc::new(RwLock::new(mock));
        let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());

        let provider = Arc::new(RwLock::new(MockSentimentProvider::with_reading(
            SentimentReading::new(80, Zone::Greed),
        )));
        let filter = SentimentFilter::new(SentimentGate::with_defaults(), provider);
        let mut planner = GridPlanner::new(exchange.clone(), executor).with_sentiment(filter);

        let mut params = eth_params();
        params.use_sentiment = true;

        let stop = StopSignal::new();
        let summary = planner.execute(params, &stop).await.unwrap();

        // 탐욕 구간: 현재가 아래 매수 레벨 6개 차단, 매도 레벨 5개만 설치
        assert_eq!(summary.total, 11);
        assert_eq!(summary.executed, 5);
        assert!(summary
            .failures()
            .iter()
            .all(|o| matches!(o.failure, Some(ExecutionFailure::GateBlocked(_)))));
        let guard = exchange.read().await;
        assert!(guard.submitted_orders().iter().all(|(_, o)| o.side == OrderSide::Sell));
    }
}
