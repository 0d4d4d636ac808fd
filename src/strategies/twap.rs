//! TWAP 전략
//!
//! 총 수량을 무작위화된 조각으로 나누어 지정 시간에 걸쳐 실행한다.
//! 조각 수량의 합은 요청 총량과 정확히 일치한다 (마지막 조각이
//! 나머지를 흡수한다).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep_until, Duration, Instant};

use crate::error::TradingError;
use crate::exchange::traits::MarketDataProvider;
use crate::models::market_data::MarketSnapshot;
use crate::models::order::{GroupId, OrderIntent, OrderSide};
use crate::models::outcome::StrategySummary;
use crate::order_core::{OrderExecutor, OrderValidator};
use crate::strategies::{run_intent, SentimentFilter, StopSignal};
use crate::utils::logging;
use crate::utils::math::{clamp, is_multiple_of, quantize_down, units_in};

/// 분할 수 하한/상한
const MIN_SLICES: usize = 2;
const MAX_SLICES: usize = 100;

/// TWAP 요청 파라미터
#[derive(Debug, Clone)]
pub struct TwapParams {
    pub symbol: String,
    pub side: OrderSide,
    pub total_quantity: Decimal,
    pub duration_minutes: u64,
    /// 분할 수 힌트. 없으면 분당 1개 기준으로 산출한다.
    pub slice_count: Option<usize>,
    /// 지정가가 있으면 LIMIT, 없으면 MARKET 조각을 낸다.
    pub limit_price: Option<Decimal>,
    pub use_sentiment: bool,
}

/// 계획된 조각 하나
#[derive(Debug, Clone)]
pub struct TwapSlice {
    pub quantity: Decimal,
    /// 실행 시작 기준 오프셋
    pub offset: Duration,
}

/// 한 번의 TWAP 호출에 대한 실행 계획
#[derive(Debug, Clone)]
pub struct TwapPlan {
    pub group_id: GroupId,
    pub slices: Vec<TwapSlice>,
}

/// TWAP 플래너 겸 실행기
pub struct TwapPlanner {
    market: Arc<RwLock<dyn MarketDataProvider>>,
    executor: OrderExecutor,
    validator: OrderValidator,
    sentiment: Option<SentimentFilter>,
    rng: StdRng,
}

impl TwapPlanner {
    pub fn new(market: Arc<RwLock<dyn MarketDataProvider>>, executor: OrderExecutor) -> Self {
        TwapPlanner {
            market,
            executor,
            validator: OrderValidator::new(),
            sentiment: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_sentiment(mut self, filter: SentimentFilter) -> Self {
        self.sentiment = Some(filter);
        self
    }

    /// 테스트에서 결정적 계획을 얻기 위한 시드 주입
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 실행 계획 산출
    ///
    /// 수량: 균등분을 ±30% 무작위화하되 step 단위로 내림, 마지막
    /// 조각이 정확한 나머지를 가져간다. 일정: 조각 i는
    /// `i*interval + jitter` (jitter < 0.6*interval)에 배치되어
    /// 순증가가 보장되고 조각 간 최소 간격은 0.4*interval이다.
    pub fn plan(&mut self, params: &TwapParams, snapshot: &MarketSnapshot) -> Result<TwapPlan, TradingError> {
        if params.total_quantity <= Decimal::ZERO {
            return Err(TradingError::ConfigError("total quantity must be positive".to_string()));
        }
        if params.duration_minutes == 0 {
            return Err(TradingError::ConfigError("duration must be at least one minute".to_string()));
        }
        let step = snapshot.step_size;
        if !is_multiple_of(params.total_quantity, step) {
            return Err(TradingError::ConfigError(format!(
                "total quantity {} is not a multiple of step size {}",
                params.total_quantity, step
            )));
        }
        let whole_steps = units_in(params.total_quantity, step) as usize;
        if whole_steps < MIN_SLICES {
            return Err(TradingError::ConfigError(format!(
                "total quantity {} is too small to split into {} slices",
                params.total_quantity, MIN_SLICES
            )));
        }

        let hinted = params.slice_count.unwrap_or(params.duration_minutes as usize);
        let count = clamp(hinted, MIN_SLICES, MAX_SLICES).min(whole_steps);

        // 수량 분배: 이후 모든 조각에 최소 한 step이 남도록 상한을 둔다
        let even_share = params.total_quantity / Decimal::from(count as u64);
        let mut slices = Vec::with_capacity(count);
        let mut remaining = params.total_quantity;
        for i in 0..count - 1 {
            let slices_after = Decimal::from((count - 1 - i) as u64);
            let factor = Decimal::from(self.rng.gen_range(70..=130u32)) / dec!(100);
            let mut quantity = quantize_down(even_share * factor, step);
            let max_allowed = remaining - step * slices_after;
            if quantity > max_allowed {
                quantity = quantize_down(max_allowed, step);
            }
            if quantity < step {
                quantity = step;
            }
            remaining -= quantity;
            slices.push(quantity);
        }
        slices.push(remaining);

        // 일정 분배
        let duration_secs = (params.duration_minutes * 60) as f64;
        let interval = duration_secs / count as f64;
        let plan_slices = slices
            .into_iter()
            .enumerate()
            .map(|(i, quantity)| {
                let jitter = self.rng.gen_range(0.0..interval * 0.6);
                TwapSlice {
                    quantity,
                    offset: Duration::from_secs_f64(i as f64 * interval + jitter),
                }
            })
            .collect();

        Ok(TwapPlan {
            group_id: GroupId::new(),
            slices: plan_slices,
        })
    }

    /// 계획 수립 후 시간순으로 실행
    ///
    /// 거부되거나 재시도가 소진된 조각은 기록하고 건너뛴다.
    /// 부분 완료는 정상 결과이며 요약에 그대로 보고된다.
    pub async fn execute(&mut self, params: TwapParams, stop: &StopSignal) -> Result<StrategySummary, TradingError> {
        let snapshot = self.market.read().await.get_snapshot(&params.symbol).await?;
        let plan = self.plan(&params, &snapshot)?;

        self.executor.reset_accepted();
        let mut summary = StrategySummary::new(plan.group_id, plan.slices.len(), params.total_quantity);
        logging::log_strategy_start("TWAP", &params.symbol);

        let started = Instant::now();
        for (i, slice) in plan.slices.iter().enumerate() {
            if stop.is_stopped() {
                log::warn!("TWAP 중단 신호 수신: 남은 {}개 조각 취소", plan.slices.len() - i);
                break;
            }

            sleep_until(started + slice.offset).await;

            if stop.is_stopped() {
                log::warn!("TWAP 중단 신호 수신: 남은 {}개 조각 취소", plan.slices.len() - i);
                break;
            }

            log::info!(
                "TWAP 조각 {}/{}: 수량 {}",
                i + 1,
                plan.slices.len(),
                slice.quantity
            );

            let intent = match params.limit_price {
                Some(price) => OrderIntent::limit(&params.symbol, params.side, slice.quantity, price),
                None => OrderIntent::market(&params.symbol, params.side, slice.quantity),
            }
            .with_group(plan.group_id);

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

        logging::log_strategy_end("TWAP", &summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::mocks::MockExchange;
    use crate::order_core::RetryPolicy;

    fn planner(seed: u64) -> TwapPlanner {
        let exchange = Arc::new(RwLock::new(MockExchange::new()));
        let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
        TwapPlanner::new(exchange, executor).with_seed(seed)
    }

    fn btc_snapshot() -> MarketSnapshot {
        use rust_decimal_macros::dec;
        MarketSnapshot::new("BTCUSDT", dec!(50000), dec!(0.1), dec!(0.001), dec!(100))
    }

    fn params(total: Decimal, minutes: u64) -> TwapParams {
        TwapParams {
            symbol: "BTCUSDT".to_string(),
            side: OrderSide::Buy,
            total_quantity: total,
            duration_minutes: minutes,
            slice_count: None,
            limit_price: None,
            use_sentiment: false,
        }
    }

    #[test]
    fn test_slice_quantities_sum_exactly() {
        for seed in 0..20 {
            let mut planner = planner(seed);
            let plan = planner.plan(&params(dec!(1), 60), &btc_snapshot()).unwrap();

            let sum: Decimal = plan.slices.iter().map(|s| s.quantity).sum();
            assert_eq!(sum, dec!(1), "seed {}", seed);
            assert!(plan.slices.iter().all(|s| s.quantity > Decimal::ZERO));
        }
    }

    #[test]
    fn test_slice_count_within_bounds() {
        let mut planner = planner(7);

        // 60분 → 분당 1개 힌트
        let plan = planner.plan(&params(dec!(1), 60), &btc_snapshot()).unwrap();
        assert_eq!(plan.slices.len(), 60);

        // 1분 → 하한 2개로 클램프
        let plan = planner.plan(&params(dec!(1), 1), &btc_snapshot()).unwrap();
        assert_eq!(plan.slices.len(), MIN_SLICES);

        // 500분 → 상한 100개로 클램프
        let plan = planner.plan(&params(dec!(1), 500), &btc_snapshot()).unwrap();
        assert_eq!(plan.slices.len(), MAX_SLICES);
    }

    #[test]
    fn test_offsets_keep_minimum_gap_within_duration() {
        for seed in 0..20 {
            let mut planner = planner(seed);
            let minutes = 60u64;
            let plan = planner.plan(&params(dec!(1), minutes), &btc_snapshot()).unwrap();

            let duration = Duration::from_secs(minutes * 60);
            let interval = (minutes * 60) as f64 / plan.slices.len() as f64;
            // 조각이 몰리지 않도록 간격 하한 0.4 * interval 보장
            let min_gap = Duration::from_secs_f64(interval * 0.4);
            let mut previous = None;
            for slice in &plan.slices {
                assert!(slice.offset < duration);
                if let Some(prev) = previous {
                    assert!(slice.offset > prev, "seed {}", seed);
                    assert!(slice.offset - prev >= min_gap, "seed {}", seed);
                }
                previous = Some(slice.offset);
            }
        }
    }

    #[test]
    fn test_seeded_plan_is_reproducible() {
        let plan_a = planner(42).plan(&params(dec!(1), 60), &btc_snapshot()).unwrap();
        let plan_b = planner(42).plan(&params(dec!(1), 60), &btc_snapshot()).unwrap();

        let quantities_a: Vec<_> = plan_a.slices.iter().map(|s| s.quantity).collect();
        let quantities_b: Vec<_> = plan_b.slices.iter().map(|s| s.quantity).collect();
        assert_eq!(quantities_a, quantities_b);
    }

    #[test]
    fn test_slice_count_capped_by_step_units() {
        let mut planner = planner(3);
        // 0.005 / 0.001 = 5 steps, 힌트 60이어도 5개 이하
        let plan = planner.plan(&params(dec!(0.005), 60), &btc_snapshot()).unwrap();
        assert_eq!(plan.slices.len(), 5);
    }

    #[test]
    fn test_invalid_params_are_config_errors() {
        let mut planner = planner(1);
        let snapshot = btc_snapshot();

        assert!(planner.plan(&params(dec!(0), 60), &snapshot).is_err());
        assert!(planner.plan(&params(dec!(1), 0), &snapshot).is_err());
        // step 배수가 아닌 총량
        assert!(planner.plan(&params(dec!(0.0015), 60), &snapshot).is_err());
        // step 1개 분량은 쪼갤 수 없음
        assert!(planner.plan(&params(dec!(0.001), 60), &snapshot).is_err());
    }
}
