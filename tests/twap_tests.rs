//! TWAP 전략 통합 테스트

use std::sync::Arc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use xExec::exchange::mocks::{MockExchange, MockSentimentProvider};
use xExec::models::order::OrderSide;
use xExec::models::outcome::ExecutionFailure;
use xExec::order_core::{OrderExecutor, RetryPolicy};
use xExec::sentiment::{SentimentGate, SentimentReading, Zone};
use xExec::strategies::{SentimentFilter, StopSignal, TwapParams, TwapPlanner};

fn params(total: Decimal, minutes: u64, slices: Option<usize>) -> TwapParams {
  TwapParams {
    symbol: "BTCUSDT".to_string(),
    side: OrderSide::Buy,
    total_quantity: total,
    duration_minutes: minutes,
    slice_count: slices,
    limit_price: None,
    use_sentiment: false,
  }
}

#[tokio::test(start_paused = true)]
async fn test_twap_full_execution() {
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = TwapPlanner::new(exchange.clone(), executor).with_seed(11);

  let stop = StopSignal::new();
  let summary = planner
    .execute(params(dec!(1), 3, Some(3)), &stop)
    .await
    .unwrap();

  // 전 조각 실행, 수량 합은 정확히 총량
  assert_eq!(summary.total, 3);
  assert_eq!(summary.executed, 3);
  assert_eq!(summary.executed_quantity, dec!(1));

  let guard = exchange.read().await;
  let submitted = guard.submitted_orders();
  assert_eq!(submitted.len(), 3);
  let sum: Decimal = submitted.iter().map(|(_, o)| o.quantity).sum();
  assert_eq!(sum, dec!(1));
  // 모든 조각이 같은 그룹을 공유
  let group = submitted[0].1.group_id;
  assert!(submitted.iter().all(|(_, o)| o.group_id == group));
}

#[tokio::test(start_paused = true)]
async fn test_twap_continues_past_rejected_slices() {
  let mut mock = MockExchange::new();
  mock.reject_all();
  let exchange = Arc::new(RwLock::new(mock));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = TwapPlanner::new(exchange, executor).with_seed(5);

  let stop = StopSignal::new();
  let summary = planner
    .execute(params(dec!(1), 3, Some(3)), &stop)
    .await
    .unwrap();

  // 거부된 조각은 건너뛰고 계획은 끝까지 진행, 부분 결과 보고
  assert_eq!(summary.total, 3);
  assert_eq!(summary.executed, 0);
  assert_eq!(summary.outcomes.len(), 3);
  assert!(summary
    .failures()
    .iter()
    .all(|o| matches!(o.failure, Some(ExecutionFailure::Rejected(_)))));
}

#[tokio::test(start_paused = true)]
async fn test_twap_stop_signal_aborts_remaining() {
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = TwapPlanner::new(exchange.clone(), executor).with_seed(9);

  let stop = StopSignal::new();
  stop.stop();
  let summary = planner
    .execute(params(dec!(1), 3, Some(3)), &stop)
    .await
    .unwrap();

  // 실행 전에 중단: 아무 조각도 제출되지 않음
  assert_eq!(summary.executed, 0);
  assert!(summary.outcomes.is_empty());
  assert!(exchange.read().await.submitted_orders().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_twap_sentiment_gate_blocks_buy_in_greed() {
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());

  let provider = Arc::new(RwLock::new(MockSentimentProvider::with_reading(
    SentimentReading::new(80, Zone::Greed),
  )));
  let filter = SentimentFilter::new(SentimentGate::with_defaults(), provider);
  let mut planner = TwapPlanner::new(exchange.clone(), executor)
    .with_seed(3)
    .with_sentiment(filter);

  let mut twap_params = params(dec!(1), 3, Some(3));
  twap_params.use_sentiment = true;

  let stop = StopSignal::new();
  let summary = planner.execute(twap_params, &stop).await.unwrap();

  // 탐욕 구간에서 매수 전 조각 차단
  assert_eq!(summary.executed, 0);
  assert_eq!(summary.outcomes.len(), 3);
  assert!(summary
    .failures()
    .iter()
    .all(|o| matches!(o.failure, Some(ExecutionFailure::GateBlocked(_)))));
  assert!(exchange.read().await.submitted_orders().is_empty());
}
