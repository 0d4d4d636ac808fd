//! 그리드 전략 통합 테스트

use std::sync::Arc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use xExec::exchange::mocks::MockExchange;
use xExec::models::order::OrderSide;
use xExec::models::outcome::ExecutionFailure;
use xExec::order_core::{OrderExecutor, RetryPolicy};
use xExec::strategies::{GridParams, GridPlanner, StopSignal};

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

#[tokio::test]
async fn test_grid_places_all_levels() {
  let mut mock = MockExchange::new();
  mock.set_price("ETHUSDT", dec!(3050));
  let exchange = Arc::new(RwLock::new(mock));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = GridPlanner::new(exchange.clone(), executor);

  let stop = StopSignal::new();
  let summary = planner.execute(eth_params(), &stop).await.unwrap();

  assert_eq!(summary.total, 11);
  assert_eq!(summary.executed, 11);

  let guard = exchange.read().await;
  let submitted = guard.submitted_orders();
  assert_eq!(submitted.len(), 11);

  // 2500, 2600, ... 3500 레벨, 현재가 기준 매수/매도 양분
  let expected: Vec<Decimal> = (0..=10).map(|i| dec!(2500) + dec!(100) * Decimal::from(i)).collect();
  let mut levels: Vec<Decimal> = submitted.iter().map(|(_, o)| o.price.unwrap()).collect();
  levels.sort();
  assert_eq!(levels, expected);

  for (_, order) in submitted {
    let level = order.price.unwrap();
    let expected_side = if level < dec!(3050) { OrderSide::Buy } else { OrderSide::Sell };
    assert_eq!(order.side, expected_side);
    assert_eq!(order.quantity, dec!(0.05));
  }
}

#[tokio::test]
async fn test_grid_level_rejection_does_not_block_others() {
  let mut mock = MockExchange::new();
  mock.set_price("ETHUSDT", dec!(3050));
  mock.reject_at_price(dec!(2600));
  let exchange = Arc::new(RwLock::new(mock));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = GridPlanner::new(exchange.clone(), executor);

  let stop = StopSignal::new();
  let summary = planner.execute(eth_params(), &stop).await.unwrap();

  // 레벨은 서로 독립: 하나 거부되어도 나머지 10개는 설치
  assert_eq!(summary.total, 11);
  assert_eq!(summary.executed, 10);
  let failures = summary.failures();
  assert_eq!(failures.len(), 1);
  assert!(matches!(failures[0].failure, Some(ExecutionFailure::Rejected(_))));
  assert_eq!(failures[0].intent.price, Some(dec!(2600)));
}

#[tokio::test]
async fn test_grid_skips_level_at_current_price() {
  // 현재가 3000은 레벨 2500 + 100*5와 정확히 일치
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = GridPlanner::new(exchange.clone(), executor);

  let stop = StopSignal::new();
  let summary = planner.execute(eth_params(), &stop).await.unwrap();

  assert_eq!(summary.total, 10);
  let guard = exchange.read().await;
  assert!(guard.submitted_orders().iter().all(|(_, o)| o.price != Some(dec!(3000))));
}

#[tokio::test]
async fn test_grid_invalid_range_aborts_before_placement() {
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let executor = OrderExecutor::new(exchange.clone(), RetryPolicy::default());
  let mut planner = GridPlanner::new(exchange.clone(), executor);

  let mut params = eth_params();
  params.range_top = dec!(2000);

  let stop = StopSignal::new();
  let result = planner.execute(params, &stop).await;

  assert!(result.is_err());
  assert!(exchange.read().await.submitted_orders().is_empty());
}
