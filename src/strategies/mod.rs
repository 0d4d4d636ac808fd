//! 전략 플래너
//!
//! 상위 수준 요청 하나를 주문 의도 시퀀스로 전개하고 실행을 구동한다.
//! 모든 플래너는 게이트(선택) → 검증 → 실행 경로를 공유한다.

pub mod grid;
pub mod oco;
pub mod stop_limit;
pub mod twap;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::exchange::traits::SentimentProvider;
use crate::models::market_data::MarketSnapshot;
use crate::models::order::{OrderIntent, OrderSide};
use crate::models::outcome::{ExecutionFailure, ExecutionOutcome};
use crate::order_core::{OrderExecutor, OrderValidator};
use crate::sentiment::SentimentGate;

pub use grid::{GridParams, GridPlanner};
pub use oco::{OcoParams, OcoPlanner};
pub use stop_limit::{StopLimitParams, StopLimitPlanner};
pub use twap::{TwapParams, TwapPlanner};

/// 협조적 취소 신호
///
/// 슬라이스/레벨 사이에서만 검사되며 진행 중인 네트워크 호출을
/// 선점하지 않는다.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        StopSignal(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// 센티먼트 제공자와 게이트를 묶은 필터
///
/// 제공자 장애는 게이트의 fail-open 정책으로 흘려보낸다.
pub struct SentimentFilter {
    gate: SentimentGate,
    provider: Arc<RwLock<dyn SentimentProvider>>,
}

impl SentimentFilter {
    pub fn new(gate: SentimentGate, provider: Arc<RwLock<dyn SentimentProvider>>) -> Self {
        SentimentFilter { gate, provider }
    }

    pub async fn allow(&self, side: OrderSide) -> bool {
        let reading = match self.provider.read().await.current_reading().await {
            Ok(reading) => Some(reading),
            Err(e) => {
                log::warn!("센티먼트 조회 실패: {}", e);
                None
            }
        };
        self.gate.allow(side, reading.as_ref())
    }
}

/// 의도 하나를 게이트 → 검증 → 실행기 순으로 통과시킨다
///
/// 실행기에는 검증을 통과한 의도만 전달된다.
pub(crate) async fn run_intent(
    executor: &OrderExecutor,
    validator: &OrderValidator,
    sentiment: Option<&SentimentFilter>,
    intent: OrderIntent,
    snapshot: &MarketSnapshot,
) -> ExecutionOutcome {
    if let Some(filter) = sentiment {
        if !filter.allow(intent.side).await {
            return ExecutionOutcome::failed(
                intent,
                ExecutionFailure::GateBlocked("sentiment zone does not allow this side".to_string()),
            );
        }
    }

    let validation = validator.validate(&intent, snapshot);
    if !validation.is_ok() {
        log::error!("주문 검증 실패: {:?}", validation.violations);
        return ExecutionOutcome::failed(intent, ExecutionFailure::Validation(validation.violations));
    }

    executor.place(intent).await
}
