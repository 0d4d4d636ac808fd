//! 주문 실행기
//!
//! 검증을 통과한 주문 의도 하나를 게이트웨이에 제출하고
//! 결과를 분류한다. 일시 장애만 지수 백오프로 재시도한다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

use crate::exchange::traits::{OrderGateway, SubmitError};
use crate::models::order::OrderIntent;
use crate::models::outcome::{ExecutionFailure, ExecutionOutcome};
use crate::utils::logging;

/// 일시 장애 재시도 정책
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 500,
        }
    }
}

/// 단일 주문 실행기
///
/// 불변식: 여기로 들어오는 의도는 이미 검증기를 통과한 것이다.
/// 플래너가 그 순서를 책임진다.
pub struct OrderExecutor {
    gateway: Arc<RwLock<dyn OrderGateway>>,
    retry: RetryPolicy,
    /// 호출(plan) 단위 수락 카운터. 플래너가 진행 여부 판단에 쓴다.
    accepted: AtomicU64,
}

impl OrderExecutor {
    pub fn new(gateway: Arc<RwLock<dyn OrderGateway>>, retry: RetryPolicy) -> Self {
        OrderExecutor {
            gateway,
            retry,
            accepted: AtomicU64::new(0),
        }
    }

    /// 현재 호출에서 수락된 주문 수
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// 새 전략 호출 시작 시 카운터 초기화
    pub fn reset_accepted(&self) {
        self.accepted.store(0, Ordering::Relaxed);
    }

    /// 주문 한 건 제출
    ///
    /// 재시도 시 동일한 의도(동일 client_order_id)를 다시 보낸다.
    /// 거래소가 클라이언트 주문 ID로 중복 체결을 걸러낼 수 있게 하기
    /// 위한 것이다.
    pub async fn place(&self, intent: OrderIntent) -> ExecutionOutcome {
        let mut backoff = Duration::from_millis(self.retry.initial_backoff_ms);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = {
                let mut gateway = self.gateway.write().await;
                gateway.submit(&intent).await
            };

            match result {
                Ok(order_id) => {
                    self.accepted.fetch_add(1, Ordering::Relaxed);
                    logging::log_order_placed(&intent, &order_id.0);
                    return ExecutionOutcome::accepted(intent, order_id);
                }
                Err(SubmitError::Rejected(reason)) => {
                    // 비즈니스 규칙 거부는 재시도해도 결과가 같다
                    logging::log_order_failed(&intent, &reason);
                    return ExecutionOutcome::failed(intent, ExecutionFailure::Rejected(reason));
                }
                Err(SubmitError::Transient(reason)) => {
                    if attempt >= self.retry.max_attempts {
                        logging::log_order_failed(&intent, &reason);
                        return ExecutionOutcome::failed(intent, ExecutionFailure::Transient(reason));
                    }
                    log::warn!(
                        "일시 장애, 재시도 {}/{} (대기 {}ms): {}",
                        attempt,
                        self.retry.max_attempts,
                        backoff.as_millis(),
                        reason
                    );
                    sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }
}
