use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::order::{GroupId, OrderId, OrderIntent};

/// 검증 위반 항목 (필드, 사유)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// 주문 검증 결과
///
/// 실패를 예외로 올리지 않고 위반 목록 전체를 한 번에 반환한다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult::default()
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(Violation::new(field, reason));
    }
}

/// 주문 한 건의 실패 분류
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionFailure {
    /// 검증 위반으로 제출 자체가 되지 않음
    #[error("validation failed: {0:?}")]
    Validation(Vec<Violation>),

    /// 거래소 비즈니스 규칙 거부 (재시도 안 함)
    #[error("rejected by exchange: {0}")]
    Rejected(String),

    /// 네트워크/타임아웃 계열, 재시도 소진 후 종결
    #[error("transient failure: {0}")]
    Transient(String),

    /// 센티먼트 게이트가 주문을 차단함
    #[error("blocked by sentiment gate: {0}")]
    GateBlocked(String),
}

/// 의도 하나에 대한 실행 결과
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub intent: OrderIntent,
    pub accepted: bool,
    pub exchange_order_id: Option<OrderId>,
    pub failure: Option<ExecutionFailure>,
}

impl ExecutionOutcome {
    pub fn accepted(intent: OrderIntent, order_id: OrderId) -> Self {
        ExecutionOutcome {
            intent,
            accepted: true,
            exchange_order_id: Some(order_id),
            failure: None,
        }
    }

    pub fn failed(intent: OrderIntent, failure: ExecutionFailure) -> Self {
        ExecutionOutcome {
            intent,
            accepted: false,
            exchange_order_id: None,
            failure: Some(failure),
        }
    }
}

/// 전략 호출 한 번의 최종 요약
///
/// 부분 성공을 그대로 보고한다. 실패는 outcomes에 남고
/// 어느 것도 조용히 버려지지 않는다.
#[derive(Debug, Clone)]
pub struct StrategySummary {
    pub group_id: GroupId,
    pub total: usize,
    pub executed: usize,
    pub total_quantity: Decimal,
    pub executed_quantity: Decimal,
    pub outcomes: Vec<ExecutionOutcome>,
}

impl StrategySummary {
    pub fn new(group_id: GroupId, total: usize, total_quantity: Decimal) -> Self {
        StrategySummary {
            group_id,
            total,
            executed: 0,
            total_quantity,
            executed_quantity: Decimal::ZERO,
            outcomes: Vec::with_capacity(total),
        }
    }

    /// 결과 한 건 반영
    pub fn record(&mut self, outcome: ExecutionOutcome) {
        if outcome.accepted {
            self.executed += 1;
            self.executed_quantity += outcome.intent.quantity;
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> Vec<&ExecutionOutcome> {
        self.outcomes.iter().filter(|o| !o.accepted).collect()
    }
}

impl fmt::Display for StrategySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group={} executed={}/{} quantity={}/{} failures={}",
            self.group_id,
            self.executed,
            self.total,
            self.executed_quantity,
            self.total_quantity,
            self.failures().len()
        )
    }
}
