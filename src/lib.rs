//! 주문 전략 실행 엔진 라이브러리
//!
//! 상위 수준 트레이딩 의도(TWAP, 그리드, 모의 OCO, 스탑-리밋)를
//! 검증된 주문 시퀀스로 전개하고 실행하는 시스템입니다.

pub mod config;
pub mod error;
pub mod exchange;
pub mod models;
pub mod order_core;
pub mod sentiment;
pub mod strategies;
pub mod utils;

// 핵심 타입 재노출
pub use crate::error::TradingError;
pub use crate::exchange::traits::{MarketDataProvider, OrderGateway, SentimentProvider, SubmitError};
pub use crate::models::market_data::MarketSnapshot;
pub use crate::models::order::{GroupId, OrderId, OrderIntent, OrderSide, OrderType};
pub use crate::models::outcome::{ExecutionFailure, ExecutionOutcome, StrategySummary, ValidationResult, Violation};
pub use crate::order_core::{OrderExecutor, OrderValidator, RetryPolicy};
pub use crate::sentiment::{SentimentGate, SentimentReading, Zone};
pub use crate::strategies::StopSignal;

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TradingError>;
