//! 로깅 유틸리티
//!
//! 로그 초기화 및 유틸리티 함수 제공

use env_logger::Builder;
use log::LevelFilter;
use std::env;

use crate::error::TradingError;
use crate::models::order::OrderIntent;
use crate::models::outcome::StrategySummary;

/// 로깅 시스템 초기화
///
/// RUST_LOG 환경변수가 있으면 그것을 우선하고, 없으면 설정 레벨을 쓴다.
pub fn init(config_level: &str) -> Result<(), TradingError> {
    let mut builder = Builder::from_default_env();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config_level.to_string());

    let level_filter = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    builder
      .filter_level(level_filter)
      .format_timestamp_millis()
      .init();

    log::info!("로깅 시스템 초기화 완료: 레벨 = {}", log_level);

    Ok(())
}

/// 전략 시작 로그
pub fn log_strategy_start(strategy_name: &str, symbol: &str) {
    log::info!("전략 시작: {} - 심볼: {}", strategy_name, symbol);
}

/// 전략 종료 로그 (부분 성공 요약 포함)
pub fn log_strategy_end(strategy_name: &str, summary: &StrategySummary) {
    log::info!("전략 종료: {} - {}", strategy_name, summary);
}

/// 주문 제출 성공 로그
pub fn log_order_placed(intent: &OrderIntent, order_id: &str) {
    log::info!(
        "주문 제출: {} - 심볼: {} - 방향: {} - 수량: {}",
        order_id,
        intent.symbol,
        intent.side,
        intent.quantity
    );
}

/// 주문 실패 로그
pub fn log_order_failed(intent: &OrderIntent, reason: &str) {
    log::error!(
        "주문 실패 - 심볼: {} - 방향: {} - 수량: {} - 사유: {}",
        intent.symbol,
        intent.side,
        intent.quantity,
        reason
    );
}
