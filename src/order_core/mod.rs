//! 주문 검증과 실행의 핵심 구현체

pub mod executor;
pub mod validator;

pub use executor::{OrderExecutor, RetryPolicy};
pub use validator::OrderValidator;
