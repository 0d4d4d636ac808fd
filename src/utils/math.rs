//! 수학 관련 유틸리티
//!
//! 거래소 단위(tick/step) 기준의 정밀 계산 함수 제공

use rust_decimal::Decimal;

/// 값을 범위 내로 제한
pub fn clamp<T: PartialOrd>(value: T, min_value: T, max_value: T) -> T {
  if value < min_value {
    min_value
  } else if value > max_value {
    max_value
  } else {
    value
  }
}

/// 값이 단위의 정확한 배수인지 확인
pub fn is_multiple_of(value: Decimal, unit: Decimal) -> bool {
  if unit <= Decimal::ZERO {
    return false;
  }
  (value % unit).is_zero()
}

/// 수량을 거래소 step 단위로 내림
pub fn quantize_down(value: Decimal, unit: Decimal) -> Decimal {
  if unit <= Decimal::ZERO {
    return value;
  }
  (value / unit).floor() * unit
}

/// step 단위로 표현 가능한 칸 수
pub fn units_in(value: Decimal, unit: Decimal) -> u64 {
  use rust_decimal::prelude::ToPrimitive;
  if unit <= Decimal::ZERO {
    return 0;
  }
  (value / unit).floor().to_u64().unwrap_or(0)
}
