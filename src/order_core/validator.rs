//! 주문 검증기
//!
//! 거래소 규칙 스냅샷에 대해 주문 의도의 구조적 정합성을 검사한다.
//! 네트워크 호출 없이 호출자가 넘긴 스냅샷만 사용한다.

use rust_decimal::Decimal;

use crate::models::market_data::MarketSnapshot;
use crate::models::order::{OrderIntent, OrderSide, OrderType};
use crate::models::outcome::ValidationResult;
use crate::utils::math::is_multiple_of;

/// 기본 주문 검증기
///
/// 위반을 발견해도 즉시 중단하지 않고 전부 수집해서 돌려준다.
/// 호출자는 문제 전체를 한 번에 본다.
pub struct OrderValidator;

impl OrderValidator {
    pub fn new() -> Self {
        OrderValidator
    }

    /// 주문 검증
    ///
    /// 스탑-리밋 방향 규약 (혼동이 잦아 명시해 둔다):
    /// BUY 스탑-리밋은 가격이 `stop_price`까지 올라오면 발동해 `price`
    /// 지정가로 체결된다. 따라서 `stop_price <= price`여야 하고,
    /// `stop_price > price`는 역전된 트리거로 거부한다.
    /// SELL은 반대로 `stop_price >= price`를 요구한다.
    pub fn validate(&self, intent: &OrderIntent, snapshot: &MarketSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if intent.symbol != snapshot.symbol {
            result.push(
                "symbol",
                format!("snapshot is for {}, not {}", snapshot.symbol, intent.symbol),
            );
        } else if !snapshot.tradable {
            result.push("symbol", format!("{} is not tradable", snapshot.symbol));
        }

        self.check_quantity(intent, snapshot, &mut result);
        self.check_price(intent, snapshot, &mut result);
        self.check_stop_price(intent, &mut result);
        self.check_notional(intent, snapshot, &mut result);

        result
    }

    fn check_quantity(&self, intent: &OrderIntent, snapshot: &MarketSnapshot, result: &mut ValidationResult) {
        if intent.quantity <= Decimal::ZERO {
            result.push("quantity", "must be positive");
            return;
        }
        // 단위에 맞지 않으면 거부한다. 몰래 반올림하지 않는다.
        if !is_multiple_of(intent.quantity, snapshot.step_size) {
            result.push(
                "quantity",
                format!("{} is not a multiple of step size {}", intent.quantity, snapshot.step_size),
            );
        }
    }

    fn check_price(&self, intent: &OrderIntent, snapshot: &MarketSnapshot, result: &mut ValidationResult) {
        if !intent.order_type.requires_price() {
            return;
        }

        let price = match intent.price {
            Some(p) => p,
            None => {
                result.push("price", format!("{:?} order requires a price", intent.order_type));
                return;
            }
        };

        if price <= Decimal::ZERO {
            result.push("price", "must be positive");
        } else if !is_multiple_of(price, snapshot.tick_size) {
            result.push(
                "price",
                format!("{} is not a multiple of tick size {}", price, snapshot.tick_size),
            );
        }
    }

    fn check_stop_price(&self, intent: &OrderIntent, result: &mut ValidationResult) {
        if intent.order_type != OrderType::StopLimit {
            return;
        }

        let stop_price = match intent.stop_price {
            Some(s) => s,
            None => {
                result.push("stop_price", "stop-limit order requires a stop price");
                return;
            }
        };

        if stop_price <= Decimal::ZERO {
            result.push("stop_price", "must be positive");
            return;
        }

        if let Some(price) = intent.price {
            match intent.side {
                OrderSide::Buy if stop_price > price => {
                    result.push(
                        "stop_price",
                        format!("inverted trigger: BUY stop price {} must be <= limit price {}", stop_price, price),
                    );
                }
                OrderSide::Sell if stop_price < price => {
                    result.push(
                        "stop_price",
                        format!("inverted trigger: SELL stop price {} must be >= limit price {}", stop_price, price),
                    );
                }
                _ => {}
            }
        }
    }

    fn check_notional(&self, intent: &OrderIntent, snapshot: &MarketSnapshot, result: &mut ValidationResult) {
        if intent.quantity <= Decimal::ZERO {
            return;
        }
        // 시장가 주문은 현재가 기준으로 명목 가치를 추정한다
        let notional = intent.notional(snapshot.last_price);
        if notional < snapshot.min_notional {
            result.push(
                "notional",
                format!("{} is below the minimum notional {}", notional, snapshot.min_notional),
            );
        }
    }
}

impl Default for OrderValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderSide;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot::new("BTCUSDT", dec!(50000), dec!(0.1), dec!(0.001), dec!(100))
    }

    #[test]
    fn test_valid_market_order() {
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(0.01));
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(result.is_ok(), "{:?}", result.violations);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_non_positive_quantity_rejected(#[case] quantity: Decimal) {
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, quantity);
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(!result.is_ok());
        assert!(result.violations.iter().any(|v| v.field == "quantity"));
    }

    #[test]
    fn test_quantity_step_rejected_not_rounded() {
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(0.0105));
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(result.violations.iter().any(|v| v.field == "quantity"));
    }

    #[test]
    fn test_price_tick_rejected() {
        let intent = OrderIntent::limit("BTCUSDT", OrderSide::Buy, dec!(0.01), dec!(50000.05));
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(!result.is_ok());
        assert!(result.violations.iter().any(|v| v.field == "price"));
    }

    #[test]
    fn test_missing_limit_price() {
        let mut intent = OrderIntent::limit("BTCUSDT", OrderSide::Buy, dec!(0.01), dec!(50000));
        intent.price = None;
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(result.violations.iter().any(|v| v.field == "price"));
    }

    #[rstest]
    // BUY: 트리거가 지정가 위이면 역전
    #[case(OrderSide::Buy, dec!(49000), dec!(49500), false)]
    #[case(OrderSide::Buy, dec!(49000), dec!(48000), true)]
    #[case(OrderSide::Buy, dec!(49000), dec!(49000), true)]
    // SELL: 트리거가 지정가 아래이면 역전
    #[case(OrderSide::Sell, dec!(49000), dec!(48000), false)]
    #[case(OrderSide::Sell, dec!(49000), dec!(49500), true)]
    fn test_stop_limit_trigger_direction(
        #[case] side: OrderSide,
        #[case] price: Decimal,
        #[case] stop_price: Decimal,
        #[case] expected_ok: bool,
    ) {
        let intent = OrderIntent::stop_limit("BTCUSDT", side, dec!(0.01), price, stop_price);
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert_eq!(result.is_ok(), expected_ok, "{:?}", result.violations);
    }

    #[test]
    fn test_stop_limit_requires_stop_price() {
        let mut intent = OrderIntent::stop_limit("BTCUSDT", OrderSide::Sell, dec!(0.01), dec!(49000), dec!(48000));
        intent.stop_price = None;
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(result.violations.iter().any(|v| v.field == "stop_price"));
    }

    #[test]
    fn test_minimum_notional() {
        // 0.001 * 50000 = 50 < 100
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(0.001));
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(result.violations.iter().any(|v| v.field == "notional"));
    }

    #[test]
    fn test_violations_are_collected_not_fail_fast() {
        // 잘못된 수량 + 잘못된 가격이 같이 보고되어야 한다
        let intent = OrderIntent::limit("BTCUSDT", OrderSide::Buy, dec!(-1), dec!(50000.05));
        let result = OrderValidator::new().validate(&intent, &snapshot());
        assert!(result.violations.len() >= 2);
    }

    #[test]
    fn test_untradable_symbol() {
        let mut snap = snapshot();
        snap.tradable = false;
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(0.01));
        let result = OrderValidator::new().validate(&intent, &snap);
        assert!(result.violations.iter().any(|v| v.field == "symbol"));
    }
}
