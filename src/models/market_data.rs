use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 심볼별 거래 규칙과 현재가 스냅샷
///
/// 거래소에서 조회한 읽기 전용 사실. 검증기와 플래너가 소비하며
/// 이 크레이트가 소유하거나 갱신하지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub last_price: Decimal,
    /// 가격 최소 단위 (PRICE_FILTER.tickSize)
    pub tick_size: Decimal,
    /// 수량 최소 단위 (LOT_SIZE.stepSize)
    pub step_size: Decimal,
    /// 최소 명목 가치 (MIN_NOTIONAL)
    pub min_notional: Decimal,
    pub tradable: bool,
}

impl MarketSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        last_price: Decimal,
        tick_size: Decimal,
        step_size: Decimal,
        min_notional: Decimal,
    ) -> Self {
        MarketSnapshot {
            symbol: symbol.into(),
            last_price,
            tick_size,
            step_size,
            min_notional,
            tradable: true,
        }
    }
}
