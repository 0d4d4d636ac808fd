use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 거래소가 부여한 주문 ID
#[derive(Debug, Clone, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 한 전략 호출에서 나온 형제 주문들을 묶는 상관관계 토큰
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub struct GroupId(pub Uuid);

impl GroupId {
    pub fn new() -> Self {
        GroupId(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
    StopLimit,
}

impl OrderType {
    /// 지정가가 필수인 주문 유형 여부
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }
}

/// 아직 제출되지 않은 주문 기술서
///
/// 전략 플래너가 생성하며, 검증 이후에는 변경하지 않는다.
/// `client_order_id`는 생성 시 한 번 부여되고 재시도에도 동일하게
/// 재사용되어 거래소 측 중복 체결을 막는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub reduce_only: bool,
    pub group_id: Option<GroupId>,
    pub client_order_id: String,
    pub created_at: i64,
}

impl OrderIntent {
    fn base(symbol: impl Into<String>, side: OrderSide, order_type: OrderType, quantity: Decimal) -> Self {
        OrderIntent {
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price: None,
            stop_price: None,
            reduce_only: false,
            group_id: None,
            client_order_id: format!("x-{}", Uuid::new_v4().simple()),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// 시장가 주문 생성
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self::base(symbol, side, OrderType::Market, quantity)
    }

    /// 지정가 주문 생성
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        let mut intent = Self::base(symbol, side, OrderType::Limit, quantity);
        intent.price = Some(price);
        intent
    }

    /// 스탑-리밋 주문 생성 (`stop_price` 도달 시 `price` 지정가 발동)
    pub fn stop_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        let mut intent = Self::base(symbol, side, OrderType::StopLimit, quantity);
        intent.price = Some(price);
        intent.stop_price = Some(stop_price);
        intent
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    /// 명목 가치 (시장가 주문은 기준 가격을 외부에서 받는다)
    pub fn notional(&self, reference_price: Decimal) -> Decimal {
        let price = self.price.unwrap_or(reference_price);
        self.quantity * price
    }
}
