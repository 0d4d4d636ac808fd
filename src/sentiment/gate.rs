//! 센티먼트 게이트
//!
//! 역추세 원칙: 공포 구간에서만 매수, 탐욕 구간에서만 매도를 허용한다.
//! 호출자가 명시적으로 요청했을 때만 적용되며 암묵적으로 끼어들지 않는다.

use crate::models::order::OrderSide;
use crate::sentiment::{SentimentReading, Zone};

/// 방향별 허용 구간
#[derive(Debug, Clone)]
pub struct GateThresholds {
    pub buy_zones: Vec<Zone>,
    pub sell_zones: Vec<Zone>,
}

impl Default for GateThresholds {
    fn default() -> Self {
        GateThresholds {
            buy_zones: vec![Zone::Fear, Zone::ExtremeFear],
            sell_zones: vec![Zone::Greed, Zone::ExtremeGreed],
        }
    }
}

/// 주문 방향에 대한 예/아니오 게이트
#[derive(Debug, Clone)]
pub struct SentimentGate {
    thresholds: GateThresholds,
    /// 지수 조회 실패 시 통과 여부. 운영 배포에서는 정책 확인 후
    /// 설정으로 명시해야 한다 (기본값 fail-open).
    fail_open: bool,
}

impl SentimentGate {
    pub fn new(thresholds: GateThresholds, fail_open: bool) -> Self {
        SentimentGate { thresholds, fail_open }
    }

    pub fn with_defaults() -> Self {
        Self::new(GateThresholds::default(), true)
    }

    /// 주문 통과 여부 판정
    ///
    /// `reading`이 None이면 제공자 장애 상황이며 fail_open 정책을 따른다.
    pub fn allow(&self, side: OrderSide, reading: Option<&SentimentReading>) -> bool {
        let reading = match reading {
            Some(r) => r,
            None => {
                log::warn!(
                    "센티먼트 지수 없음: fail_open={} 정책 적용",
                    self.fail_open
                );
                return self.fail_open;
            }
        };

        let allowed = match side {
            OrderSide::Buy => self.thresholds.buy_zones.contains(&reading.zone),
            OrderSide::Sell => self.thresholds.sell_zones.contains(&reading.zone),
        };

        if !allowed {
            log::info!(
                "센티먼트 게이트 차단: side={} index={} zone={:?}",
                side,
                reading.index_value,
                reading.zone
            );
        }

        allowed
    }
}
