//! 공포-탐욕 지수 기반 센티먼트 모듈
//!
//! 지수 읽기, 구간 분류, 주문 게이트 제공

pub mod fng;
pub mod gate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use fng::FngClient;
pub use gate::{GateThresholds, SentimentGate};

/// 지수 값에서 파생되는 범주 구간
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Zone {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Zone {
    /// 0-100 지수 값을 구간으로 변환
    pub fn from_index(value: u8) -> Zone {
        match value {
            0..=24 => Zone::ExtremeFear,
            25..=44 => Zone::Fear,
            45..=55 => Zone::Neutral,
            56..=75 => Zone::Greed,
            _ => Zone::ExtremeGreed,
        }
    }

    /// 제공자의 분류 문자열을 구간으로 변환 (알 수 없으면 None)
    pub fn from_classification(label: &str) -> Option<Zone> {
        match label.to_lowercase().as_str() {
            "extreme fear" => Some(Zone::ExtremeFear),
            "fear" => Some(Zone::Fear),
            "neutral" => Some(Zone::Neutral),
            "greed" => Some(Zone::Greed),
            "extreme greed" => Some(Zone::ExtremeGreed),
            _ => None,
        }
    }
}

/// 센티먼트 지수 1회 조회 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReading {
    /// 0-100 지수 값
    pub index_value: u8,
    pub zone: Zone,
    pub fetched_at: DateTime<Utc>,
}

impl SentimentReading {
    pub fn new(index_value: u8, zone: Zone) -> Self {
        SentimentReading {
            index_value,
            zone,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_from_index() {
        assert_eq!(Zone::from_index(0), Zone::ExtremeFear);
        assert_eq!(Zone::from_index(24), Zone::ExtremeFear);
        assert_eq!(Zone::from_index(25), Zone::Fear);
        assert_eq!(Zone::from_index(50), Zone::Neutral);
        assert_eq!(Zone::from_index(60), Zone::Greed);
        assert_eq!(Zone::from_index(90), Zone::ExtremeGreed);
        assert_eq!(Zone::from_index(100), Zone::ExtremeGreed);
    }

    #[test]
    fn test_zone_from_classification() {
        assert_eq!(Zone::from_classification("Extreme Fear"), Some(Zone::ExtremeFear));
        assert_eq!(Zone::from_classification("greed"), Some(Zone::Greed));
        assert_eq!(Zone::from_classification("unknown"), None);
    }
}
