/**
* filename : config
* author : HAMA
* date: 2025. 6. 11.
* description:
**/

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::TradingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
    pub executor: ExecutorConfig,
    pub sentiment: SentimentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub name: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    pub use_mock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// 지수 조회 실패 시 게이트 통과 여부 (운영 정책 결정 사항)
    pub fail_open: bool,
}

impl Config {
    /// Load configuration from a file
    pub fn load() -> Result<Self, TradingError> {
        let config_path = Path::new("config.json");

        if config_path.exists() {
            let mut file = File::open(config_path)
                .map_err(|e| TradingError::ConfigError(format!("Failed to open config file: {}", e)))?;

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to read config file: {}", e)))?;

            let mut cfg: Config = serde_json::from_str(&contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to parse config file: {}", e)))?;
            // environment overrides
            cfg.apply_env_overrides();
            Ok(cfg)
        } else {
            let mut cfg = Config::default();
            cfg.apply_env_overrides();
            Ok(cfg)
        }
    }

    /// Apply environment variable overrides for sensitive/runtime fields
    fn apply_env_overrides(&mut self) {
        use std::env;
        if let Ok(v) = env::var("EXCHANGE_API_KEY") { if !v.is_empty() { self.exchange.api_key = Some(v); } }
        if let Ok(v) = env::var("EXCHANGE_API_SECRET") { if !v.is_empty() { self.exchange.api_secret = Some(v); } }
        if let Ok(v) = env::var("EXCHANGE_BASE_URL") { if !v.is_empty() { self.exchange.base_url = Some(v); } }
        if let Ok(v) = env::var("USE_MOCK") {
            let lower = v.to_lowercase();
            if ["1", "true", "yes"].contains(&lower.as_str()) { self.exchange.use_mock = true; }
            if ["0", "false", "no"].contains(&lower.as_str()) { self.exchange.use_mock = false; }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exchange: ExchangeConfig {
                name: "BinanceFutures".to_string(),
                api_key: None,
                api_secret: None,
                // 기본은 테스트넷
                base_url: Some("https://testnet.binancefuture.com".to_string()),
                use_mock: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            executor: ExecutorConfig {
                max_attempts: 3,
                initial_backoff_ms: 500,
            },
            sentiment: SentimentConfig {
                base_url: "https://api.alternative.me".to_string(),
                timeout_ms: 10_000,
                fail_open: true,
            },
        }
    }
}
