/**
* filename : error
* author : HAMA
* date: 2025. 6. 11.
* description:
**/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Exchange error: {0}")]
    ExchangeError(String),

    #[error("Data not found: {0}")]
    DataNotFound(String),

    #[error("Sentiment data unavailable: {0}")]
    SentimentUnavailable(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
