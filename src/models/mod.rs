pub mod market_data;
pub mod order;
pub mod outcome;
