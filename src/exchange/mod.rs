pub mod binance_futures;
pub mod dry_run;
pub mod mocks;
pub mod traits;
