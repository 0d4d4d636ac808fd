/**
* filename : main
* author : HAMA
* date: 2025. 6. 11.
* description:
**/

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use xExec::config::Config;
use xExec::exchange::binance_futures::BinanceFutures;
use xExec::exchange::dry_run::DryRunGateway;
use xExec::exchange::mocks::MockExchange;
use xExec::exchange::traits::{MarketDataProvider, OrderGateway, SentimentProvider};
use xExec::models::order::{OrderIntent, OrderSide};
use xExec::models::outcome::StrategySummary;
use xExec::order_core::{OrderExecutor, OrderValidator, RetryPolicy};
use xExec::sentiment::{FngClient, GateThresholds, SentimentGate};
use xExec::strategies::{
    GridParams, GridPlanner, OcoParams, OcoPlanner, SentimentFilter, StopLimitParams,
    StopLimitPlanner, StopSignal, TwapParams, TwapPlanner,
};
use xExec::utils::logging;
use xExec::TradingError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSide {
    Buy,
    Sell,
}

impl From<CliSide> for OrderSide {
    fn from(side: CliSide) -> Self {
        match side {
            CliSide::Buy => OrderSide::Buy,
            CliSide::Sell => OrderSide::Sell,
        }
    }
}

/// Binance USDT-M 선물 주문 전략 실행기
#[derive(Parser)]
#[command(name = "xExec", version, about = "Order strategy execution engine for Binance USDT-M Futures")]
struct Cli {
    /// 주문을 보내지 않고 로그만 남긴다
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시장가 주문 한 건
    Market {
        #[arg(long)]
        symbol: String,
        #[arg(long, value_enum)]
        side: CliSide,
        #[arg(long)]
        quantity: Decimal,
        /// 공포-탐욕 지수로 주문을 거른다
        #[arg(long)]
        use_sentiment_filter: bool,
    },
    /// 지정가 주문 한 건
    Limit {
        #[arg(long)]
        symbol: String,
        #[arg(long, value_enum)]
        side: CliSide,
        #[arg(long)]
        quantity: Decimal,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        use_sentiment_filter: bool,
    },
    /// 스탑-리밋 주문
    StopLimit {
        #[arg(long)]
        symbol: String,
        #[arg(long, value_enum)]
        side: CliSide,
        #[arg(long)]
        quantity: Decimal,
        /// 트리거 이후 깔리는 지정가
        #[arg(long)]
        price: Decimal,
        /// 트리거 가격
        #[arg(long)]
        stop_price: Decimal,
    },
    /// 모의 OCO (이익 실현 + 손절, 외부 감시자 필요)
    Oco {
        #[arg(long)]
        symbol: String,
        /// 포지션을 닫는 방향 (롱 보호 = sell)
        #[arg(long, value_enum)]
        side: CliSide,
        #[arg(long)]
        quantity: Decimal,
        #[arg(long)]
        take_profit: Decimal,
        #[arg(long)]
        stop_loss: Decimal,
    },
    /// TWAP 분할 실행
    Twap {
        #[arg(long)]
        symbol: String,
        #[arg(long, value_enum)]
        side: CliSide,
        /// 총 수량
        #[arg(long)]
        quantity: Decimal,
        /// 총 실행 시간 (분)
        #[arg(long)]
        duration: u64,
        /// 분할 수 힌트 (기본: 분당 1개, 2-100)
        #[arg(long)]
        slices: Option<usize>,
        /// 지정가 (없으면 시장가 조각)
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        use_sentiment_filter: bool,
    },
    /// 그리드 초기 설치
    Grid {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        range_top: Decimal,
        #[arg(long)]
        range_bottom: Decimal,
        /// 그리드 칸 수 (레벨은 칸 수 + 1)
        #[arg(long)]
        grids: u32,
        /// 레벨당 수량
        #[arg(long)]
        quantity: Decimal,
    },
}

type SharedMarket = Arc<RwLock<dyn MarketDataProvider>>;
type SharedGateway = Arc<RwLock<dyn OrderGateway>>;

fn build_providers(config: &Config, dry_run: bool) -> Result<(SharedMarket, SharedGateway), TradingError> {
    if config.exchange.use_mock {
        log::info!("모의 거래소 사용");
        let mock = Arc::new(RwLock::new(MockExchange::new()));
        let gateway: SharedGateway = if dry_run {
            Arc::new(RwLock::new(DryRunGateway::new()))
        } else {
            mock.clone()
        };
        return Ok((mock, gateway));
    }

    let api_key = config
        .exchange
        .api_key
        .clone()
        .ok_or_else(|| TradingError::ConfigError("EXCHANGE_API_KEY is not set".to_string()))?;
    let api_secret = config
        .exchange
        .api_secret
        .clone()
        .ok_or_else(|| TradingError::ConfigError("EXCHANGE_API_SECRET is not set".to_string()))?;
    let base_url = config
        .exchange
        .base_url
        .clone()
        .unwrap_or_else(|| "https://fapi.binance.com".to_string());

    let binance = Arc::new(RwLock::new(BinanceFutures::new(base_url, api_key, api_secret)));
    let gateway: SharedGateway = if dry_run {
        Arc::new(RwLock::new(DryRunGateway::new()))
    } else {
        binance.clone()
    };
    Ok((binance, gateway))
}

fn build_sentiment_filter(config: &Config) -> Result<SentimentFilter, TradingError> {
    let client = FngClient::new(&config.sentiment.base_url, config.sentiment.timeout_ms)?;
    let provider: Arc<RwLock<dyn SentimentProvider>> = Arc::new(RwLock::new(client));
    let gate = SentimentGate::new(GateThresholds::default(), config.sentiment.fail_open);
    Ok(SentimentFilter::new(gate, provider))
}

/// 단건 주문을 게이트 → 검증 → 실행 경로로 처리
async fn place_single(
    market: &SharedMarket,
    executor: &OrderExecutor,
    sentiment: Option<&SentimentFilter>,
    intent: OrderIntent,
) -> Result<(), TradingError> {
    let snapshot = market.read().await.get_snapshot(&intent.symbol).await?;

    if let Some(filter) = sentiment {
        if !filter.allow(intent.side).await {
            println!("Sentiment filter active: aborting {} order.", intent.side);
            return Ok(());
        }
    }

    let validation = OrderValidator::new().validate(&intent, &snapshot);
    if !validation.is_ok() {
        println!("Order rejected by validation:");
        for violation in &validation.violations {
            println!("  - {}", violation);
        }
        return Ok(());
    }

    let outcome = executor.place(intent).await;
    match (&outcome.exchange_order_id, &outcome.failure) {
        (Some(order_id), _) => println!("Order accepted: {}", order_id),
        (None, Some(failure)) => println!("Order failed: {}", failure),
        _ => {}
    }
    Ok(())
}

fn print_summary(summary: &StrategySummary) {
    println!("\n{}", summary);
    for failed in summary.failures() {
        if let Some(failure) = &failed.failure {
            println!(
                "  failed: {} {} {} - {}",
                failed.intent.symbol, failed.intent.side, failed.intent.quantity, failure
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let config = Config::load()?;
    logging::init(&config.logging.level)?;
    log::info!("주문 전략 실행기 시작 (v{})", xExec::VERSION);

    let (market, gateway) = build_providers(&config, cli.dry_run)?;
    let retry = RetryPolicy {
        max_attempts: config.executor.max_attempts,
        initial_backoff_ms: config.executor.initial_backoff_ms,
    };
    let executor = OrderExecutor::new(gateway.clone(), retry);

    // Ctrl-C → 협조적 취소 (조각/레벨 사이에서만 반영)
    let stop = StopSignal::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("중단 신호 수신");
                stop.stop();
            }
        });
    }

    match cli.command {
        Commands::Market {
            symbol,
            side,
            quantity,
            use_sentiment_filter,
        } => {
            let sentiment = if use_sentiment_filter {
                Some(build_sentiment_filter(&config)?)
            } else {
                None
            };
            let intent = OrderIntent::market(symbol, side.into(), quantity);
            place_single(&market, &executor, sentiment.as_ref(), intent).await?;
        }
        Commands::Limit {
            symbol,
            side,
            quantity,
            price,
            use_sentiment_filter,
        } => {
            let sentiment = if use_sentiment_filter {
                Some(build_sentiment_filter(&config)?)
            } else {
                None
            };
            let intent = OrderIntent::limit(symbol, side.into(), quantity, price);
            place_single(&market, &executor, sentiment.as_ref(), intent).await?;
        }
        Commands::StopLimit {
            symbol,
            side,
            quantity,
            price,
            stop_price,
        } => {
            let mut planner = StopLimitPlanner::new(market, executor);
            let summary = planner
                .execute(StopLimitParams {
                    symbol,
                    side: side.into(),
                    quantity,
                    price,
                    stop_price,
                    use_sentiment: false,
                })
                .await?;
            print_summary(&summary);
        }
        Commands::Oco {
            symbol,
            side,
            quantity,
            take_profit,
            stop_loss,
        } => {
            let mut planner = OcoPlanner::new(market, gateway, executor);
            let summary = planner
                .execute(OcoParams {
                    symbol,
                    close_side: side.into(),
                    quantity,
                    take_profit_price: take_profit,
                    stop_loss_price: stop_loss,
                })
                .await?;
            print_summary(&summary);
            println!("\nIMPORTANT: simulated OCO - when one leg fills, an external watcher must cancel the other.");
        }
        Commands::Twap {
            symbol,
            side,
            quantity,
            duration,
            slices,
            price,
            use_sentiment_filter,
        } => {
            let mut planner = TwapPlanner::new(market, executor);
            if use_sentiment_filter {
                planner = planner.with_sentiment(build_sentiment_filter(&config)?);
            }
            let summary = planner
                .execute(
                    TwapParams {
                        symbol,
                        side: side.into(),
                        total_quantity: quantity,
                        duration_minutes: duration,
                        slice_count: slices,
                        limit_price: price,
                        use_sentiment: use_sentiment_filter,
                    },
                    &stop,
                )
                .await?;
            print_summary(&summary);
        }
        Commands::Grid {
            symbol,
            range_top,
            range_bottom,
            grids,
            quantity,
        } => {
            let mut planner = GridPlanner::new(market, executor);
            let summary = planner
                .execute(
                    GridParams {
                        symbol,
                        range_bottom,
                        range_top,
                        grid_count: grids,
                        quantity_per_level: quantity,
                        use_sentiment: false,
                    },
                    &stop,
                )
                .await?;
            print_summary(&summary);
            println!("\nIMPORTANT: this only sets up the initial grid; a long-running monitor must replace filled levels.");
        }
    }

    Ok(())
}
