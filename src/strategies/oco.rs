//! 모의 OCO 전략
//!
//! 거래소 네이티브 OCO가 아니다. reduce-only 주문 두 건(이익 실현
//! 지정가 + 손절 스탑-리밋)을 하나의 그룹 ID로 묶어 독립 제출한다.
//! 한쪽 체결 시 나머지 취소는 체결 알림을 구독하는 외부 감시
//! 프로세스의 책임이다.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::{MarketDataProvider, OrderGateway};
use crate::models::order::{GroupId, OrderIntent, OrderSide};
use crate::models::outcome::{ExecutionFailure, ExecutionOutcome, StrategySummary};
use crate::order_core::{OrderExecutor, OrderValidator};
use crate::strategies::run_intent;
use crate::utils::logging;

/// OCO 요청 파라미터
#[derive(Debug, Clone)]
pub struct OcoParams {
    pub symbol: String,
    /// 보호 중인 포지션을 닫는 방향 (롱 보호 = Sell)
    pub close_side: OrderSide,
    pub quantity: Decimal,
    pub take_profit_price: Decimal,
    pub stop_loss_price: Decimal,
}

/// 두 개의 형제 의도로 구성된 계획
#[derive(Debug, Clone)]
pub struct OcoPlan {
    pub group_id: GroupId,
    pub take_profit: OrderIntent,
    pub stop_loss: OrderIntent,
}

/// 모의 OCO 플래너 겸 실행기
pub struct OcoPlanner {
    market: Arc<RwLock<dyn MarketDataProvider>>,
    gateway: Arc<RwLock<dyn OrderGateway>>,
    executor: OrderExecutor,
    validator: OrderValidator,
}

impl OcoPlanner {
    pub fn new(
        market: Arc<RwLock<dyn MarketDataProvider>>,
        gateway: Arc<RwLock<dyn OrderGateway>>,
        executor: OrderExecutor,
    ) -> Self {
        OcoPlanner {
            market,
            gateway,
            executor,
            validator: OrderValidator::new(),
        }
    }

    /// 두 의도 산출
    ///
    /// 롱 청산(Sell)은 이익 실현이 손절보다 위, 숏 청산(Buy)은
    /// 반대여야 한다. 스탑 다리의 지정가는 트리거와 같게 두어
    /// 발동 즉시 체결을 노린다.
    pub fn plan(&self, params: &OcoParams) -> Result<OcoPlan, TradingError> {
        if params.quantity <= Decimal::ZERO {
            return Err(TradingError::ConfigError("quantity must be positive".to_string()));
        }

        let inverted = match params.close_side {
            OrderSide::Sell => params.take_profit_price <= params.stop_loss_price,
            OrderSide::Buy => params.take_profit_price >= params.stop_loss_price,
        };
        if inverted {
            return Err(TradingError::ConfigError(format!(
                "take profit {} and stop loss {} are inverted for a {} exit",
                params.take_profit_price, params.stop_loss_price, params.close_side
            )));
        }

        let group_id = GroupId::new();
        let take_profit = OrderIntent::limit(
            &params.symbol,
            params.close_side,
            params.quantity,
            params.take_profit_price,
        )
        .reduce_only()
        .with_group(group_id);

        let stop_loss = OrderIntent::stop_limit(
            &params.symbol,
            params.close_side,
            params.quantity,
            params.stop_loss_price,
            params.stop_loss_price,
        )
        .reduce_only()
        .with_group(group_id);

        Ok(OcoPlan {
            group_id,
            take_profit,
            stop_loss,
        })
    }

    /// 두 다리를 순서대로 제출
    ///
    /// 이익 실현 다리가 실패하면 스탑 다리는 아예 내지 않는다
    /// (고아 주문 방지). 스탑 다리가 실패하면 이미 수락된 이익 실현
    /// 다리를 취소한다.
    pub async fn execute(&mut self, params: OcoParams) -> Result<StrategySummary, TradingError> {
        let snapshot = self.market.read().await.get_snapshot(&params.symbol).await?;
        let plan = self.plan(&params)?;

        self.executor.reset_accepted();
        let mut summary = StrategySummary::new(plan.group_id, 2, params.quantity * Decimal::from(2u8));
        logging::log_strategy_start("SIMULATED_OCO", &params.symbol);

        let tp_outcome = run_intent(&self.executor, &self.validator, None, plan.take_profit, &snapshot).await;

        if !tp_outcome.accepted {
            log::error!("이익 실현 다리 실패: 스탑 다리는 제출하지 않음");
            let skipped = ExecutionOutcome::failed(
                plan.stop_loss,
                ExecutionFailure::Rejected("skipped: take-profit leg failed".to_string()),
            );
            summary.record(tp_outcome);
            summary.record(skipped);
            logging::log_strategy_end("SIMULATED_OCO", &summary);
            return Ok(summary);
        }

        let sl_outcome = run_intent(&self.executor, &self.validator, None, plan.stop_loss, &snapshot).await;

        if sl_outcome.accepted {
            summary.record(tp_outcome);
            summary.record(sl_outcome);
            log::info!(
                "모의 OCO 설치 완료 (group {}): 한쪽 체결 시 반대쪽 취소는 외부 감시자가 수행해야 함",
                plan.group_id
            );
        } else {
            // 고아가 된 이익 실현 다리 정리
            let tp_order_id = tp_outcome
                .exchange_order_id
                .clone()
                .ok_or_else(|| TradingError::ExecutionError("accepted outcome without order id".to_string()))?;
            let cancel_result = {
                let mut gateway = self.gateway.write().await;
                gateway.cancel(&params.symbol, &tp_order_id).await
            };
            match cancel_result {
                Ok(()) => {
                    log::warn!("스탑 다리 실패로 이익 실현 주문 {} 취소", tp_order_id);
                    summary.record(ExecutionOutcome::failed(
                        tp_outcome.intent,
                        ExecutionFailure::Rejected("cancelled: stop-loss leg failed".to_string()),
                    ));
                }
                Err(e) => {
                    log::error!(
                        "이익 실현 주문 {} 취소 실패, 수동 취소 필요: {}",
                        tp_order_id,
                        e
                    );
                    summary.record(tp_outcome);
                }
            }
            summary.record(sl_outcome);
        }

        logging::log_strategy_end("SIMULATED_OCO", &summary);
        Ok(summary)
    }
}
