//! Integration Tests - End-to-end Pipeline Testing
//!
//! Tests the interaction between the trade execution pipeline, the
//! ports, and mock adapters. Uses mockall for trait mocking and
//! tokio::test for async tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mockall::mock;
use tokio_test::assert_ok;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use frank_bot::domain::decision::{AccountSnapshot, ExecutionResult, OrderAttempt, RejectReason};
use frank_bot::domain::errors::{AdapterError, GatewayError, NormalizationError};
use frank_bot::domain::intent::{CandidateIntent, RawAmount, RawUtterance, Symbol, TradeSide};
use frank_bot::domain::normalizer::TradingRules;
use frank_bot::ports::market_data::{AssetStatus, MarketSnapshot};
use frank_bot::ports::orders::OrderFill;
use frank_bot::usecases::pipeline::{PipelineError, PipelineOutcome, TradePipeline};

// ---- Mock Definitions ----

mock! {
    pub Interpreter {}

    #[async_trait::async_trait]
    impl frank_bot::ports::interpreter::IntentInterpreter for Interpreter {
        async fn interpret(
            &self,
            utterance: &RawUtterance,
        ) -> Result<CandidateIntent, AdapterError>;
    }
}

mock! {
    pub Market {}

    #[async_trait::async_trait]
    impl frank_bot::ports::market_data::MarketData for Market {
        async fn get_price(&self, symbol: Symbol) -> Result<Decimal, GatewayError>;
        async fn get_market_status(&self) -> Result<MarketSnapshot, GatewayError>;
    }
}

mock! {
    pub Account {}

    #[async_trait::async_trait]
    impl frank_bot::ports::account::AccountGateway for Account {
        async fn get_balances(&self) -> Result<AccountSnapshot, GatewayError>;
    }
}

mock! {
    pub Orders {}

    #[async_trait::async_trait]
    impl frank_bot::ports::orders::OrderGateway for Orders {
        async fn submit_order(&self, attempt: &OrderAttempt) -> Result<OrderFill, GatewayError>;
    }
}

// ---- Test Helpers ----

fn rules() -> TradingRules {
    TradingRules {
        allowed: vec![Symbol::BTC, Symbol::ETH, Symbol::SOL],
        restricted: vec![Symbol::DOGE],
        min_order_size: dec!(0.0001),
        max_trade_usd: dec!(10000),
        idempotency_bucket_secs: 3600,
    }
}

fn candidate(action: &str, symbol: Option<&str>, amount: Option<f64>) -> CandidateIntent {
    CandidateIntent {
        action: Some(action.to_string()),
        symbol: symbol.map(str::to_string),
        amount: amount.map(RawAmount::Number),
        unit: None,
        confidence: Some(0.9),
    }
}

fn account_with(usd: Decimal, symbol: Symbol, qty: Decimal) -> AccountSnapshot {
    AccountSnapshot {
        buying_power_usd: usd,
        holdings: HashMap::from([(symbol, qty)]),
    }
}

fn pipeline(
    interpreter: MockInterpreter,
    market: MockMarket,
    account: MockAccount,
    orders: MockOrders,
) -> TradePipeline {
    TradePipeline::new(
        Arc::new(interpreter),
        Arc::new(market),
        Arc::new(account),
        Arc::new(orders),
        rules(),
    )
}

fn untouched_gateways() -> (MockMarket, MockAccount, MockOrders) {
    let mut market = MockMarket::new();
    market.expect_get_price().times(0);
    market.expect_get_market_status().times(0);
    let mut account = MockAccount::new();
    account.expect_get_balances().times(0);
    let mut orders = MockOrders::new();
    orders.expect_submit_order().times(0);
    (market, account, orders)
}

// ---- Scenarios ----

#[tokio::test]
async fn free_text_buy_flows_to_a_fill() {
    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .withf(|u: &RawUtterance| u.text == "buy 0.1 eth")
        .times(1)
        .returning(|_| Ok(candidate("buy", Some("eth"), Some(0.1))));

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .times(1)
        .returning(|_| Ok(dec!(2000)));

    let mut account = MockAccount::new();
    account
        .expect_get_balances()
        .times(1)
        .returning(|| Ok(account_with(dec!(1000), Symbol::ETH, dec!(0))));

    let mut orders = MockOrders::new();
    orders
        .expect_submit_order()
        .withf(|attempt: &OrderAttempt| {
            attempt.side == TradeSide::Buy
                && attempt.symbol == Symbol::ETH
                && attempt.base_amount == dec!(0.1)
                && attempt.notional_usd == dec!(200)
        })
        .times(1)
        .returning(|attempt| {
            Ok(OrderFill {
                order_id: "ord-1".to_string(),
                executed_amount: attempt.base_amount,
                executed_price: dec!(2000),
            })
        });

    let result = assert_ok!(
        pipeline(interpreter, market, account, orders)
            .handle("user-1", "buy 0.1 eth")
            .await
    );

    assert_eq!(
        result,
        PipelineOutcome::Trade(ExecutionResult::Filled {
            order_id: "ord-1".to_string(),
            executed_amount: dec!(0.1),
            executed_price: dec!(2000),
        })
    );
}

#[tokio::test]
async fn oversold_position_is_rejected_without_submission() {
    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .times(1)
        .returning(|_| Ok(candidate("sell", Some("btc"), Some(5.0))));

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .times(1)
        .returning(|_| Ok(dec!(60000)));

    let mut account = MockAccount::new();
    account
        .expect_get_balances()
        .times(1)
        .returning(|| Ok(account_with(dec!(0), Symbol::BTC, dec!(0.2))));

    let mut orders = MockOrders::new();
    orders.expect_submit_order().times(0);

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "sell 5 btc")
        .await
        .unwrap();

    assert_eq!(
        result,
        PipelineOutcome::Trade(ExecutionResult::Rejected {
            reason: RejectReason::InsufficientFunds {
                side: TradeSide::Sell,
                requested: dec!(5),
                available: dec!(0.2),
            }
        })
    );
}

#[tokio::test]
async fn buy_beyond_buying_power_never_reaches_the_brokerage() {
    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .times(1)
        .returning(|_| Ok(candidate("buy", Some("btc"), Some(0.1))));

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .times(1)
        .returning(|_| Ok(dec!(60000)));

    let mut account = MockAccount::new();
    account
        .expect_get_balances()
        .times(1)
        .returning(|| Ok(account_with(dec!(100), Symbol::BTC, dec!(0))));

    let mut orders = MockOrders::new();
    orders.expect_submit_order().times(0);

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "buy 0.1 btc")
        .await
        .unwrap();

    assert!(matches!(
        result,
        PipelineOutcome::Trade(ExecutionResult::Rejected {
            reason: RejectReason::InsufficientFunds {
                side: TradeSide::Buy,
                ..
            }
        })
    ));
}

#[tokio::test]
async fn unmappable_action_rejects_before_any_gateway_call() {
    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .times(1)
        .returning(|_| Ok(candidate("dance", None, None)));

    let (market, account, orders) = untouched_gateways();

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "dance for me")
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::Normalization(
            NormalizationError::UnknownIntent { .. }
        ))
    ));
}

#[tokio::test]
async fn sideless_trade_command_requires_a_side() {
    // Fast-path command: the interpreter must not be consulted.
    let mut interpreter = MockInterpreter::new();
    interpreter.expect_interpret().times(0);

    let (market, account, orders) = untouched_gateways();

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "!trade 0.05 BTC")
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::Normalization(NormalizationError::MissingSide))
    ));
}

#[tokio::test]
async fn price_command_bypasses_the_interpreter() {
    let mut interpreter = MockInterpreter::new();
    interpreter.expect_interpret().times(0);

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .withf(|&s| s == Symbol::BTC)
        .times(1)
        .returning(|_| Ok(dec!(60000)));
    let mut account = MockAccount::new();
    account.expect_get_balances().times(0);
    let mut orders = MockOrders::new();
    orders.expect_submit_order().times(0);

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "!price btc")
        .await
        .unwrap();

    assert_eq!(
        result,
        PipelineOutcome::Price {
            symbol: Symbol::BTC,
            usd: dec!(60000),
        }
    );
}

#[tokio::test]
async fn repeated_request_in_one_bucket_reuses_the_idempotency_key() {
    // Wide bucket (1h in rules()) so both invocations land in it.
    let seen_keys: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .times(2)
        .returning(|_| Ok(candidate("buy", Some("eth"), Some(0.1))));

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .times(2)
        .returning(|_| Ok(dec!(2000)));

    let mut account = MockAccount::new();
    account
        .expect_get_balances()
        .times(2)
        .returning(|| Ok(account_with(dec!(1000), Symbol::ETH, dec!(0))));

    let mut orders = MockOrders::new();
    let keys = Arc::clone(&seen_keys);
    orders.expect_submit_order().times(2).returning(move |attempt| {
        keys.lock().unwrap().push(attempt.idempotency_key.clone());
        Ok(OrderFill {
            order_id: "ord-1".to_string(),
            executed_amount: attempt.base_amount,
            executed_price: dec!(2000),
        })
    });

    let pipeline = pipeline(interpreter, market, account, orders);
    let first = pipeline.handle("user-1", "buy 0.1 eth").await.unwrap();
    let second = pipeline.handle("user-1", "buy 0.1 eth").await.unwrap();

    assert_eq!(first, second);
    let keys = seen_keys.lock().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], keys[1], "same logical request must reuse its key");
}

#[tokio::test]
async fn retryable_submit_failure_is_reported_not_retried() {
    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .times(1)
        .returning(|_| Ok(candidate("buy", Some("eth"), Some(0.1))));

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .times(1)
        .returning(|_| Ok(dec!(2000)));

    let mut account = MockAccount::new();
    account
        .expect_get_balances()
        .times(1)
        .returning(|| Ok(account_with(dec!(1000), Symbol::ETH, dec!(0))));

    let mut orders = MockOrders::new();
    orders
        .expect_submit_order()
        .times(1)
        .returning(|_| Err(GatewayError::unavailable("gateway timeout")));

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "buy 0.1 eth")
        .await
        .unwrap();

    assert!(matches!(
        result,
        PipelineOutcome::Trade(ExecutionResult::Failed {
            retryable: true,
            ..
        })
    ));
}

#[tokio::test]
async fn read_only_gateway_outage_surfaces_as_retryable_error() {
    let mut interpreter = MockInterpreter::new();
    interpreter.expect_interpret().times(0);

    let mut market = MockMarket::new();
    market
        .expect_get_price()
        .times(1)
        .returning(|_| Err(GatewayError::unavailable("connection refused")));
    let mut account = MockAccount::new();
    account.expect_get_balances().times(0);
    let mut orders = MockOrders::new();
    orders.expect_submit_order().times(0);

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "!price eth")
        .await;

    match result {
        Err(PipelineError::Gateway(e)) => assert!(e.retryable),
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn portfolio_is_valued_from_a_single_market_lookup() {
    let mut interpreter = MockInterpreter::new();
    interpreter.expect_interpret().times(0);

    let mut market = MockMarket::new();
    market.expect_get_price().times(0);
    market.expect_get_market_status().times(1).returning(|| {
        Ok(MarketSnapshot {
            assets: vec![AssetStatus {
                symbol: Symbol::BTC,
                spot_usd: dec!(60000),
                change_24h_pct: Some(dec!(1.2)),
            }],
        })
    });

    let mut account = MockAccount::new();
    account
        .expect_get_balances()
        .times(1)
        .returning(|| Ok(account_with(dec!(500), Symbol::BTC, dec!(0.5))));

    let mut orders = MockOrders::new();
    orders.expect_submit_order().times(0);

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "!portfolio")
        .await
        .unwrap();

    let PipelineOutcome::Portfolio(view) = result else {
        panic!("expected portfolio outcome");
    };
    assert_eq!(view.cash_usd, dec!(500));
    assert_eq!(view.positions.len(), 1);
    assert_eq!(view.positions[0].value_usd, Some(dec!(30000.0)));
    assert_eq!(view.total_usd, Some(dec!(30500.0)));
}

#[tokio::test]
async fn interpreter_outage_stops_the_pipeline_cleanly() {
    let mut interpreter = MockInterpreter::new();
    interpreter
        .expect_interpret()
        .times(1)
        .returning(|_| Err(AdapterError::Unavailable("model endpoint down".to_string())));

    let (market, account, orders) = untouched_gateways();

    let result = pipeline(interpreter, market, account, orders)
        .handle("user-1", "what's good today")
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::Adapter(AdapterError::Unavailable(_)))
    ));
}
