//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that intent normalization and the
//! pre-trade decision logic hold their invariants across random inputs.

use proptest::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use frank_bot::domain::decision::{evaluate, idempotency_key, AccountSnapshot, Verdict};
use frank_bot::domain::intent::{
    AmountKind, CandidateIntent, NormalizedIntent, RawAmount, Symbol, TradeRequest, TradeSide,
};
use frank_bot::domain::normalizer::{normalize, TradingRules};

fn rules() -> TradingRules {
    TradingRules {
        allowed: vec![Symbol::BTC, Symbol::ETH, Symbol::SOL, Symbol::DOGE, Symbol::LTC],
        restricted: vec![],
        min_order_size: dec!(0.0000001),
        max_trade_usd: dec!(1000000),
        idempotency_bucket_secs: 60,
    }
}

fn trade_candidate(action: &str, symbol: &str, amount: f64) -> CandidateIntent {
    CandidateIntent {
        action: Some(action.to_string()),
        symbol: Some(symbol.to_string()),
        amount: Some(RawAmount::Number(amount)),
        unit: None,
        confidence: None,
    }
}

fn action_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("buy".to_string()),
        Just("sell".to_string()),
        Just("price".to_string()),
        Just("portfolio".to_string()),
        Just("market".to_string()),
        "[a-z]{1,12}",
    ]
}

fn symbol_alias_strategy() -> impl Strategy<Value = (String, Symbol)> {
    prop_oneof![
        Just(("btc".to_string(), Symbol::BTC)),
        Just(("xbt".to_string(), Symbol::BTC)),
        Just(("bitcoin".to_string(), Symbol::BTC)),
        Just(("eth".to_string(), Symbol::ETH)),
        Just(("ethereum".to_string(), Symbol::ETH)),
        Just(("sol".to_string(), Symbol::SOL)),
        Just(("solana".to_string(), Symbol::SOL)),
        Just(("doge".to_string(), Symbol::DOGE)),
        Just(("ltc".to_string(), Symbol::LTC)),
        Just(("litecoin".to_string(), Symbol::LTC)),
    ]
}

// ── Normalizer Properties ───────────────────────────────────

proptest! {
    /// Same candidate, same rules, same result — no hidden state.
    #[test]
    fn normalize_is_deterministic(
        action in action_strategy(),
        symbol in proptest::option::of("[a-z]{1,8}"),
        amount in proptest::option::of(-1e6f64..1e6),
    ) {
        let candidate = CandidateIntent {
            action: Some(action),
            symbol,
            amount: amount.map(RawAmount::Number),
            unit: None,
            confidence: None,
        };
        let first = normalize(&candidate, &rules());
        let second = normalize(&candidate, &rules());
        prop_assert_eq!(first, second);
    }

    /// Aliases resolve case-insensitively to the same symbol.
    #[test]
    fn symbol_aliases_resolve_in_any_case(
        (alias, expected) in symbol_alias_strategy(),
        upper in any::<bool>(),
    ) {
        let spelled = if upper { alias.to_uppercase() } else { alias };
        let candidate = trade_candidate("buy", &spelled, 0.5);
        let intent = normalize(&candidate, &rules()).unwrap();
        let NormalizedIntent::Trade(request) = intent else {
            return Err(TestCaseError::fail("expected trade"));
        };
        prop_assert_eq!(request.symbol, expected);
    }

    /// Positive numeric amounts always survive normalization as
    /// positive base-unit decimals; everything else is rejected.
    #[test]
    fn numeric_amounts_keep_sign_discipline(amount in -1e6f64..1e6) {
        let candidate = trade_candidate("buy", "btc", amount);
        match normalize(&candidate, &rules()) {
            Ok(NormalizedIntent::Trade(request)) => {
                prop_assert!(amount > 0.0);
                prop_assert!(request.amount > Decimal::ZERO);
                prop_assert_eq!(request.amount_kind, AmountKind::BaseUnits);
            }
            Ok(_) => return Err(TestCaseError::fail("buy cannot normalize to a query")),
            Err(_) => prop_assert!(amount <= 0.0),
        }
    }

    /// Dollar-prefixed text amounts normalize to the quote denomination
    /// with the same value as the bare number.
    #[test]
    fn dollar_prefix_means_quote_usd(amount in 0.01f64..100000.0) {
        let mut candidate = trade_candidate("buy", "eth", 0.0);
        candidate.amount = Some(RawAmount::Text(format!("${amount}")));
        let intent = normalize(&candidate, &rules()).unwrap();
        let NormalizedIntent::Trade(request) = intent else {
            return Err(TestCaseError::fail("expected trade"));
        };
        prop_assert_eq!(request.amount_kind, AmountKind::QuoteUsd);
        let expected: Decimal = format!("{amount}").parse().unwrap();
        prop_assert_eq!(request.amount, expected);
    }
}

// ── Decision Properties ─────────────────────────────────────

proptest! {
    /// An approved buy never exceeds buying power, and its notional is
    /// always the base amount at spot.
    #[test]
    fn approved_buys_fit_within_buying_power(
        amount in 0.001f64..100.0,
        spot in 1.0f64..100000.0,
        power in 0.0f64..1e7,
    ) {
        let request = TradeRequest {
            side: TradeSide::Buy,
            symbol: Symbol::BTC,
            amount: Decimal::from_f64(amount).unwrap(),
            amount_kind: AmountKind::BaseUnits,
        };
        let account = AccountSnapshot {
            buying_power_usd: Decimal::from_f64(power).unwrap(),
            holdings: Default::default(),
        };
        let decision = evaluate(
            &request,
            &account,
            Decimal::from_f64(spot).unwrap(),
            &rules(),
        );
        if let Verdict::Approved { base_amount, notional_usd } = decision.verdict {
            prop_assert!(notional_usd <= account.buying_power_usd);
            prop_assert_eq!(notional_usd, base_amount * decision.spot_usd);
        }
    }

    /// The idempotency key is a 64-char hex digest, stable within a
    /// bucket and distinct across buckets.
    #[test]
    fn idempotency_key_shape_and_bucket_sensitivity(
        user in "[a-z0-9]{1,16}",
        amount in 0.001f64..1000.0,
        bucket in 0u64..1_000_000,
    ) {
        let request = TradeRequest {
            side: TradeSide::Sell,
            symbol: Symbol::ETH,
            amount: Decimal::from_f64(amount).unwrap(),
            amount_kind: AmountKind::BaseUnits,
        };
        let key = idempotency_key(&user, &request, bucket);
        prop_assert_eq!(key.len(), 64);
        prop_assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        prop_assert_eq!(key.clone(), idempotency_key(&user, &request, bucket));
        prop_assert_ne!(key, idempotency_key(&user, &request, bucket + 1));
    }
}
