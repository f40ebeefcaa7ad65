//! Command fast-path: `!`-prefixed messages that skip the language model.
//!
//! Grammar:
//! - `!price SYM`
//! - `!portfolio`
//! - `!market`
//! - `!trade buy|sell AMOUNT SYM`
//!
//! Commands are parsed into a synthetic `CandidateIntent` and flow through
//! the same normalizer as the natural-language path, so validation behavior
//! is identical for the same logical request. `!trade` requires an explicit
//! side; there is no default.

use super::intent::{CandidateIntent, RawAmount};

/// Parse a `!command` message into a synthetic candidate.
///
/// Returns `None` when the text is not a command at all (no `!` prefix),
/// letting the caller fall through to the language model. Malformed or
/// unknown commands still return a candidate — the normalizer is the one
/// place that decides what is valid.
pub fn parse_command(text: &str) -> Option<CandidateIntent> {
    let rest = text.trim().strip_prefix('!')?;
    let mut words = rest.split_whitespace();
    let verb = words.next().unwrap_or("").to_ascii_lowercase();

    let candidate = match verb.as_str() {
        "price" => CandidateIntent {
            action: Some("price".to_string()),
            symbol: words.next().map(str::to_string),
            ..CandidateIntent::default()
        },
        "portfolio" => CandidateIntent {
            action: Some("portfolio".to_string()),
            ..CandidateIntent::default()
        },
        "market" => CandidateIntent {
            action: Some("market".to_string()),
            ..CandidateIntent::default()
        },
        "trade" => parse_trade_args(&words.collect::<Vec<_>>()),
        // Unknown verb: hand the normalizer something it will reject
        // with a proper UnknownIntent error.
        other => CandidateIntent {
            action: Some(other.to_string()),
            ..CandidateIntent::default()
        },
    };

    Some(candidate)
}

/// `!trade buy|sell AMOUNT SYM`.
///
/// When the side token is absent the action stays `"trade"`, which the
/// normalizer rejects with `MissingSide` — omitting the side must fail
/// explicitly, never silently turn into a buy.
fn parse_trade_args(args: &[&str]) -> CandidateIntent {
    let (action, rest) = match args.first().map(|s| s.to_ascii_lowercase()) {
        Some(side) if side == "buy" || side == "sell" => (side, &args[1..]),
        _ => ("trade".to_string(), args),
    };

    CandidateIntent {
        action: Some(action),
        amount: rest.first().map(|a| RawAmount::Text((*a).to_string())),
        symbol: rest.get(1).map(|s| (*s).to_string()),
        ..CandidateIntent::default()
    }
}
