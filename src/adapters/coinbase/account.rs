//! Account gateway backed by the Coinbase v2 accounts endpoint.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::domain::decision::AccountSnapshot;
use crate::domain::errors::GatewayError;
use crate::domain::intent::Symbol;
use crate::ports::account::AccountGateway;

use super::client::CoinbaseClient;
use super::types::AccountsResponse;

/// Balances and buying power. Owns no state beyond the shared client.
pub struct CoinbaseAccountGateway {
    client: Arc<CoinbaseClient>,
}

impl CoinbaseAccountGateway {
    pub fn new(client: Arc<CoinbaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountGateway for CoinbaseAccountGateway {
    #[instrument(skip(self))]
    async fn get_balances(&self) -> Result<AccountSnapshot, GatewayError> {
        let response: AccountsResponse = self.client.get_signed("/v2/accounts").await?;

        let mut snapshot = AccountSnapshot::default();
        for account in response.data {
            let Ok(amount) = Decimal::from_str(&account.balance.amount) else {
                continue;
            };
            if amount <= Decimal::ZERO {
                continue;
            }
            // USD (and its stablecoin twin) is buying power; anything that
            // resolves to a supported symbol is a holding; the rest of the
            // wallet is invisible to the pipeline.
            match account.currency.as_str() {
                "USD" | "USDC" => snapshot.buying_power_usd += amount,
                code => {
                    if let Some(symbol) = Symbol::resolve(code) {
                        *snapshot.holdings.entry(symbol).or_default() += amount;
                    }
                }
            }
        }

        debug!(
            buying_power = %snapshot.buying_power_usd,
            holdings = snapshot.holdings.len(),
            "Fetched account balances"
        );
        Ok(snapshot)
    }
}
