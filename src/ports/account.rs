//! Account port - portfolio balances and buying power.

use async_trait::async_trait;

use crate::domain::decision::AccountSnapshot;
use crate::domain::errors::GatewayError;

/// Trait for brokerage account providers. Leaf dependency.
#[async_trait]
pub trait AccountGateway: Send + Sync + 'static {
    /// Current balances: USD buying power plus per-symbol holdings.
    async fn get_balances(&self) -> Result<AccountSnapshot, GatewayError>;
}
