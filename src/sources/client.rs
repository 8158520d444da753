use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Chain, Result};

/// Untyped upstream responses, one per endpoint. `None` means the request
/// failed or was not made.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPortfolioData {
    #[serde(default)]
    pub balances: Option<Value>,
    #[serde(default)]
    pub history: Option<Value>,
    #[serde(default)]
    pub gas_price: Option<Value>,
    #[serde(default)]
    pub fusion_orders: Option<Value>,
    #[serde(default)]
    pub limit_orders: Option<Value>,
    #[serde(default)]
    pub prices: Option<Value>,
}

impl RawPortfolioData {
    pub fn is_empty(&self) -> bool {
        self.balances.is_none()
            && self.history.is_none()
            && self.gas_price.is_none()
            && self.fusion_orders.is_none()
            && self.limit_orders.is_none()
            && self.prices.is_none()
    }
}

/// Supplier of raw portfolio data for a wallet.
///
/// Implementations own any retries, timeouts, caching or rate limiting; the
/// scoring core only sees the normalized result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Fetch everything available for `address` on `chain`.
    async fn fetch(&self, address: &str, chain: Chain) -> Result<RawPortfolioData>;
}
