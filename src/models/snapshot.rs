use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Portfolio data for one wallet on one chain, as handed to the scoring core.
///
/// Every field is optional: `None` means the upstream fetch for that source
/// failed or was never attempted. Ordered maps keep float summation order
/// stable so identical snapshots score bit-for-bit identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Token address (lower-cased) -> balance in base units, as a decimal string.
    #[serde(default)]
    pub balances: Option<BTreeMap<String, String>>,

    /// Transaction records in no particular order.
    #[serde(default)]
    pub history: Option<Vec<TransactionRecord>>,

    #[serde(default)]
    pub gas_price_feed: Option<GasPriceFeed>,

    /// Limit and fusion (auction) orders made by the wallet.
    #[serde(default)]
    pub order_records: Option<Vec<OrderRecord>>,

    /// Token address (lower-cased) -> USD price per whole token.
    /// Not counted towards data quality.
    #[serde(default)]
    pub prices: Option<BTreeMap<String, f64>>,
}

impl PortfolioSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of the four core data sources that are present (possibly empty).
    pub fn available_sources(&self) -> usize {
        [
            self.balances.is_some(),
            self.history.is_some(),
            self.gas_price_feed.is_some(),
            self.order_records.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// History with an empty list treated the same as a missing one.
    pub fn non_empty_history(&self) -> Option<&[TransactionRecord]> {
        self.history.as_deref().filter(|h| !h.is_empty())
    }

    pub fn orders(&self) -> Option<&[OrderRecord]> {
        self.order_records.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub tx_hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// Native value transferred, in wei, as a decimal string.
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub gas_used: Option<u64>,
    #[serde(default)]
    pub gas_price_gwei: Option<f64>,
    #[serde(default)]
    pub kind: TransactionKind,
    /// Token contracts touched by the transaction (lower-cased).
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl TransactionRecord {
    pub fn is_swap(&self) -> bool {
        self.kind == TransactionKind::Swap
    }

    /// Gas price if it is a usable positive number.
    pub fn priced_gas(&self) -> Option<f64> {
        self.gas_price_gwei.filter(|p| p.is_finite() && *p > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Swap,
    Transfer,
    Approve,
    #[default]
    Other,
}

impl TransactionKind {
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "swap" | "swapexactinput" | "swapexactoutput" | "fusionswap" => TransactionKind::Swap,
            "transfer" | "send" | "receive" => TransactionKind::Transfer,
            "approve" | "approval" => TransactionKind::Approve,
            _ => TransactionKind::Other,
        }
    }
}

/// Current network gas price tiers, in gwei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceFeed {
    #[serde(default)]
    pub base_fee_gwei: Option<f64>,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub instant: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_hash: String,
    pub kind: OrderKind,
    pub maker_asset: String,
    pub taker_asset: String,
    #[serde(default)]
    pub making_amount: String,
    #[serde(default)]
    pub taking_amount: String,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Limit,
    Fusion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Filled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "filled" | "executed" | "completed" => OrderStatus::Filled,
            "cancelled" | "canceled" | "invalid" => OrderStatus::Cancelled,
            "expired" => OrderStatus::Expired,
            _ => OrderStatus::Active,
        }
    }
}
