use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

/// The nine signals that feed the Risk and Health scores, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    // Risk
    WalletAge,
    TransactionFrequency,
    SecureSwapUsage,
    TokenTrustworthiness,
    // Health
    TokenDiversity,
    PortfolioConcentration,
    TokenAgeAverage,
    VolatilityExposure,
    GasEfficiency,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::WalletAge,
        MetricKind::TransactionFrequency,
        MetricKind::SecureSwapUsage,
        MetricKind::TokenTrustworthiness,
        MetricKind::TokenDiversity,
        MetricKind::PortfolioConcentration,
        MetricKind::TokenAgeAverage,
        MetricKind::VolatilityExposure,
        MetricKind::GasEfficiency,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::WalletAge => "walletAge",
            MetricKind::TransactionFrequency => "transactionFrequency",
            MetricKind::SecureSwapUsage => "secureSwapUsage",
            MetricKind::TokenTrustworthiness => "tokenTrustworthiness",
            MetricKind::TokenDiversity => "tokenDiversity",
            MetricKind::PortfolioConcentration => "portfolioConcentration",
            MetricKind::TokenAgeAverage => "tokenAgeAverage",
            MetricKind::VolatilityExposure => "volatilityExposure",
            MetricKind::GasEfficiency => "gasEfficiency",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MetricKind::WalletAge => "Wallet Age",
            MetricKind::TransactionFrequency => "Transaction Frequency",
            MetricKind::SecureSwapUsage => "Secure Swap Usage",
            MetricKind::TokenTrustworthiness => "Token Trustworthiness",
            MetricKind::TokenDiversity => "Token Diversity",
            MetricKind::PortfolioConcentration => "Portfolio Concentration",
            MetricKind::TokenAgeAverage => "Token Age Average",
            MetricKind::VolatilityExposure => "Volatility Exposure",
            MetricKind::GasEfficiency => "Gas Efficiency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricBasis {
    /// Computed from upstream data.
    Observed,
    /// Upstream data was absent, empty or unusable.
    Default,
}

/// One analyzer's output: a value in [0,100], where 100 is most favorable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetric {
    value: f64,
    basis: MetricBasis,
}

impl NormalizedMetric {
    /// Wraps a computed value, clamping to [0,100]. Non-finite values fall
    /// back to `default`.
    pub fn observed(value: f64, default: f64) -> Self {
        if !value.is_finite() {
            return Self::fallback(default);
        }
        Self {
            value: clamp_metric(value),
            basis: MetricBasis::Observed,
        }
    }

    pub fn fallback(default: f64) -> Self {
        Self {
            value: clamp_metric(default),
            basis: MetricBasis::Default,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn basis(&self) -> MetricBasis {
        self.basis
    }

    pub fn is_observed(&self) -> bool {
        self.basis == MetricBasis::Observed
    }
}

pub fn clamp_metric(value: f64) -> f64 {
    if value.is_nan() {
        return METRIC_MIN;
    }
    value.clamp(METRIC_MIN, METRIC_MAX)
}

/// Analyzer outputs keyed by metric, iterated in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    metrics: BTreeMap<MetricKind, NormalizedMetric>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: MetricKind, metric: NormalizedMetric) {
        self.metrics.insert(kind, metric);
    }

    pub fn get(&self, kind: MetricKind) -> Option<&NormalizedMetric> {
        self.metrics.get(&kind)
    }

    pub fn value(&self, kind: MetricKind) -> Option<f64> {
        self.get(kind).map(NormalizedMetric::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKind, &NormalizedMetric)> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn observed_kinds(&self) -> Vec<MetricKind> {
        self.metrics
            .iter()
            .filter(|(_, m)| m.is_observed())
            .map(|(k, _)| *k)
            .collect()
    }
}

impl FromIterator<(MetricKind, NormalizedMetric)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (MetricKind, NormalizedMetric)>>(iter: I) -> Self {
        Self {
            metrics: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionTiming {
    #[serde(rename = "peak")]
    Peak,
    #[serde(rename = "off-peak")]
    OffPeak,
    #[serde(rename = "mixed")]
    Mixed,
}

impl TransactionTiming {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "peak" => Some(TransactionTiming::Peak),
            "off-peak" | "offpeak" | "off_peak" => Some(TransactionTiming::OffPeak),
            "mixed" => Some(TransactionTiming::Mixed),
            _ => None,
        }
    }
}

/// Behavioral signals used to classify the wallet's user type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorMetrics {
    /// Swaps per 30 days.
    pub swap_frequency: f64,
    /// Share of orders placed as limit orders, in [0,1].
    pub limit_order_usage_ratio: f64,
    pub transaction_timing: TransactionTiming,
    /// Share of token-touching transactions involving unknown tokens, in [0,1].
    pub new_token_interaction_ratio: f64,
    /// Share of transactions sent at low gas prices, in [0,1].
    pub gas_optimization_ratio: f64,
}

impl Default for BehaviorMetrics {
    fn default() -> Self {
        Self {
            swap_frequency: 0.0,
            limit_order_usage_ratio: 0.0,
            transaction_timing: TransactionTiming::Mixed,
            new_token_interaction_ratio: 0.0,
            gas_optimization_ratio: 0.0,
        }
    }
}
