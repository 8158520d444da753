use serde::{Deserialize, Serialize};

use crate::models::{MetricKind, Result, ScoreError};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub wallet_age: f64,
    pub transaction_frequency: f64,
    pub secure_swap_usage: f64,
    pub token_trustworthiness: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            wallet_age: 0.25,
            transaction_frequency: 0.20,
            secure_swap_usage: 0.20,
            token_trustworthiness: 0.35,
        }
    }
}

impl RiskWeights {
    pub fn total(&self) -> f64 {
        self.wallet_age + self.transaction_frequency + self.secure_swap_usage + self.token_trustworthiness
    }

    pub fn validate(&self) -> Result<()> {
        self.table().map(|_| ())
    }

    pub fn table(&self) -> Result<WeightTable> {
        WeightTable::new("risk", self.entries())
    }

    fn entries(&self) -> Vec<(MetricKind, f64)> {
        vec![
            (MetricKind::WalletAge, self.wallet_age),
            (MetricKind::TransactionFrequency, self.transaction_frequency),
            (MetricKind::SecureSwapUsage, self.secure_swap_usage),
            (MetricKind::TokenTrustworthiness, self.token_trustworthiness),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthWeights {
    pub token_diversity: f64,
    pub portfolio_concentration: f64,
    pub token_age_average: f64,
    pub volatility_exposure: f64,
    pub gas_efficiency: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            token_diversity: 0.30,
            portfolio_concentration: 0.25,
            token_age_average: 0.15,
            volatility_exposure: 0.20,
            gas_efficiency: 0.10,
        }
    }
}

impl HealthWeights {
    pub fn total(&self) -> f64 {
        self.token_diversity
            + self.portfolio_concentration
            + self.token_age_average
            + self.volatility_exposure
            + self.gas_efficiency
    }

    pub fn validate(&self) -> Result<()> {
        self.table().map(|_| ())
    }

    pub fn table(&self) -> Result<WeightTable> {
        WeightTable::new("health", self.entries())
    }

    fn entries(&self) -> Vec<(MetricKind, f64)> {
        vec![
            (MetricKind::TokenDiversity, self.token_diversity),
            (MetricKind::PortfolioConcentration, self.portfolio_concentration),
            (MetricKind::TokenAgeAverage, self.token_age_average),
            (MetricKind::VolatilityExposure, self.volatility_exposure),
            (MetricKind::GasEfficiency, self.gas_efficiency),
        ]
    }
}

/// Immutable metric -> weight mapping whose weights lie in [0,1] and sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    name: String,
    weights: Vec<(MetricKind, f64)>,
}

impl WeightTable {
    pub fn new(name: impl Into<String>, weights: Vec<(MetricKind, f64)>) -> Result<Self> {
        let name = name.into();
        let invalid = |message: String| ScoreError::InvalidWeights {
            table: name.clone(),
            message,
        };

        if weights.is_empty() {
            return Err(invalid("table has no entries".to_string()));
        }

        for (i, (kind, weight)) in weights.iter().enumerate() {
            if !(0.0..=1.0).contains(weight) {
                return Err(invalid(format!("{} weight {} outside [0, 1]", kind.key(), weight)));
            }
            if weights[..i].iter().any(|(k, _)| k == kind) {
                return Err(invalid(format!("{} listed twice", kind.key())));
            }
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!("weights must sum to 1.0, got {}", total)));
        }

        Ok(Self { name, weights })
    }

    /// The fixed Risk Score table.
    pub fn risk() -> Self {
        let entries = RiskWeights::default().entries();
        debug_assert!(Self::new("risk", entries.clone()).is_ok(), "default risk weights are invalid");
        Self { name: "risk".to_string(), weights: entries }
    }

    /// The fixed Health Score table.
    pub fn health() -> Self {
        let entries = HealthWeights::default().entries();
        debug_assert!(Self::new("health", entries.clone()).is_ok(), "default health weights are invalid");
        Self { name: "health".to_string(), weights: entries }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[(MetricKind, f64)] {
        &self.weights
    }

    pub fn weight(&self, kind: MetricKind) -> Option<f64> {
        self.weights.iter().find(|(k, _)| *k == kind).map(|(_, w)| *w)
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_tables_sum_to_one() {
        for table in [WeightTable::risk(), WeightTable::health()] {
            assert!((table.total() - 1.0).abs() < 1e-9, "{} sums to {}", table.name(), table.total());
        }
        assert!((RiskWeights::default().total() - 1.0).abs() < 1e-9);
        assert!((HealthWeights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_tables_cover_their_metrics() {
        let risk = WeightTable::risk();
        assert_eq!(risk.entries().len(), 4);
        assert_eq!(risk.weight(MetricKind::TokenTrustworthiness), Some(0.35));
        assert_eq!(risk.weight(MetricKind::GasEfficiency), None);

        let health = WeightTable::health();
        assert_eq!(health.entries().len(), 5);
        assert_eq!(health.weight(MetricKind::TokenDiversity), Some(0.30));
    }

    #[test]
    fn test_rejects_bad_sum() {
        let err = WeightTable::new(
            "test",
            vec![(MetricKind::WalletAge, 0.5), (MetricKind::TokenDiversity, 0.4)],
        )
        .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidWeights { .. }));
    }

    #[test]
    fn test_rejects_out_of_range_and_duplicates() {
        assert!(WeightTable::new(
            "test",
            vec![(MetricKind::WalletAge, 1.5), (MetricKind::TokenDiversity, -0.5)],
        )
        .is_err());

        assert!(WeightTable::new(
            "test",
            vec![(MetricKind::WalletAge, 0.5), (MetricKind::WalletAge, 0.5)],
        )
        .is_err());

        assert!(WeightTable::new("test", Vec::new()).is_err());
    }
}
