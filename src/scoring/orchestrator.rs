use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ScoringSettings, TokenRegistry};
use crate::models::{
    round_score, BehaviorMetrics, Chain, DataQuality, MetricKind, MetricSet, PortfolioSnapshot,
    Result, ScoreReport, UserType,
};
use crate::scoring::{aggregate, analyzers, classify, extract_behavior, PortfolioView, WeightTable};

/// Number of snapshot fields that count towards data quality.
pub const CORE_DATA_SOURCES: usize = 4;

pub const BEHAVIOR_CLASSIFICATION_LABEL: &str = "User Behavior Classification";

/// Full breakdown of one scoring run, before rounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAnalysis {
    pub metrics: MetricSet,
    pub behavior: BehaviorMetrics,
    pub risk_score: f64,
    pub health_score: f64,
    pub user_type: UserType,
    pub data_quality: DataQuality,
    pub generated_at: DateTime<Utc>,
}

impl ScoreAnalysis {
    pub fn to_report(&self) -> ScoreReport {
        let mut analyzed_metrics: Vec<String> = self
            .metrics
            .observed_kinds()
            .iter()
            .map(|k| k.display_name().to_string())
            .collect();
        analyzed_metrics.push(BEHAVIOR_CLASSIFICATION_LABEL.to_string());

        ScoreReport {
            risk_score: round_score(self.risk_score),
            health_score: round_score(self.health_score),
            user_type: self.user_type,
            data_quality: self.data_quality,
            analyzed_metrics,
            generated_at: self.generated_at,
        }
    }
}

pub fn assess_data_quality(snapshot: &PortfolioSnapshot) -> DataQuality {
    DataQuality::from_ratio(snapshot.available_sources() as f64 / CORE_DATA_SOURCES as f64)
}

/// Runs analyzers over a snapshot, aggregates Risk and Health scores and
/// classifies the user type.
#[derive(Debug, Clone)]
pub struct ScoreOrchestrator {
    risk_weights: WeightTable,
    health_weights: WeightTable,
}

impl Default for ScoreOrchestrator {
    fn default() -> Self {
        Self::new(WeightTable::risk(), WeightTable::health())
    }
}

impl ScoreOrchestrator {
    pub fn new(risk_weights: WeightTable, health_weights: WeightTable) -> Self {
        Self {
            risk_weights,
            health_weights,
        }
    }

    pub fn from_settings(settings: &ScoringSettings) -> Result<Self> {
        Ok(Self::new(
            settings.risk_weights.table()?,
            settings.health_weights.table()?,
        ))
    }

    pub fn risk_weights(&self) -> &WeightTable {
        &self.risk_weights
    }

    pub fn health_weights(&self) -> &WeightTable {
        &self.health_weights
    }

    pub fn compute_report(&self, snapshot: &PortfolioSnapshot, chain: Chain) -> Result<ScoreReport> {
        self.compute_report_at(snapshot, chain, Utc::now())
    }

    /// Scores a snapshot as of `now`. Identical inputs give identical reports.
    pub fn compute_report_at(
        &self,
        snapshot: &PortfolioSnapshot,
        chain: Chain,
        now: DateTime<Utc>,
    ) -> Result<ScoreReport> {
        Ok(self.analyze(snapshot, chain, now)?.to_report())
    }

    pub fn analyze(
        &self,
        snapshot: &PortfolioSnapshot,
        chain: Chain,
        now: DateTime<Utc>,
    ) -> Result<ScoreAnalysis> {
        let registry = TokenRegistry::for_chain(chain);
        let data_quality = assess_data_quality(snapshot);

        let history = snapshot.history.as_deref();
        let orders = snapshot.orders();
        let feed = snapshot.gas_price_feed.as_ref();
        let portfolio = snapshot
            .balances
            .as_ref()
            .map(|b| PortfolioView::from_balances(b, snapshot.prices.as_ref(), &registry));
        let portfolio = portfolio.as_ref();

        debug!("Calculating risk metrics on {}", chain);
        let mut metrics = MetricSet::new();
        metrics.insert(MetricKind::WalletAge, analyzers::wallet_age(history, now));
        metrics.insert(MetricKind::TransactionFrequency, analyzers::transaction_frequency(history));
        metrics.insert(MetricKind::SecureSwapUsage, analyzers::secure_swap_usage(orders, history));
        metrics.insert(
            MetricKind::TokenTrustworthiness,
            analyzers::token_trustworthiness(portfolio, &registry),
        );

        debug!("Calculating health metrics on {}", chain);
        metrics.insert(MetricKind::TokenDiversity, analyzers::token_diversity(portfolio));
        metrics.insert(
            MetricKind::PortfolioConcentration,
            analyzers::portfolio_concentration(portfolio),
        );
        metrics.insert(
            MetricKind::TokenAgeAverage,
            analyzers::token_age_average(portfolio, &registry, now),
        );
        metrics.insert(
            MetricKind::VolatilityExposure,
            analyzers::volatility_exposure(portfolio, &registry),
        );
        metrics.insert(MetricKind::GasEfficiency, analyzers::gas_efficiency(history, feed));

        for (kind, metric) in metrics.iter().filter(|(_, m)| !m.is_observed()) {
            debug!("{} fell back to default {}", kind.display_name(), metric.value());
        }

        let risk_score = aggregate(&metrics, &self.risk_weights)?;
        let health_score = aggregate(&metrics, &self.health_weights)?;

        let behavior = extract_behavior(history, orders, feed, &registry);
        let user_type = classify(&behavior);

        info!(
            "Scored snapshot on {}: risk {:.2}, health {:.2}, type {}, data quality {}",
            chain,
            risk_score,
            health_score,
            user_type,
            data_quality.as_str()
        );

        Ok(ScoreAnalysis {
            metrics,
            behavior,
            risk_score,
            health_score,
            user_type,
            data_quality,
            generated_at: now,
        })
    }
}
