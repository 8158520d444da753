use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    config::Settings,
    models::{Result, ScoreReport, ScoreRequest},
    scoring::{ScoreAnalysis, ScoreOrchestrator},
    sources::{normalize, PortfolioSource, RawPortfolioData},
    verification::validate_request,
};

/// Validates requests, fetches portfolio data and scores it.
///
/// Upstream failures degrade to a low data quality report; only invalid
/// requests or configuration produce errors.
pub struct ScoreCalculator {
    source: Arc<dyn PortfolioSource>,
    orchestrator: ScoreOrchestrator,
    settings: Settings,
}

impl ScoreCalculator {
    pub fn new(source: Arc<dyn PortfolioSource>, settings: Settings) -> Result<Self> {
        let orchestrator = ScoreOrchestrator::from_settings(&settings.scoring)?;

        Ok(Self {
            source,
            orchestrator,
            settings,
        })
    }

    pub fn orchestrator(&self) -> &ScoreOrchestrator {
        &self.orchestrator
    }

    pub async fn calculate_wallet_score(&self, request: &ScoreRequest) -> Result<ScoreReport> {
        self.calculate_wallet_score_at(request, Utc::now()).await
    }

    pub async fn calculate_wallet_score_at(
        &self,
        request: &ScoreRequest,
        now: DateTime<Utc>,
    ) -> Result<ScoreReport> {
        Ok(self.analyze_wallet_at(request, now).await?.to_report())
    }

    /// Same as [`Self::calculate_wallet_score_at`] but keeps the unrounded
    /// per-metric breakdown.
    pub async fn analyze_wallet_at(
        &self,
        request: &ScoreRequest,
        now: DateTime<Utc>,
    ) -> Result<ScoreAnalysis> {
        let chain = validate_request(&self.settings, request)?;
        info!("Calculating score for {} on {}", request.wallet_address, chain);

        let raw = match self.source.fetch(&request.wallet_address, chain).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Failed to fetch portfolio for {} from {}: {}",
                    request.wallet_address,
                    self.source.name(),
                    e
                );
                RawPortfolioData::default()
            }
        };

        let snapshot = normalize(&raw);
        self.orchestrator.analyze(&snapshot, chain, now)
    }

    /// Scores requests concurrently; results keep the input order.
    pub async fn calculate_batch_scores(&self, requests: &[ScoreRequest]) -> Vec<Result<ScoreReport>> {
        info!("Calculating scores for {} wallets", requests.len());
        let now = Utc::now();

        join_all(
            requests
                .iter()
                .map(|request| self.calculate_wallet_score_at(request, now)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chain, DataQuality, ScoreError, UserType};
    use crate::sources::MockPortfolioSource;
    use serde_json::json;

    const ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f6e842";

    fn now() -> DateTime<Utc> {
        "2024-06-01T00:00:00Z".parse().unwrap()
    }

    fn calculator(mock: MockPortfolioSource) -> ScoreCalculator {
        ScoreCalculator::new(Arc::new(mock), Settings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_address_skips_fetch() {
        let mut mock = MockPortfolioSource::new();
        mock.expect_fetch().never();
        let calculator = calculator(mock);

        let err = calculator
            .calculate_wallet_score_at(&ScoreRequest::new("0x123", 1), now())
            .await
            .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_unsupported_chain_skips_fetch() {
        let mut mock = MockPortfolioSource::new();
        mock.expect_fetch().never();
        let calculator = calculator(mock);

        let err = calculator
            .calculate_wallet_score_at(&ScoreRequest::new(ADDRESS, 56), now())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_upstream_failure_degrades_to_low_quality() {
        let mut mock = MockPortfolioSource::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch().times(1).returning(|_, _| {
            Err(ScoreError::Upstream {
                source_name: "mock".to_string(),
                message: "connection reset".to_string(),
            })
        });
        let calculator = calculator(mock);

        let report = calculator
            .calculate_wallet_score_at(&ScoreRequest::new(ADDRESS, 1), now())
            .await
            .unwrap();

        assert_eq!(report.data_quality, DataQuality::Low);
        assert_eq!(report.user_type, UserType::Passive);
        assert_eq!(report.risk_score, 28.5);
        assert_eq!(report.health_score, 28.0);
    }

    #[tokio::test]
    async fn test_fetches_with_resolved_chain() {
        let mut mock = MockPortfolioSource::new();
        mock.expect_fetch().times(1).returning(|address, chain| {
            assert_eq!(address, ADDRESS);
            assert_eq!(chain, Chain::Arbitrum);
            Ok(RawPortfolioData {
                balances: Some(json!({"0xaf88d065e77c8cc2239327c5edb3a432268e5831": "1000000"})),
                gas_price: Some(json!({
                    "low": "10000000",
                    "medium": "20000000",
                    "high": "30000000",
                    "instant": "50000000"
                })),
                ..Default::default()
            })
        });
        let calculator = calculator(mock);

        let report = calculator
            .calculate_wallet_score_at(&ScoreRequest::new(ADDRESS, 42161), now())
            .await
            .unwrap();

        assert_eq!(report.data_quality, DataQuality::Medium);
        assert!(report.analyzed_metrics.contains(&"Token Diversity".to_string()));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let mut mock = MockPortfolioSource::new();
        mock.expect_fetch().returning(|_, _| Ok(RawPortfolioData::default()));
        let calculator = calculator(mock);

        let requests = vec![
            ScoreRequest::new(ADDRESS, 1),
            ScoreRequest::new("not-an-address", 1),
            ScoreRequest::new(ADDRESS, 10),
        ];
        let results = calculator.calculate_batch_scores(&requests).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ScoreError::InvalidAddress(_))));
        assert!(results[2].is_ok());
    }
}
