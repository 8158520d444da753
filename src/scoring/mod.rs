pub mod aggregator;
pub mod analyzers;
pub mod behavior;
pub mod calculator;
pub mod classifier;
pub mod orchestrator;
pub mod portfolio;
pub mod weights;

pub use aggregator::aggregate;
pub use behavior::extract_behavior;
pub use calculator::ScoreCalculator;
pub use classifier::classify;
pub use orchestrator::{ScoreAnalysis, ScoreOrchestrator};
pub use portfolio::PortfolioView;
pub use weights::{HealthWeights, RiskWeights, WeightTable};
