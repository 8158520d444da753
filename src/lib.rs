pub mod config;
pub mod models;
pub mod scoring;
pub mod sources;
pub mod verification;

pub use config::Settings;
pub use models::{Chain, PortfolioSnapshot, Result, ScoreError, ScoreReport, ScoreRequest, UserType};
pub use scoring::{ScoreCalculator, ScoreOrchestrator};
pub use sources::{normalize, PortfolioSource, RawPortfolioData};

// Re-export commonly used types
pub use rust_decimal::Decimal;
