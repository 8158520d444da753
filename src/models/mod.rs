pub mod cache;
pub mod chain;
pub mod error;
pub mod metrics;
pub mod score;
pub mod snapshot;

pub use cache::*;
pub use chain::*;
pub use error::*;
pub use metrics::*;
pub use score::*;
pub use snapshot::*;
