pub mod cached;
pub mod client;
pub mod file;
pub mod normalize;

pub use cached::CachedSource;
pub use client::{PortfolioSource, RawPortfolioData};
#[cfg(test)]
pub use client::MockPortfolioSource;
pub use file::{snapshot_to_raw, FileFormat, FileSource};
pub use normalize::normalize;
