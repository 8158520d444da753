use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{Chain, PortfolioSnapshot, Result};
use crate::sources::{PortfolioSource, RawPortfolioData};

/// How a snapshot file on disk is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Raw 1inch API responses keyed by endpoint
    OneInch,
    /// A serialized [`PortfolioSnapshot`]
    Snapshot,
}

impl FileFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "oneinch" | "1inch" | "raw" => Some(FileFormat::OneInch),
            "snapshot" => Some(FileFormat::Snapshot),
            _ => None,
        }
    }
}

/// Serves portfolio data from a JSON file, ignoring the requested address.
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, format: FileFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PortfolioSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, address: &str, chain: Chain) -> Result<RawPortfolioData> {
        debug!("Reading portfolio for {} on {} from {}", address, chain, self.path.display());
        let contents = tokio::fs::read_to_string(&self.path).await?;

        match self.format {
            FileFormat::OneInch => Ok(serde_json::from_str(&contents)?),
            FileFormat::Snapshot => {
                let snapshot: PortfolioSnapshot = serde_json::from_str(&contents)?;
                snapshot_to_raw(&snapshot)
            }
        }
    }
}

/// Re-encodes a typed snapshot so it passes through the normalizer unchanged.
pub fn snapshot_to_raw(snapshot: &PortfolioSnapshot) -> Result<RawPortfolioData> {
    Ok(RawPortfolioData {
        balances: encode(snapshot.balances.as_ref())?,
        history: encode(snapshot.history.as_ref())?,
        gas_price: encode(snapshot.gas_price_feed.as_ref())?,
        fusion_orders: None,
        // Typed order records keep their own kind.
        limit_orders: encode(snapshot.order_records.as_ref())?,
        prices: encode(snapshot.prices.as_ref())?,
    })
}

fn encode<T: Serialize>(value: Option<&T>) -> Result<Option<Value>> {
    Ok(value.map(serde_json::to_value).transpose()?)
}
