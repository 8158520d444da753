use serde::{Deserialize, Serialize};

use crate::models::{Result, ScoreError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chain {
    Ethereum,
    Polygon,
    Optimism,
    Arbitrum,
    Base,
}

impl Chain {
    pub const ALL: [Chain; 5] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Optimism,
        Chain::Arbitrum,
        Chain::Base,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Optimism => "optimism",
            Chain::Arbitrum => "arbitrum",
            Chain::Base => "base",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Polygon => 137,
            Chain::Optimism => 10,
            Chain::Arbitrum => 42161,
            Chain::Base => 8453,
        }
    }

    pub fn from_id(chain_id: u64) -> Result<Self> {
        Chain::ALL
            .iter()
            .copied()
            .find(|c| c.chain_id() == chain_id)
            .ok_or(ScoreError::UnsupportedChain(chain_id))
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Some(Chain::Ethereum),
            "polygon" | "matic" => Some(Chain::Polygon),
            "optimism" | "op" => Some(Chain::Optimism),
            "arbitrum" | "arb" => Some(Chain::Arbitrum),
            "base" => Some(Chain::Base),
            _ => None,
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.chain_id())
    }
}

/// A scoring request as received from the calling layer, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub wallet_address: String,
    pub chain_id: u64,
}

impl ScoreRequest {
    pub fn new(wallet_address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            chain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids_round_trip() {
        for chain in Chain::ALL {
            assert_eq!(Chain::from_id(chain.chain_id()).unwrap(), chain);
        }
    }

    #[test]
    fn test_unsupported_chain_id() {
        let err = Chain::from_id(56).unwrap_err();
        assert!(matches!(err, ScoreError::UnsupportedChain(56)));
        assert!(err.is_validation());
    }

    #[test]
    fn test_chain_parsing() {
        assert_eq!(Chain::from_str("ETH"), Some(Chain::Ethereum));
        assert_eq!(Chain::from_str("matic"), Some(Chain::Polygon));
        assert_eq!(Chain::from_str("base"), Some(Chain::Base));
        assert_eq!(Chain::from_str("solana"), None);
    }
}
