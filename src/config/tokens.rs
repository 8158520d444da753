use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::Chain;

/// Pseudo address used by aggregators for the chain's native asset.
pub const NATIVE_TOKEN_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

pub const UNKNOWN_TOKEN_DECIMALS: u32 = 18;
pub const UNKNOWN_TOKEN_AGE_YEARS: f64 = 0.5;
pub const UNKNOWN_TOKEN_VOLATILITY: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenCategory {
    Stablecoin,
    BlueChip,
    Defi,
    Governance,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub address: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
    pub category: TokenCategory,
    /// Launch date as (year, month, day).
    pub launched: (i32, u32, u32),
    /// Rough annualized volatility.
    pub volatility: f64,
    /// Registered but flagged tokens (wrapped bridges, deprecated
    /// contracts) earn only partial trust.
    pub trusted: bool,
}

impl TokenInfo {
    pub fn launch_date(&self) -> Option<NaiveDate> {
        let (y, m, d) = self.launched;
        NaiveDate::from_ymd_opt(y, m, d)
    }

    pub fn age_years(&self, now: DateTime<Utc>) -> f64 {
        match self.launch_date() {
            Some(launch) => ((now.date_naive() - launch).num_days().max(0) as f64) / 365.25,
            None => UNKNOWN_TOKEN_AGE_YEARS,
        }
    }

    pub const fn untrusted(self) -> Self {
        TokenInfo { trusted: false, ..self }
    }
}

const fn token(
    address: &'static str,
    symbol: &'static str,
    decimals: u32,
    category: TokenCategory,
    launched: (i32, u32, u32),
    volatility: f64,
) -> TokenInfo {
    TokenInfo { address, symbol, decimals, category, launched, volatility, trusted: true }
}

use TokenCategory::*;

const ETH_NATIVE: TokenInfo = token(NATIVE_TOKEN_ADDRESS, "ETH", 18, BlueChip, (2015, 7, 30), 0.65);

const ETHEREUM_TOKENS: &[TokenInfo] = &[
    ETH_NATIVE,
    token("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH", 18, BlueChip, (2017, 12, 12), 0.65),
    token("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", 6, Stablecoin, (2018, 9, 26), 0.02),
    token("0xdac17f958d2ee523a2206206994597c13d831ec7", "USDT", 6, Stablecoin, (2017, 11, 28), 0.02),
    token("0x6b175474e89094c44da98b954eedeac495271d0f", "DAI", 18, Stablecoin, (2019, 11, 18), 0.02),
    token("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", "WBTC", 8, BlueChip, (2019, 1, 30), 0.55),
    token("0x514910771af9ca656af840dff83e8264ecf986ca", "LINK", 18, Defi, (2017, 9, 16), 0.9),
    token("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "UNI", 18, Governance, (2020, 9, 17), 1.0),
    token("0x7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9", "AAVE", 18, Governance, (2020, 10, 2), 1.0),
    token("0x111111111117dc0aa78b770fa6a738034120c302", "1INCH", 18, Governance, (2020, 12, 24), 1.1),
    token("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2", "MKR", 18, Governance, (2017, 11, 25), 0.95),
    token("0x5a98fcbea516cf06857215779fd812ca3bef1b32", "LDO", 18, Governance, (2020, 12, 17), 1.1),
];

const POLYGON_TOKENS: &[TokenInfo] = &[
    token(NATIVE_TOKEN_ADDRESS, "POL", 18, BlueChip, (2019, 4, 26), 0.85),
    token("0x3c499c542cef5e3811e1192ce70d8cc03d5c3359", "USDC", 6, Stablecoin, (2023, 10, 10), 0.02),
    token("0xc2132d05d31c914a87c6611c10748aeb04b58e8f", "USDT", 6, Stablecoin, (2020, 5, 30), 0.02),
    token("0x7ceb23fd6bc0add59e62ac25578270cff1b9f619", "WETH", 18, BlueChip, (2020, 5, 30), 0.65),
    // Bridged USDC, superseded by native USDC.
    token("0x2791bca1f2de4661ed88a30c99a7a9449aa84174", "USDC.e", 6, Stablecoin, (2020, 5, 30), 0.02)
        .untrusted(),
];

const OPTIMISM_TOKENS: &[TokenInfo] = &[
    ETH_NATIVE,
    token("0x0b2c639c533813f4aa9d7837caf62653d097ff85", "USDC", 6, Stablecoin, (2022, 11, 14), 0.02),
    token("0x4200000000000000000000000000000000000006", "WETH", 18, BlueChip, (2021, 11, 11), 0.65),
    token("0x4200000000000000000000000000000000000042", "OP", 18, Governance, (2022, 5, 31), 1.1),
];

const ARBITRUM_TOKENS: &[TokenInfo] = &[
    ETH_NATIVE,
    token("0xaf88d065e77c8cc2239327c5edb3a432268e5831", "USDC", 6, Stablecoin, (2023, 6, 8), 0.02),
    token("0x82af49447d8a07e3bd95bd0d56f35241523fbab1", "WETH", 18, BlueChip, (2021, 8, 31), 0.65),
    token("0x912ce59144191c1204e64559fe8253a0e49e6548", "ARB", 18, Governance, (2023, 3, 23), 1.2),
];

const BASE_TOKENS: &[TokenInfo] = &[
    ETH_NATIVE,
    token("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", "USDC", 6, Stablecoin, (2023, 8, 31), 0.02),
    token("0x4200000000000000000000000000000000000006", "WETH", 18, BlueChip, (2023, 7, 13), 0.65),
];

/// Well-known tokens on one chain. Unregistered tokens are untrusted.
#[derive(Debug, Clone, Copy)]
pub struct TokenRegistry {
    chain: Chain,
    tokens: &'static [TokenInfo],
}

impl TokenRegistry {
    pub fn for_chain(chain: Chain) -> Self {
        let tokens = match chain {
            Chain::Ethereum => ETHEREUM_TOKENS,
            Chain::Polygon => POLYGON_TOKENS,
            Chain::Optimism => OPTIMISM_TOKENS,
            Chain::Arbitrum => ARBITRUM_TOKENS,
            Chain::Base => BASE_TOKENS,
        };
        Self { chain, tokens }
    }

    /// Registry over a custom token table.
    pub fn with_tokens(chain: Chain, tokens: &'static [TokenInfo]) -> Self {
        Self { chain, tokens }
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn lookup(&self, address: &str) -> Option<&'static TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.address.eq_ignore_ascii_case(address))
    }

    pub fn is_known(&self, address: &str) -> bool {
        self.lookup(address).is_some()
    }

    pub fn is_trusted(&self, address: &str) -> bool {
        self.lookup(address).is_some_and(|t| t.trusted)
    }

    pub fn decimals(&self, address: &str) -> u32 {
        self.lookup(address).map_or(UNKNOWN_TOKEN_DECIMALS, |t| t.decimals)
    }

    pub fn volatility(&self, address: &str) -> f64 {
        self.lookup(address).map_or(UNKNOWN_TOKEN_VOLATILITY, |t| t.volatility)
    }

    pub fn age_years(&self, address: &str, now: DateTime<Utc>) -> f64 {
        self.lookup(address).map_or(UNKNOWN_TOKEN_AGE_YEARS, |t| t.age_years(now))
    }

    pub fn tokens(&self) -> &'static [TokenInfo] {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_token_known_everywhere() {
        for chain in Chain::ALL {
            assert!(TokenRegistry::for_chain(chain).is_known(NATIVE_TOKEN_ADDRESS));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TokenRegistry::for_chain(Chain::Ethereum);
        let usdc = registry.lookup("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
        assert_eq!(usdc.symbol, "USDC");
        assert_eq!(usdc.decimals, 6);
        assert_eq!(usdc.category, TokenCategory::Stablecoin);
    }

    #[test]
    fn test_unknown_token_defaults() {
        let registry = TokenRegistry::for_chain(Chain::Base);
        let unknown = "0x0000000000000000000000000000000000000bad";
        assert!(!registry.is_known(unknown));
        assert_eq!(registry.decimals(unknown), UNKNOWN_TOKEN_DECIMALS);
        assert_eq!(registry.volatility(unknown), UNKNOWN_TOKEN_VOLATILITY);
    }

    #[test]
    fn test_registered_tokens_are_well_formed() {
        for chain in Chain::ALL {
            for t in TokenRegistry::for_chain(chain).tokens() {
                assert_eq!(t.address, t.address.to_lowercase(), "{} on {}", t.symbol, chain);
                assert_eq!(t.address.len(), 42);
                assert!(t.launch_date().is_some());
                assert!(t.volatility > 0.0);
            }
        }
    }

    #[test]
    fn test_trust_flag() {
        let registry = TokenRegistry::for_chain(Chain::Polygon);
        let bridged = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
        assert!(registry.is_known(bridged));
        assert!(!registry.is_trusted(bridged));
        assert!(registry.is_trusted("0x3c499c542cef5e3811e1192ce70d8cc03d5c3359"));
        assert!(!registry.is_trusted("0x0000000000000000000000000000000000000bad"));
    }

    #[test]
    fn test_token_age() {
        let registry = TokenRegistry::for_chain(Chain::Ethereum);
        let now: DateTime<Utc> = "2025-07-30T00:00:00Z".parse().unwrap();
        let age = registry.age_years(NATIVE_TOKEN_ADDRESS, now);
        assert!((age - 10.0).abs() < 0.01);
    }
}
