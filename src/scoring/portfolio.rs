use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use crate::config::TokenRegistry;

const MAX_DECIMAL_DIGITS: usize = 28;

/// Converts a base-unit integer string into whole tokens.
///
/// Fractional digits beyond what `Decimal` can hold are truncated; integer
/// parts too large to represent yield `None`.
pub fn parse_base_units(raw: &str, decimals: u32) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = raw.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Decimal::ZERO);
    }

    let decimals = decimals as usize;
    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    if int_part.len() > MAX_DECIMAL_DIGITS {
        return None;
    }
    let keep = frac_part.len().min(MAX_DECIMAL_DIGITS - int_part.len());
    let frac_part = &frac_part[..keep];

    if frac_part.is_empty() {
        Decimal::from_str(&int_part).ok()
    } else {
        Decimal::from_str(&format!("{}.{}", int_part, frac_part)).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub address: String,
    pub amount: Decimal,
    pub value_usd: Option<f64>,
    /// Share of the portfolio in [0,1]; weights across holdings sum to 1.
    pub weight: f64,
}

/// Non-zero holdings of one wallet with their portfolio weights.
///
/// Weights are USD value shares when any holding is priced, otherwise equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioView {
    holdings: Vec<Holding>,
    value_weighted: bool,
}

impl PortfolioView {
    pub fn from_balances(
        balances: &BTreeMap<String, String>,
        prices: Option<&BTreeMap<String, f64>>,
        registry: &TokenRegistry,
    ) -> Self {
        let mut holdings = Vec::new();

        for (address, raw) in balances {
            let address = address.to_lowercase();
            let Some(amount) = parse_base_units(raw, registry.decimals(&address)) else {
                debug!("Skipping unparseable balance {:?} for token {}", raw, address);
                continue;
            };
            if amount.is_zero() {
                continue;
            }

            let value_usd = prices
                .and_then(|p| p.get(&address))
                .filter(|price| price.is_finite() && **price >= 0.0)
                .and_then(|price| amount.to_f64().map(|a| a * price));

            holdings.push(Holding {
                address,
                amount,
                value_usd,
                weight: 0.0,
            });
        }

        let total_value: f64 = holdings.iter().filter_map(|h| h.value_usd).sum();
        let value_weighted = total_value > 0.0;
        let count = holdings.len() as f64;

        for holding in &mut holdings {
            holding.weight = if value_weighted {
                holding.value_usd.unwrap_or(0.0) / total_value
            } else {
                1.0 / count
            };
        }

        Self {
            holdings,
            value_weighted,
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn is_value_weighted(&self) -> bool {
        self.value_weighted
    }

    /// Portfolio-weighted average of `f` over the holdings.
    pub fn weighted<F: Fn(&Holding) -> f64>(&self, f: F) -> f64 {
        self.holdings.iter().map(|h| h.weight * f(h)).sum()
    }

    /// Herfindahl index of holding weights: 1/n for n equal holdings, 1 for a single one.
    pub fn herfindahl(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight * h.weight).sum()
    }
}
