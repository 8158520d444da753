//! Signal analyzers: one pure function per upstream signal, each producing a
//! [`NormalizedMetric`] in [0,100] where 100 is most favorable.
//!
//! Absent and empty inputs are treated alike and yield the analyzer's
//! documented default, so the pipeline never fails on missing data.

use chrono::{DateTime, Utc};

use crate::config::TokenRegistry;
use crate::models::{
    GasPriceFeed, NormalizedMetric, OrderKind, OrderRecord, OrderStatus, TransactionRecord,
};
use crate::scoring::portfolio::PortfolioView;

pub const WALLET_AGE_DEFAULT: f64 = 20.0;
pub const WALLET_AGE_SATURATION_DAYS: f64 = 730.0;

pub const TX_FREQUENCY_DEFAULT: f64 = 30.0;
pub const TX_FREQUENCY_IDEAL_MIN: f64 = 4.0;
pub const TX_FREQUENCY_IDEAL_MAX: f64 = 30.0;
pub const TX_FREQUENCY_HYPERACTIVE: f64 = 300.0;
pub const TX_FREQUENCY_FLOOR: f64 = 40.0;

pub const SECURE_SWAP_DEFAULT: f64 = 0.0;

pub const TOKEN_TRUST_DEFAULT: f64 = 50.0;
/// Credit given to holdings outside the trusted set.
pub const UNKNOWN_TOKEN_CREDIT: f64 = 0.3;

pub const TOKEN_DIVERSITY_DEFAULT: f64 = 10.0;
/// Number of holdings that closes half the remaining distance to 100.
pub const TOKEN_DIVERSITY_HALF_STEP: f64 = 2.0;

pub const CONCENTRATION_DEFAULT: f64 = 10.0;

pub const TOKEN_AGE_DEFAULT: f64 = 50.0;
pub const TOKEN_AGE_SATURATION_YEARS: f64 = 5.0;

pub const VOLATILITY_DEFAULT: f64 = 50.0;
pub const VOLATILITY_CEILING: f64 = 1.5;

pub const GAS_EFFICIENCY_DEFAULT: f64 = 50.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_MONTH: f64 = 30.0;

pub(crate) fn non_empty<T>(items: Option<&[T]>) -> Option<&[T]> {
    items.filter(|i| !i.is_empty())
}

/// Months covered by the history, never less than one. Order-independent.
pub(crate) fn activity_months(history: &[TransactionRecord]) -> f64 {
    let first = history.iter().map(|tx| tx.timestamp).min();
    let last = history.iter().map(|tx| tx.timestamp).max();

    let span_days = match (first, last) {
        (Some(first), Some(last)) => (last - first).num_seconds() as f64 / SECONDS_PER_DAY,
        _ => 0.0,
    };

    span_days.max(DAYS_PER_MONTH) / DAYS_PER_MONTH
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Nearest-rank percentile, `q` in (0,1].
pub(crate) fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q * sorted.len() as f64).ceil() as usize;
    Some(sorted[rank.clamp(1, sorted.len()) - 1])
}

pub(crate) fn gas_prices(history: &[TransactionRecord]) -> Vec<f64> {
    history.iter().filter_map(TransactionRecord::priced_gas).collect()
}

// ---------------------------------------------------------------------------
// Risk signals
// ---------------------------------------------------------------------------

/// Older first-seen transaction scores higher, saturating after two years.
pub fn wallet_age(history: Option<&[TransactionRecord]>, now: DateTime<Utc>) -> NormalizedMetric {
    let Some(history) = non_empty(history) else {
        return NormalizedMetric::fallback(WALLET_AGE_DEFAULT);
    };
    let Some(first_seen) = history.iter().map(|tx| tx.timestamp).min() else {
        return NormalizedMetric::fallback(WALLET_AGE_DEFAULT);
    };

    let age_days = ((now - first_seen).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
    let maturity = (age_days / WALLET_AGE_SATURATION_DAYS).min(1.0);

    NormalizedMetric::observed(
        WALLET_AGE_DEFAULT + (100.0 - WALLET_AGE_DEFAULT) * maturity,
        WALLET_AGE_DEFAULT,
    )
}

/// Scores a monthly transaction rate: regular moderate activity is best,
/// both dormancy and hyperactivity score lower.
pub fn frequency_score(monthly_rate: f64) -> f64 {
    if monthly_rate < TX_FREQUENCY_IDEAL_MIN {
        TX_FREQUENCY_DEFAULT + (100.0 - TX_FREQUENCY_DEFAULT) * monthly_rate / TX_FREQUENCY_IDEAL_MIN
    } else if monthly_rate <= TX_FREQUENCY_IDEAL_MAX {
        100.0
    } else {
        let excess = (monthly_rate - TX_FREQUENCY_IDEAL_MAX)
            / (TX_FREQUENCY_HYPERACTIVE - TX_FREQUENCY_IDEAL_MAX);
        (100.0 - (100.0 - TX_FREQUENCY_FLOOR) * excess).max(TX_FREQUENCY_FLOOR)
    }
}

pub fn transaction_frequency(history: Option<&[TransactionRecord]>) -> NormalizedMetric {
    let Some(history) = non_empty(history) else {
        return NormalizedMetric::fallback(TX_FREQUENCY_DEFAULT);
    };

    let monthly_rate = history.len() as f64 / activity_months(history);
    NormalizedMetric::observed(frequency_score(monthly_rate), TX_FREQUENCY_DEFAULT)
}

/// Share of swaps routed through fusion (auction) orders rather than plain swaps.
pub fn secure_swap_usage(
    orders: Option<&[OrderRecord]>,
    history: Option<&[TransactionRecord]>,
) -> NormalizedMetric {
    let Some(orders) = orders else {
        return NormalizedMetric::fallback(SECURE_SWAP_DEFAULT);
    };

    let fusion = orders
        .iter()
        .filter(|o| o.kind == OrderKind::Fusion && o.status != OrderStatus::Cancelled)
        .count();
    let plain_swaps = history
        .map(|h| h.iter().filter(|tx| tx.is_swap()).count())
        .unwrap_or(0);

    let total = fusion + plain_swaps;
    if total == 0 {
        return NormalizedMetric::fallback(SECURE_SWAP_DEFAULT);
    }

    NormalizedMetric::observed(100.0 * fusion as f64 / total as f64, SECURE_SWAP_DEFAULT)
}

/// Share of the portfolio held in trusted tokens; unknown or flagged
/// tokens earn partial credit.
pub fn token_trustworthiness(
    portfolio: Option<&PortfolioView>,
    registry: &TokenRegistry,
) -> NormalizedMetric {
    let Some(portfolio) = portfolio.filter(|p| !p.is_empty()) else {
        return NormalizedMetric::fallback(TOKEN_TRUST_DEFAULT);
    };

    let trust = portfolio.weighted(|h| {
        if registry.is_trusted(&h.address) {
            1.0
        } else {
            UNKNOWN_TOKEN_CREDIT
        }
    });

    NormalizedMetric::observed(100.0 * trust, TOKEN_TRUST_DEFAULT)
}

// ---------------------------------------------------------------------------
// Health signals
// ---------------------------------------------------------------------------

/// More distinct holdings score higher, with diminishing returns.
pub fn token_diversity(portfolio: Option<&PortfolioView>) -> NormalizedMetric {
    let Some(portfolio) = portfolio.filter(|p| !p.is_empty()) else {
        return NormalizedMetric::fallback(TOKEN_DIVERSITY_DEFAULT);
    };

    let n = portfolio.len() as f64;
    let score = 100.0 * (1.0 - 0.5f64.powf(n / TOKEN_DIVERSITY_HALF_STEP));
    NormalizedMetric::observed(score, TOKEN_DIVERSITY_DEFAULT)
}

/// Inverse Herfindahl concentration: a single holding scores 0.
pub fn portfolio_concentration(portfolio: Option<&PortfolioView>) -> NormalizedMetric {
    let Some(portfolio) = portfolio.filter(|p| !p.is_empty()) else {
        return NormalizedMetric::fallback(CONCENTRATION_DEFAULT);
    };

    NormalizedMetric::observed(100.0 * (1.0 - portfolio.herfindahl()), CONCENTRATION_DEFAULT)
}

pub fn token_age_average(
    portfolio: Option<&PortfolioView>,
    registry: &TokenRegistry,
    now: DateTime<Utc>,
) -> NormalizedMetric {
    let Some(portfolio) = portfolio.filter(|p| !p.is_empty()) else {
        return NormalizedMetric::fallback(TOKEN_AGE_DEFAULT);
    };

    let avg_years = portfolio.weighted(|h| registry.age_years(&h.address, now));
    let score = 100.0 * (avg_years / TOKEN_AGE_SATURATION_YEARS).min(1.0);
    NormalizedMetric::observed(score, TOKEN_AGE_DEFAULT)
}

pub fn volatility_exposure(
    portfolio: Option<&PortfolioView>,
    registry: &TokenRegistry,
) -> NormalizedMetric {
    let Some(portfolio) = portfolio.filter(|p| !p.is_empty()) else {
        return NormalizedMetric::fallback(VOLATILITY_DEFAULT);
    };

    let weighted_vol = portfolio.weighted(|h| registry.volatility(&h.address));
    let score = 100.0 * (1.0 - weighted_vol / VOLATILITY_CEILING);
    NormalizedMetric::observed(score, VOLATILITY_DEFAULT)
}

/// Share of priced transactions sent at or below the reference gas price:
/// the feed's medium tier, or the wallet's own median without a feed.
pub fn gas_efficiency(
    history: Option<&[TransactionRecord]>,
    feed: Option<&GasPriceFeed>,
) -> NormalizedMetric {
    let Some(history) = non_empty(history) else {
        return NormalizedMetric::fallback(GAS_EFFICIENCY_DEFAULT);
    };

    let prices = gas_prices(history);
    let reference = feed
        .map(|f| f.medium)
        .filter(|m| m.is_finite() && *m > 0.0)
        .or_else(|| median(&prices));

    let Some(reference) = reference.filter(|_| !prices.is_empty()) else {
        return NormalizedMetric::fallback(GAS_EFFICIENCY_DEFAULT);
    };

    let efficient = prices.iter().filter(|p| **p <= reference).count();
    NormalizedMetric::observed(
        100.0 * efficient as f64 / prices.len() as f64,
        GAS_EFFICIENCY_DEFAULT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NATIVE_TOKEN_ADDRESS;
    use crate::models::{Chain, MetricBasis, TransactionKind};
    use chrono::Duration;
    use std::collections::BTreeMap;

    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const UNKNOWN: &str = "0x00000000000000000000000000000000000000aa";

    fn now() -> DateTime<Utc> {
        "2024-06-01T00:00:00Z".parse().unwrap()
    }

    fn tx(days_ago: i64, kind: TransactionKind, gas: Option<f64>) -> TransactionRecord {
        TransactionRecord {
            tx_hash: format!("0x{:x}", days_ago),
            timestamp: now() - Duration::days(days_ago),
            from: String::new(),
            to: String::new(),
            value: "0".to_string(),
            gas_used: Some(21_000),
            gas_price_gwei: gas,
            kind,
            tokens: Vec::new(),
        }
    }

    fn order(kind: OrderKind, status: OrderStatus) -> OrderRecord {
        OrderRecord {
            order_hash: "0x01".to_string(),
            kind,
            maker_asset: USDC.to_string(),
            taker_asset: NATIVE_TOKEN_ADDRESS.to_string(),
            making_amount: "1".to_string(),
            taking_amount: "1".to_string(),
            status,
            created_at: None,
        }
    }

    fn view(balances: &[(&str, &str)]) -> PortfolioView {
        let balances: BTreeMap<String, String> = balances
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        PortfolioView::from_balances(&balances, None, &TokenRegistry::for_chain(Chain::Ethereum))
    }

    #[test]
    fn test_wallet_age_is_monotonic_and_saturates() {
        let young = wallet_age(Some(&[tx(10, TransactionKind::Transfer, None)]), now());
        let old = wallet_age(Some(&[tx(400, TransactionKind::Transfer, None)]), now());
        let ancient = wallet_age(Some(&[tx(3000, TransactionKind::Transfer, None)]), now());

        assert!(young.value() < old.value());
        assert_eq!(ancient.value(), 100.0);
        assert_eq!(wallet_age(Some(&[tx(730, TransactionKind::Other, None)]), now()).value(), 100.0);
    }

    #[test]
    fn test_wallet_age_ignores_order() {
        let a = [tx(5, TransactionKind::Swap, None), tx(365, TransactionKind::Swap, None)];
        let b = [tx(365, TransactionKind::Swap, None), tx(5, TransactionKind::Swap, None)];
        assert_eq!(wallet_age(Some(&a), now()), wallet_age(Some(&b), now()));
        assert!((wallet_age(Some(&a), now()).value() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_wallet_age_future_timestamp_treated_as_new() {
        let metric = wallet_age(Some(&[tx(-10, TransactionKind::Other, None)]), now());
        assert_eq!(metric.value(), WALLET_AGE_DEFAULT);
        assert!(metric.is_observed());
    }

    #[test]
    fn test_empty_history_matches_missing_history() {
        let empty: &[TransactionRecord] = &[];
        assert_eq!(wallet_age(Some(empty), now()), wallet_age(None, now()));
        assert_eq!(transaction_frequency(Some(empty)), transaction_frequency(None));
        assert_eq!(gas_efficiency(Some(empty), None), gas_efficiency(None, None));
        assert_eq!(transaction_frequency(None).basis(), MetricBasis::Default);
    }

    #[test]
    fn test_frequency_is_bell_shaped() {
        assert_eq!(frequency_score(0.0), TX_FREQUENCY_DEFAULT);
        assert!((frequency_score(2.0) - 65.0).abs() < 1e-9);
        assert_eq!(frequency_score(4.0), 100.0);
        assert_eq!(frequency_score(30.0), 100.0);
        assert!((frequency_score(165.0) - 70.0).abs() < 1e-9);
        assert_eq!(frequency_score(10_000.0), TX_FREQUENCY_FLOOR);
    }

    #[test]
    fn test_transaction_frequency_uses_span() {
        // 10 transactions over ~90 days is ~3.3 per month.
        let history: Vec<_> = (0..10).map(|i| tx(i * 10, TransactionKind::Transfer, None)).collect();
        let metric = transaction_frequency(Some(&history));
        assert!(metric.value() > 80.0 && metric.value() < 100.0);

        // A burst inside one day is measured against a full month.
        let burst: Vec<_> = (0..10).map(|_| tx(1, TransactionKind::Swap, None)).collect();
        assert_eq!(transaction_frequency(Some(&burst)).value(), 100.0);
    }

    #[test]
    fn test_secure_swap_usage() {
        assert_eq!(secure_swap_usage(None, None).value(), 0.0);
        assert_eq!(secure_swap_usage(Some(&[]), None).basis(), MetricBasis::Default);

        let orders = [
            order(OrderKind::Fusion, OrderStatus::Filled),
            order(OrderKind::Fusion, OrderStatus::Cancelled),
            order(OrderKind::Limit, OrderStatus::Filled),
        ];
        let history = [
            tx(1, TransactionKind::Swap, None),
            tx(2, TransactionKind::Transfer, None),
        ];
        let metric = secure_swap_usage(Some(&orders), Some(&history));
        assert!((metric.value() - 50.0).abs() < 1e-9);
        assert!(metric.is_observed());
    }

    #[test]
    fn test_token_trust_penalizes_unknown_without_zeroing() {
        let registry = TokenRegistry::for_chain(Chain::Ethereum);

        let trusted = view(&[(USDC, "1000000")]);
        assert_eq!(token_trustworthiness(Some(&trusted), &registry).value(), 100.0);

        let unknown = view(&[(UNKNOWN, "1000")]);
        assert!((token_trustworthiness(Some(&unknown), &registry).value() - 30.0).abs() < 1e-9);

        assert_eq!(token_trustworthiness(None, &registry).value(), TOKEN_TRUST_DEFAULT);
    }

    #[test]
    fn test_token_trust_follows_trusted_flag() {
        static TOKENS: &[crate::config::TokenInfo] = &[
            crate::config::TokenInfo {
                address: USDC,
                symbol: "USDC",
                decimals: 6,
                category: crate::config::TokenCategory::Stablecoin,
                launched: (2018, 9, 26),
                volatility: 0.02,
                trusted: true,
            }
            .untrusted(),
        ];
        let registry = TokenRegistry::with_tokens(Chain::Ethereum, TOKENS);
        let portfolio = PortfolioView::from_balances(
            &[(USDC.to_string(), "1000000".to_string())].into_iter().collect(),
            None,
            &registry,
        );

        let metric = token_trustworthiness(Some(&portfolio), &registry);
        assert!((metric.value() - 100.0 * UNKNOWN_TOKEN_CREDIT).abs() < 1e-9);
    }

    #[test]
    fn test_token_diversity_diminishing_returns() {
        let one = token_diversity(Some(&view(&[(USDC, "1")]))).value();
        let two = token_diversity(Some(&view(&[(USDC, "1"), (UNKNOWN, "1")]))).value();
        assert!((two - 50.0).abs() < 1e-9);
        assert!(one < two);
        assert_eq!(token_diversity(Some(&PortfolioView::default())).value(), TOKEN_DIVERSITY_DEFAULT);
        assert_eq!(token_diversity(None).value(), TOKEN_DIVERSITY_DEFAULT);
        assert_eq!(token_diversity(None).basis(), MetricBasis::Default);
    }

    #[test]
    fn test_concentration() {
        let single = portfolio_concentration(Some(&view(&[(USDC, "1")])));
        assert_eq!(single.value(), 0.0);

        let pair = portfolio_concentration(Some(&view(&[(USDC, "1"), (UNKNOWN, "1")])));
        assert!((pair.value() - 50.0).abs() < 1e-9);

        assert_eq!(portfolio_concentration(None).value(), CONCENTRATION_DEFAULT);
    }

    #[test]
    fn test_token_age_and_volatility() {
        let registry = TokenRegistry::for_chain(Chain::Ethereum);

        let stable = view(&[(USDC, "1000000")]);
        assert_eq!(token_age_average(Some(&stable), &registry, now()).value(), 100.0);
        assert!(volatility_exposure(Some(&stable), &registry).value() > 95.0);

        let unknown = view(&[(UNKNOWN, "1000")]);
        assert!((token_age_average(Some(&unknown), &registry, now()).value() - 10.0).abs() < 1e-9);
        assert_eq!(volatility_exposure(Some(&unknown), &registry).value(), 0.0);

        assert_eq!(volatility_exposure(None, &registry).value(), VOLATILITY_DEFAULT);
        assert_eq!(token_age_average(None, &registry, now()).value(), TOKEN_AGE_DEFAULT);
        assert_eq!(token_age_average(None, &registry, now()).basis(), MetricBasis::Default);
    }

    #[test]
    fn test_gas_efficiency_against_feed() {
        let feed = GasPriceFeed {
            base_fee_gwei: Some(10.0),
            low: 12.0,
            medium: 20.0,
            high: 30.0,
            instant: 40.0,
        };
        let history = [
            tx(1, TransactionKind::Swap, Some(15.0)),
            tx(2, TransactionKind::Swap, Some(20.0)),
            tx(3, TransactionKind::Swap, Some(25.0)),
            tx(4, TransactionKind::Swap, Some(35.0)),
            tx(5, TransactionKind::Transfer, None),
        ];

        assert!((gas_efficiency(Some(&history), Some(&feed)).value() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_gas_efficiency_without_feed_uses_own_median() {
        let history = [
            tx(1, TransactionKind::Swap, Some(10.0)),
            tx(2, TransactionKind::Swap, Some(20.0)),
            tx(3, TransactionKind::Swap, Some(30.0)),
        ];
        let metric = gas_efficiency(Some(&history), None);
        assert!((metric.value() - 200.0 / 3.0).abs() < 1e-9);

        let unpriced = [tx(1, TransactionKind::Swap, None)];
        assert_eq!(gas_efficiency(Some(&unpriced), None).basis(), MetricBasis::Default);
    }

    #[test]
    fn test_stats_helpers() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        assert_eq!(percentile(&[5.0, 1.0, 3.0, 2.0], 0.25), Some(1.0));
        assert_eq!(percentile(&[5.0, 1.0, 3.0, 2.0], 1.0), Some(5.0));
    }
}
