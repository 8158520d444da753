use chrono::{Datelike, Timelike, Weekday};

use crate::config::TokenRegistry;
use crate::models::{
    BehaviorMetrics, GasPriceFeed, OrderKind, OrderRecord, TransactionRecord, TransactionTiming,
};
use crate::scoring::analyzers::{activity_months, gas_prices, non_empty, percentile};

/// UTC hours [start, end) counted as peak market activity on weekdays.
pub const PEAK_HOURS_UTC: (u32, u32) = (13, 21);
pub const PEAK_SHARE_THRESHOLD: f64 = 0.6;
pub const OFF_PEAK_SHARE_THRESHOLD: f64 = 0.4;
/// Percentile of the wallet's own gas prices used as "low" without a feed.
pub const LOW_GAS_PERCENTILE: f64 = 0.25;

pub fn is_peak(tx: &TransactionRecord) -> bool {
    let weekday = !matches!(tx.timestamp.weekday(), Weekday::Sat | Weekday::Sun);
    let hour = tx.timestamp.hour();
    weekday && (PEAK_HOURS_UTC.0..PEAK_HOURS_UTC.1).contains(&hour)
}

pub fn transaction_timing(history: &[TransactionRecord]) -> TransactionTiming {
    if history.is_empty() {
        return TransactionTiming::Mixed;
    }

    let peak_share = history.iter().filter(|tx| is_peak(tx)).count() as f64 / history.len() as f64;
    if peak_share >= PEAK_SHARE_THRESHOLD {
        TransactionTiming::Peak
    } else if peak_share <= OFF_PEAK_SHARE_THRESHOLD {
        TransactionTiming::OffPeak
    } else {
        TransactionTiming::Mixed
    }
}

/// Derives behavioral signals from history and order records.
///
/// Missing inputs contribute zero ratios and `Mixed` timing.
pub fn extract_behavior(
    history: Option<&[TransactionRecord]>,
    orders: Option<&[OrderRecord]>,
    feed: Option<&GasPriceFeed>,
    registry: &TokenRegistry,
) -> BehaviorMetrics {
    let history = non_empty(history).unwrap_or(&[]);
    let orders = orders.unwrap_or(&[]);

    let swaps = history.iter().filter(|tx| tx.is_swap()).count();
    let swap_frequency = if history.is_empty() {
        0.0
    } else {
        swaps as f64 / activity_months(history)
    };

    let limit_orders = orders.iter().filter(|o| o.kind == OrderKind::Limit).count();
    let limit_order_usage_ratio = ratio(limit_orders, limit_orders + swaps);

    let token_txs: Vec<_> = history.iter().filter(|tx| !tx.tokens.is_empty()).collect();
    let new_token_txs = token_txs
        .iter()
        .filter(|tx| tx.tokens.iter().any(|t| !registry.is_known(t)))
        .count();
    let new_token_interaction_ratio = ratio(new_token_txs, token_txs.len());

    let prices = gas_prices(history);
    let low_reference = feed
        .map(|f| f.low)
        .filter(|low| low.is_finite() && *low > 0.0)
        .or_else(|| percentile(&prices, LOW_GAS_PERCENTILE));
    let gas_optimization_ratio = match low_reference {
        Some(low) => ratio(prices.iter().filter(|p| **p <= low).count(), prices.len()),
        None => 0.0,
    };

    BehaviorMetrics {
        swap_frequency,
        limit_order_usage_ratio,
        transaction_timing: transaction_timing(history),
        new_token_interaction_ratio,
        gas_optimization_ratio,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chain, OrderStatus, TransactionKind};
    use chrono::{DateTime, Duration, Utc};

    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const UNKNOWN: &str = "0x00000000000000000000000000000000000000aa";

    // A Wednesday.
    fn base() -> DateTime<Utc> {
        "2024-05-01T00:00:00Z".parse().unwrap()
    }

    fn tx_at(at: DateTime<Utc>, kind: TransactionKind, tokens: &[&str], gas: Option<f64>) -> TransactionRecord {
        TransactionRecord {
            tx_hash: at.timestamp().to_string(),
            timestamp: at,
            from: String::new(),
            to: String::new(),
            value: "0".to_string(),
            gas_used: None,
            gas_price_gwei: gas,
            kind,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn limit_order() -> OrderRecord {
        OrderRecord {
            order_hash: "0x02".to_string(),
            kind: OrderKind::Limit,
            maker_asset: USDC.to_string(),
            taker_asset: UNKNOWN.to_string(),
            making_amount: "1".to_string(),
            taking_amount: "1".to_string(),
            status: OrderStatus::Active,
            created_at: None,
        }
    }

    fn registry() -> TokenRegistry {
        TokenRegistry::for_chain(Chain::Ethereum)
    }

    #[test]
    fn test_peak_detection() {
        let wednesday_afternoon = base() + Duration::hours(15);
        let wednesday_night = base() + Duration::hours(2);
        let saturday_afternoon = base() + Duration::days(3) + Duration::hours(15);

        assert!(is_peak(&tx_at(wednesday_afternoon, TransactionKind::Swap, &[], None)));
        assert!(!is_peak(&tx_at(wednesday_night, TransactionKind::Swap, &[], None)));
        assert!(!is_peak(&tx_at(saturday_afternoon, TransactionKind::Swap, &[], None)));
    }

    #[test]
    fn test_missing_inputs_give_neutral_behavior() {
        let behavior = extract_behavior(None, None, None, &registry());
        assert_eq!(behavior, BehaviorMetrics::default());

        let empty = extract_behavior(Some(&[]), Some(&[]), None, &registry());
        assert_eq!(empty, behavior);
    }

    #[test]
    fn test_extract_behavior() {
        let history = vec![
            tx_at(base() + Duration::hours(14), TransactionKind::Swap, &[USDC, UNKNOWN], Some(10.0)),
            tx_at(base() + Duration::hours(15), TransactionKind::Swap, &[USDC], Some(30.0)),
            tx_at(base() + Duration::hours(16), TransactionKind::Swap, &[USDC], Some(50.0)),
            tx_at(base() + Duration::hours(3), TransactionKind::Transfer, &[], Some(70.0)),
        ];
        let orders = vec![limit_order()];
        let feed = GasPriceFeed {
            base_fee_gwei: None,
            low: 30.0,
            medium: 40.0,
            high: 60.0,
            instant: 80.0,
        };

        let behavior = extract_behavior(Some(&history), Some(&orders), Some(&feed), &registry());

        assert!((behavior.swap_frequency - 3.0).abs() < 1e-9);
        assert!((behavior.limit_order_usage_ratio - 0.25).abs() < 1e-9);
        assert_eq!(behavior.transaction_timing, TransactionTiming::Peak);
        assert!((behavior.new_token_interaction_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert!((behavior.gas_optimization_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_off_peak_timing() {
        let history: Vec<_> = (0..5)
            .map(|i| tx_at(base() + Duration::hours(i), TransactionKind::Swap, &[], None))
            .collect();
        assert_eq!(transaction_timing(&history), TransactionTiming::OffPeak);
    }

    #[test]
    fn test_gas_optimization_without_feed() {
        let history: Vec<_> = [5.0, 10.0, 20.0, 40.0]
            .iter()
            .map(|g| tx_at(base(), TransactionKind::Swap, &[], Some(*g)))
            .collect();

        let behavior = extract_behavior(Some(&history), None, None, &registry());
        assert!((behavior.gas_optimization_ratio - 0.25).abs() < 1e-9);
    }
}
