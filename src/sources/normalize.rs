//! Converts loosely-shaped upstream responses into a [`PortfolioSnapshot`].
//!
//! Both 1inch API shapes and the crate's own serialized types are accepted.
//! A field with the wrong overall shape becomes absent; individual malformed
//! entries are dropped.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::models::{
    GasPriceFeed, OrderKind, OrderRecord, OrderStatus, PortfolioSnapshot, TransactionKind,
    TransactionRecord,
};
use crate::sources::RawPortfolioData;

const WEI_PER_GWEI: f64 = 1e9;

pub fn normalize(raw: &RawPortfolioData) -> PortfolioSnapshot {
    let fusion = raw
        .fusion_orders
        .as_ref()
        .and_then(|v| normalize_orders(v, OrderKind::Fusion));
    let limit = raw
        .limit_orders
        .as_ref()
        .and_then(|v| normalize_orders(v, OrderKind::Limit));

    let order_records = match (fusion, limit) {
        (None, None) => None,
        (fusion, limit) => Some(
            fusion
                .unwrap_or_default()
                .into_iter()
                .chain(limit.unwrap_or_default())
                .collect(),
        ),
    };

    PortfolioSnapshot {
        balances: raw.balances.as_ref().and_then(normalize_balances),
        history: raw.history.as_ref().and_then(normalize_history),
        gas_price_feed: raw.gas_price.as_ref().and_then(normalize_gas_price),
        order_records,
        prices: raw.prices.as_ref().and_then(normalize_prices),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn wei_to_gwei(value: &Value) -> Option<f64> {
    number(value).map(|wei| wei / WEI_PER_GWEI)
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<i64>().ok().and_then(epoch)),
        Value::Number(n) => n.as_i64().and_then(epoch),
        _ => None,
    }
}

/// Epoch seconds or milliseconds, told apart by magnitude.
fn epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.abs() >= 100_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

/// Array items, either bare or wrapped under `items`/`orders`.
fn items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map
            .get("items")
            .or_else(|| map.get("orders"))
            .and_then(Value::as_array),
        _ => None,
    }
}

fn typed<T: DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

fn normalize_balances(value: &Value) -> Option<BTreeMap<String, String>> {
    let Some(map) = value.as_object() else {
        warn!("Ignoring balances response: expected an object");
        return None;
    };

    let mut balances: BTreeMap<String, String> = BTreeMap::new();
    let mut malformed = 0;
    for (address, raw) in map {
        let Some(balance) = text(raw) else {
            malformed += 1;
            continue;
        };
        // Checksummed and lowercase spellings of one address are one holding.
        match balances.entry(address.to_lowercase()) {
            Entry::Vacant(slot) => {
                slot.insert(balance);
            }
            Entry::Occupied(mut slot) => {
                let merged = slot
                    .get()
                    .parse::<u128>()
                    .ok()
                    .zip(balance.parse::<u128>().ok())
                    .and_then(|(a, b)| a.checked_add(b));
                match merged {
                    Some(total) => {
                        debug!("Merged duplicate balance entries for {}", slot.key());
                        slot.insert(total.to_string());
                    }
                    None => warn!(
                        "Keeping first of conflicting balances for {}: {} vs {}",
                        slot.key(),
                        slot.get(),
                        balance
                    ),
                }
            }
        }
    }

    if malformed > 0 {
        debug!("Dropped {} malformed balance entries", malformed);
    }
    Some(balances)
}

fn normalize_history(value: &Value) -> Option<Vec<TransactionRecord>> {
    let Some(entries) = items(value) else {
        warn!("Ignoring history response: expected an array of items");
        return None;
    };

    let history: Vec<TransactionRecord> = entries
        .iter()
        .filter_map(|entry| typed(entry).or_else(|| history_entry(entry)))
        .collect();

    if history.len() < entries.len() {
        debug!("Dropped {} malformed history entries", entries.len() - history.len());
    }
    Some(history)
}

fn history_entry(entry: &Value) -> Option<TransactionRecord> {
    let details = entry.get("details").unwrap_or(entry);
    let field = |name: &str| details.get(name).or_else(|| entry.get(name));

    let timestamp = field("timeMs")
        .or_else(|| field("timestamp"))
        .or_else(|| field("timeStamp"))
        .and_then(timestamp)?;

    let gas_used = field("gasUsed").and_then(number).map(|g| g as u64);
    let gas_price_gwei = field("gasPrice").and_then(wei_to_gwei).or_else(|| {
        let fee = field("feeInSmallestNative").and_then(number)?;
        let used = gas_used.filter(|g| *g > 0)?;
        Some(fee / used as f64 / WEI_PER_GWEI)
    });

    let mut tokens: Vec<String> = details
        .get("tokenActions")
        .and_then(Value::as_array)
        .map(|actions| {
            actions
                .iter()
                .filter_map(|a| a.get("address").and_then(text))
                .map(|a| a.to_lowercase())
                .collect()
        })
        .unwrap_or_default();
    tokens.sort();
    tokens.dedup();

    Some(TransactionRecord {
        tx_hash: field("txHash").and_then(text).unwrap_or_default(),
        timestamp,
        from: field("fromAddress").or_else(|| field("from")).and_then(text).unwrap_or_default(),
        to: field("toAddress").or_else(|| field("to")).and_then(text).unwrap_or_default(),
        value: field("value").and_then(text).unwrap_or_else(|| "0".to_string()),
        gas_used,
        gas_price_gwei,
        kind: field("type")
            .and_then(Value::as_str)
            .map(TransactionKind::from_label)
            .unwrap_or_default(),
        tokens,
    })
}

fn normalize_gas_price(value: &Value) -> Option<GasPriceFeed> {
    // Serialized feeds always carry `baseFeeGwei` (possibly null) and are
    // already in gwei. Anything else is an upstream response in wei.
    if value.get("baseFeeGwei").is_some() {
        if let Some(feed) = typed::<GasPriceFeed>(value) {
            return Some(feed);
        }
    }

    let Some(map) = value.as_object() else {
        warn!("Ignoring gas price response: expected an object");
        return None;
    };

    // EIP-1559 chains report tiers as objects carrying maxFeePerGas.
    let tier = |name: &str| -> Option<f64> {
        let tier = map.get(name)?;
        match tier {
            Value::Object(t) => t.get("maxFeePerGas").and_then(wei_to_gwei),
            other => wei_to_gwei(other),
        }
    };

    let feed = match (tier("low"), tier("medium"), tier("high"), tier("instant")) {
        (Some(low), Some(medium), Some(high), Some(instant)) => GasPriceFeed {
            base_fee_gwei: map.get("baseFee").and_then(wei_to_gwei),
            low,
            medium,
            high,
            instant,
        },
        _ => match (tier("slow"), tier("standard"), tier("fast"), tier("instant")) {
            (Some(low), Some(medium), Some(high), Some(instant)) => GasPriceFeed {
                base_fee_gwei: None,
                low,
                medium,
                high,
                instant,
            },
            _ => {
                warn!("Ignoring gas price response: no recognizable price tiers");
                return None;
            }
        },
    };

    Some(feed)
}

fn normalize_orders(value: &Value, kind: OrderKind) -> Option<Vec<OrderRecord>> {
    let Some(entries) = items(value) else {
        warn!("Ignoring {:?} orders response: expected an array", kind);
        return None;
    };

    let orders: Vec<OrderRecord> = entries
        .iter()
        .filter_map(|entry| typed(entry).or_else(|| order_entry(entry, kind)))
        .collect();

    if orders.len() < entries.len() {
        debug!("Dropped {} malformed {:?} orders", entries.len() - orders.len(), kind);
    }
    Some(orders)
}

fn order_entry(entry: &Value, kind: OrderKind) -> Option<OrderRecord> {
    let inner = entry
        .get("order")
        .or_else(|| entry.get("data"))
        .unwrap_or(entry);
    let field = |name: &str| inner.get(name).or_else(|| entry.get(name));

    let maker_asset = field("makerAsset").and_then(text)?.to_lowercase();
    let taker_asset = field("takerAsset").and_then(text)?.to_lowercase();

    let status = match entry.get("status").and_then(Value::as_str) {
        Some(label) => OrderStatus::from_label(label),
        None if entry.get("orderInvalidReason").is_some_and(|r| !r.is_null()) => {
            OrderStatus::Cancelled
        }
        None if entry.get("remainingMakerAmount").and_then(text).as_deref() == Some("0") => {
            OrderStatus::Filled
        }
        None => OrderStatus::Active,
    };

    Some(OrderRecord {
        order_hash: entry.get("orderHash").and_then(text).unwrap_or_default(),
        kind,
        maker_asset,
        taker_asset,
        making_amount: field("makingAmount").and_then(text).unwrap_or_default(),
        taking_amount: field("takingAmount").and_then(text).unwrap_or_default(),
        status,
        created_at: entry
            .get("createDateTime")
            .or_else(|| entry.get("createdAt"))
            .and_then(timestamp),
    })
}

fn normalize_prices(value: &Value) -> Option<BTreeMap<String, f64>> {
    let Some(map) = value.as_object() else {
        warn!("Ignoring prices response: expected an object");
        return None;
    };

    Some(
        map.iter()
            .filter_map(|(address, price)| number(price).map(|p| (address.to_lowercase(), p)))
            .filter(|(_, p)| *p >= 0.0)
            .collect(),
    )
}
