use crate::models::{BehaviorMetrics, TransactionTiming, UserType};

pub const TRADER_MIN_SWAP_FREQUENCY: f64 = 20.0;
pub const EXPLORER_MIN_NEW_TOKEN_RATIO: f64 = 0.40;
pub const OPTIMIZER_MIN_LIMIT_ORDER_RATIO: f64 = 0.30;
pub const OPTIMIZER_MIN_GAS_OPTIMIZATION_RATIO: f64 = 0.60;
pub const PASSIVE_MAX_SWAP_FREQUENCY: f64 = 5.0;

/// Maps behavior to a user type. Rules are checked in order and the first
/// match wins; overlapping conditions resolve by this priority.
pub fn classify(metrics: &BehaviorMetrics) -> UserType {
    if metrics.swap_frequency > TRADER_MIN_SWAP_FREQUENCY
        && metrics.transaction_timing == TransactionTiming::Peak
    {
        return UserType::Trader;
    }

    if metrics.new_token_interaction_ratio > EXPLORER_MIN_NEW_TOKEN_RATIO {
        return UserType::Explorer;
    }

    if metrics.limit_order_usage_ratio > OPTIMIZER_MIN_LIMIT_ORDER_RATIO
        || metrics.gas_optimization_ratio > OPTIMIZER_MIN_GAS_OPTIMIZATION_RATIO
        || metrics.transaction_timing == TransactionTiming::OffPeak
    {
        return UserType::Optimizer;
    }

    if metrics.swap_frequency < PASSIVE_MAX_SWAP_FREQUENCY {
        return UserType::Passive;
    }

    UserType::Trader
}
