use crate::models::{clamp_metric, MetricSet, Result, ScoreError};
use crate::scoring::WeightTable;

/// Weighted sum of the table's metrics, clamped to [0,100].
///
/// Every metric the table names must be present; analyzers always produce a
/// value, so a missing one is a pipeline bug.
pub fn aggregate(metrics: &MetricSet, weights: &WeightTable) -> Result<f64> {
    let mut score = 0.0;

    for (kind, weight) in weights.entries() {
        let value = metrics.value(*kind).ok_or_else(|| {
            ScoreError::MissingMetric(format!("{} (table {})", kind.key(), weights.name()))
        })?;
        score += value * weight;
    }

    Ok(clamp_metric(score))
}
