//! Weight normalization and redistribution, shared by both models.

use super::{SourceAggregate, TargetRecord};

/// Aggregate weights per source zone, then broadcast `scale * weight` back
/// onto the records.
///
/// A source zone whose weights sum to zero gets weight 1 on every child
/// target zone and a sum equal to the child count, so its quantity spreads
/// uniformly instead of being lost. Source zones with no child targets are
/// left with a zero scale; no record references them.
pub(crate) fn redistribute(
    records: &mut [TargetRecord],
    populations: &[f64],
    n_sources: usize,
) -> Vec<SourceAggregate> {
    let mut counts = vec![0u32; n_sources];
    let mut sums = vec![0.0f64; n_sources];
    for record in records.iter() {
        counts[record.source as usize] += 1;
        sums[record.source as usize] += record.weight;
    }

    let aggregates: Vec<SourceAggregate> = (0..n_sources)
        .map(|s| {
            let uniform_fallback = counts[s] > 0 && sums[s] == 0.0;
            let sum_weight = if uniform_fallback { counts[s] as f64 } else { sums[s] };
            let scale = if counts[s] > 0 { populations[s] / sum_weight } else { 0.0 };
            SourceAggregate { sum_weight, scale, uniform_fallback }
        })
        .collect();

    for record in records.iter_mut() {
        let aggregate = &aggregates[record.source as usize];
        if aggregate.uniform_fallback {
            record.weight = 1.0;
        }
        record.value = aggregate.scale * record.weight;
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(target: u32, source: u32, weight: f64) -> TargetRecord {
        TargetRecord { target, source, ratio: 0.0, weight, value: 0.0 }
    }

    #[test]
    fn values_scale_to_the_source_total() {
        let mut records = vec![record(0, 0, 0.75), record(1, 0, 0.25)];
        let aggregates = redistribute(&mut records, &[100.0], 1);

        assert_eq!(aggregates[0].sum_weight, 1.0);
        assert_eq!(aggregates[0].scale, 100.0);
        assert_eq!(records[0].value, 75.0);
        assert_eq!(records[1].value, 25.0);
    }

    #[test]
    fn zero_weight_group_distributes_uniformly() {
        let mut records = vec![record(0, 0, 0.0), record(1, 0, 0.0), record(2, 0, 0.0)];
        let aggregates = redistribute(&mut records, &[30.0], 1);

        assert!(aggregates[0].uniform_fallback);
        assert_eq!(aggregates[0].sum_weight, 3.0);
        for record in &records {
            assert_eq!(record.weight, 1.0);
            assert_eq!(record.value, 10.0);
        }
    }

    #[test]
    fn source_zone_without_targets_is_left_alone() {
        let mut records = vec![record(0, 1, 2.0)];
        let aggregates = redistribute(&mut records, &[40.0, 40.0], 2);

        assert!(!aggregates[0].uniform_fallback);
        assert_eq!(aggregates[0].sum_weight, 0.0);
        assert_eq!(aggregates[0].scale, 0.0);
        assert_eq!(records[0].value, 40.0);
    }
}
