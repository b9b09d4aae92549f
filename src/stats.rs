//! Descriptive statistics over one direction's PCM samples.

use statrs::statistics::Statistics;

/// Summary of a single direction's capacity samples. All fields other than
/// `count` are `None` when there were no samples; the CSV layer renders
/// `None` as the `-` sentinel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectionStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
}

impl DirectionStats {
    pub fn no_data() -> Self {
        Self::default()
    }
}

/// Reduce a sample sequence to count, mean, min, max, sample standard
/// deviation and quartiles (linear-interpolation percentiles).
pub fn describe(values: &[f64]) -> DirectionStats {
    if values.is_empty() {
        return DirectionStats::no_data();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let count = sorted.len();

    // Sample standard deviation needs at least two points.
    let std = if count > 1 {
        Some(values.std_dev())
    } else {
        None
    };

    DirectionStats {
        count,
        mean: Some(values.mean()),
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        std,
        p25: Some(percentile(&sorted, 25.0)),
        p50: Some(percentile(&sorted, 50.0)),
        p75: Some(percentile(&sorted, 75.0)),
    }
}

/// Linear-interpolation percentile over an ascending-sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_yields_count_zero_and_sentinels() {
        let stats = describe(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
        assert!(stats.std.is_none());
        assert!(stats.p25.is_none());
        assert!(stats.p50.is_none());
        assert!(stats.p75.is_none());
    }

    #[test]
    fn known_sequence_summary_statistics() {
        let stats = describe(&[10.0, 20.0, 30.0]);
        assert_eq!(stats.count, 3);
        assert!(close(stats.mean.unwrap(), 20.0));
        assert!(close(stats.min.unwrap(), 10.0));
        assert!(close(stats.max.unwrap(), 30.0));
        // sample std of [10, 20, 30] is exactly 10
        assert!(close(stats.std.unwrap(), 10.0));
        assert!(close(stats.p25.unwrap(), 15.0));
        assert!(close(stats.p50.unwrap(), 20.0));
        assert!(close(stats.p75.unwrap(), 25.0));
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        // rank 25% of [1, 2, 3, 4] falls a quarter of the way between 1 and 2
        let stats = describe(&[1.0, 2.0, 3.0, 4.0]);
        assert!(close(stats.p25.unwrap(), 1.75));
        assert!(close(stats.p50.unwrap(), 2.5));
        assert!(close(stats.p75.unwrap(), 3.25));
    }

    #[test]
    fn single_sample_has_no_std() {
        let stats = describe(&[42.0]);
        assert_eq!(stats.count, 1);
        assert!(close(stats.mean.unwrap(), 42.0));
        assert!(close(stats.min.unwrap(), 42.0));
        assert!(close(stats.max.unwrap(), 42.0));
        assert!(stats.std.is_none());
        assert!(close(stats.p50.unwrap(), 42.0));
    }

    #[test]
    fn unsorted_input_is_handled() {
        let stats = describe(&[30.0, 10.0, 20.0]);
        assert!(close(stats.min.unwrap(), 10.0));
        assert!(close(stats.max.unwrap(), 30.0));
        assert!(close(stats.p50.unwrap(), 20.0));
    }
}
