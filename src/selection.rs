use crate::types::MetricSample;

/// Returns the `n` highest-valued samples, descending. The sort is stable,
/// so ties keep the backend's original ordering. Samples with no value rank
/// below every measured sample. Pure and total: an empty input yields an
/// empty output.
pub fn select_top(samples: &[MetricSample], n: usize) -> Vec<MetricSample> {
    let mut ranked = samples.to_vec();
    ranked.sort_by(|a, b| rank(b).total_cmp(&rank(a)));
    ranked.truncate(n);
    ranked
}

fn rank(sample: &MetricSample) -> f64 {
    sample.value.unwrap_or(f64::NEG_INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn samples(values: &[Option<f64>]) -> Vec<MetricSample> {
        let start = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSample {
                timestamp: start + Duration::minutes(i as i64),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn test_select_top_orders_descending() {
        let input = samples(&[Some(10.0), Some(95.5), Some(42.0)]);
        let top = select_top(&input, 10);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].value, Some(95.5));
        assert_eq!(top[1].value, Some(42.0));
        assert_eq!(top[2].value, Some(10.0));
    }

    #[test]
    fn test_select_top_truncates_to_n() {
        let input = samples(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]);
        let top = select_top(&input, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].value, Some(5.0));
        assert_eq!(top[1].value, Some(4.0));
    }

    #[test]
    fn test_select_top_empty_input() {
        assert_eq!(select_top(&[], 10), vec![]);
    }

    #[test]
    fn test_select_top_length_is_min_of_n_and_input() {
        let input = samples(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(select_top(&input, 10).len(), 3);
        assert_eq!(select_top(&input, 3).len(), 3);
        assert_eq!(select_top(&input, 0).len(), 0);
    }

    #[test]
    fn test_select_top_missing_values_sort_last() {
        let input = samples(&[None, Some(5.0), None, Some(1.0)]);
        let top = select_top(&input, 10);
        assert_eq!(top[0].value, Some(5.0));
        assert_eq!(top[1].value, Some(1.0));
        assert_eq!(top[2].value, None);
        assert_eq!(top[3].value, None);
    }

    #[test]
    fn test_select_top_ties_keep_original_order() {
        let input = samples(&[Some(50.0), Some(50.0), Some(50.0)]);
        let top = select_top(&input, 10);
        // stable sort: equal values stay in backend order
        assert_eq!(top[0].timestamp, input[0].timestamp);
        assert_eq!(top[1].timestamp, input[1].timestamp);
        assert_eq!(top[2].timestamp, input[2].timestamp);
    }

    #[test]
    fn test_select_top_idempotent_on_own_output() {
        let input = samples(&[Some(10.0), Some(95.5), Some(42.0), None, Some(42.0)]);
        let once = select_top(&input, 10);
        let twice = select_top(&once, 10);
        assert_eq!(once, twice);

        let larger_n = select_top(&once, 20);
        assert_eq!(once, larger_n);
    }

    #[test]
    fn test_select_top_returns_only_input_elements() {
        let input = samples(&[Some(3.0), Some(1.0), Some(2.0)]);
        let top = select_top(&input, 2);
        for item in &top {
            assert!(input.contains(item));
        }
    }
}
