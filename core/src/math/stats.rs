pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Largest absolute value, 0.0 for an empty slice.
    pub fn max_abs(samples: &[f64]) -> f64 {
        samples.iter().fold(0.0, |acc: f64, &v| acc.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::mean(&[1.0, 3.0]), 2.0);
    }

    #[test]
    fn max_abs_picks_negative_extreme() {
        assert_eq!(StatsHelper::max_abs(&[0.5, -2.0, 1.5]), 2.0);
        assert_eq!(StatsHelper::max_abs(&[]), 0.0);
    }
}
