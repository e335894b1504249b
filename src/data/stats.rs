//! Column summaries logged after normalisation.

use std::fmt;

/// Count / mean / spread / quartiles of the non-missing values of a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1). `NaN` for fewer than two values.
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise a column; `None` entries are counted as missing.
    pub fn describe<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut present = Vec::new();
        let mut missing = 0;
        for v in values {
            match v {
                Some(x) if !x.is_nan() => present.push(x),
                _ => missing += 1,
            }
        }

        if present.is_empty() {
            return Self {
                missing,
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                q1: f64::NAN,
                median: f64::NAN,
                q3: f64::NAN,
                max: f64::NAN,
                ..Self::default()
            };
        }

        present.sort_by(f64::total_cmp);
        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let std_dev = if present.len() > 1 {
            let m2: f64 = present.iter().map(|v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        Self {
            count: present.len(),
            missing,
            mean,
            std_dev,
            min: present[0],
            q1: quantile(&present, 0.25),
            median: quantile(&present, 0.5),
            q3: quantile(&present, 0.75),
            max: present[present.len() - 1],
        }
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} missing={} mean={:.4} std={:.4} min={:.4} 25%={:.4} 50%={:.4} 75%={:.4} max={:.4}",
            self.count,
            self.missing,
            self.mean,
            self.std_dev,
            self.min,
            self.q1,
            self.median,
            self.q3,
            self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_quartiles() {
        let s = ColumnSummary::describe([Some(4.0), Some(1.0), None, Some(3.0), Some(2.0)]);
        assert_eq!(s.count, 4);
        assert_eq!(s.missing, 1);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!((s.q1 - 1.75).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.q3 - 3.25).abs() < 1e-12);
        // sample std of 1..=4
        assert!((s.std_dev - 1.290_994_448_735_805_6).abs() < 1e-12);
    }

    #[test]
    fn test_describe_all_missing() {
        let s = ColumnSummary::describe([None, Some(f64::NAN)]);
        assert_eq!(s.count, 0);
        assert_eq!(s.missing, 2);
        assert!(s.mean.is_nan());
    }
}
