//! Statistics Calculator Module
//! Box quartiles, bar estimates with confidence intervals and least-squares
//! regression fits.

use crate::error::{GraphError, GraphResult};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sided confidence level for error bars and regression bands.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Whiskers reach the furthest value within this many IQRs of the box.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Box-and-whisker summary of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Smallest and largest value drawn for this box, fliers included.
    pub fn extent(&self) -> (f64, f64) {
        let low = self
            .fliers
            .iter()
            .copied()
            .fold(self.whisker_low, f64::min);
        let high = self
            .fliers
            .iter()
            .copied()
            .fold(self.whisker_high, f64::max);
        (low, high)
    }
}

/// Mean of a group with its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub count: usize,
    pub mean: f64,
    /// `None` when the group has fewer than two values.
    pub ci: Option<(f64, f64)>,
}

/// Ordinary least-squares fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub count: usize,
    x_mean: f64,
    sxx: f64,
    residual_std_err: f64,
    t_critical: Option<f64>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Confidence interval of the fitted mean at `x`.
    pub fn confidence_band(&self, x: f64) -> Option<(f64, f64)> {
        let t = self.t_critical?;
        let n = self.count as f64;
        let se = self.residual_std_err * (1.0 / n + (x - self.x_mean).powi(2) / self.sxx).sqrt();
        let y = self.predict(x);
        Some((y - t * se, y + t * se))
    }
}

/// Stateless statistics helpers used by the chart builders.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    pub fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn std_dev(values: &[f64]) -> f64 {
        let n = values.len();
        if n < 2 {
            return 0.0;
        }
        let mean = Self::mean(values);
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    }

    /// Two-sided Student-t critical value for `CONFIDENCE_LEVEL`.
    pub fn t_critical(degrees_of_freedom: f64) -> Option<f64> {
        if degrees_of_freedom < 1.0 {
            return None;
        }
        StudentsT::new(0.0, 1.0, degrees_of_freedom)
            .ok()
            .map(|dist| dist.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
    }

    /// Box-and-whisker summary. Returns `None` for an empty group.
    pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Some(BoxStats {
            count: sorted.len(),
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }

    /// Mean with a Student-t confidence interval. Returns `None` for an
    /// empty group.
    pub fn mean_estimate(values: &[f64]) -> Option<Estimate> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mean = Self::mean(values);
        let ci = Self::t_critical((n - 1) as f64).map(|t| {
            let half_width = t * Self::std_dev(values) / (n as f64).sqrt();
            (mean - half_width, mean + half_width)
        });

        Some(Estimate { count: n, mean, ci })
    }

    /// Least-squares line through the paired values.
    pub fn linear_fit(xs: &[f64], ys: &[f64]) -> GraphResult<LinearFit> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return Err(GraphError::DegenerateRegression("need at least two points"));
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let x_mean = Self::mean(xs);
        let y_mean = Self::mean(ys);
        let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
        if sxx == 0.0 {
            return Err(GraphError::DegenerateRegression("x values have no spread"));
        }
        let sxy: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - x_mean) * (y - y_mean))
            .sum();

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let sse: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();
        let (residual_std_err, t_critical) = if n > 2 {
            let dof = (n - 2) as f64;
            ((sse / dof).sqrt(), Self::t_critical(dof))
        } else {
            (0.0, None)
        };

        Ok(LinearFit {
            slope,
            intercept,
            count: n,
            x_mean,
            sxx,
            residual_std_err,
            t_critical,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
    }

    #[test]
    fn box_stats_without_outliers() {
        let stats = StatsCalculator::box_stats(&[8.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).unwrap();
        assert_relative_eq!(stats.q1, 2.75);
        assert_relative_eq!(stats.median, 4.5);
        assert_relative_eq!(stats.q3, 6.25);
        assert_relative_eq!(stats.whisker_low, 1.0);
        assert_relative_eq!(stats.whisker_high, 8.0);
        assert!(stats.fliers.is_empty());
    }

    #[test]
    fn box_stats_marks_outliers_as_fliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let stats = StatsCalculator::box_stats(&values).unwrap();
        assert_relative_eq!(stats.q1, 3.0);
        assert_relative_eq!(stats.q3, 7.0);
        assert_relative_eq!(stats.whisker_high, 8.0);
        assert_eq!(stats.fliers, vec![100.0]);
        assert_eq!(stats.extent(), (1.0, 100.0));
    }

    #[test]
    fn empty_group_has_no_box() {
        assert!(StatsCalculator::box_stats(&[]).is_none());
        assert!(StatsCalculator::mean_estimate(&[]).is_none());
    }

    #[test]
    fn mean_estimate_uses_student_t_interval() {
        let estimate = StatsCalculator::mean_estimate(&[2.0, 4.0, 6.0]).unwrap();
        assert_relative_eq!(estimate.mean, 4.0);
        let (low, high) = estimate.ci.unwrap();
        // t(0.975, 2) = 4.3027, s = 2, n = 3
        assert_relative_eq!(high - 4.0, 4.3027 * 2.0 / 3f64.sqrt(), epsilon = 1e-3);
        assert_relative_eq!(4.0 - low, high - 4.0, epsilon = 1e-9);
    }

    #[test]
    fn single_value_has_no_interval() {
        let estimate = StatsCalculator::mean_estimate(&[5.0]).unwrap();
        assert_eq!(estimate.ci, None);
    }

    #[test]
    fn linear_fit_recovers_exact_line() {
        let fit = StatsCalculator::linear_fit(&[1.0, 2.0, 3.0, 4.0], &[3.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        let (low, high) = fit.confidence_band(10.0).unwrap();
        assert_relative_eq!(low, 21.0, epsilon = 1e-9);
        assert_relative_eq!(high, 21.0, epsilon = 1e-9);
    }

    #[test]
    fn confidence_band_widens_away_from_the_mean() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [1.2, 1.9, 3.3, 3.8, 5.1];
        let fit = StatsCalculator::linear_fit(&xs, &ys).unwrap();
        let (lo_mid, hi_mid) = fit.confidence_band(3.0).unwrap();
        let (lo_far, hi_far) = fit.confidence_band(9.0).unwrap();
        assert!(hi_far - lo_far > hi_mid - lo_mid);
    }

    #[test]
    fn constant_x_cannot_be_fitted() {
        let err = StatsCalculator::linear_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, GraphError::DegenerateRegression(_)));
    }
}
