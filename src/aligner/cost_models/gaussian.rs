use serde::{Deserialize, Serialize};

use super::LengthCostModel;

/// Length-mismatch model of Gale & Church.
///
/// The difference between the source length (scaled by `ratio`) and the target
/// length is assumed normally distributed with variance proportional to the
/// mean length. The cost is the log of the two-tailed probability of a
/// discrepancy at least this large.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianLengthCost {
    /// Expected number of target characters per source character
    pub ratio: f64,

    /// Variance of the length difference per unit of mean length
    pub variance: f64,

    /// Returned when the tail probability is not positive
    pub floor: f64,
}

impl GaussianLengthCost {
    pub const DEFAULT_RATIO: f64 = 1.0;
    pub const DEFAULT_VARIANCE: f64 = 6.8;
    pub const DEFAULT_FLOOR: f64 = -25.0;

    pub fn new(ratio: f64, variance: f64, floor: f64) -> Self {
        Self { ratio, variance, floor }
    }

    /// Normalized length discrepancy (absolute z-score)
    pub fn z_score(&self, source_len: usize, target_len: usize) -> f64 {
        let (s, t) = (source_len as f64, target_len as f64);
        let mean = (s + t / self.ratio) / 2.0;

        ((self.ratio * s - t) / (self.variance * mean).sqrt()).abs()
    }
}

impl Default for GaussianLengthCost {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATIO, Self::DEFAULT_VARIANCE, Self::DEFAULT_FLOOR)
    }
}

impl LengthCostModel for GaussianLengthCost {
    #[inline]
    fn length_cost(&self, source_len: usize, target_len: usize) -> f64 {
        if source_len == 0 && target_len == 0 {
            return 0.0;
        }

        let z = self.z_score(source_len, target_len);
        let pd = 2.0 * (1.0 - pnorm(z));

        if pd > 0.0 {
            pd.ln()
        } else {
            self.floor
        }
    }
}

/// Standard normal CDF for `z >= 0`, using the polynomial approximation 26.2.17
/// from Abramowitz & Stegun. Absolute error is below 7.5e-8.
#[inline]
pub fn pnorm(z: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.2316419 * z);

    1.0 - 0.3989423 * (-z * z / 2.0).exp()
        * ((((1.330274429 * t
        - 1.821255978) * t
        + 1.781477937) * t
        - 0.356563782) * t
        + 0.319381530) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pnorm() {
        assert!((pnorm(0.0) - 0.5).abs() < 1e-7);
        assert!((pnorm(1.0) - 0.841344746).abs() < 1e-6);
        assert!((pnorm(1.96) - 0.975002105).abs() < 1e-6);
        assert!(pnorm(10.0) <= 1.0);
    }

    #[test]
    fn test_equal_lengths_cost_nothing() {
        let model = GaussianLengthCost::default();
        assert_eq!(model.length_cost(0, 0), 0.0);

        // z = 0, the tail probability is 2 * (1 - pnorm(0)), within rounding of 1.0
        for len in [1, 5, 120] {
            assert!(model.length_cost(len, len).abs() < 1e-6);
        }
    }

    #[test]
    fn test_one_sided() {
        let model = GaussianLengthCost::default();

        // mean = 2.5, z = 5 / sqrt(6.8 * 2.5)
        let z = 5.0 / (6.8f64 * 2.5).sqrt();
        let expected = (2.0 * (1.0 - pnorm(z))).ln();
        assert!((model.length_cost(0, 5) - expected).abs() < 1e-12);
        assert!(model.length_cost(0, 5) < 0.0);
        assert_eq!(model.length_cost(0, 5), model.length_cost(5, 0));
    }

    #[test]
    fn test_cost_decreases_with_mismatch() {
        let model = GaussianLengthCost::default();
        let c1 = model.length_cost(100, 105);
        let c2 = model.length_cost(100, 130);
        let c3 = model.length_cost(100, 160);
        assert!(c1 > c2);
        assert!(c2 > c3);
    }

    #[test]
    fn test_extreme_lengths_are_floored() {
        let model = GaussianLengthCost::default();
        let cost = model.length_cost(1, 1000);
        assert_eq!(cost, GaussianLengthCost::DEFAULT_FLOOR);
        assert!(cost.is_finite());

        let custom = GaussianLengthCost::new(1.0, 6.8, -100.0);
        assert_eq!(custom.length_cost(1000, 1), -100.0);
    }

    #[test]
    fn test_deserialize_partial() {
        let model: GaussianLengthCost = serde_json::from_str(r#"{"ratio": 1.2}"#).unwrap();
        assert_eq!(model.ratio, 1.2);
        assert_eq!(model.variance, 6.8);
        assert_eq!(model.floor, -25.0);
    }
}
