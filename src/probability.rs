//! Gaussian significance of a deficit.
//!
//! Series expansion of the error function from Bevington, "Data Reduction
//! and Error Analysis for the Physical Sciences" (1969).

use crate::params::ModelParams;

const SQRT2_INV: f64 = 0.70710678118654752440; // 1/sqrt(2)
const SQRTPI_INV: f64 = 0.564189583546; // 1/sqrt(pi)

/// One-tail probability of `dl` under the empirical deficit distribution.
///
/// Deficits at or below the mean return the reciprocal of the tail instead,
/// so the result exceeds 1 there.
pub fn tail_probability(dl: f64, params: &ModelParams) -> f64 {
    let z = (dl - params.average).abs() / params.stdv;
    let mut x = z * SQRT2_INV;
    let y = SQRTPI_INV * (-x * x).exp();
    let z_sq = z * z;
    let mut k = 1.0;
    let mut sum = 0.0;

    loop {
        sum += x;
        k += 2.0;
        x *= z_sq / k;
        if sum + x <= sum {
            break;
        }
    }

    let tail_prob = 0.5 - y * sum;
    if dl > params.average {
        tail_prob
    } else {
        1.0 / tail_prob
    }
}
