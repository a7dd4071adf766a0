//! Statistical-mechanical conversion of an energy profile into the linking
//! number deficit at which the window flips to Z-DNA.

use crate::error::{Result, ZHuntError};
use crate::params::ModelParams;

const PI_DEG: f64 = 57.29577951; // 180/pi

/// Log statistical weight of each Z-DNA run length, from a Boltzmann energy
/// profile of `dinucleotides` entries.
///
/// `scratch` holds running products; `logcoef[i]` is the log of the summed
/// products over all sub-windows of length `i + 1`.
pub fn build_log_coefficients(
    profile: &[f64],
    dinucleotides: usize,
    scratch: &mut Vec<f64>,
    logcoef: &mut Vec<f64>,
) -> Result<()> {
    ZHuntError::check_len(dinucleotides, profile.len())?;

    scratch.clear();
    scratch.resize(dinucleotides, 1.0);
    logcoef.clear();

    for i in 0..dinucleotides {
        let mut sum = 0.0;
        let remaining = dinucleotides - i;
        for j in 0..remaining {
            scratch[j] *= profile[i + j];
            sum += scratch[j];
        }
        logcoef.push(sum.ln());
    }
    Ok(())
}

/// Allocating form of [`build_log_coefficients`].
pub fn log_coefficients(profile: &[f64], dinucleotides: usize) -> Result<Vec<f64>> {
    let mut scratch = Vec::with_capacity(dinucleotides);
    let mut logcoef = Vec::with_capacity(dinucleotides);
    build_log_coefficients(profile, dinucleotides, &mut scratch, &mut logcoef)?;
    Ok(logcoef)
}

/// Twist offsets and constants shared by every window evaluation.
#[derive(Debug, Clone)]
pub struct LinkingModel {
    params: ModelParams,
    bztwist: Vec<f64>,
}

impl LinkingModel {
    pub fn new(params: &ModelParams, max_dinucleotides: usize) -> Self {
        let mut bztwist = Vec::with_capacity(max_dinucleotides);
        let mut ab = params.b + params.b;
        for _ in 0..max_dinucleotides {
            ab += params.a;
            bztwist.push(ab);
        }

        Self {
            params: *params,
            bztwist,
        }
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Twist released by a Z run of `i + 1` dinucleotides.
    pub fn twist(&self) -> &[f64] {
        &self.bztwist
    }

    fn terms<'a>(&'a self, logcoef: &[f64]) -> Result<&'a [f64]> {
        ZHuntError::check_len(logcoef.len(), self.bztwist.len())?;
        Ok(&self.bztwist[..logcoef.len()])
    }

    /// Offset added to every exponent so none falls below the exponent floor.
    #[inline]
    fn exponent_shift(&self, dl: f64, bztwist: &[f64], logcoef: &[f64]) -> f64 {
        let k_rt = self.params.k_rt;
        let expmini = bztwist
            .iter()
            .zip(logcoef)
            .map(|(&t, &c)| {
                let z = dl - t;
                c + k_rt * z * z
            })
            .fold(0.0, f64::min);

        if expmini < self.params.exp_limit {
            self.params.exp_limit - expmini
        } else {
            0.0
        }
    }

    /// Equilibrium residual at deficit `dl`: target twist minus the
    /// Boltzmann-averaged twist released by Z runs.
    pub fn delta_linking(&self, dl: f64, deltatwist: f64, logcoef: &[f64]) -> Result<f64> {
        let bztwist = self.terms(logcoef)?;
        Ok(self.residual(dl, deltatwist, bztwist, logcoef))
    }

    #[inline]
    fn residual(&self, dl: f64, deltatwist: f64, bztwist: &[f64], logcoef: &[f64]) -> f64 {
        let k_rt = self.params.k_rt;
        let expmini = self.exponent_shift(dl, bztwist, logcoef);

        let mut sump = 0.0;
        let mut sumq = 0.0;
        for (&t, &c) in bztwist.iter().zip(logcoef) {
            let z = dl - t;
            let y = (c + k_rt * z * z + expmini).exp();
            sumq += y;
            sump += t * y;
        }
        sumq += (k_rt * dl * dl + self.params.sigma + expmini).exp();
        deltatwist - sump / sumq
    }

    /// Deficit in `[dl_lower, dl_upper]` where [`Self::delta_linking`]
    /// crosses zero. Returns `dl_upper` unchanged when the bounds do not
    /// bracket a root.
    pub fn solve_deficit(&self, deltatwist: f64, logcoef: &[f64]) -> Result<f64> {
        let bztwist = self.terms(logcoef)?;
        Ok(linear_search(
            self.params.dl_lower,
            self.params.dl_upper,
            self.params.dl_tolerance,
            |dl| self.residual(dl, deltatwist, bztwist, logcoef),
        ))
    }

    /// d/d(dl) of the mean released twist at `dl`.
    pub fn deficit_slope(&self, dl: f64, logcoef: &[f64]) -> Result<f64> {
        let bztwist = self.terms(logcoef)?;
        let k_rt = self.params.k_rt;
        let expmini = self.exponent_shift(dl, bztwist, logcoef);

        let mut sump = 0.0;
        let mut sump1 = 0.0;
        let mut sumq = 0.0;
        let mut sumq1 = 0.0;
        let x = 2.0 * k_rt;

        for (&t, &c) in bztwist.iter().zip(logcoef) {
            let z = dl - t;
            let y = (c + k_rt * z * z + expmini).exp();
            sumq += y;
            sump += t * y;
            let y_scaled = y * z * x;
            sumq1 += y_scaled;
            sump1 += t * y_scaled;
        }

        let y = (k_rt * dl * dl + self.params.sigma + expmini).exp();
        sumq += y;
        sumq1 += x * dl * y;

        Ok((sump1 - sump * sumq1 / sumq) / sumq)
    }

    /// [`Self::deficit_slope`] as an angle in degrees.
    pub fn slope_degrees(&self, dl: f64, logcoef: &[f64]) -> Result<f64> {
        Ok(self.deficit_slope(dl, logcoef)?.atan() * PI_DEG)
    }
}

/// Bisection between `x1` and `x2`, keeping the end where `func <= 0`.
#[inline]
fn linear_search<F>(x1: f64, x2: f64, tolerance: f64, func: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let f = func(x1);
    let fmid = func(x2);

    if f * fmid >= 0.0 {
        return x2;
    }

    let (mut x, mut dx) = if f < 0.0 {
        (x1, x2 - x1)
    } else {
        (x2, x1 - x2)
    };

    loop {
        dx *= 0.5;
        let xmid = x + dx;
        if func(xmid) <= 0.0 {
            x = xmid;
        }
        if dx.abs() <= tolerance {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_profile_gives_log_run_counts() {
        let len = 9;
        let logcoef = log_coefficients(&vec![1.0; len], len).unwrap();
        assert_eq!(logcoef.len(), len);
        for (i, c) in logcoef.iter().enumerate() {
            assert_relative_eq!(*c, ((len - i) as f64).ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn coefficients_sum_sub_window_products() {
        let profile = [0.5, 0.25, 2.0];
        let logcoef = log_coefficients(&profile, 3).unwrap();
        assert_relative_eq!(logcoef[0], (0.5f64 + 0.25 + 2.0).ln(), epsilon = 1e-12);
        assert_relative_eq!(logcoef[1], (0.125f64 + 0.5).ln(), epsilon = 1e-12);
        assert_relative_eq!(logcoef[2], 0.25f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn scratch_is_reset_between_windows() {
        let mut scratch = vec![7.0; 3];
        let mut logcoef = vec![1.0; 8];
        build_log_coefficients(&[1.0, 1.0], 2, &mut scratch, &mut logcoef).unwrap();
        assert_eq!(logcoef.len(), 2);
        assert_relative_eq!(logcoef[0], 2f64.ln());
        assert_relative_eq!(logcoef[1], 0.0);
    }

    #[test]
    fn twist_offsets() {
        let model = LinkingModel::new(&ModelParams::default(), 4);
        let expected = [1.157, 1.514, 1.871, 2.228];
        for (t, e) in model.twist().iter().zip(expected) {
            assert_relative_eq!(*t, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn unbracketed_root_returns_upper_bound() {
        let params = ModelParams::default();
        let model = LinkingModel::new(&params, 8);
        let logcoef = log_coefficients(&[1.0; 8], 8).unwrap();

        // with no target twist the residual is negative at both bounds
        let f_lo = model.delta_linking(params.dl_lower, 0.0, &logcoef).unwrap();
        let f_hi = model.delta_linking(params.dl_upper, 0.0, &logcoef).unwrap();
        assert!(f_lo * f_hi >= 0.0);
        assert_eq!(model.solve_deficit(0.0, &logcoef).unwrap(), 50.0);

        assert_eq!(model.solve_deficit(0.0, &[]).unwrap(), 50.0);
    }

    #[test]
    fn solved_deficit_brackets_sign_change() {
        let params = ModelParams::default();
        let len = 12;
        let model = LinkingModel::new(&params, len);
        let logcoef = log_coefficients(&[0.5; 12], len).unwrap();
        let deltatwist = params.delta_twist(len);

        let dl = model.solve_deficit(deltatwist, &logcoef).unwrap();
        assert!(dl > params.dl_lower && dl < params.dl_upper, "{dl}");

        let f = |x| model.delta_linking(x, deltatwist, &logcoef).unwrap();
        assert!(f(dl) <= 0.0);
        assert!(f(dl - 2.0 * params.dl_tolerance) > 0.0);
    }

    #[test]
    fn analytic_slope_matches_finite_difference() {
        let params = ModelParams::default();
        let len = 12;
        let model = LinkingModel::new(&params, len);
        let logcoef = log_coefficients(&[0.5; 12], len).unwrap();
        let deltatwist = params.delta_twist(len);

        for dl in [15.0, 22.5, 30.0, 41.0] {
            let h = 1e-5;
            let f = |x| model.delta_linking(x, deltatwist, &logcoef).unwrap();
            let numeric = -(f(dl + h) - f(dl - h)) / (2.0 * h);
            let analytic = model.deficit_slope(dl, &logcoef).unwrap();
            assert_relative_eq!(analytic, numeric, max_relative = 1e-4, epsilon = 1e-9);
        }
    }

    #[test]
    fn slope_in_degrees() {
        let params = ModelParams::default();
        let model = LinkingModel::new(&params, 4);
        let logcoef = log_coefficients(&[0.2; 4], 4).unwrap();
        let raw = model.deficit_slope(25.0, &logcoef).unwrap();
        let deg = model.slope_degrees(25.0, &logcoef).unwrap();
        assert_relative_eq!(deg, raw.atan().to_degrees(), max_relative = 1e-8);
    }

    #[test]
    fn extreme_exponents_stay_finite() {
        let params = ModelParams::default();
        let model = LinkingModel::new(&params, 3);
        let logcoef = [-700.0, -650.0, -620.0];
        let f = model.delta_linking(10.0, 1.0, &logcoef).unwrap();
        let slope = model.deficit_slope(10.0, &logcoef).unwrap();
        assert!(f.is_finite());
        assert!(slope.is_finite());
    }

    #[test]
    fn coefficients_longer_than_model_are_rejected() {
        let model = LinkingModel::new(&ModelParams::default(), 2);
        let err = model.solve_deficit(1.0, &[0.0; 3]).unwrap_err();
        assert!(matches!(err, ZHuntError::LengthMismatch { expected: 3, found: 2 }));
    }
}
