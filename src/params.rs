//! Physical constants of the Z-DNA model.
//!
//! All of them live in [`ModelParams`], which is built once at start-up and
//! handed by reference to every stage of the window evaluation.

pub const K_RT: f64 = -0.2521201; // -1100/4363
pub const SIGMA: f64 = 16.94800353; // 10/RT
pub const EXP_LIMIT: f64 = -600.0;
pub const RT: f64 = 0.59004; // 0.00198*298
pub const A: f64 = 0.357; // 2 * (1/10.5 + 1/12)
pub const B: f64 = 0.4;

pub const AVERAGE: f64 = 29.6537135;
pub const STDV: f64 = 2.71997;

pub const DL_LOWER: f64 = 10.0;
pub const DL_UPPER: f64 = 50.0;
pub const DL_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    /// Gas constant times temperature (kcal/mol).
    pub rt: f64,
    /// Helical twist change per dinucleotide converted to Z form.
    pub a: f64,
    /// Junction twist contribution.
    pub b: f64,
    /// Quadratic free-energy coefficient of supercoiling, divided by RT.
    pub k_rt: f64,
    /// Entropic weight of the all-B term.
    pub sigma: f64,
    /// Floor for exponents before they are passed to `exp`.
    pub exp_limit: f64,
    pub dl_lower: f64,
    pub dl_upper: f64,
    pub dl_tolerance: f64,
    /// Mean of the empirical deficit distribution.
    pub average: f64,
    /// Standard deviation of the empirical deficit distribution.
    pub stdv: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            rt: RT,
            a: A,
            b: B,
            k_rt: K_RT,
            sigma: SIGMA,
            exp_limit: EXP_LIMIT,
            dl_lower: DL_LOWER,
            dl_upper: DL_UPPER,
            dl_tolerance: DL_TOLERANCE,
            average: AVERAGE,
            stdv: STDV,
        }
    }
}

impl ModelParams {
    /// Target twist for a window of `dinucleotides`: `a/2` per dinucleotide.
    #[inline]
    pub fn delta_twist(&self, dinucleotides: usize) -> f64 {
        self.a / 2.0 * dinucleotides as f64
    }
}
