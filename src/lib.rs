//! Z-HUNT-3: Z-DNA formation propensity of DNA sequences.
//!
//! Based on the paper "A computer aided thermodynamic approach for predicting
//! the formation of Z-DNA in naturally occurring sequences",
//! The EMBO Journal, Vol.5, No.10, pp2737-2744, 1986.
//!
//! Each position of a sequence is scored by
//! 1. finding the minimum-energy anti/syn conformation of the window
//!    ([`antisyn`]),
//! 2. turning its Boltzmann energy profile into run-length weights and
//!    solving for the linking number deficit that favours Z-DNA
//!    ([`linking`]),
//! 3. rating that deficit against an empirical distribution
//!    ([`probability`]).
//!
//! [`scanner::WindowScanner`] drives the three steps over every position.

pub mod antisyn;
pub mod energy;
pub mod error;
pub mod linking;
pub mod params;
pub mod probability;
pub mod scanner;
pub mod sequence;
pub mod zscore;

pub use antisyn::{find_best_conformation, AntiSyn, Conformation};
pub use energy::{classify, EnergyTable};
pub use error::{Result, ZHuntError};
pub use linking::{log_coefficients, LinkingModel};
pub use params::ModelParams;
pub use probability::tail_probability;
pub use scanner::{WindowRange, WindowResult, WindowScanner};
pub use sequence::Sequence;
