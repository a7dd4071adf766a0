//! Delta B-Z energies of the sixteen dinucleotides.
//!
//! Rows are indexed by [`Transition`] (the anti/syn state of the previous
//! dinucleotide and of the current one), columns by the dinucleotide index
//! returned from [`classify`].

use crate::antisyn::AntiSyn;
use crate::error::{Result, ZHuntError};
use crate::params::ModelParams;

/// Number of distinct dinucleotides.
pub const DINUCLEOTIDES: usize = 16;

/// Delta BZ energy of each dinucleotide (kcal/mol).
#[rustfmt::skip]
pub const DBZED: [[f64; DINUCLEOTIDES]; 4] = [
    // AS-AS
    [4.40, 6.20, 3.40, 5.20, 2.50, 4.40, 1.40, 3.30, 3.30, 5.20, 2.40, 4.20, 1.40, 3.40, 0.66, 2.40],
    // AS-SA
    [6.20, 6.20, 5.20, 5.20, 6.20, 6.20, 5.20, 5.20, 5.20, 5.20, 4.00, 4.00, 5.20, 5.20, 4.00, 4.00],
    // SA-AS
    [6.20, 6.20, 5.20, 5.20, 6.20, 6.20, 5.20, 5.20, 5.20, 5.20, 4.00, 4.00, 5.20, 5.20, 4.00, 4.00],
    // SA-SA
    [4.40, 2.50, 3.30, 1.40, 6.20, 4.40, 5.20, 3.40, 3.40, 1.40, 2.40, 0.66, 5.20, 3.30, 4.20, 2.40],
];

/// [`DBZED`] in hundredths of kcal/mol. Conformation search sums these so
/// that equal-energy paths compare equal regardless of summation order.
#[rustfmt::skip]
pub const INT_DBZED: [[i64; DINUCLEOTIDES]; 4] = [
    // AS-AS
    [440, 620, 340, 520, 250, 440, 140, 330, 330, 520, 240, 420, 140, 340, 66, 240],
    // AS-SA
    [620, 620, 520, 520, 620, 620, 520, 520, 520, 520, 400, 400, 520, 520, 400, 400],
    // SA-AS
    [620, 620, 520, 520, 620, 620, 520, 520, 520, 520, 400, 400, 520, 520, 400, 400],
    // SA-SA
    [440, 250, 330, 140, 620, 440, 520, 340, 340, 140, 240, 66, 520, 330, 420, 240],
];

/// Row of the energy tables: (previous state, current state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Transition {
    AsAs = 0,
    AsSa = 1,
    SaAs = 2,
    SaSa = 3,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::AsAs,
        Transition::AsSa,
        Transition::SaAs,
        Transition::SaSa,
    ];

    #[inline]
    pub fn between(prev: AntiSyn, curr: AntiSyn) -> Self {
        match (prev, curr) {
            (AntiSyn::AS, AntiSyn::AS) => Transition::AsAs,
            (AntiSyn::AS, AntiSyn::SA) => Transition::AsSa,
            (AntiSyn::SA, AntiSyn::AS) => Transition::SaAs,
            (AntiSyn::SA, AntiSyn::SA) => Transition::SaSa,
        }
    }

    /// The first dinucleotide of a window behaves as if preceded by its own state.
    #[inline]
    pub fn initial(curr: AntiSyn) -> Self {
        Self::between(curr, curr)
    }
}

/// Dinucleotide index in `0..16`, or `None` for anything outside `a,t,g,c`.
#[inline]
pub fn classify(prev: u8, curr: u8) -> Option<usize> {
    let idx = match (prev, curr) {
        (b'a', b'a') => 0,
        (b'a', b't') => 1,
        (b'a', b'g') => 2,
        (b'a', b'c') => 3,
        (b't', b'a') => 4,
        (b't', b't') => 5,
        (b't', b'g') => 6,
        (b't', b'c') => 7,
        (b'g', b'a') => 8,
        (b'g', b't') => 9,
        (b'g', b'g') => 10,
        (b'g', b'c') => 11,
        (b'c', b'a') => 12,
        (b'c', b't') => 13,
        (b'c', b'g') => 14,
        (b'c', b'c') => 15,
        _ => return None,
    };
    Some(idx)
}

/// Classify `dinucleotides` consecutive base pairs of `sequence` starting at
/// `start`, writing their indices into `out`.
pub fn dinucleotide_indices(
    sequence: &[u8],
    start: usize,
    dinucleotides: usize,
    out: &mut Vec<usize>,
) -> Result<()> {
    let end = start + 2 * dinucleotides;
    ZHuntError::check_len(end, sequence.len())?;

    out.clear();
    for (pair, bases) in sequence[start..end].chunks_exact(2).enumerate() {
        let idx = classify(bases[0], bases[1]).ok_or_else(|| {
            let offset = if classify(bases[0], b'a').is_none() { 0 } else { 1 };
            ZHuntError::InvalidBase {
                position: start + 2 * pair + offset,
                base: bases[offset] as char,
            }
        })?;
        out.push(idx);
    }
    Ok(())
}

/// Energy tables with their Boltzmann factors, computed once per run.
#[derive(Debug, Clone)]
pub struct EnergyTable {
    exp_dbzed: [[f64; DINUCLEOTIDES]; 4],
}

impl EnergyTable {
    pub fn new(params: &ModelParams) -> Self {
        let mut exp_dbzed = [[0.0; DINUCLEOTIDES]; 4];
        for (row, energies) in exp_dbzed.iter_mut().zip(DBZED.iter()) {
            for (w, e) in row.iter_mut().zip(energies.iter()) {
                *w = (-e / params.rt).exp();
            }
        }
        Self { exp_dbzed }
    }

    #[inline]
    pub fn energy(&self, transition: Transition, idx: usize) -> f64 {
        DBZED[transition as usize][idx]
    }

    #[inline]
    pub fn int_energy(&self, transition: Transition, idx: usize) -> i64 {
        INT_DBZED[transition as usize][idx]
    }

    /// `exp(-E/RT)` for the given table entry.
    #[inline]
    pub fn boltzmann(&self, transition: Transition, idx: usize) -> f64 {
        self.exp_dbzed[transition as usize][idx]
    }
}
