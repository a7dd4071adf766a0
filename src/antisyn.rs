//! Minimum-energy anti/syn conformation of a window and its energy profile.
//!
//! Every dinucleotide of a window is either AS or SA. The energy of a
//! dinucleotide depends on its own state and on the state of the one before
//! it, so the best assignment is found with a two-state dynamic programme:
//! at each position keep the cheapest path ending in AS and the cheapest
//! path ending in SA.

use std::fmt;
use std::str::FromStr;

use crate::energy::{EnergyTable, Transition};
use crate::error::{Result, ZHuntError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AntiSyn {
    AS = 0,
    SA = 1,
}

impl AntiSyn {
    #[inline]
    pub fn code(self) -> &'static str {
        match self {
            AntiSyn::AS => "AS",
            AntiSyn::SA => "SA",
        }
    }

    /// Decode a raw state value at dinucleotide `position`.
    pub fn from_state(value: u8, position: usize) -> Result<Self> {
        match value {
            0 => Ok(AntiSyn::AS),
            1 => Ok(AntiSyn::SA),
            other => Err(ZHuntError::InvalidConformation {
                position,
                found: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AntiSyn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A finished anti/syn assignment, one state per dinucleotide.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Conformation(Vec<AntiSyn>);

impl Conformation {
    pub fn states(&self) -> &[AntiSyn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_states(states: &[u8]) -> Result<Self> {
        states
            .iter()
            .enumerate()
            .map(|(din, &s)| AntiSyn::from_state(s, din))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Integer energy (hundredths of kcal/mol) of this conformation.
    pub fn int_energy(&self, table: &EnergyTable, indices: &[usize]) -> Result<i64> {
        ZHuntError::check_len(self.len(), indices.len())?;
        Ok(transitions(&self.0)
            .zip(indices)
            .map(|(t, &idx)| table.int_energy(t, idx))
            .sum())
    }
}

impl From<Vec<AntiSyn>> for Conformation {
    fn from(states: Vec<AntiSyn>) -> Self {
        Self(states)
    }
}

impl fmt::Display for Conformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in &self.0 {
            f.write_str(state.code())?;
        }
        Ok(())
    }
}

impl FromStr for Conformation {
    type Err = ZHuntError;

    fn from_str(s: &str) -> Result<Self> {
        s.as_bytes()
            .chunks(2)
            .enumerate()
            .map(|(din, pair)| match pair {
                b"AS" => Ok(AntiSyn::AS),
                b"SA" => Ok(AntiSyn::SA),
                other => Err(ZHuntError::InvalidConformation {
                    position: din,
                    found: String::from_utf8_lossy(other).into_owned(),
                }),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

/// Table row for every dinucleotide of `states`.
fn transitions(states: &[AntiSyn]) -> impl Iterator<Item = Transition> + '_ {
    let first = states.first().map(|&s| Transition::initial(s));
    first
        .into_iter()
        .chain(states.windows(2).map(|w| Transition::between(w[0], w[1])))
}

/// Cumulative integer energy and the path that produced it.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    esum: i64,
    states: Vec<AntiSyn>,
}

impl Candidate {
    pub fn esum(&self) -> i64 {
        self.esum
    }

    pub fn states(&self) -> &[AntiSyn] {
        &self.states
    }

    pub fn to_conformation(&self) -> Conformation {
        Conformation(self.states.clone())
    }
}

/// Working memory for [`AntiSynScratch::search`]. One per worker; never
/// shared between concurrent window evaluations.
#[derive(Debug, Clone, Default)]
pub struct AntiSynScratch {
    best0: Candidate,
    best1: Candidate,
    best0_prev: Vec<AntiSyn>,
}

impl AntiSynScratch {
    pub fn with_capacity(dinucleotides: usize) -> Self {
        let candidate = || Candidate {
            esum: 0,
            states: Vec::with_capacity(dinucleotides),
        };
        Self {
            best0: candidate(),
            best1: candidate(),
            best0_prev: Vec::with_capacity(dinucleotides),
        }
    }

    fn reset(&mut self, dinucleotides: usize) {
        self.best0.esum = 0;
        self.best1.esum = 0;
        for states in [
            &mut self.best0.states,
            &mut self.best1.states,
            &mut self.best0_prev,
        ] {
            states.clear();
            states.resize(dinucleotides, AntiSyn::AS);
        }
    }

    /// Best path of the last search ending in `state`.
    pub fn best_ending(&self, state: AntiSyn) -> &Candidate {
        match state {
            AntiSyn::AS => &self.best0,
            AntiSyn::SA => &self.best1,
        }
    }

    /// Minimum-energy conformation of the first `dinucleotides` entries of
    /// `indices`.
    ///
    /// Ties are settled by comparing paths as byte strings: the AS-ending
    /// update keeps its own path when it compares `<=`, the SA-ending update
    /// only when it compares strictly `<` against the already updated
    /// AS-ending path. A final tie goes to the AS-ending path.
    pub fn search(
        &mut self,
        table: &EnergyTable,
        indices: &[usize],
        dinucleotides: usize,
    ) -> Result<&Candidate> {
        ZHuntError::check_len(dinucleotides, indices.len())?;
        self.reset(dinucleotides);
        if dinucleotides == 0 {
            return Ok(&self.best0);
        }

        self.best0.esum = table.int_energy(Transition::AsAs, indices[0]);
        self.best0.states[0] = AntiSyn::AS;
        self.best1.esum = table.int_energy(Transition::SaSa, indices[0]);
        self.best1.states[0] = AntiSyn::SA;

        for din in 1..dinucleotides {
            let idx = indices[din];
            let prev_best0 = self.best0.esum;
            let prev_best1 = self.best1.esum;
            self.best0_prev[..din].copy_from_slice(&self.best0.states[..din]);

            let esum00 = prev_best0 + table.int_energy(Transition::AsAs, idx);
            let esum10 = prev_best1 + table.int_energy(Transition::SaAs, idx);
            if esum00 < esum10
                || (esum00 == esum10 && self.best0.states[..din] <= self.best1.states[..din])
            {
                self.best0.esum = esum00;
            } else {
                self.best0.esum = esum10;
                self.best0.states[..din].copy_from_slice(&self.best1.states[..din]);
            }
            self.best0.states[din] = AntiSyn::AS;

            let esum01 = prev_best0 + table.int_energy(Transition::AsSa, idx);
            let esum11 = prev_best1 + table.int_energy(Transition::SaSa, idx);
            if esum11 < esum01
                || (esum11 == esum01 && self.best1.states[..din] < self.best0.states[..din])
            {
                self.best1.esum = esum11;
            } else {
                self.best1.esum = esum01;
                self.best1.states[..din].copy_from_slice(&self.best0_prev[..din]);
            }
            self.best1.states[din] = AntiSyn::SA;
        }

        if self.best0.esum <= self.best1.esum {
            Ok(&self.best0)
        } else {
            Ok(&self.best1)
        }
    }
}

/// Allocating form of [`AntiSynScratch::search`]: the winning integer energy
/// and conformation.
pub fn find_best_conformation(
    table: &EnergyTable,
    indices: &[usize],
    dinucleotides: usize,
) -> Result<(i64, Conformation)> {
    let mut scratch = AntiSynScratch::with_capacity(dinucleotides);
    let best = scratch.search(table, indices, dinucleotides)?;
    Ok((best.esum(), best.to_conformation()))
}

/// Boltzmann-weighted, non-cumulative energy of each of the first
/// `dinucleotides` states of `states`.
pub fn energy_profile(
    table: &EnergyTable,
    states: &[AntiSyn],
    indices: &[usize],
    dinucleotides: usize,
    out: &mut Vec<f64>,
) -> Result<()> {
    ZHuntError::check_len(dinucleotides, states.len())?;
    ZHuntError::check_len(dinucleotides, indices.len())?;

    out.clear();
    out.extend(
        transitions(&states[..dinucleotides])
            .zip(indices)
            .map(|(t, &idx)| table.boltzmann(t, idx)),
    );
    Ok(())
}

/// [`energy_profile`] over raw `0`/`1` states.
pub fn energy_profile_from_states(
    table: &EnergyTable,
    states: &[u8],
    indices: &[usize],
    dinucleotides: usize,
    out: &mut Vec<f64>,
) -> Result<()> {
    ZHuntError::check_len(dinucleotides, states.len())?;
    let conformation = Conformation::from_states(&states[..dinucleotides])?;
    energy_profile(table, conformation.states(), indices, dinucleotides, out)
}

/// [`energy_profile`] over the `AS`/`SA` display string.
pub fn energy_profile_from_str(
    table: &EnergyTable,
    display: &str,
    indices: &[usize],
    dinucleotides: usize,
    out: &mut Vec<f64>,
) -> Result<()> {
    let conformation: Conformation = display.parse()?;
    energy_profile(table, conformation.states(), indices, dinucleotides, out)
}
