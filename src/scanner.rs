//! Sliding-window driver: one evaluation per sequence position, each trying
//! every window length in the configured range and keeping the one with the
//! smallest deficit.

use std::ops::RangeInclusive;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::antisyn::{energy_profile, AntiSyn, AntiSynScratch, Conformation};
use crate::energy::{dinucleotide_indices, EnergyTable};
use crate::error::Result;
use crate::linking::{build_log_coefficients, LinkingModel};
use crate::params::ModelParams;
use crate::probability::tail_probability;
use crate::sequence::Sequence;

/// Window lengths, in dinucleotides, tried at every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    pub from_din: usize,
    pub to_din: usize,
}

impl WindowRange {
    /// Clamp `min..=max` to the `window` size, keeping `min <= max`.
    pub fn new(window: usize, min: usize, max: usize) -> Self {
        let to_din = max.min(window);
        let from_din = min.min(to_din);
        Self { from_din, to_din }
    }

    pub fn lengths(&self) -> RangeInclusive<usize> {
        self.from_din..=self.to_din
    }

    /// Bases read from the buffer at each position.
    pub fn nucleotides(&self) -> usize {
        2 * self.to_din
    }
}

/// Outcome of one position.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowResult {
    /// 0-based offset into the sequence.
    pub position: usize,
    /// Window length that gave the smallest deficit.
    pub dinucleotides: usize,
    pub dl: f64,
    /// Slope of the deficit curve at `dl`, in degrees.
    pub slope: f64,
    pub probability: f64,
    pub conformation: Conformation,
}

/// Per-worker buffers for [`WindowScanner::evaluate_position`].
#[derive(Debug, Clone, Default)]
pub struct WindowScratch {
    indices: Vec<usize>,
    antisyn: AntiSynScratch,
    best_states: Vec<AntiSyn>,
    profile: Vec<f64>,
    products: Vec<f64>,
    logcoef: Vec<f64>,
}

impl WindowScratch {
    pub fn with_capacity(dinucleotides: usize) -> Self {
        Self {
            indices: Vec::with_capacity(dinucleotides),
            antisyn: AntiSynScratch::with_capacity(dinucleotides),
            best_states: Vec::with_capacity(dinucleotides),
            profile: Vec::with_capacity(dinucleotides),
            products: Vec::with_capacity(dinucleotides),
            logcoef: Vec::with_capacity(dinucleotides),
        }
    }
}

/// Read-only model state shared by all positions.
#[derive(Debug, Clone)]
pub struct WindowScanner {
    params: ModelParams,
    table: EnergyTable,
    linking: LinkingModel,
    range: WindowRange,
}

impl WindowScanner {
    pub fn new(params: &ModelParams, range: WindowRange) -> Self {
        Self {
            params: *params,
            table: EnergyTable::new(params),
            linking: LinkingModel::new(params, range.to_din),
            range,
        }
    }

    pub fn range(&self) -> WindowRange {
        self.range
    }

    pub fn scratch(&self) -> WindowScratch {
        WindowScratch::with_capacity(self.range.to_din)
    }

    /// Score the window starting at `position` of `sequence`, which must hold
    /// at least `position + 2 * to_din` bases.
    pub fn evaluate_position(
        &self,
        sequence: &[u8],
        position: usize,
        scratch: &mut WindowScratch,
    ) -> Result<WindowResult> {
        let to_din = self.range.to_din;
        dinucleotide_indices(sequence, position, to_din, &mut scratch.indices)?;

        let mut best_dl = self.params.dl_upper;
        let mut best_din = None;

        for din in self.range.lengths() {
            let best = scratch.antisyn.search(&self.table, &scratch.indices, din)?;
            energy_profile(&self.table, best.states(), &scratch.indices, din, &mut scratch.profile)?;
            build_log_coefficients(&scratch.profile, din, &mut scratch.products, &mut scratch.logcoef)?;
            let dl = self
                .linking
                .solve_deficit(self.params.delta_twist(din), &scratch.logcoef)?;

            // nothing beat the upper bound: report the longest window
            if dl < best_dl || (best_din.is_none() && din == to_din) {
                best_dl = dl;
                best_din = Some(din);
                scratch.best_states.clear();
                scratch.best_states.extend_from_slice(best.states());
            }
        }

        let best_din = best_din.unwrap_or(to_din);
        energy_profile(
            &self.table,
            &scratch.best_states,
            &scratch.indices,
            best_din,
            &mut scratch.profile,
        )?;
        build_log_coefficients(&scratch.profile, best_din, &mut scratch.products, &mut scratch.logcoef)?;

        Ok(WindowResult {
            position,
            dinucleotides: best_din,
            dl: best_dl,
            slope: self.linking.slope_degrees(best_dl, &scratch.logcoef)?,
            probability: tail_probability(best_dl, &self.params),
            conformation: Conformation::from(scratch.best_states.clone()),
        })
    }

    /// Score every position, handing results to `sink` in position order, one
    /// chunk at a time. Chunks are evaluated on the rayon pool when `parallel`
    /// is set.
    pub fn scan_chunks<F>(&self, sequence: &Sequence, parallel: bool, mut sink: F) -> Result<()>
    where
        F: FnMut(&[WindowResult]) -> Result<()>,
    {
        let seq_length = sequence.len();
        let buffer = sequence.as_bytes();

        let num_threads = if parallel { rayon::current_num_threads() } else { 1 };
        let chunk_size = (seq_length / (num_threads * 4)).clamp(500, 2000);
        info!(
            positions = seq_length,
            from_din = self.range.from_din,
            to_din = self.range.to_din,
            parallel,
            "scanning"
        );

        let mut serial_scratch = self.scratch();
        let mut chunk_results = Vec::with_capacity(chunk_size);

        for chunk_start in (0..seq_length).step_by(chunk_size) {
            let chunk_end = (chunk_start + chunk_size).min(seq_length);
            chunk_results.clear();

            if parallel {
                let results = (chunk_start..chunk_end)
                    .into_par_iter()
                    .map_init(
                        || self.scratch(),
                        |scratch, i| self.evaluate_position(buffer, i, scratch),
                    )
                    .collect::<Result<Vec<WindowResult>>>()?;
                chunk_results.extend(results);
            } else {
                for i in chunk_start..chunk_end {
                    chunk_results.push(self.evaluate_position(buffer, i, &mut serial_scratch)?);
                }
            }

            sink(&chunk_results)?;

            if chunk_end % 10000 == 0 || chunk_end == seq_length {
                info!("Processed {}/{} positions", chunk_end, seq_length);
            } else {
                debug!(chunk_start, chunk_end, "chunk done");
            }
        }
        Ok(())
    }

    pub fn scan(&self, sequence: &Sequence) -> Result<Vec<WindowResult>> {
        self.collect(sequence, false)
    }

    pub fn scan_parallel(&self, sequence: &Sequence) -> Result<Vec<WindowResult>> {
        self.collect(sequence, true)
    }

    fn collect(&self, sequence: &Sequence, parallel: bool) -> Result<Vec<WindowResult>> {
        let mut results = Vec::with_capacity(sequence.len());
        self.scan_chunks(sequence, parallel, |chunk| {
            results.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(results)
    }
}
