//! # Tension Sweep
//!
//! Runs the dispatcher over a grid of static tensions and collects F_td, F_fd
//! and F_pi,d per grid point. Only the low-temperature tension is swept; the
//! high-temperature tension stays as entered.
//!
//! The sweep writes each grid value into the input and puts the dispatcher in
//! [`SolverMode::Loop`]. A guard restores both tensions and the mode when the
//! sweep returns, whether it completed, failed or was cancelled.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::ConductorInput;
use super::pipeline::Dispatcher;
use crate::errors::{CalcError, CalcResult};
use crate::solver::SolverMode;
use crate::units::{Kilonewtons, Newtons};

/// Largest number of grid points a sweep accepts.
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Tension grid in kN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 35.0,
            step: 0.01,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("min", self.min), ("max", self.max), ("step", self.step)] {
            if !value.is_finite() {
                return Err(CalcError::invalid_input(field, value.to_string(), "must be finite"));
            }
        }
        if self.step <= 0.0 {
            return Err(CalcError::invalid_input(
                "step",
                self.step.to_string(),
                "step must be greater than zero",
            ));
        }
        if self.max < self.min {
            return Err(CalcError::invalid_input(
                "max",
                self.max.to_string(),
                format!("max must not be below min ({})", self.min),
            ));
        }
        self.grid_points().map(|_| ())
    }

    /// Number of grid points, `round((max - min) / step) + 1`.
    ///
    /// # Errors
    /// `InvalidInput` on `step` when the grid exceeds [`MAX_SWEEP_POINTS`].
    pub fn grid_points(&self) -> CalcResult<usize> {
        let intervals = ((self.max - self.min) / self.step).round();
        let in_range = intervals.is_finite() && intervals >= 0.0;
        let points = if in_range && intervals < MAX_SWEEP_POINTS as f64 {
            (intervals as usize).checked_add(1)
        } else {
            None
        };
        points.filter(|p| *p <= MAX_SWEEP_POINTS).ok_or_else(|| {
            CalcError::invalid_input(
                "step",
                self.step.to_string(),
                format!("grid would exceed {} points", MAX_SWEEP_POINTS),
            )
        })
    }

    /// Tension of grid point `i` in kN
    pub fn value_at(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step
    }
}

/// One grid point, forces in kN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub f_st: f64,
    pub f_td: Option<f64>,
    pub f_fd: Option<f64>,
    pub f_pi_d: Option<f64>,
}

/// Restores the swept fields and the solver mode on drop.
struct SweepGuard<'a> {
    input: &'a mut ConductorInput,
    dispatcher: &'a mut Dispatcher,
    f_st_low: f64,
    f_st_high: f64,
    mode: SolverMode,
}

impl<'a> SweepGuard<'a> {
    fn new(input: &'a mut ConductorInput, dispatcher: &'a mut Dispatcher) -> Self {
        let f_st_low = input.f_st_low;
        let f_st_high = input.f_st_high;
        let mode = dispatcher.mode();
        dispatcher.set_mode(SolverMode::Loop);
        Self {
            input,
            dispatcher,
            f_st_low,
            f_st_high,
            mode,
        }
    }
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.input.f_st_low = self.f_st_low;
        self.input.f_st_high = self.f_st_high;
        self.dispatcher.set_mode(self.mode);
    }
}

/// Sweep the low-temperature static tension over `config`.
///
/// `cancel` is checked before every grid point; once it reports `true` the
/// sweep stops with [`CalcError::Cancelled`] carrying `run_id`.
///
/// # Errors
/// - `InvalidInput` for a bad grid, before anything is touched
/// - any error of the dispatcher at a grid point
/// - `Cancelled` when superseded
pub fn run_sweep(
    input: &mut ConductorInput,
    dispatcher: &mut Dispatcher,
    config: SweepConfig,
    mut cancel: impl FnMut() -> bool,
    run_id: u64,
) -> CalcResult<Vec<SweepRow>> {
    config.validate()?;
    let points = config.grid_points()?;
    info!(run_id, points, min = config.min, max = config.max, "starting tension sweep");

    let guard = SweepGuard::new(input, dispatcher);
    let mut rows = Vec::with_capacity(points);

    for i in 0..points {
        if cancel() {
            debug!(run_id, completed = rows.len(), "sweep superseded");
            return Err(CalcError::Cancelled { run_id });
        }

        let value = config.value_at(i);
        guard.input.f_st_low = Newtons::from(Kilonewtons(value)).value();
        let results = guard.dispatcher.calculate(&*guard.input)?;

        rows.push(SweepRow {
            f_st: value,
            f_td: results.low.f_td,
            f_fd: results.low.f_fd,
            f_pi_d: results.low.f_pi_d,
        });
    }

    info!(run_id, rows = rows.len(), "tension sweep finished");
    Ok(rows)
}
