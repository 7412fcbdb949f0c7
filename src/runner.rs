// Batch and realtime drivers for the closed-loop pendulum
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use alloc::vec::Vec;

use num_traits::{Float, FloatConst};

use crate::angle::lit;
use crate::error::{ConfigError, SimulationError};
use crate::pid::{ControllerGains, ControllerState, PidLoop, StepResult};
use crate::plant::{PlantParameters, PlantState};
use crate::signal::{DisturbanceSpec, ReferenceSpec};
use crate::trajectory::{History, Trajectory};

/// Everything needed to run a simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig<F> {
    gains: ControllerGains<F>,
    plant: PlantParameters<F>,
    reference: ReferenceSpec<F>,
    disturbance: DisturbanceSpec<F>,

    /// Length of a batch run, s.
    /// Defaults to 8s.
    horizon: F,

    /// Plant state at t = 0 and after every reset.
    /// Defaults to θ = 0.05 rad at rest.
    initial_state: PlantState<F>,

    /// Whether a realtime runner zeroes the integral when kp, ki or kd change.
    /// Defaults to true.
    reset_integral_on_gain_change: bool,

    /// Most integration steps a single realtime tick may take.
    /// Defaults to 25, i.e. 50ms of simulated time at the default step.
    max_substeps: usize,

    /// Number of recent steps a realtime runner keeps.
    /// Defaults to 500.
    history_capacity: usize,
}

impl<F: Float + FloatConst> Default for SimulationConfig<F> {
    fn default() -> Self {
        SimulationConfig {
            gains: ControllerGains::default(),
            plant: PlantParameters::default(),
            reference: ReferenceSpec::default(),
            disturbance: DisturbanceSpec::default(),
            horizon: lit(8.0),
            initial_state: PlantState::default(),
            reset_integral_on_gain_change: true,
            max_substeps: 25,
            history_capacity: History::<F>::DEFAULT_CAPACITY,
        }
    }
}

impl<F: Float + FloatConst> SimulationConfig<F> {
    /// A batch run never has fewer steps than this, however short the horizon.
    pub const MIN_STEPS: usize = 10;

    /// Returns the controller gains, limit and step size.
    pub fn gains(&self) -> &ControllerGains<F> {
        &self.gains
    }

    /// Returns the physical parameters.
    pub fn plant(&self) -> &PlantParameters<F> {
        &self.plant
    }

    /// Returns the reference signal.
    pub fn reference(&self) -> &ReferenceSpec<F> {
        &self.reference
    }

    /// Returns the disturbance torque.
    pub fn disturbance(&self) -> &DisturbanceSpec<F> {
        &self.disturbance
    }

    /// Returns the batch horizon in seconds.
    pub fn horizon(&self) -> F {
        self.horizon
    }

    /// Returns the state the plant starts from.
    pub fn initial_state(&self) -> PlantState<F> {
        self.initial_state
    }

    /// Returns whether gain changes zero the integral.
    pub fn reset_integral_on_gain_change(&self) -> bool {
        self.reset_integral_on_gain_change
    }

    /// Returns the most steps one realtime tick may take.
    pub fn max_substeps(&self) -> usize {
        self.max_substeps
    }

    /// Returns how many recent steps a realtime runner keeps.
    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Number of steps in a batch run: `max(10, floor(horizon / dt))`.
    ///
    /// The quotient is taken in `F`. With `f64` the defaults give exactly 4000 steps; with `f32`
    /// `8 / 0.002` rounds just below 4000 and the count is 3999.
    pub fn step_count(&self) -> usize {
        (self.horizon / self.gains.sample_time())
            .floor()
            .to_usize()
            .unwrap_or(usize::MAX)
            .max(Self::MIN_STEPS)
    }

    /// Sets the controller gains after validating them.
    pub fn set_gains(&mut self, gains: ControllerGains<F>) -> Result<(), ConfigError> {
        gains.validate()?;
        self.gains = gains;
        Ok(())
    }

    /// Sets the physical parameters after validating them.
    pub fn set_plant(&mut self, plant: PlantParameters<F>) -> Result<(), ConfigError> {
        plant.validate()?;
        self.plant = plant;
        Ok(())
    }

    /// Sets the reference signal after validating it.
    pub fn set_reference(&mut self, reference: ReferenceSpec<F>) -> Result<(), ConfigError> {
        reference.validate()?;
        self.reference = reference;
        Ok(())
    }

    /// Sets the disturbance after validating it.
    pub fn set_disturbance(&mut self, disturbance: DisturbanceSpec<F>) -> Result<(), ConfigError> {
        disturbance.validate()?;
        self.disturbance = disturbance;
        Ok(())
    }

    /// Sets the batch horizon.
    ///
    /// # Errors
    /// - `InvalidHorizon` if the horizon is not positive and finite, or so long that a trajectory
    ///   of that many steps could never be allocated.
    pub fn set_horizon(&mut self, horizon: F) -> Result<(), ConfigError> {
        if horizon <= F::zero() || !horizon.is_finite() {
            return Err(ConfigError::InvalidHorizon);
        }
        let storable = (horizon / self.gains.sample_time())
            .floor()
            .to_usize()
            .and_then(|steps| steps.checked_mul(core::mem::size_of::<StepResult<F>>()))
            .map_or(false, |bytes| bytes <= isize::MAX as usize);
        if !storable {
            return Err(ConfigError::InvalidHorizon);
        }
        self.horizon = horizon;
        Ok(())
    }

    /// Sets the initial plant state; the angle is wrapped into (-π, π].
    pub fn set_initial_state(&mut self, initial_state: PlantState<F>) -> Result<(), ConfigError> {
        if !initial_state.is_finite() {
            return Err(ConfigError::InvalidInitialState);
        }
        self.initial_state = PlantState::new(initial_state.theta, initial_state.omega);
        Ok(())
    }

    /// Sets whether a realtime runner zeroes the integral when kp, ki or kd change.
    pub fn set_reset_integral_on_gain_change(&mut self, reset: bool) {
        self.reset_integral_on_gain_change = reset;
    }

    /// Sets the per-tick step budget; must be at least 1.
    pub fn set_max_substeps(&mut self, max_substeps: usize) -> Result<(), ConfigError> {
        if max_substeps == 0 {
            return Err(ConfigError::InvalidSubstepLimit);
        }
        self.max_substeps = max_substeps;
        Ok(())
    }

    /// Sets the realtime history length; must be at least 1.
    pub fn set_history_capacity(&mut self, capacity: usize) -> Result<(), ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity);
        }
        self.history_capacity = capacity;
        Ok(())
    }

    /// Re-checks every field. [`run`] and [`RealtimeRunner::new`] call this before doing
    /// anything, so configurations built by hand or deserialized are caught too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut scratch = Self::default();
        scratch.set_gains(self.gains)?;
        scratch.set_plant(self.plant)?;
        scratch.set_reference(self.reference)?;
        scratch.set_disturbance(self.disturbance)?;
        scratch.set_horizon(self.horizon)?;
        scratch.set_initial_state(self.initial_state)?;
        scratch.set_max_substeps(self.max_substeps)?;
        scratch.set_history_capacity(self.history_capacity)
    }
}

/// Builder for [`SimulationConfig`]; unset fields keep their defaults.
///
/// ```
/// use pendulum_pid::runner::SimulationConfigBuilder;
/// use pendulum_pid::signal::DisturbanceSpec;
///
/// let config = SimulationConfigBuilder::default()
///     .horizon(5.0)
///     .disturbance(DisturbanceSpec::step(1.5, 3.0))
///     .build()
///     .expect("Invalid configuration");
/// assert_eq!(config.step_count(), 2500);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct SimulationConfigBuilder<F> {
    config: SimulationConfig<F>,
    horizon: Option<F>,
    initial_state: Option<PlantState<F>>,
}

impl<F: Float + FloatConst> Default for SimulationConfigBuilder<F> {
    fn default() -> Self {
        SimulationConfigBuilder {
            config: SimulationConfig::default(),
            horizon: None,
            initial_state: None,
        }
    }
}

impl<F: Float + FloatConst> SimulationConfigBuilder<F> {
    /// Sets the controller gains.
    pub fn gains(mut self, gains: ControllerGains<F>) -> Self {
        self.config.gains = gains;
        self
    }

    /// Sets the physical parameters.
    pub fn plant(mut self, plant: PlantParameters<F>) -> Self {
        self.config.plant = plant;
        self
    }

    /// Sets the reference signal.
    pub fn reference(mut self, reference: ReferenceSpec<F>) -> Self {
        self.config.reference = reference;
        self
    }

    /// Sets the disturbance.
    pub fn disturbance(mut self, disturbance: DisturbanceSpec<F>) -> Self {
        self.config.disturbance = disturbance;
        self
    }

    /// Sets the batch horizon, s.
    pub fn horizon(mut self, horizon: F) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Sets the initial plant state.
    pub fn initial_state(mut self, initial_state: PlantState<F>) -> Self {
        self.initial_state = Some(initial_state);
        self
    }

    /// Sets whether gain changes zero the integral.
    pub fn reset_integral_on_gain_change(mut self, reset: bool) -> Self {
        self.config.reset_integral_on_gain_change = reset;
        self
    }

    /// Sets the per-tick step budget.
    pub fn max_substeps(mut self, max_substeps: usize) -> Self {
        self.config.max_substeps = max_substeps;
        self
    }

    /// Sets the realtime history length.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Validates every field and returns the configuration, or the first error found.
    pub fn build(self) -> Result<SimulationConfig<F>, ConfigError> {
        let mut config = self.config;
        if let Some(horizon) = self.horizon {
            config.set_horizon(horizon)?;
        }
        if let Some(initial_state) = self.initial_state {
            config.set_initial_state(initial_state)?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Runs a complete simulation over the configured horizon.
///
/// The plant starts from the configured initial state and the integral from zero. Step `i`
/// starts at `t = i·dt`, evaluates the reference and disturbance there, and runs one
/// [`PidLoop::step`]. The result always holds exactly
/// [`step_count`](SimulationConfig::step_count) samples, and identical configurations give
/// bit-identical trajectories.
///
/// # Errors
/// - `InvalidConfiguration` if the configuration does not validate; nothing is simulated.
/// - `NumericAnomaly` if any value becomes NaN or infinite; no partial trajectory is returned.
/// - `InvalidConfiguration(InvalidHorizon)` if memory for the trajectory cannot be reserved.
pub fn run<F: Float + FloatConst>(
    config: &SimulationConfig<F>,
) -> Result<Trajectory<F>, SimulationError> {
    config.validate()?;

    let pid = PidLoop::new(config.gains, config.plant);
    let dt = config.gains.sample_time();
    let steps = config.step_count();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        steps,
        dt = dt.to_f64().unwrap_or(f64::NAN),
        "Start batch simulation"
    );

    let mut state = config.initial_state;
    let mut ctx = ControllerState::new();
    let mut samples = Vec::new();
    if samples.try_reserve_exact(steps).is_err() {
        #[cfg(feature = "tracing")]
        tracing::warn!(steps, "Cannot allocate trajectory");
        return Err(ConfigError::InvalidHorizon.into());
    }

    for index in 0..steps {
        let t = lit::<F>(index as f64) * dt;
        let reference = config.reference.evaluate(t);
        let disturbance = config.disturbance.torque_at(t);

        let (result, next_state, next_ctx) = pid.step(t, reference, disturbance, state, ctx);

        if !result.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::warn!(index, "Non-finite value, aborting batch simulation");
            return Err(SimulationError::NumericAnomaly { index });
        }
        state = next_state;
        ctx = next_ctx;
        samples.push(result);
    }

    Ok(Trajectory::from(samples))
}

/// Drives the closed loop incrementally, one animation frame at a time.
///
/// The runner owns the plant and controller state between calls. Each [`tick`](Self::tick)
/// adds the frame's elapsed time to an accumulator and takes as many fixed `dt` steps as have
/// come due, at most `max_substeps`; time beyond that is dropped rather than integrated in one
/// oversized step. A tick shorter than `dt` is a no-op that returns the previous result.
///
/// Step times are `origin + k·dt`, so ticking with exactly `dt` reproduces [`run`]
/// sample for sample.
#[derive(Clone, Debug)]
pub struct RealtimeRunner<F> {
    config: SimulationConfig<F>,
    pid: PidLoop<F>,
    state: PlantState<F>,
    ctx: ControllerState<F>,
    time_origin: F,
    steps_since_origin: usize,
    steps_taken: usize,
    pending: F,
    last: StepResult<F>,
    history: History<F>,
    fault: Option<SimulationError>,
}

impl<F: Float + FloatConst> RealtimeRunner<F> {
    /// Accumulated time within this fraction of a step counts as a full step.
    const STEP_TOLERANCE: f64 = 1e-9;

    /// # Errors
    /// - `InvalidConfiguration` if the configuration does not validate.
    pub fn new(config: SimulationConfig<F>) -> Result<Self, SimulationError> {
        config.validate()?;
        let history = History::with_capacity(config.history_capacity)?;
        let initial = config.initial_state;
        Ok(RealtimeRunner {
            pid: PidLoop::new(config.gains, config.plant),
            state: initial,
            ctx: ControllerState::new(),
            time_origin: F::zero(),
            steps_since_origin: 0,
            steps_taken: 0,
            pending: F::zero(),
            last: StepResult::snapshot(F::zero(), config.reference.evaluate(F::zero()), initial),
            history,
            fault: None,
            config,
        })
    }

    /// Returns the current configuration, including live changes.
    pub fn config(&self) -> &SimulationConfig<F> {
        &self.config
    }

    /// Returns the plant state after the latest step.
    pub fn plant_state(&self) -> PlantState<F> {
        self.state
    }

    /// Returns the controller state after the latest step.
    pub fn controller_state(&self) -> ControllerState<F> {
        self.ctx
    }

    /// Simulated time since the last reset.
    pub fn elapsed(&self) -> F {
        self.time_origin + lit::<F>(self.steps_since_origin as f64) * self.config.gains.sample_time()
    }

    /// Total integration steps since the last reset.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// The most recent step, or the initial snapshot before the first one.
    pub fn last_result(&self) -> &StepResult<F> {
        &self.last
    }

    /// Returns the most recent steps, oldest first.
    pub fn history(&self) -> &History<F> {
        &self.history
    }

    /// Advances the simulation by `elapsed` seconds of wall-clock time.
    ///
    /// Returns the latest step result.
    ///
    /// This does not take exactly one step per call. The number of steps follows the accumulated
    /// wall-clock time instead: a tick shorter than `dt` (including `tick(0.0)`) takes none and
    /// returns the previous result, and a long tick takes several, up to `max_substeps`. A tick
    /// of exactly `dt` takes one step.
    ///
    /// # Errors
    /// - `InvalidConfiguration(InvalidElapsedTime)` if `elapsed` is negative or not finite.
    /// - `NumericAnomaly` if a step produced a non-finite value. The offending step is not
    ///   committed and every further tick fails the same way until [`reset`](Self::reset).
    pub fn tick(&mut self, elapsed: F) -> Result<StepResult<F>, SimulationError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if elapsed < F::zero() || !elapsed.is_finite() {
            return Err(ConfigError::InvalidElapsedTime.into());
        }

        let dt = self.config.gains.sample_time();
        self.pending = self.pending + elapsed;

        let due = (self.pending / dt + lit(Self::STEP_TOLERANCE))
            .floor()
            .to_usize()
            .unwrap_or(usize::MAX);
        let count = due.min(self.config.max_substeps);

        if due > count {
            #[cfg(feature = "tracing")]
            tracing::debug!(due, taken = count, "Tick exceeds sub-step limit, dropping time");
            self.pending = F::zero();
        } else {
            self.pending = (self.pending - lit::<F>(count as f64) * dt).max(F::zero());
        }

        for _ in 0..count {
            self.advance()?;
        }
        Ok(self.last)
    }

    fn advance(&mut self) -> Result<(), SimulationError> {
        let t = self.elapsed();
        let reference = self.config.reference.evaluate(t);
        let disturbance = self.config.disturbance.torque_at(t);
        let (result, state, ctx) = self.pid.step(t, reference, disturbance, self.state, self.ctx);

        if !result.is_finite() {
            let fault = SimulationError::NumericAnomaly {
                index: self.steps_taken,
            };
            #[cfg(feature = "tracing")]
            tracing::warn!(index = self.steps_taken, "Non-finite value, halting realtime simulation");
            self.fault = Some(fault);
            self.pending = F::zero();
            return Err(fault);
        }

        self.state = state;
        self.ctx = ctx;
        self.steps_since_origin += 1;
        self.steps_taken += 1;
        self.last = result;
        self.history.push(result);
        Ok(())
    }

    /// Restores the initial plant state, zeroes the integral and elapsed time, and clears the
    /// history and any numeric fault.
    pub fn reset(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!("Reset realtime simulation");

        let initial = self.config.initial_state;
        self.state = initial;
        self.ctx.reset();
        self.time_origin = F::zero();
        self.steps_since_origin = 0;
        self.steps_taken = 0;
        self.pending = F::zero();
        self.last =
            StepResult::snapshot(F::zero(), self.config.reference.evaluate(F::zero()), initial);
        self.history.clear();
        self.fault = None;
    }

    /// Swaps in new gains without restarting.
    ///
    /// If any of kp, ki, kd changed and `reset_integral_on_gain_change` is set, the integral is
    /// zeroed; otherwise it is kept, clamped to the new output limit. A new step size takes
    /// effect from the current simulated time.
    pub fn set_gains(&mut self, gains: ControllerGains<F>) -> Result<(), ConfigError> {
        gains.validate()?;
        let previous = self.config.gains;

        if previous.sample_time() != gains.sample_time() {
            self.time_origin = self.elapsed();
            self.steps_since_origin = 0;
        }

        if self.config.reset_integral_on_gain_change && previous.gains() != gains.gains() {
            #[cfg(feature = "tracing")]
            tracing::trace!("Gains changed, resetting integral");
            self.ctx.reset();
        }
        self.ctx.clamp_to(gains.output_limit());

        self.config.gains = gains;
        self.pid = PidLoop::new(gains, self.config.plant);
        Ok(())
    }

    /// Swaps in new physical parameters; the plant state carries over.
    pub fn set_plant(&mut self, plant: PlantParameters<F>) -> Result<(), ConfigError> {
        self.config.set_plant(plant)?;
        self.pid = PidLoop::new(self.config.gains, plant);
        Ok(())
    }

    /// Swaps in a new reference signal, evaluated from the current simulated time on.
    pub fn set_reference(&mut self, reference: ReferenceSpec<F>) -> Result<(), ConfigError> {
        self.config.set_reference(reference)
    }

    /// Swaps in a new disturbance, evaluated from the current simulated time on.
    pub fn set_disturbance(&mut self, disturbance: DisturbanceSpec<F>) -> Result<(), ConfigError> {
        self.config.set_disturbance(disturbance)
    }
}
