// Discrete PID control loop closed around the pendulum
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

use num_traits::{Float, FloatConst};

use crate::angle::{clamp_symmetric, lit, wrap_to_pi};
use crate::error::ConfigError;
use crate::plant::{PendulumPlant, PlantParameters, PlantState};

/// Gains, actuator limit and step size of the controller. Immutable for the duration of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerGains<F> {
    /// Proportional gain, N·m/rad.
    /// Defaults to 20.0.
    kp: F,

    /// Integral gain, N·m/(rad·s).
    /// Defaults to 5.0.
    ki: F,

    /// Derivative gain, applied to the measured rate, N·m·s/rad.
    /// Defaults to 2.0.
    kd: F,

    /// Symmetric torque saturation |u| ≤ u_max, N·m. Also bounds the integral accumulator.
    /// Defaults to 8.0.
    output_limit: F,

    /// Control and integration step, s.
    /// Defaults to 2ms.
    sample_time: F,
}

impl<F: Float> Default for ControllerGains<F> {
    fn default() -> Self {
        ControllerGains {
            kp: lit(20.0),
            ki: lit(5.0),
            kd: lit(2.0),
            output_limit: lit(8.0),
            sample_time: lit(0.002),
        }
    }
}

impl<F: Float> ControllerGains<F> {
    /// Returns the proportional gain.
    pub fn kp(&self) -> F {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> F {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> F {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (F, F, F) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns the torque saturation bound `u_max`.
    pub fn output_limit(&self) -> F {
        self.output_limit
    }

    /// Returns the step size `dt` in seconds.
    pub fn sample_time(&self) -> F {
        self.sample_time
    }

    /// Sets the proportional gain.
    ///
    /// Unlike a general-purpose controller, a zero gain is accepted: switching P off is a
    /// legitimate thing to demonstrate.
    ///
    /// # Errors
    /// - `InvalidProportionalGain` if the gain is negative or not finite. The gain is unchanged.
    pub fn set_kp(&mut self, kp: F) -> Result<(), ConfigError> {
        if kp < F::zero() || !kp.is_finite() {
            return Err(ConfigError::InvalidProportionalGain);
        }
        self.kp = kp;
        Ok(())
    }

    /// Sets the integral gain.
    ///
    /// # Errors
    /// - `InvalidIntegralGain` if the gain is negative or not finite. The gain is unchanged.
    pub fn set_ki(&mut self, ki: F) -> Result<(), ConfigError> {
        if ki < F::zero() || !ki.is_finite() {
            return Err(ConfigError::InvalidIntegralGain);
        }
        self.ki = ki;
        Ok(())
    }

    /// Sets the derivative gain.
    ///
    /// # Errors
    /// - `InvalidDerivativeGain` if the gain is negative or not finite. The gain is unchanged.
    pub fn set_kd(&mut self, kd: F) -> Result<(), ConfigError> {
        if kd < F::zero() || !kd.is_finite() {
            return Err(ConfigError::InvalidDerivativeGain);
        }
        self.kd = kd;
        Ok(())
    }

    /// Convenience method to set the proportional, integral, and derivative gains together.
    /// Stops at the first invalid gain.
    pub fn set_gains(&mut self, kp: F, ki: F, kd: F) -> Result<(), ConfigError> {
        self.set_kp(kp)?;
        self.set_ki(ki)?;
        self.set_kd(kd)
    }

    /// Sets the symmetric torque limit.
    ///
    /// # Errors
    /// - `InvalidOutputLimit` if the limit is not positive and finite.
    pub fn set_output_limit(&mut self, output_limit: F) -> Result<(), ConfigError> {
        if output_limit <= F::zero() || !output_limit.is_finite() {
            return Err(ConfigError::InvalidOutputLimit);
        }
        self.output_limit = output_limit;
        Ok(())
    }

    /// Sets the step size.
    ///
    /// # Errors
    /// - `InvalidTimeStep` if the step is not positive and finite.
    pub fn set_sample_time(&mut self, sample_time: F) -> Result<(), ConfigError> {
        if sample_time <= F::zero() || !sample_time.is_finite() {
            return Err(ConfigError::InvalidTimeStep);
        }
        self.sample_time = sample_time;
        Ok(())
    }

    /// Re-checks every field, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut scratch = Self::default();
        scratch.set_gains(self.kp, self.ki, self.kd)?;
        scratch.set_output_limit(self.output_limit)?;
        scratch.set_sample_time(self.sample_time)
    }
}

/// Builder for [`ControllerGains`]; unset fields keep their defaults.
///
/// ```
/// use pendulum_pid::pid::ControllerGainsBuilder;
///
/// let gains = ControllerGainsBuilder::default()
///     .kp(20.0)
///     .ki(0.0)
///     .output_limit(4.0)
///     .build()
///     .expect("Invalid gains");
/// assert_eq!(gains.kd(), 2.0);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct ControllerGainsBuilder<F> {
    kp: Option<F>,
    ki: Option<F>,
    kd: Option<F>,
    output_limit: Option<F>,
    sample_time: Option<F>,
}

impl<F: Float> ControllerGainsBuilder<F> {
    /// Sets the proportional gain.
    pub fn kp(mut self, kp: F) -> Self {
        self.kp = Some(kp);
        self
    }

    /// Sets the integral gain.
    pub fn ki(mut self, ki: F) -> Self {
        self.ki = Some(ki);
        self
    }

    /// Sets the derivative gain.
    pub fn kd(mut self, kd: F) -> Self {
        self.kd = Some(kd);
        self
    }

    /// Sets the torque limit `u_max`.
    pub fn output_limit(mut self, output_limit: F) -> Self {
        self.output_limit = Some(output_limit);
        self
    }

    /// Sets the step size `dt`.
    pub fn sample_time(mut self, sample_time: F) -> Self {
        self.sample_time = Some(sample_time);
        self
    }

    /// Validates every field and returns the gains, or the first error found.
    pub fn build(self) -> Result<ControllerGains<F>, ConfigError> {
        let mut gains = ControllerGains::default();
        if let Some(kp) = self.kp {
            gains.set_kp(kp)?;
        }
        if let Some(ki) = self.ki {
            gains.set_ki(ki)?;
        }
        if let Some(kd) = self.kd {
            gains.set_kd(kd)?;
        }
        if let Some(output_limit) = self.output_limit {
            gains.set_output_limit(output_limit)?;
        }
        if let Some(sample_time) = self.sample_time {
            gains.set_sample_time(sample_time)?;
        }
        Ok(gains)
    }
}

/// Mutable controller memory: the integral accumulator, in torque units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerState<F> {
    integral: F,
}

impl<F: Float> ControllerState<F> {
    /// A fresh accumulator.
    pub fn new() -> Self {
        Self {
            integral: F::zero(),
        }
    }

    /// Current value of the accumulator, always within [-u_max, u_max].
    pub fn integral(&self) -> F {
        self.integral
    }

    /// Zeroes the accumulator.
    pub fn reset(&mut self) {
        self.integral = F::zero();
    }

    /// Re-applies the anti-windup bound, used after the torque limit shrinks.
    pub(crate) fn clamp_to(&mut self, output_limit: F) {
        self.integral = clamp_symmetric(self.integral, output_limit);
    }
}

/// Everything one control and integration step produced.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepResult<F> {
    /// Time at the start of the step, s
    pub t: F,
    /// Reference angle evaluated at `t`, as given (not wrapped)
    pub reference: F,
    /// Angle after the step
    pub theta: F,
    /// Rate after the step
    pub omega: F,
    /// Saturated torque applied during the step
    pub torque: F,
    /// Proportional contribution `kp·e`
    pub p_term: F,
    /// The clamped integral accumulator
    pub i_term: F,
    /// Derivative contribution `−kd·ω`
    pub d_term: F,
    /// External torque applied during the step
    pub disturbance: F,
}

impl<F: Float> StepResult<F> {
    /// A zero-torque snapshot of `state` at time `t`, used before any step has run.
    pub fn snapshot(t: F, reference: F, state: PlantState<F>) -> Self {
        StepResult {
            t,
            reference,
            theta: state.theta,
            omega: state.omega,
            torque: F::zero(),
            p_term: F::zero(),
            i_term: F::zero(),
            d_term: F::zero(),
            disturbance: F::zero(),
        }
    }

    /// Whether a disturbance torque acted during this step.
    pub fn disturbance_active(&self) -> bool {
        self.disturbance != F::zero()
    }

    /// Whether every recorded value is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.t,
            self.reference,
            self.theta,
            self.omega,
            self.torque,
            self.p_term,
            self.i_term,
            self.d_term,
            self.disturbance,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A PID controller closed around the pendulum, advancing both by one fixed step at a time.
///
/// Like a functional controller, `PidLoop` holds only immutable configuration; the plant and
/// controller states are passed in and handed back, so a single loop can drive any number of
/// independent simulations.
///
/// Each step:
/// 1. wraps the error `reference − θ` into (-π, π] so the shorter arc is taken;
/// 2. clamps the integral accumulator to ±u_max *before* it is summed (integral clamping
///    anti-windup);
/// 3. takes the derivative on the measurement, `−kd·ω`, so reference steps cause no kick;
/// 4. saturates the sum to ±u_max and applies it, with the disturbance, for one Euler step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidLoop<F> {
    gains: ControllerGains<F>,
    plant: PendulumPlant<F>,
}

impl<F: Float + FloatConst> PidLoop<F> {
    /// Closes the loop around a pendulum with the given parameters.
    pub fn new(gains: ControllerGains<F>, params: PlantParameters<F>) -> Self {
        PidLoop {
            gains,
            plant: PendulumPlant::new(params),
        }
    }

    /// Returns the controller gains.
    pub fn gains(&self) -> &ControllerGains<F> {
        &self.gains
    }

    /// Returns the controlled plant.
    pub fn plant(&self) -> &PendulumPlant<F> {
        &self.plant
    }

    /// Runs one control and integration step starting at time `t`.
    ///
    /// `reference` need not be wrapped; `disturbance` is the external torque for this instant.
    /// Returns the step record together with the advanced plant and controller states.
    pub fn step(
        &self,
        t: F,
        reference: F,
        disturbance: F,
        state: PlantState<F>,
        mut ctx: ControllerState<F>,
    ) -> (StepResult<F>, PlantState<F>, ControllerState<F>) {
        let ControllerGains {
            kp,
            ki,
            kd,
            output_limit,
            sample_time: dt,
        } = self.gains;

        let error = wrap_to_pi(reference - state.theta);

        let p_term = kp * error;

        // Clamp the accumulator itself, not just the output, so it cannot wind up
        ctx.integral = clamp_symmetric(ctx.integral + ki * error * dt, output_limit);

        // Derivative on measurement: d(θ)/dt is ω
        let d_term = kd * -state.omega;

        let torque = clamp_symmetric(p_term + ctx.integral + d_term, output_limit);

        let next = self.plant.integrate(state, torque, disturbance, dt);

        let result = StepResult {
            t,
            reference,
            theta: next.theta,
            omega: next.omega,
            torque,
            p_term,
            i_term: ctx.integral,
            d_term,
            disturbance,
        };
        (result, next, ctx)
    }
}
