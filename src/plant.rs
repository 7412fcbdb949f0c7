// Nonlinear rotary pendulum model
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

use crate::angle::{lit, wrap_to_pi};
use crate::error::ConfigError;

#[cfg(feature = "linearization")]
use nalgebra as na;

/// Physical parameters of the pendulum. Immutable for the duration of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlantParameters<F> {
    /// Point mass at the tip, kg. Defaults to 1.0.
    mass: F,

    /// Distance from the pivot to the mass, m. Defaults to 0.5.
    length: F,

    /// Viscous damping at the pivot, N·m·s/rad. Defaults to 0.2.
    damping: F,

    /// Gravitational acceleration, m/s². Defaults to 9.81.
    gravity: F,
}

impl<F: Float> Default for PlantParameters<F> {
    fn default() -> Self {
        PlantParameters {
            mass: F::one(),
            length: lit(0.5),
            damping: lit(0.2),
            gravity: lit(9.81),
        }
    }
}

impl<F: Float> PlantParameters<F> {
    /// Floor on the moment of inertia, keeping the dynamics well defined for tiny pendulums.
    pub const MIN_INERTIA: f64 = 1e-6;

    /// Validates and bundles a complete parameter set.
    pub fn new(mass: F, length: F, damping: F, gravity: F) -> Result<Self, ConfigError> {
        let mut params = Self::default();
        params.set_mass(mass)?;
        params.set_length(length)?;
        params.set_damping(damping)?;
        params.set_gravity(gravity)?;
        Ok(params)
    }

    /// Returns the pendulum mass, kg.
    pub fn mass(&self) -> F {
        self.mass
    }

    /// Returns the rod length, m.
    pub fn length(&self) -> F {
        self.length
    }

    /// Returns the viscous damping coefficient, N·m·s/rad.
    pub fn damping(&self) -> F {
        self.damping
    }

    /// Returns the gravitational acceleration, m/s².
    pub fn gravity(&self) -> F {
        self.gravity
    }

    /// Moment of inertia of a point mass about the pivot, `max(1e-6, m·l²)`.
    pub fn inertia(&self) -> F {
        (self.mass * self.length * self.length).max(lit(Self::MIN_INERTIA))
    }

    /// Sets the mass. Fails if it is not positive and finite.
    pub fn set_mass(&mut self, mass: F) -> Result<(), ConfigError> {
        if mass <= F::zero() || !mass.is_finite() {
            return Err(ConfigError::InvalidMass);
        }
        self.mass = mass;
        Ok(())
    }

    /// Sets the pivot-to-mass distance. Fails if it is not positive and finite.
    pub fn set_length(&mut self, length: F) -> Result<(), ConfigError> {
        if length <= F::zero() || !length.is_finite() {
            return Err(ConfigError::InvalidLength);
        }
        self.length = length;
        Ok(())
    }

    /// Sets the damping coefficient. Zero is allowed.
    pub fn set_damping(&mut self, damping: F) -> Result<(), ConfigError> {
        if damping < F::zero() || !damping.is_finite() {
            return Err(ConfigError::InvalidDamping);
        }
        self.damping = damping;
        Ok(())
    }

    /// Sets gravitational acceleration. Zero is allowed and removes the restoring torque.
    pub fn set_gravity(&mut self, gravity: F) -> Result<(), ConfigError> {
        if gravity < F::zero() || !gravity.is_finite() {
            return Err(ConfigError::InvalidGravity);
        }
        self.gravity = gravity;
        Ok(())
    }

    /// Re-checks every field, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.mass, self.length, self.damping, self.gravity).map(|_| ())
    }
}

/// Builder for [`PlantParameters`]; unset fields keep their defaults.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlantParametersBuilder<F> {
    mass: Option<F>,
    length: Option<F>,
    damping: Option<F>,
    gravity: Option<F>,
}

impl<F: Float> PlantParametersBuilder<F> {
    /// Sets the mass.
    pub fn mass(mut self, mass: F) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Sets the length.
    pub fn length(mut self, length: F) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the damping coefficient.
    pub fn damping(mut self, damping: F) -> Self {
        self.damping = Some(damping);
        self
    }

    /// Sets the gravitational acceleration.
    pub fn gravity(mut self, gravity: F) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Validates every field and returns the parameters, or the first error found.
    pub fn build(self) -> Result<PlantParameters<F>, ConfigError> {
        let defaults = PlantParameters::default();
        PlantParameters::new(
            self.mass.unwrap_or(defaults.mass),
            self.length.unwrap_or(defaults.length),
            self.damping.unwrap_or(defaults.damping),
            self.gravity.unwrap_or(defaults.gravity),
        )
    }
}

/// Angle and angular rate of the pendulum, owned by whoever drives the simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlantState<F> {
    /// Angle from the θ = 0 equilibrium, rad, kept in (-π, π]
    pub theta: F,
    /// Angular rate, rad/s
    pub omega: F,
}

impl<F: Float + FloatConst> PlantState<F> {
    /// Creates a state, wrapping `theta` into (-π, π].
    pub fn new(theta: F, omega: F) -> Self {
        Self {
            theta: wrap_to_pi(theta),
            omega,
        }
    }

    /// The pendulum at rest at θ = 0.
    pub fn at_rest() -> Self {
        Self {
            theta: F::zero(),
            omega: F::zero(),
        }
    }

    /// Whether both angle and rate are finite.
    pub fn is_finite(&self) -> bool {
        self.theta.is_finite() && self.omega.is_finite()
    }
}

/// A small initial deviation, 0.05 rad at rest, so that something happens from the start.
impl<F: Float + FloatConst> Default for PlantState<F> {
    fn default() -> Self {
        Self::new(lit(0.05), F::zero())
    }
}

/// The pendulum dynamics
///
/// ```text
/// I·θ'' = u + d − c·ω − m·g·l·sin(θ)
/// ```
///
/// with `u` the controller torque and `d` an external disturbance torque.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PendulumPlant<F> {
    params: PlantParameters<F>,
    inertia: F,
}

impl<F: Float + FloatConst> PendulumPlant<F> {
    /// Precomputes the inertia for `params`.
    pub fn new(params: PlantParameters<F>) -> Self {
        Self {
            inertia: params.inertia(),
            params,
        }
    }

    /// Returns the physical parameters.
    pub fn params(&self) -> &PlantParameters<F> {
        &self.params
    }

    /// Returns the moment of inertia, kg·m².
    pub fn inertia(&self) -> F {
        self.inertia
    }

    /// Angular acceleration under applied torque `u` and disturbance torque `d`.
    pub fn acceleration(&self, u: F, d: F, theta: F, omega: F) -> F {
        let p = &self.params;
        let gravity_torque = p.mass * p.gravity * p.length * theta.sin();
        (u + d - p.damping * omega - gravity_torque) / self.inertia
    }

    /// Advances `state` by one fixed Euler step of length `dt`:
    /// `ω ← ω + dt·θ''`, then `θ ← wrap(θ + dt·ω)` with the updated rate.
    pub fn integrate(&self, state: PlantState<F>, u: F, d: F, dt: F) -> PlantState<F> {
        let theta_dd = self.acceleration(u, d, state.theta, state.omega);
        let omega = state.omega + dt * theta_dd;
        let theta = wrap_to_pi(state.theta + dt * omega);
        PlantState { theta, omega }
    }
}

#[cfg(feature = "linearization")]
impl<F: Float + FloatConst + na::Scalar> PendulumPlant<F> {
    /// Evaluates the nonlinear vector field `ẋ = f(x, u)` for `x = [θ, ω]` without disturbance.
    pub fn derivative(&self, x: na::Vector2<F>, u: F) -> na::Vector2<F> {
        na::Vector2::new(x[1], self.acceleration(u, F::zero(), x[0], x[1]))
    }

    /// Linearizes the dynamics about the operating angle `theta0` (at zero rate):
    ///
    /// ```text
    /// ┌     ┐   ┌                        ┐┌   ┐   ┌     ┐
    /// │ δθ' │ = │  0              1      ││δθ │ + │ 0   │ δu
    /// │ δω' │   │ -mgl·cos(θ₀)/I  -c/I   ││δω │   │ 1/I │
    /// └     ┘   └                        ┘└   ┘   └     ┘
    /// ```
    ///
    /// Returns the pair `(A, B)`. Around θ₀ = 0 this is the small-angle pendulum.
    pub fn linearize(&self, theta0: F) -> (na::Matrix2<F>, na::Vector2<F>) {
        let p = &self.params;
        let stiffness = p.mass * p.gravity * p.length * theta0.cos() / self.inertia;
        let mat_a = na::Matrix2::new(
            F::zero(),
            F::one(),
            -stiffness,
            -p.damping / self.inertia,
        );
        let mat_b = na::Vector2::new(F::zero(), F::one() / self.inertia);
        (mat_a, mat_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_parameters() {
        let params = PlantParameters::<f64>::default();
        assert_eq!(params.mass(), 1.0);
        assert_eq!(params.length(), 0.5);
        assert_eq!(params.damping(), 0.2);
        assert_eq!(params.gravity(), 9.81);
        assert_relative_eq!(params.inertia(), 0.25);
    }

    #[test]
    fn test_inertia_floor() {
        let params = PlantParameters::new(1e-6, 1e-3, 0.0, 9.81).unwrap();
        assert_eq!(params.inertia(), 1e-6);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut params = PlantParameters::<f64>::default();
        assert_eq!(params.set_mass(0.0), Err(ConfigError::InvalidMass));
        assert_eq!(params.set_length(-1.0), Err(ConfigError::InvalidLength));
        assert_eq!(params.set_damping(f64::NAN), Err(ConfigError::InvalidDamping));
        assert_eq!(params.set_gravity(f64::INFINITY), Err(ConfigError::InvalidGravity));
        assert_eq!(params, PlantParameters::default());

        assert!(params.set_damping(0.0).is_ok());
        assert!(params.set_gravity(0.0).is_ok());
    }

    #[test]
    fn test_builder_keeps_unset_defaults() {
        let params = PlantParametersBuilder::default().mass(2.0).build().unwrap();
        assert_eq!(params.mass(), 2.0);
        assert_eq!(params.length(), 0.5);
        assert_eq!(
            PlantParametersBuilder::default().length(0.0).build(),
            Err(ConfigError::InvalidLength)
        );
    }

    #[test]
    fn test_acceleration() {
        let plant = PendulumPlant::new(PlantParameters::<f64>::default());

        // At rest at the equilibrium nothing moves
        assert_eq!(plant.acceleration(0.0, 0.0, 0.0, 0.0), 0.0);

        // Pure torque over inertia
        assert_relative_eq!(plant.acceleration(1.0, 0.5, 0.0, 0.0), 6.0);

        // Gravity and damping oppose the motion
        let expected = (-0.2 * 2.0 - 1.0 * 9.81 * 0.5 * 0.3_f64.sin()) / 0.25;
        assert_relative_eq!(plant.acceleration(0.0, 0.0, 0.3, 2.0), expected);
    }

    #[test]
    fn test_integrate_wraps_angle() {
        let params = PlantParametersBuilder::default()
            .gravity(0.0)
            .damping(0.0)
            .build()
            .unwrap();
        let plant = PendulumPlant::new(params);
        let state = PlantState { theta: 3.1, omega: 10.0 };
        let next = plant.integrate(state, 0.0, 0.0, 0.01);
        assert_eq!(next.omega, 10.0);
        assert_relative_eq!(next.theta, 3.2 - 2.0 * core::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_state_constructors() {
        let state = PlantState::<f64>::default();
        assert_eq!(state.theta, 0.05);
        assert_eq!(state.omega, 0.0);
        assert_eq!(PlantState::<f64>::at_rest(), PlantState { theta: 0.0, omega: 0.0 });
        assert_relative_eq!(PlantState::new(7.0, 0.0).theta, 7.0 - 2.0 * core::f64::consts::PI);
        assert!(!PlantState::new(0.0, f64::NAN).is_finite());
    }

    #[cfg(feature = "linearization")]
    #[test]
    fn test_linearization_matches_small_angle_dynamics() {
        let plant = PendulumPlant::new(PlantParameters::<f64>::default());
        let (mat_a, mat_b) = plant.linearize(0.0);

        assert_relative_eq!(mat_a[(1, 0)], -9.81 * 0.5 / 0.25);
        assert_relative_eq!(mat_a[(1, 1)], -0.2 / 0.25);
        assert_relative_eq!(mat_b[1], 4.0);

        let x = na::Vector2::new(1e-3, -2e-3);
        let u = 0.01;
        let linear = mat_a * x + mat_b * u;
        let nonlinear = plant.derivative(x, u);
        assert_relative_eq!(linear, nonlinear, epsilon = 1e-8);
    }
}
