// Reference and disturbance signals evaluated as functions of simulation time
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

use crate::angle::lit;
use crate::error::ConfigError;

/// Desired pendulum angle over time.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceSpec<F> {
    /// A constant angle, rad. Need not be pre-wrapped.
    Step {
        /// Target angle, rad
        angle: F,
    },
    /// `amplitude · sin(2π · frequency · t)`, amplitude in rad and frequency in Hz.
    Sine {
        /// Peak angle, rad
        amplitude: F,
        /// Hz
        frequency: F,
    },
}

impl<F: Float> Default for ReferenceSpec<F> {
    fn default() -> Self {
        ReferenceSpec::Step { angle: F::zero() }
    }
}

impl<F: Float + FloatConst> ReferenceSpec<F> {
    /// Evaluates the reference at elapsed time `t`.
    pub fn evaluate(&self, t: F) -> F {
        match *self {
            ReferenceSpec::Step { angle } => angle,
            ReferenceSpec::Sine {
                amplitude,
                frequency,
            } => amplitude * (lit::<F>(2.0) * F::PI() * frequency * t).sin(),
        }
    }

    /// Checks that every parameter is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = match *self {
            ReferenceSpec::Step { angle } => angle.is_finite(),
            ReferenceSpec::Sine {
                amplitude,
                frequency,
            } => amplitude.is_finite() && frequency.is_finite() && frequency >= F::zero(),
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidReference)
        }
    }
}

/// A step of external torque switched on at `onset_time`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisturbanceSpec<F> {
    /// Whether the torque is applied at all.
    pub enabled: bool,
    /// Torque, N·m. May be negative.
    pub magnitude: F,
    /// Time from which the torque acts, s.
    pub onset_time: F,
}

/// Disabled, but primed with a 1.5 N·m kick at t = 3 s so that toggling `enabled` gives the
/// classic disturbance-rejection demonstration.
impl<F: Float> Default for DisturbanceSpec<F> {
    fn default() -> Self {
        DisturbanceSpec {
            enabled: false,
            magnitude: lit(1.5),
            onset_time: lit(3.0),
        }
    }
}

impl<F: Float> DisturbanceSpec<F> {
    /// An enabled disturbance of `magnitude` acting from `onset_time` on.
    pub fn step(magnitude: F, onset_time: F) -> Self {
        DisturbanceSpec {
            enabled: true,
            magnitude,
            onset_time,
        }
    }

    /// No disturbance at all.
    pub fn none() -> Self {
        DisturbanceSpec {
            enabled: false,
            magnitude: F::zero(),
            onset_time: F::zero(),
        }
    }

    /// Disturbance torque at time `t`.
    pub fn torque_at(&self, t: F) -> F {
        if self.enabled && t >= self.onset_time {
            self.magnitude
        } else {
            F::zero()
        }
    }

    /// Checks that every parameter is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.magnitude.is_finite() && self.onset_time.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::InvalidDisturbance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_step_reference_is_constant() {
        let reference = ReferenceSpec::Step { angle: 0.3 };
        assert_eq!(reference.evaluate(0.0), 0.3);
        assert_eq!(reference.evaluate(123.0), 0.3);
    }

    #[test]
    fn test_sine_reference() {
        let reference = ReferenceSpec::Sine {
            amplitude: 0.15,
            frequency: 0.5,
        };
        assert_eq!(reference.evaluate(0.0), 0.0);
        // Quarter period of a 0.5 Hz sine
        assert_abs_diff_eq!(reference.evaluate(0.5), 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(reference.evaluate(1.5), -0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_validation() {
        assert!(ReferenceSpec::<f64>::default().validate().is_ok());
        assert_eq!(
            ReferenceSpec::Step { angle: f64::NAN }.validate(),
            Err(ConfigError::InvalidReference)
        );
        assert_eq!(
            ReferenceSpec::Sine {
                amplitude: 0.1,
                frequency: -1.0
            }
            .validate(),
            Err(ConfigError::InvalidReference)
        );
    }

    #[test]
    fn test_disturbance_onset() {
        let disturbance = DisturbanceSpec::step(1.5, 3.0);
        assert_eq!(disturbance.torque_at(2.999), 0.0);
        assert_eq!(disturbance.torque_at(3.0), 1.5);
        assert_eq!(disturbance.torque_at(10.0), 1.5);

        let disabled = DisturbanceSpec { enabled: false, ..disturbance };
        assert_eq!(disabled.torque_at(10.0), 0.0);
        assert_eq!(DisturbanceSpec::<f64>::none().torque_at(10.0), 0.0);
        assert_eq!(DisturbanceSpec::<f64>::default().torque_at(10.0), 0.0);
    }

    #[test]
    fn test_disturbance_validation() {
        assert!(DisturbanceSpec::step(-4.0, 0.0).validate().is_ok());
        assert_eq!(
            DisturbanceSpec::step(f64::INFINITY, 0.0).validate(),
            Err(ConfigError::InvalidDisturbance)
        );
    }
}
