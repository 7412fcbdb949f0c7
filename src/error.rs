// Error types for configuration validation and simulation failures
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

/// Reasons a configuration value is rejected.
///
/// Every value must be finite. Setters that fail with one of these errors leave the previous
/// value in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ConfigError {
    /// The integration step must be positive and finite
    #[cfg_attr(feature = "std", error("Time step must be positive and finite"))]
    InvalidTimeStep,

    /// The simulation horizon must be positive and finite, and its steps must fit in memory
    #[cfg_attr(feature = "std", error("Horizon must be positive, finite and short enough to store"))]
    InvalidHorizon,

    /// The pendulum mass must be positive and finite
    #[cfg_attr(feature = "std", error("Mass must be positive and finite"))]
    InvalidMass,

    /// The pivot-to-mass distance must be positive and finite
    #[cfg_attr(feature = "std", error("Pendulum length must be positive and finite"))]
    InvalidLength,

    /// The viscous damping coefficient must be non-negative and finite
    #[cfg_attr(feature = "std", error("Damping must be non-negative and finite"))]
    InvalidDamping,

    /// Gravitational acceleration must be non-negative and finite
    #[cfg_attr(feature = "std", error("Gravity must be non-negative and finite"))]
    InvalidGravity,

    /// The torque saturation bound must be positive and finite
    #[cfg_attr(feature = "std", error("Output limit must be positive and finite"))]
    InvalidOutputLimit,

    /// Proportional gain must be non-negative and finite
    #[cfg_attr(feature = "std", error("Proportional gain must be non-negative and finite"))]
    InvalidProportionalGain,

    /// Integral gain must be non-negative and finite
    #[cfg_attr(feature = "std", error("Integral gain must be non-negative and finite"))]
    InvalidIntegralGain,

    /// Derivative gain must be non-negative and finite
    #[cfg_attr(feature = "std", error("Derivative gain must be non-negative and finite"))]
    InvalidDerivativeGain,

    /// Reference parameters must be finite, and a sine frequency non-negative
    #[cfg_attr(feature = "std", error("Reference parameters must be finite"))]
    InvalidReference,

    /// Disturbance magnitude and onset time must be finite
    #[cfg_attr(feature = "std", error("Disturbance parameters must be finite"))]
    InvalidDisturbance,

    /// The initial angle and rate must be finite
    #[cfg_attr(feature = "std", error("Initial plant state must be finite"))]
    InvalidInitialState,

    /// Elapsed time handed to a realtime tick must be non-negative and finite
    #[cfg_attr(feature = "std", error("Elapsed time must be non-negative and finite"))]
    InvalidElapsedTime,

    /// The realtime history must hold at least one sample
    #[cfg_attr(feature = "std", error("History capacity must be at least one"))]
    InvalidHistoryCapacity,

    /// A realtime tick must be allowed at least one integration step
    #[cfg_attr(feature = "std", error("Sub-step limit must be at least one"))]
    InvalidSubstepLimit,
}

/// Errors surfaced by the simulation entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum SimulationError {
    /// The configuration was rejected before any step ran
    #[cfg_attr(feature = "std", error("Invalid configuration: {0}"))]
    InvalidConfiguration(ConfigError),

    /// A state or output became NaN or infinite at the given step index
    #[cfg_attr(feature = "std", error("Non-finite value produced at step {index}"))]
    NumericAnomaly {
        /// Zero-based index of the offending step
        index: usize,
    },
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::InvalidConfiguration(err)
    }
}
