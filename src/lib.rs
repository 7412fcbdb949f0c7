#![warn(missing_docs)]

//! # Pendulum PID
//!
//! A discrete-time PID controller closed around a nonlinear rotary pendulum, for teaching and
//! demonstrating closed-loop control.
//!
//! The plant obeys
//!
//! ```text
//! I·θ'' = u + d − c·ω − m·g·l·sin(θ),    I = max(1e-6, m·l²)
//! ```
//!
//! and is advanced by fixed-step Euler integration. The controller acts on torque.
//!
//! ## Features
//!
//! - Respects the best practices for PID control of an angle:
//!   - Angle-wrapped error: the controller always drives along the shorter arc.
//!   - Anti reset-windup: the integral accumulator itself is clamped to the actuator limit.
//!   - Derivative-on-measurement (`−kd·ω`) so reference steps cause no derivative kick.
//!   - Saturated output, the only torque ever applied to the plant.
//!
//! - Two ways to drive the loop, sharing the same step function:
//!   - [`runner::run`] computes a complete, deterministic trajectory over a horizon.
//!   - [`runner::RealtimeRunner`] advances one animation frame at a time, sub-stepping large
//!     frame gaps in fixed increments.
//!
//! - `no_std` (with `alloc`) and generic over the scalar type; `f32` and `f64` both work.
//!
//! ## Usage
//!
//! ### Batch run
//!
//! ```rust
//! use pendulum_pid::runner::{run, SimulationConfigBuilder};
//! use pendulum_pid::signal::DisturbanceSpec;
//!
//! let config = SimulationConfigBuilder::<f64>::default()
//!     .disturbance(DisturbanceSpec::step(1.5, 3.0))
//!     .build()
//!     .expect("Invalid configuration");
//!
//! let trajectory = run(&config).expect("Simulation failed");
//! assert_eq!(trajectory.len(), 4000);
//!
//! // Series for an "angle tracking" chart and a "control decomposition" chart
//! let (reference, angle) = (trajectory.references(), trajectory.angles());
//! let (u, p, i, d) = (
//!     trajectory.torques(),
//!     trajectory.p_terms(),
//!     trajectory.i_terms(),
//!     trajectory.d_terms(),
//! );
//! # let _ = (reference, angle, u, p, i, d);
//! ```
//!
//! ### Realtime animation
//!
//! ```rust
//! use pendulum_pid::runner::{RealtimeRunner, SimulationConfig};
//! use pendulum_pid::time::{FrameClock, Millis};
//!
//! let mut runner = RealtimeRunner::new(SimulationConfig::<f64>::default()).unwrap();
//! let mut clock = FrameClock::new();
//!
//! for frame in 0..60u64 {
//!     let elapsed = clock.lap(Millis(frame * 16));
//!     let latest = runner.tick(elapsed.as_secs_f64()).unwrap();
//!     // draw the pendulum at `latest.theta`
//!     # let _ = latest;
//! }
//!
//! // Start over, e.g. after the user changed a slider
//! runner.reset();
//! assert_eq!(runner.elapsed(), 0.0);
//! ```
//!
//! ### Driving the loop yourself
//!
//! [`pid::PidLoop`] holds no mutable state; plant and controller state are passed in and
//! handed back, which makes a single step trivially testable.
//!
//! ```rust
//! use pendulum_pid::pid::{ControllerGains, ControllerState, PidLoop};
//! use pendulum_pid::plant::{PlantParameters, PlantState};
//!
//! let pid = PidLoop::new(ControllerGains::<f64>::default(), PlantParameters::default());
//! let (result, state, ctx) = pid.step(0.0, 0.0, 0.0, PlantState::default(), ControllerState::new());
//! assert!(result.torque.abs() <= pid.gains().output_limit());
//! # let _ = (state, ctx);
//! ```
//!
//! ## License
//!
//! MIT
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// Angle wrapping and saturation helpers.
pub mod angle;

/// Configuration and simulation errors.
pub mod error;

/// The discrete PID loop and its configuration.
pub mod pid;

/// The nonlinear pendulum model.
pub mod plant;

/// Batch and realtime simulation drivers.
pub mod runner;

/// Reference and disturbance signals.
pub mod signal;

/// Frame timing for realtime animation.
pub mod time;

/// Recorded trajectories and realtime history.
pub mod trajectory;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
