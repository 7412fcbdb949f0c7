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

mod fixtures;
use fixtures::scenarios;

use pendulum_pid::error::ConfigError;
use pendulum_pid::pid::{ControllerGains, ControllerGainsBuilder, ControllerState, PidLoop};
use pendulum_pid::plant::{PlantParameters, PlantState};

mod test_controller_gains {

    use core::f64;

    use super::*;

    const NEW_KP: f64 = 10.0;
    // Negative and non-finite kp are invalid
    const INVALID_KP_VALUES: &[f64; 3] = &[-1.0, f64::INFINITY, f64::NAN];

    #[test]
    fn test_get_and_set_kp() {
        let mut gains = ControllerGains::<f64>::default();

        // Default kp is 20
        assert_eq!(gains.kp(), 20.0);

        assert!(gains.set_kp(NEW_KP).is_ok());
        assert_eq!(gains.kp(), NEW_KP);

        for it in INVALID_KP_VALUES {
            assert_eq!(gains.set_kp(*it), Err(ConfigError::InvalidProportionalGain));

            // Failing to set kp should not change the value
            assert_eq!(gains.kp(), NEW_KP);
        }

        // Zero kp is valid, P action can be switched off
        assert!(gains.set_kp(0.0).is_ok());
        assert_eq!(gains.kp(), 0.0);
    }

    const NEW_KI: f64 = 12.5;
    const INVALID_KI_VALUES: &[f64; 3] = &[-1.0, f64::INFINITY, f64::NAN];

    #[test]
    fn test_get_and_set_ki() {
        let mut gains = ControllerGains::<f64>::default();

        // Default ki is 5
        assert_eq!(gains.ki(), 5.0);

        assert!(gains.set_ki(NEW_KI).is_ok());
        assert_eq!(gains.ki(), NEW_KI);

        // Changing the step size does not rescale ki
        assert!(gains.set_sample_time(0.01).is_ok());
        assert_eq!(gains.ki(), NEW_KI);

        for it in INVALID_KI_VALUES {
            assert_eq!(gains.set_ki(*it), Err(ConfigError::InvalidIntegralGain));
            assert_eq!(gains.ki(), NEW_KI);
        }

        assert!(gains.set_ki(0.0).is_ok());
        assert_eq!(gains.ki(), 0.0);
    }

    const NEW_KD: f64 = 0.5;
    const INVALID_KD_VALUES: &[f64; 3] = &[-1.0, f64::INFINITY, f64::NAN];

    #[test]
    fn test_get_and_set_kd() {
        let mut gains = ControllerGains::<f64>::default();

        // Default kd is 2
        assert_eq!(gains.kd(), 2.0);

        assert!(gains.set_kd(NEW_KD).is_ok());
        assert_eq!(gains.kd(), NEW_KD);

        for it in INVALID_KD_VALUES {
            assert_eq!(gains.set_kd(*it), Err(ConfigError::InvalidDerivativeGain));
            assert_eq!(gains.kd(), NEW_KD);
        }
    }

    #[test]
    fn test_set_gains_stops_at_first_invalid() {
        let mut gains = ControllerGains::<f64>::default();
        assert!(gains.set_gains(1.0, 2.0, 3.0).is_ok());
        assert_eq!(gains.gains(), (1.0, 2.0, 3.0));

        assert_eq!(
            gains.set_gains(4.0, -1.0, 6.0),
            Err(ConfigError::InvalidIntegralGain)
        );
        assert_eq!(gains.gains(), (4.0, 2.0, 3.0));
    }

    // Zero, negative and non-finite limits and step sizes are invalid
    const INVALID_POSITIVE_VALUES: &[f64; 4] = &[0.0, -1.0, f64::INFINITY, f64::NAN];

    #[test]
    fn test_get_and_set_output_limit() {
        let mut gains = ControllerGains::<f64>::default();
        assert_eq!(gains.output_limit(), 8.0);

        assert!(gains.set_output_limit(0.5).is_ok());
        assert_eq!(gains.output_limit(), 0.5);

        for it in INVALID_POSITIVE_VALUES {
            assert_eq!(gains.set_output_limit(*it), Err(ConfigError::InvalidOutputLimit));
            assert_eq!(gains.output_limit(), 0.5);
        }
    }

    #[test]
    fn test_get_and_set_sample_time() {
        let mut gains = ControllerGains::<f64>::default();
        assert_eq!(gains.sample_time(), 0.002);

        assert!(gains.set_sample_time(0.01).is_ok());
        assert_eq!(gains.sample_time(), 0.01);

        for it in INVALID_POSITIVE_VALUES {
            assert_eq!(gains.set_sample_time(*it), Err(ConfigError::InvalidTimeStep));
            assert_eq!(gains.sample_time(), 0.01);
        }
    }

    #[test]
    fn test_builder() {
        let built = ControllerGainsBuilder::default()
            .kp(1.0)
            .ki(2.0)
            .kd(3.0)
            .output_limit(4.0)
            .sample_time(0.005)
            .build()
            .unwrap();
        assert_eq!(built.gains(), (1.0, 2.0, 3.0));
        assert_eq!(built.output_limit(), 4.0);
        assert_eq!(built.sample_time(), 0.005);

        assert_eq!(
            ControllerGainsBuilder::default().kp(-1.0).build().map(|_| ()),
            Err(ConfigError::InvalidProportionalGain)
        );
        assert_eq!(
            ControllerGainsBuilder::default().ki(f64::NAN).build().map(|_| ()),
            Err(ConfigError::InvalidIntegralGain)
        );
        assert_eq!(
            ControllerGainsBuilder::default().kd(-0.1).build().map(|_| ()),
            Err(ConfigError::InvalidDerivativeGain)
        );
        assert_eq!(
            ControllerGainsBuilder::default().output_limit(0.0).build().map(|_| ()),
            Err(ConfigError::InvalidOutputLimit)
        );
        assert_eq!(
            ControllerGainsBuilder::default().sample_time(0.0).build().map(|_| ()),
            Err(ConfigError::InvalidTimeStep)
        );
    }
}

mod test_pid_step {

    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::PI;

    fn make_loop(gains: ControllerGains<f64>) -> PidLoop<f64> {
        PidLoop::new(gains, scenarios::teaching_plant())
    }

    /// Checks one step against the control law and Euler update written out by hand
    #[test]
    fn test_single_step_matches_hand_computation() {
        let pid = make_loop(scenarios::teaching_gains(5.0));
        let state = PlantState {
            theta: 0.05,
            omega: 0.3,
        };
        let (result, next, ctx) = pid.step(0.0, 0.0, 0.25, state, ControllerState::new());

        let dt = 0.002;
        let e = -0.05;
        let p = 20.0 * e;
        let i = 5.0 * e * dt;
        let d = 2.0 * -0.3;
        let u = p + i + d;
        let theta_dd = (u + 0.25 - 0.2 * 0.3 - 9.81 * 0.5 * 0.05_f64.sin()) / 0.25;
        let omega = 0.3 + dt * theta_dd;
        let theta = 0.05 + dt * omega;

        assert_relative_eq!(result.p_term, p);
        assert_relative_eq!(result.i_term, i);
        assert_relative_eq!(result.d_term, d);
        assert_relative_eq!(result.torque, u);
        assert_relative_eq!(next.omega, omega, epsilon = 1e-12);
        assert_relative_eq!(next.theta, theta, epsilon = 1e-12);
        assert_eq!(result.theta, next.theta);
        assert_eq!(result.omega, next.omega);
        assert_eq!(result.i_term, ctx.integral());
        assert_eq!(result.disturbance, 0.25);
        assert_eq!(result.t, 0.0);
        assert_eq!(result.reference, 0.0);
    }

    /// Reference 3 rad with the pendulum at -3 rad: the short way round is through ±π
    #[test]
    fn test_error_takes_shorter_arc() {
        let gains = ControllerGainsBuilder::default()
            .kp(1.0)
            .ki(0.0)
            .kd(0.0)
            .build()
            .unwrap();
        let pid = make_loop(gains);
        let state = PlantState {
            theta: -3.0,
            omega: 0.0,
        };
        let (result, _, _) = pid.step(0.0, 3.0, 0.0, state, ControllerState::new());
        assert_relative_eq!(result.p_term, 6.0 - 2.0 * PI, epsilon = 1e-12);
        assert!(result.p_term < 0.0);

        // Unwrapped references far outside (-π, π] behave like their wrapped counterpart
        let (far, _, _) = pid.step(0.0, 0.5 + 4.0 * PI, 0.0, PlantState::at_rest(), ControllerState::new());
        assert_relative_eq!(far.p_term, 0.5, epsilon = 1e-12);
        assert_eq!(far.reference, 0.5 + 4.0 * PI);
    }

    /// With a huge integral gain the accumulator slams into the limit and stays there
    #[test]
    fn test_integral_is_clamped_to_output_limit() {
        let gains = ControllerGainsBuilder::default()
            .kp(0.0)
            .ki(1e6)
            .kd(0.0)
            .output_limit(2.0)
            .build()
            .unwrap();
        let pid = make_loop(gains);
        let mut state = PlantState::at_rest();
        let mut ctx = ControllerState::new();
        let mut result;

        for i in 0..200 {
            (result, state, ctx) = pid.step(i as f64 * 0.002, 1.0, 0.0, state, ctx);
            assert!(ctx.integral().abs() <= 2.0);
            assert!(result.torque.abs() <= 2.0);
        }
        assert_eq!(ctx.integral(), 2.0);
    }

    /// The saturated torque hits the limit exactly, not approximately
    #[test]
    fn test_output_is_saturated_exactly() {
        let pid = make_loop(scenarios::teaching_gains(5.0));
        let (result, _, _) = pid.step(
            0.0,
            1.0,
            0.0,
            PlantState::at_rest(),
            ControllerState::new(),
        );
        // kp·e alone is 20 N·m, far beyond the 8 N·m limit
        assert_eq!(result.p_term, 20.0);
        assert_eq!(result.torque, 8.0);

        let (result, _, _) = pid.step(
            0.0,
            -1.0,
            0.0,
            PlantState::at_rest(),
            ControllerState::new(),
        );
        assert_eq!(result.torque, -8.0);
    }

    /// Changing the reference between two otherwise identical steps leaves the D term alone
    #[test]
    fn test_no_derivative_kick() {
        let pid = make_loop(scenarios::teaching_gains(5.0));
        let state = PlantState {
            theta: 0.1,
            omega: -0.4,
        };
        let (before, _, _) = pid.step(0.0, 0.0, 0.0, state, ControllerState::new());
        let (after, _, _) = pid.step(0.0, 0.4, 0.0, state, ControllerState::new());
        assert_eq!(before.d_term, after.d_term);
        assert_relative_eq!(before.d_term, 0.8);
        assert!(before.p_term != after.p_term);
    }

    /// With no gains, no disturbance and the pendulum at rest at θ = 0, nothing ever moves
    #[test]
    fn test_equilibrium_is_a_fixed_point() {
        let gains = ControllerGainsBuilder::default()
            .kp(0.0)
            .ki(0.0)
            .kd(0.0)
            .build()
            .unwrap();
        let pid = make_loop(gains);
        let mut state = PlantState::at_rest();
        let mut ctx = ControllerState::new();
        let mut result;
        for i in 0..1000 {
            (result, state, ctx) = pid.step(i as f64 * 0.002, 0.0, 0.0, state, ctx);
            assert_eq!(result.theta, 0.0);
            assert_eq!(result.torque, 0.0);
        }
        assert_eq!(state, PlantState::at_rest());
    }

    #[test]
    fn test_step_is_deterministic() {
        let pid = make_loop(scenarios::teaching_gains(5.0));
        let state = PlantState {
            theta: 2.5,
            omega: 7.0,
        };
        let first = pid.step(1.0, -0.3, 1.5, state, ControllerState::new());
        let second = pid.step(1.0, -0.3, 1.5, state, ControllerState::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_step_keeps_angle_wrapped() {
        let gains = ControllerGainsBuilder::default()
            .kp(0.0)
            .ki(0.0)
            .kd(0.0)
            .build()
            .unwrap();
        let params = PlantParameters::new(1.0, 0.5, 0.0, 0.0).unwrap();
        let pid = PidLoop::new(gains, params);
        let mut state = PlantState {
            theta: 0.0,
            omega: 50.0,
        };
        let mut ctx = ControllerState::new();
        let mut result;
        for i in 0..2000 {
            (result, state, ctx) = pid.step(i as f64 * 0.002, 0.0, 0.0, state, ctx);
            assert!(result.theta > -PI && result.theta <= PI);
        }
    }

    #[test]
    fn test_f32_loop() {
        let pid = PidLoop::new(ControllerGains::<f32>::default(), PlantParameters::default());
        let (result, _, _) = pid.step(0.0, 0.0, 0.0, PlantState::default(), ControllerState::new());
        assert!(result.torque < 0.0);
        assert!(result.is_finite());
    }
}
