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

#[allow(dead_code)]
pub mod scenarios {

    use pendulum_pid::pid::{ControllerGains, ControllerGainsBuilder};
    use pendulum_pid::plant::PlantParameters;
    use pendulum_pid::runner::{SimulationConfig, SimulationConfigBuilder};
    use pendulum_pid::signal::{DisturbanceSpec, ReferenceSpec};

    /// The classroom setup: kp=20, ki=5, kd=2, |u| ≤ 8 N·m, dt=2ms over 8s, a 1 kg mass at
    /// 0.5 m with 0.2 N·m·s/rad damping, regulating to θ = 0 from θ = 0.05.
    pub fn teaching_gains(ki: f64) -> ControllerGains<f64> {
        ControllerGainsBuilder::default()
            .kp(20.0)
            .ki(ki)
            .kd(2.0)
            .output_limit(8.0)
            .sample_time(0.002)
            .build()
            .unwrap()
    }

    pub fn teaching_plant() -> PlantParameters<f64> {
        PlantParameters::new(1.0, 0.5, 0.2, 9.81).unwrap()
    }

    pub fn teaching_config(ki: f64, disturbance: DisturbanceSpec<f64>) -> SimulationConfig<f64> {
        SimulationConfigBuilder::default()
            .gains(teaching_gains(ki))
            .plant(teaching_plant())
            .reference(ReferenceSpec::Step { angle: 0.0 })
            .disturbance(disturbance)
            .horizon(8.0)
            .build()
            .unwrap()
    }

    /// Parameters so large that the gravity torque overflows to infinity on the first step.
    pub fn overflowing_plant() -> PlantParameters<f64> {
        PlantParameters::new(1e300, 1e300, 0.2, 9.81).unwrap()
    }
}
