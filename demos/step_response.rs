//! Step response and disturbance rejection of the pendulum under PID control, with and
//! without integral action. Prints the series a plotting front-end would draw.
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

use tracing_subscriber::filter::LevelFilter;

use pendulum_pid::pid::ControllerGainsBuilder;
use pendulum_pid::runner::{run, SimulationConfigBuilder};
use pendulum_pid::signal::DisturbanceSpec;

const PRINT_EVERY: usize = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    let disturbance = DisturbanceSpec::step(1.5, 3.0);

    for ki in [5.0, 0.0] {
        let gains = ControllerGainsBuilder::default().ki(ki).build()?;
        let config = SimulationConfigBuilder::<f64>::default()
            .gains(gains)
            .disturbance(disturbance)
            .build()?;
        let trajectory = run(&config)?;

        println!("# kp={} ki={} kd={}", gains.kp(), gains.ki(), gains.kd());
        println!("t,reference,theta,u,p,i,d");
        for sample in trajectory.iter().step_by(PRINT_EVERY) {
            println!(
                "{:.3},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
                sample.t,
                sample.reference,
                sample.theta,
                sample.torque,
                sample.p_term,
                sample.i_term,
                sample.d_term
            );
        }
        println!(
            "# mean |error| over the last 10%: {:.5} rad\n",
            trajectory.mean_abs_error_in_tail(0.1)
        );
    }
    Ok(())
}
