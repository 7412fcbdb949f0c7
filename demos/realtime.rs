//! Realtime animation loop: a frame clock feeds elapsed time into the runner, including
//! a simulated stall that the runner sub-steps and caps.
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

use pendulum_pid::runner::{RealtimeRunner, SimulationConfigBuilder};
use pendulum_pid::plant::PlantState;
use pendulum_pid::signal::{DisturbanceSpec, ReferenceSpec};
use pendulum_pid::time::{FrameClock, Millis};

const FRAME_MS: u64 = 16;
const WIDTH: usize = 61;

/// Draws the angle as a marker on a [-π/2, π/2] scale.
fn gauge(theta: f64) -> String {
    let half = (WIDTH / 2) as f64;
    let pos = (half + theta / core::f64::consts::FRAC_PI_2 * half).round();
    let pos = pos.clamp(0.0, (WIDTH - 1) as f64) as usize;
    (0..WIDTH)
        .map(|i| match i {
            _ if i == pos => 'o',
            _ if i == WIDTH / 2 => '|',
            _ => '.',
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    let config = SimulationConfigBuilder::<f64>::default()
        .initial_state(PlantState::new(0.2, 0.0))
        .reference(ReferenceSpec::Sine {
            amplitude: 0.15,
            frequency: 0.5,
        })
        .disturbance(DisturbanceSpec::step(1.5, 3.0))
        .build()?;
    let mut runner = RealtimeRunner::new(config)?;
    let mut clock = FrameClock::new();

    let mut now = Millis(0);
    for frame in 0..400u64 {
        // Pretend the window was hidden for two seconds halfway through
        now.0 += if frame == 200 { 2000 } else { FRAME_MS };

        let elapsed = clock.lap(now);
        let latest = runner.tick(elapsed.as_secs_f64())?;

        if frame % 10 == 0 {
            let marker = if latest.disturbance_active() { '!' } else { ' ' };
            println!(
                "{:6.2}s {} {} θ={:+.3}",
                latest.t,
                gauge(latest.theta),
                marker,
                latest.theta
            );
        }
    }

    println!("history holds {} steps", runner.history().len());
    Ok(())
}
