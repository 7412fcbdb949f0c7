// Recorded step sequences: complete batch trajectories and the bounded realtime history
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

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use num_traits::{Float, FloatConst};

use crate::angle::wrap_to_pi;
use crate::error::ConfigError;
use crate::pid::StepResult;

/// The time-ordered result of a batch run, one [`StepResult`] per step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory<F> {
    samples: Vec<StepResult<F>>,
}

impl<F> From<Vec<StepResult<F>>> for Trajectory<F> {
    fn from(samples: Vec<StepResult<F>>) -> Self {
        Trajectory { samples }
    }
}

impl<F> IntoIterator for Trajectory<F> {
    type Item = StepResult<F>;
    type IntoIter = alloc::vec::IntoIter<StepResult<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a, F> IntoIterator for &'a Trajectory<F> {
    type Item = &'a StepResult<F>;
    type IntoIter = core::slice::Iter<'a, StepResult<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<F: Float + FloatConst> Trajectory<F> {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the steps in time order.
    pub fn samples(&self) -> &[StepResult<F>] {
        &self.samples
    }

    /// Iterates the steps in time order.
    pub fn iter(&self) -> core::slice::Iter<'_, StepResult<F>> {
        self.samples.iter()
    }

    /// Returns the final step, if any.
    pub fn last(&self) -> Option<&StepResult<F>> {
        self.samples.last()
    }

    /// Consumes the trajectory and returns its steps.
    pub fn into_samples(self) -> Vec<StepResult<F>> {
        self.samples
    }

    fn column(&self, select: impl Fn(&StepResult<F>) -> F) -> Vec<F> {
        self.samples.iter().map(select).collect()
    }

    /// Step start times, s.
    pub fn times(&self) -> Vec<F> {
        self.column(|s| s.t)
    }

    /// Reference angles, rad.
    pub fn references(&self) -> Vec<F> {
        self.column(|s| s.reference)
    }

    /// Pendulum angles after each step, rad.
    pub fn angles(&self) -> Vec<F> {
        self.column(|s| s.theta)
    }

    /// Saturated control torques, N·m.
    pub fn torques(&self) -> Vec<F> {
        self.column(|s| s.torque)
    }

    /// Proportional contributions.
    pub fn p_terms(&self) -> Vec<F> {
        self.column(|s| s.p_term)
    }

    /// Integral contributions.
    pub fn i_terms(&self) -> Vec<F> {
        self.column(|s| s.i_term)
    }

    /// Derivative contributions.
    pub fn d_terms(&self) -> Vec<F> {
        self.column(|s| s.d_term)
    }

    /// The final `fraction` of the samples (rounded up), e.g. `0.1` for the last 10%.
    ///
    /// `fraction` is clamped to [0, 1].
    pub fn tail(&self, fraction: f64) -> &[StepResult<F>] {
        let fraction = fraction.clamp(0.0, 1.0);
        let count = Float::ceil(self.samples.len() as f64 * fraction) as usize;
        let count = count.min(self.samples.len());
        &self.samples[self.samples.len() - count..]
    }

    /// Largest tracking error |wrap(reference − θ)| over the tail. Zero for an empty tail.
    pub fn max_abs_error_in_tail(&self, fraction: f64) -> F {
        self.tail(fraction)
            .iter()
            .map(tracking_error)
            .fold(F::zero(), F::max)
    }

    /// Mean tracking error |wrap(reference − θ)| over the tail. Zero for an empty tail.
    pub fn mean_abs_error_in_tail(&self, fraction: f64) -> F {
        let tail = self.tail(fraction);
        if tail.is_empty() {
            return F::zero();
        }
        let sum = tail.iter().map(tracking_error).fold(F::zero(), |acc, e| acc + e);
        sum / crate::angle::lit(tail.len() as f64)
    }
}

fn tracking_error<F: Float + FloatConst>(sample: &StepResult<F>) -> F {
    wrap_to_pi(sample.reference - sample.theta).abs()
}

/// The most recent realtime steps, oldest first. Once full, each push evicts the oldest sample.
#[derive(Clone, Debug, PartialEq)]
pub struct History<F> {
    samples: VecDeque<StepResult<F>>,
    capacity: usize,
}

impl<F: Copy> History<F> {
    /// Number of samples kept by default, about five seconds at 100 frames per second.
    pub const DEFAULT_CAPACITY: usize = 500;

    /// # Errors
    /// - `InvalidHistoryCapacity` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity);
        }
        Ok(History {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Appends a step, evicting the oldest one when full.
    pub fn push(&mut self, sample: StepResult<F>) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Drops every stored step.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the most steps kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the newest step, if any.
    pub fn latest(&self) -> Option<&StepResult<F>> {
        self.samples.back()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> alloc::collections::vec_deque::Iter<'_, StepResult<F>> {
        self.samples.iter()
    }

    /// Copies the window out in time order, e.g. for plotting.
    pub fn to_vec(&self) -> Vec<StepResult<F>> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::PlantState;
    use alloc::vec;

    fn sample(t: f64, reference: f64, theta: f64) -> StepResult<f64> {
        StepResult::snapshot(t, reference, PlantState { theta, omega: 0.0 })
    }

    #[test]
    fn test_columns_follow_time_order() {
        let trajectory = Trajectory::from(vec![
            sample(0.0, 0.0, 0.1),
            sample(0.1, 0.0, 0.2),
            sample(0.2, 0.5, 0.3),
        ]);
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.times(), vec![0.0, 0.1, 0.2]);
        assert_eq!(trajectory.angles(), vec![0.1, 0.2, 0.3]);
        assert_eq!(trajectory.references(), vec![0.0, 0.0, 0.5]);
        assert_eq!(trajectory.torques(), vec![0.0; 3]);
    }

    #[test]
    fn test_tail_rounds_up() {
        let trajectory: Trajectory<f64> = (0..25)
            .map(|i| sample(i as f64, 0.0, 0.0))
            .collect::<Vec<_>>()
            .into();
        assert_eq!(trajectory.tail(0.1).len(), 3);
        assert_eq!(trajectory.tail(0.1)[0].t, 22.0);
        assert_eq!(trajectory.tail(0.0).len(), 0);
        assert_eq!(trajectory.tail(2.0).len(), 25);
    }

    #[test]
    fn test_tail_error_metrics_use_wrapped_error() {
        let trajectory = Trajectory::from(vec![
            sample(0.0, 0.0, 3.0),
            sample(1.0, 3.0, -3.0),
            sample(2.0, 0.0, -0.1),
        ]);
        let shortest = 2.0 * core::f64::consts::PI - 6.0;
        assert!((trajectory.max_abs_error_in_tail(0.5) - shortest).abs() < 1e-12);
        assert!((trajectory.mean_abs_error_in_tail(0.5) - (shortest + 0.1) / 2.0).abs() < 1e-12);
        assert_eq!(Trajectory::<f64>::from(vec![]).mean_abs_error_in_tail(0.5), 0.0);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = History::with_capacity(3).unwrap();
        for i in 0..5 {
            history.push(sample(i as f64, 0.0, 0.0));
        }
        assert_eq!(history.len(), 3);
        let times: Vec<f64> = history.iter().map(|s| s.t).collect();
        assert_eq!(times, vec![2.0, 3.0, 4.0]);
        assert_eq!(history.latest().map(|s| s.t), Some(4.0));

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_rejects_zero_capacity() {
        assert_eq!(
            History::<f64>::with_capacity(0),
            Err(ConfigError::InvalidHistoryCapacity)
        );
    }
}
