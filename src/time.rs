// Frame timing for driving the realtime runner from an animation loop
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

use core::fmt::Debug;
use core::time::Duration;

/// A trait for time-like objects that can be used to measure elapsed time between frames.
pub trait InstantLike: Sized + Clone + Copy + Debug {
    /// Returns the amount of time elapsed from another instant to this one, saturating at zero
    #[must_use]
    fn duration_since(&self, earlier: Self) -> Duration;
}

/// A wrapper around an unsigned 64-bit integer representing milliseconds, e.g. a frame
/// timestamp from a browser or a tick counter.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Millis(pub u64);

impl InstantLike for Millis {
    fn duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Converts a stream of frame instants into elapsed-time deltas for
/// [`RealtimeRunner::tick`](crate::runner::RealtimeRunner::tick).
///
/// The first frame yields zero. Gaps longer than `max_gap` (a backgrounded window, a debugger
/// pause) are cut down to `max_gap` so the simulation does not lurch forward.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock<I> {
    last: Option<I>,
    max_gap: Duration,
}

impl<I: InstantLike> Default for FrameClock<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: InstantLike> FrameClock<I> {
    /// Longest frame gap passed through by default.
    pub const DEFAULT_MAX_GAP: Duration = Duration::from_millis(50);

    /// Creates a clock capping gaps at [`DEFAULT_MAX_GAP`](Self::DEFAULT_MAX_GAP).
    pub fn new() -> Self {
        Self::with_max_gap(Self::DEFAULT_MAX_GAP)
    }

    /// Creates a clock capping gaps at `max_gap`.
    pub fn with_max_gap(max_gap: Duration) -> Self {
        FrameClock {
            last: None,
            max_gap,
        }
    }

    /// Returns the longest gap passed through.
    pub fn max_gap(&self) -> Duration {
        self.max_gap
    }

    /// Records a new frame and returns the (capped) time since the previous one.
    pub fn lap(&mut self, now: I) -> Duration {
        let elapsed = match self.last {
            Some(last) => now.duration_since(last).min(self.max_gap),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        elapsed
    }

    /// Forgets the previous frame so the next lap starts from zero again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// A convenient wrapper around `std::time::Instant` satisfying the `InstantLike` trait.
#[cfg(feature = "std")]
mod std_instant {

    use super::{Duration, InstantLike};

    /// `std::time::Instant` as an [`InstantLike`].
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct StdInstant(pub std::time::Instant);

    impl StdInstant {
        /// Captures the current instant.
        pub fn now() -> Self {
            StdInstant(std::time::Instant::now())
        }
    }

    impl InstantLike for StdInstant {
        fn duration_since(&self, other: Self) -> Duration {
            self.0.saturating_duration_since(other.0)
        }
    }

    /// Tests that StdInstant is just one constructor call away from std::time::Instant
    /// and calling duration_since is equivalent to calling the same method on the underlying Instant.
    #[cfg(test)]
    #[test]
    fn test_std_instant_wrapper() {
        let start = StdInstant::now();
        let end = StdInstant(std::time::Instant::now());
        let result = end.duration_since(start);
        let expected = end.0.duration_since(start.0);
        assert_eq!(result, expected);
    }
}

#[cfg(feature = "std")]
pub use std_instant::StdInstant;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_lap_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.lap(Millis(1000)), Duration::ZERO);
        assert_eq!(clock.lap(Millis(1016)), Duration::from_millis(16));
    }

    #[test]
    fn test_long_gaps_are_capped() {
        let mut clock = FrameClock::new();
        let _ = clock.lap(Millis(0));
        assert_eq!(clock.lap(Millis(5000)), FrameClock::<Millis>::DEFAULT_MAX_GAP);
        // The cap does not shift the timeline: the next frame measures from 5000ms
        assert_eq!(clock.lap(Millis(5010)), Duration::from_millis(10));
    }

    #[test]
    fn test_backwards_time_saturates() {
        let mut clock = FrameClock::with_max_gap(Duration::from_secs(1));
        let _ = clock.lap(Millis(100));
        assert_eq!(clock.lap(Millis(50)), Duration::ZERO);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        let _ = clock.lap(Millis(0));
        clock.reset();
        assert_eq!(clock.lap(Millis(30)), Duration::ZERO);
    }
}
