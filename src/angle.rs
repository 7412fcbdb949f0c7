// Angle wrapping and saturation helpers shared by the plant and the controller
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

/// Converts an `f64` literal into the working scalar type.
///
/// Every `Float` implementor in practice represents `f64` literals (possibly with rounding), so
/// the fallback is unreachable for `f32` and `f64`.
#[inline]
pub(crate) fn lit<F: Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::nan)
}

/// Wraps an angle into the half-open interval (-π, π].
///
/// The wrapped value is the representative of `angle` modulo 2π that lies closest to zero, so an
/// angular error passed through this function always points along the shorter arc. Angles that
/// already lie in (-π, π] are returned untouched, which makes the function exactly idempotent.
///
/// Non-finite inputs produce NaN.
///
/// # Example
/// ```
/// use pendulum_pid::angle::wrap_to_pi;
/// use core::f64::consts::PI;
///
/// assert_eq!(wrap_to_pi(0.0), 0.0);
/// assert_eq!(wrap_to_pi(-PI), PI);
/// assert!((wrap_to_pi(PI + 0.001) - (-PI + 0.001)).abs() < 1e-12);
/// ```
pub fn wrap_to_pi<F: Float + FloatConst>(angle: F) -> F {
    let pi = F::PI();
    if angle > -pi && angle <= pi {
        return angle;
    }

    let two_pi = pi + pi;
    // `%` truncates toward zero, so fold negative remainders back into [0, 2π) first
    let mut wrapped = ((angle + pi) % two_pi + two_pi) % two_pi - pi;
    if wrapped <= -pi {
        wrapped = wrapped + two_pi;
    }
    wrapped
}

/// Clamps `value` into the symmetric band [-limit, limit].
///
/// `limit` must be positive; the result then never exceeds `limit` in magnitude. NaN is passed
/// through unchanged so that callers can detect it.
#[inline]
pub fn clamp_symmetric<F: Float>(value: F, limit: F) -> F {
    if value > limit {
        limit
    } else if value < -limit {
        -limit
    } else {
        value
    }
}
