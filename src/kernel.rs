// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  Take a starting point, square it and add
//! the frame's constant until it either wanders out past the escape
//! radius or we run out of patience, and report how long that took as
//! a brightness.  Nothing in here touches shared state, so the
//! renderer is free to call it from as many threads as it likes.

use num::Complex;

/// Points whose magnitude reaches this are considered gone.
pub const ESCAPE_RADIUS: f64 = 20.0;

/// The iteration cap.  A point still inside after this many rounds is
/// treated as never escaping.
pub const MAX_ITERATIONS: usize = 50;

/// How much brightness each iteration costs.  `MAX_ITERATIONS` of
/// them take a pixel from 1.0 down to exactly 0.0.
pub const INTENSITY_STEP: f64 = 0.02;

/// Scale of the per-frame constant.
pub const FRAME_CONSTANT_SCALE: f64 = 0.7885;

/// The constant `c` added on every iteration, as a function of the
/// animation parameter.  Both components take the cosine of theta, so
/// as theta advances `c` slides back and forth along the diagonal
/// rather than circling the origin.
#[inline]
pub fn frame_constant(theta: f64) -> Complex<f64> {
    let k = FRAME_CONSTANT_SCALE * theta.cos();
    Complex::new(k, k)
}

/// Iterate `z = z^2 + c` from `start`, returning the number of
/// iterations performed before the magnitude reached the escape
/// radius, capped at `MAX_ITERATIONS`.  The test is against the true
/// magnitude, not its square.
#[inline]
pub fn escape_time(start: Complex<f64>, c: Complex<f64>) -> usize {
    let mut z = start;
    let mut iterations = 0;
    while z.norm() < ESCAPE_RADIUS && iterations < MAX_ITERATIONS {
        z = z * z + c;
        iterations += 1;
    }
    iterations
}

/// Convert an iteration count to one of the 51 brightness levels.
#[inline]
pub fn intensity(iterations: usize) -> f64 {
    1.0 - (iterations as f64) * INTENSITY_STEP
}

/// The kernel proper: brightness of a starting point under `c`.
#[inline]
pub fn evaluate(start: Complex<f64>, c: Complex<f64>) -> f64 {
    intensity(escape_time(start, c))
}
