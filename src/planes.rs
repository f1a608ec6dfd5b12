//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! twice as wide as it is tall, and the patch of the complex plane
//! from -2-1i to 2+1i on which the Julia set is drawn.
use itertools::{iproduct, Product};
use num::Complex;
use std::ops::Range;

use crate::error::JuliaError;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.  For that reason,
/// the lower-left-hand corner is not included.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a point in a region.  `.0` runs along the
/// width, `.1` along the height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// We don't need a Point, as a single Complex number is a Point.

/// Maps pixels on the integral plane to points on the complex plane.
/// The resolution `n` fixes both: the integral plane is `2n` by `n`,
/// and a pixel `(i, j)` lands at `((i/n - 1) * 2, (j/n - 0.5) * 2)`.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    // The per-axis resolution, kept as a float for the mapping.
    n: f64,
}

impl PlaneMapper {
    /// Constructor.  A resolution of zero would produce an empty
    /// image, which we refuse up front.
    pub fn new(n: usize) -> Result<PlaneMapper, JuliaError> {
        if n == 0 {
            return Err(JuliaError::InvalidResolution(n));
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(2 * n, n),
            n: n as f64,
        })
    }

    /// Width of the integral plane, `2n`.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the integral plane, `n`.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a pixel on the integral cartesian plane, map it to its
    /// starting point on the complex plane.  Any change to this
    /// transform reframes the whole picture.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            ((pixel.0 as f64) / self.n - 1.0) * 2.0,
            ((pixel.1 as f64) / self.n - 0.5) * 2.0,
        )
    }

    /// The linear offset of a pixel from the root of the image buffer
    /// in memory.  Rows are laid out one after another.
    pub fn pixel_to_offset(&self, pixel: &Pixel) -> usize {
        pixel.1 * self.integral_plane.0 + pixel.0
    }

    /// Every pixel of the plane, in the same order as the buffer
    /// offsets: row by row, left to right within a row.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        let rows: Product<Range<usize>, Range<usize>> =
            iproduct!(0..self.integral_plane.1, 0..self.integral_plane.0);
        rows.map(|(row, column)| Pixel(column, row))
    }
}
