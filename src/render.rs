// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame renderer.  Given a theta, work out the frame constant
//! once and run the kernel over every pixel of the plane.  Each pixel
//! is independent of its neighbours, so the threaded version just
//! carves the output buffer into bands of rows and hands each band to
//! its own thread.  Nobody shares anything writable, so there's no
//! locking.

extern crate crossbeam;

use std::panic;

use crate::error::JuliaError;
use crate::frame::Frame;
use crate::kernel::{evaluate, frame_constant};
use crate::planes::{Pixel, PlaneMapper};

/// Holds the plane and the number of threads to spread a frame over.
/// Once built it is never mutated, so rendering takes `&self`.
#[derive(Debug, Clone)]
pub struct Renderer {
    plane: PlaneMapper,
    threads: usize,
}

impl Renderer {
    /// Requires the per-axis resolution (the image is twice as wide as
    /// it is tall) and a thread count of at least one.
    pub fn new(n: usize, threads: usize) -> Result<Self, JuliaError> {
        if threads == 0 {
            return Err(JuliaError::InvalidThreadCount(threads));
        }
        let plane = PlaneMapper::new(n)?;
        Ok(Renderer { plane, threads })
    }

    /// The plane this renderer draws on.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// How many threads a frame is split across.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The single-threaded render.  Walks the plane in buffer order.
    pub fn render_single(&self, theta: f64) -> Frame {
        let c = frame_constant(theta);
        let intensities: Vec<f64> = self
            .plane
            .pixels()
            .map(|pixel| evaluate(self.plane.pixel_to_point(&pixel), c))
            .collect();
        Frame::from_intensities(self.plane.width(), self.plane.height(), 0, theta, intensities)
    }

    /// The multi-threaded render.  Produces exactly what
    /// `render_single` does, just sooner.
    #[tracing::instrument(skip(self), name = "Renderer.render")]
    pub fn render(&self, theta: f64) -> Frame {
        if self.threads == 1 {
            return self.render_single(theta);
        }

        let c = frame_constant(theta);
        let width = self.plane.width();
        let height = self.plane.height();
        let rows_per_band = (height + self.threads - 1) / self.threads;
        let mut buffer = vec![0.0_f64; self.plane.len()];

        let plane = &self.plane;
        let result = crossbeam::scope(|spawner| {
            let bands: Vec<&mut [f64]> = buffer.chunks_mut(rows_per_band * width).collect();
            for (band, region) in bands.into_iter().enumerate() {
                spawner.spawn(move |_| {
                    let top = band * rows_per_band;
                    for (offset, value) in region.iter_mut().enumerate() {
                        let pixel = Pixel(offset % width, top + offset / width);
                        *value = evaluate(plane.pixel_to_point(&pixel), c);
                    }
                });
            }
        });

        // The kernel doesn't panic; if a worker somehow did, pass it on.
        if let Err(e) = result {
            panic::resume_unwind(e);
        }

        Frame::from_intensities(width, height, 0, theta, buffer)
    }
}
