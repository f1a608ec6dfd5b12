//! A single rendered frame: one brightness per pixel, frozen once the
//! renderer hands it over.

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, GrayImage, ImageEncoder, Luma};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::JuliaError;
use crate::planes::Pixel;

/// A fully populated grid of intensities, `width` by `height`, laid
/// out row by row.  Frames are immutable; the only way to get one is
/// from the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    index: usize,
    theta: f64,
    intensities: Vec<f64>,
}

impl Frame {
    /// Wrap a finished buffer.  The buffer must hold exactly
    /// `width * height` intensities.
    pub(crate) fn from_intensities(
        width: usize,
        height: usize,
        index: usize,
        theta: f64,
        intensities: Vec<f64>,
    ) -> Frame {
        assert!(intensities.len() == width * height);
        Frame {
            width,
            height,
            index,
            theta,
            intensities,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Position of this frame in render order, starting at zero.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The animation parameter this frame was rendered for.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Stamp a render-order index on the frame.  The animation loop
    /// owns the frame count, not the renderer.
    pub(crate) fn with_index(mut self, index: usize) -> Frame {
        self.index = index;
        self
    }

    /// The intensity at a pixel.
    pub fn get(&self, pixel: &Pixel) -> f64 {
        self.intensities[pixel.1 * self.width + pixel.0]
    }

    /// The raw intensities, row by row.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Convert to an 8-bit greyscale image.  Row `j = 0` of the frame
    /// is the bottom of the picture, so rows are flipped on the way
    /// out.  Levels are truncated, not rounded: 0.98 becomes 249.
    pub fn to_luma(&self) -> GrayImage {
        let (width, height) = (self.width as u32, self.height as u32);
        GrayImage::from_fn(width, height, |x, y| {
            let j = (height - 1 - y) as usize;
            let v = self.intensities[j * self.width + x as usize];
            Luma([(v * 255.0) as u8])
        })
    }

    /// Write the frame out as a binary PGM.
    pub fn write_pgm(&self, path: &Path) -> Result<(), JuliaError> {
        write_pgm(path, &self.to_luma())
    }
}

/// Write an 8-bit greyscale image as a binary PGM.
pub(crate) fn write_pgm(path: &Path, pixels: &GrayImage) -> Result<(), JuliaError> {
    let mut output = BufWriter::new(File::create(path)?);
    {
        let encoder =
            PnmEncoder::new(&mut output).with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary));
        encoder.write_image(pixels.as_raw(), pixels.width(), pixels.height(), ColorType::L8)?;
    }
    output.flush()?;
    Ok(())
}
