//! Everything that can go wrong during a run.  The numeric kernel
//! can't fail, so what's left is bad construction parameters, sinks
//! that refuse their input, and lifecycle misuse.

use std::io;

/// The one error type for the crate.
#[derive(Debug, Fail)]
pub enum JuliaError {
    /// The per-axis resolution must be at least one pixel.
    #[fail(display = "Resolution must be greater than zero, got {}", _0)]
    InvalidResolution(usize),

    /// The renderer needs at least one thread to work with.
    #[fail(display = "Thread count must be greater than zero, got {}", _0)]
    InvalidThreadCount(usize),

    /// The theta step has to be a finite number.
    #[fail(display = "Theta step must be finite, got {}", _0)]
    InvalidStep(f64),

    /// Frame rates of zero make no sense to any encoder.
    #[fail(display = "Frame rate must be greater than zero")]
    InvalidFrameRate,

    /// Reading or writing a file failed.
    #[fail(display = "I/O failure: {}", _0)]
    Io(#[cause] io::Error),

    /// The image crate refused to encode a frame.
    #[fail(display = "Image encoding failure: {}", _0)]
    Image(#[cause] image::ImageError),

    /// ffmpeg could not be started or exited unhappily.
    #[fail(display = "ffmpeg failure: {}", _0)]
    Ffmpeg(String),

    /// A recorder only gets to write its artifacts once.
    #[fail(display = "Recorder has already been finalized")]
    AlreadyFinalized,

    /// An animation that has stopped stays stopped.
    #[fail(display = "Animation has already stopped")]
    AlreadyStopped,
}

impl From<io::Error> for JuliaError {
    fn from(err: io::Error) -> Self {
        JuliaError::Io(err)
    }
}

impl From<image::ImageError> for JuliaError {
    fn from(err: image::ImageError) -> Self {
        JuliaError::Image(err)
    }
}
