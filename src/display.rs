//! Where frames go to be looked at.  The animation loop doesn't care
//! what's on the other end, only that it can hand over a frame and
//! ask whether to keep going.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::JuliaError;
use crate::frame::Frame;

/// A display sink.  `running` is polled once per tick, before the
/// frame is rendered; `show` blocks until the frame is on screen.
pub trait Screen {
    /// Should the animation keep going?
    fn running(&self) -> bool;

    /// Present a frame.
    fn show(&mut self, frame: &Frame) -> Result<(), JuliaError>;
}

/// A screen with no pixels.  It stops after a fixed number of frames,
/// or when someone flips its stop flag, whichever comes first.
#[derive(Debug, Default, Clone)]
pub struct Headless {
    budget: Option<usize>,
    shown: usize,
    stop: Arc<AtomicBool>,
}

impl Headless {
    /// Runs until the stop flag is set.
    pub fn new() -> Headless {
        Headless::default()
    }

    /// Runs for `frames` frames at most.
    pub fn with_frames(frames: usize) -> Headless {
        Headless {
            budget: Some(frames),
            ..Headless::default()
        }
    }

    /// A handle that stops the animation from elsewhere when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// How many frames have been shown so far.
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Screen for Headless {
    fn running(&self) -> bool {
        !self.stop.load(Ordering::SeqCst) && self.budget.map_or(true, |b| self.shown < b)
    }

    fn show(&mut self, _frame: &Frame) -> Result<(), JuliaError> {
        self.shown += 1;
        Ok(())
    }
}

/// Keeps a single PGM file up to date with the latest frame, which is
/// about as close to a window as a terminal gets.  Stops on the same
/// rules as `Headless`.
#[derive(Debug)]
pub struct PnmPreview {
    path: PathBuf,
    inner: Headless,
}

impl PnmPreview {
    /// Preview into `path`, stopping when `inner` says so.
    pub fn new<P: AsRef<Path>>(path: P, inner: Headless) -> PnmPreview {
        PnmPreview {
            path: path.as_ref().to_path_buf(),
            inner,
        }
    }

    /// How many frames have been shown so far.
    pub fn shown(&self) -> usize {
        self.inner.shown()
    }
}

impl Screen for PnmPreview {
    fn running(&self) -> bool {
        self.inner.running()
    }

    fn show(&mut self, frame: &Frame) -> Result<(), JuliaError> {
        frame.write_pgm(&self.path)?;
        self.inner.show(frame)
    }
}
