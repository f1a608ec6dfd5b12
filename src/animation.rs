// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The animation loop.  Theta starts at zero and creeps forward by a
//! fixed step every frame.  Each tick renders one frame, shows it, and
//! if we're recording, hands it to the recorder.  When the screen says
//! stop, we stop, and the recorder gets exactly one chance to write
//! out what it has.
//!
//! The loop itself can't fail.  Whatever the screen or the recorder
//! returns as an error ends the run on the spot; there's no sensible
//! way to patch a hole in the middle of an animation.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::display::Screen;
use crate::error::JuliaError;
use crate::recorder::{Format, Recorder};
use crate::render::Renderer;

/// Knobs for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// How far theta moves between frames.
    pub step: f64,
    /// Frames per second for every encoded artifact.
    pub frame_rate: u32,
    /// What the recorder should write when the run ends.
    pub formats: Vec<Format>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            step: 0.01,
            frame_rate: 24,
            formats: vec![Format::Mp4, Format::Gif],
        }
    }
}

/// An animation is either running or done.  There's no pause.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Still producing frames.
    Running,
    /// Finished, for good.
    Stopped,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Frames rendered and shown.
    pub frames: usize,
    /// Theta after the last step.
    pub theta: f64,
    /// Files the recorder wrote, if there was one.
    pub artifacts: Vec<PathBuf>,
}

/// Owns theta and drives the renderer.
#[derive(Debug)]
pub struct Animation {
    renderer: Renderer,
    config: AnimationConfig,
    theta: f64,
    frames: usize,
    state: State,
}

impl Animation {
    /// A fresh animation at theta zero.  The step has to be finite and
    /// the frame rate non-zero.
    pub fn new(renderer: Renderer, config: AnimationConfig) -> Result<Self, JuliaError> {
        if !config.step.is_finite() {
            return Err(JuliaError::InvalidStep(config.step));
        }
        if config.frame_rate == 0 {
            return Err(JuliaError::InvalidFrameRate);
        }
        Ok(Animation {
            renderer,
            config,
            theta: 0.0,
            frames: 0,
            state: State::Running,
        })
    }

    /// The current animation parameter.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Running or stopped.
    pub fn state(&self) -> State {
        self.state
    }

    /// Run until `screen` says stop.  Passing a recorder turns capture
    /// on; it is finalized exactly once, after the last frame.  An
    /// animation only runs once.
    pub fn run<S: Screen>(
        &mut self,
        screen: &mut S,
        mut recorder: Option<&mut dyn Recorder>,
    ) -> Result<Summary, JuliaError> {
        if self.state == State::Stopped {
            return Err(JuliaError::AlreadyStopped);
        }

        let plane = self.renderer.plane();
        info!(
            width = plane.width(),
            height = plane.height(),
            threads = self.renderer.threads(),
            recording = recorder.is_some(),
            "animation started"
        );

        let ticked = self.animate(screen, &mut recorder);
        self.state = State::Stopped;
        ticked?;

        info!(frames = self.frames, theta = self.theta, "animation stopped");
        let artifacts = match recorder {
            Some(recorder) => recorder.finalize(self.config.frame_rate, &self.config.formats)?,
            None => vec![],
        };

        Ok(Summary {
            frames: self.frames,
            theta: self.theta,
            artifacts,
        })
    }

    fn animate<S: Screen>(
        &mut self,
        screen: &mut S,
        recorder: &mut Option<&mut dyn Recorder>,
    ) -> Result<(), JuliaError> {
        while screen.running() {
            let frame = self.renderer.render(self.theta).with_index(self.frames);
            screen.show(&frame)?;
            if let Some(recorder) = recorder.as_mut() {
                recorder.append(frame)?;
            }
            debug!(index = self.frames, theta = self.theta, "frame done");
            self.frames += 1;
            self.theta += self.config.step;
        }
        Ok(())
    }
}
