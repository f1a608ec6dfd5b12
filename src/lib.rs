#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Julia set animator
//!
//! A Julia set is drawn by taking every point on a patch of the
//! complex plane and repeatedly squaring it and adding a constant,
//! `c`, counting how many rounds it takes for the point to run off
//! toward infinity.  Points that leave quickly are drawn dark, points
//! that linger (or never leave) are drawn bright or black at the cap.
//! Every point is its own little computation, so a frame can be
//! cut into bands and handed to as many threads as you like.
//!
//! Sliding `c` a tiny bit between frames makes the whole set writhe,
//! and that's the animation.  Each frame goes to a `Screen`, and if
//! capture is on, to a `Recorder` which turns the whole sequence into
//! a video and a looping GIF once the run is over.

#[macro_use]
extern crate failure;
extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;
extern crate tracing;

pub mod animation;
pub mod display;
pub mod error;
pub mod frame;
pub mod kernel;
pub mod planes;
pub mod recorder;
pub mod render;

pub use animation::{Animation, AnimationConfig, State, Summary};
pub use display::{Headless, PnmPreview, Screen};
pub use error::JuliaError;
pub use frame::Frame;
pub use planes::{Pixel, PlaneMapper};
pub use recorder::{Format, Recorder, VideoRecorder};
pub use render::Renderer;
