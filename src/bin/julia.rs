extern crate clap;
extern crate juliaset;
extern crate num_cpus;
extern crate tracing_subscriber;

use clap::{value_t, values_t, App, Arg, ArgMatches};
use juliaset::{
    Animation, AnimationConfig, Format, Headless, JuliaError, PnmPreview, Recorder, Renderer,
    Summary, VideoRecorder,
};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const FRAMES: &str = "frames";
const STEP: &str = "step";
const THREADS: &str = "threads";
const VIDEO: &str = "video";
const FORMAT: &str = "format";
const PREVIEW: &str = "preview";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("julia")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Animated Julia set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("results")
                .help("Directory for encoded video and frames"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("640")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        8192,
                        "Could not parse resolution",
                        "Resolution must be between 1 and 8192",
                    )
                })
                .help("Per-axis resolution N; frames are 2N x N"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .required(false)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("240")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1_000_000,
                        "Could not parse frame count",
                        "Frame count must be between 0 and 1000000",
                    )
                })
                .help("Number of frames to render before stopping"),
        )
        .arg(
            Arg::with_name(STEP)
                .required(false)
                .long(STEP)
                .short("d")
                .takes_value(true)
                .default_value("0.01")
                .allow_hyphen_values(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        -10.0,
                        10.0,
                        "Could not parse theta step",
                        "Theta step must be between -10 and 10",
                    )
                })
                .help("How far theta advances per frame"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use per frame [default: all cores]"),
        )
        .arg(
            Arg::with_name(VIDEO)
                .long(VIDEO)
                .short("v")
                .help("Record the frames and encode them when the run ends"),
        )
        .arg(
            Arg::with_name(FORMAT)
                .required(false)
                .long(FORMAT)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .possible_values(&["mp4", "gif", "frames"])
                .help("Output format when recording; repeat for more than one [default: mp4, gif]"),
        )
        .arg(
            Arg::with_name(PREVIEW)
                .required(false)
                .long(PREVIEW)
                .short("p")
                .takes_value(true)
                .help("Keep this PGM file updated with the latest frame"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<Summary, JuliaError> {
    let size = value_t!(matches, SIZE, usize).unwrap_or_else(|e| e.exit());
    let frames = value_t!(matches, FRAMES, usize).unwrap_or_else(|e| e.exit());
    let step = value_t!(matches, STEP, f64).unwrap_or_else(|e| e.exit());
    let threads = if matches.is_present(THREADS) {
        value_t!(matches, THREADS, usize).unwrap_or_else(|e| e.exit())
    } else {
        num_cpus::get()
    };

    let mut config = AnimationConfig {
        step,
        ..AnimationConfig::default()
    };
    if matches.is_present(FORMAT) {
        config.formats = values_t!(matches, FORMAT, Format).unwrap_or_else(|e| e.exit());
    }

    let renderer = Renderer::new(size, threads)?;
    let mut animation = Animation::new(renderer, config)?;
    let mut recorder = if matches.is_present(VIDEO) {
        Some(VideoRecorder::new(matches.value_of(OUTPUT).unwrap_or("results")))
    } else {
        None
    };
    let recorder = recorder.as_mut().map(|r| r as &mut dyn Recorder);

    let mut screen = Headless::with_frames(frames);
    match matches.value_of(PREVIEW) {
        Some(path) => animation.run(&mut PnmPreview::new(path, screen), recorder),
        None => animation.run(&mut screen, recorder),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = args();
    match run(&matches) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(summary) => {
            println!("Rendered {} frames", summary.frames);
            for artifact in summary.artifacts {
                println!("Wrote {}", artifact.display());
            }
        }
    }
}
