//! The frame buffer and the encoders behind it.  Frames pile up in
//! render order while the animation runs; when it stops, `finalize`
//! drains the pile exactly once and writes one artifact per requested
//! format, all at the same frame rate.
//!
//! MP4 output leans on the system `ffmpeg`: raw 8-bit grey frames are
//! streamed to it on stdin.  If it isn't installed, finalize fails
//! with an `Ffmpeg` error rather than quietly skipping the video.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame as GifFrame, GrayImage};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::JuliaError;
use crate::frame::{write_pgm, Frame};

/// Output containers the recorder knows how to write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Lossy H.264 video, `video.mp4`.
    Mp4,
    /// Endlessly looping animated GIF, `video.gif`.
    Gif,
    /// One numbered PGM per frame under `frames/`.
    Frames,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp4" => Ok(Format::Mp4),
            "gif" => Ok(Format::Gif),
            "frames" => Ok(Format::Frames),
            _ => Err(format!("Unknown output format '{}'", s)),
        }
    }
}

/// Anything that can collect frames and turn them into files at the
/// end of a run.
pub trait Recorder {
    /// Add a frame to the end of the sequence.
    fn append(&mut self, frame: Frame) -> Result<(), JuliaError>;

    /// Encode every appended frame, in order, once per format.
    /// Returns the paths written.  Only the first call does anything;
    /// later calls fail with `AlreadyFinalized`.
    fn finalize(&mut self, frame_rate: u32, formats: &[Format])
        -> Result<Vec<PathBuf>, JuliaError>;
}

/// Buffers frames in memory and writes them into `output_dir`.
/// Frames are quantized to 8-bit grey as they arrive, one byte per
/// pixel, since every encoder only ever sees the grey image.
#[derive(Debug)]
pub struct VideoRecorder {
    output_dir: PathBuf,
    ffmpeg: PathBuf,
    frames: Vec<GrayImage>,
    finalized: bool,
}

impl VideoRecorder {
    /// A recorder writing into `output_dir`, which is created at
    /// finalize time if it doesn't already exist.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> VideoRecorder {
        VideoRecorder {
            output_dir: output_dir.as_ref().to_path_buf(),
            ffmpeg: PathBuf::from("ffmpeg"),
            frames: vec![],
            finalized: false,
        }
    }

    /// Use a specific ffmpeg binary instead of whatever is on `PATH`.
    pub fn with_ffmpeg<P: AsRef<Path>>(mut self, ffmpeg: P) -> VideoRecorder {
        self.ffmpeg = ffmpeg.as_ref().to_path_buf();
        self
    }

    /// Number of frames waiting to be encoded.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frames are buffered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bytes of pixel data held in the buffer.
    pub fn buffered_bytes(&self) -> usize {
        self.frames.iter().map(|f| f.as_raw().len()).sum()
    }

    /// True once finalize has been called.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn write_gif(&self, frames: &[GrayImage], frame_rate: u32) -> Result<PathBuf, JuliaError> {
        let path = self.output_dir.join("video.gif");
        let mut bytes: Vec<u8> = vec![];
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.set_repeat(Repeat::Infinite)?;
            let delay = Delay::from_numer_denom_ms(1000, frame_rate);
            for frame in frames {
                let rgba = DynamicImage::ImageLuma8(frame.clone()).into_rgba8();
                encoder.encode_frame(GifFrame::from_parts(rgba, 0, 0, delay))?;
            }
        }
        fs::write(&path, bytes)?;
        Ok(path)
    }

    fn write_frames(&self, frames: &[GrayImage]) -> Result<PathBuf, JuliaError> {
        let dir = self.output_dir.join("frames");
        fs::create_dir_all(&dir)?;
        for (i, frame) in frames.iter().enumerate() {
            write_pgm(&dir.join(format!("frame_{:06}.pgm", i)), frame)?;
        }
        Ok(dir)
    }

    fn write_mp4(&self, frames: &[GrayImage], frame_rate: u32) -> Result<PathBuf, JuliaError> {
        let path = self.output_dir.join("video.mp4");
        let size = format!("{}x{}", frames[0].width(), frames[0].height());
        let rate = frame_rate.to_string();

        let mut child = Command::new(&self.ffmpeg)
            .args(&["-y", "-loglevel", "error"])
            .args(&["-f", "rawvideo", "-pix_fmt", "gray", "-s", &size, "-r", &rate, "-i", "-"])
            // yuv420p wants even dimensions; the height can be odd.
            .args(&["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
            .args(&["-c:v", "libx264", "-pix_fmt", "yuv420p", "-crf", "20"])
            .arg(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| {
                JuliaError::Ffmpeg(format!("could not start {}: {}", self.ffmpeg.display(), e))
            })?;

        let written = match child.stdin.take() {
            Some(mut stdin) => frames
                .iter()
                .try_for_each(|frame| stdin.write_all(frame.as_raw())),
            None => Ok(()),
        };

        let status = child.wait()?;
        if !status.success() {
            return Err(JuliaError::Ffmpeg(format!("exited with {}", status)));
        }
        if let Err(e) = written {
            return Err(JuliaError::Ffmpeg(format!("frame stream closed early: {}", e)));
        }
        Ok(path)
    }
}

impl Recorder for VideoRecorder {
    fn append(&mut self, frame: Frame) -> Result<(), JuliaError> {
        if self.finalized {
            return Err(JuliaError::AlreadyFinalized);
        }
        self.frames.push(frame.to_luma());
        debug!(
            index = frame.index(),
            buffered = self.frames.len(),
            bytes = self.buffered_bytes(),
            "frame buffered"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), name = "VideoRecorder.finalize")]
    fn finalize(
        &mut self,
        frame_rate: u32,
        formats: &[Format],
    ) -> Result<Vec<PathBuf>, JuliaError> {
        if self.finalized {
            return Err(JuliaError::AlreadyFinalized);
        }
        if frame_rate == 0 {
            return Err(JuliaError::InvalidFrameRate);
        }
        self.finalized = true;

        let frames = std::mem::replace(&mut self.frames, vec![]);
        if frames.is_empty() {
            warn!("No frames were recorded; nothing to encode");
            return Ok(vec![]);
        }

        fs::create_dir_all(&self.output_dir)?;
        let mut artifacts = Vec::with_capacity(formats.len());
        for format in formats {
            let path = match format {
                Format::Mp4 => self.write_mp4(&frames, frame_rate)?,
                Format::Gif => self.write_gif(&frames, frame_rate)?,
                Format::Frames => self.write_frames(&frames)?,
            };
            info!(format = ?format, frames = frames.len(), path = %path.display(), "wrote artifact");
            artifacts.push(path);
        }
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::intensity;
    use crate::render::Renderer;
    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;
    use std::fs::File;
    use std::io::BufReader;

    // A 6x3 frame filled with the kth brightness level, so each frame
    // in a sequence is distinguishable after encoding.
    fn flat_frame(k: usize) -> Frame {
        Frame::from_intensities(6, 3, k, k as f64 * 0.01, vec![intensity(k); 18])
    }

    fn grey(k: usize) -> u8 {
        (intensity(k) * 255.0) as u8
    }

    fn record(dir: &Path, count: usize, formats: &[Format]) -> Vec<PathBuf> {
        let mut recorder = VideoRecorder::new(dir);
        for k in 0..count {
            recorder.append(flat_frame(k)).unwrap();
        }
        assert_eq!(recorder.len(), count);
        let artifacts = recorder.finalize(24, formats).unwrap();
        assert!(recorder.is_empty());
        artifacts
    }

    fn gif_levels(path: &Path) -> Vec<u8> {
        let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
        decoder
            .into_frames()
            .collect_frames()
            .unwrap()
            .iter()
            .map(|f| f.buffer().get_pixel(0, 0)[0])
            .collect()
    }

    fn pgm_levels(dir: &Path) -> Vec<u8> {
        let mut names: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        names.sort();
        names
            .iter()
            .map(|p| image::open(p).unwrap().to_luma8().get_pixel(0, 0)[0])
            .collect()
    }

    #[test]
    fn formats_parse() {
        assert_eq!("mp4".parse::<Format>(), Ok(Format::Mp4));
        assert_eq!("GIF".parse::<Format>(), Ok(Format::Gif));
        assert_eq!("frames".parse::<Format>(), Ok(Format::Frames));
        assert!("avi".parse::<Format>().is_err());
    }

    #[test]
    fn zero_frames_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let artifacts = record(&out, 0, &[Format::Gif, Format::Frames, Format::Mp4]);
        assert!(artifacts.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn one_frame_is_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = record(dir.path(), 1, &[Format::Gif, Format::Frames]);
        assert_eq!(artifacts.len(), 2);
        assert_eq!(gif_levels(&artifacts[0]), vec![grey(0)]);
        assert_eq!(pgm_levels(&artifacts[1]), vec![grey(0)]);
    }

    #[test]
    fn twenty_four_frames_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = record(dir.path(), 24, &[Format::Gif, Format::Frames]);
        let expected: Vec<u8> = (0..24).map(grey).collect();
        assert_eq!(gif_levels(&artifacts[0]), expected);
        assert_eq!(pgm_levels(&artifacts[1]), expected);
        assert_eq!(artifacts[0], dir.path().join("video.gif"));
        assert_eq!(artifacts[1], dir.path().join("frames"));
    }

    #[test]
    fn finalize_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = VideoRecorder::new(dir.path());
        recorder.append(flat_frame(3)).unwrap();
        assert!(recorder.finalize(24, &[Format::Frames]).is_ok());
        assert!(recorder.is_finalized());
        match recorder.finalize(24, &[Format::Frames]) {
            Err(JuliaError::AlreadyFinalized) => {}
            other => panic!("expected AlreadyFinalized, got {:?}", other),
        }
        assert!(recorder.append(flat_frame(4)).is_err());
    }

    #[test]
    fn zero_frame_rate_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = VideoRecorder::new(dir.path());
        recorder.append(flat_frame(0)).unwrap();
        assert!(recorder.finalize(0, &[Format::Gif]).is_err());
        // The bad call didn't use up the one finalize.
        assert!(!recorder.is_finalized());
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn missing_ffmpeg_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder =
            VideoRecorder::new(dir.path()).with_ffmpeg(dir.path().join("no-such-ffmpeg"));
        recorder.append(flat_frame(0)).unwrap();
        match recorder.finalize(24, &[Format::Mp4]) {
            Err(JuliaError::Ffmpeg(_)) => {}
            other => panic!("expected an ffmpeg failure, got {:?}", other),
        }
    }

    #[test]
    fn buffer_holds_one_byte_per_pixel() {
        let renderer = Renderer::new(64, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = VideoRecorder::new(dir.path());
        for k in 0..3 {
            recorder.append(renderer.render(k as f64 * 0.01)).unwrap();
        }
        assert_eq!(recorder.buffered_bytes(), 3 * 128 * 64);
    }

    // Stands in for ffmpeg: records its arguments and swallows stdin.
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let script = dir.join("ffmpeg");
        fs::write(
            &script,
            "#!/bin/sh\nd=$(dirname \"$0\")\nprintf '%s\\n' \"$@\" > \"$d/argv.txt\"\ncat > \"$d/stdin.raw\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn record_mp4(count: usize) -> (tempfile::TempDir, Vec<PathBuf>) {
        let tools = tempfile::tempdir().unwrap();
        let script = fake_ffmpeg(tools.path());
        // Exec can fail with "Text file busy" if another test forks
        // while the script is still open for writing; try again.
        for _ in 0..10 {
            let mut recorder = VideoRecorder::new(tools.path().join("out")).with_ffmpeg(&script);
            for k in 0..count {
                recorder.append(flat_frame(k)).unwrap();
            }
            match recorder.finalize(24, &[Format::Mp4]) {
                Ok(artifacts) => return (tools, artifacts),
                Err(JuliaError::Ffmpeg(ref msg)) if msg.contains("busy") => {
                    std::thread::sleep(std::time::Duration::from_millis(50))
                }
                Err(e) => panic!("mp4 encode failed: {}", e),
            }
        }
        panic!("stand-in ffmpeg never ran");
    }

    #[cfg(unix)]
    #[test]
    fn mp4_streams_frames_in_order() {
        for &count in &[1, 24] {
            let (tools, artifacts) = record_mp4(count);
            assert_eq!(artifacts, vec![tools.path().join("out").join("video.mp4")]);

            let stdin = fs::read(tools.path().join("stdin.raw")).unwrap();
            assert_eq!(stdin.len(), count * 6 * 3);
            for (k, chunk) in stdin.chunks(18).enumerate() {
                assert!(chunk.iter().all(|&b| b == grey(k)), "frame {} out of order", k);
            }

            let argv = fs::read_to_string(tools.path().join("argv.txt")).unwrap();
            let argv: Vec<&str> = argv.lines().collect();
            assert!(argv.windows(2).any(|w| w == ["-r", "24"]));
            assert!(argv.windows(2).any(|w| w == ["-s", "6x3"]));
            assert!(argv.windows(2).any(|w| w == ["-i", "-"]));
        }
    }

    #[cfg(unix)]
    #[test]
    fn mp4_with_no_frames_never_starts_ffmpeg() {
        let (tools, artifacts) = record_mp4(0);
        assert!(artifacts.is_empty());
        assert!(!tools.path().join("stdin.raw").exists());
        assert!(!tools.path().join("argv.txt").exists());
    }
}
