//! MP4 output by stitching plotted PNG frames with an external encoder.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

#[cfg(feature = "render")]
use crate::animation::{AnimationDriver, DriveSummary};

use super::ExportError;
#[cfg(feature = "render")]
use super::{parent_dir, ExportOptions};

/// printf-style pattern matching the frames written by [`super::sequence_path`]
/// for a `frame.png` base.
pub const FRAME_PATTERN: &str = "frame_%06d.png";

/// Command-line video encoder (ffmpeg or a compatible executable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    /// Encoder run as `program`, looked up on `PATH` unless it is a path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Checks that the encoder can be started (`<program> -version`).
    ///
    /// # Errors
    /// `EncoderUnavailable` when the program cannot be spawned,
    /// `EncoderFailed` when it exits unsuccessfully.
    pub fn probe(&self) -> Result<(), ExportError> {
        let status = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ExportError::EncoderUnavailable {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(ExportError::EncoderFailed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }

    /// Encodes the numbered images matching `pattern` into an H.264 MP4 at `output`.
    ///
    /// # Errors
    /// `EncoderUnavailable` or `EncoderFailed`.
    pub fn encode(&self, pattern: &Path, fps: u32, output: &Path) -> Result<(), ExportError> {
        let fps = fps.to_string();
        let args: [&OsStr; 15] = [
            "-y".as_ref(),
            "-loglevel".as_ref(),
            "error".as_ref(),
            "-framerate".as_ref(),
            fps.as_ref(),
            "-i".as_ref(),
            pattern.as_os_str(),
            "-c:v".as_ref(),
            "libx264".as_ref(),
            "-pix_fmt".as_ref(),
            "yuv420p".as_ref(),
            "-f".as_ref(),
            "mp4".as_ref(),
            "-an".as_ref(),
            output.as_os_str(),
        ];
        debug!(program = %self.program, ?args, "running video encoder");
        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| ExportError::EncoderUnavailable {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(ExportError::EncoderFailed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Renders every frame to a staging directory and encodes it into `target`.
///
/// The encoder is probed before anything is written; the staging directory
/// is removed whether or not encoding succeeds.
#[cfg(feature = "render")]
pub(crate) fn export_mp4(
    driver: &AnimationDriver,
    target: &Path,
    options: &ExportOptions,
) -> Result<DriveSummary, ExportError> {
    let encoder = FfmpegEncoder::new(options.encoder.as_str());
    encoder.probe()?;

    let parent = parent_dir(target);
    let frames = tempfile::Builder::new()
        .prefix(".em-wave-frames")
        .tempdir_in(parent)
        .map_err(ExportError::io(target))?;
    let mut sink = super::plot::PngSequenceSink::new(&frames.path().join("frame.png"), options);
    let summary = driver.drive(&mut sink)?;

    let staged = tempfile::Builder::new()
        .prefix(".em-wave")
        .suffix(".mp4")
        .tempfile_in(parent)
        .map_err(ExportError::io(target))?
        .into_temp_path();
    encoder.encode(
        &frames.path().join(FRAME_PATTERN),
        driver.timeline().fps(),
        &staged,
    )?;
    staged
        .persist(target)
        .map_err(|err| ExportError::io(target)(err.error))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_unavailable() {
        let encoder = FfmpegEncoder::new("em-wave-no-such-encoder");
        let err = encoder.probe().unwrap_err();
        assert!(matches!(err, ExportError::EncoderUnavailable { ref program, .. } if program == "em-wave-no-such-encoder"));
        let err = encoder
            .encode(Path::new("frame_%06d.png"), 30, Path::new("out.mp4"))
            .unwrap_err();
        assert!(matches!(err, ExportError::EncoderUnavailable { .. }));
    }

    #[test]
    fn default_encoder_is_ffmpeg() {
        assert_eq!(FfmpegEncoder::default().program(), "ffmpeg");
    }
}
