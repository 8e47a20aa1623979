//! I/O helpers for exporting animations.
//!
//! Numeric exports (CSV, VTK) only need the frame sequence. Plotted exports
//! (GIF, PNG frames, MP4) need the `render` feature, and MP4 additionally an
//! external encoder. Every output file is staged in a temporary file next to
//! its target and renamed into place on success; frame sequences are staged
//! as a whole and moved into place only once every frame has been written.

mod csv;
#[cfg(feature = "render")]
pub mod plot;
pub mod video;
pub mod vtk;

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tempfile::{NamedTempFile, TempDir};
use thiserror::Error;
use tracing::{info, warn};

use crate::animation::AnimationDriver;

pub use csv::{write_frames_csv, CsvSink, CSV_HEADER};
pub use video::FfmpegEncoder;
pub use vtk::{write_frame_vtk, write_vtk_header, VtkSeriesSink};

/// Curve colours per wave, cycled in buffer order.
pub const WAVE_PALETTE: [(u8, u8, u8); 6] = [
    (214, 39, 40),
    (31, 119, 180),
    (44, 160, 44),
    (255, 127, 14),
    (148, 103, 189),
    (140, 86, 75),
];

/// Export failures, carrying the underlying cause.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output extension does not name a known format.
    #[error("unsupported export format for {}: expected one of csv, vtk, gif, png, mp4", path.display())]
    UnsupportedFormat {
        /// Requested output path.
        path: PathBuf,
    },
    /// A plotted format was requested from a build without the `render` feature.
    #[error("{format} export requires the `render` feature")]
    RenderingUnavailable {
        /// Requested format.
        format: ExportFormat,
    },
    /// Creating, writing or persisting an output file failed.
    #[error("failed to write {}", path.display())]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Writing to a caller-supplied stream failed.
    #[error("failed to write frame data")]
    Stream(#[from] io::Error),
    /// The plotting backend failed.
    #[error("failed to render frame {frame}: {message}")]
    Render {
        /// Frame index.
        frame: usize,
        /// Backend error text.
        message: String,
    },
    /// The external video encoder could not be started.
    #[error("video encoder `{program}` is not available")]
    EncoderUnavailable {
        /// Encoder executable.
        program: String,
        /// Spawn failure.
        #[source]
        source: io::Error,
    },
    /// The external video encoder ran but failed.
    #[error("video encoder `{program}` exited with {status}")]
    EncoderFailed {
        /// Encoder executable.
        program: String,
        /// Exit status.
        status: ExitStatus,
    },
}

impl ExportError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Output formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// One row per frame, wave and grid point.
    Csv,
    /// Legacy ASCII VTK, one file per frame.
    Vtk,
    /// Animated plot.
    Gif,
    /// One plotted PNG per frame.
    Png,
    /// Plotted frames encoded to H.264.
    Mp4,
}

impl ExportFormat {
    /// Picks the format from the (case-insensitive) extension of `path`.
    ///
    /// # Errors
    /// `UnsupportedFormat` for a missing or unknown extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("vtk") => Ok(Self::Vtk),
            Some("gif") => Ok(Self::Gif),
            Some("png") => Ok(Self::Png),
            Some("mp4") => Ok(Self::Mp4),
            _ => Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Lower-case extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Vtk => "vtk",
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Mp4 => "mp4",
        }
    }

    /// True for formats drawn with plotters.
    #[must_use]
    pub const fn requires_rendering(self) -> bool {
        matches!(self, Self::Gif | Self::Png | Self::Mp4)
    }

    /// True for formats written as one file per frame.
    #[must_use]
    pub const fn is_frame_sequence(self) -> bool {
        matches!(self, Self::Vtk | Self::Png)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Image size and encoder settings for plotted exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Video encoder executable.
    pub encoder: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            encoder: "ffmpeg".to_owned(),
        }
    }
}

/// Files produced by [`export_animation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Format written.
    pub format: ExportFormat,
    /// Written files, in frame order for sequences.
    pub outputs: Vec<PathBuf>,
    /// Frames exported.
    pub frames: usize,
}

/// Exports the whole frame sequence of `driver` to `path`.
///
/// Frame-sequence formats write `<stem>_NNNNNN.<ext>` next to `path`.
///
/// # Errors
/// Any [`ExportError`]; a failed export leaves no output files behind.
#[cfg_attr(not(feature = "render"), allow(unused_variables))]
pub fn export_animation(
    driver: &AnimationDriver,
    path: &Path,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    let format = ExportFormat::from_path(path)?;
    if format.requires_rendering() && !cfg!(feature = "render") {
        return Err(ExportError::RenderingUnavailable { format });
    }
    info!(%format, path = %path.display(), frames = driver.frame_count(), "exporting animation");

    let (frames, outputs) = match format {
        ExportFormat::Csv => {
            let mut staged = StagedFile::create(path)?;
            let frames = write_frames_csv(&mut staged, driver)
                .map_err(|err| reattach_path(err, path))?
                .frames_delivered;
            (frames, vec![staged.commit()?])
        }
        ExportFormat::Vtk => {
            let mut sink = VtkSeriesSink::new(path);
            let summary = driver.drive(&mut sink)?;
            (summary.frames_delivered, sink.into_outputs())
        }
        #[cfg(feature = "render")]
        ExportFormat::Gif => {
            let mut sink = plot::GifSink::new(path, options);
            let summary = driver.drive(&mut sink)?;
            (summary.frames_delivered, vec![path.to_path_buf()])
        }
        #[cfg(feature = "render")]
        ExportFormat::Png => {
            let mut sink = plot::PngSequenceSink::new(path, options);
            let summary = driver.drive(&mut sink)?;
            (summary.frames_delivered, sink.into_outputs())
        }
        #[cfg(feature = "render")]
        ExportFormat::Mp4 => {
            let summary = video::export_mp4(driver, path, options)?;
            (summary.frames_delivered, vec![path.to_path_buf()])
        }
        #[cfg(not(feature = "render"))]
        ExportFormat::Gif | ExportFormat::Png | ExportFormat::Mp4 => {
            return Err(ExportError::RenderingUnavailable { format });
        }
    };
    info!(files = outputs.len(), frames, "export complete");
    Ok(ExportReport {
        format,
        outputs,
        frames,
    })
}

/// Path of frame `index` in a sequence based on `base`: `<stem>_NNNNNN.<ext>`.
#[must_use]
pub fn sequence_path(base: &Path, index: usize, extension: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("frame");
    base.with_file_name(format!("{stem}_{index:06}.{extension}"))
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn reattach_path(err: ExportError, path: &Path) -> ExportError {
    match err {
        ExportError::Stream(source) => ExportError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    }
}

/// Buffered temporary file that replaces its target only on [`Self::commit`].
///
/// Dropping an uncommitted file deletes it.
pub(crate) struct StagedFile {
    writer: BufWriter<NamedTempFile>,
    target: PathBuf,
}

impl StagedFile {
    pub(crate) fn create(target: &Path) -> Result<Self, ExportError> {
        let temp = NamedTempFile::new_in(parent_dir(target)).map_err(ExportError::io(target))?;
        Ok(Self {
            writer: BufWriter::new(temp),
            target: target.to_path_buf(),
        })
    }

    pub(crate) fn commit(self) -> Result<PathBuf, ExportError> {
        let Self { writer, target } = self;
        let temp = writer
            .into_inner()
            .map_err(|err| ExportError::io(&target)(err.into_error()))?;
        let file: File = temp
            .persist(&target)
            .map_err(|err| ExportError::io(&target)(err.error))?;
        file.sync_all().map_err(ExportError::io(&target))?;
        Ok(target)
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Frame files written into a hidden directory next to their targets.
///
/// [`Self::commit`] renames every staged frame to `<stem>_NNNNNN.<ext>`;
/// dropping an uncommitted sequence deletes the directory with its frames.
#[derive(Debug)]
pub(crate) struct StagedSequence {
    dir: TempDir,
    base: PathBuf,
    extension: &'static str,
    staged: Vec<usize>,
}

impl StagedSequence {
    pub(crate) fn create(base: &Path, extension: &'static str) -> Result<Self, ExportError> {
        let dir = tempfile::Builder::new()
            .prefix(".em-wave-frames")
            .tempdir_in(parent_dir(base))
            .map_err(ExportError::io(base))?;
        Ok(Self {
            dir,
            base: base.to_path_buf(),
            extension,
            staged: Vec::new(),
        })
    }

    /// Final path of frame `index`.
    pub(crate) fn target(&self, index: usize) -> PathBuf {
        sequence_path(&self.base, index, self.extension)
    }

    /// Staging path of frame `index`; the frame counts once [`Self::staged`] is called.
    pub(crate) fn stage_path(&self, index: usize) -> PathBuf {
        let target = self.target(index);
        match target.file_name() {
            Some(name) => self.dir.path().join(name),
            None => self.dir.path().join(format!("{index:06}.{}", self.extension)),
        }
    }

    pub(crate) fn staged(&mut self, index: usize) {
        self.staged.push(index);
    }

    pub(crate) fn len(&self) -> usize {
        self.staged.len()
    }

    /// Moves every staged frame into place, in frame order.
    ///
    /// On failure the frames already moved are removed again.
    pub(crate) fn commit(self) -> Result<Vec<PathBuf>, ExportError> {
        let mut moved: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for &index in &self.staged {
            let target = self.target(index);
            if let Err(source) = std::fs::rename(self.stage_path(index), &target) {
                for path in &moved {
                    if let Err(err) = std::fs::remove_file(path) {
                        warn!(path = %path.display(), %err, "failed to remove partial frame");
                    }
                }
                return Err(ExportError::Io { path: target, source });
            }
            moved.push(target);
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Timeline;
    use crate::fields::WaveParameters;
    use crate::grid::SampleGrid;

    fn driver() -> AnimationDriver {
        AnimationDriver::new(
            WaveParameters::default(),
            SampleGrid::linspace(0.0, 1.0, 5).unwrap(),
            Timeline::with_frame_count(3, 30).unwrap(),
        )
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out/wave.GIF")).unwrap(), ExportFormat::Gif);
        assert_eq!(ExportFormat::from_path(Path::new("wave.mp4")).unwrap(), ExportFormat::Mp4);
        assert_eq!(ExportFormat::from_path(Path::new("a.b.csv")).unwrap(), ExportFormat::Csv);
        assert!(matches!(
            ExportFormat::from_path(Path::new("wave.avi")),
            Err(ExportError::UnsupportedFormat { .. })
        ));
        assert!(ExportFormat::from_path(Path::new("wave")).is_err());
        assert!(ExportFormat::Mp4.requires_rendering());
        assert!(!ExportFormat::Vtk.requires_rendering());
    }

    #[test]
    fn sequence_paths_are_numbered_next_to_base() {
        let p = sequence_path(Path::new("out/wave.png"), 7, "png");
        assert_eq!(p, PathBuf::from("out/wave_000007.png"));
        let p = sequence_path(Path::new("frames.vtk"), 12, "vtk");
        assert_eq!(p, PathBuf::from("frames_000012.vtk"));
    }

    #[test]
    fn staged_file_appears_only_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data.txt");
        let mut staged = StagedFile::create(&target).unwrap();
        staged.write_all(b"hello").unwrap();
        assert!(!target.exists());
        staged.commit().unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");

        let abandoned = dir.path().join("abandoned.txt");
        let mut staged = StagedFile::create(&abandoned).unwrap();
        staged.write_all(b"partial").unwrap();
        drop(staged);
        assert!(!abandoned.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn csv_export_writes_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.csv");
        let report = export_animation(&driver(), &path, &ExportOptions::default()).unwrap();
        assert_eq!(report.format, ExportFormat::Csv);
        assert_eq!(report.frames, 3);
        assert_eq!(report.outputs, vec![path.clone()]);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1 + 3 * 5);
    }

    #[test]
    fn vtk_export_writes_one_file_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.vtk");
        let report = export_animation(&driver(), &path, &ExportOptions::default()).unwrap();
        assert_eq!(report.outputs.len(), 3);
        assert_eq!(report.outputs[2], dir.path().join("wave_000002.vtk"));
        assert!(report.outputs.iter().all(|p| p.exists()));
        assert!(!path.exists());
    }

    #[test]
    fn blocked_frame_target_rolls_back_the_whole_vtk_series() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("wave_000002.vtk");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep.txt"), "occupied").unwrap();
        let driver = AnimationDriver::new(
            WaveParameters::default(),
            SampleGrid::linspace(0.0, 1.0, 5).unwrap(),
            Timeline::with_frame_count(4, 30).unwrap(),
        );

        let err = export_animation(&driver, &dir.path().join("wave.vtk"), &ExportOptions::default())
            .unwrap_err();
        match err {
            ExportError::Io { path, .. } => assert_eq!(path, blocker),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("wave_000000.vtk").exists());
        assert!(!dir.path().join("wave_000001.vtk").exists());
        assert!(!dir.path().join("wave_000003.vtk").exists());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(blocker.join("keep.txt").exists());
    }

    #[test]
    fn abandoned_sequence_removes_its_staged_frames() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("frames.png");
        let mut staging = StagedSequence::create(&base, "png").unwrap();
        for index in 0..3 {
            std::fs::write(staging.stage_path(index), b"frame").unwrap();
            staging.staged(index);
        }
        assert_eq!(staging.len(), 3);
        assert!(!staging.target(0).exists());
        drop(staging);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let mut staging = StagedSequence::create(&base, "png").unwrap();
        std::fs::write(staging.stage_path(0), b"frame").unwrap();
        staging.staged(0);
        let outputs = staging.commit().unwrap();
        assert_eq!(outputs, vec![dir.path().join("frames_000000.png")]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_target_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("wave.csv");
        let err = export_animation(&driver(), &path, &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }), "{err}");
        assert!(!path.exists());
    }

    #[test]
    fn unknown_extension_is_rejected_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.webm");
        assert!(matches!(
            export_animation(&driver(), &path, &ExportOptions::default()),
            Err(ExportError::UnsupportedFormat { .. })
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(feature = "render")]
    #[test]
    fn missing_encoder_is_reported_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.mp4");
        let options = ExportOptions {
            encoder: "em-wave-no-such-encoder".to_owned(),
            ..ExportOptions::default()
        };
        let err = export_animation(&driver(), &path, &options).unwrap_err();
        assert!(matches!(err, ExportError::EncoderUnavailable { .. }), "{err}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(not(feature = "render"))]
    #[test]
    fn plotted_formats_need_the_render_feature() {
        let err = export_animation(&driver(), Path::new("wave.gif"), &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::RenderingUnavailable { format: ExportFormat::Gif }));
    }
}
