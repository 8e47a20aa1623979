//! Legacy ASCII VTK export.
//!
//! Each frame becomes a POLYDATA file readable by ParaView: one polyline per
//! wave along the propagation axis, with `electric` and `magnetic` point
//! vectors and an integer `wave` scalar telling overlaid media apart.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::animation::{Frame, FrameLayout, FrameSink};

use super::{ExportError, StagedSequence};

/// Writes the VTK ASCII file header.
pub fn write_vtk_header<W: Write>(mut writer: W, title: &str) -> io::Result<()> {
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    // The title line is limited to 256 characters and must not break.
    let title: String = title.chars().filter(|c| *c != '\n').take(255).collect();
    writeln!(writer, "{title}")?;
    writeln!(writer, "ASCII")?;
    Ok(())
}

/// Writes one frame as a POLYDATA dataset.
pub fn write_frame_vtk<W: Write>(mut writer: W, frame: &Frame) -> io::Result<()> {
    write_vtk_header(
        &mut writer,
        &format!("em-wave frame {} t={:.6}", frame.index, frame.time),
    )?;
    let total: usize = frame.buffers.iter().map(|b| b.len()).sum();

    writeln!(writer, "DATASET POLYDATA")?;
    writeln!(writer, "POINTS {total} double")?;
    for buffer in &frame.buffers {
        for s in &buffer.samples {
            writeln!(writer, "{:.9e} 0 0", s.position)?;
        }
    }

    let cells = frame.buffers.len();
    writeln!(writer, "LINES {cells} {}", total + cells)?;
    let mut offset = 0;
    for buffer in &frame.buffers {
        write!(writer, "{}", buffer.len())?;
        for i in offset..offset + buffer.len() {
            write!(writer, " {i}")?;
        }
        writeln!(writer)?;
        offset += buffer.len();
    }

    writeln!(writer, "POINT_DATA {total}")?;
    writeln!(writer, "SCALARS wave int 1")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for (k, buffer) in frame.buffers.iter().enumerate() {
        for _ in &buffer.samples {
            writeln!(writer, "{k}")?;
        }
    }
    writeln!(writer, "VECTORS electric double")?;
    for s in frame.buffers.iter().flat_map(|b| &b.samples) {
        writeln!(writer, "{:.9e} {:.9e} {:.9e}", s.electric.x, s.electric.y, s.electric.z)?;
    }
    writeln!(writer, "VECTORS magnetic double")?;
    for s in frame.buffers.iter().flat_map(|b| &b.samples) {
        writeln!(writer, "{:.9e} {:.9e} {:.9e}", s.magnetic.x, s.magnetic.y, s.magnetic.z)?;
    }
    Ok(())
}

/// Writes `<stem>_NNNNNN.vtk` per frame next to a base path.
///
/// Frames are staged until [`FrameSink::finish`]; a run that fails part way
/// leaves none of them behind.
#[derive(Debug)]
pub struct VtkSeriesSink {
    base: PathBuf,
    staging: Option<StagedSequence>,
    outputs: Vec<PathBuf>,
}

impl VtkSeriesSink {
    /// Sink naming its files after `base`.
    #[must_use]
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            staging: None,
            outputs: Vec::new(),
        }
    }

    /// Files moved into place, in frame order; empty until the run finishes.
    #[must_use]
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Consumes the sink, returning the written files.
    #[must_use]
    pub fn into_outputs(self) -> Vec<PathBuf> {
        self.outputs
    }
}

impl FrameSink for VtkSeriesSink {
    fn begin(&mut self, _layout: &FrameLayout<'_>) -> Result<(), ExportError> {
        self.staging = Some(StagedSequence::create(&self.base, "vtk")?);
        Ok(())
    }

    fn consume(&mut self, frame: &Frame) -> Result<ControlFlow<()>, ExportError> {
        let staging = match &mut self.staging {
            Some(staging) => staging,
            None => self.staging.insert(StagedSequence::create(&self.base, "vtk")?),
        };
        let path = staging.stage_path(frame.index);
        let file = File::create(&path).map_err(ExportError::io(&path))?;
        let mut writer = BufWriter::new(file);
        write_frame_vtk(&mut writer, frame)
            .and_then(|()| writer.flush())
            .map_err(ExportError::io(&path))?;
        staging.staged(frame.index);
        Ok(ControlFlow::Continue(()))
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        if let Some(staging) = self.staging.take() {
            let frames = staging.len();
            self.outputs = staging.commit()?;
            debug!(frames, base = %self.base.display(), "wrote vtk series");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationDriver, Timeline};
    use crate::fields::WaveParameters;
    use crate::grid::SampleGrid;
    use crate::materials::{VACUUM, WATER};

    #[test]
    fn header_has_three_lines() {
        let mut out = Vec::new();
        write_vtk_header(&mut out, "title\nwith break").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "# vtk DataFile Version 3.0\ntitlewith break\nASCII\n");
    }

    #[test]
    fn frame_lists_one_polyline_per_wave() {
        let base = WaveParameters::default();
        let driver = AnimationDriver::comparison(
            vec![base.in_medium(VACUUM), base.in_medium(WATER)],
            SampleGrid::linspace(0.0, 1.0, 3).unwrap(),
            Timeline::with_frame_count(1, 30).unwrap(),
        )
        .unwrap();
        let frame = driver.frame(0).unwrap();
        let mut out = Vec::new();
        write_frame_vtk(&mut out, &frame).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[3], "DATASET POLYDATA");
        assert_eq!(lines[4], "POINTS 6 double");
        assert!(lines.contains(&"LINES 2 8"));
        assert!(lines.contains(&"3 0 1 2"));
        assert!(lines.contains(&"3 3 4 5"));
        assert!(lines.contains(&"POINT_DATA 6"));
        let electric = lines.iter().position(|l| *l == "VECTORS electric double").unwrap();
        let magnetic = lines.iter().position(|l| *l == "VECTORS magnetic double").unwrap();
        assert_eq!(magnetic - electric, 7);
        assert_eq!(lines.len(), magnetic + 7);
    }
}
