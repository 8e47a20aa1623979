use std::io::Write;
use std::ops::ControlFlow;

use crate::animation::{AnimationDriver, DriveSummary, Frame, FrameLayout, FrameSink};

use super::ExportError;

/// Column header written by [`CsvSink`].
pub const CSV_HEADER: &str = "frame,time,medium,x,ex,ey,ez,bx,by,bz";

/// Streams frames as CSV rows: one row per frame, wave and grid point.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    labels: Vec<String>,
}

impl<W: Write> CsvSink<W> {
    /// Wraps `writer`; the header is written in [`FrameSink::begin`].
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            labels: Vec::new(),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for CsvSink<W> {
    fn begin(&mut self, layout: &FrameLayout<'_>) -> Result<(), ExportError> {
        self.labels = layout.waves.iter().map(|w| escape(w.medium().name())).collect();
        writeln!(self.writer, "{CSV_HEADER}")?;
        Ok(())
    }

    fn consume(&mut self, frame: &Frame) -> Result<ControlFlow<()>, ExportError> {
        for (label, buffer) in self.labels.iter().zip(&frame.buffers) {
            for s in &buffer.samples {
                writeln!(
                    self.writer,
                    "{},{:.16e},{},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e}",
                    frame.index,
                    frame.time,
                    label,
                    s.position,
                    s.electric.x,
                    s.electric.y,
                    s.electric.z,
                    s.magnetic.x,
                    s.magnetic.y,
                    s.magnetic.z,
                )?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the whole frame sequence of `driver` as CSV.
///
/// # Errors
/// `ExportError::Stream` when the writer fails.
pub fn write_frames_csv<W: Write>(writer: W, driver: &AnimationDriver) -> Result<DriveSummary, ExportError> {
    let mut sink = CsvSink::new(writer);
    driver.drive(&mut sink)
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::animation::Timeline;
    use crate::fields::WaveParameters;
    use crate::grid::SampleGrid;
    use crate::materials::{Medium, GLASS, VACUUM};

    #[test]
    fn rows_carry_medium_and_field_components() {
        let base = WaveParameters::default();
        let driver = AnimationDriver::comparison(
            vec![base.in_medium(VACUUM), base.in_medium(GLASS)],
            SampleGrid::from_positions(vec![0.0, 0.25]).unwrap(),
            Timeline::with_frame_count(2, 4).unwrap(),
        )
        .unwrap();
        let mut out = Vec::new();
        let summary = write_frames_csv(&mut out, &driver).unwrap();
        assert_eq!(summary.frames_delivered, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 1 + 2 * 2 * 2);

        // frame 0, vacuum, x = λ/4: E_y = 1, B_z = 1
        let cols: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(cols[0], "0");
        assert_eq!(cols[2], "Vacuum");
        assert_relative_eq!(cols[5].parse::<f64>().unwrap(), 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(cols[9].parse::<f64>().unwrap(), 1.0, epsilon = 1.0e-12);

        // frame 0, glass, x = λ/4: B_z = n E_y
        let cols: Vec<&str> = lines[4].split(',').collect();
        assert_eq!(cols[2], "Glass");
        assert_relative_eq!(cols[9].parse::<f64>().unwrap(), 1.5, epsilon = 1.0e-12);
    }

    #[test]
    fn medium_names_with_commas_are_quoted() {
        let medium = Medium::new("oil, mineral", 1.47).unwrap();
        let driver = AnimationDriver::new(
            WaveParameters::default().in_medium(medium),
            SampleGrid::from_positions(vec![0.0]).unwrap(),
            Timeline::with_frame_count(1, 1).unwrap(),
        );
        let mut out = Vec::new();
        write_frames_csv(&mut out, &driver).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(",\"oil, mineral\","));
    }
}
