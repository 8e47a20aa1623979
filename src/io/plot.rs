//! 3D plots of the field curves with plotters.
//!
//! The propagation axis runs left to right, `E_y`/`B_y` vertically and
//! `E_z`/`B_z` in depth. Each wave gets one palette colour; the magnetic curve
//! uses a lighter shade of it.

use std::fmt::Display;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tempfile::TempPath;
use tracing::debug;

use crate::animation::{Frame, FrameLayout, FrameSink};
use crate::math::Scalar;

use super::{parent_dir, ExportError, ExportOptions, StagedSequence, WAVE_PALETTE};

/// Fraction of the electric amplitude added around the curves.
const PADDING: Scalar = 0.15;

/// Everything about a plot that stays fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    /// Chart caption.
    pub title: String,
    /// Extent of the propagation axis.
    pub axial: (Scalar, Scalar),
    /// Half-width of both transverse axes.
    pub transverse: Scalar,
    /// Medium name per wave, in buffer order.
    pub labels: Vec<String>,
}

impl PlotSpec {
    /// Derives title, axis limits and legend labels from the run layout.
    #[must_use]
    pub fn from_layout(layout: &FrameLayout<'_>) -> Self {
        let title = match layout.waves {
            [single] => format!("Electromagnetic Plane Wave in {}", single.medium().name()),
            _ => "EM Wave Comparison: Different Propagation Mediums".to_owned(),
        };
        let peak_e = layout.peak_electric();
        let transverse = peak_e.max(layout.peak_magnetic()) + PADDING * peak_e;
        Self {
            title,
            axial: (layout.grid.start(), layout.grid.stop()),
            transverse,
            labels: layout
                .waves
                .iter()
                .map(|w| w.medium().name().to_owned())
                .collect(),
        }
    }
}

/// Palette colour of wave `index`, cycling past the end.
#[must_use]
pub fn wave_color(index: usize) -> RGBColor {
    let (r, g, b) = WAVE_PALETTE[index % WAVE_PALETTE.len()];
    RGBColor(r, g, b)
}

/// Time label drawn in the corner of every frame.
#[must_use]
pub fn time_label(time: Scalar) -> String {
    format!("t = {time:.2} s")
}

/// Draws `frame` onto `area`; the caller presents it.
///
/// # Errors
/// Backend drawing errors.
pub fn draw_frame<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    spec: &PlotSpec,
    frame: &Frame,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    area.fill(&WHITE)?;
    let r = spec.transverse;
    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(16)
        .build_cartesian_3d(spec.axial.0..spec.axial.1, -r..r, -r..r)?;
    chart.with_projection(|mut pb| {
        pb.pitch = 0.39;
        pb.yaw = 0.6;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    for (k, (buffer, label)) in frame.buffers.iter().zip(&spec.labels).enumerate() {
        let color = wave_color(k);
        let electric = color.stroke_width(2);
        let magnetic = color.mix(0.45).stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                buffer
                    .samples
                    .iter()
                    .map(|s| (s.position, s.electric.y, s.electric.z)),
                electric,
            ))?
            .label(format!("E ({label})"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], electric));
        chart
            .draw_series(LineSeries::new(
                buffer
                    .samples
                    .iter()
                    .map(|s| (s.position, s.magnetic.y, s.magnetic.z)),
                magnetic,
            ))?
            .label(format!("B ({label})"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], magnetic));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    let (_, height) = area.dim_in_pixel();
    area.draw(&Text::new(
        time_label(frame.time),
        (16, height as i32 - 32),
        ("sans-serif", 18),
    ))?;
    Ok(())
}

fn render_error<E: Display>(frame: usize) -> impl FnOnce(E) -> ExportError {
    move |err| ExportError::Render {
        frame,
        message: err.to_string(),
    }
}

fn staged_path(target: &Path, extension: &str) -> Result<TempPath, ExportError> {
    Ok(tempfile::Builder::new()
        .prefix(".em-wave")
        .suffix(&format!(".{extension}"))
        .tempfile_in(parent_dir(target))
        .map_err(ExportError::io(target))?
        .into_temp_path())
}

/// Writes an animated GIF, one image per frame at `1000 / fps` ms.
pub struct GifSink {
    target: PathBuf,
    size: (u32, u32),
    spec: Option<PlotSpec>,
    staged: Option<TempPath>,
    area: Option<DrawingArea<BitMapBackend<'static>, Shift>>,
}

impl GifSink {
    /// Sink writing to `target` once the run finishes.
    #[must_use]
    pub fn new(target: &Path, options: &ExportOptions) -> Self {
        Self {
            target: target.to_path_buf(),
            size: (options.width, options.height),
            spec: None,
            staged: None,
            area: None,
        }
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, layout: &FrameLayout<'_>) -> Result<(), ExportError> {
        let staged = staged_path(&self.target, "gif")?;
        let delay = 1000 / layout.timeline.fps().max(1);
        let backend = BitMapBackend::gif(&staged, self.size, delay).map_err(render_error(0))?;
        self.area = Some(backend.into_drawing_area());
        self.staged = Some(staged);
        self.spec = Some(PlotSpec::from_layout(layout));
        Ok(())
    }

    fn consume(&mut self, frame: &Frame) -> Result<ControlFlow<()>, ExportError> {
        if let (Some(area), Some(spec)) = (&self.area, &self.spec) {
            draw_frame(area, spec, frame).map_err(render_error(frame.index))?;
            area.present().map_err(render_error(frame.index))?;
        }
        Ok(ControlFlow::Continue(()))
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        // Dropping the backend writes the GIF trailer.
        self.area = None;
        if let Some(staged) = self.staged.take() {
            staged
                .persist(&self.target)
                .map_err(|err| ExportError::io(&self.target)(err.error))?;
            debug!(path = %self.target.display(), "wrote gif");
        }
        Ok(())
    }
}

/// Writes one PNG per frame as `<stem>_NNNNNN.png`.
///
/// Frames are staged until [`FrameSink::finish`]; a run that fails part way
/// leaves none of them behind.
#[derive(Debug)]
pub struct PngSequenceSink {
    base: PathBuf,
    size: (u32, u32),
    spec: Option<PlotSpec>,
    staging: Option<StagedSequence>,
    outputs: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink naming its files after `base`.
    #[must_use]
    pub fn new(base: &Path, options: &ExportOptions) -> Self {
        Self {
            base: base.to_path_buf(),
            size: (options.width, options.height),
            spec: None,
            staging: None,
            outputs: Vec::new(),
        }
    }

    /// Consumes the sink, returning the written files.
    #[must_use]
    pub fn into_outputs(self) -> Vec<PathBuf> {
        self.outputs
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, layout: &FrameLayout<'_>) -> Result<(), ExportError> {
        self.staging = Some(StagedSequence::create(&self.base, "png")?);
        self.spec = Some(PlotSpec::from_layout(layout));
        Ok(())
    }

    fn consume(&mut self, frame: &Frame) -> Result<ControlFlow<()>, ExportError> {
        let (Some(spec), Some(staging)) = (&self.spec, &mut self.staging) else {
            return Ok(ControlFlow::Continue(()));
        };
        let path = staging.stage_path(frame.index);
        {
            let area = BitMapBackend::new(&path, self.size).into_drawing_area();
            draw_frame(&area, spec, frame).map_err(render_error(frame.index))?;
            area.present().map_err(render_error(frame.index))?;
        }
        staging.staged(frame.index);
        Ok(ControlFlow::Continue(()))
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        if let Some(staging) = self.staging.take() {
            let frames = staging.len();
            self.outputs = staging.commit()?;
            debug!(frames, base = %self.base.display(), "wrote png sequence");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::animation::{AnimationDriver, Timeline};
    use crate::fields::WaveParameters;
    use crate::grid::SampleGrid;
    use crate::materials::{GLASS, VACUUM, WATER};

    fn grid() -> SampleGrid {
        SampleGrid::linspace(0.0, 4.0, 10).unwrap()
    }

    #[test]
    fn single_wave_title_names_the_medium() {
        let params = WaveParameters::default().in_medium(WATER);
        let driver = AnimationDriver::new(params, grid(), Timeline::with_frame_count(1, 30).unwrap());
        let spec = PlotSpec::from_layout(&driver.layout());
        assert_eq!(spec.title, "Electromagnetic Plane Wave in Water");
        assert_eq!(spec.axial, (0.0, 4.0));
        assert_relative_eq!(spec.transverse, 1.33 + 0.15, epsilon = 1.0e-12);
        assert_eq!(spec.labels, vec!["Water".to_owned()]);
    }

    #[test]
    fn comparison_title_and_limits_cover_every_medium() {
        let base = WaveParameters::builder().amplitude(2.0).build().unwrap();
        let driver = AnimationDriver::comparison(
            vec![base.in_medium(VACUUM), base.in_medium(GLASS)],
            grid(),
            Timeline::with_frame_count(1, 30).unwrap(),
        )
        .unwrap();
        let spec = PlotSpec::from_layout(&driver.layout());
        assert_eq!(spec.title, "EM Wave Comparison: Different Propagation Mediums");
        assert_relative_eq!(spec.transverse, 3.0 + 0.3, epsilon = 1.0e-12);
        assert_eq!(spec.labels.len(), 2);
    }

    #[test]
    fn palette_cycles_and_labels_format_time() {
        assert_eq!(wave_color(0), RGBColor(214, 39, 40));
        assert_eq!(wave_color(7), wave_color(1));
        assert_eq!(time_label(1.0 / 3.0), "t = 0.33 s");
    }
}
