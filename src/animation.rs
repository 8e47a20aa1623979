//! Animation driver: time sequencing and the producer → renderer boundary.
//!
//! The driver owns the wave parameters, the sample grid and the timeline, and
//! produces one [`Frame`] per time step. Frames are handed out either as a
//! lazy iterator ([`AnimationDriver::frames`]) or pushed into a
//! [`FrameSink`]; the driver itself never draws anything, so headless export
//! needs no rendering backend.

use std::iter::FusedIterator;
use std::ops::ControlFlow;

use tracing::{debug, info};

use crate::errors::{require_positive, EmWaveError};
use crate::fields::{FrameBuffer, WaveParameters};
use crate::grid::SampleGrid;
use crate::io::ExportError;
use crate::math::Scalar;

/// Uniformly spaced frame times `t_i = i / fps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    fps: u32,
    frame_count: usize,
}

impl Timeline {
    /// `floor(duration · fps)` frames at `fps` frames per second.
    ///
    /// # Errors
    /// `InvalidParameter` for a zero frame rate, a non-positive duration, or a
    /// duration shorter than one frame.
    pub fn new(duration: Scalar, fps: u32) -> Result<Self, EmWaveError> {
        let duration = require_positive("duration", duration)?;
        let fps = check_fps(fps)?;
        // Tolerance absorbs products like 0.7 * 30 landing just below an integer.
        let frame_count = (duration * Scalar::from(fps) + 1.0e-9).floor() as usize;
        if frame_count == 0 {
            return Err(EmWaveError::invalid(
                "duration",
                format!("{duration} s is shorter than one frame at {fps} fps"),
            ));
        }
        Ok(Self { fps, frame_count })
    }

    /// Exactly `frame_count` frames at `fps` frames per second.
    ///
    /// # Errors
    /// `InvalidParameter` when either value is zero.
    pub fn with_frame_count(frame_count: usize, fps: u32) -> Result<Self, EmWaveError> {
        let fps = check_fps(fps)?;
        if frame_count == 0 {
            return Err(EmWaveError::invalid("frames", "at least one frame is required"));
        }
        Ok(Self { fps, frame_count })
    }

    /// Frames per second.
    #[must_use]
    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Number of frames.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Spacing between consecutive frames.
    #[must_use]
    pub fn time_step(&self) -> Scalar {
        Scalar::from(self.fps).recip()
    }

    /// Covered duration, `frame_count / fps`.
    #[must_use]
    pub fn duration(&self) -> Scalar {
        self.frame_count as Scalar / Scalar::from(self.fps)
    }

    /// Time of frame `index`.
    #[must_use]
    pub fn time_at(&self, index: usize) -> Scalar {
        index as Scalar / Scalar::from(self.fps)
    }

    /// All frame times in order.
    pub fn times(&self) -> impl ExactSizeIterator<Item = Scalar> + '_ {
        (0..self.frame_count).map(|i| self.time_at(i))
    }
}

fn check_fps(fps: u32) -> Result<u32, EmWaveError> {
    if fps == 0 {
        return Err(EmWaveError::invalid("fps", "must be positive, got 0"));
    }
    Ok(fps)
}

/// Field snapshots of every wave at one time step.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Position in the timeline.
    pub index: usize,
    /// Time of the frame.
    pub time: Scalar,
    /// One buffer per wave, in the driver's wave order.
    pub buffers: Vec<FrameBuffer>,
}

/// Static description of a run, handed to sinks before the first frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout<'a> {
    /// Waves in buffer order.
    pub waves: &'a [WaveParameters],
    /// Shared sample grid.
    pub grid: &'a SampleGrid,
    /// Shared timeline.
    pub timeline: &'a Timeline,
}

impl FrameLayout<'_> {
    /// True when more than one wave is overlaid.
    #[must_use]
    pub fn is_comparison(&self) -> bool {
        self.waves.len() > 1
    }

    /// Largest electric amplitude over all waves.
    #[must_use]
    pub fn peak_electric(&self) -> Scalar {
        self.waves.iter().map(WaveParameters::amplitude).fold(0.0, Scalar::max)
    }

    /// Largest magnetic amplitude over all waves.
    #[must_use]
    pub fn peak_magnetic(&self) -> Scalar {
        self.waves.iter().map(WaveParameters::magnetic_amplitude).fold(0.0, Scalar::max)
    }
}

/// Consumer of the frame sequence (renderer, exporter, viewer).
pub trait FrameSink {
    /// Called once before the first frame.
    fn begin(&mut self, _layout: &FrameLayout<'_>) -> Result<(), ExportError> {
        Ok(())
    }

    /// Receives one frame; `Break` stops the run after this frame.
    fn consume(&mut self, frame: &Frame) -> Result<ControlFlow<()>, ExportError>;

    /// Called once after the last delivered frame, including after an interruption.
    fn finish(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Outcome of [`AnimationDriver::drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveSummary {
    /// Frames handed to the sink.
    pub frames_delivered: usize,
    /// True when the sink stopped the run early.
    pub interrupted: bool,
}

/// Re-evaluates the field model per frame over a fixed grid and timeline.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    waves: Vec<WaveParameters>,
    grid: SampleGrid,
    timeline: Timeline,
}

impl AnimationDriver {
    /// Driver for a single wave.
    #[must_use]
    pub fn new(params: WaveParameters, grid: SampleGrid, timeline: Timeline) -> Self {
        Self {
            waves: vec![params],
            grid,
            timeline,
        }
    }

    /// Driver overlaying several independent waves (usually one per medium)
    /// over the same grid and timeline.
    ///
    /// # Errors
    /// `InvalidParameter` when `waves` is empty.
    pub fn comparison(
        waves: Vec<WaveParameters>,
        grid: SampleGrid,
        timeline: Timeline,
    ) -> Result<Self, EmWaveError> {
        if waves.is_empty() {
            return Err(EmWaveError::invalid("media", "comparison needs at least one medium"));
        }
        Ok(Self { waves, grid, timeline })
    }

    /// Waves in buffer order.
    #[must_use]
    pub fn waves(&self) -> &[WaveParameters] {
        &self.waves
    }

    /// Sample grid.
    #[must_use]
    pub const fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    /// Timeline.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Number of frames in one pass.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.timeline.frame_count
    }

    /// True when more than one wave is overlaid.
    #[must_use]
    pub fn is_comparison(&self) -> bool {
        self.waves.len() > 1
    }

    /// Layout handed to sinks.
    #[must_use]
    pub fn layout(&self) -> FrameLayout<'_> {
        FrameLayout {
            waves: &self.waves,
            grid: &self.grid,
            timeline: &self.timeline,
        }
    }

    /// Computes frame `index`, or `None` past the end of the timeline.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<Frame> {
        if index >= self.timeline.frame_count {
            return None;
        }
        let time = self.timeline.time_at(index);
        let buffers = self.waves.iter().map(|w| w.snapshot(&self.grid, time)).collect();
        Some(Frame { index, time, buffers })
    }

    /// Lazy pass over all frames; call again to restart.
    #[must_use]
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            driver: self,
            next: 0,
        }
    }

    /// Lazy pass over the buffers of wave `wave` alone.
    #[must_use]
    pub fn sequence(&self, wave: usize) -> Option<FrameBuffers<'_>> {
        let params = self.waves.get(wave)?;
        Some(FrameBuffers {
            params,
            grid: &self.grid,
            timeline: &self.timeline,
            next: 0,
        })
    }

    /// Pushes every frame into `sink` until the timeline ends or the sink breaks.
    ///
    /// # Errors
    /// The first error returned by the sink; no further frames are produced.
    pub fn drive<S: FrameSink + ?Sized>(&self, sink: &mut S) -> Result<DriveSummary, ExportError> {
        info!(
            frames = self.frame_count(),
            fps = self.timeline.fps(),
            waves = self.waves.len(),
            points = self.grid.len(),
            "driving animation"
        );
        sink.begin(&self.layout())?;
        let mut summary = DriveSummary {
            frames_delivered: 0,
            interrupted: false,
        };
        for frame in self.frames() {
            let flow = sink.consume(&frame)?;
            summary.frames_delivered += 1;
            if flow.is_break() {
                debug!(frame = frame.index, "sink stopped the animation");
                summary.interrupted = true;
                break;
            }
        }
        sink.finish()?;
        Ok(summary)
    }

    /// Callback form of [`Self::drive`] for infallible consumers.
    pub fn for_each_frame<F>(&self, mut f: F) -> DriveSummary
    where
        F: FnMut(&Frame) -> ControlFlow<()>,
    {
        let mut summary = DriveSummary {
            frames_delivered: 0,
            interrupted: false,
        };
        for frame in self.frames() {
            summary.frames_delivered += 1;
            if f(&frame).is_break() {
                summary.interrupted = true;
                break;
            }
        }
        summary
    }
}

/// Iterator returned by [`AnimationDriver::frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    driver: &'a AnimationDriver,
    next: usize,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.driver.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.driver.frame_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}
impl FusedIterator for Frames<'_> {}

/// Iterator returned by [`AnimationDriver::sequence`].
#[derive(Debug, Clone)]
pub struct FrameBuffers<'a> {
    params: &'a WaveParameters,
    grid: &'a SampleGrid,
    timeline: &'a Timeline,
    next: usize,
}

impl Iterator for FrameBuffers<'_> {
    type Item = FrameBuffer;

    fn next(&mut self) -> Option<FrameBuffer> {
        if self.next >= self.timeline.frame_count {
            return None;
        }
        let buffer = self.params.snapshot(self.grid, self.timeline.time_at(self.next));
        self.next += 1;
        Some(buffer)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.timeline.frame_count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameBuffers<'_> {}
impl FusedIterator for FrameBuffers<'_> {}
