//! Convenience re-exports for building and exporting wave animations.

pub use crate::animation::{
    AnimationDriver, DriveSummary, Frame, FrameLayout, FrameSink, Timeline,
};
pub use crate::config::RunConfig;
pub use crate::constants::*;
pub use crate::errors::EmWaveError;
pub use crate::fields::{sample, FieldSample, FrameBuffer, Polarization, WaveParameters};
pub use crate::grid::{linspace, SampleGrid};
pub use crate::io::{export_animation, ExportError, ExportFormat, ExportOptions, ExportReport};
pub use crate::materials::{Medium, MediumCatalog};
pub use crate::math::{phasor, R3, Scalar};
