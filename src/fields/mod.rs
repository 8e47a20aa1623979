//! Plane-wave field model: polarization, wave parameters and grid snapshots.

mod plane_wave;
mod polarization;
mod snapshot;

pub use plane_wave::{sample, FieldSample, WaveParameters, WaveParametersBuilder};
pub use polarization::Polarization;
pub use snapshot::FrameBuffer;
