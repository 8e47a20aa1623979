#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Physical constants and the normalized unit system.
pub mod constants;
/// Shared numeric types (vectors, complex phasors).
pub mod math;
/// Error types shared across modules.
pub mod errors;
/// Propagation media and the medium catalog.
pub mod materials;
/// Plane-wave field model.
pub mod fields;
/// Sample positions along the propagation axis.
pub mod grid;
/// Frame sequencing and the producer/consumer boundary.
pub mod animation;
/// CSV, VTK, GIF, PNG and MP4 export.
pub mod io;
/// TOML run configuration.
pub mod config;
/// Tracing subscriber setup.
pub mod telemetry;
/// Interactive 3D window.
#[cfg(feature = "viewer")]
pub mod viewer;

/// Common exports for downstream crates.
pub mod prelude;
