//! TOML run configuration.
//!
//! Every section and key is optional; missing values fall back to the same
//! defaults as the command line.
//!
//! ```toml
//! [wave]
//! wavelength = 1.0
//! amplitude = 1.0
//! medium = "water"
//! polarization = "circular-right"
//! phase = 0.0
//!
//! [grid]
//! start = 0.0
//! stop = 4.0
//! points = 200
//!
//! [animation]
//! duration = 8.0
//! fps = 30
//! compare = false
//!
//! [output]
//! save = "wave.gif"
//! width = 960
//! height = 540
//! encoder = "ffmpeg"
//!
//! [[media]]
//! name = "Sapphire"
//! refractive_index = 1.77
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{AnimationDriver, Timeline};
use crate::errors::EmWaveError;
use crate::fields::{Polarization, WaveParameters};
use crate::grid::SampleGrid;
use crate::io::ExportOptions;
use crate::materials::{Medium, MediumCatalog};

/// `[wave]`: the wave shared by every medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    /// Wavelength in normalized length units.
    pub wavelength: f64,
    /// Electric amplitude.
    pub amplitude: f64,
    /// Medium name, resolved against the catalog.
    pub medium: String,
    /// Polarization name, e.g. `circular-right`, resolved when the wave is built.
    pub polarization: String,
    /// Initial phase offset in radians.
    pub phase: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            wavelength: 1.0,
            amplitude: 1.0,
            medium: "vacuum".to_owned(),
            polarization: Polarization::default().name().to_owned(),
            phase: 0.0,
        }
    }
}

/// `[grid]`: sample positions along the propagation axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// First position.
    pub start: f64,
    /// Last position.
    pub stop: f64,
    /// Number of positions, at least 2.
    pub points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 4.0,
            points: 200,
        }
    }
}

/// `[animation]`: timeline and comparison mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Seconds of animation.
    pub duration: f64,
    /// Frames per second.
    pub fps: u32,
    /// Overlay one wave per catalog medium.
    pub compare: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: 8.0,
            fps: 30,
            compare: false,
        }
    }
}

/// `[output]`: export target and plotted image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Export target; the extension selects the format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<PathBuf>,
    /// Plot width in pixels.
    pub width: u32,
    /// Plot height in pixels.
    pub height: u32,
    /// Video encoder executable.
    pub encoder: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            save: None,
            width: options.width,
            height: options.height,
            encoder: options.encoder,
        }
    }
}

/// `[[media]]`: a custom medium added to (or replacing one in) the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediumConfig {
    /// Display name; matched case-insensitively.
    pub name: String,
    /// Refractive index, at least 1.
    pub refractive_index: f64,
    /// Defaults to `n²`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permittivity_relative: Option<f64>,
    /// Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permeability_relative: Option<f64>,
}

impl MediumConfig {
    fn to_medium(&self) -> Result<Medium, EmWaveError> {
        let medium = Medium::new(self.name.clone(), self.refractive_index)?;
        let permittivity = self
            .permittivity_relative
            .unwrap_or(medium.permittivity_relative());
        let permeability = self
            .permeability_relative
            .unwrap_or(medium.permeability_relative());
        medium.with_constitutive(permittivity, permeability)
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// `[wave]`
    pub wave: WaveConfig,
    /// `[grid]`
    pub grid: GridConfig,
    /// `[animation]`
    pub animation: AnimationConfig,
    /// `[output]`
    pub output: OutputConfig,
    /// `[[media]]`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediumConfig>,
}

impl RunConfig {
    /// Loads and validates a TOML file.
    ///
    /// # Errors
    /// `Config` when the file cannot be read or parsed, `InvalidParameter`
    /// when a value is rejected by [`Self::validate`].
    pub fn from_file(path: &Path) -> Result<Self, EmWaveError> {
        let content = fs::read_to_string(path).map_err(|err| EmWaveError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let config = Self::from_toml(&content).map_err(|err| match err {
            EmWaveError::Config { reason, .. } => EmWaveError::Config {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    /// See [`Self::from_file`].
    pub fn from_toml(content: &str) -> Result<Self, EmWaveError> {
        let config: Self = toml::from_str(content).map_err(|err| EmWaveError::Config {
            path: PathBuf::new(),
            reason: err.message().to_owned(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value by building the objects it describes.
    ///
    /// # Errors
    /// The first `InvalidParameter` encountered.
    pub fn validate(&self) -> Result<(), EmWaveError> {
        if self.output.width == 0 || self.output.height == 0 {
            return Err(EmWaveError::invalid(
                "size",
                format!(
                    "image dimensions must be positive, got {}x{}",
                    self.output.width, self.output.height
                ),
            ));
        }
        if self.output.encoder.trim().is_empty() {
            return Err(EmWaveError::invalid("encoder", "must not be empty"));
        }
        self.build_driver().map(|_| ())
    }

    /// Preset media plus the `[[media]]` entries.
    ///
    /// # Errors
    /// `InvalidParameter` for an invalid custom medium.
    pub fn catalog(&self) -> Result<MediumCatalog, EmWaveError> {
        let mut catalog = MediumCatalog::with_presets();
        for entry in &self.media {
            catalog.register(entry.to_medium()?);
        }
        Ok(catalog)
    }

    /// Wave in the configured medium.
    ///
    /// # Errors
    /// `InvalidParameter` for a rejected wave value, an unknown medium or an
    /// unknown polarization.
    pub fn wave(&self, catalog: &MediumCatalog) -> Result<WaveParameters, EmWaveError> {
        WaveParameters::builder()
            .wavelength(self.wave.wavelength)
            .amplitude(self.wave.amplitude)
            .medium_named(self.wave.medium.as_str())
            .polarization_named(&self.wave.polarization)
            .phase_offset(self.wave.phase)
            .build_with(catalog)
    }

    /// Builds the driver: one wave, or one per catalog medium when comparing.
    ///
    /// # Errors
    /// `InvalidParameter` for any rejected value.
    pub fn build_driver(&self) -> Result<AnimationDriver, EmWaveError> {
        let catalog = self.catalog()?;
        let wave = self.wave(&catalog)?;
        let grid = SampleGrid::linspace(self.grid.start, self.grid.stop, self.grid.points)?;
        let timeline = Timeline::new(self.animation.duration, self.animation.fps)?;
        if self.animation.compare {
            let waves = catalog.iter().map(|m| wave.in_medium(m.clone())).collect();
            AnimationDriver::comparison(waves, grid, timeline)
        } else {
            Ok(AnimationDriver::new(wave, grid, timeline))
        }
    }

    /// Image and encoder settings for plotted exports.
    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            width: self.output.width,
            height: self.output.height,
            encoder: self.output.encoder.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        let driver = config.build_driver().unwrap();
        assert_eq!(driver.frame_count(), 240);
        assert_eq!(driver.grid().len(), 200);
        assert_eq!(driver.waves()[0].medium().name(), "Vacuum");
        assert_eq!(config.export_options(), ExportOptions::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = RunConfig::from_toml(
            r#"
            [wave]
            wavelength = 2.0
            medium = "Glass"
            polarization = "circular-left"

            [grid]
            stop = 8.0
            points = 50

            [animation]
            duration = 1.0
            fps = 12

            [output]
            save = "out/wave.csv"
            width = 640
            "#,
        )
        .unwrap();
        let driver = config.build_driver().unwrap();
        let wave = &driver.waves()[0];
        assert_relative_eq!(wave.wavelength(), 2.0);
        assert_eq!(wave.polarization(), Polarization::CircularLeft);
        assert_relative_eq!(wave.phase_speed(), 1.0 / 1.5);
        assert_eq!(driver.frame_count(), 12);
        assert_eq!(driver.grid().stop(), 8.0);
        assert_eq!(config.output.save, Some(PathBuf::from("out/wave.csv")));
        assert_eq!(config.export_options().width, 640);
        assert_eq!(config.export_options().height, 540);
    }

    #[test]
    fn custom_media_join_the_comparison() {
        let config = RunConfig::from_toml(
            r#"
            [wave]
            medium = "sapphire"

            [animation]
            compare = true
            duration = 0.5

            [[media]]
            name = "Sapphire"
            refractive_index = 1.77
            "#,
        )
        .unwrap();
        let driver = config.build_driver().unwrap();
        assert_eq!(driver.waves().len(), 6);
        let last = driver.waves().last().unwrap().medium();
        assert_eq!(last.name(), "Sapphire");
        assert_relative_eq!(last.permittivity_relative(), 1.77 * 1.77, epsilon = 1.0e-12);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = RunConfig::from_toml("[wave]\nwavelength = 0.0\n").unwrap_err();
        assert!(err.is_invalid_parameter());
        let err = RunConfig::from_toml("[wave]\nmedium = \"unobtainium\"\n").unwrap_err();
        assert!(err.is_invalid_parameter());
        let err = RunConfig::from_toml("[output]\nwidth = 0\n").unwrap_err();
        assert!(err.is_invalid_parameter());
        let err = RunConfig::from_toml("[[media]]\nname = \"x\"\nrefractive_index = 0.5\n").unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn unknown_polarization_is_an_invalid_parameter() {
        let err = RunConfig::from_toml("[wave]\npolarization = \"elliptic\"\n").unwrap_err();
        assert!(err.is_invalid_parameter(), "{err}");
        assert!(err.to_string().contains("elliptic"), "{err}");

        let config = RunConfig::from_toml("[wave]\npolarization = \"Linear_Z\"\n").unwrap();
        let driver = config.build_driver().unwrap();
        assert_eq!(driver.waves()[0].polarization(), Polarization::LinearZ);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = RunConfig::from_toml("[wave]\npolarization = 3\n").unwrap_err();
        assert!(matches!(err, EmWaveError::Config { .. }));
        let err = RunConfig::from_toml("[grid]\nsteps = 3\n").unwrap_err();
        assert!(matches!(err, EmWaveError::Config { .. }));
    }

    #[test]
    fn file_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        match RunConfig::from_file(&missing).unwrap_err() {
            EmWaveError::Config { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[wave\n").unwrap();
        match RunConfig::from_file(&broken).unwrap_err() {
            EmWaveError::Config { path, .. } => assert_eq!(path, broken),
            other => panic!("unexpected error: {other}"),
        }

        let good = dir.path().join("good.toml");
        fs::write(&good, "[animation]\nfps = 10\nduration = 1.0\n").unwrap();
        assert_eq!(RunConfig::from_file(&good).unwrap().animation.fps, 10);
    }
}
