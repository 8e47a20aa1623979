use std::f64::consts::TAU;

use crate::constants::{angular_frequency, frequency_from_wavelength};
use crate::errors::{require_positive, EmWaveError};
use crate::materials::{Medium, MediumCatalog};
use crate::math::{Scalar, PROPAGATION_AXIS, R3};

use super::polarization::Polarization;

/// Immutable description of a monochromatic plane wave travelling along +x.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveParameters {
    wavelength: Scalar,
    amplitude: Scalar,
    medium: Medium,
    polarization: Polarization,
    phase_offset: Scalar,
}

impl WaveParameters {
    /// Creates a wave with zero initial phase.
    ///
    /// # Errors
    /// `InvalidParameter` when `wavelength` or `amplitude` is not finite and positive.
    pub fn new(
        wavelength: Scalar,
        amplitude: Scalar,
        medium: Medium,
        polarization: Polarization,
    ) -> Result<Self, EmWaveError> {
        Ok(Self {
            wavelength: require_positive("wavelength", wavelength)?,
            amplitude: require_positive("amplitude", amplitude)?,
            medium,
            polarization,
            phase_offset: 0.0,
        })
    }

    /// Starts a builder with the defaults: unit wavelength and amplitude, vacuum, linear-y.
    #[must_use]
    pub fn builder() -> WaveParametersBuilder {
        WaveParametersBuilder::default()
    }

    /// Returns a copy of these parameters in another medium.
    #[must_use]
    pub fn in_medium(&self, medium: Medium) -> Self {
        Self { medium, ..self.clone() }
    }

    /// Spatial wavelength λ.
    #[must_use]
    pub const fn wavelength(&self) -> Scalar {
        self.wavelength
    }

    /// Peak electric field amplitude.
    #[must_use]
    pub const fn amplitude(&self) -> Scalar {
        self.amplitude
    }

    /// Propagation medium.
    #[must_use]
    pub const fn medium(&self) -> &Medium {
        &self.medium
    }

    /// Polarization state.
    #[must_use]
    pub const fn polarization(&self) -> Polarization {
        self.polarization
    }

    /// Initial phase in radians.
    #[must_use]
    pub const fn phase_offset(&self) -> Scalar {
        self.phase_offset
    }

    /// Phase speed `c / n`.
    #[must_use]
    pub fn phase_speed(&self) -> Scalar {
        self.medium.phase_speed()
    }

    /// Temporal frequency `v / λ`.
    #[must_use]
    pub fn frequency(&self) -> Scalar {
        frequency_from_wavelength(self.phase_speed(), self.wavelength)
    }

    /// Angular frequency ω = 2πf.
    #[must_use]
    pub fn angular_frequency(&self) -> Scalar {
        angular_frequency(self.frequency())
    }

    /// Wavenumber k = 2π/λ.
    #[must_use]
    pub fn wavenumber(&self) -> Scalar {
        TAU / self.wavelength
    }

    /// Temporal period 1/f.
    #[must_use]
    pub fn period(&self) -> Scalar {
        self.frequency().recip()
    }

    /// Peak magnetic amplitude `A / v`.
    #[must_use]
    pub fn magnetic_amplitude(&self) -> Scalar {
        self.amplitude / self.phase_speed()
    }

    /// Phase argument `2π(x/λ − f t) + φ₀`.
    #[must_use]
    pub fn phase(&self, position: Scalar, time: Scalar) -> Scalar {
        TAU * (position / self.wavelength - self.frequency() * time) + self.phase_offset
    }

    /// Field sample at `position` and `time`; see [`sample`].
    #[must_use]
    pub fn sample(&self, position: Scalar, time: Scalar) -> FieldSample {
        sample(position, time, self)
    }
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            wavelength: 1.0,
            amplitude: 1.0,
            medium: Medium::default(),
            polarization: Polarization::default(),
            phase_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
enum MediumChoice {
    Resolved(Medium),
    Named(String),
}

/// Builder for [`WaveParameters`]; all validation happens in [`Self::build`].
#[derive(Debug)]
pub struct WaveParametersBuilder {
    wavelength: Scalar,
    amplitude: Scalar,
    medium: MediumChoice,
    polarization: Result<Polarization, EmWaveError>,
    phase_offset: Scalar,
}

impl Default for WaveParametersBuilder {
    fn default() -> Self {
        Self {
            wavelength: 1.0,
            amplitude: 1.0,
            medium: MediumChoice::Resolved(Medium::default()),
            polarization: Ok(Polarization::default()),
            phase_offset: 0.0,
        }
    }
}

impl WaveParametersBuilder {
    /// Sets the wavelength.
    #[must_use]
    pub fn wavelength(mut self, wavelength: Scalar) -> Self {
        self.wavelength = wavelength;
        self
    }

    /// Sets the electric amplitude.
    #[must_use]
    pub fn amplitude(mut self, amplitude: Scalar) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Sets the medium directly.
    #[must_use]
    pub fn medium(mut self, medium: Medium) -> Self {
        self.medium = MediumChoice::Resolved(medium);
        self
    }

    /// Sets the medium by name; resolved against the built-in catalog on build.
    #[must_use]
    pub fn medium_named(mut self, name: impl Into<String>) -> Self {
        self.medium = MediumChoice::Named(name.into());
        self
    }

    /// Sets the polarization.
    #[must_use]
    pub fn polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = Ok(polarization);
        self
    }

    /// Sets the polarization by name; parsed on build.
    #[must_use]
    pub fn polarization_named(mut self, name: &str) -> Self {
        self.polarization = name.parse();
        self
    }

    /// Sets the initial phase offset in radians.
    #[must_use]
    pub fn phase_offset(mut self, phase_offset: Scalar) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    /// Validates against the built-in media.
    ///
    /// # Errors
    /// `InvalidParameter` for non-positive wavelength/amplitude, a non-finite
    /// phase, or an unknown medium or polarization name.
    pub fn build(self) -> Result<WaveParameters, EmWaveError> {
        self.build_with(&MediumCatalog::with_presets())
    }

    /// Validates, resolving a named medium in `catalog`.
    ///
    /// # Errors
    /// See [`Self::build`].
    pub fn build_with(self, catalog: &MediumCatalog) -> Result<WaveParameters, EmWaveError> {
        let polarization = self.polarization?;
        let medium = match self.medium {
            MediumChoice::Resolved(medium) => medium,
            MediumChoice::Named(name) => catalog.get(&name)?.clone(),
        };
        if !self.phase_offset.is_finite() {
            return Err(EmWaveError::invalid(
                "phase",
                format!("must be finite, got {}", self.phase_offset),
            ));
        }
        let mut params = WaveParameters::new(self.wavelength, self.amplitude, medium, polarization)?;
        params.phase_offset = self.phase_offset;
        Ok(params)
    }
}

/// Electric and magnetic field vectors at one position and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    /// Position along the propagation axis.
    pub position: Scalar,
    /// Electric field E.
    pub electric: R3,
    /// Magnetic field B.
    pub magnetic: R3,
}

impl FieldSample {
    /// |E|.
    #[must_use]
    pub fn electric_magnitude(&self) -> Scalar {
        self.electric.norm()
    }

    /// |B|.
    #[must_use]
    pub fn magnetic_magnitude(&self) -> Scalar {
        self.magnetic.norm()
    }

    /// Poynting vector `E × B` in normalized units (μ₀ = 1); points along the propagation axis.
    #[must_use]
    pub fn poynting(&self) -> R3 {
        self.electric.cross(&self.magnetic)
    }
}

/// Evaluates the plane wave described by `params` at `position` and `time`.
///
/// The transverse electric field follows the polarization (see
/// [`Polarization::transverse_field`]) scaled by the amplitude, and the
/// magnetic field is `x̂ × E / v`. Pure and infallible for finite inputs.
#[must_use]
pub fn sample(position: Scalar, time: Scalar, params: &WaveParameters) -> FieldSample {
    let theta = params.phase(position, time);
    let (ey, ez) = params.polarization.transverse_field(theta);
    let electric = R3::new(0.0, ey, ez) * params.amplitude;
    let magnetic = PROPAGATION_AXIS.cross(&electric) / params.phase_speed();
    FieldSample {
        position,
        electric,
        magnetic,
    }
}
