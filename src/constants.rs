//! Physical constants and the unit convention used by the field model.
//!
//! ## Units
//!
//! The field model works in normalized units: the vacuum light speed is
//! [`LIGHT_SPEED`] = 1, so a wave in vacuum travels one wavelength per period
//! and `|B| = n |E|` in a medium of refractive index `n`. Lengths and times are
//! whatever unit the caller picks for the wavelength.
//!
//! SI values are kept for reporting medium properties.
//!
//! ## References
//!
//! - NIST Reference on Constants, Units, and Uncertainty: <https://physics.nist.gov/cuu/Constants/>
//! - CODATA 2018 values published May 20, 2019 (following 2019 SI redefinition)

use std::f64::consts::TAU;

use crate::math::Scalar;

/// Vacuum light speed in the normalized units of the field model.
pub const LIGHT_SPEED: Scalar = 1.0;
/// Speed of light in vacuum _c_ in meters per second (m/s).
/// Exact value by SI definition (2019): 299,792,458 m/s.
pub const SPEED_OF_LIGHT: Scalar = 299_792_458.0;
/// Vacuum permittivity ε₀ in farads per meter (F/m).
/// CODATA 2018 value: 8.8541878128 × 10⁻¹² F/m.
pub const VACUUM_PERMITTIVITY: Scalar = 8.854_187_812_8e-12;
/// Vacuum permeability μ₀ in henries per meter (H/m).
/// CODATA 2018 value: 1.25663706212 × 10⁻⁶ H/m; no longer exactly 4π × 10⁻⁷.
pub const VACUUM_PERMEABILITY: Scalar = 1.256_637_062_12e-6;
/// Characteristic impedance of free space Z₀ in ohms (Ω).
/// Derived from Z₀ = √(μ₀/ε₀) ≈ 376.730313668 Ω.
pub const FREE_SPACE_IMPEDANCE: Scalar = 376.730_313_668;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    TAU * hz
}

/// Returns the temporal frequency of a wave with the given phase speed and wavelength.
#[inline]
#[must_use]
pub fn frequency_from_wavelength(phase_speed: Scalar, wavelength: Scalar) -> Scalar {
    phase_speed / wavelength
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn vacuum_wave_of_unit_wavelength_has_unit_frequency() {
        let f = frequency_from_wavelength(LIGHT_SPEED, 1.0);
        assert_relative_eq!(f, 1.0, max_relative = 1.0e-12);
        assert_relative_eq!(angular_frequency(f), TAU, max_relative = 1.0e-12);
    }

    #[test]
    fn free_space_impedance_follows_from_vacuum_constants() {
        let z0 = (VACUUM_PERMEABILITY / VACUUM_PERMITTIVITY).sqrt();
        assert_relative_eq!(FREE_SPACE_IMPEDANCE, z0, max_relative = 1.0e-9);
        let c = 1.0 / (VACUUM_PERMEABILITY * VACUUM_PERMITTIVITY).sqrt();
        assert_relative_eq!(SPEED_OF_LIGHT, c, max_relative = 1.0e-9);
        // 120π only holds under the pre-2019 definition of μ₀.
        assert!((FREE_SPACE_IMPEDANCE - 120.0 * std::f64::consts::PI).abs() > 1.0e-3);
    }
}
