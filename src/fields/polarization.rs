use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EmWaveError;
use crate::math::{phasor, CScalar, Scalar};

/// Pattern traced by the electric field in the transverse (y, z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarization {
    /// E oscillates along y, B along z.
    #[default]
    LinearY,
    /// E oscillates along z, B along -y.
    LinearZ,
    /// E rotates counter-clockwise for an observer facing the oncoming wave.
    ///
    /// Right-handed in the IEEE (antenna) convention, which names handedness
    /// as seen from the source: positive about the propagation axis. The
    /// optics convention names it from the receiver and calls it left-circular.
    CircularRight,
    /// E rotates clockwise for an observer facing the oncoming wave.
    ///
    /// IEEE convention; right-circular in the optics convention.
    CircularLeft,
}

impl Polarization {
    /// Every polarization, in declaration order.
    pub const ALL: [Self; 4] = [Self::LinearY, Self::LinearZ, Self::CircularRight, Self::CircularLeft];

    /// Kebab-case name accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LinearY => "linear-y",
            Self::LinearZ => "linear-z",
            Self::CircularRight => "circular-right",
            Self::CircularLeft => "circular-left",
        }
    }

    /// True for the circular variants.
    #[must_use]
    pub const fn is_circular(self) -> bool {
        matches!(self, Self::CircularRight | Self::CircularLeft)
    }

    /// Complex transverse amplitudes `(J_y, J_z)`.
    ///
    /// The real field at phase θ is `Im(J e^{iθ})` per component, so a unit
    /// real entry gives `sin θ` and `±i` gives `±cos θ`.
    #[must_use]
    pub fn jones(self) -> (CScalar, CScalar) {
        let one = CScalar::new(1.0, 0.0);
        let zero = CScalar::new(0.0, 0.0);
        let i = CScalar::new(0.0, 1.0);
        match self {
            Self::LinearY => (one, zero),
            Self::LinearZ => (zero, one),
            Self::CircularRight => (one, i),
            Self::CircularLeft => (one, -i),
        }
    }

    /// Unit-amplitude transverse electric components `(E_y, E_z)` at phase `theta`.
    #[must_use]
    pub fn transverse_field(self, theta: Scalar) -> (Scalar, Scalar) {
        let (jy, jz) = self.jones();
        let p = phasor(theta);
        ((jy * p).im, (jz * p).im)
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Polarization {
    type Err = EmWaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                EmWaveError::invalid(
                    "polarization",
                    format!("unknown polarization `{}`; expected one of: {}", s.trim(), names.join(", ")),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn linear_variants_use_sine_on_a_single_axis() {
        let (y, z) = Polarization::LinearY.transverse_field(FRAC_PI_2);
        assert_relative_eq!(y, 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(z, 0.0, epsilon = 1.0e-12);
        let (y, z) = Polarization::LinearZ.transverse_field(0.3);
        assert_relative_eq!(y, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(z, 0.3_f64.sin(), epsilon = 1.0e-12);
    }

    #[test]
    fn circular_variants_differ_in_the_sign_of_the_cosine() {
        let theta = 0.4;
        let (ry, rz) = Polarization::CircularRight.transverse_field(theta);
        let (ly, lz) = Polarization::CircularLeft.transverse_field(theta);
        assert_relative_eq!(ry, theta.sin(), epsilon = 1.0e-12);
        assert_relative_eq!(rz, theta.cos(), epsilon = 1.0e-12);
        assert_relative_eq!(ly, theta.sin(), epsilon = 1.0e-12);
        assert_relative_eq!(lz, -theta.cos(), epsilon = 1.0e-12);
    }

    #[test]
    fn right_circular_turns_positively_about_the_propagation_axis() {
        // At fixed x the phase falls as time advances.
        let turn = |p: Polarization| {
            let (y0, z0) = p.transverse_field(0.5);
            let (y1, z1) = p.transverse_field(0.5 - 1.0e-3);
            y0 * z1 - z0 * y1
        };
        assert!(turn(Polarization::CircularRight) > 0.0);
        assert!(turn(Polarization::CircularLeft) < 0.0);
    }

    #[test]
    fn parses_names_leniently() {
        assert_eq!("circular-left".parse::<Polarization>().unwrap(), Polarization::CircularLeft);
        assert_eq!(" Linear_Z ".parse::<Polarization>().unwrap(), Polarization::LinearZ);
        let err = "elliptical".parse::<Polarization>().unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for p in Polarization::ALL {
            assert_eq!(p.to_string().parse::<Polarization>().unwrap(), p);
        }
    }
}
