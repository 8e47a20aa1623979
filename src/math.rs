//! Shared numerical primitives anchored on `nalgebra`.

use nalgebra::Vector3;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Convenient alias for three-dimensional real vectors.
pub type R3 = Vector3<Scalar>;
/// Primary complex scalar type used for phasors.
pub type CScalar = num_complex::Complex<Scalar>;

/// Unit vector along which every wave in this crate propagates (+x).
pub const PROPAGATION_AXIS: R3 = R3::new(1.0, 0.0, 0.0);

/// Returns the complex exponential `e^(j * theta)` using `Scalar` precision.
#[must_use]
pub fn phasor(theta: Scalar) -> CScalar {
    CScalar::from_polar(1.0, theta)
}
