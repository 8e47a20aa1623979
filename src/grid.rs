//! Sample positions along the propagation axis.

use crate::errors::EmWaveError;
use crate::math::Scalar;

/// Generates `n` linearly spaced samples in [start, stop]; the last sample is exactly `stop`.
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n)
                .map(|i| if i + 1 == n { stop } else { start + step * i as Scalar })
                .collect()
        }
    }
}

/// Ordered, non-empty set of positions fixed for one animation run.
///
/// Order is significant: it is the order in which curves are drawn and
/// exported.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    positions: Vec<Scalar>,
}

impl SampleGrid {
    /// `points` evenly spaced positions from `start` to `stop` inclusive.
    ///
    /// # Errors
    /// `InvalidParameter` unless both bounds are finite, `stop > start` and `points >= 2`.
    pub fn linspace(start: Scalar, stop: Scalar, points: usize) -> Result<Self, EmWaveError> {
        if !start.is_finite() || !stop.is_finite() {
            return Err(EmWaveError::invalid(
                "extent",
                format!("bounds must be finite, got ({start}, {stop})"),
            ));
        }
        if stop <= start {
            return Err(EmWaveError::invalid(
                "extent",
                format!("stop must be greater than start, got ({start}, {stop})"),
            ));
        }
        if points < 2 {
            return Err(EmWaveError::invalid(
                "points",
                format!("at least 2 sample points are required, got {points}"),
            ));
        }
        Ok(Self {
            positions: linspace(start, stop, points),
        })
    }

    /// Uses the given positions as-is.
    ///
    /// # Errors
    /// `InvalidParameter` for an empty list or a non-finite position.
    pub fn from_positions(positions: Vec<Scalar>) -> Result<Self, EmWaveError> {
        if positions.is_empty() {
            return Err(EmWaveError::invalid("points", "grid must contain at least one position"));
        }
        if let Some(bad) = positions.iter().find(|x| !x.is_finite()) {
            return Err(EmWaveError::invalid("points", format!("positions must be finite, got {bad}")));
        }
        Ok(Self { positions })
    }

    /// Positions in grid order.
    #[must_use]
    pub fn positions(&self) -> &[Scalar] {
        &self.positions
    }

    /// Iterates positions in grid order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Scalar> + '_ {
        self.positions.iter().copied()
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false; grids are validated non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Smallest position.
    #[must_use]
    pub fn start(&self) -> Scalar {
        self.positions.iter().copied().fold(Scalar::INFINITY, Scalar::min)
    }

    /// Largest position.
    #[must_use]
    pub fn stop(&self) -> Scalar {
        self.positions.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max)
    }
}
