use crate::grid::SampleGrid;
use crate::math::Scalar;

use super::plane_wave::{sample, FieldSample, WaveParameters};

/// Field samples over a [`SampleGrid`] at one instant, in grid order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Time of the snapshot.
    pub time: Scalar,
    /// One sample per grid position.
    pub samples: Vec<FieldSample>,
}

impl FrameBuffer {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the buffer holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample positions along the propagation axis.
    #[must_use]
    pub fn positions(&self) -> Vec<Scalar> {
        self.samples.iter().map(|s| s.position).collect()
    }

    /// Electric field components `[Ex, Ey, Ez]`, each one series over the grid.
    #[must_use]
    pub fn electric_components(&self) -> [Vec<Scalar>; 3] {
        [0, 1, 2].map(|axis| self.samples.iter().map(|s| s.electric[axis]).collect())
    }

    /// Magnetic field components `[Bx, By, Bz]`.
    #[must_use]
    pub fn magnetic_components(&self) -> [Vec<Scalar>; 3] {
        [0, 1, 2].map(|axis| self.samples.iter().map(|s| s.magnetic[axis]).collect())
    }

    /// Largest |E| in the buffer.
    #[must_use]
    pub fn peak_electric(&self) -> Scalar {
        self.samples.iter().map(FieldSample::electric_magnitude).fold(0.0, Scalar::max)
    }

    /// Largest |B| in the buffer.
    #[must_use]
    pub fn peak_magnetic(&self) -> Scalar {
        self.samples.iter().map(FieldSample::magnetic_magnitude).fold(0.0, Scalar::max)
    }
}

impl WaveParameters {
    /// Evaluates the wave over every grid position at `time`.
    #[must_use]
    pub fn snapshot(&self, grid: &SampleGrid, time: Scalar) -> FrameBuffer {
        FrameBuffer {
            time,
            samples: evaluate(self, grid, time),
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate(params: &WaveParameters, grid: &SampleGrid, time: Scalar) -> Vec<FieldSample> {
    grid.iter().map(|x| sample(x, time, params)).collect()
}

// Indexed collect keeps grid order.
#[cfg(feature = "parallel")]
fn evaluate(params: &WaveParameters, grid: &SampleGrid, time: Scalar) -> Vec<FieldSample> {
    use rayon::prelude::*;

    grid.positions().par_iter().map(|&x| sample(x, time, params)).collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::fields::Polarization;
    use crate::materials::GLASS;

    #[test]
    fn snapshot_preserves_grid_order() {
        let grid = SampleGrid::linspace(0.0, 3.0, 31).unwrap();
        let params = WaveParameters::builder().medium(GLASS).build().unwrap();
        let buffer = params.snapshot(&grid, 0.25);
        assert_eq!(buffer.len(), 31);
        assert_eq!(buffer.positions(), grid.positions());
        for (s, &x) in buffer.samples.iter().zip(grid.positions()) {
            assert_eq!(*s, params.sample(x, 0.25));
        }
    }

    #[test]
    fn components_split_vectors_by_axis() {
        let grid = SampleGrid::linspace(0.0, 1.0, 5).unwrap();
        let params = WaveParameters::builder()
            .polarization(Polarization::CircularRight)
            .build()
            .unwrap();
        let buffer = params.snapshot(&grid, 0.0);
        let [ex, ey, ez] = buffer.electric_components();
        let [bx, by, bz] = buffer.magnetic_components();
        assert!(ex.iter().chain(&bx).all(|&v| v == 0.0));
        for i in 0..grid.len() {
            assert_relative_eq!(by[i], -ez[i], epsilon = 1.0e-12);
            assert_relative_eq!(bz[i], ey[i], epsilon = 1.0e-12);
        }
        assert_relative_eq!(buffer.peak_electric(), 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(buffer.peak_magnetic(), 1.0, epsilon = 1.0e-12);
    }
}
