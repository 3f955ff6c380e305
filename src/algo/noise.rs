//! Gaussian noise for testing the filters.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::gim::GeometryImage;
use crate::grid::mirror::identified_index;

/// Options for [`add_noise`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseOptions {
    /// Standard deviation of the displacement along each axis.
    pub intensity: f64,
    /// Seed of the random generator; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            intensity: 0.01,
            seed: None,
        }
    }
}

impl NoiseOptions {
    /// Set the noise intensity.
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Use a fixed seed for reproducible noise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Return a copy of `gim` with every position displaced by Gaussian noise.
///
/// Glued border cells receive the same displacement, so a valid image stays
/// valid.
pub fn add_noise(gim: &GeometryImage, options: &NoiseOptions) -> GeometryImage {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let size = gim.size();
    let mut positions = gim.positions().clone();
    for index in 0..size * size {
        if identified_index(size, index).canonical() != index {
            continue;
        }
        let offset = Vector3::from_fn(|_, _| rng.sample::<f64, _>(StandardNormal));
        let moved = positions.as_slice()[index] + offset * options.intensity;
        positions.set_identified_index(index, moved);
    }

    GeometryImage::from_filtered(positions)
}
