//! Geometry image filtering algorithms.
//!
//! - [`filter`]: edge-preserving smoothing of positions (the main entry point)
//! - [`recursive`]: the recursive filter on the glued chart, generic over the
//!   cell type
//! - [`domain_transform`]: per-adjacency weights of the anisotropic modes
//! - [`normals_blur`]: smoothing of normal fields
//! - [`noise`]: Gaussian noise for experiments

pub mod domain_transform;
pub mod filter;
pub mod noise;
pub mod normals_blur;
pub mod progress;
pub mod recursive;

pub use progress::Progress;
