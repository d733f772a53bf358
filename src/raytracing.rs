pub mod buffer;
pub mod color;
pub mod error;
pub mod intersect;
pub mod optics;
pub mod ray;
pub mod scene;
pub mod solid;
pub mod vec3;

pub use buffer::*;
pub use color::*;
pub use error::*;
pub use intersect::*;
pub use optics::*;
pub use ray::*;
pub use scene::*;
pub use solid::*;
pub use vec3::*;

/// Tolerance shared by the geometric comparisons: forward-hit filtering,
/// closest-intersection tie detection and containment tests.
pub const EPSILON: f64 = 1.0e-6;

/// Maximum depth of the reflection/refraction recursion per primary ray.
pub const MAX_OPTICAL_RECURSION_DEPTH: usize = 20;

/// A ray carrying less than this much energy in every channel contributes
/// nothing visible, so it is not traced any further.
pub const MIN_OPTICAL_INTENSITY: f64 = 0.001;
