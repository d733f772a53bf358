use thiserror::Error;

#[derive(Debug, Error)]
pub enum TracerError {
    /// Reflectance colors outside [0, 1] let repeated bounces amplify light
    /// without bound, so they are rejected when set.
    #[error("reflection color component {0} is outside the range [0, 1]")]
    InvalidReflectionColor(f64),

    #[error("color component {0} is negative")]
    NegativeColorComponent(f64),

    #[error("opacity {0} is outside the range [0, 1]")]
    InvalidOpacity(f64),

    #[error("gloss factor {0} is outside the range [0, 1]")]
    InvalidGlossFactor(f64),

    #[error("refractive index {0} is outside the range [1, 9]")]
    InvalidRefraction(f64),

    /// Two or more intersections tie for closest, so the nearest surface is
    /// undefined. Recoverable: the render loop retraces with a jittered ray.
    #[error("ambiguous intersection: tied candidates for the closest surface")]
    AmbiguousIntersection,

    /// A quantity that must be a cosine fell outside [-1, 1] beyond
    /// tolerance. This indicates a geometry bug, not a bad scene.
    #[error("geometric inconsistency: {0}")]
    Geometry(String),

    #[error("pixel coordinates ({0}, {1}) are out of bounds")]
    PixelOutOfBounds(usize, usize),

    #[error("invalid render parameters: {0}")]
    InvalidRenderParameters(String),
}
