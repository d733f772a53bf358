use super::vec3::Vec3;

/// A half-line shot from a vantage point. The direction is not required to be
/// normalized; intersection code keeps all quantities consistent with it.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub vantage: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(vantage: Vec3, direction: Vec3) -> Ray {
        Ray { vantage, direction }
    }

    pub fn at(self: &Self, u: f64) -> Vec3 {
        self.vantage + self.direction * u
    }
}
