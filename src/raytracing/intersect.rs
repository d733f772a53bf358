use super::solid::SolidObject;
use super::vec3::Vec3;
use super::EPSILON;

/// One crossing of a ray through a solid's boundary. Distances are kept
/// squared so candidates can be compared without square roots.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    pub distance_squared: f64,
    pub point: Vec3,
    /// Outward surface normal at the hit point, unit length.
    pub surface_normal: Vec3,
    pub solid: &'a dyn SolidObject,
    /// Opaque per-shape value identifying which sub-surface was hit; shapes
    /// with a single surface leave it zero. Passed back to `surface_optics`.
    pub context: usize,
}

/// Outcome of resolving a candidate list to the nearest hit. Callers must
/// handle all three cases; an `Ambiguous` result carries no usable record.
pub enum IntersectionResult<'a> {
    Miss,
    Hit(Intersection<'a>),
    Ambiguous,
}

/// Pick the nearest of the candidates, or report that two or more of them
/// tie within tolerance so "nearest" is undefined.
pub fn pick_closest_intersection<'a>(candidates: &[Intersection<'a>]) -> IntersectionResult<'a> {
    let mut closest = match candidates.first() {
        None => return IntersectionResult::Miss,
        Some(first) => *first,
    };
    for candidate in &candidates[1..] {
        if candidate.distance_squared < closest.distance_squared {
            closest = *candidate;
        }
    }
    // relative tolerance, with an absolute floor for hits near the vantage
    let tolerance = EPSILON * closest.distance_squared.max(1.0);
    let tied = candidates
        .iter()
        .filter(|candidate| candidate.distance_squared - closest.distance_squared <= tolerance)
        .count();
    if tied > 1 {
        IntersectionResult::Ambiguous
    } else {
        IntersectionResult::Hit(closest)
    }
}
