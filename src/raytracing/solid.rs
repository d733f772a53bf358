use super::color::Color;
use super::error::TracerError;
use super::intersect::Intersection;
use super::optics::Optics;
use super::ray::Ray;
use super::vec3::Vec3;
use super::EPSILON;

pub const REFRACTION_VACUUM: f64 = 1.0;
pub const REFRACTION_AIR: f64 = 1.000277;
pub const REFRACTION_WATER: f64 = 1.333;
pub const REFRACTION_GLASS: f64 = 1.5;
pub const REFRACTION_DIAMOND: f64 = 2.419;

pub const REFRACTION_MINIMUM: f64 = 1.0;
pub const REFRACTION_MAXIMUM: f64 = 9.0;

pub fn validate_refraction(index: f64) -> Result<(), TracerError> {
    if !(REFRACTION_MINIMUM..=REFRACTION_MAXIMUM).contains(&index) {
        return Err(TracerError::InvalidRefraction(index));
    }
    Ok(())
}

/// A placed geometric shape the scene can trace against. Each variant owns
/// its own geometry parameters; the trait covers boundary enumeration,
/// containment, surface optics and placement transforms.
pub trait SolidObject: Send + Sync {
    fn center(&self) -> Vec3;

    /// Append a record for every crossing of the forward ray through this
    /// solid's boundary. The ray direction need not be normalized.
    fn append_all_intersections<'a>(&'a self, ray: &Ray, intersections: &mut Vec<Intersection<'a>>);

    /// True when the point lies within the enclosed volume, with a small
    /// outward tolerance so points on the boundary count as inside.
    fn contains(&self, point: Vec3) -> bool;

    /// Whether the shape fully encloses a volume. Open shapes cannot answer
    /// "what medium is this point in" and must return false.
    fn is_fully_enclosed(&self) -> bool {
        true
    }

    fn uniform_optics(&self) -> &Optics;

    fn set_uniform_optics(&mut self, optics: Optics);

    /// Optics used for shading at a given surface point. The default is the
    /// solid's uniform optics; patterned shapes override this and key off the
    /// context value they stored in the intersection record.
    fn surface_optics(&self, _point: Vec3, _context: usize) -> Optics {
        *self.uniform_optics()
    }

    fn refractive_index(&self) -> f64;

    fn set_refraction(&mut self, index: f64) -> Result<(), TracerError>;

    // Placement transforms mutate in place and hand back the solid so calls
    // can be chained. Shapes without intrinsic orientation still implement
    // the rotations (as no-ops) so dispatch stays uniform.
    fn rotate_x(&mut self, angle_in_degrees: f64) -> &mut dyn SolidObject;
    fn rotate_y(&mut self, angle_in_degrees: f64) -> &mut dyn SolidObject;
    fn rotate_z(&mut self, angle_in_degrees: f64) -> &mut dyn SolidObject;
    fn translate(&mut self, dx: f64, dy: f64, dz: f64) -> &mut dyn SolidObject;

    fn move_to(&mut self, new_center: Vec3) -> &mut dyn SolidObject {
        let center = self.center();
        self.translate(
            new_center.x - center.x,
            new_center.y - center.y,
            new_center.z - center.z,
        )
    }

    fn set_matte_gloss_balance(
        &mut self,
        gloss_factor: f64,
        raw_matte_color: Color,
        raw_gloss_color: Color,
    ) -> Result<(), TracerError> {
        let mut optics = *self.uniform_optics();
        optics.set_matte_gloss_balance(gloss_factor, raw_matte_color, raw_gloss_color)?;
        self.set_uniform_optics(optics);
        Ok(())
    }

    fn set_full_matte(&mut self, matte_color: Color) -> Result<(), TracerError> {
        self.set_matte_gloss_balance(0.0, matte_color, Color::black())
    }

    fn set_opacity(&mut self, opacity: f64) -> Result<(), TracerError> {
        let mut optics = *self.uniform_optics();
        optics.set_opacity(opacity)?;
        self.set_uniform_optics(optics);
        Ok(())
    }
}

pub struct Sphere {
    center: Vec3,
    radius: f64,
    optics: Optics,
    refractive_index: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Sphere {
        Sphere {
            center,
            radius,
            optics: Optics::default(),
            refractive_index: REFRACTION_GLASS,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl SolidObject for Sphere {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn append_all_intersections<'a>(
        &'a self,
        ray: &Ray,
        intersections: &mut Vec<Intersection<'a>>,
    ) {
        // substitute the ray parametrization into |p - center|^2 = r^2 and
        // solve the resulting quadratic in the ray parameter u
        let displacement = ray.vantage - self.center;
        let a = ray.direction.squared_len();
        let b = 2.0 * ray.direction.dot(displacement);
        let c = displacement.squared_len() - self.radius * self.radius;
        let radicand = b * b - 4.0 * a * c;
        if radicand < 0.0 {
            return;
        }
        let root = radicand.sqrt();
        let denom = 2.0 * a;
        let roots = [(-b - root) / denom, (-b + root) / denom];
        // a tangent ray (radicand exactly zero) crosses the boundary once
        let count = if radicand > 0.0 { 2 } else { 1 };
        for &u in &roots[..count] {
            if u > EPSILON {
                let point = ray.at(u);
                let offset = point - ray.vantage;
                intersections.push(Intersection {
                    distance_squared: offset.squared_len(),
                    point,
                    surface_normal: (point - self.center).normalize(),
                    solid: self,
                    context: 0,
                });
            }
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        let r = self.radius + EPSILON;
        point.squared_distance(self.center) <= r * r
    }

    fn uniform_optics(&self) -> &Optics {
        &self.optics
    }

    fn set_uniform_optics(&mut self, optics: Optics) {
        self.optics = optics;
    }

    fn refractive_index(&self) -> f64 {
        self.refractive_index
    }

    fn set_refraction(&mut self, index: f64) -> Result<(), TracerError> {
        validate_refraction(index)?;
        self.refractive_index = index;
        Ok(())
    }

    // a sphere is isotropic, rotations cannot change its geometry
    fn rotate_x(&mut self, _angle_in_degrees: f64) -> &mut dyn SolidObject {
        self
    }

    fn rotate_y(&mut self, _angle_in_degrees: f64) -> &mut dyn SolidObject {
        self
    }

    fn rotate_z(&mut self, _angle_in_degrees: f64) -> &mut dyn SolidObject {
        self
    }

    fn translate(&mut self, dx: f64, dy: f64, dz: f64) -> &mut dyn SolidObject {
        self.center += Vec3::new(dx, dy, dz);
        self
    }
}
