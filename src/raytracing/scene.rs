use log::{debug, info};
use rand::{self, Rng};
use rayon::prelude::*;

use super::buffer::PixelBuffer;
use super::color::Color;
use super::error::TracerError;
use super::intersect::{pick_closest_intersection, Intersection, IntersectionResult};
use super::ray::Ray;
use super::solid::{validate_refraction, SolidObject, REFRACTION_VACUUM};
use super::vec3::Vec3;
use super::MAX_OPTICAL_RECURSION_DEPTH;

/// How many jittered retraces a deferred pixel gets before falling back to
/// the background color.
const MAX_AMBIGUITY_RETRIES: usize = 8;

/// Offset applied along the transmitted ray to step past the boundary just
/// crossed when asking which solid the ray is now inside. Must exceed the
/// containment tolerance.
const CONTAINMENT_NUDGE: f64 = 1.0e-4;

/// Slack allowed on a dot product of unit vectors before it is treated as a
/// geometry bug rather than rounding error.
const COSINE_TOLERANCE: f64 = 1.0e-4;

pub struct LightSource {
    pub location: Vec3,
    pub color: Color,
    pub tag: String,
}

pub struct Scene {
    solids: Vec<Box<dyn SolidObject>>,
    lights: Vec<LightSource>,
    background_color: Color,
    ambient_refraction: f64,
}

impl Scene {
    pub fn new(background_color: Color) -> Scene {
        Scene {
            solids: Vec::new(),
            lights: Vec::new(),
            background_color,
            ambient_refraction: REFRACTION_VACUUM,
        }
    }

    pub fn add_light_source(&mut self, location: Vec3, color: Color, tag: &str) {
        debug!("adding light source '{tag}' at {location:?}");
        self.lights.push(LightSource {
            location,
            color,
            tag: tag.to_string(),
        });
    }

    pub fn add_solid_object(&mut self, solid: Box<dyn SolidObject>) -> &mut dyn SolidObject {
        self.solids.push(solid);
        let last = self.solids.len() - 1;
        self.solids[last].as_mut()
    }

    /// Refractive index of the medium outside every solid (vacuum unless
    /// changed).
    pub fn set_ambient_refraction(&mut self, index: f64) -> Result<(), TracerError> {
        validate_refraction(index)?;
        self.ambient_refraction = index;
        Ok(())
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn ambient_refraction(&self) -> f64 {
        self.ambient_refraction
    }

    /// The innermost solid whose volume encloses the point: first containing
    /// solid in insertion order, or None when the point is in the ambient
    /// medium.
    pub fn primary_container(&self, point: Vec3) -> Option<&dyn SolidObject> {
        self.solids
            .iter()
            .map(|solid| solid.as_ref())
            .find(|solid| solid.is_fully_enclosed() && solid.contains(point))
    }

    fn find_closest_intersection<'a>(
        &'a self,
        ray: &Ray,
        scratch: &mut Vec<Intersection<'a>>,
    ) -> IntersectionResult<'a> {
        scratch.clear();
        for solid in &self.solids {
            solid.append_all_intersections(ray, scratch);
        }
        pick_closest_intersection(scratch)
    }

    /// Follow one ray through the scene and return the color it contributes.
    /// `ray_intensity` is the energy the ray still carries per channel;
    /// `scratch` is the caller-owned intersection list reused across the
    /// recursion so tracing stays allocation-light and thread-safe.
    pub fn trace_ray<'a>(
        &'a self,
        vantage: Vec3,
        direction: Vec3,
        refractive_index: f64,
        ray_intensity: Color,
        recursion_depth: usize,
        scratch: &mut Vec<Intersection<'a>>,
    ) -> Result<Color, TracerError> {
        let ray = Ray::new(vantage, direction);
        match self.find_closest_intersection(&ray, scratch) {
            IntersectionResult::Miss => Ok(ray_intensity * self.background_color),
            IntersectionResult::Hit(intersection) => self.calculate_lighting(
                &intersection,
                direction,
                refractive_index,
                ray_intensity,
                recursion_depth + 1,
                scratch,
            ),
            IntersectionResult::Ambiguous => Err(TracerError::AmbiguousIntersection),
        }
    }

    /// Combine the matte, refracted and reflected contributions at a single
    /// surface hit. The depth ceiling and the intensity threshold both gate
    /// whether any lighting is computed at all.
    fn calculate_lighting<'a>(
        &'a self,
        intersection: &Intersection<'a>,
        direction: Vec3,
        refractive_index: f64,
        ray_intensity: Color,
        recursion_depth: usize,
        scratch: &mut Vec<Intersection<'a>>,
    ) -> Result<Color, TracerError> {
        let mut color_sum = Color::black();
        if recursion_depth <= MAX_OPTICAL_RECURSION_DEPTH && ray_intensity.is_significant() {
            let optics = intersection
                .solid
                .surface_optics(intersection.point, intersection.context);
            let opacity = optics.opacity();
            let transparency = 1.0 - opacity;

            if opacity > 0.0 {
                let matte_light = self.calculate_matte(intersection, scratch);
                color_sum += optics.matte_color() * matte_light * ray_intensity * opacity;
            }

            // the fraction of the transmitted branch a dielectric boundary
            // reflects back instead of letting through
            let mut refractive_reflection_factor = 0.0;
            if transparency > 0.0 {
                color_sum += self.calculate_refraction(
                    intersection,
                    direction,
                    refractive_index,
                    ray_intensity * transparency,
                    recursion_depth,
                    scratch,
                    &mut refractive_reflection_factor,
                )?;
            }

            let mut reflection_color = Color::white() * (transparency * refractive_reflection_factor);
            reflection_color += optics.gloss_color() * opacity;
            reflection_color = reflection_color * ray_intensity;
            if reflection_color.is_significant() {
                color_sum += self.calculate_reflection(
                    intersection,
                    direction,
                    refractive_index,
                    reflection_color,
                    recursion_depth,
                    scratch,
                )?;
            }
        }
        Ok(color_sum)
    }

    /// Lambertian scatter summed over every light source with a clear line
    /// of sight to the hit point, with inverse-square falloff.
    fn calculate_matte<'a>(
        &'a self,
        intersection: &Intersection<'a>,
        scratch: &mut Vec<Intersection<'a>>,
    ) -> Color {
        let mut color_sum = Color::black();
        for light in &self.lights {
            if self.has_clear_line_of_sight(intersection.point, light.location, scratch) {
                let direction_to_light = light.location - intersection.point;
                let incidence = intersection
                    .surface_normal
                    .dot(direction_to_light.normalize());
                if incidence > 0.0 {
                    // Lambert's cosine law with inverse-square falloff
                    color_sum += light.color * (incidence / direction_to_light.squared_len());
                }
            }
        }
        color_sum
    }

    fn has_clear_line_of_sight<'a>(
        &'a self,
        point: Vec3,
        light_location: Vec3,
        scratch: &mut Vec<Intersection<'a>>,
    ) -> bool {
        let gap = light_location - point;
        let shadow_ray = Ray::new(point, gap);
        scratch.clear();
        for solid in &self.solids {
            solid.append_all_intersections(&shadow_ray, scratch);
        }
        // any boundary crossing between the point and the light blocks it;
        // a tie between occluders still occludes, so no ambiguity case here
        let gap_distance_squared = gap.squared_len();
        !scratch
            .iter()
            .any(|hit| hit.distance_squared < gap_distance_squared)
    }

    fn calculate_reflection<'a>(
        &'a self,
        intersection: &Intersection<'a>,
        direction: Vec3,
        refractive_index: f64,
        ray_intensity: Color,
        recursion_depth: usize,
        scratch: &mut Vec<Intersection<'a>>,
    ) -> Result<Color, TracerError> {
        let reflected = direction.reflect(intersection.surface_normal);
        self.trace_ray(
            intersection.point,
            reflected,
            refractive_index,
            ray_intensity,
            recursion_depth,
            scratch,
        )
    }

    /// Bend the ray across the dielectric boundary with Snell's law and
    /// recurse into the new medium. Writes the unpolarized Fresnel
    /// reflectance of the boundary to `out_reflection_factor`; total internal
    /// reflection sets it to 1 and transmits nothing.
    #[allow(clippy::too_many_arguments)]
    fn calculate_refraction<'a>(
        &'a self,
        intersection: &Intersection<'a>,
        direction: Vec3,
        source_refractive_index: f64,
        ray_intensity: Color,
        recursion_depth: usize,
        scratch: &mut Vec<Intersection<'a>>,
        out_reflection_factor: &mut f64,
    ) -> Result<Color, TracerError> {
        let dir_unit = direction.normalize();
        let mut cos_a1 = dir_unit.dot(intersection.surface_normal);
        if cos_a1 < -1.0 || cos_a1 > 1.0 {
            if cos_a1.abs() > 1.0 + COSINE_TOLERANCE {
                return Err(TracerError::Geometry(format!(
                    "dot product {cos_a1} of unit vectors is outside [-1, 1]"
                )));
            }
            cos_a1 = cos_a1.clamp(-1.0, 1.0);
        }

        // the medium on the far side of the boundary: whichever solid
        // contains a point nudged just past the surface, else the ambient
        let test_point = intersection.point + dir_unit * CONTAINMENT_NUDGE;
        let target_refractive_index = match self.primary_container(test_point) {
            Some(container) => container.refractive_index(),
            None => self.ambient_refraction,
        };

        let ratio = source_refractive_index / target_refractive_index;
        let cos_incident = cos_a1.abs();
        let sin_transmitted_squared = ratio * ratio * (1.0 - cos_incident * cos_incident);
        if sin_transmitted_squared >= 1.0 {
            // total internal reflection: all energy goes to the mirror branch
            *out_reflection_factor = 1.0;
            return Ok(Color::black());
        }
        let cos_transmitted = (1.0 - sin_transmitted_squared).sqrt();

        // orient the normal against the incident ray so the transmitted
        // direction bends across the boundary; unit length by construction
        let opposed_normal = if cos_a1 < 0.0 {
            intersection.surface_normal
        } else {
            -intersection.surface_normal
        };
        let refracted =
            dir_unit * ratio + opposed_normal * (ratio * cos_incident - cos_transmitted);

        let reflection_s = polarized_reflection(
            source_refractive_index,
            target_refractive_index,
            cos_incident,
            cos_transmitted,
        );
        let reflection_p = polarized_reflection(
            source_refractive_index,
            target_refractive_index,
            cos_transmitted,
            cos_incident,
        );
        *out_reflection_factor = (reflection_s + reflection_p) / 2.0;

        let transmitted_intensity = ray_intensity * (1.0 - *out_reflection_factor);
        self.trace_ray(
            intersection.point,
            refracted,
            target_refractive_index,
            transmitted_intensity,
            recursion_depth,
            scratch,
        )
    }

    /// Render the scene to a pixel buffer: supersample at
    /// `anti_alias_factor^2` sub-pixels per output pixel, trace every
    /// sub-pixel, resolve the deferred ambiguous ones, then box-filter down
    /// to the requested size. Pixel rows are disjoint, so they render on the
    /// rayon pool without any locking.
    pub fn render(
        &self,
        pixels_wide: usize,
        pixels_high: usize,
        zoom: f64,
        anti_alias_factor: usize,
    ) -> Result<PixelBuffer, TracerError> {
        if pixels_wide == 0 || pixels_high == 0 || anti_alias_factor == 0 {
            return Err(TracerError::InvalidRenderParameters(format!(
                "{pixels_wide}x{pixels_high} at anti-alias factor {anti_alias_factor}"
            )));
        }
        if zoom <= 0.0 {
            return Err(TracerError::InvalidRenderParameters(format!(
                "zoom {zoom} must be positive"
            )));
        }

        let large_wide = anti_alias_factor * pixels_wide;
        let large_high = anti_alias_factor * pixels_high;
        let smaller_dim = pixels_wide.min(pixels_high);
        let large_zoom = anti_alias_factor as f64 * zoom * smaller_dim as f64;

        info!(
            "tracing {large_wide}x{large_high} sub-pixels across {} solids and {} lights",
            self.solids.len(),
            self.lights.len()
        );

        let mut buffer = PixelBuffer::new(large_wide, large_high, self.background_color);
        let camera = Vec3::zero();
        let full_intensity = Color::white();

        buffer
            .pixels_mut()
            .par_chunks_mut(large_wide)
            .enumerate()
            .try_for_each(|(j, row)| -> Result<(), TracerError> {
                let mut scratch = Vec::new();
                for (i, pixel) in row.iter_mut().enumerate() {
                    let direction =
                        pixel_direction(i as f64, j as f64, large_wide, large_high, large_zoom);
                    match self.trace_ray(
                        camera,
                        direction,
                        self.ambient_refraction,
                        full_intensity,
                        0,
                        &mut scratch,
                    ) {
                        Ok(color) => {
                            pixel.color = color;
                            pixel.is_ambiguous = false;
                        }
                        Err(TracerError::AmbiguousIntersection) => {
                            pixel.is_ambiguous = true;
                        }
                        Err(error) => return Err(error),
                    }
                }
                Ok(())
            })?;

        self.resolve_ambiguous_pixels(&mut buffer, large_zoom)?;
        Ok(buffer.downsample(anti_alias_factor))
    }

    /// Second pass: retrace every deferred sub-pixel with a small random
    /// jitter so the tie breaks, falling back to the background color when
    /// every attempt stays ambiguous.
    fn resolve_ambiguous_pixels(
        &self,
        buffer: &mut PixelBuffer,
        large_zoom: f64,
    ) -> Result<(), TracerError> {
        let ambiguous = buffer.ambiguous_coordinates();
        if ambiguous.is_empty() {
            return Ok(());
        }
        debug!("resolving {} ambiguous sub-pixels", ambiguous.len());

        let large_wide = buffer.pixels_wide();
        let large_high = buffer.pixels_high();
        let camera = Vec3::zero();
        let resolved: Vec<Color> = ambiguous
            .par_iter()
            .map(|&(i, j)| -> Result<Color, TracerError> {
                let mut scratch = Vec::new();
                let mut rng = rand::thread_rng();
                for _ in 0..MAX_AMBIGUITY_RETRIES {
                    let di = rng.gen_range(-0.5..0.5);
                    let dj = rng.gen_range(-0.5..0.5);
                    let direction = pixel_direction(
                        i as f64 + di,
                        j as f64 + dj,
                        large_wide,
                        large_high,
                        large_zoom,
                    );
                    match self.trace_ray(
                        camera,
                        direction,
                        self.ambient_refraction,
                        Color::white(),
                        0,
                        &mut scratch,
                    ) {
                        Ok(color) => return Ok(color),
                        Err(TracerError::AmbiguousIntersection) => continue,
                        Err(error) => return Err(error),
                    }
                }
                Ok(self.background_color)
            })
            .collect::<Result<_, _>>()?;

        for (&(i, j), &color) in ambiguous.iter().zip(&resolved) {
            let pixel = buffer.pixel_mut(i, j)?;
            pixel.color = color;
            pixel.is_ambiguous = false;
        }
        Ok(())
    }
}

/// Perspective projection for a camera at the origin looking down -z: the
/// x/y components come from the sub-pixel's offset from the image center over
/// the combined zoom.
fn pixel_direction(i: f64, j: f64, large_wide: usize, large_high: usize, large_zoom: f64) -> Vec3 {
    Vec3::new(
        (i - large_wide as f64 / 2.0) / large_zoom,
        (large_high as f64 / 2.0 - j) / large_zoom,
        -1.0,
    )
}

/// Squared amplitude ratio of one polarization of the Fresnel equations. A
/// vanishing denominator means grazing/total reflection, so everything
/// reflects.
fn polarized_reflection(n1: f64, n2: f64, cos_a: f64, cos_b: f64) -> f64 {
    let left = n1 * cos_a;
    let right = n2 * cos_b;
    let denom = (left + right) * (left + right);
    if denom < 1.0e-12 {
        return 1.0;
    }
    let reflection = (left - right) * (left - right) / denom;
    reflection.min(1.0)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::raytracing::optics::Optics;
    use crate::raytracing::solid::{Sphere, REFRACTION_GLASS};

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    /// Sphere wrapper that counts how many times it gets shaded, so tests can
    /// observe the number of bounces the recursion actually evaluates.
    struct ShadedSphere {
        sphere: Sphere,
        shading_calls: Arc<AtomicUsize>,
    }

    impl SolidObject for ShadedSphere {
        fn center(&self) -> Vec3 {
            self.sphere.center()
        }

        fn append_all_intersections<'a>(
            &'a self,
            ray: &Ray,
            intersections: &mut Vec<Intersection<'a>>,
        ) {
            let mut inner = Vec::new();
            self.sphere.append_all_intersections(ray, &mut inner);
            for hit in inner {
                // re-tag the hits so shading dispatches back through us
                intersections.push(Intersection { solid: self, ..hit });
            }
        }

        fn contains(&self, point: Vec3) -> bool {
            self.sphere.contains(point)
        }

        fn surface_optics(&self, point: Vec3, context: usize) -> Optics {
            self.shading_calls.fetch_add(1, Ordering::Relaxed);
            self.sphere.surface_optics(point, context)
        }

        fn uniform_optics(&self) -> &Optics {
            self.sphere.uniform_optics()
        }

        fn set_uniform_optics(&mut self, optics: Optics) {
            self.sphere.set_uniform_optics(optics);
        }

        fn refractive_index(&self) -> f64 {
            self.sphere.refractive_index()
        }

        fn set_refraction(&mut self, index: f64) -> Result<(), TracerError> {
            self.sphere.set_refraction(index)
        }

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
            self.sphere.translate(dx, dy, dz);
            self
        }
    }

    #[test]
    fn empty_scene_returns_attenuated_background() {
        let scene = Scene::new(Color::new(0.2, 0.3, 0.4));
        let mut scratch = Vec::new();
        let color = scene
            .trace_ray(
                Vec3::zero(),
                Vec3::new(0.0, 0.0, -1.0),
                REFRACTION_VACUUM,
                Color::new(0.5, 0.5, 0.5),
                0,
                &mut scratch,
            )
            .unwrap();
        assert_eq!(color, Color::new(0.1, 0.15, 0.2));
    }

    #[test]
    fn closer_light_brightens_a_matte_surface() {
        let trace_with_light = |light_z: f64| {
            let mut scene = Scene::new(Color::black());
            let mut sphere = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0);
            sphere.set_full_matte(Color::white()).unwrap();
            scene.add_solid_object(Box::new(sphere));
            scene.add_light_source(Vec3::new(0.0, 0.0, light_z), Color::white(), "front");
            let mut scratch = Vec::new();
            scene
                .trace_ray(
                    Vec3::zero(),
                    Vec3::new(0.0, 0.0, -1.0),
                    REFRACTION_VACUUM,
                    Color::white(),
                    0,
                    &mut scratch,
                )
                .unwrap()
        };
        // hit point is (0, 0, -8); the light at -6 is twice as close as -4
        let nearer = trace_with_light(-6.0);
        let farther = trace_with_light(-4.0);
        assert!(nearer.red > farther.red);
        assert!(nearer.red > 0.0);
        // inverse-square law at normal incidence
        assert!(approx(nearer.red / farther.red, 4.0, 1.0e-9));
    }

    #[test]
    fn occluded_light_contributes_nothing() {
        let mut scene = Scene::new(Color::black());
        let mut target = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);
        target.set_full_matte(Color::white()).unwrap();
        scene.add_solid_object(Box::new(target));
        // opaque blocker between the target surface and the light
        let mut blocker = Sphere::new(Vec3::new(0.0, 0.0, -6.0), 1.0);
        blocker.set_full_matte(Color::white()).unwrap();
        scene.add_solid_object(Box::new(blocker));
        scene.add_light_source(Vec3::new(0.0, 0.0, -3.0), Color::white(), "blocked");

        let mut scratch = Vec::new();
        let hit_point = Vec3::new(0.0, 0.0, -9.0);
        let light_location = Vec3::new(0.0, 0.0, -3.0);
        assert!(!scene.has_clear_line_of_sight(hit_point, light_location, &mut scratch));
    }

    #[test]
    fn opaque_surface_ignores_refractive_index() {
        let trace_with_refraction = |index: f64| {
            let mut scene = Scene::new(Color::black());
            let mut sphere = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0);
            sphere.set_full_matte(Color::new(0.8, 0.4, 0.2)).unwrap();
            sphere.set_refraction(index).unwrap();
            scene.add_solid_object(Box::new(sphere));
            scene.add_light_source(Vec3::new(0.0, 10.0, 0.0), Color::white(), "key");
            let mut scratch = Vec::new();
            scene
                .trace_ray(
                    Vec3::zero(),
                    Vec3::new(0.0, 0.0, -1.0),
                    REFRACTION_VACUUM,
                    Color::white(),
                    0,
                    &mut scratch,
                )
                .unwrap()
        };
        // opacity 1.0 leaves nothing for the transmission branch, so the
        // solid's refractive index cannot influence the result
        assert_eq!(trace_with_refraction(1.5), trace_with_refraction(8.0));
    }

    #[test]
    fn facing_mirrors_terminate_at_the_recursion_ceiling() {
        let shading_calls = Arc::new(AtomicUsize::new(0));
        let mut scene = Scene::new(Color::black());
        for z in [-10.0, 10.0] {
            let mut mirror = Sphere::new(Vec3::new(0.0, 0.0, z), 3.0);
            mirror
                .set_matte_gloss_balance(1.0, Color::black(), Color::white())
                .unwrap();
            scene.add_solid_object(Box::new(ShadedSphere {
                sphere: mirror,
                shading_calls: Arc::clone(&shading_calls),
            }));
        }

        // the ray bounces between the mirrors with undiminished intensity;
        // only the depth ceiling can stop it
        let mut scratch = Vec::new();
        let color = scene
            .trace_ray(
                Vec3::zero(),
                Vec3::new(0.0, 0.0, -1.0),
                REFRACTION_VACUUM,
                Color::white(),
                0,
                &mut scratch,
            )
            .unwrap();
        assert_eq!(color, Color::black());
        // one shading evaluation per bounce, and the ceiling cuts off the
        // bounce that would exceed the maximum depth
        assert_eq!(
            shading_calls.load(Ordering::Relaxed),
            MAX_OPTICAL_RECURSION_DEPTH
        );
    }

    #[test]
    fn coincident_shells_are_ambiguous() {
        let mut scene = Scene::new(Color::black());
        scene.add_solid_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0)));
        scene.add_solid_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0)));
        let mut scratch = Vec::new();
        let result = scene.trace_ray(
            Vec3::zero(),
            Vec3::new(0.0, 0.0, -1.0),
            REFRACTION_VACUUM,
            Color::white(),
            0,
            &mut scratch,
        );
        assert!(matches!(result, Err(TracerError::AmbiguousIntersection)));
    }

    #[test]
    fn render_falls_back_to_background_when_jitter_cannot_break_ties() {
        let mut scene = Scene::new(Color::new(0.25, 0.5, 0.75));
        // two coincident spheres tie at every sub-pixel, so every deferred
        // pixel must resolve to the background
        scene.add_solid_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0)));
        scene.add_solid_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0)));
        let buffer = scene.render(8, 8, 1.0, 1).unwrap();
        assert!(buffer.ambiguous_coordinates().is_empty());
        let center = buffer.pixel(4, 4).unwrap();
        assert_eq!(center.color, scene.background_color());
    }

    #[test]
    fn fresnel_reflectance_at_normal_incidence() {
        // glass from vacuum reflects ((1 - 1.5) / (1 + 1.5))^2 = 4%
        let rs = polarized_reflection(1.0, REFRACTION_GLASS, 1.0, 1.0);
        assert!(approx(rs, 0.04, 1.0e-12));
    }

    #[test]
    fn normal_incidence_refraction_passes_straight_through() {
        let mut scene = Scene::new(Color::black());
        let mut glass = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0);
        glass.set_opacity(0.0).unwrap();
        glass.set_refraction(REFRACTION_GLASS).unwrap();
        scene.add_solid_object(Box::new(glass));

        let mut scratch = Vec::new();
        let mut reflection_factor = 0.0;
        let intersection = Intersection {
            distance_squared: 64.0,
            point: Vec3::new(0.0, 0.0, -8.0),
            surface_normal: Vec3::new(0.0, 0.0, 1.0),
            solid: scene.primary_container(Vec3::new(0.0, 0.0, -10.0)).unwrap(),
            context: 0,
        };
        let color = scene
            .calculate_refraction(
                &intersection,
                Vec3::new(0.0, 0.0, -1.0),
                REFRACTION_VACUUM,
                Color::white(),
                MAX_OPTICAL_RECURSION_DEPTH + 1, // stop after the bend
                &mut scratch,
                &mut reflection_factor,
            )
            .unwrap();
        // unpolarized average at normal incidence equals the s-term alone
        assert!(approx(reflection_factor, 0.04, 1.0e-9));
        assert_eq!(color, Color::black());
    }

    #[test]
    fn primary_container_prefers_first_containing_solid() {
        let mut scene = Scene::new(Color::black());
        let mut inner = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);
        inner.set_refraction(2.0).unwrap();
        scene.add_solid_object(Box::new(inner));
        let mut outer = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 5.0);
        outer.set_refraction(3.0).unwrap();
        scene.add_solid_object(Box::new(outer));

        let container = scene.primary_container(Vec3::new(0.0, 0.0, -10.0)).unwrap();
        assert_eq!(container.refractive_index(), 2.0);
        assert!(scene.primary_container(Vec3::new(100.0, 0.0, 0.0)).is_none());
    }
}
