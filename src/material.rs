//! BRDF variants and their sampling rules. `scatter` returns the outgoing ray
//! together with its attenuation, or `None` if the ray is absorbed.

use crate::hittable::HitRecord;
use crate::math::{Color, Ray, Vec3};
use crate::texture::{SolidColor, Texture};
use rand::Rng;
use std::sync::Arc;

pub trait Material: Send + Sync {
    fn scatter(&self, ray_in: &Ray, hit: &HitRecord, rng: &mut dyn rand::RngCore) -> Option<(Color, Ray)>;

    /// Emitted radiance at the hit point. Black for every material except
    /// `DiffuseLight`.
    fn emitted(&self, _u: f64, _v: f64, _point: crate::math::Point3) -> Color {
        Color::zero()
    }
}

// ─── Lambertian (diffuse) ───────────────────────────────────────────────────

pub struct Lambertian {
    pub albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo: Arc::new(SolidColor::new(albedo)) }
    }

    pub fn textured(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(&self, ray_in: &Ray, hit: &HitRecord, rng: &mut dyn rand::RngCore) -> Option<(Color, Ray)> {
        let mut scatter_dir = hit.normal + Vec3::random_unit_vector(rng);
        if scatter_dir.near_zero() {
            scatter_dir = hit.normal;
        }
        let scattered = Ray::new(hit.point, scatter_dir, ray_in.time);
        let attenuation = self.albedo.value(hit.u, hit.v, hit.point);
        Some((attenuation, scattered))
    }
}

// ─── Metal (specular, fuzzable) ─────────────────────────────────────────────

pub struct Metal {
    pub albedo: Color,
    pub fuzz: f64,
}

impl Metal {
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self { albedo, fuzz: fuzz.min(1.0) }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, hit: &HitRecord, rng: &mut dyn rand::RngCore) -> Option<(Color, Ray)> {
        let reflected = ray_in.direction.normalized().reflect(hit.normal);
        let scattered = Ray::new(
            hit.point,
            reflected + Vec3::random_in_unit_sphere(rng) * self.fuzz,
            ray_in.time,
        );
        if scattered.direction.dot(hit.normal) > 0.0 {
            Some((self.albedo, scattered))
        } else {
            None
        }
    }
}

// ─── Dielectric (glass) ─────────────────────────────────────────────────────

pub struct Dielectric {
    pub ior: f64,
}

impl Dielectric {
    pub const fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Schlick's approximation of the Fresnel reflectance term.
    fn reflectance(cosine: f64, eta_ratio: f64) -> f64 {
        let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, hit: &HitRecord, rng: &mut dyn rand::RngCore) -> Option<(Color, Ray)> {
        let eta_ratio = if hit.front_face { 1.0 / self.ior } else { self.ior };

        let unit_dir = ray_in.direction.normalized();
        let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = eta_ratio * sin_theta > 1.0;
        let direction = if cannot_refract || Self::reflectance(cos_theta, eta_ratio) > rng.gen::<f64>() {
            unit_dir.reflect(hit.normal)
        } else {
            unit_dir
                .refract(hit.normal, eta_ratio)
                .unwrap_or_else(|| unit_dir.reflect(hit.normal))
        };

        Some((Color::ones(), Ray::new(hit.point, direction, ray_in.time)))
    }
}

// ─── Diffuse light (emitter, never scatters) ────────────────────────────────

pub struct DiffuseLight {
    pub emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(color: Color) -> Self {
        Self { emit: Arc::new(SolidColor::new(color)) }
    }

    pub fn textured(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _hit: &HitRecord, _rng: &mut dyn rand::RngCore) -> Option<(Color, Ray)> {
        None
    }

    fn emitted(&self, u: f64, v: f64, point: crate::math::Point3) -> Color {
        self.emit.value(u, v, point)
    }
}

// ─── Isotropic (phase function for participating media) ────────────────────

pub struct Isotropic {
    pub albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(color: Color) -> Self {
        Self { albedo: Arc::new(SolidColor::new(color)) }
    }

    pub fn textured(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Isotropic {
    fn scatter(&self, ray_in: &Ray, hit: &HitRecord, rng: &mut dyn rand::RngCore) -> Option<(Color, Ray)> {
        let scattered = Ray::new(hit.point, Vec3::random_in_unit_sphere(rng), ray_in.time);
        let attenuation = self.albedo.value(hit.u, hit.v, hit.point);
        Some((attenuation, scattered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HitRecord;
    use crate::math::Point3;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn flat_hit(normal: Vec3) -> HitRecord<'static> {
        static MAT: once_mat::OnceMat = once_mat::OnceMat;
        HitRecord {
            point: Point3::new(0.0, 0.0, 0.0),
            normal,
            t: 1.0,
            front_face: true,
            u: 0.5,
            v: 0.5,
            material: &MAT,
        }
    }

    mod once_mat {
        use super::*;
        pub struct OnceMat;
        impl Material for OnceMat {
            fn scatter(&self, _: &Ray, _: &HitRecord, _: &mut dyn rand::RngCore) -> Option<(Color, Ray)> {
                None
            }
        }
    }

    #[test]
    fn metal_rejects_rays_scattered_into_the_surface() {
        let metal = Metal::new(Color::ones(), 0.0);
        let hit = flat_hit(Vec3::unit_y());
        let ray_in = Ray::new(Point3::zero(), Vec3::new(1.0, -1.0, 0.0), 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        // A mirror reflection off an upward normal from a downward-going ray
        // should scatter back upward — must not be rejected.
        assert!(metal.scatter(&ray_in, &hit, &mut rng).is_some());
    }

    #[test]
    fn dielectric_attenuation_is_always_white() {
        let glass = Dielectric::new(1.5);
        let hit = flat_hit(Vec3::unit_y());
        let ray_in = Ray::new(Point3::zero(), Vec3::new(0.1, -1.0, 0.0), 0.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let (atten, _) = glass.scatter(&ray_in, &hit, &mut rng).unwrap();
        assert_eq!(atten, Color::ones());
    }

    #[test]
    fn diffuse_light_never_scatters_but_emits() {
        let light = DiffuseLight::new(Color::new(4.0, 4.0, 4.0));
        let hit = flat_hit(Vec3::unit_y());
        let ray_in = Ray::new(Point3::zero(), Vec3::unit_y(), 0.0);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(light.scatter(&ray_in, &hit, &mut rng).is_none());
        assert_eq!(light.emitted(0.0, 0.0, Point3::zero()), Color::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn lambertian_never_returns_a_degenerate_direction() {
        // normal chosen so random_unit_vector() landing near -normal would
        // otherwise produce a near-zero scatter direction.
        let albedo = Arc::new(SolidColor::new(Color::new(0.5, 0.5, 0.5)));
        let lamb = Lambertian::textured(albedo);
        let hit = flat_hit(Vec3::unit_y());
        let ray_in = Ray::new(Point3::zero(), Vec3::new(0.0, -1.0, 0.0), 0.0);
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..200 {
            let (_, scattered) = lamb.scatter(&ray_in, &hit, &mut rng).unwrap();
            assert!(scattered.direction.length_squared() > 1e-16);
        }
    }
}
