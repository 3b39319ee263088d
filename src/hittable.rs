//! Ray/primitive intersection: the uniform `Hittable` contract, the closed
//! set of analytic primitives, affine instancing, and the aggregate types
//! (`HittableList`, `ConstantMedium`) that wrap them. The BVH lives in
//! `bvh.rs` since it has its own construction algorithm and failure mode.

use crate::material::Material;
use crate::math::{random_in, Aabb, Color, Point3, Ray, Vec3};
use std::sync::Arc;

// ─── Hit Record ─────────────────────────────────────────────────────────────

pub struct HitRecord<'a> {
    pub point: Point3,
    pub normal: Vec3,
    pub t: f64,
    pub front_face: bool,
    pub u: f64,
    pub v: f64,
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Orients `outward_normal` against the incoming ray and records which
    /// side was hit. Invariant afterward: `dot(ray.direction, normal) <= 0`.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face { outward_normal } else { -outward_normal };
    }
}

// ─── Hittable trait ─────────────────────────────────────────────────────────

pub trait Hittable: Send + Sync {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>>;

    /// `None` means "unbounded" (e.g. an infinite plane) — such a hittable
    /// is a construction error if placed inside a BVH.
    fn bounding_box(&self, t0: f64, t1: f64) -> Option<Aabb>;
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

/// Static sphere. A negative radius is a legal modelling trick: the
/// intersection math is identical, but the outward normal inverts,
/// producing a hollow inward-facing surface (nested inside a larger
/// sphere of the same center, e.g. the "hollow glass" idiom).
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
    pub material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        Self { center, radius, material }
    }

    /// `φ = atan2(-z, x) + π`, `θ = acos(-y)`; `u = φ/2π`, `v = θ/π`.
    fn sphere_uv(outward_normal: Point3) -> (f64, f64) {
        let phi = (-outward_normal.z).atan2(outward_normal.x) + std::f64::consts::PI;
        let theta = (-outward_normal.y).acos();
        (phi / (2.0 * std::f64::consts::PI), theta / std::f64::consts::PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (-half_b - sqrtd) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrtd) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - self.center) / self.radius;
        let (u, v) = Self::sphere_uv(outward_normal);
        let mut rec = HitRecord {
            point,
            normal: outward_normal,
            t: root,
            front_face: true,
            u,
            v,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        let r = Vec3::new(self.radius.abs(), self.radius.abs(), self.radius.abs());
        Some(Aabb::new(self.center - r, self.center + r))
    }
}

// ─── Moving sphere ──────────────────────────────────────────────────────────

/// Linearly interpolates its centre by `ray.time` between two key centres at
/// two times; intersection math is otherwise identical to `Sphere`.
pub struct MovingSphere {
    pub center0: Point3,
    pub center1: Point3,
    pub time0: f64,
    pub time1: f64,
    pub radius: f64,
    pub material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        center0: Point3,
        center1: Point3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self { center0, center1, time0, time1, radius, material }
    }

    pub fn center(&self, time: f64) -> Point3 {
        self.center0 + ((time - self.time0) / (self.time1 - self.time0)) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let center = self.center(ray.time);
        let oc = ray.origin - center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (-half_b - sqrtd) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrtd) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - center) / self.radius;
        let mut rec = HitRecord {
            point,
            normal: outward_normal,
            t: root,
            front_face: true,
            u: 0.0,
            v: 0.0,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, t0: f64, t1: f64) -> Option<Aabb> {
        let r = Vec3::new(self.radius, self.radius, self.radius);
        let c0 = self.center(t0);
        let c1 = self.center(t1);
        let box0 = Aabb::new(c0 - r, c0 + r);
        let box1 = Aabb::new(c1 - r, c1 + r);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

// ─── Axis-aligned rectangles ────────────────────────────────────────────────

const RECT_PAD: f64 = 1e-4;

/// Rectangle on the plane `z = k`, spanning `[x0, x1] x [y0, y1]`.
pub struct XyRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub k: f64,
    pub material: Arc<dyn Material>,
}

impl XyRect {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self { x0, x1, y0, y1, k, material }
    }
}

impl Hittable for XyRect {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let t = (self.k - ray.origin.z) / ray.direction.z;
        if t < t_min || t > t_max {
            return None;
        }
        let x = ray.origin.x + t * ray.direction.x;
        let y = ray.origin.y + t * ray.direction.y;
        if x < self.x0 || x > self.x1 || y < self.y0 || y > self.y1 {
            return None;
        }
        let u = (x - self.x0) / (self.x1 - self.x0);
        let v = (y - self.y0) / (self.y1 - self.y0);
        let outward_normal = Vec3::unit_z();
        let mut rec = HitRecord {
            point: ray.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            u,
            v,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        Some(Aabb::pad_axis(
            Point3::new(self.x0, self.y0, self.k),
            Point3::new(self.x1, self.y1, self.k),
            2,
            RECT_PAD,
        ))
    }
}

/// Rectangle on the plane `y = k`, spanning `[x0, x1] x [z0, z1]`.
pub struct XzRect {
    pub x0: f64,
    pub x1: f64,
    pub z0: f64,
    pub z1: f64,
    pub k: f64,
    pub material: Arc<dyn Material>,
}

impl XzRect {
    pub fn new(x0: f64, x1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self { x0, x1, z0, z1, k, material }
    }
}

impl Hittable for XzRect {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let t = (self.k - ray.origin.y) / ray.direction.y;
        if t < t_min || t > t_max {
            return None;
        }
        let x = ray.origin.x + t * ray.direction.x;
        let z = ray.origin.z + t * ray.direction.z;
        if x < self.x0 || x > self.x1 || z < self.z0 || z > self.z1 {
            return None;
        }
        let u = (x - self.x0) / (self.x1 - self.x0);
        let v = (z - self.z0) / (self.z1 - self.z0);
        let outward_normal = Vec3::unit_y();
        let mut rec = HitRecord {
            point: ray.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            u,
            v,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        Some(Aabb::pad_axis(
            Point3::new(self.x0, self.k, self.z0),
            Point3::new(self.x1, self.k, self.z1),
            1,
            RECT_PAD,
        ))
    }
}

/// Rectangle on the plane `x = k`, spanning `[y0, y1] x [z0, z1]`.
pub struct YzRect {
    pub y0: f64,
    pub y1: f64,
    pub z0: f64,
    pub z1: f64,
    pub k: f64,
    pub material: Arc<dyn Material>,
}

impl YzRect {
    pub fn new(y0: f64, y1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self { y0, y1, z0, z1, k, material }
    }
}

impl Hittable for YzRect {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let t = (self.k - ray.origin.x) / ray.direction.x;
        if t < t_min || t > t_max {
            return None;
        }
        let y = ray.origin.y + t * ray.direction.y;
        let z = ray.origin.z + t * ray.direction.z;
        if y < self.y0 || y > self.y1 || z < self.z0 || z > self.z1 {
            return None;
        }
        let u = (y - self.y0) / (self.y1 - self.y0);
        let v = (z - self.z0) / (self.z1 - self.z0);
        let outward_normal = Vec3::unit_x();
        let mut rec = HitRecord {
            point: ray.at(t),
            normal: outward_normal,
            t,
            front_face: true,
            u,
            v,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        Some(Aabb::pad_axis(
            Point3::new(self.k, self.y0, self.z0),
            Point3::new(self.k, self.y1, self.z1),
            0,
            RECT_PAD,
        ))
    }
}

// ─── Hittable list (plain aggregate, also the BVH's leaf storage) ──────────

#[derive(Default)]
pub struct HittableList {
    pub objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self { objects: Vec::new() }
    }

    pub fn push(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest = t_max;
        let mut result = None;
        for object in &self.objects {
            if let Some(rec) = object.hit(ray, t_min, closest) {
                closest = rec.t;
                result = Some(rec);
            }
        }
        result
    }

    fn bounding_box(&self, t0: f64, t1: f64) -> Option<Aabb> {
        let mut result: Option<Aabb> = None;
        for object in &self.objects {
            let bbox = object.bounding_box(t0, t1)?;
            result = Some(match result {
                Some(acc) => Aabb::surrounding(&acc, &bbox),
                None => bbox,
            });
        }
        result
    }
}

// ─── Box (six axis-aligned faces) ───────────────────────────────────────────

pub struct BoxInst {
    pub box_min: Point3,
    pub box_max: Point3,
    sides: HittableList,
}

impl BoxInst {
    pub fn new(box_min: Point3, box_max: Point3, material: Arc<dyn Material>) -> Self {
        let mut sides = HittableList::new();
        sides.push(Arc::new(XyRect::new(
            box_min.x, box_max.x, box_min.y, box_max.y, box_max.z, material.clone(),
        )));
        sides.push(Arc::new(XyRect::new(
            box_min.x, box_max.x, box_min.y, box_max.y, box_min.z, material.clone(),
        )));
        sides.push(Arc::new(XzRect::new(
            box_min.x, box_max.x, box_min.z, box_max.z, box_max.y, material.clone(),
        )));
        sides.push(Arc::new(XzRect::new(
            box_min.x, box_max.x, box_min.z, box_max.z, box_min.y, material.clone(),
        )));
        sides.push(Arc::new(YzRect::new(
            box_min.y, box_max.y, box_min.z, box_max.z, box_max.x, material.clone(),
        )));
        sides.push(Arc::new(YzRect::new(
            box_min.y, box_max.y, box_min.z, box_max.z, box_min.x, material,
        )));
        Self { box_min, box_max, sides }
    }
}

impl Hittable for BoxInst {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.sides.hit(ray, t_min, t_max)
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        Some(Aabb::new(self.box_min, self.box_max))
    }
}

// ─── Affine instances ───────────────────────────────────────────────────────

pub struct Translate {
    pub inner: Arc<dyn Hittable>,
    pub offset: Vec3,
}

impl Translate {
    pub fn new(inner: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { inner, offset }
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let moved = Ray::new(ray.origin - self.offset, ray.direction, ray.time);
        let mut rec = self.inner.hit(&moved, t_min, t_max)?;
        rec.point += self.offset;
        let outward_normal = rec.normal;
        rec.set_face_normal(&moved, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, t0: f64, t1: f64) -> Option<Aabb> {
        let inner_box = self.inner.bounding_box(t0, t1)?;
        Some(Aabb::new(inner_box.min + self.offset, inner_box.max + self.offset))
    }
}

/// Rotation about the Y axis. Because a rotated AABB is no longer
/// axis-aligned, the constructor precomputes a conservative envelope by
/// rotating all eight corners of the inner bounding box.
pub struct RotateY {
    pub inner: Arc<dyn Hittable>,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Option<Aabb>,
}

impl RotateY {
    pub fn new(inner: Arc<dyn Hittable>, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        let bbox = inner.bounding_box(0.0, 1.0).map(|inner_box| {
            let mut min = [f64::INFINITY; 3];
            let mut max = [-f64::INFINITY; 3];

            for i in 0..2 {
                for j in 0..2 {
                    for k in 0..2 {
                        let x = i as f64 * inner_box.max.x + (1 - i) as f64 * inner_box.min.x;
                        let y = j as f64 * inner_box.max.y + (1 - j) as f64 * inner_box.min.y;
                        let z = k as f64 * inner_box.max.z + (1 - k) as f64 * inner_box.min.z;

                        let new_x = cos_theta * x + sin_theta * z;
                        let new_z = -sin_theta * x + cos_theta * z;
                        let tester = [new_x, y, new_z];

                        for axis in 0..3 {
                            min[axis] = min[axis].min(tester[axis]);
                            max[axis] = max[axis].max(tester[axis]);
                        }
                    }
                }
            }
            Aabb::new(Point3::new(min[0], min[1], min[2]), Point3::new(max[0], max[1], max[2]))
        });

        Self { inner, sin_theta, cos_theta, bbox }
    }
}

impl Hittable for RotateY {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut origin = ray.origin;
        let mut direction = ray.direction;

        origin.x = self.cos_theta * ray.origin.x - self.sin_theta * ray.origin.z;
        origin.z = self.sin_theta * ray.origin.x + self.cos_theta * ray.origin.z;

        direction.x = self.cos_theta * ray.direction.x - self.sin_theta * ray.direction.z;
        direction.z = self.sin_theta * ray.direction.x + self.cos_theta * ray.direction.z;

        let rotated = Ray::new(origin, direction, ray.time);
        let mut rec = self.inner.hit(&rotated, t_min, t_max)?;

        let mut point = rec.point;
        let mut normal = rec.normal;

        point.x = self.cos_theta * rec.point.x + self.sin_theta * rec.point.z;
        point.z = -self.sin_theta * rec.point.x + self.cos_theta * rec.point.z;

        normal.x = self.cos_theta * rec.normal.x + self.sin_theta * rec.normal.z;
        normal.z = -self.sin_theta * rec.normal.x + self.cos_theta * rec.normal.z;

        rec.point = point;
        rec.set_face_normal(&rotated, normal);
        Some(rec)
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        self.bbox
    }
}

// ─── Participating medium (Beer-Lambert constant density) ──────────────────

/// A homogeneous isotropic volume bounded by an arbitrary hittable. Sampled
/// via the free-flight distance `ℓ = -(1/d)·ln(U)`; see
/// http://psgraphics.blogspot.com/2013/11/scattering-in-constant-medium.html
pub struct ConstantMedium {
    pub boundary: Arc<dyn Hittable>,
    pub neg_inv_density: f64,
    pub phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f64, phase_function: Arc<dyn Material>) -> Self {
        Self { boundary, neg_inv_density: -1.0 / density, phase_function }
    }

    pub fn with_color(boundary: Arc<dyn Hittable>, density: f64, color: Color) -> Self {
        Self::new(boundary, density, Arc::new(crate::material::Isotropic::new(color)))
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut rec1 = self.boundary.hit(ray, -f64::INFINITY, f64::INFINITY)?;
        let mut rec2 = self.boundary.hit(ray, rec1.t + 1e-4, f64::INFINITY)?;

        rec1.t = rec1.t.max(t_min);
        rec2.t = rec2.t.min(t_max);
        if rec1.t >= rec2.t {
            return None;
        }
        rec1.t = rec1.t.max(0.0);

        let ray_length = ray.direction.length();
        let distance_inside_boundary = (rec2.t - rec1.t) * ray_length;

        // The caller owns the RNG in the rest of this design, but
        // ConstantMedium::hit has no RNG parameter in the `Hittable`
        // contract — sample from a thread-local generator seeded once,
        // matching the effectively-global RNG the original design uses
        // for this one call site.
        let hit_distance = self.neg_inv_density * thread_local_uniform().ln();
        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = rec1.t + hit_distance / ray_length;
        Some(HitRecord {
            point: ray.at(t),
            normal: Vec3::unit_x(),
            t,
            front_face: true,
            u: 0.0,
            v: 0.0,
            material: self.phase_function.as_ref(),
        })
    }

    fn bounding_box(&self, t0: f64, t1: f64) -> Option<Aabb> {
        self.boundary.bounding_box(t0, t1)
    }
}

// `Hittable::hit` has no RNG parameter in the shared contract, but free-flight
// sampling inside a medium needs one. The renderer reseeds this thread-local
// from the same per-row `(seed, row_index)` split that seeds its
// pixel-sampling RNG, so a fixed `--seed` still renders byte-identical PPMs
// regardless of how rows are partitioned across worker threads.
thread_local! {
    static MEDIUM_RNG: std::cell::RefCell<rand::rngs::SmallRng> =
        std::cell::RefCell::new(rand::SeedableRng::seed_from_u64(0));
}

/// Reseeds the calling thread's medium-sampling RNG. Call once per row
/// before tracing any of that row's samples.
pub fn seed_medium_rng(seed: u64) {
    MEDIUM_RNG.with(|rng| *rng.borrow_mut() = rand::SeedableRng::seed_from_u64(seed));
}

fn thread_local_uniform() -> f64 {
    MEDIUM_RNG.with(|rng| random_in(&mut *rng.borrow_mut(), 0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;

    fn lambertian(color: Color) -> Arc<dyn Material> {
        Arc::new(Lambertian::new(color))
    }

    #[test]
    fn sphere_normal_points_against_incoming_ray() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, lambertian(Color::ones()));
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = sphere.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert!(ray.direction.dot(rec.normal) <= 0.0);
    }

    #[test]
    fn sphere_uv_is_in_unit_square() {
        let sphere = Sphere::new(Point3::zero(), 1.0, lambertian(Color::ones()));
        for (dx, dy, dz) in [(1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (-1.0, 0.3, 0.2)] {
            let ray = Ray::new(Point3::new(dx * 3.0, dy * 3.0, dz * 3.0), Vec3::new(-dx, -dy, -dz), 0.0);
            if let Some(rec) = sphere.hit(&ray, 0.0, f64::INFINITY) {
                assert!((0.0..=1.0).contains(&rec.u));
                assert!((0.0..=1.0).contains(&rec.v));
            }
        }
    }

    #[test]
    fn negative_radius_sphere_inverts_normal() {
        let outer = Sphere::new(Point3::zero(), 1.0, lambertian(Color::ones()));
        let inner = Sphere::new(Point3::zero(), -0.9, lambertian(Color::ones()));
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let outer_hit = outer.hit(&ray, 0.0, f64::INFINITY).unwrap();
        let inner_hit = inner.hit(&ray, 0.0, f64::INFINITY).unwrap();
        // Both still report the front-face-oriented normal against the ray,
        // but the underlying geometric normal direction differs because the
        // radius sign flipped (P - C) / r.
        assert!(ray.direction.dot(outer_hit.normal) <= 0.0);
        assert!(ray.direction.dot(inner_hit.normal) <= 0.0);
    }

    #[test]
    fn xy_rect_uv_bounds_and_bbox_padding() {
        let rect = XyRect::new(0.0, 1.0, 0.0, 1.0, 0.0, lambertian(Color::ones()));
        let ray = Ray::new(Point3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = rect.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert!((0.0..=1.0).contains(&rec.u));
        assert!((0.0..=1.0).contains(&rec.v));
        let bbox = rect.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.max.z > bbox.min.z);
    }

    #[test]
    fn box_face_centers_are_all_hit_from_outside() {
        let b = BoxInst::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0), lambertian(Color::ones()));
        let probes: [(Point3, Vec3); 6] = [
            (Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)),
            (Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0)),
            (Point3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
            (Point3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            (Point3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
            (Point3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ];
        for (origin, dir) in probes {
            let ray = Ray::new(origin, dir, 0.0);
            assert!(b.hit(&ray, 0.0, f64::INFINITY).is_some());
        }
    }

    #[test]
    fn translate_moves_the_hit_point_but_not_the_normal() {
        let sphere = Arc::new(Sphere::new(Point3::zero(), 0.5, lambertian(Color::ones())));
        let moved = Translate::new(sphere, Vec3::new(10.0, 0.0, 0.0));
        let ray = Ray::new(Point3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = moved.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert!((rec.point.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rotate_y_bbox_envelopes_rotated_box() {
        let b = Arc::new(BoxInst::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0), lambertian(Color::ones())));
        let rotated = RotateY::new(b, 45.0);
        let bbox = rotated.bounding_box(0.0, 1.0).unwrap();
        // A 45-degree rotation of a 2x2x2 cube's footprint in X/Z grows
        // past the original half-extent of 1.0.
        assert!(bbox.max.x > 1.0 && bbox.max.z > 1.0);
    }

    #[test]
    fn constant_medium_exit_probability_matches_beer_lambert() {
        // A ray shot straight through a unit sphere travels a path length
        // L = 2 * radius inside the boundary. The probability of passing
        // through a medium of density `d` without scattering converges to
        // exp(-d * L); check the empirical pass-through rate over many
        // trials lands within 3 standard deviations of that value.
        seed_medium_rng(0xABCD_1234);
        let radius = 2.0;
        let density = 0.5;
        let path_length = 2.0 * radius;
        let expected_pass_through = (-density * path_length).exp();

        let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(Point3::zero(), radius, lambertian(Color::ones())));
        let medium = ConstantMedium::with_color(boundary, density, Color::ones());

        let trials = 20_000;
        let mut pass_through = 0u32;
        for _ in 0..trials {
            let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
            if medium.hit(&ray, 0.0, f64::INFINITY).is_none() {
                pass_through += 1;
            }
        }
        let observed = pass_through as f64 / trials as f64;
        let sigma = (expected_pass_through * (1.0 - expected_pass_through) / trials as f64).sqrt();
        assert!(
            (observed - expected_pass_through).abs() < 3.0 * sigma,
            "observed pass-through {observed} vs expected {expected_pass_through} (3 sigma = {})",
            3.0 * sigma
        );
    }

    #[test]
    fn moving_sphere_bbox_is_union_of_keyframes() {
        let ms = MovingSphere::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            0.0,
            1.0,
            0.5,
            lambertian(Color::ones()),
        );
        let bbox = ms.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.min.x <= -0.5 + 1e-9);
        assert!(bbox.max.x >= 2.5 - 1e-9);
    }
}
