//! Bounding-volume hierarchy: a binary tree over an arbitrary `Hittable`
//! list whose interior nodes hold the AABB union of their subtree. Query
//! descends only the branch(es) whose box the ray actually crosses, turning
//! a linear scan into a logarithmic one for any reasonably balanced scene.

use crate::error::RenderError;
use crate::hittable::{Hittable, HitRecord};
use crate::math::{Aabb, Ray};
use std::cmp::Ordering;
use std::sync::Arc;

pub enum BvhNode {
    Leaf { object: Arc<dyn Hittable>, bbox: Aabb },
    Interior { left: Box<BvhNode>, right: Box<BvhNode>, bbox: Aabb },
}

impl BvhNode {
    /// Builds a tree over `objects` covering shutter interval `[t0, t1]`.
    /// A longest-extent split is used at every level rather than a randomly
    /// chosen axis — both are valid splitting heuristics; this one is
    /// deterministic, which keeps a fixed `--seed` from needing to also
    /// fix BVH shape separately.
    pub fn try_build(
        mut objects: Vec<Arc<dyn Hittable>>,
        t0: f64,
        t1: f64,
    ) -> Result<BvhNode, RenderError> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let len = objects.len();
        if len == 1 {
            let object = objects.pop().unwrap();
            let bbox = object
                .bounding_box(t0, t1)
                .ok_or(RenderError::MissingBoundingBox { what: "a primitive" })?;
            return Ok(BvhNode::Leaf { object, bbox });
        }

        let mut boxes = Vec::with_capacity(len);
        for object in &objects {
            let bbox = object
                .bounding_box(t0, t1)
                .ok_or(RenderError::MissingBoundingBox { what: "a primitive" })?;
            boxes.push(bbox);
        }
        let enclosing = boxes
            .iter()
            .copied()
            .reduce(|a, b| Aabb::surrounding(&a, &b))
            .expect("non-empty object list");
        let axis = enclosing.longest_axis();

        let mut indexed: Vec<usize> = (0..len).collect();
        indexed.sort_by(|&a, &b| {
            let ac = boxes[a].min[axis] + boxes[a].max[axis];
            let bc = boxes[b].min[axis] + boxes[b].max[axis];
            ac.partial_cmp(&bc).unwrap_or(Ordering::Equal)
        });
        let mut sorted: Vec<Arc<dyn Hittable>> = indexed.into_iter().map(|i| objects[i].clone()).collect();

        let mid = len / 2;
        let right_objs = sorted.split_off(mid);
        let left = Box::new(BvhNode::try_build(sorted, t0, t1)?);
        let right = Box::new(BvhNode::try_build(right_objs, t0, t1)?);
        let bbox = Aabb::surrounding(&left.bbox_inner(), &right.bbox_inner());
        Ok(BvhNode::Interior { left, right, bbox })
    }

    fn bbox_inner(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Interior { bbox, .. } => *bbox,
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, t_min, t_max) {
                    return None;
                }
                object.hit(ray, t_min, t_max)
            }
            BvhNode::Interior { left, right, bbox } => {
                if !bbox.hit(ray, t_min, t_max) {
                    return None;
                }
                let hit_left = left.hit(ray, t_min, t_max);
                let far = hit_left.as_ref().map_or(t_max, |h| h.t);
                let hit_right = right.hit(ray, t_min, far);
                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
        Some(self.bbox_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{HittableList, Sphere};
    use crate::material::Lambertian;
    use crate::math::{Color, Point3, Vec3};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_spheres(n: usize, seed: u64) -> Vec<Arc<dyn Hittable>> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let center = Point3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let radius = rng.gen_range(0.1..1.0);
                Arc::new(Sphere::new(center, radius, Arc::new(Lambertian::new(Color::ones())))) as Arc<dyn Hittable>
            })
            .collect()
    }

    fn linear_scan(objects: &[Arc<dyn Hittable>], ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest = t_max;
        let mut result = None;
        for object in objects {
            if let Some(rec) = object.hit(ray, t_min, closest) {
                closest = rec.t;
                result = Some(rec);
            }
        }
        result
    }

    #[test]
    fn bvh_matches_linear_scan_on_random_scene() {
        let objects = random_spheres(64, 7);
        let bvh = BvhNode::try_build(objects.clone(), 0.0, 1.0).unwrap();

        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..200 {
            let origin = Point3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
            );
            let direction = Vec3::random_in_unit_sphere(&mut rng).normalized();
            let ray = Ray::new(origin, direction, 0.0);

            let expected = linear_scan(&objects, &ray, 1e-3, f64::INFINITY).map(|r| r.t);
            let actual = bvh.hit(&ray, 1e-3, f64::INFINITY).map(|r| r.t);
            match (expected, actual) {
                (Some(e), Some(a)) => assert!((e - a).abs() < 1e-9),
                (None, None) => {}
                _ => panic!("BVH and linear scan disagree on hit/miss"),
            }
        }
    }

    #[test]
    fn bvh_bounding_box_covers_all_leaves() {
        let objects = random_spheres(32, 3);
        let mut union: Option<Aabb> = None;
        for o in &objects {
            let b = o.bounding_box(0.0, 1.0).unwrap();
            union = Some(match union {
                Some(acc) => Aabb::surrounding(&acc, &b),
                None => b,
            });
        }
        let union = union.unwrap();
        let bvh = BvhNode::try_build(objects, 0.0, 1.0).unwrap();
        let root_box = bvh.bounding_box(0.0, 1.0).unwrap();
        assert!(root_box.min.x <= union.min.x + 1e-9);
        assert!(root_box.min.y <= union.min.y + 1e-9);
        assert!(root_box.min.z <= union.min.z + 1e-9);
        assert!(root_box.max.x >= union.max.x - 1e-9);
        assert!(root_box.max.y >= union.max.y - 1e-9);
        assert!(root_box.max.z >= union.max.z - 1e-9);
    }

    #[test]
    fn empty_scene_is_an_error() {
        let objects: Vec<Arc<dyn Hittable>> = Vec::new();
        assert!(matches!(BvhNode::try_build(objects, 0.0, 1.0), Err(RenderError::EmptyScene)));
    }

    #[test]
    fn unbounded_hittable_is_reported_not_panicked() {
        struct Unbounded;
        impl Hittable for Unbounded {
            fn hit(&self, _ray: &Ray, _t_min: f64, _t_max: f64) -> Option<HitRecord<'_>> {
                None
            }
            fn bounding_box(&self, _t0: f64, _t1: f64) -> Option<Aabb> {
                None
            }
        }
        let mut list: Vec<Arc<dyn Hittable>> = random_spheres(4, 1);
        list.push(Arc::new(Unbounded));
        assert!(matches!(
            BvhNode::try_build(list, 0.0, 1.0),
            Err(RenderError::MissingBoundingBox { .. })
        ));
    }

    #[test]
    fn hittable_list_is_unaffected_by_bvh_wrapping() {
        let mut list = HittableList::new();
        list.push(Arc::new(Sphere::new(Point3::zero(), 1.0, Arc::new(Lambertian::new(Color::ones())))));
        assert!(list.bounding_box(0.0, 1.0).is_some());
    }
}
