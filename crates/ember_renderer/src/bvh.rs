//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes built once over the scene's primitives.
//! Each node owns its children outright; traversal is always top-down.
//!
//! Splits are by primitive count (median of the box minimums on the longest
//! axis), not by surface area, so the tree is balanced in count but not
//! necessarily in volume. That is a known limitation of the heuristic.

use crate::{HitRecord, Hittable, Ray};
use ember_math::{Aabb, Interval};

/// BVH node.
pub enum BvhNode {
    /// A single primitive.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
    /// Two primitives, tested left first.
    Pair {
        left: Box<dyn Hittable>,
        right: Box<dyn Hittable>,
        bbox: Aabb,
    },
    /// Internal node with two subtrees.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// No primitives at all.
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> Self {
        let primitive_count = objects.len();
        if objects.is_empty() {
            return BvhNode::Empty;
        }

        let bvh = Self::build(objects);
        log::info!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            primitive_count,
            bvh.node_count(),
            bvh.depth()
        );
        bvh
    }

    /// Recursive construction over a non-empty span.
    fn build(mut objects: Vec<Box<dyn Hittable>>) -> Self {
        let bbox = objects.iter().fold(Aabb::EMPTY, |acc, object| {
            Aabb::surrounding(&acc, &object.bounding_box())
        });

        match objects.len() {
            1 => {
                let object = objects.remove(0);
                BvhNode::Leaf { object, bbox }
            }
            2 => {
                let right = objects.remove(1);
                let left = objects.remove(0);
                BvhNode::Pair { left, right, bbox }
            }
            n => {
                let axis = bbox.longest_axis();

                // Stable, so primitives with equal keys keep their input order
                objects.sort_by(|a, b| {
                    let a_min = a.bounding_box().axis_interval(axis).min;
                    let b_min = b.bounding_box().axis_interval(axis).min;
                    a_min.total_cmp(&b_min)
                });

                let right_objects = objects.split_off(n / 2);
                let left = Box::new(Self::build(objects));
                let right = Box::new(Self::build(right_objects));

                BvhNode::Branch { left, right, bbox }
            }
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } | BvhNode::Pair { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Number of node levels from this node down to the deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } | BvhNode::Pair { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Query a primitive's exact geometry only if the ray reaches its box.
#[inline]
fn hit_primitive<'a>(
    object: &'a dyn Hittable,
    ray: &Ray,
    ray_t: Interval,
    rec: &mut HitRecord<'a>,
) -> bool {
    object.bounding_box().hit(ray, ray_t) && object.hit(ray, ray_t, rec)
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Leaf { object, .. } => hit_primitive(object.as_ref(), ray, ray_t, rec),

            BvhNode::Pair { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = hit_primitive(left.as_ref(), ray, ray_t, rec);
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right =
                    hit_primitive(right.as_ref(), ray, Interval::new(ray_t.min, right_max), rec);

                hit_left || hit_right
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec);

                // The right subtree only gets asked about hits closer than
                // anything the left one found
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rec);

                hit_left || hit_right
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } | BvhNode::Pair { bbox, .. } | BvhNode::Branch { bbox, .. } => {
                *bbox
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Material, Sphere, Triangle};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn matte() -> Arc<Material> {
        Arc::new(Material::lambertian(Vec3::splat(0.5)))
    }

    fn forward() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> Box<dyn Hittable> {
        Box::new(Sphere::new(Vec3::new(x, y, z), r, matte()))
    }

    /// Wraps a sphere and records every query of its exact geometry,
    /// flagging the ones whose ray never reaches the sphere's box.
    struct CountingSphere {
        inner: Sphere,
        queries: Arc<AtomicUsize>,
        wasted: Arc<AtomicUsize>,
    }

    impl Hittable for CountingSphere {
        fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if !self.bounding_box().hit(ray, ray_t) {
                self.wasted.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.hit(ray, ray_t, rec)
        }

        fn bounding_box(&self) -> Aabb {
            self.inner.bounding_box()
        }
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![]);
        assert!(matches!(bvh, BvhNode::Empty));
        assert_eq!(bvh.bounding_box(), Aabb::EMPTY);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        assert!(!bvh.hit(&ray, forward(), &mut HitRecord::default()));
    }

    #[test]
    fn test_bvh_single_primitive() {
        let bvh = BvhNode::new(vec![sphere(0.0, 0.0, -1.0, 0.5)]);
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bvh_two_primitives_form_a_pair() {
        let bvh = BvhNode::new(vec![sphere(0.0, 0.0, -4.0, 0.5), sphere(0.0, 0.0, -2.0, 0.5)]);
        assert!(matches!(bvh, BvhNode::Pair { .. }));

        // The farther sphere is on the left; the right one must still win
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bvh_structure() {
        let objects = (0..10).map(|i| sphere(i as f32 * 2.0, 0.0, -5.0, 0.5)).collect();
        let bvh = BvhNode::new(objects);

        assert!(matches!(bvh, BvhNode::Branch { .. }));
        // 10 -> 5 + 5, each 5 -> pair + 3, each 3 -> leaf + pair
        assert_eq!(bvh.depth(), 4);
        assert_eq!(bvh.node_count(), 11);
        assert_eq!(bvh.bounding_box().x, Interval::new(-0.5, 18.5));
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let objects = (0..10).map(|i| sphere(i as f32, 0.0, -5.0, 0.5)).collect();
        let bvh = BvhNode::new(objects);

        // Ray that hits sphere at x=5
        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, forward(), &mut rec));
        assert!((rec.p.z - (-4.5)).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_closest_hit_along_ray() {
        // Spheres strung along -z in scrambled order
        let zs = [-9.0, -3.0, -12.0, -6.0, -15.0, -4.5, -7.5];
        let objects = zs.iter().map(|&z| sphere(0.0, 0.0, z, 0.5)).collect();
        let bvh = BvhNode::new(objects);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 2.5).abs() < 1e-5);

        // Starting past the nearest sphere, the next one is reported
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(3.7, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-5);

        // Looking backwards finds nothing
        let back = Ray::new_simple(Vec3::ZERO, Vec3::Z);
        assert!(!bvh.hit(&back, forward(), &mut HitRecord::default()));
    }

    #[test]
    fn test_bvh_never_queries_primitives_whose_box_is_missed() {
        let queries = Arc::new(AtomicUsize::new(0));
        let wasted = Arc::new(AtomicUsize::new(0));
        let mut rng = StdRng::seed_from_u64(17);

        let objects = (0..30)
            .map(|_| {
                let center = Vec3::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-40.0..-10.0),
                );
                Box::new(CountingSphere {
                    inner: Sphere::new(center, rng.gen_range(0.5..3.0), matte()),
                    queries: Arc::clone(&queries),
                    wasted: Arc::clone(&wasted),
                }) as Box<dyn Hittable>
            })
            .collect();
        let bvh = BvhNode::new(objects);

        for _ in 0..1000 {
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..-0.2),
            );
            let ray = Ray::new_simple(Vec3::ZERO, direction);
            bvh.hit(&ray, forward(), &mut HitRecord::default());
        }

        assert!(queries.load(Ordering::SeqCst) > 0);
        assert_eq!(wasted.load(Ordering::SeqCst), 0);

        // A ray missing the whole scene touches no geometry at all
        queries.store(0, Ordering::SeqCst);
        let away = Ray::new_simple(Vec3::ZERO, Vec3::new(0.1, 0.2, 1.0));
        assert!(!bvh.hit(&away, forward(), &mut HitRecord::default()));
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bvh_agrees_with_brute_force() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut list = HittableList::new();
        let mut bvh_objects: Vec<Box<dyn Hittable>> = Vec::new();

        for _ in 0..40 {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-30.0..-5.0),
            );
            let radius = rng.gen_range(0.2..1.5);
            list.add(Box::new(Sphere::new(center, radius, matte())));
            bvh_objects.push(Box::new(Sphere::new(center, radius, matte())));
        }
        for _ in 0..20 {
            let a = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-30.0..-5.0),
            );
            let b = a + Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.5);
            let c = a + Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), -0.5);
            list.add(Box::new(Triangle::new(a, b, c, matte())));
            bvh_objects.push(Box::new(Triangle::new(a, b, c, matte())));
        }
        let bvh = BvhNode::new(bvh_objects);

        let mut hits = 0;
        for _ in 0..2000 {
            let target = Vec3::new(
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-12.0..12.0),
                rng.gen_range(-30.0..-5.0),
            );
            let origin = Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 2.0);
            let ray = Ray::new_simple(origin, target - origin);

            let mut list_rec = HitRecord::default();
            let mut bvh_rec = HitRecord::default();
            let list_hit = list.hit(&ray, forward(), &mut list_rec);
            let bvh_hit = bvh.hit(&ray, forward(), &mut bvh_rec);

            assert_eq!(list_hit, bvh_hit);
            if list_hit {
                hits += 1;
                assert!((list_rec.t - bvh_rec.t).abs() < 1e-5);
                assert!(list_rec.normal.abs_diff_eq(bvh_rec.normal, 1e-5));
                assert_eq!(list_rec.front_face, bvh_rec.front_face);
                assert!(ray.direction().dot(bvh_rec.normal) <= 0.0);
            }
        }
        assert!(hits > 100);
    }
}
