//! Hittable trait and HitRecord for ray-object intersection.

use crate::{BvhNode, Lambertian, Material, Ray};
use ember_math::{Aabb, Interval, Vec3};

/// Material referenced by `HitRecord::default()`, before anything is hit.
static NO_MATERIAL: Material = Material::Lambertian(Lambertian::new(Vec3::ZERO));

/// Record of a ray-object intersection.
///
/// One record is shared across a whole query and overwritten by each
/// closer hit, so after the query it describes the nearest surface.
#[derive(Clone, Debug)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Material of the primitive that was hit
    pub material: &'a Material,
    /// Surface UV coordinates
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &NO_MATERIAL,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// `outward_normal` must be unit length. The stored normal is flipped
    /// when the ray arrives from inside, and `front_face` records which.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Anything a ray can intersect: primitives and the aggregates built from them.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object with a parameter inside `ray_t`.
    ///
    /// Returns true if hit and overwrites `rec`; leaves `rec` alone otherwise.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// An unordered collection of hittables, tested by brute force.
///
/// Also the input the BVH is built from.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Add several objects at once.
    pub fn extend<I>(&mut self, objects: I)
    where
        I: IntoIterator<Item = Box<dyn Hittable>>,
    {
        for object in objects {
            self.add(object);
        }
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Build a BVH over the objects of this list.
    pub fn into_bvh(self) -> BvhNode {
        BvhNode::new(self.objects)
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if object.hit(ray, Interval::new(ray_t.min, closest_so_far), rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
