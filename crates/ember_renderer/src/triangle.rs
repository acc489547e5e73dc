//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use ember_math::{Aabb, Interval, Vec3};
use std::sync::Arc;

/// A flat-shaded triangle, optionally translating over the shutter interval.
pub struct Triangle {
    /// First vertex at time 0
    v0: Vec3,
    /// v1 - v0 and v2 - v0; a pure translation leaves them unchanged
    edge1: Vec3,
    edge2: Vec3,
    /// Displacement reached at time 1
    motion: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a stationary triangle from three vertices.
    ///
    /// The outward normal follows counter-clockwise winding.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        Self::moving(v0, v1, v2, Vec3::ZERO, material)
    }

    /// Create a triangle translated by `motion` at time 1.
    pub fn moving(v0: Vec3, v1: Vec3, v2: Vec3, motion: Vec3, material: Arc<Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize_or_zero();

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let box0 = Aabb::from_points(min, max);
        let box1 = Aabb::from_points(min + motion, max + motion);

        Self {
            v0,
            edge1,
            edge2,
            motion,
            normal,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    /// Vertices at the given time.
    pub fn vertices_at(&self, time: f32) -> [Vec3; 3] {
        let v0 = self.v0 + time * self.motion;
        [v0, v0 + self.edge1, v0 + self.edge2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let v0 = self.v0 + ray.time() * self.motion;

        let h = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(h);

        // Ray is parallel to the triangle's plane. The determinant scales
        // with the triangle's area, so any fixed cutoff would hide small ones.
        if det == 0.0 {
            return false;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.edge1);
        let v = inv_det * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = inv_det * self.edge2.dot(q);
        if t < 0.0 || !ray_t.surrounds(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal);
        rec.u = u;
        rec.v = v;
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
