use crate::{Interval, Ray, Vec3};

/// Minimum thickness of a box built from points, per axis.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-Aligned Bounding Box used by the BVH.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// It owns nothing; it is only a summary of the primitives beneath it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// A box containing nothing. Identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// A box containing everything.
    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };

    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Test if a ray crosses this box anywhere inside `ray_t`.
    ///
    /// Slab method: each axis narrows the window to the parameter range
    /// where the ray lies between that axis' two planes. A direction
    /// component of exactly zero never crosses the planes, so that axis
    /// either leaves the window alone (origin between the planes) or
    /// rejects the ray outright.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let origin = r.origin;
        let direction = r.direction;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);

            if direction[axis] == 0.0 {
                if !slab.contains(origin[axis]) {
                    return false;
                }
                continue;
            }

            let adinv = 1.0 / direction[axis];
            let t0 = (slab.min - origin[axis]) * adinv;
            let t1 = (slab.max - origin[axis]) * adinv;
            let (entry, exit) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

            if entry > ray_t.min {
                ray_t.min = entry;
            }
            if exit < ray_t.max {
                ray_t.max = exit;
            }

            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (flat primitives).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// X is compared against Y first, then the winner against Z. Only a
    /// strictly longer axis wins, so ties go to Y over X and to Z over either.
    pub fn longest_axis(&self) -> usize {
        if self.x.size() > self.y.size() {
            if self.x.size() > self.z.size() {
                0
            } else {
                2
            }
        } else if self.y.size() > self.z.size() {
            1
        } else {
            2
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
