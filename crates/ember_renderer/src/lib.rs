//! Ember renderer - CPU path tracing
//!
//! A Monte Carlo path tracer for spheres and triangle meshes, with a BVH
//! over the primitives, three surface materials and a thin-lens camera.
//!
//! Rendering is single-threaded and every random draw comes from the
//! generator passed in by the caller, so a seed fully determines the image.

mod hittable;
mod material;
pub mod sampling;
mod sphere;
mod triangle;
mod camera;
mod bvh;
mod renderer;
mod ppm;
mod world;

pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{reflect, refract, Color, Dielectric, Lambertian, Material, Metal, Scatter};
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use camera::Camera;
pub use bvh::BvhNode;
pub use renderer::{color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, ImageBuffer};
pub use ppm::write_ppm;
pub use world::{build_material, build_world, mesh_to_triangles};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
