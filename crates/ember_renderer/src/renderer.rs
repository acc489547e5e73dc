//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a bounded bounce budget
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Color, HitRecord, Hittable, Ray};
use ember_math::Interval;
use rand::RngCore;
use std::time::Instant;

/// Lower bound of the hit interval for every query, to keep bounced rays
/// from hitting the surface they start on.
const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// Each bounce consumes one unit of `depth`; at zero the path contributes
/// no light and the world is not queried at all.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();

    if !world.hit(ray, Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY), &mut rec) {
        return sky_gradient(ray);
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * ray_color(&result.scattered, world, depth - 1, rng),
        // Absorbed
        None => Color::ZERO,
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert one linear channel to 0-255, truncating.
#[inline]
fn channel_to_byte(linear: f32) -> u8 {
    let intensity = Interval::new(0.0, 0.999);
    (256.0 * intensity.clamp(linear_to_gamma(linear))) as u8
}

/// Convert an averaged linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        channel_to_byte(color.x),
        channel_to_byte(color.y),
        channel_to_byte(color.z),
    ]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth, rng);
    }

    // Average the samples
    pixel_color * camera.samples_scale()
}

/// Simple image buffer for storing render output.
///
/// Pixels are averaged linear colors, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Offset of (x, y) in `pixels`; computed in `usize` so large images
    /// cannot overflow `u32`.
    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Gamma-corrected 8-bit RGB triples in pixel order.
    pub fn to_rgb(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|&color| color_to_rgb(color)).collect()
    }
}

/// Render the entire scene to an image buffer.
///
/// Single-threaded; the camera must already be initialized.
pub fn render(camera: &Camera, world: &dyn Hittable, rng: &mut dyn RngCore) -> ImageBuffer {
    let start = Instant::now();
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        log::debug!("Scanlines remaining: {}", camera.image_height - y);
        for x in 0..camera.image_width {
            let color = render_pixel(camera, world, x, y, rng);
            image.set(x, y, color);
        }
    }

    log::info!(
        "Rendered {}x{} at {} spp in {:.2?}",
        image.width,
        image.height,
        camera.samples_per_pixel,
        start.elapsed()
    );

    image
}
