//! Scene description types.
//!
//! A scene description is plain data: camera settings, named materials,
//! and objects referring to those materials by name. It is loaded from JSON
//! and handed to the renderer, which builds primitives from it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ember_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::{Mesh, MeshError};

/// Errors that can occur while loading or resolving a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object {object} references unknown material '{material}'")]
    UnknownMaterial { object: usize, material: String },

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Object {object} has an invalid mesh: {source}")]
    InvalidMesh {
        object: usize,
        #[source]
        source: MeshError,
    },
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Camera and sampling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    /// Rendered image width in pixels
    pub image_width: u32,
    /// Ratio of image width over height
    pub aspect_ratio: f32,
    /// Random samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces
    pub max_depth: u32,
    /// Vertical field of view in degrees
    pub vfov: f32,
    pub look_from: Vec3,
    pub look_at: Vec3,
    /// Camera-relative "up" direction
    pub vup: Vec3,
    /// Variation angle of rays through each pixel, in degrees (0 = pinhole)
    pub defocus_angle: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
    /// Assign each camera ray a random time in [0, 1)
    pub motion_blur: bool,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            vfov: 90.0,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            motion_blur: true,
        }
    }
}

impl CameraDescription {
    /// Reject settings the renderer cannot build an image or a view from.
    pub fn validate(&self) -> SceneResult<()> {
        let invalid = |reason: String| Err(SceneError::InvalidCamera(reason));

        if self.image_width == 0 {
            return invalid("image_width must be at least 1".to_string());
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return invalid(format!(
                "aspect_ratio must be finite and positive, got {}",
                self.aspect_ratio
            ));
        }
        let height = self.image_width as f32 / self.aspect_ratio;
        if height >= u32::MAX as f32 {
            return invalid(format!(
                "image height {} derived from width {} and aspect ratio {} is too large",
                height, self.image_width, self.aspect_ratio
            ));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return invalid(format!("vfov must be in (0, 180) degrees, got {}", self.vfov));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return invalid(format!(
                "focus_dist must be finite and positive, got {}",
                self.focus_dist
            ));
        }
        if self.look_from == self.look_at {
            return invalid("look_from and look_at must differ".to_string());
        }
        Ok(())
    }
}

/// A named material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    /// Diffuse surface
    Lambertian { albedo: Vec3 },
    /// Reflective surface; `fuzz` is clamped to [0, 1] by the renderer
    Metal { albedo: Vec3, fuzz: f32 },
    /// Transparent refractive surface
    Dielectric { ior: f32 },
}

/// A geometric object referring to a material by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDescription {
    Sphere {
        center: Vec3,
        radius: f32,
        /// Center at time 1; the sphere moves linearly from `center` when set
        #[serde(default, skip_serializing_if = "Option::is_none")]
        center1: Option<Vec3>,
        material: String,
    },
    Triangle {
        vertices: [Vec3; 3],
        /// Displacement reached at time 1
        #[serde(default, skip_serializing_if = "Option::is_none")]
        motion: Option<Vec3>,
        material: String,
    },
    Mesh {
        positions: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        material: String,
    },
}

impl ObjectDescription {
    /// Name of the material this object uses.
    pub fn material(&self) -> &str {
        match self {
            ObjectDescription::Sphere { material, .. }
            | ObjectDescription::Triangle { material, .. }
            | ObjectDescription::Mesh { material, .. } => material,
        }
    }
}

/// A complete renderable scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraDescription,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDescription>,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Check the camera settings, that every material reference resolves and
    /// that every mesh is valid.
    pub fn validate(&self) -> SceneResult<()> {
        self.camera.validate()?;

        for (object, description) in self.objects.iter().enumerate() {
            let material = description.material();
            if !self.materials.contains_key(material) {
                return Err(SceneError::UnknownMaterial {
                    object,
                    material: material.to_string(),
                });
            }

            if let ObjectDescription::Mesh {
                positions, faces, ..
            } = description
            {
                Mesh::new(positions.clone(), faces.clone())
                    .validate()
                    .map_err(|source| SceneError::InvalidMesh { object, source })?;
            }
        }
        Ok(())
    }

    /// Look up a material by name.
    pub fn material(&self, name: &str) -> Option<&MaterialDescription> {
        self.materials.get(name)
    }
}

/// Parse and validate a scene description from a JSON string.
pub fn load_scene_from_str(json: &str) -> SceneResult<SceneDescription> {
    let scene: SceneDescription = serde_json::from_str(json)?;
    scene.validate()?;
    Ok(scene)
}

/// Load and validate a scene description from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<SceneDescription> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let scene = load_scene_from_str(&json)?;

    log::info!(
        "Loaded scene {}: {} materials, {} objects",
        path.display(),
        scene.materials.len(),
        scene.objects.len()
    );

    Ok(scene)
}

/// The built-in scene rendered when no scene file is given.
///
/// A large ground sphere with a diffuse sphere in the middle, a slightly
/// fuzzy metal sphere on the left and a rough metal sphere on the right.
pub fn demo_scene() -> SceneDescription {
    let materials = BTreeMap::from([
        (
            "ground".to_string(),
            MaterialDescription::Lambertian {
                albedo: Vec3::new(0.8, 0.8, 0.0),
            },
        ),
        (
            "center".to_string(),
            MaterialDescription::Lambertian {
                albedo: Vec3::new(0.7, 0.3, 0.3),
            },
        ),
        (
            "left".to_string(),
            MaterialDescription::Metal {
                albedo: Vec3::new(0.8, 0.8, 0.8),
                fuzz: 0.3,
            },
        ),
        (
            "right".to_string(),
            MaterialDescription::Metal {
                albedo: Vec3::new(0.8, 0.6, 0.2),
                fuzz: 1.0,
            },
        ),
    ]);

    let sphere = |center: Vec3, radius: f32, material: &str| ObjectDescription::Sphere {
        center,
        radius,
        center1: None,
        material: material.to_string(),
    };

    SceneDescription {
        camera: CameraDescription::default(),
        materials,
        objects: vec![
            sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, "ground"),
            sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, "center"),
            sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, "left"),
            sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, "right"),
        ],
    }
}
