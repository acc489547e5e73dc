//! Ember Core - scene description and mesh data.
//!
//! This crate provides:
//!
//! - **Mesh data**: `Mesh`, vertex positions plus face index triples
//! - **Scene descriptions**: camera settings, named materials and objects,
//!   loaded from JSON
//!
//! # Example
//!
//! ```ignore
//! use ember_core::load_scene;
//!
//! let scene = load_scene("scene.json")?;
//! println!("Loaded {} objects", scene.objects.len());
//! ```

pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError};
pub use scene::{
    demo_scene, load_scene, load_scene_from_str, CameraDescription, MaterialDescription,
    ObjectDescription, SceneDescription, SceneError, SceneResult,
};
