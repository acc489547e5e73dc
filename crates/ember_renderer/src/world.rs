//! Turning scene descriptions into renderable primitives.

use crate::{Hittable, HittableList, Material, Sphere, Triangle};
use ember_core::{
    Mesh, MaterialDescription, ObjectDescription, SceneDescription, SceneError, SceneResult,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Build a material from its description.
pub fn build_material(desc: &MaterialDescription) -> Material {
    match *desc {
        MaterialDescription::Lambertian { albedo } => Material::lambertian(albedo),
        MaterialDescription::Metal { albedo, fuzz } => Material::metal(albedo, fuzz),
        MaterialDescription::Dielectric { ior } => Material::dielectric(ior),
    }
}

/// One flat triangle per usable mesh face, all sharing `material`.
pub fn mesh_to_triangles(mesh: &Mesh, material: Arc<Material>) -> Vec<Triangle> {
    mesh.triangle_vertices()
        .into_iter()
        .map(|[v0, v1, v2]| Triangle::new(v0, v1, v2, Arc::clone(&material)))
        .collect()
}

/// Build the flat list of primitives described by a scene.
///
/// Each named material is built once and shared by every object using it.
pub fn build_world(scene: &SceneDescription) -> SceneResult<HittableList> {
    scene.validate()?;

    let materials: HashMap<&str, Arc<Material>> = scene
        .materials
        .iter()
        .map(|(name, desc)| (name.as_str(), Arc::new(build_material(desc))))
        .collect();

    let mut world = HittableList::new();

    for (index, object) in scene.objects.iter().enumerate() {
        let material = materials
            .get(object.material())
            .cloned()
            .ok_or_else(|| SceneError::UnknownMaterial {
                object: index,
                material: object.material().to_string(),
            })?;

        match object {
            ObjectDescription::Sphere {
                center,
                radius,
                center1,
                ..
            } => {
                let sphere = match center1 {
                    Some(center1) => Sphere::moving(*center, *center1, *radius, material),
                    None => Sphere::new(*center, *radius, material),
                };
                world.add(Box::new(sphere));
            }
            ObjectDescription::Triangle {
                vertices: [v0, v1, v2],
                motion,
                ..
            } => {
                let motion = motion.unwrap_or_default();
                world.add(Box::new(Triangle::moving(*v0, *v1, *v2, motion, material)));
            }
            ObjectDescription::Mesh {
                positions, faces, ..
            } => {
                let mesh = Mesh::new(positions.clone(), faces.clone());
                let triangles = mesh_to_triangles(&mesh, material);
                log::debug!(
                    "Object {}: mesh with {} vertices, {} of {} faces usable, bounds {:?}",
                    index,
                    mesh.vertex_count(),
                    triangles.len(),
                    mesh.triangle_count(),
                    mesh.bounds
                );
                world.extend(
                    triangles
                        .into_iter()
                        .map(|triangle| Box::new(triangle) as Box<dyn Hittable>),
                );
            }
        }
    }

    log::info!(
        "Built world: {} primitives from {} objects",
        world.len(),
        scene.objects.len()
    );

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HitRecord, Ray};
    use ember_core::demo_scene;
    use ember_math::{Interval, Vec3};

    fn forward() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_build_material() {
        let metal = build_material(&MaterialDescription::Metal {
            albedo: Vec3::ONE,
            fuzz: 2.0,
        });
        assert_eq!(metal, Material::metal(Vec3::ONE, 1.0));

        let glass = build_material(&MaterialDescription::Dielectric { ior: 1.5 });
        assert_eq!(glass, Material::dielectric(1.5));
    }

    #[test]
    fn test_mesh_to_triangles_skips_unusable_faces() {
        let mesh = Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(1.0, -1.0, -2.0),
                Vec3::new(0.0, 1.0, -2.0),
                Vec3::new(2.0, 2.0, -2.0),
            ],
            // Second face is degenerate, third points past the vertex list
            vec![[0, 1, 2], [0, 0, 1], [1, 3, 9]],
        );
        let material = Arc::new(Material::lambertian(Vec3::splat(0.5)));

        let triangles = mesh_to_triangles(&mesh, Arc::clone(&material));
        assert_eq!(triangles.len(), 1);
        // The list's handle plus one per triangle
        assert_eq!(Arc::strong_count(&material), 2);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(triangles[0].hit(&ray, forward(), &mut HitRecord::default()));
    }

    #[test]
    fn test_build_demo_world() {
        let world = build_world(&demo_scene()).unwrap();
        assert_eq!(world.len(), demo_scene().objects.len());

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(world.hit(&ray, forward(), &mut rec));
    }

    #[test]
    fn test_build_world_with_all_object_kinds() {
        let json = r#"{
            "materials": {
                "matte": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] },
                "glass": { "type": "dielectric", "ior": 1.5 }
            },
            "objects": [
                { "type": "sphere", "center": [0, 0, -3], "radius": 0.5, "material": "glass" },
                { "type": "sphere", "center": [2, 0, -3], "center1": [2, 1, -3],
                  "radius": 0.5, "material": "matte" },
                { "type": "triangle", "vertices": [[-1, -1, -5], [1, -1, -5], [0, 1, -5]],
                  "material": "matte" },
                { "type": "mesh",
                  "positions": [[-4, 0, -5], [-3, 0, -5], [-3, 1, -5], [-4, 1, -5]],
                  "faces": [[0, 1, 2], [0, 2, 3]],
                  "material": "matte" }
            ]
        }"#;
        let scene = ember_core::load_scene_from_str(json).unwrap();
        let world = build_world(&scene).unwrap();

        // Two spheres, one triangle, two mesh faces
        assert_eq!(world.len(), 5);

        // The glass sphere sits in front of the triangle
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(world.hit(&ray, forward(), &mut rec));
        assert!((rec.t - 2.5).abs() < 1e-5);
        assert_eq!(*rec.material, Material::dielectric(1.5));
    }

    #[test]
    fn test_build_world_rejects_unknown_material() {
        let mut scene = demo_scene();
        scene.objects.push(ObjectDescription::Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
            center1: None,
            material: "missing".to_string(),
        });

        let err = build_world(&scene).err().unwrap();
        assert!(matches!(err, SceneError::UnknownMaterial { material, .. } if material == "missing"));
    }
}
