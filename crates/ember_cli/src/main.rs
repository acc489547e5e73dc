use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use ember_core::{demo_scene, load_scene};
use ember_renderer::{build_world, render, write_ppm, Camera, Hittable};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    log::info!("Starting Ember {}", env!("CARGO_PKG_VERSION"));

    let mut scene = match &args.scene {
        Some(path) => load_scene(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            log::info!("No scene file given, rendering the demo scene");
            demo_scene()
        }
    };
    args.apply_overrides(&mut scene.camera);

    let list = build_world(&scene).context("Failed to build the scene")?;
    let world: Box<dyn Hittable> = if args.brute_force {
        log::info!("Brute force: testing all {} primitives per ray", list.len());
        Box::new(list)
    } else {
        Box::new(list.into_bvh())
    };

    let mut camera = Camera::from(&scene.camera);
    camera.initialize();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let image = render(&camera, world.as_ref(), &mut rng);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_ppm(&mut BufWriter::new(file), &image)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Saved image to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            write_ppm(&mut BufWriter::new(stdout.lock()), &image)
                .context("Failed to write image to stdout")?;
        }
    }

    Ok(())
}
