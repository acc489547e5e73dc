use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ember_core::CameraDescription;
use log::LevelFilter;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ember")]
#[command(about = "Offline Monte Carlo ray tracer writing plain-text PPM images")]
pub struct Args {
    /// Scene description (JSON); the built-in demo scene is used when absent
    pub scene: Option<PathBuf>,

    /// Output PPM path; the image goes to stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for every random draw of the render
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Override the image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the number of samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Override the maximum number of ray bounces
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Test every primitive for every ray instead of building a BVH
    #[arg(long)]
    pub brute_force: bool,

    /// Logging level; RUST_LOG can refine it per module
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply the command line overrides to the scene's camera settings.
    pub fn apply_overrides(&self, camera: &mut CameraDescription) {
        if let Some(width) = self.width {
            camera.image_width = width;
        }
        if let Some(samples) = self.samples {
            camera.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            camera.max_depth = max_depth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ember"]).unwrap();
        assert!(args.scene.is_none());
        assert!(args.output.is_none());
        assert_eq!(args.seed, 0);
        assert!(!args.brute_force);
        assert_eq!(args.log_level, LogLevel::Info);

        let mut camera = CameraDescription::default();
        args.apply_overrides(&mut camera);
        assert_eq!(camera, CameraDescription::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "ember",
            "scene.json",
            "-o",
            "out.ppm",
            "--seed",
            "7",
            "--width",
            "64",
            "-s",
            "4",
            "--max-depth",
            "3",
            "--brute-force",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.scene, Some(PathBuf::from("scene.json")));
        assert_eq!(args.output, Some(PathBuf::from("out.ppm")));
        assert_eq!(args.seed, 7);
        assert!(args.brute_force);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);

        let mut camera = CameraDescription::default();
        args.apply_overrides(&mut camera);
        assert_eq!(camera.image_width, 64);
        assert_eq!(camera.samples_per_pixel, 4);
        assert_eq!(camera.max_depth, 3);
        assert_eq!(camera.vfov, CameraDescription::default().vfov);
    }

    #[test]
    fn test_zero_width_override_fails_scene_validation() {
        let args = Args::try_parse_from(["ember", "--width", "0"]).unwrap();
        let mut scene = ember_core::demo_scene();
        args.apply_overrides(&mut scene.camera);

        assert!(matches!(
            scene.validate(),
            Err(ember_core::SceneError::InvalidCamera(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Args::try_parse_from(["ember", "--log-level", "loud"]).is_err());
    }
}
