// src/main.rs
//
// Demo: drives the pipeline with a simulated device rotating through all
// four orientations, with per-sample noise, and prints every published
// orientation change.

use anyhow::Result;
use orientation_detection::sensor::{self, SimulatedGravitySensor};
use orientation_detection::{Config, OrientationPipeline};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::load("config.yaml").unwrap_or_else(|err| {
        eprintln!("falling back to default config: {err:#}");
        Config::default()
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("orientation_detection={}", config.logging.level))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("orientation detection demo starting");

    let sim = Arc::new(SimulatedGravitySensor::new());
    sim.set_gravity(0.0, -0.98, 0.1, 0);
    if !sensor::install_default(sim.clone()) {
        warn!("default sensor already installed");
    }

    let pipeline = OrientationPipeline::new(config.pipeline.clone());
    let orientations = pipeline.subscribe();
    pipeline.start();

    let printer = std::thread::spawn(move || {
        for state in orientations.iter() {
            info!("observed: {}", state.as_str());
        }
    });

    // One slow full rotation: portrait -> landscape-left -> upside-down
    // -> landscape-right -> portrait, with jitter on every sample.
    let mut rng = rand::rng();
    let steps = 240;
    for step in 0..=steps {
        let angle =
            -std::f32::consts::FRAC_PI_2 + (step as f32 / steps as f32) * std::f32::consts::TAU;
        let x = angle.cos() + rng.random_range(-0.05..0.05);
        let y = angle.sin() + rng.random_range(-0.05..0.05);
        sim.set_gravity(x, y, 0.1, step as u64 * 25);
        std::thread::sleep(Duration::from_millis(25));
    }

    pipeline.stop();
    info!("summary: {:?}", pipeline.metrics().summary());

    drop(pipeline);
    printer
        .join()
        .map_err(|_| anyhow::anyhow!("printer thread panicked"))?;

    Ok(())
}
