//! Driver binary: build a reference scene, run the solve pipeline, report
//! per-anchor results.
//!
//! ```text
//! carve_demo [scene] [cell_size]
//! ```
//!
//! Scenes: `center-block`, `u-shape`, `cutout`, `house` (default). Log
//! verbosity via `RUST_LOG` (e.g. `RUST_LOG=carve_core=debug`).

mod scenes;

use std::time::Instant;

use carve_core::{World, WorldError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn build_scene(name: &str) -> Result<World, WorldError> {
  match name {
    "center-block" => scenes::center_block(),
    "u-shape" => scenes::u_shape(),
    "cutout" => scenes::cutout(),
    "house" => scenes::house(),
    other => {
      eprintln!("unknown scene '{other}', expected center-block | u-shape | cutout | house");
      std::process::exit(2);
    }
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let mut args = std::env::args().skip(1);
  let scene = args.next().unwrap_or_else(|| "house".to_string());
  let cell_size: f64 = args
    .next()
    .map(|raw| raw.parse().expect("cell_size must be a number"))
    .unwrap_or(carve_core::DEFAULT_CELL_SIZE);

  let result = (|| -> Result<(), WorldError> {
    let start = Instant::now();
    let mut world = build_scene(&scene)?;
    info!(
      scene,
      anchors = world.anchors.len(),
      delimiters = world.delimiters.len(),
      "scene built"
    );

    world.clip_delimiters()?;
    world.create_bvh()?;
    world.calculate_volumes(cell_size)?;

    for anchor in &world.anchors {
      let label = anchor.label.as_deref().unwrap_or("<unnamed>");
      println!(
        "{label:>12}: {} triangles, anchor at {}",
        anchor.volume.len(),
        anchor.position
      );
    }
    println!(
      "solved {} anchors in {:.2?} (cell size {cell_size})",
      world.anchors.len(),
      start.elapsed()
    );
    Ok(())
  })();

  if let Err(error) = result {
    eprintln!("error: {error}");
    std::process::exit(1);
  }
}
