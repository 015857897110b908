//! CLI tool for inspecting the simplification ladder of a synthetic ROI
//!
//! Usage:
//!   cargo run --release --bin simplify_bench -- [options]
//!
//! Options:
//!   --points <n>          Vertices of the synthetic ellipse (default 100000)
//!   --radius <r>          Ellipse radius in pixels (default 20000)
//!   --downsamples <list>  Comma-separated downsamples (default 1,4,8,16,32,64,128)
//!   --config <file>       JSON simplification settings
//!   --stats               Print cache counters as JSON at the end
//!
//! Set RUST_LOG=debug to see each level as it is computed.

use std::env;
use std::sync::Arc;
use std::time::Instant;

use roi_overlay::overlay::tessellate_shape;
use roi_overlay::{PolygonRoi, Roi, ShapeCacheRegistry, SimplifyConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let mut n_points: usize = 100_000;
    let mut radius: f64 = 20_000.0;
    let mut downsamples: Vec<f64> = vec![1.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0];
    let mut config = SimplifyConfig::default();
    let mut show_stats = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--points" => {
                i += 1;
                if i < args.len() {
                    n_points = args[i].parse()?;
                }
            }
            "--radius" => {
                i += 1;
                if i < args.len() {
                    radius = args[i].parse()?;
                }
            }
            "--downsamples" => {
                i += 1;
                if i < args.len() {
                    downsamples = args[i]
                        .split(',')
                        .map(|part| part.trim().parse::<f64>())
                        .collect::<Result<_, _>>()?;
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    config = SimplifyConfig::from_file(&args[i])?;
                }
            }
            "--stats" => show_stats = true,
            "--help" | "-h" => {
                eprintln!("Usage: {} [--points n] [--radius r] [--downsamples a,b,c] [--config file] [--stats]", args[0]);
                return Ok(());
            }
            other => anyhow::bail!("unknown option '{}'", other),
        }
        i += 1;
    }

    let registry = ShapeCacheRegistry::with_config(config)?;
    let start = Instant::now();
    let roi: Arc<dyn Roi> = Arc::new(PolygonRoi::ellipse(0.0, 0.0, radius, radius, n_points));
    println!(
        "Synthetic ellipse: {} points, radius {:.0} (built in {:.2}ms)",
        roi.num_points(),
        radius,
        start.elapsed().as_secs_f64() * 1000.0
    );

    println!("{:>10} {:>10} {:>10} {:>12} {:>12}", "downsample", "points", "triangles", "first (ms)", "repeat (ms)");
    for &downsample in &downsamples {
        let first_start = Instant::now();
        let shape = registry.get_for_downsample(&roi, downsample);
        let first = first_start.elapsed();

        let repeat_start = Instant::now();
        let _ = registry.get_for_downsample(&roi, downsample);
        let repeat = repeat_start.elapsed();

        let triangles = tessellate_shape(&shape).triangle_count();
        println!(
            "{:>10.2} {:>10} {:>10} {:>12.3} {:>12.3}",
            downsample,
            shape.num_points(),
            triangles,
            first.as_secs_f64() * 1000.0,
            repeat.as_secs_f64() * 1000.0
        );
    }

    println!("Cached levels:");
    for level in registry.cache_for(&roi).levels() {
        println!("  downsample {:>8.2}: {} points", level.threshold(), level.num_points());
    }

    if show_stats {
        println!("{}", serde_json::to_string_pretty(&registry.stats())?);
    }

    Ok(())
}
