use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use na::Vector2;
use nalgebra as na;

use galvo_trace::cli::Args;
use galvo_trace::config::Config;
use galvo_trace::logger::init_logger;
use galvo_trace::{output, plot, sweep};

/// 設定ファイルを読み、コマンドライン引数で上書きする。
fn make_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("failed to load config {}", path))?
        }
        None => Config::default(),
    };

    if let Some(focus_distance) = args.focus_distance {
        config.focus_distance = focus_distance;
    }
    if let Some(galvo_gap) = args.galvo_gap {
        config.galvo_gap = galvo_gap;
    }
    if let Some(samples) = args.samples {
        config.sweep.samples = samples;
    }
    if let Some(min_angle) = args.min_angle {
        config.sweep.min_deg = min_angle;
    }
    if let Some(max_angle) = args.max_angle {
        config.sweep.max_deg = max_angle;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug_level.into());

    let config = make_config(&args)?;
    info!(
        "Start galvanometer scan: focus distance {}, galvo gap {}.",
        config.focus_distance, config.galvo_gap
    );

    let system = config.build_system().context("invalid optical system")?;
    let ray = config.initial_ray().context("invalid initial ray")?;
    let reference = config.reference(&system);

    let samples = sweep::run(&system, &ray, &config.grid());
    let samples = sweep::relative_to(&samples, &reference);

    let summary = sweep::SweepSummary::of(&samples);
    if summary.misses > 0 {
        warn!("{} of {} samples missed the focal plane.", summary.misses, samples.len());
    }
    if let Some((lo, hi)) = summary.extent {
        info!(
            "Spot extent relative to reference: x [{:.6}, {:.6}], y [{:.6}, {:.6}]",
            lo.x, hi.x, lo.y, hi.y
        );
    }

    output::save_table(&args.output, &samples)
        .with_context(|| format!("failed to write {}", args.output))?;

    if let Some(path) = &args.plot {
        let points: Vec<Vector2<f64>> = samples
            .iter()
            .filter_map(|s| s.point.map(|p| p.xy()))
            .collect();
        plot::save_scatter(path, &points, args.plot_size, args.plot_size)
            .with_context(|| format!("failed to save plot {}", path))?;
    }

    Ok(())
}
