// src/main.rs

use anyhow::{Context, Result};
use lane_tracking::debug::visualize_search;
use lane_tracking::export::FrameRecordWriter;
use lane_tracking::mask_source::MaskSource;
use lane_tracking::{Config, LaneEngine};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lane_tracking={}", config.output.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🛣️  Lane Tracking Engine Starting");
    info!("✓ Configuration loaded from {}", config_path);
    info!(
        "Search: {} windows, margin={} px, min_pixels={} | smoothing α={:.2}, loss after {} frames",
        config.search.window_count,
        config.search.margin,
        config.search.min_pixels,
        config.tracker.smoothing_alpha,
        config.tracker.max_frames_lost
    );

    let source = MaskSource::new(config.input.clone());
    let mask_files = source.find_mask_files()?;
    if mask_files.is_empty() {
        error!("No mask images found in {}", config.input.mask_dir);
        return Ok(());
    }

    let output_dir = Path::new(&config.output.output_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let jsonl_path = output_dir.join(format!("{}_per_frame.jsonl", config.output.run_name));
    let debug_path = output_dir.join(format!("{}_debug.png", config.output.run_name));
    let mut writer = FrameRecordWriter::create(&jsonl_path)?;

    let save_debug = config.output.save_debug;
    let mut engine = LaneEngine::new(config)?;
    let total = mask_files.len();
    let mut in_takeover = false;

    for (idx, path) in mask_files.iter().enumerate() {
        let mask = source.load(path)?;
        let result = engine
            .process_frame(&mask)
            .with_context(|| format!("Failed on mask {}", path.display()))?;
        writer.write(&result)?;

        if idx == 0 && save_debug {
            visualize_search(&mask, &result.detection)
                .save(&debug_path)
                .with_context(|| format!("Failed to save {}", debug_path.display()))?;
            info!("🖼️  Debug view saved to {}", debug_path.display());
        }

        if result.takeover && !in_takeover {
            warn!("⚠️  Frame {}: lane lost, driver takeover", result.frame_id);
        } else if !result.takeover && in_takeover {
            info!("✓ Frame {}: both lines back", result.frame_id);
        }
        in_takeover = result.takeover;

        if (idx + 1) % 100 == 0 {
            info!(
                "Progress: {}/{} frames ({:.1}%)",
                idx + 1,
                total,
                100.0 * (idx + 1) as f64 / total as f64
            );
        }
    }

    let written = writer.written();
    writer.finish()?;

    let stats = engine.metrics().summary();
    info!("\n✓ Run complete!");
    info!("  Total frames: {}", stats.total_frames);
    info!(
        "  Accepted fit pairs: {} ({:.1}%)",
        stats.accepted_frames,
        100.0 * stats.accepted_frames as f64 / stats.total_frames.max(1) as f64
    );
    info!(
        "  Rejected: {} (missing {}, not parallel {}, width {})",
        stats.rejected_frames,
        stats.missing_fit_frames,
        stats.not_parallel_frames,
        stats.implausible_width_frames
    );
    info!("  Frames with metrics: {}", stats.metrics_frames);
    if stats.takeover_events > 0 {
        warn!(
            "  🚨 Takeover: {} episode(s), {} frame(s)",
            stats.takeover_events, stats.takeover_frames
        );
    } else {
        info!("  🚨 Takeover: none");
    }
    info!("  Processing Speed: {:.1} FPS", stats.fps);
    info!("💾 {} records written to {}", written, jsonl_path.display());
    info!("{}", serde_json::to_string(&stats)?);

    Ok(())
}
