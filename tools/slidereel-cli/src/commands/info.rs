//! Show the placement table of a project.

use std::path::PathBuf;

use slidereel_common::config::AppConfig;
use slidereel_project_model::asset::FsAssetResolver;
use slidereel_timeline::{LayoutEngine, TrackKind};

use crate::FormatArgs;

pub fn run(config: &AppConfig, path: PathBuf, format: FormatArgs) -> anyhow::Result<()> {
    let loaded = super::open_project(&path, config, &format)?;
    let p = &loaded.project;

    let layout = LayoutEngine::new(FsAssetResolver::new(loaded.paths.clone()))
        .layout(p)
        .map_err(|e| anyhow::anyhow!("Layout failed: {e}"))?;

    println!("Project: {}", p.name);
    println!("  Root: {}", loaded.paths.root.display());
    println!("  Slides file: {}", loaded.paths.slides_file.display());
    println!("  Output: {}", loaded.output_path().display());
    println!();

    println!("Sequence:");
    println!(
        "  Format: {}x{} @ {}fps",
        p.settings.width, p.settings.height, p.settings.fps
    );
    println!(
        "  Audio: {} Hz, {}-bit, {} channel(s)",
        p.settings.audio.sample_rate, p.settings.audio.bit_depth, p.settings.audio.channels
    );
    println!(
        "  Duration: {} frames ({:.2}s)",
        layout.total_frames,
        p.duration_secs()
    );
    println!();

    println!("Placements:");
    println!("  {:>5}  {:>8}  {:>8}  {:>6}  {:<7}  {}", "slide", "start", "end", "frames", "tracks", "image");
    for video in &layout.video {
        let tracks: String = TrackKind::ALL
            .iter()
            .map(|&kind| {
                let placed = layout
                    .track(kind)
                    .iter()
                    .any(|placement| placement.ordinal == video.ordinal);
                if placed {
                    kind.id_prefix()
                } else {
                    '-'
                }
            })
            .collect();

        println!(
            "  {:>5}  {:>8}  {:>8}  {:>6}  {:<7}  {}",
            video.ordinal,
            video.start,
            video.end(),
            video.duration,
            tracks,
            video.asset.display()
        );
    }

    if let Ok(summary) = serde_json::to_string(&layout.omissions) {
        tracing::debug!(omissions = %summary, "Soft omissions");
    }

    Ok(())
}
