//! Build the sequence document for a project.

use std::path::PathBuf;

use slidereel_common::config::AppConfig;
use slidereel_xmeml::{build_project, BuildJob};

use crate::FormatArgs;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    name: Option<String>,
    require_images: bool,
    format: FormatArgs,
) -> anyhow::Result<()> {
    println!("Building project at: {}", path.display());

    let mut loaded = super::open_project(&path, config, &format)?;
    if let Some(name) = name {
        loaded.project.name = name;
    }

    let mut job = BuildJob::for_project(&loaded);
    job.require_images = require_images;
    if let Some(output) = output {
        job.output_path = output;
    }

    let settings = &loaded.project.settings;
    println!("  Name: {}", loaded.project.name);
    println!("  Slides: {}", loaded.project.slides.len());
    println!(
        "  Format: {}x{} @ {}fps",
        settings.width, settings.height, settings.fps
    );

    let report = build_project(&loaded, &job)
        .map_err(|e| anyhow::anyhow!("Build failed: {e}"))?;

    println!();
    println!("Timeline:");
    println!(
        "  Duration: {} frames ({:.2}s)",
        report.total_frames,
        loaded.project.duration_secs()
    );
    println!("  Video clips: {}", report.video_clips);
    println!("  Overlay clips: {}", report.overlay_clips);
    println!("  Audio clips: {}", report.audio_clips);

    if !report.omissions.is_empty() {
        println!();
        println!("Skipped clips:");
        for omission in &report.omissions {
            println!(
                "  - slide {}: no {} ({:?})",
                omission.ordinal,
                omission.track.label(),
                omission.reason
            );
        }
    }

    println!();
    println!(
        "Sequence written: {} ({} bytes)",
        report.output_path.display(),
        report.bytes_written
    );

    Ok(())
}
