//! Validate a project without writing a document.

use std::path::PathBuf;

use slidereel_common::config::AppConfig;
use slidereel_project_model::asset::FsAssetResolver;
use slidereel_timeline::LayoutEngine;

use crate::FormatArgs;

pub fn run(config: &AppConfig, path: PathBuf, format: FormatArgs) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let loaded = super::open_project(&path, config, &format)?;
    let project = &loaded.project;

    println!("  Name: {}", project.name);
    println!("  Slides: {}", project.slides.len());
    println!(
        "  Duration: {} frames ({:.2}s @ {}fps)",
        project.total_frames(),
        project.duration_secs(),
        project.settings.fps
    );

    let layout = LayoutEngine::new(FsAssetResolver::new(loaded.paths.clone()))
        .layout(project)
        .map_err(|e| anyhow::anyhow!("Layout failed: {e}"))?;

    let missing_images = loaded.missing_images();
    let issues = missing_images.len() + layout.omissions.len();

    if issues == 0 {
        println!("  Assets: All present");
        println!("\nProject is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    for (ordinal, image) in &missing_images {
        println!("  - slide {ordinal}: image not found at {}", image.display());
    }
    for omission in &layout.omissions {
        println!(
            "  - slide {}: no {} clip ({:?})",
            omission.ordinal,
            omission.track.label(),
            omission.reason
        );
    }
    println!(
        "\n{issues} issue(s) found. The sequence can still be built; affected clips will be offline or absent."
    );

    Ok(())
}
