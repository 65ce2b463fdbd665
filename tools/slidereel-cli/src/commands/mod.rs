pub mod build;
pub mod info;
pub mod init;
pub mod validate;

use std::path::Path;

use slidereel_common::config::AppConfig;
use slidereel_common::error::SlideReelError;
use slidereel_project_model::project::LoadedProject;
use slidereel_project_model::settings::{AudioFormat, SequenceSettings};

use crate::FormatArgs;

/// Sequence settings from the user config, with command-line overrides.
pub fn sequence_settings(config: &AppConfig, format: &FormatArgs) -> SequenceSettings {
    let defaults = &config.sequence;
    SequenceSettings {
        fps: format.fps.unwrap_or(defaults.fps),
        width: format.width.unwrap_or(defaults.width),
        height: format.height.unwrap_or(defaults.height),
        audio: AudioFormat {
            sample_rate: defaults.audio_sample_rate,
            bit_depth: defaults.audio_bit_depth,
            channels: defaults.audio_channels,
        },
    }
}

/// Open a workspace or project directory, surfacing load failures as
/// [`SlideReelError`]s.
pub fn open_project(
    path: &Path,
    config: &AppConfig,
    format: &FormatArgs,
) -> anyhow::Result<LoadedProject> {
    let settings = sequence_settings(config, format);
    LoadedProject::open(path, settings).map_err(|e| {
        let err = SlideReelError::from(e);
        anyhow::anyhow!("Failed to load project at {}: {err}", path.display())
    })
}
