//! Build jobs: lay out, assemble and write a project's sequence document.

use std::io::Write;
use std::path::{Path, PathBuf};

use slidereel_common::error::{SlideReelError, SlideReelResult};
use slidereel_project_model::asset::{AssetResolver, FsAssetResolver};
use slidereel_project_model::project::{LoadedProject, Project};
use slidereel_project_model::settings::MotionPreset;
use slidereel_timeline::clip::{ClipBuilder, TimelineClips};
use slidereel_timeline::layout::{LayoutEngine, SoftOmission, TimelineLayout};

use crate::document::serialize;

/// A build ready to run.
#[derive(Debug, Clone)]
pub struct BuildJob {
    /// Where the document is written.
    pub output_path: PathBuf,

    /// Motion applied to every image clip.
    pub motion: MotionPreset,

    /// Treat a missing image file as a fatal error.
    pub require_images: bool,
}

impl BuildJob {
    /// Job writing to the project's default output path.
    pub fn for_project(project: &LoadedProject) -> Self {
        Self {
            output_path: project.output_path(),
            motion: MotionPreset::default(),
            require_images: false,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub total_frames: u64,
    pub video_clips: usize,
    pub overlay_clips: usize,
    pub audio_clips: usize,
    pub omissions: Vec<SoftOmission>,
    pub bytes_written: usize,
}

/// In-memory result of rendering a project.
#[derive(Debug, Clone)]
pub struct RenderedSequence {
    pub layout: TimelineLayout,
    pub clips: TimelineClips,
    pub document: Vec<u8>,
}

/// Lay out `project`, build its clips and serialize the document.
pub fn render_project<R: AssetResolver>(
    project: &Project,
    resolver: R,
    motion: &MotionPreset,
) -> SlideReelResult<RenderedSequence> {
    let layout = LayoutEngine::new(resolver).layout(project)?;
    let clips = ClipBuilder::new(*motion).build_all(&project.slides, &layout);
    let document = serialize(project, &layout, &clips)?;
    Ok(RenderedSequence {
        layout,
        clips,
        document,
    })
}

/// Build a loaded project and write its document.
///
/// Nothing is written unless the whole document was produced.
pub fn build_project(loaded: &LoadedProject, job: &BuildJob) -> SlideReelResult<BuildReport> {
    tracing::info!(
        project = %loaded.project.name,
        slides = loaded.project.slides.len(),
        output = %job.output_path.display(),
        "Starting build"
    );

    let resolver = FsAssetResolver::new(loaded.paths.clone()).require_images(job.require_images);
    let rendered = render_project(&loaded.project, resolver, &job.motion)?;
    write_atomic(&job.output_path, &rendered.document)?;

    let report = BuildReport {
        output_path: job.output_path.clone(),
        total_frames: rendered.layout.total_frames,
        video_clips: rendered.clips.video.len(),
        overlay_clips: rendered.clips.overlay.len(),
        audio_clips: rendered.clips.audio.len(),
        omissions: rendered.layout.omissions,
        bytes_written: rendered.document.len(),
    };

    tracing::info!(
        output = %report.output_path.display(),
        frames = report.total_frames,
        clips = rendered.clips.len(),
        skipped = report.omissions.len(),
        "Build complete"
    );

    Ok(report)
}

/// Write `bytes` to `path` through a temporary file in the same directory,
/// so readers never observe a partial document.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> SlideReelResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SlideReelError::Io(e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote document");
    Ok(())
}
