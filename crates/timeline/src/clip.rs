//! Clip and keyframe construction.
//!
//! Every placement becomes a [`ClipItem`] carrying everything the document
//! serializer needs: identifiers, source and timeline ranges, the file
//! reference, and for image clips the motion effect with its pan keyframes.

use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use slidereel_project_model::settings::{MotionPreset, ParamRange, Point2};
use slidereel_project_model::slide::Slide;

use crate::layout::{Placement, TimelineLayout, TrackKind};

/// Prefix of every file reference in the document.
pub const FILE_URL_PREFIX: &str = "file://localhost";

/// Bytes escaped in file URLs. Path separators stay literal.
const PATH_URL_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\');

/// Deterministic identifiers of a clip, its master clip and its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipIds {
    pub clip: String,
    pub master_clip: String,
    pub file: String,
}

impl ClipIds {
    pub fn new(kind: TrackKind, ordinal: u32) -> Self {
        let prefix = kind.id_prefix();
        Self {
            clip: format!("{prefix}clip-{ordinal}"),
            master_clip: format!("masterclip-{prefix}-{ordinal}"),
            file: format!("{prefix}file-{ordinal}"),
        }
    }
}

/// A keyframe of a 2D parameter, at a frame offset local to the clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keyframe {
    pub when: u64,
    pub value: Point2,
}

/// A 2D parameter with a static value and optional keyframes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimatedPoint {
    pub value: Point2,
    pub keyframes: Vec<Keyframe>,
}

/// The "Basic Motion" effect attached to image clips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionEffect {
    pub scale: f64,
    pub scale_range: ParamRange,
    pub rotation: f64,
    pub rotation_range: ParamRange,
    pub center: AnimatedPoint,
    pub anchor: Point2,
    pub anti_flicker: f64,
    pub anti_flicker_range: ParamRange,
}

impl MotionEffect {
    /// Pan across a clip of `duration` frames: first keyframe at local frame
    /// 0, last at `duration - 1`.
    pub fn pan(preset: &MotionPreset, duration: u64) -> Self {
        let last = duration.saturating_sub(1);
        Self {
            scale: preset.scale,
            scale_range: preset.scale_range,
            rotation: preset.rotation,
            rotation_range: preset.rotation_range,
            center: AnimatedPoint {
                value: preset.center,
                keyframes: vec![
                    Keyframe {
                        when: 0,
                        value: preset.pan_from,
                    },
                    Keyframe {
                        when: last,
                        value: preset.pan_to,
                    },
                ],
            },
            anchor: preset.anchor,
            anti_flicker: preset.anti_flicker,
            anti_flicker_range: preset.anti_flicker_range,
        }
    }
}

/// A fully described clip, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipItem {
    pub kind: TrackKind,
    pub ordinal: u32,
    pub ids: ClipIds,

    /// Display name (asset file name).
    pub name: String,

    /// Visible length on the timeline, in frames.
    pub duration: u64,

    /// Absolute timeline window.
    pub start: u64,
    pub end: u64,

    /// Source range. Assets are always used in full.
    pub in_point: u64,
    pub out_point: u64,

    /// Absolute asset path.
    pub path: PathBuf,

    /// `file://localhost` URL of `path`.
    pub path_url: String,

    /// Length the file itself declares, when the grammar wants one.
    pub native_duration: Option<u64>,

    /// Motion effect (image clips only).
    pub motion: Option<MotionEffect>,
}

/// Clips for all three tracks, each in ascending start order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineClips {
    pub video: Vec<ClipItem>,
    pub overlay: Vec<ClipItem>,
    pub audio: Vec<ClipItem>,
}

impl TimelineClips {
    pub fn track(&self, kind: TrackKind) -> &[ClipItem] {
        match kind {
            TrackKind::Video => &self.video,
            TrackKind::Overlay => &self.overlay,
            TrackKind::Audio => &self.audio,
        }
    }

    pub fn len(&self) -> usize {
        self.video.len() + self.overlay.len() + self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds [`ClipItem`]s from placements.
#[derive(Debug, Clone, Default)]
pub struct ClipBuilder {
    motion: MotionPreset,
}

impl ClipBuilder {
    pub fn new(motion: MotionPreset) -> Self {
        Self { motion }
    }

    /// Build the clip for `slide` on `kind` at `placement`.
    ///
    /// The visible window always comes from the placement. Audio files
    /// declare one frame less than the placement (never below one frame)
    /// to absorb sample-to-frame rounding.
    pub fn build_clip(&self, slide: &Slide, kind: TrackKind, placement: &Placement) -> ClipItem {
        debug_assert_eq!(slide.ordinal, placement.ordinal);
        debug_assert_eq!(kind, placement.track);

        let duration = placement.duration;
        let (native_duration, motion) = match kind {
            TrackKind::Video => (None, Some(MotionEffect::pan(&self.motion, duration))),
            TrackKind::Overlay => (None, None),
            TrackKind::Audio => (Some(duration.saturating_sub(1).max(1)), None),
        };

        ClipItem {
            kind,
            ordinal: slide.ordinal,
            ids: ClipIds::new(kind, slide.ordinal),
            name: file_name(&placement.asset),
            duration,
            start: placement.start,
            end: placement.end(),
            in_point: 0,
            out_point: duration,
            path: placement.asset.clone(),
            path_url: file_url(&placement.asset),
            native_duration,
            motion,
        }
    }

    /// Build clips for every placement in `layout`.
    ///
    /// `slides` must be the slide list the layout was computed from.
    pub fn build_all(&self, slides: &[Slide], layout: &TimelineLayout) -> TimelineClips {
        let build_track = |kind: TrackKind| -> Vec<ClipItem> {
            layout
                .track(kind)
                .iter()
                .filter_map(|placement| {
                    slides
                        .iter()
                        .find(|s| s.ordinal == placement.ordinal)
                        .map(|slide| self.build_clip(slide, kind, placement))
                })
                .collect()
        };

        TimelineClips {
            video: build_track(TrackKind::Video),
            overlay: build_track(TrackKind::Overlay),
            audio: build_track(TrackKind::Audio),
        }
    }
}

/// `file://localhost` URL for an absolute path, percent-encoding spaces and
/// URL-reserved bytes. Backslashes are separators only on Windows; elsewhere
/// they are part of the file name.
pub fn file_url(path: &Path) -> String {
    let mut posix = path.to_string_lossy().into_owned();
    if cfg!(windows) {
        posix = posix.replace('\\', "/");
    }
    if !posix.starts_with('/') {
        posix.insert(0, '/');
    }
    format!(
        "{FILE_URL_PREFIX}{}",
        utf8_percent_encode(&posix, PATH_URL_ESCAPES)
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
