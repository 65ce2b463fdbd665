//! Timeline layout: slides to absolute frame windows.
//!
//! # Algorithm
//!
//! 1. A single cursor (in frames) walks the slides in ordinal order.
//! 2. Each slide occupies `[cursor, cursor + duration)` on the video track.
//! 3. The overlay and audio clips of a slide reuse that exact window, so the
//!    three tracks stay frame-synchronized per slide.
//! 4. Missing overlay or narration assets are soft omissions: the track
//!    simply has no clip for that slide.
//!
//! The total sequence duration is the final cursor value.

use std::path::PathBuf;

use serde::Serialize;

use slidereel_common::error::{SlideReelError, SlideReelResult};
use slidereel_project_model::asset::AssetResolver;
use slidereel_project_model::project::Project;
use slidereel_project_model::slide::Slide;

/// Timeline lane kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Slide images (video track 1).
    Video,
    /// Caption overlays (video track 2).
    Overlay,
    /// Narration (audio track 1).
    Audio,
}

impl TrackKind {
    pub const ALL: [TrackKind; 3] = [TrackKind::Video, TrackKind::Overlay, TrackKind::Audio];

    /// Single-letter prefix used in clip identifiers.
    pub fn id_prefix(self) -> char {
        match self {
            TrackKind::Video => 'v',
            TrackKind::Overlay => 's',
            TrackKind::Audio => 'a',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Overlay => "overlay",
            TrackKind::Audio => "audio",
        }
    }
}

/// One slide's window on one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Ordinal of the slide this clip belongs to.
    pub ordinal: u32,

    /// Track the clip sits on.
    pub track: TrackKind,

    /// Absolute start frame.
    pub start: u64,

    /// Length in frames.
    pub duration: u64,

    /// Resolved asset path.
    pub asset: PathBuf,
}

impl Placement {
    /// Absolute end frame (exclusive).
    pub fn end(&self) -> u64 {
        self.start + self.duration
    }
}

/// Why a slide has no clip on an optional track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    /// The slide names no asset for this track.
    NoReference,
    /// The asset is named or expected but not available.
    NotFound,
}

/// A slide that contributes no clip to an optional track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftOmission {
    pub ordinal: u32,
    pub track: TrackKind,
    pub reason: OmissionReason,
}

/// Per-track placements for a whole project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineLayout {
    /// One placement per slide, contiguous from frame 0.
    pub video: Vec<Placement>,

    /// Placements for slides whose caption overlay exists.
    pub overlay: Vec<Placement>,

    /// Placements for slides whose narration exists.
    pub audio: Vec<Placement>,

    /// Sequence duration in frames (end of the last video placement).
    pub total_frames: u64,

    /// Optional-track clips that were skipped.
    pub omissions: Vec<SoftOmission>,
}

impl TimelineLayout {
    /// Placements on the given track, in ascending start order.
    pub fn track(&self, kind: TrackKind) -> &[Placement] {
        match kind {
            TrackKind::Video => &self.video,
            TrackKind::Overlay => &self.overlay,
            TrackKind::Audio => &self.audio,
        }
    }

    /// Video placement for a slide ordinal.
    pub fn video_for(&self, ordinal: u32) -> Option<&Placement> {
        self.video.iter().find(|p| p.ordinal == ordinal)
    }
}

/// Computes [`TimelineLayout`]s, asking `resolver` once per slide per track.
pub struct LayoutEngine<R> {
    resolver: R,
}

impl<R: AssetResolver> LayoutEngine<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Lay out every slide of `project`.
    ///
    /// Fails on an empty slide list, a zero-length slide, or an image the
    /// resolver cannot resolve. Missing overlays and narration never fail.
    pub fn layout(&self, project: &Project) -> SlideReelResult<TimelineLayout> {
        if project.slides.is_empty() {
            return Err(SlideReelError::EmptyTimeline);
        }

        let mut video = Vec::with_capacity(project.slides.len());
        let mut overlay = Vec::new();
        let mut audio = Vec::new();
        let mut omissions = Vec::new();
        let mut cursor: u64 = 0;

        for slide in &project.slides {
            if slide.duration_frames == 0 {
                return Err(SlideReelError::invalid_slide(
                    slide.ordinal,
                    "duration must be a positive number of frames",
                ));
            }
            let image = self.resolver.image(slide).ok_or_else(|| {
                SlideReelError::invalid_slide(
                    slide.ordinal,
                    format!("image '{}' could not be resolved", slide.image),
                )
            })?;

            let start = cursor;
            let duration = slide.duration_frames as u64;
            let place = |track, asset| Placement {
                ordinal: slide.ordinal,
                track,
                start,
                duration,
                asset,
            };

            video.push(place(TrackKind::Video, image));

            match self.resolver.overlay(slide) {
                Some(path) => overlay.push(place(TrackKind::Overlay, path)),
                None => {
                    tracing::debug!(ordinal = slide.ordinal, "No caption overlay; leaving gap");
                    omissions.push(SoftOmission {
                        ordinal: slide.ordinal,
                        track: TrackKind::Overlay,
                        reason: OmissionReason::NotFound,
                    });
                }
            }

            match self.resolver.narration(slide) {
                Some(path) => audio.push(place(TrackKind::Audio, path)),
                None => omissions.push(narration_omission(slide)),
            }

            cursor += duration;
        }

        tracing::debug!(
            slides = video.len(),
            overlays = overlay.len(),
            narrations = audio.len(),
            total_frames = cursor,
            "Timeline laid out"
        );

        Ok(TimelineLayout {
            video,
            overlay,
            audio,
            total_frames: cursor,
            omissions,
        })
    }
}

fn narration_omission(slide: &Slide) -> SoftOmission {
    let reason = match &slide.audio {
        Some(name) => {
            tracing::warn!(
                ordinal = slide.ordinal,
                file = %name,
                "Narration file not found; slide will be silent"
            );
            OmissionReason::NotFound
        }
        None => {
            tracing::debug!(ordinal = slide.ordinal, "Slide has no narration");
            OmissionReason::NoReference
        }
    };
    SoftOmission {
        ordinal: slide.ordinal,
        track: TrackKind::Audio,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use slidereel_project_model::settings::SequenceSettings;
    use std::collections::HashSet;

    /// Resolver with a fixed set of present overlays and narrations.
    #[derive(Default)]
    struct StubResolver {
        overlays: HashSet<u32>,
        narrations: HashSet<u32>,
        unresolvable_images: HashSet<u32>,
    }

    impl AssetResolver for StubResolver {
        fn image(&self, slide: &Slide) -> Option<PathBuf> {
            (!self.unresolvable_images.contains(&slide.ordinal))
                .then(|| PathBuf::from("/p/IMGS").join(&slide.image))
        }

        fn overlay(&self, slide: &Slide) -> Option<PathBuf> {
            self.overlays
                .contains(&slide.ordinal)
                .then(|| PathBuf::from("/p/SUBS").join(slide.overlay_file_name()))
        }

        fn narration(&self, slide: &Slide) -> Option<PathBuf> {
            let name = slide.audio.as_ref()?;
            self.narrations
                .contains(&slide.ordinal)
                .then(|| PathBuf::from("/p/VOICE").join(name))
        }
    }

    fn project(durations: &[u32]) -> Project {
        let slides = durations
            .iter()
            .enumerate()
            .map(|(i, &frames)| Slide {
                ordinal: i as u32 + 1,
                narration: String::new(),
                caption: String::new(),
                image: format!("img_{i:02}.jpg"),
                audio: Some(format!("chunk_voice{:02}.mp3", i + 1)),
                duration_frames: frames,
            })
            .collect();
        Project::new("test", SequenceSettings::default(), slides)
    }

    fn all_present(n: u32) -> StubResolver {
        StubResolver {
            overlays: (1..=n).collect(),
            narrations: (1..=n).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_three_slides_start_offsets() {
        let engine = LayoutEngine::new(all_present(3));
        let layout = engine.layout(&project(&[30, 45, 60])).unwrap();

        let starts: Vec<u64> = layout.video.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![0, 30, 75]);
        assert_eq!(layout.total_frames, 135);
        assert!(layout.omissions.is_empty());
    }

    #[test]
    fn test_single_slide_window() {
        let engine = LayoutEngine::new(all_present(1));
        let layout = engine.layout(&project(&[90])).unwrap();
        assert_eq!(layout.video.len(), 1);
        assert_eq!(layout.video[0].start, 0);
        assert_eq!(layout.video[0].end(), 90);
    }

    #[test]
    fn test_overlay_and_audio_share_video_window() {
        let engine = LayoutEngine::new(all_present(3));
        let layout = engine.layout(&project(&[10, 20, 30])).unwrap();

        for kind in [TrackKind::Overlay, TrackKind::Audio] {
            for placement in layout.track(kind) {
                let video = layout.video_for(placement.ordinal).unwrap();
                assert_eq!(placement.start, video.start);
                assert_eq!(placement.duration, video.duration);
            }
        }
    }

    #[test]
    fn test_missing_audio_is_soft_omission() {
        let mut resolver = all_present(3);
        resolver.narrations.remove(&2);
        let engine = LayoutEngine::new(resolver);
        let layout = engine.layout(&project(&[30, 45, 60])).unwrap();

        let ordinals: Vec<u32> = layout.audio.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![1, 3]);
        assert_eq!(layout.audio[1].start, 75);
        assert_eq!(layout.video.len(), 3);
        assert_eq!(layout.overlay.len(), 3);
        assert_eq!(
            layout.omissions,
            vec![SoftOmission {
                ordinal: 2,
                track: TrackKind::Audio,
                reason: OmissionReason::NotFound,
            }]
        );
    }

    #[test]
    fn test_slide_without_audio_reference() {
        let mut p = project(&[30]);
        p.slides[0].audio = None;
        let layout = LayoutEngine::new(all_present(1)).layout(&p).unwrap();
        assert!(layout.audio.is_empty());
        assert_eq!(layout.omissions[0].reason, OmissionReason::NoReference);
    }

    #[test]
    fn test_missing_overlay_leaves_video_untouched() {
        let mut resolver = all_present(3);
        resolver.overlays.remove(&1);
        let with_gap = LayoutEngine::new(resolver)
            .layout(&project(&[30, 45, 60]))
            .unwrap();
        let full = LayoutEngine::new(all_present(3))
            .layout(&project(&[30, 45, 60]))
            .unwrap();

        assert_eq!(with_gap.overlay.len(), 2);
        assert_eq!(with_gap.overlay[0].ordinal, 2);
        assert_eq!(with_gap.video, full.video);
        assert_eq!(with_gap.audio, full.audio);
    }

    #[test]
    fn test_zero_duration_fails() {
        let err = LayoutEngine::new(all_present(2))
            .layout(&project(&[30, 0]))
            .unwrap_err();
        assert!(matches!(err, SlideReelError::InvalidSlide { ordinal: 2, .. }));
    }

    #[test]
    fn test_unresolvable_image_fails() {
        let resolver = StubResolver {
            unresolvable_images: [1].into_iter().collect(),
            ..Default::default()
        };
        let err = LayoutEngine::new(resolver)
            .layout(&project(&[30]))
            .unwrap_err();
        assert!(matches!(err, SlideReelError::InvalidSlide { ordinal: 1, .. }));
    }

    #[test]
    fn test_empty_project_fails() {
        let err = LayoutEngine::new(all_present(0))
            .layout(&project(&[]))
            .unwrap_err();
        assert!(matches!(err, SlideReelError::EmptyTimeline));
    }

    proptest! {
        #[test]
        fn prop_total_equals_sum_of_durations(durations in prop::collection::vec(1u32..10_000, 1..64)) {
            let n = durations.len() as u32;
            let layout = LayoutEngine::new(all_present(n)).layout(&project(&durations)).unwrap();
            let sum: u64 = durations.iter().map(|&d| d as u64).sum();
            prop_assert_eq!(layout.total_frames, sum);
        }

        #[test]
        fn prop_video_track_is_contiguous(durations in prop::collection::vec(1u32..10_000, 1..64)) {
            let n = durations.len() as u32;
            let layout = LayoutEngine::new(all_present(n)).layout(&project(&durations)).unwrap();
            prop_assert_eq!(layout.video[0].start, 0);
            for pair in layout.video.windows(2) {
                prop_assert_eq!(pair[1].start, pair[0].end());
            }
        }

        #[test]
        fn prop_optional_tracks_never_overlap(
            durations in prop::collection::vec(1u32..1_000, 1..32),
            present in prop::collection::vec(any::<bool>(), 32),
        ) {
            let n = durations.len() as u32;
            let resolver = StubResolver {
                overlays: (1..=n).filter(|i| present[*i as usize - 1]).collect(),
                narrations: (1..=n).filter(|i| !present[*i as usize - 1]).collect(),
                ..Default::default()
            };
            let layout = LayoutEngine::new(resolver).layout(&project(&durations)).unwrap();
            for kind in TrackKind::ALL {
                for pair in layout.track(kind).windows(2) {
                    prop_assert!(pair[1].start >= pair[0].end());
                }
            }
            prop_assert_eq!(layout.overlay.len() + layout.audio.len(), n as usize);
        }
    }
}
