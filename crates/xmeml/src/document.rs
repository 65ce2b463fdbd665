//! xmeml sequence document assembly.
//!
//! Produces the fixed structure the editor expects:
//!
//! ```text
//! xmeml
//! └── sequence
//!     ├── uuid, name, duration, rate
//!     ├── media
//!     │   ├── video: format, track 1 (images), track 2 (caption overlays)
//!     │   └── audio: numOutputChannels, format, outputs, track 1 (narration)
//!     └── timecode, labels, logginginfo
//! ```

use slidereel_common::error::{SlideReelError, SlideReelResult};
use slidereel_project_model::project::Project;
use slidereel_project_model::settings::{ParamRange, Point2, SequenceSettings};
use slidereel_timeline::clip::{ClipItem, MotionEffect, TimelineClips};
use slidereel_timeline::layout::{TimelineLayout, TrackKind};

use crate::node::{render_document, XmlNode};

/// Document type declared after the XML declaration.
pub const DOCTYPE: &str = "xmeml";

/// Grammar version written on the root element.
pub const XMEML_VERSION: u32 = 4;

const EDITING_MODE_GUID: &str = "795454d9-d3c2-429d-9474-923ab13b7018";
const PREVIEW_PRESET_PATH: &str =
    "EncoderPresets/SequencePreview/795454d9-d3c2-429d-9474-923ab13b7018/QuickTime.epr";
const CODEC_NAME: &str = "Apple ProRes 422";
const AUTHORING_APP: &str = "PremierePro";

/// Sequence-level identifiers. They carry no meaning across builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceIds {
    pub id: String,
    pub uuid: String,
}

impl SequenceIds {
    pub fn random() -> Self {
        Self {
            id: format!("sequence-{}", uuid::Uuid::new_v4()),
            uuid: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Serialize a laid-out project to document bytes with fresh sequence ids.
pub fn serialize(
    project: &Project,
    layout: &TimelineLayout,
    clips: &TimelineClips,
) -> SlideReelResult<Vec<u8>> {
    let root = build_document(project, layout, clips, &SequenceIds::random())?;
    Ok(render_document(&root, Some(DOCTYPE)).into_bytes())
}

/// Build the document tree.
///
/// Fails with [`SlideReelError::EmptyTimeline`] when there is nothing to
/// place, and refuses a layout that does not account for every frame of
/// the project.
pub fn build_document(
    project: &Project,
    layout: &TimelineLayout,
    clips: &TimelineClips,
    ids: &SequenceIds,
) -> SlideReelResult<XmlNode> {
    if project.slides.is_empty() || layout.video.is_empty() || layout.total_frames == 0 {
        return Err(SlideReelError::EmptyTimeline);
    }
    project.settings.validate()?;
    if layout.total_frames != project.total_frames() {
        return Err(SlideReelError::serialization(format!(
            "layout covers {} frames but the slides add up to {}",
            layout.total_frames,
            project.total_frames()
        )));
    }

    let settings = &project.settings;
    let sequence = XmlNode::new("sequence")
        .attr("id", &ids.id)
        .attrs(sequence_attributes(settings))
        .leaf_child("uuid", &ids.uuid)
        .leaf_child("name", &project.name)
        .leaf_child("duration", layout.total_frames)
        .child(rate(settings.fps, false))
        .child(
            XmlNode::new("media")
                .child(video_media(settings, clips))
                .child(audio_media(settings, clips)),
        )
        .child(timecode(settings.fps, false))
        .child(XmlNode::new("labels").leaf_child("label2", "Forest"))
        .child(XmlNode::new("logginginfo").children(
            [
                "description",
                "scene",
                "shottake",
                "lognote",
                "good",
                "originalvideofilename",
                "originalaudiofilename",
            ]
            .into_iter()
            .map(XmlNode::new),
        ));

    tracing::debug!(
        sequence = %ids.id,
        duration = layout.total_frames,
        clips = clips.len(),
        "Built sequence document"
    );

    Ok(XmlNode::new("xmeml")
        .attr("version", XMEML_VERSION)
        .child(sequence))
}

fn sequence_attributes(settings: &SequenceSettings) -> Vec<(&'static str, String)> {
    vec![
        ("TL.SQAudioVisibleBase", "0".to_string()),
        ("TL.SQVideoVisibleBase", "0".to_string()),
        ("TL.SQVisibleBaseTime", "0".to_string()),
        ("TL.SQAVDividerPosition", "0.5".to_string()),
        ("TL.SQHideShyTracks", "0".to_string()),
        ("TL.SQHeaderWidth", "204".to_string()),
        ("TL.SQDataTrackViewControlState", "0".to_string()),
        ("Monitor.ProgramZoomOut", "372556800000".to_string()),
        ("Monitor.ProgramZoomIn", "364089600000".to_string()),
        ("TL.SQTimePerPixel", "0.025".to_string()),
        ("MZ.EditLine", "364089600000".to_string()),
        ("MZ.Sequence.PreviewFrameSizeHeight", settings.height.to_string()),
        ("MZ.Sequence.PreviewFrameSizeWidth", settings.width.to_string()),
        ("MZ.Sequence.AudioTimeDisplayFormat", "200".to_string()),
        ("MZ.Sequence.PreviewRenderingClassID", "1061109567".to_string()),
        ("MZ.Sequence.PreviewRenderingPresetCodec", "1919706400".to_string()),
        ("MZ.Sequence.PreviewRenderingPresetPath", PREVIEW_PRESET_PATH.to_string()),
        ("MZ.Sequence.PreviewUseMaxRenderQuality", "false".to_string()),
        ("MZ.Sequence.PreviewUseMaxBitDepth", "false".to_string()),
        ("MZ.Sequence.EditingModeGUID", EDITING_MODE_GUID.to_string()),
        ("MZ.Sequence.VideoTimeDisplayFormat", "104".to_string()),
        ("MZ.ZeroPoint", "0".to_string()),
        ("explodedTracks", "true".to_string()),
    ]
}

fn video_media(settings: &SequenceSettings, clips: &TimelineClips) -> XmlNode {
    let format = XmlNode::new("format").child(
        XmlNode::new("samplecharacteristics")
            .child(rate(settings.fps, false))
            .child(codec())
            .leaf_child("width", settings.width)
            .leaf_child("height", settings.height)
            .leaf_child("anamorphic", "FALSE")
            .leaf_child("pixelaspectratio", "square")
            .leaf_child("fielddominance", "none")
            .leaf_child("colordepth", 24),
    );

    XmlNode::new("video")
        .child(format)
        .child(video_track(true).children(
            ordered(clips.track(TrackKind::Video))
                .map(|clip| still_clip(settings, clip)),
        ))
        .child(video_track(false).children(
            ordered(clips.track(TrackKind::Overlay))
                .map(|clip| still_clip(settings, clip)),
        ))
}

fn codec() -> XmlNode {
    XmlNode::new("codec").leaf_child("name", CODEC_NAME).child(
        XmlNode::new("appspecificdata")
            .leaf_child("appname", "Final Cut Pro")
            .leaf_child("appmanufacturer", "Apple Inc.")
            .leaf_child("appversion", "7.0")
            .child(
                XmlNode::new("data").child(
                    XmlNode::new("qtcodec")
                        .leaf_child("codecname", CODEC_NAME)
                        .leaf_child("codectypename", CODEC_NAME)
                        .leaf_child("codectypecode", "apcn")
                        .leaf_child("codecvendorcode", "appl")
                        .leaf_child("spatialquality", 1024)
                        .leaf_child("temporalquality", 0)
                        .leaf_child("keyframerate", 0)
                        .leaf_child("datarate", 0),
                ),
            ),
    )
}

fn video_track(targeted: bool) -> XmlNode {
    XmlNode::new("track")
        .attr("TL.SQTrackShy", 0)
        .attr("TL.SQTrackExpandedHeight", 65)
        .attr("TL.SQTrackExpanded", 0)
        .attr("MZ.TrackTargeted", u8::from(targeted))
}

fn audio_media(settings: &SequenceSettings, clips: &TimelineClips) -> XmlNode {
    let audio = &settings.audio;
    let outputs = XmlNode::new("outputs").children((1..=audio.channels).map(|channel| {
        XmlNode::new("group")
            .leaf_child("index", channel)
            .leaf_child("numchannels", 1)
            .leaf_child("downmix", 0)
            .child(XmlNode::new("channel").leaf_child("index", channel))
    }));

    let track = XmlNode::new("track")
        .attr("TL.SQTrackAudioKeyframeStyle", 0)
        .attr("TL.SQTrackShy", 0)
        .attr("TL.SQTrackExpandedHeight", 41)
        .attr("TL.SQTrackExpanded", 0)
        .attr("MZ.TrackTargeted", 1)
        .attr("PannerCurrentValue", "0.5")
        .attr("PannerStartKeyframe", "-91445760000000000,0.5,0,0,0,0,0,0")
        .attr("PannerName", "Balance")
        .attr("currentExplodedTrackIndex", 0)
        .attr("totalExplodedTrackCount", 1)
        .attr("premiereTrackType", track_type(audio.channels))
        .children(ordered(clips.track(TrackKind::Audio)).map(|clip| audio_clip(settings, clip)))
        .leaf_child("enabled", "TRUE")
        .leaf_child("locked", "FALSE")
        .leaf_child("outputchannelindex", 1);

    XmlNode::new("audio")
        .leaf_child("numOutputChannels", audio.channels)
        .child(
            XmlNode::new("format").child(
                XmlNode::new("samplecharacteristics")
                    .leaf_child("depth", audio.bit_depth)
                    .leaf_child("samplerate", audio.sample_rate),
            ),
        )
        .child(outputs)
        .child(track)
}

fn track_type(channels: u32) -> &'static str {
    if channels == 1 {
        "Mono"
    } else {
        "Stereo"
    }
}

/// Clips of one track in ascending start order.
fn ordered(clips: &[ClipItem]) -> impl Iterator<Item = &ClipItem> {
    let mut sorted: Vec<&ClipItem> = clips.iter().collect();
    sorted.sort_by_key(|clip| (clip.start, clip.ordinal));
    sorted.into_iter()
}

/// Image or caption clip on a video track.
fn still_clip(settings: &SequenceSettings, clip: &ClipItem) -> XmlNode {
    let mut node = clip_header(settings, clip)
        .leaf_child("alphatype", "none")
        .leaf_child("pixelaspectratio", "square")
        .leaf_child("anamorphic", "FALSE");

    if let Some(motion) = &clip.motion {
        node = node.child(motion_filter(motion));
    }

    let file = XmlNode::new("file")
        .attr("id", &clip.ids.file)
        .leaf_child("name", &clip.name)
        .leaf_child("pathurl", &clip.path_url)
        .child(rate(settings.fps, true))
        .child(source_timecode(settings.fps, true))
        .child(
            XmlNode::new("media").child(
                XmlNode::new("video").child(
                    XmlNode::new("samplecharacteristics")
                        .child(rate(settings.fps, true))
                        .leaf_child("width", settings.width)
                        .leaf_child("height", settings.height)
                        .leaf_child("anamorphic", "FALSE")
                        .leaf_child("pixelaspectratio", "square")
                        .leaf_child("fielddominance", "none"),
                ),
            ),
        );

    node.child(file)
}

fn audio_clip(settings: &SequenceSettings, clip: &ClipItem) -> XmlNode {
    let audio = &settings.audio;
    let native = clip.native_duration.unwrap_or(clip.duration).max(1);

    let file = XmlNode::new("file")
        .attr("id", &clip.ids.file)
        .leaf_child("name", &clip.name)
        .leaf_child("pathurl", &clip.path_url)
        .child(rate(settings.fps, false))
        .leaf_child("duration", native)
        .child(source_timecode(settings.fps, false))
        .child(
            XmlNode::new("media").child(
                XmlNode::new("audio")
                    .child(
                        XmlNode::new("samplecharacteristics")
                            .leaf_child("depth", audio.bit_depth)
                            .leaf_child("samplerate", audio.sample_rate),
                    )
                    .leaf_child("channelcount", audio.channels),
            ),
        );

    clip_header(settings, clip)
        .attr("premiereChannelType", track_type(audio.channels).to_lowercase())
        .child(file)
        .child(
            XmlNode::new("sourcetrack")
                .leaf_child("mediatype", "audio")
                .leaf_child("trackindex", 1),
        )
}

/// Elements shared by every clipitem, in grammar order.
fn clip_header(settings: &SequenceSettings, clip: &ClipItem) -> XmlNode {
    XmlNode::new("clipitem")
        .attr("id", &clip.ids.clip)
        .leaf_child("masterclipid", &clip.ids.master_clip)
        .leaf_child("name", &clip.name)
        .leaf_child("enabled", "TRUE")
        .leaf_child("duration", clip.duration)
        .child(rate(settings.fps, false))
        .leaf_child("start", clip.start)
        .leaf_child("end", clip.end)
        .leaf_child("in", clip.in_point)
        .leaf_child("out", clip.out_point)
}

fn motion_filter(motion: &MotionEffect) -> XmlNode {
    let center = parameter("center", "Center")
        .child(point("value", motion.center.value))
        .children(motion.center.keyframes.iter().map(|keyframe| {
            XmlNode::new("keyframe")
                .leaf_child("when", keyframe.when)
                .child(point("value", keyframe.value))
        }));

    let effect = XmlNode::new("effect")
        .leaf_child("name", "Basic Motion")
        .leaf_child("effectid", "basic")
        .leaf_child("effectcategory", "motion")
        .leaf_child("effecttype", "motion")
        .leaf_child("mediatype", "video")
        .leaf_child("pproBypass", "false")
        .child(scalar(
            "scale",
            "Scale",
            motion.scale,
            range_bounds(motion.scale_range, number),
        ))
        .child(scalar(
            "rotation",
            "Rotation",
            motion.rotation,
            range_bounds(motion.rotation_range, number),
        ))
        .child(center)
        .child(parameter("centerOffset", "Anchor Point").child(point("value", motion.anchor)))
        .child(scalar(
            "antiflicker",
            "Anti-flicker Filter",
            motion.anti_flicker,
            range_bounds(motion.anti_flicker_range, fractional),
        ));

    XmlNode::new("filter").child(effect)
}

fn parameter(id: &str, name: &str) -> XmlNode {
    XmlNode::new("parameter")
        .attr("authoringApp", AUTHORING_APP)
        .leaf_child("parameterid", id)
        .leaf_child("name", name)
}

fn scalar(id: &str, name: &str, value: f64, (min, max): (String, String)) -> XmlNode {
    parameter(id, name)
        .leaf_child("valuemin", min)
        .leaf_child("valuemax", max)
        .leaf_child("value", number(value))
}

fn range_bounds(range: ParamRange, spell: fn(f64) -> String) -> (String, String) {
    (spell(range.min), spell(range.max))
}

fn point(tag: &str, value: Point2) -> XmlNode {
    XmlNode::new(tag)
        .leaf_child("horiz", number(value.horiz))
        .leaf_child("vert", number(value.vert))
}

/// Shortest round-tripping decimal; negative zero prints as `0`.
fn number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Like [`number`] but whole values keep one decimal place (`0.0`, `1.0`).
/// The anti-flicker range is written this way.
fn fractional(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value + 0.0)
    } else {
        value.to_string()
    }
}

fn rate(fps: u32, ntsc: bool) -> XmlNode {
    XmlNode::new("rate")
        .leaf_child("timebase", fps)
        .leaf_child("ntsc", if ntsc { "TRUE" } else { "FALSE" })
}

/// Sequence timecode starting at frame zero.
fn timecode(fps: u32, drop_frame: bool) -> XmlNode {
    let (string, format) = if drop_frame {
        ("00;00;00;00", "DF")
    } else {
        ("00:00:00:00", "NDF")
    };
    XmlNode::new("timecode")
        .child(rate(fps, drop_frame))
        .leaf_child("string", string)
        .leaf_child("frame", 0)
        .leaf_child("displayformat", format)
}

/// Source timecode of a file. Stills are tagged NTSC drop-frame, audio is
/// non-drop.
fn source_timecode(fps: u32, still: bool) -> XmlNode {
    timecode(fps, still)
}
