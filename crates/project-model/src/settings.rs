//! Sequence format and motion preset.
//!
//! Both values are fixed for a whole document and threaded into the layout
//! engine, clip builder and serializer when they are constructed.

use serde::{Deserialize, Serialize};

use crate::project::ProjectError;

/// Global sequence format shared by every clip in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSettings {
    /// Timebase in frames per second.
    pub fps: u32,

    /// Frame size in pixels.
    pub width: u32,
    pub height: u32,

    /// Audio format of the sequence and of every narration file.
    pub audio: AudioFormat,
}

/// Audio sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate (Hz).
    pub sample_rate: u32,

    /// Bits per sample.
    pub bit_depth: u32,

    /// Channel count.
    pub channels: u32,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            width: 1080,
            height: 1350,
            audio: AudioFormat::default(),
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            bit_depth: 16,
            channels: 2,
        }
    }
}

impl SequenceSettings {
    /// Convert a duration in seconds to whole frames (truncating).
    pub fn secs_to_frames(&self, secs: f64) -> i64 {
        (secs * self.fps as f64).floor() as i64
    }

    /// Reject formats that would produce an unusable document: any zero
    /// timebase, frame dimension, sample rate, bit depth or channel count.
    pub fn validate(&self) -> Result<(), ProjectError> {
        let fields = [
            ("fps", self.fps),
            ("width", self.width),
            ("height", self.height),
            ("audio sample rate", self.audio.sample_rate),
            ("audio bit depth", self.audio.bit_depth),
            ("audio channels", self.audio.channels),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ProjectError::InvalidSettings {
                message: format!("{name} must be greater than zero"),
            }),
            None => Ok(()),
        }
    }
}

/// A 2D parameter value in the editor's normalized center space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub horiz: f64,
    pub vert: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 {
        horiz: 0.0,
        vert: 0.0,
    };

    pub const fn new(horiz: f64, vert: f64) -> Self {
        Self { horiz, vert }
    }
}

/// Inclusive value range advertised for a scalar effect parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

/// Constants of the slow pan applied to every image clip.
///
/// Scale, rotation, anchor and anti-flicker are static. The center moves
/// linearly from `pan_from` at the first frame to `pan_to` at the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionPreset {
    pub scale: f64,
    pub scale_range: ParamRange,

    pub rotation: f64,
    pub rotation_range: ParamRange,

    /// Static center value written next to the keyframes.
    pub center: Point2,
    pub pan_from: Point2,
    pub pan_to: Point2,

    pub anchor: Point2,

    pub anti_flicker: f64,
    pub anti_flicker_range: ParamRange,
}

impl Default for MotionPreset {
    fn default() -> Self {
        Self {
            scale: 133.0,
            scale_range: ParamRange {
                min: 0.0,
                max: 1000.0,
            },
            rotation: 0.0,
            rotation_range: ParamRange {
                min: -8640.0,
                max: 8640.0,
            },
            center: Point2::new(-0.0279018, 0.0),
            pan_from: Point2::new(-0.0223214, 0.0),
            pan_to: Point2::new(0.0502232, 0.0),
            anchor: Point2::ORIGIN,
            anti_flicker: 0.0,
            anti_flicker_range: ParamRange { min: 0.0, max: 1.0 },
        }
    }
}
