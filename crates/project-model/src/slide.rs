//! Slide records and validated slides.
//!
//! `slides.json` is written by the external chunking and voice steps. Its
//! records are loosely typed; [`Slide`] is the validated form used by the
//! rest of the pipeline.

use serde::{Deserialize, Serialize};

use crate::project::ProjectError;
use crate::settings::SequenceSettings;

/// A raw entry of `slides.json`, exactly as the producing pipeline wrote it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Ordinal recorded by the chunking step (informational only).
    #[serde(rename = "slide", alias = "ordinal", default)]
    pub ordinal: Option<i64>,

    /// Narration text.
    #[serde(rename = "chunk", alias = "narration", default)]
    pub narration: Option<String>,

    /// On-screen caption text.
    #[serde(rename = "texto_pantalla", alias = "caption", default)]
    pub caption: Option<String>,

    /// Prompt used to generate the image.
    #[serde(rename = "prompt_imagen", alias = "image_prompt", default)]
    pub image_prompt: Option<String>,

    /// Image filename inside the project's image directory.
    #[serde(rename = "nombre_imagen", alias = "image", default)]
    pub image: Option<String>,

    /// Narration filename inside the project's voice directory.
    #[serde(rename = "nombre_audio", alias = "audio", default)]
    pub audio: Option<String>,

    /// Measured duration in frames.
    #[serde(rename = "duracion_frames", alias = "duration_frames", default)]
    pub duration_frames: Option<i64>,

    /// Measured duration in seconds, used when frames are absent.
    #[serde(rename = "duracion_segundos", alias = "duration_secs", default)]
    pub duration_secs: Option<f64>,
}

/// A validated slide.
///
/// Invariants: `ordinal >= 1`, `image` is non-empty, `duration_frames > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based position in the sequence. Drives track order and clip ids.
    pub ordinal: u32,

    /// Narration text, kept for traceability.
    pub narration: String,

    /// On-screen caption text.
    pub caption: String,

    /// Image filename.
    pub image: String,

    /// Narration audio filename, if the slide has one.
    pub audio: Option<String>,

    /// Duration in frames.
    pub duration_frames: u32,
}

impl Slide {
    /// Filename of the rendered caption overlay for this slide.
    pub fn overlay_file_name(&self) -> String {
        overlay_file_name(self.ordinal)
    }

    /// Validate a raw record found at 1-based `ordinal`.
    pub fn from_record(
        ordinal: u32,
        record: &SlideRecord,
        settings: &SequenceSettings,
    ) -> Result<Self, ProjectError> {
        if let Some(declared) = record.ordinal {
            if declared != ordinal as i64 {
                tracing::warn!(
                    ordinal,
                    declared,
                    "Slide record declares a different ordinal; using list position"
                );
            }
        }

        let image = record
            .image
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ProjectError::InvalidSlide {
                ordinal,
                reason: "missing image filename".to_string(),
            })?
            .to_string();

        let frames = match (record.duration_frames, record.duration_secs) {
            (Some(frames), _) => frames,
            (None, Some(secs)) if secs.is_finite() => settings.secs_to_frames(secs),
            (None, Some(secs)) => {
                return Err(ProjectError::InvalidSlide {
                    ordinal,
                    reason: format!("duration {secs} is not a finite number of seconds"),
                })
            }
            (None, None) => {
                return Err(ProjectError::InvalidSlide {
                    ordinal,
                    reason: "duration has not been measured".to_string(),
                })
            }
        };

        if frames <= 0 {
            return Err(ProjectError::InvalidSlide {
                ordinal,
                reason: format!("duration must be a positive number of frames, got {frames}"),
            });
        }
        let duration_frames = u32::try_from(frames).map_err(|_| ProjectError::InvalidSlide {
            ordinal,
            reason: format!("duration of {frames} frames is out of range"),
        })?;

        let audio = record
            .audio
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(Self {
            ordinal,
            narration: record.narration.clone().unwrap_or_default(),
            caption: record.caption.clone().unwrap_or_default(),
            image,
            audio,
            duration_frames,
        })
    }
}

/// Filename of the caption overlay rendered for `ordinal`.
pub fn overlay_file_name(ordinal: u32) -> String {
    format!("sub_{ordinal:04}.png")
}

/// Parse the contents of a `slides.json` file.
pub fn parse_slide_records(json: &str) -> Result<Vec<SlideRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Validate records in order, assigning ordinals from list position.
///
/// Fails on the first invalid record; an empty list is rejected.
pub fn validate_slides(
    records: &[SlideRecord],
    settings: &SequenceSettings,
) -> Result<Vec<Slide>, ProjectError> {
    if records.is_empty() {
        return Err(ProjectError::EmptySlides);
    }

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| Slide::from_record(idx as u32 + 1, record, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(image: &str, frames: i64) -> SlideRecord {
        SlideRecord {
            image: Some(image.to_string()),
            duration_frames: Some(frames),
            ..Default::default()
        }
    }

    #[test]
    fn test_parses_pipeline_field_names() {
        let json = r#"[
            {
                "slide": 1,
                "chunk": "En un mundo donde...",
                "texto_pantalla": "Una serie para todos",
                "prompt_imagen": "A boy with a cap",
                "nombre_audio": "chunk_voice01.mp3",
                "nombre_imagen": "img_00.jpg",
                "duracion_segundos": 4.52,
                "duracion_frames": 135
            }
        ]"#;

        let records = parse_slide_records(json).unwrap();
        let slides = validate_slides(&records, &SequenceSettings::default()).unwrap();

        assert_eq!(slides.len(), 1);
        let slide = &slides[0];
        assert_eq!(slide.ordinal, 1);
        assert_eq!(slide.image, "img_00.jpg");
        assert_eq!(slide.audio.as_deref(), Some("chunk_voice01.mp3"));
        assert_eq!(slide.caption, "Una serie para todos");
        assert_eq!(slide.duration_frames, 135);
    }

    #[test]
    fn test_accepts_english_aliases() {
        let json = r#"[{"image": "a.png", "audio": "a.mp3", "duration_frames": 30}]"#;
        let records = parse_slide_records(json).unwrap();
        let slides = validate_slides(&records, &SequenceSettings::default()).unwrap();
        assert_eq!(slides[0].image, "a.png");
        assert_eq!(slides[0].duration_frames, 30);
    }

    #[test]
    fn test_seconds_fallback_uses_timebase() {
        let rec = SlideRecord {
            image: Some("img.jpg".to_string()),
            duration_secs: Some(2.5),
            ..Default::default()
        };
        let slide = Slide::from_record(1, &rec, &SequenceSettings::default()).unwrap();
        assert_eq!(slide.duration_frames, 75);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let err = Slide::from_record(2, &record("img.jpg", 0), &SequenceSettings::default())
            .unwrap_err();
        assert!(matches!(err, ProjectError::InvalidSlide { ordinal: 2, .. }));
    }

    #[test]
    fn test_unmeasured_duration_is_rejected() {
        let rec = SlideRecord {
            image: Some("img.jpg".to_string()),
            ..Default::default()
        };
        let err = Slide::from_record(1, &rec, &SequenceSettings::default()).unwrap_err();
        assert!(err.to_string().contains("not been measured"));
    }

    #[test]
    fn test_blank_image_is_rejected() {
        let err = Slide::from_record(1, &record("  ", 30), &SequenceSettings::default())
            .unwrap_err();
        assert!(err.to_string().contains("missing image filename"));
    }

    #[test]
    fn test_blank_audio_becomes_none() {
        let mut rec = record("img.jpg", 30);
        rec.audio = Some(String::new());
        let slide = Slide::from_record(1, &rec, &SequenceSettings::default()).unwrap();
        assert_eq!(slide.audio, None);
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let err = validate_slides(&[], &SequenceSettings::default()).unwrap_err();
        assert!(matches!(err, ProjectError::EmptySlides));
    }

    #[test]
    fn test_ordinals_follow_list_position() {
        let mut first = record("a.jpg", 10);
        first.ordinal = Some(7);
        let slides =
            validate_slides(&[first, record("b.jpg", 10)], &SequenceSettings::default()).unwrap();
        assert_eq!(slides[0].ordinal, 1);
        assert_eq!(slides[1].ordinal, 2);
    }

    #[test]
    fn test_overlay_file_name_is_zero_padded() {
        assert_eq!(overlay_file_name(3), "sub_0003.png");
        assert_eq!(overlay_file_name(1234), "sub_1234.png");
    }

    proptest! {
        #[test]
        fn prop_positive_frames_are_kept(frames in 1i64..1_000_000) {
            let slide = Slide::from_record(1, &record("img.jpg", frames), &SequenceSettings::default()).unwrap();
            prop_assert_eq!(slide.duration_frames as i64, frames);
        }

        #[test]
        fn prop_non_positive_frames_are_rejected(frames in -1_000_000i64..=0) {
            let result = Slide::from_record(1, &record("img.jpg", frames), &SequenceSettings::default());
            prop_assert!(result.is_err());
        }
    }
}
