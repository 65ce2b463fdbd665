//! SlideReel Project Model
//!
//! Defines the input contract for timeline assembly:
//! - **Slides:** One image, an optional narration clip, an optional caption
//!   overlay, and a duration in frames
//! - **Settings:** Sequence format (frame rate, frame size, audio format) and
//!   the motion preset applied to image clips
//! - **Assets:** Resolution of slide assets to absolute paths on disk
//! - **Project:** The aggregate root plus its on-disk layout
//!
//! Slide records are validated once when loaded; everything downstream works
//! on typed values only.

pub mod asset;
pub mod project;
pub mod settings;
pub mod slide;

pub use asset::*;
pub use project::*;
pub use settings::*;
pub use slide::*;
