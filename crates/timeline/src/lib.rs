//! SlideReel Timeline Engine
//!
//! Turns a validated slide list into placed, fully described clips:
//! - **Layout:** Absolute frame windows per track, with soft omissions for
//!   missing overlay and narration assets
//! - **Clips:** Clip attributes, file references, identifiers, and the pan
//!   keyframes attached to image clips
//!
//! This crate is pure computation apart from the asset resolver it is
//! handed. All inputs are data; all outputs are data.

pub mod clip;
pub mod layout;

pub use clip::{ClipBuilder, ClipItem, TimelineClips};
pub use layout::{LayoutEngine, Placement, TimelineLayout, TrackKind};
