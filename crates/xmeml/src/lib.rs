//! SlideReel xmeml Writer
//!
//! Assembles placed clips into an xmeml (Final Cut Pro 7 interchange)
//! sequence document and writes it to disk.
//!
//! # Pipeline Architecture
//!
//! ```text
//! slides.json ──┐
//!               ├── LayoutEngine (frame windows per track)
//! assets ───────┘         │
//!                         ├── ClipBuilder (ids, ranges, pan keyframes)
//!                         │
//!                         ├── document::build_document (XmlNode tree)
//!                         │
//!                         ├── node::render_document (canonical text)
//!                         ▼
//!                   <project>.xml (atomic write)
//! ```

pub mod document;
pub mod export;
pub mod node;

pub use document::{build_document, serialize, SequenceIds};
pub use export::*;
pub use node::XmlNode;
