//! Snapmark Render Engine
//!
//! Offline pipeline that re-derives annotation geometry at export
//! resolution and produces a shareable composite image plus a text summary.
//!
//! # Pipeline Architecture
//!
//! ```text
//! media frame ──┐
//!               ├── Resolve display width (live or estimated)
//! slide ────────┘            │
//!                            ├── Plan layout (scale, clamp, badges, word-wrap)
//!                            │
//!                            ├── Rasterize (media, shapes, badges, sidebar)
//!                            │
//!                            ▼
//!                   Encode (PNG / JPEG)
//!                            │
//!                            ▼
//!                         Artifact
//! ```

pub mod compositor;
pub mod export;
pub mod media;
pub mod raster;
pub mod summary;
pub mod text;

pub use compositor::*;
pub use export::*;
pub use media::*;
pub use summary::*;
pub use text::*;
