//! Snapmark Slide Model
//!
//! Defines the core data contracts for annotation sessions:
//! - **Slides:** One captured image or video frame plus its annotations
//! - **Annotations:** Rectangles/ellipses with commentary, optionally bound to a video instant
//! - **Geometry:** Bounding boxes, hit testing, corner handles, and display-to-render scaling
//! - **Session:** The ordered slide list persisted as `session.json`
//!
//! Annotation coordinates live in *display space*: the pixel space of the
//! canvas as it was presented while the user drew. Renderers map them into
//! their own space with [`geometry::compute_scale`].

pub mod annotation;
pub mod geometry;
pub mod session;
pub mod slide;

pub use annotation::*;
pub use geometry::*;
pub use session::*;
pub use slide::*;
