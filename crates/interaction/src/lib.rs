//! Snapmark Interaction
//!
//! A single-active-mode pointer state machine over one slide's annotations.
//!
//! ```text
//!            pointer_down                pointer_up / pointer_leave
//!   Idle ───────────────┬─► Drawing  ───────────────► Idle (append or discard)
//!                       ├─► Resizing ───────────────► Idle (commit corner)
//!                       └─► Dragging ───────────────► Idle (commit translation)
//! ```
//!
//! The controller never mutates a slide. Committed operations return a new
//! slide snapshot; [`editor::EditorSession`] writes each one to a
//! [`editor::SlideSink`] exactly once.

pub mod controller;
pub mod editor;
pub mod tool;

pub use controller::*;
pub use editor::*;
pub use tool::*;
