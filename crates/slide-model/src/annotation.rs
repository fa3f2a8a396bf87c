//! Annotation types: one marked finding on a slide.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{normalized_bounds, Bounds, Point};

/// Identifier of an annotation, unique within its slide.
pub type AnnotationId = u64;

/// An annotation is shown on a video frame only within this distance of its timestamp.
pub const VIDEO_VISIBILITY_WINDOW_SECS: f64 = 0.5;

/// Marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Ok(ShapeKind::Rectangle),
            "ellipse" | "circle" => Ok(ShapeKind::Ellipse),
            other => Err(format!("unknown shape: {other} (use rectangle or ellipse)")),
        }
    }
}

/// Stroke/fill color as a `#rrggbb` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationColor(String);

impl AnnotationColor {
    pub const RED: &'static str = "#ef4444";
    pub const ORANGE: &'static str = "#f97316";
    pub const YELLOW: &'static str = "#eab308";
    pub const GREEN: &'static str = "#22c55e";
    pub const BLUE: &'static str = "#3b82f6";
    pub const PURPLE: &'static str = "#a855f7";

    /// The palette offered by the editor toolbar.
    pub const PALETTE: [&'static str; 6] = [
        Self::RED,
        Self::ORANGE,
        Self::YELLOW,
        Self::GREEN,
        Self::BLUE,
        Self::PURPLE,
    ];

    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse `#rgb` or `#rrggbb`. Returns `None` for anything else.
    pub fn parse_rgb(&self) -> Option<[u8; 3]> {
        let hex = self.0.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let expand = |c: u8| c * 16 + c;
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, ch) in hex.chars().enumerate() {
                    out[i] = expand(ch.to_digit(16)? as u8);
                }
                Some(out)
            }
            6 => {
                let value = u32::from_str_radix(hex, 16).ok()?;
                Some([(value >> 16) as u8, (value >> 8) as u8, value as u8])
            }
            _ => None,
        }
    }

    /// RGBA channels, falling back to the default red for malformed values.
    pub fn rgba(&self) -> [u8; 4] {
        let [r, g, b] = self.parse_rgb().unwrap_or([0xef, 0x44, 0x44]);
        [r, g, b, 255]
    }
}

impl Default for AnnotationColor {
    fn default() -> Self {
        Self::new(Self::RED)
    }
}

impl fmt::Display for AnnotationColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One marked finding on a slide.
///
/// `start` and `end` are the raw corners of the drag gesture in display
/// space; use [`Annotation::bounds`] for the normalized box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,

    pub shape: ShapeKind,

    pub start: Point,

    pub end: Point,

    pub color: AnnotationColor,

    /// Free-text commentary. Empty while the user is still typing.
    #[serde(default)]
    pub comment: String,

    /// Playback instant (seconds) this annotation belongs to, video slides only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_timestamp: Option<f64>,
}

impl Annotation {
    pub fn new(
        id: AnnotationId,
        shape: ShapeKind,
        start: Point,
        end: Point,
        color: AnnotationColor,
    ) -> Self {
        Self {
            id,
            shape,
            start,
            end,
            color,
            comment: String::new(),
            video_timestamp: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_video_timestamp(mut self, secs: f64) -> Self {
        self.video_timestamp = Some(secs);
        self
    }

    pub fn bounds(&self) -> Bounds {
        normalized_bounds(self)
    }

    /// Whether this annotation is shown at the given playback time.
    ///
    /// Annotations without a timestamp, and any annotation when there is no
    /// playback time, are always visible.
    pub fn is_visible_at(&self, current_time: Option<f64>) -> bool {
        match (self.video_timestamp, current_time) {
            (Some(ts), Some(now)) => (ts - now).abs() <= VIDEO_VISIBILITY_WINDOW_SECS + 1e-9,
            _ => true,
        }
    }
}

/// Format seconds as `m:ss` for captions and summaries.
pub fn format_timestamp(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
