//! Slides: one captured unit of evidence plus its annotations.
//!
//! Slides are treated as immutable snapshots. Editing operations build a new
//! slide with [`Slide::with_annotations`] and hand it back to the session.

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationId};

/// Kind of captured media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// Reference to the pixel source behind a slide.
///
/// For video slides `source` points at the decoded frame captured at
/// `current_time_secs`; decoding the video itself is the capture side's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,

    /// Path of the media file, relative to the session root.
    pub source: String,

    /// Natural pixel size. Zero means the media has not been decoded.
    pub natural_width: u32,
    pub natural_height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,

    /// Playback position of the frame the user is looking at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time_secs: Option<f64>,
}

impl MediaRef {
    pub fn image(source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            kind: MediaKind::Image,
            source: source.into(),
            natural_width: width,
            natural_height: height,
            duration_secs: None,
            current_time_secs: None,
        }
    }

    pub fn video(
        source: impl Into<String>,
        width: u32,
        height: u32,
        duration_secs: f64,
        current_time_secs: f64,
    ) -> Self {
        Self {
            kind: MediaKind::Video,
            source: source.into(),
            natural_width: width,
            natural_height: height,
            duration_secs: Some(duration_secs),
            current_time_secs: Some(current_time_secs.clamp(0.0, duration_secs.max(0.0))),
        }
    }

    pub fn has_dimensions(&self) -> bool {
        self.natural_width > 0 && self.natural_height > 0
    }
}

/// One captured image or video frame with its ordered annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Unique slide identifier (UUID).
    pub id: String,

    pub name: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    pub media: MediaRef,

    /// Annotations in creation order; position + 1 is the badge number.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Slide {
    pub fn new(name: impl Into<String>, media: MediaRef) -> Self {
        Self {
            id: uuid_v4(),
            name: name.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            media,
            annotations: Vec::new(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.media.kind == MediaKind::Video
    }

    /// Current playback position, for video slides only.
    pub fn playback_time(&self) -> Option<f64> {
        if self.is_video() {
            self.media.current_time_secs
        } else {
            None
        }
    }

    /// A copy of this slide positioned at a different playback time.
    pub fn at_playback_time(&self, secs: f64) -> Slide {
        let mut next = self.clone();
        if next.is_video() {
            let upper = next.media.duration_secs.unwrap_or(f64::MAX).max(0.0);
            next.media.current_time_secs = Some(secs.clamp(0.0, upper));
        }
        next
    }

    /// A copy of this slide with its annotation list replaced.
    pub fn with_annotations(&self, annotations: Vec<Annotation>) -> Slide {
        Slide {
            annotations,
            ..self.clone()
        }
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// 1-based badge number of an annotation.
    pub fn badge_number(&self, id: AnnotationId) -> Option<usize> {
        self.annotations
            .iter()
            .position(|a| a.id == id)
            .map(|idx| idx + 1)
    }

    /// Next creation-ordered id.
    pub fn next_annotation_id(&self) -> AnnotationId {
        self.annotations
            .iter()
            .map(|a| a.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Annotations visible at the slide's playback time, in order.
    pub fn visible_annotations(&self) -> impl Iterator<Item = &Annotation> {
        let now = self.playback_time();
        self.annotations.iter().filter(move |a| a.is_visible_at(now))
    }
}

/// Generate a simple UUID v4 without external dependency.
pub(crate) fn uuid_v4() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    // Mix in a process-wide counter so ids created within one clock tick differ.
    let count = COUNTER.fetch_add(1, Ordering::Relaxed) as u128;
    let seed = nanos ^ count.wrapping_mul(0x9e37_79b9_7f4a_7c15_f39c_c060_5ced_c835);
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (seed & 0xFFFF_FFFF) as u32,
        ((seed >> 32) & 0xFFFF) as u16,
        ((seed >> 48) & 0x0FFF) as u16,
        (((seed >> 60) & 0x3FFF) as u16) | 0x8000,
        (seed >> 76) & 0xFFFF_FFFF_FFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationColor, ShapeKind};
    use crate::geometry::Point;

    fn annotation(id: AnnotationId) -> Annotation {
        Annotation::new(
            id,
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            AnnotationColor::default(),
        )
    }

    #[test]
    fn test_next_annotation_id_is_monotonic() {
        let slide = Slide::new("s", MediaRef::image("media/a.png", 100, 100));
        assert_eq!(slide.next_annotation_id(), 1);

        let slide = slide.with_annotations(vec![annotation(3), annotation(1)]);
        assert_eq!(slide.next_annotation_id(), 4);
    }

    #[test]
    fn test_badge_number_follows_order() {
        let slide = Slide::new("s", MediaRef::image("a.png", 1, 1))
            .with_annotations(vec![annotation(5), annotation(2)]);
        assert_eq!(slide.badge_number(5), Some(1));
        assert_eq!(slide.badge_number(2), Some(2));
        assert_eq!(slide.badge_number(9), None);
    }

    #[test]
    fn test_playback_time_only_for_video() {
        let image = Slide::new("i", MediaRef::image("a.png", 1, 1));
        assert_eq!(image.playback_time(), None);
        assert_eq!(image.at_playback_time(3.0).playback_time(), None);

        let video = Slide::new("v", MediaRef::video("frame.png", 1, 1, 10.0, 2.0));
        assert_eq!(video.playback_time(), Some(2.0));
        assert_eq!(video.at_playback_time(12.0).playback_time(), Some(10.0));
    }

    #[test]
    fn test_visible_annotations_filter_by_time() {
        let video = Slide::new("v", MediaRef::video("frame.png", 1, 1, 10.0, 5.0)).with_annotations(
            vec![
                annotation(1).with_video_timestamp(5.2),
                annotation(2).with_video_timestamp(8.0),
            ],
        );
        let ids: Vec<_> = video.visible_annotations().map(|a| a.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_uuid_format_and_uniqueness() {
        let a = uuid_v4();
        let b = uuid_v4();
        assert_eq!(a.len(), 36);
        assert_eq!(&a[14..15], "4");
        assert_ne!(a, b);
    }
}
