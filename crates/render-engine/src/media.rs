//! Media sources for compositing.
//!
//! A slide mounted in the editor knows its true on-screen width; any other
//! slide only has natural pixel dimensions and needs an estimated display
//! width. The two cases are separate variants so the renderer branches on
//! what it actually knows.

use image::RgbaImage;

use snapmark_common::error::{SnapmarkError, SnapmarkResult};
use snapmark_slide_model::slide::Slide;

/// Narrowest on-screen width accepted as a live measurement.
pub const MIN_LIVE_DISPLAY_WIDTH: f64 = 1.0;

/// A decoded still image or video frame.
#[derive(Debug, Clone, Copy)]
pub struct MediaFrame<'a> {
    pub image: &'a RgbaImage,
    /// Playback time of this frame, video only.
    pub time_secs: Option<f64>,
}

impl<'a> MediaFrame<'a> {
    pub fn still(image: &'a RgbaImage) -> Self {
        Self {
            image,
            time_secs: None,
        }
    }

    pub fn at(image: &'a RgbaImage, time_secs: f64) -> Self {
        Self {
            image,
            time_secs: Some(time_secs),
        }
    }

    /// Frame at the slide's current playback position.
    pub fn for_slide(image: &'a RgbaImage, slide: &Slide) -> Self {
        Self {
            image,
            time_secs: slide.playback_time(),
        }
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Where a frame came from, and what we know about how it was displayed.
#[derive(Debug, Clone, Copy)]
pub enum MediaSource<'a> {
    /// The slide currently mounted in the editor, with its measured width.
    Live {
        frame: MediaFrame<'a>,
        display_width: f64,
    },
    /// Any other slide: natural dimensions only.
    Decoded { frame: MediaFrame<'a> },
}

/// Display width the annotations are assumed to have been drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDisplayWidth {
    pub width: f64,
    /// True when derived from the assumed display height.
    pub estimated: bool,
}

/// Non-fatal conditions attached to a rendered artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderWarning {
    /// The display width was estimated; annotation placement may drift if
    /// the slide was shown at a different aspect ratio while authoring.
    ScaleAmbiguity {
        estimated_display_width: f64,
        assumed_display_height: f64,
    },
}

impl<'a> MediaSource<'a> {
    pub fn live(frame: MediaFrame<'a>, display_width: f64) -> Self {
        Self::Live {
            frame,
            display_width,
        }
    }

    pub fn decoded(frame: MediaFrame<'a>) -> Self {
        Self::Decoded { frame }
    }

    pub fn frame(&self) -> &MediaFrame<'a> {
        match self {
            Self::Live { frame, .. } | Self::Decoded { frame } => frame,
        }
    }

    /// Natural size, failing if the media has not been decoded.
    pub fn natural_size(&self) -> SnapmarkResult<(u32, u32)> {
        let (width, height) = self.frame().natural_size();
        if width == 0 || height == 0 {
            return Err(SnapmarkError::load(format!(
                "media has no usable dimensions ({width}x{height})"
            )));
        }
        Ok((width, height))
    }

    /// Pick the display width to scale annotations from.
    pub fn resolve_display_width(
        &self,
        assumed_display_height: f64,
    ) -> SnapmarkResult<ResolvedDisplayWidth> {
        let (width, height) = self.natural_size()?;
        match self {
            Self::Live { display_width, .. } if is_usable_display_width(*display_width) => {
                Ok(ResolvedDisplayWidth {
                    width: *display_width,
                    estimated: false,
                })
            }
            Self::Live { display_width, .. } => {
                tracing::warn!(
                    display_width,
                    "Live display width unusable, falling back to estimate"
                );
                Ok(estimated(width, height, assumed_display_height))
            }
            Self::Decoded { .. } => Ok(estimated(width, height, assumed_display_height)),
        }
    }
}

fn estimated(width: u32, height: u32, assumed_display_height: f64) -> ResolvedDisplayWidth {
    ResolvedDisplayWidth {
        width: estimate_display_width(width, height, assumed_display_height),
        estimated: true,
    }
}

/// Whether a measured on-screen width can drive scaling.
pub fn is_usable_display_width(width: f64) -> bool {
    width.is_finite() && width >= MIN_LIVE_DISPLAY_WIDTH
}

/// Display width of media shown at `assumed_display_height`, keeping its aspect ratio.
pub fn estimate_display_width(
    natural_width: u32,
    natural_height: u32,
    assumed_display_height: f64,
) -> f64 {
    assumed_display_height * natural_width as f64 / natural_height as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_width_is_authoritative() {
        let img = RgbaImage::new(1600, 900);
        let source = MediaSource::live(MediaFrame::still(&img), 800.0);
        let resolved = source.resolve_display_width(800.0).unwrap();
        assert_eq!(
            resolved,
            ResolvedDisplayWidth {
                width: 800.0,
                estimated: false
            }
        );
    }

    #[test]
    fn test_decoded_width_is_estimated_from_assumed_height() {
        let img = RgbaImage::new(1600, 1000);
        let source = MediaSource::decoded(MediaFrame::still(&img));
        let resolved = source.resolve_display_width(800.0).unwrap();
        assert!(resolved.estimated);
        assert!((resolved.width - 1280.0).abs() < 1e-9);
    }

    #[test]
    fn test_live_with_zero_width_falls_back() {
        let img = RgbaImage::new(400, 400);
        let source = MediaSource::live(MediaFrame::still(&img), 0.0);
        let resolved = source.resolve_display_width(800.0).unwrap();
        assert!(resolved.estimated);
        assert!((resolved.width - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_live_with_sub_pixel_width_falls_back() {
        let img = RgbaImage::new(400, 300);
        let source = MediaSource::live(MediaFrame::still(&img), 0.05);
        let resolved = source.resolve_display_width(800.0).unwrap();
        assert!(resolved.estimated);
        assert!(!is_usable_display_width(f64::NAN));
        assert!(is_usable_display_width(1.0));
    }

    #[test]
    fn test_undecoded_media_is_load_error() {
        let img = RgbaImage::new(0, 0);
        let source = MediaSource::decoded(MediaFrame::still(&img));
        assert!(matches!(
            source.resolve_display_width(800.0),
            Err(SnapmarkError::Load { .. })
        ));
    }
}
