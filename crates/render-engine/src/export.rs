//! Composite rendering and artifact encoding.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use snapmark_common::config::RenderDefaults;
use snapmark_common::error::{SnapmarkError, SnapmarkResult};
use snapmark_slide_model::slide::Slide;

use crate::compositor::{CompositeLayout, LayoutParams};
use crate::media::{MediaFrame, MediaSource, RenderWarning};
use crate::raster;
use crate::text::Typeface;

/// Output encoding for a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactEncoding {
    /// Lossless.
    Png,
    /// Lossy, quality in `1..=100`.
    Jpeg { quality: u8 },
}

impl ArtifactEncoding {
    pub fn jpeg(quality: u8) -> Self {
        Self::Jpeg {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// Options for a single composite render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub encoding: ArtifactEncoding,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            encoding: ArtifactEncoding::Png,
        }
    }
}

/// An encoded composite ready to hand to an export destination.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub warnings: Vec<RenderWarning>,
}

impl Artifact {
    pub fn write_to(&self, path: impl AsRef<Path>) -> SnapmarkResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)?;
        tracing::info!(
            path = %path.display(),
            bytes = self.bytes.len(),
            "Artifact written"
        );
        Ok(())
    }
}

/// Renders composites onto a single reusable canvas.
///
/// `&mut self` on every render keeps two renders from sharing the canvas.
#[derive(Debug)]
pub struct CompositeRenderer {
    params: LayoutParams,
    typeface: Typeface,
    canvas: RgbaImage,
}

impl CompositeRenderer {
    pub fn new(params: LayoutParams, typeface: Typeface) -> Self {
        Self {
            params,
            typeface,
            canvas: RgbaImage::new(0, 0),
        }
    }

    /// Renderer configured from user settings, discovering a font.
    pub fn from_defaults(defaults: &RenderDefaults) -> Self {
        Self::new(
            LayoutParams::from(defaults),
            Typeface::discover(defaults.font_path.as_deref()),
        )
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Plan the layout for `slide` without touching pixels.
    pub fn plan(
        &self,
        slide: &Slide,
        source: &MediaSource<'_>,
    ) -> SnapmarkResult<(CompositeLayout, Vec<RenderWarning>)> {
        let natural = source.natural_size()?;
        let resolved = source.resolve_display_width(self.params.assumed_display_height)?;

        let mut warnings = Vec::new();
        if resolved.estimated {
            tracing::warn!(
                slide = %slide.id,
                estimated_display_width = resolved.width,
                assumed_display_height = self.params.assumed_display_height,
                "Display width estimated; annotation placement may be approximate"
            );
            warnings.push(RenderWarning::ScaleAmbiguity {
                estimated_display_width: resolved.width,
                assumed_display_height: self.params.assumed_display_height,
            });
        }

        let frame_time = source.frame().time_secs.or_else(|| slide.playback_time());
        let layout = CompositeLayout::plan(
            slide,
            natural,
            resolved,
            frame_time,
            &self.params,
            &self.typeface,
        );
        Ok((layout, warnings))
    }

    /// Paint the composite and return the canvas.
    pub fn render_canvas(
        &mut self,
        slide: &Slide,
        source: &MediaSource<'_>,
    ) -> SnapmarkResult<(&RgbaImage, Vec<RenderWarning>)> {
        let (layout, warnings) = self.plan(slide, source)?;
        raster::paint(&layout, source.frame().image, &self.typeface, &mut self.canvas)?;
        tracing::debug!(
            slide = %slide.id,
            shapes = layout.shapes.len(),
            listed = layout.sidebar.entries.len(),
            scale = layout.scale,
            "Composite painted"
        );
        Ok((&self.canvas, warnings))
    }

    /// Render and encode a composite artifact.
    pub fn render_composite(
        &mut self,
        slide: &Slide,
        source: &MediaSource<'_>,
        options: &RenderOptions,
    ) -> SnapmarkResult<Artifact> {
        let (canvas, warnings) = self.render_canvas(slide, source)?;
        let bytes = encode(canvas, options.encoding)?;
        Ok(Artifact {
            bytes,
            mime_type: options.encoding.mime_type(),
            width: canvas.width(),
            height: canvas.height(),
            warnings,
        })
    }
}

/// Encode an RGBA canvas.
pub fn encode(canvas: &RgbaImage, encoding: ArtifactEncoding) -> SnapmarkResult<Vec<u8>> {
    let (width, height) = canvas.dimensions();
    let mut bytes = Vec::new();
    let result = match encoding {
        ArtifactEncoding::Png => PngEncoder::new(&mut bytes).write_image(
            canvas.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ArtifactEncoding::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|e| SnapmarkError::render(format!("encoding failed: {e}")))?;

    if bytes.is_empty() {
        return Err(SnapmarkError::render("encoder produced no data"));
    }
    Ok(bytes)
}

/// One slide queued for a deck export, with its decoded frame.
#[derive(Debug, Clone)]
pub struct DeckSlide {
    pub slide: Slide,
    pub frame: RgbaImage,
    /// Measured on-screen width if this slide is mounted in the editor.
    pub display_width: Option<f64>,
}

/// Progress callback for deck exports.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Deck export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub completed: usize,
    pub total: usize,
    pub slide_id: String,
}

/// Result of a deck export: the renderer is handed back for reuse.
#[derive(Debug)]
pub struct DeckExport {
    pub renderer: CompositeRenderer,
    /// One result per input slide, in order.
    pub artifacts: Vec<SnapmarkResult<Artifact>>,
}

/// Render many slides strictly one after another off the async runtime.
pub async fn export_deck(
    renderer: CompositeRenderer,
    slides: Vec<DeckSlide>,
    options: RenderOptions,
    progress: Option<ProgressCallback>,
) -> SnapmarkResult<DeckExport> {
    let total = slides.len();
    tracing::info!(slides = total, encoding = ?options.encoding, "Starting deck export");

    let mut renderer = renderer;
    let mut artifacts = Vec::with_capacity(total);

    for (index, item) in slides.into_iter().enumerate() {
        let slide_id = item.slide.id.clone();
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let mut renderer = renderer;
            let frame = MediaFrame::for_slide(&item.frame, &item.slide);
            let source = match item.display_width {
                Some(width) => MediaSource::live(frame, width),
                None => MediaSource::decoded(frame),
            };
            let result = renderer.render_composite(&item.slide, &source, &options);
            (renderer, result)
        })
        .await
        .map_err(|e| SnapmarkError::render(format!("render task failed: {e}")))?;

        renderer = returned;
        if let Err(e) = &result {
            tracing::error!(slide = %slide_id, error = %e, "Slide render failed");
        }
        artifacts.push(result);

        if let Some(cb) = &progress {
            cb(ExportProgress {
                completed: index + 1,
                total,
                slide_id,
            });
        }
    }

    tracing::info!(slides = total, "Deck export complete");
    Ok(DeckExport {
        renderer,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use snapmark_slide_model::slide::MediaRef;
    use std::sync::{Arc, Mutex};

    fn renderer() -> CompositeRenderer {
        CompositeRenderer::new(LayoutParams::default(), Typeface::Greeked)
    }

    #[test]
    fn test_jpeg_quality_is_clamped() {
        assert_eq!(ArtifactEncoding::jpeg(0), ArtifactEncoding::Jpeg { quality: 1 });
        assert_eq!(ArtifactEncoding::jpeg(250), ArtifactEncoding::Jpeg { quality: 100 });
        assert_eq!(ArtifactEncoding::jpeg(80).extension(), "jpg");
    }

    #[test]
    fn test_png_signature() {
        let canvas = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let bytes = encode(&canvas, ArtifactEncoding::Png).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_jpeg_signature() {
        let canvas = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let bytes = encode(&canvas, ArtifactEncoding::jpeg(70)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_canvas_is_reused_between_renders() {
        let mut renderer = renderer();
        let slide = Slide::new("s", MediaRef::image("a.png", 64, 48));
        let img = RgbaImage::new(64, 48);
        let source = MediaSource::live(MediaFrame::still(&img), 64.0);

        let first = renderer.render_canvas(&slide, &source).unwrap().0.as_raw().as_ptr();
        let second = renderer.render_canvas(&slide, &source).unwrap().0.as_raw().as_ptr();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_export_deck_renders_in_order() {
        let slides: Vec<DeckSlide> = (0..3)
            .map(|i| DeckSlide {
                slide: Slide::new(format!("s{i}"), MediaRef::image("a.png", 40 + i, 30)),
                frame: RgbaImage::new(40 + i, 30),
                display_width: Some(40.0 + i as f64),
            })
            .collect();
        let ids: Vec<String> = slides.iter().map(|s| s.slide.id.clone()).collect();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressCallback = Box::new(move |p: ExportProgress| {
            sink.lock().unwrap().push((p.completed, p.slide_id));
        });

        let export = export_deck(renderer(), slides, RenderOptions::default(), Some(progress))
            .await
            .unwrap();

        assert_eq!(export.artifacts.len(), 3);
        let widths: Vec<u32> = export
            .artifacts
            .iter()
            .map(|a| a.as_ref().unwrap().width)
            .collect();
        let sidebar = LayoutParams::default().sidebar_width;
        assert_eq!(widths, vec![40 + sidebar, 41 + sidebar, 42 + sidebar]);

        let seen = seen.lock().unwrap();
        let order: Vec<String> = seen.iter().map(|(_, id)| id.clone()).collect();
        assert_eq!(order, ids);
        assert_eq!(seen.last().map(|(n, _)| *n), Some(3));
    }

    #[tokio::test]
    async fn test_export_deck_keeps_going_after_failure() {
        let slides = vec![
            DeckSlide {
                slide: Slide::new("broken", MediaRef::image("a.png", 0, 0)),
                frame: RgbaImage::new(0, 0),
                display_width: None,
            },
            DeckSlide {
                slide: Slide::new("ok", MediaRef::image("b.png", 20, 20)),
                frame: RgbaImage::new(20, 20),
                display_width: None,
            },
        ];
        let export = export_deck(renderer(), slides, RenderOptions::default(), None)
            .await
            .unwrap();
        assert!(matches!(export.artifacts[0], Err(SnapmarkError::Load { .. })));
        let ok = export.artifacts[1].as_ref().unwrap();
        assert_eq!(ok.mime_type, "image/png");
        assert_eq!(ok.warnings.len(), 1);
    }
}
