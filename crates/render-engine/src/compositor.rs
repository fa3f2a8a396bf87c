//! Composite layout: where everything goes before any pixel is drawn.
//!
//! The layout re-derives annotation geometry in render space from the
//! display-space coordinates stored on the slide, and lays out the
//! numbered sidebar so its badges match the ones on the image.

use snapmark_common::config::RenderDefaults;
use snapmark_slide_model::annotation::{format_timestamp, ShapeKind};
use snapmark_slide_model::geometry::{compute_scale, Bounds, Point};
use snapmark_slide_model::slide::Slide;

use crate::media::ResolvedDisplayWidth;
use crate::text::{wrap_text, TextMeasure};

/// Stroke width in display units before scaling.
pub const BASE_STROKE_WIDTH: f64 = 3.0;
/// Stroke width never drops below this many output pixels.
pub const MIN_STROKE_WIDTH: f64 = 2.0;
/// Badge radius in display units before scaling.
pub const BASE_BADGE_RADIUS: f64 = 12.0;
/// Badge radius never drops below this many output pixels.
pub const MIN_BADGE_RADIUS: f64 = 10.0;
pub const MIN_BADGE_FONT_PX: f64 = 11.0;
/// Stroke width never exceeds this fraction of the shorter media side.
pub const MAX_STROKE_FRACTION: f64 = 0.1;
/// Badge radius never exceeds this fraction of the shorter media side.
pub const MAX_BADGE_FRACTION: f64 = 0.25;

pub const SIDEBAR_PADDING: f64 = 24.0;
pub const SIDEBAR_BADGE_RADIUS: f64 = 13.0;
pub const SIDEBAR_BADGE_GAP: f64 = 12.0;
pub const HEADER_FONT_PX: f32 = 26.0;
pub const HEADER_GAP: f64 = 20.0;
pub const BODY_FONT_PX: f32 = 18.0;
pub const CAPTION_FONT_PX: f32 = 14.0;
pub const LINE_HEIGHT_FACTOR: f64 = 1.35;
pub const MIN_ROW_HEIGHT: f64 = SIDEBAR_BADGE_RADIUS * 2.0;
pub const ROW_SPACING: f64 = 16.0;

/// Text shown for an annotation without commentary.
pub const EMPTY_COMMENT_PLACEHOLDER: &str = "No description";

/// Size limits for the composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub max_render_width: u32,
    pub sidebar_width: u32,
    pub assumed_display_height: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::from(&RenderDefaults::default())
    }
}

impl From<&RenderDefaults> for LayoutParams {
    fn from(defaults: &RenderDefaults) -> Self {
        Self {
            max_render_width: defaults.max_render_width.max(1),
            sidebar_width: defaults.sidebar_width,
            assumed_display_height: defaults.assumed_display_height,
        }
    }
}

/// One shape to draw over the media.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePlacement {
    /// 1-based badge number (creation order on the slide).
    pub number: usize,
    pub shape: ShapeKind,
    /// Render-space box.
    pub bounds: Bounds,
    pub color: [u8; 4],
    pub badge_center: Point,
}

/// A single positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub px: f32,
}

/// One numbered finding in the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarEntry {
    pub number: usize,
    pub color: [u8; 4],
    pub badge_center: Point,
    pub lines: Vec<TextLine>,
    pub caption: Option<TextLine>,
    pub row_height: f64,
}

/// The sidebar column to the right of the media.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarLayout {
    pub x: f64,
    pub width: f64,
    pub header: TextLine,
    /// Y of the rule under the header.
    pub rule_y: f64,
    pub entries: Vec<SidebarEntry>,
    /// Height needed to show every entry.
    pub content_height: f64,
}

/// Fully resolved composite geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayout {
    pub render_width: u32,
    pub render_height: u32,
    pub display_width: f64,
    pub scale_estimated: bool,
    /// `render_width / display_width`.
    pub scale: f64,
    pub stroke_width: f64,
    pub badge_radius: f64,
    pub badge_font_px: f32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub shapes: Vec<ShapePlacement>,
    pub sidebar: SidebarLayout,
}

/// Media region size: natural size, capped at `max_width` with the aspect ratio kept.
pub fn capped_render_size(natural_width: u32, natural_height: u32, max_width: u32) -> (u32, u32) {
    if natural_width <= max_width {
        return (natural_width, natural_height);
    }
    let ratio = max_width as f64 / natural_width as f64;
    let height = (natural_height as f64 * ratio).round().max(1.0) as u32;
    (max_width, height)
}

/// Line height used for a font size.
pub fn line_height(px: f32) -> f64 {
    (px as f64 * LINE_HEIGHT_FACTOR).ceil()
}

impl CompositeLayout {
    /// Plan the composite for `slide` over media of the given natural size.
    ///
    /// `frame_time` is the playback time of the frame being drawn; video
    /// annotations outside the visibility window are left off the image
    /// but still listed in the sidebar.
    pub fn plan(
        slide: &Slide,
        natural_size: (u32, u32),
        display: ResolvedDisplayWidth,
        frame_time: Option<f64>,
        params: &LayoutParams,
        measure: &dyn TextMeasure,
    ) -> Self {
        let (render_width, render_height) =
            capped_render_size(natural_size.0, natural_size.1, params.max_render_width);
        let scale = compute_scale(display.width, render_width as f64);

        let short_side = render_width.min(render_height) as f64;
        let stroke_width = (BASE_STROKE_WIDTH * scale)
            .min(short_side * MAX_STROKE_FRACTION)
            .max(MIN_STROKE_WIDTH);
        let badge_radius = (BASE_BADGE_RADIUS * scale)
            .min(short_side * MAX_BADGE_FRACTION)
            .max(MIN_BADGE_RADIUS);
        let badge_font_px = (badge_radius * 1.1).max(MIN_BADGE_FONT_PX) as f32;

        let shapes = slide
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_visible_at(frame_time))
            .map(|(idx, a)| {
                let bounds = a.bounds().scaled(scale);
                let badge_center = Point::new(
                    clamp_into(bounds.min_x, badge_radius, render_width as f64 - badge_radius),
                    clamp_into(bounds.min_y, badge_radius, render_height as f64 - badge_radius),
                );
                ShapePlacement {
                    number: idx + 1,
                    shape: a.shape,
                    bounds,
                    color: a.color.rgba(),
                    badge_center,
                }
            })
            .collect();

        let sidebar = plan_sidebar(
            slide,
            render_width as f64,
            params.sidebar_width as f64,
            measure,
        );
        let canvas_width = render_width + params.sidebar_width;
        let canvas_height = render_height.max(sidebar.content_height.ceil() as u32);

        Self {
            render_width,
            render_height,
            display_width: display.width,
            scale_estimated: display.estimated,
            scale,
            stroke_width,
            badge_radius,
            badge_font_px,
            canvas_width,
            canvas_height,
            shapes,
            sidebar,
        }
    }
}

/// `value` limited to `[low, high]`; `low` wins if the range is empty.
fn clamp_into(value: f64, low: f64, high: f64) -> f64 {
    value.min(high).max(low)
}

fn plan_sidebar(slide: &Slide, x: f64, width: f64, measure: &dyn TextMeasure) -> SidebarLayout {
    let header = TextLine {
        text: format!("Findings ({})", slide.annotations.len()),
        x: x + SIDEBAR_PADDING,
        y: SIDEBAR_PADDING,
        px: HEADER_FONT_PX,
    };
    let rule_y = SIDEBAR_PADDING + line_height(HEADER_FONT_PX) + HEADER_GAP / 2.0;

    let badge_x = x + SIDEBAR_PADDING + SIDEBAR_BADGE_RADIUS;
    let text_x = x + SIDEBAR_PADDING + SIDEBAR_BADGE_RADIUS * 2.0 + SIDEBAR_BADGE_GAP;
    let text_width = (x + width - SIDEBAR_PADDING - text_x).max(1.0) as f32;
    let body_line = line_height(BODY_FONT_PX);

    let mut cursor_y = SIDEBAR_PADDING + line_height(HEADER_FONT_PX) + HEADER_GAP;
    let mut entries = Vec::with_capacity(slide.annotations.len());

    for (idx, annotation) in slide.annotations.iter().enumerate() {
        let comment = annotation.comment.trim();
        let body = if comment.is_empty() {
            EMPTY_COMMENT_PLACEHOLDER
        } else {
            comment
        };

        let lines: Vec<TextLine> = wrap_text(body, text_width, BODY_FONT_PX, measure)
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextLine {
                text,
                x: text_x,
                y: cursor_y + i as f64 * body_line,
                px: BODY_FONT_PX,
            })
            .collect();
        let mut text_height = lines.len() as f64 * body_line;

        let caption = annotation.video_timestamp.map(|ts| {
            let line = TextLine {
                text: format!("at {}", format_timestamp(ts)),
                x: text_x,
                y: cursor_y + text_height,
                px: CAPTION_FONT_PX,
            };
            text_height += line_height(CAPTION_FONT_PX);
            line
        });

        let row_height = text_height.max(MIN_ROW_HEIGHT);
        entries.push(SidebarEntry {
            number: idx + 1,
            color: annotation.color.rgba(),
            badge_center: Point::new(badge_x, cursor_y + SIDEBAR_BADGE_RADIUS),
            lines,
            caption,
            row_height,
        });
        cursor_y += row_height + ROW_SPACING;
    }

    let content_height = if entries.is_empty() {
        cursor_y + SIDEBAR_PADDING
    } else {
        cursor_y - ROW_SPACING + SIDEBAR_PADDING
    };

    SidebarLayout {
        x,
        width,
        header,
        rule_y,
        entries,
        content_height,
    }
}
