//! Rasterization of a planned [`CompositeLayout`] onto an RGBA canvas.

use ab_glyph::PxScale;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_ellipse_mut, draw_hollow_rect_mut,
    draw_text_mut,
};
use imageproc::rect::Rect;

use snapmark_common::error::{SnapmarkError, SnapmarkResult};
use snapmark_slide_model::annotation::ShapeKind;
use snapmark_slide_model::geometry::Point;

use crate::compositor::{CompositeLayout, ShapePlacement, TextLine, SIDEBAR_BADGE_RADIUS};
use crate::text::{TextMeasure, Typeface};

/// Largest canvas we agree to allocate.
pub const MAX_CANVAS_PIXELS: u64 = 120_000_000;

/// Largest ellipse radius the rasterizer accepts, in output pixels.
pub const MAX_ELLIPSE_RADIUS: f64 = 16_384.0;

const SIDEBAR_BACKGROUND: Rgba<u8> = Rgba([248, 250, 252, 255]);
const LETTERBOX: Rgba<u8> = Rgba([17, 24, 39, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([15, 23, 42, 255]);
const MUTED_TEXT_COLOR: Rgba<u8> = Rgba([100, 116, 139, 255]);
const RULE_COLOR: Rgba<u8> = Rgba([226, 232, 240, 255]);
const BADGE_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Paint the composite into `canvas`, reallocating only when the size changes.
pub fn paint(
    layout: &CompositeLayout,
    media: &RgbaImage,
    typeface: &Typeface,
    canvas: &mut RgbaImage,
) -> SnapmarkResult<()> {
    let pixels = layout.canvas_width as u64 * layout.canvas_height as u64;
    if pixels == 0 || pixels > MAX_CANVAS_PIXELS {
        return Err(SnapmarkError::render(format!(
            "cannot allocate {}x{} canvas",
            layout.canvas_width, layout.canvas_height
        )));
    }

    for shape in &layout.shapes {
        check_shape_extent(shape)?;
    }

    if canvas.dimensions() != (layout.canvas_width, layout.canvas_height) {
        tracing::debug!(
            width = layout.canvas_width,
            height = layout.canvas_height,
            "Allocating canvas"
        );
        *canvas = RgbaImage::from_pixel(
            layout.canvas_width,
            layout.canvas_height,
            SIDEBAR_BACKGROUND,
        );
    } else {
        canvas.pixels_mut().for_each(|p| *p = SIDEBAR_BACKGROUND);
    }

    if layout.canvas_height > layout.render_height {
        draw_filled_rect_mut(
            canvas,
            Rect::at(0, layout.render_height as i32)
                .of_size(layout.render_width, layout.canvas_height - layout.render_height),
            LETTERBOX,
        );
    }

    let mut media_layer = if media.dimensions() == (layout.render_width, layout.render_height) {
        media.clone()
    } else {
        imageops::resize(media, layout.render_width, layout.render_height, FilterType::Triangle)
    };

    for shape in &layout.shapes {
        draw_shape(&mut media_layer, shape, layout.stroke_width);
    }
    for shape in &layout.shapes {
        draw_badge(
            &mut media_layer,
            shape.badge_center,
            layout.badge_radius,
            shape.color,
            shape.number,
            layout.badge_font_px,
            typeface,
        );
    }
    imageops::replace(canvas, &media_layer, 0, 0);

    paint_sidebar(canvas, layout, typeface);
    Ok(())
}

/// Reject geometry the rasterizer cannot draw faithfully.
fn check_shape_extent(shape: &ShapePlacement) -> SnapmarkResult<()> {
    let b = &shape.bounds;
    let finite = [b.min_x, b.min_y, b.max_x, b.max_y]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(SnapmarkError::render(format!(
            "annotation #{} has non-finite geometry",
            shape.number
        )));
    }
    if shape.shape == ShapeKind::Ellipse
        && (b.width / 2.0 > MAX_ELLIPSE_RADIUS || b.height / 2.0 > MAX_ELLIPSE_RADIUS)
    {
        return Err(SnapmarkError::render(format!(
            "annotation #{} ellipse is too large to draw ({:.0}x{:.0})",
            shape.number, b.width, b.height
        )));
    }
    Ok(())
}

fn draw_shape(layer: &mut RgbaImage, shape: &ShapePlacement, stroke_width: f64) {
    let color = Rgba(shape.color);
    let passes = stroke_width.round().max(1.0) as i32;
    let half = passes / 2;
    let b = &shape.bounds;
    // Edges beyond this margin are off the layer in every pass.
    let margin = passes as f64 + 2.0;
    let (layer_w, layer_h) = (layer.width() as f64, layer.height() as f64);
    let clip_x = |v: f64| v.clamp(-margin, layer_w + margin);
    let clip_y = |v: f64| v.clamp(-margin, layer_h + margin);

    for pass in 0..passes {
        // Centre the stroke on the outline.
        let grow = (half - pass) as f64;
        match shape.shape {
            ShapeKind::Rectangle => {
                let left = clip_x(b.min_x - grow);
                let top = clip_y(b.min_y - grow);
                let right = clip_x(b.max_x + grow);
                let bottom = clip_y(b.max_y + grow);
                let w = (right - left).round().max(1.0) as u32;
                let h = (bottom - top).round().max(1.0) as u32;
                let rect = Rect::at(left.round() as i32, top.round() as i32).of_size(w, h);
                draw_hollow_rect_mut(layer, rect, color);
            }
            ShapeKind::Ellipse => {
                let center = b.center();
                let rx = (b.width / 2.0 + grow).round().max(1.0) as i32;
                let ry = (b.height / 2.0 + grow).round().max(1.0) as i32;
                draw_hollow_ellipse_mut(
                    layer,
                    (center.x.round() as i32, center.y.round() as i32),
                    rx,
                    ry,
                    color,
                );
            }
        }
    }
}

fn draw_badge(
    target: &mut RgbaImage,
    center: Point,
    radius: f64,
    color: [u8; 4],
    number: usize,
    font_px: f32,
    typeface: &Typeface,
) {
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    draw_filled_circle_mut(target, (cx, cy), radius.round() as i32 + 1, BADGE_TEXT_COLOR);
    draw_filled_circle_mut(target, (cx, cy), radius.round() as i32, Rgba(color));

    let label = number.to_string();
    let width = typeface.text_width(&label, font_px) as f64;
    let origin = Point::new(center.x - width / 2.0, center.y - font_px as f64 / 2.0);
    draw_label(target, typeface, &label, origin, font_px, BADGE_TEXT_COLOR);
}

fn paint_sidebar(canvas: &mut RgbaImage, layout: &CompositeLayout, typeface: &Typeface) {
    let sidebar = &layout.sidebar;
    draw_line(canvas, typeface, &sidebar.header, TEXT_COLOR);

    let rule_x = sidebar.header.x.round() as i32;
    let rule_width = (sidebar.width - 2.0 * (sidebar.header.x - sidebar.x)).max(1.0) as u32;
    draw_filled_rect_mut(
        canvas,
        Rect::at(rule_x, sidebar.rule_y.round() as i32).of_size(rule_width, 1),
        RULE_COLOR,
    );

    for entry in &sidebar.entries {
        draw_badge(
            canvas,
            entry.badge_center,
            SIDEBAR_BADGE_RADIUS,
            entry.color,
            entry.number,
            (SIDEBAR_BADGE_RADIUS * 1.1) as f32,
            typeface,
        );
        for line in &entry.lines {
            draw_line(canvas, typeface, line, TEXT_COLOR);
        }
        if let Some(caption) = &entry.caption {
            draw_line(canvas, typeface, caption, MUTED_TEXT_COLOR);
        }
    }
}

fn draw_line(target: &mut RgbaImage, typeface: &Typeface, line: &TextLine, color: Rgba<u8>) {
    draw_label(target, typeface, &line.text, Point::new(line.x, line.y), line.px, color);
}

fn draw_label(
    target: &mut RgbaImage,
    typeface: &Typeface,
    text: &str,
    origin: Point,
    px: f32,
    color: Rgba<u8>,
) {
    let x = origin.x.round() as i32;
    let y = origin.y.round() as i32;
    match typeface {
        Typeface::Font(font) => {
            draw_text_mut(target, color, x, y, PxScale::from(px), font, text);
        }
        Typeface::Greeked => {
            let advance = Typeface::greeked_advance(px);
            let block_w = (advance * 0.75).max(1.0) as u32;
            let block_h = (px * 0.55).max(1.0) as u32;
            let top = y + (px * 0.3) as i32;
            for (i, ch) in text.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let left = x + (i as f32 * advance) as i32;
                draw_filled_rect_mut(target, Rect::at(left, top).of_size(block_w, block_h), color);
            }
        }
    }
}
