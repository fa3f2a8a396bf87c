//! Draw an annotation by replaying a pointer gesture through the editor.

use std::path::PathBuf;

use snapmark_common::config::AppConfig;
use snapmark_common::store::JsonFileConfigStore;
use snapmark_interaction::editor::EditorSession;
use snapmark_interaction::tool::{Tool, ToolSettings};
use snapmark_render_engine::{estimate_display_width, is_usable_display_width};
use snapmark_slide_model::annotation::{AnnotationColor, ShapeKind};
use snapmark_slide_model::geometry::Point;

use super::load_session;

pub struct AnnotateArgs {
    pub path: PathBuf,
    pub slide: Option<String>,
    pub from: String,
    pub to: String,
    pub shape: Option<String>,
    pub color: Option<String>,
    pub comment: Option<String>,
    pub display_width: Option<f64>,
}

pub fn run(config: &AppConfig, args: AnnotateArgs) -> anyhow::Result<()> {
    let loaded = load_session(&args.path)?;
    let slide_id = match args.slide.or_else(|| loaded.session.active_slide_id.clone()) {
        Some(id) => id,
        None => anyhow::bail!("Session has no slides; add one with `snapmark add-slide`"),
    };
    let slide = loaded
        .require_slide(&slide_id)
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .clone();

    let from = parse_point(&args.from)?;
    let to = parse_point(&args.to)?;

    let mut store = JsonFileConfigStore::open_default();
    let mut settings = ToolSettings::load(&store);
    settings.tool = Tool::Draw;
    if let Some(shape) = &args.shape {
        settings.shape = shape
            .parse::<ShapeKind>()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if let Some(color) = &args.color {
        let color = AnnotationColor::new(color.as_str());
        if color.parse_rgb().is_none() {
            anyhow::bail!("Invalid color '{}': expected #rgb or #rrggbb", color.as_str());
        }
        settings.color = color;
    }

    let display_width = match args.display_width {
        Some(width) if !is_usable_display_width(width) => {
            anyhow::bail!("--display-width must be at least 1 pixel, got {width}")
        }
        Some(width) => width,
        None => estimate_display_width(
            slide.media.natural_width,
            slide.media.natural_height,
            config.render.assumed_display_height,
        ),
    };
    let display_height = if slide.media.natural_width > 0 {
        display_width * slide.media.natural_height as f64 / slide.media.natural_width as f64
    } else {
        0.0
    };
    println!(
        "Annotating '{}' in a {:.0}x{:.0} display space",
        slide.name, display_width, display_height
    );
    check_in_display(&[from, to], display_width, display_height)?;

    let mut editor = EditorSession::new(slide, settings.clone(), loaded);

    editor.pointer_down(from);
    editor.pointer_move(to);
    if !editor.pointer_up(to) {
        println!("Shape too small; nothing was added.");
        return Ok(());
    }

    let id = editor
        .state()
        .selected
        .ok_or_else(|| anyhow::anyhow!("New annotation was not selected"))?;
    if let Some(comment) = args.comment {
        editor.set_comment(id, comment);
    }

    let (slide, loaded) = editor.into_parts();
    loaded
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save session: {e}"))?;

    if let Err(e) = settings.remember(&mut store) {
        tracing::warn!("Could not remember tool settings: {e}");
    }

    let badge = slide.badge_number(id).unwrap_or(slide.annotations.len());
    println!(
        "Added {} #{} ({}) to '{}'",
        settings.shape,
        badge,
        settings.color.as_str(),
        slide.name
    );
    Ok(())
}

fn parse_point(value: &str) -> anyhow::Result<Point> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Expected `x,y`, got '{value}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| anyhow::anyhow!("Bad x in '{value}'"))?;
    let y: f64 = y.trim().parse().map_err(|_| anyhow::anyhow!("Bad y in '{value}'"))?;
    if !(x.is_finite() && y.is_finite()) {
        anyhow::bail!("Coordinates must be finite: '{value}'");
    }
    Ok(Point::new(x, y))
}

/// Points must fall on the displayed media, edges included.
fn check_in_display(points: &[Point], width: f64, height: f64) -> anyhow::Result<()> {
    for p in points {
        if p.x < 0.0 || p.y < 0.0 || p.x > width || p.y > height {
            anyhow::bail!(
                "Point {},{} lies outside the {:.0}x{:.0} display space",
                p.x,
                p.y,
                width,
                height
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,20.5").unwrap(), Point::new(10.0, 20.5));
        assert_eq!(parse_point(" 3 , 4 ").unwrap(), Point::new(3.0, 4.0));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
        assert!(parse_point("inf,1").is_err());
    }

    #[test]
    fn test_points_outside_display_are_rejected() {
        let inside = [Point::new(0.0, 0.0), Point::new(640.0, 480.0)];
        assert!(check_in_display(&inside, 640.0, 480.0).is_ok());

        let far = [Point::new(0.0, 0.0), Point::new(200_000.0, 20.0)];
        assert!(check_in_display(&far, 640.0, 480.0).is_err());
        assert!(check_in_display(&[Point::new(-1.0, 5.0)], 640.0, 480.0).is_err());
    }
}
