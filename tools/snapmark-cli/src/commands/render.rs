//! Render composite images for a session.

use std::path::PathBuf;

use snapmark_common::config::AppConfig;
use snapmark_render_engine::export::{
    export_deck, ArtifactEncoding, CompositeRenderer, DeckSlide, ExportProgress, RenderOptions,
};
use snapmark_render_engine::media::{is_usable_display_width, RenderWarning};
use snapmark_slide_model::slide::Slide;

use super::load_session;

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    slide: Option<String>,
    format: String,
    quality: Option<u8>,
    output: Option<PathBuf>,
    display_width: Option<f64>,
) -> anyhow::Result<()> {
    println!("Rendering session at: {}", path.display());

    if let Some(width) = display_width {
        if !is_usable_display_width(width) {
            anyhow::bail!("--display-width must be at least 1 pixel, got {width}");
        }
    }

    let loaded = load_session(&path)?;
    let output_dir = output.unwrap_or_else(|| path.join("exports"));

    let encoding = match format.to_ascii_lowercase().as_str() {
        "png" => ArtifactEncoding::Png,
        "jpeg" | "jpg" => ArtifactEncoding::jpeg(quality.unwrap_or(config.render.jpeg_quality)),
        _ => {
            return Err(anyhow::anyhow!("Unknown format: {format}. Use: png, jpeg"));
        }
    };

    let slides: Vec<&Slide> = match &slide {
        Some(id) => vec![loaded.require_slide(id).map_err(|e| anyhow::anyhow!("{e}"))?],
        None => loaded.session.slides.iter().collect(),
    };
    if slides.is_empty() {
        println!("  No slides to render.");
        return Ok(());
    }

    let mut deck = Vec::with_capacity(slides.len());
    for slide in slides {
        let media_path = loaded.media_path(slide);
        let frame = image::open(&media_path)
            .map_err(|e| anyhow::anyhow!("Cannot decode {}: {e}", media_path.display()))?
            .to_rgba8();
        deck.push(DeckSlide {
            slide: slide.clone(),
            frame,
            display_width,
        });
    }
    let file_stems: Vec<String> = deck
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{:02}-{}", i + 1, sanitize(&d.slide.name)))
        .collect();

    println!("  Output: {}", output_dir.display());
    println!("  Format: {}", encoding.mime_type());
    println!("  Slides: {}", deck.len());

    let renderer = CompositeRenderer::from_defaults(&config.render);
    if renderer.typeface().is_greeked() {
        println!("  Note: no font found, text is drawn as placeholders (set render.font_path)");
    }

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!("\r  Progress: {}/{} slides  ", p.completed, p.total);
    });
    let export = export_deck(
        renderer,
        deck,
        RenderOptions { encoding },
        Some(progress_cb),
    )
    .await?;
    println!();

    let mut failures = 0;
    for (stem, result) in file_stems.iter().zip(export.artifacts) {
        match result {
            Ok(artifact) => {
                let file = output_dir.join(format!("{stem}.{}", encoding.extension()));
                artifact.write_to(&file)?;
                println!(
                    "  {} ({}x{}, {} bytes)",
                    file.display(),
                    artifact.width,
                    artifact.height,
                    artifact.bytes.len()
                );
                for warning in &artifact.warnings {
                    match warning {
                        RenderWarning::ScaleAmbiguity {
                            estimated_display_width,
                            ..
                        } => println!(
                            "    warning: display width estimated as \
                             {estimated_display_width:.0}px; \
                             pass --display-width for exact placement"
                        ),
                    }
                }
            }
            Err(e) => {
                failures += 1;
                println!("  {stem}: render failed: {e}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} slide(s) failed to render");
    }
    println!("Render complete.");
    Ok(())
}

/// File-name-safe version of a slide name.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "slide".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Login page / v2"), "Login_page___v2");
        assert_eq!(sanitize(""), "slide");
    }
}
