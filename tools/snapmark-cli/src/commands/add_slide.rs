//! Import media as a new slide.

use std::path::PathBuf;

use snapmark_slide_model::slide::{MediaRef, Slide};

use super::load_session;

pub fn run(
    path: PathBuf,
    image: PathBuf,
    name: Option<String>,
    video_duration: Option<f64>,
    video_time: f64,
) -> anyhow::Result<()> {
    let mut loaded = load_session(&path)?;

    let (width, height) = image::image_dimensions(&image)
        .map_err(|e| anyhow::anyhow!("Cannot read image {}: {e}", image.display()))?;

    let file_name = image
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid image path: {}", image.display()))?
        .to_string();
    let source = unique_media_name(&loaded.root, &file_name);
    let dest = loaded.root.join(&source);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&image, &dest)?;

    let media = match video_duration {
        Some(duration) => {
            if !(duration.is_finite() && duration > 0.0) {
                anyhow::bail!("--video-duration must be positive");
            }
            MediaRef::video(source, width, height, duration, video_time)
        }
        None => MediaRef::image(source, width, height),
    };

    let slide_name = name.unwrap_or_else(|| {
        image
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("slide")
            .to_string()
    });
    let slide = Slide::new(slide_name, media);
    let slide_id = slide.id.clone();

    println!("Adding slide '{}' to {}", slide.name, loaded.session.name);
    println!("  Media: {} ({}x{})", slide.media.source, width, height);
    if let Some(t) = slide.playback_time() {
        println!("  Frame time: {t:.2}s");
    }

    loaded.session.add_slide(slide);
    loaded
        .save()
        .map_err(|e| anyhow::anyhow!("Failed to save session: {e}"))?;

    println!("  Slide ID: {slide_id}");
    Ok(())
}

/// `media/<file>` relative to the session root, suffixed if already taken.
fn unique_media_name(root: &std::path::Path, file_name: &str) -> String {
    let candidate = format!("media/{file_name}");
    if !root.join(&candidate).exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (file_name, String::new()),
    };
    (2..)
        .map(|n| format!("media/{stem}-{n}{ext}"))
        .find(|name| !root.join(name).exists())
        .unwrap_or(candidate)
}
