//! Show session information.

use std::path::PathBuf;

use snapmark_slide_model::annotation::format_timestamp;

use super::load_session;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let loaded = load_session(&path)?;
    let s = &loaded.session;

    println!("Session: {}", s.name);
    println!("  ID: {}", s.id);
    println!("  Created: {}", s.created_at);
    println!("  Modified: {}", s.modified_at);
    println!("  Findings: {}", s.annotation_count());
    println!();

    println!("Slides:");
    if s.slides.is_empty() {
        println!("  (none)");
    }
    for (idx, slide) in s.slides.iter().enumerate() {
        let active = if s.active_slide_id.as_deref() == Some(slide.id.as_str()) {
            " [active]"
        } else {
            ""
        };
        println!("  {}. {}{}", idx + 1, slide.name, active);
        println!("     ID: {}", slide.id);
        println!(
            "     Media: {} ({}x{})",
            slide.media.source, slide.media.natural_width, slide.media.natural_height
        );
        if let (Some(t), Some(d)) = (slide.playback_time(), slide.media.duration_secs) {
            println!("     Video frame: {} of {}", format_timestamp(t), format_timestamp(d));
        }
        for (n, a) in slide.annotations.iter().enumerate() {
            let comment = if a.comment.trim().is_empty() {
                "(no comment)"
            } else {
                a.comment.as_str()
            };
            println!("     #{} {} {}: {}", n + 1, a.shape, a.color.as_str(), comment);
        }
    }

    Ok(())
}
