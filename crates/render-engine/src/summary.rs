//! Text summaries for destinations that take text instead of an image.

use std::fmt::Write;

use snapmark_slide_model::annotation::format_timestamp;
use snapmark_slide_model::slide::Slide;

use crate::compositor::EMPTY_COMMENT_PLACEHOLDER;

/// Summary flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    #[default]
    Plain,
    Markdown,
}

/// Summary of a single slide, titled with the slide name.
pub fn render_slide_summary(slide: &Slide, format: SummaryFormat) -> String {
    let mut out = String::new();
    match format {
        SummaryFormat::Plain => {
            let _ = writeln!(out, "{}", slide.name);
            let _ = writeln!(out, "{}", "=".repeat(slide.name.chars().count().max(1)));
        }
        SummaryFormat::Markdown => {
            let _ = writeln!(out, "# {}", slide.name);
        }
    }
    out.push('\n');
    write_observations(&mut out, slide, format);
    out
}

/// Summary of several slides under one title, in slide order.
pub fn render_summary(title: &str, slides: &[Slide], format: SummaryFormat) -> String {
    let mut out = String::new();
    let total: usize = slides.iter().map(|s| s.annotations.len()).sum();

    match format {
        SummaryFormat::Plain => {
            let _ = writeln!(out, "{title}");
            let _ = writeln!(out, "{}", "=".repeat(title.chars().count().max(1)));
            let _ = writeln!(out, "{} finding(s) across {} slide(s)", total, slides.len());
        }
        SummaryFormat::Markdown => {
            let _ = writeln!(out, "# {title}");
            out.push('\n');
            let _ = writeln!(out, "_{} finding(s) across {} slide(s)_", total, slides.len());
        }
    }

    for (index, slide) in slides.iter().enumerate() {
        out.push('\n');
        match format {
            SummaryFormat::Plain => {
                let heading = format!("Slide {}: {}", index + 1, slide.name);
                let _ = writeln!(out, "{heading}");
                let _ = writeln!(out, "{}", "-".repeat(heading.chars().count()));
            }
            SummaryFormat::Markdown => {
                let _ = writeln!(out, "## Slide {}: {}", index + 1, slide.name);
            }
        }
        out.push('\n');
        write_observations(&mut out, slide, format);
    }
    out
}

fn write_observations(out: &mut String, slide: &Slide, format: SummaryFormat) {
    if slide.annotations.is_empty() {
        let _ = writeln!(out, "No findings.");
        return;
    }

    for (index, annotation) in slide.annotations.iter().enumerate() {
        let comment = annotation.comment.trim();
        let text = if comment.is_empty() {
            EMPTY_COMMENT_PLACEHOLDER.to_string()
        } else {
            // Keep each observation on one line.
            comment.split_whitespace().collect::<Vec<_>>().join(" ")
        };
        let _ = write!(out, "{}. {}", index + 1, text);
        if let Some(ts) = annotation.video_timestamp {
            match format {
                SummaryFormat::Plain => {
                    let _ = write!(out, " (at {})", format_timestamp(ts));
                }
                SummaryFormat::Markdown => {
                    let _ = write!(out, " _(at {})_", format_timestamp(ts));
                }
            }
        }
        out.push('\n');
    }
}
