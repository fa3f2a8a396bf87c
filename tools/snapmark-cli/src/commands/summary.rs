//! Print a text summary of a session's findings.

use std::path::PathBuf;

use snapmark_render_engine::summary::{render_summary, SummaryFormat};

use super::load_session;

pub fn run(path: PathBuf, markdown: bool, output: Option<PathBuf>) -> anyhow::Result<()> {
    let loaded = load_session(&path)?;
    let format = if markdown {
        SummaryFormat::Markdown
    } else {
        SummaryFormat::Plain
    };

    let text = render_summary(&loaded.session.name, &loaded.session.slides, format);
    match output {
        Some(file) => {
            std::fs::write(&file, &text)?;
            println!("Summary written to {}", file.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
