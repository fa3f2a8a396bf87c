//! Validate a Snapmark session directory.

use std::path::PathBuf;

use super::load_session;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating session at: {}", path.display());

    let loaded = load_session(&path)?;

    println!("  Name: {}", loaded.session.name);
    println!("  Version: {}", loaded.session.version);
    println!("  Slides: {}", loaded.session.slides.len());
    println!("  Findings: {}", loaded.session.annotation_count());

    let errors = loaded.validate_media();
    if errors.is_empty() {
        println!("  Media: All present");
        println!("\nSession is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Session may not render fully.",
            errors.len()
        );
    }

    Ok(())
}
