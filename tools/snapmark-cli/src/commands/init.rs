//! Initialize a new Snapmark session.

use std::path::PathBuf;

use snapmark_slide_model::LoadedSession;

pub fn run(name: String, output: PathBuf) -> anyhow::Result<()> {
    let session_dir = output.join(&name);
    println!("Creating session '{}' at {}", name, session_dir.display());

    let session = LoadedSession::create(&session_dir, &name)
        .map_err(|e| anyhow::anyhow!("Failed to create session: {e}"))?;

    println!("Session created successfully:");
    println!("  Directory: {}", session.root.display());
    println!("  ID: {}", session.session.id);
    println!();
    println!("Directory structure:");
    println!("  {}/", name);
    println!("  ├── session.json (slides and annotations)");
    println!("  ├── media/       (captured images and frames)");
    println!("  └── exports/     (rendered composites)");

    Ok(())
}
