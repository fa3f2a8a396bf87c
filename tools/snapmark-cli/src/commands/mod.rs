pub mod add_slide;
pub mod annotate;
pub mod info;
pub mod init;
pub mod render;
pub mod summary;
pub mod validate;

use std::path::Path;

use snapmark_slide_model::session::LoadedSession;

/// Load a session directory with a readable error.
pub fn load_session(path: &Path) -> anyhow::Result<LoadedSession> {
    LoadedSession::load(path).map_err(|e| anyhow::anyhow!("Failed to load session: {e}"))
}
