//! Session metadata and the on-disk session bundle.
//!
//! A session owns the ordered slide list. On disk it is a directory with
//! `session.json` at the root and captured media under `media/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::slide::{uuid_v4, Slide};

/// Top-level session file (`session.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Schema version.
    pub version: String,

    /// Human-readable session name (used as the report title).
    pub name: String,

    /// Unique session identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Slide currently shown in the editor.
    #[serde(default)]
    pub active_slide_id: Option<String>,

    /// Captured slides in capture order.
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Session {
    /// Create a new empty session.
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: uuid_v4(),
            created_at: now.clone(),
            modified_at: now,
            active_slide_id: None,
            slides: Vec::new(),
        }
    }

    pub fn slide(&self, id: &str) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn active_slide(&self) -> Option<&Slide> {
        self.active_slide_id.as_deref().and_then(|id| self.slide(id))
    }

    /// Append a slide and make it the active one.
    pub fn add_slide(&mut self, slide: Slide) {
        self.active_slide_id = Some(slide.id.clone());
        self.slides.push(slide);
        self.touch();
    }

    /// Replace the slide with the same id. Returns `false` if it is unknown.
    pub fn replace_slide(&mut self, slide: Slide) -> bool {
        match self.slides.iter_mut().find(|s| s.id == slide.id) {
            Some(existing) => {
                *existing = slide;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Remove a slide, moving the active id to a neighbour if needed.
    pub fn remove_slide(&mut self, id: &str) -> Option<Slide> {
        let idx = self.slides.iter().position(|s| s.id == id)?;
        let removed = self.slides.remove(idx);
        if self.active_slide_id.as_deref() == Some(id) {
            self.active_slide_id = self
                .slides
                .get(idx)
                .or_else(|| self.slides.last())
                .map(|s| s.id.clone());
        }
        self.touch();
        Some(removed)
    }

    /// Total number of annotations over all slides.
    pub fn annotation_count(&self) -> usize {
        self.slides.iter().map(|s| s.annotations.len()).sum()
    }

    fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

/// The complete in-memory representation of a loaded session.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    /// Filesystem path to the session directory.
    pub root: PathBuf,

    /// Session metadata and slides.
    pub session: Session,
}

impl LoadedSession {
    /// Load a session from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, SessionError> {
        let root = root.as_ref().to_path_buf();
        let session_path = root.join("session.json");

        let session_json =
            std::fs::read_to_string(&session_path).map_err(|e| SessionError::IoError {
                path: session_path.clone(),
                source: e,
            })?;

        let session: Session =
            serde_json::from_str(&session_json).map_err(|e| SessionError::ParseError {
                path: session_path,
                source: e,
            })?;

        Ok(Self { root, session })
    }

    /// Save the session file to disk.
    pub fn save(&self) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.root).map_err(|e| SessionError::IoError {
            path: self.root.clone(),
            source: e,
        })?;

        let session_path = self.root.join("session.json");
        let session_json =
            serde_json::to_string_pretty(&self.session).map_err(|e| SessionError::ParseError {
                path: session_path.clone(),
                source: e,
            })?;
        std::fs::write(&session_path, session_json).map_err(|e| SessionError::IoError {
            path: session_path,
            source: e,
        })?;

        Ok(())
    }

    /// Create a new session on disk with the standard directory structure.
    pub fn create(root: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, SessionError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["media", "exports"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| SessionError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let loaded = Self {
            root,
            session: Session::new(name),
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Absolute path of a slide's media file.
    pub fn media_path(&self, slide: &Slide) -> PathBuf {
        self.root.join(&slide.media.source)
    }

    /// Look up a slide, reporting a validation error if it is missing.
    pub fn require_slide(&self, id: &str) -> Result<&Slide, SessionError> {
        self.session
            .slide(id)
            .ok_or_else(|| SessionError::ValidationError {
                message: format!("no slide with id {id}"),
            })
    }

    /// Validate that all referenced media exist and have dimensions.
    pub fn validate_media(&self) -> Vec<String> {
        let mut errors = vec![];

        for (idx, slide) in self.session.slides.iter().enumerate() {
            let label = format!("Slide {} ({})", idx + 1, slide.name);
            if !self.media_path(slide).exists() {
                errors.push(format!("{label} media missing: {}", slide.media.source));
            }
            if !slide.media.has_dimensions() {
                errors.push(format!("{label} has no natural dimensions"));
            }
        }

        if let Some(active) = &self.session.active_slide_id {
            if self.session.slide(active).is_none() {
                errors.push(format!("Active slide {active} does not exist"));
            }
        }

        errors
    }
}

/// Errors that can occur when working with sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid session: {message}")]
    ValidationError { message: String },
}
