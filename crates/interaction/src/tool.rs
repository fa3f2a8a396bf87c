//! Editor tool selection and remembered drawing preferences.

use snapmark_common::error::SnapmarkResult;
use snapmark_common::store::ConfigStore;
use snapmark_slide_model::annotation::{AnnotationColor, ShapeKind};

const LAST_SHAPE_KEY: &str = "editor.last_shape";
const LAST_COLOR_KEY: &str = "editor.last_color";

/// Active pointer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    /// Click to select, drag to move.
    Select,
    /// Drag out a new shape.
    #[default]
    Draw,
}

/// Tool plus the shape and color new annotations are drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolSettings {
    pub tool: Tool,
    pub shape: ShapeKind,
    pub color: AnnotationColor,
}

impl ToolSettings {
    /// Restore the last-used shape and color from `store`.
    pub fn load(store: &dyn ConfigStore) -> Self {
        let shape = store
            .get(LAST_SHAPE_KEY)
            .and_then(|s| s.parse::<ShapeKind>().ok())
            .unwrap_or_default();
        let color = store
            .get(LAST_COLOR_KEY)
            .map(AnnotationColor::new)
            .filter(|c| c.parse_rgb().is_some())
            .unwrap_or_default();
        Self {
            tool: Tool::Draw,
            shape,
            color,
        }
    }

    /// Persist the shape and color for the next editing session.
    pub fn remember(&self, store: &mut dyn ConfigStore) -> SnapmarkResult<()> {
        store.set(LAST_SHAPE_KEY, self.shape.as_str())?;
        store.set(LAST_COLOR_KEY, self.color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapmark_common::store::MemoryConfigStore;

    #[test]
    fn test_defaults_without_stored_preferences() {
        let store = MemoryConfigStore::new();
        let settings = ToolSettings::load(&store);
        assert_eq!(settings.tool, Tool::Draw);
        assert_eq!(settings.shape, ShapeKind::Rectangle);
        assert_eq!(settings.color, AnnotationColor::default());
    }

    #[test]
    fn test_remember_then_load() {
        let mut store = MemoryConfigStore::new();
        let settings = ToolSettings {
            tool: Tool::Select,
            shape: ShapeKind::Ellipse,
            color: AnnotationColor::new(AnnotationColor::GREEN),
        };
        settings.remember(&mut store).unwrap();

        let restored = ToolSettings::load(&store);
        assert_eq!(restored.shape, ShapeKind::Ellipse);
        assert_eq!(restored.color.as_str(), AnnotationColor::GREEN);
        // The tool itself is not remembered.
        assert_eq!(restored.tool, Tool::Draw);
    }

    #[test]
    fn test_invalid_stored_color_falls_back() {
        let mut store = MemoryConfigStore::new();
        store.set(LAST_COLOR_KEY, "chartreuse").unwrap();
        assert_eq!(ToolSettings::load(&store).color, AnnotationColor::default());
    }
}
