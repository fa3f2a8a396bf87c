//! Text measurement, word wrapping, and typeface loading.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};

use snapmark_common::error::{SnapmarkError, SnapmarkResult};

/// Width of a greeked glyph cell relative to the font size.
const GREEKED_ADVANCE: f32 = 0.55;

/// Fonts tried, in order, when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    r"C:\Windows\Fonts\arial.ttf",
    r"C:\Windows\Fonts\segoeui.ttf",
];

/// Measures rendered text width.
pub trait TextMeasure {
    /// Width in pixels of `text` set at `px`.
    fn text_width(&self, text: &str, px: f32) -> f32;
}

/// Typeface used for badge numbers and sidebar text.
#[derive(Clone)]
pub enum Typeface {
    /// A real outline font.
    Font(FontArc),
    /// No font available: text is laid out on a fixed-advance grid and
    /// drawn as solid blocks.
    Greeked,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Font(_) => f.write_str("Typeface::Font"),
            Typeface::Greeked => f.write_str("Typeface::Greeked"),
        }
    }
}

impl Typeface {
    /// Load a TrueType/OpenType font file.
    pub fn from_file(path: impl AsRef<Path>) -> SnapmarkResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SnapmarkError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read(path)?;
        let font = FontArc::try_from_vec(data).map_err(|e| {
            SnapmarkError::config(format!("invalid font {}: {e}", path.display()))
        })?;
        Ok(Typeface::Font(font))
    }

    /// Use `configured` if given, else the first system font found, else greeked text.
    pub fn discover(configured: Option<&Path>) -> Self {
        if let Some(path) = configured {
            match Self::from_file(path) {
                Ok(face) => return face,
                Err(e) => tracing::warn!("Configured font unusable: {e}"),
            }
        }

        for candidate in FONT_CANDIDATES.iter().map(PathBuf::from) {
            if candidate.exists() {
                if let Ok(face) = Self::from_file(&candidate) {
                    tracing::debug!(font = %candidate.display(), "Using system font");
                    return face;
                }
            }
        }

        tracing::warn!("No usable font found; sidebar text will be greeked");
        Typeface::Greeked
    }

    pub fn is_greeked(&self) -> bool {
        matches!(self, Typeface::Greeked)
    }

    /// Advance of one greeked glyph cell.
    pub fn greeked_advance(px: f32) -> f32 {
        px * GREEKED_ADVANCE
    }
}

impl TextMeasure for Typeface {
    fn text_width(&self, text: &str, px: f32) -> f32 {
        match self {
            Typeface::Font(font) => {
                let scaled = font.as_scaled(PxScale::from(px));
                let mut width = 0.0;
                let mut previous = None;
                for ch in text.chars() {
                    let glyph = scaled.glyph_id(ch);
                    if let Some(prev) = previous {
                        width += scaled.kern(prev, glyph);
                    }
                    width += scaled.h_advance(glyph);
                    previous = Some(glyph);
                }
                width
            }
            Typeface::Greeked => text.chars().count() as f32 * Self::greeked_advance(px),
        }
    }
}

/// Greedy word wrap.
///
/// Words are accumulated until adding the next one would exceed
/// `max_width`; the line is then emitted. A single word wider than
/// `max_width` gets a line of its own. Whitespace runs collapse to one space.
pub fn wrap_text(text: &str, max_width: f32, px: f32, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.text_width(&candidate, px) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// One pixel per character.
    struct PerChar;

    impl TextMeasure for PerChar {
        fn text_width(&self, text: &str, _px: f32) -> f32 {
            text.chars().count() as f32
        }
    }

    #[test]
    fn test_wrap_breaks_greedily() {
        let lines = wrap_text("the quick brown fox jumps", 10.0, 16.0, &PerChar);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_keeps_long_word_alone() {
        let lines = wrap_text("a supercalifragilistic b", 6.0, 16.0, &PerChar);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert!(wrap_text("", 10.0, 16.0, &PerChar).is_empty());
        assert!(wrap_text("   \n\t ", 10.0, 16.0, &PerChar).is_empty());
        assert_eq!(wrap_text("  spaced \n out ", 100.0, 16.0, &PerChar), vec!["spaced out"]);
    }

    #[test]
    fn test_greeked_measure_scales_with_size() {
        let face = Typeface::Greeked;
        assert!((face.text_width("abcd", 20.0) - 44.0).abs() < 1e-4);
        assert!(face.text_width("abcd", 10.0) < face.text_width("abcd", 20.0));
    }

    #[test]
    fn test_missing_font_file() {
        let result = Typeface::from_file("/definitely/not/here.ttf");
        assert!(matches!(result, Err(SnapmarkError::FileNotFound { .. })));
    }

    proptest! {
        #[test]
        fn prop_wrap_preserves_words(
            words in proptest::collection::vec("[a-zA-Z0-9,.!?]{1,12}", 0..40),
            max_width in 4.0f32..80.0,
        ) {
            let text = words.join("  ");
            let lines = wrap_text(&text, max_width, 16.0, &PerChar);
            prop_assert_eq!(lines.join(" "), words.join(" "));
            for line in &lines {
                // Only single-word lines may overflow.
                if PerChar.text_width(line, 16.0) > max_width {
                    prop_assert!(!line.contains(' '));
                }
            }
        }
    }
}
