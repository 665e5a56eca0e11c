//! Rendered-width estimation.
//!
//! The simulation only needs an approximate bounding width per word. A
//! renderer with real font metrics can implement [`TextMeasure`]; the
//! default heuristic assumes an average glyph advance of 0.6 em, which is
//! close enough for a heavy sans-serif face.

pub trait TextMeasure {
    /// Estimated rendered width of `text` at `font_size`, in layout units.
    fn width(&self, text: &str, font_size: f32) -> f32;
}

/// Character-count heuristic used when no rasterizer is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasure;

impl TextMeasure for HeuristicMeasure {
    fn width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length_and_size() {
        let m = HeuristicMeasure;
        assert_eq!(m.width("abcd", 10.0), 24.0);
        assert_eq!(m.width("abcd", 20.0), 48.0);
        assert_eq!(m.width("abcdabcd", 10.0), 48.0);
    }

    #[test]
    fn width_counts_chars_not_bytes() {
        let m = HeuristicMeasure;
        // 4 characters, 8 bytes in UTF-8
        assert_eq!(m.width("çãéõ", 10.0), 24.0);
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(HeuristicMeasure.width("", 96.0), 0.0);
    }
}
