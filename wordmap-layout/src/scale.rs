//! Linear count → font-size scale.

/// Font size assigned to the least frequent word.
pub const MIN_FONT_SIZE: f32 = 24.0;
/// Font size assigned to the most frequent word.
pub const MAX_FONT_SIZE: f32 = 96.0;

/// Maps a word count onto `[MIN_FONT_SIZE, MAX_FONT_SIZE]` linearly over
/// the observed `[min_count, max_count]` range.
///
/// When every count is equal the domain has zero span; the scale then
/// returns the range midpoint for all inputs instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontScale {
    min_count: f32,
    max_count: f32,
}

impl FontScale {
    /// Build a scale from the observed counts. `None` for an empty set.
    pub fn from_counts<I: IntoIterator<Item = u32>>(counts: I) -> Option<Self> {
        let mut iter = counts.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for count in iter {
            min = min.min(count);
            max = max.max(count);
        }
        Some(Self {
            min_count: min as f32,
            max_count: max as f32,
        })
    }

    pub fn size_for(&self, count: u32) -> f32 {
        if self.max_count == self.min_count {
            return (MIN_FONT_SIZE + MAX_FONT_SIZE) / 2.0;
        }
        let t = (count as f32 - self.min_count) / (self.max_count - self.min_count);
        MIN_FONT_SIZE + t * (MAX_FONT_SIZE - MIN_FONT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_range_bounds() {
        let scale = FontScale::from_counts([1, 3, 10]).unwrap();
        assert_eq!(scale.size_for(1), MIN_FONT_SIZE);
        assert_eq!(scale.size_for(10), MAX_FONT_SIZE);
    }

    #[test]
    fn interior_counts_interpolate() {
        let scale = FontScale::from_counts([0, 10]).unwrap();
        let mid = scale.size_for(5);
        assert!((mid - 60.0).abs() < 1e-4);
    }

    #[test]
    fn equal_counts_collapse_to_midpoint() {
        let scale = FontScale::from_counts([4, 4, 4]).unwrap();
        assert_eq!(scale.size_for(4), 60.0);
        // Out-of-domain inputs get the same fixed size.
        assert_eq!(scale.size_for(99), 60.0);
    }

    #[test]
    fn empty_input_yields_no_scale() {
        assert!(FontScale::from_counts(std::iter::empty()).is_none());
    }
}
