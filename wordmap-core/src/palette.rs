//! Display palette for rendered words.

/// A vibrant palette for the word cloud.
const PALETTE: [&str; 8] = [
    "#38bdf8", // sky
    "#818cf8", // indigo
    "#c084fc", // purple
    "#f472b6", // pink
    "#fb7185", // rose
    "#34d399", // emerald
    "#fbbf24", // amber
    "#a78bfa", // violet
];

/// Stable color for the word at `index` (wraps around the palette).
pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around() {
        assert_eq!(color_for(0), color_for(8));
        assert_eq!(color_for(3), color_for(11));
        assert_ne!(color_for(0), color_for(1));
    }
}
