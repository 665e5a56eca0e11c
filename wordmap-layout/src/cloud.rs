//! Top-level pipeline: word set in, positioned nodes out.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wordmap_core::WordEntry;

use crate::measure::TextMeasure;
use crate::scale::FontScale;
use crate::simulation::{Body, Simulation};

/// Total span of the random start jitter (±50 on each axis).
pub const JITTER_SPAN: f32 = 100.0;
/// Collision radii are shrunk 10% below the half-width so packs sit
/// tighter, at the cost of occasional slight overlap.
pub const RADIUS_SHRINK: f32 = 0.9;

/// A positioned word, ready to render. Coordinates are relative to the
/// container center.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudNode {
    pub id: String,
    pub text: String,
    pub count: u32,
    pub font_size: f32,
    pub width: f32,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

/// Compute a full layout for the given word set.
///
/// Runs from scratch every time — prior positions are never reused. An
/// empty input yields an empty layout (the caller shows a placeholder).
pub fn layout<R: Rng>(
    words: &[WordEntry],
    measure: &dyn TextMeasure,
    rng: &mut R,
) -> Vec<CloudNode> {
    let Some(scale) = FontScale::from_counts(words.iter().map(|w| w.count)) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(words.len());
    let mut bodies = Vec::with_capacity(words.len());
    for word in words {
        let font_size = scale.size_for(word.count);
        let width = measure.width(&word.text, font_size);
        // Words are wider than tall, so half the width covers the box.
        let radius = 0.5 * width * RADIUS_SHRINK;
        bodies.push(Body::at(
            radius,
            (rng.gen::<f32>() - 0.5) * JITTER_SPAN,
            (rng.gen::<f32>() - 0.5) * JITTER_SPAN,
        ));
        nodes.push(CloudNode {
            id: word.id.clone(),
            text: word.text.clone(),
            count: word.count,
            font_size,
            width,
            radius,
            x: 0.0,
            y: 0.0,
        });
    }

    let mut sim = Simulation::new(bodies);
    sim.run(rng);

    for (node, body) in nodes.iter_mut().zip(sim.into_bodies()) {
        node.x = body.x;
        node.y = body.y;
    }
    log::debug!("laid out {} words", nodes.len());
    nodes
}

/// [`layout`] with a deterministic RNG, for reproducible arrangements.
pub fn layout_seeded(words: &[WordEntry], measure: &dyn TextMeasure, seed: u64) -> Vec<CloudNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    layout(words, measure, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::HeuristicMeasure;
    use crate::scale::{MAX_FONT_SIZE, MIN_FONT_SIZE};

    fn entry(text: &str, count: u32) -> WordEntry {
        WordEntry {
            id: text.to_lowercase(),
            text: text.to_string(),
            count,
        }
    }

    #[test]
    fn empty_set_yields_empty_layout() {
        assert!(layout_seeded(&[], &HeuristicMeasure, 0).is_empty());
    }

    #[test]
    fn single_word_converges_to_origin() {
        let nodes = layout_seeded(&[entry("alone", 3)], &HeuristicMeasure, 11);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].x.abs() < 1.0, "x = {}", nodes[0].x);
        assert!(nodes[0].y.abs() < 1.0, "y = {}", nodes[0].y);
    }

    #[test]
    fn equal_count_pair_does_not_overlap() {
        let words = [entry("left", 1), entry("right", 1)];
        let nodes = layout_seeded(&words, &HeuristicMeasure, 17);
        let [a, b] = [&nodes[0], &nodes[1]];
        let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!(
            dist >= (a.radius + b.radius) * 0.95,
            "dist = {dist}, radii = {} + {}",
            a.radius,
            b.radius
        );
    }

    #[test]
    fn font_sizes_follow_counts() {
        let words = [entry("rare", 1), entry("mid", 5), entry("top", 9)];
        let nodes = layout_seeded(&words, &HeuristicMeasure, 23);
        assert_eq!(nodes[0].font_size, MIN_FONT_SIZE);
        assert_eq!(nodes[2].font_size, MAX_FONT_SIZE);
        assert!(nodes[1].font_size > nodes[0].font_size);
        assert!(nodes[1].font_size < nodes[2].font_size);
    }

    #[test]
    fn radius_is_shrunk_half_width() {
        let nodes = layout_seeded(&[entry("word", 1), entry("other", 2)], &HeuristicMeasure, 5);
        for node in &nodes {
            assert!((node.radius - 0.5 * node.width * RADIUS_SHRINK).abs() < 1e-4);
        }
    }

    #[test]
    fn nodes_keep_input_order() {
        let words = [entry("first", 2), entry("second", 1), entry("third", 4)];
        let nodes = layout_seeded(&words, &HeuristicMeasure, 31);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn dense_cloud_mostly_separates() {
        let words: Vec<WordEntry> = (0..12)
            .map(|i| entry(&format!("word{i}"), (i % 4) + 1))
            .collect();
        let nodes = layout_seeded(&words, &HeuristicMeasure, 47);
        let mut overlapping = 0;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let (a, b) = (&nodes[i], &nodes[j]);
                let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                if dist < (a.radius + b.radius) * 0.9 {
                    overlapping += 1;
                }
            }
        }
        // The 10% radius shrink tolerates slight overlap but gross
        // overlap means the relaxation failed.
        assert_eq!(overlapping, 0);
    }

    #[test]
    fn same_seed_reproduces_layout() {
        let words = [entry("a", 1), entry("b", 2), entry("c", 3)];
        let first = layout_seeded(&words, &HeuristicMeasure, 99);
        let second = layout_seeded(&words, &HeuristicMeasure, 99);
        assert_eq!(first, second);
    }
}
