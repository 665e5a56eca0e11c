//! The relaxation loop: pairwise circle collision plus a centering pull.
//!
//! Per tick:
//!
//! 1. decay the simulation energy (`alpha`),
//! 2. pull every body toward the origin with fixed strength 0.3 on each
//!    axis independently, scaled by `alpha`,
//! 3. run 4 collision passes that push overlapping circles apart in
//!    proportion to their radii (collision is *not* alpha-scaled, so
//!    overlap keeps resolving even as the centering pull dies off),
//! 4. integrate velocities with a 0.6 retain factor.
//!
//! The loop stops when `alpha` drops below `ALPHA_MIN` or after
//! `MAX_TICKS` ticks, whichever comes first. With the default decay both
//! happen at the same tick; the budget is a hard stop either way.

use rand::Rng;

/// Centering force strength applied per axis.
pub const CENTER_STRENGTH: f32 = 0.3;
/// Collision passes per tick; more passes keep tight packs stable.
pub const COLLIDE_ITERATIONS: usize = 4;
/// Energy threshold below which the simulation is considered converged.
pub const ALPHA_MIN: f32 = 0.001;
/// Hard tick budget.
pub const MAX_TICKS: usize = 300;

const VELOCITY_RETAIN: f32 = 0.6;

/// One simulated circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub radius: f32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Body {
    pub fn at(radius: f32, x: f32, y: f32) -> Self {
        Self {
            radius,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

pub struct Simulation {
    bodies: Vec<Body>,
    alpha: f32,
    alpha_decay: f32,
}

impl Simulation {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self {
            bodies,
            alpha: 1.0,
            // Reaches ALPHA_MIN after exactly MAX_TICKS ticks.
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / MAX_TICKS as f32),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn into_bodies(self) -> Vec<Body> {
        self.bodies
    }

    /// Advance one step. The RNG only breaks exact-overlap ties.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) {
        self.alpha += (0.0 - self.alpha) * self.alpha_decay;

        for body in &mut self.bodies {
            body.vx += (0.0 - body.x) * CENTER_STRENGTH * self.alpha;
            body.vy += (0.0 - body.y) * CENTER_STRENGTH * self.alpha;
        }

        for _ in 0..COLLIDE_ITERATIONS {
            self.collide_pass(rng);
        }

        for body in &mut self.bodies {
            body.vx *= VELOCITY_RETAIN;
            body.vy *= VELOCITY_RETAIN;
            body.x += body.vx;
            body.y += body.vy;
        }
    }

    /// Run until convergence or the tick budget is exhausted.
    pub fn run<R: Rng>(&mut self, rng: &mut R) {
        for _ in 0..MAX_TICKS {
            self.tick(rng);
            if self.alpha < ALPHA_MIN {
                break;
            }
        }
    }

    /// One O(n²) pass over all pairs, pushing overlapping circles apart at
    /// their predicted (position + velocity) locations. Word clouds stay
    /// small enough that a quadtree would not pay for itself.
    fn collide_pass<R: Rng>(&mut self, rng: &mut R) {
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.bodies.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                let mut dx = (a.x + a.vx) - (b.x + b.vx);
                let mut dy = (a.y + a.vy) - (b.y + b.vy);
                let r = a.radius + b.radius;
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq >= r * r {
                    continue;
                }
                if dist_sq == 0.0 {
                    // Coincident centers: nudge apart in a random direction.
                    dx = jiggle(rng);
                    dy = jiggle(rng);
                    dist_sq = dx * dx + dy * dy;
                }
                let dist = dist_sq.sqrt();
                let push = (r - dist) / dist;
                dx *= push;
                dy *= push;
                // Heavier (larger) circles move less.
                let w = (b.radius * b.radius) / (a.radius * a.radius + b.radius * b.radius);
                a.vx += dx * w;
                a.vy += dy * w;
                b.vx -= dx * (1.0 - w);
                b.vy -= dy * (1.0 - w);
            }
        }
    }
}

fn jiggle<R: Rng>(rng: &mut R) -> f32 {
    (rng.gen::<f32>() - 0.5) * 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn lone_body_converges_to_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = Simulation::new(vec![Body::at(30.0, 48.0, -37.0)]);
        sim.run(&mut rng);
        let body = sim.bodies()[0];
        assert!(body.x.abs() < 1.0, "x = {}", body.x);
        assert!(body.y.abs() < 1.0, "y = {}", body.y);
    }

    #[test]
    fn overlapping_pair_separates() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sim = Simulation::new(vec![Body::at(20.0, -1.0, 0.0), Body::at(20.0, 1.0, 0.5)]);
        sim.run(&mut rng);
        let [a, b] = [sim.bodies()[0], sim.bodies()[1]];
        let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!(dist >= (a.radius + b.radius) * 0.95, "dist = {dist}");
    }

    #[test]
    fn coincident_centers_still_separate() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sim = Simulation::new(vec![Body::at(10.0, 0.0, 0.0), Body::at(10.0, 0.0, 0.0)]);
        sim.run(&mut rng);
        let [a, b] = [sim.bodies()[0], sim.bodies()[1]];
        let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!(dist >= (a.radius + b.radius) * 0.95, "dist = {dist}");
    }

    #[test]
    fn alpha_decays_below_threshold_within_budget() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut sim = Simulation::new(vec![Body::at(5.0, 10.0, 10.0)]);
        sim.run(&mut rng);
        assert!(sim.alpha() < ALPHA_MIN);
    }

    #[test]
    fn empty_simulation_is_a_noop() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sim = Simulation::new(Vec::new());
        sim.run(&mut rng);
        assert!(sim.bodies().is_empty());
    }
}
