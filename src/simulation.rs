// Owns the particle set, the surface bounds and the random source. One call
// to `step` advances every particle by exactly one frame.

use rand::Rng;

use crate::config::{BoundaryPolicy, ParticleConfig, ResizePolicy};
use crate::cursor::Cursor;
use crate::particle::Particle;

pub struct Simulation<R> {
    config: ParticleConfig,
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    cursor: Option<Cursor>,
    rng: R,
}

impl<R: Rng> Simulation<R> {
    /// Builds a simulation and spawns `config.count` particles.
    pub fn new(config: ParticleConfig, width: f64, height: f64, rng: R) -> Simulation<R> {
        let config = config.validated();
        let count = config.count;
        let mut sim = Simulation::with_particles(config, width, height, Vec::new(), rng);
        sim.initialize(count, width, height);
        sim
    }

    /// Wraps an explicit particle set, nothing is spawned.
    pub fn with_particles(
        config: ParticleConfig,
        width: f64,
        height: f64,
        particles: Vec<Particle>,
        rng: R,
    ) -> Simulation<R> {
        Simulation {
            config: config.validated(),
            width: clamp_dimension(width),
            height: clamp_dimension(height),
            particles,
            cursor: None,
            rng,
        }
    }

    /// Replaces every particle with `count` fresh ones. Negative counts
    /// give an empty field.
    pub fn initialize(&mut self, count: i64, width: f64, height: f64) {
        self.width = clamp_dimension(width);
        self.height = clamp_dimension(height);
        let count = count.max(0) as usize;

        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let p = Particle::spawn(&mut self.rng, &self.config, self.width, self.height);
            self.particles.push(p);
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        match self.config.resize {
            ResizePolicy::Reset => {
                let count = self.config.count;
                self.initialize(count, width, height);
            }
            ResizePolicy::Preserve => {
                self.width = clamp_dimension(width);
                self.height = clamp_dimension(height);
            }
        }
        log::debug!(
            "particle surface resized to {}x{} ({:?})",
            self.width,
            self.height,
            self.config.resize
        );
    }

    pub fn set_cursor(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.cursor = Some(Cursor::new([x, y], &self.config.cursor));
        }
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn step(&mut self) {
        let width = self.width;
        let height = self.height;
        let config = &self.config;
        let rng = &mut self.rng;
        let cursor = self.cursor;

        for particle in &mut self.particles {
            particle.pos[0] += particle.vel[0];
            particle.pos[1] += particle.vel[1];
            if config.drift.amplitude != 0.0 {
                particle.pos[0] += (particle.pos[1] * config.drift.frequency).sin() * config.drift.amplitude;
            }

            particle.life -= particle.decay;

            let expired = particle.life <= 0.0;
            match config.boundary {
                BoundaryPolicy::Bounce if expired => {
                    *particle = Particle::spawn(rng, config, width, height);
                    continue;
                }
                BoundaryPolicy::Bounce => bounce(particle, width, height),
                BoundaryPolicy::Respawn => {
                    if expired || is_outside(particle, width, height, config.margin) {
                        *particle = Particle::respawn(rng, config, width);
                        continue;
                    }
                }
            }

            if let Some(cursor) = cursor {
                if let Some(offset) = cursor.nudge(particle.pos) {
                    let pos = vecmath::vec2_add(particle.pos, offset);
                    // the nudge must not carry a particle past the margin
                    particle.pos = [
                        pos[0].max(-config.margin).min(width + config.margin),
                        pos[1].max(-config.margin).min(height + config.margin),
                    ];
                }
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

// Point the velocity back inside and pin the particle to the edge it crossed
fn bounce(particle: &mut Particle, width: f64, height: f64) {
    let bounds = [width, height];
    for axis in 0..2 {
        if particle.pos[axis] < 0.0 {
            particle.vel[axis] = particle.vel[axis].abs();
            particle.pos[axis] = 0.0;
        } else if particle.pos[axis] > bounds[axis] {
            particle.vel[axis] = -particle.vel[axis].abs();
            particle.pos[axis] = bounds[axis];
        }
    }
}

fn is_outside(particle: &Particle, width: f64, height: f64, margin: f64) -> bool {
    let [x, y] = particle.pos;
    x < -margin || x > width + margin || y < -margin || y > height + margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn still(x: f64, y: f64) -> Particle {
        Particle::new(x, y, 0.0, 0.0, 1.0, Color::WHITE)
    }

    #[test]
    fn bounce_reflects_and_pins() {
        let mut p = Particle::new(-3.0, 50.0, -2.0, 0.0, 1.0, Color::WHITE);
        bounce(&mut p, 100.0, 100.0);
        assert_eq!(p.pos, [0.0, 50.0]);
        assert_eq!(p.vel, [2.0, 0.0]);

        let mut p = Particle::new(40.0, 130.0, 0.0, 1.5, 1.0, Color::WHITE);
        bounce(&mut p, 100.0, 100.0);
        assert_eq!(p.pos, [40.0, 100.0]);
        assert_eq!(p.vel, [0.0, -1.5]);
    }

    #[test]
    fn outside_uses_margin() {
        assert!(!is_outside(&still(-10.0, 110.0), 100.0, 100.0, 10.0));
        assert!(is_outside(&still(-10.5, 50.0), 100.0, 100.0, 10.0));
        assert!(is_outside(&still(50.0, 111.0), 100.0, 100.0, 10.0));
    }

    #[test]
    fn non_finite_cursor_is_ignored() {
        let rng = ChaCha8Rng::seed_from_u64(0);
        let mut sim = Simulation::new(ParticleConfig::default(), 10.0, 10.0, rng);
        sim.set_cursor(f64::NAN, 1.0);
        assert!(sim.cursor().is_none());
        sim.set_cursor(1.0, 2.0);
        assert_eq!(sim.cursor().map(|c| c.pos), Some([1.0, 2.0]));
        sim.clear_cursor();
        assert!(sim.cursor().is_none());
    }

    #[test]
    fn degenerate_dimensions_clamp_to_zero() {
        let rng = ChaCha8Rng::seed_from_u64(0);
        let sim = Simulation::new(ParticleConfig::default(), -20.0, f64::INFINITY, rng);
        assert_eq!(sim.width(), 0.0);
        assert_eq!(sim.height(), 0.0);
        assert!(sim.particles().iter().all(|p| p.pos == [0.0, 0.0]));
    }
}
