// Simple particle struct to keep track of individual position, velocity,
// look and remaining life

use rand::Rng;
use serde::Serialize;

use crate::color::Color;
use crate::config::{BoundaryPolicy, ParticleConfig};

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Particle {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub size: f64,
    pub opacity: f64,
    pub color: Color,
    pub life: f64,
    pub decay: f64,
}

impl Particle {
    pub fn new(pos_x: f64, pos_y: f64, vel_x: f64, vel_y: f64, size: f64, color: Color) -> Particle {
        Particle {
            pos: [pos_x, pos_y],
            vel: [vel_x, vel_y],
            size,
            opacity: 1.0,
            color,
            life: 1.0,
            decay: 0.0,
        }
    }

    /// A fresh particle anywhere on a `width` x `height` surface.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        config: &ParticleConfig,
        width: f64,
        height: f64,
    ) -> Particle {
        let mut p = Particle::respawn(rng, config, width);
        p.pos[1] = rng.gen::<f64>() * height;
        p
    }

    /// A fresh particle entering from the top edge.
    pub fn respawn<R: Rng + ?Sized>(rng: &mut R, config: &ParticleConfig, width: f64) -> Particle {
        let pos_x = rng.gen::<f64>() * width;
        let (vel_x, vel_y) = match config.boundary {
            BoundaryPolicy::Bounce => (signed(rng, config), signed(rng, config)),
            BoundaryPolicy::Respawn => (
                (rng.gen::<f64>() - 0.5) * config.speed.span(),
                config.speed.sample(rng),
            ),
        };
        let size = config.size.sample(rng);
        let color = pick_color(rng, &config.palette);

        let mut p = Particle::new(pos_x, -config.margin, vel_x, vel_y, size, color);
        p.opacity = config.opacity.sample(rng);
        p.decay = config.decay.map_or(0.0, |decay| decay.sample(rng));
        p
    }

    pub fn alpha(&self) -> f64 {
        (self.opacity * self.life).max(0.0).min(1.0)
    }
}

fn signed<R: Rng + ?Sized>(rng: &mut R, config: &ParticleConfig) -> f64 {
    let speed = config.speed.sample(rng);
    if rng.gen::<bool>() {
        speed
    } else {
        -speed
    }
}

fn pick_color<R: Rng + ?Sized>(rng: &mut R, palette: &[Color]) -> Color {
    if palette.is_empty() {
        Color::WHITE
    } else {
        palette[rng.gen_range(0, palette.len())]
    }
}
