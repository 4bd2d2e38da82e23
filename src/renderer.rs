// Renderer struct that turns the current simulation state into one frame on
// any Surface. It only reads the simulation, keeping a reusable link buffer
// between frames.

use rand::Rng;

use crate::error::Error;
use crate::links::{self, Link};
use crate::simulation::Simulation;
use crate::surface::Surface;

#[derive(Default)]
pub struct Renderer {
    links: Vec<Link>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { links: Vec::new() }
    }

    /// Links found during the last `render` call.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn render<R: Rng, S: Surface>(
        &mut self,
        sim: &Simulation<R>,
        surface: &mut S,
    ) -> Result<(), Error> {
        let config = sim.config();
        let particles = sim.particles();
        surface.clear()?;

        if config.links.enabled {
            links::find_links(particles, config.links.threshold, &mut self.links);
            for link in &self.links {
                let alpha = link.alpha(config.links.threshold, config.links.base_alpha);
                surface.stroke_line(
                    particles[link.a].pos,
                    particles[link.b].pos,
                    config.links.color,
                    alpha,
                    config.links.width,
                )?;
            }
        } else {
            self.links.clear();
        }

        for p in particles {
            surface.fill_circle(p.pos, p.size, p.color, p.alpha(), config.fill)?;
        }
        Ok(())
    }
}
