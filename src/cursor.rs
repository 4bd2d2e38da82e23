// Pointer influence, keeps track of the last delivered pointer position and
// can determine whether a particle lies inside its radius

use vecmath::Vector2;

use crate::config::{CursorConfig, CursorMode};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cursor {
    pub pos: [f64; 2],
    pub radius: f64,
    pub strength: f64,
    pub mode: CursorMode,
}

impl Cursor {
    pub fn new(pos: [f64; 2], config: &CursorConfig) -> Self {
        Cursor {
            pos,
            radius: config.radius,
            strength: config.strength,
            mode: config.mode,
        }
    }

    pub fn is_point_inside(&self, point: [f64; 2]) -> bool {
        let distance = vecmath::vec2_len(vecmath::vec2_sub(self.pos, point));
        distance < self.radius
    }

    /// Position offset for a particle at `point` this tick, if it is in range.
    pub fn nudge(&self, point: [f64; 2]) -> Option<Vector2<f64>> {
        if !self.is_point_inside(point) {
            return None;
        }
        let to_cursor = vecmath::vec2_sub(self.pos, point);
        if vecmath::vec2_len(to_cursor) <= 0.0 {
            return None;
        }
        let scale = match self.mode {
            CursorMode::Repel => -self.strength,
            CursorMode::Attract => self.strength,
        };
        Some(vecmath::vec2_scale(to_cursor, scale))
    }
}
