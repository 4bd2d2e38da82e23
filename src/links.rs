// Connectivity lines between particles closer than a threshold. Small fields
// get the plain pairwise scan, larger ones bucket particles into a grid of
// threshold-sized cells so only neighbouring cells are compared.

use nalgebra_glm as glm;

use crate::particle::Particle;

// Below this many particles the pairwise scan wins over building the grid
pub const GRID_MIN_PARTICLES: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

impl Link {
    /// Line opacity, fading linearly to zero at the threshold.
    pub fn alpha(&self, threshold: f64, base_alpha: f64) -> f64 {
        if threshold <= 0.0 {
            return 0.0;
        }
        base_alpha * (1.0 - self.distance / threshold)
    }
}

fn distance(a: &Particle, b: &Particle) -> f64 {
    glm::distance(&glm::vec2(a.pos[0], a.pos[1]), &glm::vec2(b.pos[0], b.pos[1]))
}

/// Fills `out` with every unordered pair closer than `threshold`.
pub fn find_links(particles: &[Particle], threshold: f64, out: &mut Vec<Link>) {
    if particles.len() < GRID_MIN_PARTICLES {
        find_links_pairwise(particles, threshold, out)
    } else {
        find_links_bucketed(particles, threshold, out)
    }
}

pub fn find_links_pairwise(particles: &[Particle], threshold: f64, out: &mut Vec<Link>) {
    out.clear();
    if !(threshold > 0.0) {
        return;
    }
    for a in 0..particles.len() {
        for b in a + 1..particles.len() {
            let d = distance(&particles[a], &particles[b]);
            if d < threshold {
                out.push(Link { a, b, distance: d });
            }
        }
    }
}

pub fn find_links_bucketed(particles: &[Particle], threshold: f64, out: &mut Vec<Link>) {
    out.clear();
    if !(threshold > 0.0) || particles.is_empty() {
        return;
    }

    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for p in particles {
        for axis in 0..2 {
            min[axis] = min[axis].min(p.pos[axis]);
            max[axis] = max[axis].max(p.pos[axis]);
        }
    }
    if !(min[0].is_finite() && min[1].is_finite() && max[0].is_finite() && max[1].is_finite()) {
        return find_links_pairwise(particles, threshold, out);
    }

    let cols = ((max[0] - min[0]) / threshold).floor() as usize + 1;
    let rows = ((max[1] - min[1]) / threshold).floor() as usize + 1;
    // A tiny threshold over a wide field would allocate more cells than it saves
    if cols.saturating_mul(rows) > particles.len().saturating_mul(4) {
        return find_links_pairwise(particles, threshold, out);
    }

    let cell_of = |p: &Particle| -> (usize, usize) {
        let col = ((p.pos[0] - min[0]) / threshold).floor() as usize;
        let row = ((p.pos[1] - min[1]) / threshold).floor() as usize;
        (col.min(cols - 1), row.min(rows - 1))
    };

    let mut cells: Vec<Vec<usize>> = vec![Vec::new(); cols * rows];
    for (i, p) in particles.iter().enumerate() {
        let (col, row) = cell_of(p);
        cells[row * cols + col].push(i);
    }

    // Forward half of the neighbourhood so every pair of cells is visited once
    const NEIGHBOURS: [(isize, isize); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

    for row in 0..rows {
        for col in 0..cols {
            let here = &cells[row * cols + col];
            for (i, &a) in here.iter().enumerate() {
                for &b in &here[i + 1..] {
                    push_if_close(particles, a, b, threshold, out);
                }
            }

            for &(dc, dr) in NEIGHBOURS.iter() {
                let n_col = col as isize + dc;
                let n_row = row as isize + dr;
                if n_col < 0 || n_row < 0 || n_col >= cols as isize || n_row >= rows as isize {
                    continue;
                }
                let there = &cells[n_row as usize * cols + n_col as usize];
                for &a in here {
                    for &b in there {
                        push_if_close(particles, a, b, threshold, out);
                    }
                }
            }
        }
    }
}

fn push_if_close(particles: &[Particle], a: usize, b: usize, threshold: f64, out: &mut Vec<Link>) {
    let d = distance(&particles[a], &particles[b]);
    if d < threshold {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        out.push(Link { a, b, distance: d });
    }
}
