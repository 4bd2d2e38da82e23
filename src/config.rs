// Tunables for the particle field. Deserialized from a (partial) JS object,
// any field left out falls back to the constellation preset.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Range {
        Range { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen::<f64>() * (self.max - self.min) + self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    fn ordered(self) -> Range {
        if self.min <= self.max {
            self
        } else {
            Range::new(self.max, self.min)
        }
    }

    fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    fn finite_or(self, fallback: Range) -> Range {
        if self.is_finite() {
            self
        } else {
            fallback
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// What happens when a particle reaches the edge of the surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryPolicy {
    /// Reflect the velocity at the edge.
    Bounce,
    /// Reinitialize the particle once it leaves the surface or its life runs out.
    Respawn,
}

/// What a surface resize does to the existing particles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizePolicy {
    /// Keep particles where they are; the next step corrects stragglers.
    Preserve,
    /// Throw all particles away and spawn `count` fresh ones.
    Reset,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CursorMode {
    Repel,
    Attract,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillStyle {
    Solid,
    /// Radial fade from the particle color to transparent.
    Glow,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Draw paths through the 2D context.
    Vector,
    /// Rasterize into a pixel buffer and blit it with `putImageData`.
    Raster,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriftConfig {
    pub amplitude: f64,
    pub frequency: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        DriftConfig {
            amplitude: 0.0,
            frequency: 0.01,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorConfig {
    pub radius: f64,
    pub strength: f64,
    pub mode: CursorMode,
}

impl Default for CursorConfig {
    fn default() -> Self {
        CursorConfig {
            radius: 100.0,
            strength: 0.01,
            mode: CursorMode::Repel,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkConfig {
    pub enabled: bool,
    pub threshold: f64,
    pub base_alpha: f64,
    pub color: Color,
    pub width: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            enabled: true,
            threshold: 100.0,
            base_alpha: 0.2,
            color: Color::from_u32(0x64ffdaff),
            width: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleConfig {
    pub count: i64,
    pub speed: Range,
    pub size: Range,
    pub opacity: Range,
    pub palette: Vec<Color>,
    pub boundary: BoundaryPolicy,
    pub resize: ResizePolicy,
    /// Slack outside the surface a particle may occupy before it is corrected.
    pub margin: f64,
    /// Per-tick life loss range; `None` means particles live forever.
    pub decay: Option<Range>,
    pub drift: DriftConfig,
    pub cursor: CursorConfig,
    pub links: LinkConfig,
    pub fill: FillStyle,
    pub render: RenderMode,
    pub resize_debounce_ms: f64,
    pub seed: Option<u64>,
    pub reduced_motion_count: i64,
    pub touch_count: i64,
    pub profile: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig::constellation()
    }
}

/// Capabilities of the hosting page that change how busy the field may be.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    pub reduced_motion: bool,
    pub touch: bool,
}

impl ParticleConfig {
    /// Bouncing particles joined by connectivity lines.
    pub fn constellation() -> Self {
        ParticleConfig {
            count: 100,
            speed: Range::new(0.05, 0.25),
            size: Range::new(0.5, 2.0),
            opacity: Range::new(0.2, 0.7),
            palette: vec![Color::from_u32(0x64ffdaff)],
            boundary: BoundaryPolicy::Bounce,
            resize: ResizePolicy::Preserve,
            margin: 10.0,
            decay: None,
            drift: DriftConfig::default(),
            cursor: CursorConfig::default(),
            links: LinkConfig::default(),
            fill: FillStyle::Solid,
            render: RenderMode::Vector,
            resize_debounce_ms: 250.0,
            seed: None,
            reduced_motion_count: 30,
            touch_count: 40,
            profile: false,
        }
    }

    /// Glowing particles falling with a ripple, fading out and respawning at the top.
    pub fn drift() -> Self {
        ParticleConfig {
            count: 60,
            speed: Range::new(0.1, 0.4),
            size: Range::new(1.0, 4.0),
            opacity: Range::new(0.1, 0.8),
            palette: [
                0x667eeaff, 0x764ba2ff, 0xf093fbff, 0xf5576cff, 0x4facfeff, 0x00f2feff,
            ]
            .iter()
            .map(|&c| Color::from_u32(c))
            .collect(),
            boundary: BoundaryPolicy::Respawn,
            resize: ResizePolicy::Reset,
            margin: 10.0,
            decay: Some(Range::new(0.005, 0.015)),
            drift: DriftConfig {
                amplitude: 0.5,
                frequency: 0.01,
            },
            cursor: CursorConfig {
                mode: CursorMode::Attract,
                ..CursorConfig::default()
            },
            links: LinkConfig {
                enabled: false,
                ..LinkConfig::default()
            },
            fill: FillStyle::Glow,
            ..ParticleConfig::constellation()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "constellation" => Some(ParticleConfig::constellation()),
            "drift" => Some(ParticleConfig::drift()),
            _ => None,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.count.max(0) as usize
    }

    // Non-finite numbers fall back to the constellation values, inverted
    // ranges are swapped, negatives clamped, the palette never left empty
    pub fn validated(mut self) -> Self {
        let fallback = ParticleConfig::constellation();
        self.count = self.count.max(0);
        self.speed = self.speed.finite_or(fallback.speed).ordered();
        self.size = self.size.finite_or(fallback.size).ordered();
        self.opacity = self.opacity.finite_or(fallback.opacity).ordered();
        self.opacity.min = self.opacity.min.max(0.0).min(1.0);
        self.opacity.max = self.opacity.max.max(0.0).min(1.0);
        self.decay = match self.decay {
            Some(decay) if !decay.is_finite() => {
                log::warn!("non-finite particle decay {:?}, particles will not fade", decay);
                fallback.decay
            }
            decay => decay.map(Range::ordered),
        };
        self.margin = finite_or(self.margin, fallback.margin).max(0.0);
        self.drift.amplitude = finite_or(self.drift.amplitude, fallback.drift.amplitude);
        self.drift.frequency = finite_or(self.drift.frequency, fallback.drift.frequency);
        self.cursor.radius = finite_or(self.cursor.radius, fallback.cursor.radius).max(0.0);
        self.cursor.strength = finite_or(self.cursor.strength, fallback.cursor.strength);
        self.links.threshold = finite_or(self.links.threshold, fallback.links.threshold).max(0.0);
        self.links.base_alpha = finite_or(self.links.base_alpha, fallback.links.base_alpha);
        self.links.width = finite_or(self.links.width, fallback.links.width).max(0.0);
        self.resize_debounce_ms =
            finite_or(self.resize_debounce_ms, fallback.resize_debounce_ms).max(0.0);
        if self.palette.is_empty() {
            log::warn!("empty particle palette, falling back to white");
            self.palette.push(Color::WHITE);
        }
        self
    }

    /// Tone the field down for the page's capabilities instead of switching it off.
    pub fn adapted_to(mut self, env: Environment) -> Self {
        if env.touch {
            self.count = self.count.min(self.touch_count.max(0));
        }
        if env.reduced_motion {
            self.count = self.count.min(self.reduced_motion_count.max(0));
            self.speed = Range::new(self.speed.min * 0.5, self.speed.max * 0.5);
            self.drift.amplitude = 0.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_clamps_and_reorders() {
        let config = ParticleConfig {
            count: -5,
            size: Range::new(4.0, 1.0),
            opacity: Range::new(-1.0, 3.0),
            palette: Vec::new(),
            ..ParticleConfig::default()
        }
        .validated();

        assert_eq!(config.particle_count(), 0);
        assert_eq!(config.size, Range::new(1.0, 4.0));
        assert_eq!(config.opacity, Range::new(0.0, 1.0));
        assert_eq!(config.palette, vec![Color::WHITE]);
    }

    #[test]
    fn validated_replaces_non_finite_numbers() {
        let config = ParticleConfig {
            speed: Range::new(f64::NAN, 1.0),
            size: Range::new(1.0, f64::INFINITY),
            margin: f64::NAN,
            decay: Some(Range::new(f64::NAN, 0.01)),
            drift: DriftConfig {
                amplitude: 0.5,
                frequency: f64::NAN,
            },
            cursor: CursorConfig {
                strength: f64::NEG_INFINITY,
                ..CursorConfig::default()
            },
            ..ParticleConfig::drift()
        }
        .validated();

        let fallback = ParticleConfig::constellation();
        assert_eq!(config.speed, fallback.speed);
        assert_eq!(config.size, fallback.size);
        assert_eq!(config.margin, fallback.margin);
        assert_eq!(config.decay, None);
        assert_eq!(config.drift.amplitude, 0.5);
        assert_eq!(config.drift.frequency, fallback.drift.frequency);
        assert_eq!(config.cursor.strength, fallback.cursor.strength);
    }

    #[test]
    fn reduced_motion_keeps_field_alive() {
        let config = ParticleConfig::drift().adapted_to(Environment {
            reduced_motion: true,
            touch: false,
        });
        assert_eq!(config.count, 30);
        assert!(config.particle_count() > 0);
        assert_eq!(config.drift.amplitude, 0.0);
        assert!((config.speed.max - 0.2).abs() < 1e-12);
    }

    #[test]
    fn touch_caps_count() {
        let config = ParticleConfig::constellation().adapted_to(Environment {
            reduced_motion: false,
            touch: true,
        });
        assert_eq!(config.count, 40);
    }

    #[test]
    fn presets_by_name() {
        assert_eq!(
            ParticleConfig::preset("drift").map(|c| c.boundary),
            Some(BoundaryPolicy::Respawn)
        );
        assert!(ParticleConfig::preset("nebula").is_none());
    }

    #[test]
    fn range_sample_stays_inside() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let range = Range::new(0.1, 0.4);
        for _ in 0..1000 {
            let v = range.sample(&mut rng);
            assert!(v >= 0.1 && v <= 0.4);
        }
    }
}
