mod utils;

pub mod background;
pub mod canvas;
pub mod color;
pub mod config;
pub mod cursor;
pub mod debounce;
pub mod error;
pub mod frame_loop;
pub mod links;
pub mod particle;
pub mod renderer;
pub mod simulation;
pub mod surface;

#[cfg(test)]
mod tests;

use wasm_bindgen::prelude::*;

pub use background::ParticleBackground;
pub use color::Color;
pub use config::{BoundaryPolicy, CursorMode, Environment, ParticleConfig, ResizePolicy};
pub use error::Error;
pub use particle::Particle;
pub use renderer::Renderer;
pub use simulation::Simulation;
pub use surface::{PixelSurface, Surface};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
    utils::init_logger();
}

/// A named preset as a plain JS object, ready to tweak and pass to `ParticleBackground`.
#[wasm_bindgen]
pub fn preset_config(name: &str) -> Result<JsValue, JsValue> {
    let config = ParticleConfig::preset(name)
        .ok_or_else(|| Error::Config(format!("unknown preset '{}'", name)))?;
    Ok(serde_wasm_bindgen::to_value(&config)?)
}
