// Page facing widget: a canvas layered behind the content of a container,
// animated by a Simulation and kept in step with the window size, the pointer
// and page visibility.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::canvas::CanvasSurface;
use crate::config::{Environment, ParticleConfig, RenderMode};
use crate::debounce::Debounce;
use crate::error::Error;
use crate::frame_loop::AnimationLoop;
use crate::renderer::Renderer;
use crate::simulation::Simulation;
use crate::surface::PixelSurface;
use crate::utils::Timer;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// Event listener that unregisters itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Listener, Error>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Listener {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

enum Backend {
    Vector(CanvasSurface),
    Raster {
        pixels: PixelSurface,
        context: CanvasRenderingContext2d,
    },
}

struct Scene {
    simulation: Simulation<ChaCha8Rng>,
    renderer: Renderer,
    backend: Backend,
    canvas: HtmlCanvasElement,
    resize: Debounce,
    pending_size: Option<(u32, u32)>,
    profile: bool,
}

impl Scene {
    fn frame(&mut self, timestamp: f64) -> Result<(), Error> {
        if self.resize.poll(timestamp) {
            if let Some((width, height)) = self.pending_size.take() {
                self.apply_size(width, height);
            }
        }

        {
            let _timer = Timer::start_if(self.profile, "particles::update");
            self.simulation.step();
        }

        let _timer = Timer::start_if(self.profile, "particles::render");
        match &mut self.backend {
            Backend::Vector(surface) => self.renderer.render(&self.simulation, surface),
            Backend::Raster { pixels, context } => {
                self.renderer.render(&self.simulation, pixels)?;
                pixels.blit(context)
            }
        }
    }

    fn apply_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        if let Backend::Raster { pixels, .. } = &mut self.backend {
            pixels.resize(width, height);
        }
        self.simulation.resize(width as f64, height as f64);
        log::info!(
            "particle canvas resized to {}x{}, {} particles",
            width,
            height,
            self.simulation.particles().len()
        );
    }
}

struct Mounted {
    scene: Rc<RefCell<Scene>>,
    frame_loop: Rc<AnimationLoop>,
    resume_on_visible: Rc<Cell<bool>>,
    canvas: HtmlCanvasElement,
    listeners: Vec<Listener>,
}

impl Mounted {
    fn mount(container_id: &str, config: ParticleConfig) -> Result<Mounted, Error> {
        let window = web_sys::window().ok_or(Error::NoWindow)?;
        let document = window.document().ok_or(Error::NoDocument)?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| Error::ContainerNotFound(container_id.to_owned()))?;

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::ContextUnavailable)?;
        let context = canvas
            .get_context("2d")?
            .ok_or(Error::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::ContextUnavailable)?;
        style_canvas(&canvas)?;

        let env = detect_environment(&window);
        let config = config.adapted_to(env).validated();
        let (width, height) = viewport_size(&window);
        canvas.set_width(width);
        canvas.set_height(height);
        container.append_child(&canvas)?;

        log::info!(
            "particle background: {} particles, {:?} boundary, {:?} on resize, {}x{}{}",
            config.particle_count(),
            config.boundary,
            config.resize,
            width,
            height,
            if env.reduced_motion { ", reduced motion" } else { "" }
        );

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let backend = match config.render {
            RenderMode::Vector => Backend::Vector(CanvasSurface::new(canvas.clone(), context)),
            RenderMode::Raster => Backend::Raster {
                pixels: PixelSurface::new(width, height),
                context,
            },
        };
        let scene = Rc::new(RefCell::new(Scene {
            resize: Debounce::new(config.resize_debounce_ms),
            profile: config.profile,
            simulation: Simulation::new(config, width as f64, height as f64, rng),
            renderer: Renderer::new(),
            backend,
            canvas: canvas.clone(),
            pending_size: None,
        }));

        let frame_loop = Rc::new(AnimationLoop::new({
            let scene = scene.clone();
            move |timestamp: f64| scene.borrow_mut().frame(timestamp)
        }));

        let resume_on_visible = Rc::new(Cell::new(false));
        let listeners = attach_listeners(&window, &canvas, &scene, &frame_loop, &resume_on_visible)?;

        Ok(Mounted {
            scene,
            frame_loop,
            resume_on_visible,
            canvas,
            listeners,
        })
    }

}

// Also reached when JS frees the wrapper without calling destroy()
impl Drop for Mounted {
    fn drop(&mut self) {
        self.frame_loop.stop();
        self.canvas.remove();
        log::debug!("particle background removed");
    }
}

fn attach_listeners(
    window: &Window,
    canvas: &HtmlCanvasElement,
    scene: &Rc<RefCell<Scene>>,
    frame_loop: &Rc<AnimationLoop>,
    resume_on_visible: &Rc<Cell<bool>>,
) -> Result<Vec<Listener>, Error> {
    let document = window.document().ok_or(Error::NoDocument)?;
    let mut listeners = Vec::with_capacity(4);

    listeners.push({
        let resize_window = window.clone();
        let scene = scene.clone();
        Listener::attach(window, "resize", move |_: Event| {
            let size = viewport_size(&resize_window);
            let now = now_ms(&resize_window);
            let mut scene = scene.borrow_mut();
            scene.pending_size = Some(size);
            scene.resize.trigger(now);
        })?
    });

    listeners.push({
        let canvas = canvas.clone();
        let scene = scene.clone();
        Listener::attach(window, "mousemove", move |event: Event| {
            if let Ok(event) = event.dyn_into::<MouseEvent>() {
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let y = event.client_y() as f64 - rect.top();
                scene.borrow_mut().simulation.set_cursor(x, y);
            }
        })?
    });

    listeners.push({
        let scene = scene.clone();
        Listener::attach(&document, "mouseleave", move |_: Event| {
            scene.borrow_mut().simulation.clear_cursor();
        })?
    });

    listeners.push({
        let frame_loop = frame_loop.clone();
        let resume_on_visible = resume_on_visible.clone();
        let visibility_document = document.clone();
        Listener::attach(&document, "visibilitychange", move |_: Event| {
            if visibility_document.hidden() {
                if frame_loop.is_running() {
                    resume_on_visible.set(true);
                    frame_loop.stop();
                    log::debug!("page hidden, particle loop paused");
                }
            } else if resume_on_visible.replace(false) {
                frame_loop.start();
                log::debug!("page visible, particle loop resumed");
            }
        })?
    });

    Ok(listeners)
}

fn style_canvas(canvas: &HtmlCanvasElement) -> Result<(), Error> {
    let style = canvas.style();
    style.set_property("position", "absolute")?;
    style.set_property("top", "0")?;
    style.set_property("left", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("pointer-events", "none")?;
    style.set_property("z-index", "1")?;
    Ok(())
}

fn viewport_size(window: &Window) -> (u32, u32) {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .map_or(0, |v| v.max(0.0) as u32)
    };
    (dimension(window.inner_width()), dimension(window.inner_height()))
}

// Same clock as the requestAnimationFrame timestamp
fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |p| p.now())
}

fn detect_environment(window: &Window) -> Environment {
    let reduced_motion = window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map_or(false, |query| query.matches());
    let touch = js_sys::Reflect::has(window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
    Environment {
        reduced_motion,
        touch,
    }
}

fn parse_config(config: JsValue) -> Result<ParticleConfig, Error> {
    if config.is_undefined() || config.is_null() {
        return Ok(ParticleConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(config)?)
}

/// Decorative particle canvas mounted behind the content of a container element.
#[wasm_bindgen]
pub struct ParticleBackground {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl ParticleBackground {
    /// Mounts the canvas and starts animating. A bad config is an error; a
    /// missing container or drawing context leaves an inert background.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config: JsValue) -> Result<ParticleBackground, JsValue> {
        let config = parse_config(config)?;
        let mounted = match Mounted::mount(container_id, config) {
            Ok(mounted) => Some(mounted),
            Err(err) => {
                log::warn!("particle background disabled: {}", err);
                None
            }
        };
        let background = ParticleBackground { mounted };
        background.start();
        Ok(background)
    }

    pub fn start(&self) {
        if let Some(mounted) = &self.mounted {
            mounted.frame_loop.start();
        }
    }

    pub fn stop(&self) {
        if let Some(mounted) = &self.mounted {
            mounted.resume_on_visible.set(false);
            mounted.frame_loop.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.mounted
            .as_ref()
            .map_or(false, |mounted| mounted.frame_loop.is_running())
    }

    pub fn is_active(&self) -> bool {
        self.mounted.is_some()
    }

    /// Stops the loop, unregisters every listener and removes the canvas.
    pub fn destroy(&mut self) {
        self.mounted = None;
    }

    pub fn particle_count(&self) -> usize {
        self.mounted
            .as_ref()
            .map_or(0, |mounted| mounted.scene.borrow().simulation.particles().len())
    }

    pub fn frames(&self) -> f64 {
        self.mounted
            .as_ref()
            .map_or(0.0, |mounted| mounted.frame_loop.frames() as f64)
    }

    /// Current particles as plain JS objects.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        match &self.mounted {
            Some(mounted) => {
                let scene = mounted.scene.borrow();
                Ok(serde_wasm_bindgen::to_value(scene.simulation.particles())?)
            }
            None => Ok(js_sys::Array::new().into()),
        }
    }

    /// Resizes the surface right away, bypassing the resize debounce.
    pub fn resize(&self, width: u32, height: u32) {
        if let Some(mounted) = &self.mounted {
            let mut scene = mounted.scene.borrow_mut();
            scene.pending_size = None;
            scene.apply_size(width, height);
        }
    }

    pub fn set_cursor(&self, x: f64, y: f64) {
        if let Some(mounted) = &self.mounted {
            mounted.scene.borrow_mut().simulation.set_cursor(x, y);
        }
    }

    pub fn clear_cursor(&self) {
        if let Some(mounted) = &self.mounted {
            mounted.scene.borrow_mut().simulation.clear_cursor();
        }
    }
}
