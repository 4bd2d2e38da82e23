// requestAnimationFrame driven loop with an explicit start/stop lifecycle.
// `Ticker` is the host independent state machine, `AnimationLoop` wires it to
// the browser.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

#[derive(Debug)]
pub struct Ticker {
    state: LoopState,
    frames: u64,
    faults: u32,
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker {
            state: LoopState::Stopped,
            frames: 0,
            faults: 0,
        }
    }
}

impl Ticker {
    /// Returns true when this call moved the loop into `Running`.
    pub fn start(&mut self) -> bool {
        let was_stopped = self.state == LoopState::Stopped;
        self.state = LoopState::Running;
        was_stopped
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Gate at the top of every frame callback. A stopped ticker refuses the frame.
    pub fn begin_frame(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn fail(&mut self) {
        self.faults += 1;
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }
}

struct Shared {
    ticker: Ticker,
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

pub struct AnimationLoop {
    shared: Rc<RefCell<Shared>>,
}

impl AnimationLoop {
    /// `frame` receives the requestAnimationFrame timestamp. An `Err` stops the loop.
    pub fn new<F>(mut frame: F) -> AnimationLoop
    where
        F: FnMut(f64) -> Result<(), Error> + 'static,
    {
        let shared = Rc::new(RefCell::new(Shared {
            ticker: Ticker::default(),
            handle: None,
            callback: None,
        }));

        let weak = Rc::downgrade(&shared);
        let callback = Closure::wrap(Box::new(move |timestamp: f64| {
            let shared = match weak.upgrade() {
                Some(shared) => shared,
                None => return,
            };
            {
                let mut state = shared.borrow_mut();
                state.handle = None;
                if !state.ticker.begin_frame() {
                    return;
                }
            }

            if let Err(err) = frame(timestamp) {
                log::error!("particle frame failed, stopping animation loop: {}", err);
                shared.borrow_mut().ticker.fail();
                return;
            }

            if shared.borrow().ticker.is_running() {
                request_frame(&Rc::downgrade(&shared));
            }
        }) as Box<dyn FnMut(f64)>);

        shared.borrow_mut().callback = Some(callback);
        AnimationLoop { shared }
    }

    pub fn start(&self) {
        let started = self.shared.borrow_mut().ticker.start();
        if started {
            log::debug!("animation loop started");
            request_frame(&Rc::downgrade(&self.shared));
        }
    }

    /// No frame body runs after this returns.
    pub fn stop(&self) {
        let mut state = self.shared.borrow_mut();
        state.ticker.stop();
        if let Some(handle) = state.handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.borrow().ticker.is_running()
    }

    pub fn frames(&self) -> u64 {
        self.shared.borrow().ticker.frames()
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(shared: &Weak<RefCell<Shared>>) {
    let shared = match shared.upgrade() {
        Some(shared) => shared,
        None => return,
    };
    let window = match web_sys::window() {
        Some(window) => window,
        None => {
            log::warn!("no window to schedule animation frames on");
            shared.borrow_mut().ticker.fail();
            return;
        }
    };

    let requested = {
        let state = shared.borrow();
        match state.callback.as_ref() {
            Some(callback) => window.request_animation_frame(callback.as_ref().unchecked_ref()),
            None => return,
        }
    };
    match requested {
        Ok(handle) => shared.borrow_mut().handle = Some(handle),
        Err(err) => {
            log::error!("requestAnimationFrame failed: {}", Error::from(err));
            shared.borrow_mut().ticker.fail();
        }
    }
}
