use web_sys::console;

pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

pub fn init_logger() {
    #[cfg(target_arch = "wasm32")]
    {
        // A second call only reports that a logger is already installed
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

// console.time / console.timeEnd pair around a scope, only when profiling
pub struct Timer<'a> {
    name: &'a str,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Timer<'a> {
        console::time_with_label(name);
        Timer { name }
    }

    pub fn start_if(enabled: bool, name: &'a str) -> Option<Timer<'a>> {
        if enabled {
            Some(Timer::new(name))
        } else {
            None
        }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        console::time_end_with_label(self.name);
    }
}
