// Timestamp driven debouncer. Events are recorded with `trigger`, the frame
// loop calls `poll` and gets `true` once no event arrived for `delay_ms`.

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Debounce {
    delay_ms: f64,
    last_event: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Debounce {
            delay_ms: delay_ms.max(0.0),
            last_event: None,
        }
    }

    pub fn trigger(&mut self, now_ms: f64) {
        self.last_event = Some(now_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.last_event {
            Some(at) if now_ms - at >= self.delay_ms => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}
