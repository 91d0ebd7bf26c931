use std::time::{Duration, Instant};

/// Keys the page cares about. Anything else is kept as its raw name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    Other(String),
}

impl Key {
    /// Accepts `KeyboardEvent.key` values (`" "` is Space) as well as key names.
    pub fn parse(value: &str) -> Key {
        if value == " " {
            return Key::Space;
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "space" | "spacebar" => Key::Space,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            _ => Key::Other(value.trim().to_string()),
        }
    }

    // legacy KeyboardEvent.keyCode values
    pub fn from_code(code: u32) -> Key {
        match code {
            13 => Key::Enter,
            32 => Key::Space,
            27 => Key::Escape,
            9 => Key::Tab,
            other => Key::Other(other.to_string()),
        }
    }
}

pub fn is_activation_event(key: &Key) -> bool {
    matches!(key, Key::Enter | Key::Space)
}

/// Position of an element relative to the viewport, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

// true once the element's top edge has reached the bottom of the viewport
pub fn element_is_at_the_bottom(rect: ElementRect, viewport_height: f64) -> bool {
    rect.top - viewport_height <= 0.0
}

pub fn next_page_is_available(list_len: usize, page_number: usize, page_size: usize) -> bool {
    page_number.saturating_mul(page_size) < list_len
}

pub fn page_count(list_len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    list_len.div_ceil(page_size)
}

/// Rate-limited handler produced by [`throttle`].
///
/// The first call in a window runs the handler immediately. Calls landing
/// inside the window only mark a trailing call as pending; however many there
/// were, the handler runs once more when the window closes ([`Throttled::flush`]).
#[derive(Debug)]
pub struct Throttled<F> {
    handler: F,
    interval: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

pub fn throttle<F>(handler: F, interval: Duration) -> Throttled<F> {
    Throttled {
        handler,
        interval,
        last_run: None,
        pending: false,
    }
}

impl<F> Throttled<F> {
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Instant at which the pending trailing call becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_run.map(|last| last + self.interval)
    }

    fn window_open(&self, now: Instant) -> bool {
        match self.last_run {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    // returns whether the handler ran
    pub fn call<C>(&mut self, now: Instant, ctx: &mut C) -> bool
    where
        F: FnMut(&mut C),
    {
        if self.window_open(now) {
            self.run(now, ctx);
            return true;
        }
        self.pending = true;
        false
    }

    pub fn flush<C>(&mut self, now: Instant, ctx: &mut C) -> bool
    where
        F: FnMut(&mut C),
    {
        if !self.pending || !self.window_open(now) {
            return false;
        }
        self.run(now, ctx);
        true
    }

    fn run<C>(&mut self, now: Instant, ctx: &mut C)
    where
        F: FnMut(&mut C),
    {
        self.last_run = Some(now);
        self.pending = false;
        (self.handler)(ctx);
    }
}
