//! Idle animation: a frame-rate divider over a repeating cycle of sprite columns.
//!
//! The loop never stops once started. With [`IdleDriver::AnimationFrame`] the
//! animation speed depends on the display refresh rate (one render every
//! `divisor` frames); [`IdleDriver::Interval`] is the fallback for hosts without
//! `requestAnimationFrame` and renders every `divisor * period_ms` milliseconds.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::config::IdleDriver;
use crate::error::CompanionError;
use crate::sprite::FrameRenderer;

/// Ordered, repeating sequence of frame columns with a wrapping cursor.
#[derive(Clone, Debug)]
pub struct AnimationCycle {
    frames: Vec<u32>,
    cursor: usize,
}

impl AnimationCycle {
    /// Returns `None` for an empty sequence, which would leave the cursor without a valid index.
    pub fn new(frames: Vec<u32>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self { frames, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> u32 {
        self.frames[self.cursor]
    }

    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.frames.len();
    }
}

/// Fires once every `divisor` ticks.
#[derive(Clone, Copy, Debug)]
pub struct FrameDivider {
    divisor: u32,
    count: u32,
}

impl FrameDivider {
    pub fn new(divisor: u32) -> Self {
        Self { divisor: divisor.max(1), count: 0 }
    }

    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count < self.divisor {
            return false;
        }
        self.count = 0;
        true
    }
}

/// Pure idle-loop state: which column (if any) to render on a host tick.
#[derive(Clone, Debug)]
pub struct IdleLoop {
    divider: FrameDivider,
    cycle: AnimationCycle,
}

impl IdleLoop {
    pub fn new(divider: FrameDivider, cycle: AnimationCycle) -> Self {
        Self { divider, cycle }
    }

    /// Advance by one host callback. Returns the column to draw when the
    /// divider fires, moving the cycle cursor forward.
    pub fn on_host_tick(&mut self) -> Option<u32> {
        if !self.divider.tick() {
            return None;
        }
        let col = self.cycle.current();
        self.cycle.advance();
        Some(col)
    }

    pub fn cycle(&self) -> &AnimationCycle {
        &self.cycle
    }
}

fn render_tick(idle: &RefCell<IdleLoop>, renderer: &FrameRenderer) {
    if let Some(col) = idle.borrow_mut().on_host_tick() {
        renderer.clear();
        renderer.draw_frame(col, 0, 0.0, 0.0);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Start driving `idle` with the chosen scheduling primitive. Runs for the page lifetime.
pub fn start_idle_loop(
    idle: IdleLoop,
    renderer: FrameRenderer,
    driver: IdleDriver,
) -> Result<(), CompanionError> {
    let win = window().ok_or(CompanionError::MissingWindow)?;
    let idle = Rc::new(RefCell::new(idle));
    let renderer = Rc::new(renderer);
    match driver {
        IdleDriver::AnimationFrame => {
            let f: FrameCallback = Rc::new(RefCell::new(None));
            let g = f.clone();
            *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
                render_tick(&idle, &renderer);
                if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
                    let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
                }
            }) as Box<dyn FnMut(f64)>));
            if let Some(cb) = g.borrow().as_ref() {
                win.request_animation_frame(cb.as_ref().unchecked_ref())?;
            }
        }
        IdleDriver::Interval { period_ms } => {
            let period = i32::try_from(period_ms).map_err(|_| {
                CompanionError::InvalidConfig(format!("idle interval {period_ms}ms is too long"))
            })?;
            let closure = Closure::wrap(Box::new(move || {
                render_tick(&idle, &renderer);
            }) as Box<dyn FnMut()>);
            win.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period,
            )?;
            closure.forget();
        }
    }
    Ok(())
}
