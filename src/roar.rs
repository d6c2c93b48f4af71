//! Roar effect: a sound clip plus a background-position sweep over a sprite strip.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlAudioElement, HtmlElement, window};

use crate::config::{CompanionConfig, RoarStopPolicy};
use crate::error::CompanionError;

/// Position counter for the sweep. Yields `start, start+step, .., max` and then
/// wraps back to `start`; the counter never exceeds `max`.
#[derive(Clone, Copy, Debug)]
pub struct RoarSweep {
    start: u32,
    step: u32,
    max: u32,
    position: u32,
    ticks: u32,
}

impl RoarSweep {
    pub fn new(start: u32, step: u32, max: u32) -> Self {
        Self { start, step: step.max(1), max: max.max(start), position: start, ticks: 0 }
    }

    /// Offset to write on this tick; advances the counter.
    pub fn tick(&mut self) -> u32 {
        let offset = self.position;
        if self.position < self.max {
            self.position = (self.position + self.step).min(self.max);
        } else {
            self.position = self.start;
        }
        self.ticks += 1;
        offset
    }

    /// Number of distinct offsets before the sweep wraps.
    pub fn frames_per_pass(&self) -> u32 {
        (self.max - self.start).div_ceil(self.step) + 1
    }

    pub fn pass_finished(&self) -> bool {
        self.ticks >= self.frames_per_pass()
    }

    pub fn reset(&mut self) {
        self.position = self.start;
        self.ticks = 0;
    }
}

/// CSS `background-position` value for a sweep offset.
pub fn background_position(offset: u32) -> String {
    format!("-{offset}px 0px")
}

struct SweepTarget {
    element: HtmlElement,
    sweep: RefCell<RoarSweep>,
    interval: Cell<Option<i32>>,
}

impl SweepTarget {
    fn set_visible(&self, visible: bool) {
        let value = if visible { "visible" } else { "hidden" };
        if let Err(err) = self.element.style().set_property("visibility", value) {
            log::warn!("cannot set roar visibility: {err:?}");
        }
    }

    fn halt(&self) {
        if let (Some(id), Some(w)) = (self.interval.take(), window()) {
            w.clear_interval_with_handle(id);
        }
        self.set_visible(false);
    }
}

/// Plays the roar clip and runs the sweep. At most one sweep runs at a time.
pub struct RoarEffect {
    audio: HtmlAudioElement,
    target: Rc<SweepTarget>,
    interval_ms: u32,
    policy: RoarStopPolicy,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl RoarEffect {
    /// Looks up the sweep element and hides it.
    pub fn new(
        doc: &web_sys::Document,
        config: &CompanionConfig,
    ) -> Result<Self, CompanionError> {
        let element: HtmlElement = doc
            .get_element_by_id(&config.roar_element_id)
            .ok_or_else(|| CompanionError::MissingElement(config.roar_element_id.clone()))?
            .dyn_into()
            .map_err(|_| CompanionError::WrongElementType(config.roar_element_id.clone()))?;
        let audio = HtmlAudioElement::new_with_src(&config.roar_audio_src)?;
        let target = Rc::new(SweepTarget {
            element,
            sweep: RefCell::new(RoarSweep::new(config.roar_start, config.roar_step, config.roar_max)),
            interval: Cell::new(None),
        });
        target.set_visible(false);
        Ok(Self {
            audio,
            target,
            interval_ms: config.roar_interval_ms,
            policy: config.roar_stop_policy,
            tick: RefCell::new(None),
        })
    }

    pub fn policy(&self) -> RoarStopPolicy {
        self.policy
    }

    pub fn is_running(&self) -> bool {
        self.target.interval.get().is_some()
    }

    /// Sound plus sweep. Under [`RoarStopPolicy::Immediate`] the sweep is
    /// stopped right after it starts.
    pub fn trigger(&self) {
        if let Err(err) = self.audio.play() {
            log::debug!("roar playback failed: {err:?}");
        }
        if let Err(err) = self.start() {
            log::warn!("roar sweep did not start: {err}");
            return;
        }
        if self.policy == RoarStopPolicy::Immediate {
            self.stop();
        }
    }

    pub fn start(&self) -> Result<(), CompanionError> {
        let win = window().ok_or(CompanionError::MissingWindow)?;
        let period = i32::try_from(self.interval_ms).map_err(|_| {
            CompanionError::InvalidConfig(format!("roar interval {}ms is too long", self.interval_ms))
        })?;
        // Replacing a running sweep: cancel its timer first.
        self.target.halt();
        self.target.sweep.borrow_mut().reset();
        self.target.set_visible(true);

        let target = self.target.clone();
        let auto_stop = self.policy == RoarStopPolicy::AfterSweep;
        let closure = Closure::wrap(Box::new(move || {
            if auto_stop && target.sweep.borrow().pass_finished() {
                target.halt();
                return;
            }
            let offset = target.sweep.borrow_mut().tick();
            if let Err(err) = target
                .element
                .style()
                .set_property("background-position", &background_position(offset))
            {
                log::warn!("cannot move roar sweep: {err:?}");
            }
        }) as Box<dyn FnMut()>);
        let id = win.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period,
        )?;
        self.target.interval.set(Some(id));
        // The previous closure's interval is already cleared, so dropping it here is safe.
        *self.tick.borrow_mut() = Some(closure);
        Ok(())
    }

    pub fn stop(&self) {
        self.target.halt();
    }
}
