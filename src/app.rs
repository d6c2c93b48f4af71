//! Page wiring: builds the companion context, starts the idle loop on sprite
//! load, negotiates the skill session after the first frame and binds buttons.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, window};

use crate::alexa::{self, AlexaClient};
use crate::config::CompanionConfig;
use crate::debug::{DebugLog, DomDebugSink};
use crate::error::CompanionError;
use crate::idle::{AnimationCycle, FrameDivider, IdleLoop, start_idle_loop};
use crate::input::bind_button;
use crate::message::{OutboundMessage, hints_html};
use crate::roar::RoarEffect;
use crate::session::SessionManager;
use crate::sprite::{FrameRenderer, SpriteSheet};

pub type Session = SessionManager<AlexaClient, DomDebugSink>;

/// Everything the page's handlers share. Created once per page.
pub struct Companion {
    pub config: CompanionConfig,
    pub sink: Rc<DomDebugSink>,
    pub roar: Rc<RoarEffect>,
    pub session: Rc<Session>,
}

thread_local! {
    static COMPANION: RefCell<Option<Rc<Companion>>> = const { RefCell::new(None) };
}

/// The running companion, if `start` has completed.
pub fn current() -> Option<Rc<Companion>> {
    COMPANION.with(|c| c.borrow().clone())
}

pub fn start(config: CompanionConfig) -> Result<(), CompanionError> {
    config.validate()?;
    let win = window().ok_or(CompanionError::MissingWindow)?;
    let doc = win.document().ok_or(CompanionError::MissingDocument)?;

    let sink = Rc::new(DomDebugSink::from_document(&doc, &config.debug_element_id)?);
    let roar = Rc::new(RoarEffect::new(&doc, &config)?);
    preload_sprite(&doc, &config)?;

    let session = {
        let roar = roar.clone();
        Rc::new(Session::new(
            sink.clone(),
            &config.default_wake_word,
            &config.roar_phrase,
            Box::new(move || roar.trigger()),
        ))
    };

    {
        let session = session.clone();
        bind_button(
            &doc,
            &config.hello_button_id,
            Rc::new(move || session.send_message(&OutboundMessage::hello(js_sys::Date::now()))),
        )?;
    }
    {
        let session = session.clone();
        bind_button(&doc, &config.mic_button_id, Rc::new(move || session.open_microphone()))?;
    }

    let companion = Rc::new(Companion { config, sink, roar, session });
    COMPANION.with(|c| c.replace(Some(companion.clone())));

    // Session negotiation waits for the first frame so it does not delay first paint.
    let closure = Closure::once_into_js(move |_ts: f64| {
        wasm_bindgen_futures::spawn_local(begin_session(companion));
    });
    win.request_animation_frame(closure.unchecked_ref())?;
    Ok(())
}

fn preload_sprite(doc: &Document, config: &CompanionConfig) -> Result<(), CompanionError> {
    let canvas: HtmlCanvasElement = doc
        .query_selector(&config.canvas_selector)?
        .ok_or_else(|| CompanionError::MissingElement(config.canvas_selector.clone()))?
        .dyn_into()
        .map_err(|_| CompanionError::WrongElementType(config.canvas_selector.clone()))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(CompanionError::MissingContext)?
        .dyn_into()
        .map_err(|_| CompanionError::MissingContext)?;
    let cycle = AnimationCycle::new(config.idle_cycle.clone())
        .ok_or_else(|| CompanionError::InvalidConfig("idle cycle is empty".into()))?;
    let idle = IdleLoop::new(FrameDivider::new(config.idle_divisor), cycle);
    let sheet = SpriteSheet::new(config.frame_width, config.frame_height, config.frame_scale);

    let image = HtmlImageElement::new()?;
    let renderer = FrameRenderer::new(canvas, ctx, image.clone(), sheet);
    let driver = config.idle_driver;
    let onload = Closure::once_into_js(move || {
        if let Err(err) = start_idle_loop(idle, renderer, driver) {
            log::warn!("idle loop did not start: {err}");
        }
    });
    image.set_onload(Some(onload.unchecked_ref()));
    image.set_src(&config.sprite_src);
    Ok(())
}

async fn begin_session(companion: Rc<Companion>) {
    companion.sink.print("Beginning Alexa.create");
    let outcome = alexa::create_session(&companion.config.sdk_version).await;
    if companion.session.establish(outcome) {
        render_hints(&companion);
    }
}

fn render_hints(companion: &Companion) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    match doc.get_element_by_id(&companion.config.hints_element_id) {
        Some(el) => el.set_inner_html(&hints_html(&companion.session.wake_word())),
        None => log::warn!("no '{}' element for hints", companion.config.hints_element_id),
    }
}
