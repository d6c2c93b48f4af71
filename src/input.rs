//! Press bindings for the on-screen buttons.
//!
//! Touch devices add a long-press delay before synthesizing mouse events, so
//! presses are handled on `touchstart` directly with `preventDefault()`, which
//! also suppresses the duplicate synthetic `mousedown`. `mousedown` stays bound
//! for desktop testing. Handlers are not re-entrancy guarded.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Document;

use crate::error::CompanionError;

pub fn bind_button(doc: &Document, id: &str, action: Rc<dyn Fn()>) -> Result<(), CompanionError> {
    let element = doc
        .get_element_by_id(id)
        .ok_or_else(|| CompanionError::MissingElement(id.to_string()))?;

    {
        let action = action.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            action();
        }) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
            action();
            evt.prevent_default();
        }) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}
