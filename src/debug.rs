//! On-screen debug log mirrored to the browser console.

use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::error::CompanionError;

/// Text for a logged value: strings verbatim, everything else pretty JSON.
pub fn format_entry(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Destination for human-readable diagnostics.
pub trait DebugLog {
    /// Write one already formatted entry.
    fn append(&self, text: &str);

    fn print(&self, msg: &str) {
        self.append(msg);
    }

    fn print_value(&self, value: &Value) {
        self.append(&format_entry(value));
    }
}

/// Debug sink backed by a scrollable DOM element.
pub struct DomDebugSink {
    element: Element,
}

impl DomDebugSink {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn from_document(doc: &Document, id: &str) -> Result<Self, CompanionError> {
        doc.get_element_by_id(id)
            .map(Self::new)
            .ok_or_else(|| CompanionError::MissingElement(id.to_string()))
    }
}

impl DebugLog for DomDebugSink {
    fn append(&self, text: &str) {
        if let Err(err) = self.element.append_with_str_2(text, "\n") {
            log::warn!("debug element rejected text: {err:?}");
        }
        self.element.set_scroll_top(self.element.scroll_height());
        web_sys::console::log_1(&JsValue::from_str(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Lines(RefCell<Vec<String>>);

    impl DebugLog for Lines {
        fn append(&self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    #[test]
    fn strings_are_written_verbatim() {
        assert_eq!(format_entry(&json!("hello")), "hello");
    }

    #[test]
    fn objects_are_pretty_printed_with_two_spaces() {
        assert_eq!(format_entry(&json!({"a": 1})), "{\n  \"a\": 1\n}");
        assert_eq!(format_entry(&Value::Null), "null");
    }

    #[test]
    fn provided_methods_route_through_append() {
        let lines = Lines::default();
        lines.print("one");
        lines.print_value(&json!([1]));
        assert_eq!(*lines.0.borrow(), vec!["one".to_string(), "[\n  1\n]".to_string()]);
    }
}
