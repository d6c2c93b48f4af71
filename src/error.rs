//! Setup-time errors. Runtime failures of the skill session (send failures,
//! microphone errors, missing session) never become errors; they are written
//! to the debug sink instead.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("no window")]
    MissingWindow,
    #[error("no document")]
    MissingDocument,
    #[error("missing element '{0}'")]
    MissingElement(String),
    #[error("element '{0}' has an unexpected type")]
    WrongElementType(String),
    #[error("canvas has no 2d context")]
    MissingContext,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for CompanionError {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| format!("{value:?}"));
        CompanionError::Js(text)
    }
}

impl From<CompanionError> for JsValue {
    fn from(err: CompanionError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
