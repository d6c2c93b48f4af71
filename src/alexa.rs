//! Bindings to the host's `Alexa` JavaScript SDK (Alexa Web API for Games).
//! Only compiled against the browser; the SDK script must be loaded by the page.

use js_sys::{Function, JSON, Object, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::message::{OutboundMessage, SendResult};
use crate::session::{MicrophoneCallbacks, SessionOutcome, SkillChannel};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = Alexa, js_name = create)]
    fn alexa_create(config: &JsValue) -> Result<Promise, JsValue>;

    /// Client handle resolved by `Alexa.create`.
    #[derive(Clone)]
    pub type AlexaClient;

    #[wasm_bindgen(method, getter)]
    fn skill(this: &AlexaClient) -> SkillApi;

    #[wasm_bindgen(method, getter)]
    fn voice(this: &AlexaClient) -> VoiceApi;

    type SkillApi;

    #[wasm_bindgen(method, js_name = onMessage)]
    fn on_message(this: &SkillApi, callback: &Function);

    #[wasm_bindgen(method, js_name = sendMessage)]
    fn send_message(this: &SkillApi, message: &JsValue, callback: &Function);

    type VoiceApi;

    #[wasm_bindgen(method, js_name = requestMicrophoneOpen)]
    fn request_microphone_open(this: &VoiceApi, callbacks: &JsValue);
}

/// Convert a JS value into JSON for logging and schema checks. Values that do
/// not survive `JSON.stringify` fall back to their string form.
pub fn js_to_json(value: &JsValue) -> Value {
    if value.is_undefined() || value.is_null() {
        return Value::Null;
    }
    if let Some(s) = value.as_string() {
        return Value::String(s);
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return Value::String(String::from(err.to_string()));
    }
    JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_else(|| Value::String(format!("{value:?}")))
}

fn json_to_js(value: &Value) -> JsValue {
    JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn set_js(obj: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), value);
}

impl SkillChannel for AlexaClient {
    fn on_message(&self, mut handler: Box<dyn FnMut(Value)>) {
        let closure = Closure::wrap(Box::new(move |message: JsValue| {
            handler(js_to_json(&message));
        }) as Box<dyn FnMut(JsValue)>);
        self.skill().on_message(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn send_message(&self, payload: &OutboundMessage, on_result: Box<dyn FnOnce(SendResult)>) {
        let callback = Closure::once_into_js(move |result: JsValue| {
            on_result(SendResult::from_value(js_to_json(&result)));
        });
        self.skill()
            .send_message(&json_to_js(&payload.to_value()), callback.unchecked_ref());
    }

    fn request_microphone_open(&self, callbacks: MicrophoneCallbacks) {
        let MicrophoneCallbacks { on_opened, on_closed, on_error } = callbacks;
        let obj = Object::new();
        set_js(&obj, "onOpened", &Closure::once_into_js(move || on_opened()));
        set_js(&obj, "onClosed", &Closure::once_into_js(move || on_closed()));
        set_js(
            &obj,
            "onError",
            &Closure::once_into_js(move |err: JsValue| on_error(js_to_json(&err))),
        );
        self.voice().request_microphone_open(&obj);
    }
}

/// `Alexa.create({ version })`, awaited once.
pub async fn create_session(version: &str) -> SessionOutcome<AlexaClient> {
    let config = Object::new();
    set_js(&config, "version", &JsValue::from_str(version));
    let promise = match alexa_create(&config) {
        Ok(p) => p,
        Err(err) => return SessionOutcome::Unavailable(js_to_json(&err)),
    };
    let args = match JsFuture::from(promise).await {
        Ok(args) => args,
        Err(err) => return SessionOutcome::Unavailable(js_to_json(&err)),
    };
    let field = |name: &str| Reflect::get(&args, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);
    let client = field("alexa");
    if client.is_undefined() || client.is_null() {
        let code = field("code");
        let code = code.as_string().or_else(|| code.as_f64().map(|c| c.to_string()));
        return SessionOutcome::Failed { code };
    }
    SessionOutcome::Ready { client: client.unchecked_into(), initial: js_to_json(&field("message")) }
}
