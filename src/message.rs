//! Skill message schema, send results, and wake-word discovery.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload pushed by the skill backend. Only `userSpeech` and `hint` are
/// inspected, each on its own: a known field with an unexpected type is left
/// in `extra` and reads as absent. Every other field is kept in `extra` untouched.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct InboundMessage {
    #[serde(rename = "userSpeech", skip_serializing_if = "Option::is_none")]
    pub user_speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InboundMessage {
    /// Validate a raw payload. `null` (no initial data) maps to an empty
    /// message; anything but an object is rejected.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let mut extra = Map::<String, Value>::deserialize(value)?;
        let user_speech = take_string(&mut extra, "userSpeech");
        let hint = take_string(&mut extra, "hint");
        Ok(Self { user_speech, hint, extra })
    }

    pub fn is_phrase(&self, phrase: &str) -> bool {
        self.user_speech.as_deref() == Some(phrase)
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Open key-value payload sent to the skill backend.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct OutboundMessage(pub Map<String, Value>);

impl OutboundMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Payload sent by the hello button.
    pub fn hello(now_ms: f64) -> Self {
        Self::new().with("speech", "Hello world").with("time", now_ms as u64)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Completion object handed back by the host after a send.
#[derive(Clone, Debug, PartialEq)]
pub struct SendResult {
    pub status_code: Option<u16>,
    pub raw: Value,
}

impl SendResult {
    pub fn from_value(raw: Value) -> Self {
        let status_code = raw
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok());
        Self { status_code, raw }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == Some(200)
    }
}

fn wake_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)try\s+"([A-Za-z0-9_]*),"#).expect("static wake word pattern")
    })
}

/// Wake word named in a greeting hint such as `Try saying "Computer, Hello"`.
/// An empty word before the comma (`try ", hello"`) is still a match.
pub fn extract_wake_word(hint: &str) -> Option<&str> {
    wake_word_pattern()
        .captures(hint)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Markup for the hints region. The wake word only ever holds word characters.
pub fn hints_html(wake_word: &str) -> String {
    format!(
        "<p>Try saying <i>\"{wake_word}, Hello\"</i>,</p>\n\
         <p>or <i>\"{wake_word}, can you repeat...\"</i> followed by something you'd like Alexa to say.</p>"
    )
}
