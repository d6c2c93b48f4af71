//! Skill session: single-write client handle, inbound dispatch, outbound sends
//! and microphone requests. Every failure ends up in the debug log.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::debug::DebugLog;
use crate::message::{InboundMessage, OutboundMessage, SendResult, extract_wake_word};

/// Callbacks handed to the host's microphone request.
pub struct MicrophoneCallbacks {
    pub on_opened: Box<dyn FnOnce()>,
    pub on_closed: Box<dyn FnOnce()>,
    pub on_error: Box<dyn FnOnce(Value)>,
}

/// Capabilities of an established skill session.
pub trait SkillChannel {
    fn on_message(&self, handler: Box<dyn FnMut(Value)>);
    fn send_message(&self, payload: &OutboundMessage, on_result: Box<dyn FnOnce(SendResult)>);
    fn request_microphone_open(&self, callbacks: MicrophoneCallbacks);
}

/// Result of asking the host for a session.
pub enum SessionOutcome<C> {
    /// Session granted, with the initial data the skill sent along.
    Ready { client: C, initial: Value },
    /// Host answered without a client; `code` explains why.
    Failed { code: Option<String> },
    /// The request itself failed (rejected promise, missing SDK).
    Unavailable(Value),
}

pub struct SessionManager<C, L> {
    client: OnceCell<C>,
    log: Rc<L>,
    wake_word: RefCell<String>,
    roar_phrase: String,
    on_roar: Box<dyn Fn()>,
}

impl<C: SkillChannel + 'static, L: DebugLog + 'static> SessionManager<C, L> {
    pub fn new(
        log: Rc<L>,
        default_wake_word: &str,
        roar_phrase: &str,
        on_roar: Box<dyn Fn()>,
    ) -> Self {
        Self {
            client: OnceCell::new(),
            log,
            wake_word: RefCell::new(default_wake_word.to_string()),
            roar_phrase: roar_phrase.to_string(),
            on_roar,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.client.get().is_some()
    }

    pub fn wake_word(&self) -> String {
        self.wake_word.borrow().clone()
    }

    /// Apply the outcome of session creation. Returns true when a client was
    /// installed; the caller then renders the hints for [`Self::wake_word`].
    pub fn establish(self: &Rc<Self>, outcome: SessionOutcome<C>) -> bool {
        match outcome {
            SessionOutcome::Ready { client, initial } => {
                let weak: Weak<Self> = Rc::downgrade(self);
                client.on_message(Box::new(move |value| {
                    if let Some(manager) = weak.upgrade() {
                        manager.handle_inbound(value);
                    }
                }));
                if self.client.set(client).is_err() {
                    log::warn!("skill session already established; ignoring second client");
                    return false;
                }
                self.log.print("Alexa is ready :) Received initial data:");
                self.log.print_value(&initial);
                self.adopt_wake_word(&initial);
                true
            }
            SessionOutcome::Failed { code } => {
                let code = code.unwrap_or_else(|| "undefined".to_string());
                self.log.print(&format!("Alexa failed to initialize, code: {code}"));
                false
            }
            SessionOutcome::Unavailable(reason) => {
                self.log.print("Alexa not ready :(");
                self.log.print_value(&reason);
                false
            }
        }
    }

    fn adopt_wake_word(&self, initial: &Value) {
        let hint = match InboundMessage::from_value(initial) {
            Ok(msg) => msg.hint,
            Err(err) => {
                log::debug!("initial data does not match the message schema: {err}");
                None
            }
        };
        if let Some(word) = hint.as_deref().and_then(extract_wake_word) {
            self.log.print(&format!("discovered wake word: {word}"));
            *self.wake_word.borrow_mut() = word.to_string();
        }
    }

    /// Inbound payload from the skill. Returns true when it triggered the roar.
    pub fn handle_inbound(&self, value: Value) -> bool {
        self.log.print("received a message from the skill endpoint");
        self.log.print_value(&value);
        match InboundMessage::from_value(&value) {
            Ok(msg) if msg.is_phrase(&self.roar_phrase) => {
                (self.on_roar)();
                true
            }
            Ok(_) => false,
            Err(err) => {
                self.log.print(&format!("ignoring malformed skill message: {err}"));
                false
            }
        }
    }

    /// Forward a payload to the skill. Dropped (not queued) without a session.
    pub fn send_message(&self, msg: &OutboundMessage) {
        self.log.print("sending message to skill endpoint:");
        self.log.print_value(&msg.to_value());
        let Some(client) = self.client.get() else {
            self.log.print("Alexa was not ready, could not send message:");
            self.log.print_value(&msg.to_value());
            return;
        };
        let log = self.log.clone();
        client.send_message(
            msg,
            Box::new(move |result| {
                if result.is_success() {
                    log.print("message was sent to backend successfully");
                } else {
                    log.print("failed to send message to skill backend:");
                }
                log.print_value(&result.raw);
            }),
        );
    }

    pub fn open_microphone(&self) {
        let Some(client) = self.client.get() else {
            self.log.print("cannot open the microphone, Alexa is not ready");
            return;
        };
        self.log.print("requesting the microphone open");
        let (opened, closed, failed) = (self.log.clone(), self.log.clone(), self.log.clone());
        client.request_microphone_open(MicrophoneCallbacks {
            on_opened: Box::new(move || opened.print("the microphone was opened")),
            on_closed: Box::new(move || closed.print("the microphone was closed")),
            on_error: Box::new(move |err| {
                failed.print("failed to open the microphone:");
                failed.print_value(&err);
            }),
        });
    }
}
