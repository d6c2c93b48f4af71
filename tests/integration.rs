// Integration tests (native) for the `dragon-companion` crate.
// These tests avoid wasm-specific functionality and drive the session manager
// through stub channels so they can run under `cargo test` on the host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dragon_companion::debug::DebugLog;
use dragon_companion::message::{OutboundMessage, SendResult};
use dragon_companion::session::{MicrophoneCallbacks, SessionManager, SessionOutcome, SkillChannel};
use serde_json::{Value, json};

#[derive(Default)]
struct RecordingLog(RefCell<Vec<String>>);

impl RecordingLog {
    fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    fn count(&self, needle: &str) -> usize {
        self.0.borrow().iter().filter(|l| l.contains(needle)).count()
    }
}

impl DebugLog for RecordingLog {
    fn append(&self, text: &str) {
        self.0.borrow_mut().push(text.to_string());
    }
}

#[derive(Clone, Default)]
struct StubChannel {
    sent: Rc<RefCell<Vec<Value>>>,
    status: u16,
    mic_requests: Rc<Cell<u32>>,
}

impl SkillChannel for StubChannel {
    fn on_message(&self, _handler: Box<dyn FnMut(Value)>) {}

    fn send_message(&self, payload: &OutboundMessage, on_result: Box<dyn FnOnce(SendResult)>) {
        self.sent.borrow_mut().push(payload.to_value());
        on_result(SendResult::from_value(json!({ "statusCode": self.status })));
    }

    fn request_microphone_open(&self, callbacks: MicrophoneCallbacks) {
        self.mic_requests.set(self.mic_requests.get() + 1);
        (callbacks.on_opened)();
        (callbacks.on_closed)();
    }
}

type Manager = SessionManager<StubChannel, RecordingLog>;

fn new_manager() -> (Rc<Manager>, Rc<RecordingLog>, Rc<Cell<u32>>) {
    let log = Rc::new(RecordingLog::default());
    let roars = Rc::new(Cell::new(0));
    let counter = roars.clone();
    let manager = SessionManager::new(
        log.clone(),
        "Alexa",
        "roar",
        Box::new(move || counter.set(counter.get() + 1)),
    );
    (Rc::new(manager), log, roars)
}

#[test]
fn send_without_session_logs_once_and_sends_nothing() {
    let (manager, log, _) = new_manager();
    assert!(!manager.establish(SessionOutcome::Failed { code: Some("UNSUPPORTED".into()) }));
    manager.send_message(&OutboundMessage::hello(1.0));
    assert_eq!(log.count("not ready"), 1);
    assert_eq!(log.count("message was sent"), 0);
    assert_eq!(log.count("failed to send message"), 0);
    assert!(!manager.is_ready());
}

#[test]
fn send_after_rejected_client_reaches_no_channel() {
    let (manager, log, _) = new_manager();
    let first = StubChannel { status: 200, ..StubChannel::default() };
    let second = StubChannel { status: 200, ..StubChannel::default() };
    let (first_sent, second_sent) = (first.sent.clone(), second.sent.clone());
    assert!(manager.establish(SessionOutcome::Ready { client: first, initial: Value::Null }));
    assert!(!manager.establish(SessionOutcome::Ready { client: second, initial: Value::Null }));
    manager.send_message(&OutboundMessage::hello(2.0));
    assert_eq!(first_sent.borrow().len(), 1);
    assert!(second_sent.borrow().is_empty());
    assert_eq!(log.count("not ready"), 0);
}

#[test]
fn send_with_session_reports_status() {
    let (manager, log, _) = new_manager();
    let channel = StubChannel { status: 200, ..StubChannel::default() };
    let sent = channel.sent.clone();
    assert!(manager.establish(SessionOutcome::Ready { client: channel, initial: json!({}) }));

    manager.send_message(&OutboundMessage::new().with("speech", "Hello world"));
    assert_eq!(*sent.borrow(), vec![json!({"speech": "Hello world"})]);
    assert_eq!(log.count("message was sent to backend successfully"), 1);
    assert_eq!(log.count("not ready"), 0);
}

#[test]
fn failed_send_is_logged_not_retried() {
    let (manager, log, _) = new_manager();
    let channel = StubChannel { status: 503, ..StubChannel::default() };
    let sent = channel.sent.clone();
    manager.establish(SessionOutcome::Ready { client: channel, initial: Value::Null });

    manager.send_message(&OutboundMessage::hello(5.0));
    assert_eq!(sent.borrow().len(), 1);
    assert_eq!(log.count("failed to send message to skill backend:"), 1);
    assert!(log.lines().last().unwrap().contains("503"));
}

#[test]
fn roar_phrase_triggers_exactly_once() {
    let (manager, _log, roars) = new_manager();
    assert!(manager.handle_inbound(json!({"userSpeech": "roar"})));
    assert_eq!(roars.get(), 1);
    for other in [json!({"userSpeech": "Roar"}), json!({"userSpeech": "hello"}), json!({}), json!({"userSpeech": 1})] {
        assert!(!manager.handle_inbound(other));
    }
    assert_eq!(roars.get(), 1);
}

#[test]
fn wake_word_discovered_from_initial_hint() {
    let (manager, log, _) = new_manager();
    let initial = json!({"hint": "Try saying \"Computer, Hello\""});
    manager.establish(SessionOutcome::Ready { client: StubChannel::default(), initial });
    assert_eq!(manager.wake_word(), "Computer");
    assert_eq!(log.count("discovered wake word: Computer"), 1);
}

#[test]
fn roar_fires_when_other_known_field_has_wrong_type() {
    let (manager, log, roars) = new_manager();
    assert!(manager.handle_inbound(json!({"userSpeech": "roar", "hint": 42})));
    assert_eq!(roars.get(), 1);
    assert_eq!(log.count("malformed"), 0);
}

#[test]
fn wake_word_survives_non_string_speech_in_initial_data() {
    let (manager, log, _) = new_manager();
    let initial = json!({"userSpeech": 5, "hint": "Try saying \"Computer, Hello\""});
    manager.establish(SessionOutcome::Ready { client: StubChannel::default(), initial });
    assert_eq!(manager.wake_word(), "Computer");
    assert_eq!(log.count("discovered wake word: Computer"), 1);
}

#[test]
fn empty_wake_word_in_hint_is_adopted() {
    let (manager, _, _) = new_manager();
    let initial = json!({"hint": "try \", hello\""});
    manager.establish(SessionOutcome::Ready { client: StubChannel::default(), initial });
    assert_eq!(manager.wake_word(), "");
}

#[test]
fn wake_word_defaults_without_match() {
    let (manager, _, _) = new_manager();
    let initial = json!({"hint": "Say something nice"});
    manager.establish(SessionOutcome::Ready { client: StubChannel::default(), initial });
    assert_eq!(manager.wake_word(), "Alexa");

    let (manager, _, _) = new_manager();
    manager.establish(SessionOutcome::Ready { client: StubChannel::default(), initial: Value::Null });
    assert_eq!(manager.wake_word(), "Alexa");
}

#[test]
fn unavailable_session_degrades_to_logged_no_ops() {
    let (manager, log, _) = new_manager();
    assert!(!manager.establish(SessionOutcome::Unavailable(json!("Alexa is not defined"))));
    manager.open_microphone();
    assert_eq!(
        log.lines(),
        vec![
            "Alexa not ready :(".to_string(),
            "Alexa is not defined".to_string(),
            "cannot open the microphone, Alexa is not ready".to_string(),
        ]
    );
}

#[test]
fn microphone_callbacks_are_logged() {
    let (manager, log, _) = new_manager();
    let channel = StubChannel::default();
    let requests = channel.mic_requests.clone();
    manager.establish(SessionOutcome::Ready { client: channel, initial: Value::Null });
    manager.open_microphone();
    assert_eq!(requests.get(), 1);
    assert_eq!(log.count("the microphone was opened"), 1);
    assert_eq!(log.count("the microphone was closed"), 1);
}

#[test]
fn default_config_is_valid() {
    let config = dragon_companion::CompanionConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.roar_stop_policy, dragon_companion::RoarStopPolicy::Immediate);
}
