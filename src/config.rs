//! Page configuration. `Default` reproduces the constants of the shipped page;
//! hosts may override any subset through `start_companion_with_config`.

use serde::Deserialize;

use crate::error::CompanionError;

/// What happens after the roar sweep timer is started.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoarStopPolicy {
    /// Stop is called right after start, so the sweep only flashes the element.
    /// This is the behavior of the shipped page.
    #[default]
    Immediate,
    /// Run one full pass over the sweep range, then stop and hide.
    AfterSweep,
}

/// Scheduling primitive that drives the idle loop divider.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum IdleDriver {
    /// `requestAnimationFrame`; cadence follows the display refresh rate.
    #[default]
    AnimationFrame,
    /// `setInterval` fallback; cadence is `period_ms * divisor`, independent of refresh.
    #[serde(rename_all = "camelCase")]
    Interval { period_ms: u32 },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanionConfig {
    // --- Assets ---
    pub sprite_src: String,
    pub roar_audio_src: String,
    // --- DOM ---
    pub canvas_selector: String,
    pub debug_element_id: String,
    pub hints_element_id: String,
    pub roar_element_id: String,
    pub hello_button_id: String,
    pub mic_button_id: String,
    // --- Sprite sheet ---
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_scale: u32,
    // --- Idle loop ---
    pub idle_cycle: Vec<u32>,
    pub idle_divisor: u32,
    pub idle_driver: IdleDriver,
    // --- Roar sweep ---
    pub roar_interval_ms: u32,
    pub roar_start: u32,
    pub roar_step: u32,
    pub roar_max: u32,
    pub roar_stop_policy: RoarStopPolicy,
    // --- Session ---
    pub sdk_version: String,
    pub default_wake_word: String,
    pub roar_phrase: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            sprite_src: "dragon.png".into(),
            roar_audio_src: "roar.mp3".into(),
            canvas_selector: "canvas".into(),
            debug_element_id: "debugElement".into(),
            hints_element_id: "hints".into(),
            roar_element_id: "image".into(),
            hello_button_id: "helloButton".into(),
            mic_button_id: "micButton".into(),
            frame_width: 200,
            frame_height: 200,
            frame_scale: 2,
            idle_cycle: vec![0, 1, 0, 2],
            idle_divisor: 15,
            idle_driver: IdleDriver::AnimationFrame,
            roar_interval_ms: 100,
            roar_start: 256,
            roar_step: 256,
            roar_max: 1536,
            roar_stop_policy: RoarStopPolicy::Immediate,
            sdk_version: "1.1".into(),
            default_wake_word: "Alexa".into(),
            roar_phrase: "roar".into(),
        }
    }
}

impl CompanionConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, CompanionError> {
        let config: CompanionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CompanionError> {
        let invalid = |msg: &str| Err(CompanionError::InvalidConfig(msg.to_string()));
        if self.idle_cycle.is_empty() {
            return invalid("idle cycle is empty");
        }
        if self.idle_divisor == 0 {
            return invalid("idle divisor must be at least 1");
        }
        if let IdleDriver::Interval { period_ms } = self.idle_driver {
            if period_ms == 0 {
                return invalid("idle interval period must be at least 1ms");
            }
            if i32::try_from(period_ms).is_err() {
                return invalid("idle interval period exceeds the browser timer range");
            }
        }
        if self.roar_interval_ms == 0 || i32::try_from(self.roar_interval_ms).is_err() {
            return invalid("roar interval must lie in 1..=i32::MAX ms");
        }
        if self.frame_scale == 0 {
            return invalid("frame scale must be at least 1");
        }
        if self.roar_step == 0 {
            return invalid("roar step must be at least 1");
        }
        if self.roar_start > self.roar_max {
            return invalid("roar start lies above roar max");
        }
        Ok(())
    }
}
