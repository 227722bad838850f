//! Voice feedback throttle.
//!
//! Gates spoken feedback so that at most one utterance is in flight, repeated
//! messages are dropped, and regular prompts respect a long cooldown. Priority
//! prompts (safety warnings, milestones) use a short cooldown of their own and
//! may interrupt a regular prompt, but never another priority prompt.

use rehab_core::{Result, Timestamp};
use rehab_motion::Phrase;
use tracing::{debug, warn};

use crate::config::VoiceConfig;
use crate::locale::{translate, Locale};

/// Speech playback capability driven by the throttle.
///
/// `speak` starts playback and returns immediately; completion is reported
/// back through [`VoiceThrottle::on_end`] or [`VoiceThrottle::on_error`].
pub trait SpeechSink {
    fn speak(&mut self, text: &str, locale: Locale) -> Result<()>;

    /// Stops any playback in progress
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    priority: bool,
}

#[derive(Debug)]
pub struct VoiceThrottle<S> {
    sink: S,
    enabled: bool,
    locale: Locale,
    cooldown_ms: i64,
    priority_cooldown_ms: i64,
    last_message: Option<String>,
    last_spoken_at: Option<Timestamp>,
    last_priority_at: Option<Timestamp>,
    in_flight: Option<InFlight>,
}

impl<S: SpeechSink> VoiceThrottle<S> {
    pub fn new(sink: S, config: &VoiceConfig) -> Self {
        Self {
            sink,
            enabled: config.enabled,
            locale: config.locale,
            cooldown_ms: config.cooldown_ms,
            priority_cooldown_ms: config.priority_cooldown_ms,
            last_message: None,
            last_spoken_at: None,
            last_priority_at: None,
            in_flight: None,
        }
    }

    /// Speaks `text` unless the throttle holds it back. Returns true when
    /// playback was started.
    pub fn speak(&mut self, text: &str, priority: bool) -> bool {
        self.speak_at(text, priority, Timestamp::now())
    }

    pub fn speak_phrase(&mut self, phrase: Phrase, priority: bool) -> bool {
        self.speak(phrase.text(), priority)
    }

    pub fn speak_at(&mut self, text: &str, priority: bool, now: Timestamp) -> bool {
        if !self.enabled || text.trim().is_empty() {
            return false;
        }

        let spoken = translate(text, self.locale);
        if !priority && self.last_message.as_deref() == Some(spoken.as_str()) {
            return false;
        }

        if priority {
            if self.in_flight.is_some_and(|u| u.priority) {
                debug!(text = %spoken, "Priority prompt held: another priority prompt is playing");
                return false;
            }
            if Self::cooling(self.last_priority_at, now, self.priority_cooldown_ms) {
                return false;
            }
            if self.in_flight.take().is_some() {
                debug!("Interrupting regular prompt");
                self.sink.cancel();
            }
        } else if self.in_flight.is_some()
            || Self::cooling(self.last_spoken_at, now, self.cooldown_ms)
        {
            return false;
        }

        if let Err(e) = self.sink.speak(&spoken, self.locale) {
            warn!(error = %e, "Speech playback failed");
            self.in_flight = None;
            return false;
        }

        debug!(text = %spoken, priority, locale = %self.locale, "Speaking");
        self.in_flight = Some(InFlight { priority });
        self.last_spoken_at = Some(now);
        if priority {
            self.last_priority_at = Some(now);
        }
        self.last_message = Some(spoken);
        true
    }

    fn cooling(last: Option<Timestamp>, now: Timestamp, cooldown_ms: i64) -> bool {
        last.is_some_and(|at| now.millis_since(at) < cooldown_ms)
    }

    /// Playback finished
    pub fn on_end(&mut self) {
        self.in_flight = None;
    }

    /// Playback failed after it was started
    pub fn on_error(&mut self) {
        warn!("Speech playback reported an error");
        self.in_flight = None;
    }

    pub fn is_speaking(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Cancels any utterance in flight
    pub fn stop(&mut self) {
        self.sink.cancel();
        self.in_flight = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop();
        }
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.set_enabled(!self.enabled);
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn toggle_language(&mut self) {
        self.locale = self.locale.toggled();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
