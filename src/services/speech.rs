//! Text-to-speech of replies and speech-to-text input.
//!
//! Engines sit behind [`Speaker`] and [`Recognizer`]; the controller owns the
//! on/off and listening state in [`UiState`](crate::state::UiState).

use std::time::Duration;

use tracing::{error, warn};

use crate::services::controller::{SessionController, SubmitOutcome};
use crate::services::html;

/// Names tried in order when picking a voice.
const PREFERRED_VOICES: [&str; 3] = ["Google US English", "Google", "Female"];

/// Pause between a recognised phrase and its automatic submission.
pub const VOICE_SUBMIT_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
}

pub trait Speaker: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    fn is_speaking(&self) -> bool;
    fn cancel(&self);
    fn speak(&self, utterance: Utterance) -> Result<(), String>;
}

/// Speaker for environments without a speech engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn is_speaking(&self) -> bool {
        false
    }

    fn cancel(&self) {}

    fn speak(&self, _utterance: Utterance) -> Result<(), String> {
        Ok(())
    }
}

/// First voice whose name contains any preferred needle, in list order.
pub fn preferred_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| PREFERRED_VOICES.iter().any(|n| v.name.contains(n)))
}

pub trait Recognizer: Send + Sync {
    fn start(&self);
    fn stop(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    Ended,
    Result(String),
    /// Engine error code, e.g. `not-allowed`.
    Error(String),
}

impl SessionController {
    /// Re-read the engine's voice list into the cache.
    pub async fn refresh_voices(&self) {
        let voices = self.speaker.voices();
        self.state.write().await.voices = voices;
    }

    /// Speak `text`. A second call while speaking stops the speech instead.
    pub async fn speak_text(&self, text: &str) {
        if self.speaker.is_speaking() {
            self.speaker.cancel();
            return;
        }
        if text.is_empty() {
            return;
        }
        let voice = {
            let state = self.state.read().await;
            preferred_voice(&state.voices).cloned()
        };
        let utterance = Utterance {
            text: text.to_string(),
            voice,
        };
        if let Err(err) = self.speaker.speak(utterance) {
            error!(error = %err, "speaking failed");
        }
    }

    pub(crate) async fn speak_reply(&self, reply_html: &str) {
        let text = html::to_plain_text(reply_html);
        self.speak_text(&text).await;
    }

    /// Mic button: start or stop listening.
    pub async fn toggle_listening(&self, recognizer: &dyn Recognizer) {
        if self.state.read().await.listening {
            recognizer.stop();
        } else {
            recognizer.start();
            self.frontend().toast("🎙️ Listening...");
        }
    }

    /// Feed one recognition engine event. A recognised phrase is submitted
    /// after [`VOICE_SUBMIT_DELAY`]; the returned handle resolves to that
    /// submission's outcome.
    pub async fn on_recognition(
        &self,
        event: RecognitionEvent,
    ) -> Option<tokio::task::JoinHandle<SubmitOutcome>> {
        match event {
            RecognitionEvent::Started => {
                self.state.write().await.listening = true;
                None
            }
            RecognitionEvent::Ended => {
                self.state.write().await.listening = false;
                None
            }
            RecognitionEvent::Result(transcript) => {
                self.frontend().toast(&format!("🎙️ Heard: \"{transcript}\""));
                let this = self.clone();
                Some(tokio::spawn(async move {
                    tokio::time::sleep(VOICE_SUBMIT_DELAY).await;
                    this.submit(&transcript).await
                }))
            }
            RecognitionEvent::Error(code) => {
                warn!(%code, "speech recognition error");
                self.state.write().await.listening = false;
                let notice = if code == "not-allowed" {
                    "Microphone permission denied ❌".to_string()
                } else {
                    format!("Voice input error: {code}")
                };
                self.frontend().toast(&notice);
                None
            }
        }
    }
}
