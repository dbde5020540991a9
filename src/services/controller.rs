// src/services/controller.rs
use std::{fmt::Debug, sync::Arc, time::Duration};

use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::frontend::{Frontend, Navigation};
use crate::message::{ChatRequest, ChatResponse};
use crate::services::backend::ChatBackend;
use crate::services::reaction::Reaction;
use crate::services::speech::{SilentSpeaker, Speaker};
use crate::services::transcript::{EntryId, ReactionChange, Transcript};
use crate::state::{SharedState, UiState};

/// Progress marker the backend sends when the user asked for the course list.
pub const OPEN_COURSES_PROGRESS: &str = "Opening Courses...";

pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this chat session? This action cannot be undone.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input, nothing happened.
    Ignored,
    /// The reply was appended as this entry.
    Rendered(EntryId),
    /// The backend created a session; the reply belongs to the next view.
    Navigated {
        target: Navigation,
        response: ChatResponse,
    },
    /// Transport, decode or backend failure. Already logged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Navigated(Navigation),
    /// The alert text shown to the user.
    Failed(String),
}

/// Drives one conversation: submits messages, reconciles the transcript with
/// the replies and handles reactions and session deletion.
///
/// The session id is fixed for the controller's lifetime. A session created
/// by the backend is adopted through a navigation, which the frontend answers
/// by building a new controller.
#[derive(Clone)]
pub struct SessionController {
    session_id: Option<String>,
    backend: Arc<dyn ChatBackend>,
    frontend: Arc<dyn Frontend>,
    pub(crate) speaker: Arc<dyn Speaker>,
    transcript: Transcript,
    pub(crate) state: SharedState,
    course_catalog_delay: Duration,
}

impl Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session_id", &self.session_id)
            .field("course_catalog_delay", &self.course_catalog_delay)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(
        session_id: Option<String>,
        backend: Arc<dyn ChatBackend>,
        frontend: Arc<dyn Frontend>,
    ) -> Self {
        Self {
            session_id: session_id.filter(|s| !s.is_empty()),
            backend,
            frontend,
            speaker: Arc::new(SilentSpeaker),
            transcript: Transcript::new(),
            state: UiState::default().shared(),
            course_catalog_delay: Duration::from_millis(1000),
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        backend: Arc<dyn ChatBackend>,
        frontend: Arc<dyn Frontend>,
    ) -> Self {
        Self::new(config.session_id.clone(), backend, frontend)
            .with_state(UiState::new(config.sound_on).shared())
            .with_course_catalog_delay(config.course_catalog_delay)
    }

    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }

    /// Share UI state with a previous controller, e.g. across a reload.
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = state;
        self
    }

    pub fn with_course_catalog_delay(mut self, delay: Duration) -> Self {
        self.course_catalog_delay = delay;
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub(crate) fn frontend(&self) -> &Arc<dyn Frontend> {
        &self.frontend
    }

    /// Send one user message and render the reply.
    ///
    /// Overlapping calls are not serialised: each gets its own typing
    /// placeholder and replies land in completion order.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let user = self.transcript.push_user(text).await;
        self.frontend.entry_appended(&user);
        let typing = self.transcript.show_typing().await;
        self.frontend.entry_appended(&typing);

        let request = ChatRequest::new(text, self.session_id());
        let result = self.backend.chat(&request).await;

        if self.transcript.remove(typing.id).await {
            self.frontend.entry_removed(typing.id);
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "chat request failed");
                return SubmitOutcome::Failed;
            }
        };

        if self.session_id.is_none() {
            if let Some(new_id) = response.session_id.clone() {
                let target = Navigation::SessionHome(new_id);
                info!(path = %target.path(), "session created, navigating");
                self.frontend.navigate(&target);
                return SubmitOutcome::Navigated { target, response };
            }
        }

        let opens_courses = response.progress.as_deref() == Some(OPEN_COURSES_PROGRESS);
        let reply_html = response.reply.clone();
        let entry = self.transcript.push_assistant(response).await;
        self.frontend.entry_appended(&entry);

        if opens_courses {
            let this = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(this.course_catalog_delay).await;
                this.show_courses().await;
            });
        }

        if self.state.read().await.sound_on {
            self.speak_reply(&reply_html).await;
        }

        SubmitOutcome::Rendered(entry.id)
    }

    /// A quick-reply button re-submits its payload as typed text.
    pub async fn send_quick_reply(&self, payload: &str) -> SubmitOutcome {
        self.submit(payload).await
    }

    /// Toggle a reaction on an assistant message. Returns `None` when the
    /// entry is not a reactable message.
    pub async fn react(&self, id: EntryId, kind: Reaction) -> Option<ReactionChange> {
        let (entry, change) = self.transcript.toggle_reaction(id, kind).await?;
        self.frontend.entry_updated(&entry);

        if change.current.is_none() {
            return Some(change);
        }

        self.frontend.toast(kind.feedback());

        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(err) = backend.react(kind).await {
                debug!(error = %err, "reaction not delivered");
            }
        });

        Some(change)
    }

    pub async fn delete_session(&self, session_id: &str) -> DeleteOutcome {
        if !self.frontend.confirm(DELETE_CONFIRMATION).await {
            return DeleteOutcome::Cancelled;
        }

        let message = match self.backend.delete_session(session_id).await {
            Ok(resp) if resp.success => {
                let target = if self.session_id() == Some(session_id) {
                    Navigation::NewChat
                } else {
                    Navigation::Reload
                };
                info!(%session_id, path = %target.path(), "session deleted");
                self.frontend.navigate(&target);
                return DeleteOutcome::Navigated(target);
            }
            Ok(resp) => format!(
                "Error: {}",
                resp.error.as_deref().unwrap_or("Could not delete session")
            ),
            Err(err) => {
                error!(error = %err, %session_id, "delete_session failed");
                "Failed to connect to server.".to_string()
            }
        };
        self.frontend.alert(&message);
        DeleteOutcome::Failed(message)
    }

    /// Flip text-to-speech. Turning it off silences anything in progress.
    pub async fn toggle_sound(&self) -> bool {
        let sound_on = {
            let mut state = self.state.write().await;
            state.sound_on = !state.sound_on;
            state.sound_on
        };
        if sound_on {
            self.frontend.toast("🔊 Sound ON");
        } else {
            self.speaker.cancel();
            self.frontend.toast("🔇 Sound OFF");
        }
        sound_on
    }
}
