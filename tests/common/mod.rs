#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatbot_client::error::{ClientError, Result};
use chatbot_client::message::{ChatRequest, ChatResponse, DeleteSessionResponse};
use chatbot_client::services::backend::ChatBackend;
use chatbot_client::services::catalog::Course;
use chatbot_client::services::reaction::Reaction;
use chatbot_client::services::speech::{Speaker, Utterance, Voice};
use chatbot_client::services::transcript::{Entry, EntryId};
use chatbot_client::{Frontend, Navigation, SessionController, View};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Appended(Entry),
    Removed(EntryId),
    Updated(Entry),
    Navigated(Navigation),
    Toast(String),
    Alert(String),
    View(View),
    Modal(Option<String>),
    Confirm(String),
}

/// Frontend that records every call.
pub struct RecordingFrontend {
    pub events: Mutex<Vec<UiEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingFrontend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        })
    }

    pub fn answer_confirm_with(&self, yes: bool) {
        self.confirm_answer.store(yes, Ordering::SeqCst);
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Navigated(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn toasts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Alert(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn views(&self) -> Vec<View> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::View(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Frontend for RecordingFrontend {
    fn entry_appended(&self, entry: &Entry) {
        self.record(UiEvent::Appended(entry.clone()));
    }

    fn entry_removed(&self, id: EntryId) {
        self.record(UiEvent::Removed(id));
    }

    fn entry_updated(&self, entry: &Entry) {
        self.record(UiEvent::Updated(entry.clone()));
    }

    fn navigate(&self, target: &Navigation) {
        self.record(UiEvent::Navigated(target.clone()));
    }

    fn toast(&self, message: &str) {
        self.record(UiEvent::Toast(message.to_string()));
    }

    fn alert(&self, message: &str) {
        self.record(UiEvent::Alert(message.to_string()));
    }

    fn show_view(&self, view: View) {
        self.record(UiEvent::View(view));
    }

    fn course_modal(&self, course: Option<&Course>) {
        self.record(UiEvent::Modal(course.map(|c| c.title.to_string())));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.record(UiEvent::Confirm(prompt.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

enum Scripted {
    Ready(Result<ChatResponse>),
    Gated(oneshot::Receiver<Result<ChatResponse>>),
}

/// Backend that answers from a queue and records what it was sent.
#[derive(Default)]
pub struct ScriptedBackend {
    chat_replies: Mutex<VecDeque<Scripted>>,
    delete_replies: Mutex<VecDeque<Result<DeleteSessionResponse>>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub reactions: Mutex<Vec<Reaction>>,
    pub deleted: Mutex<Vec<String>>,
    react_fails: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, scripted: Scripted) {
        self.chat_replies.lock().unwrap().push_back(scripted);
    }

    pub fn queue_reply(&self, response: ChatResponse) {
        self.push(Scripted::Ready(Ok(response)));
    }

    pub fn queue_error(&self, error: ClientError) {
        self.push(Scripted::Ready(Err(error)));
    }

    /// The matching `chat` call waits until the returned sender fires.
    pub fn queue_gated(&self) -> oneshot::Sender<Result<ChatResponse>> {
        let (tx, rx) = oneshot::channel();
        self.push(Scripted::Gated(rx));
        tx
    }

    pub fn queue_delete(&self, response: Result<DeleteSessionResponse>) {
        self.delete_replies.lock().unwrap().push_back(response);
    }

    pub fn fail_reactions(&self) {
        self.react_fails.store(true, Ordering::SeqCst);
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<Reaction> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_requests.lock().unwrap().push(request.clone());
        let next = self.chat_replies.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Backend("gate dropped".into()))),
            None => Err(ClientError::Backend("no scripted reply".into())),
        }
    }

    async fn react(&self, reaction: Reaction) -> Result<()> {
        self.reactions.lock().unwrap().push(reaction);
        if self.react_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Backend("react endpoint missing".into()));
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse> {
        self.deleted.lock().unwrap().push(session_id.to_string());
        let scripted = self.delete_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(DeleteSessionResponse {
                success: true,
                error: None,
            })
        })
    }
}

/// Speaker that records what it was asked to say.
#[derive(Default)]
pub struct RecordingSpeaker {
    pub voices: Vec<Voice>,
    pub spoken: Mutex<Vec<Utterance>>,
    pub speaking: AtomicBool,
    pub cancels: Mutex<usize>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

impl Speaker for RecordingSpeaker {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }

    fn speak(&self, utterance: Utterance) -> std::result::Result<(), String> {
        self.spoken.lock().unwrap().push(utterance);
        Ok(())
    }
}

pub fn reply(text: &str) -> ChatResponse {
    ChatResponse {
        reply: text.to_string(),
        ..Default::default()
    }
}

pub fn controller(
    session_id: Option<&str>,
    backend: &Arc<ScriptedBackend>,
    frontend: &Arc<RecordingFrontend>,
) -> SessionController {
    let session_id = session_id.map(str::to_string);
    SessionController::new(session_id, backend.clone(), frontend.clone())
}

/// Let spawned background tasks run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
