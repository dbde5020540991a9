// src/services/transcript.rs
use std::{fmt::Debug, sync::Arc};

use chrono::{DateTime, Local};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::message::{ChatResponse, QuickReply};
use crate::services::reaction::{self, Reaction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    /// Plain text for user messages, an HTML fragment for assistant ones.
    pub content: String,
    pub progress: Option<String>,
    pub quick_replies: Vec<QuickReply>,
    /// Server-side id, used to correlate reactions.
    pub message_id: Option<String>,
    pub reaction: Option<Reaction>,
    pub sent_at: DateTime<Local>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            progress: None,
            quick_replies: Vec::new(),
            message_id: None,
            reaction: None,
            sent_at: Local::now(),
        }
    }

    pub fn assistant(response: ChatResponse) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: response.reply,
            progress: response.progress,
            quick_replies: response.buttons,
            message_id: response.message_id,
            reaction: None,
            sent_at: Local::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntryKind {
    Message(Message),
    /// "Assistant is typing" placeholder.
    Typing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
}

impl Entry {
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            EntryKind::Message(m) => Some(m),
            EntryKind::Typing => None,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.kind, EntryKind::Typing)
    }
}

/// Result of a reaction click on an assistant message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionChange {
    pub previous: Option<Reaction>,
    pub current: Option<Reaction>,
    pub message_id: Option<String>,
}

/// The visible conversation. Every mutation is a single append, removal or
/// in-place update under the write lock.
#[derive(Clone, Default)]
pub struct Transcript {
    inner: Arc<RwLock<Vec<Entry>>>,
}

impl Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    async fn push(&self, kind: EntryKind) -> Entry {
        let entry = Entry {
            id: EntryId::new(),
            kind,
        };
        self.inner.write().await.push(entry.clone());
        entry
    }

    pub async fn push_user(&self, content: impl Into<String>) -> Entry {
        self.push(EntryKind::Message(Message::user(content))).await
    }

    pub async fn push_assistant(&self, response: ChatResponse) -> Entry {
        self.push(EntryKind::Message(Message::assistant(response))).await
    }

    pub async fn show_typing(&self) -> Entry {
        self.push(EntryKind::Typing).await
    }

    /// Remove an entry. Returns false when it was already gone.
    pub async fn remove(&self, id: EntryId) -> bool {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|e| e.id != id);
        guard.len() != before
    }

    /// Apply a reaction click. `None` when `id` is not an assistant message.
    pub async fn toggle_reaction(
        &self,
        id: EntryId,
        clicked: Reaction,
    ) -> Option<(Entry, ReactionChange)> {
        let mut guard = self.inner.write().await;
        let entry = guard.iter_mut().find(|e| e.id == id)?;
        let EntryKind::Message(message) = &mut entry.kind else {
            return None;
        };
        if message.role != MessageRole::Assistant {
            return None;
        }
        let previous = message.reaction;
        message.reaction = reaction::toggle(previous, clicked);
        let change = ReactionChange {
            previous,
            current: message.reaction,
            message_id: message.message_id.clone(),
        };
        Some((entry.clone(), change))
    }

    pub async fn get(&self, id: EntryId) -> Option<Entry> {
        self.inner.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// Copy of every entry, placeholders included.
    pub async fn entries(&self) -> Vec<Entry> {
        self.inner.read().await.clone()
    }

    /// Copy of the real messages, placeholders skipped.
    pub async fn messages(&self) -> Vec<Message> {
        let guard = self.inner.read().await;
        guard.iter().filter_map(|e| e.message().cloned()).collect()
    }

    pub async fn typing_count(&self) -> usize {
        self.inner.read().await.iter().filter(|e| e.is_typing()).count()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
