// src/frontend/mod.rs
pub mod terminal;

use async_trait::async_trait;

use crate::services::catalog::Course;
use crate::services::transcript::{Entry, EntryId};

/// Where the client goes after a session changes. A navigation replaces the
/// whole view; it never mutates the current one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// A session was just created: `/?session_id=<id>`.
    SessionHome(String),
    /// The active session was deleted: `/new_chat`.
    NewChat,
    /// Refresh the current view (session list changed).
    Reload,
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::SessionHome(id) => format!("/?session_id={id}"),
            Navigation::NewChat => "/new_chat".to_string(),
            Navigation::Reload => ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    CourseCatalog,
}

/// Everything the controller asks of the screen it is attached to.
#[async_trait]
pub trait Frontend: Send + Sync {
    fn entry_appended(&self, entry: &Entry);
    fn entry_removed(&self, id: EntryId);
    fn entry_updated(&self, entry: &Entry);

    fn navigate(&self, target: &Navigation);

    /// Short, non-blocking notice.
    fn toast(&self, message: &str);

    /// Blocking error notice.
    fn alert(&self, message: &str);

    fn show_view(&self, view: View);

    /// `Some` opens the course details modal, `None` closes it.
    fn course_modal(&self, course: Option<&Course>);

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;
}
