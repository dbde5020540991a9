// src/state.rs
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::frontend::View;
use crate::services::speech::Voice;

pub type SharedState = Arc<RwLock<UiState>>;

/// Mutable UI state shared by the controller and the leaf features.
#[derive(Debug, Clone)]
pub struct UiState {
    pub sound_on: bool,
    /// Cached voice list, refreshed when the speech engine reports changes.
    pub voices: Vec<Voice>,
    /// Index into the course catalog.
    pub selected_course: Option<usize>,
    pub course_modal_open: bool,
    pub view: View,
    pub listening: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl UiState {
    pub fn new(sound_on: bool) -> Self {
        Self {
            sound_on,
            voices: Vec::new(),
            selected_course: None,
            course_modal_open: false,
            view: View::Chat,
            listening: false,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }
}
