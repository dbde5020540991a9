// src/frontend/terminal.rs
//! Line-oriented frontend: plain lines are chat messages, `/` lines are the
//! buttons of the web widget.

use std::fmt::Display;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::frontend::{Frontend, Navigation, View};
use crate::message::{ChatResponse, QuickReply};
use crate::services::backend::ChatBackend;
use crate::services::catalog::{self, Course};
use crate::services::controller::{SessionController, SubmitOutcome};
use crate::services::export::ExportFormat;
use crate::services::html;
use crate::services::reaction::Reaction;
use crate::services::speech::{Speaker, Utterance, Voice};
use crate::services::transcript::{Entry, EntryId, EntryKind, MessageRole};
use crate::state::{SharedState, UiState};

const HELP: &str = "\
commands:
  <text>              send a message
  /reply N            send quick reply N of the last bot message
  /like N | /dislike N  react to bot message #N
  /sound              toggle text-to-speech
  /export text|pdf    save the conversation
  /courses            open the course catalog
  /course N           show details of course N
  /ask                ask about the selected course
  /close | /chat      close the course details / back to chat
  /delete [ID]        delete a session (default: the current one)
  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    QuickReply(usize),
    React(usize, Reaction),
    Sound,
    Export(ExportFormat),
    Courses,
    Course(usize),
    Ask,
    CloseCourse,
    Chat,
    Delete(Option<String>),
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Say(line.to_string());
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        let number = || {
            arg.and_then(|a| a.parse::<usize>().ok())
                .filter(|n| *n > 0)
        };

        let parsed = match name {
            "quit" | "exit" => Some(Command::Quit),
            "help" => Some(Command::Help),
            "sound" => Some(Command::Sound),
            "courses" => Some(Command::Courses),
            "ask" => Some(Command::Ask),
            "close" => Some(Command::CloseCourse),
            "chat" => Some(Command::Chat),
            "reply" => number().map(Command::QuickReply),
            "course" => number().map(Command::Course),
            "like" => number().map(|n| Command::React(n, Reaction::Like)),
            "dislike" => number().map(|n| Command::React(n, Reaction::Dislike)),
            "export" => arg.and_then(|a| a.parse().ok()).map(Command::Export),
            "delete" => Some(Command::Delete(arg.map(str::to_string))),
            _ => None,
        };
        parsed.unwrap_or_else(|| Command::Invalid(trimmed.to_string()))
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Screen {
    /// Bot messages in display order; `#N` is index N-1.
    bot_messages: Vec<EntryId>,
    last_quick_replies: Vec<QuickReply>,
}

pub struct TerminalFrontend {
    screen: Mutex<Screen>,
    out: Mutex<Box<dyn Write + Send>>,
    navigations: mpsc::UnboundedSender<Navigation>,
    pending_confirm: Mutex<Option<oneshot::Sender<bool>>>,
}

impl TerminalFrontend {
    pub fn new(navigations: mpsc::UnboundedSender<Navigation>) -> Self {
        Self::with_output(navigations, Box::new(std::io::stdout()))
    }

    pub fn with_output(
        navigations: mpsc::UnboundedSender<Navigation>,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            screen: Mutex::new(Screen::default()),
            out: Mutex::new(out),
            navigations,
            pending_confirm: Mutex::new(None),
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        lock(&self.screen)
    }

    fn line(&self, text: impl Display) {
        let mut out = lock(&self.out);
        if let Err(err) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            warn!(error = %err, "terminal write failed");
        }
    }

    /// Hand the line to a waiting confirmation prompt, if there is one.
    pub fn answer_confirm(&self, line: &str) -> bool {
        match lock(&self.pending_confirm).take() {
            Some(tx) => {
                let yes = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                let _ = tx.send(yes);
                true
            }
            None => false,
        }
    }

    pub fn bot_message(&self, number: usize) -> Option<EntryId> {
        let index = number.checked_sub(1)?;
        self.screen().bot_messages.get(index).copied()
    }

    pub fn quick_reply(&self, number: usize) -> Option<QuickReply> {
        let index = number.checked_sub(1)?;
        self.screen().last_quick_replies.get(index).cloned()
    }

    fn clear(&self) {
        *self.screen() = Screen::default();
    }

    fn number_of(&self, id: EntryId) -> Option<usize> {
        let screen = self.screen();
        let index = screen.bot_messages.iter().position(|e| *e == id)?;
        Some(index + 1)
    }

    /// What the freshly loaded session page shows for the first exchange.
    fn print_reloaded_reply(&self, response: &ChatResponse) {
        let text = html::to_plain_text(&response.reply);
        self.line(format_args!("MITU Bot: {text}"));
    }
}

#[async_trait]
impl Frontend for TerminalFrontend {
    fn entry_appended(&self, entry: &Entry) {
        match &entry.kind {
            EntryKind::Typing => self.line("MITU Bot is typing..."),
            EntryKind::Message(m) if m.role == MessageRole::User => {}
            EntryKind::Message(m) => {
                let number = {
                    let mut screen = self.screen();
                    screen.bot_messages.push(entry.id);
                    screen.last_quick_replies = m.quick_replies.clone();
                    screen.bot_messages.len()
                };
                if let Some(progress) = &m.progress {
                    self.line(format_args!("  {progress}"));
                }
                let text = html::to_plain_text(&m.content);
                self.line(format_args!("[#{number}] MITU Bot: {text}"));
                for (i, reply) in m.quick_replies.iter().enumerate() {
                    self.line(format_args!("    ({}) {}", i + 1, reply.label));
                }
            }
        }
    }

    fn entry_removed(&self, _id: EntryId) {}

    fn entry_updated(&self, entry: &Entry) {
        let (Some(number), Some(message)) = (self.number_of(entry.id), entry.message()) else {
            return;
        };
        let mark = match message.reaction {
            Some(Reaction::Like) => "👍",
            Some(Reaction::Dislike) => "👎",
            None => "no reaction",
        };
        self.line(format_args!("[#{number}] {mark}"));
    }

    fn navigate(&self, target: &Navigation) {
        if self.navigations.send(target.clone()).is_err() {
            warn!(path = %target.path(), "navigation dropped, terminal closed");
        }
    }

    fn toast(&self, message: &str) {
        self.line(format_args!("  · {message}"));
    }

    fn alert(&self, message: &str) {
        self.line(format_args!("!! {message}"));
    }

    fn show_view(&self, view: View) {
        match view {
            View::Chat => self.line("-- chat --"),
            View::CourseCatalog => {
                self.line("-- courses --");
                for (i, course) in catalog::courses().iter().enumerate() {
                    self.line(format_args!(
                        "  {}. {} [{}] - {}",
                        i + 1,
                        course.title,
                        course.category,
                        course.description
                    ));
                }
                self.line("  (/course N for details, /chat to go back)");
            }
        }
    }

    fn course_modal(&self, course: Option<&Course>) {
        let Some(course) = course else { return };
        self.line(format_args!("== {} ==", course.title));
        self.line(format_args!("  {} · {}", course.category, course.duration));
        for item in course.syllabus {
            self.line(format_args!("  - {item}"));
        }
        self.line("  (/ask to ask about it, /close to dismiss)");
    }

    async fn confirm(&self, prompt: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        *lock(&self.pending_confirm) = Some(tx);
        self.line(format_args!("{prompt} [y/N]"));
        rx.await.unwrap_or(false)
    }
}

/// Reads replies aloud by logging them; terminals have no speech engine.
#[derive(Debug, Default)]
pub struct TerminalSpeaker;

impl Speaker for TerminalSpeaker {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: "Terminal Female".into(),
            lang: "en-US".into(),
        }]
    }

    fn is_speaking(&self) -> bool {
        false
    }

    fn cancel(&self) {}

    fn speak(&self, utterance: Utterance) -> Result<(), String> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.name.as_str())
            .unwrap_or("default");
        info!(%voice, text = %utterance.text, "speaking");
        Ok(())
    }
}

fn build_controller(
    config: &ClientConfig,
    session_id: Option<String>,
    backend: &Arc<dyn ChatBackend>,
    frontend: &Arc<TerminalFrontend>,
    state: SharedState,
) -> SessionController {
    SessionController::new(session_id, backend.clone(), frontend.clone())
        .with_speaker(Arc::new(TerminalSpeaker))
        .with_state(state)
        .with_course_catalog_delay(config.course_catalog_delay)
}

pub async fn run(config: ClientConfig, backend: Arc<dyn ChatBackend>) -> anyhow::Result<()> {
    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let frontend = Arc::new(TerminalFrontend::new(nav_tx));
    let state = UiState::new(config.sound_on).shared();
    let session_id = config.session_id.clone();
    let mut controller = build_controller(&config, session_id, &backend, &frontend, state);
    controller.refresh_voices().await;

    match controller.session_id() {
        Some(id) => println!("MITU Chatbot, session {id}. /help for commands."),
        None => println!("MITU Chatbot, new chat. /help for commands."),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(target) = nav_rx.recv() => {
                println!("-> {}", target.path());
                let session_id = match target {
                    Navigation::SessionHome(id) => Some(id),
                    Navigation::NewChat => None,
                    Navigation::Reload => continue,
                };
                frontend.clear();
                let state = controller.state().clone();
                controller = build_controller(&config, session_id, &backend, &frontend, state);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if frontend.answer_confirm(&line) {
                    continue;
                }
                if !dispatch(Command::parse(&line), &controller, &frontend, &config).await {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns false when the user asked to quit.
async fn dispatch(
    command: Command,
    controller: &SessionController,
    frontend: &Arc<TerminalFrontend>,
    config: &ClientConfig,
) -> bool {
    match command {
        Command::Quit => return false,
        Command::Help => println!("{HELP}"),
        Command::Invalid(line) => println!("unknown command: {line}\n{HELP}"),
        Command::Say(text) => {
            spawn_submit(controller, frontend, text);
        }
        Command::QuickReply(n) => match frontend.quick_reply(n) {
            Some(reply) => {
                spawn_submit(controller, frontend, reply.payload);
            }
            None => println!("no quick reply #{n}"),
        },
        Command::React(n, kind) => match frontend.bot_message(n) {
            Some(id) => {
                controller.react(id, kind).await;
            }
            None => println!("no bot message #{n}"),
        },
        Command::Sound => {
            controller.toggle_sound().await;
        }
        Command::Export(format) => {
            // errors are reported to the user by export_chat
            let _ = controller.export_chat(format, &config.export_dir).await;
        }
        Command::Courses => controller.show_courses().await,
        Command::Chat => controller.show_chat().await,
        Command::Course(n) => {
            if controller.open_course(n - 1).await.is_none() {
                println!("no course #{n}");
            }
        }
        Command::CloseCourse => controller.close_course_modal().await,
        Command::Ask => {
            let this = controller.clone();
            let frontend = frontend.clone();
            tokio::spawn(async move {
                let outcome = this.ask_about_selected_course().await;
                after_submit(&frontend, outcome);
            });
        }
        Command::Delete(id) => {
            let Some(id) = id.or_else(|| controller.session_id().map(str::to_string)) else {
                println!("no session to delete");
                return true;
            };
            // runs in the background so the prompt answer can be read
            let this = controller.clone();
            tokio::spawn(async move {
                this.delete_session(&id).await;
            });
        }
    }
    true
}

fn spawn_submit(
    controller: &SessionController,
    frontend: &Arc<TerminalFrontend>,
    text: String,
) -> JoinHandle<()> {
    let this = controller.clone();
    let frontend = frontend.clone();
    tokio::spawn(async move {
        let outcome = this.submit(&text).await;
        after_submit(&frontend, outcome);
    })
}

fn after_submit(frontend: &TerminalFrontend, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Navigated { response, .. } => frontend.print_reloaded_reply(&response),
        // already logged by submit; chat failures never reach the user
        SubmitOutcome::Failed | SubmitOutcome::Ignored | SubmitOutcome::Rendered(_) => {}
    }
}
