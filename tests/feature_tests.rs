mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use chatbot_client::services::catalog::courses;
use chatbot_client::services::export::ExportFormat;
use chatbot_client::services::speech::{RecognitionEvent, Recognizer, Voice};
use chatbot_client::state::UiState;
use chatbot_client::{ExportError, SessionController, SubmitOutcome, View};
use common::{RecordingFrontend, RecordingSpeaker, ScriptedBackend, UiEvent, controller, reply};

fn voice(name: &str) -> Voice {
    Voice {
        name: name.into(),
        lang: "en-US".into(),
    }
}

fn with_speaker(
    backend: &Arc<ScriptedBackend>,
    frontend: &Arc<RecordingFrontend>,
    speaker: &Arc<RecordingSpeaker>,
) -> SessionController {
    controller(Some("abc123"), backend, frontend).with_speaker(speaker.clone())
}

#[tokio::test]
async fn replies_are_spoken_as_plain_text_with_preferred_voice() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let speaker = Arc::new(RecordingSpeaker {
        voices: vec![voice("Alex"), voice("Google UK English Male")],
        ..Default::default()
    });
    let ctrl = with_speaker(&backend, &frontend, &speaker);
    ctrl.refresh_voices().await;
    backend.queue_reply(reply("<p>Python runs <b>4 weeks</b>.</p>"));

    ctrl.submit("How long is Python?").await;

    let spoken = speaker.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].text, "Python runs 4 weeks .");
    let voice = spoken[0].voice.as_ref().map(|v| v.name.as_str());
    assert_eq!(voice, Some("Google UK English Male"));
}

#[tokio::test]
async fn sound_off_keeps_quiet() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let speaker = Arc::new(RecordingSpeaker::default());
    let ctrl = with_speaker(&backend, &frontend, &speaker);

    assert!(!ctrl.toggle_sound().await);
    assert_eq!(speaker.cancels(), 1);
    backend.queue_reply(reply("Hello"));
    ctrl.submit("Hi").await;
    assert!(speaker.spoken().is_empty());

    assert!(ctrl.toggle_sound().await);
    assert_eq!(frontend.toasts(), ["🔇 Sound OFF", "🔊 Sound ON"]);
}

#[tokio::test]
async fn speaking_again_while_speaking_only_cancels() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let speaker = Arc::new(RecordingSpeaker::default());
    speaker.speaking.store(true, Ordering::SeqCst);
    let ctrl = with_speaker(&backend, &frontend, &speaker);

    ctrl.speak_text("Hello").await;

    assert_eq!(speaker.cancels(), 1);
    assert!(speaker.spoken().is_empty());
}

#[derive(Default)]
struct FakeMic {
    calls: Mutex<Vec<&'static str>>,
}

impl Recognizer for FakeMic {
    fn start(&self) {
        self.calls.lock().unwrap().push("start");
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push("stop");
    }
}

#[tokio::test]
async fn mic_button_toggles_with_engine_events() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);
    let mic = FakeMic::default();

    ctrl.toggle_listening(&mic).await;
    ctrl.on_recognition(RecognitionEvent::Started).await;
    assert!(ctrl.state().read().await.listening);
    ctrl.toggle_listening(&mic).await;
    ctrl.on_recognition(RecognitionEvent::Ended).await;
    assert!(!ctrl.state().read().await.listening);

    assert_eq!(*mic.calls.lock().unwrap(), vec!["start", "stop"]);
    assert_eq!(frontend.toasts(), vec!["🎙️ Listening...".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn recognised_phrase_is_submitted_after_delay() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);
    backend.queue_reply(reply("Sure!"));

    let started = tokio::time::Instant::now();
    let handle = ctrl
        .on_recognition(RecognitionEvent::Result("show me courses".into()))
        .await
        .expect("submission scheduled");
    assert!(backend.chat_requests().is_empty());

    let outcome = handle.await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(400));
    assert!(matches!(outcome, SubmitOutcome::Rendered(_)));
    assert_eq!(backend.chat_requests()[0].message, "show me courses");
    assert_eq!(frontend.toasts()[0], "🎙️ Heard: \"show me courses\"");
}

#[tokio::test]
async fn recognition_errors_are_reported() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);

    ctrl.on_recognition(RecognitionEvent::Started).await;
    let denied = RecognitionEvent::Error("not-allowed".into());
    assert!(ctrl.on_recognition(denied).await.is_none());
    ctrl.on_recognition(RecognitionEvent::Error("network".into())).await;

    assert!(!ctrl.state().read().await.listening);
    let toasts = frontend.toasts();
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0], "Microphone permission denied ❌");
    assert_eq!(toasts[1], "Voice input error: network");
}

#[tokio::test]
async fn course_modal_and_ask_about_course() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);
    backend.queue_reply(reply("Linux Administration covers..."));

    ctrl.show_courses().await;
    assert!(ctrl.open_course(99).await.is_none());
    let course = ctrl.open_course(2).await.unwrap();
    assert_eq!(course.title, "Linux Administration");
    assert_eq!(ctrl.state().read().await.selected_course, Some(2));
    assert!(ctrl.state().read().await.course_modal_open);

    let outcome = ctrl.ask_about_selected_course().await;
    assert!(matches!(outcome, SubmitOutcome::Rendered(_)));
    assert_eq!(
        backend.chat_requests()[0].message,
        "Tell me more about Linux Administration"
    );

    let state = ctrl.state().read().await.clone();
    assert!(!state.course_modal_open);
    assert_eq!(state.view, View::Chat);
    assert_eq!(frontend.views(), vec![View::CourseCatalog, View::Chat]);
    let events = frontend.events();
    let opened = UiEvent::Modal(Some("Linux Administration".into()));
    assert!(events.contains(&opened));
    assert!(events.contains(&UiEvent::Modal(None)));
}

#[tokio::test]
async fn asking_without_selection_does_nothing() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);

    let outcome = ctrl.ask_about_selected_course().await;
    assert_eq!(outcome, SubmitOutcome::Ignored);
    assert!(backend.chat_requests().is_empty());
}

#[test]
fn catalog_has_six_courses_with_syllabi() {
    let titles: Vec<&str> = courses().iter().map(|c| c.title).collect();
    assert_eq!(
        titles,
        [
            "Data Science & AI",
            "Python Programming",
            "Linux Administration",
            "Cloud Computing",
            "IoT & Raspberry Pi",
            "Full Stack Web Dev",
        ]
    );
    assert!(courses().iter().all(|c| c.syllabus.len() == 5));
}

#[tokio::test]
async fn export_of_empty_chat_only_warns() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);
    let dir = tempfile::tempdir().unwrap();

    let result = ctrl.export_chat(ExportFormat::Text, dir.path()).await;

    assert!(matches!(result, Err(ExportError::Empty)));
    assert_eq!(frontend.toasts(), ["No messages to export!"]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn export_writes_transcript_without_placeholders() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend)
        .with_state(UiState::new(false).shared());
    backend.queue_reply(reply("<p>Six courses.</p>"));
    ctrl.submit("How many courses?").await;
    let _pending_typing = ctrl.transcript().show_typing().await;
    let dir = tempfile::tempdir().unwrap();

    let path = ctrl.export_chat(ExportFormat::Text, dir.path()).await.unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("mitu-chat-") && name.ends_with(".txt"));
    let text = std::fs::read_to_string(&path).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 6);
    assert!(rows[4].ends_with("] You       : How many courses?"));
    assert!(rows[5].ends_with("] MITU Bot  : Six courses."));
    assert_eq!(
        frontend.toasts().last().map(String::as_str),
        Some("Chat exported as text! ✅")
    );
}

#[tokio::test]
async fn pdf_export_writes_a_pdf() {
    let backend = ScriptedBackend::new();
    let frontend = RecordingFrontend::new();
    let ctrl = controller(Some("abc123"), &backend, &frontend);
    backend.queue_reply(reply("Hello"));
    ctrl.submit("Hi").await;
    let dir = tempfile::tempdir().unwrap();

    let path = ctrl.export_chat(ExportFormat::Pdf, dir.path()).await.unwrap();

    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    let last_toast = frontend.toasts().pop();
    assert_eq!(last_toast.as_deref(), Some("PDF exported! 📄"));
}
