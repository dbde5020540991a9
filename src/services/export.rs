// src/services/export.rs
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::{error, info};

use crate::error::ExportError;
use crate::services::controller::SessionController;
use crate::services::html;
use crate::services::transcript::{Message, MessageRole};

const PDF_TITLE: &str = "MITU Chat Export";
const PDF_WRAP_COLUMNS: usize = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Pdf,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLine {
    pub role: MessageRole,
    pub time: String,
    pub text: String,
}

impl ExportLine {
    fn sender(&self) -> &'static str {
        match self.role {
            MessageRole::User => "You",
            MessageRole::Assistant => "MITU Bot",
        }
    }
}

/// Plain-text view of the messages; empty ones are skipped.
pub fn export_lines(messages: &[Message]) -> Vec<ExportLine> {
    messages
        .iter()
        .filter_map(|m| {
            let mut text = match m.role {
                MessageRole::User => m.content.trim().to_string(),
                MessageRole::Assistant => html::to_plain_text(&m.content),
            };
            if let Some(progress) = &m.progress {
                text = format!("{progress} {text}").trim().to_string();
            }
            (!text.is_empty()).then(|| ExportLine {
                role: m.role,
                time: m.sent_at.format("%H:%M").to_string(),
                text,
            })
        })
        .collect()
}

pub fn render_text(lines: &[ExportLine], exported_at: DateTime<Local>) -> String {
    let mut out = vec![
        "=== MITU Chatbot - Chat Export ===".to_string(),
        format!("Exported: {}", exported_at.format("%Y-%m-%d %H:%M:%S")),
        "=".repeat(40),
        String::new(),
    ];
    out.extend(
        lines
            .iter()
            .map(|l| format!("[{}] {:<10}: {}", l.time, l.sender(), l.text)),
    );
    out.join("\n")
}

fn export_path(dir: &Path, extension: &str) -> PathBuf {
    let millis = Utc::now().timestamp_millis();
    dir.join(format!("mitu-chat-{millis}.{extension}"))
}

pub async fn export_text(dir: &Path, messages: &[Message]) -> Result<PathBuf, ExportError> {
    let lines = export_lines(messages);
    if lines.is_empty() {
        return Err(ExportError::Empty);
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = export_path(dir, "txt");
    tokio::fs::write(&path, render_text(&lines, Local::now())).await?;
    Ok(path)
}

pub async fn export_pdf(dir: &Path, messages: &[Message]) -> Result<PathBuf, ExportError> {
    let lines = export_lines(messages);
    if lines.is_empty() {
        return Err(ExportError::Empty);
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = export_path(dir, "pdf");
    let target = path.clone();
    let exported_at = Local::now();

    // printpdf is synchronous and CPU bound
    tokio::task::spawn_blocking(move || write_pdf(&target, &lines, exported_at))
        .await??;
    Ok(path)
}

fn pdf_err<E: std::fmt::Debug>(err: E) -> ExportError {
    ExportError::Pdf(format!("{err:?}"))
}

const PAGE_TOP_MM: f64 = 277.0;
const PAGE_BOTTOM_MM: f64 = 20.0;
const ROW_MM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

/// One piece of text at a fixed position on a page.
#[derive(Debug, Clone, PartialEq)]
struct Placed {
    text: String,
    size: f64,
    x: f64,
    y: f64,
    face: Face,
}

struct Pager {
    pages: Vec<Vec<Placed>>,
    y: f64,
}

impl Pager {
    fn new(y: f64) -> Self {
        Self {
            pages: vec![Vec::new()],
            y,
        }
    }

    fn break_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_TOP_MM;
    }

    /// Start a new page unless `height` still fits above the bottom margin.
    fn reserve(&mut self, height: f64) {
        if self.y - height < PAGE_BOTTOM_MM {
            self.break_page();
        }
    }

    fn place(&mut self, text: String, size: f64, x: f64, face: Face, advance: f64) {
        if self.y < PAGE_BOTTOM_MM {
            self.break_page();
        }
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.push(Placed {
                text,
                size,
                x,
                y,
                face,
            });
        }
        self.y -= advance;
    }
}

/// Lay the export out on A4 pages. A message may span pages; no row is
/// placed below the bottom margin.
fn layout(lines: &[ExportLine], exported_at: DateTime<Local>) -> Vec<Vec<Placed>> {
    let mut pager = Pager::new(270.0);
    let heading = "MITU Chatbot - Chat Export".to_string();
    pager.place(heading, 20.0, 20.0, Face::Bold, 10.0);
    let stamp = format!("Exported on: {}", exported_at.format("%Y-%m-%d %H:%M"));
    pager.place(stamp, 10.0, 20.0, Face::Regular, 15.0);

    for line in lines {
        // sender heading stays with its first row
        pager.reserve(6.0);
        let heading = format!("{} ({})", line.sender(), line.time);
        pager.place(heading, 10.0, 20.0, Face::Bold, 6.0);
        for row in wrap(&line.text, PDF_WRAP_COLUMNS) {
            pager.place(row, 10.0, 24.0, Face::Regular, ROW_MM);
        }
        pager.y -= 4.0;
    }
    pager.pages
}

fn write_pdf(
    path: &Path,
    lines: &[ExportLine],
    exported_at: DateTime<Local>,
) -> Result<(), ExportError> {
    let pages = layout(lines, exported_at);
    let (doc, page1, layer1) = PdfDocument::new(PDF_TITLE, Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    for (index, placed) in pages.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };
        for item in placed {
            let face = match item.face {
                Face::Regular => &font,
                Face::Bold => &font_bold,
            };
            layer.use_text(item.text, item.size, Mm(item.x), Mm(item.y), face);
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer).map_err(pdf_err)?;
    Ok(())
}

/// Greedy word wrap. Words longer than `width` get a row of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();
    for word in text.split_whitespace() {
        if !row.is_empty() && row.chars().count() + 1 + word.chars().count() > width {
            rows.push(std::mem::take(&mut row));
        }
        if !row.is_empty() {
            row.push(' ');
        }
        row.push_str(word);
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

impl SessionController {
    /// Write the transcript to `dir` and tell the user how it went.
    pub async fn export_chat(
        &self,
        format: ExportFormat,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let messages = self.transcript().messages().await;
        let result = match format {
            ExportFormat::Text => export_text(dir, &messages).await,
            ExportFormat::Pdf => export_pdf(dir, &messages).await,
        };
        match &result {
            Ok(path) => {
                info!(path = %path.display(), ?format, "chat exported");
                self.frontend().toast(match format {
                    ExportFormat::Text => "Chat exported as text! ✅",
                    ExportFormat::Pdf => "PDF exported! 📄",
                });
            }
            Err(ExportError::Empty) => self.frontend().toast("No messages to export!"),
            Err(err) => error!(error = %err, "export failed"),
        }
        result
    }
}
