//! Application state management
//!
//! Single source of truth for the TUI: the preview controller plus focus,
//! editing and status bookkeeping.

use std::borrow::Cow;
use std::path::PathBuf;

use crossbeam_channel::Sender;
use image::RgbaImage;
use tracing::{info, warn};

use crate::config::Config;
use crate::draft::{Field, MessageDraft};
use crate::preview::PreviewController;
use crate::style::StyleId;
use crate::worker::{WorkerMessage, WorkerResponse};

/// Presentation scale used by the zoom toggle
pub const ZOOM_TRANSFORM: &str = "scale(0.9)";

/// Rows of the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Style,
    Name,
    Message,
    Time,
    Read,
    Avatar,
    Export,
}

static ALL_CONTROLS: [Control; 7] = [
    Control::Style,
    Control::Name,
    Control::Message,
    Control::Time,
    Control::Read,
    Control::Avatar,
    Control::Export,
];

impl Control {
    pub fn all() -> &'static [Control] {
        &ALL_CONTROLS[..]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Control::Style => "Style",
            Control::Name => Field::SenderName.name(),
            Control::Message => Field::BodyText.name(),
            Control::Time => Field::Timestamp.name(),
            Control::Read => "Read",
            Control::Avatar => "Avatar",
            Control::Export => "Export",
        }
    }

    /// The draft field edited by this row, if any
    pub fn field(&self) -> Option<Field> {
        match self {
            Control::Name => Some(Field::SenderName),
            Control::Message => Some(Field::BodyText),
            Control::Time => Some(Field::Timestamp),
            _ => None,
        }
    }
}

/// Which widget is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedWidget {
    #[default]
    Controls,
    Preview,
}

impl FocusedWidget {
    pub fn next(&self) -> Self {
        match self {
            FocusedWidget::Controls => FocusedWidget::Preview,
            FocusedWidget::Preview => FocusedWidget::Controls,
        }
    }

    pub fn prev(&self) -> Self {
        self.next()
    }
}

/// Most recent successful export
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub image: RgbaImage,
}

/// Main application state
pub struct AppState {
    pub controller: PreviewController,

    // Navigation
    pub focus: FocusedWidget,
    pub selected: usize,
    pub show_help: bool,
    pub should_quit: bool,

    // Inline text editing
    pub editing: Option<Field>,
    pub edit_buffer: String,

    // Avatar path prompt
    pub avatar_prompt_active: bool,
    pub avatar_prompt_input: String,

    // Status line
    pub status_message: String,
    pub status_is_error: bool,

    // Export
    pub is_exporting: bool,
    pub last_export: Option<ExportedImage>,

    pub zoomed: bool,
    pub config: Config,

    worker_tx: Sender<WorkerMessage>,
}

impl AppState {
    pub fn new(config: Config, worker_tx: Sender<WorkerMessage>) -> Self {
        let draft = MessageDraft::from_defaults(&config.defaults);
        let controller = PreviewController::new(config.defaults.style, draft);

        Self {
            controller,
            focus: FocusedWidget::default(),
            selected: 0,
            show_help: config.ui.show_help_on_start,
            should_quit: false,

            editing: None,
            edit_buffer: String::new(),

            avatar_prompt_active: false,
            avatar_prompt_input: String::new(),

            status_message: "Ready - Press [?] for help".to_string(),
            status_is_error: false,

            is_exporting: false,
            last_export: None,

            zoomed: false,
            config,

            worker_tx,
        }
    }

    /// Set status message
    pub fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = message.to_string();
        self.status_is_error = is_error;
    }

    pub fn selected_control(&self) -> Control {
        Control::all()[self.selected % Control::all().len()]
    }

    pub fn next_control(&mut self) {
        self.selected = (self.selected + 1) % Control::all().len();
    }

    pub fn prev_control(&mut self) {
        let count = Control::all().len();
        self.selected = (self.selected + count - 1) % count;
    }

    pub fn set_style(&mut self, style: StyleId) {
        self.controller.set_style(style);
        self.set_status(&format!("Style: {}", style.name()), false);
    }

    pub fn next_style(&mut self) {
        self.set_style(self.controller.style().next());
    }

    pub fn prev_style(&mut self) {
        self.set_style(self.controller.style().prev());
    }

    /// Start editing a text field, seeded with its current value
    pub fn begin_edit(&mut self, field: Field) {
        self.edit_buffer = self.controller.draft().field(field).to_string();
        self.editing = Some(field);
        let hint = if field.is_multiline() {
            "Enter for new line, Esc to finish"
        } else {
            "Enter or Esc to finish"
        };
        self.set_status(&format!("Editing {}: {}", field.name(), hint), false);
    }

    pub fn edit_push(&mut self, c: char) {
        self.edit_buffer.push(c);
        self.sync_edit();
    }

    pub fn edit_pop(&mut self) {
        self.edit_buffer.pop();
        self.sync_edit();
    }

    /// Insert a line break if the field allows it; returns whether it did
    pub fn edit_newline(&mut self) -> bool {
        match self.editing {
            Some(field) if field.is_multiline() => {
                self.edit_buffer.push('\n');
                self.sync_edit();
                true
            }
            _ => false,
        }
    }

    pub fn finish_edit(&mut self) {
        if let Some(field) = self.editing.take() {
            self.set_status(&format!("{} updated", field.name()), false);
        }
        self.edit_buffer.clear();
    }

    // every keystroke goes straight to the preview
    fn sync_edit(&mut self) {
        if let Some(field) = self.editing {
            self.controller.update_field(field, &self.edit_buffer);
        }
    }

    pub fn toggle_read(&mut self) {
        let is_read = !self.controller.draft().is_read;
        self.controller.set_read_state(is_read);
        self.set_status(if is_read { "Marked as read" } else { "Marked as sent" }, false);
    }

    pub fn toggle_zoom(&mut self) {
        self.zoomed = !self.zoomed;
        let transform = self.zoomed.then(|| ZOOM_TRANSFORM.to_string());
        self.controller.set_transform(transform);
    }

    /// Start the avatar path prompt
    pub fn start_avatar_prompt(&mut self) {
        self.avatar_prompt_active = true;
        self.avatar_prompt_input.clear();
        self.set_status("Enter avatar image path and press Enter", false);
    }

    pub fn cancel_avatar_prompt(&mut self) {
        self.avatar_prompt_active = false;
        self.avatar_prompt_input.clear();
        self.set_status("Avatar unchanged", false);
    }

    /// Read the file named in the prompt and hand its bytes to the preview.
    /// Any failure keeps the current avatar.
    pub fn submit_avatar_prompt(&mut self) {
        let input = self.avatar_prompt_input.trim().to_string();
        if input.is_empty() {
            self.set_status("Path is empty", true);
            return;
        }

        let path = PathBuf::from(&input);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "avatar file unreadable");
                self.set_status(&format!("Cannot read {}: {}", input, e), true);
                return;
            }
        };

        match self.controller.set_avatar(&bytes) {
            Ok(()) => {
                self.avatar_prompt_active = false;
                self.avatar_prompt_input.clear();
                info!(path = %path.display(), "avatar updated");
                self.set_status(&format!("Avatar: {}", input), false);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "avatar rejected");
                self.set_status(&format!("Avatar unchanged: {}", e), true);
            }
        }
    }

    /// Queue an export of the current preview
    pub fn trigger_export(&mut self) {
        if self.is_exporting {
            return;
        }

        let msg = WorkerMessage::ExportRequest {
            node: self.controller.node().clone(),
        };
        if self.worker_tx.send(msg).is_err() {
            self.set_status("Export worker unavailable", true);
            return;
        }
        self.is_exporting = true;
        self.set_status("Exporting...", false);
    }

    /// Handle response from the export worker
    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        self.is_exporting = false;

        match response {
            WorkerResponse::Saved {
                path,
                image,
                elapsed_ms,
            } => {
                self.set_status(
                    &format!("Saved {} ({}ms)", path.display(), elapsed_ms),
                    false,
                );
                self.last_export = Some(ExportedImage { path, image });
                if self.config.export.copy_to_clipboard {
                    self.copy_last_export();
                }
            }
            WorkerResponse::Failed(err) => {
                self.set_status(&format!("Export failed: {}", err), true);
            }
        }
    }

    /// Put the last exported image on the system clipboard
    pub fn copy_last_export(&mut self) {
        let Some(ref export) = self.last_export else {
            self.set_status("Nothing to copy - export first", false);
            return;
        };

        let data = arboard::ImageData {
            width: export.image.width() as usize,
            height: export.image.height() as usize,
            bytes: Cow::Borrowed(export.image.as_raw()),
        };

        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_image(data));
        match result {
            Ok(()) => self.set_status("Copied image to clipboard", false),
            Err(e) => self.set_status(&format!("Clipboard unavailable: {}", e), true),
        }
    }
}
