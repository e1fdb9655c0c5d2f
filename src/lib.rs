//! chatmock - Fake Messenger Screenshot Studio
//!
//! A TUI application for composing a single incoming chat message in the look
//! of Telegram Android, Telegram iOS or VK and exporting it as a phone-sized PNG.

pub mod capture;
pub mod config;
pub mod draft;
pub mod image_loader;
pub mod input;
pub mod logging;
pub mod preview;
pub mod raster;
pub mod state;
pub mod style;
pub mod ui;
pub mod worker;

// Re-export commonly used types
pub use capture::{CaptureError, CaptureExporter, DirectorySink};
pub use config::Config;
pub use draft::{Field, MessageDraft};
pub use preview::{PreviewController, PreviewNode};
pub use raster::FrameRasterizer;
pub use state::AppState;
pub use style::StyleId;
