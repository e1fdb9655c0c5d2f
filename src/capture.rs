//! Capture and export
//!
//! Turns the current preview into a PNG file. The export works on an
//! off-screen copy of the preview laid out for export (no shadow, no scaling,
//! pinned to the phone frame), so the live preview is never touched.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::{info, warn};

use crate::preview::{PreviewNode, SHADOW_CLASS};
use crate::raster::FrameRasterizer;
use crate::style::StyleId;

/// Logical frame width in layout units
pub const EXPORT_WIDTH: u32 = 375;
/// Logical frame height in layout units
pub const EXPORT_HEIGHT: u32 = 667;
/// Pixel density multiplier
pub const EXPORT_SCALE: u32 = 3;

/// Errors that stop an export from producing a file
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("could not save {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Size and density of the exported bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: EXPORT_WIDTH,
            height: EXPORT_HEIGHT,
            scale: EXPORT_SCALE,
        }
    }
}

impl CaptureOptions {
    /// Output bitmap size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width * self.scale, self.height * self.scale)
    }
}

/// Export-layout copy of a preview node
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFrame {
    pub style: StyleId,
    pub node: PreviewNode,
    pub width: u32,
    pub height: u32,
}

impl ExportFrame {
    pub fn from_node(node: &PreviewNode, options: &CaptureOptions) -> Self {
        let style = node.style;
        let mut node = node.clone();
        node.classes
            .retain(|class| class != SHADOW_CLASS && !is_scale_class(class));
        node.transform = None;

        Self {
            style,
            node,
            width: options.width,
            height: options.height,
        }
    }
}

/// `scale-90`, `sm:scale-100` and friends
fn is_scale_class(class: &str) -> bool {
    class
        .rsplit(':')
        .next()
        .map(|base| base.starts_with("scale-"))
        .unwrap_or(false)
}

/// Draws an export frame into a bitmap
pub trait Rasterizer {
    fn rasterize(
        &self,
        frame: &ExportFrame,
        options: &CaptureOptions,
    ) -> Result<RgbaImage, CaptureError>;
}

/// Receives the finished file
pub trait ExportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CaptureError>;
}

/// Saves exports into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CaptureError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CaptureError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|source| CaptureError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub file_name: String,
    pub image: RgbaImage,
    pub elapsed_ms: u64,
}

/// `fake-message-<styleId>-<unixTimeMillis>.png`
pub fn export_filename(style: StyleId, unix_millis: u64) -> String {
    format!("fake-message-{}-{}.png", style.id(), unix_millis)
}

/// Milliseconds since the Unix epoch
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Lossless PNG encoding
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Produces downloadable bitmaps of the preview
#[derive(Debug, Clone)]
pub struct CaptureExporter<R = FrameRasterizer, S = DirectorySink> {
    rasterizer: R,
    sink: S,
    options: CaptureOptions,
}

impl<R: Rasterizer, S: ExportSink> CaptureExporter<R, S> {
    pub fn new(rasterizer: R, sink: S) -> Self {
        Self {
            rasterizer,
            sink,
            options: CaptureOptions::default(),
        }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Export the node as it looks right now
    pub fn export(&self, node: &PreviewNode) -> Result<ExportOutcome, CaptureError> {
        self.export_at(node, unix_millis())
    }

    /// Export with an explicit timestamp for the file name
    pub fn export_at(
        &self,
        node: &PreviewNode,
        unix_millis: u64,
    ) -> Result<ExportOutcome, CaptureError> {
        let start = Instant::now();
        let style = node.style;
        let frame = ExportFrame::from_node(node, &self.options);

        let image = self.rasterizer.rasterize(&frame, &self.options).map_err(|e| {
            warn!(style = %style, error = %e, "rasterization failed");
            e
        })?;
        let bytes = encode_png(&image)?;

        let file_name = export_filename(style, unix_millis);
        let path = self.sink.save(&file_name, &bytes)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(path = %path.display(), elapsed_ms, "exported preview");
        Ok(ExportOutcome {
            path,
            file_name,
            image,
            elapsed_ms,
        })
    }
}

impl<R, S> CaptureExporter<R, S>
where
    R: Rasterizer + Send + Sync + 'static,
    S: ExportSink + Send + Sync + 'static,
{
    /// Run the export on the blocking pool and resolve with its result
    pub async fn export_async(
        self: Arc<Self>,
        node: PreviewNode,
    ) -> Result<ExportOutcome, CaptureError> {
        tokio::task::spawn_blocking(move || self.export(&node)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewController;
    use image::Rgba;

    struct SolidRasterizer;

    impl Rasterizer for SolidRasterizer {
        fn rasterize(
            &self,
            _frame: &ExportFrame,
            options: &CaptureOptions,
        ) -> Result<RgbaImage, CaptureError> {
            let (w, h) = options.pixel_size();
            Ok(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])))
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(
            &self,
            _frame: &ExportFrame,
            _options: &CaptureOptions,
        ) -> Result<RgbaImage, CaptureError> {
            Err(CaptureError::Rasterize("tainted canvas".to_string()))
        }
    }

    #[test]
    fn test_pixel_size() {
        assert_eq!(CaptureOptions::default().pixel_size(), (1125, 2001));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(StyleId::Vk, 1_700_000_000_000),
            "fake-message-vk-1700000000000.png"
        );
    }

    #[test]
    fn test_scale_classes() {
        assert!(is_scale_class("scale-90"));
        assert!(is_scale_class("sm:scale-100"));
        assert!(!is_scale_class("transform"));
        assert!(!is_scale_class("style-vk"));
    }

    #[test]
    fn test_export_frame_strips_adornments() {
        let mut controller = PreviewController::default();
        controller.set_transform(Some("scale(0.9)".to_string()));
        let frame = ExportFrame::from_node(controller.node(), &CaptureOptions::default());

        assert!(!frame.node.has_class(SHADOW_CLASS));
        assert!(!frame.node.has_class("scale-90"));
        assert!(!frame.node.has_class("sm:scale-100"));
        assert!(frame.node.has_class("style-tg-android"));
        assert_eq!(frame.style, StyleId::TgAndroid);
        assert_eq!(frame.node.transform, None);
        assert_eq!((frame.width, frame.height), (375, 667));
        // the live node keeps its adornments
        assert!(controller.node().has_class(SHADOW_CLASS));
        assert_eq!(controller.node().transform.as_deref(), Some("scale(0.9)"));
    }

    #[test]
    fn test_failed_export_leaves_node_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = PreviewController::default();
        controller.set_transform(Some("scale(0.9)".to_string()));
        let before = controller.node().clone();

        let exporter = CaptureExporter::new(FailingRasterizer, DirectorySink::new(dir.path()));
        let result = exporter.export(controller.node());

        assert!(matches!(result, Err(CaptureError::Rasterize(_))));
        assert_eq!(controller.node(), &before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let controller = PreviewController::new(StyleId::TgIos, Default::default());
        let exporter = CaptureExporter::new(SolidRasterizer, DirectorySink::new(dir.path()));

        let outcome = exporter.export_at(controller.node(), 42).unwrap();

        assert_eq!(outcome.file_name, "fake-message-tg-ios-42.png");
        assert_eq!(outcome.path, dir.path().join("fake-message-tg-ios-42.png"));
        let written = image::open(&outcome.path).unwrap();
        assert_eq!((written.width(), written.height()), (1125, 2001));
    }

    #[tokio::test]
    async fn test_export_async_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Arc::new(CaptureExporter::new(
            FailingRasterizer,
            DirectorySink::new(dir.path()),
        ));
        let node = PreviewController::new(StyleId::Vk, Default::default()).node().clone();

        let result = exporter.export_async(node).await;
        assert!(matches!(result, Err(CaptureError::Rasterize(_))));
    }
}
