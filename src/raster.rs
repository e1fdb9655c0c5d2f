//! Frame rasterizer
//!
//! Paints an [`ExportFrame`] as a phone screenshot: header with back icon,
//! circular avatar, name, status and menu icon, the chat area with one
//! outgoing bubble, and the input bar. All layout is in logical units and
//! multiplied by the capture scale when drawing.

use std::fmt;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use palette::Srgb;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::capture::{CaptureError, CaptureOptions, ExportFrame, Rasterizer};
use crate::config::RenderPreferences;
use crate::draft::Avatar;
use crate::style::{receipt_icons, Icon, StyleId, ThemePalette};

/// DejaVu Sans, used when no font is configured
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const HEADER_HEIGHT: f32 = 56.0;
const INPUT_BAR_HEIGHT: f32 = 56.0;
const AVATAR_DIAMETER: f32 = 40.0;
const AVATAR_X: f32 = 52.0;
const NAME_X: f32 = 104.0;
const NAME_SIZE: f32 = 17.0;
const STATUS_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 16.0;
const BODY_LINE_HEIGHT: f32 = 21.0;
const TIME_SIZE: f32 = 12.0;
const BUBBLE_MAX_WIDTH: f32 = 280.0;
const BUBBLE_PAD_X: f32 = 10.0;
const BUBBLE_PAD_Y: f32 = 7.0;
const BUBBLE_MARGIN: f32 = 8.0;
const FOOTER_GAP: f32 = 8.0;
const INPUT_PLACEHOLDER: &str = "Сообщение";

/// Load a TrueType/OpenType font from disk
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read font: {:?}", path))?;
    FontArc::try_from_vec(bytes).map_err(|_| anyhow!("Not a usable font: {:?}", path))
}

/// The font compiled into the binary
pub fn bundled_font() -> Result<FontArc> {
    FontArc::try_from_slice(BUNDLED_FONT).map_err(|_| anyhow!("bundled font is corrupt"))
}

/// Default rasterizer backed by imageproc and ab_glyph.
///
/// Without a font it refuses to rasterize rather than export a screenshot
/// with the text missing.
#[derive(Clone)]
pub struct FrameRasterizer {
    font: Option<FontArc>,
}

impl fmt::Debug for FrameRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRasterizer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Default for FrameRasterizer {
    fn default() -> Self {
        Self::bundled()
    }
}

impl FrameRasterizer {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    pub fn bundled() -> Self {
        match bundled_font() {
            Ok(font) => Self::new(Some(font)),
            Err(e) => {
                warn!(error = %e, "no font available, exports will fail");
                Self::new(None)
            }
        }
    }

    /// Use the configured font, falling back to the bundled one
    pub fn from_preferences(prefs: &RenderPreferences) -> Self {
        if let Some(ref path) = prefs.font_path {
            match load_font(path) {
                Ok(font) => {
                    debug!(path = %path.display(), "using configured font");
                    return Self::new(Some(font));
                }
                Err(e) => warn!(error = %e, "configured font unusable, using bundled font"),
            }
        }
        Self::bundled()
    }
}

impl Rasterizer for FrameRasterizer {
    fn rasterize(
        &self,
        frame: &ExportFrame,
        options: &CaptureOptions,
    ) -> Result<RgbaImage, CaptureError> {
        if frame.width == 0 || frame.height == 0 || options.scale == 0 {
            return Err(CaptureError::Rasterize("empty frame".to_string()));
        }
        let Some(font) = self.font.as_ref() else {
            return Err(CaptureError::Rasterize("no font loaded".to_string()));
        };

        let mut painter = Painter {
            canvas: RgbaImage::new(frame.width * options.scale, frame.height * options.scale),
            scale: options.scale as f32,
            font,
        };
        let theme = ThemePalette::for_style(frame.style);
        let (width, height) = (frame.width as f32, frame.height as f32);

        painter.fill_rect(0.0, 0.0, width, height, theme.chat_background);
        paint_header(&mut painter, frame, &theme, width);
        paint_input_bar(&mut painter, &theme, width, height);
        paint_bubble(&mut painter, frame, &theme, width, height - INPUT_BAR_HEIGHT);

        Ok(painter.canvas)
    }
}

fn paint_header(painter: &mut Painter<'_>, frame: &ExportFrame, theme: &ThemePalette, width: f32) {
    let node = &frame.node;
    let mid = HEADER_HEIGHT / 2.0;

    painter.fill_rect(0.0, 0.0, width, HEADER_HEIGHT, theme.header);
    if frame.style != StyleId::TgAndroid {
        painter.fill_rect(0.0, HEADER_HEIGHT - 0.5, width, 0.5, Srgb::new(0xd0, 0xd0, 0xd0));
    }

    if let Some(icon) = node.back_icon() {
        painter.icon(icon, 24.0, mid, theme.accent);
    }

    paint_avatar(painter, &node.avatar, &node.name, theme, AVATAR_X, mid - AVATAR_DIAMETER / 2.0);

    painter.text(&node.name, NAME_X, 9.0, NAME_SIZE, theme.header_text);
    painter.text(&node.status, NAME_X, 31.0, STATUS_SIZE, theme.status_colour());

    if let Some(icon) = node.menu_icon() {
        painter.icon(icon, width - 28.0, mid, theme.accent);
    }
}

fn paint_avatar(
    painter: &mut Painter<'_>,
    avatar: &Avatar,
    name: &str,
    theme: &ThemePalette,
    x: f32,
    y: f32,
) {
    let radius = AVATAR_DIAMETER / 2.0;
    match avatar {
        Avatar::Image(image) => {
            let diameter = painter.px(AVATAR_DIAMETER).max(1) as u32;
            let scaled = image
                .resize_to_fill(diameter, diameter, FilterType::Triangle)
                .to_rgba8();
            painter.blit_circle(&scaled, painter.px(x), painter.px(y));
        }
        Avatar::Placeholder => {
            painter.fill_circle(x + radius, y + radius, radius, theme.avatar_placeholder);
            let initial: String = name
                .graphemes(true)
                .next()
                .map(|g| g.to_uppercase())
                .unwrap_or_default();
            if !initial.is_empty() {
                let w = painter.text_width(&initial, NAME_SIZE);
                painter.text(
                    &initial,
                    x + radius - w / 2.0,
                    y + radius - NAME_SIZE * 0.6,
                    NAME_SIZE,
                    Srgb::new(0xff, 0xff, 0xff),
                );
            }
        }
    }
}

fn paint_input_bar(painter: &mut Painter<'_>, theme: &ThemePalette, width: f32, height: f32) {
    let top = height - INPUT_BAR_HEIGHT;
    painter.fill_rect(0.0, top, width, INPUT_BAR_HEIGHT, theme.input_bar);
    painter.fill_rect(0.0, top, width, 0.5, Srgb::new(0xd9, 0xd9, 0xd9));
    painter.text(INPUT_PLACEHOLDER, 16.0, top + 19.0, BODY_SIZE, theme.time);
}

fn paint_bubble(
    painter: &mut Painter<'_>,
    frame: &ExportFrame,
    theme: &ThemePalette,
    width: f32,
    bottom: f32,
) {
    let node = &frame.node;
    let max_text = BUBBLE_MAX_WIDTH - 2.0 * BUBBLE_PAD_X;
    let mut lines = wrap_text(painter, &node.body, max_text, BODY_SIZE);

    let icons = receipt_icons(&node.receipt_markup);
    let receipt_width: f32 = icons.iter().map(|icon| icon_width(*icon)).sum();
    let time_width = painter.text_width(&node.time, TIME_SIZE);
    let footer_width = time_width + 4.0 + receipt_width;

    let last_width = lines
        .last()
        .map(|line| painter.text_width(line, BODY_SIZE))
        .unwrap_or(0.0);
    let inline_footer = last_width + FOOTER_GAP + footer_width <= max_text;
    let footer_height = if inline_footer { 0.0 } else { TIME_SIZE + 4.0 };

    // keep the end of a long message, like a chat scrolled to the bottom
    let ceiling = HEADER_HEIGHT + BUBBLE_MARGIN;
    let room = bottom - BUBBLE_MARGIN - ceiling - footer_height - 2.0 * BUBBLE_PAD_Y;
    let fit = ((room / BODY_LINE_HEIGHT).floor() as usize).max(1);
    if lines.len() > fit {
        lines.drain(..lines.len() - fit);
    }

    let widest = lines
        .iter()
        .map(|line| painter.text_width(line, BODY_SIZE))
        .fold(0.0_f32, f32::max);
    let content_width = if inline_footer {
        widest.max(last_width + FOOTER_GAP + footer_width)
    } else {
        widest.max(footer_width)
    };
    let text_height = (lines.len() as f32).max(1.0) * BODY_LINE_HEIGHT;
    let bubble_h = text_height + footer_height + 2.0 * BUBBLE_PAD_Y;
    let bubble_w = content_width + 2.0 * BUBBLE_PAD_X;

    let left = width - BUBBLE_MARGIN - bubble_w;
    let top = (bottom - BUBBLE_MARGIN - bubble_h).max(ceiling);
    let radius = if frame.style == StyleId::Vk { 16.0 } else { 12.0 };
    painter.fill_rounded_rect(left, top, bubble_w, bubble_h, radius, theme.bubble);

    for (idx, line) in lines.iter().enumerate() {
        let y = top + BUBBLE_PAD_Y + idx as f32 * BODY_LINE_HEIGHT + 2.0;
        painter.text(line, left + BUBBLE_PAD_X, y, BODY_SIZE, theme.text);
    }

    let footer_bottom = top + bubble_h - BUBBLE_PAD_Y;
    let footer_right = left + bubble_w - BUBBLE_PAD_X;
    let time_x = footer_right - footer_width;
    painter.text(&node.time, time_x, footer_bottom - TIME_SIZE - 1.0, TIME_SIZE, theme.time);

    let mut icon_x = footer_right - receipt_width;
    for icon in icons {
        let w = icon_width(icon);
        painter.icon(icon, icon_x + w / 2.0, footer_bottom - 6.0, theme.receipt);
        icon_x += w;
    }
}

fn icon_width(icon: Icon) -> f32 {
    match icon {
        Icon::Check => 12.0,
        Icon::CheckDouble => 16.0,
        _ => 20.0,
    }
}

/// Split body text into display lines. Literal line breaks always start a
/// new line; long paragraphs wrap on word boundaries.
fn wrap_text(painter: &Painter<'_>, text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut current = String::new();
        for word in paragraph.split_word_bounds() {
            let candidate = format!("{}{}", current, word);
            if current.is_empty() || painter.text_width(candidate.trim_end(), size) <= max_width {
                current = candidate;
            } else {
                lines.push(current.trim_end().to_string());
                current = word.trim_start().to_string();
            }
            if painter.text_width(current.trim_end(), size) > max_width {
                // a single word wider than the bubble breaks between graphemes
                let mut pieces = break_graphemes(painter, &current, max_width, size);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(current.trim_end().to_string());
    }
    lines
}

fn break_graphemes(painter: &Painter<'_>, word: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for g in word.graphemes(true) {
        let candidate = format!("{}{}", current, g);
        if !current.is_empty() && painter.text_width(&candidate, size) > max_width {
            pieces.push(std::mem::take(&mut current));
            current.push_str(g);
        } else {
            current = candidate;
        }
    }
    pieces.push(current);
    pieces
}

fn rgba(colour: Srgb<u8>) -> Rgba<u8> {
    Rgba([colour.red, colour.green, colour.blue, 255])
}

struct Painter<'a> {
    canvas: RgbaImage,
    scale: f32,
    font: &'a FontArc,
}

impl Painter<'_> {
    fn px(&self, v: f32) -> i32 {
        (v * self.scale).round() as i32
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let (w, _) = text_size(PxScale::from(size * self.scale), self.font, text);
        w as f32 / self.scale
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, colour: Srgb<u8>) {
        if text.is_empty() {
            return;
        }
        let (x, y) = (self.px(x), self.px(y));
        draw_text_mut(
            &mut self.canvas,
            rgba(colour),
            x,
            y,
            PxScale::from(size * self.scale),
            self.font,
            text,
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Srgb<u8>) {
        let (w, h) = (self.px(w).max(1) as u32, self.px(h).max(1) as u32);
        let rect = Rect::at(self.px(x), self.px(y)).of_size(w, h);
        draw_filled_rect_mut(&mut self.canvas, rect, rgba(colour));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, colour: Srgb<u8>) {
        let centre = (self.px(cx), self.px(cy));
        let r = self.px(r);
        draw_filled_circle_mut(&mut self.canvas, centre, r, rgba(colour));
    }

    fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, colour: Srgb<u8>) {
        let r = r.min(w / 2.0).min(h / 2.0);
        self.fill_rect(x + r, y, w - 2.0 * r, h, colour);
        self.fill_rect(x, y + r, w, h - 2.0 * r, colour);
        for (cx, cy) in [
            (x + r, y + r),
            (x + w - r, y + r),
            (x + r, y + h - r),
            (x + w - r, y + h - r),
        ] {
            self.fill_circle(cx, cy, r, colour);
        }
    }

    /// Thick line with round caps
    fn stroke(&mut self, a: (f32, f32), b: (f32, f32), width: f32, colour: Srgb<u8>) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            return;
        }
        let (nx, ny) = (-dy / len * width / 2.0, dx / len * width / 2.0);
        let corners = [
            (a.0 + nx, a.1 + ny),
            (b.0 + nx, b.1 + ny),
            (b.0 - nx, b.1 - ny),
            (a.0 - nx, a.1 - ny),
        ];
        let points: Vec<Point<i32>> = corners
            .iter()
            .map(|&(x, y)| Point::new(self.px(x), self.px(y)))
            .collect();
        if points.first() != points.last() && points.windows(2).all(|w| w[0] != w[1]) {
            draw_polygon_mut(&mut self.canvas, &points, rgba(colour));
        }
        self.fill_circle(a.0, a.1, width / 2.0, colour);
        self.fill_circle(b.0, b.1, width / 2.0, colour);
    }

    fn polyline(&mut self, points: &[(f32, f32)], width: f32, colour: Srgb<u8>) {
        for pair in points.windows(2) {
            self.stroke(pair[0], pair[1], width, colour);
        }
    }

    fn icon(&mut self, icon: Icon, cx: f32, cy: f32, colour: Srgb<u8>) {
        match icon {
            Icon::ArrowLeft => {
                self.stroke((cx + 8.0, cy), (cx - 8.0, cy), 2.0, colour);
                self.polyline(&[(cx - 1.0, cy - 7.0), (cx - 8.0, cy), (cx - 1.0, cy + 7.0)], 2.0, colour);
            }
            Icon::ChevronLeft => {
                self.polyline(&[(cx + 4.0, cy - 9.0), (cx - 5.0, cy), (cx + 4.0, cy + 9.0)], 2.5, colour);
            }
            Icon::EllipsisV => {
                for dy in [-6.0, 0.0, 6.0] {
                    self.fill_circle(cx, cy + dy, 2.0, colour);
                }
            }
            Icon::EllipsisH => {
                for dx in [-6.0, 0.0, 6.0] {
                    self.fill_circle(cx + dx, cy, 2.0, colour);
                }
            }
            Icon::CircleUser => {
                self.fill_circle(cx, cy, 11.0, colour);
                let cutout = Srgb::new(0xff, 0xff, 0xff);
                self.fill_circle(cx, cy - 3.0, 4.0, cutout);
                self.fill_circle(cx, cy + 6.0, 5.0, cutout);
            }
            Icon::Check => self.check(cx - 5.0, cy - 4.0, colour),
            Icon::CheckDouble => {
                self.check(cx - 7.0, cy - 4.0, colour);
                self.stroke((cx - 0.5, cy + 3.5), (cx + 7.0, cy - 3.0), 1.5, colour);
            }
        }
    }

    fn check(&mut self, x: f32, y: f32, colour: Srgb<u8>) {
        self.polyline(&[(x, y + 4.0), (x + 3.5, y + 7.5), (x + 10.0, y + 1.0)], 1.5, colour);
    }

    /// Copy `src` onto the canvas through a circular mask
    fn blit_circle(&mut self, src: &RgbaImage, left: i32, top: i32) {
        let r = src.width().min(src.height()) as f32 / 2.0;
        let (cw, ch) = (self.canvas.width() as i32, self.canvas.height() as i32);
        for (sx, sy, pixel) in src.enumerate_pixels() {
            let dx = sx as f32 + 0.5 - r;
            let dy = sy as f32 + 0.5 - r;
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (left + sx as i32, top + sy as i32);
            if x < 0 || y < 0 || x >= cw || y >= ch {
                continue;
            }
            self.canvas.get_pixel_mut(x as u32, y as u32).blend(pixel);
        }
    }
}
