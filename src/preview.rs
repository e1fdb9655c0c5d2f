//! Preview controller
//!
//! Owns the selected style and the message draft, and keeps a retained
//! preview tree in sync with them. Every setter re-derives [`PreviewState`]
//! and rewrites only the nodes that depend on what changed.

use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::draft::{Avatar, Field, MessageDraft};
use crate::image_loader::load_image_from_bytes;
use crate::style::{lookup, Icon, StyleId, READ_RECEIPT_MARKUP, SENT_RECEIPT_MARKUP};

/// Layout classes every preview container carries before the style class
pub const BASE_CONTAINER_CLASSES: &[&str] = &[
    "relative",
    "w-[375px]",
    "h-[667px]",
    "overflow-hidden",
    "shadow-2xl",
    "transition-all",
    "duration-300",
    "transform",
    "scale-90",
    "sm:scale-100",
    "origin-center",
];

/// Presentation-only drop shadow
pub const SHADOW_CLASS: &str = "shadow-2xl";

/// Avatars are drawn circular in every style
pub const AVATAR_ROUND_CLASS: &str = "rounded-full";

const HEADER_ICON_SIZE_CLASS: &str = "text-xl";

/// Render-ready projection of (style, draft)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewState {
    pub css_class: &'static str,
    pub status_text: &'static str,
    pub receipt_markup: &'static str,
    pub back_icon: Icon,
    pub menu_icon: Icon,
    pub displayed_name: String,
    pub displayed_body: String,
    pub displayed_time: String,
}

impl PreviewState {
    pub fn derive(style: StyleId, draft: &MessageDraft) -> Self {
        let config = lookup(style);
        let receipt_markup = if draft.is_read {
            READ_RECEIPT_MARKUP
        } else {
            SENT_RECEIPT_MARKUP
        };

        Self {
            css_class: config.css_class,
            status_text: config.default_status_text,
            receipt_markup,
            back_icon: config.back_icon_glyph,
            menu_icon: config.menu_icon_glyph,
            displayed_name: draft.sender_name.clone(),
            displayed_body: draft.body_text.clone(),
            displayed_time: draft.timestamp.clone(),
        }
    }
}

/// Retained preview tree, the thing that is drawn and exported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewNode {
    /// Style the node was last rendered in
    pub style: StyleId,
    pub classes: Vec<String>,
    /// Inline transform, `None` when unscaled
    pub transform: Option<String>,
    pub back_icon_classes: String,
    pub menu_icon_classes: String,
    pub name: String,
    pub status: String,
    pub avatar: Avatar,
    pub avatar_classes: Vec<String>,
    pub body: String,
    pub time: String,
    pub receipt_markup: String,
}

impl PreviewNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn back_icon(&self) -> Option<Icon> {
        Icon::from_classes(&self.back_icon_classes)
    }

    pub fn menu_icon(&self) -> Option<Icon> {
        Icon::from_classes(&self.menu_icon_classes)
    }
}

/// Avatar bytes that could not be turned into an image
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("no avatar data supplied")]
    Empty,
    #[error("could not decode avatar: {0}")]
    Decode(#[from] image::ImageError),
}

/// Keeps the preview synchronized with user input and the selected style
#[derive(Debug, Clone)]
pub struct PreviewController {
    style: StyleId,
    draft: MessageDraft,
    node: PreviewNode,
}

impl Default for PreviewController {
    fn default() -> Self {
        Self::new(StyleId::default(), MessageDraft::default())
    }
}

impl PreviewController {
    /// Create a controller and perform the initial full render
    pub fn new(style: StyleId, draft: MessageDraft) -> Self {
        let mut controller = Self {
            style,
            draft,
            node: PreviewNode::default(),
        };
        controller.node.avatar = controller.draft.avatar.clone();
        controller.set_style(style);
        controller
    }

    pub fn style(&self) -> StyleId {
        self.style
    }

    pub fn draft(&self) -> &MessageDraft {
        &self.draft
    }

    pub fn node(&self) -> &PreviewNode {
        &self.node
    }

    pub fn state(&self) -> PreviewState {
        PreviewState::derive(self.style, &self.draft)
    }

    /// Switch style and re-render everything that depends on it
    pub fn set_style(&mut self, id: StyleId) {
        self.style = id;
        let state = self.state();

        self.node.style = id;
        self.node.classes = BASE_CONTAINER_CLASSES
            .iter()
            .map(|class| class.to_string())
            .chain(std::iter::once(state.css_class.to_string()))
            .collect();

        self.node.back_icon_classes =
            format!("{} {}", state.back_icon.class_name(), HEADER_ICON_SIZE_CLASS);
        self.node.menu_icon_classes = state.menu_icon.class_name().to_string();

        if !self.node.avatar_classes.iter().any(|c| c == AVATAR_ROUND_CLASS) {
            self.node.avatar_classes.push(AVATAR_ROUND_CLASS.to_string());
        }

        self.node.status = state.status_text.to_string();

        self.render_text(&state);
        self.render_receipt(&state);
        debug!(style = %id, "style applied");
    }

    /// Update one text field and re-render the text nodes
    pub fn update_field(&mut self, field: Field, value: &str) {
        self.draft.set_field(field, value);
        let state = self.state();
        self.render_text(&state);
    }

    /// Update the read flag and re-render the receipt only
    pub fn set_read_state(&mut self, is_read: bool) {
        self.draft.is_read = is_read;
        let state = self.state();
        self.render_receipt(&state);
    }

    /// Decode user supplied bytes and show them as the avatar.
    ///
    /// On failure the current avatar stays in place.
    pub fn set_avatar(&mut self, image_bytes: &[u8]) -> Result<(), AvatarError> {
        if image_bytes.is_empty() {
            return Err(AvatarError::Empty);
        }
        let image = load_image_from_bytes(image_bytes)?;
        self.set_avatar_image(image);
        Ok(())
    }

    /// Show an already decoded image as the avatar
    pub fn set_avatar_image(&mut self, image: DynamicImage) {
        let avatar = Avatar::Image(Arc::new(image));
        self.draft.avatar = avatar.clone();
        self.node.avatar = avatar;
    }

    /// Presentation scaling of the live preview; never part of an export
    pub fn set_transform(&mut self, transform: Option<String>) {
        self.node.transform = transform;
    }

    fn render_text(&mut self, state: &PreviewState) {
        self.node.name.clone_from(&state.displayed_name);
        self.node.body.clone_from(&state.displayed_body);
        self.node.time.clone_from(&state.displayed_time);
    }

    fn render_receipt(&mut self, state: &PreviewState) {
        self.node.receipt_markup = state.receipt_markup.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::receipt_icons;

    #[test]
    fn test_initial_render() {
        let controller = PreviewController::default();
        assert_eq!(controller.style(), StyleId::TgAndroid);
        assert!(controller.node().has_class("style-tg-android"));
        assert!(controller.node().has_class(SHADOW_CLASS));
        assert_eq!(controller.node().status, "был(а) недавно");
        assert_eq!(controller.node().receipt_markup, SENT_RECEIPT_MARKUP);
        assert!(controller.node().avatar.is_placeholder());
    }

    #[test]
    fn test_set_style_replaces_previous_class() {
        let mut controller = PreviewController::default();
        controller.set_style(StyleId::Vk);
        controller.set_style(StyleId::TgIos);
        let node = controller.node();
        assert!(node.has_class("style-tg-ios"));
        assert_eq!(node.style, StyleId::TgIos);
        assert!(!node.has_class("style-vk"));
        assert!(!node.has_class("style-tg-android"));
        assert_eq!(node.classes.len(), BASE_CONTAINER_CLASSES.len() + 1);
        assert_eq!(node.back_icon(), Some(Icon::ChevronLeft));
        assert_eq!(node.menu_icon(), Some(Icon::CircleUser));
    }

    #[test]
    fn test_set_style_twice_is_idempotent() {
        let mut once = PreviewController::default();
        once.set_style(StyleId::Vk);
        let mut twice = once.clone();
        twice.set_style(StyleId::Vk);
        assert_eq!(once.node(), twice.node());
    }

    #[test]
    fn test_read_receipt_ignores_style() {
        for &id in StyleId::all() {
            let mut controller = PreviewController::default();
            controller.set_style(id);
            controller.set_read_state(true);
            assert_eq!(controller.node().receipt_markup, READ_RECEIPT_MARKUP);
            assert_eq!(receipt_icons(&controller.node().receipt_markup), vec![Icon::CheckDouble]);

            controller.set_read_state(false);
            controller.set_read_state(false);
            assert_eq!(receipt_icons(&controller.node().receipt_markup), vec![Icon::Check]);
        }
    }

    #[test]
    fn test_update_field_leaves_receipt_and_status() {
        let mut controller = PreviewController::default();
        controller.set_read_state(true);
        controller.update_field(Field::SenderName, "Anna");
        assert_eq!(controller.node().name, "Anna");
        assert_eq!(controller.node().receipt_markup, READ_RECEIPT_MARKUP);
        assert_eq!(controller.node().status, "был(а) недавно");
    }

    #[test]
    fn test_empty_fields_render_empty() {
        let mut controller = PreviewController::default();
        controller.update_field(Field::Timestamp, "14:02");
        controller.update_field(Field::Timestamp, "");
        assert_eq!(controller.node().time, "");
    }

    #[test]
    fn test_bad_avatar_keeps_previous() {
        let mut controller = PreviewController::default();
        assert!(matches!(controller.set_avatar(&[]), Err(AvatarError::Empty)));
        assert!(matches!(
            controller.set_avatar(b"definitely not an image"),
            Err(AvatarError::Decode(_))
        ));
        assert!(controller.node().avatar.is_placeholder());

        controller.set_avatar_image(DynamicImage::new_rgb8(4, 4));
        let before = controller.node().avatar.clone();
        assert!(controller.set_avatar(b"junk").is_err());
        assert_eq!(controller.node().avatar, before);
    }

    #[test]
    fn test_avatar_stays_across_style_changes() {
        let mut controller = PreviewController::default();
        controller.set_avatar_image(DynamicImage::new_rgb8(2, 2));
        controller.set_style(StyleId::Vk);
        assert!(!controller.node().avatar.is_placeholder());
        assert_eq!(
            controller.node().avatar_classes,
            vec![AVATAR_ROUND_CLASS.to_string()]
        );
    }

    #[test]
    fn test_controllers_are_independent() {
        let mut a = PreviewController::default();
        let b = PreviewController::default();
        a.set_style(StyleId::Vk);
        a.update_field(Field::SenderName, "Anna");
        assert_eq!(b.style(), StyleId::TgAndroid);
        assert_eq!(b.node().name, "");
    }
}
