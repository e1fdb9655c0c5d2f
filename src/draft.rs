//! Message draft
//!
//! The user-entered content that backs the preview.

use std::sync::Arc;

use image::DynamicImage;

use crate::config::DraftDefaults;

/// Editable text fields of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SenderName,
    BodyText,
    Timestamp,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::SenderName => "Name",
            Field::BodyText => "Message",
            Field::Timestamp => "Time",
        }
    }

    pub fn all() -> &'static [Field] {
        &[Field::SenderName, Field::BodyText, Field::Timestamp]
    }

    /// Whether the field accepts embedded line breaks
    pub fn is_multiline(&self) -> bool {
        matches!(self, Field::BodyText)
    }
}

/// Avatar source shown in the header
#[derive(Debug, Clone, Default)]
pub enum Avatar {
    #[default]
    Placeholder,
    Image(Arc<DynamicImage>),
}

impl Avatar {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Avatar::Placeholder)
    }
}

impl PartialEq for Avatar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Avatar::Placeholder, Avatar::Placeholder) => true,
            (Avatar::Image(a), Avatar::Image(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Mutable message content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageDraft {
    pub sender_name: String,
    /// Kept verbatim, including line breaks
    pub body_text: String,
    /// Free-form, never parsed
    pub timestamp: String,
    pub is_read: bool,
    pub avatar: Avatar,
}

impl MessageDraft {
    pub fn from_defaults(defaults: &DraftDefaults) -> Self {
        Self {
            sender_name: defaults.sender_name.clone(),
            body_text: defaults.body_text.clone(),
            timestamp: defaults.timestamp.clone(),
            is_read: defaults.read,
            avatar: Avatar::Placeholder,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::SenderName => &self.sender_name,
            Field::BodyText => &self.body_text,
            Field::Timestamp => &self.timestamp,
        }
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::SenderName => &mut self.sender_name,
            Field::BodyText => &mut self.body_text,
            Field::Timestamp => &mut self.timestamp,
        };
        slot.clear();
        slot.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft_is_empty() {
        let draft = MessageDraft::default();
        assert!(draft.sender_name.is_empty());
        assert!(draft.body_text.is_empty());
        assert!(draft.timestamp.is_empty());
        assert!(!draft.is_read);
        assert!(draft.avatar.is_placeholder());
    }

    #[test]
    fn test_set_field_keeps_line_breaks() {
        let mut draft = MessageDraft::default();
        draft.set_field(Field::BodyText, "line1\n\nline3\r\n");
        assert_eq!(draft.field(Field::BodyText), "line1\n\nline3\r\n");
    }

    #[test]
    fn test_avatar_equality_is_by_identity() {
        let image = Arc::new(DynamicImage::new_rgb8(1, 1));
        let a = Avatar::Image(Arc::clone(&image));
        let b = Avatar::Image(image);
        let c = Avatar::Image(Arc::new(DynamicImage::new_rgb8(1, 1)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Avatar::Placeholder);
    }
}
