//! Style registry
//!
//! Static mapping from a messenger style to its visual configuration.

use std::fmt;
use std::str::FromStr;

use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Receipt markup shown for a read message, shared by every style.
pub const READ_RECEIPT_MARKUP: &str = r#"<i class="fas fa-check-double check-icon"></i>"#;

/// Receipt markup shown for a sent but unread message.
pub const SENT_RECEIPT_MARKUP: &str = r#"<i class="fas fa-check check-icon"></i>"#;

/// Messenger look selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StyleId {
    #[default]
    #[serde(rename = "tg-android")]
    TgAndroid,
    #[serde(rename = "tg-ios")]
    TgIos,
    #[serde(rename = "vk")]
    Vk,
}

static ALL_STYLES: [StyleId; 3] = [StyleId::TgAndroid, StyleId::TgIos, StyleId::Vk];

impl StyleId {
    /// Stable identifier used in file names, config and CLI flags
    pub fn id(&self) -> &'static str {
        match self {
            StyleId::TgAndroid => "tg-android",
            StyleId::TgIos => "tg-ios",
            StyleId::Vk => "vk",
        }
    }

    /// Human readable name for the selector
    pub fn name(&self) -> &'static str {
        match self {
            StyleId::TgAndroid => "Telegram Android",
            StyleId::TgIos => "Telegram iOS",
            StyleId::Vk => "VK",
        }
    }

    pub fn all() -> &'static [StyleId] {
        &ALL_STYLES[..]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|s| s == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|s| s == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A style identifier that does not name any known style
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown style '{0}' (expected one of: tg-android, tg-ios, vk)")]
pub struct UnknownStyle(pub String);

impl FromStr for StyleId {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleId::all()
            .iter()
            .copied()
            .find(|style| style.id() == s.trim())
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

/// Glyphs used in the header and the read receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    ArrowLeft,
    ChevronLeft,
    EllipsisV,
    EllipsisH,
    CircleUser,
    Check,
    CheckDouble,
}

impl Icon {
    /// Icon font class list, e.g. `fas fa-arrow-left`
    pub fn class_name(&self) -> &'static str {
        match self {
            Icon::ArrowLeft => "fas fa-arrow-left",
            Icon::ChevronLeft => "fas fa-chevron-left",
            Icon::EllipsisV => "fas fa-ellipsis-v",
            Icon::EllipsisH => "fas fa-ellipsis-h",
            Icon::CircleUser => "fas fa-circle-user",
            Icon::Check => "fas fa-check",
            Icon::CheckDouble => "fas fa-check-double",
        }
    }

    /// Closest single-cell stand-in for the terminal preview
    pub fn symbol(&self) -> &'static str {
        match self {
            Icon::ArrowLeft => "←",
            Icon::ChevronLeft => "‹",
            Icon::EllipsisV => "⋮",
            Icon::EllipsisH => "⋯",
            Icon::CircleUser => "◉",
            Icon::Check => "✓",
            Icon::CheckDouble => "✓✓",
        }
    }

    /// Resolve an icon from any class list that contains its `fa-*` class
    pub fn from_classes(classes: &str) -> Option<Icon> {
        classes.split_whitespace().find_map(|class| match class {
            "fa-arrow-left" => Some(Icon::ArrowLeft),
            "fa-chevron-left" => Some(Icon::ChevronLeft),
            "fa-ellipsis-v" => Some(Icon::EllipsisV),
            "fa-ellipsis-h" => Some(Icon::EllipsisH),
            "fa-circle-user" => Some(Icon::CircleUser),
            "fa-check" => Some(Icon::Check),
            "fa-check-double" => Some(Icon::CheckDouble),
            _ => None,
        })
    }
}

/// Immutable visual parameters of one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleConfig {
    pub css_class: &'static str,
    pub default_status_text: &'static str,
    /// Per-style read markup. Rendering currently ignores it in favour of
    /// [`READ_RECEIPT_MARKUP`].
    pub read_receipt_markup: &'static str,
    pub back_icon_glyph: Icon,
    pub menu_icon_glyph: Icon,
}

static TG_ANDROID: StyleConfig = StyleConfig {
    css_class: "style-tg-android",
    default_status_text: "был(а) недавно",
    read_receipt_markup: READ_RECEIPT_MARKUP,
    back_icon_glyph: Icon::ArrowLeft,
    menu_icon_glyph: Icon::EllipsisV,
};

static TG_IOS: StyleConfig = StyleConfig {
    css_class: "style-tg-ios",
    default_status_text: "был(а) недавно",
    read_receipt_markup: READ_RECEIPT_MARKUP,
    back_icon_glyph: Icon::ChevronLeft,
    menu_icon_glyph: Icon::CircleUser,
};

static VK: StyleConfig = StyleConfig {
    css_class: "style-vk",
    default_status_text: "в сети",
    read_receipt_markup: r#"<i class="fas fa-check check-icon"></i><i class="fas fa-check check-icon" style="margin-left:-4px;"></i>"#,
    back_icon_glyph: Icon::ChevronLeft,
    menu_icon_glyph: Icon::EllipsisH,
};

/// Look up the configuration for a style
pub fn lookup(id: StyleId) -> &'static StyleConfig {
    match id {
        StyleId::TgAndroid => &TG_ANDROID,
        StyleId::TgIos => &TG_IOS,
        StyleId::Vk => &VK,
    }
}

/// Extract the icons named by a receipt markup fragment, in order
pub fn receipt_icons(markup: &str) -> Vec<Icon> {
    markup
        .split("class=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter_map(Icon::from_classes)
        .collect()
}

/// Colours used when drawing a style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub header: Srgb<u8>,
    pub header_text: Srgb<u8>,
    pub accent: Srgb<u8>,
    pub chat_background: Srgb<u8>,
    pub bubble: Srgb<u8>,
    pub text: Srgb<u8>,
    pub time: Srgb<u8>,
    pub receipt: Srgb<u8>,
    pub input_bar: Srgb<u8>,
    pub avatar_placeholder: Srgb<u8>,
}

impl ThemePalette {
    pub fn for_style(id: StyleId) -> Self {
        match id {
            StyleId::TgAndroid => Self {
                header: Srgb::new(0x51, 0x7d, 0xa2),
                header_text: Srgb::new(0xff, 0xff, 0xff),
                accent: Srgb::new(0xff, 0xff, 0xff),
                chat_background: Srgb::new(0xe6, 0xeb, 0xee),
                bubble: Srgb::new(0xef, 0xfd, 0xde),
                text: Srgb::new(0x00, 0x00, 0x00),
                time: Srgb::new(0x5d, 0xaa, 0x4d),
                receipt: Srgb::new(0x4f, 0xae, 0x4e),
                input_bar: Srgb::new(0xff, 0xff, 0xff),
                avatar_placeholder: Srgb::new(0x6f, 0xb0, 0xe0),
            },
            StyleId::TgIos => Self {
                header: Srgb::new(0xf6, 0xf6, 0xf6),
                header_text: Srgb::new(0x00, 0x00, 0x00),
                accent: Srgb::new(0x00, 0x7a, 0xff),
                chat_background: Srgb::new(0xd4, 0xde, 0xe8),
                bubble: Srgb::new(0xe1, 0xfe, 0xc6),
                text: Srgb::new(0x00, 0x00, 0x00),
                time: Srgb::new(0x5f, 0xb7, 0x53),
                receipt: Srgb::new(0x5f, 0xb7, 0x53),
                input_bar: Srgb::new(0xf6, 0xf6, 0xf6),
                avatar_placeholder: Srgb::new(0x8e, 0x8e, 0x93),
            },
            StyleId::Vk => Self {
                header: Srgb::new(0xff, 0xff, 0xff),
                header_text: Srgb::new(0x00, 0x00, 0x00),
                accent: Srgb::new(0x26, 0x88, 0xeb),
                chat_background: Srgb::new(0xff, 0xff, 0xff),
                bubble: Srgb::new(0xcc, 0xe4, 0xff),
                text: Srgb::new(0x00, 0x00, 0x00),
                time: Srgb::new(0x81, 0x8c, 0x99),
                receipt: Srgb::new(0x26, 0x88, 0xeb),
                input_bar: Srgb::new(0xf5, 0xf5, 0xf5),
                avatar_placeholder: Srgb::new(0x99, 0xa2, 0xad),
            },
        }
    }

    /// Status line colour: header text pulled toward the header background
    pub fn status_colour(&self) -> Srgb<u8> {
        let text: LinSrgb = self.header_text.into_format::<f32>().into_linear();
        let background: LinSrgb = self.header.into_format::<f32>().into_linear();
        Srgb::<f32>::from_linear(text.mix(background, 0.35)).into_format::<u8>()
    }
}
