//! Integration tests for chatmock

use chatmock::capture::{
    CaptureError, CaptureExporter, CaptureOptions, DirectorySink, ExportFrame, Rasterizer,
};
use chatmock::draft::{Field, MessageDraft};
use chatmock::preview::{PreviewController, AVATAR_ROUND_CLASS};
use chatmock::raster::FrameRasterizer;
use chatmock::style::{
    lookup, receipt_icons, Icon, StyleId, READ_RECEIPT_MARKUP, SENT_RECEIPT_MARKUP,
};
use image::RgbaImage;
use proptest::prelude::*;

fn anna_draft() -> MessageDraft {
    MessageDraft {
        sender_name: "Anna".to_string(),
        body_text: "Hi there".to_string(),
        timestamp: "14:02".to_string(),
        is_read: true,
        ..MessageDraft::default()
    }
}

fn style_strategy() -> impl Strategy<Value = StyleId> {
    prop::sample::select(StyleId::all().to_vec())
}

mod style_tests {
    use super::*;

    #[test]
    fn test_every_style_is_fully_configured() {
        for &id in StyleId::all() {
            let config = lookup(id);
            assert!(!config.css_class.is_empty(), "{id}");
            assert!(!config.default_status_text.is_empty(), "{id}");
            assert!(!config.read_receipt_markup.is_empty(), "{id}");
            assert_eq!(id.id().parse::<StyleId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_style_id_is_rejected() {
        let err = "whatsapp".parse::<StyleId>().unwrap_err();
        assert!(err.to_string().contains("whatsapp"));
    }
}

mod preview_tests {
    use super::*;

    #[test]
    fn test_sent_glyph_for_every_style() {
        for &id in StyleId::all() {
            let mut controller = PreviewController::new(StyleId::TgAndroid, anna_draft());
            controller.set_style(id);
            controller.set_read_state(false);
            assert_eq!(controller.node().receipt_markup, SENT_RECEIPT_MARKUP);
            assert_eq!(receipt_icons(&controller.node().receipt_markup), vec![Icon::Check]);
        }
    }

    #[test]
    fn test_read_glyph_is_the_same_across_styles() {
        let glyphs: Vec<String> = StyleId::all()
            .iter()
            .map(|&id| PreviewController::new(id, anna_draft()).node().receipt_markup.clone())
            .collect();
        assert!(glyphs.iter().all(|g| g == READ_RECEIPT_MARKUP));
    }

    #[test]
    fn test_body_keeps_line_breaks() {
        let mut controller = PreviewController::default();
        controller.update_field(Field::BodyText, "line1\nline2");
        assert_eq!(controller.node().body, "line1\nline2");
    }

    #[test]
    fn test_vk_scenario() {
        let mut controller = PreviewController::default();
        controller.set_style(StyleId::Vk);
        controller.update_field(Field::SenderName, "Anna");
        controller.update_field(Field::BodyText, "Hi there");
        controller.update_field(Field::Timestamp, "14:02");
        controller.set_read_state(true);

        let node = controller.node().clone();
        assert!(node.has_class("style-vk"));
        assert_eq!(node.name, "Anna");
        assert_eq!(node.status, "в сети");
        assert_eq!(node.body, "Hi there");
        assert_eq!(node.time, "14:02");
        assert_eq!(receipt_icons(&node.receipt_markup), vec![Icon::CheckDouble]);
        assert!(node.avatar_classes.iter().any(|c| c == AVATAR_ROUND_CLASS));
        assert_eq!(node.back_icon(), Some(Icon::ChevronLeft));
        assert_eq!(node.menu_icon(), Some(Icon::EllipsisH));

        // only the receipt changes
        controller.set_read_state(false);
        let after = controller.node();
        assert_eq!(after.receipt_markup, SENT_RECEIPT_MARKUP);
        assert_eq!(after.classes, node.classes);
        assert_eq!(after.name, node.name);
        assert_eq!(after.status, node.status);
        assert_eq!(after.body, node.body);
        assert_eq!(after.time, node.time);
    }

    #[test]
    fn test_style_switch_keeps_the_draft() {
        let mut controller = PreviewController::new(StyleId::TgIos, anna_draft());
        controller.set_style(StyleId::TgAndroid);
        let node = controller.node();
        assert!(node.has_class("style-tg-android"));
        assert!(!node.has_class("style-tg-ios"));
        assert_eq!(node.status, "был(а) недавно");
        assert_eq!(node.back_icon(), Some(Icon::ArrowLeft));
        assert_eq!(node.menu_icon(), Some(Icon::EllipsisV));
        assert_eq!(node.name, "Anna");
    }

    proptest! {
        #[test]
        fn prop_body_text_is_shown_verbatim(
            lines in prop::collection::vec("[^\n\r]{0,12}", 1..5)
        ) {
            let body = lines.join("\n");
            let mut controller = PreviewController::default();
            controller.update_field(Field::BodyText, &body);
            prop_assert_eq!(&controller.node().body, &body);
        }

        #[test]
        fn prop_style_application_is_idempotent(
            history in prop::collection::vec(style_strategy(), 0..6),
            target in style_strategy(),
        ) {
            let mut controller = PreviewController::new(StyleId::TgAndroid, anna_draft());
            for style in history {
                controller.set_style(style);
            }
            controller.set_style(target);
            let once = controller.node().clone();
            controller.set_style(target);
            prop_assert_eq!(controller.node(), &once);

            let fresh = PreviewController::new(target, anna_draft());
            prop_assert_eq!(fresh.node(), &once);
        }
    }
}

mod export_tests {
    use super::*;

    struct Broken;

    impl Rasterizer for Broken {
        fn rasterize(
            &self,
            _frame: &ExportFrame,
            _options: &CaptureOptions,
        ) -> Result<RgbaImage, CaptureError> {
            Err(CaptureError::Rasterize("no canvas".to_string()))
        }
    }

    #[test]
    fn test_failed_export_leaves_preview_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CaptureExporter::new(Broken, DirectorySink::new(dir.path()));
        let mut controller = PreviewController::new(StyleId::TgIos, anna_draft());
        controller.set_transform(Some("scale(0.9)".to_string()));
        let before = controller.node().clone();

        assert!(exporter.export(controller.node()).is_err());
        assert_eq!(controller.node(), &before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_writes_full_resolution_png() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            CaptureExporter::new(FrameRasterizer::bundled(), DirectorySink::new(dir.path()));
        let controller = PreviewController::new(StyleId::Vk, anna_draft());

        let outcome = exporter.export(controller.node()).unwrap();

        let digits = outcome
            .file_name
            .strip_prefix("fake-message-vk-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));

        let saved = image::open(&outcome.path).unwrap();
        assert_eq!((saved.width(), saved.height()), (1125, 2001));
    }

    #[test]
    fn test_export_ignores_preview_zoom() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            CaptureExporter::new(FrameRasterizer::bundled(), DirectorySink::new(dir.path()));
        let mut controller = PreviewController::new(StyleId::TgAndroid, anna_draft());

        let plain = exporter.export_at(controller.node(), 1).unwrap();
        controller.set_transform(Some("scale(0.9)".to_string()));
        let zoomed = exporter.export_at(controller.node(), 2).unwrap();

        assert_eq!(plain.image, zoomed.image);
        assert_eq!(zoomed.file_name, "fake-message-tg-android-2.png");
    }

    #[test]
    fn test_export_fails_without_a_font() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            CaptureExporter::new(FrameRasterizer::new(None), DirectorySink::new(dir.path()));
        let controller = PreviewController::new(StyleId::TgIos, anna_draft());

        let result = exporter.export(controller.node());
        assert!(matches!(result, Err(CaptureError::Rasterize(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_follows_the_node_style() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            CaptureExporter::new(FrameRasterizer::bundled(), DirectorySink::new(dir.path()));
        let mut controller = PreviewController::new(StyleId::TgAndroid, anna_draft());
        controller.set_style(StyleId::Vk);

        let outcome = exporter.export_at(controller.node(), 7).unwrap();
        assert_eq!(outcome.file_name, "fake-message-vk-7.png");
    }
}
