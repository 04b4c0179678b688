// File: crates/chart-overlays/src/text.rs
// Summary: Label shaping/painting for overlays using Skia textlayout with a system font fallback.

use skia_safe as skia;
use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextAlign, TextStyle};

pub struct TextShaper {
    fonts: FontCollection,
}

impl Default for TextShaper {
    fn default() -> Self { Self::new() }
}

impl TextShaper {
    pub fn new() -> Self {
        let mut fc = FontCollection::new();
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts: fc }
    }

    fn make_style(size: f32, color: skia::Color) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(size.max(1.0));
        ts.set_color(color);
        // tabular digits keep the price column steady while hovering
        ts.set_font_families(&["Roboto Mono", "Consolas", "Menlo", "DejaVu Sans Mono", "monospace"]);
        ts
    }

    /// Shape possibly multi-line `text` at `size` bitmap pixels.
    pub fn layout(&self, text: &str, size: f32, color: skia::Color) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        builder.push_style(&Self::make_style(size, color));
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    /// Paint `text` inside a filled box whose top-left corner is (`x`, `y`).
    /// Returns the box so callers can avoid overlapping it.
    pub fn draw_boxed(
        &self,
        canvas: &skia::Canvas,
        text: &str,
        (x, y): (f32, f32),
        size: f32,
        text_color: skia::Color,
        background: skia::Color,
    ) -> skia::Rect {
        let p = self.layout(text, size, text_color);
        let pad = (size * 0.4).round();
        let rect = skia::Rect::from_xywh(x, y, p.longest_line() + pad * 2.0, p.height() + pad * 2.0);

        let mut bg = skia::Paint::default();
        bg.set_anti_alias(true);
        bg.set_color(background);
        canvas.draw_round_rect(rect, pad * 0.5, pad * 0.5, &bg);
        p.paint(canvas, (x + pad, y + pad));
        rect
    }
}
