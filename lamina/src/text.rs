//! Text styles, measurement and line wrapping.
//!
//! The engine never shapes text itself. A [`TextMeasurer`] is injected by the
//! caller and consulted twice: once for the unwrapped string when the text
//! element is declared, and per word when the element is re-wrapped to its
//! final width.

use std::hash::{Hash, Hasher};

use unicode_width::UnicodeWidthStr;

use crate::layout::sizing::EPSILON;
use crate::primitives::Color;

// Monospace metrics for JetBrains Mono at 14px base size.
pub const CHAR_WIDTH: f32 = 8.4;
pub const LINE_HEIGHT: f32 = 18.0;
pub const BASE_FONT_SIZE: f32 = 14.0;

/// How a text element breaks into lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Break at spaces to fit the width, and at every newline.
    #[default]
    Words,
    /// Break only at newlines.
    Newlines,
    /// Never break.
    None,
}

/// Horizontal placement of each line inside the text element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_id: u16,
    pub font_size: f32,
    /// Distance between baselines. 0 uses the measured height of one line.
    pub line_height: f32,
    pub letter_spacing: f32,
    pub color: Color,
    pub wrap: WrapMode,
    pub alignment: TextAlignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_id: 0,
            font_size: BASE_FONT_SIZE,
            line_height: 0.0,
            letter_spacing: 0.0,
            color: Color::WHITE,
            wrap: WrapMode::Words,
            alignment: TextAlignment::Left,
        }
    }
}

impl TextStyle {
    pub fn new(font_size: f32) -> Self {
        Self { font_size, ..Self::default() }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn font(mut self, font_id: u16) -> Self {
        self.font_id = font_id;
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn align(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

// Floats hash by bit pattern; only the fields that affect measurement take part.
impl Hash for TextStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font_id.hash(state);
        self.font_size.to_bits().hash(state);
        self.line_height.to_bits().hash(state);
        self.letter_spacing.to_bits().hash(state);
    }
}

/// Result of measuring a string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMeasurement {
    pub width: f32,
    pub height: f32,
    /// Width of the widest unbreakable word; the floor when wrapping.
    pub min_width: f32,
}

impl TextMeasurement {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, min_width: width }
    }

    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// Injected text measurement.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &TextStyle) -> TextMeasurement,
{
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement {
        self(text, style)
    }
}

/// Fixed-advance measurement by terminal column width.
///
/// Metrics scale linearly with `font_size` relative to [`BASE_FONT_SIZE`].
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { char_width: CHAR_WIDTH, line_height: LINE_HEIGHT }
    }
}

impl MonospaceMeasurer {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self { char_width, line_height }
    }

    fn advance(&self, text: &str, style: &TextStyle) -> f32 {
        let scale = style.font_size / BASE_FONT_SIZE;
        let columns = UnicodeWidthStr::width(text);
        let spacing = style.letter_spacing * text.chars().count().saturating_sub(1) as f32;
        columns as f32 * self.char_width * scale + spacing
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement {
        if text.is_empty() {
            return TextMeasurement::default();
        }
        let scale = style.font_size / BASE_FONT_SIZE;
        let line_height = if style.line_height > 0.0 {
            style.line_height
        } else {
            self.line_height * scale
        };

        let mut width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            width = width.max(self.advance(line, style));
            lines += 1;
        }
        let min_width = text
            .split(|c: char| c == ' ' || c == '\n')
            .map(|word| self.advance(word, style))
            .fold(0.0f32, f32::max);

        TextMeasurement {
            width,
            height: line_height * lines as f32,
            min_width,
        }
    }
}

/// One line of a wrapped text element.
///
/// `start..start + len` is a byte range into the element's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrappedLine {
    pub start: usize,
    pub len: usize,
    pub width: f32,
    pub height: f32,
}

impl WrappedLine {
    pub fn text<'a>(&self, content: &'a str) -> &'a str {
        &content[self.start..self.start + self.len]
    }
}

/// Height of one line for a style, given the unwrapped measurement.
pub(crate) fn resolve_line_height(
    style: &TextStyle,
    measured: &TextMeasurement,
    content: &str,
    fallback: Option<f32>,
) -> f32 {
    if style.line_height > 0.0 {
        return style.line_height;
    }
    if let Some(fallback) = fallback.filter(|h| *h > 0.0) {
        if measured.height <= 0.0 {
            return fallback;
        }
    }
    let hard_lines = content.split('\n').count().max(1);
    measured.height / hard_lines as f32
}

/// Break `content` into lines no wider than `max_width` where possible.
///
/// A word wider than `max_width` sits alone on its own line. Explicit newlines
/// always break unless wrapping is disabled. Widths exclude trailing spaces.
pub fn wrap_text(
    content: &str,
    style: &TextStyle,
    measured: &TextMeasurement,
    max_width: f32,
    line_height: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<WrappedLine> {
    if content.is_empty() {
        return Vec::new();
    }

    let single = |width: f32| {
        vec![WrappedLine { start: 0, len: content.len(), width, height: line_height }]
    };
    if style.wrap == WrapMode::None
        || (!content.contains('\n') && measured.width <= max_width + EPSILON)
    {
        return single(measured.width);
    }

    let mut lines = Vec::new();
    let space_width = measurer.measure(" ", style).width;
    let mut hard_start = 0usize;

    for hard_line in content.split('\n') {
        if style.wrap == WrapMode::Newlines {
            let width = measurer.measure(hard_line, style).width;
            lines.push(WrappedLine { start: hard_start, len: hard_line.len(), width, height: line_height });
        } else {
            wrap_hard_line(hard_line, hard_start, style, max_width, line_height, space_width, measurer, &mut lines);
        }
        hard_start += hard_line.len() + 1;
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn wrap_hard_line(
    line: &str,
    offset: usize,
    style: &TextStyle,
    max_width: f32,
    line_height: f32,
    space_width: f32,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<WrappedLine>,
) {
    // (start, end, width) of the line being filled, in bytes relative to `line`.
    let mut current: Option<(usize, usize, f32)> = None;
    let mut cursor = 0usize;

    for word in line.split(' ') {
        let word_start = cursor;
        let word_end = cursor + word.len();
        cursor = word_end + 1;
        if word.is_empty() {
            continue;
        }
        let word_width = measurer.measure(word, style).width;

        current = match current {
            None => Some((word_start, word_end, word_width)),
            Some((start, end, width)) => {
                let extended = width + space_width + word_width;
                if extended > max_width + EPSILON {
                    out.push(WrappedLine {
                        start: offset + start,
                        len: end - start,
                        width,
                        height: line_height,
                    });
                    Some((word_start, word_end, word_width))
                } else {
                    Some((start, word_end, extended))
                }
            }
        };
    }

    match current {
        Some((start, end, width)) => out.push(WrappedLine {
            start: offset + start,
            len: end - start,
            width,
            height: line_height,
        }),
        // Blank line: keeps its height.
        None => out.push(WrappedLine { start: offset, len: 0, width: 0.0, height: line_height }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono() -> MonospaceMeasurer {
        // 10px per column, 20px lines at base size keeps the arithmetic obvious.
        MonospaceMeasurer::new(10.0, 20.0)
    }

    fn wrap(content: &str, max_width: f32, style: TextStyle) -> Vec<String> {
        let m = mono();
        let measured = m.measure(content, &style);
        wrap_text(content, &style, &measured, max_width, 20.0, &m)
            .iter()
            .map(|l| l.text(content).to_string())
            .collect()
    }

    #[test]
    fn monospace_measures_columns_and_lines() {
        let m = mono();
        let r = m.measure("hello world", &TextStyle::default());
        assert_eq!(r.width, 110.0);
        assert_eq!(r.height, 20.0);
        assert_eq!(r.min_width, 50.0);

        let multi = m.measure("ab\nabcd", &TextStyle::default());
        assert_eq!(multi.width, 40.0);
        assert_eq!(multi.height, 40.0);
    }

    #[test]
    fn monospace_counts_wide_characters_twice() {
        let m = mono();
        assert_eq!(m.measure("日本", &TextStyle::default()).width, 40.0);
    }

    #[test]
    fn monospace_scales_with_font_size() {
        let m = mono();
        let r = m.measure("ab", &TextStyle::new(28.0));
        assert_eq!(r.width, 40.0);
        assert_eq!(r.height, 40.0);
    }

    #[test]
    fn empty_text_measures_zero() {
        assert!(mono().measure("", &TextStyle::default()).is_zero());
    }

    #[test]
    fn fits_on_one_line() {
        assert_eq!(wrap("hello world", 200.0, TextStyle::default()), vec!["hello world"]);
    }

    #[test]
    fn wraps_at_spaces() {
        assert_eq!(
            wrap("the quick brown fox", 100.0, TextStyle::default()),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn long_word_sits_alone() {
        assert_eq!(
            wrap("a extraordinarily b", 60.0, TextStyle::default()),
            vec!["a", "extraordinarily", "b"]
        );
    }

    #[test]
    fn newlines_always_break() {
        assert_eq!(wrap("one\n\ntwo", 500.0, TextStyle::default()), vec!["one", "", "two"]);
        assert_eq!(
            wrap("one two\nthree", 500.0, TextStyle::default().wrap(WrapMode::Newlines)),
            vec!["one two", "three"]
        );
    }

    #[test]
    fn no_wrap_keeps_single_line() {
        let lines = wrap("the quick brown fox", 30.0, TextStyle::default().wrap(WrapMode::None));
        assert_eq!(lines, vec!["the quick brown fox"]);
    }

    #[test]
    fn wrapped_widths_exclude_trailing_space() {
        let m = mono();
        let style = TextStyle::default();
        let content = "aaa bbb ccc";
        let measured = m.measure(content, &style);
        let lines = wrap_text(content, &style, &measured, 75.0, 20.0, &m);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].width, 70.0);
        assert_eq!(lines[1].width, 30.0);
    }

    #[test]
    fn closures_are_measurers() {
        let fixed = |_: &str, _: &TextStyle| TextMeasurement::new(12.0, 6.0);
        let r = TextMeasurer::measure(&fixed, "anything", &TextStyle::default());
        assert_eq!(r, TextMeasurement::new(12.0, 6.0));
    }

    #[test]
    fn line_height_prefers_style() {
        let measured = TextMeasurement::new(50.0, 40.0);
        let styled = TextStyle::default().line_height(24.0);
        assert_eq!(resolve_line_height(&styled, &measured, "a\nb", None), 24.0);
        assert_eq!(resolve_line_height(&TextStyle::default(), &measured, "a\nb", None), 20.0);
        assert_eq!(
            resolve_line_height(&TextStyle::default(), &TextMeasurement::default(), "a", Some(16.0)),
            16.0
        );
    }
}
