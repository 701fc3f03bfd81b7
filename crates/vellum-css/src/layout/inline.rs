//! Inline formatting: line boxes, word placement, vertical alignment.
//!
//! [CSS 2.2 § 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS22/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally,
//! one after the other, beginning at the top of a containing block."
//!
//! The builder collects fragments into a pending line, asks the
//! formatting context for the line's float-shortened bounds, closes the
//! line when a fragment no longer fits, then resolves each fragment's
//! vertical position from its `vertical-align`.

use serde::Serialize;

use crate::style::computed::CssProperties;
use crate::style::font::FontMetrics;
use crate::style::keywords::{TextAlign, VerticalAlign, WhiteSpace};

use super::box_model::Rect;
use super::formatting_context::FormattingContext;
use super::render_tree::RenderItemId;

/// What a line fragment is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FragmentContent {
    /// A word (no internal whitespace).
    Text(String),
    /// One collapsed space.
    Space,
    /// An atomic inline-level box (inline-block, image); the box was
    /// laid out before placement and its id points at the render item.
    Atomic(usize),
    /// A forced line break (`<br>` or a preserved newline).
    LineBreak,
}

/// One placed fragment.
///
/// Rectangles are relative to the container's content box.
#[derive(Debug, Clone, Serialize)]
pub struct LineFragment {
    /// The render item the fragment came from (text run or atomic box).
    pub item: usize,
    /// Content.
    pub content: FragmentContent,
    /// Position and size.
    pub rect: Rect,
    /// Baseline offset from the fragment's top.
    pub baseline: i32,
}

/// A finalized strip of inline content.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineBox {
    /// Top edge, relative to the container content box.
    pub top: i32,
    /// Left bound (after float shortening).
    pub left: i32,
    /// Right bound.
    pub right: i32,
    /// Line height.
    pub height: i32,
    /// Baseline offset from the line top.
    pub baseline: i32,
    /// Placed fragments.
    pub fragments: Vec<LineFragment>,
}

/// Vertical extent of a pending fragment before line finalization.
struct PendingFragment {
    item: RenderItemId,
    content: FragmentContent,
    x: i32,
    width: i32,
    /// Height above its own baseline.
    ascent: i32,
    /// Height below its own baseline.
    descent: i32,
    /// Total fragment height (≥ ascent + descent; the leading is
    /// distributed half above, half below).
    height: i32,
    valign: VerticalAlign,
}

/// Builds line boxes for one inline formatting context.
pub struct InlineLayout<'a> {
    fc: &'a mut FormattingContext,
    /// The container content origin in formatting-context coordinates.
    fc_offset: (i32, i32),
    max_width: i32,
    text_align: TextAlign,
    /// The strut: the container's own font keeps every line at least
    /// this tall.
    strut_metrics: FontMetrics,
    strut_line_height: i32,

    lines: Vec<LineBox>,
    pending: Vec<PendingFragment>,
    cur_x: i32,
    cur_top: i32,
    line_left: i32,
    line_right: i32,
    widest_line: i32,
}

impl<'a> InlineLayout<'a> {
    /// Start building lines at `top` (relative to the container content
    /// box).
    pub fn new(
        fc: &'a mut FormattingContext,
        fc_offset: (i32, i32),
        max_width: i32,
        top: i32,
        container: &CssProperties,
    ) -> Self {
        let mut layout = Self {
            fc,
            fc_offset,
            max_width,
            text_align: container.text_align,
            strut_metrics: container.font_metrics,
            strut_line_height: container.line_height_px,
            lines: Vec::new(),
            pending: Vec::new(),
            cur_x: 0,
            cur_top: top,
            line_left: 0,
            line_right: max_width,
            widest_line: 0,
        };
        layout.reset_line_bounds();
        layout
    }

    /// Query the formatting context for this line's bounds.
    fn reset_line_bounds(&mut self) {
        let probe_height = self.strut_line_height.max(1);
        let (left, right) = self.fc.edges(
            self.cur_top + self.fc_offset.1,
            probe_height,
            self.max_width + self.fc_offset.0,
        );
        // Back into container coordinates, clamped to the content box.
        self.line_left = (left - self.fc_offset.0).max(0);
        self.line_right = (right - self.fc_offset.0).min(self.max_width);
        if self.line_right < self.line_left {
            self.line_right = self.line_left;
        }
        self.cur_x = self.line_left;
    }

    /// Add a text run, splitting into words and collapsed spaces.
    ///
    /// [CSS Text § 3 White Space Processing](https://www.w3.org/TR/css-text-3/#white-space-property)
    pub fn add_text(
        &mut self,
        item: RenderItemId,
        text: &str,
        props: &CssProperties,
        measure: &dyn Fn(&str) -> i32,
    ) {
        let white_space = props.white_space;
        let metrics = props.font_metrics;
        let line_height = props.line_height_px.max(metrics.height);

        if white_space.collapses_whitespace() {
            let mut chars = text.chars().peekable();
            let mut word = String::new();
            while let Some(c) = chars.next() {
                let is_newline = c == '\n';
                if c.is_whitespace() {
                    if !word.is_empty() {
                        self.push_word(item, std::mem::take(&mut word), props, measure);
                    }
                    if is_newline && white_space.preserves_newlines() {
                        self.force_break(item);
                        continue;
                    }
                    // Collapse the whole whitespace run to one space.
                    while chars.peek().is_some_and(|c| c.is_whitespace() && *c != '\n') {
                        let _ = chars.next();
                    }
                    self.push_space(item, metrics, line_height, measure(" "), props);
                } else {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                self.push_word(item, word, props, measure);
            }
        } else {
            // pre / pre-wrap: whitespace is preserved verbatim; newlines
            // force breaks.
            for (index, piece) in text.split('\n').enumerate() {
                if index > 0 {
                    self.force_break(item);
                }
                if piece.is_empty() {
                    continue;
                }
                let width = measure(piece);
                let wrappable = white_space.allows_wrapping();
                if wrappable && self.cur_x + width > self.line_right && self.line_has_content() {
                    self.finish_line();
                }
                self.push_fragment(PendingFragment {
                    item,
                    content: FragmentContent::Text(piece.to_string()),
                    x: self.cur_x,
                    width,
                    ascent: metrics.ascent,
                    descent: metrics.descent,
                    height: line_height,
                    valign: props.vertical_align,
                });
            }
        }
    }

    fn push_word(
        &mut self,
        item: RenderItemId,
        word: String,
        props: &CssProperties,
        measure: &dyn Fn(&str) -> i32,
    ) {
        let metrics = props.font_metrics;
        let line_height = props.line_height_px.max(metrics.height);
        let width = measure(&word);

        if props.white_space.allows_wrapping()
            && self.cur_x + width > self.line_right
            && self.line_has_content()
        {
            self.finish_line();
        }
        self.push_fragment(PendingFragment {
            item,
            content: FragmentContent::Text(word),
            x: self.cur_x,
            width,
            ascent: metrics.ascent,
            descent: metrics.descent,
            height: line_height,
            valign: props.vertical_align,
        });
    }

    fn push_space(
        &mut self,
        item: RenderItemId,
        metrics: FontMetrics,
        line_height: i32,
        width: i32,
        props: &CssProperties,
    ) {
        // Leading whitespace on a line collapses away entirely.
        if !self.line_has_content() {
            return;
        }
        self.push_fragment(PendingFragment {
            item,
            content: FragmentContent::Space,
            x: self.cur_x,
            width,
            ascent: metrics.ascent,
            descent: metrics.descent,
            height: line_height,
            valign: props.vertical_align,
        });
    }

    /// Add an atomic inline-level box (already laid out; `width` and
    /// `height` are its margin box, `baseline` its distance from the
    /// margin-box top).
    pub fn add_atomic(
        &mut self,
        item: RenderItemId,
        width: i32,
        height: i32,
        baseline: i32,
        valign: VerticalAlign,
        nowrap: bool,
    ) {
        if !nowrap && self.cur_x + width > self.line_right && self.line_has_content() {
            self.finish_line();
        }
        // A box too wide for any band at this level still goes somewhere:
        // drop to where the full width is available.
        if width > self.line_right - self.cur_x && !self.line_has_content() {
            self.advance_past_floats(width);
        }
        self.push_fragment(PendingFragment {
            item,
            content: FragmentContent::Atomic(item.0),
            x: self.cur_x,
            width,
            ascent: baseline,
            descent: height - baseline,
            height,
            valign,
        });
    }

    /// `<br>` or a preserved newline.
    pub fn force_break(&mut self, item: RenderItemId) {
        self.push_fragment(PendingFragment {
            item,
            content: FragmentContent::LineBreak,
            x: self.cur_x,
            width: 0,
            ascent: self.strut_metrics.ascent,
            descent: self.strut_metrics.descent,
            height: self.strut_line_height,
            valign: VerticalAlign::Baseline,
        });
        self.finish_line();
    }

    fn push_fragment(&mut self, fragment: PendingFragment) {
        self.cur_x += fragment.width;
        self.pending.push(fragment);
    }

    fn line_has_content(&self) -> bool {
        self.pending
            .iter()
            .any(|f| !matches!(f.content, FragmentContent::Space))
    }

    /// When nothing fits beside the floats, move down to the first band
    /// wide enough for `width` (or past all floats).
    fn advance_past_floats(&mut self, width: i32) {
        let mut y = self.cur_top;
        for _ in 0..1024 {
            let (left, right) = self.fc.edges(
                y + self.fc_offset.1,
                self.strut_line_height.max(1),
                self.max_width + self.fc_offset.0,
            );
            if right - left >= width.min(self.max_width) {
                break;
            }
            let next = self.fc.floats_height();
            if next <= y + self.fc_offset.1 {
                break;
            }
            y = next - self.fc_offset.1;
        }
        self.cur_top = y;
        self.reset_line_bounds();
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS22/visudet.html#line-box)
    ///
    /// Close the current line: compute its height and baseline, place
    /// every fragment vertically by its `vertical-align`, apply
    /// `text-align`, and open the next line below.
    pub fn finish_line(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        // Trailing collapsed spaces do not occupy space.
        while self
            .pending
            .last()
            .is_some_and(|f| matches!(f.content, FragmentContent::Space))
        {
            let _ = self.pending.pop();
        }
        if self.pending.is_empty() {
            self.reset_line_bounds();
            return;
        }

        // Pass 1: line metrics from baseline-relative fragments; the
        // strut participates like a zero-width fragment.
        let mut max_ascent = self.strut_ascent();
        let mut max_descent = self.strut_line_height - self.strut_ascent();
        for fragment in &self.pending {
            let (ascent, descent) = fragment_extents(fragment);
            match fragment.valign {
                VerticalAlign::Top | VerticalAlign::Bottom => {}
                _ => {
                    max_ascent = max_ascent.max(ascent);
                    max_descent = max_descent.max(descent);
                }
            }
        }
        // Top/bottom-aligned boxes can still stretch the line.
        let mut line_height = max_ascent + max_descent;
        for fragment in &self.pending {
            if matches!(
                fragment.valign,
                VerticalAlign::Top | VerticalAlign::Bottom
            ) {
                line_height = line_height.max(fragment.height);
            }
        }
        let baseline = max_ascent;

        // Pass 2: text-align shifts the whole run. Content width is
        // measured to the last surviving fragment (trimmed spaces do not
        // count).
        let content_end = self
            .pending
            .last()
            .map_or(self.line_left, |f| f.x + f.width);
        let content_width = content_end - self.line_left;
        let free = (self.line_right - self.line_left - content_width).max(0);
        let shift = match self.text_align {
            TextAlign::Right => free,
            TextAlign::Center => free / 2,
            TextAlign::Left | TextAlign::Justify => 0,
        };

        // Pass 3: final rectangles.
        let mut fragments = Vec::with_capacity(self.pending.len());
        for fragment in self.pending.drain(..) {
            let (ascent, _descent) = fragment_extents(&fragment);
            let y = match fragment.valign {
                VerticalAlign::Top => self.cur_top,
                VerticalAlign::Bottom => self.cur_top + line_height - fragment.height,
                VerticalAlign::Middle => {
                    // Centered on baseline minus half x-height.
                    let center = self.cur_top + baseline - self.strut_metrics.x_height / 2;
                    center - fragment.height / 2
                }
                VerticalAlign::Sub => self.cur_top + baseline - ascent
                    + self.strut_metrics.x_height / 2,
                VerticalAlign::Super => self.cur_top + baseline - ascent
                    - self.strut_metrics.x_height / 2,
                VerticalAlign::TextTop => self.cur_top + baseline - self.strut_metrics.ascent,
                VerticalAlign::TextBottom => {
                    self.cur_top + baseline + self.strut_metrics.descent - fragment.height
                }
                VerticalAlign::Baseline => self.cur_top + baseline - ascent,
            };
            fragments.push(LineFragment {
                item: fragment.item.0,
                content: fragment.content,
                rect: Rect::new(fragment.x + shift, y, fragment.width, fragment.height),
                baseline: ascent,
            });
        }

        self.widest_line = self.widest_line.max(content_width);
        self.lines.push(LineBox {
            top: self.cur_top,
            left: self.line_left,
            right: self.line_right,
            height: line_height,
            baseline,
            fragments,
        });

        self.cur_top += line_height;
        self.reset_line_bounds();
    }

    fn strut_ascent(&self) -> i32 {
        // Half-leading: center the font box inside the line height.
        let leading = self.strut_line_height - self.strut_metrics.height;
        self.strut_metrics.ascent + leading / 2
    }

    /// Close the last line and return `(lines, height, widest_line)`.
    /// Height is measured from the starting top to the bottom of the
    /// last line.
    #[must_use]
    pub fn finish(mut self, start_top: i32) -> (Vec<LineBox>, i32, i32) {
        self.finish_line();
        let bottom = self
            .lines
            .last()
            .map_or(start_top, |line| line.top + line.height);
        (self.lines, bottom - start_top, self.widest_line)
    }

    /// Current vertical cursor (top of the open line).
    #[must_use]
    pub const fn cursor_top(&self) -> i32 {
        self.cur_top
    }
}

/// Ascent/descent of a pending fragment with its half-leading applied.
fn fragment_extents(fragment: &PendingFragment) -> (i32, i32) {
    match fragment.content {
        FragmentContent::Atomic(_) => (fragment.ascent, fragment.descent),
        _ => {
            let content = fragment.ascent + fragment.descent;
            let leading = fragment.height - content;
            (
                fragment.ascent + leading / 2,
                fragment.descent + leading - leading / 2,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::font::{FixedFontSource, FontDescription, FontSource, FontStyle, TextDecoration};

    fn test_props() -> CssProperties {
        let mut fonts = FixedFontSource::default();
        let mut props = CssProperties::default();
        let description = FontDescription {
            family: "serif".into(),
            size: 16,
            weight: 400,
            style: FontStyle::Normal,
            decoration: TextDecoration::NONE,
        };
        let (handle, metrics) = fonts.font(&description);
        props.font = handle;
        props.font_metrics = metrics;
        props.font_size = 16;
        props.line_height_px = metrics.height;
        props
    }

    fn measure(text: &str) -> i32 {
        // FixedFontSource: 5px per glyph at size 10 → 8px at 16.
        8 * text.chars().count() as i32
    }

    #[test]
    fn words_flow_and_wrap() {
        let mut fc = FormattingContext::new();
        let props = test_props();
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 100, 0, &props);
        // "aaaa bbbb cccc" at 8px/char: words are 32px, spaces 8px.
        layout.add_text(RenderItemId(0), "aaaa bbbb cccc", &props, &measure);
        let (lines, height, widest) = layout.finish(0);
        // 32+8+32+8+32 = 112 > 100 → two lines.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].fragments.len(), 3); // word space word
        assert_eq!(lines[1].fragments.len(), 1);
        assert_eq!(height, lines[0].height + lines[1].height);
        assert_eq!(widest, 72);
    }

    #[test]
    fn leading_spaces_are_skipped() {
        let mut fc = FormattingContext::new();
        let props = test_props();
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 500, 0, &props);
        layout.add_text(RenderItemId(0), "   x", &props, &measure);
        let (lines, _, _) = layout.finish(0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fragments.len(), 1);
        assert_eq!(lines[0].fragments[0].rect.x, 0);
    }

    #[test]
    fn floats_shorten_lines() {
        let mut fc = FormattingContext::new();
        fc.add_float(
            crate::style::keywords::Float::Left,
            Rect::new(0, 0, 40, 100),
            0,
        );
        let props = test_props();
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 200, 0, &props);
        layout.add_text(RenderItemId(0), "xx", &props, &measure);
        let (lines, _, _) = layout.finish(0);
        assert_eq!(lines[0].left, 40);
        assert_eq!(lines[0].fragments[0].rect.x, 40);
    }

    #[test]
    fn forced_break_starts_a_new_line() {
        let mut fc = FormattingContext::new();
        let props = test_props();
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 500, 0, &props);
        layout.add_text(RenderItemId(0), "a", &props, &measure);
        layout.force_break(RenderItemId(0));
        layout.add_text(RenderItemId(0), "b", &props, &measure);
        let (lines, _, _) = layout.finish(0);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].top > 0);
    }

    #[test]
    fn text_align_center_splits_free_space() {
        let mut fc = FormattingContext::new();
        let mut props = test_props();
        props.text_align = TextAlign::Center;
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 100, 0, &props);
        layout.add_text(RenderItemId(0), "xx", &props, &measure); // 16px
        let (lines, _, _) = layout.finish(0);
        assert_eq!(lines[0].fragments[0].rect.x, 42); // (100-16)/2
    }

    #[test]
    fn atomic_boxes_sit_on_the_baseline() {
        let mut fc = FormattingContext::new();
        let props = test_props();
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 500, 0, &props);
        layout.add_text(RenderItemId(0), "x", &props, &measure);
        layout.add_atomic(RenderItemId(1), 50, 30, 30, VerticalAlign::Baseline, false);
        let (lines, _, _) = layout.finish(0);
        let line = &lines[0];
        assert_eq!(line.fragments.len(), 2);
        let atomic = &line.fragments[1];
        // Bottom of the box aligns with the baseline.
        assert_eq!(atomic.rect.y + 30, line.top + line.baseline);
        assert!(line.height >= 30);
    }

    #[test]
    fn pre_preserves_whitespace() {
        let mut fc = FormattingContext::new();
        let mut props = test_props();
        props.white_space = WhiteSpace::Pre;
        let mut layout = InlineLayout::new(&mut fc, (0, 0), 50, 0, &props);
        layout.add_text(RenderItemId(0), "a  b\ncd", &props, &measure);
        let (lines, _, _) = layout.finish(0);
        assert_eq!(lines.len(), 2);
        // "a  b" kept verbatim: 4 chars = 32px wide, no wrap at 50px.
        assert_eq!(lines[0].fragments[0].rect.width, 32);
    }
}
