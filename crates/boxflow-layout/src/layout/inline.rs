//! CSS Inline Formatting.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! "When an inline box exceeds the width of a line box, it is split into
//! several boxes and these boxes are distributed across several line boxes."
//!
//! A box that does not fit whole returns a remainder: a new box holding the
//! part it could not place. The line builder splices the remainder in as the
//! next child, closes the line, and continues with the remainder on the next
//! line.

use boxflow_common::warning::warn_once;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::error::LayoutResult;

use super::block::StackState;
use super::box_model::Rect;
use super::float::FloatContext;
use super::layout_box::{BoxKind, TextData};
use super::text::{break_opportunities, find_break_opportunity};
use super::{BoxId, Engine, LayoutOutcome};

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
///
/// "This property describes how inline-level content of a block container
/// is aligned."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum TextAlign {
    /// "left"
    #[default]
    Left,
    /// "right"
    Right,
    /// "center"
    Center,
    /// "justify". Laid out as `left`.
    Justify,
}

/// One line box of a block's inline content.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The rectangular area that contains the boxes that form a line is called
/// a line box."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContentLine {
    /// First child of the line, as an index into the block's laid-out
    /// children.
    pub start: usize,
    /// One past the last child of the line.
    pub end: usize,
    /// Top of the line in the block's content coordinates.
    pub y: f32,
    /// Height of the line.
    pub height: f32,
    /// Left edge of the line, after the left floats.
    pub x: f32,
    /// Width used by the line's content.
    pub width: f32,
    /// Width the line could use between the floats.
    pub limit: f32,
    /// Space the right floats take from the line.
    pub right: f32,
}

/// A place where the current line may be ended.
#[derive(Debug, Clone, Copy)]
struct BreakPoint {
    /// The child that would start the next line.
    index: usize,
    /// Line width up to the break.
    x: f32,
    /// Tallest box before the break.
    max_height: f32,
}

/// The line currently being filled.
#[derive(Debug, Clone, Copy)]
struct LineState {
    start: usize,
    x: f32,
    x1: f32,
    x2: f32,
    max_height: f32,
    last_break: Option<BreakPoint>,
}

impl LineState {
    const fn new(start: usize, (x1, x2): (f32, f32)) -> Self {
        Self {
            start,
            x: x1,
            x1,
            x2,
            max_height: 0.0,
            last_break: None,
        }
    }

    /// The end of the line if it were closed after everything placed so far.
    const fn end_here(&self, index: usize) -> BreakPoint {
        BreakPoint {
            index,
            x: self.x,
            max_height: self.max_height,
        }
    }
}

/// State of one inline layout pass over a block's children.
struct LineBuilder {
    ctx: FloatContext,
    wlimit: f32,
    line_height: f32,
    stack: StackState,
    lines: Vec<ContentLine>,
    line: LineState,
}

impl Engine<'_> {
    /// Lay out the inline-level children of block `id` in lines of at most
    /// `wlimit` pixels, shortened next to floats.
    pub(crate) fn layout_inline_content(&mut self, id: BoxId, wlimit: f32) -> LayoutResult<()> {
        let ctx = self.float_context(id)?;
        let threshold = self.ctx.config.inflow_space_threshold;
        let text_align = self.node(id).block().map(|b| b.text_align).unwrap_or_default();
        if text_align == TextAlign::Justify {
            warn_once("Layout", "text-align: justify is laid out as left");
        }
        let mut b = LineBuilder {
            ctx,
            wlimit,
            line_height: self.node(id).line_height,
            stack: StackState::default(),
            lines: Vec::new(),
            line: LineState::new(0, self.line_edges(&ctx, 0.0, wlimit)),
        };

        let mut children = self.node(id).laid_out.clone();
        let mut placed_floats: Vec<BoxId> = Vec::new();

        let mut i = 0;
        while let Some(&child) = children.get(i) {
            let node = self.node(child);
            if !node.displayed {
                let _ = self.layout_box(child, 0.0, true)?;
                i += 1;
                continue;
            }
            if node.is_floating() {
                // A line started over does not place its floats twice.
                if !placed_floats.contains(&child) {
                    placed_floats.push(child);
                    // Below the boxes already on the line.
                    let float_y = b.stack.y + b.line.max_height;
                    let span = self.place_float(id, child, float_y, wlimit)?;
                    b.stack.preferred = b.stack.preferred.max(span);
                    let (x1, x2) = self.line_edges(&ctx, b.stack.y, wlimit);
                    b.line.x = b.line.x.max(x1);
                    b.line.x1 = x1;
                    b.line.x2 = x2;
                }
                i += 1;
                continue;
            }
            if node.is_out_of_flow_positioned() {
                self.layout_positioned(child)?;
                i += 1;
                continue;
            }

            // A line never ends before its first in-flow box.
            let line_has_content = children
                .get(b.line.start..i)
                .is_some_and(|placed| placed.iter().any(|&c| self.is_line_content(c)));
            if line_has_content && self.can_split_before(child) {
                b.line.last_break = Some(b.line.end_here(i));
            }

            let narrowed = b.line.x1 > 0.0 || b.line.x2 < wlimit;
            let space = b.line.x2 - b.line.x;
            let at_line_start = b.line.x == b.line.x1;
            let force = (at_line_start || b.line.last_break.is_none())
                && (space >= threshold || !narrowed);
            let outcome = self.layout_box(child, space, force)?;

            if outcome.fit {
                let node = self.node_mut(child);
                node.bounds.x = b.line.x;
                node.bounds.y = b.stack.y;
                b.line.x += node.bounds.width;
                b.line.max_height = b.line.max_height.max(node.bounds.height);
                i += 1;
                if self.can_split_after(child) {
                    b.line.last_break = Some(b.line.end_here(i));
                }
                if let Some(remainder) = outcome.remainder {
                    // The rest of the child starts the next line.
                    children.insert(i, remainder);
                    let end = b.line.end_here(i);
                    self.close_line(&mut b, end);
                } else if b.line.x >= b.line.x2
                    && b.line.last_break.is_some_and(|lb| lb.index == i)
                {
                    let end = b.line.end_here(i);
                    self.close_line(&mut b, end);
                }
                continue;
            }

            match b.line.last_break {
                // End the line at the last break and continue from there.
                Some(lb) => {
                    self.close_line(&mut b, lb);
                    i = lb.index;
                }
                // Nothing can end the line here: move it below the floats
                // narrowing it and start it over.
                None if narrowed => {
                    b.stack.y = self.next_float_edge(&ctx, b.stack.y);
                    i = b.line.start;
                    b.line = LineState::new(i, self.line_edges(&ctx, b.stack.y, wlimit));
                }
                // With no break and no float narrowing the line, `force` is
                // set and every box kind fits when forced. Reaching this arm
                // is a bug in a box layout routine.
                None => {
                    debug_assert!(!force, "forced layout of {child} did not fit");
                    warn_once("Layout", &format!("box {child} could not be placed on a line"));
                    i += 1;
                }
            }
        }

        // The last line only counts when it holds something.
        let has_content = children
            .get(b.line.start..)
            .is_some_and(|rest| rest.iter().any(|&c| self.is_line_content(c)));
        if has_content {
            let end = b.line.end_here(children.len());
            self.close_line(&mut b, end);
        }

        let node = self.node_mut(id);
        node.laid_out = children;
        if let Some(block) = node.block_mut() {
            block.lines = b.lines;
        }
        let shrink = !self.node(id).in_normal_block_flow() && !self.has_fixed_width(id);
        self.finish_block(id, &ctx, b.stack, shrink)?;
        self.align_lines(id, text_align);
        Ok(())
    }

    /// [§ 16.2](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// "If the inline boxes do not fill the line box, the horizontal
    /// alignment of the inline boxes within the line box is determined by
    /// the 'text-align' property."
    ///
    /// Runs once the content width of `id` is final, so a shrink-to-fit box
    /// aligns against its own width.
    fn align_lines(&mut self, id: BoxId, text_align: TextAlign) {
        if matches!(text_align, TextAlign::Left | TextAlign::Justify) {
            return;
        }
        let node = self.node(id);
        let content_width = node.dimensions.content.width;
        let Some(block) = node.block() else {
            return;
        };
        let shifts: Vec<(ContentLine, f32)> = block
            .lines
            .iter()
            .map(|line| {
                let slack = (content_width - line.right - line.x - line.width).max(0.0);
                let shift = match text_align {
                    TextAlign::Center => (slack / 2.0).floor(),
                    _ => slack,
                };
                (*line, shift)
            })
            .collect();
        let laid_out = node.laid_out.clone();

        for (line, shift) in shifts {
            if shift <= 0.0 {
                continue;
            }
            for &child in laid_out.get(line.start..line.end).unwrap_or(&[]) {
                let node = self.node_mut(child);
                if node.is_in_flow() {
                    node.bounds.x += shift;
                }
            }
        }
    }

    /// Finish the current line at `end` and open the next line below it.
    fn close_line(&mut self, b: &mut LineBuilder, end: BreakPoint) {
        let height = b.line_height.max(end.max_height);
        b.lines.push(ContentLine {
            start: b.line.start,
            end: end.index,
            y: b.stack.y,
            height,
            x: b.line.x1,
            width: end.x - b.line.x1,
            limit: b.line.x2 - b.line.x1,
            right: (b.wlimit - b.line.x2).max(0.0),
        });
        b.stack.preferred = b.stack.preferred.max(end.x + (b.wlimit - b.line.x2).max(0.0));
        b.stack.y += height;
        b.line = LineState::new(end.index, self.line_edges(&b.ctx, b.stack.y, b.wlimit));
    }

    /// Left and right line edges at `y` in the content coordinates of the
    /// block, between the floats of its formatting context.
    fn line_edges(&self, ctx: &FloatContext, y: f32, wlimit: f32) -> (f32, f32) {
        let fy = y + ctx.y;
        let left = (self.tree.float_lists[ctx.left.0].width_at(fy) - ctx.xl).max(0.0);
        let right = (self.tree.float_lists[ctx.right.0].width_at(fy) - ctx.xr).max(0.0);
        (left.min(wlimit), (wlimit - right).max(left.min(wlimit)))
    }

    /// The next y below `y`, in block content coordinates, at which the
    /// floats narrowing a line change.
    fn next_float_edge(&self, ctx: &FloatContext, y: f32) -> f32 {
        let fy = y + ctx.y;
        let next = self.tree.float_lists[ctx.left.0]
            .next_y(fy)
            .min(self.tree.float_lists[ctx.right.0].next_y(fy));
        next - ctx.y
    }

    fn is_line_content(&self, id: BoxId) -> bool {
        let node = self.node(id);
        node.displayed && node.is_in_flow()
    }

    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// Lay out an inline box. Its children are placed one after the other; a
    /// child that does not fit splits the box into this box and a fragment
    /// holding the rest.
    pub(crate) fn layout_inline_box(
        &mut self,
        id: BoxId,
        available: f32,
        force: bool,
    ) -> LayoutResult<LayoutOutcome> {
        let node = self.node_mut(id);
        node.laid_out = node.home_children().to_vec();
        let range = node.home_range.clone();
        let edges = node.dimensions.horizontal_edges();
        let content_available = available - edges;

        let mut x = 0.0_f32;
        let mut max_height = 0.0_f32;
        let mut last_break: Option<BreakPoint> = None;
        let mut outcome = LayoutOutcome::FIT;
        let mut placed_end = range.end;

        for i in range.clone() {
            let child = self.node(id).children[i];
            if i > range.start && self.can_split_before(child) {
                last_break = Some(BreakPoint { index: i, x, max_height });
            }
            let force_child = force && (i == range.start || last_break.is_none());
            let child_outcome = self.layout_box(child, content_available - x, force_child)?;
            if child_outcome.fit {
                let node = self.node_mut(child);
                node.bounds.x = x;
                node.bounds.y = 0.0;
                if node.displayed && node.is_in_flow() {
                    x += node.bounds.width;
                    max_height = max_height.max(node.bounds.height);
                }
                if let Some(remainder) = child_outcome.remainder {
                    outcome = LayoutOutcome::split(self.inline_fragment(id, i, Some(remainder)));
                    placed_end = i + 1;
                    break;
                }
                if self.can_split_after(child) {
                    last_break = Some(BreakPoint { index: i + 1, x, max_height });
                }
                continue;
            }
            match last_break {
                Some(b) if b.index > range.start => {
                    outcome = LayoutOutcome::split(self.inline_fragment(id, b.index, None));
                    placed_end = b.index;
                    x = b.x;
                    max_height = b.max_height;
                }
                _ => outcome = LayoutOutcome::NO_FIT,
            }
            break;
        }
        if placed_end == range.end && !outcome.fit {
            return Ok(outcome);
        }

        let node = self.node_mut(id);
        node.laid_out = node.children.get(range.start..placed_end).unwrap_or(&[]).to_vec();
        node.dimensions.content.width = x;
        node.dimensions.content.height = node.line_height.max(max_height);
        node.sync_bounds();
        let max_line_height = self.max_line_height(id);
        let node = self.node_mut(id);
        if let BoxKind::Inline(data) = &mut node.kind {
            data.max_line_height = max_line_height;
        }
        if range.is_empty() {
            let fits = force || node.bounds.width <= available;
            return Ok(if fits { LayoutOutcome::FIT } else { LayoutOutcome::NO_FIT });
        }
        Ok(outcome)
    }

    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// Create the fragment of inline box `id` that continues at child index
    /// `from`, with the child there replaced by `remainder` when given.
    fn inline_fragment(&mut self, id: BoxId, from: usize, remainder: Option<BoxId>) -> BoxId {
        let mut fragment = self.node(id).clone();
        if let Some(remainder) = remainder {
            if let Some(slot) = fragment.children.get_mut(from) {
                *slot = remainder;
            }
        }
        fragment.home_range = from..fragment.home_range.end;
        fragment.laid_out = Vec::new();
        fragment.splitted = true;
        fragment.bounds = Rect::default();
        let fragment_id = BoxId(self.tree.boxes.len());
        self.tree.boxes.push(fragment);
        fragment_id
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// The largest line height among `id` and its laid-out descendants.
    fn max_line_height(&self, id: BoxId) -> f32 {
        let node = self.node(id);
        node.laid_out
            .iter()
            .map(|&child| match &self.node(child).kind {
                BoxKind::Inline(data) => data.max_line_height,
                _ => self.node(child).line_height,
            })
            .fold(node.line_height, f32::max)
    }

    /// Lay out a text run within `available` pixels.
    ///
    /// [§ 5.5.2 Word Breaking Rules](https://www.w3.org/TR/css-text-3/#word-breaking)
    ///
    /// A run that does not fit is split at the last soft wrap opportunity
    /// that fits. A forced run that has none places its first word.
    pub(crate) fn layout_text(&mut self, id: BoxId, available: f32, force: bool) -> LayoutOutcome {
        let node = self.node(id);
        let BoxKind::Text(data) = &node.kind else {
            return LayoutOutcome::NO_FIT;
        };
        let text = data.text.clone();
        let font = node.font.clone();
        let ctx = self.ctx;
        let measure = ctx.measure.as_ref();

        let whole = measure.text_width(text.trim_end(), &font);
        let split_at = if whole <= available {
            None
        } else {
            match find_break_opportunity(&text, available, &font, measure) {
                Some(idx) => Some(idx),
                None if force => break_opportunities(&text).next(),
                None => return LayoutOutcome::NO_FIT,
            }
        };

        let shown = split_at.unwrap_or(text.len());
        let width = measure.text_width(
            if split_at.is_some() { text[..shown].trim_end() } else { &text },
            &font,
        );
        let node = self.node_mut(id);
        if let BoxKind::Text(data) = &mut node.kind {
            data.shown = shown;
        }
        node.dimensions.content.width = width;
        node.dimensions.content.height = node.line_height;
        node.sync_bounds();

        match split_at {
            Some(idx) => LayoutOutcome::split(self.text_remainder(id, idx)),
            None => LayoutOutcome::FIT,
        }
    }

    /// A new text box holding the part of `id` from byte `from` on.
    fn text_remainder(&mut self, id: BoxId, from: usize) -> BoxId {
        let mut remainder = self.node(id).clone();
        if let BoxKind::Text(data) = &mut remainder.kind {
            let rest = data.text.get(from..).unwrap_or_default().to_string();
            *data = TextData {
                shown: rest.len(),
                text: rest,
            };
        }
        remainder.splitted = true;
        remainder.bounds = Rect::default();
        let remainder_id = BoxId(self.tree.boxes.len());
        self.tree.boxes.push(remainder);
        remainder_id
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// Replaced boxes have their size from loading and never split.
    pub(crate) fn layout_replaced(&mut self, id: BoxId, available: f32, force: bool) -> LayoutOutcome {
        let node = self.node_mut(id);
        node.sync_bounds();
        if force || node.bounds.width <= available {
            LayoutOutcome::FIT
        } else {
            LayoutOutcome::NO_FIT
        }
    }

    /// A line may end right before `id`.
    pub(crate) fn can_split_before(&self, id: BoxId) -> bool {
        let node = self.node(id);
        match &node.kind {
            BoxKind::Text(data) => data.text.starts_with(char::is_whitespace),
            BoxKind::Replaced(_) => true,
            BoxKind::Block(block) => block.inline_block,
            BoxKind::Inline(_) => node
                .home_children()
                .first()
                .is_some_and(|&first| self.can_split_before(first)),
        }
    }

    /// A line may end right after `id`.
    pub(crate) fn can_split_after(&self, id: BoxId) -> bool {
        let node = self.node(id);
        match &node.kind {
            BoxKind::Text(data) => data.shown_text().ends_with(char::is_whitespace),
            BoxKind::Replaced(_) => true,
            BoxKind::Block(block) => block.inline_block,
            BoxKind::Inline(_) => node
                .laid_out
                .last()
                .or_else(|| node.home_children().last())
                .is_some_and(|&last| self.can_split_after(last)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_align_keywords() {
        assert_eq!("center".parse(), Ok(TextAlign::Center));
        assert_eq!(TextAlign::default(), TextAlign::Left);
        assert_eq!(TextAlign::Justify.to_string(), "justify");
    }
}
