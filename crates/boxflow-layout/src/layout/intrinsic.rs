//! Minimal and maximal content widths.
//!
//! [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//!
//! "Calculation of the shrink-to-fit width is similar to calculating the
//! width of a table cell using the automatic table layout algorithm. Roughly:
//! calculate the preferred width by formatting the content without breaking
//! lines other than where explicit line breaks occur, and also calculate the
//! preferred minimum width, e.g., by trying all possible line breaks."
//!
//! Both widths are outer widths and only look at the children a box owns, so
//! fragments left over from an earlier layout do not count twice.

use super::layout_box::BoxKind;
use super::{BoxId, Engine};

impl Engine<'_> {
    /// The narrowest outer width `id` can be laid out in without overflowing:
    /// the widest unbreakable piece of its content.
    pub(crate) fn minimal_width(&self, id: BoxId) -> f32 {
        let node = self.node(id);
        if !node.displayed {
            return 0.0;
        }
        let edges = node.dimensions.horizontal_edges();
        match &node.kind {
            BoxKind::Text(text) => text
                .text
                .split_whitespace()
                .map(|word| self.ctx.measure.text_width(word, &node.font))
                .fold(0.0, f32::max),
            BoxKind::Replaced(_) => node.dimensions.outer_width(),
            BoxKind::Inline(_) => self.widest_minimal(id) + edges,
            BoxKind::Block(block) => {
                let content = if block.width_set {
                    node.dimensions.content.width
                } else {
                    block.limits.clamp_width(self.widest_minimal(id))
                };
                content + edges
            }
        }
    }

    /// The outer width `id` takes when no line is broken.
    pub(crate) fn maximal_width(&self, id: BoxId) -> f32 {
        let node = self.node(id);
        if !node.displayed {
            return 0.0;
        }
        let edges = node.dimensions.horizontal_edges();
        match &node.kind {
            BoxKind::Text(text) => self.ctx.measure.text_width(text.text.trim(), &node.font),
            BoxKind::Replaced(_) => node.dimensions.outer_width(),
            BoxKind::Inline(_) => self.line_of_children(id) + edges,
            BoxKind::Block(block) => {
                let content = if block.width_set {
                    node.dimensions.content.width
                } else {
                    block.limits.clamp_width(self.widest_line(id))
                };
                content + edges
            }
        }
    }

    /// The content width below which a shrinking block may not go.
    pub(crate) fn minimal_content_width_limit(&self, id: BoxId) -> f32 {
        let node = self.node(id);
        let Some(block) = node.block() else {
            return 0.0;
        };
        if block.width_set {
            return node.dimensions.content.width;
        }
        if let Some(min) = block.limits.min_width {
            return min;
        }
        match node.containing_block {
            Some(cb) if cb != id && node.in_normal_block_flow() => {
                (self.minimal_content_width_limit(cb) - node.dimensions.horizontal_edges()).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// The content width does not depend on the content: it was set
    /// explicitly, or the box stretches across a containing block whose own
    /// width is fixed.
    pub(crate) fn has_fixed_width(&self, id: BoxId) -> bool {
        let node = self.node(id);
        if node.width_set() {
            return true;
        }
        if !node.in_normal_block_flow() {
            return false;
        }
        match node.containing_block {
            Some(cb) if cb != id => self.has_fixed_width(cb),
            _ => false,
        }
    }

    /// The box lays out its children in lines rather than stacking them.
    pub(crate) fn has_inline_content(&self, id: BoxId) -> bool {
        let node = self.node(id);
        node.home_children()
            .iter()
            .any(|&child| self.node(child).displayed && self.node(child).is_inline_level())
            && !node
                .home_children()
                .iter()
                .any(|&child| self.node(child).in_normal_block_flow())
    }

    /// Largest minimal width among the children that take part in sizing.
    fn widest_minimal(&self, id: BoxId) -> f32 {
        self.node(id)
            .home_children()
            .iter()
            .filter(|&&child| !self.node(child).is_out_of_flow_positioned())
            .map(|&child| self.minimal_width(child))
            .fold(0.0, f32::max)
    }

    /// Sum of the maximal widths of the children placed side by side.
    fn line_of_children(&self, id: BoxId) -> f32 {
        self.node(id)
            .home_children()
            .iter()
            .filter(|&&child| !self.node(child).is_out_of_flow_positioned())
            .map(|&child| self.maximal_width(child))
            .sum()
    }

    /// The widest unbroken line of a block's content. Runs of inline-level
    /// children add up; block-level, floating and positioned children stand
    /// alone and end the current run when they are in flow.
    fn widest_line(&self, id: BoxId) -> f32 {
        let mut widest = 0.0_f32;
        let mut run = 0.0_f32;
        for &child in self.node(id).home_children() {
            let node = self.node(child);
            let width = self.maximal_width(child);
            if node.is_in_flow() && node.is_inline_level() {
                run += width;
                widest = widest.max(run);
            } else {
                if node.in_normal_block_flow() {
                    run = 0.0;
                }
                widest = widest.max(width);
            }
        }
        widest
    }
}
