//! CSS Positioned Layout.
//!
//! [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
//!
//! "In CSS 2, a box may be laid out according to three positioning schemes:
//!
//! 1. Normal flow. In CSS 2, normal flow includes block formatting of block-level
//!    boxes, inline formatting of inline-level boxes, and relative positioning of
//!    block-level and inline-level boxes.
//!
//! 2. Floats. In the float model, a box is first laid out according to the normal
//!    flow, then taken out of the flow and shifted to the left or right as far as
//!    possible.
//!
//! 3. Absolute positioning. In the absolute positioning model, a box is removed
//!    from the normal flow entirely and assigned a position with respect to a
//!    containing block."
//!
//! Layout places every box relative to its parent's content box. The position
//! pass here runs once the whole tree is laid out and converts those local
//! positions to absolute coordinates, applying relative offsets, absolute
//! placement and the float positions recorded in the float lists.

use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::error::{LayoutError, LayoutResult};

use super::box_model::Rect;
use super::float::FloatSide;
use super::{BoxId, Engine};

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2
/// positioning algorithms is used to calculate the position of a box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PositionScheme {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the
    /// 'top', 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but the box is fixed with respect to some reference."
    Fixed,
}

impl PositionScheme {
    /// `absolute` and `fixed` take the box out of the flow.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// "An element is said to be positioned if its 'position' property has
    /// a value other than 'static'."
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// [§ 9.3.2 Box offsets: 'top', 'right', 'bottom', 'left'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// `None` means the offset is `auto`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxOffsets {
    /// `top`
    pub top: Option<f32>,
    /// `right`
    pub right: Option<f32>,
    /// `bottom`
    pub bottom: Option<f32>,
    /// `left`
    pub left: Option<f32>,
}

impl BoxOffsets {
    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// "If neither 'left' nor 'right' is 'auto', the position is
    /// over-constrained, and one of them has to be ignored... If the
    /// 'direction' property of the containing block is 'ltr', the value of
    /// 'left' wins." The same holds for 'top' over 'bottom'.
    #[must_use]
    pub fn relative_shift(&self) -> (f32, f32) {
        let dx = self.left.or(self.right.map(|r| -r)).unwrap_or(0.0);
        let dy = self.top.or(self.bottom.map(|b| -b)).unwrap_or(0.0);
        (dx, dy)
    }

    /// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// Margin-box origin of a box of `outer_width` × `outer_height` inside
    /// the containing block's content rectangle `cb`. Without offsets the box
    /// sits at the containing block's origin.
    #[must_use]
    pub fn absolute_origin(&self, cb: Rect, outer_width: f32, outer_height: f32) -> (f32, f32) {
        let x = match (self.left, self.right) {
            (Some(left), _) => cb.x + left,
            (None, Some(right)) => cb.right() - outer_width - right,
            (None, None) => cb.x,
        };
        let y = match (self.top, self.bottom) {
            (Some(top), _) => cb.y + top,
            (None, Some(bottom)) => cb.bottom() - outer_height - bottom,
            (None, None) => cb.y,
        };
        (x, y)
    }
}

impl Engine<'_> {
    /// Resolve `top`/`right`/`bottom`/`left` against the containing block's
    /// content size.
    fn load_offsets(&mut self, id: BoxId, cb_width: f32, cb_height: f32) {
        let style = self.node(id).style.clone();
        let decoder = self.ctx.decoder.as_ref();
        let offsets = BoxOffsets {
            top: decoder.resolve_optional(style.property("top"), cb_height),
            right: decoder.resolve_optional(style.property("right"), cb_width),
            bottom: decoder.resolve_optional(style.property("bottom"), cb_height),
            left: decoder.resolve_optional(style.property("left"), cb_width),
        };
        if let Some(block) = self.node_mut(id).block_mut() {
            block.offsets = offsets;
        }
    }

    /// Convert the bounds of `id` and its laid-out descendants from
    /// parent-relative to absolute coordinates. `origin` is the absolute
    /// content origin of the parent.
    pub(crate) fn absolute_positions(&mut self, id: BoxId, origin: (f32, f32)) -> LayoutResult<()> {
        let node = self.node(id);
        if !node.displayed {
            return Ok(());
        }
        let mut x = origin.0 + node.bounds.x;
        let mut y = origin.1 + node.bounds.y;

        if let Some(block) = node.block().cloned() {
            if block.position.is_positioned() {
                let cb = self.containing_content_box(id)?;
                self.load_offsets(id, cb.width, cb.height);
            }
            let offsets = self.node(id).block().map(|b| b.offsets).unwrap_or_default();
            let (outer_width, outer_height) = (self.node(id).bounds.width, self.node(id).bounds.height);

            if let (Some(side), Some(placement)) = (block.float, block.placement) {
                // Floats sit where the float list recorded them, measured from
                // the list owner's content box.
                let owner = self.tree.float_lists[placement.list.0].owner();
                let owner_content = self.node(owner).content_box();
                x = match side {
                    FloatSide::Left => owner_content.x + placement.x,
                    FloatSide::Right => owner_content.right() - outer_width - placement.x,
                };
                y = owner_content.y + placement.y;
            } else if block.position.is_out_of_flow() {
                let cb = self.containing_content_box(id)?;
                (x, y) = offsets.absolute_origin(cb, outer_width, outer_height);
            } else if block.position == PositionScheme::Relative {
                let (dx, dy) = offsets.relative_shift();
                x += dx;
                y += dy;
            }
        }

        let node = self.node_mut(id);
        node.bounds.x = x;
        node.bounds.y = y;
        let content = node.content_box();
        let children = node.laid_out.clone();
        for child in children {
            self.absolute_positions(child, (content.x, content.y))?;
        }
        Ok(())
    }

    fn containing_content_box(&self, id: BoxId) -> LayoutResult<Rect> {
        let cb = self
            .node(id)
            .containing_block
            .ok_or(LayoutError::MissingContainingBlock(id))?;
        Ok(self.node(cb).content_box())
    }
}
