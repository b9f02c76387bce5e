//! Layout box types.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::style::{Overflow, SharedStyle};

use super::box_model::{BoxDimensions, Rect, Size, SizeLimits};
use super::float::{ClearSide, FloatContext, FloatListId, FloatSide};
use super::inline::{ContentLine, TextAlign};
use super::positioned::{BoxOffsets, PositionScheme};
use super::text::FontSpec;

/// Index of a [`LayoutBox`] in its [`LayoutTree`](super::LayoutTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoxId(pub usize);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a float ended up in its formatting context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPlacement {
    /// The list the float was recorded in.
    pub list: FloatListId,
    /// Distance from the owner's content edge on the float's side.
    pub x: f32,
    /// Top margin edge in the owner's content coordinates.
    pub y: f32,
}

/// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
///
/// State of a block container box. Inline-blocks, floats and absolutely
/// positioned boxes are block containers too.
#[derive(Debug, Clone, Default)]
pub struct BlockData {
    /// `float`
    pub float: Option<FloatSide>,
    /// `clear`
    pub clear: Option<ClearSide>,
    /// `position`
    pub position: PositionScheme,
    /// `overflow`
    pub overflow: Overflow,
    /// `text-align`
    pub text_align: TextAlign,
    /// Generated for inline content next to block-level siblings.
    pub anonymous: bool,
    /// `display: inline-block`
    pub inline_block: bool,
    /// Resolved `top`/`right`/`bottom`/`left`.
    pub offsets: BoxOffsets,
    /// Resolved min/max constraints.
    pub limits: SizeLimits,
    /// The width was given explicitly.
    pub width_set: bool,
    /// The height was given explicitly.
    pub height_set: bool,
    /// Outer width this box would like to have; `None` when it has no
    /// preference (auto width in normal flow).
    pub preferred_width: Option<f32>,
    /// Widest line or block found by the last layout.
    pub last_preferred_width: f32,
    /// Float lists this box places floats into.
    pub floats: Option<FloatContext>,
    /// Float lists owned by this box when it roots a formatting context.
    pub owned_floats: Option<(FloatListId, FloatListId)>,
    /// Set when this box is a float that has been placed.
    pub placement: Option<FloatPlacement>,
    /// Line boxes of the last inline layout; empty for stacked blocks.
    pub lines: Vec<ContentLine>,
}

/// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineData {
    /// The largest line height among this box and its descendants.
    pub max_line_height: f32,
}

/// A run of text. Splits at whitespace.
#[derive(Debug, Clone, Default)]
pub struct TextData {
    /// The run, with whitespace collapsed.
    pub text: String,
    /// Byte length of the prefix placed by the last layout.
    pub shown: usize,
}

impl TextData {
    /// The part of the run placed by the last layout.
    #[must_use]
    pub fn shown_text(&self) -> &str {
        self.text.get(..self.shown).unwrap_or(&self.text)
    }
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// An atomic inline-level box with an intrinsic size reported by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplacedData {
    /// Intrinsic width.
    pub intrinsic_width: f32,
    /// Intrinsic height.
    pub intrinsic_height: f32,
}

/// The kind of box and its kind-specific state.
#[derive(Debug, Clone)]
pub enum BoxKind {
    /// Block container.
    Block(BlockData),
    /// Non-replaced inline box.
    Inline(InlineData),
    /// Text run.
    Text(TextData),
    /// Replaced element.
    Replaced(ReplacedData),
}

/// A node of the layout tree.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// Kind and kind-specific state.
    pub kind: BoxKind,
    /// The box's style.
    pub style: SharedStyle,
    /// Tree parent; `None` for the root.
    pub parent: Option<BoxId>,
    /// Child list. Fragments carry a copy with the split child replaced.
    pub children: Vec<BoxId>,
    /// The part of `children` that belongs to this box.
    pub home_range: Range<usize>,
    /// Children in the order produced by the last layout, including the
    /// remainders spliced in during that layout.
    pub laid_out: Vec<BoxId>,
    /// Containing block, assigned before sizes are loaded.
    pub containing_block: Option<BoxId>,
    /// `display` is not `none`.
    pub displayed: bool,
    /// `visibility` is `visible`.
    pub visible: bool,
    /// Margin, border, padding and content sizes.
    pub dimensions: BoxDimensions,
    /// Margin box: relative to the parent's content box until the position
    /// pass, absolute afterwards.
    pub bounds: Rect,
    /// Created as a remainder by a previous layout.
    pub splitted: bool,
    /// Used `line-height`.
    pub line_height: f32,
    /// Width offered by the last layout call.
    pub available_width: f32,
    /// Used font.
    pub font: FontSpec,
}

impl LayoutBox {
    pub(crate) fn new(kind: BoxKind, style: SharedStyle, parent: Option<BoxId>) -> Self {
        Self {
            kind,
            style,
            parent,
            children: Vec::new(),
            home_range: 0..0,
            laid_out: Vec::new(),
            containing_block: None,
            displayed: true,
            visible: true,
            dimensions: BoxDimensions::default(),
            bounds: Rect::default(),
            splitted: false,
            line_height: 0.0,
            available_width: 0.0,
            font: FontSpec::default(),
        }
    }

    /// Block state, if this is a block container.
    #[must_use]
    pub const fn block(&self) -> Option<&BlockData> {
        match &self.kind {
            BoxKind::Block(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn block_mut(&mut self) -> Option<&mut BlockData> {
        match &mut self.kind {
            BoxKind::Block(data) => Some(data),
            _ => None,
        }
    }

    /// The children this box owns, before any layout splicing.
    #[must_use]
    pub fn home_children(&self) -> &[BoxId] {
        self.children.get(self.home_range.clone()).unwrap_or(&[])
    }

    /// True for block containers.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self.kind, BoxKind::Block(_))
    }

    /// True for floats.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.block().is_some_and(|b| b.float.is_some())
    }

    /// True for `position: absolute` and `position: fixed`.
    #[must_use]
    pub fn is_out_of_flow_positioned(&self) -> bool {
        self.block().is_some_and(|b| b.position.is_out_of_flow())
    }

    /// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
    ///
    /// "An element is called out of flow if it is floated, absolutely
    /// positioned, or is the root element."
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        !self.is_floating() && !self.is_out_of_flow_positioned()
    }

    /// An in-flow block box that takes part in block stacking.
    #[must_use]
    pub fn in_normal_block_flow(&self) -> bool {
        self.is_in_flow() && self.block().is_some_and(|b| !b.inline_block)
    }

    /// Inline boxes, text, replaced boxes and inline-blocks.
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        match &self.kind {
            BoxKind::Block(data) => data.inline_block,
            _ => true,
        }
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks, table-cells, and table-captions) that are not block
    /// boxes, and block boxes with 'overflow' other than 'visible' (except
    /// when that value has been propagated to the viewport) establish new
    /// block formatting contexts for their contents."
    #[must_use]
    pub fn establishes_bfc(&self) -> bool {
        self.block().is_some_and(|b| {
            self.parent.is_none()
                || b.float.is_some()
                || b.position.is_out_of_flow()
                || b.overflow != Overflow::Visible
                || b.inline_block
        })
    }

    /// `width` was set explicitly, or the box is a replaced element.
    #[must_use]
    pub fn width_set(&self) -> bool {
        match &self.kind {
            BoxKind::Block(b) => b.width_set,
            BoxKind::Replaced(_) => true,
            _ => false,
        }
    }

    /// `height` was set explicitly, or the box is a replaced element.
    #[must_use]
    pub fn has_fixed_height(&self) -> bool {
        match &self.kind {
            BoxKind::Block(b) => b.height_set,
            BoxKind::Replaced(_) => true,
            _ => false,
        }
    }

    /// Content rectangle in the coordinates of `bounds`.
    #[must_use]
    pub fn content_box(&self) -> Rect {
        self.dimensions.content_box(self.bounds)
    }

    /// Padding rectangle in the coordinates of `bounds`.
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.dimensions.padding_box(self.bounds)
    }

    /// Border rectangle in the coordinates of `bounds`.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.dimensions.border_box(self.bounds)
    }

    /// Recompute the outer size from the edges and the content size.
    pub(crate) fn sync_bounds(&mut self) {
        self.bounds.width = self.dimensions.outer_width();
        self.bounds.height = self.dimensions.outer_height();
    }

    /// Collapse the box to nothing (`display: none`).
    pub(crate) fn collapse(&mut self) {
        self.dimensions.content = Size::default();
        self.bounds.width = 0.0;
        self.bounds.height = 0.0;
    }

    /// Short description used by trace output and the CLI.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.kind {
            BoxKind::Block(b) if b.anonymous => "anonymous block".to_string(),
            BoxKind::Block(b) if b.inline_block => "inline-block".to_string(),
            BoxKind::Block(b) => match (b.float, b.position) {
                (Some(side), _) => format!("block float:{side}"),
                (None, PositionScheme::Static) => "block".to_string(),
                (None, scheme) => format!("block position:{scheme}"),
            },
            BoxKind::Inline(_) => "inline".to_string(),
            BoxKind::Text(t) => format!("text {:?}", t.shown_text()),
            BoxKind::Replaced(_) => "replaced".to_string(),
        }
    }
}
