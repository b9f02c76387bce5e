//! Box tree and layout engines.
//!
//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! "In the visual formatting model, each element in the document tree
//! generates zero or more boxes according to the box model. The layout of
//! these boxes is governed by: box dimensions and type, positioning scheme
//! (normal flow, float, and absolute positioning), relationships between
//! elements in the document tree, and external information (e.g., viewport
//! size, intrinsic dimensions of images, etc.)."
//!
//! One [`LayoutTree::layout`] call runs these steps:
//!
//! 1. Normalize the tree (anonymous blocks, block-in-inline promotion).
//! 2. Assign containing blocks.
//! 3. Load sizes from style, top-down.
//! 4. Lay out the root. The block engine ([`block`]) and the inline engine
//!    ([`inline`]) recurse into each other.
//! 5. Resolve absolute positions ([`positioned`]).

/// Block formatting: stacking, clearance and float placement.
pub mod block;
/// Box model types.
pub mod box_model;
/// Float lists.
pub mod float;
/// Inline formatting: line breaking, fragmentation and alignment.
pub mod inline;
/// Minimal and maximal content widths.
pub mod intrinsic;
/// Layout box types.
pub mod layout_box;
/// Positioning schemes and the position pass.
pub mod positioned;
/// Width and height resolution.
pub mod sizing;
/// Text measurement.
pub mod text;
/// Tree storage, construction and the layout entry point.
pub mod tree;
/// Auto-or-length values.
pub mod values;

pub use box_model::{BoxDimensions, EdgeSizes, Rect, Size, SizeLimits};
pub use float::{ClearSide, FloatContext, FloatEntry, FloatList, FloatListId, FloatSide};
pub use inline::{ContentLine, TextAlign};
pub use layout_box::{BlockData, BoxId, BoxKind, FloatPlacement, LayoutBox};
pub use positioned::{BoxOffsets, PositionScheme};
pub use text::{ApproximateTextMeasure, FontSpec, TextMeasure};
pub use tree::{BoxGeometry, LayoutTree};

use crate::config::LayoutConfig;
use crate::style::{CssLengthDecoder, LengthDecoder};

/// External capabilities and tunables used by one layout run.
pub struct LayoutContext {
    /// Tunables.
    pub config: LayoutConfig,
    /// Length decoding.
    pub decoder: Box<dyn LengthDecoder>,
    /// Text measurement.
    pub measure: Box<dyn TextMeasure>,
}

impl LayoutContext {
    /// A context with the stock decoder and approximate text metrics.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        let decoder = CssLengthDecoder::new(config.default_font_size, config.medium_border_width);
        Self {
            config,
            decoder: Box::new(decoder),
            measure: Box::new(ApproximateTextMeasure),
        }
    }

    /// Replace the length decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Box<dyn LengthDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Replace the text measurement.
    #[must_use]
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// Result of laying out one box.
///
/// A box that cannot be placed whole returns the part it could not place as
/// `remainder`, a new box that the caller inserts as the next sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOutcome {
    /// Something was placed.
    pub fit: bool,
    /// Continuation fragment.
    pub remainder: Option<BoxId>,
}

impl LayoutOutcome {
    /// Placed completely.
    pub const FIT: Self = Self {
        fit: true,
        remainder: None,
    };

    /// Nothing placed.
    pub const NO_FIT: Self = Self {
        fit: false,
        remainder: None,
    };

    /// Placed in part.
    #[must_use]
    pub const fn split(remainder: BoxId) -> Self {
        Self {
            fit: true,
            remainder: Some(remainder),
        }
    }
}

/// Mutable access to a tree for the duration of one layout pass.
pub(crate) struct Engine<'a> {
    pub(crate) tree: &'a mut LayoutTree,
    pub(crate) ctx: &'a LayoutContext,
}

impl<'a> Engine<'a> {
    pub(crate) const fn new(tree: &'a mut LayoutTree, ctx: &'a LayoutContext) -> Self {
        Self { tree, ctx }
    }

    pub(crate) fn node(&self, id: BoxId) -> &LayoutBox {
        &self.tree.boxes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.tree.boxes[id.0]
    }

    /// Lay out any box within `available` pixels of width.
    ///
    /// `force` asks the box to place something even if it overflows.
    pub(crate) fn layout_box(
        &mut self,
        id: BoxId,
        available: f32,
        force: bool,
    ) -> crate::LayoutResult<LayoutOutcome> {
        #[cfg(feature = "layout-trace")]
        let _depth = trace::enter(self.node(id), id, available, force);

        self.node_mut(id).available_width = available;
        if !self.node(id).displayed {
            self.node_mut(id).collapse();
            return Ok(LayoutOutcome::FIT);
        }
        match self.node(id).kind {
            BoxKind::Block(_) => self.layout_block(id, available, force),
            BoxKind::Inline(_) => self.layout_inline_box(id, available, force),
            BoxKind::Text(_) => Ok(self.layout_text(id, available, force)),
            BoxKind::Replaced(_) => Ok(self.layout_replaced(id, available, force)),
        }
    }
}

#[cfg(feature = "layout-trace")]
pub(crate) mod trace {
    use std::cell::Cell;

    use super::{BoxId, LayoutBox};

    thread_local! {
        static LAYOUT_DEPTH: Cell<usize> = const { Cell::new(0) };
    }

    /// Decrements the depth counter on all return paths.
    pub(crate) struct DepthGuard;

    impl Drop for DepthGuard {
        fn drop(&mut self) {
            LAYOUT_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        }
    }

    pub(crate) fn enter(node: &LayoutBox, id: BoxId, available: f32, force: bool) -> DepthGuard {
        let depth = LAYOUT_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        eprintln!(
            "[LAYOUT DEPTH] {:indent$}depth={depth} box={id} {} available={available} force={force}",
            "",
            node.label(),
            indent = depth * 2
        );
        DepthGuard
    }
}
