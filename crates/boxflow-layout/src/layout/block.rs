//! CSS Block Formatting.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! Floats are placed into the float lists of the formatting context the
//! parent belongs to. Block boxes that do not establish a formatting context
//! share their parent's lists through a [`FloatContext`] shifted by their own
//! edges.

use crate::error::{LayoutError, LayoutResult};

use super::float::{
    max_float_width, ClearSide, FloatContext, FloatEntry, FloatList, FloatListId, FloatSide,
};
use super::layout_box::{BoxKind, FloatPlacement};
use super::{BoxId, Engine, LayoutOutcome};

/// Running state of one layout pass over a block's children.
#[derive(Debug, Default)]
pub(crate) struct StackState {
    /// Flow cursor in the parent's content coordinates.
    pub(crate) y: f32,
    /// Widest preferred outer width among the placed children.
    pub(crate) preferred: f32,
}

impl Engine<'_> {
    /// The float lists owned by `id`, created on first use.
    pub(crate) fn ensure_float_lists(&mut self, id: BoxId) -> (FloatListId, FloatListId) {
        if let Some(lists) = self.node(id).block().and_then(|b| b.owned_floats) {
            return lists;
        }
        let left = FloatListId(self.tree.float_lists.len());
        self.tree.float_lists.push(FloatList::new(id, FloatSide::Left));
        let right = FloatListId(self.tree.float_lists.len());
        self.tree.float_lists.push(FloatList::new(id, FloatSide::Right));
        if let Some(block) = self.node_mut(id).block_mut() {
            block.owned_floats = Some((left, right));
        }
        (left, right)
    }

    /// Lay out a block container and its content within `available` pixels.
    ///
    /// Block boxes always fit. Inline-blocks fit when their margin box is no
    /// wider than `available`, or when forced.
    pub(crate) fn layout_block(
        &mut self,
        id: BoxId,
        available: f32,
        force: bool,
    ) -> LayoutResult<LayoutOutcome> {
        // STEP 1: Start from the owned children, dropping earlier fragments.
        let node = self.node_mut(id);
        node.laid_out = node.home_children().to_vec();

        // STEP 2: Formatting contexts start with empty float lists.
        let needs_lists = self.node(id).establishes_bfc()
            || self.node(id).block().is_some_and(|b| b.floats.is_none());
        if needs_lists {
            let (left, right) = self.ensure_float_lists(id);
            self.tree.float_lists[left.0].clear();
            self.tree.float_lists[right.0].clear();
            if let Some(block) = self.node_mut(id).block_mut() {
                block.floats = Some(FloatContext::root(left, right));
            }
        }

        // STEP 3: The width the content may use.
        let node = self.node(id);
        let content_width = node.dimensions.content.width;
        let wlimit = node
            .block()
            .and_then(|b| b.limits.max_width)
            .map_or(content_width, |max| content_width.min(max));

        // STEP 4: Lines or stacked blocks.
        if self.has_inline_content(id) {
            self.layout_inline_content(id, wlimit)?;
        } else {
            self.layout_blocks(id, wlimit)?;
        }

        let node = self.node(id);
        let inline_block = node.block().is_some_and(|b| b.inline_block);
        let fits = force || !inline_block || node.dimensions.outer_width() <= available;
        Ok(if fits { LayoutOutcome::FIT } else { LayoutOutcome::NO_FIT })
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// Stack the block-level children of `id` vertically.
    fn layout_blocks(&mut self, id: BoxId, wlimit: f32) -> LayoutResult<()> {
        let ctx = self.float_context(id)?;
        let mut state = StackState::default();
        let mut children = self.node(id).laid_out.clone();

        let mut i = 0;
        while let Some(&child) = children.get(i) {
            i += 1;
            let node = self.node(child);
            if !node.displayed {
                let _ = self.layout_box(child, wlimit, true)?;
                continue;
            }
            if node.is_floating() {
                let span = self.place_float(id, child, state.y, wlimit)?;
                state.preferred = state.preferred.max(span);
            } else if node.is_out_of_flow_positioned() {
                self.layout_positioned(child)?;
            } else if let Some(remainder) =
                self.layout_block_in_flow(child, &ctx, wlimit, &mut state)?
            {
                children.insert(i, remainder);
            }
        }
        self.node_mut(id).laid_out = children;
        if let Some(block) = self.node_mut(id).block_mut() {
            block.lines.clear();
        }

        let shrink = !self.has_fixed_width(id);
        self.finish_block(id, &ctx, state, shrink)
    }

    /// Place one in-flow child at the flow cursor and advance the cursor.
    fn layout_block_in_flow(
        &mut self,
        child: BoxId,
        ctx: &FloatContext,
        wlimit: f32,
        state: &mut StackState,
    ) -> LayoutResult<Option<BoxId>> {
        // [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
        //
        // "Computing the clearance of an element on which 'clear' is set is
        // done by first determining the hypothetical position of the
        // element's top border edge within its parent block... the
        // clearance is set to the amount necessary to place the border edge
        // even with the bottom outer edge of the lowest float that is to be
        // cleared."
        if let Some(clear) = self.node(child).block().and_then(|b| b.clear) {
            let cleared = self.cleared_height(ctx, clear) - ctx.y;
            state.y = state.y.max(cleared);
        }

        let dims = self.node(child).dimensions;
        let child_ctx = FloatContext {
            xl: ctx.xl + dims.leading_width(),
            xr: ctx.xr + dims.trailing_width(),
            y: ctx.y + state.y + dims.leading_height(),
            ..*ctx
        };
        let node = self.node_mut(child);
        node.bounds.x = 0.0;
        node.bounds.y = state.y;
        if let Some(block) = node.block_mut() {
            block.floats = Some(child_ctx);
        }

        let outcome = self.layout_box(child, wlimit, true)?;
        let node = self.node(child);
        state.y += node.bounds.height;
        state.preferred = state.preferred.max(self.preferred_outer_width(child));
        Ok(outcome.remainder)
    }

    /// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    ///
    /// The outer width `child` would like to have in its parent.
    pub(crate) fn preferred_outer_width(&self, child: BoxId) -> f32 {
        let node = self.node(child);
        match (&node.kind, node.width_set()) {
            (BoxKind::Block(block), true) => block
                .preferred_width
                .unwrap_or_else(|| node.dimensions.outer_width()),
            (BoxKind::Block(block), false) => {
                block.last_preferred_width + node.dimensions.horizontal_edges()
            }
            _ => node.dimensions.outer_width(),
        }
    }

    /// Shrink-to-fit and the auto height shared by block and inline content.
    pub(crate) fn finish_block(
        &mut self,
        id: BoxId,
        ctx: &FloatContext,
        state: StackState,
        shrink: bool,
    ) -> LayoutResult<()> {
        if let Some(block) = self.node_mut(id).block_mut() {
            block.last_preferred_width = state.preferred;
        }

        // [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
        // "the shrink-to-fit width is: min(max(preferred minimum width,
        // available width), preferred width)." The available width is the
        // width loaded before layout.
        if shrink {
            let current = self.node(id).dimensions.content.width;
            let target = state.preferred.max(self.minimal_content_width_limit(id));
            if target < current {
                self.set_content_width(id, target);
                self.update_child_sizes(id)?;
            }
        }

        // [§ 10.6.3 Block-level non-replaced elements in normal flow when
        // 'overflow' computes to 'visible'](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
        //
        // "If 'height' is 'auto', the height depends on whether the element
        // has any block-level children..."
        //
        // [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
        //
        // "In addition, if the element has any floating descendants whose
        // bottom margin edge is below the element's bottom content edge, then
        // the height is increased to include those edges."
        if !self.node(id).has_fixed_height() {
            let mut height = state.y;
            if self.node(id).establishes_bfc() {
                height = height.max(self.get_float_height(id) - ctx.y);
            }
            self.set_content_height(id, height);
        }
        Ok(())
    }

    /// The float context `id` lays its children out in.
    pub(crate) fn float_context(&self, id: BoxId) -> LayoutResult<FloatContext> {
        self.node(id)
            .block()
            .and_then(|b| b.floats)
            .ok_or(LayoutError::MissingContainingBlock(id))
    }

    /// Lowest bottom edge of the floats `clear` asks to clear, in owner
    /// coordinates.
    fn cleared_height(&self, ctx: &FloatContext, clear: ClearSide) -> f32 {
        let left = self.tree.float_lists[ctx.left.0].max_y();
        let right = self.tree.float_lists[ctx.right.0].max_y();
        match clear {
            ClearSide::Left => left,
            ClearSide::Right => right,
            ClearSide::Both => left.max(right),
        }
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Lay out the float `child` of `parent` and record it in the float list
    /// of its side, at flow position `y` or below. Returns the width the
    /// floats occupy across the float's vertical span, which the parent folds
    /// into its own width.
    ///
    /// "A left-floating box that has another left-floating box to its left
    /// may not have its right outer edge to the right of its containing
    /// block's right edge." A float that does not fit next to the floats
    /// already present moves down to the next float edge until it fits or
    /// nothing intrudes any more.
    pub(crate) fn place_float(
        &mut self,
        parent: BoxId,
        child: BoxId,
        y: f32,
        wlimit: f32,
    ) -> LayoutResult<f32> {
        let ctx = self.float_context(parent)?;
        let _ = self.layout_box(child, wlimit, true)?;

        let node = self.node(child);
        let (width, height) = (node.bounds.width, node.bounds.height);
        let Some(side) = node.block().and_then(|b| b.float) else {
            return Ok(0.0);
        };
        let clear = node.block().and_then(|b| b.clear);
        let (own_id, opp_id) = ctx.lists(side);
        let (own_off, opp_off) = ctx.offsets(side);
        let own = &self.tree.float_lists[own_id.0];
        let opp = &self.tree.float_lists[opp_id.0];

        // "The outer top of a floating box may not be higher than the outer
        // top of any block or floated box generated by an element earlier in
        // the source document."
        let earlier_top = own
            .entries()
            .iter()
            .chain(opp.entries())
            .map(|e| e.y)
            .fold(f32::NEG_INFINITY, f32::max);
        let mut fy = (y + ctx.y).max(earlier_top);
        if let Some(clear) = clear {
            fy = fy.max(self.cleared_height(&ctx, clear));
        }

        let fx = loop {
            let fx = own.width_at(fy).max(own_off);
            let intrusion = (opp.width_at(fy) - opp_off).max(0.0);
            let fits = fx + width <= own_off + wlimit - intrusion;
            let nothing_intrudes = fx <= own_off && intrusion <= 0.0;
            if fits || nothing_intrudes {
                break fx;
            }
            let next = match (own.next_edge(fy), opp.next_edge(fy)) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => fy + 1.0,
            };
            if next.partial_cmp(&fy) != Some(std::cmp::Ordering::Greater) {
                return Err(LayoutError::FloatSearchStalled { owner: own.owner(), y: fy });
            }
            fy = next;
        };

        self.tree.float_lists[own_id.0].add(FloatEntry {
            id: child,
            placed_by: parent,
            x: fx,
            y: fy,
            width,
            height,
        });

        let parent_width = self.node(parent).dimensions.content.width;
        let node = self.node_mut(child);
        node.bounds.x = match side {
            FloatSide::Left => fx - own_off,
            FloatSide::Right => parent_width - (fx - own_off) - width,
        };
        node.bounds.y = fy - ctx.y;
        if let Some(block) = node.block_mut() {
            block.placement = Some(FloatPlacement { list: own_id, x: fx, y: fy });
        }

        let left = &self.tree.float_lists[ctx.left.0];
        let right = &self.tree.float_lists[ctx.right.0];
        let span = max_float_width(left, right, fy, fy + height) - ctx.xl - ctx.xr;
        Ok(span.clamp(0.0, wlimit.max(0.0)))
    }

    /// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// Absolutely positioned boxes are laid out against their containing
    /// block and positioned in the position pass. They start a fresh
    /// formatting context and do not move the flow cursor.
    pub(crate) fn layout_positioned(&mut self, child: BoxId) -> LayoutResult<()> {
        let cb = self
            .node(child)
            .containing_block
            .ok_or(LayoutError::MissingContainingBlock(child))?;
        let available = self.node(cb).dimensions.content.width;
        let _ = self.layout_box(child, available, true)?;
        Ok(())
    }

    /// The lowest bottom edge, in owner coordinates, of the floats placed by
    /// `id` and by the descendants that share its float lists.
    pub(crate) fn get_float_height(&self, id: BoxId) -> f32 {
        let Some(ctx) = self.node(id).block().and_then(|b| b.floats) else {
            return 0.0;
        };
        let own = self.tree.float_lists[ctx.left.0]
            .max_y_for_owner(id)
            .max(self.tree.float_lists[ctx.right.0].max_y_for_owner(id));
        self.node(id)
            .laid_out
            .iter()
            .filter(|&&child| {
                self.node(child)
                    .block()
                    .and_then(|b| b.floats)
                    .is_some_and(|c| c.left == ctx.left && !self.node(child).establishes_bfc())
            })
            .map(|&child| self.get_float_height(child))
            .fold(own, f32::max)
    }
}
