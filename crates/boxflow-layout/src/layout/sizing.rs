//! Width, height and edge resolution.
//!
//! [§ 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//!
//! Sizes are loaded from style once per box before layout, top-down, so every
//! containing block is sized before its descendants. When layout later
//! changes a containing block's width (shrink-to-fit), its descendants are
//! reloaded in update mode: edges and margins are recomputed, content sizes
//! are kept except for auto widths in normal block flow.

use crate::error::{LayoutError, LayoutResult};
use crate::style::{LengthDecoder, StyleLookup};

use super::box_model::{EdgeSizes, Size, SizeLimits};
use super::layout_box::BoxKind;
use super::text::FontSpec;
use super::values::AutoOr;
use super::{BoxId, Engine, LayoutContext};

/// Which declared value a resolution pass works from.
///
/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// "1. The tentative used width is calculated (without 'min-width' and
/// 'max-width') following the rules under 'Calculating widths and margins'
/// above.
/// 2. If the tentative used width is greater than 'max-width', the rules
/// above are applied again using the computed value of 'max-width' as the
/// computed value for 'width'.
/// 3. If the resulting width is smaller than 'min-width', the rules above are
/// applied again using the value of 'min-width' as the computed value for
/// 'width'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// `width`/`height` itself. Only this pass decides the "set" flag.
    Exact,
    /// Re-run with `max-width`/`max-height`.
    Max,
    /// Re-run with `min-width`/`min-height`.
    Min,
}

/// Inputs of [`resolve_width`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthInput {
    /// The width being resolved (`width`, `max-width` or `min-width`).
    pub width: AutoOr,
    /// `margin-left`
    pub margin_left: AutoOr,
    /// `margin-right`
    pub margin_right: AutoOr,
    /// Left + right border and padding.
    pub border_padding: f32,
    /// Containing block content width.
    pub containing_width: f32,
    /// The box is an in-flow block box.
    pub normal_flow: bool,
    /// Reloading after the containing block changed.
    pub update: bool,
    /// Content width before this pass.
    pub previous_width: f32,
}

/// Output of [`resolve_width`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWidth {
    /// Used content width.
    pub content_width: f32,
    /// Used left margin.
    pub margin_left: f32,
    /// Used right margin.
    pub margin_right: f32,
    /// Preferred outer width; `None` when the box has no preference.
    pub preferred_width: Option<f32>,
    /// Whether the width counts as explicitly set. Only decided by
    /// [`ResolveMode::Exact`].
    pub width_set: Option<bool>,
}

/// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
///
/// Block boxes in normal flow follow § 10.3.3: "'margin-left' +
/// 'border-left-width' + 'padding-left' + 'width' + 'padding-right' +
/// 'border-right-width' + 'margin-right' = width of containing block".
/// Other boxes keep their declared margins with `auto` as zero and are
/// shrunk to fit after layout.
#[must_use]
pub fn resolve_width(input: &WidthInput, mode: ResolveMode) -> ResolvedWidth {
    let exact = mode == ResolveMode::Exact;
    let declared_left = input.margin_left.to_px_or(0.0);
    let declared_right = input.margin_right.to_px_or(0.0);

    let AutoOr::Length(width) = input.width else {
        // "If 'width' is set to 'auto', any other 'auto' values become '0'
        // and 'width' follows from the resulting equality."
        //
        // The first load always takes the full width, even out of flow; the
        // box shrinks after layout. Updates only adjust boxes in normal flow.
        let content_width = if !input.update || input.normal_flow {
            (input.containing_width - declared_left - declared_right - input.border_padding)
                .max(0.0)
        } else {
            input.previous_width
        };
        let preferred_width = (!input.normal_flow)
            .then_some(declared_left + input.border_padding + declared_right);
        return ResolvedWidth {
            content_width,
            margin_left: declared_left,
            margin_right: declared_right,
            preferred_width,
            width_set: exact.then_some(false),
        };
    };

    let mut resolved = ResolvedWidth {
        content_width: width,
        margin_left: declared_left,
        margin_right: declared_right,
        preferred_width: Some(declared_left + input.border_padding + width + declared_right),
        width_set: exact.then_some(true),
    };
    if !input.normal_flow {
        return resolved;
    }

    let rest = input.containing_width - width - input.border_padding;
    match (input.margin_left, input.margin_right) {
        // "If both 'margin-left' and 'margin-right' are 'auto', their used
        // values are equal. This horizontally centers the element with
        // respect to the edges of the containing block."
        (AutoOr::Auto, AutoOr::Auto) => {
            let rest = rest.max(0.0);
            resolved.margin_left = ((rest + 1.0) / 2.0).floor();
            resolved.margin_right = (rest / 2.0).floor();
            resolved.preferred_width = Some(input.border_padding + width);
        }
        // "If there is exactly one value specified as 'auto', its used value
        // follows from the equality."
        (AutoOr::Auto, AutoOr::Length(right)) => {
            resolved.margin_left = (rest - right).max(0.0);
            resolved.preferred_width = Some(input.border_padding + width + right);
        }
        (AutoOr::Length(left), AutoOr::Auto) => {
            resolved.margin_right = (rest - left).max(0.0);
            resolved.preferred_width = Some(left + input.border_padding + width);
        }
        // "If all of the above have a computed value other than 'auto', the
        // values are said to be 'over-constrained' and one of the used values
        // will have to be different from its computed value. If the
        // 'direction' property of the containing block has the value 'ltr',
        // the specified value of 'margin-right' is ignored."
        (AutoOr::Length(left), AutoOr::Length(_)) => {
            resolved.margin_right = (rest - left).max(0.0);
        }
    }
    resolved
}

/// Inputs of [`resolve_height`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightInput<'a> {
    /// The height being resolved, as declared.
    pub height: &'a str,
    /// `margin-top`, as declared.
    pub margin_top: &'a str,
    /// `margin-bottom`, as declared.
    pub margin_bottom: &'a str,
    /// Containing block content width (vertical margins refer to it).
    pub containing_width: f32,
    /// Containing block content height.
    pub containing_height: f32,
    /// The containing block's height does not depend on its content.
    pub containing_fixed: bool,
    /// Reloading after the containing block changed.
    pub update: bool,
    /// Content height before this pass.
    pub previous_height: f32,
}

/// Output of [`resolve_height`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedHeight {
    /// Content height; 0 for `auto` until layout decides.
    pub content_height: f32,
    /// Used top margin.
    pub margin_top: f32,
    /// Used bottom margin.
    pub margin_bottom: f32,
    /// Whether the height counts as explicitly set. Only decided by
    /// [`ResolveMode::Exact`].
    pub height_set: Option<bool>,
}

/// [§ 10.6 Calculating heights and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_heights_and_margins)
///
/// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
///
/// "The percentage is calculated with respect to the height of the generated
/// box's containing block. If the height of the containing block is not
/// specified explicitly (i.e., it depends on content height), and this
/// element is not absolutely positioned, the value computes to 'auto'."
#[must_use]
pub fn resolve_height(
    input: &HeightInput<'_>,
    mode: ResolveMode,
    decoder: &dyn LengthDecoder,
) -> ResolvedHeight {
    let raw = input.height.trim();
    let is_auto = matches!(raw, "" | "auto")
        || (!input.containing_fixed && raw.ends_with('%'));
    let basis = if input.containing_fixed { input.containing_height } else { 0.0 };
    let content_height = if input.update {
        input.previous_height
    } else if is_auto {
        0.0
    } else {
        decoder.resolve_length(raw, 0.0, 0.0, basis)
    };
    // [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    // "The percentage is calculated with respect to the width of the
    // generated box's containing block. Note that this is true for
    // 'margin-top' and 'margin-bottom' as well."
    ResolvedHeight {
        content_height,
        margin_top: decoder.resolve_length(input.margin_top, 0.0, 0.0, input.containing_width),
        margin_bottom: decoder.resolve_length(input.margin_bottom, 0.0, 0.0, input.containing_width),
        height_set: (mode == ResolveMode::Exact).then_some(!is_auto),
    }
}

/// Containing-block facts a box is sized against.
#[derive(Debug, Clone, Copy)]
struct Containing {
    width: f32,
    height: f32,
    fixed_height: bool,
}

impl Engine<'_> {
    /// Load every size of `id` from its style against its containing block.
    ///
    /// With `update`, borders are kept and content sizes are only changed
    /// for auto widths in normal block flow.
    pub(crate) fn load_sizes(&mut self, id: BoxId, update: bool) -> LayoutResult<()> {
        let cb_id = self
            .node(id)
            .containing_block
            .ok_or(LayoutError::MissingContainingBlock(id))?;
        let cb_node = self.node(cb_id);
        let cb = Containing {
            width: cb_node.dimensions.content.width,
            height: cb_node.dimensions.content.height,
            fixed_height: cb_node.has_fixed_height(),
        };
        if !update {
            self.load_font(id);
        }
        match self.node(id).kind {
            BoxKind::Block(_) => self.load_block_sizes(id, cb, update),
            BoxKind::Inline(_) => {
                if !update {
                    self.load_inline_sizes(id, cb);
                }
            }
            BoxKind::Text(_) => {}
            BoxKind::Replaced(_) => self.load_replaced_sizes(id, cb),
        }
        self.node_mut(id).sync_bounds();
        Ok(())
    }

    /// [§ 15.7 Font size](https://www.w3.org/TR/CSS2/fonts.html#font-size-props)
    /// and [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// Text and anonymous boxes take the parent's font and line height.
    pub(crate) fn load_font(&mut self, id: BoxId) {
        let ctx = self.ctx;
        let node = self.node(id);
        let parent = node.parent.map(|p| (self.node(p).font.clone(), self.node(p).line_height));
        let inherits_all = match &node.kind {
            BoxKind::Text(_) => true,
            BoxKind::Block(b) => b.anonymous,
            _ => false,
        };
        let (font, line_height) = match parent {
            Some((font, line_height)) if inherits_all => (font, line_height),
            parent => {
                let style = node.style.as_ref();
                let parent_font = parent.map_or_else(
                    || FontSpec {
                        size: ctx.config.default_font_size,
                        family: ctx.config.default_font_family.clone(),
                    },
                    |(font, _)| font,
                );
                let size = ctx.decoder.resolve_length(
                    style.property("font-size"),
                    parent_font.size,
                    parent_font.size,
                    parent_font.size,
                );
                let family = match style.property("font-family").trim() {
                    "" => parent_font.family,
                    family => family.to_string(),
                };
                let font = FontSpec { size, family };
                let line_height = used_line_height(style, &font, ctx);
                (font, line_height)
            }
        };
        let node = self.node_mut(id);
        node.font = font;
        node.line_height = line_height;
    }

    fn load_block_sizes(&mut self, id: BoxId, cb: Containing, update: bool) {
        let ctx = self.ctx;
        let decoder = ctx.decoder.as_ref();
        let node = self.node(id);
        let style = node.style.clone();
        let normal_flow = node.in_normal_block_flow();
        let previous = node.dimensions;

        let border = if update { previous.border } else { self.border_widths(style.as_ref()) };
        let padding = edge_lengths(style.as_ref(), "padding", decoder, cb.width);

        let limits = SizeLimits::new(
            decoder.resolve_optional(style.property("min-width"), cb.width),
            decoder.resolve_optional(style.property("max-width"), cb.width),
            decoder.resolve_optional(style.property("min-height"), cb.height),
            decoder.resolve_optional(style.property("max-height"), cb.height),
        );

        // Widths: exact, then max-width, then min-width.
        let width_input = |raw: &str, previous_width: f32| WidthInput {
            width: AutoOr::decode(raw, decoder, cb.width),
            margin_left: AutoOr::decode_margin(style.property("margin-left"), decoder, cb.width),
            margin_right: AutoOr::decode_margin(style.property("margin-right"), decoder, cb.width),
            border_padding: border.horizontal() + padding.horizontal(),
            containing_width: cb.width,
            normal_flow,
            update,
            previous_width,
        };
        let mut width = resolve_width(
            &width_input(style.property("width"), previous.content.width),
            ResolveMode::Exact,
        );
        let width_set = width.width_set.unwrap_or(false);
        if limits.max_width.is_some_and(|max| width.content_width > max) {
            width = resolve_width(
                &width_input(style.property("max-width"), width.content_width),
                ResolveMode::Max,
            );
        }
        if limits.min_width.is_some_and(|min| width.content_width < min) {
            width = resolve_width(
                &width_input(style.property("min-width"), width.content_width),
                ResolveMode::Min,
            );
        }

        // Heights: exact, then max-height, then min-height.
        let height_input = |raw: &'static str, previous_height: f32| HeightInput {
            height: style.property(raw),
            margin_top: style.property("margin-top"),
            margin_bottom: style.property("margin-bottom"),
            containing_width: cb.width,
            containing_height: cb.height,
            containing_fixed: cb.fixed_height,
            update,
            previous_height,
        };
        let mut height = resolve_height(
            &height_input("height", previous.content.height),
            ResolveMode::Exact,
            decoder,
        );
        let height_set = height.height_set.unwrap_or(false);
        if limits.max_height.is_some_and(|max| height.content_height > max) {
            height = resolve_height(
                &height_input("max-height", height.content_height),
                ResolveMode::Max,
                decoder,
            );
        }
        if limits.min_height.is_some_and(|min| height.content_height < min) {
            height = resolve_height(
                &height_input("min-height", height.content_height),
                ResolveMode::Min,
                decoder,
            );
        }

        let node = self.node_mut(id);
        let dims = &mut node.dimensions;
        dims.border = border;
        dims.padding = padding;
        dims.content.width = width.content_width;
        dims.content.height = height.content_height;
        dims.margin = EdgeSizes {
            top: height.margin_top,
            right: width.margin_right,
            bottom: height.margin_bottom,
            left: width.margin_left,
        };
        if let Some(block) = node.block_mut() {
            block.limits = limits;
            block.preferred_width = width.preferred_width;
            if !update {
                block.width_set = width_set;
                block.height_set = height_set;
            }
        }
    }

    /// [§ 10.3.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-width)
    ///
    /// "The 'width' property does not apply." Horizontal margins apply,
    /// vertical margins have no effect. The content size follows from the
    /// children during layout.
    fn load_inline_sizes(&mut self, id: BoxId, cb: Containing) {
        let ctx = self.ctx;
        let decoder = ctx.decoder.as_ref();
        let style = self.node(id).style.clone();
        let border = self.border_widths(style.as_ref());
        let padding = edge_lengths(style.as_ref(), "padding", decoder, cb.width);
        let margin = EdgeSizes {
            top: 0.0,
            right: decoder.resolve_length(style.property("margin-right"), 0.0, 0.0, cb.width),
            bottom: 0.0,
            left: decoder.resolve_length(style.property("margin-left"), 0.0, 0.0, cb.width),
        };
        let dims = &mut self.node_mut(id).dimensions;
        dims.border = border;
        dims.padding = padding;
        dims.margin = margin;
        dims.content = Size::default();
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// "If 'height' and 'width' both have computed values of 'auto' and the
    /// element also has an intrinsic width, then that intrinsic width is the
    /// used value of 'width'." Auto margins are zero.
    fn load_replaced_sizes(&mut self, id: BoxId, cb: Containing) {
        let ctx = self.ctx;
        let decoder = ctx.decoder.as_ref();
        let node = self.node(id);
        let style = node.style.clone();
        let BoxKind::Replaced(data) = node.kind else {
            return;
        };
        let border = self.border_widths(style.as_ref());
        let padding = edge_lengths(style.as_ref(), "padding", decoder, cb.width);
        let margin = edge_lengths(style.as_ref(), "margin", decoder, cb.width);
        let width = decoder.resolve_length(
            style.property("width"),
            data.intrinsic_width,
            data.intrinsic_width,
            cb.width,
        );
        let basis = if cb.fixed_height { cb.height } else { 0.0 };
        let height = match style.property("height").trim() {
            raw if raw.ends_with('%') && !cb.fixed_height => data.intrinsic_height,
            raw => decoder.resolve_length(raw, data.intrinsic_height, data.intrinsic_height, basis),
        };
        let dims = &mut self.node_mut(id).dimensions;
        dims.border = border;
        dims.padding = padding;
        dims.margin = margin;
        dims.content.width = width.max(0.0);
        dims.content.height = height.max(0.0);
    }

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    ///
    /// A side only has a width when its `border-*-style` is set and is
    /// neither `none` nor `hidden`. A missing width is `medium`.
    fn border_widths(&self, style: &dyn StyleLookup) -> EdgeSizes {
        let ctx = self.ctx;
        let side = |name: &str| {
            let visible = !matches!(
                style.property(&format!("border-{name}-style")).trim(),
                "" | "none" | "hidden"
            );
            if visible {
                ctx.decoder.resolve_length(
                    style.property(&format!("border-{name}-width")),
                    ctx.config.medium_border_width,
                    0.0,
                    0.0,
                )
            } else {
                0.0
            }
        };
        EdgeSizes {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        }
    }

    /// Reload `id` after its containing block changed size.
    pub(crate) fn update_sizes(&mut self, id: BoxId) -> LayoutResult<()> {
        self.load_sizes(id, true)
    }

    /// Reload the sizes of the block children of `id`, recursing into those
    /// whose content size changed.
    pub(crate) fn update_child_sizes(&mut self, id: BoxId) -> LayoutResult<()> {
        let children = self.node(id).laid_out.clone();
        for child in children {
            if !self.node(child).is_block() {
                continue;
            }
            let before = self.node(child).dimensions.content;
            self.update_sizes(child)?;
            if self.node(child).dimensions.content != before {
                self.update_child_sizes(child)?;
            }
        }
        Ok(())
    }

    /// Set the content width chosen by layout, clamped to the min/max limits.
    pub(crate) fn set_content_width(&mut self, id: BoxId, width: f32) {
        let node = self.node_mut(id);
        let width = node.block().map_or(width, |b| b.limits.clamp_width(width));
        node.dimensions.content.width = width.max(0.0);
        node.sync_bounds();
    }

    /// Set the content height chosen by layout, clamped to the min/max limits.
    pub(crate) fn set_content_height(&mut self, id: BoxId, height: f32) {
        let node = self.node_mut(id);
        let height = node.block().map_or(height, |b| b.limits.clamp_height(height));
        node.dimensions.content.height = height.max(0.0);
        node.sync_bounds();
    }
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// `normal` comes from the font metrics, a bare number multiplies the font
/// size, lengths and percentages are taken as is.
fn used_line_height(style: &dyn StyleLookup, font: &FontSpec, ctx: &LayoutContext) -> f32 {
    let normal = ctx.measure.line_height(font);
    match style.property("line-height").trim() {
        "" | "normal" | "inherit" => normal,
        raw => raw.parse::<f32>().map_or_else(
            |_| ctx.decoder.resolve_length(raw, normal, normal, font.size),
            |factor| factor * font.size,
        ),
    }
}

/// `{prefix}-top`, `-right`, `-bottom` and `-left`, with absent and `auto`
/// values as zero.
fn edge_lengths(
    style: &dyn StyleLookup,
    prefix: &str,
    decoder: &dyn LengthDecoder,
    basis: f32,
) -> EdgeSizes {
    let side = |name: &str| {
        decoder.resolve_length(style.property(&format!("{prefix}-{name}")), 0.0, 0.0, basis)
    };
    EdgeSizes {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::CssLengthDecoder;

    fn width_input(width: AutoOr, left: AutoOr, right: AutoOr) -> WidthInput {
        WidthInput {
            width,
            margin_left: left,
            margin_right: right,
            border_padding: 0.0,
            containing_width: 400.0,
            normal_flow: true,
            update: false,
            previous_width: 0.0,
        }
    }

    #[test]
    fn test_auto_margins_split_evenly() {
        let r = resolve_width(
            &width_input(AutoOr::Length(200.0), AutoOr::Auto, AutoOr::Auto),
            ResolveMode::Exact,
        );
        assert_eq!((r.margin_left, r.margin_right), (100.0, 100.0));
        assert_eq!(r.width_set, Some(true));
    }

    #[test]
    fn test_auto_margins_odd_leftover_favours_left() {
        let r = resolve_width(
            &width_input(AutoOr::Length(199.0), AutoOr::Auto, AutoOr::Auto),
            ResolveMode::Exact,
        );
        assert_eq!((r.margin_left, r.margin_right), (101.0, 100.0));
    }

    #[test]
    fn test_over_constrained_ignores_right_margin() {
        let r = resolve_width(
            &width_input(AutoOr::Length(100.0), AutoOr::Length(10.0), AutoOr::Length(10.0)),
            ResolveMode::Exact,
        );
        assert_eq!((r.margin_left, r.margin_right), (10.0, 290.0));
        assert_eq!(r.preferred_width, Some(120.0));
    }

    #[test]
    fn test_single_auto_margin_never_negative() {
        let r = resolve_width(
            &width_input(AutoOr::Length(500.0), AutoOr::Auto, AutoOr::Length(0.0)),
            ResolveMode::Exact,
        );
        assert_eq!(r.margin_left, 0.0);
    }

    #[test]
    fn test_auto_width_fills_containing_block() {
        let mut input = width_input(AutoOr::Auto, AutoOr::Length(10.0), AutoOr::Length(20.0));
        input.border_padding = 30.0;
        let r = resolve_width(&input, ResolveMode::Exact);
        assert_eq!(r.content_width, 340.0);
        assert_eq!(r.preferred_width, None);
        assert_eq!(r.width_set, Some(false));

        input.normal_flow = false;
        input.update = true;
        input.previous_width = 77.0;
        let r = resolve_width(&input, ResolveMode::Min);
        assert_eq!(r.content_width, 77.0);
        assert_eq!(r.preferred_width, Some(60.0));
        assert_eq!(r.width_set, None);
    }

    #[test]
    fn test_percentage_height_needs_fixed_containing_block() {
        let d = CssLengthDecoder::default();
        let mut input = HeightInput {
            height: "50%",
            margin_top: "10%",
            margin_bottom: "",
            containing_width: 400.0,
            containing_height: 300.0,
            containing_fixed: false,
            update: false,
            previous_height: 0.0,
        };
        let r = resolve_height(&input, ResolveMode::Exact, &d);
        assert_eq!(r.content_height, 0.0);
        assert_eq!(r.height_set, Some(false));
        assert_eq!(r.margin_top, 40.0);

        input.containing_fixed = true;
        let r = resolve_height(&input, ResolveMode::Exact, &d);
        assert_eq!(r.content_height, 150.0);
        assert_eq!(r.height_set, Some(true));
    }
}
