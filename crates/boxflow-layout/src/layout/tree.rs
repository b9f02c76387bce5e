//! Box tree storage, construction and the layout entry point.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Boxes live in an arena indexed by [`BoxId`]. The tree owns every box it
//! ever created, including fragments produced by line breaking, so ids stay
//! valid for the lifetime of the tree.

use std::rc::Rc;
use std::str::FromStr;

use boxflow_common::warning::warn_once;
use serde::Serialize;

use crate::error::{LayoutError, LayoutResult};
use crate::style::{
    keyword, DisplayKind, InheritedStyle, Overflow, SharedStyle, StyleDeclaration, StyleLookup,
    Visibility,
};

use super::box_model::{Rect, Size};
use super::float::{ClearSide, FloatList, FloatListId, FloatSide};
use super::inline::TextAlign;
use super::layout_box::{BlockData, BoxId, BoxKind, InlineData, LayoutBox, ReplacedData, TextData};
use super::positioned::PositionScheme;
use super::text::collapse_whitespace;
use super::{Engine, LayoutContext};

/// A tree of boxes rooted at the viewport.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    pub(crate) boxes: Vec<LayoutBox>,
    pub(crate) float_lists: Vec<FloatList>,
    root: BoxId,
    viewport: Size,
    normalized: bool,
}

/// Laid-out geometry of one box and its descendants, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGeometry {
    /// The box.
    pub id: BoxId,
    /// Short description of the box.
    pub label: String,
    /// Margin box.
    pub bounds: Rect,
    /// Content box.
    pub content: Rect,
    /// The placed part of a text run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Children in layout order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BoxGeometry>,
}

impl LayoutTree {
    /// [§ 9.1.1 The viewport](https://www.w3.org/TR/CSS2/visuren.html#viewport)
    ///
    /// Create a tree whose root block is a `width` × `height` viewport.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        let block = BlockData {
            width_set: true,
            height_set: true,
            ..BlockData::default()
        };
        let mut root = LayoutBox::new(BoxKind::Block(block), StyleDeclaration::new().shared(), None);
        root.dimensions.content = Size::new(width.max(0.0), height.max(0.0));
        root.sync_bounds();
        Self {
            boxes: vec![root],
            float_lists: Vec::new(),
            root: BoxId(0),
            viewport: Size::new(width.max(0.0), height.max(0.0)),
            normalized: false,
        }
    }

    /// The viewport box.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        self.root
    }

    /// The viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Look up a box.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    /// Look up a float list.
    #[must_use]
    pub fn float_list(&self, id: FloatListId) -> Option<&FloatList> {
        self.float_lists.get(id.0)
    }

    /// Number of boxes, fragments included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True if the tree only holds the viewport.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.len() <= 1
    }

    /// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
    ///
    /// Append the box generated by an element with `style` to `parent`.
    ///
    /// [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// "Otherwise, if 'position' has the value 'absolute' or 'fixed', the box
    /// is absolutely positioned, the computed value of 'float' is 'none', and
    /// display is set according to the table below."
    ///
    /// "Otherwise, if 'float' has a value other than 'none', the box is
    /// floated and 'display' is set according to the table below."
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] or [`LayoutError::InvalidParent`] when
    /// `parent` cannot take children.
    pub fn append_element(&mut self, parent: BoxId, style: SharedStyle) -> LayoutResult<BoxId> {
        self.check_parent(parent)?;
        let display: DisplayKind = keyword(style.as_ref(), "display");
        let mut block = block_data_from_style(style.as_ref());
        if block.position.is_out_of_flow() {
            block.float = None;
        }
        let blockified = block.float.is_some() || block.position.is_out_of_flow();
        let kind = match display {
            _ if blockified => BoxKind::Block(block),
            DisplayKind::InlineBlock => BoxKind::Block(BlockData {
                inline_block: true,
                ..block
            }),
            DisplayKind::Block | DisplayKind::ListItem | DisplayKind::None => BoxKind::Block(block),
            DisplayKind::Inline => BoxKind::Inline(InlineData::default()),
        };
        let visible = keyword::<Visibility>(style.as_ref(), "visibility") == Visibility::Visible;
        let mut node = LayoutBox::new(kind, style, Some(parent));
        node.displayed = display != DisplayKind::None;
        node.visible = visible;
        Ok(self.push_child(parent, node))
    }

    /// Append a text run to `parent`. Whitespace is collapsed and the run
    /// inherits its parent's style.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] or [`LayoutError::InvalidParent`] when
    /// `parent` cannot take children.
    pub fn append_text(&mut self, parent: BoxId, text: &str) -> LayoutResult<BoxId> {
        self.check_parent(parent)?;
        let text = collapse_whitespace(text);
        let style: SharedStyle = Rc::new(InheritedStyle::new(self.boxes[parent.0].style.clone()));
        let shown = text.len();
        let mut node = LayoutBox::new(BoxKind::Text(TextData { text, shown }), style, Some(parent));
        node.visible = self.boxes[parent.0].visible;
        Ok(self.push_child(parent, node))
    }

    /// Append a replaced element with an intrinsic size to `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] or [`LayoutError::InvalidParent`] when
    /// `parent` cannot take children.
    pub fn append_replaced(
        &mut self,
        parent: BoxId,
        style: SharedStyle,
        intrinsic_width: f32,
        intrinsic_height: f32,
    ) -> LayoutResult<BoxId> {
        self.check_parent(parent)?;
        let display: DisplayKind = keyword(style.as_ref(), "display");
        let visible = keyword::<Visibility>(style.as_ref(), "visibility") == Visibility::Visible;
        let data = ReplacedData {
            intrinsic_width: intrinsic_width.max(0.0),
            intrinsic_height: intrinsic_height.max(0.0),
        };
        let mut node = LayoutBox::new(BoxKind::Replaced(data), style, Some(parent));
        node.displayed = display != DisplayKind::None;
        node.visible = visible;
        Ok(self.push_child(parent, node))
    }

    fn check_parent(&self, parent: BoxId) -> LayoutResult<()> {
        match self.get(parent).map(|p| &p.kind) {
            None => Err(LayoutError::UnknownBox(parent)),
            Some(BoxKind::Block(_) | BoxKind::Inline(_)) => Ok(()),
            Some(_) => Err(LayoutError::InvalidParent(parent)),
        }
    }

    fn push_child(&mut self, parent: BoxId, node: LayoutBox) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(node);
        let parent = &mut self.boxes[parent.0];
        parent.children.push(id);
        parent.home_range = 0..parent.children.len();
        self.normalized = false;
        id
    }

    /// Lay out the whole tree against the viewport.
    ///
    /// Bounds of every laid-out box are absolute afterwards. Calling this
    /// again lays the tree out from scratch.
    ///
    /// # Errors
    ///
    /// Fails when the tree is malformed or an internal search cannot make
    /// progress. See [`LayoutError`].
    pub fn layout(&mut self, ctx: &LayoutContext) -> LayoutResult<()> {
        // STEP 1: Anonymous boxes.
        if !self.normalized {
            self.normalize();
            self.normalized = true;
        }

        // STEP 2: Containing blocks.
        self.assign_containing_blocks();

        let root = self.root;
        let viewport = self.viewport;
        let mut engine = Engine::new(self, ctx);

        // STEP 3: Sizes, top-down so every containing block is sized first.
        engine.load_font(root);
        let node = engine.node_mut(root);
        node.dimensions.content = viewport;
        node.bounds = Rect::default();
        node.sync_bounds();
        for id in engine.tree.preorder(root).into_iter().skip(1) {
            engine.load_sizes(id, false)?;
        }

        // STEP 4: Lay out the root, forced.
        let outcome = engine.layout_box(root, viewport.width, true)?;
        if !outcome.fit {
            return Err(LayoutError::RootNotPlaced(root));
        }

        // STEP 5: Absolute coordinates.
        engine.absolute_positions(root, (0.0, 0.0))
    }

    /// The narrowest outer width `id` can take without overflowing.
    ///
    /// Meaningful once sizes are loaded, i.e. after [`Self::layout`].
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the tree.
    pub fn minimal_width(&mut self, ctx: &LayoutContext, id: BoxId) -> LayoutResult<f32> {
        let _ = self.get(id).ok_or(LayoutError::UnknownBox(id))?;
        Ok(Engine::new(self, ctx).minimal_width(id))
    }

    /// The outer width `id` takes when no line is broken.
    ///
    /// Meaningful once sizes are loaded, i.e. after [`Self::layout`].
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the tree.
    pub fn maximal_width(&mut self, ctx: &LayoutContext, id: BoxId) -> LayoutResult<f32> {
        let _ = self.get(id).ok_or(LayoutError::UnknownBox(id))?;
        Ok(Engine::new(self, ctx).maximal_width(id))
    }

    /// Geometry snapshot of the laid-out tree.
    #[must_use]
    pub fn geometry(&self) -> BoxGeometry {
        self.geometry_of(self.root)
    }

    fn geometry_of(&self, id: BoxId) -> BoxGeometry {
        let node = &self.boxes[id.0];
        let text = match &node.kind {
            BoxKind::Text(t) => Some(t.shown_text().trim_end().to_string()),
            _ => None,
        };
        BoxGeometry {
            id,
            label: node.label(),
            bounds: node.bounds,
            content: node.content_box(),
            text,
            children: node
                .laid_out
                .iter()
                .filter(|&&child| self.boxes[child.0].displayed)
                .map(|&child| self.geometry_of(child))
                .collect(),
        }
    }

    /// `id` and its owned descendants, parents first.
    fn preorder(&self, id: BoxId) -> Vec<BoxId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.boxes[next.0].home_children().iter().rev());
        }
        order
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "When an inline box contains an in-flow block-level box, the inline
    /// box (and its inline ancestors within the same line box) are broken
    /// around the block-level box." Such inline boxes are laid out as blocks
    /// here instead of being split.
    ///
    /// "If a block container box has a block-level box inside it, then we
    /// force it to have only block-level boxes inside it." Runs of
    /// inline-level children next to block-level siblings are wrapped in
    /// anonymous blocks.
    fn normalize(&mut self) {
        // STEP 1: Promote inline boxes holding blocks, deepest first.
        for id in self.preorder(self.root).into_iter().rev() {
            let node = &self.boxes[id.0];
            let holds_block = matches!(node.kind, BoxKind::Inline(_))
                && node.home_children().iter().any(|&child| {
                    let child = &self.boxes[child.0];
                    child.is_block() && !child.is_inline_level()
                });
            if holds_block {
                let block = block_data_from_style(node.style.as_ref());
                self.boxes[id.0].kind = BoxKind::Block(block);
            }
        }

        // STEP 2: Wrap inline runs next to in-flow blocks.
        for id in self.preorder(self.root) {
            if self.boxes[id.0].is_block() {
                self.wrap_inline_runs(id);
            }
        }
    }

    fn wrap_inline_runs(&mut self, id: BoxId) {
        let children = self.boxes[id.0].home_children().to_vec();
        let has_block = children.iter().any(|&c| self.boxes[c.0].in_normal_block_flow());
        let has_inline = children.iter().any(|&c| self.boxes[c.0].is_inline_level());
        if !(has_block && has_inline) {
            return;
        }

        let mut new_children = Vec::with_capacity(children.len());
        let mut run: Vec<BoxId> = Vec::new();
        for child in children {
            if self.boxes[child.0].is_inline_level() {
                run.push(child);
            } else {
                self.flush_run(id, &mut run, &mut new_children);
                new_children.push(child);
            }
        }
        self.flush_run(id, &mut run, &mut new_children);

        let node = &mut self.boxes[id.0];
        node.home_range = 0..new_children.len();
        node.children = new_children;
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "White space content that would subsequently be collapsed away
    /// according to the 'white-space' property does not generate any
    /// anonymous inline boxes."
    fn flush_run(&mut self, parent: BoxId, run: &mut Vec<BoxId>, out: &mut Vec<BoxId>) {
        if run.is_empty() {
            return;
        }
        let whitespace_only = run.iter().all(|&c| {
            matches!(&self.boxes[c.0].kind, BoxKind::Text(t) if t.text.trim().is_empty())
        });
        if whitespace_only {
            for &c in run.iter() {
                self.boxes[c.0].displayed = false;
            }
            out.append(run);
            return;
        }

        let style: SharedStyle = Rc::new(InheritedStyle::new(self.boxes[parent.0].style.clone()));
        let block = BlockData {
            anonymous: true,
            ..block_data_from_style(style.as_ref())
        };
        let anon = BoxId(self.boxes.len());
        let mut node = LayoutBox::new(BoxKind::Block(block), style, Some(parent));
        node.visible = self.boxes[parent.0].visible;
        node.home_range = 0..run.len();
        for &c in run.iter() {
            self.boxes[c.0].parent = Some(anon);
        }
        node.children = std::mem::take(run);
        self.boxes.push(node);
        out.push(anon);
    }

    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "For other elements, if the element's position is 'relative' or
    /// 'static', the containing block is formed by the content edge of the
    /// nearest ancestor box that is a block container."
    ///
    /// "If the element has 'position: fixed', the containing block is
    /// established by the viewport."
    ///
    /// "If the element has 'position: absolute', the containing block is
    /// established by the nearest ancestor with a 'position' of 'absolute',
    /// 'relative' or 'fixed'." Without one, the viewport.
    fn assign_containing_blocks(&mut self) {
        for id in self.preorder(self.root).into_iter().skip(1) {
            let position = self.boxes[id.0].block().map(|b| b.position).unwrap_or_default();
            let cb = match position {
                PositionScheme::Fixed => self.root,
                PositionScheme::Absolute => self
                    .find_ancestor(id, |b| b.block().is_some_and(|d| d.position.is_positioned()))
                    .unwrap_or(self.root),
                PositionScheme::Static | PositionScheme::Relative => {
                    self.find_ancestor(id, LayoutBox::is_block).unwrap_or(self.root)
                }
            };
            self.boxes[id.0].containing_block = Some(cb);
        }
    }

    fn find_ancestor(&self, id: BoxId, pred: impl Fn(&LayoutBox) -> bool) -> Option<BoxId> {
        let mut current = self.boxes[id.0].parent;
        while let Some(ancestor) = current {
            let node = &self.boxes[ancestor.0];
            if pred(node) {
                return Some(ancestor);
            }
            current = node.parent;
        }
        None
    }
}

/// Block container properties read from style.
fn block_data_from_style(style: &dyn StyleLookup) -> BlockData {
    BlockData {
        float: optional_keyword::<FloatSide>(style, "float"),
        clear: optional_keyword::<ClearSide>(style, "clear"),
        position: keyword::<PositionScheme>(style, "position"),
        overflow: keyword::<Overflow>(style, "overflow"),
        text_align: keyword::<TextAlign>(style, "text-align"),
        ..BlockData::default()
    }
}

/// A keyword whose `none` value is represented as `None`.
fn optional_keyword<T: FromStr>(style: &dyn StyleLookup, name: &str) -> Option<T> {
    match style.property(name).trim() {
        "" | "none" => None,
        raw => raw.parse().map_or_else(
            |_| {
                warn_once("Style", &format!("unsupported value '{raw}' for '{name}'"));
                None
            },
            Some,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(decl: &str) -> SharedStyle {
        decl.parse::<StyleDeclaration>().unwrap_or_default().shared()
    }

    #[test]
    fn test_blockification() {
        let mut tree = LayoutTree::new(400.0, 300.0);
        let root = tree.root();
        let float = tree.append_element(root, style("display: inline; float: left")).unwrap();
        let abs = tree
            .append_element(root, style("display: inline-block; position: absolute; float: right"))
            .unwrap();
        let inline = tree.append_element(root, style("display: inline")).unwrap();

        let float = tree.get(float).unwrap();
        assert!(float.is_block() && float.is_floating() && !float.is_inline_level());
        let abs = tree.get(abs).unwrap();
        assert!(abs.is_out_of_flow_positioned() && !abs.is_floating());
        assert!(!abs.is_inline_level());
        assert!(matches!(tree.get(inline).unwrap().kind, BoxKind::Inline(_)));
    }

    #[test]
    fn test_text_cannot_have_children() {
        let mut tree = LayoutTree::new(100.0, 100.0);
        let text = tree.append_text(tree.root(), "hello").unwrap();
        assert_eq!(tree.append_text(text, "x"), Err(LayoutError::InvalidParent(text)));
        assert_eq!(
            tree.append_text(BoxId(99), "x"),
            Err(LayoutError::UnknownBox(BoxId(99)))
        );
    }

    #[test]
    fn test_anonymous_blocks_wrap_inline_runs() {
        let mut tree = LayoutTree::new(400.0, 300.0);
        let div = tree.append_element(tree.root(), style("display: block")).unwrap();
        let _ = tree.append_text(div, "Some text").unwrap();
        let _ = tree.append_element(div, style("display: block")).unwrap();
        let _ = tree.append_text(div, "  \n ").unwrap();
        tree.normalize();

        let children = tree.get(div).unwrap().home_children().to_vec();
        assert_eq!(children.len(), 3);
        let anon = tree.get(children[0]).unwrap();
        assert!(anon.block().is_some_and(|b| b.anonymous));
        assert_eq!(anon.home_children().len(), 1);
        assert_eq!(tree.get(anon.home_children()[0]).unwrap().parent, Some(children[0]));
        assert!(!tree.get(children[2]).unwrap().displayed);
    }

    #[test]
    fn test_inline_holding_block_is_promoted() {
        let mut tree = LayoutTree::new(400.0, 300.0);
        let span = tree.append_element(tree.root(), style("display: inline")).unwrap();
        let _ = tree.append_element(span, style("display: block")).unwrap();
        tree.normalize();
        assert!(tree.get(span).unwrap().is_block());
    }

    #[test]
    fn test_containing_blocks() {
        let mut tree = LayoutTree::new(400.0, 300.0);
        let root = tree.root();
        let rel = tree.append_element(root, style("display: block; position: relative")).unwrap();
        let span = tree.append_element(rel, style("display: inline")).unwrap();
        let text = tree.append_text(span, "x").unwrap();
        let abs = tree.append_element(span, style("position: absolute")).unwrap();
        let fixed = tree.append_element(rel, style("position: fixed")).unwrap();
        tree.assign_containing_blocks();

        assert_eq!(tree.get(rel).unwrap().containing_block, Some(root));
        assert_eq!(tree.get(text).unwrap().containing_block, Some(rel));
        assert_eq!(tree.get(abs).unwrap().containing_block, Some(rel));
        assert_eq!(tree.get(fixed).unwrap().containing_block, Some(root));
    }

    #[test]
    fn test_missing_containing_block_is_an_error() {
        let mut tree = LayoutTree::new(400.0, 300.0);
        let div = tree.append_element(tree.root(), style("display: block")).unwrap();
        let ctx = LayoutContext::default();
        let mut engine = Engine::new(&mut tree, &ctx);
        assert_eq!(
            engine.load_sizes(div, false),
            Err(LayoutError::MissingContainingBlock(div))
        );
    }

    #[test]
    fn test_geometry_serializes() {
        let mut tree = LayoutTree::new(200.0, 100.0);
        let div = tree.append_element(tree.root(), style("display: block; height: 10px")).unwrap();
        let _ = tree.append_text(div, "hi").unwrap();
        tree.layout(&LayoutContext::default()).unwrap();

        let geometry = tree.geometry();
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["children"][0]["bounds"]["width"], 200.0);
        assert_eq!(json["children"][0]["children"][0]["text"], "hi");
    }
}
