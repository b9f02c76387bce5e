//! JSON box documents.
//!
//! A document describes the viewport and the boxes inside it:
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "children": [
//!     { "type": "element", "style": "display: block; width: 50%", "children": [
//!       { "type": "text", "text": "Hello, world" },
//!       { "type": "replaced", "width": 120, "height": 80 }
//!     ] }
//!   ]
//! }
//! ```

use anyhow::Context;
use boxflow_layout::style::{SharedStyle, StyleDeclaration};
use boxflow_layout::{BoxId, LayoutTree};
use serde::Deserialize;

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// An element style: an inline declaration list or a property map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StyleSource {
    /// `"display: block; width: 50%"`
    Inline(String),
    /// `{ "display": "block", "width": "50%" }`, longhands only
    Map(StyleDeclaration),
}

impl Default for StyleSource {
    fn default() -> Self {
        Self::Inline(String::new())
    }
}

impl StyleSource {
    fn to_style(&self) -> SharedStyle {
        match self {
            Self::Inline(source) => {
                let Ok(decl) = source.parse::<StyleDeclaration>();
                decl.shared()
            }
            Self::Map(decl) => decl.clone().shared(),
        }
    }
}

/// One node of a document.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// A styled element.
    Element {
        /// Declared style.
        #[serde(default)]
        style: StyleSource,
        /// Child nodes in document order.
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A text run.
    Text {
        /// Text content, collapsed on append.
        text: String,
    },
    /// A replaced element such as an image.
    Replaced {
        /// Declared style.
        #[serde(default)]
        style: StyleSource,
        /// Intrinsic width in pixels.
        width: f32,
        /// Intrinsic height in pixels.
        height: f32,
    },
}

/// A parsed document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Size of the initial containing block.
    pub viewport: Viewport,
    /// Children of the viewport box.
    pub children: Vec<Node>,
}

impl Document {
    /// Build a layout tree for the document in a `width` × `height` viewport.
    pub fn build(&self, width: f32, height: f32) -> anyhow::Result<LayoutTree> {
        let mut tree = LayoutTree::new(width, height);
        let root = tree.root();
        for node in &self.children {
            append(&mut tree, root, node)?;
        }
        Ok(tree)
    }
}

fn append(tree: &mut LayoutTree, parent: BoxId, node: &Node) -> anyhow::Result<()> {
    match node {
        Node::Element { style, children } => {
            let id = tree.append_element(parent, style.to_style())?;
            for child in children {
                append(tree, id, child).with_context(|| format!("in element {id}"))?;
            }
        }
        Node::Text { text } => {
            let _ = tree.append_text(parent, text)?;
        }
        Node::Replaced { style, width, height } => {
            let _ = tree.append_replaced(parent, style.to_style(), *width, *height)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "viewport": { "width": 300, "height": 200 },
            "children": [
                { "type": "element", "style": "display: block", "children": [
                    { "type": "text", "text": "hi" },
                    { "type": "replaced", "style": { "width": "15px" }, "width": 10, "height": 20 }
                ] }
            ]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.viewport.width, 300.0);
        let tree = doc.build(doc.viewport.width, doc.viewport.height).unwrap();
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_viewport_defaults() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.viewport.width, 1280.0);
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_replaced_cannot_hold_children() {
        let doc = Document {
            viewport: Viewport::default(),
            children: vec![Node::Replaced {
                style: StyleSource::default(),
                width: 1.0,
                height: 1.0,
            }],
        };
        let mut tree = doc.build(100.0, 100.0).unwrap();
        let image = BoxId(1);
        assert!(append(&mut tree, image, &Node::Text { text: "x".into() }).is_err());
    }
}
