//! CSS 2.1 visual formatting model for boxflow.
//!
//! # Scope
//!
//! This crate computes the position and size of every box in a tree of
//! styled document elements:
//! - **Box geometry** ([§ 8 Box model](https://www.w3.org/TR/CSS2/box.html))
//!   - Margin, border and padding resolution
//!   - Width and height resolution with min/max constraints
//!   - Intrinsic (minimal and maximal) widths
//!
//! - **Block formatting** ([§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Vertical stacking, clearance, shrink-to-fit
//!
//! - **Inline formatting** ([§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting))
//!   - Line breaking with fragmentation of inline boxes and text runs
//!   - `text-align` (left, right, center)
//!
//! - **Floats** ([§ 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats))
//!
//! - **Positioning** ([§ 9.3](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme))
//!   - static, relative, absolute and fixed
//!
//! # Not Yet Implemented
//!
//! - Margin collapsing
//! - `vertical-align`
//! - `text-align: justify`
//! - Bidirectional text

/// Layout configuration.
pub mod config;
/// Layout errors.
pub mod error;
/// Box tree, geometry and the layout engines per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod layout;
/// Style lookup and length decoding per [CSS 2.1 § 4.3](https://www.w3.org/TR/CSS2/syndata.html#values).
pub mod style;

pub use config::LayoutConfig;
pub use error::{LayoutError, LayoutResult};
pub use layout::{BoxGeometry, BoxId, LayoutContext, LayoutTree, Rect};
