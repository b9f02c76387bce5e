//! CSS Float Layout.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! Every box that establishes a block formatting context owns a pair of
//! [`FloatList`]s, one per side. Entries are stored in the owner's content
//! coordinates: `x` is measured from the owner's content edge on the list's
//! side, `y` from the owner's content top. Descendants in the same formatting
//! context reach the pair through a [`FloatContext`], which also carries the
//! offsets between their content box and the owner's.

use std::fmt;

use boxflow_common::warning::warn_once;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::layout_box::BoxId;

/// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// `float: none` is represented as `Option::<FloatSide>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
///
/// `clear: none` is represented as `Option::<ClearSide>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ClearSide {
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

/// Index of a [`FloatList`] in the tree's float-list arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FloatListId(pub usize);

impl fmt::Display for FloatListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floats#{}", self.0)
    }
}

/// A single float recorded in a [`FloatList`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatEntry {
    /// The floated box.
    pub id: BoxId,
    /// The block whose layout placed the float (its parent).
    pub placed_by: BoxId,
    /// Distance of the float's margin edge from the owner's content edge on
    /// this list's side.
    pub x: f32,
    /// Top margin edge in owner coordinates.
    pub y: f32,
    /// Outer width.
    pub width: f32,
    /// Outer height.
    pub height: f32,
}

impl FloatEntry {
    fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// The floats on one side of a block formatting context.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "The current and subsequent line boxes created next to the float are
/// shortened as necessary to make room for the margin box of the float."
#[derive(Debug, Clone)]
pub struct FloatList {
    owner: BoxId,
    side: FloatSide,
    entries: Vec<FloatEntry>,
}

impl FloatList {
    /// Create an empty list owned by `owner`.
    #[must_use]
    pub const fn new(owner: BoxId, side: FloatSide) -> Self {
        Self {
            owner,
            side,
            entries: Vec::new(),
        }
    }

    /// The formatting-context root this list belongs to.
    #[must_use]
    pub const fn owner(&self) -> BoxId {
        self.owner
    }

    /// Which side the floats of this list are on.
    #[must_use]
    pub const fn side(&self) -> FloatSide {
        self.side
    }

    /// Recorded floats in placement order.
    #[must_use]
    pub fn entries(&self) -> &[FloatEntry] {
        &self.entries
    }

    /// True when no float has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget all floats. Called when the owner is laid out again.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a placed float. Negative sizes are treated as zero, with a
    /// warning.
    pub fn add(&mut self, mut entry: FloatEntry) {
        if entry.width < 0.0 || entry.height < 0.0 {
            warn_once(
                "Layout",
                &format!(
                    "float {} has negative size {}x{}, clamped to zero",
                    entry.id, entry.width, entry.height
                ),
            );
            entry.width = entry.width.max(0.0);
            entry.height = entry.height.max(0.0);
        }
        self.entries.push(entry);
    }

    /// Horizontal space consumed by this side at `y`: the furthest outer edge
    /// among the floats whose vertical span `[y, y + height)` contains `y`.
    #[must_use]
    pub fn width_at(&self, y: f32) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.y <= y && y < e.bottom())
            .map(|e| e.x + e.width)
            .fold(0.0, f32::max)
    }

    /// The smallest float edge (top or bottom) strictly below `y`, if any.
    #[must_use]
    pub fn next_edge(&self, y: f32) -> Option<f32> {
        self.entries
            .iter()
            .flat_map(|e| [e.y, e.bottom()])
            .filter(|&edge| edge > y)
            .reduce(f32::min)
    }

    /// The next y at which the intrusion of this side may change.
    ///
    /// Always strictly greater than `y`: when no edge lies below, `y + 1`.
    #[must_use]
    pub fn next_y(&self, y: f32) -> f32 {
        self.next_edge(y).unwrap_or(y + 1.0)
    }

    /// The lowest float bottom edge, 0 when empty.
    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.entries.iter().map(FloatEntry::bottom).fold(0.0, f32::max)
    }

    /// The lowest bottom edge among the floats placed by `placed_by`.
    #[must_use]
    pub fn max_y_for_owner(&self, placed_by: BoxId) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.placed_by == placed_by)
            .map(FloatEntry::bottom)
            .fold(0.0, f32::max)
    }
}

/// The widest combined intrusion of both sides within `[y1, y2]`.
///
/// The intrusion only changes at float edges, so sampling `y1` and every edge
/// inside `(y1, y2]` covers the interval.
#[must_use]
pub fn max_float_width(left: &FloatList, right: &FloatList, y1: f32, y2: f32) -> f32 {
    let edges = left
        .entries
        .iter()
        .chain(&right.entries)
        .flat_map(|e| [e.y, e.bottom()])
        .filter(|&edge| edge > y1 && edge <= y2);
    std::iter::once(y1)
        .chain(edges)
        .map(|y| left.width_at(y) + right.width_at(y))
        .fold(0.0, f32::max)
}

/// The float lists a box places into, and where its content box sits inside
/// the lists' owner.
///
/// `xl` and `xr` are the distances from the owner's left and right content
/// edges to this box's, `y` is the distance from the owner's content top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatContext {
    /// Left float list.
    pub left: FloatListId,
    /// Right float list.
    pub right: FloatListId,
    /// Left offset.
    pub xl: f32,
    /// Right offset.
    pub xr: f32,
    /// Top offset.
    pub y: f32,
}

impl FloatContext {
    /// A context rooted at the box owning `left` and `right`.
    #[must_use]
    pub const fn root(left: FloatListId, right: FloatListId) -> Self {
        Self {
            left,
            right,
            xl: 0.0,
            xr: 0.0,
            y: 0.0,
        }
    }

    /// The list ids of `side`, followed by the opposite side.
    #[must_use]
    pub const fn lists(&self, side: FloatSide) -> (FloatListId, FloatListId) {
        match side {
            FloatSide::Left => (self.left, self.right),
            FloatSide::Right => (self.right, self.left),
        }
    }

    /// The offsets of `side`, followed by the opposite side.
    #[must_use]
    pub const fn offsets(&self, side: FloatSide) -> (f32, f32) {
        match side {
            FloatSide::Left => (self.xl, self.xr),
            FloatSide::Right => (self.xr, self.xl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: usize, placed_by: usize, x: f32, y: f32, width: f32, height: f32) -> FloatEntry {
        FloatEntry {
            id: BoxId(id),
            placed_by: BoxId(placed_by),
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_width_at_is_half_open() {
        let mut list = FloatList::new(BoxId(0), FloatSide::Left);
        list.add(entry(1, 0, 0.0, 0.0, 100.0, 50.0));
        list.add(entry(2, 0, 100.0, 10.0, 30.0, 10.0));
        assert_eq!(list.width_at(0.0), 100.0);
        assert_eq!(list.width_at(15.0), 130.0);
        assert_eq!(list.width_at(20.0), 100.0);
        assert_eq!(list.width_at(50.0), 0.0);
    }

    #[test]
    fn test_next_y_and_max_y() {
        let mut list = FloatList::new(BoxId(0), FloatSide::Right);
        assert_eq!(list.next_y(7.0), 8.0);
        assert_eq!(list.max_y(), 0.0);
        list.add(entry(1, 0, 0.0, 10.0, 20.0, 30.0));
        assert_eq!(list.next_y(0.0), 10.0);
        assert_eq!(list.next_y(10.0), 40.0);
        assert_eq!(list.next_y(40.0), 41.0);
        assert_eq!(list.max_y(), 40.0);
    }

    #[test]
    fn test_negative_sizes_are_clamped() {
        let mut list = FloatList::new(BoxId(0), FloatSide::Left);
        list.add(entry(41, 0, 5.0, 5.0, -10.0, -3.0));
        assert_eq!(list.entries()[0].width, 0.0);
        assert_eq!(list.max_y(), 5.0);
        assert_eq!(list.width_at(5.0), 0.0);
        assert!(boxflow_common::warning::has_warned(
            "Layout",
            "float #41 has negative size -10x-3, clamped to zero"
        ));
    }

    #[test]
    fn test_max_y_for_owner() {
        let mut list = FloatList::new(BoxId(0), FloatSide::Left);
        list.add(entry(1, 0, 0.0, 0.0, 10.0, 30.0));
        list.add(entry(2, 5, 0.0, 0.0, 10.0, 90.0));
        assert_eq!(list.max_y_for_owner(BoxId(0)), 30.0);
        assert_eq!(list.max_y_for_owner(BoxId(5)), 90.0);
        assert_eq!(list.max_y_for_owner(BoxId(9)), 0.0);
    }

    #[test]
    fn test_max_float_width_samples_edges() {
        let mut left = FloatList::new(BoxId(0), FloatSide::Left);
        let mut right = FloatList::new(BoxId(0), FloatSide::Right);
        left.add(entry(1, 0, 0.0, 0.0, 100.0, 50.0));
        right.add(entry(2, 0, 0.0, 30.0, 80.0, 10.0));
        assert_eq!(max_float_width(&left, &right, 0.0, 20.0), 100.0);
        assert_eq!(max_float_width(&left, &right, 0.0, 60.0), 180.0);
        assert_eq!(max_float_width(&left, &right, 45.0, 60.0), 100.0);
    }

    #[test]
    fn test_intrusion_scenario() {
        // left float 100px wide, right float 50px wide, both 0..40
        let mut left = FloatList::new(BoxId(0), FloatSide::Left);
        let mut right = FloatList::new(BoxId(0), FloatSide::Right);
        left.add(entry(1, 0, 0.0, 0.0, 100.0, 40.0));
        right.add(entry(2, 0, 0.0, 0.0, 50.0, 40.0));
        let available = 400.0 - left.width_at(20.0) - right.width_at(20.0);
        assert_eq!(available, 250.0);
    }

    #[test]
    fn test_context_sides() {
        let ctx = FloatContext {
            left: FloatListId(0),
            right: FloatListId(1),
            xl: 3.0,
            xr: 4.0,
            y: 0.0,
        };
        assert_eq!(ctx.lists(FloatSide::Right), (FloatListId(1), FloatListId(0)));
        assert_eq!(ctx.offsets(FloatSide::Right), (4.0, 3.0));
        assert_eq!("left".parse(), Ok(FloatSide::Left));
        assert_eq!("both".parse(), Ok(ClearSide::Both));
        assert!("none".parse::<FloatSide>().is_err());
    }
}
