//! CSS Box Model types.
//!
//! [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)

use serde::Serialize;

/// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
///
/// "Each box has a content area (e.g., text, an image, etc.) and optional
/// surrounding padding, border, and margin areas."
///
/// Unlike [`Rect`], this carries no position. The position lives in the
/// box's bounds, whose size is always the outer size computed here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxDimensions {
    /// Content area size
    pub content: Size,
    /// Padding widths
    pub padding: EdgeSizes,
    /// Border widths
    pub border: EdgeSizes,
    /// Margin widths
    pub margin: EdgeSizes,
}

impl BoxDimensions {
    // [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
    //
    // ┌─────────────────────────────────────────┐
    // │              margin-top                 │
    // │   ┌─────────────────────────────────┐   │
    // │   │          border-top             │   │
    // │   │   ┌─────────────────────────┐   │   │
    // │   │   │      padding-top        │   │   │
    // │   │   │   ┌─────────────────┐   │   │   │
    // │ m │ b │ p │     CONTENT     │ p │ b │ m │
    // │   │   │   └─────────────────┘   │   │   │
    // │   │   │      padding-bottom     │   │   │
    // │   │   └─────────────────────────┘   │   │
    // │   │          border-bottom          │   │
    // │   └─────────────────────────────────┘   │
    // │              margin-bottom              │
    // └─────────────────────────────────────────┘

    /// Left margin + border + padding: offset of the content edge from the
    /// margin edge.
    #[must_use]
    pub fn leading_width(&self) -> f32 {
        self.margin.left + self.border.left + self.padding.left
    }

    /// Right padding + border + margin.
    #[must_use]
    pub fn trailing_width(&self) -> f32 {
        self.padding.right + self.border.right + self.margin.right
    }

    /// Top margin + border + padding.
    #[must_use]
    pub fn leading_height(&self) -> f32 {
        self.margin.top + self.border.top + self.padding.top
    }

    /// Bottom padding + border + margin.
    #[must_use]
    pub fn trailing_height(&self) -> f32 {
        self.padding.bottom + self.border.bottom + self.margin.bottom
    }

    /// All horizontal edges (margin, border and padding on both sides).
    #[must_use]
    pub fn horizontal_edges(&self) -> f32 {
        self.leading_width() + self.trailing_width()
    }

    /// "The margin box width is the sum of the content width and all
    /// horizontal edges."
    ///
    /// ```text
    /// width = margin.left + border.left + padding.left
    ///       + content.width
    ///       + padding.right + border.right + margin.right
    /// ```
    #[must_use]
    pub fn outer_width(&self) -> f32 {
        self.leading_width() + self.content.width + self.trailing_width()
    }

    /// Vertical counterpart of [`outer_width`](Self::outer_width).
    #[must_use]
    pub fn outer_height(&self) -> f32 {
        self.leading_height() + self.content.height + self.trailing_height()
    }

    /// The content rectangle for a box whose margin edge starts at `bounds`.
    #[must_use]
    pub fn content_box(&self, bounds: Rect) -> Rect {
        Rect {
            x: bounds.x + self.leading_width(),
            y: bounds.y + self.leading_height(),
            width: self.content.width,
            height: self.content.height,
        }
    }

    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self, bounds: Rect) -> Rect {
        self.content_box(bounds).expanded_by(&self.padding)
    }

    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self, bounds: Rect) -> Rect {
        self.padding_box(bounds).expanded_by(&self.border)
    }
}

/// A rectangle positioned in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Grow the rectangle outward by the given edges.
    #[must_use]
    pub fn expanded_by(self, edges: &EdgeSizes) -> Self {
        Self {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.left + edges.right,
            height: self.height + edges.top + edges.bottom,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// Left + right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top + bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
/// and [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
///
/// `None` means the constraint is not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SizeLimits {
    /// `min-width`
    pub min_width: Option<f32>,
    /// `max-width`
    pub max_width: Option<f32>,
    /// `min-height`
    pub min_height: Option<f32>,
    /// `max-height`
    pub max_height: Option<f32>,
}

impl SizeLimits {
    /// Build limits, raising each maximum to its minimum when it is smaller.
    ///
    /// [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    /// "If the computed value of 'min-width' is greater than the value of
    /// 'max-width', 'max-width' is set to the value of 'min-width'."
    #[must_use]
    pub fn new(
        min_width: Option<f32>,
        max_width: Option<f32>,
        min_height: Option<f32>,
        max_height: Option<f32>,
    ) -> Self {
        let raise = |max: Option<f32>, min: Option<f32>| match (max, min) {
            (Some(max), Some(min)) if max < min => Some(min),
            (max, _) => max,
        };
        Self {
            min_width,
            max_width: raise(max_width, min_width),
            min_height,
            max_height: raise(max_height, min_height),
        }
    }

    /// Clamp a width to `[min-width, max-width]`. The minimum wins.
    #[must_use]
    pub fn clamp_width(&self, width: f32) -> f32 {
        clamp(width, self.min_width, self.max_width)
    }

    /// Clamp a height to `[min-height, max-height]`. The minimum wins.
    #[must_use]
    pub fn clamp_height(&self, height: f32) -> f32 {
        clamp(height, self.min_height, self.max_height)
    }
}

fn clamp(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let value = max.map_or(value, |max| value.min(max));
    min.map_or(value, |min| value.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BoxDimensions {
        BoxDimensions {
            content: Size::new(100.0, 50.0),
            padding: EdgeSizes { top: 1.0, right: 2.0, bottom: 3.0, left: 4.0 },
            border: EdgeSizes { top: 5.0, right: 5.0, bottom: 5.0, left: 5.0 },
            margin: EdgeSizes { top: 10.0, right: 20.0, bottom: 30.0, left: 40.0 },
        }
    }

    #[test]
    fn test_outer_size_is_sum_of_edges() {
        let dims = sample();
        assert_eq!(dims.outer_width(), 40.0 + 5.0 + 4.0 + 100.0 + 2.0 + 5.0 + 20.0);
        assert_eq!(dims.outer_height(), 10.0 + 5.0 + 1.0 + 50.0 + 3.0 + 5.0 + 30.0);
    }

    #[test]
    fn test_nested_boxes() {
        let dims = sample();
        let bounds = Rect { x: 0.0, y: 0.0, width: dims.outer_width(), height: dims.outer_height() };
        let content = dims.content_box(bounds);
        assert_eq!((content.x, content.y), (49.0, 16.0));
        let border = dims.border_box(bounds);
        assert_eq!((border.x, border.y), (40.0, 10.0));
        assert_eq!(border.width, 5.0 + 4.0 + 100.0 + 2.0 + 5.0);
    }

    #[test]
    fn test_max_raised_to_min() {
        let limits = SizeLimits::new(Some(80.0), Some(50.0), None, None);
        assert_eq!(limits.max_width, Some(80.0));
        assert_eq!(limits.clamp_width(10.0), 80.0);
        assert_eq!(limits.clamp_width(200.0), 80.0);
        assert_eq!(limits.clamp_height(7.0), 7.0);
    }
}
