//! Display, overflow and visibility keywords
//!
//! [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
///
/// Only the values that take part in block and inline layout. Table values
/// are not supported and fall back to the initial value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DisplayKind {
    /// "This value causes an element to generate a block box."
    Block,
    /// "This value causes an element to generate one or more inline boxes."
    #[default]
    Inline,
    /// "This value causes an element to generate an inline-level block
    /// container."
    InlineBlock,
    /// "This value causes an element (e.g., LI in HTML) to generate a
    /// principal block box and a marker box." Laid out as a block.
    ListItem,
    /// "This value causes an element to not appear in the formatting
    /// structure."
    None,
}

impl DisplayKind {
    /// True for display values that generate a block-level principal box.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::ListItem)
    }
}

/// [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Overflow {
    /// "This value indicates that content is not clipped."
    #[default]
    Visible,
    /// "This value indicates that the content is clipped."
    Hidden,
    /// "This value indicates that the content is clipped and that if the
    /// user agent uses a scrolling mechanism..."
    Scroll,
    /// "The behavior of the 'auto' value is user agent-dependent."
    Auto,
}

/// [§ 11.2 Visibility](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Visibility {
    /// "The generated box is visible."
    #[default]
    Visible,
    /// "The generated box is invisible (fully transparent, nothing is
    /// drawn), but still affects layout."
    Hidden,
    /// Treated as `hidden` outside tables.
    Collapse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keywords() {
        assert_eq!("inline-block".parse(), Ok(DisplayKind::InlineBlock));
        assert_eq!("list-item".parse(), Ok(DisplayKind::ListItem));
        assert!("table-cell".parse::<DisplayKind>().is_err());
        assert!(DisplayKind::ListItem.is_block_level());
        assert!(!DisplayKind::InlineBlock.is_block_level());
        assert_eq!(DisplayKind::InlineBlock.to_string(), "inline-block");
    }

    #[test]
    fn test_overflow_default_is_visible() {
        assert_eq!(Overflow::default(), Overflow::Visible);
        assert_eq!("hidden".parse(), Ok(Overflow::Hidden));
    }
}
