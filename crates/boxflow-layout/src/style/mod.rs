//! Style capabilities consumed by the layout engine.
//!
//! [§ 6 Assigning property values](https://www.w3.org/TR/CSS2/cascade.html#value-stages)
//!
//! Cascading, selector matching and property inheritance happen outside this
//! crate. Layout only needs two capabilities:
//!
//! - [`StyleLookup`]: the cascaded value of property X for this box
//! - [`LengthDecoder`]: how many pixels a length is against some basis
//!
//! [`StyleDeclaration`] is a plain map-backed implementation used by the CLI
//! and the tests. [`InheritedStyle`] gives anonymous boxes the inherited
//! properties of their parent.

pub mod display;
pub mod length;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use boxflow_common::warning::warn_once;
use serde::{Deserialize, Serialize};

pub use display::{DisplayKind, Overflow, Visibility};
pub use length::{CssLengthDecoder, LengthValue, ParseLengthError};

/// Shared handle to a box's style. Fragments and anonymous boxes share it.
pub type SharedStyle = Rc<dyn StyleLookup>;

/// Access to the resolved (cascaded) style of one box.
///
/// [§ 6.1 Specified, computed, and actual values](https://www.w3.org/TR/CSS2/cascade.html#value-stages)
///
/// Returns the empty string when the property has no value. Layout treats
/// `""` and `"auto"` as the same "unset" sentinel unless a property says
/// otherwise.
pub trait StyleLookup: fmt::Debug {
    /// The value of `name`, or `""` when absent.
    fn property(&self, name: &str) -> &str;

    /// True if the property is absent or `auto`.
    fn is_unset(&self, name: &str) -> bool {
        matches!(self.property(name).trim(), "" | "auto")
    }
}

/// Resolves declared lengths to pixels.
///
/// [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
///
/// "Lengths refer to horizontal or vertical measurements."
pub trait LengthDecoder {
    /// Decode `raw` against `basis` (the dimension percentages refer to).
    ///
    /// Returns `None` for values that are not lengths (`""`, `auto`, `none`,
    /// garbage).
    fn decode(&self, raw: &str, basis: f32) -> Option<f32>;

    /// Resolve `raw`, substituting `default` for an absent or unparseable
    /// value and `auto_value` for `auto`.
    fn resolve_length(&self, raw: &str, default: f32, auto_value: f32, basis: f32) -> f32 {
        match raw.trim() {
            "" => default,
            "auto" => auto_value,
            value => self.decode(value, basis).unwrap_or(default),
        }
    }

    /// Resolve an optional length such as `min-width` or `max-width`.
    /// `None` means unconstrained.
    fn resolve_optional(&self, raw: &str, basis: f32) -> Option<f32> {
        match raw.trim() {
            "" | "auto" | "none" => None,
            value => self.decode(value, basis),
        }
    }
}

/// Parse a keyword property, falling back to the default for absent values.
///
/// Unknown keywords are reported once and treated as the default.
pub fn keyword<T>(style: &dyn StyleLookup, name: &str) -> T
where
    T: FromStr + Default,
{
    let raw = style.property(name).trim();
    if raw.is_empty() {
        return T::default();
    }
    raw.parse().unwrap_or_else(|_| {
        warn_once("Style", &format!("unsupported value '{raw}' for '{name}'"));
        T::default()
    })
}

/// A box's declared style as a property map.
///
/// [§ 4.1.8 Declarations and properties](https://www.w3.org/TR/CSS2/syndata.html#declaration)
///
/// "A declaration is either empty or consists of a property name, followed
/// by a colon (:), followed by a property value."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleDeclaration {
    properties: HashMap<String, String>,
}

impl StyleDeclaration {
    /// Create an empty declaration block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter; expands `margin`, `padding`, `border-width`
    /// and `border-style` shorthands.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property, expanding the box-edge shorthands.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        let sides = match name.as_str() {
            "margin" => Some(("margin-", "")),
            "padding" => Some(("padding-", "")),
            "border-width" => Some(("border-", "-width")),
            "border-style" => Some(("border-", "-style")),
            _ => None,
        };
        match sides {
            Some((prefix, suffix)) => {
                // [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
                //
                // "If there is only one component value, it applies to all
                // sides. If there are two values, the top and bottom margins
                // are set to the first value and the right and left margins
                // are set to the second. If there are three values, the top is
                // set to the first value, the left and right are set to the
                // second, and the bottom is set to the third. If there are four
                // values, they apply to the top, right, bottom, and left."
                let parts: Vec<&str> = value.split_whitespace().collect();
                let [top, right, bottom, left] = match parts.as_slice() {
                    [a] => [*a, *a, *a, *a],
                    [a, b] => [*a, *b, *a, *b],
                    [a, b, c] => [*a, *b, *c, *b],
                    [a, b, c, d] => [*a, *b, *c, *d],
                    _ => {
                        warn_once("Style", &format!("invalid shorthand '{name}: {value}'"));
                        return;
                    }
                };
                for (side, v) in [("top", top), ("right", right), ("bottom", bottom), ("left", left)] {
                    let _ = self
                        .properties
                        .insert(format!("{prefix}{side}{suffix}"), v.to_string());
                }
            }
            None => {
                let _ = self.properties.insert(name, value);
            }
        }
    }

    /// Number of longhand properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if no property is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Wrap into a shared style handle.
    #[must_use]
    pub fn shared(self) -> SharedStyle {
        Rc::new(self)
    }
}

impl StyleLookup for StyleDeclaration {
    fn property(&self, name: &str) -> &str {
        self.properties.get(name).map_or("", String::as_str)
    }
}

impl FromStr for StyleDeclaration {
    type Err = std::convert::Infallible;

    /// Parse an inline declaration list: `"width: 200px; margin: 0 auto"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut decl = Self::new();
        for item in s.split(';') {
            if let Some((name, value)) = item.split_once(':') {
                if !name.trim().is_empty() {
                    decl.set(name, value);
                }
            }
        }
        Ok(decl)
    }
}

/// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
///
/// Style of an anonymous box: "The properties of anonymous boxes are
/// inherited from the enclosing non-anonymous box." Non-inherited properties
/// take their initial value, so they read as absent.
#[derive(Debug, Clone)]
pub struct InheritedStyle {
    parent: SharedStyle,
}

impl InheritedStyle {
    /// Properties that anonymous boxes take from their parent.
    pub const INHERITED: &'static [&'static str] = &[
        "font-family",
        "font-size",
        "font-style",
        "font-weight",
        "line-height",
        "text-align",
        "visibility",
        "white-space",
    ];

    /// Create an inherited view of `parent`.
    #[must_use]
    pub fn new(parent: SharedStyle) -> Self {
        Self { parent }
    }
}

impl StyleLookup for InheritedStyle {
    fn property(&self, name: &str) -> &str {
        if Self::INHERITED.contains(&name) {
            self.parent.property(name)
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_declarations() {
        let decl: StyleDeclaration = "width: 200px; float:left ;; color".parse().unwrap();
        assert_eq!(decl.property("width"), "200px");
        assert_eq!(decl.property("float"), "left");
        assert_eq!(decl.property("height"), "");
        assert_eq!(decl.len(), 2);
    }

    #[test]
    fn test_margin_shorthand_two_values() {
        let decl = StyleDeclaration::new().with("margin", "0 auto");
        assert_eq!(decl.property("margin-top"), "0");
        assert_eq!(decl.property("margin-right"), "auto");
        assert_eq!(decl.property("margin-bottom"), "0");
        assert_eq!(decl.property("margin-left"), "auto");
    }

    #[test]
    fn test_border_width_shorthand_three_values() {
        let decl = StyleDeclaration::new().with("border-width", "1px 2px 3px");
        assert_eq!(decl.property("border-top-width"), "1px");
        assert_eq!(decl.property("border-right-width"), "2px");
        assert_eq!(decl.property("border-bottom-width"), "3px");
        assert_eq!(decl.property("border-left-width"), "2px");
    }

    #[test]
    fn test_unset_sentinels() {
        let decl = StyleDeclaration::new().with("width", "auto");
        assert!(decl.is_unset("width"));
        assert!(decl.is_unset("height"));
    }

    #[test]
    fn test_inherited_style_filters_non_inherited() {
        let parent = StyleDeclaration::new()
            .with("text-align", "center")
            .with("width", "100px")
            .shared();
        let anon = InheritedStyle::new(parent);
        assert_eq!(anon.property("text-align"), "center");
        assert_eq!(anon.property("width"), "");
    }
}
