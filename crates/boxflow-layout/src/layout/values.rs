//! Auto-or-length values for width and margin resolution.
//!
//! [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)

use crate::style::LengthDecoder;

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "If both 'margin-left' and 'margin-right' are 'auto', their used values
/// are equal."
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AutoOr {
    /// Resolved by the width and margin equations.
    #[default]
    Auto,
    /// Pixels.
    Length(f32),
}

impl AutoOr {
    /// Decode a raw property value. Absent and `auto` both map to
    /// [`AutoOr::Auto`]; anything else that does not decode is `0`.
    pub fn decode(raw: &str, decoder: &dyn LengthDecoder, basis: f32) -> Self {
        match raw.trim() {
            "" | "auto" => Self::Auto,
            value => Self::Length(decoder.decode(value, basis).unwrap_or(0.0)),
        }
    }

    /// Decode a margin. An absent margin is `0`, only `auto` is auto.
    pub fn decode_margin(raw: &str, decoder: &dyn LengthDecoder, basis: f32) -> Self {
        match raw.trim() {
            "" => Self::Length(0.0),
            value => Self::decode(value, decoder, basis),
        }
    }

    /// The length in pixels, or `default` for `auto`.
    #[must_use]
    pub const fn to_px_or(&self, default: f32) -> f32 {
        match self {
            Self::Length(v) => *v,
            Self::Auto => default,
        }
    }
}
