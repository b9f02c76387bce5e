//! CSS length values and parsing
//!
//! [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::LengthDecoder;

/// Pixels per inch. [§ 4.3.2](https://www.w3.org/TR/CSS2/syndata.html#length-units)
/// "1in is equal to 96px".
const PX_PER_IN: f32 = 96.0;

/// Errors produced when a string is not a CSS length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLengthError {
    /// The input was empty.
    #[error("empty length value")]
    Empty,
    /// The numeric part could not be parsed.
    #[error("invalid number in length '{0}'")]
    InvalidNumber(String),
    /// The unit is not a CSS2.1 unit.
    #[error("unknown length unit '{unit}' in '{value}'")]
    UnknownUnit {
        /// The full input.
        value: String,
        /// The unrecognized unit suffix.
        unit: String,
    },
}

/// [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
/// "The format of a length value is a `<number>` immediately followed by a
/// unit identifier."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// "px: pixel units, 1px is equal to 0.75pt"
    Px(f32),
    /// "pt: points, the points used by CSS are equal to 1/72nd of 1in"
    Pt(f32),
    /// "pc: picas, 1pc is equal to 12pt"
    Pc(f32),
    /// "in: inches, 1in is equal to 2.54cm"
    In(f32),
    /// "cm: centimeters"
    Cm(f32),
    /// "mm: millimeters"
    Mm(f32),
    /// "em: the 'font-size' of the relevant font"
    Em(f32),
    /// "ex: the 'x-height' of the relevant font"
    Ex(f32),
    /// [§ 4.3.3 Percentages](https://www.w3.org/TR/CSS2/syndata.html#percentage-units)
    /// "Percentage values are always relative to another value"
    Percent(f32),
}

impl LengthValue {
    /// Resolve to pixels. `basis` is what percentages refer to, `font_size`
    /// is the em size.
    ///
    /// The x-height is approximated as half the em size.
    #[must_use]
    pub fn to_px(&self, basis: f32, font_size: f32) -> f32 {
        match *self {
            Self::Px(v) => v,
            Self::Pt(v) => v * PX_PER_IN / 72.0,
            Self::Pc(v) => v * PX_PER_IN / 6.0,
            Self::In(v) => v * PX_PER_IN,
            Self::Cm(v) => v * PX_PER_IN / 2.54,
            Self::Mm(v) => v * PX_PER_IN / 25.4,
            Self::Em(v) => v * font_size,
            Self::Ex(v) => v * font_size / 2.0,
            Self::Percent(v) => v * basis / 100.0,
        }
    }
}

impl FromStr for LengthValue {
    type Err = ParseLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseLengthError::Empty);
        }
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value: f32 = number
            .parse()
            .map_err(|_| ParseLengthError::InvalidNumber(s.to_string()))?;
        let unit = unit.to_ascii_lowercase();
        Ok(match unit.as_str() {
            "px" => Self::Px(value),
            "pt" => Self::Pt(value),
            "pc" => Self::Pc(value),
            "in" => Self::In(value),
            "cm" => Self::Cm(value),
            "mm" => Self::Mm(value),
            "em" => Self::Em(value),
            "ex" => Self::Ex(value),
            "%" => Self::Percent(value),
            // [§ 4.3.2] "After a zero length, the unit identifier is optional."
            "" if value == 0.0 => Self::Px(0.0),
            _ => {
                return Err(ParseLengthError::UnknownUnit {
                    value: s.to_string(),
                    unit,
                });
            }
        })
    }
}

/// The stock [`LengthDecoder`]: CSS2.1 units against one font size, rounded
/// to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLengthDecoder {
    /// The em size used for `em` and `ex`.
    pub font_size: f32,
    /// Width of the `medium` border keyword.
    pub medium_border_width: f32,
}

impl CssLengthDecoder {
    /// Create a decoder for the given em size and `medium` border width.
    #[must_use]
    pub const fn new(font_size: f32, medium_border_width: f32) -> Self {
        Self {
            font_size,
            medium_border_width,
        }
    }
}

impl Default for CssLengthDecoder {
    fn default() -> Self {
        Self::new(16.0, 3.0)
    }
}

impl LengthDecoder for CssLengthDecoder {
    fn decode(&self, raw: &str, basis: f32) -> Option<f32> {
        let px = match raw.trim() {
            // [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
            // "thin <= medium <= thick"
            "thin" => 1.0,
            "medium" => self.medium_border_width,
            "thick" => self.medium_border_width + 2.0,
            value => value.parse::<LengthValue>().ok()?.to_px(basis, self.font_size),
        };
        Some(px.round())
    }
}
