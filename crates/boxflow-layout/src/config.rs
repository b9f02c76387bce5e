//! Layout configuration.

use serde::{Deserialize, Serialize};

/// Tunables of the layout engine.
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum usable line width (px) next to floats before an inline box is
    /// forced onto a line. Below it the line moves down instead.
    pub inflow_space_threshold: f32,

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    ///
    /// Used value of `medium`, which is also the initial border width.
    pub medium_border_width: f32,

    /// [§ 15.7 Font size](https://www.w3.org/TR/CSS2/fonts.html#font-size-props)
    ///
    /// Font size of the root box in pixels.
    pub default_font_size: f32,

    /// Font family of the root box.
    pub default_font_family: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            inflow_space_threshold: 20.0,
            medium_border_width: 3.0,
            default_font_size: 16.0,
            default_font_family: "serif".to_string(),
        }
    }
}
