//! Text measurement and soft wrap opportunities.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)

use serde::Serialize;

/// The font a text run is measured with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    /// Used font size in pixels.
    pub size: f32,
    /// Font family as declared.
    pub family: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size: 16.0,
            family: "serif".to_string(),
        }
    }
}

/// Font metrics provider.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Shaping is out of scope; callers with real fonts implement this trait.
pub trait TextMeasure {
    /// Measure the total advance width of `text`.
    fn text_width(&self, text: &str, font: &FontSpec) -> f32;

    /// The used value of `line-height: normal`.
    ///
    /// "We recommend a used value for 'normal' between 1.0 and 1.2."
    fn line_height(&self, font: &FontSpec) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// Without font data, the average advance width of Latin glyphs in a
/// proportional font is approximately 0.6× the font size. Line height uses
/// 1.2×, the upper end of the recommended range for `line-height: normal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasure;

impl TextMeasure for ApproximateTextMeasure {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f32;
        chars * font.size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, font: &FontSpec) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        font.size * LINE_HEIGHT_RATIO
    }
}

/// [§ 16.6.1 The 'white-space' processing model](https://www.w3.org/TR/CSS2/text.html#white-space-model)
///
/// `white-space: normal`: "every tab is converted to a space", "any space
/// immediately following another space is removed" and line feeds are
/// treated as spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

/// Byte offsets where a word starts after whitespace. Breaking there puts
/// the whitespace at the end of the first part.
///
/// [§ 5.5.2 Word Breaking Rules](https://www.w3.org/TR/css-text-3/#word-breaking)
/// "A soft wrap opportunity exists at the boundary of whitespace."
///
/// Leading whitespace is not an opportunity: the first part would hold no
/// word.
pub fn break_opportunities(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut prev_was_whitespace = false;
    let mut seen_word = false;
    text.char_indices().filter_map(move |(idx, ch)| {
        let is_whitespace = ch.is_whitespace();
        let opportunity = !is_whitespace && prev_was_whitespace && seen_word;
        prev_was_whitespace = is_whitespace;
        seen_word |= !is_whitespace;
        opportunity.then_some(idx)
    })
}

/// The last break opportunity whose prefix (trailing whitespace trimmed)
/// fits within `max_width`.
pub fn find_break_opportunity(
    text: &str,
    max_width: f32,
    font: &FontSpec,
    measure: &dyn TextMeasure,
) -> Option<usize> {
    let mut last_fitting_break = None;
    for idx in break_opportunities(text) {
        if measure.text_width(text[..idx].trim_end(), font) <= max_width {
            last_fitting_break = Some(idx);
        } else {
            break;
        }
    }
    last_fitting_break
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> FontSpec {
        FontSpec {
            size: 10.0,
            family: "serif".to_string(),
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b  c"), "a b c");
        assert_eq!(collapse_whitespace("  "), " ");
    }

    #[test]
    fn test_break_opportunities() {
        let breaks: Vec<usize> = break_opportunities("ab cd  ef").collect();
        assert_eq!(breaks, vec![3, 7]);
        assert_eq!(break_opportunities(" x").count(), 0);
        assert_eq!(break_opportunities("  x y").collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_find_last_fitting_break() {
        let m = ApproximateTextMeasure;
        // 6px per char at 10px
        assert_eq!(find_break_opportunity("aaa bbb ccc", 41.0, &font(), &m), Some(4));
        assert_eq!(find_break_opportunity("aaa bbb ccc", 42.0, &font(), &m), Some(8));
        assert_eq!(find_break_opportunity("aaa bbb ccc", 17.0, &font(), &m), None);
        assert_eq!(find_break_opportunity("aaabbb", 1000.0, &font(), &m), None);
        assert_eq!(find_break_opportunity(" aaaaaaaaaa", 50.0, &font(), &m), None);
    }
}
