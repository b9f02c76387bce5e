//! Layout errors.
//!
//! A box that does not fit its line is not an error; that is reported through
//! [`LayoutOutcome`](crate::layout::LayoutOutcome). These variants cover
//! malformed trees and internal invariant breaks.

use thiserror::Error;

use crate::layout::BoxId;

/// Result alias used throughout the layout engine.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors surfaced by tree construction and layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Sizes were requested for a box that has no containing block.
    #[error("box {0} has no containing block")]
    MissingContainingBlock(BoxId),

    /// The root box refused placement even when forced.
    #[error("root box {0} could not be placed")]
    RootNotPlaced(BoxId),

    /// The downward float search did not advance.
    #[error("float placement in the formatting context of {owner} stalled at y={y}")]
    FloatSearchStalled {
        /// Owner of the float lists being searched.
        owner: BoxId,
        /// The y coordinate that failed to advance.
        y: f32,
    },

    /// The id does not name a box in this tree.
    #[error("unknown box {0}")]
    UnknownBox(BoxId),

    /// Children were appended to a box that cannot hold them.
    #[error("box {0} cannot have children")]
    InvalidParent(BoxId),
}
