//! Unicode text machinery: classification, bidirectional resolution, and
//! Arabic shaping.
//!
//! Everything in this module is a pure function over its inputs and safe to
//! call from any thread. The logical/visual contract of the crate lives
//! here: parsing and execution always see logical order; [`process`] (after
//! [`shape`]) produces visual order for display.

mod bidi;
mod class;
mod shape;

pub use bidi::{
    MAX_DEPTH, MAX_LEVEL, Run, paragraph_level, process, reorder_for_display, resolve,
};
pub use class::{BidiClass, BracketKind, canonical_bracket, classify, mirrored, paired_bracket};
pub use shape::shape;
