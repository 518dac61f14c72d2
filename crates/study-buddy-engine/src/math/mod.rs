//! # Math Segmentation
//!
//! Splits free text into plain-text runs and `$`-delimited math runs, then
//! hands the math runs to a [`Typesetter`].
//!
//! ## Architecture
//!
//! Scanning and typesetting are separate passes:
//! - [`segments`] is a pure, allocation-free scan producing [`Segment`]s that
//!   borrow the input. It can be called any number of times on the same text
//!   and always yields the same sequence.
//! - [`render_segments`] runs the scan and typesets each math segment,
//!   isolating failures to the segment that caused them.
//!
//! ## Modules
//!
//! - **`types`**: `Span`, `Segment`, `SegmentKind`
//! - **`kinds`**: delimiter constants for display and inline math
//! - **`cursor`**: byte cursor with absolute position tracking
//! - **`scanner`**: the `Segments` iterator and `try_scan_*` helpers
//! - **`render`**: `Typesetter` capability, `RenderedSegment`, HTML output
//! - **`latex`**: `LatexTypesetter`, a MathML typesetter
//!
//! ## Delimiter Precedence
//!
//! At every `$` the display form `$$...$$` is attempted before the inline
//! form `$...$`, so `$$x$$` is one display segment and never an empty inline
//! segment followed by `x`.

pub mod cursor;
pub mod kinds;
pub mod latex;
pub mod render;
pub mod scanner;
pub mod types;

pub use latex::LatexTypesetter;
pub use render::{RenderError, RenderedSegment, Typesetter, render_segments, to_html};
pub use scanner::{Segments, segments};
pub use types::{Segment, SegmentKind, Span};
