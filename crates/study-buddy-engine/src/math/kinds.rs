//! Math delimiter constants.
//!
//! The scanner reads delimiters from here and never hardcodes `$` or `$$`.

/// Display (block) math: `$$...$$`.
pub struct DisplayMath;

impl DisplayMath {
    pub const DELIM: &'static str = "$$";
    pub const OPEN: &'static [u8; 2] = b"$$";
    pub const CLOSE: &'static [u8; 2] = b"$$";
}

/// Inline math: `$...$`.
pub struct InlineMath;

impl InlineMath {
    pub const DELIM: &'static str = "$";
    pub const DOLLAR: u8 = b'$';
}
