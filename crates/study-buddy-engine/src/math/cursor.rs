/// A byte cursor over the scanned text.
///
/// Tracks a local index into `s`. All delimiters are ASCII, so every index the
/// scanner stops at is a UTF-8 char boundary.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at byte `i` of `s`.
    pub fn at(s: &'a str, i: usize) -> Self {
        Self { s, i }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes().get(self.i..).is_some_and(|rest| rest.starts_with(pat))
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Moves forward to the next occurrence of `pat` and returns its index,
    /// or leaves the cursor untouched and returns `None` if there is none.
    pub fn seek(&mut self, pat: &[u8]) -> Option<usize> {
        let rest = self.s.as_bytes().get(self.i..)?;
        let found = rest.windows(pat.len()).position(|w| w == pat)?;
        self.i += found;
        Some(self.i)
    }

    /// Index of the next `b` at or after the cursor, without moving.
    pub fn find_byte(&self, b: u8) -> Option<usize> {
        let rest = self.s.as_bytes().get(self.i..)?;
        rest.iter().position(|&c| c == b).map(|off| self.i + off)
    }
}
